//! Series aggregation
//!
//! Collapses raw samples that share a canonical instant (several zones,
//! several sub-hourly readings) into one value per instant.

use chrono_tz::Tz;
use std::collections::BTreeMap;
use tracing::warn;

use super::error::AccuracyError;
use super::normalize::normalize;
use crate::domain::{
    AggregatedSeries, AggregationPolicy, CanonicalInstant, HourConvention, RawSample,
};

/// A named batch of samples declared under a single hour convention.
#[derive(Debug, Clone)]
pub struct SeriesInput {
    name: String,
    policy: AggregationPolicy,
    zone: Tz,
    convention: Option<HourConvention>,
    samples: Vec<RawSample>,
}

/// Aggregated series plus the number of samples that could not be placed.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub series: AggregatedSeries,
    pub dropped: usize,
}

impl SeriesInput {
    /// Build a series input, rejecting batches that mix hour conventions.
    pub fn new(
        name: impl Into<String>,
        policy: AggregationPolicy,
        zone: Tz,
        samples: Vec<RawSample>,
    ) -> Result<Self, AccuracyError> {
        let name = name.into();
        let convention = declared_convention(&name, &samples)?;
        Ok(Self {
            name,
            policy,
            zone,
            convention,
            samples,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn policy(&self) -> AggregationPolicy {
        self.policy
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// `None` only for an empty batch
    pub fn convention(&self) -> Option<HourConvention> {
        self.convention
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Normalize and reduce. Samples whose key cannot be normalized are
    /// logged and counted in [`Aggregation::dropped`].
    pub fn aggregate(&self) -> Aggregation {
        let mut groups: BTreeMap<CanonicalInstant, Vec<Option<f64>>> = BTreeMap::new();
        let mut dropped = 0;

        for sample in &self.samples {
            match normalize(&sample.key, self.zone) {
                Ok(instant) => groups.entry(instant).or_default().push(sample.usable_value()),
                Err(e) => {
                    dropped += 1;
                    warn!(series = %self.name, key = %sample.key, error = %e, "dropping sample");
                }
            }
        }

        let series = groups
            .into_iter()
            .map(|(instant, values)| (instant, reduce(self.policy, &values)))
            .collect();

        Aggregation { series, dropped }
    }
}

/// Reduce one group of values under a policy.
///
/// Non-finite values count as null. Values are sorted before summation so the
/// result does not depend on input order.
pub fn reduce(policy: AggregationPolicy, values: &[Option<f64>]) -> Option<f64> {
    let mut present: Vec<f64> = values
        .iter()
        .filter_map(|v| v.filter(|x| x.is_finite()))
        .collect();
    present.sort_by(f64::total_cmp);

    let total: f64 = present.iter().sum();
    match policy {
        AggregationPolicy::Sum => Some(total),
        AggregationPolicy::Mean if present.is_empty() => None,
        AggregationPolicy::Mean => Some(total / present.len() as f64),
    }
}

fn declared_convention(
    name: &str,
    samples: &[RawSample],
) -> Result<Option<HourConvention>, AccuracyError> {
    let Some(first) = samples.first() else {
        return Ok(None);
    };
    let expected = first.key.convention;

    match samples.iter().find(|s| s.key.convention != expected) {
        Some(odd) => Err(AccuracyError::ConventionMismatch {
            series: name.to_string(),
            expected,
            found: odd.key.convention,
        }),
        None => Ok(Some(expected)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TimeKey;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, 12).unwrap()
    }

    fn he(hour: u32, value: Option<f64>) -> RawSample {
        RawSample::new(TimeKey::hour_ending(day(), hour), value)
    }

    fn series(policy: AggregationPolicy, samples: Vec<RawSample>) -> SeriesInput {
        SeriesInput::new("test", policy, Tz::UTC, samples).unwrap()
    }

    #[test]
    fn test_sum_policy_treats_null_as_zero() {
        assert_eq!(
            reduce(AggregationPolicy::Sum, &[Some(10.0), Some(5.0), None]),
            Some(15.0)
        );
        assert_eq!(reduce(AggregationPolicy::Sum, &[None]), Some(0.0));
    }

    #[test]
    fn test_mean_policy_skips_null() {
        assert_eq!(reduce(AggregationPolicy::Mean, &[Some(10.0), Some(20.0)]), Some(15.0));
        assert_eq!(reduce(AggregationPolicy::Mean, &[Some(10.0), None]), Some(10.0));
        assert_eq!(reduce(AggregationPolicy::Mean, &[None]), None);
        assert_eq!(reduce(AggregationPolicy::Mean, &[Some(f64::NAN)]), None);
    }

    #[test]
    fn test_multi_zone_demand_is_summed_per_hour() {
        let input = series(
            AggregationPolicy::Sum,
            vec![
                he(1, Some(100.0)).with_group("NP15"),
                he(1, Some(250.0)).with_group("SP15"),
                he(2, Some(120.0)).with_group("NP15"),
                he(2, None).with_group("SP15"),
            ],
        );

        let agg = input.aggregate();
        assert_eq!(agg.dropped, 0);
        assert_eq!(agg.series.len(), 2);
        let values: Vec<_> = agg.series.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![Some(350.0), Some(120.0)]);
    }

    #[test]
    fn test_instant_with_only_nulls_is_kept_as_no_data() {
        let agg = series(AggregationPolicy::Mean, vec![he(3, None), he(4, Some(1.0))]).aggregate();
        assert_eq!(agg.series.len(), 2);
        assert_eq!(agg.series.valued_len(), 1);
    }

    #[test]
    fn test_spring_forward_hour_does_not_merge_into_next_day() {
        let spring = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let next = NaiveDate::from_ymd_opt(2024, 3, 11).unwrap();
        let input = SeriesInput::new(
            "caiso_load",
            AggregationPolicy::Sum,
            chrono_tz::America::Los_Angeles,
            vec![
                RawSample::new(TimeKey::hour_ending(spring, 23), Some(100.0)),
                RawSample::new(TimeKey::hour_ending(spring, 24), Some(100.0)),
                RawSample::new(TimeKey::hour_ending(next, 1), Some(200.0)),
            ],
        )
        .unwrap();

        let agg = input.aggregate();
        assert_eq!(agg.dropped, 1);
        let values: Vec<_> = agg.series.iter().map(|(_, v)| *v).collect();
        assert_eq!(values, vec![Some(100.0), Some(200.0)]);
    }

    #[test]
    fn test_invalid_hour_is_dropped_not_fatal() {
        let agg = series(
            AggregationPolicy::Sum,
            vec![he(0, Some(9.0)), he(1, Some(1.0)), he(25, Some(9.0))],
        )
        .aggregate();
        assert_eq!(agg.dropped, 2);
        assert_eq!(agg.series.len(), 1);
    }

    #[test]
    fn test_mixed_conventions_rejected_at_construction() {
        let samples = vec![
            he(1, Some(1.0)),
            RawSample::new(TimeKey::hour_beginning(day(), 1), Some(2.0)),
        ];
        let err = SeriesInput::new("load", AggregationPolicy::Sum, Tz::UTC, samples).unwrap_err();
        assert_eq!(
            err,
            AccuracyError::ConventionMismatch {
                series: "load".to_string(),
                expected: HourConvention::HourEnding,
                found: HourConvention::HourBeginning,
            }
        );
    }

    #[test]
    fn test_empty_series_has_no_convention() {
        let input = series(AggregationPolicy::Mean, vec![]);
        assert_eq!(input.convention(), None);
        assert!(input.aggregate().series.is_empty());
    }

    proptest! {
        #[test]
        fn prop_one_entry_per_distinct_instant(
            rows in prop::collection::vec((1u32..=24, prop::option::of(-1e4f64..1e4)), 0..120)
        ) {
            let samples: Vec<_> = rows.iter().map(|(h, v)| he(*h, *v)).collect();
            let agg = series(AggregationPolicy::Sum, samples).aggregate();

            let mut hours: Vec<u32> = rows.iter().map(|(h, _)| *h).collect();
            hours.sort_unstable();
            hours.dedup();
            prop_assert_eq!(agg.series.len(), hours.len());
        }

        #[test]
        fn prop_aggregation_ignores_input_order(
            rows in prop::collection::vec((1u32..=24, prop::option::of(-1e4f64..1e4)), 0..120)
        ) {
            let samples: Vec<_> = rows.iter().map(|(h, v)| he(*h, *v)).collect();
            let mut reversed = samples.clone();
            reversed.reverse();

            for policy in [AggregationPolicy::Sum, AggregationPolicy::Mean] {
                let a = series(policy, samples.clone()).aggregate();
                let b = series(policy, reversed.clone()).aggregate();
                prop_assert_eq!(a, b);
            }
        }
    }
}
