use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use strum::{Display, EnumString};

// ============================================================================
// Time Labelling
// ============================================================================

/// How a source labels an hourly interval.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HourConvention {
    /// Hour index 0-23, label marks the start of the interval
    HourBeginning,
    /// Hour index 1-24, label marks the end of the interval
    HourEnding,
}

impl HourConvention {
    /// Valid hour indices (inclusive) for a local day of `hours_in_day`
    /// hours: 23 on a spring-forward day, 25 on a fall-back day.
    pub fn hour_range(&self, hours_in_day: u32) -> std::ops::RangeInclusive<u32> {
        match self {
            Self::HourBeginning => 0..=hours_in_day.saturating_sub(1),
            Self::HourEnding => 1..=hours_in_day,
        }
    }

    /// Whole hours between local midnight and the start of the interval
    /// labelled `hour`. Callers check the range first.
    pub fn offset_hours(&self, hour: u32) -> u32 {
        match self {
            Self::HourBeginning => hour,
            Self::HourEnding => hour.saturating_sub(1),
        }
    }
}

/// Source-side time label: calendar date, hour index and convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeKey {
    pub date: NaiveDate,
    pub hour: u32,
    pub convention: HourConvention,
}

impl TimeKey {
    pub fn new(date: NaiveDate, hour: u32, convention: HourConvention) -> Self {
        Self {
            date,
            hour,
            convention,
        }
    }

    pub fn hour_ending(date: NaiveDate, hour: u32) -> Self {
        Self::new(date, hour, HourConvention::HourEnding)
    }

    pub fn hour_beginning(date: NaiveDate, hour: u32) -> Self {
        Self::new(date, hour, HourConvention::HourBeginning)
    }
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self.convention {
            HourConvention::HourBeginning => "HB",
            HourConvention::HourEnding => "HE",
        };
        write!(f, "{} {}{:02}", self.date, tag, self.hour)
    }
}

/// How samples sharing an instant are reduced to one value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AggregationPolicy {
    /// Additive quantity (demand across zones); nulls count as zero
    Sum,
    /// Sampled quantity (temperature, sub-hourly generation); nulls are skipped
    Mean,
}

// ============================================================================
// Samples and Instants
// ============================================================================

/// One observation as delivered by a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub key: TimeKey,
    pub value: Option<f64>,
    /// Zone id, fuel type, unit id. Discarded by aggregation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_key: Option<String>,
}

impl RawSample {
    pub fn new(key: TimeKey, value: Option<f64>) -> Self {
        Self {
            key,
            value,
            group_key: None,
        }
    }

    pub fn with_group(mut self, group_key: impl Into<String>) -> Self {
        self.group_key = Some(group_key.into());
        self
    }

    /// Value if present and finite
    pub fn usable_value(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }
}

/// Hour-beginning instant in UTC. All alignment happens on this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalInstant(pub DateTime<Utc>);

impl CanonicalInstant {
    pub fn inner(&self) -> DateTime<Utc> {
        self.0
    }
}

impl From<DateTime<Utc>> for CanonicalInstant {
    fn from(dt: DateTime<Utc>) -> Self {
        Self(dt)
    }
}

impl fmt::Display for CanonicalInstant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%Y-%m-%dT%H:%M:%SZ"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_hour_convention_ranges() {
        assert!(HourConvention::HourEnding.hour_range(24).contains(&24));
        assert!(!HourConvention::HourEnding.hour_range(24).contains(&0));
        assert!(HourConvention::HourBeginning.hour_range(24).contains(&0));
        assert!(!HourConvention::HourBeginning.hour_range(24).contains(&24));
    }

    #[test]
    fn test_hour_range_follows_day_length() {
        assert!(!HourConvention::HourEnding.hour_range(23).contains(&24));
        assert!(!HourConvention::HourBeginning.hour_range(23).contains(&23));
        assert!(HourConvention::HourEnding.hour_range(25).contains(&25));
        assert!(HourConvention::HourBeginning.hour_range(25).contains(&24));
        assert_eq!(HourConvention::HourEnding.offset_hours(25), 24);
        assert_eq!(HourConvention::HourBeginning.offset_hours(24), 24);
    }

    #[test]
    fn test_convention_parse_and_display() {
        assert_eq!(HourConvention::HourEnding.to_string(), "hour_ending");
        assert_eq!(
            "hour_beginning".parse::<HourConvention>().unwrap(),
            HourConvention::HourBeginning
        );
        assert_eq!("mean".parse::<AggregationPolicy>().unwrap(), AggregationPolicy::Mean);
    }

    #[test]
    fn test_time_key_display() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        assert_eq!(TimeKey::hour_ending(date, 5).to_string(), "2024-07-01 HE05");
        assert_eq!(TimeKey::hour_beginning(date, 0).to_string(), "2024-07-01 HB00");
    }

    #[test]
    fn test_usable_value_filters_non_finite() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 1).unwrap();
        let key = TimeKey::hour_ending(date, 1);
        assert_eq!(RawSample::new(key, Some(3.0)).usable_value(), Some(3.0));
        assert_eq!(RawSample::new(key, Some(f64::NAN)).usable_value(), None);
        assert_eq!(RawSample::new(key, None).usable_value(), None);
    }

    #[test]
    fn test_canonical_instant_serializes_as_rfc3339() {
        let instant = CanonicalInstant(Utc.with_ymd_and_hms(2024, 7, 1, 13, 0, 0).unwrap());
        let json = serde_json::to_string(&instant).unwrap();
        assert_eq!(json, "\"2024-07-01T13:00:00Z\"");
    }
}
