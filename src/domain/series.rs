use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::types::CanonicalInstant;

/// Exactly one value per instant. `None` is the "no data" marker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregatedSeries {
    points: BTreeMap<CanonicalInstant, Option<f64>>,
}

impl AggregatedSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for an instant
    pub fn insert(&mut self, instant: CanonicalInstant, value: Option<f64>) {
        self.points.insert(instant, value);
    }

    pub fn get(&self, instant: &CanonicalInstant) -> Option<Option<f64>> {
        self.points.get(instant).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Instants carrying an actual value
    pub fn valued_len(&self) -> usize {
        self.points.values().filter(|v| v.is_some()).count()
    }

    /// Ascending iteration by instant
    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalInstant, &Option<f64>)> {
        self.points.iter()
    }

    pub fn instants(&self) -> impl Iterator<Item = &CanonicalInstant> {
        self.points.keys()
    }
}

impl FromIterator<(CanonicalInstant, Option<f64>)> for AggregatedSeries {
    fn from_iter<I: IntoIterator<Item = (CanonicalInstant, Option<f64>)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}

/// One row of a forecast/actual join.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignedPair {
    pub instant: CanonicalInstant,
    pub forecast: Option<f64>,
    pub actual: Option<f64>,
}

impl AlignedPair {
    /// Both sides present and finite
    pub fn is_complete(&self) -> bool {
        self.values().is_some()
    }

    /// (forecast, actual) when the pair can enter metric computation
    pub fn values(&self) -> Option<(f64, f64)> {
        match (self.forecast, self.actual) {
            (Some(f), Some(a)) if f.is_finite() && a.is_finite() => Some((f, a)),
            _ => None,
        }
    }

    /// Signed error (forecast - actual)
    pub fn error(&self) -> Option<f64> {
        self.values().map(|(f, a)| f - a)
    }
}
