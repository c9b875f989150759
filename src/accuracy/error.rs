use chrono::NaiveDate;
use chrono_tz::Tz;

use crate::domain::HourConvention;

/// Forecast accuracy engine errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AccuracyError {
    #[error("Hour index {hour} out of range for {convention}")]
    InvalidHourIndex {
        hour: u32,
        convention: HourConvention,
    },

    #[error("Series '{series}' mixes hour conventions: expected {expected}, found {found}")]
    ConventionMismatch {
        series: String,
        expected: HourConvention,
        found: HourConvention,
    },

    #[error("Local midnight of {date} does not exist in {zone}")]
    NonexistentMidnight { date: NaiveDate, zone: Tz },

    #[error("Comparison '{0}' declared more than once")]
    DuplicateComparison(String),
}

impl AccuracyError {
    /// Per-sample errors are skipped; everything else fails the report
    pub fn is_sample_local(&self) -> bool {
        matches!(
            self,
            Self::InvalidHourIndex { .. } | Self::NonexistentMidnight { .. }
        )
    }
}
