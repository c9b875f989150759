//! Data-access collaborators
//!
//! The engine never talks to storage. A [`SeriesSource`] returns rows
//! already filtered to the requested window and scenario, mapped into
//! [`RawSample`]s under the convention declared for the series.

pub mod memory;
#[cfg(feature = "db")]
pub mod pg;
#[cfg(feature = "sim")]
pub mod synthetic;
pub mod window;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{HourConvention, RawSample, TimeKey};

pub use memory::InMemorySeriesSource;
#[cfg(feature = "db")]
pub use pg::PgSeriesSource;
pub use window::{OutlookWindow, DEFAULT_WINDOW_DAYS};

/// What to fetch for one series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesQuery {
    pub series_key: String,
    /// `None` selects rows that belong to no scenario (realized data)
    pub scenario_id: Option<i64>,
    pub window: OutlookWindow,
    pub convention: HourConvention,
}

/// Storage-shaped observation row, before it becomes a [`RawSample`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRow {
    pub obs_date: NaiveDate,
    pub hour_index: u32,
    pub value: Option<f64>,
    pub group_key: Option<String>,
}

impl ObservationRow {
    pub fn into_sample(self, convention: HourConvention) -> RawSample {
        RawSample {
            key: TimeKey::new(self.obs_date, self.hour_index, convention),
            value: self.value,
            group_key: self.group_key,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeriesSource: Send + Sync {
    /// Samples for one series inside the query window
    async fn fetch_samples(&self, query: &SeriesQuery) -> Result<Vec<RawSample>>;

    /// Most recent forecast run, if any
    async fn latest_scenario(&self) -> Result<Option<i64>>;

    /// Cheap connectivity probe for health checks
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
