use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::{ObservationRow, SeriesQuery, SeriesSource};
use crate::domain::RawSample;

type StoreKey = (String, Option<i64>);

/// Process-local observation store
#[derive(Clone, Default)]
pub struct InMemorySeriesSource {
    rows: Arc<RwLock<HashMap<StoreKey, Vec<ObservationRow>>>>,
}

impl InMemorySeriesSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rows for a series; `scenario_id` is `None` for realized data
    pub async fn insert(
        &self,
        series_key: impl Into<String>,
        scenario_id: Option<i64>,
        rows: impl IntoIterator<Item = ObservationRow>,
    ) {
        let mut store = self.rows.write().await;
        store
            .entry((series_key.into(), scenario_id))
            .or_default()
            .extend(rows);
    }

    pub async fn row_count(&self) -> usize {
        self.rows.read().await.values().map(Vec::len).sum()
    }
}

#[async_trait]
impl SeriesSource for InMemorySeriesSource {
    async fn fetch_samples(&self, query: &SeriesQuery) -> Result<Vec<RawSample>> {
        let store = self.rows.read().await;
        let key = (query.series_key.clone(), query.scenario_id);

        let samples = store
            .get(&key)
            .map(|rows| {
                rows.iter()
                    .filter(|r| query.window.contains(r.obs_date))
                    .cloned()
                    .map(|r| r.into_sample(query.convention))
                    .collect()
            })
            .unwrap_or_default();
        Ok(samples)
    }

    async fn latest_scenario(&self) -> Result<Option<i64>> {
        let store = self.rows.read().await;
        Ok(store.keys().filter_map(|(_, scenario)| *scenario).max())
    }
}
