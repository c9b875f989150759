use anyhow::{Context, Result};
use chrono::NaiveDate;
use chrono_tz::Tz;
use futures::future::try_join_all;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::accuracy::{AccuracyReport, ComparisonInput, SeriesInput};
use crate::config::{ComparisonConfig, Config, SeriesConfig};
use crate::source::{OutlookWindow, SeriesQuery, SeriesSource};

/// Catalog report together with the scenario and window it was computed for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlookReport {
    pub scenario_id: Option<i64>,
    pub window: OutlookWindow,
    #[serde(flatten)]
    pub report: AccuracyReport,
}

/// Wires a series source to the accuracy engine using the configured catalog.
pub struct OutlookService {
    source: Arc<dyn SeriesSource>,
    series: Vec<SeriesConfig>,
    comparisons: Vec<ComparisonConfig>,
    window_days: u32,
    default_zone: Tz,
}

impl OutlookService {
    pub fn new(source: Arc<dyn SeriesSource>, cfg: &Config) -> Result<Self> {
        cfg.check()?;
        Ok(Self {
            source,
            series: cfg.series.clone(),
            comparisons: cfg.comparisons.clone(),
            window_days: cfg.outlook.window_days,
            default_zone: cfg.outlook.default_zone,
        })
    }

    pub fn source(&self) -> &Arc<dyn SeriesSource> {
        &self.source
    }

    pub fn default_zone(&self) -> Tz {
        self.default_zone
    }

    pub fn comparison_names(&self) -> impl Iterator<Item = &str> {
        self.comparisons.iter().map(|c| c.name.as_str())
    }

    /// Fetch every catalog series for the window and evaluate all comparisons.
    pub async fn accuracy_report(
        &self,
        scenario_id: Option<i64>,
        start: NaiveDate,
    ) -> Result<OutlookReport> {
        let selected: Vec<&ComparisonConfig> = self.comparisons.iter().collect();
        self.evaluate(scenario_id, start, &selected).await
    }

    /// Evaluate a single catalog comparison, fetching only its two series.
    /// `None` when no comparison carries that name.
    pub async fn comparison_report(
        &self,
        name: &str,
        scenario_id: Option<i64>,
        start: NaiveDate,
    ) -> Result<Option<OutlookReport>> {
        let Some(comparison) = self.comparisons.iter().find(|c| c.name == name) else {
            return Ok(None);
        };
        self.evaluate(scenario_id, start, &[comparison]).await.map(Some)
    }

    async fn evaluate(
        &self,
        scenario_id: Option<i64>,
        start: NaiveDate,
        selected: &[&ComparisonConfig],
    ) -> Result<OutlookReport> {
        let scenario_id = match scenario_id {
            Some(id) => Some(id),
            None => self.source.latest_scenario().await?,
        };
        if scenario_id.is_none() {
            warn!("no scenario available; scenario-scoped series will be empty");
        }

        let window = OutlookWindow::new(start, self.window_days);
        let referenced = self.referenced_series(selected);

        let fetches = referenced.iter().map(|s| {
            let query = SeriesQuery {
                series_key: s.key.clone(),
                scenario_id: if s.scenario_scoped { scenario_id } else { None },
                window,
                convention: s.convention,
            };
            async move {
                let samples = self.source.fetch_samples(&query).await?;
                let input = SeriesInput::new(
                    s.key.clone(),
                    s.policy,
                    s.zone.unwrap_or(self.default_zone),
                    samples,
                )?;
                debug!(
                    series = input.name(),
                    policy = %input.policy(),
                    zone = %input.zone(),
                    samples = input.sample_count(),
                    "series fetched"
                );
                Ok::<_, anyhow::Error>((s.key.as_str(), input))
            }
        });
        let inputs: HashMap<&str, SeriesInput> = try_join_all(fetches).await?.into_iter().collect();

        let comparisons = selected
            .iter()
            .map(|c| {
                let forecast = lookup(&inputs, &c.forecast)?;
                let actual = lookup(&inputs, &c.actual)?;
                Ok(ComparisonInput::new(c.name.clone(), forecast, actual))
            })
            .collect::<Result<Vec<_>>>()?;

        let report = AccuracyReport::build(comparisons)?;
        info!(
            scenario_id,
            start = %window.start,
            days = window.days,
            comparisons = report.len(),
            "outlook accuracy computed"
        );

        Ok(OutlookReport {
            scenario_id,
            window,
            report,
        })
    }

    /// Series used by at least one selected comparison, each listed once
    fn referenced_series(&self, selected: &[&ComparisonConfig]) -> Vec<&SeriesConfig> {
        let mut out: Vec<&SeriesConfig> = Vec::new();
        for c in selected {
            for key in [&c.forecast, &c.actual] {
                if out.iter().any(|s| &s.key == key) {
                    continue;
                }
                if let Some(s) = self.series.iter().find(|s| &s.key == key) {
                    out.push(s);
                }
            }
        }
        out
    }
}

fn lookup(inputs: &HashMap<&str, SeriesInput>, key: &str) -> Result<SeriesInput> {
    inputs
        .get(key)
        .cloned()
        .with_context(|| format!("series '{key}' was not fetched"))
}
