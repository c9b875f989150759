use anyhow::Result;
use chrono::Utc;
use std::sync::Arc;

use crate::config::Config;
use crate::service::OutlookService;
use crate::source::SeriesSource;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Config,
    pub service: Arc<OutlookService>,
}

impl AppState {
    pub async fn new(cfg: Config) -> Result<Self> {
        let source = build_source(&cfg).await?;
        Self::with_source(cfg, source)
    }

    pub fn with_source(cfg: Config, source: Arc<dyn SeriesSource>) -> Result<Self> {
        let service = Arc::new(OutlookService::new(source, &cfg)?);
        Ok(Self { cfg, service })
    }

    /// Today's date in the default market zone
    pub fn today(&self) -> chrono::NaiveDate {
        Utc::now()
            .with_timezone(&self.cfg.outlook.default_zone)
            .date_naive()
    }
}

#[cfg(feature = "db")]
async fn build_source(cfg: &Config) -> Result<Arc<dyn SeriesSource>> {
    let source = crate::source::PgSeriesSource::connect(&cfg.db).await?;
    Ok(Arc::new(source))
}

#[cfg(not(feature = "db"))]
async fn build_source(cfg: &Config) -> Result<Arc<dyn SeriesSource>> {
    let source = crate::source::InMemorySeriesSource::new();

    #[cfg(feature = "sim")]
    {
        use crate::source::{synthetic, OutlookWindow};
        let days = cfg.outlook.window_days;
        let today = Utc::now().with_timezone(&cfg.outlook.default_zone).date_naive();
        let window = OutlookWindow::new(today - chrono::Duration::days(i64::from(days)), days * 2);
        synthetic::seed(&source, window, 1).await;
        tracing::info!(start = %window.start, days = window.days, "seeded synthetic observations");
    }
    #[cfg(not(feature = "sim"))]
    {
        let _ = cfg;
        tracing::info!("no database configured; serving an empty in-memory source");
    }

    Ok(Arc::new(source))
}
