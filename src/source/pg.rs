//! Postgres-backed series source
//!
//! Reads `outlook_observations(series_key, scenario_id, obs_date, hour_index,
//! value, group_key)` and `outlook_scenarios(id, created_at)`.

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::{info, warn};

use super::{ObservationRow, SeriesQuery, SeriesSource};
use crate::config::DbConfig;
use crate::domain::RawSample;

pub struct PgSeriesSource {
    pool: PgPool,
}

impl PgSeriesSource {
    /// Connect with exponential backoff, then verify with a health query
    pub async fn connect(config: &DbConfig) -> Result<Self> {
        info!("Initializing database connection pool");
        let pool = connect_with_retry(config, config.connect_attempts.max(1)).await?;
        health_check(&pool).await?;
        info!("Database connection pool initialized successfully");
        Ok(Self { pool })
    }
}

#[async_trait]
impl SeriesSource for PgSeriesSource {
    async fn fetch_samples(&self, query: &SeriesQuery) -> Result<Vec<RawSample>> {
        let rows: Vec<(NaiveDate, i32, Option<f64>, Option<String>)> = sqlx::query_as(
            r#"
            SELECT obs_date, hour_index, value, group_key
            FROM outlook_observations
            WHERE series_key = $1
              AND scenario_id IS NOT DISTINCT FROM $2
              AND obs_date >= $3 AND obs_date < $4
            ORDER BY obs_date ASC, hour_index ASC
            "#,
        )
        .bind(&query.series_key)
        .bind(query.scenario_id)
        .bind(query.window.start)
        .bind(query.window.end())
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("fetching series '{}'", query.series_key))?;

        let samples = rows
            .into_iter()
            .filter_map(|(obs_date, hour, value, group_key)| match u32::try_from(hour) {
                Ok(hour_index) => Some(
                    ObservationRow {
                        obs_date,
                        hour_index,
                        value,
                        group_key,
                    }
                    .into_sample(query.convention),
                ),
                Err(_) => {
                    warn!(series = %query.series_key, %obs_date, hour, "negative hour index in row");
                    None
                }
            })
            .collect();

        Ok(samples)
    }

    async fn latest_scenario(&self) -> Result<Option<i64>> {
        let row: (Option<i64>,) = sqlx::query_as("SELECT MAX(id) FROM outlook_scenarios")
            .fetch_one(&self.pool)
            .await
            .context("resolving latest scenario")?;
        Ok(row.0)
    }

    async fn ping(&self) -> Result<()> {
        health_check(&self.pool).await
    }
}

async fn connect_with_retry(config: &DbConfig, max_attempts: usize) -> Result<PgPool> {
    let mut attempt = 0;
    let mut delay = Duration::from_secs(1);

    loop {
        attempt += 1;
        match try_connect(config).await {
            Ok(pool) => return Ok(pool),
            Err(e) if attempt >= max_attempts => {
                return Err(e).context(format!(
                    "Failed to connect to database after {} attempts",
                    max_attempts
                ));
            }
            Err(e) => {
                warn!(
                    "Database connection attempt {}/{} failed: {}. Retrying in {:?}",
                    attempt, max_attempts, e, delay
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
        }
    }
}

async fn try_connect(config: &DbConfig) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await
        .context("Failed to create database pool")
}

async fn health_check(pool: &PgPool) -> Result<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .context("Database health check failed")?;
    Ok(())
}
