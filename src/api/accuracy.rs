use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use validator::Validate;

use crate::{
    accuracy::{AccuracyReport, ComparisonInput, SeriesInput},
    api::{
        error::ApiError,
        response::{ApiResponse, ReportSummary},
    },
    domain::{AggregationPolicy, RawSample},
    service::OutlookReport,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct AccuracyQuery {
    /// First day of the window; defaults to today in the market zone
    pub start: Option<NaiveDate>,
    /// Forecast run; defaults to the latest one
    pub scenario_id: Option<i64>,
}

/// GET /api/v1/accuracy - catalog comparisons for a scenario and window
pub async fn get_accuracy(
    State(state): State<AppState>,
    Query(q): Query<AccuracyQuery>,
) -> Result<ApiResponse<OutlookReport>, ApiError> {
    let started = Instant::now();
    let start = q.start.unwrap_or_else(|| state.today());

    let report = state.service.accuracy_report(q.scenario_id, start).await?;
    let summary = ReportSummary::of(&report.report, started);
    Ok(ApiResponse::success(report, summary))
}

/// GET /api/v1/accuracy/:name - one catalog comparison
pub async fn get_comparison(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(q): Query<AccuracyQuery>,
) -> Result<ApiResponse<OutlookReport>, ApiError> {
    let started = Instant::now();
    let start = q.start.unwrap_or_else(|| state.today());

    let report = state
        .service
        .comparison_report(&name, q.scenario_id, start)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("comparison '{name}'")))?;

    let summary = ReportSummary::of(&report.report, started);
    Ok(ApiResponse::success(report, summary))
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct EvaluateRequest {
    /// Zone applied to series that do not name one
    #[serde(default)]
    pub zone: Option<Tz>,
    #[validate(length(min = 1, max = 64), nested)]
    pub comparisons: Vec<ComparisonRequest>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct ComparisonRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(nested)]
    pub forecast: SeriesRequest,
    #[validate(nested)]
    pub actual: SeriesRequest,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SeriesRequest {
    #[validate(length(min = 1))]
    pub name: String,
    pub policy: AggregationPolicy,
    #[serde(default)]
    pub zone: Option<Tz>,
    #[serde(default)]
    pub samples: Vec<RawSample>,
}

impl SeriesRequest {
    fn into_input(self, fallback_zone: Tz) -> Result<SeriesInput, ApiError> {
        let zone = self.zone.unwrap_or(fallback_zone);
        Ok(SeriesInput::new(self.name, self.policy, zone, self.samples)?)
    }
}

/// POST /api/v1/accuracy/evaluate - evaluate caller-supplied series
pub async fn evaluate(
    State(state): State<AppState>,
    Json(req): Json<EvaluateRequest>,
) -> Result<ApiResponse<AccuracyReport>, ApiError> {
    let started = Instant::now();
    req.validate()?;

    let zone = req.zone.unwrap_or(state.service.default_zone());
    let inputs = req
        .comparisons
        .into_iter()
        .map(|c| {
            Ok(ComparisonInput::new(
                c.name,
                c.forecast.into_input(zone)?,
                c.actual.into_input(zone)?,
            ))
        })
        .collect::<Result<Vec<_>, ApiError>>()?;

    let report = AccuracyReport::build(inputs)?;
    let summary = ReportSummary::of(&report, started);
    Ok(ApiResponse::success(report, summary))
}
