use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Instant;

use crate::accuracy::{AccuracyReport, ComparisonStatus};

/// Envelope around every successful accuracy payload
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub generated_at: DateTime<Utc>,
    pub summary: ReportSummary,
}

/// Headline counts so a dashboard can flag empty comparisons without
/// walking the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub comparisons: usize,
    pub evaluated: usize,
    pub empty_input: usize,
    pub elapsed_ms: u64,
}

impl ReportSummary {
    pub fn of(report: &AccuracyReport, started: Instant) -> Self {
        let evaluated = report
            .comparisons
            .iter()
            .filter(|c| c.status == ComparisonStatus::Evaluated)
            .count();
        Self {
            comparisons: report.len(),
            evaluated,
            empty_input: report.len() - evaluated,
            elapsed_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, summary: ReportSummary) -> Self {
        Self {
            success: true,
            data,
            generated_at: Utc::now(),
            summary,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
