use axum::{
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use crate::api::{accuracy, health};
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/accuracy", get(accuracy::get_accuracy))
        .route("/accuracy/evaluate", post(accuracy::evaluate))
        .route("/accuracy/:name", get(accuracy::get_comparison))
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/healthz", get(healthz))
        .with_state(state)
}

pub async fn healthz() -> impl IntoResponse {
    StatusCode::OK
}
