use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::accuracy::AccuracyError;

/// Failures a handler can report to the caller
#[derive(Debug, Error)]
pub enum ApiError {
    /// Unknown catalog comparison
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Request body failed field validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Well-formed request the engine cannot evaluate (mixed conventions,
    /// duplicate comparison names)
    #[error("Unprocessable input: {0}")]
    Unprocessable(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unprocessable(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) | ApiError::DatabaseError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_type(&self) -> &'static str {
        match self {
            ApiError::NotFound(_) => "NotFound",
            ApiError::ValidationError(_) => "ValidationError",
            ApiError::Unprocessable(_) => "Unprocessable",
            ApiError::InternalError(_) => "InternalServerError",
            ApiError::DatabaseError(_) => "DatabaseError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Source and pool failures stay in the logs
        let message = match &self {
            ApiError::InternalError(_) | ApiError::DatabaseError(_) => {
                tracing::error!(error = %self, "accuracy request failed");
                "An internal error occurred".to_string()
            }
            _ => {
                tracing::debug!(error = %self, "rejected accuracy request");
                self.to_string()
            }
        };

        let body = ErrorBody {
            error: self.error_type(),
            message,
        };
        (self.status_code(), Json(body)).into_response()
    }
}

impl From<AccuracyError> for ApiError {
    fn from(error: AccuracyError) -> Self {
        ApiError::Unprocessable(error.to_string())
    }
}

#[cfg(feature = "db")]
impl From<sqlx::Error> for ApiError {
    fn from(error: sqlx::Error) -> Self {
        ApiError::DatabaseError(error.to_string())
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(error: anyhow::Error) -> Self {
        if let Some(accuracy) = error.downcast_ref::<AccuracyError>() {
            return accuracy.clone().into();
        }
        #[cfg(feature = "db")]
        if error.downcast_ref::<sqlx::Error>().is_some() {
            return ApiError::DatabaseError(format!("{error:#}"));
        }
        ApiError::InternalError(format!("{error:#}"))
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors.to_string())
    }
}
