//! Error handling for the custom metric provider
//!
//! Error bodies keep the `{"detail": ...}` shape OpenScale expects from a
//! custom metric provider, with a machine readable `code` alongside.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use shared::ModelError;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Request errors
    #[error("Invalid JSON payload.")]
    InvalidJson,

    #[error("{0}")]
    Validation(String),

    // Upstream errors
    #[error("IAM authentication failed: {0}")]
    Authentication(String),

    #[error("Invalid subscription payload structure")]
    InvalidSubscription,

    #[error("OpenScale API error: {0}")]
    OpenScale(String),

    #[error("Governance evaluator error: {0}")]
    Governance(String),

    // Pipeline errors
    #[error("Custom evaluator execution failed: {0}")]
    Evaluation(String),

    #[error("Failed to store metrics data: {0}")]
    MetricStorage(String),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::InvalidJson => AppError::InvalidJson,
            ModelError::InvalidRequest(msg) => AppError::Validation(msg),
            ModelError::InvalidSubscription => AppError::InvalidSubscription,
        }
    }
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub detail: String,
    pub code: &'static str,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidJson | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::InvalidJson => "INVALID_JSON",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Authentication(_) => "AUTHENTICATION_ERROR",
            AppError::InvalidSubscription => "INVALID_SUBSCRIPTION",
            AppError::OpenScale(_) => "OPENSCALE_ERROR",
            AppError::Governance(_) => "GOVERNANCE_ERROR",
            AppError::Evaluation(_) => "EVALUATION_ERROR",
            AppError::MetricStorage(_) => "METRIC_STORAGE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::warn!("Rejected request: {}", self);
        }

        let body = ErrorResponse {
            detail: self.to_string(),
            code: self.code(),
        };

        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_errors_are_bad_request() {
        assert_eq!(AppError::InvalidJson.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_upstream_errors_are_internal() {
        for err in [
            AppError::OpenScale("down".into()),
            AppError::Evaluation("boom".into()),
            AppError::MetricStorage("nope".into()),
        ] {
            assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        }
    }

    #[test]
    fn test_model_error_conversion() {
        let err: AppError = ModelError::InvalidRequest("bad input".into()).into();
        assert_eq!(err.to_string(), "bad input");
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let err: AppError = ModelError::InvalidJson.into();
        assert_eq!(err.to_string(), "Invalid JSON payload.");
    }
}
