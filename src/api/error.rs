//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::klaviyo::KlaviyoError;
use crate::report::ReportError;

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or wrong access key
    #[error("Unauthorized")]
    Unauthorized,

    /// Report could not be built
    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    /// Direct Klaviyo call failed
    #[error("Klaviyo error: {0}")]
    Upstream(#[from] KlaviyoError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Report(e) => match e {
                ReportError::MetricNotFound(_) => (StatusCode::NOT_FOUND, "METRIC_NOT_FOUND"),
                ReportError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
                ReportError::MeasurementDecode(_) | ReportError::EmptyResult(_) => {
                    (StatusCode::BAD_GATEWAY, "BAD_UPSTREAM_RESPONSE")
                }
                ReportError::InvalidWindow => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR")
                }
            },
            ApiError::Upstream(KlaviyoError::Api { status: 404, .. }) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            }
            ApiError::Upstream(KlaviyoError::EmptyBody { .. }) => {
                (StatusCode::BAD_GATEWAY, "BAD_UPSTREAM_RESPONSE")
            }
            ApiError::Upstream(_) => (StatusCode::BAD_GATEWAY, "UPSTREAM_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let request_id = uuid::Uuid::new_v4().to_string();

        tracing::error!(
            request_id = %request_id,
            error_code = %code,
            error_message = %self,
            "API error occurred"
        );

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (
                ApiError::Report(ReportError::MetricNotFound("Placed Order".into())),
                StatusCode::NOT_FOUND,
                "METRIC_NOT_FOUND",
            ),
            (
                ApiError::Report(ReportError::Upstream(KlaviyoError::Timeout)),
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
            ),
            (
                ApiError::Report(ReportError::MeasurementDecode("bad".into())),
                StatusCode::BAD_GATEWAY,
                "BAD_UPSTREAM_RESPONSE",
            ),
            (
                ApiError::Upstream(KlaviyoError::Api {
                    status: 404,
                    message: String::new(),
                }),
                StatusCode::NOT_FOUND,
                "NOT_FOUND",
            ),
            (ApiError::Unauthorized, StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.status_and_code(), (status, code));
        }
    }
}
