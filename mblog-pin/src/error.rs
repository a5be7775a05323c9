//! Error types for mblog-pin

use crate::services::PinError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Pinning service failed or rejected the upload (502)
    #[error("Upstream error: {0}")]
    Upstream(#[from] PinError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Upstream(ref err) => {
                let code = match err {
                    PinError::Unauthorized(_) => "UPSTREAM_UNAUTHORIZED",
                    PinError::NetworkError(_) => "UPSTREAM_UNREACHABLE",
                    _ => "UPSTREAM_ERROR",
                };
                (StatusCode::BAD_GATEWAY, code, err.to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
