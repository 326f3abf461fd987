// src/error.rs

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::fmt;

/// Global Application Error Enum.
/// Centralizes error handling and mapping to HTTP responses.
///
/// Only `BankUnavailable` is expected to reach clients as a failure: every
/// other degraded condition (remote generation down, malformed bank rows,
/// missing explanations) is absorbed with a substitute value before it
/// leaves the handlers.
#[derive(Debug)]
pub enum AppError {
    // 503 Service Unavailable: a configured question bank cannot be read,
    // so the daily pool cannot be built at all.
    BankUnavailable(String),

    // Remote question generation failed (missing credential, network,
    // non-2xx, timeout, or unparseable output). Recovered internally via
    // the fallback question set; mapped to 502 in case it ever leaks.
    RemoteGenerationFailed(String),

    // 500 Internal Server Error
    InternalServerError(String),

    // 400 Bad Request
    BadRequest(String),

    // 404 Not Found
    NotFound(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl std::error::Error for AppError {}

/// Implements `IntoResponse` for `AppError`.
/// Converts the error into a JSON response with appropriate HTTP status code.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::BankUnavailable(msg) => {
                tracing::error!("Question bank unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Question bank unavailable".to_string(),
                )
            }
            AppError::RemoteGenerationFailed(msg) => {
                tracing::error!("Remote generation failed: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Question generation failed".to_string(),
                )
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

/// Converts `sqlx::Error` into `AppError::InternalServerError`.
/// Allows using `?` operator on database queries.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::InternalServerError(err.to_string())
    }
}
