//! Application Error Types
//!
//! Centralized error handling with Axum integration.

use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

static EXPOSE_DETAILS: AtomicBool = AtomicBool::new(false);

/// Toggle whether 5xx responses carry the underlying error text.
///
/// Only enabled in the development environment.
pub fn set_expose_details(enabled: bool) {
    EXPOSE_DETAILS.store(enabled, Ordering::Relaxed);
}

fn expose_details() -> bool {
    EXPOSE_DETAILS.load(Ordering::Relaxed)
}

/// Application error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Field-level validation error
#[derive(Debug, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl AppError {
    /// HTTP status this error maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) | AppError::Database(_) | AppError::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message, details) = match &self {
            AppError::NotFound(msg) => (10001, msg.clone(), None),
            AppError::BadRequest(msg) => (10002, msg.clone(), None),
            AppError::Unauthorized(msg) => (10003, msg.clone(), None),
            AppError::Forbidden(msg) => (10004, msg.clone(), None),
            AppError::Conflict(msg) => (10005, msg.clone(), None),
            AppError::Validation(msg) => (10007, msg.clone(), None),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (10000, "Internal server error".into(), Some(msg.clone()))
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (10000, "Internal server error".into(), Some(e.to_string()))
            }
            AppError::Io(e) => {
                tracing::error!("I/O error: {}", e);
                (10000, "Internal server error".into(), Some(e.to_string()))
            }
        };

        let body = ErrorResponse {
            code,
            message,
            errors: None,
            details: details.filter(|_| expose_details()),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(AppError::NotFound("x".into()), StatusCode::NOT_FOUND)]
    #[test_case(AppError::Validation("x".into()), StatusCode::BAD_REQUEST)]
    #[test_case(AppError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED)]
    #[test_case(AppError::Forbidden("x".into()), StatusCode::FORBIDDEN)]
    #[test_case(AppError::Conflict("x".into()), StatusCode::CONFLICT)]
    #[test_case(AppError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR)]
    fn maps_to_status(error: AppError, expected: StatusCode) {
        assert_eq!(error.into_response().status(), expected);
    }
}
