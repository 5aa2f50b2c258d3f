//! API error types and responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use fasttrack_core::FastTrackError;

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad request - invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Conflict - the rows changed since the caller read them.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Duplicate - a unique field is already taken.
    #[error("duplicate: {0}")]
    Duplicate(String),

    /// The trip's status forbids the operation.
    #[error("{message}")]
    InvalidState {
        /// Human readable description.
        message: String,
        /// Trip, status and operation involved.
        details: serde_json::Value,
    },

    /// Internal server error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, details) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            Self::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            Self::Duplicate(msg) => (StatusCode::CONFLICT, "duplicate", msg, None),
            Self::InvalidState { message, details } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "invalid_state",
                message,
                Some(details),
            ),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "Internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message,
                details,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<FastTrackError> for ApiError {
    fn from(err: FastTrackError) -> Self {
        let message = err.to_string();
        match err {
            FastTrackError::Validation(msg) => Self::BadRequest(msg),
            FastTrackError::NotFound { .. } => Self::NotFound(message),
            FastTrackError::Conflict(msg) => Self::Conflict(msg),
            FastTrackError::Duplicate { .. } => Self::Duplicate(message),
            FastTrackError::InvalidState {
                trip_id,
                status,
                operation,
            } => Self::InvalidState {
                message,
                details: serde_json::json!({
                    "trip_id": trip_id,
                    "status": status,
                    "operation": operation,
                }),
            },
            FastTrackError::Persistence(msg) => Self::Internal(msg),
        }
    }
}
