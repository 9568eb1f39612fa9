//! Error types for the HTTP API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DatabaseError;
use thiserror::Error;

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Database error.
    #[error("{0}")]
    Database(#[from] DatabaseError),

    /// Missing or expired session.
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated but not allowed.
    #[error("{0}")]
    Forbidden(String),

    /// Malformed request.
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Database(err) => match err {
                DatabaseError::NotFound { .. } | DatabaseError::MissingReference { .. } => {
                    StatusCode::NOT_FOUND
                }
                DatabaseError::AlreadyExists { .. }
                | DatabaseError::Conflict(_)
                | DatabaseError::Unavailable { .. } => StatusCode::CONFLICT,
                DatabaseError::InsufficientBalance { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                DatabaseError::Invalid(_) => StatusCode::BAD_REQUEST,
                DatabaseError::Sqlx(_) | DatabaseError::Migration(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Storage details stay in the log
        let message = if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            "Internal server error".to_string()
        } else {
            tracing::warn!("Request rejected ({}): {}", status.as_u16(), self);
            self.to_string()
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
