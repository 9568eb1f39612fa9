//! Error types for location lookups.

use thiserror::Error;

/// Errors from the location API.
#[derive(Debug, Error)]
pub enum GeoError {
    /// No API key configured.
    #[error("location API key not configured")]
    NotConfigured,

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status.
    #[error("location API returned status {0}")]
    HttpStatus(u16),

    /// The service answered with a status other than `OK`.
    #[error("location API status: {0}")]
    ApiStatus(String),

    /// Invalid input (e.g. empty query).
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
