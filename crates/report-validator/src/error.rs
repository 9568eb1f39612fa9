//! Error types for the validation adapter.

use thiserror::Error;

use crate::verdict::{REASON_API_ERROR, REASON_PARSE_ERROR, REASON_TRANSPORT_ERROR, REASON_UNAVAILABLE};

/// Errors raised while talking to the completions API.
///
/// These never reach callers of [`ReportValidator::validate`](crate::ReportValidator);
/// each one maps to a fallback verdict reason.
#[derive(Debug, Error)]
pub enum ValidatorError {
    /// No API key configured.
    #[error("validator not configured: {0}")]
    Configuration(String),

    /// Request could not be sent or the body could not be read.
    #[error("network error: {0}")]
    Network(String),

    /// The API answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The model output was not a verdict.
    #[error("failed to parse verdict: {0}")]
    Parse(String),
}

impl ValidatorError {
    /// Reason text recorded on the fallback verdict.
    pub fn fallback_reason(&self) -> &'static str {
        match self {
            ValidatorError::Configuration(_) => REASON_UNAVAILABLE,
            ValidatorError::Api { .. } => REASON_API_ERROR,
            ValidatorError::Parse(_) => REASON_PARSE_ERROR,
            ValidatorError::Network(_) => REASON_TRANSPORT_ERROR,
        }
    }
}
