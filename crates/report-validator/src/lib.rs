//! AI-assisted validation of incident reports.
//!
//! This crate asks an OpenAI-compatible chat-completions API whether a
//! submitted report is a plausible environmental incident and which
//! severity tier it belongs to. The result is a [`Verdict`], which is
//! advisory only: admins make the final call.
//!
//! Validation never fails from the caller's point of view. When the API key
//! is missing, the API errors, or the model output cannot be parsed, the
//! validator returns a fallback verdict with `is_valid = true` and a reason
//! asking for manual review.
//!
//! # Example
//!
//! ```rust,no_run
//! use report_validator::{LlmValidator, ReportInput, ReportValidator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let validator = LlmValidator::from_env()?;
//!     let verdict = validator
//!         .validate(&ReportInput {
//!             title: "Mangrove cutting near jetty".to_string(),
//!             description: "Fresh stumps along the creek".to_string(),
//!             incident_type: "Illegal Cutting".to_string(),
//!             location: "Sundarbans".to_string(),
//!             ..Default::default()
//!         })
//!         .await;
//!     println!("{:?}", verdict);
//!     Ok(())
//! }
//! ```

mod api_types;
mod config;
mod error;
mod fixed;
mod llm;
mod verdict;

pub use config::ValidatorConfig;
pub use error::ValidatorError;
pub use fixed::FixedValidator;
pub use llm::LlmValidator;
pub use verdict::{
    ReportInput, ReportValidator, Verdict, DEFAULT_REASON, DEFAULT_SEVERITY, REASON_API_ERROR,
    REASON_PARSE_ERROR, REASON_TRANSPORT_ERROR, REASON_UNAVAILABLE,
};

// Re-export async_trait for implementors
pub use async_trait::async_trait;
