//! Verdict types and the validator trait.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Reason used when no API key is configured.
pub const REASON_UNAVAILABLE: &str = "AI validation unavailable - manual review required";

/// Reason used when the API returns a non-success status.
pub const REASON_API_ERROR: &str = "AI validation error - manual review required";

/// Reason used when the model output cannot be parsed.
pub const REASON_PARSE_ERROR: &str = "AI validation parse error - manual review required";

/// Reason used when the request itself fails.
pub const REASON_TRANSPORT_ERROR: &str = "Validation error - manual review required";

const FALLBACK_REASONS: [&str; 4] = [
    REASON_UNAVAILABLE,
    REASON_API_ERROR,
    REASON_PARSE_ERROR,
    REASON_TRANSPORT_ERROR,
];

/// Severity filled in when a parsed verdict omits it.
pub const DEFAULT_SEVERITY: &str = "Medium";

/// Reason filled in when a parsed verdict omits it.
pub const DEFAULT_REASON: &str = "AI validation completed";

/// Report fields sent for validation.
///
/// Severity and coordinates are accepted for completeness but are not part
/// of the prompt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub incident_type: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

/// Advisory validation result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verdict {
    pub is_valid: bool,
    /// Suggested tier as returned by the model ("Low", "Medium", ...).
    /// Absent on fallback verdicts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    pub reason: String,
}

impl Verdict {
    /// A verdict that passes the report on for manual review.
    pub fn fallback(reason: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            severity: None,
            reason: reason.into(),
        }
    }

    /// Whether this verdict stands in for a failed validation.
    ///
    /// Parsed verdicts always carry a severity, so a missing severity with
    /// one of the fallback reasons means the model was never consulted.
    pub fn is_fallback(&self) -> bool {
        self.severity.is_none() && FALLBACK_REASONS.contains(&self.reason.as_str())
    }
}

/// Something that can judge a report.
///
/// Implementations must always produce a verdict; internal failures become
/// fallback verdicts.
#[async_trait]
pub trait ReportValidator: Send + Sync {
    /// Validate a report.
    async fn validate(&self, input: &ReportInput) -> Verdict;

    /// Human-readable name for logs.
    fn name(&self) -> &str;
}
