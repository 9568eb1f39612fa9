//! Validator that returns a preset verdict.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::verdict::{ReportInput, ReportValidator, Verdict};

/// Returns the same verdict for every report and counts calls.
///
/// Useful for testing the review flow without any network access.
#[derive(Debug)]
pub struct FixedValidator {
    verdict: Verdict,
    calls: AtomicUsize,
}

impl FixedValidator {
    pub fn new(verdict: Verdict) -> Self {
        Self {
            verdict,
            calls: AtomicUsize::new(0),
        }
    }

    /// A validator that accepts every report with the given severity.
    pub fn accepting(severity: &str) -> Self {
        Self::new(Verdict {
            is_valid: true,
            severity: Some(severity.to_string()),
            reason: "Looks like a genuine incident".to_string(),
        })
    }

    /// Number of reports validated so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportValidator for FixedValidator {
    async fn validate(&self, _input: &ReportInput) -> Verdict {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.verdict.clone()
    }

    fn name(&self) -> &str {
        "FixedValidator"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fixed_validator_counts_calls() {
        let validator = FixedValidator::accepting("High");
        let verdict = validator.validate(&ReportInput::default()).await;
        validator.validate(&ReportInput::default()).await;

        assert_eq!(verdict.severity.as_deref(), Some("High"));
        assert_eq!(validator.calls(), 2);
        assert_eq!(validator.name(), "FixedValidator");
    }
}
