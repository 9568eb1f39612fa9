//! Input validation for user-submitted fields.

use std::fmt;

/// Validation error types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid email format.
    InvalidEmail(String),
    /// Password does not meet the length policy.
    WeakPassword { min: usize },
    /// Value too long.
    TooLong { field: String, max: usize, actual: usize },
    /// Empty value where one is required.
    Empty(String),
    /// Numeric value outside its allowed range.
    OutOfRange { field: String, reason: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
            ValidationError::WeakPassword { min } => {
                write!(f, "password must be at least {} characters", min)
            }
            ValidationError::TooLong { field, max, actual } => {
                write!(f, "{} is too long ({} chars, max {})", field, actual, max)
            }
            ValidationError::Empty(field) => write!(f, "{} cannot be empty", field),
            ValidationError::OutOfRange { field, reason } => write!(f, "{} {}", field, reason),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Maximum allowed length for email addresses.
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum length for short text fields (titles, names, locations).
pub const MAX_SHORT_TEXT: usize = 200;

/// Maximum length for report descriptions.
pub const MAX_DESCRIPTION_LENGTH: usize = 5000;

/// Maximum number of evidence references on one report.
pub const MAX_EVIDENCE_ITEMS: usize = 10;

/// Largest single coin award.
pub const MAX_COIN_AWARD: i64 = 10_000;

/// Validate an email address (basic local@domain.tld check).
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Empty("email".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: MAX_EMAIL_LENGTH,
            actual: email.len(),
        });
    }

    let (local, domain) = match email.split_once('@') {
        Some(parts) if !parts.1.contains('@') => parts,
        _ => {
            return Err(ValidationError::InvalidEmail(
                "must contain exactly one @ symbol".to_string(),
            ))
        }
    };

    if local.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "missing local part (before @)".to_string(),
        ));
    }

    if domain.is_empty() || !domain.contains('.') {
        return Err(ValidationError::InvalidEmail(
            "domain must contain at least one dot".to_string(),
        ));
    }

    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return Err(ValidationError::InvalidEmail(
            "malformed domain".to_string(),
        ));
    }

    Ok(())
}

/// Validate a password against the length policy.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::WeakPassword {
            min: MIN_PASSWORD_LENGTH,
        });
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::TooLong {
            field: "password".to_string(),
            max: MAX_PASSWORD_LENGTH,
            actual: len,
        });
    }
    Ok(())
}

/// Validate a required text field, returning the trimmed value.
pub fn require_text<'a>(field: &str, value: &'a str, max: usize) -> Result<&'a str, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::Empty(field.to_string()));
    }
    check_length(field, value, max)?;
    Ok(value)
}

/// Validate the length of an optional text field.
pub fn check_length(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
            actual: len,
        });
    }
    Ok(())
}

/// Validate an optional latitude/longitude pair.
///
/// Either both or neither must be present.
pub fn validate_coordinates(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<(), ValidationError> {
    match (latitude, longitude) {
        (None, None) => Ok(()),
        (Some(lat), Some(lng)) => {
            if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
                return Err(ValidationError::OutOfRange {
                    field: "latitude".to_string(),
                    reason: "must be between -90 and 90".to_string(),
                });
            }
            if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
                return Err(ValidationError::OutOfRange {
                    field: "longitude".to_string(),
                    reason: "must be between -180 and 180".to_string(),
                });
            }
            Ok(())
        }
        _ => Err(ValidationError::OutOfRange {
            field: "coordinates".to_string(),
            reason: "require both latitude and longitude".to_string(),
        }),
    }
}

/// Validate a course progress percentage.
pub fn validate_progress(progress: i64) -> Result<(), ValidationError> {
    if !(0..=100).contains(&progress) {
        return Err(ValidationError::OutOfRange {
            field: "progress".to_string(),
            reason: "must be between 0 and 100".to_string(),
        });
    }
    Ok(())
}

/// Validate a quiz result.
pub fn validate_quiz_score(score: i64, total_questions: i64) -> Result<(), ValidationError> {
    if total_questions <= 0 {
        return Err(ValidationError::OutOfRange {
            field: "total_questions".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if score < 0 || score > total_questions {
        return Err(ValidationError::OutOfRange {
            field: "score".to_string(),
            reason: format!("must be between 0 and {}", total_questions),
        });
    }
    Ok(())
}

/// Validate a coin credit amount.
pub fn validate_coin_amount(amount: i64) -> Result<(), ValidationError> {
    if amount <= 0 || amount > MAX_COIN_AWARD {
        return Err(ValidationError::OutOfRange {
            field: "amount".to_string(),
            reason: format!("must be between 1 and {}", MAX_COIN_AWARD),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("guardian@example.org").is_ok());
        assert!(validate_email(" a@b.co ").is_ok());

        assert!(matches!(validate_email(""), Err(ValidationError::Empty(_))));
        assert!(matches!(
            validate_email("no-at.example.com"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("a@b@c.com"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("@example.com"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("user@localhost"),
            Err(ValidationError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_email("user@example..com"),
            Err(ValidationError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("mangroves1").is_ok());
        assert_eq!(
            validate_password("short"),
            Err(ValidationError::WeakPassword { min: 8 })
        );
        assert!(matches!(
            validate_password(&"x".repeat(200)),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_require_text_trims() {
        assert_eq!(require_text("title", "  Oil spill ", 50), Ok("Oil spill"));
        assert!(matches!(
            require_text("title", "   ", 50),
            Err(ValidationError::Empty(_))
        ));
        assert!(matches!(
            require_text("title", "abcdef", 3),
            Err(ValidationError::TooLong { .. })
        ));
    }

    #[test]
    fn test_validate_coordinates() {
        assert!(validate_coordinates(None, None).is_ok());
        assert!(validate_coordinates(Some(21.95), Some(88.9)).is_ok());
        assert!(validate_coordinates(Some(91.0), Some(0.0)).is_err());
        assert!(validate_coordinates(Some(0.0), Some(-181.0)).is_err());
        assert!(validate_coordinates(Some(10.0), None).is_err());
        assert!(validate_coordinates(Some(f64::NAN), Some(0.0)).is_err());
    }

    #[test]
    fn test_validate_progress_and_quiz() {
        assert!(validate_progress(0).is_ok());
        assert!(validate_progress(100).is_ok());
        assert!(validate_progress(101).is_err());
        assert!(validate_progress(-1).is_err());

        assert!(validate_quiz_score(7, 10).is_ok());
        assert!(validate_quiz_score(11, 10).is_err());
        assert!(validate_quiz_score(0, 0).is_err());
    }

    #[test]
    fn test_validate_coin_amount() {
        assert!(validate_coin_amount(50).is_ok());
        assert!(validate_coin_amount(0).is_err());
        assert!(validate_coin_amount(-5).is_err());
        assert!(validate_coin_amount(MAX_COIN_AWARD + 1).is_err());
    }

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::TooLong {
            field: "title".to_string(),
            max: 200,
            actual: 300,
        };
        assert_eq!(err.to_string(), "title is too long (300 chars, max 200)");

        let err = ValidationError::OutOfRange {
            field: "progress".to_string(),
            reason: "must be between 0 and 100".to_string(),
        };
        assert_eq!(err.to_string(), "progress must be between 0 and 100");
    }
}
