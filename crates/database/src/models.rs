//! Database models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Incident impact tier.
///
/// `Pending` is the placeholder written at submission time; an admin or the
/// AI validator replaces it during review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum Severity {
    Pending,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Stored text value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Pending => "Pending",
            Severity::Low => "Low",
            Severity::Medium => "Medium",
            Severity::High => "High",
            Severity::Critical => "Critical",
        }
    }

    /// Parse a severity case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(Severity::Pending),
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }

    /// Whether a real tier has been assigned.
    pub fn is_assessed(&self) -> bool {
        !matches!(self, Severity::Pending)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Severity::parse(s).ok_or_else(|| format!("unknown severity: {}", s))
    }
}

/// Report lifecycle state.
///
/// One vocabulary for both review styles: admin approve/reject and the
/// investigate/resolve/dismiss workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
pub enum ReportStatus {
    Pending,
    Investigating,
    Approved,
    Rejected,
    Resolved,
    Dismissed,
}

impl ReportStatus {
    /// Stored text value.
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pending => "Pending",
            ReportStatus::Investigating => "Investigating",
            ReportStatus::Approved => "Approved",
            ReportStatus::Rejected => "Rejected",
            ReportStatus::Resolved => "Resolved",
            ReportStatus::Dismissed => "Dismissed",
        }
    }

    /// Parse a status case-insensitively, accepting legacy spellings.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Some(ReportStatus::Pending),
            "investigating" => Some(ReportStatus::Investigating),
            "approved" | "verified" => Some(ReportStatus::Approved),
            "rejected" => Some(ReportStatus::Rejected),
            "resolved" => Some(ReportStatus::Resolved),
            "dismissed" => Some(ReportStatus::Dismissed),
            _ => None,
        }
    }

    /// Whether a report in this state may move to `next`.
    pub fn can_transition_to(&self, next: ReportStatus) -> bool {
        use ReportStatus::*;
        matches!(
            (self, next),
            (Pending, Investigating)
                | (Pending, Approved)
                | (Pending, Rejected)
                | (Pending, Dismissed)
                | (Investigating, Approved)
                | (Investigating, Rejected)
                | (Investigating, Dismissed)
                | (Approved, Resolved)
        )
    }

    /// Whether the report is still awaiting a review decision.
    pub fn is_open(&self) -> bool {
        matches!(self, ReportStatus::Pending | ReportStatus::Investigating)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportStatus::parse(s).ok_or_else(|| format!("unknown report status: {}", s))
    }
}

/// Admin application state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

/// Course and quiz difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Login credentials for a user.
#[derive(Debug, Clone, FromRow)]
pub struct Account {
    /// User ID (UUID).
    pub id: String,
    /// Lowercased email address.
    pub email: String,
    /// Hex SHA-256 of salt + password.
    pub password_hash: String,
    /// Hex salt.
    pub password_salt: String,
    pub created_at: String,
}

/// A bearer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    /// Unix seconds.
    pub expires_at: i64,
    pub created_at: String,
}

/// Public profile, one per user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub country: Option<String>,
    /// Leaderboard points.
    pub points: i64,
    pub rank: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

/// An environmental incident report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Report {
    pub id: String,
    /// Submitting user.
    pub user_id: String,
    pub title: String,
    pub description: Option<String>,
    /// Free-form incident category (e.g. "Illegal Cutting").
    pub incident_type: String,
    pub severity: Severity,
    pub status: ReportStatus,
    pub location: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Evidence file names or URLs.
    pub evidence_urls: Json<Vec<String>>,
    pub created_at: String,
    pub updated_at: String,
}

/// A report joined with its reporter's display name.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ReportWithReporter {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub report: Report,
    pub reporter_name: Option<String>,
}

/// Latest advisory AI verdict for a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct StoredVerdict {
    pub report_id: String,
    pub is_valid: bool,
    pub severity: Option<Severity>,
    pub reason: String,
    /// Stand-in written when the validator could not be reached; the report
    /// is validated again on the next review.
    pub is_fallback: bool,
    pub validated_at: String,
}

/// Guardian Coin balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CoinBalance {
    pub id: String,
    pub user_id: String,
    pub balance: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// A single credit (positive) or debit (negative).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct LedgerEntry {
    pub id: i64,
    pub user_id: String,
    pub amount: i64,
    pub reason: String,
    pub created_at: String,
}

/// Rewards catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Reward {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub cost_in_coins: i64,
    /// e.g. "lifestyle", "environmental", "merchandise", "education".
    pub category: String,
    pub image_url: Option<String>,
    /// Remaining stock; `None` means unlimited.
    pub stock_quantity: Option<i64>,
    pub is_active: bool,
    pub created_at: String,
}

/// Redemption record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserReward {
    pub id: String,
    pub user_id: String,
    pub reward_id: String,
    pub coins_spent: i64,
    pub status: String,
    pub purchase_date: String,
}

/// Administrative role and its verification state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AdminRole {
    pub id: String,
    pub user_id: String,
    pub organization_name: String,
    /// e.g. "ngo", "government", "research".
    pub organization_type: String,
    pub verification_status: VerificationStatus,
    pub is_super_admin: bool,
    pub approved_at: Option<String>,
    pub approved_by: Option<String>,
    pub created_at: String,
}

/// Admin role joined with the holder's display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct AdminRoleWithName {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub role: AdminRole,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Difficulty,
    pub duration: Option<String>,
    pub lessons: i64,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub difficulty: Difficulty,
    pub questions: i64,
    /// Minutes.
    pub time_limit: Option<i64>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Guide {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: String,
    pub content: Option<String>,
    pub image_url: Option<String>,
    pub created_at: String,
}

/// Per-user course completion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct CourseProgress {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    /// Percentage, 0-100.
    pub progress: i64,
    pub completed: bool,
    pub completed_at: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct QuizScore {
    pub id: String,
    pub user_id: String,
    pub quiz_id: String,
    pub score: i64,
    pub total_questions: i64,
    pub completed_at: String,
}

/// A badge and the user's progress toward it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Achievement {
    pub id: String,
    pub user_id: String,
    pub title: String,
    pub description: String,
    /// "reports", "points" or "verification".
    pub badge_type: String,
    pub target: i64,
    pub progress: f64,
    pub earned: bool,
    pub earned_at: Option<String>,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_parse() {
        assert_eq!(Severity::parse("high"), Some(Severity::High));
        assert_eq!(Severity::parse(" Critical "), Some(Severity::Critical));
        assert_eq!(Severity::parse("urgent"), None);
        assert!(!Severity::Pending.is_assessed());
        assert!(Severity::Low.is_assessed());
    }

    #[test]
    fn test_status_parse_accepts_legacy_values() {
        assert_eq!(ReportStatus::parse("verified"), Some(ReportStatus::Approved));
        assert_eq!(ReportStatus::parse("PENDING"), Some(ReportStatus::Pending));
        assert_eq!(ReportStatus::parse("all"), None);
    }

    #[test]
    fn test_status_transitions() {
        use ReportStatus::*;
        assert!(Pending.can_transition_to(Approved));
        assert!(Pending.can_transition_to(Rejected));
        assert!(Pending.can_transition_to(Investigating));
        assert!(Investigating.can_transition_to(Approved));
        assert!(Approved.can_transition_to(Resolved));

        assert!(!Approved.can_transition_to(Approved));
        assert!(!Approved.can_transition_to(Rejected));
        assert!(!Rejected.can_transition_to(Approved));
        assert!(!Resolved.can_transition_to(Pending));
        assert!(!Pending.can_transition_to(Resolved));
    }

    #[test]
    fn test_display_matches_stored_text() {
        assert_eq!(ReportStatus::Investigating.to_string(), "Investigating");
        assert_eq!(Severity::Medium.to_string(), "Medium");
        assert_eq!("low".parse::<Severity>(), Ok(Severity::Low));
    }
}
