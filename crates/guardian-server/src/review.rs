//! Admin review of incident reports.
//!
//! Approval and rejection consult the advisory AI verdict for severity, then
//! apply the status change conditionally. Approval also pays the reporter
//! once: coins (with a ledger row) and the same number of leaderboard points,
//! all in one transaction with the status change.

use database::{coins, profile, report, verdict, Report, ReportStatus, Severity, StoredVerdict};
use report_validator::ReportInput;
use serde::Serialize;
use tracing::info;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Result of a review action.
#[derive(Debug, Clone, Serialize)]
pub struct ReviewOutcome {
    pub report: Report,
    pub verdict: Option<StoredVerdict>,
    pub coins_awarded: i64,
}

/// Validator input for a stored report.
pub fn report_input(report: &Report) -> ReportInput {
    ReportInput {
        title: report.title.clone(),
        description: report.description.clone().unwrap_or_default(),
        incident_type: report.incident_type.clone(),
        location: report.location.clone().unwrap_or_default(),
        severity: Some(report.severity.to_string()),
        latitude: report.latitude,
        longitude: report.longitude,
    }
}

/// Run the validator for a report and store the verdict.
pub async fn validate_and_store(state: &AppState, report: &Report) -> Result<StoredVerdict> {
    let verdict = state.validator.validate(&report_input(report)).await;
    let severity = verdict
        .severity
        .as_deref()
        .and_then(Severity::parse)
        .filter(Severity::is_assessed);

    let stored = verdict::upsert_validation(
        state.db.pool(),
        &report.id,
        verdict.is_valid,
        severity,
        &verdict.reason,
        verdict.is_fallback(),
    )
    .await?;

    info!(
        report = %report.id,
        is_valid = stored.is_valid,
        fallback = stored.is_fallback,
        validator = state.validator.name(),
        "Stored report verdict"
    );
    Ok(stored)
}

/// Stored verdict for a report, validating now if there is none or the
/// stored one is a fallback.
async fn verdict_for(state: &AppState, report: &Report) -> Result<StoredVerdict> {
    match verdict::get_validation(state.db.pool(), &report.id).await? {
        Some(stored) if !stored.is_fallback => Ok(stored),
        _ => validate_and_store(state, report).await,
    }
}

/// Approve a report and pay the reporter.
pub async fn approve(state: &AppState, report_id: &str, admin_id: &str) -> Result<ReviewOutcome> {
    decide(state, report_id, admin_id, ReportStatus::Approved).await
}

/// Reject a report.
pub async fn reject(state: &AppState, report_id: &str, admin_id: &str) -> Result<ReviewOutcome> {
    decide(state, report_id, admin_id, ReportStatus::Rejected).await
}

async fn decide(
    state: &AppState,
    report_id: &str,
    admin_id: &str,
    next: ReportStatus,
) -> Result<ReviewOutcome> {
    let current = report::get_report(state.db.pool(), report_id).await?;
    ensure_transition(&current, next)?;

    let stored = verdict_for(state, &current).await?;
    let severity = stored.severity.unwrap_or(current.severity);

    let mut tx = state.db.pool().begin().await.map_err(database::DatabaseError::from)?;

    let updated =
        report::set_review_outcome(&mut tx, report_id, current.status, next, severity).await?;

    let mut coins_awarded = 0;
    if next == ReportStatus::Approved {
        coins_awarded = coins::coin_amount_for_severity(severity);
        let reason = format!("Approved {} severity environmental report", severity);
        coins::credit(&mut tx, &updated.user_id, coins_awarded, &reason).await?;
        profile::add_points(&mut *tx, &updated.user_id, coins_awarded).await?;
    }

    tx.commit().await.map_err(database::DatabaseError::from)?;

    info!(
        report = %report_id,
        admin = %admin_id,
        status = %next,
        severity = %severity,
        coins = coins_awarded,
        "Report reviewed"
    );

    Ok(ReviewOutcome {
        report: updated,
        verdict: Some(stored),
        coins_awarded,
    })
}

/// Move a report through the investigation workflow without paying coins.
///
/// `Approved` and `Rejected` go through [`approve`] and [`reject`].
pub async fn set_status(
    state: &AppState,
    report_id: &str,
    admin_id: &str,
    next: ReportStatus,
) -> Result<ReviewOutcome> {
    match next {
        ReportStatus::Approved => return approve(state, report_id, admin_id).await,
        ReportStatus::Rejected => return reject(state, report_id, admin_id).await,
        _ => {}
    }

    let current = report::get_report(state.db.pool(), report_id).await?;
    ensure_transition(&current, next)?;

    let mut conn = state
        .db
        .pool()
        .acquire()
        .await
        .map_err(database::DatabaseError::from)?;
    let updated =
        report::set_review_outcome(&mut conn, report_id, current.status, next, current.severity)
            .await?;

    info!(report = %report_id, admin = %admin_id, status = %next, "Report status changed");

    Ok(ReviewOutcome {
        report: updated,
        verdict: None,
        coins_awarded: 0,
    })
}

fn ensure_transition(report: &Report, next: ReportStatus) -> Result<()> {
    if report.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(ApiError::Database(database::DatabaseError::Conflict(format!(
            "report {} is {} and cannot become {}",
            report.id, report.status, next
        ))))
    }
}
