//! Stored AI verdicts.
//!
//! A verdict is advisory: it never changes report status on its own. Only
//! the most recent verdict per report is kept. Fallback verdicts are kept
//! for display but count as missing, so the report is validated again.

use sqlx::{SqliteExecutor, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{Severity, StoredVerdict};

/// Store (or replace) the verdict for a report.
pub async fn upsert_validation<'e, E>(
    executor: E,
    report_id: &str,
    is_valid: bool,
    severity: Option<Severity>,
    reason: &str,
    is_fallback: bool,
) -> Result<StoredVerdict>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, StoredVerdict>(
        r#"
        INSERT INTO report_validations (report_id, is_valid, severity, reason, is_fallback)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT(report_id) DO UPDATE SET
            is_valid = excluded.is_valid,
            severity = excluded.severity,
            reason = excluded.reason,
            is_fallback = excluded.is_fallback,
            validated_at = datetime('now')
        RETURNING report_id, is_valid, severity, reason, is_fallback, validated_at
        "#,
    )
    .bind(report_id)
    .bind(is_valid)
    .bind(severity)
    .bind(reason)
    .bind(is_fallback)
    .fetch_one(executor)
    .await
    .map_err(|e| DatabaseError::from_write(e, "Verdict", report_id))
}

/// Get the stored verdict for a report, if any.
pub async fn get_validation(pool: &SqlitePool, report_id: &str) -> Result<Option<StoredVerdict>> {
    let verdict = sqlx::query_as::<_, StoredVerdict>(
        r#"
        SELECT report_id, is_valid, severity, reason, is_fallback, validated_at
        FROM report_validations
        WHERE report_id = ?
        "#,
    )
    .bind(report_id)
    .fetch_optional(pool)
    .await?;

    Ok(verdict)
}

/// IDs of pending reports with no real verdict yet, oldest first.
///
/// Reports whose stored verdict is a fallback are included.
pub async fn pending_without_verdict(pool: &SqlitePool) -> Result<Vec<String>> {
    let ids = sqlx::query_scalar::<_, String>(
        r#"
        SELECT r.id
        FROM reports r
        LEFT JOIN report_validations v ON v.report_id = r.id
        WHERE r.status = 'Pending' AND (v.report_id IS NULL OR v.is_fallback)
        ORDER BY r.created_at ASC, r.rowid ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(ids)
}
