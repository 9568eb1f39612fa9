//! Incident report storage and lifecycle updates.

use serde::Deserialize;
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{Report, ReportStatus, ReportWithReporter, Severity};
use crate::new_id;
use crate::validation::{
    check_length, require_text, validate_coordinates, ValidationError, MAX_DESCRIPTION_LENGTH,
    MAX_EVIDENCE_ITEMS, MAX_SHORT_TEXT,
};

/// Fields collected by the submission form.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewReport {
    /// Defaults to "<incident type> Report".
    #[serde(default)]
    pub title: Option<String>,
    pub incident_type: String,
    pub description: String,
    pub location: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default)]
    pub evidence_urls: Vec<String>,
}

impl NewReport {
    /// Check required fields, lengths and coordinates.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        require_text("incident_type", &self.incident_type, MAX_SHORT_TEXT)?;
        require_text("description", &self.description, MAX_DESCRIPTION_LENGTH)?;
        require_text("location", &self.location, MAX_SHORT_TEXT)?;
        if let Some(title) = &self.title {
            check_length("title", title, MAX_SHORT_TEXT)?;
        }
        validate_coordinates(self.latitude, self.longitude)?;

        if self.evidence_urls.len() > MAX_EVIDENCE_ITEMS {
            return Err(ValidationError::TooLong {
                field: "evidence_urls".to_string(),
                max: MAX_EVIDENCE_ITEMS,
                actual: self.evidence_urls.len(),
            });
        }
        for item in &self.evidence_urls {
            check_length("evidence reference", item, MAX_SHORT_TEXT)?;
        }
        Ok(())
    }

    /// The title to store.
    pub fn effective_title(&self) -> String {
        match self.title.as_deref().map(str::trim) {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("{} Report", self.incident_type.trim()),
        }
    }
}

/// Admin dashboard filter.
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    /// Case-insensitive match on title, description, location or reporter name.
    pub search: Option<String>,
    pub status: Option<ReportStatus>,
}

/// Insert a report. New reports always start `Pending` with a `Pending`
/// severity placeholder.
pub async fn create_report<'e, E>(executor: E, user_id: &str, report: &NewReport) -> Result<Report>
where
    E: SqliteExecutor<'e>,
{
    report.validate()?;

    let evidence: Vec<String> = report
        .evidence_urls
        .iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect();

    sqlx::query_as::<_, Report>(
        r#"
        INSERT INTO reports (id, user_id, title, description, incident_type, severity,
                             status, location, latitude, longitude, evidence_urls)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        RETURNING id, user_id, title, description, incident_type, severity, status,
                  location, latitude, longitude, evidence_urls, created_at, updated_at
        "#,
    )
    .bind(new_id())
    .bind(user_id)
    .bind(report.effective_title())
    .bind(report.description.trim())
    .bind(report.incident_type.trim())
    .bind(Severity::Pending)
    .bind(ReportStatus::Pending)
    .bind(report.location.trim())
    .bind(report.latitude)
    .bind(report.longitude)
    .bind(Json(evidence))
    .fetch_one(executor)
    .await
    .map_err(|e| DatabaseError::from_write(e, "Report", user_id))
}

/// Get a report by ID.
pub async fn get_report<'e, E>(executor: E, id: &str) -> Result<Report>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Report>(
        r#"
        SELECT id, user_id, title, description, incident_type, severity, status,
               location, latitude, longitude, evidence_urls, created_at, updated_at
        FROM reports
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Report",
        id: id.to_string(),
    })
}

/// List all reports, newest first.
pub async fn list_reports(pool: &SqlitePool) -> Result<Vec<Report>> {
    let reports = sqlx::query_as::<_, Report>(
        r#"
        SELECT id, user_id, title, description, incident_type, severity, status,
               location, latitude, longitude, evidence_urls, created_at, updated_at
        FROM reports
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(reports)
}

/// List a single user's reports, newest first.
pub async fn list_reports_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<Report>> {
    let reports = sqlx::query_as::<_, Report>(
        r#"
        SELECT id, user_id, title, description, incident_type, severity, status,
               location, latitude, longitude, evidence_urls, created_at, updated_at
        FROM reports
        WHERE user_id = ?
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(reports)
}

/// List reports with reporter names for the admin dashboard.
pub async fn list_reports_with_reporter(
    pool: &SqlitePool,
    filter: &ReportFilter,
) -> Result<Vec<ReportWithReporter>> {
    let pattern = filter
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", s.to_lowercase()));

    let reports = sqlx::query_as::<_, ReportWithReporter>(
        r#"
        SELECT r.id, r.user_id, r.title, r.description, r.incident_type, r.severity,
               r.status, r.location, r.latitude, r.longitude, r.evidence_urls,
               r.created_at, r.updated_at, p.display_name AS reporter_name
        FROM reports r
        LEFT JOIN profiles p ON p.user_id = r.user_id
        WHERE (? IS NULL OR r.status = ?)
          AND (? IS NULL
               OR lower(r.title) LIKE ?
               OR lower(COALESCE(r.description, '')) LIKE ?
               OR lower(COALESCE(r.location, '')) LIKE ?
               OR lower(COALESCE(p.display_name, '')) LIKE ?)
        ORDER BY r.created_at DESC, r.rowid DESC
        "#,
    )
    .bind(filter.status)
    .bind(filter.status)
    .bind(pattern.as_deref())
    .bind(pattern.as_deref())
    .bind(pattern.as_deref())
    .bind(pattern.as_deref())
    .bind(pattern.as_deref())
    .fetch_all(pool)
    .await?;

    Ok(reports)
}

/// Move a report from `expected` to `next`, writing the given severity.
///
/// The update only applies while the stored status still equals `expected`,
/// so two admins acting on the same report cannot both succeed.
pub async fn set_review_outcome(
    conn: &mut SqliteConnection,
    id: &str,
    expected: ReportStatus,
    next: ReportStatus,
    severity: Severity,
) -> Result<Report> {
    if !expected.can_transition_to(next) {
        return Err(DatabaseError::Conflict(format!(
            "report {} cannot move from {} to {}",
            id, expected, next
        )));
    }

    let updated = sqlx::query_as::<_, Report>(
        r#"
        UPDATE reports
        SET status = ?, severity = ?, updated_at = datetime('now')
        WHERE id = ? AND status = ?
        RETURNING id, user_id, title, description, incident_type, severity, status,
                  location, latitude, longitude, evidence_urls, created_at, updated_at
        "#,
    )
    .bind(next)
    .bind(severity)
    .bind(id)
    .bind(expected)
    .fetch_optional(&mut *conn)
    .await?;

    match updated {
        Some(report) => Ok(report),
        None => {
            let current = get_report(&mut *conn, id).await?;
            Err(DatabaseError::Conflict(format!(
                "report {} is {}, expected {}",
                id, current.status, expected
            )))
        }
    }
}

/// Count reports grouped by status.
pub async fn count_by_status(pool: &SqlitePool) -> Result<Vec<(ReportStatus, i64)>> {
    let rows = sqlx::query_as::<_, (ReportStatus, i64)>(
        r#"
        SELECT status, COUNT(*) as count
        FROM reports
        GROUP BY status
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Total and approved report counts for one user.
pub async fn user_report_stats(pool: &SqlitePool, user_id: &str) -> Result<(i64, i64)> {
    let stats = sqlx::query_as::<_, (i64, i64)>(
        r#"
        SELECT COUNT(*),
               COALESCE(SUM(CASE WHEN status IN ('Approved', 'Resolved') THEN 1 ELSE 0 END), 0)
        FROM reports
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(stats)
}
