//! Incident report submission.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::{admin_role, report, NewReport, Report};
use tracing::info;

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Submit a new report. It starts `Pending` with a `Pending` severity.
pub async fn submit(
    State(state): State<AppState>,
    user: AuthUser,
    Json(new_report): Json<NewReport>,
) -> Result<(StatusCode, Json<Report>)> {
    let created = report::create_report(state.db.pool(), &user.user_id, &new_report).await?;

    info!(
        report = %created.id,
        user = %user.user_id,
        incident_type = %created.incident_type,
        "Report submitted"
    );
    Ok((StatusCode::CREATED, Json(created)))
}

/// The caller's reports, newest first.
pub async fn mine(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<Report>>> {
    let reports = report::list_reports_for_user(state.db.pool(), &user.user_id).await?;
    Ok(Json(reports))
}

/// A single report, visible to its reporter and to admins.
pub async fn get_one(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Report>> {
    let pool = state.db.pool();
    let found = report::get_report(pool, &id).await?;

    if found.user_id != user.user_id
        && admin_role::get_approved_role(pool, &user.user_id).await?.is_none()
    {
        return Err(ApiError::Forbidden("Not your report".to_string()));
    }

    Ok(Json(found))
}
