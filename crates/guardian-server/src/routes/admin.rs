//! Admin dashboard routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use database::reward::NewReward;
use database::{
    admin_role, profile, report, reward, verdict, AdminRole, AdminRoleWithName, ReportFilter,
    ReportStatus, ReportWithReporter, Reward, StoredVerdict, VerificationStatus,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{AdminUser, AuthUser, SuperAdmin};
use crate::error::{ApiError, Result};
use crate::review::{self, ReviewOutcome};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ReportQuery {
    #[serde(default)]
    pub search: Option<String>,
    /// A status name, or `all`.
    #[serde(default)]
    pub status: Option<String>,
}

impl ReportQuery {
    fn filter(&self) -> Result<ReportFilter> {
        let status = match self.status.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(s) if s.eq_ignore_ascii_case("all") => None,
            Some(s) => Some(
                ReportStatus::parse(s)
                    .ok_or_else(|| ApiError::BadRequest(format!("Unknown status: {}", s)))?,
            ),
        };
        Ok(ReportFilter {
            search: self.search.clone(),
            status,
        })
    }
}

/// Dashboard row: report, reporter name and AI verdict.
#[derive(Debug, Serialize)]
pub struct ReviewItem {
    #[serde(flatten)]
    pub report: ReportWithReporter,
    pub verdict: Option<StoredVerdict>,
}

#[derive(Debug, Serialize)]
pub struct Stats {
    pub total_reports: i64,
    pub pending_reports: i64,
    pub approved_reports: i64,
    pub rejected_reports: i64,
    pub total_users: i64,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct SuperCheck {
    pub is_super_admin: bool,
}

/// Reports for review. Every pending report without a real verdict is
/// validated first, including those whose last attempt fell back.
pub async fn list_reports(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(query): Query<ReportQuery>,
) -> Result<Json<Vec<ReviewItem>>> {
    let filter = query.filter()?;
    let pool = state.db.pool();

    for id in verdict::pending_without_verdict(pool).await? {
        let pending = report::get_report(pool, &id).await?;
        if let Err(e) = review::validate_and_store(&state, &pending).await {
            warn!(report = %id, "Could not store verdict: {}", e);
        }
    }

    let reports = report::list_reports_with_reporter(pool, &filter).await?;
    let mut items = Vec::with_capacity(reports.len());
    for row in reports {
        let verdict = verdict::get_validation(pool, &row.report.id).await?;
        items.push(ReviewItem {
            report: row,
            verdict,
        });
    }

    Ok(Json(items))
}

/// Report and user totals.
pub async fn stats(State(state): State<AppState>, _admin: AdminUser) -> Result<Json<Stats>> {
    let pool = state.db.pool();
    let counts = report::count_by_status(pool).await?;

    let count = |status: ReportStatus| {
        counts
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    };

    Ok(Json(Stats {
        total_reports: counts.iter().map(|(_, n)| n).sum(),
        pending_reports: count(ReportStatus::Pending),
        approved_reports: count(ReportStatus::Approved),
        rejected_reports: count(ReportStatus::Rejected),
        total_users: profile::count_profiles(pool).await?,
    }))
}

pub async fn approve_report(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ReviewOutcome>> {
    let outcome = review::approve(&state, &id, &admin.user.user_id).await?;
    Ok(Json(outcome))
}

pub async fn reject_report(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
) -> Result<Json<ReviewOutcome>> {
    let outcome = review::reject(&state, &id, &admin.user.user_id).await?;
    Ok(Json(outcome))
}

/// Move a report to any status the transition table allows.
pub async fn set_report_status(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<String>,
    Json(change): Json<StatusChange>,
) -> Result<Json<ReviewOutcome>> {
    let next = ReportStatus::parse(&change.status)
        .ok_or_else(|| ApiError::BadRequest(format!("Unknown status: {}", change.status)))?;
    let outcome = review::set_status(&state, &id, &admin.user.user_id, next).await?;
    Ok(Json(outcome))
}

/// All admin roles and applications.
pub async fn list_roles(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Vec<AdminRoleWithName>>> {
    let roles = admin_role::list_roles_with_names(state.db.pool()).await?;
    Ok(Json(roles))
}

pub async fn approve_role(
    State(state): State<AppState>,
    SuperAdmin(admin): SuperAdmin,
    Path(id): Path<String>,
) -> Result<Json<AdminRole>> {
    decide_role(&state, &admin, &id, VerificationStatus::Approved).await
}

pub async fn reject_role(
    State(state): State<AppState>,
    SuperAdmin(admin): SuperAdmin,
    Path(id): Path<String>,
) -> Result<Json<AdminRole>> {
    decide_role(&state, &admin, &id, VerificationStatus::Rejected).await
}

async fn decide_role(
    state: &AppState,
    admin: &AdminUser,
    role_id: &str,
    status: VerificationStatus,
) -> Result<Json<AdminRole>> {
    let pool = state.db.pool();

    let target = admin_role::get_role_by_id(pool, role_id).await?;
    if target.is_super_admin {
        return Err(ApiError::Forbidden(
            "Super admin roles cannot be changed".to_string(),
        ));
    }

    let role =
        admin_role::set_verification_status(pool, role_id, status, &admin.user.user_id).await?;
    Ok(Json(role))
}

/// Whether the caller is a super admin.
pub async fn super_check(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<SuperCheck>> {
    let is_super_admin = admin_role::is_super_admin(state.db.pool(), &user.user_id).await?;
    Ok(Json(SuperCheck { is_super_admin }))
}

/// Add a rewards catalog entry.
pub async fn create_reward(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(new_reward): Json<NewReward>,
) -> Result<(StatusCode, Json<Reward>)> {
    let created = reward::create_reward(state.db.pool(), &new_reward).await?;
    info!(reward = %created.id, admin = %admin.user.user_id, "Reward added");
    Ok((StatusCode::CREATED, Json(created)))
}
