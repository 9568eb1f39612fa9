//! Sign-up, sign-in and session routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use database::profile::ProfileUpdate;
use database::validation::{validate_email, validate_password};
use database::{account, admin_role, profile, unix_now, AdminRole, DatabaseError, Profile, Session};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{generate_salt, hash_password, verify_password, AuthUser};
use crate::error::{ApiError, Result};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminApplication {
    pub email: String,
    pub password: String,
    pub organization_name: String,
    pub organization_type: String,
}

#[derive(Debug, Deserialize)]
pub struct SigninRequest {
    pub email: String,
    pub password: String,
}

/// Issued session.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub token: String,
    pub user_id: String,
    /// Unix seconds.
    pub expires_at: i64,
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            token: session.token,
            user_id: session.user_id,
            expires_at: session.expires_at,
        }
    }
}

/// The signed-in user.
#[derive(Debug, Serialize)]
pub struct Me {
    pub user_id: String,
    pub email: String,
    pub profile: Option<Profile>,
    pub admin_role: Option<AdminRole>,
}

fn check_credentials(email: &str, password: &str) -> Result<()> {
    validate_email(email).map_err(DatabaseError::from)?;
    validate_password(password).map_err(DatabaseError::from)?;
    Ok(())
}

/// Create an account and profile, then open a session.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SessionResponse>)> {
    check_credentials(&request.email, &request.password)?;

    let salt = generate_salt();
    let hash = hash_password(&request.password, &salt);

    let mut tx = state.db.pool().begin().await.map_err(DatabaseError::from)?;
    let created = account::create_account(&mut *tx, &request.email, &hash, &salt).await?;
    profile::create_profile(
        &mut *tx,
        &created.id,
        request.display_name.as_deref(),
        request.country.as_deref(),
    )
    .await?;
    tx.commit().await.map_err(DatabaseError::from)?;

    info!(user = %created.id, "Account created");

    let session =
        account::create_session(state.db.pool(), &created.id, state.config.session_ttl_secs())
            .await?;
    Ok((StatusCode::CREATED, Json(session.into())))
}

/// Register an organization and file a pending admin application.
pub async fn apply_admin(
    State(state): State<AppState>,
    Json(request): Json<AdminApplication>,
) -> Result<(StatusCode, Json<AdminRole>)> {
    check_credentials(&request.email, &request.password)?;

    let salt = generate_salt();
    let hash = hash_password(&request.password, &salt);

    let mut tx = state.db.pool().begin().await.map_err(DatabaseError::from)?;
    let created = account::create_account(&mut *tx, &request.email, &hash, &salt).await?;
    profile::create_profile(
        &mut *tx,
        &created.id,
        Some(request.organization_name.trim()),
        None,
    )
    .await?;
    let role = admin_role::create_application(
        &mut *tx,
        &created.id,
        &request.organization_name,
        &request.organization_type,
    )
    .await?;
    tx.commit().await.map_err(DatabaseError::from)?;

    info!(
        user = %created.id,
        organization = %role.organization_name,
        "Admin application submitted"
    );
    Ok((StatusCode::CREATED, Json(role)))
}

/// Exchange credentials for a session.
pub async fn signin(
    State(state): State<AppState>,
    Json(request): Json<SigninRequest>,
) -> Result<Json<SessionResponse>> {
    let pool = state.db.pool();

    let purged = account::purge_expired_sessions(pool, unix_now()).await?;
    if purged > 0 {
        info!(count = purged, "Purged expired sessions");
    }

    let invalid = || ApiError::Unauthorized("Invalid email or password".to_string());

    let found = account::get_account_by_email(pool, &request.email)
        .await?
        .ok_or_else(invalid)?;
    if !verify_password(&request.password, &found.password_salt, &found.password_hash) {
        return Err(invalid());
    }

    if admin_role::is_super_admin_email(&found.email, state.config.super_admin_email.as_deref()) {
        admin_role::ensure_super_admin(pool, &found.id).await?;
        info!(user = %found.id, "Super admin role ensured");
    }

    let session = account::create_session(pool, &found.id, state.config.session_ttl_secs()).await?;
    Ok(Json(session.into()))
}

/// End the current session.
pub async fn signout(State(state): State<AppState>, user: AuthUser) -> Result<StatusCode> {
    account::delete_session(state.db.pool(), &user.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Identity, profile and admin role of the caller.
pub async fn me(State(state): State<AppState>, user: AuthUser) -> Result<Json<Me>> {
    let pool = state.db.pool();
    let found = account::get_account(pool, &user.user_id).await?;

    Ok(Json(Me {
        user_id: found.id,
        email: found.email,
        profile: profile::get_profile(pool, &user.user_id).await?,
        admin_role: admin_role::get_role(pool, &user.user_id).await?,
    }))
}

/// Edit the caller's profile.
pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<Profile>> {
    let updated = profile::update_profile(state.db.pool(), &user.user_id, &update).await?;
    Ok(Json(updated))
}
