//! Password hashing and request authentication.
//!
//! Sessions are opaque bearer tokens stored in the database. Handlers
//! declare the access they need through extractors: [`AuthUser`] for any
//! signed-in user, [`AdminUser`] for approved admins and [`SuperAdmin`] for
//! the super-admin role.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use database::{account, admin_role, unix_now, AdminRole};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::error::ApiError;
use crate::state::AppState;

/// Generate a random hex salt.
pub fn generate_salt() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hex SHA-256 of `salt:password`.
///
/// This is prototype-grade: a single round of salted SHA-256 is fast to
/// brute-force and is not a password KDF. Swap in argon2 or bcrypt before
/// storing real credentials.
pub fn hash_password(password: &str, salt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Check a password against a stored hash without early exit.
///
/// The compare is hand-rolled rather than taken from a vetted constant-time
/// crate, which is acceptable only alongside the prototype hash above.
pub fn verify_password(password: &str, salt: &str, expected_hash: &str) -> bool {
    let actual = hash_password(password, salt);
    if actual.len() != expected_hash.len() {
        return false;
    }
    actual
        .bytes()
        .zip(expected_hash.bytes())
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// A signed-in user.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub token: String,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

        let session = account::get_session(state.db.pool(), token, unix_now())
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Session expired or invalid".to_string()))?;

        Ok(AuthUser {
            user_id: session.user_id,
            token: session.token,
        })
    }
}

/// A user with an approved admin role.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub user: AuthUser,
    pub role: AdminRole,
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;

        let role = admin_role::get_approved_role(state.db.pool(), &user.user_id)
            .await?
            .ok_or_else(|| ApiError::Forbidden("Admin access required".to_string()))?;

        Ok(AdminUser { user, role })
    }
}

/// An approved super admin.
#[derive(Debug, Clone)]
pub struct SuperAdmin(pub AdminUser);

#[axum::async_trait]
impl FromRequestParts<AppState> for SuperAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let admin = AdminUser::from_request_parts(parts, state).await?;
        if !admin.role.is_super_admin {
            return Err(ApiError::Forbidden(
                "Only super admins can manage admin roles".to_string(),
            ));
        }
        Ok(SuperAdmin(admin))
    }
}
