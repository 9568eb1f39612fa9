//! Account credentials and bearer sessions.

use sqlx::{SqliteExecutor, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{Account, Session};
use crate::{new_id, unix_now};

/// Create an account. The email is stored lowercased.
pub async fn create_account<'e, E>(
    executor: E,
    email: &str,
    password_hash: &str,
    password_salt: &str,
) -> Result<Account>
where
    E: SqliteExecutor<'e>,
{
    let email = email.trim().to_lowercase();

    sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (id, email, password_hash, password_salt)
        VALUES (?, ?, ?, ?)
        RETURNING id, email, password_hash, password_salt, created_at
        "#,
    )
    .bind(new_id())
    .bind(&email)
    .bind(password_hash)
    .bind(password_salt)
    .fetch_one(executor)
    .await
    .map_err(|e| DatabaseError::from_write(e, "Account", &email))
}

/// Get an account by ID.
pub async fn get_account(pool: &SqlitePool, id: &str) -> Result<Account> {
    sqlx::query_as::<_, Account>(
        r#"
        SELECT id, email, password_hash, password_salt, created_at
        FROM accounts
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Account",
        id: id.to_string(),
    })
}

/// Look up an account by email (case-insensitive).
pub async fn get_account_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT id, email, password_hash, password_salt, created_at
        FROM accounts
        WHERE email = ?
        "#,
    )
    .bind(email.trim().to_lowercase())
    .fetch_optional(pool)
    .await?;

    Ok(account)
}

/// Open a session for a user that expires `ttl_secs` from now.
pub async fn create_session(pool: &SqlitePool, user_id: &str, ttl_secs: i64) -> Result<Session> {
    let expires_at = unix_now() + ttl_secs;

    sqlx::query_as::<_, Session>(
        r#"
        INSERT INTO sessions (token, user_id, expires_at)
        VALUES (?, ?, ?)
        RETURNING token, user_id, expires_at, created_at
        "#,
    )
    .bind(new_id())
    .bind(user_id)
    .bind(expires_at)
    .fetch_one(pool)
    .await
    .map_err(|e| DatabaseError::from_write(e, "Session", user_id))
}

/// Get a session by token if it has not expired at `now`.
pub async fn get_session(pool: &SqlitePool, token: &str, now: i64) -> Result<Option<Session>> {
    let session = sqlx::query_as::<_, Session>(
        r#"
        SELECT token, user_id, expires_at, created_at
        FROM sessions
        WHERE token = ? AND expires_at > ?
        "#,
    )
    .bind(token)
    .bind(now)
    .fetch_optional(pool)
    .await?;

    Ok(session)
}

/// Delete a session. Returns true if one existed.
pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM sessions
        WHERE token = ?
        "#,
    )
    .bind(token)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Remove sessions that expired at or before `now`.
pub async fn purge_expired_sessions(pool: &SqlitePool, now: i64) -> Result<u64> {
    let result = sqlx::query(
        r#"
        DELETE FROM sessions
        WHERE expires_at <= ?
        "#,
    )
    .bind(now)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
