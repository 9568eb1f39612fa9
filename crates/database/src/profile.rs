//! Profile storage and point awards.

use serde::Deserialize;
use sqlx::{SqliteExecutor, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::Profile;
use crate::new_id;

/// Editable profile fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub country: Option<String>,
}

/// Create the profile for a newly signed-up user.
pub async fn create_profile<'e, E>(
    executor: E,
    user_id: &str,
    display_name: Option<&str>,
    country: Option<&str>,
) -> Result<Profile>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Profile>(
        r#"
        INSERT INTO profiles (id, user_id, display_name, country)
        VALUES (?, ?, ?, ?)
        RETURNING id, user_id, display_name, avatar_url, country, points, rank,
                  created_at, updated_at
        "#,
    )
    .bind(new_id())
    .bind(user_id)
    .bind(display_name)
    .bind(country)
    .fetch_one(executor)
    .await
    .map_err(|e| DatabaseError::from_write(e, "Profile", user_id))
}

/// Get a user's profile.
pub async fn get_profile(pool: &SqlitePool, user_id: &str) -> Result<Option<Profile>> {
    let profile = sqlx::query_as::<_, Profile>(
        r#"
        SELECT id, user_id, display_name, avatar_url, country, points, rank,
               created_at, updated_at
        FROM profiles
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(profile)
}

/// Update the editable fields of a profile.
pub async fn update_profile(
    pool: &SqlitePool,
    user_id: &str,
    update: &ProfileUpdate,
) -> Result<Profile> {
    sqlx::query_as::<_, Profile>(
        r#"
        UPDATE profiles
        SET display_name = COALESCE(?, display_name),
            avatar_url = COALESCE(?, avatar_url),
            country = COALESCE(?, country),
            updated_at = datetime('now')
        WHERE user_id = ?
        RETURNING id, user_id, display_name, avatar_url, country, points, rank,
                  created_at, updated_at
        "#,
    )
    .bind(update.display_name.as_deref())
    .bind(update.avatar_url.as_deref())
    .bind(update.country.as_deref())
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Profile",
        id: user_id.to_string(),
    })
}

/// Add leaderboard points, returning the new total.
pub async fn add_points<'e, E>(executor: E, user_id: &str, points: i64) -> Result<i64>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE profiles
        SET points = points + ?, updated_at = datetime('now')
        WHERE user_id = ?
        RETURNING points
        "#,
    )
    .bind(points)
    .bind(user_id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Profile",
        id: user_id.to_string(),
    })
}

/// Count all profiles.
pub async fn count_profiles(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM profiles
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Highest-scoring profiles. Ties go to the earlier member.
pub async fn top_by_points(pool: &SqlitePool, limit: i64) -> Result<Vec<Profile>> {
    let profiles = sqlx::query_as::<_, Profile>(
        r#"
        SELECT id, user_id, display_name, avatar_url, country, points, rank,
               created_at, updated_at
        FROM profiles
        ORDER BY points DESC, created_at ASC, rowid ASC
        LIMIT ?
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(profiles)
}
