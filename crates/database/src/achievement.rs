//! Achievement rows and their progress.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Achievement;
use crate::new_id;

/// A user's achievements, newest first.
pub async fn list_achievements(pool: &SqlitePool, user_id: &str) -> Result<Vec<Achievement>> {
    let achievements = sqlx::query_as::<_, Achievement>(
        r#"
        SELECT id, user_id, title, description, badge_type, target, progress, earned,
               earned_at, created_at
        FROM achievements
        WHERE user_id = ?
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(achievements)
}

/// Get one achievement by user and title.
pub async fn get_achievement(
    pool: &SqlitePool,
    user_id: &str,
    title: &str,
) -> Result<Option<Achievement>> {
    let achievement = sqlx::query_as::<_, Achievement>(
        r#"
        SELECT id, user_id, title, description, badge_type, target, progress, earned,
               earned_at, created_at
        FROM achievements
        WHERE user_id = ? AND title = ?
        "#,
    )
    .bind(user_id)
    .bind(title)
    .fetch_optional(pool)
    .await?;

    Ok(achievement)
}

/// Fields for a new achievement row.
#[derive(Debug, Clone, Copy)]
pub struct NewAchievement<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub badge_type: &'a str,
    pub target: i64,
    pub progress: f64,
    pub earned: bool,
}

/// Insert an achievement row. `earned` rows get `earned_at = now`.
pub async fn insert_achievement(
    pool: &SqlitePool,
    user_id: &str,
    new: NewAchievement<'_>,
) -> Result<Achievement> {
    sqlx::query_as::<_, Achievement>(
        r#"
        INSERT INTO achievements (id, user_id, title, description, badge_type, target,
                                  progress, earned, earned_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, CASE WHEN ? THEN datetime('now') ELSE NULL END)
        RETURNING id, user_id, title, description, badge_type, target, progress, earned,
                  earned_at, created_at
        "#,
    )
    .bind(new_id())
    .bind(user_id)
    .bind(new.title)
    .bind(new.description)
    .bind(new.badge_type)
    .bind(new.target)
    .bind(new.progress)
    .bind(new.earned)
    .bind(new.earned)
    .fetch_one(pool)
    .await
    .map_err(|e| DatabaseError::from_write(e, "Achievement", new.title))
}

/// Update the progress value of an achievement.
pub async fn update_progress(pool: &SqlitePool, id: &str, progress: f64) -> Result<Achievement> {
    sqlx::query_as::<_, Achievement>(
        r#"
        UPDATE achievements
        SET progress = ?
        WHERE id = ?
        RETURNING id, user_id, title, description, badge_type, target, progress, earned,
                  earned_at, created_at
        "#,
    )
    .bind(progress)
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Achievement",
        id: id.to_string(),
    })
}

/// Mark an achievement earned. Returns false if it already was.
pub async fn mark_earned(pool: &SqlitePool, id: &str, progress: f64) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE achievements
        SET earned = 1, earned_at = datetime('now'), progress = ?
        WHERE id = ? AND earned = 0
        "#,
    )
    .bind(progress)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}
