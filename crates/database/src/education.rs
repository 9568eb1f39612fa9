//! Education catalog (courses, quizzes, guides) and learner progress.

use serde::Deserialize;
use sqlx::{SqliteExecutor, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{Course, CourseProgress, Difficulty, Guide, Quiz, QuizScore};
use crate::new_id;
use crate::validation::{
    check_length, require_text, validate_progress, validate_quiz_score, ValidationError,
    MAX_DESCRIPTION_LENGTH, MAX_SHORT_TEXT,
};

#[derive(Debug, Clone, Deserialize)]
pub struct NewCourse {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub lessons: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewQuiz {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub questions: i64,
    #[serde(default)]
    pub time_limit: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGuide {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub category: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

fn non_negative(field: &str, value: i64) -> std::result::Result<(), ValidationError> {
    if value < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            reason: "cannot be negative".to_string(),
        });
    }
    Ok(())
}

fn optional_description(description: &Option<String>) -> std::result::Result<(), ValidationError> {
    match description {
        Some(text) => check_length("description", text, MAX_DESCRIPTION_LENGTH),
        None => Ok(()),
    }
}

pub async fn create_course(pool: &SqlitePool, course: &NewCourse) -> Result<Course> {
    let title = require_text("title", &course.title, MAX_SHORT_TEXT)?;
    optional_description(&course.description)?;
    non_negative("lessons", course.lessons)?;

    let created = sqlx::query_as::<_, Course>(
        r#"
        INSERT INTO courses (id, title, description, difficulty, duration, lessons)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, title, description, difficulty, duration, lessons, created_at
        "#,
    )
    .bind(new_id())
    .bind(title)
    .bind(course.description.as_deref())
    .bind(course.difficulty)
    .bind(course.duration.as_deref())
    .bind(course.lessons)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

/// Courses, newest first.
pub async fn list_courses(pool: &SqlitePool) -> Result<Vec<Course>> {
    let courses = sqlx::query_as::<_, Course>(
        r#"
        SELECT id, title, description, difficulty, duration, lessons, created_at
        FROM courses
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(courses)
}

pub async fn get_course(pool: &SqlitePool, id: &str) -> Result<Course> {
    sqlx::query_as::<_, Course>(
        r#"
        SELECT id, title, description, difficulty, duration, lessons, created_at
        FROM courses
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Course",
        id: id.to_string(),
    })
}

pub async fn create_quiz(pool: &SqlitePool, quiz: &NewQuiz) -> Result<Quiz> {
    let title = require_text("title", &quiz.title, MAX_SHORT_TEXT)?;
    optional_description(&quiz.description)?;
    non_negative("questions", quiz.questions)?;
    if let Some(limit) = quiz.time_limit {
        non_negative("time_limit", limit)?;
    }

    let created = sqlx::query_as::<_, Quiz>(
        r#"
        INSERT INTO quizzes (id, title, description, difficulty, questions, time_limit)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, title, description, difficulty, questions, time_limit, created_at
        "#,
    )
    .bind(new_id())
    .bind(title)
    .bind(quiz.description.as_deref())
    .bind(quiz.difficulty)
    .bind(quiz.questions)
    .bind(quiz.time_limit)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

/// Quizzes, newest first.
pub async fn list_quizzes(pool: &SqlitePool) -> Result<Vec<Quiz>> {
    let quizzes = sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, title, description, difficulty, questions, time_limit, created_at
        FROM quizzes
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(quizzes)
}

pub async fn get_quiz(pool: &SqlitePool, id: &str) -> Result<Quiz> {
    sqlx::query_as::<_, Quiz>(
        r#"
        SELECT id, title, description, difficulty, questions, time_limit, created_at
        FROM quizzes
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Quiz",
        id: id.to_string(),
    })
}

pub async fn create_guide(pool: &SqlitePool, guide: &NewGuide) -> Result<Guide> {
    let title = require_text("title", &guide.title, MAX_SHORT_TEXT)?;
    let category = require_text("category", &guide.category, MAX_SHORT_TEXT)?;
    optional_description(&guide.description)?;

    let created = sqlx::query_as::<_, Guide>(
        r#"
        INSERT INTO guides (id, title, description, category, content, image_url)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, title, description, category, content, image_url, created_at
        "#,
    )
    .bind(new_id())
    .bind(title)
    .bind(guide.description.as_deref())
    .bind(category)
    .bind(guide.content.as_deref())
    .bind(guide.image_url.as_deref())
    .fetch_one(pool)
    .await?;

    Ok(created)
}

/// Guides, newest first.
pub async fn list_guides(pool: &SqlitePool) -> Result<Vec<Guide>> {
    let guides = sqlx::query_as::<_, Guide>(
        r#"
        SELECT id, title, description, category, content, image_url, created_at
        FROM guides
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(guides)
}

/// Record course progress for a user.
///
/// Reaching 100 marks the course completed; the first completion time is kept.
pub async fn upsert_course_progress(
    pool: &SqlitePool,
    user_id: &str,
    course_id: &str,
    progress: i64,
) -> Result<CourseProgress> {
    validate_progress(progress)?;
    let completed = progress >= 100;

    sqlx::query_as::<_, CourseProgress>(
        r#"
        INSERT INTO user_course_progress (id, user_id, course_id, progress, completed, completed_at)
        VALUES (?, ?, ?, ?, ?, CASE WHEN ? THEN datetime('now') ELSE NULL END)
        ON CONFLICT(user_id, course_id) DO UPDATE SET
            progress = excluded.progress,
            completed = excluded.completed,
            completed_at = CASE
                WHEN excluded.completed THEN COALESCE(user_course_progress.completed_at, excluded.completed_at)
                ELSE NULL
            END
        RETURNING id, user_id, course_id, progress, completed, completed_at, created_at
        "#,
    )
    .bind(new_id())
    .bind(user_id)
    .bind(course_id)
    .bind(progress)
    .bind(completed)
    .bind(completed)
    .fetch_one(pool)
    .await
    .map_err(|e| DatabaseError::from_write(e, "CourseProgress", course_id))
}

/// A user's progress rows, most recent first.
pub async fn list_course_progress(pool: &SqlitePool, user_id: &str) -> Result<Vec<CourseProgress>> {
    let rows = sqlx::query_as::<_, CourseProgress>(
        r#"
        SELECT id, user_id, course_id, progress, completed, completed_at, created_at
        FROM user_course_progress
        WHERE user_id = ?
        ORDER BY created_at DESC, rowid DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

/// Store a quiz attempt.
pub async fn record_quiz_score<'e, E>(
    executor: E,
    user_id: &str,
    quiz_id: &str,
    score: i64,
    total_questions: i64,
) -> Result<QuizScore>
where
    E: SqliteExecutor<'e>,
{
    validate_quiz_score(score, total_questions)?;

    sqlx::query_as::<_, QuizScore>(
        r#"
        INSERT INTO user_quiz_scores (id, user_id, quiz_id, score, total_questions)
        VALUES (?, ?, ?, ?, ?)
        RETURNING id, user_id, quiz_id, score, total_questions, completed_at
        "#,
    )
    .bind(new_id())
    .bind(user_id)
    .bind(quiz_id)
    .bind(score)
    .bind(total_questions)
    .fetch_one(executor)
    .await
    .map_err(|e| DatabaseError::from_write(e, "QuizScore", quiz_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_user, test_db};

    fn basics() -> NewCourse {
        NewCourse {
            title: "Mangrove Basics".to_string(),
            description: Some("Roots, tides and salt".to_string()),
            difficulty: Difficulty::Beginner,
            duration: Some("2 hours".to_string()),
            lessons: 6,
        }
    }

    #[tokio::test]
    async fn test_catalog_lists() {
        let db = test_db().await;
        let course = create_course(db.pool(), &basics()).await.unwrap();
        assert_eq!(get_course(db.pool(), &course.id).await.unwrap().lessons, 6);

        let quiz = create_quiz(
            db.pool(),
            &NewQuiz {
                title: "Species ID".to_string(),
                description: None,
                difficulty: Difficulty::Intermediate,
                questions: 10,
                time_limit: Some(15),
            },
        )
        .await
        .unwrap();
        assert_eq!(get_quiz(db.pool(), &quiz.id).await.unwrap().questions, 10);

        create_guide(
            db.pool(),
            &NewGuide {
                title: "Reporting safely".to_string(),
                description: None,
                category: "field".to_string(),
                content: Some("Keep your distance".to_string()),
                image_url: None,
            },
        )
        .await
        .unwrap();

        assert_eq!(list_courses(db.pool()).await.unwrap().len(), 1);
        assert_eq!(list_quizzes(db.pool()).await.unwrap().len(), 1);
        assert_eq!(list_guides(db.pool()).await.unwrap()[0].category, "field");
    }

    #[tokio::test]
    async fn test_progress_completion() {
        let db = test_db().await;
        let user_id = seed_user(&db, "pia@example.org", "Pia").await;
        let course = create_course(db.pool(), &basics()).await.unwrap();

        let partial = upsert_course_progress(db.pool(), &user_id, &course.id, 40)
            .await
            .unwrap();
        assert!(!partial.completed);
        assert!(partial.completed_at.is_none());

        let done = upsert_course_progress(db.pool(), &user_id, &course.id, 100)
            .await
            .unwrap();
        assert!(done.completed);
        assert!(done.completed_at.is_some());
        assert_eq!(done.id, partial.id);

        assert!(upsert_course_progress(db.pool(), &user_id, &course.id, 120)
            .await
            .is_err());
        assert_eq!(list_course_progress(db.pool(), &user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_record_quiz_score_validates() {
        let db = test_db().await;
        let user_id = seed_user(&db, "quin@example.org", "Quin").await;
        let quiz = create_quiz(
            db.pool(),
            &NewQuiz {
                title: "Tides".to_string(),
                description: None,
                difficulty: Difficulty::Beginner,
                questions: 5,
                time_limit: None,
            },
        )
        .await
        .unwrap();

        let score = record_quiz_score(db.pool(), &user_id, &quiz.id, 4, 5).await.unwrap();
        assert_eq!(score.score, 4);

        assert!(matches!(
            record_quiz_score(db.pool(), &user_id, &quiz.id, 6, 5).await,
            Err(DatabaseError::Invalid(_))
        ));
        assert!(matches!(
            record_quiz_score(db.pool(), &user_id, "missing", 1, 5).await,
            Err(DatabaseError::MissingReference { .. })
        ));
    }
}
