//! Courses, quizzes, guides and learner progress.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::education::{self, NewCourse, NewGuide, NewQuiz};
use database::{coins, Course, CourseProgress, DatabaseError, Guide, Quiz, QuizScore};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::{AdminUser, AuthUser};
use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ProgressUpdate {
    pub progress: i64,
}

#[derive(Debug, Deserialize)]
pub struct ScoreSubmission {
    pub score: i64,
    pub total_questions: i64,
}

#[derive(Debug, Serialize)]
pub struct ScoreResult {
    pub score: QuizScore,
    pub coins_awarded: i64,
}

pub async fn list_courses(State(state): State<AppState>) -> Result<Json<Vec<Course>>> {
    Ok(Json(education::list_courses(state.db.pool()).await?))
}

pub async fn list_quizzes(State(state): State<AppState>) -> Result<Json<Vec<Quiz>>> {
    Ok(Json(education::list_quizzes(state.db.pool()).await?))
}

pub async fn list_guides(State(state): State<AppState>) -> Result<Json<Vec<Guide>>> {
    Ok(Json(education::list_guides(state.db.pool()).await?))
}

pub async fn create_course(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(course): Json<NewCourse>,
) -> Result<(StatusCode, Json<Course>)> {
    let created = education::create_course(state.db.pool(), &course).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn create_quiz(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(quiz): Json<NewQuiz>,
) -> Result<(StatusCode, Json<Quiz>)> {
    let created = education::create_quiz(state.db.pool(), &quiz).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn create_guide(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(guide): Json<NewGuide>,
) -> Result<(StatusCode, Json<Guide>)> {
    let created = education::create_guide(state.db.pool(), &guide).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn my_progress(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<CourseProgress>>> {
    let rows = education::list_course_progress(state.db.pool(), &user.user_id).await?;
    Ok(Json(rows))
}

/// Record course progress; 100 completes the course.
pub async fn update_progress(
    State(state): State<AppState>,
    user: AuthUser,
    Path(course_id): Path<String>,
    Json(update): Json<ProgressUpdate>,
) -> Result<Json<CourseProgress>> {
    let pool = state.db.pool();
    education::get_course(pool, &course_id).await?;

    let row =
        education::upsert_course_progress(pool, &user.user_id, &course_id, update.progress).await?;
    if row.completed {
        info!(user = %user.user_id, course = %course_id, "Course completed");
    }
    Ok(Json(row))
}

/// Record a quiz attempt and pay coins for it.
pub async fn submit_score(
    State(state): State<AppState>,
    user: AuthUser,
    Path(quiz_id): Path<String>,
    Json(submission): Json<ScoreSubmission>,
) -> Result<Json<ScoreResult>> {
    let pool = state.db.pool();
    let quiz = education::get_quiz(pool, &quiz_id).await?;
    let award = coins::quiz_coin_award(submission.score, submission.total_questions);

    let mut tx = pool.begin().await.map_err(DatabaseError::from)?;
    let score = education::record_quiz_score(
        &mut *tx,
        &user.user_id,
        &quiz_id,
        submission.score,
        submission.total_questions,
    )
    .await?;
    if award > 0 {
        let reason = format!("Quiz completed: {}", quiz.title);
        coins::credit(&mut tx, &user.user_id, award, &reason).await?;
    }
    tx.commit().await.map_err(DatabaseError::from)?;

    info!(
        user = %user.user_id,
        quiz = %quiz_id,
        score = submission.score,
        total = submission.total_questions,
        coins = award,
        "Quiz score recorded"
    );

    Ok(Json(ScoreResult {
        score,
        coins_awarded: award,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::Method;
    use database::coins;
    use report_validator::FixedValidator;
    use serde_json::json;

    use crate::test_support::*;

    #[tokio::test]
    async fn test_catalog_is_admin_managed() {
        let state = test_state(Arc::new(FixedValidator::accepting("High"))).await;
        let (_, learner) = signed_in(&state, "ana@example.org", "Ana").await;
        let (admin_id, admin) = signed_in(&state, "ops@reeftrust.org", "Ops").await;
        make_admin(&state, &admin_id).await;

        let course = json!({"title": "Mangrove basics", "difficulty": "Beginner", "lessons": 6});
        let (status, _) = send(
            app(&state),
            Method::POST,
            "/api/education/courses",
            Some(&learner),
            Some(course.clone()),
        )
        .await;
        assert_eq!(status, 403);

        let (status, _) = send(app(&state), Method::POST, "/api/education/courses", Some(&admin), Some(course)).await;
        assert_eq!(status, 201);

        let (status, _) = send(
            app(&state),
            Method::POST,
            "/api/education/guides",
            Some(&admin),
            Some(json!({"title": "Spotting illegal cutting", "category": "field"})),
        )
        .await;
        assert_eq!(status, 201);

        let (_, courses) = send(app(&state), Method::GET, "/api/education/courses", None, None).await;
        assert_eq!(courses[0]["title"], "Mangrove basics");
        let (_, guides) = send(app(&state), Method::GET, "/api/education/guides", None, None).await;
        assert_eq!(guides.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_course_progress_completion() {
        let state = test_state(Arc::new(FixedValidator::accepting("High"))).await;
        let (_, token) = signed_in(&state, "ana@example.org", "Ana").await;
        let course = database::education::create_course(
            state.db.pool(),
            &database::education::NewCourse {
                title: "Mangrove basics".to_string(),
                description: None,
                difficulty: database::Difficulty::Beginner,
                duration: None,
                lessons: 6,
            },
        )
        .await
        .unwrap();
        let uri = format!("/api/education/courses/{}/progress", course.id);

        let (status, row) = send(app(&state), Method::PUT, &uri, Some(&token), Some(json!({"progress": 40}))).await;
        assert_eq!(status, 200);
        assert_eq!(row["completed"], false);

        let (_, row) = send(app(&state), Method::PUT, &uri, Some(&token), Some(json!({"progress": 100}))).await;
        assert_eq!(row["completed"], true);
        assert!(row["completed_at"].is_string());

        let (status, _) = send(app(&state), Method::PUT, &uri, Some(&token), Some(json!({"progress": 140}))).await;
        assert_eq!(status, 400);

        let (_, rows) = send(app(&state), Method::GET, "/api/education/progress", Some(&token), None).await;
        assert_eq!(rows.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_quiz_score_awards_percentage() {
        let state = test_state(Arc::new(FixedValidator::accepting("High"))).await;
        let (user_id, token) = signed_in(&state, "ana@example.org", "Ana").await;
        let quiz = database::education::create_quiz(
            state.db.pool(),
            &database::education::NewQuiz {
                title: "Coastal species".to_string(),
                description: None,
                difficulty: database::Difficulty::Intermediate,
                questions: 3,
                time_limit: Some(10),
            },
        )
        .await
        .unwrap();
        let uri = format!("/api/education/quizzes/{}/score", quiz.id);

        let (status, result) = send(
            app(&state),
            Method::POST,
            &uri,
            Some(&token),
            Some(json!({"score": 2, "total_questions": 3})),
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(result["coins_awarded"], 66);

        let (_, result) = send(
            app(&state),
            Method::POST,
            &uri,
            Some(&token),
            Some(json!({"score": 0, "total_questions": 3})),
        )
        .await;
        assert_eq!(result["coins_awarded"], 0);

        let balance = coins::get_balance(state.db.pool(), &user_id).await.unwrap().unwrap();
        assert_eq!(balance.balance, 66);
        let ledger = coins::ledger_for_user(state.db.pool(), &user_id).await.unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0].reason, "Quiz completed: Coastal species");

        let (status, _) = send(
            app(&state),
            Method::POST,
            "/api/education/quizzes/missing/score",
            Some(&token),
            Some(json!({"score": 1, "total_questions": 1})),
        )
        .await;
        assert_eq!(status, 404);
    }
}
