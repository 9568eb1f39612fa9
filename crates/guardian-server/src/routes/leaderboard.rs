//! Leaderboard and achievements.

use axum::extract::State;
use axum::Json;
use database::{achievement, profile, Achievement, Profile};
use serde::Serialize;

use crate::achievements::{self as achievement_rules, AchievementCheck};
use crate::auth::AuthUser;
use crate::error::Result;
use crate::state::AppState;

/// Profiles shown on the leaderboard.
const LEADERBOARD_SIZE: i64 = 50;

#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    /// 1-based position.
    pub rank: i64,
    pub user_id: String,
    pub display_name: String,
    pub country: String,
    pub points: i64,
}

impl LeaderboardEntry {
    fn new(rank: i64, profile: Profile) -> Self {
        Self {
            rank,
            user_id: profile.user_id,
            display_name: profile
                .display_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| "Anonymous Guardian".to_string()),
            country: profile
                .country
                .filter(|country| !country.trim().is_empty())
                .unwrap_or_else(|| "Unknown".to_string()),
            points: profile.points,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Leaderboard {
    pub entries: Vec<LeaderboardEntry>,
    /// Caller's rank when signed in and on the board.
    pub my_rank: Option<i64>,
}

pub async fn leaderboard(
    State(state): State<AppState>,
    user: Option<AuthUser>,
) -> Result<Json<Leaderboard>> {
    let top = profile::top_by_points(state.db.pool(), LEADERBOARD_SIZE).await?;

    let entries: Vec<LeaderboardEntry> = top
        .into_iter()
        .zip(1..)
        .map(|(profile, rank)| LeaderboardEntry::new(rank, profile))
        .collect();

    let my_rank = user.and_then(|user| {
        entries
            .iter()
            .find(|entry| entry.user_id == user.user_id)
            .map(|entry| entry.rank)
    });

    Ok(Json(Leaderboard { entries, my_rank }))
}

/// Recompute the caller's achievements.
pub async fn check_achievements(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<AchievementCheck>> {
    let checked = achievement_rules::check(&state.db, &user.user_id).await?;
    Ok(Json(checked))
}

pub async fn achievements(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Achievement>>> {
    let list = achievement::list_achievements(state.db.pool(), &user.user_id).await?;
    Ok(Json(list))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::Method;
    use database::{account, profile, report, NewReport, ReportStatus};
    use report_validator::FixedValidator;

    use crate::test_support::*;

    #[tokio::test]
    async fn test_leaderboard_ranks_and_defaults() {
        let state = test_state(Arc::new(FixedValidator::accepting("High"))).await;
        let (ana, ana_token) = signed_in(&state, "ana@example.org", "Ana").await;
        let (ben, _) = signed_in(&state, "ben@example.org", "Ben").await;

        let anon = account::create_account(state.db.pool(), "anon@example.org", "h", "s")
            .await
            .unwrap();
        profile::create_profile(state.db.pool(), &anon.id, None, None)
            .await
            .unwrap();

        profile::add_points(state.db.pool(), &ben, 120).await.unwrap();
        profile::add_points(state.db.pool(), &ana, 80).await.unwrap();
        profile::add_points(state.db.pool(), &anon.id, 10).await.unwrap();

        let (status, board) = send(app(&state), Method::GET, "/api/leaderboard", Some(&ana_token), None).await;
        assert_eq!(status, 200);
        let entries = board["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["display_name"], "Ben");
        assert_eq!(entries[0]["rank"], 1);
        assert_eq!(entries[2]["display_name"], "Anonymous Guardian");
        assert_eq!(entries[2]["country"], "Unknown");
        assert_eq!(board["my_rank"], 2);

        let (status, board) = send(app(&state), Method::GET, "/api/leaderboard", None, None).await;
        assert_eq!(status, 200);
        assert!(board["my_rank"].is_null());
    }

    #[tokio::test]
    async fn test_achievement_check_unlocks_once() {
        let state = test_state(Arc::new(FixedValidator::accepting("High"))).await;
        let (user_id, token) = signed_in(&state, "ana@example.org", "Ana").await;

        let (status, checked) = send(app(&state), Method::POST, "/api/achievements/check", Some(&token), None).await;
        assert_eq!(status, 200);
        assert_eq!(checked["achievements"].as_array().unwrap().len(), 4);
        assert!(checked["newly_earned"].as_array().unwrap().is_empty());

        let created = report::create_report(
            state.db.pool(),
            &user_id,
            &NewReport {
                incident_type: "Illegal Cutting".to_string(),
                description: "Fresh stumps".to_string(),
                location: "Sundarbans".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        let mut conn = state.db.pool().acquire().await.unwrap();
        report::set_review_outcome(
            &mut conn,
            &created.id,
            ReportStatus::Pending,
            ReportStatus::Approved,
            database::Severity::High,
        )
        .await
        .unwrap();
        drop(conn);

        let (_, checked) = send(app(&state), Method::POST, "/api/achievements/check", Some(&token), None).await;
        let earned: Vec<&str> = checked["newly_earned"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(earned, vec!["First Report", "Sharp Eye"]);

        let (_, checked) = send(app(&state), Method::POST, "/api/achievements/check", Some(&token), None).await;
        assert!(checked["newly_earned"].as_array().unwrap().is_empty());

        let (_, list) = send(app(&state), Method::GET, "/api/achievements", Some(&token), None).await;
        let earned_count = list
            .as_array()
            .unwrap()
            .iter()
            .filter(|a| a["earned"] == true)
            .count();
        assert_eq!(earned_count, 2);
    }
}
