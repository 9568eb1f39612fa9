//! Route handlers for the MangroveGuard HTTP API.

pub mod admin;
pub mod auth;
pub mod coins;
pub mod education;
pub mod functions;
pub mod geo;
pub mod health;
pub mod leaderboard;
pub mod reports;

use axum::routing::{get, post, put};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Auth
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/admin/apply", post(auth::apply_admin))
        .route("/api/auth/signin", post(auth::signin))
        .route("/api/auth/signout", post(auth::signout))
        .route("/api/auth/me", get(auth::me).put(auth::update_me))
        // Reports
        .route("/api/reports", post(reports::submit))
        .route("/api/reports/mine", get(reports::mine))
        .route("/api/reports/:id", get(reports::get_one))
        // Admin review
        .route("/api/admin/reports", get(admin::list_reports))
        .route("/api/admin/reports/:id/approve", post(admin::approve_report))
        .route("/api/admin/reports/:id/reject", post(admin::reject_report))
        .route("/api/admin/reports/:id/status", post(admin::set_report_status))
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/roles", get(admin::list_roles))
        .route("/api/admin/roles/:id/approve", post(admin::approve_role))
        .route("/api/admin/roles/:id/reject", post(admin::reject_role))
        .route("/api/admin/super", get(admin::super_check))
        .route("/api/admin/rewards", post(admin::create_reward))
        // Coins and rewards
        .route("/api/coins", get(coins::balance))
        .route("/api/coins/ledger", get(coins::ledger))
        .route("/api/rewards", get(coins::list_rewards))
        .route("/api/rewards/mine", get(coins::my_rewards))
        .route("/api/rewards/:id/redeem", post(coins::redeem))
        // Leaderboard and achievements
        .route("/api/leaderboard", get(leaderboard::leaderboard))
        .route("/api/achievements", get(leaderboard::achievements))
        .route("/api/achievements/check", post(leaderboard::check_achievements))
        // Education
        .route(
            "/api/education/courses",
            get(education::list_courses).post(education::create_course),
        )
        .route(
            "/api/education/quizzes",
            get(education::list_quizzes).post(education::create_quiz),
        )
        .route(
            "/api/education/guides",
            get(education::list_guides).post(education::create_guide),
        )
        .route("/api/education/progress", get(education::my_progress))
        .route(
            "/api/education/courses/:id/progress",
            put(education::update_progress),
        )
        .route("/api/education/quizzes/:id/score", post(education::submit_score))
        // Location
        .route("/api/geo/geocode", get(geo::geocode))
        .route("/api/geo/reverse", get(geo::reverse))
        .route("/api/geo/places", get(geo::places))
        .route("/api/geo/distance", get(geo::distance))
        // Function-style endpoints
        .route("/functions/award-coins", post(functions::award_coins))
        .route("/functions/validate-report", post(functions::validate_report))
}
