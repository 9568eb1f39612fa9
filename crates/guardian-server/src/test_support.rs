//! Helpers for router tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use database::{account, admin_role, profile, Database, VerificationStatus};
use geo_locator::{GeoClient, GeoConfig};
use report_validator::{FixedValidator, ReportValidator};
use serde_json::Value;
use tower::ServiceExt;

use crate::auth::{generate_salt, hash_password};
use crate::config::Config;
use crate::routes;
use crate::state::AppState;

pub const TEST_PASSWORD: &str = "mangroves1";

/// State over a fresh in-memory database.
pub async fn test_state(validator: Arc<FixedValidator>) -> AppState {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    db.migrate().await.unwrap();

    let validator: Arc<dyn ReportValidator> = validator;
    let geo = GeoClient::new(GeoConfig::default()).unwrap();
    let config = Config {
        super_admin_email: Some("chief@mangrove.example".to_string()),
        ..Config::default()
    };

    AppState::new(db, validator, geo, config)
}

pub fn app(state: &AppState) -> Router {
    routes::router().with_state(state.clone())
}

/// Create a user with a profile and a live session. Returns (user_id, token).
pub async fn signed_in(state: &AppState, email: &str, display_name: &str) -> (String, String) {
    let salt = generate_salt();
    let created = account::create_account(
        state.db.pool(),
        email,
        &hash_password(TEST_PASSWORD, &salt),
        &salt,
    )
    .await
    .unwrap();
    profile::create_profile(state.db.pool(), &created.id, Some(display_name), None)
        .await
        .unwrap();
    let session = account::create_session(state.db.pool(), &created.id, 3600)
        .await
        .unwrap();
    (created.id, session.token)
}

/// Give a user an approved admin role.
pub async fn make_admin(state: &AppState, user_id: &str) {
    let role = admin_role::create_application(state.db.pool(), user_id, "Reef Trust", "ngo")
        .await
        .unwrap();
    admin_role::set_verification_status(
        state.db.pool(),
        &role.id,
        VerificationStatus::Approved,
        user_id,
    )
    .await
    .unwrap();
}

/// Send a request and decode the JSON response.
pub async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}
