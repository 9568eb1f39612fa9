//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct Health {
    pub status: String,
    /// Active validator implementation.
    pub validator: String,
    pub geo_configured: bool,
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok".to_string(),
        validator: state.validator.name().to_string(),
        geo_configured: state.geo.is_configured(),
    })
}
