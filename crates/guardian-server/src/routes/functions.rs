//! Function-style endpoints.
//!
//! Award bodies are camelCase; report fields keep their column names.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::coins;
use report_validator::{ReportInput, Verdict};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::auth::{AdminUser, AuthUser};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardRequest {
    pub user_id: String,
    pub amount: i64,
    pub reason: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AwardResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntoResponse for AwardResponse {
    fn into_response(self) -> Response {
        let status = if self.success {
            StatusCode::OK
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(self)).into_response()
    }
}

/// Credit coins to a user.
pub async fn award_coins(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(request): Json<AwardRequest>,
) -> AwardResponse {
    let result = coins::award_coins(
        state.db.pool(),
        &request.user_id,
        request.amount,
        &request.reason,
    )
    .await;

    match result {
        Ok(balance) => {
            info!(
                user = %request.user_id,
                admin = %admin.user.user_id,
                amount = request.amount,
                balance,
                "Coins awarded"
            );
            AwardResponse {
                success: true,
                message: Some(format!(
                    "Awarded {} coins for {}",
                    request.amount, request.reason
                )),
                error: None,
            }
        }
        Err(e) => {
            let err = ApiError::from(e);
            error!(user = %request.user_id, "Coin award failed: {}", err);
            let message = if err.status().is_server_error() {
                "Internal server error".to_string()
            } else {
                err.to_string()
            };
            AwardResponse {
                success: false,
                message: None,
                error: Some(message),
            }
        }
    }
}

/// Ask the validator about a report. Validator failures come back as a
/// fallback verdict, never as an error status.
pub async fn validate_report(
    State(state): State<AppState>,
    _user: AuthUser,
    Json(input): Json<ReportInput>,
) -> Json<Verdict> {
    Json(state.validator.validate(&input).await)
}
