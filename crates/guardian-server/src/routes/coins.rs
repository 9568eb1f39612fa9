//! Guardian Coin balance, ledger and reward redemption.

use axum::extract::{Path, State};
use axum::Json;
use database::{coins, reward, LedgerEntry, Reward, UserReward};
use serde::Serialize;
use tracing::info;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: i64,
    /// Whether the welcome bonus was granted by this request.
    pub created: bool,
}

#[derive(Debug, Serialize)]
pub struct Redemption {
    pub redemption: UserReward,
    pub balance: i64,
}

/// Caller's balance, created with the welcome bonus on first access.
pub async fn balance(State(state): State<AppState>, user: AuthUser) -> Result<Json<BalanceResponse>> {
    let (row, created) =
        coins::get_or_create_balance(state.db.pool(), &user.user_id, state.config.welcome_bonus)
            .await?;

    Ok(Json(BalanceResponse {
        balance: row.balance,
        created,
    }))
}

pub async fn ledger(State(state): State<AppState>, user: AuthUser) -> Result<Json<Vec<LedgerEntry>>> {
    let entries = coins::ledger_for_user(state.db.pool(), &user.user_id).await?;
    Ok(Json(entries))
}

/// Active catalog, cheapest first.
pub async fn list_rewards(State(state): State<AppState>) -> Result<Json<Vec<Reward>>> {
    let rewards = reward::list_active_rewards(state.db.pool()).await?;
    Ok(Json(rewards))
}

pub async fn my_rewards(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<UserReward>>> {
    let rewards = reward::list_user_rewards(state.db.pool(), &user.user_id).await?;
    Ok(Json(rewards))
}

/// Spend coins on a reward.
pub async fn redeem(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Json<Redemption>> {
    let pool = state.db.pool();

    // First-time spenders still get their welcome bonus
    coins::get_or_create_balance(pool, &user.user_id, state.config.welcome_bonus).await?;

    let (redemption, balance) = reward::redeem_reward(pool, &user.user_id, &id).await?;
    info!(user = %user.user_id, reward = %id, balance, "Reward redeemed");

    Ok(Json(Redemption {
        redemption,
        balance,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::Method;
    use database::reward::{self, NewReward};
    use report_validator::FixedValidator;

    use crate::test_support::*;

    fn catalog_item(name: &str, cost: i64, stock: Option<i64>) -> NewReward {
        NewReward {
            name: name.to_string(),
            description: None,
            cost_in_coins: cost,
            category: "environmental".to_string(),
            image_url: None,
            stock_quantity: stock,
        }
    }

    #[tokio::test]
    async fn test_welcome_bonus_granted_once() {
        let state = test_state(Arc::new(FixedValidator::accepting("High"))).await;
        let (_, token) = signed_in(&state, "ana@example.org", "Ana").await;

        let (status, first) = send(app(&state), Method::GET, "/api/coins", Some(&token), None).await;
        assert_eq!(status, 200);
        assert_eq!(first["balance"], 50);
        assert_eq!(first["created"], true);

        let (_, second) = send(app(&state), Method::GET, "/api/coins", Some(&token), None).await;
        assert_eq!(second["balance"], 50);
        assert_eq!(second["created"], false);

        let (_, ledger) = send(app(&state), Method::GET, "/api/coins/ledger", Some(&token), None).await;
        let ledger = ledger.as_array().unwrap();
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger[0]["reason"], "Welcome bonus");
    }

    #[tokio::test]
    async fn test_redeem_debits_and_rejects_when_short() {
        let state = test_state(Arc::new(FixedValidator::accepting("High"))).await;
        let (_, token) = signed_in(&state, "ana@example.org", "Ana").await;
        let cheap = reward::create_reward(state.db.pool(), &catalog_item("Seedling", 20, Some(1)))
            .await
            .unwrap();
        let pricey = reward::create_reward(state.db.pool(), &catalog_item("Kayak tour", 400, None))
            .await
            .unwrap();

        let (_, listed) = send(app(&state), Method::GET, "/api/rewards", None, None).await;
        assert_eq!(listed[0]["name"], "Seedling");

        let (status, redeemed) = send(
            app(&state),
            Method::POST,
            &format!("/api/rewards/{}/redeem", cheap.id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, 200);
        assert_eq!(redeemed["balance"], 30);

        let (status, _) = send(
            app(&state),
            Method::POST,
            &format!("/api/rewards/{}/redeem", pricey.id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, 422);

        let (_, balance) = send(app(&state), Method::GET, "/api/coins", Some(&token), None).await;
        assert_eq!(balance["balance"], 30);

        let (status, _) = send(
            app(&state),
            Method::POST,
            &format!("/api/rewards/{}/redeem", cheap.id),
            Some(&token),
            None,
        )
        .await;
        assert_eq!(status, 409);

        let (_, mine) = send(app(&state), Method::GET, "/api/rewards/mine", Some(&token), None).await;
        assert_eq!(mine.as_array().unwrap().len(), 1);
    }
}
