//! Rewards catalog and coin redemptions.

use serde::Deserialize;
use sqlx::{SqliteExecutor, SqlitePool};

use crate::coins;
use crate::error::{DatabaseError, Result};
use crate::models::{Reward, UserReward};
use crate::new_id;
use crate::validation::{check_length, require_text, ValidationError, MAX_DESCRIPTION_LENGTH, MAX_SHORT_TEXT};

/// Catalog entry as submitted by an admin.
#[derive(Debug, Clone, Deserialize)]
pub struct NewReward {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub cost_in_coins: i64,
    pub category: String,
    #[serde(default)]
    pub image_url: Option<String>,
    /// `None` means unlimited.
    #[serde(default)]
    pub stock_quantity: Option<i64>,
}

impl NewReward {
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        require_text("name", &self.name, MAX_SHORT_TEXT)?;
        require_text("category", &self.category, MAX_SHORT_TEXT)?;
        if let Some(description) = &self.description {
            check_length("description", description, MAX_DESCRIPTION_LENGTH)?;
        }
        if self.cost_in_coins < 0 {
            return Err(ValidationError::OutOfRange {
                field: "cost_in_coins".to_string(),
                reason: "cannot be negative".to_string(),
            });
        }
        if matches!(self.stock_quantity, Some(n) if n < 0) {
            return Err(ValidationError::OutOfRange {
                field: "stock_quantity".to_string(),
                reason: "cannot be negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Add an active catalog entry.
pub async fn create_reward(pool: &SqlitePool, reward: &NewReward) -> Result<Reward> {
    reward.validate()?;

    let created = sqlx::query_as::<_, Reward>(
        r#"
        INSERT INTO rewards (id, name, description, cost_in_coins, category, image_url,
                             stock_quantity, is_active)
        VALUES (?, ?, ?, ?, ?, ?, ?, 1)
        RETURNING id, name, description, cost_in_coins, category, image_url,
                  stock_quantity, is_active, created_at
        "#,
    )
    .bind(new_id())
    .bind(reward.name.trim())
    .bind(reward.description.as_deref())
    .bind(reward.cost_in_coins)
    .bind(reward.category.trim())
    .bind(reward.image_url.as_deref())
    .bind(reward.stock_quantity)
    .fetch_one(pool)
    .await?;

    tracing::info!("Created reward {} ({} coins)", created.name, created.cost_in_coins);
    Ok(created)
}

/// Active rewards, cheapest first.
pub async fn list_active_rewards(pool: &SqlitePool) -> Result<Vec<Reward>> {
    let rewards = sqlx::query_as::<_, Reward>(
        r#"
        SELECT id, name, description, cost_in_coins, category, image_url,
               stock_quantity, is_active, created_at
        FROM rewards
        WHERE is_active = 1
        ORDER BY cost_in_coins ASC, name ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rewards)
}

/// Get a reward by ID.
pub async fn get_reward<'e, E>(executor: E, id: &str) -> Result<Reward>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Reward>(
        r#"
        SELECT id, name, description, cost_in_coins, category, image_url,
               stock_quantity, is_active, created_at
        FROM rewards
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Reward",
        id: id.to_string(),
    })
}

/// Redeem a reward for a user.
///
/// Debits the cost, decrements limited stock and records the redemption in
/// one transaction. Returns the redemption and the remaining balance.
pub async fn redeem_reward(
    pool: &SqlitePool,
    user_id: &str,
    reward_id: &str,
) -> Result<(UserReward, i64)> {
    let mut tx = pool.begin().await?;

    let reward = get_reward(&mut *tx, reward_id).await?;
    if !reward.is_active {
        return Err(DatabaseError::Unavailable {
            entity: "Reward",
            reason: format!("{} is no longer offered", reward.name),
        });
    }
    if reward.stock_quantity == Some(0) {
        return Err(DatabaseError::Unavailable {
            entity: "Reward",
            reason: format!("{} is out of stock", reward.name),
        });
    }

    let balance = coins::debit(
        &mut tx,
        user_id,
        reward.cost_in_coins,
        &format!("Redeemed {}", reward.name),
    )
    .await?;

    if reward.stock_quantity.is_some() {
        let updated = sqlx::query(
            r#"
            UPDATE rewards
            SET stock_quantity = stock_quantity - 1
            WHERE id = ? AND stock_quantity > 0
            "#,
        )
        .bind(reward_id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(DatabaseError::Unavailable {
                entity: "Reward",
                reason: format!("{} is out of stock", reward.name),
            });
        }
    }

    let redemption = sqlx::query_as::<_, UserReward>(
        r#"
        INSERT INTO user_rewards (id, user_id, reward_id, coins_spent)
        VALUES (?, ?, ?, ?)
        RETURNING id, user_id, reward_id, coins_spent, status, purchase_date
        "#,
    )
    .bind(new_id())
    .bind(user_id)
    .bind(reward_id)
    .bind(reward.cost_in_coins)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| DatabaseError::from_write(e, "UserReward", user_id))?;

    tx.commit().await?;

    tracing::info!(
        "User {} redeemed {} for {} coins",
        user_id,
        reward.name,
        reward.cost_in_coins
    );
    Ok((redemption, balance))
}

/// A user's redemptions, newest first.
pub async fn list_user_rewards(pool: &SqlitePool, user_id: &str) -> Result<Vec<UserReward>> {
    let rewards = sqlx::query_as::<_, UserReward>(
        r#"
        SELECT id, user_id, reward_id, coins_spent, status, purchase_date
        FROM user_rewards
        WHERE user_id = ?
        ORDER BY purchase_date DESC, rowid DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rewards)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{seed_user, test_db};

    fn tote(stock: Option<i64>) -> NewReward {
        NewReward {
            name: "Mangrove Tote".to_string(),
            description: Some("Recycled canvas".to_string()),
            cost_in_coins: 40,
            category: "merchandise".to_string(),
            image_url: None,
            stock_quantity: stock,
        }
    }

    #[tokio::test]
    async fn test_catalog_cheapest_first() {
        let db = test_db().await;
        create_reward(db.pool(), &tote(None)).await.unwrap();
        let mut seedlings = tote(None);
        seedlings.name = "Plant 5 Seedlings".to_string();
        seedlings.cost_in_coins = 10;
        create_reward(db.pool(), &seedlings).await.unwrap();

        let rewards = list_active_rewards(db.pool()).await.unwrap();
        assert_eq!(rewards[0].name, "Plant 5 Seedlings");
        assert_eq!(rewards[1].name, "Mangrove Tote");
    }

    #[tokio::test]
    async fn test_redeem_debits_and_decrements_stock() {
        let db = test_db().await;
        let user_id = seed_user(&db, "ned@example.org", "Ned").await;
        coins::award_coins(db.pool(), &user_id, 100, "seed").await.unwrap();
        let reward = create_reward(db.pool(), &tote(Some(1))).await.unwrap();

        let (redemption, balance) = redeem_reward(db.pool(), &user_id, &reward.id).await.unwrap();
        assert_eq!(balance, 60);
        assert_eq!(redemption.coins_spent, 40);
        assert_eq!(redemption.status, "pending");

        let reward = get_reward(db.pool(), &reward.id).await.unwrap();
        assert_eq!(reward.stock_quantity, Some(0));

        let again = redeem_reward(db.pool(), &user_id, &reward.id).await;
        assert!(matches!(again, Err(DatabaseError::Unavailable { .. })));
        assert_eq!(list_user_rewards(db.pool(), &user_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_redeem_insufficient_balance_changes_nothing() {
        let db = test_db().await;
        let user_id = seed_user(&db, "ola@example.org", "Ola").await;
        coins::award_coins(db.pool(), &user_id, 10, "seed").await.unwrap();
        let reward = create_reward(db.pool(), &tote(Some(3))).await.unwrap();

        let result = redeem_reward(db.pool(), &user_id, &reward.id).await;
        assert!(matches!(result, Err(DatabaseError::InsufficientBalance { .. })));

        let balance = coins::get_balance(db.pool(), &user_id).await.unwrap().unwrap();
        assert_eq!(balance.balance, 10);
        let reward = get_reward(db.pool(), &reward.id).await.unwrap();
        assert_eq!(reward.stock_quantity, Some(3));
        assert!(list_user_rewards(db.pool(), &user_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_reward_rejected() {
        let db = test_db().await;
        let mut bad = tote(None);
        bad.cost_in_coins = -1;
        assert!(matches!(
            create_reward(db.pool(), &bad).await,
            Err(DatabaseError::Invalid(_))
        ));
    }
}
