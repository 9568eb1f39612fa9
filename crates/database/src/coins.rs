//! Guardian Coin balances and the coin ledger.
//!
//! Every balance change writes a ledger row in the same transaction, so the
//! sum of a user's ledger always equals their balance.

use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{CoinBalance, LedgerEntry, Severity};
use crate::new_id;
use crate::validation::validate_coin_amount;

/// Award for a severity outside the fixed table.
pub const FALLBACK_COIN_AMOUNT: i64 = 25;

/// Coins paid out when a report of the given severity is approved.
/// Critical incidents pay the High rate.
pub fn coin_amount_for_severity(severity: Severity) -> i64 {
    match severity {
        Severity::Critical | Severity::High => 50,
        Severity::Medium => 30,
        Severity::Low => 15,
        Severity::Pending => FALLBACK_COIN_AMOUNT,
    }
}

/// Coins for a quiz result: `floor(score / total * 100)`.
pub fn quiz_coin_award(score: i64, total_questions: i64) -> i64 {
    if total_questions <= 0 || score <= 0 {
        return 0;
    }
    score.min(total_questions) * 100 / total_questions
}

/// Get a user's balance row, if one exists.
pub async fn get_balance<'e, E>(executor: E, user_id: &str) -> Result<Option<CoinBalance>>
where
    E: SqliteExecutor<'e>,
{
    let balance = sqlx::query_as::<_, CoinBalance>(
        r#"
        SELECT id, user_id, balance, created_at, updated_at
        FROM coins
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(balance)
}

/// Get a user's balance, creating it with `welcome_bonus` on first access.
///
/// Returns the row and whether it was created by this call.
pub async fn get_or_create_balance(
    pool: &SqlitePool,
    user_id: &str,
    welcome_bonus: i64,
) -> Result<(CoinBalance, bool)> {
    let mut tx = pool.begin().await?;

    let inserted = sqlx::query_as::<_, CoinBalance>(
        r#"
        INSERT INTO coins (id, user_id, balance)
        VALUES (?, ?, ?)
        ON CONFLICT(user_id) DO NOTHING
        RETURNING id, user_id, balance, created_at, updated_at
        "#,
    )
    .bind(new_id())
    .bind(user_id)
    .bind(welcome_bonus.max(0))
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| DatabaseError::from_write(e, "CoinBalance", user_id))?;

    let result = match inserted {
        Some(balance) => {
            if balance.balance > 0 {
                insert_ledger_entry(&mut *tx, user_id, balance.balance, "Welcome bonus").await?;
            }
            tracing::info!("Created coin balance for {} ({})", user_id, balance.balance);
            (balance, true)
        }
        None => {
            let balance = get_balance(&mut *tx, user_id)
                .await?
                .ok_or_else(|| DatabaseError::NotFound {
                    entity: "CoinBalance",
                    id: user_id.to_string(),
                })?;
            (balance, false)
        }
    };

    tx.commit().await?;
    Ok(result)
}

/// Add coins within an open transaction, returning the new balance.
///
/// The balance row is created with `amount` when missing.
pub async fn credit(
    conn: &mut SqliteConnection,
    user_id: &str,
    amount: i64,
    reason: &str,
) -> Result<i64> {
    let balance = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO coins (id, user_id, balance)
        VALUES (?, ?, ?)
        ON CONFLICT(user_id) DO UPDATE SET
            balance = coins.balance + excluded.balance,
            updated_at = datetime('now')
        RETURNING balance
        "#,
    )
    .bind(new_id())
    .bind(user_id)
    .bind(amount)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| DatabaseError::from_write(e, "CoinBalance", user_id))?;

    insert_ledger_entry(&mut *conn, user_id, amount, reason).await?;
    Ok(balance)
}

/// Remove coins within an open transaction, returning the new balance.
///
/// Fails with `InsufficientBalance` and changes nothing when the balance is
/// lower than `amount`.
pub async fn debit(
    conn: &mut SqliteConnection,
    user_id: &str,
    amount: i64,
    reason: &str,
) -> Result<i64> {
    let balance = sqlx::query_scalar::<_, i64>(
        r#"
        UPDATE coins
        SET balance = balance - ?, updated_at = datetime('now')
        WHERE user_id = ? AND balance >= ?
        RETURNING balance
        "#,
    )
    .bind(amount)
    .bind(user_id)
    .bind(amount)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(balance) = balance else {
        let current = get_balance(&mut *conn, user_id)
            .await?
            .map(|b| b.balance)
            .unwrap_or(0);
        return Err(DatabaseError::InsufficientBalance {
            user_id: user_id.to_string(),
            balance: current,
            required: amount,
        });
    };

    insert_ledger_entry(&mut *conn, user_id, -amount, reason).await?;
    Ok(balance)
}

/// Award coins to a user, returning the new balance.
pub async fn award_coins(pool: &SqlitePool, user_id: &str, amount: i64, reason: &str) -> Result<i64> {
    validate_coin_amount(amount)?;

    let mut tx = pool.begin().await?;
    let balance = credit(&mut tx, user_id, amount, reason).await?;
    tx.commit().await?;

    tracing::info!("Awarded {} coins to {}: {}", amount, user_id, reason);
    Ok(balance)
}

/// Spend coins, returning the new balance.
pub async fn spend_coins(pool: &SqlitePool, user_id: &str, amount: i64, reason: &str) -> Result<i64> {
    validate_coin_amount(amount)?;

    let mut tx = pool.begin().await?;
    let balance = debit(&mut tx, user_id, amount, reason).await?;
    tx.commit().await?;

    Ok(balance)
}

/// A user's ledger, newest first.
pub async fn ledger_for_user(pool: &SqlitePool, user_id: &str) -> Result<Vec<LedgerEntry>> {
    let entries = sqlx::query_as::<_, LedgerEntry>(
        r#"
        SELECT id, user_id, amount, reason, created_at
        FROM coin_ledger
        WHERE user_id = ?
        ORDER BY id DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

async fn insert_ledger_entry<'e, E>(executor: E, user_id: &str, amount: i64, reason: &str) -> Result<()>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO coin_ledger (user_id, amount, reason)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .bind(reason)
    .execute(executor)
    .await
    .map_err(|e| DatabaseError::from_write(e, "LedgerEntry", user_id))?;

    Ok(())
}
