//! SQLite persistence layer for MangroveGuard.
//!
//! This crate provides async database operations for accounts, profiles,
//! incident reports, the Guardian Coin ledger, rewards, admin roles, the
//! education catalog and achievements using SQLx with SQLite.
//!
//! Single-statement operations are generic over [`sqlx::SqliteExecutor`], so
//! they accept either the pool or an open transaction. Operations that must
//! run several statements atomically take `&mut SqliteConnection`.
//!
//! # Example
//!
//! ```no_run
//! use database::{Database, report, NewReport};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite:mangroveguard.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let new_report = NewReport {
//!         incident_type: "Illegal Cutting".to_string(),
//!         description: "Fresh stumps along the creek".to_string(),
//!         location: "Sundarbans, East Block".to_string(),
//!         ..Default::default()
//!     };
//!     let created = report::create_report(db.pool(), "user-id", &new_report).await?;
//!     println!("{} is {}", created.id, created.status);
//!     Ok(())
//! }
//! ```

pub mod account;
pub mod achievement;
pub mod admin_role;
pub mod coins;
pub mod education;
pub mod error;
pub mod models;
pub mod profile;
pub mod report;
pub mod reward;
pub mod validation;
pub mod verdict;

pub use error::{DatabaseError, Result};
pub use models::{
    Account, Achievement, AdminRole, AdminRoleWithName, CoinBalance, Course, CourseProgress,
    Difficulty, Guide, LedgerEntry, Profile, Quiz, QuizScore, Report, ReportStatus,
    ReportWithReporter, Reward, Session, Severity, StoredVerdict, UserReward,
    VerificationStatus,
};
pub use report::{NewReport, ReportFilter};
pub use validation::ValidationError;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 20;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `sqlite::memory:` for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Current time as unix seconds.
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

/// Generate a new random row ID.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[tokio::test]
    async fn test_signup_rows_and_cascade() {
        let db = test_db().await;
        let user_id = seed_user(&db, "ana@example.org", "Ana").await;

        let fetched = profile::get_profile(db.pool(), &user_id).await.unwrap();
        assert_eq!(fetched.unwrap().display_name.as_deref(), Some("Ana"));

        let balance = coins::get_or_create_balance(db.pool(), &user_id, 50)
            .await
            .unwrap();
        assert_eq!(balance.0.balance, 50);

        sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(&user_id)
            .execute(db.pool())
            .await
            .unwrap();

        assert!(profile::get_profile(db.pool(), &user_id).await.unwrap().is_none());
        assert!(coins::get_balance(db.pool(), &user_id).await.unwrap().is_none());
    }
}
