//! Database error types.

use thiserror::Error;

use crate::validation::ValidationError;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLx error (connection, query, etc.)
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Migration error
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Record not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Record already exists
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },

    /// Write referenced a row that does not exist
    #[error("{entity} references a missing record: {id}")]
    MissingReference { entity: &'static str, id: String },

    /// Coin balance too low for a debit
    #[error("insufficient coins for {user_id}: balance {balance}, required {required}")]
    InsufficientBalance {
        user_id: String,
        balance: i64,
        required: i64,
    },

    /// Record exists but cannot be used right now (inactive, out of stock)
    #[error("{entity} unavailable: {reason}")]
    Unavailable { entity: &'static str, reason: String },

    /// Row changed underneath a conditional update
    #[error("conflict: {0}")]
    Conflict(String),

    /// Rejected input
    #[error("invalid input: {0}")]
    Invalid(#[from] ValidationError),
}

impl DatabaseError {
    /// Classify constraint violations raised by an insert or update.
    pub(crate) fn from_write(err: sqlx::Error, entity: &'static str, id: &str) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity,
                    id: id.to_string(),
                };
            }
            if db_err.is_foreign_key_violation() {
                return DatabaseError::MissingReference {
                    entity,
                    id: id.to_string(),
                };
            }
        }
        DatabaseError::Sqlx(err)
    }
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DatabaseError>;
