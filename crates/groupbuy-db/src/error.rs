//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)       Business rule (CoreError)            │
//! │       │                                │                                │
//! │       ▼                                ▼                                │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Caller maps to a user-facing response                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use groupbuy_core::CoreError;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - ID doesn't exist
    /// - A status-guarded update matched no row
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - Registering a second user with the same email
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Creating an order for an unknown user
    /// - Referencing a non-existent deposit point
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A business rule refused the operation.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    ///
    /// ## When This Occurs
    /// - A CHECK or NOT NULL constraint rejected the row
    /// - SQLite reported the database as busy or locked
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    ///
    /// ## When This Occurs
    /// - No connection freed up within `connect_timeout`
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    ///
    /// ## When This Occurs
    /// - A row could not be decoded into its type
    /// - I/O failure on the database file
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Whether the error is a refused business rule rather than a storage
    /// failure.
    pub fn is_domain(&self) -> bool {
        matches!(self, DbError::Domain(_))
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → Analyze message for constraint type
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                // UNIQUE constraint: "UNIQUE constraint failed: <table>.<column>"
                // FK constraint: "FOREIGN KEY constraint failed"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Configuration Error
// =============================================================================

/// Errors raised while loading [`DbConfig`](crate::DbConfig) from the
/// environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use groupbuy_core::{DepositPoint, ProrataError};
    use std::time::Duration;

    #[test]
    fn test_domain_errors_pass_through() {
        let err: DbError = CoreError::OrderClosed {
            order_id: "o-1".to_string(),
        }
        .into();
        assert!(err.is_domain());
        assert_eq!(
            err.to_string(),
            "Order o-1 is completed and no longer accepts wishes"
        );

        let err: DbError = CoreError::from(ProrataError::NoItems).into();
        assert!(err.is_domain());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
        assert!(!err.is_domain());
    }

    #[tokio::test]
    async fn test_busy_pool_maps_to_pool_exhausted() {
        let config = DbConfig::in_memory().connect_timeout(Duration::from_millis(50));
        let db = Database::new(config).await.unwrap();

        // The in-memory pool holds a single connection.
        let held = db.pool().begin().await.unwrap();
        let err = db.orders().list_all().await.unwrap_err();
        assert!(matches!(err, DbError::PoolExhausted));

        drop(held);
        assert!(db.orders().list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_check_constraint_maps_to_query_failed() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let admin = crate::repository::test_support::user(&db, "admin@example.org").await;

        let err: DbError = sqlx::query(
            "INSERT INTO orders (id, order_type, target_date, status, created_by, created_at, updated_at)
             VALUES ('o-1', 'weekly', 't', 'open', ?1, 't', 't')",
        )
        .bind(&admin.id)
        .execute(db.pool())
        .await
        .unwrap_err()
        .into();

        match err {
            DbError::QueryFailed(msg) => assert!(msg.contains("CHECK constraint failed")),
            other => panic!("expected QueryFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_row_shape_mismatch_maps_to_internal() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.deposit_points()
            .create("Club", "3 place du Jeu, Lyon", false)
            .await
            .unwrap();

        let err: DbError = sqlx::query_as::<_, DepositPoint>("SELECT id FROM deposit_points")
            .fetch_all(db.pool())
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, DbError::Internal(_)));
    }
}
