//! # Data Layer Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error) / injected failure (MemoryDataService)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError ← the data service rejected or failed the call                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError ← adds validation, domain rules, and the orphaned sale     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ApiError (in back-office app) ← serialized for the screen             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use dokon_core::{CoreError, ValidationError};
use thiserror::Error;

// =============================================================================
// DbError
// =============================================================================

/// Errors raised by a [`crate::DataService`].
#[derive(Debug, Error)]
pub enum DbError {
    /// No row with this id in the table.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Pool closed or exhausted
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A row could not be converted to or from JSON.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal database error.
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
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → DbError::NotFound
/// sqlx::Error::Database       → DbError::QueryFailed
/// sqlx::Error::PoolTimedOut   → DbError::ConnectionFailed
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound {
                entity: "Record".to_string(),
                id: "unknown".to_string(),
            },
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => {
                DbError::ConnectionFailed("Connection pool exhausted".to_string())
            }
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

/// Result type for data service operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// StoreError
// =============================================================================

/// Errors returned by [`crate::EntityStore`] operations.
///
/// Whenever one of these is returned the in-memory collections are exactly
/// as they were before the call, with one exception: a stock movement whose
/// product update failed stays recorded in `stock_movements`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Input rejected before any write.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A business rule refused the operation before any write.
    #[error(transparent)]
    Domain(#[from] CoreError),

    /// The mutation targets an id that does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The data service rejected or failed the call.
    #[error("Data service error: {0}")]
    ExternalService(DbError),

    /// The sale header was written but its line items were not.
    ///
    /// ```text
    /// insert sales ──► OK (sale_id)
    ///      │
    ///      ▼
    /// insert sale_items ──► FAILED
    ///      │
    ///      ▼
    /// OrphanedSale { sale_id } ← header persisted with no items,
    ///                            nothing rolls it back
    /// ```
    #[error("Sale {sale_id} was saved without its items: {source}")]
    OrphanedSale {
        sale_id: String,
        #[source]
        source: DbError,
    },
}

impl StoreError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        StoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}

/// `DbError::NotFound` keeps its meaning; anything else is an external
/// service failure.
impl From<DbError> for StoreError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => StoreError::NotFound { entity, id },
            other => StoreError::ExternalService(other),
        }
    }
}

/// Result type for entity store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_keeps_its_meaning() {
        let err: StoreError = DbError::not_found("products", "p-1").into();
        assert!(matches!(err, StoreError::NotFound { ref id, .. } if id == "p-1"));

        let err: StoreError = DbError::QueryFailed("boom".to_string()).into();
        assert!(matches!(err, StoreError::ExternalService(_)));
    }

    #[test]
    fn test_orphaned_sale_message() {
        let err = StoreError::OrphanedSale {
            sale_id: "s-1".to_string(),
            source: DbError::QueryFailed("disk full".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Sale s-1 was saved without its items: Query failed: disk full"
        );
    }
}
