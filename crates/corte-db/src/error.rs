//! # Database Error Types
//!
//! Error types for database operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          corte_core::ValidationError       │
//! │       │                                   │                             │
//! │       ▼                                   ▼                             │
//! │  DbError (this module) ← one caller-facing taxonomy:                   │
//! │       │                                                                 │
//! │       ├── NotFound / Validation  → "nothing happened", don't retry     │
//! │       └── storage variants       → retryable, but only with an         │
//! │                                    idempotency key (is_retryable())    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use corte_core::ValidationError;

/// Database operation errors.
///
/// These errors wrap sqlx errors and validation failures so repository
/// methods return a single type with enough context to act on.
#[derive(Debug, Error)]
pub enum DbError {
    /// A referenced entity does not resolve.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - A sale/movement references an unknown product, location, employee,
    ///   or provider id
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The request was malformed; nothing was written.
    ///
    /// Raised by corte-core validation before any I/O: non-positive
    /// weights, empty item lists, inverted date ranges, subtotal
    /// mismatches.
    #[error("invalid argument: {0}")]
    Validation(#[from] ValidationError),

    /// Unique constraint violation.
    ///
    /// ## When This Occurs
    /// - A second sale-driven movement for the same sale item and
    ///   direction (idempotency index)
    #[error("duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// Foreign key constraint violation.
    #[error("foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// Database connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed to begin or commit.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("internal database error: {0}")]
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

    /// Whether the caller may retry the operation.
    ///
    /// `NotFound`, `Validation`, and constraint violations fired before or
    /// instead of a write: retrying the same input cannot succeed. The
    /// storage-side failures are transient; a retry is allowed but must
    /// carry an idempotency key, since the original attempt may or may not
    /// have committed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DbError::ConnectionFailed(_)
                | DbError::TransactionFailed(_)
                | DbError::QueryFailed(_)
                | DbError::PoolExhausted
                | DbError::Internal(_)
        )
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

                // SQLite error messages for constraints:
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

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),

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
