//! # Error Types
//!
//! Storage errors and the umbrella error returned by the checkout and
//! reporting entry points.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)          Rule violation (CoreError)         │
//! │       │                                    │                            │
//! │       ▼                                    │                            │
//! │  DbError ← categorized storage failure     │                            │
//! │       │                                    │                            │
//! │       └──────────────┬─────────────────────┘                            │
//! │                      ▼                                                  │
//! │  KasirError { Domain | Storage }                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ErrorKind ← what the request shell maps to a response status          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use kasir_core::{CoreError, ValidationError};
use serde::Serialize;
use thiserror::Error;

// =============================================================================
// Storage Error
// =============================================================================

/// Database operation errors.
///
/// Every variant is a storage failure from the caller's point of view.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    ///
    /// ## When This Occurs
    /// - `fetch_one` returns no rows
    /// - Updating or deleting an id that doesn't exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation.
    #[error("Duplicate value for {field}")]
    UniqueViolation { field: String },

    /// Foreign key constraint violation.
    ///
    /// ## When This Occurs
    /// - Inserting a sale line for a sale id that doesn't exist
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// CHECK constraint violation.
    ///
    /// ## When This Occurs
    /// - A write that would drive `stock` or `price` below zero
    #[error("Check constraint violation: {message}")]
    CheckViolation { message: String },

    /// The database stayed locked for longer than `busy_timeout`.
    #[error("Database is busy")]
    Busy,

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
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

                // SQLite reports constraints as text:
                // "UNIQUE constraint failed: <table>.<column>"
                // "FOREIGN KEY constraint failed"
                // "CHECK constraint failed: <expr>"
                if msg.contains("UNIQUE constraint failed") {
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation { field }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("database is locked") || msg.contains("database is busy") {
                    DbError::Busy
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

/// Failures while loading `kasir.toml` and environment overrides.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Kasir Error
// =============================================================================

/// Error category exposed to the request-handling shell.
///
/// ## Mapping
/// ```text
/// ┌────────────────────┬──────────────────────────────┬──────────┐
/// │ Kind               │ Source                       │ Status   │
/// ├────────────────────┼──────────────────────────────┼──────────┤
/// │ InvalidInput       │ CoreError::Validation        │ 4xx      │
/// │ InvalidRange       │ CoreError::InvalidRange      │ 4xx      │
/// │ ProductNotFound    │ CoreError::ProductNotFound   │ 4xx      │
/// │ InsufficientStock  │ CoreError::InsufficientStock │ 4xx      │
/// │ StorageFailure     │ DbError (any)                │ 5xx      │
/// └────────────────────┴──────────────────────────────┴──────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    InvalidInput,
    InvalidRange,
    ProductNotFound,
    InsufficientStock,
    StorageFailure,
}

impl ErrorKind {
    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::InvalidRange => "INVALID_RANGE",
            ErrorKind::ProductNotFound => "PRODUCT_NOT_FOUND",
            ErrorKind::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorKind::StorageFailure => "STORAGE_FAILURE",
        }
    }
}

/// Everything `checkout` and the report operations can fail with.
#[derive(Debug, Error)]
pub enum KasirError {
    #[error(transparent)]
    Domain(#[from] CoreError),

    #[error(transparent)]
    Storage(#[from] DbError),
}

impl KasirError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KasirError::Domain(CoreError::Validation(_)) => ErrorKind::InvalidInput,
            KasirError::Domain(CoreError::InvalidRange { .. }) => ErrorKind::InvalidRange,
            KasirError::Domain(CoreError::ProductNotFound(_)) => ErrorKind::ProductNotFound,
            KasirError::Domain(CoreError::InsufficientStock { .. }) => ErrorKind::InsufficientStock,
            KasirError::Storage(_) => ErrorKind::StorageFailure,
        }
    }

    /// True for errors the caller can fix by changing the request.
    pub fn is_caller_error(&self) -> bool {
        !matches!(self.kind(), ErrorKind::StorageFailure)
    }
}

impl From<ValidationError> for KasirError {
    fn from(err: ValidationError) -> Self {
        KasirError::Domain(CoreError::Validation(err))
    }
}

impl From<sqlx::Error> for KasirError {
    fn from(err: sqlx::Error) -> Self {
        KasirError::Storage(DbError::from(err))
    }
}

/// Result type for checkout and reporting.
pub type KasirResult<T> = Result<T, KasirError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        let err: KasirError = CoreError::ProductNotFound(9).into();
        assert_eq!(err.kind(), ErrorKind::ProductNotFound);
        assert!(err.is_caller_error());

        let err: KasirError = ValidationError::Required {
            field: "cart items".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);

        let err: KasirError = DbError::Busy.into();
        assert_eq!(err.kind(), ErrorKind::StorageFailure);
        assert!(!err.is_caller_error());
    }

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err = DbError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = DbError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, DbError::PoolExhausted));
    }

    #[test]
    fn test_messages_pass_through() {
        let err: KasirError = CoreError::InsufficientStock {
            product_id: 1,
            name: "Kopi".to_string(),
            available: 0,
            requested: 1,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Kopi (id 1): available 0, requested 1"
        );
        assert_eq!(err.kind().code(), "INSUFFICIENT_STOCK");
    }
}
