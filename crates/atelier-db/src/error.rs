//! # Database Error Types
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  sqlx::Error ──► DbError ─────────────┐                                 │
//! │                                       ├──► StoreError ──► ApiError      │
//! │  CoreError (stock, payment, ...) ─────┘   (ledger and catalog writes)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use atelier_core::{CoreError, ValidationError};
use thiserror::Error;

/// Storage failures.
#[derive(Debug, Error)]
pub enum DbError {
    /// ## When This Occurs
    /// - Lookup by id or receipt number finds nothing
    /// - Update or delete touches zero rows
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// ## When This Occurs
    /// - Creating a product with a barcode already in the catalog
    /// - Two commits racing for one receipt number (rolled back)
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// ## When This Occurs
    /// - Deleting a product that appears on a recorded sale
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A CHECK constraint rejected the row (e.g. negative stock).
    #[error("Constraint violation: {0}")]
    CheckViolation(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// A stored value could not be turned back into a domain type.
    #[error("Corrupt row: {0}")]
    Corrupt(String),

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// True for failures caused by the data rather than the database.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            DbError::UniqueViolation { .. }
                | DbError::ForeignKeyViolation { .. }
                | DbError::CheckViolation(_)
        )
    }
}

/// ```text
/// RowNotFound                          → NotFound
/// "UNIQUE constraint failed: t.col"    → UniqueViolation { field: "t.col" }
/// "FOREIGN KEY constraint failed"      → ForeignKeyViolation
/// "CHECK constraint failed"            → CheckViolation
/// PoolTimedOut                         → PoolExhausted
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();

                if let Some(field) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: field.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            sqlx::Error::ColumnDecode { index, source } => {
                DbError::Corrupt(format!("column {}: {}", index, source))
            }

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Store Error
// =============================================================================

/// Outcome of an operation that applies business rules against stored data:
/// either a rule said no, or storage failed.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Rejected(#[from] CoreError),

    #[error(transparent)]
    Db(#[from] DbError),
}

impl From<ValidationError> for StoreError {
    fn from(err: ValidationError) -> Self {
        StoreError::Rejected(CoreError::Validation(err))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Db(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_conflicts() {
        assert!(DbError::duplicate("products.barcode", "111").is_conflict());
        assert!(!DbError::PoolExhausted.is_conflict());
    }

    #[test]
    fn test_store_error_wraps_both_sides() {
        let rejected: StoreError = CoreError::EmptyCart.into();
        assert!(matches!(rejected, StoreError::Rejected(CoreError::EmptyCart)));
        assert_eq!(rejected.to_string(), "Cart is empty");

        let failed: StoreError = DbError::PoolExhausted.into();
        assert!(matches!(failed, StoreError::Db(_)));
    }
}
