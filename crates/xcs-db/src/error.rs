//! Database error types for xcs-db.

use thiserror::Error;
use xcs_core::errors::CoreError;

/// Errors from store, legacy file, and engine operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL query failed or returned data of the wrong shape.
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),

    /// Expected a result row but none was returned.
    #[error("No result returned")]
    NoResult,

    /// Invalid state encountered (e.g., bad data in the store).
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Filesystem error reading a legacy file or writing a report.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// Domain rule violation.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DatabaseError {
    /// The domain error behind this failure, if any.
    #[must_use]
    pub const fn as_core(&self) -> Option<&CoreError> {
        match self {
            Self::Core(error) => Some(error),
            _ => None,
        }
    }

    /// Whether a write was rejected by a `UNIQUE` constraint.
    #[must_use]
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::LibSql(error) if error.to_string().contains("UNIQUE constraint failed"))
    }
}
