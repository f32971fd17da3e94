//! Cross-cutting error types for xcsync.
//!
//! Storage errors (`DatabaseError`) live in `xcs-db` and wrap `CoreError`.
//! The binary converges everything into `anyhow`.

use thiserror::Error;

/// Errors raised by status tracking, transfer, and reconciliation rules.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The canonical store holds state that must be unique but is not
    /// (e.g., a second registration for the same legacy file path).
    #[error("Consistency violation: {0}")]
    Consistency(String),

    /// More than one canonical record matched a legacy row's composite key.
    #[error("Ambiguous record: {count} {kind} records match {key}")]
    AmbiguousRecord {
        kind: String,
        key: String,
        count: usize,
    },

    /// A modification time could not be read as a number.
    #[error("Modification time is not numeric (current: {current:?}, stored: {stored:?})")]
    TypeConversion { current: String, stored: String },

    /// A canonical record expected for a legacy row does not exist.
    #[error("No {kind} record for {key}")]
    MissingRecord { kind: String, key: String },

    /// A field or table name did not resolve.
    #[error("Lookup failed: {0}")]
    Lookup(String),

    /// A record did not have the shape its translation map expects.
    #[error("Attribute mismatch on '{field}': {reason}")]
    AttributeMismatch { field: String, reason: String },

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
