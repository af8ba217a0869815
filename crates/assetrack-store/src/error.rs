//! Error types for store operations.

use thiserror::Error;

/// Errors that can occur during store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Journal backend error.
    #[error("journal error: {0}")]
    Journal(#[from] assetrack_journal::JournalError),
    /// Identifier or value failed validation.
    #[error("validation error: {0}")]
    Validation(#[from] crate::validation::ValidationError),
    /// Search pattern is not a valid regular expression.
    #[error("invalid pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    /// The operation context was cancelled before the round trip.
    #[error("operation cancelled")]
    Cancelled,
    /// The operation context's deadline passed before the round trip.
    #[error("operation deadline exceeded")]
    DeadlineExceeded,
    /// A write would give two documents in scope the same unique value.
    #[error("duplicate key in {collection}.{field}")]
    DuplicateKey {
        /// Collection holding the unique index.
        collection: String,
        /// Indexed field.
        field: String,
    },
    /// Document is structurally unusable (e.g. malformed `_id`).
    #[error("invalid document: {0}")]
    InvalidDocument(String),
    /// A thread panicked while holding the store lock.
    #[error("store lock poisoned")]
    LockPoisoned,
}
