//! Error types for the store module.

use thiserror::Error;
use vaultsync_core::Timestamp;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The target changed since the caller's snapshot was taken.
    #[error("stale write to {path:?}: expected updated_at {expected}, store has {actual}")]
    StaleWrite {
        path: String,
        expected: Timestamp,
        actual: Timestamp,
    },

    /// No live content at this path.
    #[error("file not found: {0}")]
    NotFound(String),

    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Content could not be sealed or opened.
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Invalid data in storage.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),
}

impl StoreError {
    /// Check if this is an optimistic-concurrency violation.
    pub fn is_stale_write(&self) -> bool {
        matches!(self, StoreError::StaleWrite { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
