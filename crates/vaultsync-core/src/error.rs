//! Error types for vaultsync core.

use thiserror::Error;

/// Errors from parsing or constructing core values.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown conflict strategy: {0:?}")]
    UnknownStrategy(String),

    #[error("invalid path: {0:?}")]
    InvalidPath(String),
}

/// A store snapshot that breaks the one-record-per-path contract.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("record with empty path")]
    EmptyPath,

    #[error("path is not normalized: {path:?} (expected {normalized:?})")]
    NotNormalized { path: String, normalized: String },

    #[error("duplicate records for path {0:?}")]
    DuplicatePath(String),

    #[error("tombstone for {path:?} has non-zero size {size}")]
    TombstoneWithSize { path: String, size: u64 },
}
