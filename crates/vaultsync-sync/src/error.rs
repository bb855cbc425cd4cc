//! Error types for the sync module.

use thiserror::Error;
use vaultsync_core::{CoreError, ValidationError};
use vaultsync_store::StoreError;

/// Errors that can occur while applying a sync pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Store operation failed, including stale writes.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Strategy unknown, misconfigured, or inapplicable to the content.
    #[error("resolution error: {0}")]
    Resolution(String),

    /// A snapshot broke the store contract.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// An action is missing the records its kind requires.
    #[error("invalid action: {0}")]
    InvalidAction(String),
}

impl SyncError {
    /// Check if this is an optimistic-concurrency violation.
    pub fn is_stale_write(&self) -> bool {
        matches!(self, SyncError::Store(e) if e.is_stale_write())
    }
}

impl From<CoreError> for SyncError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::UnknownStrategy(_) => SyncError::Resolution(err.to_string()),
            CoreError::InvalidPath(_) => SyncError::InvalidAction(err.to_string()),
        }
    }
}

/// Result type for sync operations.
pub type Result<T> = std::result::Result<T, SyncError>;
