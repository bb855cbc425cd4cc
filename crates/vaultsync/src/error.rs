//! Error types for the engine.

use thiserror::Error;
use vaultsync_store::StoreError;
use vaultsync_sync::SyncError;

/// Errors that can occur while running the sync engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A pass is already running on this engine.
    #[error("a sync pass is already running")]
    AlreadyRunning,

    /// Planning or applying failed.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),

    /// Storage error outside of action application (listing, watermark).
    #[error("storage error: {0}")]
    Store(#[from] StoreError),

    /// Settings could not be loaded or are invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error reading or writing settings.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EngineError {
    /// Check if the pass failed on an optimistic-concurrency violation.
    pub fn is_stale_write(&self) -> bool {
        match self {
            EngineError::Sync(e) => e.is_stale_write(),
            EngineError::Store(e) => e.is_stale_write(),
            _ => false,
        }
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Config(err.to_string())
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
