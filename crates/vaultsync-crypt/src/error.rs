//! Error types for the crypt module.

use thiserror::Error;
use vaultsync_store::StoreError;

/// Errors that can occur while sealing or opening content.
#[derive(Debug, Error)]
pub enum CryptError {
    /// Encryption error.
    #[error("encryption error: {0}")]
    Encryption(String),

    /// Decryption error (wrong key or tampered content).
    #[error("decryption error: {0}")]
    Decryption(String),

    /// Sealed content too short to contain a nonce and tag.
    #[error("sealed content truncated: {0} bytes")]
    Truncated(usize),
}

impl From<CryptError> for StoreError {
    fn from(err: CryptError) -> Self {
        StoreError::Crypto(err.to_string())
    }
}

/// Result type for crypt operations.
pub type Result<T> = std::result::Result<T, CryptError>;
