//! # vaultsync crypt
//!
//! Client-side encryption for replicas that should never see plaintext.
//!
//! [`EncryptedStore`] wraps any [`FileStore`](vaultsync_store::FileStore) and
//! seals content with ChaCha20-Poly1305 on the way in, opening it on the way
//! out. Paths and timestamps are left in the clear so the planner can work
//! on them; only content is protected.
//!
//! ## Key Types
//!
//! - [`EncryptionKey`] - 256-bit symmetric key, random or passphrase-derived
//! - [`EncryptionNonce`] - 96-bit nonce, fresh per seal
//! - [`EncryptedStore`] - The store decorator
//!
//! ## Sealed Format
//!
//! ```text
//! nonce (12 bytes) || ciphertext || tag (16 bytes)
//! ```

pub mod crypto;
pub mod error;
pub mod store;

pub use crypto::{EncryptionKey, EncryptionNonce, SEAL_OVERHEAD};
pub use error::{CryptError, Result};
pub use store::EncryptedStore;
