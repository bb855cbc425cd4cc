//! Encrypting store decorator.

use async_trait::async_trait;
use bytes::Bytes;

use vaultsync_core::{FileRecord, Timestamp};
use vaultsync_store::{FileStore, Result};

use crate::crypto::{EncryptionKey, SEAL_OVERHEAD};

/// A [`FileStore`] that seals content before it reaches the inner store.
///
/// Metadata passes through, except that live record sizes are reported as
/// plaintext lengths so both sides of a sync agree on them.
pub struct EncryptedStore<S> {
    inner: S,
    key: EncryptionKey,
}

impl<S: FileStore> EncryptedStore<S> {
    /// Wrap `inner`, sealing with `key`.
    pub fn new(inner: S, key: EncryptionKey) -> Self {
        Self { inner, key }
    }

    /// Wrap `inner` with a key derived from a passphrase.
    pub fn with_passphrase(inner: S, passphrase: &str, vault_id: &str) -> Self {
        Self::new(inner, EncryptionKey::from_passphrase(passphrase, vault_id))
    }

    /// The wrapped store, which only ever holds sealed content.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Unwrap the decorator.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

#[async_trait]
impl<S: FileStore> FileStore for EncryptedStore<S> {
    async fn list_files(&self) -> Result<Vec<FileRecord>> {
        let mut records = self.inner.list_files().await?;
        for record in records.iter_mut().filter(|r| r.is_live()) {
            record.size = record.size.saturating_sub(SEAL_OVERHEAD as u64);
        }
        Ok(records)
    }

    async fn get_file_content(&self, path: &str) -> Result<Bytes> {
        let sealed = self.inner.get_file_content(path).await?;
        let plaintext = self.key.open(&sealed)?;
        Ok(Bytes::from(plaintext))
    }

    async fn update(
        &self,
        path: &str,
        content: Bytes,
        previous_updated_at: Timestamp,
        new_updated_at: Timestamp,
    ) -> Result<()> {
        let sealed = self.key.seal(&content)?;
        self.inner
            .update(path, Bytes::from(sealed), previous_updated_at, new_updated_at)
            .await
    }

    async fn remove(
        &self,
        path: &str,
        previous_updated_at: Timestamp,
        now: Timestamp,
    ) -> Result<()> {
        self.inner.remove(path, previous_updated_at, now).await
    }

    async fn touch(
        &self,
        path: &str,
        previous_updated_at: Timestamp,
        new_updated_at: Timestamp,
    ) -> Result<()> {
        self.inner
            .touch(path, previous_updated_at, new_updated_at)
            .await
    }

    async fn prune(&self, path: &str) -> Result<()> {
        self.inner.prune(path).await
    }
}
