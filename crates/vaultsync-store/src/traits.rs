//! Store traits: the abstract interface to a file replica.
//!
//! The sync engine is storage-agnostic. Implementations include an in-memory
//! store (tests), SQLite, and decorators such as an encrypting wrapper.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use vaultsync_core::{ContentHash, FileRecord, Timestamp};

use crate::error::{Result, StoreError};

/// One replica of the synchronized file set.
///
/// All methods are async so remote and blocking backends fit the same shape.
/// For SQLite, we use `spawn_blocking` internally to avoid blocking the runtime.
#[async_trait]
pub trait FileStore: Send + Sync {
    // ─────────────────────────────────────────────────────────────────────────
    // Metadata
    // ─────────────────────────────────────────────────────────────────────────

    /// List every record: live files and retained tombstones.
    ///
    /// At most one record per path. Tombstone retention is the store's call.
    async fn list_files(&self) -> Result<Vec<FileRecord>>;

    // ─────────────────────────────────────────────────────────────────────────
    // Content
    // ─────────────────────────────────────────────────────────────────────────

    /// Read the content of a live file.
    ///
    /// Returns `NotFound` for absent paths and tombstones.
    async fn get_file_content(&self, path: &str) -> Result<Bytes>;

    /// Create or overwrite a file.
    ///
    /// # Arguments
    /// - `previous_updated_at`: the `updated_at` the caller last observed.
    /// - `new_updated_at`: the timestamp to record for the write.
    ///
    /// # Errors
    /// `StaleWrite` if the recorded `updated_at` is non-zero and differs from
    /// `previous_updated_at`. A tombstone at `path` is replaced.
    async fn update(
        &self,
        path: &str,
        content: Bytes,
        previous_updated_at: Timestamp,
        new_updated_at: Timestamp,
    ) -> Result<()>;

    /// Delete a file, leaving a tombstone stamped `now`.
    ///
    /// Same staleness check as [`FileStore::update`]. Removing a path that is
    /// already a tombstone, or unknown, changes nothing.
    async fn remove(&self, path: &str, previous_updated_at: Timestamp, now: Timestamp)
        -> Result<()>;

    /// Stamp a live file with a new `updated_at` without touching content.
    ///
    /// Same staleness check as [`FileStore::update`]; `NotFound` if the path
    /// has no live content.
    async fn touch(
        &self,
        path: &str,
        previous_updated_at: Timestamp,
        new_updated_at: Timestamp,
    ) -> Result<()>;

    // ─────────────────────────────────────────────────────────────────────────
    // Tombstones
    // ─────────────────────────────────────────────────────────────────────────

    /// Drop the tombstone for `path`. Never deletes live content.
    async fn prune(&self, path: &str) -> Result<()>;
}

/// Persistence for the sync watermark (`last_synced_at`).
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// The last successful sync timestamp, `0` if never synced.
    async fn load_watermark(&self) -> Result<Timestamp>;

    /// Record a successful sync.
    async fn save_watermark(&self, at: Timestamp) -> Result<()>;
}

/// Check an optimistic-concurrency token against what a store recorded.
///
/// A recorded value of `0` (no record) always passes.
pub fn ensure_fresh(path: &str, recorded: Timestamp, expected: Timestamp) -> Result<()> {
    if recorded != 0 && recorded != expected {
        return Err(StoreError::StaleWrite {
            path: path.to_string(),
            expected,
            actual: recorded,
        });
    }
    Ok(())
}

#[async_trait]
impl<S: FileStore + ?Sized> FileStore for Arc<S> {
    async fn list_files(&self) -> Result<Vec<FileRecord>> {
        (**self).list_files().await
    }

    async fn get_file_content(&self, path: &str) -> Result<Bytes> {
        (**self).get_file_content(path).await
    }

    async fn update(
        &self,
        path: &str,
        content: Bytes,
        previous_updated_at: Timestamp,
        new_updated_at: Timestamp,
    ) -> Result<()> {
        (**self)
            .update(path, content, previous_updated_at, new_updated_at)
            .await
    }

    async fn remove(
        &self,
        path: &str,
        previous_updated_at: Timestamp,
        now: Timestamp,
    ) -> Result<()> {
        (**self).remove(path, previous_updated_at, now).await
    }

    async fn touch(
        &self,
        path: &str,
        previous_updated_at: Timestamp,
        new_updated_at: Timestamp,
    ) -> Result<()> {
        (**self)
            .touch(path, previous_updated_at, new_updated_at)
            .await
    }

    async fn prune(&self, path: &str) -> Result<()> {
        (**self).prune(path).await
    }
}

#[async_trait]
impl<W: WatermarkStore + ?Sized> WatermarkStore for Arc<W> {
    async fn load_watermark(&self) -> Result<Timestamp> {
        (**self).load_watermark().await
    }

    async fn save_watermark(&self, at: Timestamp) -> Result<()> {
        (**self).save_watermark(at).await
    }
}

/// Extension trait for content lookups.
pub trait StoreExt: FileStore {
    /// Blake3 hash of a live file's content.
    fn content_hash(&self, path: &str) -> impl Future<Output = Result<ContentHash>> + Send;
}

impl<S: FileStore + ?Sized> StoreExt for S {
    async fn content_hash(&self, path: &str) -> Result<ContentHash> {
        let content = self.get_file_content(path).await?;
        Ok(ContentHash::of(&content))
    }
}
