//! In-memory implementation of the store traits.
//!
//! This is primarily for testing. It has the same semantics as SQLite
//! but keeps everything in memory with no persistence.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use bytes::Bytes;

use vaultsync_core::{checked_path, FileRecord, Timestamp};

use crate::error::{Result, StoreError};
use crate::traits::{ensure_fresh, FileStore, WatermarkStore};

/// In-memory file store.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
/// Records are kept in path order, so listings are deterministic.
pub struct MemoryStore {
    inner: RwLock<MemoryStoreInner>,
}

struct MemoryStoreInner {
    files: BTreeMap<String, StoredFile>,
}

struct StoredFile {
    record: FileRecord,
    /// Empty for tombstones.
    content: Bytes,
}

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(MemoryStoreInner {
                files: BTreeMap::new(),
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryStoreInner>> {
        self.inner
            .read()
            .map_err(|e| StoreError::InvalidData(format!("lock poisoned: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryStoreInner>> {
        self.inner
            .write()
            .map_err(|e| StoreError::InvalidData(format!("lock poisoned: {}", e)))
    }

    /// Local edit: create or overwrite a file at `at`, bypassing the
    /// staleness check. This is how a user's own edits land in a store.
    pub fn put(&self, path: &str, content: impl Into<Bytes>, at: Timestamp) -> Result<()> {
        let path = checked_path(path).map_err(|e| StoreError::InvalidData(e.to_string()))?;
        let content = content.into();
        let mut inner = self.write()?;

        let created_at = match inner.files.get(&path) {
            Some(existing) if existing.record.is_live() => existing.record.created_at,
            _ => at,
        };
        let record = FileRecord::live(path.clone(), content.len() as u64, created_at, at);
        inner.files.insert(path, StoredFile { record, content });
        Ok(())
    }

    /// Local edit: delete a file at `at`, leaving a tombstone.
    ///
    /// Returns `false` if there was no live file to delete.
    pub fn delete(&self, path: &str, at: Timestamp) -> Result<bool> {
        let path = checked_path(path).map_err(|e| StoreError::InvalidData(e.to_string()))?;
        let mut inner = self.write()?;

        match inner.files.get_mut(&path) {
            Some(stored) if stored.record.is_live() => {
                stored.record = FileRecord::tombstone(path.clone(), at);
                stored.content = Bytes::new();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Insert a record verbatim. For setting up exact snapshots in tests.
    pub fn seed(&self, record: FileRecord, content: impl Into<Bytes>) -> Result<()> {
        let content = if record.is_live() {
            content.into()
        } else {
            Bytes::new()
        };
        let mut inner = self.write()?;
        inner
            .files
            .insert(record.path.clone(), StoredFile { record, content });
        Ok(())
    }

    /// Current record for `path`, if any.
    pub fn record(&self, path: &str) -> Option<FileRecord> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path).map(|s| s.record.clone())
    }

    /// Current live content for `path`, if any.
    pub fn content(&self, path: &str) -> Option<Bytes> {
        let inner = self.inner.read().ok()?;
        inner
            .files
            .get(path)
            .filter(|s| s.record.is_live())
            .map(|s| s.content.clone())
    }

    /// Number of records, tombstones included.
    pub fn len(&self) -> usize {
        self.inner.read().map(|i| i.files.len()).unwrap_or(0)
    }

    /// Check if the store holds no records at all.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn list_files(&self) -> Result<Vec<FileRecord>> {
        let inner = self.read()?;
        Ok(inner.files.values().map(|s| s.record.clone()).collect())
    }

    async fn get_file_content(&self, path: &str) -> Result<Bytes> {
        let inner = self.read()?;
        match inner.files.get(path) {
            Some(stored) if stored.record.is_live() => Ok(stored.content.clone()),
            _ => Err(StoreError::NotFound(path.to_string())),
        }
    }

    async fn update(
        &self,
        path: &str,
        content: Bytes,
        previous_updated_at: Timestamp,
        new_updated_at: Timestamp,
    ) -> Result<()> {
        let mut inner = self.write()?;

        let existing = inner.files.get(path).map(|s| &s.record);
        let recorded = existing.map(|r| r.updated_at).unwrap_or(0);
        ensure_fresh(path, recorded, previous_updated_at)?;

        let created_at = match existing {
            Some(r) if r.is_live() => r.created_at,
            _ => new_updated_at,
        };
        let record = FileRecord::live(path, content.len() as u64, created_at, new_updated_at);
        inner
            .files
            .insert(path.to_string(), StoredFile { record, content });
        Ok(())
    }

    async fn remove(
        &self,
        path: &str,
        previous_updated_at: Timestamp,
        now: Timestamp,
    ) -> Result<()> {
        let mut inner = self.write()?;

        let Some(stored) = inner.files.get_mut(path) else {
            return Ok(());
        };
        ensure_fresh(path, stored.record.updated_at, previous_updated_at)?;

        if stored.record.is_live() {
            stored.record = FileRecord::tombstone(path, now);
            stored.content = Bytes::new();
        }
        Ok(())
    }

    async fn touch(
        &self,
        path: &str,
        previous_updated_at: Timestamp,
        new_updated_at: Timestamp,
    ) -> Result<()> {
        let mut inner = self.write()?;

        match inner.files.get_mut(path) {
            Some(stored) if stored.record.is_live() => {
                ensure_fresh(path, stored.record.updated_at, previous_updated_at)?;
                stored.record.updated_at = new_updated_at;
                Ok(())
            }
            _ => Err(StoreError::NotFound(path.to_string())),
        }
    }

    async fn prune(&self, path: &str) -> Result<()> {
        let mut inner = self.write()?;
        if inner
            .files
            .get(path)
            .is_some_and(|s| s.record.is_tombstone())
        {
            inner.files.remove(path);
        }
        Ok(())
    }
}

/// In-memory watermark.
#[derive(Debug, Default)]
pub struct MemoryWatermark {
    value: AtomicI64,
}

impl MemoryWatermark {
    /// Create a watermark starting at `at`.
    pub fn starting_at(at: Timestamp) -> Self {
        Self {
            value: AtomicI64::new(at),
        }
    }

    /// Current value without going through the async trait.
    pub fn get(&self) -> Timestamp {
        self.value.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WatermarkStore for MemoryWatermark {
    async fn load_watermark(&self) -> Result<Timestamp> {
        Ok(self.get())
    }

    async fn save_watermark(&self, at: Timestamp) -> Result<()> {
        self.value.store(at, Ordering::SeqCst);
        Ok(())
    }
}
