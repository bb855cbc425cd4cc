//! A store wrapper that logs calls, for checking operation order across
//! two stores.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;

use vaultsync_core::{FileRecord, Timestamp};
use vaultsync_store::{FileStore, Result};

/// Which store a call went to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Host,
    Remote,
}

/// One logged call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub side: Side,
    pub op: &'static str,
    pub path: String,
}

/// A call log shared by any number of recording stores.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<StoreCall>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, side: Side, op: &'static str, path: &str) {
        if let Ok(mut calls) = self.0.lock() {
            calls.push(StoreCall {
                side,
                op,
                path: path.to_string(),
            });
        }
    }

    /// Every call so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.0.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// `(side, op)` pairs, in order.
    pub fn ops(&self) -> Vec<(Side, &'static str)> {
        self.calls().into_iter().map(|c| (c.side, c.op)).collect()
    }

    /// Only the calls that write.
    pub fn writes(&self) -> Vec<(Side, &'static str)> {
        self.ops()
            .into_iter()
            .filter(|(_, op)| *op != "list_files" && *op != "get_file_content")
            .collect()
    }

    pub fn clear(&self) {
        if let Ok(mut calls) = self.0.lock() {
            calls.clear();
        }
    }
}

/// Logs every call to `log`, then forwards it to `inner`.
pub struct RecordingStore<S> {
    inner: S,
    side: Side,
    log: CallLog,
}

impl<S> RecordingStore<S> {
    pub fn new(inner: S, side: Side, log: CallLog) -> Self {
        Self { inner, side, log }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<S: FileStore> FileStore for RecordingStore<S> {
    async fn list_files(&self) -> Result<Vec<FileRecord>> {
        self.log.push(self.side, "list_files", "");
        self.inner.list_files().await
    }

    async fn get_file_content(&self, path: &str) -> Result<Bytes> {
        self.log.push(self.side, "get_file_content", path);
        self.inner.get_file_content(path).await
    }

    async fn update(
        &self,
        path: &str,
        content: Bytes,
        previous_updated_at: Timestamp,
        new_updated_at: Timestamp,
    ) -> Result<()> {
        self.log.push(self.side, "update", path);
        self.inner
            .update(path, content, previous_updated_at, new_updated_at)
            .await
    }

    async fn remove(
        &self,
        path: &str,
        previous_updated_at: Timestamp,
        now: Timestamp,
    ) -> Result<()> {
        self.log.push(self.side, "remove", path);
        self.inner.remove(path, previous_updated_at, now).await
    }

    async fn touch(
        &self,
        path: &str,
        previous_updated_at: Timestamp,
        new_updated_at: Timestamp,
    ) -> Result<()> {
        self.log.push(self.side, "touch", path);
        self.inner
            .touch(path, previous_updated_at, new_updated_at)
            .await
    }

    async fn prune(&self, path: &str) -> Result<()> {
        self.log.push(self.side, "prune", path);
        self.inner.prune(path).await
    }
}
