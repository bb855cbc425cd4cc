//! Sync action application.
//!
//! Executes one [`SyncAction`] against the two stores. Optimistic-concurrency
//! tokens come from the records captured in the action at planning time, so
//! a store that changed since then rejects the write instead of losing data.
//!
//! Whenever both sides are written, the remote goes first: it is the side
//! other hosts observe, so a failure halfway leaves it authoritative.

use bytes::Bytes;

use vaultsync_core::{ActionKind, FileRecord, SyncAction, Timestamp};
use vaultsync_store::FileStore;

use crate::error::{Result, SyncError};
use crate::resolver::{dispatch, ConflictResolver, Resolution};

/// Applies planned actions to a host and a remote store.
pub struct Applier<'a, H: ?Sized, R: ?Sized> {
    host: &'a H,
    remote: &'a R,
    resolver: &'a ConflictResolver,
}

impl<'a, H, R> Applier<'a, H, R>
where
    H: FileStore + ?Sized,
    R: FileStore + ?Sized,
{
    /// Create an applier over two stores.
    pub fn new(host: &'a H, remote: &'a R, resolver: &'a ConflictResolver) -> Self {
        Self {
            host,
            remote,
            resolver,
        }
    }

    /// Apply one action, stamping writes with `now`.
    ///
    /// Store errors propagate unchanged inside [`SyncError::Store`].
    pub async fn apply(&self, action: &SyncAction, now: Timestamp) -> Result<()> {
        tracing::debug!(%action, now, "applying sync action");

        match action.kind {
            ActionKind::Conflict => self.resolve_conflict(action, now).await,
            _ => self.execute(action, now).await,
        }
    }

    /// The direct action table. Conflicts land here after being redirected.
    async fn execute(&self, action: &SyncAction, now: Timestamp) -> Result<()> {
        match action.kind {
            ActionKind::Prune => self.prune(action).await,
            ActionKind::Remove => self.remove(action, now).await,
            ActionKind::Push => self.push(action, now).await,
            ActionKind::Pull => self.pull(action).await,
            ActionKind::Conflict => Err(SyncError::InvalidAction(format!(
                "{}: conflicts must be classified before execution",
                action.path()
            ))),
        }
    }

    async fn prune(&self, action: &SyncAction) -> Result<()> {
        // Remote tombstones stay: other hosts may not have seen them yet
        if let Some(host_file) = action.host_file.as_ref().filter(|h| h.is_tombstone()) {
            self.host.prune(&host_file.path).await?;
        }
        Ok(())
    }

    async fn remove(&self, action: &SyncAction, now: Timestamp) -> Result<()> {
        let path = action.path();

        if let Some(remote_file) = &action.remote_file {
            self.remote.remove(path, remote_file.updated_at, now).await?;
        }
        if let Some(host_file) = &action.host_file {
            self.host.remove(path, host_file.updated_at, now).await?;
            self.host.prune(path).await?;
        }
        Ok(())
    }

    async fn push(&self, action: &SyncAction, now: Timestamp) -> Result<()> {
        let path = action.path();
        let host_file = live(action.host_file.as_ref(), action, "host")?;
        let token = action
            .remote_file
            .as_ref()
            .map(|r| r.updated_at)
            .unwrap_or(host_file.updated_at);

        let content = self.host.get_file_content(path).await?;
        self.remote.update(path, content, token, now).await?;
        self.host.touch(path, host_file.updated_at, now).await?;
        Ok(())
    }

    async fn pull(&self, action: &SyncAction) -> Result<()> {
        let path = action.path();
        let remote_file = live(action.remote_file.as_ref(), action, "remote")?;
        let token = action
            .host_file
            .as_ref()
            .map(|h| h.updated_at)
            .unwrap_or(remote_file.updated_at);

        let content = self.remote.get_file_content(path).await?;
        // Adopt the remote's timestamp so the next pass sees the pair as equal
        self.host
            .update(path, content, token, remote_file.updated_at)
            .await?;
        Ok(())
    }

    async fn resolve_conflict(&self, action: &SyncAction, now: Timestamp) -> Result<()> {
        let host_file = live(action.host_file.as_ref(), action, "host")?;
        let remote_file = live(action.remote_file.as_ref(), action, "remote")?;

        let strategy = self.resolver.classify(host_file, remote_file);
        let resolution = dispatch(strategy, host_file, remote_file);
        tracing::debug!(path = action.path(), %strategy, ?resolution, "classified conflict");

        match resolution {
            Resolution::Merge => self.merge(host_file, remote_file, now).await,
            Resolution::Skip => Ok(()),
            Resolution::Redirect(kind) => self.execute(&action.redirect(kind), now).await,
        }
    }

    async fn merge(
        &self,
        host_file: &FileRecord,
        remote_file: &FileRecord,
        now: Timestamp,
    ) -> Result<()> {
        let path = host_file.path.as_str();

        let host_bytes = self.host.get_file_content(path).await?;
        let remote_bytes = self.remote.get_file_content(path).await?;
        let host_text = as_text(&host_bytes, path, "host")?;
        let remote_text = as_text(&remote_bytes, path, "remote")?;

        let merged = Bytes::from(
            self.resolver
                .merge(host_file, remote_file, host_text, remote_text),
        );

        self.remote
            .update(path, merged.clone(), remote_file.updated_at, now)
            .await?;
        self.host
            .update(path, merged, host_file.updated_at, now)
            .await?;
        Ok(())
    }
}

fn live<'r>(
    record: Option<&'r FileRecord>,
    action: &SyncAction,
    side: &str,
) -> Result<&'r FileRecord> {
    record.filter(|r| r.is_live()).ok_or_else(|| {
        SyncError::InvalidAction(format!("{}: requires a live {} record", action, side))
    })
}

fn as_text<'b>(bytes: &'b [u8], path: &str, side: &str) -> Result<&'b str> {
    std::str::from_utf8(bytes).map_err(|_| {
        SyncError::Resolution(format!(
            "{}: {} content is not UTF-8 text and cannot be merged",
            path, side
        ))
    })
}
