//! The sync engine: one pass at a time over a host/remote pair.

use std::sync::atomic::{AtomicBool, Ordering};

use vaultsync_core::{now_millis, validate_snapshot, ActionKind, FileRecord, SyncAction, Timestamp};
use vaultsync_store::{FileStore, WatermarkStore};
use vaultsync_sync::{
    plan, verify_convergence_excluding, Applier, ConflictResolver, ConvergenceReport,
    ExclusionFilter, SyncError,
};

use crate::config::SyncSettings;
use crate::error::{EngineError, Result};

/// Outcome of a successful pass.
#[derive(Debug, Clone, Default)]
pub struct SyncReport {
    /// Watermark the pass planned against.
    pub previous_watermark: Timestamp,
    /// Watermark saved at the end of the pass.
    pub watermark: Timestamp,
    /// Actions applied, in order.
    pub actions: Vec<SyncAction>,
}

impl SyncReport {
    /// Number of applied actions of one kind.
    pub fn count(&self, kind: ActionKind) -> usize {
        self.actions.iter().filter(|a| a.kind == kind).count()
    }

    /// Check if the pass had nothing to do.
    pub fn is_noop(&self) -> bool {
        self.actions.is_empty()
    }
}

/// Reconciles a host store with a remote store.
///
/// Owns both stores and the watermark. Passes on one engine are serialized:
/// a second concurrent call fails with [`EngineError::AlreadyRunning`].
/// Engines sharing stores must be serialized by the caller.
pub struct SyncEngine<H, R, W> {
    host: H,
    remote: R,
    watermark: W,
    settings: SyncSettings,
    resolver: ConflictResolver,
    exclusions: ExclusionFilter,
    running: AtomicBool,
}

impl<H, R, W> SyncEngine<H, R, W>
where
    H: FileStore,
    R: FileStore,
    W: WatermarkStore,
{
    /// Create an engine. Fails if the conflict rules do not compile.
    pub fn new(host: H, remote: R, watermark: W, settings: SyncSettings) -> Result<Self> {
        let resolver = settings.resolver()?;
        let exclusions = settings.exclusion_filter();

        Ok(Self {
            host,
            remote,
            watermark,
            settings,
            resolver,
            exclusions,
            running: AtomicBool::new(false),
        })
    }

    /// The host store.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The remote store.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    /// The watermark store.
    pub fn watermark(&self) -> &W {
        &self.watermark
    }

    /// Active settings.
    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Check if a pass is in progress.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Passes
    // ─────────────────────────────────────────────────────────────────────────

    /// Run a pass stamped with the current time.
    pub async fn sync(&self) -> Result<SyncReport> {
        self.sync_at(now_millis()).await
    }

    /// Run a pass stamped with `now`.
    ///
    /// Aborts on the first failing action. Actions already applied stay
    /// applied; the watermark only advances when every action succeeded.
    pub async fn sync_at(&self, now: Timestamp) -> Result<SyncReport> {
        let _guard = RunningGuard::acquire(&self.running)?;

        let previous_watermark = self.watermark.load_watermark().await?;
        let (host_files, remote_files) = self.snapshot().await?;
        let actions = plan(&host_files, &remote_files, previous_watermark);

        tracing::info!(
            watermark = previous_watermark,
            now,
            host_files = host_files.len(),
            remote_files = remote_files.len(),
            actions = actions.len(),
            "starting sync pass"
        );

        let applier = Applier::new(&self.host, &self.remote, &self.resolver);
        for (applied, action) in actions.iter().enumerate() {
            if let Err(e) = applier.apply(action, now).await {
                tracing::warn!(%action, applied, error = %e, "sync pass aborted");
                return Err(e.into());
            }
        }

        self.watermark.save_watermark(now).await?;
        tracing::info!(watermark = now, actions = actions.len(), "sync pass complete");

        Ok(SyncReport {
            previous_watermark,
            watermark: now,
            actions,
        })
    }

    /// The actions the next pass would apply, without applying them.
    pub async fn preview(&self) -> Result<Vec<SyncAction>> {
        let watermark = self.watermark.load_watermark().await?;
        let (host_files, remote_files) = self.snapshot().await?;
        Ok(plan(&host_files, &remote_files, watermark))
    }

    /// Compare the live content of both stores, honoring exclusions.
    pub async fn verify(&self) -> Result<ConvergenceReport> {
        Ok(verify_convergence_excluding(&self.host, &self.remote, &self.exclusions).await?)
    }

    /// List, filter, and validate both stores.
    async fn snapshot(&self) -> Result<(Vec<FileRecord>, Vec<FileRecord>)> {
        let host_files = self.exclusions.retain(self.host.list_files().await?);
        let remote_files = self.exclusions.retain(self.remote.list_files().await?);

        validate_snapshot(&host_files).map_err(SyncError::from)?;
        validate_snapshot(&remote_files).map_err(SyncError::from)?;

        Ok((host_files, remote_files))
    }
}

/// Holds the running flag for the duration of a pass.
struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| EngineError::AlreadyRunning)?;
        Ok(Self(flag))
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
