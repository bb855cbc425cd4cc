//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use vaultsync_core::{Strategy, SyncAction, Timestamp};
use vaultsync_store::{FileStore, MemoryStore};
use vaultsync_sync::{
    plan, verify_convergence, Applier, ConflictResolver, ConvergenceReport, SyncError,
};

/// A host/remote pair of memory stores with a resolver.
pub struct SyncFixture {
    pub host: MemoryStore,
    pub remote: MemoryStore,
    pub resolver: ConflictResolver,
}

impl SyncFixture {
    /// Empty stores, conflicts on non-text files go to the newer side.
    pub fn new() -> Self {
        Self::with_fallback(Strategy::Latest)
    }

    /// Empty stores with a fallback strategy and no rules.
    pub fn with_fallback(fallback: Strategy) -> Self {
        Self {
            host: MemoryStore::new(),
            remote: MemoryStore::new(),
            resolver: ConflictResolver::new(&[], fallback).expect("no rules to compile"),
        }
    }

    /// Plan against the current contents of both stores.
    pub async fn plan(&self, watermark: Timestamp) -> Result<Vec<SyncAction>, SyncError> {
        let host_files = self.host.list_files().await?;
        let remote_files = self.remote.list_files().await?;
        Ok(plan(&host_files, &remote_files, watermark))
    }

    /// Plan, then apply every action at `now`. Returns the applied actions.
    pub async fn run(
        &self,
        watermark: Timestamp,
        now: Timestamp,
    ) -> Result<Vec<SyncAction>, SyncError> {
        let actions = self.plan(watermark).await?;
        let applier = Applier::new(&self.host, &self.remote, &self.resolver);
        for action in &actions {
            applier.apply(action, now).await?;
        }
        Ok(actions)
    }

    /// Compare live content of both stores.
    pub async fn verify(&self) -> Result<ConvergenceReport, SyncError> {
        verify_convergence(&self.host, &self.remote).await
    }
}

impl Default for SyncFixture {
    fn default() -> Self {
        Self::new()
    }
}
