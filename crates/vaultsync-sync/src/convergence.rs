//! Convergence verification.
//!
//! After a pass, both replicas should hold the same live paths with the same
//! content. This compares them directly, by content hash, independent of
//! what the planner thinks.

use std::collections::BTreeMap;

use vaultsync_core::FileRecord;
use vaultsync_store::{FileStore, StoreExt};

use crate::error::Result;
use crate::filter::ExclusionFilter;

/// Differences between the live contents of two stores.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConvergenceReport {
    /// Live on the host only.
    pub only_host: Vec<String>,
    /// Live on the remote only.
    pub only_remote: Vec<String>,
    /// Live on both, different content.
    pub content_mismatch: Vec<String>,
}

impl ConvergenceReport {
    /// Check if the stores hold identical live content.
    pub fn is_converged(&self) -> bool {
        self.only_host.is_empty() && self.only_remote.is_empty() && self.content_mismatch.is_empty()
    }
}

/// Compare the live contents of two stores.
pub async fn verify_convergence<H, R>(host: &H, remote: &R) -> Result<ConvergenceReport>
where
    H: FileStore + ?Sized,
    R: FileStore + ?Sized,
{
    verify_convergence_excluding(host, remote, &ExclusionFilter::default()).await
}

/// Compare the live contents of two stores, ignoring excluded paths.
pub async fn verify_convergence_excluding<H, R>(
    host: &H,
    remote: &R,
    exclusions: &ExclusionFilter,
) -> Result<ConvergenceReport>
where
    H: FileStore + ?Sized,
    R: FileStore + ?Sized,
{
    let host_live = live_by_path(exclusions.retain(host.list_files().await?));
    let remote_live = live_by_path(exclusions.retain(remote.list_files().await?));

    let mut report = ConvergenceReport::default();

    for path in host_live.keys() {
        if !remote_live.contains_key(path) {
            report.only_host.push(path.clone());
            continue;
        }
        if host.content_hash(path).await? != remote.content_hash(path).await? {
            report.content_mismatch.push(path.clone());
        }
    }

    report.only_remote = remote_live
        .keys()
        .filter(|path| !host_live.contains_key(*path))
        .cloned()
        .collect();

    if !report.is_converged() {
        tracing::debug!(
            only_host = report.only_host.len(),
            only_remote = report.only_remote.len(),
            mismatched = report.content_mismatch.len(),
            "stores have not converged"
        );
    }

    Ok(report)
}

fn live_by_path(records: Vec<FileRecord>) -> BTreeMap<String, FileRecord> {
    records
        .into_iter()
        .filter(FileRecord::is_live)
        .map(|r| (r.path.clone(), r))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultsync_store::MemoryStore;

    #[tokio::test]
    async fn test_converged() {
        let host = MemoryStore::new();
        let remote = MemoryStore::new();
        host.put("a.md", &b"same"[..], 1).unwrap();
        remote.put("a.md", &b"same"[..], 2).unwrap();
        // Tombstones do not count
        remote.put("gone.md", &b"x"[..], 1).unwrap();
        remote.delete("gone.md", 3).unwrap();

        let report = verify_convergence(&host, &remote).await.unwrap();
        assert!(report.is_converged(), "{report:?}");
    }

    #[tokio::test]
    async fn test_differences() {
        let host = MemoryStore::new();
        let remote = MemoryStore::new();
        host.put("both.md", &b"one"[..], 1).unwrap();
        remote.put("both.md", &b"two"[..], 1).unwrap();
        host.put("host.md", &b"h"[..], 1).unwrap();
        remote.put("remote.md", &b"r"[..], 1).unwrap();

        let report = verify_convergence(&host, &remote).await.unwrap();
        assert!(!report.is_converged());
        assert_eq!(report.only_host, vec!["host.md"]);
        assert_eq!(report.only_remote, vec!["remote.md"]);
        assert_eq!(report.content_mismatch, vec!["both.md"]);
    }

    #[tokio::test]
    async fn test_exclusions_ignored() {
        let host = MemoryStore::new();
        let remote = MemoryStore::new();
        host.put(".obsidian/workspace.json", &b"{}"[..], 1).unwrap();

        let filter = ExclusionFilter::parse(".obsidian/**");
        let report = verify_convergence_excluding(&host, &remote, &filter)
            .await
            .unwrap();
        assert!(report.is_converged());
    }
}
