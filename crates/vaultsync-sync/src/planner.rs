//! Sync action planning.
//!
//! Compares two snapshots and decides, per path, what a pass must do. Four
//! passes run in priority order over an [`ActionPlan`]; a path claimed by an
//! earlier pass is never reconsidered by a later one.
//!
//! 1. Remote tombstones (deletions seen by other hosts)
//! 2. Host tombstones (local deletions)
//! 3. Host live files
//! 4. Remote live files

use std::collections::HashMap;

use vaultsync_core::{ActionKind, FileRecord, SyncAction, Timestamp};

/// Ordered, insert-if-absent association from path to action.
///
/// Insertion order is output order. Assigning an already-claimed path is a
/// no-op, which is what turns pass order into priority order.
#[derive(Debug, Default)]
pub struct ActionPlan {
    actions: Vec<SyncAction>,
    index: HashMap<String, usize>,
}

impl ActionPlan {
    /// Create an empty plan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `action.path()` for `action` unless already claimed.
    ///
    /// Returns `true` if the action was recorded.
    pub fn assign(&mut self, action: SyncAction) -> bool {
        let path = action.path().to_string();
        if self.index.contains_key(&path) {
            return false;
        }
        self.index.insert(path, self.actions.len());
        self.actions.push(action);
        true
    }

    /// Check if a path already has an action.
    pub fn is_assigned(&self, path: &str) -> bool {
        self.index.contains_key(path)
    }

    /// The action for a path, if any.
    pub fn get(&self, path: &str) -> Option<&SyncAction> {
        self.index.get(path).map(|&i| &self.actions[i])
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check if nothing needs doing.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Actions in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = &SyncAction> {
        self.actions.iter()
    }

    /// Consume the plan, yielding actions in assignment order.
    pub fn into_actions(self) -> Vec<SyncAction> {
        self.actions
    }
}

/// Compute the actions needed to reconcile `host` with `remote`.
///
/// `watermark` is the `updated_at` boundary of the last successful pass: a
/// side whose record is newer than it has changed since then. Records are
/// visited in listing order within each pass, so the output is deterministic.
pub fn plan(host: &[FileRecord], remote: &[FileRecord], watermark: Timestamp) -> Vec<SyncAction> {
    let host_by_path = index_by_path(host);
    let remote_by_path = index_by_path(remote);
    let mut plan = ActionPlan::new();

    // Pass 1: remote tombstones
    for remote_file in remote.iter().filter(|r| r.is_tombstone()) {
        let Some(host_file) = host_by_path.get(remote_file.path.as_str()).copied() else {
            // Other hosts may still need to observe this deletion
            continue;
        };
        let kind = if host_file.is_tombstone() {
            ActionKind::Prune
        } else if host_file.created_at < remote_file.deleted_at {
            ActionKind::Remove
        } else {
            ActionKind::Push
        };
        plan.assign(pair(kind, Some(host_file), Some(remote_file)));
    }

    // Pass 2: host tombstones
    for host_file in host.iter().filter(|h| h.is_tombstone()) {
        let remote_file = remote_by_path.get(host_file.path.as_str()).copied();
        let kind = match remote_file {
            None => ActionKind::Prune,
            Some(r) if r.is_tombstone() => continue,
            Some(r) if r.created_at < host_file.deleted_at => ActionKind::Remove,
            Some(_) => ActionKind::Pull,
        };
        plan.assign(pair(kind, Some(host_file), remote_file));
    }

    // Pass 3: host live files
    for host_file in host.iter().filter(|h| h.is_live()) {
        if plan.is_assigned(&host_file.path) {
            continue;
        }
        let remote_file = remote_by_path.get(host_file.path.as_str()).copied();
        let kind = match remote_file {
            None => ActionKind::Push,
            Some(r) if r.is_tombstone() => continue,
            Some(r) if r.updated_at < host_file.updated_at => ActionKind::Push,
            Some(r) if in_sync(host_file, r) => continue,
            Some(r) if r.updated_at > watermark => ActionKind::Conflict,
            Some(_) => continue,
        };
        plan.assign(pair(kind, Some(host_file), remote_file));
    }

    // Pass 4: remote live files
    for remote_file in remote.iter().filter(|r| r.is_live()) {
        if plan.is_assigned(&remote_file.path) {
            continue;
        }
        let host_file = host_by_path.get(remote_file.path.as_str()).copied();
        let kind = match host_file {
            None => ActionKind::Pull,
            Some(h) if h.is_tombstone() => continue,
            Some(h) if h.updated_at < remote_file.updated_at => ActionKind::Pull,
            Some(h) if in_sync(h, remote_file) => continue,
            Some(h) if h.updated_at > watermark => ActionKind::Conflict,
            Some(_) => continue,
        };
        plan.assign(pair(kind, host_file, Some(remote_file)));
    }

    plan.into_actions()
}

/// Same `updated_at` and size: the pair a completed pass leaves behind.
fn in_sync(host: &FileRecord, remote: &FileRecord) -> bool {
    host.updated_at == remote.updated_at && host.size == remote.size
}

fn index_by_path(records: &[FileRecord]) -> HashMap<&str, &FileRecord> {
    records.iter().map(|r| (r.path.as_str(), r)).collect()
}

fn pair(kind: ActionKind, host: Option<&FileRecord>, remote: Option<&FileRecord>) -> SyncAction {
    SyncAction::new(kind, host.cloned(), remote.cloned())
}
