//! Sync actions: the planner's output, the applier's input.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::record::FileRecord;

/// What a sync pass does for one path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    /// Drop tombstone bookkeeping; no content operation.
    Prune,
    /// Delete the path on both sides, remote first.
    Remove,
    /// Both sides changed; ask the conflict resolver.
    Conflict,
    /// Copy host content to the remote.
    Push,
    /// Copy remote content to the host.
    Pull,
}

impl ActionKind {
    /// All kinds, in a stable order.
    pub const ALL: [ActionKind; 5] = [
        ActionKind::Prune,
        ActionKind::Remove,
        ActionKind::Conflict,
        ActionKind::Push,
        ActionKind::Pull,
    ];

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Prune => "prune",
            ActionKind::Remove => "remove",
            ActionKind::Conflict => "conflict",
            ActionKind::Push => "push",
            ActionKind::Pull => "pull",
        }
    }

    /// Check if this kind moves or deletes content.
    pub fn touches_content(&self) -> bool {
        !matches!(self, ActionKind::Prune)
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One action for one divergent path.
///
/// Carries the metadata both sides reported when the plan was made. The
/// applier derives optimistic-concurrency tokens from these records, never
/// from a fresh listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncAction {
    /// Host-side record, if the host knows the path.
    pub host_file: Option<FileRecord>,
    /// Remote-side record, if the remote knows the path.
    pub remote_file: Option<FileRecord>,
    /// The action to take.
    pub kind: ActionKind,
}

impl SyncAction {
    /// Create a new action.
    pub fn new(
        kind: ActionKind,
        host_file: Option<FileRecord>,
        remote_file: Option<FileRecord>,
    ) -> Self {
        debug_assert!(host_file.is_some() || remote_file.is_some());
        Self {
            host_file,
            remote_file,
            kind,
        }
    }

    /// The path this action is about.
    pub fn path(&self) -> &str {
        self.host_file
            .as_ref()
            .or(self.remote_file.as_ref())
            .map(|r| r.path.as_str())
            .unwrap_or_default()
    }

    /// Same records, different kind. Used when a conflict is redirected.
    pub fn redirect(&self, kind: ActionKind) -> Self {
        Self {
            host_file: self.host_file.clone(),
            remote_file: self.remote_file.clone(),
            kind,
        }
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind, self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_prefers_host() {
        let a = SyncAction::new(
            ActionKind::Push,
            Some(FileRecord::live("a.md", 1, 1, 1)),
            None,
        );
        assert_eq!(a.path(), "a.md");

        let b = SyncAction::new(
            ActionKind::Pull,
            None,
            Some(FileRecord::live("b.md", 1, 1, 1)),
        );
        assert_eq!(b.path(), "b.md");
    }

    #[test]
    fn test_redirect_keeps_records() {
        let a = SyncAction::new(
            ActionKind::Conflict,
            Some(FileRecord::live("a.bin", 1, 1, 5)),
            Some(FileRecord::live("a.bin", 1, 1, 9)),
        );
        let pushed = a.redirect(ActionKind::Push);
        assert_eq!(pushed.kind, ActionKind::Push);
        assert_eq!(pushed.host_file, a.host_file);
        assert_eq!(pushed.remote_file, a.remote_file);
    }

    #[test]
    fn test_display() {
        let a = SyncAction::new(ActionKind::Prune, Some(FileRecord::tombstone("x", 1)), None);
        assert_eq!(a.to_string(), "prune x");
    }
}
