//! Proptest generators for property-based testing.
//!
//! Timestamps stay in `1..=MAX_TIMESTAMP`, so any `now` above that bound is
//! later than every generated record.

use bytes::Bytes;
use proptest::prelude::*;

use vaultsync_core::{FileRecord, Timestamp};
use vaultsync_store::MemoryStore;

/// Upper bound for generated timestamps.
pub const MAX_TIMESTAMP: Timestamp = 1_000;

/// Generate a normalized path with a text or binary extension.
pub fn sync_path() -> impl Strategy<Value = String> {
    (
        prop::option::of("[a-z]{1,6}"),
        "[a-z]{1,8}",
        prop_oneof![Just("md"), Just("txt"), Just("json"), Just("png"), Just("bin")],
    )
        .prop_map(|(dir, name, ext)| match dir {
            Some(dir) => format!("{}/{}.{}", dir, name, ext),
            None => format!("{}.{}", name, ext),
        })
}

/// Generate a timestamp in range.
pub fn timestamp() -> impl Strategy<Value = Timestamp> {
    1..=MAX_TIMESTAMP
}

/// Generate file content. Always UTF-8 so text merges can run.
pub fn content() -> impl Strategy<Value = String> {
    "[a-z \n]{0,40}".prop_map(String::from)
}

/// State of one path on one side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SideState {
    Absent,
    Live {
        created_at: Timestamp,
        updated_at: Timestamp,
        content: String,
    },
    Tombstone {
        deleted_at: Timestamp,
    },
}

impl SideState {
    /// Record and content for `path`, if present.
    pub fn record(&self, path: &str) -> Option<(FileRecord, Bytes)> {
        match self {
            SideState::Absent => None,
            SideState::Live {
                created_at,
                updated_at,
                content,
            } => Some((
                FileRecord::live(path, content.len() as u64, *created_at, *updated_at),
                Bytes::from(content.clone()),
            )),
            SideState::Tombstone { deleted_at } => {
                Some((FileRecord::tombstone(path, *deleted_at), Bytes::new()))
            }
        }
    }

    /// `(updated_at, content)` of a live state.
    fn live_state(&self) -> Option<(Timestamp, &str)> {
        match self {
            SideState::Live {
                updated_at,
                content,
                ..
            } => Some((*updated_at, content.as_str())),
            _ => None,
        }
    }
}

/// Generate the state of one side.
pub fn side_state() -> impl Strategy<Value = SideState> {
    prop_oneof![
        1 => Just(SideState::Absent),
        3 => (timestamp(), timestamp(), content()).prop_map(|(a, b, content)| SideState::Live {
            created_at: a.min(b),
            updated_at: a.max(b),
            content,
        }),
        2 => timestamp().prop_map(|deleted_at| SideState::Tombstone { deleted_at }),
    ]
}

/// Both sides of one path.
#[derive(Debug, Clone)]
pub struct PathCase {
    pub path: String,
    pub host: SideState,
    pub remote: SideState,
}

/// A host/remote snapshot pair plus the watermark of the last pass.
///
/// Every path is present on at least one side.
#[derive(Debug, Clone)]
pub struct StorePair {
    pub cases: Vec<PathCase>,
    pub watermark: Timestamp,
}

impl StorePair {
    pub fn host_records(&self) -> Vec<FileRecord> {
        self.cases
            .iter()
            .filter_map(|c| c.host.record(&c.path))
            .map(|(record, _)| record)
            .collect()
    }

    pub fn remote_records(&self) -> Vec<FileRecord> {
        self.cases
            .iter()
            .filter_map(|c| c.remote.record(&c.path))
            .map(|(record, _)| record)
            .collect()
    }

    /// Live pairs with equal `updated_at` but different content that the
    /// planner treats as settled: either the sizes match too, so metadata
    /// cannot tell them from a synced pair, or the shared timestamp is not
    /// newer than the watermark.
    pub fn settled_paths(&self) -> Vec<&str> {
        self.cases
            .iter()
            .filter(|c| match (c.host.live_state(), c.remote.live_state()) {
                (Some((host_at, host)), Some((remote_at, remote))) => {
                    host_at == remote_at
                        && host != remote
                        && (host.len() == remote.len() || host_at <= self.watermark)
                }
                _ => false,
            })
            .map(|c| c.path.as_str())
            .collect()
    }

    /// Load both sides into memory stores.
    pub fn seed(&self, host: &MemoryStore, remote: &MemoryStore) -> vaultsync_store::Result<()> {
        for case in &self.cases {
            if let Some((record, content)) = case.host.record(&case.path) {
                host.seed(record, content)?;
            }
            if let Some((record, content)) = case.remote.record(&case.path) {
                remote.seed(record, content)?;
            }
        }
        Ok(())
    }
}

impl Arbitrary for StorePair {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (
            prop::collection::btree_map(sync_path(), (side_state(), side_state()), 0..16),
            0..=MAX_TIMESTAMP,
        )
            .prop_map(|(paths, watermark)| {
                let cases = paths
                    .into_iter()
                    .filter(|(_, (host, remote))| {
                        *host != SideState::Absent || *remote != SideState::Absent
                    })
                    .map(|(path, (host, remote))| PathCase { path, host, remote })
                    .collect();
                StorePair { cases, watermark }
            })
            .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultsync_core::{normalize_path, validate_snapshot};

    proptest! {
        #[test]
        fn test_paths_are_normalized(path in sync_path()) {
            prop_assert_eq!(normalize_path(&path), path);
        }

        #[test]
        fn test_snapshots_are_valid(pair: StorePair) {
            prop_assert!(validate_snapshot(&pair.host_records()).is_ok());
            prop_assert!(validate_snapshot(&pair.remote_records()).is_ok());
        }

        #[test]
        fn test_settled_paths_plan_nothing(pair: StorePair) {
            let host = pair.host_records();
            let remote = pair.remote_records();
            let actions = vaultsync_sync::plan(&host, &remote, pair.watermark);
            for path in pair.settled_paths() {
                let h = host.iter().find(|r| r.path == path).unwrap();
                let r = remote.iter().find(|r| r.path == path).unwrap();
                prop_assert_eq!(h.updated_at, r.updated_at);
                prop_assert!(actions.iter().all(|a| a.path() != path));
            }
        }

        #[test]
        fn test_live_records_are_ordered(state in side_state()) {
            if let SideState::Live { created_at, updated_at, .. } = state {
                prop_assert!(created_at <= updated_at);
            }
        }
    }
}
