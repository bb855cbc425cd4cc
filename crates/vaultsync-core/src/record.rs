//! FileRecord: one path as observed in one store at sync time.

use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Metadata for one path in one store's snapshot.
///
/// A record is either live (content exists) or a tombstone (`deleted = true`)
/// standing for a deletion event that still has to be propagated. Within one
/// snapshot there is at most one record per path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileRecord {
    /// Normalized store-relative path.
    pub path: String,
    /// Byte length of the content (0 for tombstones).
    pub size: u64,
    /// Creation instant as last known by the store.
    pub created_at: Timestamp,
    /// Last modification instant as last known by the store.
    ///
    /// For a tombstone this equals `deleted_at`.
    pub updated_at: Timestamp,
    /// Deletion instant, meaningful only when `deleted` is set.
    pub deleted_at: Timestamp,
    /// Whether this record is a tombstone.
    pub deleted: bool,
}

impl FileRecord {
    /// A live record.
    pub fn live(
        path: impl Into<String>,
        size: u64,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            path: path.into(),
            size,
            created_at,
            updated_at,
            deleted_at: 0,
            deleted: false,
        }
    }

    /// A tombstone for a path deleted at `deleted_at`.
    pub fn tombstone(path: impl Into<String>, deleted_at: Timestamp) -> Self {
        Self {
            path: path.into(),
            size: 0,
            created_at: 0,
            updated_at: deleted_at,
            deleted_at,
            deleted: true,
        }
    }

    /// Check if this record is live content.
    pub fn is_live(&self) -> bool {
        !self.deleted
    }

    /// Check if this record is a tombstone.
    pub fn is_tombstone(&self) -> bool {
        self.deleted
    }

    /// Turn a live record into the tombstone that replaces it.
    pub fn into_tombstone(self, deleted_at: Timestamp) -> Self {
        Self::tombstone(self.path, deleted_at)
    }
}
