//! Snapshot validation: structural checks on a store's listing.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::record::FileRecord;
use crate::types::normalize_path;

/// Validate one store's snapshot before it is planned against.
///
/// This performs:
/// - Empty path check
/// - Normalization check (paths are join keys between stores)
/// - One record per path
/// - Tombstones carry no size
pub fn validate_snapshot(records: &[FileRecord]) -> Result<(), ValidationError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(records.len());

    for record in records {
        if record.path.is_empty() {
            return Err(ValidationError::EmptyPath);
        }

        let normalized = normalize_path(&record.path);
        if normalized != record.path {
            return Err(ValidationError::NotNormalized {
                path: record.path.clone(),
                normalized,
            });
        }

        if !seen.insert(record.path.as_str()) {
            return Err(ValidationError::DuplicatePath(record.path.clone()));
        }

        if record.deleted && record.size != 0 {
            return Err(ValidationError::TombstoneWithSize {
                path: record.path.clone(),
                size: record.size,
            });
        }
    }

    Ok(())
}
