//! Shared primitive types.

use crate::error::CoreError;

/// Milliseconds since the Unix epoch. `0` means "never" / "no record".
pub type Timestamp = i64;

/// Get current time in milliseconds.
pub fn now_millis() -> Timestamp {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as Timestamp)
        .unwrap_or(0)
}

/// Normalize a store-relative path.
///
/// Backslashes become `/`, leading `./` and `/` are stripped, and repeated
/// or trailing separators collapse. Normalized paths are the keys that host
/// and remote snapshots are joined on.
pub fn normalize_path(path: &str) -> String {
    let unified = path.replace('\\', "/");
    let mut out = String::with_capacity(unified.len());

    for segment in unified.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if !out.is_empty() {
            out.push('/');
        }
        out.push_str(segment);
    }

    out
}

/// Normalize a user-supplied path, rejecting ones that name nothing.
pub fn checked_path(path: &str) -> Result<String, CoreError> {
    let normalized = normalize_path(path);
    if normalized.is_empty() {
        return Err(CoreError::InvalidPath(path.to_string()));
    }
    Ok(normalized)
}
