//! # vaultsync core
//!
//! Pure data model for bidirectional file synchronization between a "host"
//! store and a "remote" store.
//!
//! This crate contains no I/O, no storage, no async. It is plain data and
//! small pure functions over it.
//!
//! ## Key Types
//!
//! - [`FileRecord`] - One path as observed in one store (live or tombstone)
//! - [`SyncAction`] - What a sync pass must do for one divergent path
//! - [`ActionKind`] - `prune`, `remove`, `conflict`, `push`, `pull`
//! - [`Strategy`] - How a conflicting path is resolved
//! - [`ConflictRule`] - Glob list mapped to a strategy
//! - [`ContentHash`] - Blake3 digest of file content
//!
//! ## Timestamps
//!
//! All timestamps are [`Timestamp`] values: milliseconds since the Unix
//! epoch, with `0` meaning "never".

pub mod action;
pub mod error;
pub mod hash;
pub mod record;
pub mod strategy;
pub mod types;
pub mod validation;

pub use action::{ActionKind, SyncAction};
pub use error::{CoreError, ValidationError};
pub use hash::ContentHash;
pub use record::FileRecord;
pub use strategy::{is_text_path, ConflictRule, Strategy, TEXT_EXTENSIONS};
pub use types::{checked_path, normalize_path, now_millis, Timestamp};
pub use validation::validate_snapshot;
