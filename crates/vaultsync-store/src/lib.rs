//! # vaultsync store
//!
//! Storage abstraction for vaultsync. The sync engine talks to both replicas
//! (host and remote) through the [`FileStore`] trait, and persists its
//! watermark through [`WatermarkStore`].
//!
//! ## Key Types
//!
//! - [`FileStore`] - Async trait for listing, reading, writing, deleting files
//! - [`WatermarkStore`] - Async trait for the last-synced timestamp
//! - [`MemoryStore`] - In-memory store for tests and simulations
//! - [`SqliteStore`] - SQLite-backed store (both traits)
//! - [`StoreError`] - Includes [`StoreError::StaleWrite`] for concurrency violations
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bytes::Bytes;
//! use vaultsync_store::{FileStore, MemoryStore, SqliteStore};
//!
//! async fn example() {
//!     let host = MemoryStore::new();
//!     host.put("notes/a.md", Bytes::from_static(b"# hi"), 100).unwrap();
//!
//!     let remote = SqliteStore::open("remote.db").unwrap();
//!     let content = host.get_file_content("notes/a.md").await.unwrap();
//!     remote.update("notes/a.md", content, 100, 200).await.unwrap();
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **Optimistic concurrency**: `update`, `remove` and `touch` take the
//!   `updated_at` the caller last observed and fail with `StaleWrite` if the
//!   store has since recorded a different non-zero value
//! - **Tombstones**: `remove` turns a live record into a tombstone; only
//!   `prune` ever drops one

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::{MemoryStore, MemoryWatermark};
pub use sqlite::SqliteStore;
pub use traits::{ensure_fresh, FileStore, StoreExt, WatermarkStore};
