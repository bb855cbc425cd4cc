//! # vaultsync
//!
//! Bidirectional synchronization between two independently mutable file
//! stores: a local "host" and a shared "remote" that other hosts also sync
//! against.
//!
//! ## Overview
//!
//! Each pass:
//!
//! 1. Reads the watermark (the `now` of the last successful pass)
//! 2. Lists both stores, tombstones included, and drops excluded paths
//! 3. Plans one action per divergent path (`prune`, `remove`, `push`,
//!    `pull`, `conflict`)
//! 4. Applies the actions in order, classifying conflicts by strategy
//! 5. Advances the watermark, only if every action succeeded
//!
//! ## Key Concepts
//!
//! - **Tombstone**: a record of a deletion. Remote tombstones are never
//!   pruned by a host, since other hosts may not have seen them yet.
//! - **Watermark**: a side newer than it changed since the last pass. Both
//!   sides changed means conflict.
//! - **Strategy**: how a conflict is settled. Text files always merge.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vaultsync::{SyncEngine, SyncSettings};
//! use vaultsync::store::{MemoryStore, SqliteStore};
//!
//! async fn example() {
//!     let host = MemoryStore::new();
//!     let remote = SqliteStore::open("remote.db").unwrap();
//!     let state = SqliteStore::open("state.db").unwrap();
//!     let settings = SyncSettings::from_json(r#"{ "exclusions": ".obsidian/**" }"#).unwrap();
//!
//!     let engine = SyncEngine::new(host, remote, state, settings).unwrap();
//!     let report = engine.sync().await.unwrap();
//!     println!("applied {} actions", report.actions.len());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `vaultsync::core` - Data model (FileRecord, SyncAction, Strategy)
//! - `vaultsync::store` - Store traits, memory and SQLite stores
//! - `vaultsync::crypt` - Encrypted store decorator
//! - `vaultsync::sync` - Planner, resolver, applier

pub mod config;
pub mod engine;
pub mod error;

// Re-export component crates
pub use vaultsync_core as core;
pub use vaultsync_crypt as crypt;
pub use vaultsync_store as store;
pub use vaultsync_sync as sync;

// Re-export main types for convenience
pub use config::SyncSettings;
pub use engine::{SyncEngine, SyncReport};
pub use error::{EngineError, Result};

pub use vaultsync_core::{ActionKind, ConflictRule, FileRecord, Strategy, SyncAction, Timestamp};
pub use vaultsync_sync::ConvergenceReport;
