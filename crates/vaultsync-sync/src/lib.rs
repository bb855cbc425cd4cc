//! # vaultsync sync
//!
//! The reconciliation core: decides what a sync pass must do and does it.
//!
//! ## Overview
//!
//! A pass compares two snapshots (host and remote listings, tombstones
//! included) against the watermark of the previous successful pass:
//!
//! ```text
//! host.list_files()  ─┐
//!                     ├─> plan() ─> [SyncAction] ─> Applier::apply() ─> stores
//! remote.list_files() ┘                                 │
//!                                               ConflictResolver (conflicts only)
//! ```
//!
//! ## Key Properties
//!
//! - **Pure planning**: [`plan`] never fails and never does I/O
//! - **Priority by pass order**: the first pass to claim a path wins
//! - **Remote first**: every operation touching both sides writes the remote
//!   (the side other hosts observe) before the host
//! - **Idempotent**: re-planning right after a successful pass yields nothing
//!
//! ## Usage
//!
//! ```rust,no_run
//! use vaultsync_core::Strategy;
//! use vaultsync_store::{FileStore, MemoryStore};
//! use vaultsync_sync::{plan, Applier, ConflictResolver};
//!
//! async fn example(host: MemoryStore, remote: MemoryStore) {
//!     let resolver = ConflictResolver::new(&[], Strategy::Latest).unwrap();
//!     let actions = plan(
//!         &host.list_files().await.unwrap(),
//!         &remote.list_files().await.unwrap(),
//!         0,
//!     );
//!
//!     let applier = Applier::new(&host, &remote, &resolver);
//!     for action in &actions {
//!         applier.apply(action, 1_000).await.unwrap();
//!     }
//! }
//! ```

pub mod applier;
pub mod convergence;
pub mod error;
pub mod filter;
pub mod planner;
pub mod resolver;

pub use applier::Applier;
pub use convergence::{verify_convergence, verify_convergence_excluding, ConvergenceReport};
pub use error::{Result, SyncError};
pub use filter::ExclusionFilter;
pub use planner::{plan, ActionPlan};
pub use resolver::{dispatch, ConflictResolver, Resolution};
