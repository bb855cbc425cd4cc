//! # vaultsync testkit
//!
//! Testing utilities for vaultsync.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Scenarios**: Named snapshot pairs with the actions the planner must produce
//! - **Generators**: Proptest strategies for whole host/remote store pairs
//! - **Fixtures**: A host/remote pair of memory stores with plan-and-apply helpers
//! - **Recording**: A store wrapper that logs every call, for ordering checks
//!
//! ## Scenarios
//!
//! ```rust
//! use vaultsync_testkit::scenarios::{all_scenarios, verify_all_scenarios};
//!
//! for (name, ok, actual) in verify_all_scenarios() {
//!     println!("{}: {} {:?}", name, ok, actual);
//! }
//! ```
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use vaultsync_testkit::generators::StorePair;
//!
//! proptest! {
//!     #[test]
//!     fn identical_stores_need_nothing(pair: StorePair) {
//!         let records = pair.host_records();
//!         prop_assert!(vaultsync_sync::plan(&records, &records, pair.watermark).is_empty());
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use vaultsync_testkit::fixtures::SyncFixture;
//!
//! async fn example() {
//!     let fixture = SyncFixture::new();
//!     fixture.host.put("notes/a.md", &b"hello"[..], 100).unwrap();
//!     let applied = fixture.run(0, 1_000).await.unwrap();
//!     assert_eq!(applied.len(), 1);
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod recording;
pub mod scenarios;

pub use fixtures::SyncFixture;
pub use generators::{PathCase, SideState, StorePair};
pub use recording::{CallLog, RecordingStore, Side, StoreCall};
pub use scenarios::{all_scenarios, verify_all_scenarios, Scenario};
