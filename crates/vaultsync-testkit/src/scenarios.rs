//! Named planning scenarios.
//!
//! Each scenario is a snapshot pair, a watermark, and the exact action list
//! the planner must produce for it.

use vaultsync_core::{ActionKind, FileRecord, SyncAction, Timestamp};
use vaultsync_sync::plan;

/// A named planning case.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// Human-readable name.
    pub name: &'static str,
    pub host: Vec<FileRecord>,
    pub remote: Vec<FileRecord>,
    pub watermark: Timestamp,
    /// Expected `(path, kind)` pairs, in output order.
    pub expected: Vec<(&'static str, ActionKind)>,
}

impl Scenario {
    /// Run the planner on this scenario.
    pub fn plan(&self) -> Vec<SyncAction> {
        plan(&self.host, &self.remote, self.watermark)
    }

    /// Check if the planner output matches `expected`.
    pub fn check(&self) -> bool {
        let actions = self.plan();
        actions.len() == self.expected.len()
            && actions
                .iter()
                .zip(&self.expected)
                .all(|(a, (path, kind))| a.path() == *path && a.kind == *kind)
    }
}

/// Get all named scenarios.
pub fn all_scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "A: new host file pushes",
            host: vec![FileRecord::live("notes/a.md", 12, 100, 100)],
            remote: vec![],
            watermark: 0,
            expected: vec![("notes/a.md", ActionKind::Push)],
        },
        Scenario {
            name: "B: host deletion after remote creation removes",
            host: vec![FileRecord::tombstone("x.txt", 50)],
            remote: vec![FileRecord::live("x.txt", 3, 40, 40)],
            watermark: 0,
            expected: vec![("x.txt", ActionKind::Remove)],
        },
        Scenario {
            name: "C: older remote is overwritten, not conflicted",
            host: vec![FileRecord::live("config.json", 20, 10, 200)],
            remote: vec![FileRecord::live("config.json", 18, 10, 150)],
            watermark: 100,
            expected: vec![("config.json", ActionKind::Push)],
        },
        Scenario {
            name: "D: both sides changed since watermark conflicts",
            host: vec![FileRecord::live("config.json", 20, 10, 200)],
            remote: vec![FileRecord::live("config.json", 22, 10, 250)],
            watermark: 100,
            expected: vec![("config.json", ActionKind::Conflict)],
        },
        Scenario {
            name: "E: deleted on both sides prunes",
            host: vec![FileRecord::tombstone("gone.md", 70)],
            remote: vec![FileRecord::tombstone("gone.md", 60)],
            watermark: 0,
            expected: vec![("gone.md", ActionKind::Prune)],
        },
        Scenario {
            name: "remote deletion unseen by this host is left alone",
            host: vec![],
            remote: vec![FileRecord::tombstone("old.md", 30)],
            watermark: 0,
            expected: vec![],
        },
        Scenario {
            name: "host file recreated after remote deletion pushes",
            host: vec![FileRecord::live("todo.md", 5, 90, 95)],
            remote: vec![FileRecord::tombstone("todo.md", 80)],
            watermark: 0,
            expected: vec![("todo.md", ActionKind::Push)],
        },
        Scenario {
            name: "remote file recreated after host deletion pulls",
            host: vec![FileRecord::tombstone("todo.md", 80)],
            remote: vec![FileRecord::live("todo.md", 5, 90, 95)],
            watermark: 0,
            expected: vec![("todo.md", ActionKind::Pull)],
        },
        Scenario {
            name: "equal timestamps need nothing",
            host: vec![FileRecord::live("same.md", 4, 10, 300)],
            remote: vec![FileRecord::live("same.md", 4, 10, 300)],
            watermark: 100,
            expected: vec![],
        },
        Scenario {
            name: "passes run tombstones before live files",
            host: vec![
                FileRecord::live("a.md", 1, 10, 10),
                FileRecord::tombstone("b.md", 50),
            ],
            remote: vec![
                FileRecord::live("b.md", 1, 20, 20),
                FileRecord::tombstone("c.md", 40),
                FileRecord::live("d.md", 1, 30, 30),
            ],
            watermark: 0,
            expected: vec![
                ("b.md", ActionKind::Remove),
                ("a.md", ActionKind::Push),
                ("d.md", ActionKind::Pull),
            ],
        },
    ]
}

/// Run every scenario.
///
/// Returns `(name, matches, actual)` where `actual` lists the produced
/// actions as `"kind path"`.
pub fn verify_all_scenarios() -> Vec<(String, bool, Vec<String>)> {
    all_scenarios()
        .iter()
        .map(|s| {
            let actual = s.plan().iter().map(ToString::to_string).collect();
            (s.name.to_string(), s.check(), actual)
        })
        .collect()
}
