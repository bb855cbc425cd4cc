//! Conflict classification and text merging.
//!
//! A conflict is a path both sides changed since the watermark. The
//! resolver picks a [`Strategy`] for it, [`dispatch`] turns the strategy into
//! something the applier can execute, and [`ConflictResolver::merge`]
//! produces the merged text for [`Strategy::Resolve`].

use globset::{Glob, GlobMatcher};

use vaultsync_core::{is_text_path, ActionKind, ConflictRule, FileRecord, Strategy};

use crate::error::{Result, SyncError};

/// What the applier does with a classified conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Write merged text to both sides.
    Merge,
    /// Leave both sides alone.
    Skip,
    /// Execute as a direct push or pull.
    Redirect(ActionKind),
}

/// Map a strategy to a resolution for one conflicting pair.
///
/// Pure: the result depends only on the strategy and the two records'
/// `updated_at`.
pub fn dispatch(strategy: Strategy, host: &FileRecord, remote: &FileRecord) -> Resolution {
    match strategy {
        Strategy::Resolve => Resolution::Merge,
        Strategy::Ignore => Resolution::Skip,
        Strategy::Latest if host.updated_at > remote.updated_at => {
            Resolution::Redirect(ActionKind::Push)
        }
        Strategy::Latest => Resolution::Redirect(ActionKind::Pull),
        Strategy::Oldest if host.updated_at < remote.updated_at => {
            Resolution::Redirect(ActionKind::Push)
        }
        Strategy::Oldest => Resolution::Redirect(ActionKind::Pull),
        Strategy::AlwaysPull => Resolution::Redirect(ActionKind::Pull),
        Strategy::AlwaysPush => Resolution::Redirect(ActionKind::Push),
    }
}

/// Selects a strategy for a conflicting path and merges text content.
#[derive(Debug, Clone)]
pub struct ConflictResolver {
    /// Flattened rules: one matcher per pattern, in declared order.
    rules: Vec<(GlobMatcher, Strategy)>,
    fallback: Strategy,
}

impl ConflictResolver {
    /// Compile `rules` once. Fails on any invalid glob pattern.
    pub fn new(rules: &[ConflictRule], fallback: Strategy) -> Result<Self> {
        let rules = ConflictRule::flatten(rules)
            .into_iter()
            .map(|(pattern, strategy)| {
                Glob::new(&pattern)
                    .map(|glob| (glob.compile_matcher(), strategy))
                    .map_err(|e| {
                        SyncError::Resolution(format!("invalid conflict rule {:?}: {}", pattern, e))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules, fallback })
    }

    /// The strategy used when no rule matches.
    pub fn fallback(&self) -> Strategy {
        self.fallback
    }

    /// Pick the strategy for a conflicting pair.
    ///
    /// Text files always resolve by merging. Otherwise the first matching
    /// rule pattern wins, else the fallback.
    pub fn classify(&self, host: &FileRecord, remote: &FileRecord) -> Strategy {
        let path = if host.path.is_empty() {
            remote.path.as_str()
        } else {
            host.path.as_str()
        };

        if is_text_path(path) {
            return Strategy::Resolve;
        }

        self.rules
            .iter()
            .find(|(matcher, _)| matcher.is_match(path))
            .map(|(_, strategy)| *strategy)
            .unwrap_or(self.fallback)
    }

    /// Merge two text snapshots of one path.
    ///
    /// The older snapshot (by `updated_at`, host on a tie) serves as the merge
    /// base and the newer one as the incoming change. No true common ancestor
    /// is tracked.
    pub fn merge(
        &self,
        host: &FileRecord,
        remote: &FileRecord,
        host_text: &str,
        remote_text: &str,
    ) -> String {
        let (older, newer) = if host.updated_at <= remote.updated_at {
            (host_text, remote_text)
        } else {
            (remote_text, host_text)
        };

        match diffy::merge(older, older, newer) {
            Ok(merged) => merged,
            Err(conflicted) => {
                tracing::warn!(path = %host.path, "merge produced conflict markers");
                conflicted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live(path: &str, updated: i64) -> FileRecord {
        FileRecord::live(path, 1, 1, updated)
    }

    fn resolver(rules: &[(&str, Strategy)], fallback: Strategy) -> ConflictResolver {
        let rules: Vec<_> = rules
            .iter()
            .map(|(glob, strategy)| ConflictRule::new(*glob, *strategy))
            .collect();
        ConflictResolver::new(&rules, fallback).unwrap()
    }

    #[test]
    fn test_text_always_resolves() {
        let r = resolver(&[("*", Strategy::AlwaysPush)], Strategy::Ignore);
        for path in ["a.md", "dir/b.json", "c.yaml", "D.TXT", ".env"] {
            assert_eq!(r.classify(&live(path, 1), &live(path, 2)), Strategy::Resolve);
        }
    }

    #[test]
    fn test_first_matching_pattern_wins() {
        let r = resolver(
            &[
                ("*.png, *.jpg", Strategy::Latest),
                ("*.jpg", Strategy::AlwaysPull),
                ("assets/**", Strategy::AlwaysPush),
            ],
            Strategy::Ignore,
        );

        let classify = |p: &str| r.classify(&live(p, 1), &live(p, 2));
        assert_eq!(classify("photo.jpg"), Strategy::Latest);
        assert_eq!(classify("assets/raw.bin"), Strategy::AlwaysPush);
        assert_eq!(classify("other.pdf"), Strategy::Ignore);
    }

    #[test]
    fn test_glob_matches_nested_paths() {
        let r = resolver(&[("*.png", Strategy::Oldest)], Strategy::Latest);
        assert_eq!(
            r.classify(&live("img/deep/x.png", 1), &live("img/deep/x.png", 2)),
            Strategy::Oldest
        );
    }

    #[test]
    fn test_invalid_glob_rejected() {
        let rules = vec![ConflictRule::new("[unclosed", Strategy::Latest)];
        assert!(matches!(
            ConflictResolver::new(&rules, Strategy::Latest),
            Err(SyncError::Resolution(_))
        ));
    }

    #[test]
    fn test_dispatch_table() {
        let older = live("a.bin", 100);
        let newer = live("a.bin", 200);
        let push = Resolution::Redirect(ActionKind::Push);
        let pull = Resolution::Redirect(ActionKind::Pull);

        assert_eq!(dispatch(Strategy::Resolve, &older, &newer), Resolution::Merge);
        assert_eq!(dispatch(Strategy::Ignore, &older, &newer), Resolution::Skip);
        assert_eq!(dispatch(Strategy::Latest, &newer, &older), push);
        assert_eq!(dispatch(Strategy::Latest, &older, &newer), pull);
        assert_eq!(dispatch(Strategy::Oldest, &older, &newer), push);
        assert_eq!(dispatch(Strategy::Oldest, &newer, &older), pull);
        assert_eq!(dispatch(Strategy::AlwaysPull, &newer, &older), pull);
        assert_eq!(dispatch(Strategy::AlwaysPush, &older, &newer), push);
    }

    #[test]
    fn test_dispatch_ties_pull() {
        let a = live("a.bin", 100);
        let pull = Resolution::Redirect(ActionKind::Pull);
        assert_eq!(dispatch(Strategy::Latest, &a, &a), pull);
        assert_eq!(dispatch(Strategy::Oldest, &a, &a), pull);
    }

    #[test]
    fn test_merge_takes_newer_changes() {
        let r = resolver(&[], Strategy::Latest);
        let host = live("c.json", 200);
        let remote = live("c.json", 250);

        let merged = r.merge(&host, &remote, "a\nb\nc\n", "a\nB\nc\nd\n");
        assert_eq!(merged, "a\nB\nc\nd\n");

        // Same inputs with the ages swapped: the host text is now newer
        let merged = r.merge(&remote, &host, "a\nb\nc\n", "a\nB\nc\nd\n");
        assert_eq!(merged, "a\nb\nc\n");
    }

    #[test]
    fn test_merge_tie_treats_host_as_older() {
        let r = resolver(&[], Strategy::Latest);
        let host = live("n.md", 300);
        let remote = live("n.md", 300);
        assert_eq!(r.merge(&host, &remote, "old\n", "new\n"), "new\n");
    }
}
