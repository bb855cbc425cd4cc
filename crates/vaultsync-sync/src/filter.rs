//! Exclusion patterns applied to store listings before planning.

use globset::{Glob, GlobSet, GlobSetBuilder};

use vaultsync_core::FileRecord;

/// A compiled set of exclusion globs.
///
/// Excluded paths are invisible to the planner on both sides.
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    patterns: Vec<String>,
    set: GlobSet,
}

impl ExclusionFilter {
    /// Parse a newline- and/or comma-separated pattern list.
    ///
    /// Invalid patterns are skipped with a warning.
    pub fn parse(text: &str) -> Self {
        let mut builder = GlobSetBuilder::new();
        let mut patterns = Vec::new();

        for pattern in text
            .split(['\n', ','])
            .map(str::trim)
            .filter(|p| !p.is_empty())
        {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                    patterns.push(pattern.to_string());
                }
                Err(e) => tracing::warn!(pattern, error = %e, "skipping invalid exclusion"),
            }
        }

        let set = builder.build().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "exclusion set failed to build, excluding nothing");
            patterns.clear();
            GlobSet::empty()
        });

        Self { patterns, set }
    }

    /// Patterns that compiled, in declared order.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Check if no pattern is active.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check if a path is excluded.
    pub fn is_excluded(&self, path: &str) -> bool {
        self.set.is_match(path)
    }

    /// Drop excluded records from a listing, preserving order.
    pub fn retain(&self, mut records: Vec<FileRecord>) -> Vec<FileRecord> {
        if !self.is_empty() {
            records.retain(|r| !self.is_excluded(&r.path));
        }
        records
    }
}

impl Default for ExclusionFilter {
    fn default() -> Self {
        Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_separators() {
        let filter = ExclusionFilter::parse(".obsidian/**\n*.tmp, drafts/**\n\n ,");
        assert_eq!(filter.patterns(), &[".obsidian/**", "*.tmp", "drafts/**"]);
    }

    #[test]
    fn test_matching() {
        let filter = ExclusionFilter::parse(".obsidian/**\n*.tmp");
        assert!(filter.is_excluded(".obsidian/workspace.json"));
        assert!(filter.is_excluded("notes/scratch.tmp"));
        assert!(!filter.is_excluded("notes/a.md"));
    }

    #[test]
    fn test_invalid_pattern_skipped() {
        let filter = ExclusionFilter::parse("[bad, *.log");
        assert_eq!(filter.patterns(), &["*.log"]);
        assert!(filter.is_excluded("x.log"));
    }

    #[test]
    fn test_retain_keeps_order() {
        let filter = ExclusionFilter::parse("*.tmp");
        let records = vec![
            FileRecord::live("b.md", 1, 1, 1),
            FileRecord::live("x.tmp", 1, 1, 1),
            FileRecord::tombstone("a.md", 2),
        ];
        let kept: Vec<_> = filter.retain(records).into_iter().map(|r| r.path).collect();
        assert_eq!(kept, vec!["b.md", "a.md"]);
    }

    #[test]
    fn test_empty_excludes_nothing() {
        let filter = ExclusionFilter::default();
        assert!(filter.is_empty());
        assert!(!filter.is_excluded("anything"));
        assert!(ExclusionFilter::parse("  \n , ").is_empty());
    }
}
