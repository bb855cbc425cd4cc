//! Conflict strategies and the rules that select them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Extensions whose content is always auto-merged on conflict.
pub const TEXT_EXTENSIONS: [&str; 12] = [
    "md",
    "txt",
    "json",
    "yaml",
    "yml",
    "toml",
    "ini",
    "conf",
    "cfg",
    "config",
    "properties",
    "env",
];

/// Check if a path names a text-based file by its extension.
///
/// The comparison is case-insensitive.
pub fn is_text_path(path: &str) -> bool {
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((_, ext)) => TEXT_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// How a conflicting path is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// Merge text content, write the result to both sides.
    Resolve,
    /// Leave both sides as they are.
    Ignore,
    /// The side with the newer `updated_at` wins.
    #[default]
    Latest,
    /// The side with the older `updated_at` wins.
    Oldest,
    /// The remote wins.
    AlwaysPull,
    /// The host wins.
    AlwaysPush,
}

impl Strategy {
    /// Configuration spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Resolve => "resolve",
            Strategy::Ignore => "ignore",
            Strategy::Latest => "latest",
            Strategy::Oldest => "oldest",
            Strategy::AlwaysPull => "always-pull",
            Strategy::AlwaysPush => "always-push",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "resolve" => Ok(Strategy::Resolve),
            "ignore" => Ok(Strategy::Ignore),
            "latest" => Ok(Strategy::Latest),
            "oldest" => Ok(Strategy::Oldest),
            "always-pull" => Ok(Strategy::AlwaysPull),
            "always-push" => Ok(Strategy::AlwaysPush),
            other => Err(CoreError::UnknownStrategy(other.to_string())),
        }
    }
}

/// A user-configured rule: a comma-separated glob list and its strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConflictRule {
    /// Comma-separated glob patterns, e.g. `"*.png, assets/**"`.
    pub glob: String,
    /// Strategy applied to paths matching any of the patterns.
    pub strategy: Strategy,
}

impl ConflictRule {
    /// Create a new rule.
    pub fn new(glob: impl Into<String>, strategy: Strategy) -> Self {
        Self {
            glob: glob.into(),
            strategy,
        }
    }

    /// Parse a rule whose strategy is still a configuration string.
    pub fn parse(glob: impl Into<String>, strategy: &str) -> Result<Self, CoreError> {
        Ok(Self::new(glob, strategy.parse()?))
    }

    /// The individual patterns, in declared order, trimmed, blanks dropped.
    pub fn patterns(&self) -> impl Iterator<Item = &str> + '_ {
        self.glob.split(',').map(str::trim).filter(|p| !p.is_empty())
    }

    /// Flatten rules into one `(pattern, strategy)` pair per pattern.
    pub fn flatten(rules: &[ConflictRule]) -> Vec<(String, Strategy)> {
        rules
            .iter()
            .flat_map(|rule| {
                rule.patterns()
                    .map(move |p| (p.to_string(), rule.strategy))
            })
            .collect()
    }
}
