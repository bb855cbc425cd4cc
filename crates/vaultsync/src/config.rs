//! Sync settings.
//!
//! Stored as JSON:
//!
//! ```json
//! {
//!   "exclusions": ".obsidian/**\n*.tmp, drafts/**",
//!   "conflict_rules": [{ "glob": "*.png,*.jpg", "strategy": "latest" }],
//!   "fallback_strategy": "always-pull"
//! }
//! ```
//!
//! Every field is optional. Strategy names are checked at load time.

use std::path::Path;

use serde::{Deserialize, Serialize};

use vaultsync_core::{ConflictRule, Strategy};
use vaultsync_sync::{ConflictResolver, ExclusionFilter};

use crate::error::{EngineError, Result};

/// User-facing sync configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    /// Exclusion globs, separated by newlines and/or commas.
    pub exclusions: String,
    /// Conflict rules, evaluated in order.
    pub conflict_rules: Vec<ConflictRule>,
    /// Strategy when no rule matches a non-text path.
    pub fallback_strategy: Strategy,
}

impl SyncSettings {
    /// Parse settings from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize settings to pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write settings to a JSON file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Compile the exclusion list.
    pub fn exclusion_filter(&self) -> ExclusionFilter {
        ExclusionFilter::parse(&self.exclusions)
    }

    /// Compile the conflict rules.
    pub fn resolver(&self) -> Result<ConflictResolver> {
        ConflictResolver::new(&self.conflict_rules, self.fallback_strategy)
            .map_err(|e| EngineError::Config(e.to_string()))
    }
}
