//! Configuration for building and linking documentation graphs.
//!
//! A [`DocConfig`] is plain data and round-trips through JSON:
//!
//! ```json
//! {
//!   "overrides": { "pkg.mod": { "Internal": false, "Api.run": "Run the API." } },
//!   "source_suffixes": [".py"]
//! }
//! ```

use crate::error::{DocError, Result};
use docgraph_reflect_api::OverrideValue;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Per-module override maps, keyed by module name then dotted member path.
pub type OverrideMap = IndexMap<String, IndexMap<String, OverrideValue>>;

/// Configuration for documentation graph construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocConfig {
    /// Overrides applied at link time; they win over overrides the module
    /// declares itself.
    pub overrides: OverrideMap,

    /// File suffixes that count as submodules of a package.
    pub source_suffixes: Vec<String>,
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            overrides: IndexMap::new(),
            source_suffixes: vec![".py".to_string()],
        }
    }
}

impl DocConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: DocConfig = serde_json::from_str(json)
            .map_err(|e| DocError::serialization("Invalid configuration JSON", e))?;
        config.validate().map_err(DocError::config)?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| DocError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Serialize the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DocError::serialization("Failed to serialize configuration", e))
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.source_suffixes.is_empty() {
            return Err("source_suffixes cannot be empty".to_string());
        }

        if let Some(suffix) = self.source_suffixes.iter().find(|s| !s.starts_with('.')) {
            return Err(format!("source suffix '{}' must start with '.'", suffix));
        }

        for (module, entries) in &self.overrides {
            if module.is_empty() {
                return Err("override module name cannot be empty".to_string());
            }
            for (key, value) in entries {
                Override::from_value(module, key, value).map_err(|e| e.to_string())?;
            }
        }

        Ok(())
    }

    /// Add an override for a member of a module.
    pub fn with_override(
        mut self,
        module: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<OverrideValue>,
    ) -> Self {
        self.overrides
            .entry(module.into())
            .or_default()
            .insert(key.into(), value.into());
        self
    }

    /// Set the submodule file suffixes.
    pub fn with_source_suffixes(mut self, suffixes: &[&str]) -> Self {
        self.source_suffixes = suffixes.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Overrides configured for a module.
    pub fn overrides_for(&self, module: &str) -> Option<&IndexMap<String, OverrideValue>> {
        self.overrides.get(module)
    }
}

/// A validated override action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Override {
    /// Remove the member from the graph.
    Remove {
        /// Requested with the deprecated `None` marker
        deprecated: bool,
    },
    /// Replace the member's docstring.
    Docstring(String),
}

impl Override {
    /// Validate a raw override value.
    pub fn from_value(module: &str, key: &str, value: &OverrideValue) -> Result<Self> {
        match value {
            OverrideValue::Flag(false) => Ok(Override::Remove { deprecated: false }),
            OverrideValue::Null => Ok(Override::Remove { deprecated: true }),
            OverrideValue::Text(text) => Ok(Override::Docstring(text.clone())),
            other => Err(DocError::InvalidOverride {
                module: module.to_string(),
                key: key.to_string(),
                found: other.type_name().to_string(),
            }),
        }
    }
}
