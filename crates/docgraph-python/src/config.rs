use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the static Python provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PythonProviderConfig {
    /// Directories searched for top-level modules, in order (like an import path)
    pub roots: Vec<PathBuf>,

    /// Source file extensions (default: [".py"])
    pub file_extensions: Vec<String>,

    /// Directories never reported as submodules
    pub exclude_dirs: Vec<String>,

    /// Maximum file size in bytes (larger files fail to import)
    pub max_file_size: usize,

    /// Parse files in parallel when preloading a package tree
    pub parallel: bool,
}

impl Default for PythonProviderConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            file_extensions: vec![".py".to_string()],
            exclude_dirs: vec![
                "__pycache__".to_string(),
                ".git".to_string(),
                ".venv".to_string(),
                "venv".to_string(),
                ".tox".to_string(),
                ".eggs".to_string(),
                "*.egg-info".to_string(),
            ],
            max_file_size: 10 * 1024 * 1024, // 10MB default
            parallel: false,
        }
    }
}

impl PythonProviderConfig {
    /// Add a search root
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.roots.push(root.into());
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.roots.is_empty() {
            return Err("no search roots configured".to_string());
        }
        if self.roots.iter().any(|root| root.as_os_str().is_empty()) {
            return Err("search roots must not be empty paths".to_string());
        }
        if self.max_file_size == 0 {
            return Err("max_file_size must be positive".to_string());
        }
        if self.file_extensions.iter().all(|ext| ext.trim_start_matches('.').is_empty()) {
            return Err("no source file extensions configured".to_string());
        }
        Ok(())
    }

    /// Whether files with this extension (dot optional) are modules
    pub fn should_parse_extension(&self, extension: &str) -> bool {
        let extension = extension.trim_start_matches('.');
        self.file_extensions
            .iter()
            .any(|ext| ext.trim_start_matches('.') == extension)
    }

    /// Whether a directory is hidden from submodule listings and preloading
    ///
    /// Patterns are exact names or contain a single `*` wildcard
    /// (`*.egg-info`, `build-*`).
    pub fn should_exclude_dir(&self, dir_name: &str) -> bool {
        self.exclude_dirs
            .iter()
            .any(|pattern| match pattern.split_once('*') {
                Some((prefix, suffix)) => {
                    dir_name.len() >= prefix.len() + suffix.len()
                        && dir_name.starts_with(prefix)
                        && dir_name.ends_with(suffix)
                }
                None => dir_name == pattern,
            })
    }

    /// Extensions with a leading dot, as submodule listing expects them
    pub fn suffixes(&self) -> Vec<String> {
        self.file_extensions
            .iter()
            .map(|ext| ext.trim_start_matches('.'))
            .filter(|ext| !ext.is_empty())
            .map(|ext| format!(".{}", ext))
            .collect()
    }
}
