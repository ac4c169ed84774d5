use super::{ObjectId, OverrideValue};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Description of an imported namespace (module or package)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceInfo {
    /// Dotted module name as the runtime reports it
    pub name: String,

    pub object: ObjectId,

    pub docstring: Option<String>,

    /// Has a package search path
    pub is_package: bool,

    /// Package without an initializer file
    pub is_namespace: bool,

    /// Directories searched for submodules
    pub search_paths: Vec<PathBuf>,

    /// Explicit export list (`__all__`), in declared order
    pub exports: Option<Vec<String>>,

    /// Override dictionary (`__pdoc__`) declared by the module
    pub overrides: Vec<(String, OverrideValue)>,
}

impl NamespaceInfo {
    pub fn new(name: impl Into<String>, object: ObjectId) -> Self {
        Self {
            name: name.into(),
            object,
            docstring: None,
            is_package: false,
            is_namespace: false,
            search_paths: Vec::new(),
            exports: None,
            overrides: Vec::new(),
        }
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    pub fn with_package(mut self, search_paths: Vec<PathBuf>) -> Self {
        self.is_package = true;
        self.search_paths = search_paths;
        self
    }

    pub fn with_namespace(mut self, namespace: bool) -> Self {
        self.is_namespace = namespace;
        self
    }

    pub fn with_exports(mut self, exports: Vec<String>) -> Self {
        self.exports = Some(exports);
        self
    }

    /// Last segment of the dotted name
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}
