//! Error and warning types for docgraph operations.
//!
//! Fatal conditions are returned as [`DocError`] through [`Result<T>`].
//! Conditions that only degrade the output are reported as [`DocWarning`],
//! collected on the [`Context`](crate::Context) and logged.

use docgraph_reflect_api::ReflectError;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for docgraph operations.
pub type Result<T> = std::result::Result<T, DocError>;

/// Fatal errors that abort a construction or link call.
#[derive(Error, Debug)]
pub enum DocError {
    /// The reflection provider failed
    #[error("Reflection error: {0}")]
    Reflect(#[from] ReflectError),

    /// Reading configuration or enumerating directories failed
    #[error("IO error at {path}: {source}")]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// An override value is neither a removal marker nor docstring text
    #[error("__pdoc__ dict values must be strings or False, found {found} for key '{key}' in module '{module}'")]
    InvalidOverride {
        /// Module declaring the override
        module: String,
        /// Dotted member path
        key: String,
        /// Type of the rejected value
        found: String,
    },

    /// The class ancestry graph contains a cycle
    #[error("Cyclic inheritance among classes: {}", .classes.join(", "))]
    CyclicInheritance {
        /// Refnames of every class that could not be ordered
        classes: Vec<String>,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// An operation that needs a module got another kind of entity
    #[error("Not a module: {refname}")]
    NotAModule {
        /// Refname of the offending entity
        refname: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error details
        message: String,
        /// Underlying error
        #[source]
        source: Option<serde_json::Error>,
    },
}

impl DocError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error from a JSON error.
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source: Some(source),
        }
    }
}

/// Non-fatal conditions collected while building and linking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocWarning {
    /// An export-list entry names nothing in the module
    MissingExport {
        /// Module refname
        module: String,
        /// Missing member name
        name: String,
    },

    /// Source could not be parsed; variable docstrings skipped
    UnparsableSource {
        /// Refname of the module or class
        refname: String,
        /// Why the source was unusable
        reason: String,
    },

    /// An override key resolves to nothing
    UnknownOverride {
        /// Module refname
        module: String,
        /// Dotted member path
        key: String,
    },

    /// `None` used as a removal marker
    DeprecatedNullOverride {
        /// Module refname
        module: String,
        /// Dotted member path
        key: String,
    },

    /// Linking was requested for an already linked module
    AlreadyLinked {
        /// Module refname
        module: String,
    },
}

impl fmt::Display for DocWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocWarning::MissingExport { module, name } => write!(
                f,
                "Module {} doesn't contain identifier `{}` exported in `__all__`",
                module, name
            ),
            DocWarning::UnparsableSource { refname, reason } => write!(
                f,
                "Couldn't get/parse source of '{}': {}",
                refname, reason
            ),
            DocWarning::UnknownOverride { module, key } => write!(
                f,
                "__pdoc__-overriden key {:?} does not exist in module {:?}",
                key, module
            ),
            DocWarning::DeprecatedNullOverride { module, key } => write!(
                f,
                "Setting `__pdoc__[key] = None` is deprecated; use `__pdoc__[key] = False` \
                 (key: {:?}, module: {:?})",
                key, module
            ),
            DocWarning::AlreadyLinked { module } => {
                write!(f, "Module {} inheritance already linked", module)
            }
        }
    }
}
