use crate::entities::ObjectId;
use std::path::PathBuf;
use thiserror::Error;

/// Errors a reflection provider can report
#[derive(Error, Debug)]
pub enum ReflectError {
    /// No namespace with this dotted name could be located
    #[error("Module not found: {0}")]
    ModuleNotFound(String),

    /// The handle was not issued by this provider
    #[error("Unknown object handle {0}")]
    UnknownObject(ObjectId),

    /// The handle exists but describes a different kind of object
    #[error("Object {object} is not a {expected}")]
    WrongKind {
        object: ObjectId,
        expected: &'static str,
    },

    /// Failed to read a file or directory
    #[error("IO error reading {0}: {1}")]
    IoError(PathBuf, #[source] std::io::Error),

    /// Syntax error in a source file
    #[error("Syntax error in {0}:{1}: {2}")]
    SyntaxError(PathBuf, usize, String),

    /// File too large
    #[error("File {0} exceeds maximum size ({1} bytes)")]
    FileTooLarge(PathBuf, usize),

    /// Generic provider failure
    #[error("Reflection error: {0}")]
    Other(String),
}

impl ReflectError {
    pub fn wrong_kind(object: ObjectId, expected: &'static str) -> Self {
        Self::WrongKind { object, expected }
    }
}

/// Result type for provider operations
pub type ReflectResult<T> = Result<T, ReflectError>;
