use super::{ObjectId, Signature};
use serde::{Deserialize, Serialize};

/// Description of a type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassInfo {
    pub name: String,

    /// Dotted name of the declaring module
    pub module: String,

    pub qualname: String,

    pub object: ObjectId,

    pub docstring: Option<String>,

    /// Docstring of the constructor; `None` when the constructor is the
    /// universal base's default
    pub init_docstring: Option<String>,

    /// Constructor signature including the leading `self`
    pub init_signature: Option<Signature>,

    /// Names declared in `__slots__`
    pub slots: Vec<String>,
}

impl ClassInfo {
    pub fn new(
        name: impl Into<String>,
        module: impl Into<String>,
        qualname: impl Into<String>,
        object: ObjectId,
    ) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            qualname: qualname.into(),
            object,
            docstring: None,
            init_docstring: None,
            init_signature: None,
            slots: Vec::new(),
        }
    }
}
