use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a runtime object, issued by a provider
///
/// Two handles compare equal exactly when they identify the same object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId(pub u64);

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "obj#{}", self.0)
    }
}

/// Reference to a type as it appears in an MRO or subclass list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeRef {
    /// Dotted name of the declaring module
    pub module: String,

    /// Qualified name inside the module (`Outer.Inner`)
    pub qualname: String,

    /// Handle, when the provider knows the type
    pub object: Option<ObjectId>,
}

impl TypeRef {
    pub fn new(module: impl Into<String>, qualname: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            qualname: qualname.into(),
            object: None,
        }
    }

    pub fn with_object(mut self, object: ObjectId) -> Self {
        self.object = Some(object);
        self
    }

    /// `module.qualname`
    pub fn dotted(&self) -> String {
        format!("{}.{}", self.module, self.qualname)
    }

    /// Same type by name, ignoring the handle
    pub fn same_name(&self, other: &TypeRef) -> bool {
        self.module == other.module && self.qualname == other.qualname
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.qualname)
    }
}
