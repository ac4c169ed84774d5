use super::ObjectId;
use serde::{Deserialize, Serialize};

/// How a routine is declared on its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RoutineDecorator {
    #[default]
    Plain,
    ClassMethod,
    StaticMethod,
}

/// Kind of a namespace or class member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MemberKind {
    /// Function or method
    Routine {
        decorator: RoutineDecorator,
        /// Already bound to its owner when looked up (class methods)
        bound: bool,
    },

    /// A type
    Class,

    /// A module object bound to a name
    Module,

    /// Data or property descriptor
    DataDescriptor { getter: Option<ObjectId> },

    /// Any other attribute
    Data,
}

impl MemberKind {
    pub fn routine(decorator: RoutineDecorator) -> Self {
        Self::Routine {
            decorator,
            bound: decorator == RoutineDecorator::ClassMethod,
        }
    }

    pub fn is_routine(&self) -> bool {
        matches!(self, Self::Routine { .. })
    }

    pub fn is_static_method(&self) -> bool {
        matches!(
            self,
            Self::Routine {
                decorator: RoutineDecorator::StaticMethod,
                ..
            }
        )
    }
}

/// A named member of a namespace or type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub name: String,
    pub object: ObjectId,
    pub kind: MemberKind,

    /// Dotted name of the module that declares the member, when known
    pub defined_in: Option<String>,
}

impl MemberInfo {
    pub fn new(name: impl Into<String>, object: ObjectId, kind: MemberKind) -> Self {
        Self {
            name: name.into(),
            object,
            kind,
            defined_in: None,
        }
    }

    pub fn with_defined_in(mut self, module: impl Into<String>) -> Self {
        self.defined_in = Some(module.into());
        self
    }

    /// Names starting with an underscore are private
    pub fn is_public(&self) -> bool {
        is_public(&self.name)
    }
}

/// Public-name rule shared by providers and the core
pub fn is_public(name: &str) -> bool {
    !name.starts_with('_')
}
