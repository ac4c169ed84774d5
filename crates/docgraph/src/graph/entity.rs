//! Entity model: ids, kinds and per-kind payloads.

use docgraph_reflect_api::{ObjectId, OverrideValue, Signature, TypeRef};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Arena index of an entity inside its [`Context`](super::Context).
///
/// Ids are only meaningful for the context that issued them and become
/// invalid after [`Context::reset`](super::Context::reset).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub(crate) usize);

impl EntityId {
    /// Position in the arena.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Type of a documentation entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityType {
    /// Module or package
    Module,
    /// Class
    Class,
    /// Function, method, static or class method
    Function,
    /// Module, class or instance variable
    Variable,
    /// Unresolved name
    External,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Module => write!(f, "module"),
            EntityType::Class => write!(f, "class"),
            EntityType::Function => write!(f, "function"),
            EntityType::Variable => write!(f, "variable"),
            EntityType::External => write!(f, "external"),
        }
    }
}

/// A documented object owned by a [`Context`](super::Context).
#[derive(Debug, Clone)]
pub struct Entity {
    /// Declared name
    pub name: String,
    /// Owning module; a module owns itself
    pub module: EntityId,
    /// Raw-source handle from the reflection provider
    pub object: Option<ObjectId>,
    /// Cleaned docstring
    pub docstring: String,
    /// Entity this one inherits its docstring from
    pub inherits: Option<EntityId>,
    /// Kind-specific payload
    pub kind: EntityKind,
}

impl Entity {
    /// The entity's type tag.
    pub fn entity_type(&self) -> EntityType {
        match self.kind {
            EntityKind::Module(_) => EntityType::Module,
            EntityKind::Class(_) => EntityType::Class,
            EntityKind::Function(_) => EntityType::Function,
            EntityKind::Variable(_) => EntityType::Variable,
        }
    }

    /// Class owning a method or class/instance variable.
    pub fn owner_class(&self) -> Option<EntityId> {
        match &self.kind {
            EntityKind::Function(data) => data.cls,
            EntityKind::Variable(data) => data.cls,
            _ => None,
        }
    }

    /// Member map of a module or class.
    pub fn members(&self) -> Option<&IndexMap<String, EntityId>> {
        match &self.kind {
            EntityKind::Module(data) => Some(&data.doc),
            EntityKind::Class(data) => Some(&data.doc),
            _ => None,
        }
    }

    pub(crate) fn members_mut(&mut self) -> Option<&mut IndexMap<String, EntityId>> {
        match &mut self.kind {
            EntityKind::Module(data) => Some(&mut data.doc),
            EntityKind::Class(data) => Some(&mut data.doc),
            _ => None,
        }
    }

    /// Whether this is a Class entity.
    pub fn is_class(&self) -> bool {
        matches!(self.kind, EntityKind::Class(_))
    }

    /// Whether this is a Module entity.
    pub fn is_module(&self) -> bool {
        matches!(self.kind, EntityKind::Module(_))
    }
}

/// Kind-specific entity payload.
#[derive(Debug, Clone)]
pub enum EntityKind {
    /// Module or package
    Module(ModuleData),
    /// Class
    Class(ClassData),
    /// Function or method
    Function(FunctionData),
    /// Variable
    Variable(VariableData),
}

/// Module payload.
#[derive(Debug, Clone, Default)]
pub struct ModuleData {
    /// Direct public members, submodules included, in discovery order
    pub doc: IndexMap<String, EntityId>,
    /// Enclosing package
    pub supermodule: Option<EntityId>,
    /// Has submodules
    pub is_package: bool,
    /// Package without an initializer
    pub is_namespace: bool,
    /// Overrides the module declares itself, applied at link time
    pub overrides: IndexMap<String, OverrideValue>,
    pub(crate) linked: bool,
}

impl ModuleData {
    /// Whether inheritance linking already ran for this module.
    pub fn is_linked(&self) -> bool {
        self.linked
    }
}

/// Class payload.
#[derive(Debug, Clone, Default)]
pub struct ClassData {
    /// Declared members plus, after the fill phase, inherited clones
    pub doc: IndexMap<String, EntityId>,
    /// Qualified name inside the module
    pub qualname: String,
    /// Ancestors without the class itself and the universal base
    pub mro: Vec<TypeRef>,
    /// Direct subclasses known to the provider
    pub subclasses: Vec<TypeRef>,
    /// Constructor signature
    pub init_signature: Option<Signature>,
    /// Dedented source text
    pub source: Option<String>,
    pub(crate) super_members: Option<IndexMap<String, EntityId>>,
}

/// Function payload.
#[derive(Debug, Clone, Default)]
pub struct FunctionData {
    /// Owning class of a method
    pub cls: Option<EntityId>,
    /// Instance method (as opposed to static or class method)
    pub method: bool,
    /// Qualified name reported by the provider
    pub qualname: String,
    /// Coroutine function
    pub is_async: bool,
    /// Introspected signature
    pub signature: Option<Signature>,
    /// Dedented source text
    pub source: Option<String>,
}

/// Variable payload.
#[derive(Debug, Clone, Default)]
pub struct VariableData {
    /// Owning class of a class or instance variable
    pub cls: Option<EntityId>,
    /// Instance-level rather than class-level
    pub instance_var: bool,
}

/// Sentinel for a name that resolves to nothing documented.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct External {
    /// The unresolved name, used verbatim as refname
    pub name: String,
}

impl External {
    /// Create an external sentinel.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Refname of an external is its name.
    pub fn refname(&self) -> &str {
        &self.name
    }

    /// Externals have no docstring.
    pub fn docstring(&self) -> &str {
        ""
    }

    /// Placeholder URL, `/name.ext`.
    pub fn url(&self) -> String {
        format!("/{}.ext", self.name)
    }
}

/// Result of resolving a name: a documented entity or an external.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DocRef {
    /// Entity registered in the context
    Entity(EntityId),
    /// Unresolved name
    External(External),
}

impl DocRef {
    /// The entity id, when resolved.
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            DocRef::Entity(id) => Some(*id),
            DocRef::External(_) => None,
        }
    }

    /// Whether the name stayed unresolved.
    pub fn is_external(&self) -> bool {
        matches!(self, DocRef::External(_))
    }
}

impl From<EntityId> for DocRef {
    fn from(id: EntityId) -> Self {
        DocRef::Entity(id)
    }
}
