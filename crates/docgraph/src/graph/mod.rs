//! Core graph types: the entity arena, the refname registry and ordering
//! algorithms.

pub mod algorithms;
mod context;
mod entity;

pub(crate) use context::UrlKey;
pub use context::Context;
pub use entity::{
    ClassData, DocRef, Entity, EntityId, EntityKind, EntityType, External, FunctionData,
    ModuleData, VariableData,
};
