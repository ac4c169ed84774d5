//! docgraph Reflection API
//!
//! Shared trait and descriptor types through which the documentation graph
//! asks about program structure.
//!
//! This crate provides:
//!
//! - **ReflectionProvider trait**: the interface every source of program
//!   structure implements
//! - **Descriptor types**: namespaces, members, types, signatures and
//!   override values
//! - **MemoryProvider**: an in-memory provider for tests and embedding
//! - **Text helpers**: docstring cleaning and string literal decoding
//! - **C3 linearization** for providers that compute MROs themselves
//!
//! # Example
//!
//! ```rust
//! use docgraph_reflect_api::{MemoryProvider, ReflectionProvider};
//!
//! let mut provider = MemoryProvider::new();
//! let module = provider.add_module("shapes");
//! let base = provider.add_class(module, "Shape", &[], "A shape.");
//! provider.add_class(module, "Square", &[base], "A square.");
//!
//! let info = provider.import_module("shapes").unwrap();
//! let members = provider.module_members(info.object).unwrap();
//! assert_eq!(members.len(), 2);
//! ```

pub mod entities;
pub mod errors;
pub mod memory;
pub mod mro;
pub mod text;
pub mod traits;

// Re-export commonly used types
pub use entities::{
    is_public, ClassInfo, MemberInfo, MemberKind, NamespaceInfo, ObjectId, OverrideValue,
    ParamKind, Parameter, RoutineDecorator, Signature, TypeRef,
};
pub use errors::{ReflectError, ReflectResult};
pub use memory::MemoryProvider;
pub use text::{cleandoc, decode_string_literal};
pub use traits::{list_submodules, ReflectionProvider};

#[cfg(test)]
mod tests;
