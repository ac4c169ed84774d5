//! # docgraph
//!
//! A documentation object graph for Python-style namespaces: modules,
//! classes, functions and variables, with docstrings inherited along the
//! class hierarchy and cross-references resolved to URLs.
//!
//! ## Architecture
//!
//! ```text
//! Renderers (templates, JSON export)
//!     ↓
//! Views (Doc, ModuleDoc, ClassDoc, ...)
//!     ↓
//! Linker (fill, overrides, link) + Resolver (refnames, URLs)
//!     ↓
//! Context (entity arena, refname registry)
//!     ↓
//! ReflectionProvider (docgraph-reflect-api)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use docgraph::{helpers, DocConfig};
//! use docgraph_reflect_api::MemoryProvider;
//!
//! let mut provider = MemoryProvider::new();
//! let module = provider.add_module("zoo");
//! let animal = provider.add_class(module, "Animal", &[], "An animal.");
//! provider.add_method(animal, "speak", "Make a sound.");
//! provider.add_class(module, "Dog", &[animal], "A dog.");
//!
//! let (context, _) = helpers::document(&provider, "zoo", &DocConfig::default()).unwrap();
//!
//! let speak = context.lookup("zoo.Dog.speak").unwrap();
//! let doc = context.doc(speak).unwrap();
//! assert_eq!(doc.docstring(), "Make a sound.");
//! assert_eq!(doc.inherits().unwrap().refname(), "zoo.Animal.speak");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod build;
pub mod config;
pub mod doc;
pub mod error;
pub mod export;
pub mod graph;
pub mod helpers;
pub mod inherit;
mod resolve;
pub mod signature;

// Re-export main types
pub use build::{DocFilter, ModuleBuilder};
pub use config::{DocConfig, Override, OverrideMap};
pub use doc::{ClassDoc, Doc, FunctionDoc, ModuleDoc, VariableDoc};
pub use error::{DocError, DocWarning, Result};
pub use graph::{
    ClassData, Context, DocRef, Entity, EntityId, EntityKind, EntityType, External, FunctionData,
    ModuleData, VariableData,
};
pub use inherit::link_inheritance;
pub use signature::LinkFn;
