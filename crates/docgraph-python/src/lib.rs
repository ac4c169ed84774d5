//! # docgraph-python
//!
//! Static reflection provider for docgraph - documents Python packages by
//! reading their source with tree-sitter instead of importing them.
//!
//! ## Features
//!
//! - Locates packages, modules and namespace packages under search roots
//! - Extracts functions, classes, methods, properties and documented
//!   variables with full signatures
//! - Follows imports and base classes across modules, lazily
//! - Reads `__all__` export lists and `__pdoc__` override dictionaries
//! - Safe: no code is executed, malformed files surface as errors
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use docgraph::{helpers, DocConfig};
//! use docgraph_python::PythonProvider;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = PythonProvider::from_root("src")?;
//! let (ctx, module) = helpers::document(&provider, "mypackage", &DocConfig::default())?;
//! println!("{}", docgraph::export::export_json(&ctx, module)?);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod extractor;
pub mod ir;

mod provider;
mod visitor;

pub use config::PythonProviderConfig;
pub use extractor::extract;
pub use provider::PythonProvider;
