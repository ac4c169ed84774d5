//! Export of documented module trees for external renderers.
//!
//! - **JSON**: one nested object per module, with classes, functions,
//!   variables and submodules

pub mod json;

pub use json::{export_json, export_json_value};
