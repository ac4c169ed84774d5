//! Source extraction for Python modules

use crate::ir::ModuleIR;
use crate::visitor::PythonVisitor;
use docgraph_reflect_api::{ReflectError, ReflectResult};
use std::path::Path;
use tree_sitter::{Node, Parser};

/// Extract the documentable structure of one Python source file
///
/// # Errors
/// [`ReflectError::SyntaxError`] with the line of the first error node when
/// the file does not parse cleanly.
pub fn extract(source: &str, file_path: &Path) -> ReflectResult<ModuleIR> {
    let mut parser = Parser::new();
    let language = tree_sitter_python::language();
    parser
        .set_language(&language)
        .map_err(|e| ReflectError::Other(format!("Failed to load Python grammar: {}", e)))?;

    let tree = parser.parse(source, None).ok_or_else(|| {
        ReflectError::SyntaxError(file_path.to_path_buf(), 0, "Failed to parse".to_string())
    })?;

    let root_node = tree.root_node();

    if root_node.has_error() {
        let line = first_error(root_node).map_or(0, |node| node.start_position().row + 1);
        return Err(ReflectError::SyntaxError(
            file_path.to_path_buf(),
            line,
            "Syntax error".to_string(),
        ));
    }

    let mut visitor = PythonVisitor::new(source);
    visitor.visit_module(root_node);

    Ok(visitor.module)
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error)
}
