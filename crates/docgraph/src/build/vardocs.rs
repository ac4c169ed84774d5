//! Static scan for variable docstrings.
//!
//! An assignment to a single public name immediately followed by a string
//! literal statement documents that name:
//!
//! ```python
//! TIMEOUT = 30
//! """Seconds to wait before giving up."""
//! ```
//!
//! Inside a constructor the same pattern applies to `self.attr = ...`.

use docgraph_reflect_api::{cleandoc, decode_string_literal, is_public};
use indexmap::IndexMap;
use tree_sitter::{Node, Parser, Tree};

/// A variable documented by a following string literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VarDoc {
    pub(crate) name: String,
    pub(crate) docstring: String,
    pub(crate) instance_var: bool,
}

/// Documented module-level variables, restricted to `exports` when given.
pub(crate) fn module_variables(
    source: &str,
    exports: Option<&[String]>,
) -> Result<IndexMap<String, VarDoc>, String> {
    let tree = parse(source)?;
    let bytes = source.as_bytes();

    let mut vars = IndexMap::new();
    for (name, docstring) in documented_assignments(tree.root_node(), bytes, Target::Name) {
        if exports.map_or(false, |exports| !exports.contains(&name)) {
            continue;
        }
        vars.insert(
            name.clone(),
            VarDoc {
                name,
                docstring,
                instance_var: false,
            },
        );
    }
    Ok(vars)
}

/// Documented variables of the class whose source is given.
///
/// Instance variables assigned in `__init__` come first; class-body
/// variables of the same name replace them.
pub(crate) fn class_variables(source: &str) -> Result<IndexMap<String, VarDoc>, String> {
    let dedented = dedent(source);
    let tree = parse(&dedented)?;
    let bytes = dedented.as_bytes();

    let class = statements(tree.root_node())
        .into_iter()
        .next()
        .map(unwrap_decorated)
        .filter(|node| node.kind() == "class_definition")
        .ok_or_else(|| "source does not start with a class definition".to_string())?;
    let body = class
        .child_by_field_name("body")
        .ok_or_else(|| "class definition without a body".to_string())?;

    let mut vars = IndexMap::new();

    let init_body = statements(body)
        .into_iter()
        .map(unwrap_decorated)
        .find(|node| {
            node.kind() == "function_definition"
                && node
                    .child_by_field_name("name")
                    .and_then(|name| name.utf8_text(bytes).ok())
                    == Some("__init__")
        })
        .and_then(|init| init.child_by_field_name("body"));

    if let Some(init_body) = init_body {
        for (name, docstring) in documented_assignments(init_body, bytes, Target::SelfAttribute) {
            vars.insert(
                name.clone(),
                VarDoc {
                    name,
                    docstring,
                    instance_var: true,
                },
            );
        }
    }

    for (name, docstring) in documented_assignments(body, bytes, Target::Name) {
        vars.insert(
            name.clone(),
            VarDoc {
                name,
                docstring,
                instance_var: false,
            },
        );
    }

    Ok(vars)
}

#[derive(Clone, Copy)]
enum Target {
    Name,
    SelfAttribute,
}

fn parse(source: &str) -> Result<Tree, String> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::language())
        .map_err(|e| format!("Failed to load Python grammar: {}", e))?;

    let tree = parser
        .parse(source, None)
        .ok_or_else(|| "Failed to parse source".to_string())?;

    let root = tree.root_node();
    if root.has_error() {
        return Err(format!(
            "syntax error near line {}",
            first_error_line(root).unwrap_or(0) + 1
        ));
    }
    Ok(tree)
}

fn first_error_line(node: Node) -> Option<usize> {
    if node.is_error() || node.is_missing() {
        return Some(node.start_position().row);
    }
    let mut cursor = node.walk();
    let children: Vec<Node> = node.children(&mut cursor).collect();
    children
        .into_iter()
        .filter(|child| child.has_error())
        .find_map(first_error_line)
}

fn statements(block: Node) -> Vec<Node> {
    let mut cursor = block.walk();
    block
        .named_children(&mut cursor)
        .filter(|node| node.kind() != "comment")
        .collect()
}

fn unwrap_decorated(node: Node) -> Node {
    if node.kind() == "decorated_definition" {
        node.child_by_field_name("definition").unwrap_or(node)
    } else {
        node
    }
}

fn documented_assignments(block: Node, source: &[u8], target: Target) -> Vec<(String, String)> {
    let stmts = statements(block);
    let mut found = Vec::new();

    for pair in stmts.windows(2) {
        let Some(left) = assignment_target(pair[0]) else {
            continue;
        };
        let Some(text) = string_statement(pair[1], source) else {
            continue;
        };
        let Some(name) = target_name(left, source, target) else {
            continue;
        };
        if !is_public(&name) {
            continue;
        }
        let docstring = cleandoc(&text).trim().to_string();
        if docstring.is_empty() {
            continue;
        }
        found.push((name, docstring));
    }

    found
}

fn assignment_target(stmt: Node) -> Option<Node> {
    if stmt.kind() != "expression_statement" || stmt.named_child_count() != 1 {
        return None;
    }
    let assignment = stmt.named_child(0)?;
    if assignment.kind() != "assignment" {
        return None;
    }
    // `a = b = value` has more than one target
    if assignment
        .child_by_field_name("right")
        .map_or(false, |right| right.kind() == "assignment")
    {
        return None;
    }
    assignment.child_by_field_name("left")
}

fn target_name(left: Node, source: &[u8], target: Target) -> Option<String> {
    match target {
        Target::Name if left.kind() == "identifier" => {
            left.utf8_text(source).ok().map(str::to_string)
        }
        Target::SelfAttribute if left.kind() == "attribute" => {
            let object = left.child_by_field_name("object")?;
            if object.kind() != "identifier" || object.utf8_text(source).ok()? != "self" {
                return None;
            }
            let attribute = left.child_by_field_name("attribute")?;
            attribute.utf8_text(source).ok().map(str::to_string)
        }
        _ => None,
    }
}

/// Value of a statement consisting of a single (possibly concatenated)
/// string literal.
pub(crate) fn string_statement(stmt: Node, source: &[u8]) -> Option<String> {
    if stmt.kind() != "expression_statement" || stmt.named_child_count() != 1 {
        return None;
    }
    let expr = stmt.named_child(0)?;
    string_value(expr, source)
}

pub(crate) fn string_value(expr: Node, source: &[u8]) -> Option<String> {
    match expr.kind() {
        "string" => decode_string_literal(expr.utf8_text(source).ok()?),
        "concatenated_string" => {
            let mut cursor = expr.walk();
            let parts: Vec<Node> = expr.named_children(&mut cursor).collect();
            let mut value = String::new();
            for part in parts {
                value.push_str(&string_value(part, source)?);
            }
            Some(value)
        }
        _ => None,
    }
}

/// Remove the common leading whitespace of all non-blank lines.
pub(crate) fn dedent(source: &str) -> String {
    let margin = source
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    if margin == 0 {
        return source.to_string();
    }

    source
        .split('\n')
        .map(|line| {
            if line.trim().is_empty() {
                line.trim_start_matches([' ', '\t'])
            } else {
                &line[margin..]
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
