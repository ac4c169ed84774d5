//! AST visitor for extracting documentable Python structure using tree-sitter
//!
//! Only statements directly in a module or class body are visited. Bodies of
//! `if`, `try` and `with` blocks are not descended into.

use crate::ir::{Binding, ClassIR, FunctionIR, ImportIR, ModuleIR};
use docgraph_reflect_api::{decode_string_literal, OverrideValue, ParamKind, Parameter, Signature};
use indexmap::IndexMap;
use tree_sitter::Node;

/// Names bound by one module or class body
#[derive(Debug, Default)]
struct Body {
    bindings: IndexMap<String, Binding>,
    slots: Vec<String>,
}

pub struct PythonVisitor<'a> {
    source: &'a str,
    pub module: ModuleIR,
}

impl<'a> PythonVisitor<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            module: ModuleIR::new(),
        }
    }

    fn node_text(&self, node: Node) -> &'a str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// Visit the root `module` node
    pub fn visit_module(&mut self, root: Node) {
        self.module.docstring = self.extract_docstring(root);
        let body = self.visit_body(root, true);
        self.module.bindings = body.bindings;
    }

    fn visit_body(&mut self, block: Node, module_level: bool) -> Body {
        let mut body = Body::default();
        let mut cursor = block.walk();

        for statement in block.named_children(&mut cursor) {
            match statement.kind() {
                "function_definition" => {
                    self.visit_function(statement, Vec::new(), statement, &mut body);
                }
                "class_definition" => self.visit_class(statement, statement, &mut body),
                "decorated_definition" => {
                    let decorators = decorator_names(self.source, statement);
                    if let Some(definition) = statement.child_by_field_name("definition") {
                        match definition.kind() {
                            "function_definition" => {
                                self.visit_function(definition, decorators, statement, &mut body)
                            }
                            "class_definition" => self.visit_class(definition, statement, &mut body),
                            _ => {}
                        }
                    }
                }
                "expression_statement" => {
                    if let Some(expression) = statement.named_child(0) {
                        self.visit_expression(expression, module_level, &mut body);
                    }
                }
                "import_statement" if module_level => self.visit_import(statement, &mut body),
                "import_from_statement" if module_level => {
                    self.visit_import_from(statement, &mut body)
                }
                _ => {}
            }
        }

        body
    }

    fn visit_function(&mut self, node: Node, decorators: Vec<String>, outer: Node, body: &mut Body) {
        let Some(name) = node.child_by_field_name("name").map(|n| self.node_text(n)) else {
            return;
        };

        let mut signature = Signature::new(
            node.child_by_field_name("parameters")
                .map(|params| self.extract_parameters(params))
                .unwrap_or_default(),
        );
        signature.return_annotation = node
            .child_by_field_name("return_type")
            .map(|ty| self.node_text(ty).to_string());

        let function = FunctionIR {
            name: name.to_string(),
            docstring: node
                .child_by_field_name("body")
                .and_then(|block| self.extract_docstring(block)),
            signature,
            is_async: node.child(0).map_or(false, |first| first.kind() == "async"),
            decorators,
            source: self.source_of(outer),
        };

        // A property setter re-binds the getter's name; keep the getter.
        if function.is_accessor() && body.bindings.contains_key(name) {
            return;
        }
        body.bindings.insert(name.to_string(), Binding::Function(function));
    }

    fn visit_class(&mut self, node: Node, outer: Node, body: &mut Body) {
        let Some(name) = node.child_by_field_name("name").map(|n| self.node_text(n)) else {
            return;
        };

        let mut bases = Vec::new();
        if let Some(arguments) = node.child_by_field_name("superclasses") {
            let mut cursor = arguments.walk();
            for base in arguments.named_children(&mut cursor) {
                match base.kind() {
                    "keyword_argument" | "list_splat" | "dictionary_splat" | "comment" => {}
                    "subscript" => {
                        if let Some(value) = base.child_by_field_name("value") {
                            bases.push(self.node_text(value).to_string());
                        }
                    }
                    _ => bases.push(self.node_text(base).to_string()),
                }
            }
        }

        let (docstring, class_body) = match node.child_by_field_name("body") {
            Some(block) => (self.extract_docstring(block), self.visit_body(block, false)),
            None => (None, Body::default()),
        };

        body.bindings.insert(
            name.to_string(),
            Binding::Class(ClassIR {
                name: name.to_string(),
                docstring,
                bases,
                members: class_body.bindings,
                slots: class_body.slots,
                source: self.source_of(outer),
            }),
        );
    }

    fn visit_expression(&mut self, expression: Node, module_level: bool, body: &mut Body) {
        match expression.kind() {
            "assignment" => self.visit_assignment(expression, module_level, body),
            "augmented_assignment" => {
                let (Some(left), Some(right)) = (
                    expression.child_by_field_name("left"),
                    expression.child_by_field_name("right"),
                ) else {
                    return;
                };
                let target = self.node_text(left);
                let operator = expression
                    .child_by_field_name("operator")
                    .map(|op| self.node_text(op));
                if module_level && target == "__all__" && operator == Some("+=") {
                    if let Some(names) = self.string_sequence(right) {
                        self.module.exports.get_or_insert_with(Vec::new).extend(names);
                    }
                }
                if left.kind() == "identifier" && !body.bindings.contains_key(target) {
                    body.bindings.insert(target.to_string(), Binding::Data);
                }
            }
            "call" if module_level => self.visit_export_call(expression),
            _ => {}
        }
    }

    fn visit_assignment(&mut self, node: Node, module_level: bool, body: &mut Body) {
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };
        // Bare annotations (`x: int`) bind nothing.
        let Some(right) = node.child_by_field_name("right") else {
            return;
        };

        if left.kind() == "subscript" {
            if module_level {
                self.visit_override_item(left, right);
            }
            return;
        }

        if left.kind() == "identifier" {
            match self.node_text(left) {
                "__all__" if module_level => {
                    if let Some(names) = self.string_sequence(right) {
                        self.module.exports = Some(names);
                    }
                }
                "__pdoc__" if module_level => {
                    if right.kind() == "dictionary" {
                        self.module.overrides = self.override_entries(right);
                    }
                }
                "__slots__" if !module_level => {
                    body.slots = match right.kind() {
                        "string" | "concatenated_string" => {
                            self.string_value(right).into_iter().collect()
                        }
                        _ => self.string_sequence(right).unwrap_or_default(),
                    };
                }
                _ => {}
            }
        }

        let mut targets = Vec::new();
        self.collect_targets(left, &mut targets);
        for target in targets {
            body.bindings.insert(target, Binding::Data);
        }

        // a = b = value
        if right.kind() == "assignment" {
            self.visit_assignment(right, module_level, body);
        }
    }

    fn collect_targets(&self, node: Node, targets: &mut Vec<String>) {
        match node.kind() {
            "identifier" => targets.push(self.node_text(node).to_string()),
            "pattern_list" | "tuple_pattern" | "list_pattern" | "parenthesized_expression" => {
                let mut cursor = node.walk();
                for child in node.named_children(&mut cursor) {
                    self.collect_targets(child, targets);
                }
            }
            _ => {}
        }
    }

    /// `__all__.extend([...])` and `__all__.append("x")`
    fn visit_export_call(&mut self, call: Node) {
        let Some(function) = call.child_by_field_name("function") else {
            return;
        };
        if function.kind() != "attribute" {
            return;
        }
        let object = function.child_by_field_name("object").map(|n| self.node_text(n));
        let method = function.child_by_field_name("attribute").map(|n| self.node_text(n));
        if object != Some("__all__") {
            return;
        }
        let Some(argument) = call
            .child_by_field_name("arguments")
            .and_then(|arguments| arguments.named_child(0))
        else {
            return;
        };

        let names = match method {
            Some("extend") => self.string_sequence(argument),
            Some("append") => self.string_value(argument).map(|name| vec![name]),
            _ => None,
        };
        if let Some(names) = names {
            self.module.exports.get_or_insert_with(Vec::new).extend(names);
        }
    }

    /// `__pdoc__["key"] = value`
    fn visit_override_item(&mut self, subscript: Node, value: Node) {
        let target = subscript
            .child_by_field_name("value")
            .map(|n| self.node_text(n));
        if target != Some("__pdoc__") {
            return;
        }
        let key = subscript
            .child_by_field_name("subscript")
            .and_then(|key| self.string_value(key));
        if let Some(key) = key {
            let value = self.override_value(value);
            self.module.overrides.retain(|(existing, _)| existing != &key);
            self.module.overrides.push((key, value));
        }
    }

    fn override_entries(&self, dictionary: Node) -> Vec<(String, OverrideValue)> {
        let mut entries: Vec<(String, OverrideValue)> = Vec::new();
        let mut cursor = dictionary.walk();

        for pair in dictionary.named_children(&mut cursor) {
            if pair.kind() != "pair" {
                continue;
            }
            let key = pair
                .child_by_field_name("key")
                .and_then(|key| self.string_value(key));
            let value = pair.child_by_field_name("value");
            if let (Some(key), Some(value)) = (key, value) {
                let value = self.override_value(value);
                entries.retain(|(existing, _)| existing != &key);
                entries.push((key, value));
            }
        }

        entries
    }

    fn override_value(&self, node: Node) -> OverrideValue {
        match node.kind() {
            "false" => OverrideValue::Flag(false),
            "true" => OverrideValue::Flag(true),
            "none" => OverrideValue::Null,
            "string" | "concatenated_string" => match self.string_value(node) {
                Some(text) => OverrideValue::Text(text),
                None => OverrideValue::Unsupported("bytes or f-string".to_string()),
            },
            "integer" => OverrideValue::Unsupported("int".to_string()),
            "float" => OverrideValue::Unsupported("float".to_string()),
            "list" => OverrideValue::Unsupported("list".to_string()),
            "tuple" => OverrideValue::Unsupported("tuple".to_string()),
            "dictionary" => OverrideValue::Unsupported("dict".to_string()),
            "set" => OverrideValue::Unsupported("set".to_string()),
            other => OverrideValue::Unsupported(other.to_string()),
        }
    }

    fn visit_import(&mut self, node: Node, body: &mut Body) {
        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            match name.kind() {
                "dotted_name" => {
                    let dotted = self.node_text(name);
                    let top = dotted.split('.').next().unwrap_or(dotted);
                    body.bindings
                        .insert(top.to_string(), Binding::Import(ImportIR::module(top)));
                }
                "aliased_import" => {
                    let module = name.child_by_field_name("name").map(|n| self.node_text(n));
                    let alias = name.child_by_field_name("alias").map(|n| self.node_text(n));
                    if let (Some(module), Some(alias)) = (module, alias) {
                        body.bindings
                            .insert(alias.to_string(), Binding::Import(ImportIR::module(module)));
                    }
                }
                _ => {}
            }
        }
    }

    fn visit_import_from(&mut self, node: Node, body: &mut Body) {
        let Some(module_name) = node.child_by_field_name("module_name") else {
            return;
        };
        let (level, module) = match module_name.kind() {
            "relative_import" => {
                let mut level = 0;
                let mut module = "";
                let mut cursor = module_name.walk();
                for part in module_name.named_children(&mut cursor) {
                    match part.kind() {
                        "import_prefix" => level = self.node_text(part).len(),
                        "dotted_name" => module = self.node_text(part),
                        _ => {}
                    }
                }
                (level, module)
            }
            _ => (0, self.node_text(module_name)),
        };

        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            let (member, bound) = match name.kind() {
                "aliased_import" => (
                    name.child_by_field_name("name").map(|n| self.node_text(n)),
                    name.child_by_field_name("alias").map(|n| self.node_text(n)),
                ),
                _ => (Some(self.node_text(name)), Some(self.node_text(name))),
            };
            if let (Some(member), Some(bound)) = (member, bound) {
                body.bindings.insert(
                    bound.to_string(),
                    Binding::Import(ImportIR::member(level, module, member)),
                );
            }
        }
    }

    fn extract_parameters(&self, parameters: Node) -> Vec<Parameter> {
        let mut params: Vec<Parameter> = Vec::new();
        let mut keyword_only = false;
        let mut cursor = parameters.walk();

        let plain = |keyword_only: bool| {
            if keyword_only {
                ParamKind::KeywordOnly
            } else {
                ParamKind::PositionalOrKeyword
            }
        };

        for param in parameters.named_children(&mut cursor) {
            match param.kind() {
                "identifier" => params.push(Parameter::new(self.node_text(param), plain(keyword_only))),
                "typed_parameter" => {
                    let annotation = param.child_by_field_name("type").map(|ty| self.node_text(ty));
                    let Some(inner) = param.named_child(0) else {
                        continue;
                    };
                    let mut parameter = match inner.kind() {
                        "list_splat_pattern" => {
                            keyword_only = true;
                            Parameter::new(self.splat_name(inner), ParamKind::VarPositional)
                        }
                        "dictionary_splat_pattern" => {
                            Parameter::new(self.splat_name(inner), ParamKind::VarKeyword)
                        }
                        _ => Parameter::new(self.node_text(inner), plain(keyword_only)),
                    };
                    parameter.annotation = annotation.map(str::to_string);
                    params.push(parameter);
                }
                "default_parameter" | "typed_default_parameter" => {
                    let Some(name) = param.child_by_field_name("name") else {
                        continue;
                    };
                    let mut parameter = Parameter::new(self.node_text(name), plain(keyword_only));
                    parameter.annotation = param
                        .child_by_field_name("type")
                        .map(|ty| self.node_text(ty).to_string());
                    parameter.default = param
                        .child_by_field_name("value")
                        .map(|value| self.node_text(value).to_string());
                    params.push(parameter);
                }
                "list_splat_pattern" => {
                    keyword_only = true;
                    params.push(Parameter::new(self.splat_name(param), ParamKind::VarPositional));
                }
                "dictionary_splat_pattern" => {
                    params.push(Parameter::new(self.splat_name(param), ParamKind::VarKeyword));
                }
                "keyword_separator" => keyword_only = true,
                "positional_separator" => {
                    for earlier in params.iter_mut() {
                        if earlier.kind == ParamKind::PositionalOrKeyword {
                            earlier.kind = ParamKind::PositionalOnly;
                        }
                    }
                }
                _ => {}
            }
        }

        params
    }

    fn splat_name(&self, splat: Node) -> &'a str {
        splat
            .named_child(0)
            .map(|name| self.node_text(name))
            .unwrap_or_else(|| self.node_text(splat).trim_start_matches('*'))
    }

    /// Docstring of a block: its first statement, when that is a string
    fn extract_docstring(&self, block: Node) -> Option<String> {
        let mut cursor = block.walk();
        let first = block
            .named_children(&mut cursor)
            .find(|child| child.kind() != "comment")?;
        if first.kind() != "expression_statement" || first.named_child_count() != 1 {
            return None;
        }
        let expression = first.named_child(0)?;
        self.string_value(expression)
    }

    /// Decoded value of a string literal (implicit concatenation included)
    fn string_value(&self, node: Node) -> Option<String> {
        match node.kind() {
            "string" => decode_string_literal(self.node_text(node)),
            "concatenated_string" => {
                let mut value = String::new();
                let mut cursor = node.walk();
                for part in node.named_children(&mut cursor) {
                    value.push_str(&self.string_value(part)?);
                }
                Some(value)
            }
            _ => None,
        }
    }

    /// Strings of a list or tuple literal; `None` if any element is not one
    fn string_sequence(&self, node: Node) -> Option<Vec<String>> {
        if !matches!(node.kind(), "list" | "tuple") {
            return None;
        }
        let mut cursor = node.walk();
        let elements: Vec<Node> = node
            .named_children(&mut cursor)
            .filter(|element| element.kind() != "comment")
            .collect();
        elements
            .into_iter()
            .map(|element| self.string_value(element))
            .collect()
    }

    /// Source text of a node, with the indentation of its first line kept
    fn source_of(&self, node: Node) -> String {
        let start = node.start_byte();
        let text = self.source.get(start..node.end_byte()).unwrap_or("");
        let line_start = self
            .source
            .get(..start)
            .and_then(|before| before.rfind('\n'))
            .map_or(0, |i| i + 1);
        let indent = self.source.get(line_start..start).unwrap_or("");

        if indent.chars().all(char::is_whitespace) {
            format!("{}{}", indent, text)
        } else {
            text.to_string()
        }
    }
}

/// Decorator expressions of a decorated definition, call arguments dropped
///
/// `@functools.lru_cache(maxsize=None)` yields `functools.lru_cache`.
fn decorator_names(source: &str, decorated: Node) -> Vec<String> {
    let mut cursor = decorated.walk();
    decorated
        .named_children(&mut cursor)
        .filter(|child| child.kind() == "decorator")
        .filter_map(|decorator| decorator.named_child(0))
        .map(|expression| match expression.kind() {
            "call" => expression.child_by_field_name("function").unwrap_or(expression),
            _ => expression,
        })
        .filter_map(|expression| expression.utf8_text(source.as_bytes()).ok())
        .map(|text| text.split_whitespace().collect::<String>())
        .collect()
}
