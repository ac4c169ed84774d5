//! JSON export for web-based renderers.

use crate::doc::{ClassDoc, Doc, FunctionDoc, ModuleDoc};
use crate::error::{DocError, Result};
use crate::graph::{Context, EntityId};
use serde_json::{json, Value};

/// Export a module and its submodules as pretty-printed JSON.
///
/// URLs are relative to each module's own page.
pub fn export_json(ctx: &Context, module: EntityId) -> Result<String> {
    let value = export_json_value(ctx, module)?;
    serde_json::to_string_pretty(&value)
        .map_err(|e| DocError::serialization("failed to serialize module tree", e))
}

/// Export a module and its submodules as a JSON value.
pub fn export_json_value(ctx: &Context, module: EntityId) -> Result<Value> {
    let doc = ctx.doc(module).and_then(|doc| doc.as_module()).ok_or_else(|| {
        DocError::NotAModule {
            refname: ctx
                .get(module)
                .map(|_| ctx.refname(module))
                .unwrap_or_else(|| module.to_string()),
        }
    })?;
    Ok(module_value(doc))
}

fn module_value(module: ModuleDoc<'_>) -> Value {
    let page = Some(module.id());
    json!({
        "name": module.name(),
        "refname": module.refname(),
        "url": module.url(None, "", false),
        "docstring": module.docstring(),
        "is_package": module.is_package(),
        "is_namespace": module.is_namespace(),
        "supermodule": module.supermodule().map(|m| m.refname()),
        "variables": module.variables(true).iter().map(|v| variable_value(*v, page)).collect::<Vec<_>>(),
        "functions": module
            .functions(true)
            .iter()
            .filter_map(|f| f.as_function())
            .map(|f| function_value(f, page))
            .collect::<Vec<_>>(),
        "classes": module
            .classes(true)
            .iter()
            .filter_map(|c| c.as_class())
            .map(|c| class_value(c, page))
            .collect::<Vec<_>>(),
        "submodules": module
            .submodules()
            .iter()
            .filter_map(|m| m.as_module())
            .map(module_value)
            .collect::<Vec<_>>(),
    })
}

fn common(doc: Doc<'_>, page: Option<EntityId>) -> serde_json::Map<String, Value> {
    let mut map = serde_json::Map::new();
    map.insert("name".into(), json!(doc.name()));
    map.insert("type".into(), json!(doc.entity_type().to_string()));
    map.insert("refname".into(), json!(doc.refname()));
    map.insert("qualname".into(), json!(doc.qualname()));
    map.insert("url".into(), json!(doc.url(page, "", false)));
    map.insert("docstring".into(), json!(doc.docstring()));
    map.insert("inherits".into(), json!(doc.inherits().map(|d| d.refname())));
    map
}

fn variable_value(doc: Doc<'_>, page: Option<EntityId>) -> Value {
    let mut map = common(doc, page);
    if let Some(var) = doc.as_variable() {
        map.insert("instance_var".into(), json!(var.is_instance_var()));
    }
    Value::Object(map)
}

fn function_value(function: FunctionDoc<'_>, page: Option<EntityId>) -> Value {
    let mut map = common(*function, page);
    map.insert("funcdef".into(), json!(function.funcdef()));
    map.insert("method".into(), json!(function.is_method()));
    map.insert("params".into(), json!(function.params(true, None)));
    map.insert("return_annotation".into(), json!(function.return_annotation(None)));
    Value::Object(map)
}

fn class_value(class: ClassDoc<'_>, page: Option<EntityId>) -> Value {
    let ctx = class.context();
    let mut map = common(*class, page);
    map.insert("params".into(), json!(class.params(true, None)));
    map.insert(
        "mro".into(),
        json!(class.mro(false).iter().map(|r| ctx.ref_refname(r)).collect::<Vec<_>>()),
    );
    map.insert(
        "subclasses".into(),
        json!(class.subclasses().iter().map(|r| ctx.ref_refname(r)).collect::<Vec<_>>()),
    );
    map.insert(
        "class_variables".into(),
        Value::Array(class.class_variables(true, true).iter().map(|v| variable_value(*v, page)).collect()),
    );
    map.insert(
        "instance_variables".into(),
        Value::Array(
            class.instance_variables(true, true).iter().map(|v| variable_value(*v, page)).collect(),
        ),
    );
    map.insert(
        "methods".into(),
        Value::Array(
            class
                .methods(true, true)
                .iter()
                .chain(class.functions(true, true).iter())
                .filter_map(|f| f.as_function())
                .map(|f| function_value(f, page))
                .collect(),
        ),
    );
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{link_inheritance, DocConfig, ModuleBuilder};
    use docgraph_reflect_api::MemoryProvider;

    fn context() -> (Context, EntityId) {
        let mut provider = MemoryProvider::new();
        let pkg = provider.add_package("pkg");
        let shapes = provider.add_module("pkg.shapes");
        let base = provider.add_class(shapes, "Shape", &[], "A shape.");
        provider.add_method(base, "area", "Compute the area.");
        provider.add_class(shapes, "Square", &[base], "A square.");
        provider.add_function(shapes, "unit", "The unit square.");
        provider.add_function(pkg, "main", "Entry point.");

        let config = DocConfig::default();
        let (mut ctx, id) = ModuleBuilder::new(&provider, &config)
            .build_standalone("pkg")
            .unwrap();
        link_inheritance(&mut ctx, &config).unwrap();
        (ctx, id)
    }

    #[test]
    fn test_export_json_tree() {
        let (ctx, id) = context();
        let value = export_json_value(&ctx, id).unwrap();

        assert_eq!(value["refname"], "pkg");
        assert_eq!(value["url"], "pkg/index.html");
        assert_eq!(value["functions"][0]["name"], "main");
        assert_eq!(value["functions"][0]["url"], "#pkg.main");

        let shapes = &value["submodules"][0];
        assert_eq!(shapes["refname"], "pkg.shapes");
        let square = &shapes["classes"][1];
        assert_eq!(square["name"], "Square");
        assert_eq!(square["mro"][0], "pkg.shapes.Shape");
        assert_eq!(square["methods"][0]["inherits"], "pkg.shapes.Shape.area");
        assert_eq!(square["methods"][0]["docstring"], "Compute the area.");
    }

    #[test]
    fn test_export_json_string() {
        let (ctx, id) = context();
        let json = export_json(&ctx, id).unwrap();
        assert!(json.contains("\"refname\": \"pkg.shapes.Square\""));
    }

    #[test]
    fn test_export_non_module_fails() {
        let (ctx, _) = context();
        let class = ctx.lookup("pkg.shapes.Shape").unwrap();
        let err = export_json_value(&ctx, class).unwrap_err();
        assert!(matches!(err, DocError::NotAModule { refname } if refname == "pkg.shapes.Shape"));
    }
}
