//! Integration tests for module overrides
//! Removal, docstring replacement, configured overrides and validation

use docgraph::{helpers, link_inheritance, Context, DocConfig, DocError, DocWarning, ModuleBuilder};
use docgraph_reflect_api::{MemoryProvider, ObjectId, OverrideValue, Parameter, Signature};

fn docstring(ctx: &Context, refname: &str) -> String {
    let id = ctx.lookup(refname).unwrap_or_else(|| panic!("{} not registered", refname));
    ctx.doc(id).unwrap().docstring().to_string()
}

fn member_names(ctx: &Context, refname: &str) -> Vec<String> {
    let id = ctx.lookup(refname).unwrap();
    ctx.doc(id)
        .unwrap()
        .members()
        .iter()
        .map(|d| d.name().to_string())
        .collect()
}

/// Provider with module `shapes`, returned with the module and `Shape` handles.
fn shapes() -> (MemoryProvider, ObjectId, ObjectId) {
    let mut provider = MemoryProvider::new();
    let m = provider.add_module("shapes");
    let shape = provider.add_class(m, "Shape", &[], "A shape.");
    provider.add_method(shape, "area", "Compute the area.");
    provider.add_method(shape, "draw", "Draw it.");
    provider.add_function(m, "unit", "The unit shape.");
    (provider, m, shape)
}

#[test]
fn test_remove_class_member() {
    let (mut provider, m, _) = shapes();
    provider.add_override(m, "Shape.draw", false);

    let (ctx, _) = helpers::document(&provider, "shapes", &DocConfig::default()).unwrap();

    assert_eq!(member_names(&ctx, "shapes.Shape"), vec!["area"]);
    assert!(ctx.lookup("shapes.Shape.draw").is_none());
    assert!(ctx.refnames().all(|(key, _)| !key.starts_with("shapes.Shape.draw.")));
    assert!(ctx.warnings().iter().all(|w| !matches!(w, DocWarning::UnknownOverride { .. })));
}

#[test]
fn test_remove_class_and_nested_entries() {
    let (mut provider, m, _) = shapes();
    provider.add_override(m, "Shape", false);

    let (ctx, _) = helpers::document(&provider, "shapes", &DocConfig::default()).unwrap();

    assert_eq!(member_names(&ctx, "shapes"), vec!["unit"]);
    assert!(ctx.lookup("shapes.Shape").is_none());
    assert!(ctx.lookup("shapes.Shape.area").is_none());
    assert!(ctx.lookup("shapes.Shape.draw").is_none());
}

#[test]
fn test_replace_docstring() {
    let (mut provider, m, _) = shapes();
    provider.add_override(m, "unit", "  Replaced\n  text.");
    provider.add_override(m, "Shape.area", "Area in square units.");

    let (ctx, _) = helpers::document(&provider, "shapes", &DocConfig::default()).unwrap();

    assert_eq!(docstring(&ctx, "shapes.unit"), "Replaced\ntext.");
    assert_eq!(docstring(&ctx, "shapes.Shape.area"), "Area in square units.");
}

#[test]
fn test_replaced_docstring_is_inherited() {
    let (mut provider, m, shape) = shapes();
    provider.add_class(m, "Square", &[shape], "A square.");
    provider.add_override(m, "Shape.area", "Area in square units.");

    let (ctx, _) = helpers::document(&provider, "shapes", &DocConfig::default()).unwrap();

    // Same underlying object, so the subclass copy follows the override.
    assert_eq!(docstring(&ctx, "shapes.Square.area"), "Area in square units.");
}

#[test]
fn test_configured_override_wins() {
    let (mut provider, m, _) = shapes();
    provider.add_override(m, "unit", "From the module.");
    let config = DocConfig::default().with_override("shapes", "unit", "From the config.");

    let (ctx, _) = helpers::document(&provider, "shapes", &config).unwrap();

    assert_eq!(docstring(&ctx, "shapes.unit"), "From the config.");
}

#[test]
fn test_unknown_keys_warn() {
    let (mut provider, m, _) = shapes();
    provider.add_override(m, "missing", false);
    provider.add_override(m, "ghost", "Nobody reads this.");

    let (ctx, _) = helpers::document(&provider, "shapes", &DocConfig::default()).unwrap();

    let unknown: Vec<&str> = ctx
        .warnings()
        .iter()
        .filter_map(|w| match w {
            DocWarning::UnknownOverride { key, .. } => Some(key.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(unknown, vec!["missing", "ghost"]);
}

#[test]
fn test_null_removal_is_deprecated() {
    let (mut provider, m, _) = shapes();
    provider.add_override(m, "unit", OverrideValue::Null);

    let (ctx, _) = helpers::document(&provider, "shapes", &DocConfig::default()).unwrap();

    assert!(ctx.lookup("shapes.unit").is_none());
    assert!(ctx.warnings().contains(&DocWarning::DeprecatedNullOverride {
        module: "shapes".to_string(),
        key: "unit".to_string(),
    }));
}

#[test]
fn test_invalid_value_aborts_without_changes() {
    let (mut provider, m, _) = shapes();
    provider.add_override(m, "unit", "Would be replaced.");
    provider.add_override(m, "Shape", true);

    let config = DocConfig::default();
    let (mut ctx, module) = ModuleBuilder::new(&provider, &config)
        .build_standalone("shapes")
        .unwrap();

    let err = link_inheritance(&mut ctx, &config).unwrap_err();
    match &err {
        DocError::InvalidOverride { module, key, found } => {
            assert_eq!(module, "shapes");
            assert_eq!(key, "Shape");
            assert_eq!(found, "bool");
        }
        other => panic!("expected an invalid override, got {:?}", other),
    }
    assert!(err.to_string().contains("must be strings or False"));

    assert_eq!(docstring(&ctx, "shapes.unit"), "The unit shape.");
    assert!(ctx.lookup("shapes.Shape").is_some());
    assert!(!ctx.doc(module).unwrap().as_module().unwrap().is_linked());
}

#[test]
fn test_invalid_value_in_later_module_leaves_earlier_modules_untouched() {
    let (mut provider, _, _) = shapes();
    let other = provider.add_module("other");
    provider.add_function(other, "helper", "Help.");
    provider.add_override(other, "helper", true);

    let config = DocConfig::default().with_override("shapes", "unit", "From the config.");
    let mut ctx = Context::new();
    let builder = ModuleBuilder::new(&provider, &config);
    let first = builder.build(&mut ctx, "shapes").unwrap();
    builder.build(&mut ctx, "other").unwrap();

    let err = link_inheritance(&mut ctx, &config).unwrap_err();
    assert!(matches!(
        &err,
        DocError::InvalidOverride { module, key, .. } if module == "other" && key == "helper"
    ));

    let shapes = ctx.doc(first).unwrap().as_module().unwrap();
    assert!(shapes.data().overrides.is_empty());
    assert!(!shapes.is_linked());
    assert_eq!(docstring(&ctx, "shapes.unit"), "The unit shape.");
}

#[test]
fn test_constructor_override_hides_params() {
    let (mut provider, m, shape) = shapes();
    provider.set_init(
        shape,
        "Create a shape.",
        Some(Signature::new(vec![
            Parameter::positional("self"),
            Parameter::positional("sides").with_default("3"),
        ])),
    );

    let config = DocConfig::default();
    let (ctx, _) = helpers::document(&provider, "shapes", &config).unwrap();
    let id = ctx.lookup("shapes.Shape").unwrap();
    let class = ctx.doc(id).unwrap();
    assert_eq!(class.as_class().unwrap().params(false, None), vec!["sides=3"]);
    assert_eq!(class.docstring(), "A shape.\n\nCreate a shape.");

    provider.add_override(m, "Shape.__init__", false);
    let (ctx, _) = helpers::document(&provider, "shapes", &config).unwrap();
    let id = ctx.lookup("shapes.Shape").unwrap();
    let class = ctx.doc(id).unwrap().as_class().unwrap();
    assert!(class.params(false, None).is_empty());
    assert!(ctx.warnings().iter().all(|w| !matches!(w, DocWarning::UnknownOverride { .. })));

    let configured = DocConfig::default().with_override("shapes", "shapes.Shape.__init__", false);
    let (ctx, _) = helpers::document(&shapes_with_init(), "shapes", &configured).unwrap();
    let id = ctx.lookup("shapes.Shape").unwrap();
    assert!(ctx.doc(id).unwrap().as_class().unwrap().params(false, None).is_empty());
}

fn shapes_with_init() -> MemoryProvider {
    let (mut provider, _, shape) = shapes();
    provider.set_init(
        shape,
        "",
        Some(Signature::new(vec![Parameter::positional("self"), Parameter::positional("n")])),
    );
    provider
}
