//! Integration tests for module construction
//! Member discovery, submodules, variable docstrings and filters

use docgraph::{Context, Doc, DocConfig, DocWarning, EntityType, ModuleBuilder};
use docgraph_reflect_api::MemoryProvider;
use std::io::Write;
use tempfile::NamedTempFile;

fn build(provider: &MemoryProvider, name: &str) -> Context {
    let config = DocConfig::default();
    let (ctx, _) = ModuleBuilder::new(provider, &config)
        .build_standalone(name)
        .unwrap();
    ctx
}

fn names(docs: Vec<Doc<'_>>) -> Vec<String> {
    docs.iter().map(|d| d.name().to_string()).collect()
}

#[test]
fn test_public_members_declared_here() {
    let mut provider = MemoryProvider::new();
    let helpers = provider.add_module("helpers");
    let imported = provider.add_function(helpers, "imported", "From elsewhere.");

    let m = provider.add_module("m");
    provider.add_function(m, "run", "Run.");
    provider.add_function(m, "_hidden", "Private.");
    provider.add_class(m, "Task", &[], "A task.");
    provider.add_module_alias(m, "imported", imported);

    let ctx = build(&provider, "m");
    let module = ctx.doc(ctx.lookup("m").unwrap()).unwrap();
    let module = module.as_module().unwrap();

    assert_eq!(names(module.functions(true)), vec!["run"]);
    assert_eq!(names(module.classes(true)), vec!["Task"]);
    assert!(ctx.lookup("m._hidden").is_none());
    assert!(ctx.lookup("m.imported").is_none());
}

#[test]
fn test_export_list_is_honoured() {
    let mut provider = MemoryProvider::new();
    let helpers = provider.add_module("helpers");
    let imported = provider.add_function(helpers, "imported", "From elsewhere.");

    let m = provider.add_module("m");
    provider.add_function(m, "run", "Run.");
    provider.add_function(m, "_internal", "Exported anyway.");
    provider.add_function(m, "unlisted", "Not exported.");
    provider.add_module_alias(m, "imported", imported);
    provider.set_exports(m, &["imported", "_internal", "run", "missing"]);

    let ctx = build(&provider, "m");
    let module = ctx.doc(ctx.lookup("m").unwrap()).unwrap();

    assert_eq!(names(module.members()), vec!["imported", "_internal", "run"]);
    assert!(ctx.warnings().contains(&DocWarning::MissingExport {
        module: "m".to_string(),
        name: "missing".to_string(),
    }));
}

#[test]
fn test_submodules_and_supermodule() {
    let mut provider = MemoryProvider::new();
    provider.add_package("pkg");
    provider.add_module("pkg.zeta");
    provider.add_module("pkg.alpha");
    provider.add_module("pkg._private");

    let ctx = build(&provider, "pkg");
    let pkg = ctx.doc(ctx.lookup("pkg").unwrap()).unwrap();
    let pkg = pkg.as_module().unwrap();

    assert!(pkg.is_package());
    assert_eq!(names(pkg.submodules()), vec!["pkg.alpha", "pkg.zeta"]);
    assert!(ctx.lookup("pkg._private").is_none());

    let alpha = ctx.doc(ctx.lookup("pkg.alpha").unwrap()).unwrap();
    let alpha = alpha.as_module().unwrap();
    assert_eq!(alpha.supermodule().unwrap().refname(), "pkg");
    assert_eq!(alpha.entity_type(), EntityType::Module);
}

#[test]
fn test_hollow_namespace_package_is_discarded() {
    let mut provider = MemoryProvider::new();
    provider.add_package("pkg");
    provider.add_namespace_package("pkg.empty");
    provider.add_namespace_package("pkg.nested");
    provider.add_module("pkg.nested.leaf");

    let ctx = build(&provider, "pkg");
    let pkg = ctx.doc(ctx.lookup("pkg").unwrap()).unwrap();

    assert_eq!(names(pkg.members()), vec!["pkg.nested"]);
    assert!(ctx.lookup("pkg.empty").is_none());
    assert!(ctx.lookup("pkg.nested.leaf").is_some());

    let nested = ctx.doc(ctx.lookup("pkg.nested").unwrap()).unwrap();
    assert!(nested.as_module().unwrap().is_namespace());
}

#[test]
fn test_docfilter_applies_to_module_members() {
    let mut provider = MemoryProvider::new();
    let m = provider.add_module("m");
    provider.add_function(m, "keep", "Kept.");
    provider.add_function(m, "drop_me", "Dropped.");
    provider.add_class(m, "Kept", &[], "Kept class.");

    let config = DocConfig::default();
    let filter = |doc: Doc<'_>| !doc.name().starts_with("drop");
    let (ctx, id) = ModuleBuilder::new(&provider, &config)
        .with_docfilter(&filter)
        .build_standalone("m")
        .unwrap();

    assert_eq!(names(ctx.doc(id).unwrap().members()), vec!["keep", "Kept"]);
    assert!(ctx.lookup("m.drop_me").is_none());
}

#[test]
fn test_module_variable_docstrings() {
    let mut provider = MemoryProvider::new();
    let m = provider.add_module("settings");
    provider.set_docstring(m, "\n    Runtime settings.\n    ");
    provider.set_source(
        m,
        r#""""Runtime settings."""

TIMEOUT = 30
"""Seconds to wait before giving up."""

RETRIES: int = 3
'''How often to retry.'''

_secret = "hunter2"
"""Never shown."""

UNDOCUMENTED = 1
"#,
    );

    let ctx = build(&provider, "settings");
    let module = ctx.doc(ctx.lookup("settings").unwrap()).unwrap();

    assert_eq!(module.docstring(), "Runtime settings.");
    assert_eq!(
        names(module.as_module().unwrap().variables(false)),
        vec!["TIMEOUT", "RETRIES"]
    );
    let timeout = ctx.doc(ctx.lookup("settings.TIMEOUT").unwrap()).unwrap();
    assert_eq!(timeout.docstring(), "Seconds to wait before giving up.");
    assert!(!timeout.as_variable().unwrap().is_instance_var());
}

#[test]
fn test_class_variable_docstrings() {
    let mut provider = MemoryProvider::new();
    let m = provider.add_module("m");
    let config = provider.add_class(m, "Config", &[], "Configuration.");
    provider.add_attribute(config, "level");
    provider.set_source(
        config,
        r#"    class Config:
        """Configuration."""

        level = 1
        """Log level."""

        def __init__(self):
            self.path = None
            """Where the file lives."""
            self._cache = {}
            """Private."""
"#,
    );

    let ctx = build(&provider, "m");
    let class = ctx.doc(ctx.lookup("m.Config").unwrap()).unwrap();
    let class = class.as_class().unwrap();

    assert_eq!(names(class.class_variables(true, true)), vec!["level"]);
    assert_eq!(names(class.instance_variables(true, true)), vec!["path"]);

    let level = ctx.doc(ctx.lookup("m.Config.level").unwrap()).unwrap();
    assert_eq!(level.docstring(), "Log level.");
    let path = ctx.doc(ctx.lookup("m.Config.path").unwrap()).unwrap();
    assert_eq!(path.docstring(), "Where the file lives.");
    assert_eq!(path.qualname(), "Config.path");
    assert!(class.source().unwrap().starts_with("class Config:"));
}

#[test]
fn test_property_and_nested_class_members() {
    let mut provider = MemoryProvider::new();
    let m = provider.add_module("m");
    let outer = provider.add_class(m, "Outer", &[], "");
    provider.add_property(outer, "size", "Current size.");
    provider.add_nested_class(outer, "Inner", &[], "Nested helper.");

    let ctx = build(&provider, "m");

    let size = ctx.doc(ctx.lookup("m.Outer.size").unwrap()).unwrap();
    assert_eq!(size.docstring(), "Current size.");
    assert!(size.as_variable().unwrap().is_instance_var());

    let inner = ctx.doc(ctx.lookup("m.Outer.Inner").unwrap()).unwrap();
    assert_eq!(inner.entity_type(), EntityType::Variable);
    assert_eq!(inner.docstring(), "Nested helper.");
}

#[test]
fn test_unparsable_source_warns() {
    let mut provider = MemoryProvider::new();
    let m = provider.add_module("m");
    provider.set_source(m, "def broken(:\n");

    let ctx = build(&provider, "m");

    assert!(ctx.warnings().iter().any(|w| matches!(
        w,
        DocWarning::UnparsableSource { refname, .. } if refname == "m"
    )));
    assert!(ctx.lookup("m").is_some());
}

#[test]
fn test_missing_source_is_silent() {
    let mut provider = MemoryProvider::new();
    let m = provider.add_module("m");
    let shape = provider.add_class(m, "Shape", &[], "A shape.");
    provider.add_method(shape, "area", "Compute the area.");

    let ctx = build(&provider, "m");

    assert!(ctx.warnings().is_empty());
    assert!(ctx.lookup("m.Shape.area").is_some());
}

#[test]
fn test_unknown_module_fails() {
    let provider = MemoryProvider::new();
    let config = DocConfig::default();
    let result = ModuleBuilder::new(&provider, &config).build_standalone("missing");
    assert!(result.is_err());
}

#[test]
fn test_reset_clears_context() {
    let mut provider = MemoryProvider::new();
    let m = provider.add_module("m");
    provider.add_function(m, "run", "Run.");

    let mut ctx = build(&provider, "m");
    assert!(!ctx.is_empty());

    ctx.reset();
    assert!(ctx.is_empty());
    assert!(ctx.warnings().is_empty());
    assert_eq!(ctx.entity_count(), 0);
}

#[test]
fn test_config_file_overrides() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{"overrides": {{"m": {{"run": "Configured.", "stop": false}}}}}}"#
    )
    .unwrap();

    let config = DocConfig::load(file.path()).unwrap();

    let mut provider = MemoryProvider::new();
    let m = provider.add_module("m");
    provider.add_function(m, "run", "Run.");
    provider.add_function(m, "stop", "Stop.");

    let (ctx, _) = docgraph::helpers::document(&provider, "m", &config).unwrap();
    let run = ctx.doc(ctx.lookup("m.run").unwrap()).unwrap();
    assert_eq!(run.docstring(), "Configured.");
    assert!(ctx.lookup("m.stop").is_none());
    assert_eq!(config.source_suffixes, vec![".py"]);
}
