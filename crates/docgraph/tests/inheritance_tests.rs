//! Integration tests for inheritance linking
//! Fill, link and idempotence across class hierarchies

use docgraph::{helpers, link_inheritance, Context, DocConfig, DocError, DocWarning, EntityId, ModuleBuilder};
use docgraph_reflect_api::{MemoryProvider, RoutineDecorator};

fn document(provider: &MemoryProvider, name: &str) -> (Context, EntityId) {
    helpers::document(provider, name, &DocConfig::default()).unwrap()
}

fn docstring(ctx: &Context, refname: &str) -> String {
    let id = ctx.lookup(refname).unwrap_or_else(|| panic!("{} not registered", refname));
    ctx.doc(id).unwrap().docstring().to_string()
}

fn inherits(ctx: &Context, refname: &str) -> Option<String> {
    let id = ctx.lookup(refname)?;
    ctx.doc(id).unwrap().inherits().map(|doc| doc.refname())
}

// ====================
// Scenarios
// ====================

#[test]
fn test_member_inherited_from_base() {
    let mut provider = MemoryProvider::new();
    let m = provider.add_module("m");
    let a = provider.add_class(m, "A", &[], "Base class.");
    provider.add_method(a, "f", "base");
    provider.add_class(m, "B", &[a], "Derived class.");

    let (ctx, _) = document(&provider, "m");

    assert_eq!(docstring(&ctx, "m.B.f"), "base");
    assert_eq!(inherits(&ctx, "m.B.f").as_deref(), Some("m.A.f"));
    assert_eq!(inherits(&ctx, "m.A.f"), None);

    let b_f = ctx.doc(ctx.lookup("m.B.f").unwrap()).unwrap();
    let function = b_f.as_function().unwrap();
    assert_eq!(function.cls().unwrap().refname(), "m.B");
    assert!(function.is_method());
}

#[test]
fn test_redeclared_member_keeps_own_docstring() {
    let mut provider = MemoryProvider::new();
    let m = provider.add_module("m");
    let a = provider.add_class(m, "A", &[], "");
    provider.add_method(a, "f", "base");
    let b = provider.add_class(m, "B", &[a], "");
    provider.add_method(b, "f", "override");

    let (ctx, _) = document(&provider, "m");

    assert_eq!(docstring(&ctx, "m.B.f"), "override");
    assert_eq!(inherits(&ctx, "m.B.f"), None);
}

#[test]
fn test_nearest_documented_source_wins() {
    let mut provider = MemoryProvider::new();
    let m = provider.add_module("m");
    let a = provider.add_class(m, "A", &[], "");
    provider.add_method(a, "f", "from A");
    let b = provider.add_class(m, "B", &[a], "");
    provider.add_method(b, "f", "from B");
    let c = provider.add_class(m, "C", &[b], "");
    provider.add_class(m, "D", &[c], "");

    let (ctx, _) = document(&provider, "m");

    let d = ctx.doc(ctx.lookup("m.D").unwrap()).unwrap();
    let mro: Vec<String> = d
        .as_class()
        .unwrap()
        .mro(true)
        .iter()
        .map(|r| ctx.ref_refname(r))
        .collect();
    assert_eq!(mro, vec!["m.C", "m.B", "m.A"]);

    assert_eq!(docstring(&ctx, "m.D.f"), "from B");
    assert_eq!(docstring(&ctx, "m.C.f"), "from B");
    assert_eq!(inherits(&ctx, "m.C.f").as_deref(), Some("m.B.f"));
    assert_eq!(inherits(&ctx, "m.D.f").as_deref(), Some("m.C.f"));

    let d_f = ctx.doc(ctx.lookup("m.D.f").unwrap()).unwrap();
    assert_eq!(d_f.inherits_top().refname(), "m.B.f");
}

#[test]
fn test_cyclic_inheritance_is_reported() {
    let mut provider = MemoryProvider::new();
    let m = provider.add_module("m");
    let x = provider.add_class(m, "X", &[], "");
    let y = provider.add_class(m, "Y", &[], "");
    let root = provider.root();
    provider.set_mro(x, vec![x, y, root]);
    provider.set_mro(y, vec![y, x, root]);

    let config = DocConfig::default();
    let (mut ctx, _) = ModuleBuilder::new(&provider, &config)
        .build_standalone("m")
        .unwrap();

    match link_inheritance(&mut ctx, &config) {
        Err(DocError::CyclicInheritance { classes }) => {
            assert!(classes.contains(&"m.X".to_string()));
            assert!(classes.contains(&"m.Y".to_string()));
        }
        other => panic!("expected a cycle, got {:?}", other),
    }
}

#[test]
fn test_empty_redeclaration_counts_as_inheriting() {
    let mut provider = MemoryProvider::new();
    let m = provider.add_module("m");
    let a = provider.add_class(m, "A", &[], "");
    provider.add_method(a, "f", "base");
    let b = provider.add_class(m, "B", &[a], "");
    provider.add_method(b, "f", "");

    let (ctx, _) = document(&provider, "m");

    assert_eq!(docstring(&ctx, "m.B.f"), "base");
    assert_eq!(inherits(&ctx, "m.B.f").as_deref(), Some("m.A.f"));
}

#[test]
fn test_same_object_inherits() {
    let mut provider = MemoryProvider::new();
    let m = provider.add_module("m");
    let a = provider.add_class(m, "A", &[], "");
    let f = provider.add_method(a, "f", "shared");
    let b = provider.add_class(m, "B", &[a], "");
    provider.add_class_alias(b, "f", f);

    let (ctx, _) = document(&provider, "m");

    assert_eq!(inherits(&ctx, "m.B.f").as_deref(), Some("m.A.f"));
}

#[test]
fn test_undocumented_ancestor_member_not_inherited() {
    let mut provider = MemoryProvider::new();
    let m = provider.add_module("m");
    let a = provider.add_class(m, "A", &[], "");
    provider.add_method(a, "quiet", "");
    provider.add_class(m, "B", &[a], "");

    let (ctx, _) = document(&provider, "m");

    assert!(ctx.lookup("m.A.quiet").is_some());
    assert!(ctx.lookup("m.B.quiet").is_none());
}

#[test]
fn test_inheritance_across_modules() {
    let mut provider = MemoryProvider::new();
    provider.add_package("pkg");
    let base = provider.add_module("pkg.base");
    let a = provider.add_class(base, "A", &[], "");
    provider.add_method(a, "f", "base");
    let derived = provider.add_module("pkg.derived");
    provider.add_class(derived, "B", &[a], "");

    let (ctx, _) = document(&provider, "pkg");

    assert_eq!(inherits(&ctx, "pkg.derived.B.f").as_deref(), Some("pkg.base.A.f"));

    // The clone lives on the subclass's page.
    let id = ctx.lookup("pkg.derived.B.f").unwrap();
    assert_eq!(ctx.url(id, None, "", false), "pkg/derived.html#pkg.derived.B.f");
    assert_eq!(ctx.url(id, None, "", true), "pkg/base.html#pkg.base.A.f");
    let derived = ctx.lookup("pkg.derived").unwrap();
    assert_eq!(ctx.url(id, Some(derived), "", false), "#pkg.derived.B.f");
    assert_eq!(ctx.get(id).unwrap().module, derived);
}

#[test]
fn test_document_all_links_across_trees() {
    let mut provider = MemoryProvider::new();
    let core = provider.add_module("core");
    let a = provider.add_class(core, "A", &[], "");
    provider.add_method(a, "f", "base");
    let ext = provider.add_module("ext");
    provider.add_class(ext, "B", &[a], "");

    let mut ctx = Context::new();
    let ids = helpers::document_all(&mut ctx, &provider, &["core", "ext"], &DocConfig::default())
        .unwrap();

    assert_eq!(ids.len(), 2);
    assert_eq!(inherits(&ctx, "ext.B.f").as_deref(), Some("core.A.f"));
}

#[test]
fn test_inherited_members_grouped_by_ancestor() {
    let mut provider = MemoryProvider::new();
    let m = provider.add_module("m");
    let left = provider.add_class(m, "Left", &[], "");
    provider.add_method(left, "x", "From left.");
    let right = provider.add_class(m, "Right", &[], "");
    provider.add_method(right, "z", "From right.");
    provider.add_method(right, "y", "Also from right.");
    provider.add_class(m, "Both", &[left, right], "");

    let (ctx, _) = document(&provider, "m");

    let both = ctx.doc(ctx.lookup("m.Both").unwrap()).unwrap();
    let groups: Vec<(String, Vec<String>)> = both
        .as_class()
        .unwrap()
        .inherited_members()
        .into_iter()
        .map(|(owner, members)| (owner.refname(), members.iter().map(|d| d.refname()).collect()))
        .collect();

    assert_eq!(
        groups,
        vec![
            ("m.Left".to_string(), vec!["m.Left.x".to_string()]),
            (
                "m.Right".to_string(),
                vec!["m.Right.y".to_string(), "m.Right.z".to_string()]
            ),
        ]
    );
}

#[test]
fn test_method_kinds_survive_inheritance() {
    let mut provider = MemoryProvider::new();
    let m = provider.add_module("m");
    let a = provider.add_class(m, "A", &[], "");
    provider.add_method(a, "run", "Run.");
    provider.add_routine(a, "make", "Make.", RoutineDecorator::ClassMethod);
    provider.add_routine(a, "check", "Check.", RoutineDecorator::StaticMethod);
    provider.add_class(m, "B", &[a], "");

    let (ctx, _) = document(&provider, "m");

    let b = ctx.doc(ctx.lookup("m.B").unwrap()).unwrap();
    let b = b.as_class().unwrap();
    let methods: Vec<&str> = b.methods(true, true).iter().map(|d| d.name()).collect();
    let functions: Vec<&str> = b.functions(true, true).iter().map(|d| d.name()).collect();
    assert_eq!(methods, vec!["run"]);
    assert_eq!(functions, vec!["check", "make"]);
    assert!(b.methods(false, true).is_empty());
}

// ====================
// Idempotence
// ====================

#[test]
fn test_second_link_is_noop_with_warning() {
    let mut provider = MemoryProvider::new();
    let m = provider.add_module("m");
    let a = provider.add_class(m, "A", &[], "");
    provider.add_method(a, "f", "base");
    provider.add_class(m, "B", &[a], "");

    let config = DocConfig::default();
    let (mut ctx, module) = helpers::document(&provider, "m", &config).unwrap();
    let registered = ctx.len();
    let before = inherits(&ctx, "m.B.f");

    link_inheritance(&mut ctx, &config).unwrap();

    assert_eq!(inherits(&ctx, "m.B.f"), before);
    assert_eq!(docstring(&ctx, "m.B.f"), "base");
    assert_eq!(ctx.len(), registered);
    assert!(ctx
        .warnings()
        .contains(&DocWarning::AlreadyLinked { module: "m".to_string() }));
    assert!(ctx.doc(module).unwrap().as_module().unwrap().is_linked());
}
