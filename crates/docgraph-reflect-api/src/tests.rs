//! Tests for reflection API types and the in-memory provider

use crate::*;
use std::fs;

#[test]
fn test_memory_provider_module_members() {
    let mut provider = MemoryProvider::new();
    let module = provider.add_module("pkg");
    provider.add_function(module, "run", "Run it.");
    let class = provider.add_class(module, "Runner", &[], "Runs.");
    provider.add_data(module, "LIMIT");

    let info = provider.import_module("pkg").unwrap();
    assert_eq!(info.name, "pkg");
    assert!(!info.is_package);

    let members = provider.module_members(info.object).unwrap();
    let names: Vec<&str> = members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["run", "Runner", "LIMIT"]);
    assert_eq!(members[1].object, class);
    assert_eq!(members[1].kind, MemberKind::Class);
    assert_eq!(members[0].defined_in.as_deref(), Some("pkg"));
}

#[test]
fn test_memory_provider_unknown_module() {
    let provider = MemoryProvider::new();
    let err = provider.import_module("missing").unwrap_err();
    assert!(matches!(err, ReflectError::ModuleNotFound(name) if name == "missing"));
}

#[test]
fn test_memory_provider_submodules() {
    let mut provider = MemoryProvider::new();
    provider.add_package("pkg");
    provider.add_module("pkg.a");
    provider.add_module("pkg.b");

    let info = provider.import_module("pkg").unwrap();
    assert!(info.is_package);
    let names = provider.submodule_names(&info, &[".py".to_string()]).unwrap();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_memory_provider_mro_and_subclasses() {
    let mut provider = MemoryProvider::new();
    let module = provider.add_module("m");
    let a = provider.add_class(module, "A", &[], "");
    let b = provider.add_class(module, "B", &[a], "");
    let c = provider.add_class(module, "C", &[a], "");
    let d = provider.add_class(module, "D", &[b, c], "");

    let mro: Vec<String> = provider
        .mro(d)
        .unwrap()
        .into_iter()
        .map(|t| t.qualname)
        .collect();
    assert_eq!(mro, vec!["D", "B", "C", "A", "object"]);

    let root = provider.mro(d).unwrap().pop().unwrap();
    assert!(provider.is_root_type(&root));

    let subclasses: Vec<String> = provider
        .subclasses(a)
        .unwrap()
        .into_iter()
        .map(|t| t.qualname)
        .collect();
    assert_eq!(subclasses, vec!["B", "C"]);
}

#[test]
fn test_memory_provider_routine_kinds() {
    let mut provider = MemoryProvider::new();
    let module = provider.add_module("m");
    let class = provider.add_class(module, "K", &[], "");
    provider.add_method(class, "plain", "");
    provider.add_routine(class, "make", "", RoutineDecorator::ClassMethod);
    provider.add_routine(class, "util", "", RoutineDecorator::StaticMethod);
    let prop = provider.add_property(class, "size", "The size.");

    let members = provider.class_members(class).unwrap();
    assert_eq!(
        members[0].kind,
        MemberKind::Routine {
            decorator: RoutineDecorator::Plain,
            bound: false
        }
    );
    assert_eq!(
        members[1].kind,
        MemberKind::Routine {
            decorator: RoutineDecorator::ClassMethod,
            bound: true
        }
    );
    assert!(members[2].kind.is_static_method());
    assert_eq!(members[3].object, prop);
    assert!(matches!(
        members[3].kind,
        MemberKind::DataDescriptor { getter: Some(_) }
    ));

    let util = provider.class_member(class, "util").unwrap().unwrap();
    assert_eq!(util.name, "util");
    assert!(provider.class_member(class, "nope").unwrap().is_none());
}

#[test]
fn test_memory_provider_forced_mro() {
    let mut provider = MemoryProvider::new();
    let module = provider.add_module("m");
    let x = provider.add_class(module, "X", &[], "");
    let y = provider.add_class(module, "Y", &[], "");
    provider.set_mro(x, vec![x, y]);
    provider.set_mro(y, vec![y, x]);

    let mro: Vec<Option<ObjectId>> = provider.mro(x).unwrap().into_iter().map(|t| t.object).collect();
    assert_eq!(mro, vec![Some(x), Some(y)]);
}

#[test]
fn test_override_value_from_json() {
    let values: Vec<OverrideValue> =
        serde_json::from_str(r#"[false, true, null, "text", 3, [1], {"a": 1}]"#).unwrap();
    assert_eq!(values[0], OverrideValue::Flag(false));
    assert_eq!(values[1], OverrideValue::Flag(true));
    assert_eq!(values[2], OverrideValue::Null);
    assert_eq!(values[3], OverrideValue::Text("text".to_string()));
    assert_eq!(values[4].type_name(), "number");
    assert_eq!(values[5].type_name(), "list");
    assert_eq!(values[6].type_name(), "dict");
}

#[test]
fn test_override_value_display() {
    assert_eq!(OverrideValue::Flag(false).to_string(), "False");
    assert_eq!(OverrideValue::from("doc").to_string(), "\"doc\"");
    assert_eq!(OverrideValue::Null.to_string(), "None");
}

#[test]
fn test_list_submodules_filters_entries() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("__init__.py"), "").unwrap();
    fs::write(root.join("alpha.py"), "").unwrap();
    fs::write(root.join("notes.txt"), "").unwrap();
    fs::write(root.join(".hidden.py"), "").unwrap();
    fs::create_dir(root.join("__pycache__")).unwrap();
    fs::create_dir(root.join("beta")).unwrap();
    fs::write(root.join("beta.py"), "").unwrap();
    fs::create_dir(root.join("tool.egg-info")).unwrap();

    let names = list_submodules(&[root.to_path_buf()], &[".py".to_string()]).unwrap();
    assert_eq!(names, vec!["alpha", "beta"]);
}

#[test]
fn test_list_submodules_missing_dir() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone");
    let err = list_submodules(&[missing], &[".py".to_string()]).unwrap_err();
    assert!(matches!(err, ReflectError::IoError(_, _)));
}

#[test]
fn test_type_ref_dotted() {
    let ty = TypeRef::new("pkg.mod", "Outer.Inner");
    assert_eq!(ty.dotted(), "pkg.mod.Outer.Inner");
    assert!(ty.same_name(&TypeRef::new("pkg.mod", "Outer.Inner").with_object(ObjectId(4))));
}

#[test]
fn test_namespace_short_name() {
    let info = NamespaceInfo::new("a.b.c", ObjectId(1));
    assert_eq!(info.short_name(), "c");
}
