use crate::entities::{ClassInfo, MemberInfo, NamespaceInfo, ObjectId, Signature, TypeRef};
use crate::errors::{ReflectError, ReflectResult};
use std::fs;
use std::path::{Path, PathBuf};

/// Source of introspected program structure
///
/// The documentation graph never looks at runtime objects directly; every
/// question about a namespace, type or callable goes through this trait.
/// Handles ([`ObjectId`]) are opaque to callers and only meaningful to the
/// provider that issued them.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` so one provider can feed several
/// independent contexts.
///
/// # Example
/// ```rust,ignore
/// use docgraph_reflect_api::{MemoryProvider, ReflectionProvider};
///
/// let mut provider = MemoryProvider::new();
/// let module = provider.add_module("pkg");
/// provider.add_function(module, "run", "Run it.");
///
/// let info = provider.import_module("pkg")?;
/// assert_eq!(provider.module_members(info.object)?.len(), 1);
/// ```
pub trait ReflectionProvider: Send + Sync {
    /// Import the namespace with the given dotted name
    fn import_module(&self, name: &str) -> ReflectResult<NamespaceInfo>;

    /// All members of a namespace, in declaration order
    fn module_members(&self, module: ObjectId) -> ReflectResult<Vec<MemberInfo>>;

    /// Look up one member by name (used for export lists)
    fn module_member(&self, module: ObjectId, name: &str) -> ReflectResult<Option<MemberInfo>> {
        Ok(self
            .module_members(module)?
            .into_iter()
            .find(|member| member.name == name))
    }

    /// Names of the submodules of a package
    ///
    /// Default implementation lists the package search paths on disk. Can be
    /// overridden by providers that do not live on a filesystem.
    fn submodule_names(
        &self,
        namespace: &NamespaceInfo,
        suffixes: &[String],
    ) -> ReflectResult<Vec<String>> {
        list_submodules(&namespace.search_paths, suffixes)
    }

    /// Describe a type
    fn class_info(&self, class: ObjectId) -> ReflectResult<ClassInfo>;

    /// Members declared directly on a type, in declaration order
    fn class_members(&self, class: ObjectId) -> ReflectResult<Vec<MemberInfo>>;

    /// Look up a member declared directly on a type
    fn class_member(&self, class: ObjectId, name: &str) -> ReflectResult<Option<MemberInfo>> {
        Ok(self
            .class_members(class)?
            .into_iter()
            .find(|member| member.name == name))
    }

    /// Method resolution order, starting with the type itself
    fn mro(&self, class: ObjectId) -> ReflectResult<Vec<TypeRef>>;

    /// Direct subclasses known to the provider
    fn subclasses(&self, class: ObjectId) -> ReflectResult<Vec<TypeRef>>;

    /// Whether the type is the universal base every type derives from
    fn is_root_type(&self, ty: &TypeRef) -> bool {
        ty.module == "builtins" && ty.qualname == "object"
    }

    /// Raw (uncleaned) docstring of any object
    fn docstring(&self, object: ObjectId) -> Option<String>;

    /// Qualified name of a callable or type
    fn qualname(&self, object: ObjectId) -> Option<String>;

    /// Raw source text of a module, type or callable
    fn source(&self, object: ObjectId) -> Option<String>;

    /// Signature of a callable; `None` when not introspectable
    fn signature(&self, callable: ObjectId) -> Option<Signature>;

    /// Whether a callable is a coroutine function
    fn is_async(&self, _callable: ObjectId) -> bool {
        false
    }
}

/// Enumerate submodule names under package search paths
///
/// Entries starting with `.`, `__pycache__` or `__init__.py` are skipped.
/// Files ending in one of `suffixes` yield their name without the
/// extension; directories yield their name unless it contains a dot. Each
/// directory is listed in name order and duplicates are dropped.
pub fn list_submodules(paths: &[PathBuf], suffixes: &[String]) -> ReflectResult<Vec<String>> {
    let mut names: Vec<String> = Vec::new();

    for path in paths {
        let mut entries: Vec<(String, bool)> = Vec::new();
        for entry in fs::read_dir(path).map_err(|e| ReflectError::IoError(path.clone(), e))? {
            let entry = entry.map_err(|e| ReflectError::IoError(path.clone(), e))?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            entries.push((file_name, entry.path().is_dir()));
        }
        entries.sort();

        for (file_name, is_dir) in entries {
            if file_name.starts_with('.')
                || file_name.starts_with("__pycache__")
                || file_name.starts_with("__init__.py")
            {
                continue;
            }
            let root = if is_dir {
                // Only dotless directories can be imported as packages
                if file_name.contains('.') {
                    continue;
                }
                file_name.as_str()
            } else if suffixes.iter().any(|suffix| file_name.ends_with(suffix.as_str())) {
                strip_extension(&file_name)
            } else {
                continue;
            };
            if !names.iter().any(|name| name == root) {
                names.push(root.to_string());
            }
        }
    }

    Ok(names)
}

fn strip_extension(file_name: &str) -> &str {
    Path::new(file_name)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or(file_name)
}
