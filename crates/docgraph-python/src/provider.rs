//! Reflection provider over Python source trees.
//!
//! Modules are located under the configured roots the way the import system
//! would find them, parsed once and kept in an arena. Imports and base
//! classes are resolved lazily, on first use, so documenting one package
//! only reads the files it actually refers to.

use crate::config::PythonProviderConfig;
use crate::extractor::extract;
use crate::ir::{Binding, ClassIR, FunctionIR, ModuleIR};
use docgraph_reflect_api::mro::c3_linearize;
use docgraph_reflect_api::{
    list_submodules, ClassInfo, MemberInfo, MemberKind, NamespaceInfo, ObjectId,
    OverrideValue, ReflectError, ReflectResult, ReflectionProvider, RoutineDecorator, Signature,
    TypeRef,
};
use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tracing::{debug, info, instrument, trace, warn};
use walkdir::WalkDir;

/// Handle of `builtins.object`
const ROOT: ObjectId = ObjectId(0);

/// Bound on chained `from x import y` hops (guards against import cycles)
const MAX_IMPORT_DEPTH: usize = 32;

#[derive(Debug)]
struct Object {
    name: String,
    qualname: String,
    module: String,
    docstring: Option<String>,
    source: Option<String>,
    signature: Option<Signature>,
    is_async: bool,
    kind: ObjectKind,
}

#[derive(Debug)]
enum ObjectKind {
    Module(ModuleRecord),
    Class(ClassRecord),
    Routine(RoutineDecorator),
    Property { getter: ObjectId },
    Data,
    /// Imported from outside the roots; an empty qualname names a module
    Unresolved,
}

#[derive(Debug, Default)]
struct ModuleRecord {
    is_package: bool,
    is_namespace: bool,
    search_paths: Vec<PathBuf>,
    exports: Option<Vec<String>>,
    overrides: Vec<(String, OverrideValue)>,
    members: Vec<(String, Member)>,
}

#[derive(Debug, Clone)]
enum Member {
    Object(ObjectId),
    Import {
        module: String,
        member: Option<String>,
    },
}

#[derive(Debug)]
struct ClassRecord {
    /// Base expressions as written
    bases: Vec<String>,

    /// Module whose names the bases are looked up in
    scope: ObjectId,

    resolved_bases: Option<Vec<ObjectId>>,
    members: Vec<(String, ObjectId)>,
    slots: Vec<String>,
    mro: Option<Vec<ObjectId>>,

    /// Stands for a type that is not defined under the roots
    opaque: bool,
}

impl ClassRecord {
    fn opaque(id: ObjectId) -> Self {
        Self {
            bases: Vec::new(),
            scope: ROOT,
            resolved_bases: Some(Vec::new()),
            members: Vec::new(),
            slots: Vec::new(),
            mro: Some(vec![id, ROOT]),
            opaque: true,
        }
    }
}

/// Where a module lives on disk
#[derive(Debug, Clone, PartialEq, Eq)]
enum Location {
    Package { init: PathBuf, dir: PathBuf },
    Module(PathBuf),
    Namespace(Vec<PathBuf>),
}

impl Location {
    fn file(&self) -> Option<&Path> {
        match self {
            Self::Package { init, .. } => Some(init),
            Self::Module(path) => Some(path),
            Self::Namespace(_) => None,
        }
    }
}

#[derive(Debug)]
struct State {
    objects: Vec<Object>,
    modules: HashMap<String, ObjectId>,
    missing: HashSet<String>,
    externals: HashMap<String, ObjectId>,
}

impl State {
    fn new() -> Self {
        let root = Object {
            name: "object".to_string(),
            qualname: "object".to_string(),
            module: "builtins".to_string(),
            docstring: Some("The base class of the class hierarchy.".to_string()),
            source: None,
            signature: None,
            is_async: false,
            kind: ObjectKind::Class(ClassRecord {
                mro: Some(vec![ROOT]),
                ..ClassRecord::opaque(ROOT)
            }),
        };
        Self {
            objects: vec![root],
            modules: HashMap::new(),
            missing: HashSet::new(),
            externals: HashMap::new(),
        }
    }

    fn object(&self, id: ObjectId) -> ReflectResult<&Object> {
        self.objects
            .get(id.0 as usize)
            .ok_or(ReflectError::UnknownObject(id))
    }

    fn module_record(&self, id: ObjectId) -> ReflectResult<&ModuleRecord> {
        match &self.object(id)?.kind {
            ObjectKind::Module(record) => Ok(record),
            _ => Err(ReflectError::wrong_kind(id, "module")),
        }
    }

    fn class_record(&self, id: ObjectId) -> ReflectResult<&ClassRecord> {
        match &self.object(id)?.kind {
            ObjectKind::Class(record) => Ok(record),
            _ => Err(ReflectError::wrong_kind(id, "class")),
        }
    }

    fn class_record_mut(&mut self, id: ObjectId) -> Option<&mut ClassRecord> {
        match &mut self.objects.get_mut(id.0 as usize)?.kind {
            ObjectKind::Class(record) => Some(record),
            _ => None,
        }
    }

    fn is_class(&self, id: ObjectId) -> bool {
        self.class_record(id).is_ok()
    }

    fn alloc(&mut self, object: Object) -> ObjectId {
        self.objects.push(object);
        ObjectId((self.objects.len() - 1) as u64)
    }

    fn member_info(&self, name: &str, id: ObjectId) -> ReflectResult<MemberInfo> {
        let object = self.object(id)?;
        let kind = match &object.kind {
            ObjectKind::Module(_) => MemberKind::Module,
            ObjectKind::Class(_) => MemberKind::Class,
            ObjectKind::Routine(decorator) => MemberKind::routine(*decorator),
            ObjectKind::Property { getter } => MemberKind::DataDescriptor {
                getter: Some(*getter),
            },
            ObjectKind::Data => MemberKind::Data,
            ObjectKind::Unresolved if object.qualname.is_empty() => MemberKind::Module,
            ObjectKind::Unresolved => MemberKind::Data,
        };
        Ok(MemberInfo::new(name, id, kind).with_defined_in(object.module.clone()))
    }

    fn type_ref(&self, id: ObjectId) -> ReflectResult<TypeRef> {
        let object = self.object(id)?;
        Ok(TypeRef::new(object.module.clone(), object.qualname.clone()).with_object(id))
    }
}

/// Resolution over the locked state
struct Loader<'a> {
    config: &'a PythonProviderConfig,
    state: &'a mut State,
}

impl<'a> Loader<'a> {
    /// Load a module by dotted name, reading it from disk on first use
    fn load(&mut self, name: &str) -> ReflectResult<ObjectId> {
        if let Some(id) = self.state.modules.get(name) {
            return Ok(*id);
        }
        if self.state.missing.contains(name) {
            return Err(ReflectError::ModuleNotFound(name.to_string()));
        }

        let Some(location) = locate(self.config, name) else {
            self.state.missing.insert(name.to_string());
            return Err(ReflectError::ModuleNotFound(name.to_string()));
        };
        let parsed = match location.file() {
            Some(path) => Some(parse_file(path, self.config)?),
            None => None,
        };
        Ok(self.insert_module(name, location, parsed))
    }

    fn insert_module(
        &mut self,
        name: &str,
        location: Location,
        parsed: Option<(String, ModuleIR)>,
    ) -> ObjectId {
        let (is_package, is_namespace, search_paths) = match location {
            Location::Package { dir, .. } => (true, false, vec![dir]),
            Location::Module(_) => (false, false, Vec::new()),
            Location::Namespace(dirs) => (true, true, dirs),
        };
        let (source, ir) = match parsed {
            Some((source, ir)) => (Some(source), ir),
            None => (None, ModuleIR::new()),
        };
        let short = name.rsplit('.').next().unwrap_or(name).to_string();

        let id = self.state.alloc(Object {
            name: short.clone(),
            qualname: short,
            module: name.to_string(),
            docstring: ir.docstring,
            source,
            signature: None,
            is_async: false,
            kind: ObjectKind::Module(ModuleRecord {
                is_package,
                is_namespace,
                search_paths,
                exports: ir.exports,
                overrides: ir.overrides,
                members: Vec::new(),
            }),
        });
        self.state.modules.insert(name.to_string(), id);

        let package = if is_package {
            name
        } else {
            name.rsplit_once('.').map_or("", |(parent, _)| parent)
        };

        let mut members = Vec::with_capacity(ir.bindings.len());
        for (binding_name, binding) in ir.bindings {
            let member = match binding {
                Binding::Function(function) => {
                    Member::Object(self.alloc_function(name, None, function))
                }
                Binding::Class(class) => Member::Object(self.alloc_class(name, id, None, class)),
                Binding::Data => Member::Object(self.alloc_data(name, None, &binding_name)),
                Binding::Import(import) => match import.absolute_module(package) {
                    Some(module) => Member::Import {
                        module,
                        member: import.member,
                    },
                    None => {
                        warn!("Relative import of {} escapes the package in {}", binding_name, name);
                        continue;
                    }
                },
            };
            members.push((binding_name, member));
        }

        if let ObjectKind::Module(record) = &mut self.state.objects[id.0 as usize].kind {
            record.members = members;
        }
        debug!("Loaded module {}", name);
        id
    }

    fn alloc_function(&mut self, module: &str, owner: Option<&str>, function: FunctionIR) -> ObjectId {
        let qualname = qualify(owner, &function.name);
        let decorator = function.routine_decorator();
        let property = owner.is_some() && function.is_property();

        let routine = self.state.alloc(Object {
            name: function.name.clone(),
            qualname: qualname.clone(),
            module: module.to_string(),
            docstring: function.docstring.clone(),
            source: Some(function.source),
            signature: Some(function.signature),
            is_async: function.is_async,
            kind: ObjectKind::Routine(decorator),
        });
        if !property {
            return routine;
        }

        self.state.alloc(Object {
            name: function.name,
            qualname,
            module: module.to_string(),
            docstring: function.docstring,
            source: None,
            signature: None,
            is_async: false,
            kind: ObjectKind::Property { getter: routine },
        })
    }

    fn alloc_class(
        &mut self,
        module: &str,
        scope: ObjectId,
        owner: Option<&str>,
        class: ClassIR,
    ) -> ObjectId {
        let qualname = qualify(owner, &class.name);
        let id = self.state.alloc(Object {
            name: class.name,
            qualname: qualname.clone(),
            module: module.to_string(),
            docstring: class.docstring,
            source: Some(class.source),
            signature: None,
            is_async: false,
            kind: ObjectKind::Class(ClassRecord {
                bases: class.bases,
                scope,
                resolved_bases: None,
                members: Vec::new(),
                slots: class.slots,
                mro: None,
                opaque: false,
            }),
        });

        let mut members = Vec::with_capacity(class.members.len());
        for (name, binding) in class.members {
            let member = match binding {
                Binding::Function(function) => self.alloc_function(module, Some(qualname.as_str()), function),
                Binding::Class(nested) => self.alloc_class(module, scope, Some(qualname.as_str()), nested),
                Binding::Data => self.alloc_data(module, Some(qualname.as_str()), &name),
                Binding::Import(_) => continue,
            };
            members.push((name, member));
        }

        if let Some(record) = self.state.class_record_mut(id) {
            record.members = members;
        }
        id
    }

    fn alloc_data(&mut self, module: &str, owner: Option<&str>, name: &str) -> ObjectId {
        self.state.alloc(Object {
            name: name.to_string(),
            qualname: qualify(owner, name),
            module: module.to_string(),
            docstring: None,
            source: None,
            signature: None,
            is_async: false,
            kind: ObjectKind::Data,
        })
    }

    /// Placeholder for a name that lives outside the roots
    fn external(&mut self, module: &str, qualname: &str) -> ObjectId {
        let key = qualify(Some(module), qualname);
        if let Some(id) = self.state.externals.get(&key) {
            return *id;
        }

        let name = if qualname.is_empty() { module } else { qualname };
        let id = self.state.alloc(Object {
            name: name.rsplit('.').next().unwrap_or(name).to_string(),
            qualname: qualname.to_string(),
            module: module.to_string(),
            docstring: None,
            source: None,
            signature: None,
            is_async: false,
            kind: ObjectKind::Unresolved,
        });
        self.state.externals.insert(key, id);
        id
    }

    /// Opaque type for a base that cannot be followed
    fn opaque_class(&mut self, module: &str, qualname: &str) -> ObjectId {
        let id = self.external(module, qualname);
        let object = &mut self.state.objects[id.0 as usize];
        if matches!(object.kind, ObjectKind::Unresolved) {
            trace!("Treating {}.{} as an opaque base", module, qualname);
            object.kind = ObjectKind::Class(ClassRecord::opaque(id));
        }
        id
    }

    fn resolve_member(&mut self, member: &Member, depth: usize) -> ObjectId {
        match member {
            Member::Object(id) => *id,
            Member::Import {
                module,
                member: None,
            } => match self.load(module) {
                Ok(id) => id,
                Err(e) => {
                    trace!("Import of {} left unresolved: {}", module, e);
                    self.external(module, "")
                }
            },
            Member::Import {
                module,
                member: Some(name),
            } => self.import_from(module, name, depth),
        }
    }

    /// `from module import name`
    fn import_from(&mut self, module: &str, name: &str, depth: usize) -> ObjectId {
        if depth < MAX_IMPORT_DEPTH {
            if let Ok(id) = self.load(module) {
                let found = self.state.module_record(id).ok().and_then(|record| {
                    record
                        .members
                        .iter()
                        .find(|(bound, member)| {
                            bound == name && !is_self_import(member, module, name)
                        })
                        .map(|(_, member)| member.clone())
                });
                if let Some(member) = found {
                    return self.resolve_member(&member, depth + 1);
                }
                if let Ok(submodule) = self.load(&format!("{}.{}", module, name)) {
                    return submodule;
                }
            }
        }
        self.external(module, name)
    }

    /// Look a name up in a module namespace
    fn lookup(&mut self, module: ObjectId, name: &str) -> Option<ObjectId> {
        let member = self
            .state
            .module_record(module)
            .ok()?
            .members
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, member)| member.clone())?;
        Some(self.resolve_member(&member, 0))
    }

    /// Resolve a base expression such as `Base`, `mod.Base` or `Outer.Inner`
    fn resolve_base(&mut self, scope: ObjectId, expression: &str) -> ObjectId {
        let mut parts = expression.split('.').map(str::trim);
        let first = parts.next().unwrap_or(expression);
        let rest: Vec<&str> = parts.collect();

        let mut current = match self.lookup(scope, first) {
            Some(id) => id,
            None if expression == "object" => return ROOT,
            None => return self.opaque_class("builtins", expression),
        };

        for (i, part) in rest.iter().enumerate() {
            let next = match &self.state.objects[current.0 as usize].kind {
                ObjectKind::Module(_) => {
                    let module = self.state.objects[current.0 as usize].module.clone();
                    self.lookup(current, part)
                        .or_else(|| self.load(&format!("{}.{}", module, part)).ok())
                }
                ObjectKind::Class(record) => record
                    .members
                    .iter()
                    .find(|(bound, _)| bound == part)
                    .map(|(_, member)| *member),
                _ => None,
            };
            current = match next {
                Some(id) => id,
                None => {
                    let object = &self.state.objects[current.0 as usize];
                    let module = object.module.clone();
                    let qualname = qualify(
                        Some(object.qualname.as_str()).filter(|q| !q.is_empty() && !is_module(object)),
                        &rest[i..].join("."),
                    );
                    return self.opaque_class(&module, &qualname);
                }
            };
        }

        if self.state.is_class(current) {
            return current;
        }
        let object = &self.state.objects[current.0 as usize];
        let (module, qualname) = (object.module.clone(), object.qualname.clone());
        self.opaque_class(&module, &qualname)
    }

    fn resolved_bases(&mut self, class: ObjectId) -> Vec<ObjectId> {
        let (bases, scope) = match self.state.class_record(class) {
            Ok(record) => match &record.resolved_bases {
                Some(resolved) => return resolved.clone(),
                None => (record.bases.clone(), record.scope),
            },
            Err(_) => return Vec::new(),
        };

        let resolved: Vec<ObjectId> = bases
            .iter()
            .map(|expression| self.resolve_base(scope, expression))
            .collect();
        if let Some(record) = self.state.class_record_mut(class) {
            record.resolved_bases = Some(resolved.clone());
        }
        resolved
    }

    /// C3 method resolution order, memoized per class
    fn linearize(&mut self, class: ObjectId, visiting: &mut Vec<ObjectId>) -> ReflectResult<Vec<ObjectId>> {
        if let Some(mro) = &self.state.class_record(class)?.mro {
            return Ok(mro.clone());
        }
        if visiting.contains(&class) {
            return Err(ReflectError::Other(format!(
                "Inheritance cycle through {}",
                self.state.type_ref(class)?
            )));
        }

        visiting.push(class);
        let mut bases = self.resolved_bases(class);
        if bases.is_empty() {
            bases.push(ROOT);
        }
        let mut base_mros = Vec::with_capacity(bases.len());
        for base in &bases {
            base_mros.push(self.linearize(*base, visiting)?);
        }
        visiting.pop();

        let mro = c3_linearize(class, base_mros, bases).ok_or_else(|| {
            ReflectError::Other(format!(
                "Cannot create a consistent method resolution order for {}",
                class
            ))
        })?;
        if let Some(record) = self.state.class_record_mut(class) {
            record.mro = Some(mro.clone());
        }
        Ok(mro)
    }

    /// Docstring and signature of the first `__init__` along the MRO
    ///
    /// Reaching `object` yields an empty signature; reaching an opaque base
    /// yields no signature at all.
    fn constructor(&self, mro: &[ObjectId]) -> (Option<String>, Option<Signature>) {
        for class in mro {
            if *class == ROOT {
                return (None, Some(Signature::default()));
            }
            let Ok(record) = self.state.class_record(*class) else {
                continue;
            };
            if record.opaque {
                return (None, None);
            }
            if let Some((_, init)) = record.members.iter().find(|(name, _)| name == "__init__") {
                return match self.state.object(*init) {
                    Ok(object) if matches!(object.kind, ObjectKind::Routine(_)) => {
                        (object.docstring.clone(), object.signature.clone())
                    }
                    _ => (None, None),
                };
            }
        }
        (None, None)
    }
}

/// Static reflection provider reading Python packages from source
///
/// # Example
/// ```rust,no_run
/// use docgraph_python::{PythonProvider, PythonProviderConfig};
/// use docgraph_reflect_api::ReflectionProvider;
///
/// let config = PythonProviderConfig::default().with_root("src");
/// let provider = PythonProvider::new(config).unwrap();
/// let package = provider.import_module("mypackage").unwrap();
/// println!("{} is a package: {}", package.name, package.is_package);
/// ```
#[derive(Debug)]
pub struct PythonProvider {
    config: PythonProviderConfig,
    state: Mutex<State>,
}

impl PythonProvider {
    /// Create a provider, validating the configuration
    pub fn new(config: PythonProviderConfig) -> ReflectResult<Self> {
        config
            .validate()
            .map_err(|e| ReflectError::Other(format!("Invalid configuration: {}", e)))?;
        Ok(Self {
            config,
            state: Mutex::new(State::new()),
        })
    }

    /// Provider searching a single root with default settings
    pub fn from_root(root: impl Into<PathBuf>) -> ReflectResult<Self> {
        Self::new(PythonProviderConfig::default().with_root(root))
    }

    pub fn config(&self) -> &PythonProviderConfig {
        &self.config
    }

    fn with_loader<T>(&self, f: impl FnOnce(&mut Loader<'_>) -> T) -> T {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let mut loader = Loader {
            config: &self.config,
            state: &mut *state,
        };
        f(&mut loader)
    }

    /// Names of the modules loaded so far, sorted
    pub fn loaded_modules(&self) -> Vec<String> {
        self.with_loader(|loader| {
            let mut names: Vec<String> = loader.state.modules.keys().cloned().collect();
            names.sort();
            names
        })
    }

    /// Top-level modules and packages available under the roots
    pub fn discover(&self) -> ReflectResult<Vec<String>> {
        let names = list_submodules(&self.config.roots, &self.config.suffixes())?;
        Ok(self.without_excluded(names, &self.config.roots))
    }

    /// Parse every module of a package tree up front
    ///
    /// Subclass lists only know about loaded modules; preloading makes them
    /// complete for the package. Files that fail to read or parse are
    /// logged and skipped. Returns the number of modules newly loaded.
    #[instrument(skip(self))]
    pub fn preload(&self, package: &str) -> ReflectResult<usize> {
        let search_paths = self.with_loader(|loader| -> ReflectResult<Vec<PathBuf>> {
            let id = loader.load(package)?;
            Ok(loader.state.module_record(id)?.search_paths.clone())
        })?;

        let mut files: Vec<(String, PathBuf)> = Vec::new();
        for dir in &search_paths {
            for entry in WalkDir::new(dir)
                .follow_links(false)
                .sort_by_file_name()
                .into_iter()
                .filter_entry(|e| {
                    // Skip excluded and non-importable directories
                    if e.depth() > 0 && e.file_type().is_dir() {
                        return e.file_name().to_str().map_or(false, |name| {
                            !name.contains('.') && !self.config.should_exclude_dir(name)
                        });
                    }
                    true
                })
            {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(e) => {
                        warn!("Skipping unreadable entry: {}", e);
                        continue;
                    }
                };
                if !entry.file_type().is_file() {
                    continue;
                }
                let parsable = entry
                    .path()
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map_or(false, |ext| self.config.should_parse_extension(ext));
                if !parsable {
                    continue;
                }
                if let Some(name) = module_name(package, dir, entry.path()) {
                    files.push((name, entry.path().to_path_buf()));
                }
            }
        }

        let parse = |(name, path): &(String, PathBuf)| {
            (name.clone(), path.clone(), parse_file(path, &self.config))
        };
        let parsed: Vec<(String, PathBuf, ReflectResult<(String, ModuleIR)>)> = if self.config.parallel {
            files.par_iter().map(parse).collect()
        } else {
            files.iter().map(parse).collect()
        };

        let loaded = self.with_loader(|loader| {
            let mut loaded = 0;
            for (name, path, result) in parsed {
                if loader.state.modules.contains_key(&name) {
                    continue;
                }
                let parsed = match result {
                    Ok(parsed) => parsed,
                    Err(e) => {
                        warn!("Failed to load {}: {}", name, e);
                        continue;
                    }
                };
                match locate(loader.config, &name) {
                    Some(location) if location.file() == Some(path.as_path()) => {
                        loader.insert_module(&name, location, Some(parsed));
                        loaded += 1;
                    }
                    // Shadowed by a file in an earlier root
                    _ => match loader.load(&name) {
                        Ok(_) => loaded += 1,
                        Err(e) => warn!("Failed to load {}: {}", name, e),
                    },
                }
            }
            loaded
        });

        info!(package, files = files.len(), loaded, "Package preload completed");
        Ok(loaded)
    }

    fn without_excluded(&self, names: Vec<String>, paths: &[PathBuf]) -> Vec<String> {
        names
            .into_iter()
            .filter(|name| {
                !(self.config.should_exclude_dir(name)
                    && paths.iter().any(|path| path.join(name).is_dir()))
            })
            .collect()
    }
}

impl ReflectionProvider for PythonProvider {
    #[instrument(skip(self))]
    fn import_module(&self, name: &str) -> ReflectResult<NamespaceInfo> {
        self.with_loader(|loader| {
            let id = loader.load(name)?;
            let object = loader.state.object(id)?;
            let record = loader.state.module_record(id)?;

            Ok(NamespaceInfo {
                name: name.to_string(),
                object: id,
                docstring: object.docstring.clone(),
                is_package: record.is_package,
                is_namespace: record.is_namespace,
                search_paths: record.search_paths.clone(),
                exports: record.exports.clone(),
                overrides: record.overrides.clone(),
            })
        })
    }

    fn module_members(&self, module: ObjectId) -> ReflectResult<Vec<MemberInfo>> {
        self.with_loader(|loader| {
            let members = loader.state.module_record(module)?.members.clone();
            members
                .iter()
                .map(|(name, member)| {
                    let id = loader.resolve_member(member, 0);
                    loader.state.member_info(name, id)
                })
                .collect()
        })
    }

    fn module_member(&self, module: ObjectId, name: &str) -> ReflectResult<Option<MemberInfo>> {
        self.with_loader(|loader| {
            let member = loader
                .state
                .module_record(module)?
                .members
                .iter()
                .find(|(bound, _)| bound == name)
                .map(|(_, member)| member.clone());
            match member {
                Some(member) => {
                    let id = loader.resolve_member(&member, 0);
                    loader.state.member_info(name, id).map(Some)
                }
                None => Ok(None),
            }
        })
    }

    fn submodule_names(
        &self,
        namespace: &NamespaceInfo,
        suffixes: &[String],
    ) -> ReflectResult<Vec<String>> {
        let names = list_submodules(&namespace.search_paths, suffixes)?;
        Ok(self.without_excluded(names, &namespace.search_paths))
    }

    fn class_info(&self, class: ObjectId) -> ReflectResult<ClassInfo> {
        self.with_loader(|loader| {
            let mro = loader.linearize(class, &mut Vec::new())?;
            let (init_docstring, init_signature) = loader.constructor(&mro);
            let object = loader.state.object(class)?;
            let record = loader.state.class_record(class)?;

            Ok(ClassInfo {
                name: object.name.clone(),
                module: object.module.clone(),
                qualname: object.qualname.clone(),
                object: class,
                docstring: object.docstring.clone(),
                init_docstring,
                init_signature,
                slots: record.slots.clone(),
            })
        })
    }

    fn class_members(&self, class: ObjectId) -> ReflectResult<Vec<MemberInfo>> {
        self.with_loader(|loader| {
            loader
                .state
                .class_record(class)?
                .members
                .iter()
                .map(|(name, id)| loader.state.member_info(name, *id))
                .collect()
        })
    }

    fn mro(&self, class: ObjectId) -> ReflectResult<Vec<TypeRef>> {
        self.with_loader(|loader| {
            loader
                .linearize(class, &mut Vec::new())?
                .into_iter()
                .map(|id| loader.state.type_ref(id))
                .collect()
        })
    }

    fn subclasses(&self, class: ObjectId) -> ReflectResult<Vec<TypeRef>> {
        self.with_loader(|loader| {
            let candidates: Vec<ObjectId> = loader
                .state
                .objects
                .iter()
                .enumerate()
                .filter(|(_, object)| {
                    matches!(&object.kind, ObjectKind::Class(record) if !record.opaque)
                })
                .map(|(i, _)| ObjectId(i as u64))
                .collect();

            let mut subclasses = Vec::new();
            for candidate in candidates {
                if loader.resolved_bases(candidate).contains(&class) {
                    subclasses.push(loader.state.type_ref(candidate)?);
                }
            }
            Ok(subclasses)
        })
    }

    fn docstring(&self, object: ObjectId) -> Option<String> {
        self.with_loader(|loader| loader.state.object(object).ok()?.docstring.clone())
    }

    fn qualname(&self, object: ObjectId) -> Option<String> {
        self.with_loader(|loader| {
            loader
                .state
                .object(object)
                .ok()
                .map(|object| object.qualname.clone())
        })
    }

    fn source(&self, object: ObjectId) -> Option<String> {
        self.with_loader(|loader| loader.state.object(object).ok()?.source.clone())
    }

    fn signature(&self, callable: ObjectId) -> Option<Signature> {
        self.with_loader(|loader| loader.state.object(callable).ok()?.signature.clone())
    }

    fn is_async(&self, callable: ObjectId) -> bool {
        self.with_loader(|loader| {
            loader
                .state
                .object(callable)
                .map_or(false, |object| object.is_async)
        })
    }
}

/// Find a module under the roots
///
/// A regular package or module in an earlier root wins; directories without
/// an initializer are collected as portions of a namespace package.
fn locate(config: &PythonProviderConfig, name: &str) -> Option<Location> {
    if name.split('.').any(|part| part.is_empty()) {
        return None;
    }
    let relative: PathBuf = name.split('.').collect();
    let suffixes = config.suffixes();
    let mut portions = Vec::new();

    for root in &config.roots {
        let base = root.join(&relative);
        if base.is_dir() {
            for suffix in &suffixes {
                let init = base.join(format!("__init__{}", suffix));
                if init.is_file() {
                    return Some(Location::Package { init, dir: base });
                }
            }
        }
        for suffix in &suffixes {
            let mut file = base.clone().into_os_string();
            file.push(suffix);
            let file = PathBuf::from(file);
            if file.is_file() {
                return Some(Location::Module(file));
            }
        }
        if base.is_dir() {
            portions.push(base);
        }
    }

    if portions.is_empty() {
        None
    } else {
        Some(Location::Namespace(portions))
    }
}

/// Read and parse one file, enforcing the size limit
fn parse_file(path: &Path, config: &PythonProviderConfig) -> ReflectResult<(String, ModuleIR)> {
    let metadata = fs::metadata(path).map_err(|e| ReflectError::IoError(path.to_path_buf(), e))?;
    if metadata.len() > config.max_file_size as u64 {
        warn!("File too large: {} bytes", metadata.len());
        return Err(ReflectError::FileTooLarge(path.to_path_buf(), config.max_file_size));
    }

    let source =
        fs::read_to_string(path).map_err(|e| ReflectError::IoError(path.to_path_buf(), e))?;
    let ir = extract(&source, path)?;
    trace!("Parsed {}", path.display());
    Ok((source, ir))
}

/// Dotted module name of a file inside a package directory
fn module_name(package: &str, dir: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(dir).ok()?;
    let mut parts: Vec<String> = vec![package.to_string()];
    for component in relative.parent()?.components() {
        parts.push(component.as_os_str().to_str()?.to_string());
    }
    let stem = relative.file_stem()?.to_str()?;
    if stem != "__init__" {
        parts.push(stem.to_string());
    }
    Some(parts.join("."))
}

fn qualify(owner: Option<&str>, name: &str) -> String {
    match owner {
        Some(owner) if !name.is_empty() => format!("{}.{}", owner, name),
        Some(owner) => owner.to_string(),
        None => name.to_string(),
    }
}

fn is_module(object: &Object) -> bool {
    matches!(object.kind, ObjectKind::Module(_))
        || matches!(object.kind, ObjectKind::Unresolved if object.qualname.is_empty())
}

fn is_self_import(member: &Member, module: &str, name: &str) -> bool {
    matches!(
        member,
        Member::Import { module: m, member: Some(n) } if m == module && n == name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_name() {
        let dir = Path::new("/src/pkg");
        assert_eq!(
            module_name("pkg", dir, Path::new("/src/pkg/__init__.py")).as_deref(),
            Some("pkg")
        );
        assert_eq!(
            module_name("pkg", dir, Path::new("/src/pkg/sub/mod.py")).as_deref(),
            Some("pkg.sub.mod")
        );
        assert_eq!(
            module_name("pkg", dir, Path::new("/src/pkg/sub/__init__.py")).as_deref(),
            Some("pkg.sub")
        );
    }

    #[test]
    fn test_qualify() {
        assert_eq!(qualify(None, "f"), "f");
        assert_eq!(qualify(Some("C"), "f"), "C.f");
        assert_eq!(qualify(Some("numpy"), ""), "numpy");
    }

    #[test]
    fn test_locate_rejects_empty_segments() {
        let config = PythonProviderConfig::default().with_root("/nonexistent");
        assert_eq!(locate(&config, "a..b"), None);
        assert_eq!(locate(&config, "missing"), None);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(PythonProvider::new(PythonProviderConfig::default()).is_err());
    }
}
