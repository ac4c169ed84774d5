//! In-memory reflection provider.
//!
//! Used by tests and by embedders that already hold program structure in
//! memory. Objects are added with builder methods; handles are indices into
//! an internal arena, with handle 0 reserved for `builtins.object`.

use crate::entities::{
    ClassInfo, MemberInfo, MemberKind, NamespaceInfo, ObjectId, OverrideValue, RoutineDecorator,
    Signature, TypeRef,
};
use crate::errors::{ReflectError, ReflectResult};
use crate::mro::c3_linearize;
use crate::traits::ReflectionProvider;
use std::collections::HashMap;

#[derive(Debug, Clone)]
struct MemoryObject {
    name: String,
    qualname: String,
    module: String,
    docstring: Option<String>,
    source: Option<String>,
    signature: Option<Signature>,
    is_async: bool,
    kind: ObjectKind,
}

#[derive(Debug, Clone)]
enum ObjectKind {
    Module(ModuleRecord),
    Class(ClassRecord),
    Routine(RoutineDecorator),
    Property { getter: ObjectId },
    Data,
}

#[derive(Debug, Clone, Default)]
struct ModuleRecord {
    members: Vec<(String, ObjectId)>,
    exports: Option<Vec<String>>,
    is_package: bool,
    is_namespace: bool,
    overrides: Vec<(String, OverrideValue)>,
    submodules: Vec<String>,
}

#[derive(Debug, Clone, Default)]
struct ClassRecord {
    bases: Vec<ObjectId>,
    members: Vec<(String, ObjectId)>,
    mro: Option<Vec<ObjectId>>,
    slots: Vec<String>,
    init_docstring: Option<String>,
    init_signature: Option<Signature>,
}

/// Reflection provider backed by in-memory descriptions
///
/// The `add_*` builders panic when handed a handle of the wrong kind (a
/// class where a module is expected and the like).
#[derive(Debug, Clone)]
pub struct MemoryProvider {
    objects: Vec<MemoryObject>,
    modules: HashMap<String, ObjectId>,
}

impl Default for MemoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProvider {
    pub fn new() -> Self {
        let root = MemoryObject {
            name: "object".to_string(),
            qualname: "object".to_string(),
            module: "builtins".to_string(),
            docstring: Some("The base class of the class hierarchy.".to_string()),
            source: None,
            signature: None,
            is_async: false,
            kind: ObjectKind::Class(ClassRecord::default()),
        };
        Self {
            objects: vec![root],
            modules: HashMap::new(),
        }
    }

    /// Handle of the universal base type
    pub fn root(&self) -> ObjectId {
        ObjectId(0)
    }

    /// Add a plain module
    ///
    /// When the parent package was added before, the module is listed as
    /// one of its submodules.
    pub fn add_module(&mut self, name: &str) -> ObjectId {
        self.insert_module(name, ModuleRecord::default())
    }

    /// Add a package (a module with submodules)
    pub fn add_package(&mut self, name: &str) -> ObjectId {
        self.insert_module(
            name,
            ModuleRecord {
                is_package: true,
                ..Default::default()
            },
        )
    }

    /// Add a package without an initializer
    pub fn add_namespace_package(&mut self, name: &str) -> ObjectId {
        self.insert_module(
            name,
            ModuleRecord {
                is_package: true,
                is_namespace: true,
                ..Default::default()
            },
        )
    }

    fn insert_module(&mut self, name: &str, record: ModuleRecord) -> ObjectId {
        let short = name.rsplit('.').next().unwrap_or(name).to_string();
        let id = self.push(MemoryObject {
            name: short.clone(),
            qualname: short.clone(),
            module: name.to_string(),
            docstring: None,
            source: None,
            signature: None,
            is_async: false,
            kind: ObjectKind::Module(record),
        });
        if let Some((parent, _)) = name.rsplit_once('.') {
            if let Some(&parent_id) = self.modules.get(parent) {
                self.module_mut(parent_id).submodules.push(short);
            }
        }
        self.modules.insert(name.to_string(), id);
        id
    }

    /// Add a module-level function
    pub fn add_function(&mut self, module: ObjectId, name: &str, docstring: &str) -> ObjectId {
        let module_name = self.objects[index(module)].module.clone();
        let id = self.push(MemoryObject {
            name: name.to_string(),
            qualname: name.to_string(),
            module: module_name,
            docstring: non_empty(docstring),
            source: None,
            signature: None,
            is_async: false,
            kind: ObjectKind::Routine(RoutineDecorator::Plain),
        });
        self.module_mut(module).members.push((name.to_string(), id));
        id
    }

    /// Add a module-level data attribute
    pub fn add_data(&mut self, module: ObjectId, name: &str) -> ObjectId {
        let module_name = self.objects[index(module)].module.clone();
        let id = self.push(MemoryObject {
            name: name.to_string(),
            qualname: name.to_string(),
            module: module_name,
            docstring: None,
            source: None,
            signature: None,
            is_async: false,
            kind: ObjectKind::Data,
        });
        self.module_mut(module).members.push((name.to_string(), id));
        id
    }

    /// Add a class to a module
    pub fn add_class(
        &mut self,
        module: ObjectId,
        name: &str,
        bases: &[ObjectId],
        docstring: &str,
    ) -> ObjectId {
        let module_name = self.objects[index(module)].module.clone();
        let id = self.new_class(module_name, name, name.to_string(), bases, docstring);
        self.module_mut(module).members.push((name.to_string(), id));
        id
    }

    /// Add a class nested inside another class
    pub fn add_nested_class(
        &mut self,
        owner: ObjectId,
        name: &str,
        bases: &[ObjectId],
        docstring: &str,
    ) -> ObjectId {
        let owner_obj = &self.objects[index(owner)];
        let module_name = owner_obj.module.clone();
        let qualname = format!("{}.{}", owner_obj.qualname, name);
        let id = self.new_class(module_name, name, qualname, bases, docstring);
        self.class_mut(owner).members.push((name.to_string(), id));
        id
    }

    fn new_class(
        &mut self,
        module: String,
        name: &str,
        qualname: String,
        bases: &[ObjectId],
        docstring: &str,
    ) -> ObjectId {
        self.push(MemoryObject {
            name: name.to_string(),
            qualname,
            module,
            docstring: non_empty(docstring),
            source: None,
            signature: None,
            is_async: false,
            kind: ObjectKind::Class(ClassRecord {
                bases: bases.to_vec(),
                ..Default::default()
            }),
        })
    }

    /// Add a plain method
    pub fn add_method(&mut self, class: ObjectId, name: &str, docstring: &str) -> ObjectId {
        self.add_routine(class, name, docstring, RoutineDecorator::Plain)
    }

    /// Add a method with an explicit decorator
    pub fn add_routine(
        &mut self,
        class: ObjectId,
        name: &str,
        docstring: &str,
        decorator: RoutineDecorator,
    ) -> ObjectId {
        let id = self.new_class_attribute(class, name, docstring, ObjectKind::Routine(decorator));
        self.class_mut(class).members.push((name.to_string(), id));
        id
    }

    /// Add a property; the docstring lives on the getter
    pub fn add_property(&mut self, class: ObjectId, name: &str, docstring: &str) -> ObjectId {
        let getter =
            self.new_class_attribute(class, name, docstring, ObjectKind::Routine(RoutineDecorator::Plain));
        let id = self.new_class_attribute(class, name, docstring, ObjectKind::Property { getter });
        self.class_mut(class).members.push((name.to_string(), id));
        id
    }

    /// Add a class-level data attribute
    pub fn add_attribute(&mut self, class: ObjectId, name: &str) -> ObjectId {
        let id = self.new_class_attribute(class, name, "", ObjectKind::Data);
        self.class_mut(class).members.push((name.to_string(), id));
        id
    }

    fn new_class_attribute(
        &mut self,
        class: ObjectId,
        name: &str,
        docstring: &str,
        kind: ObjectKind,
    ) -> ObjectId {
        let owner = &self.objects[index(class)];
        let module = owner.module.clone();
        let qualname = format!("{}.{}", owner.qualname, name);
        self.push(MemoryObject {
            name: name.to_string(),
            qualname,
            module,
            docstring: non_empty(docstring),
            source: None,
            signature: None,
            is_async: false,
            kind,
        })
    }

    /// Bind an existing object under `name` in a module (an import)
    pub fn add_module_alias(&mut self, module: ObjectId, name: &str, object: ObjectId) {
        self.module_mut(module).members.push((name.to_string(), object));
    }

    /// Bind an existing object under `name` in a class body
    pub fn add_class_alias(&mut self, class: ObjectId, name: &str, object: ObjectId) {
        self.class_mut(class).members.push((name.to_string(), object));
    }

    pub fn set_docstring(&mut self, object: ObjectId, docstring: &str) {
        self.objects[index(object)].docstring = non_empty(docstring);
    }

    pub fn set_source(&mut self, object: ObjectId, source: &str) {
        self.objects[index(object)].source = Some(source.to_string());
    }

    pub fn set_signature(&mut self, callable: ObjectId, signature: Signature) {
        self.objects[index(callable)].signature = Some(signature);
    }

    pub fn set_async(&mut self, callable: ObjectId, is_async: bool) {
        self.objects[index(callable)].is_async = is_async;
    }

    pub fn set_exports(&mut self, module: ObjectId, exports: &[&str]) {
        self.module_mut(module).exports = Some(exports.iter().map(|s| s.to_string()).collect());
    }

    pub fn add_override(&mut self, module: ObjectId, key: &str, value: impl Into<OverrideValue>) {
        self.module_mut(module)
            .overrides
            .push((key.to_string(), value.into()));
    }

    pub fn set_slots(&mut self, class: ObjectId, slots: &[&str]) {
        self.class_mut(class).slots = slots.iter().map(|s| s.to_string()).collect();
    }

    /// Declare a constructor for a class
    pub fn set_init(&mut self, class: ObjectId, docstring: &str, signature: Option<Signature>) {
        let record = self.class_mut(class);
        record.init_docstring = non_empty(docstring);
        record.init_signature = signature;
    }

    /// Force the MRO of a class (the class itself first)
    ///
    /// Bypasses linearization; lets tests describe hierarchies no real
    /// runtime would accept.
    pub fn set_mro(&mut self, class: ObjectId, mro: Vec<ObjectId>) {
        self.class_mut(class).mro = Some(mro);
    }

    fn push(&mut self, object: MemoryObject) -> ObjectId {
        self.objects.push(object);
        ObjectId((self.objects.len() - 1) as u64)
    }

    fn module_mut(&mut self, module: ObjectId) -> &mut ModuleRecord {
        match &mut self.objects[index(module)].kind {
            ObjectKind::Module(record) => record,
            _ => panic!("{} is not a module", module),
        }
    }

    fn class_mut(&mut self, class: ObjectId) -> &mut ClassRecord {
        match &mut self.objects[index(class)].kind {
            ObjectKind::Class(record) => record,
            _ => panic!("{} is not a class", class),
        }
    }

    fn object(&self, id: ObjectId) -> ReflectResult<&MemoryObject> {
        self.objects
            .get(index(id))
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
        };
        Ok(MemberInfo::new(name, id, kind).with_defined_in(object.module.clone()))
    }

    fn type_ref(&self, id: ObjectId) -> ReflectResult<TypeRef> {
        let object = self.object(id)?;
        Ok(TypeRef::new(object.module.clone(), object.qualname.clone()).with_object(id))
    }

    fn linearize(&self, class: ObjectId) -> ReflectResult<Vec<ObjectId>> {
        let record = self.class_record(class)?;
        if let Some(mro) = &record.mro {
            return Ok(mro.clone());
        }
        if class == self.root() {
            return Ok(vec![class]);
        }

        let bases = if record.bases.is_empty() {
            vec![self.root()]
        } else {
            record.bases.clone()
        };
        let base_mros = bases
            .iter()
            .map(|base| self.linearize(*base))
            .collect::<ReflectResult<Vec<_>>>()?;

        c3_linearize(class, base_mros, bases).ok_or_else(|| {
            ReflectError::Other(format!(
                "Cannot create a consistent method resolution order for {}",
                class
            ))
        })
    }
}

fn index(id: ObjectId) -> usize {
    id.0 as usize
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

impl ReflectionProvider for MemoryProvider {
    fn import_module(&self, name: &str) -> ReflectResult<NamespaceInfo> {
        let id = *self
            .modules
            .get(name)
            .ok_or_else(|| ReflectError::ModuleNotFound(name.to_string()))?;
        let object = self.object(id)?;
        let record = self.module_record(id)?;

        Ok(NamespaceInfo {
            name: name.to_string(),
            object: id,
            docstring: object.docstring.clone(),
            is_package: record.is_package,
            is_namespace: record.is_namespace,
            search_paths: Vec::new(),
            exports: record.exports.clone(),
            overrides: record.overrides.clone(),
        })
    }

    fn module_members(&self, module: ObjectId) -> ReflectResult<Vec<MemberInfo>> {
        self.module_record(module)?
            .members
            .iter()
            .map(|(name, id)| self.member_info(name, *id))
            .collect()
    }

    fn submodule_names(
        &self,
        namespace: &NamespaceInfo,
        _suffixes: &[String],
    ) -> ReflectResult<Vec<String>> {
        Ok(self.module_record(namespace.object)?.submodules.clone())
    }

    fn class_info(&self, class: ObjectId) -> ReflectResult<ClassInfo> {
        let object = self.object(class)?;
        let record = self.class_record(class)?;

        Ok(ClassInfo {
            name: object.name.clone(),
            module: object.module.clone(),
            qualname: object.qualname.clone(),
            object: class,
            docstring: object.docstring.clone(),
            init_docstring: record.init_docstring.clone(),
            init_signature: record.init_signature.clone(),
            slots: record.slots.clone(),
        })
    }

    fn class_members(&self, class: ObjectId) -> ReflectResult<Vec<MemberInfo>> {
        self.class_record(class)?
            .members
            .iter()
            .map(|(name, id)| self.member_info(name, *id))
            .collect()
    }

    fn mro(&self, class: ObjectId) -> ReflectResult<Vec<TypeRef>> {
        self.linearize(class)?
            .into_iter()
            .map(|id| self.type_ref(id))
            .collect()
    }

    fn subclasses(&self, class: ObjectId) -> ReflectResult<Vec<TypeRef>> {
        let mut subclasses = Vec::new();
        for (i, object) in self.objects.iter().enumerate() {
            if let ObjectKind::Class(record) = &object.kind {
                if record.bases.contains(&class) {
                    subclasses.push(self.type_ref(ObjectId(i as u64))?);
                }
            }
        }
        Ok(subclasses)
    }

    fn docstring(&self, object: ObjectId) -> Option<String> {
        self.object(object).ok()?.docstring.clone()
    }

    fn qualname(&self, object: ObjectId) -> Option<String> {
        self.object(object).ok().map(|o| o.qualname.clone())
    }

    fn source(&self, object: ObjectId) -> Option<String> {
        self.object(object).ok()?.source.clone()
    }

    fn signature(&self, callable: ObjectId) -> Option<Signature> {
        self.object(callable).ok()?.signature.clone()
    }

    fn is_async(&self, callable: ObjectId) -> bool {
        self.object(callable).map_or(false, |o| o.is_async)
    }
}
