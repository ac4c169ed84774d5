//! Read-only views over entities for renderers.
//!
//! A [`Doc`] borrows the [`Context`] and exposes every accessor a template
//! needs. Kind-specific accessors live on [`ModuleDoc`], [`ClassDoc`],
//! [`FunctionDoc`] and [`VariableDoc`], obtained with the `as_*` methods.

use crate::graph::{
    ClassData, Context, DocRef, Entity, EntityId, EntityKind, EntityType, FunctionData,
    ModuleData, VariableData,
};
use crate::signature::{format_annotation, format_params, LinkFn};
use docgraph_reflect_api::{ObjectId, TypeRef};
use std::fmt;
use std::ops::Deref;

/// Borrowed view of one entity.
#[derive(Clone, Copy)]
pub struct Doc<'a> {
    ctx: &'a Context,
    id: EntityId,
}

impl<'a> Doc<'a> {
    pub(crate) fn new(ctx: &'a Context, id: EntityId) -> Self {
        Self { ctx, id }
    }

    /// Id of the viewed entity.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// The context the entity lives in.
    pub fn context(&self) -> &'a Context {
        self.ctx
    }

    /// The underlying entity.
    pub fn entity(&self) -> &'a Entity {
        self.ctx.entity(self.id)
    }

    /// Declared name.
    pub fn name(&self) -> &'a str {
        &self.entity().name
    }

    /// Entity type tag.
    pub fn entity_type(&self) -> EntityType {
        self.entity().entity_type()
    }

    /// Cleaned docstring, possibly inherited.
    pub fn docstring(&self) -> &'a str {
        &self.entity().docstring
    }

    /// Raw-source handle.
    pub fn object(&self) -> Option<ObjectId> {
        self.entity().object
    }

    /// Fully qualified reference name.
    pub fn refname(&self) -> String {
        self.ctx.refname(self.id)
    }

    /// Qualified name inside the module.
    pub fn qualname(&self) -> String {
        self.ctx.qualname(self.id)
    }

    /// Owning module.
    pub fn module(&self) -> ModuleDoc<'a> {
        let module = Doc::new(self.ctx, self.entity().module);
        match &module.entity().kind {
            EntityKind::Module(data) => ModuleDoc { doc: module, data },
            _ => unreachable!("entity {} owned by a non-module", self.id),
        }
    }

    /// Entity this one inherits its docstring from.
    pub fn inherits(&self) -> Option<Doc<'a>> {
        self.entity().inherits.map(|id| Doc::new(self.ctx, id))
    }

    /// End of the `inherits` chain (the entity itself when not inheriting).
    pub fn inherits_top(&self) -> Doc<'a> {
        Doc::new(self.ctx, self.ctx.top_ancestor(self.id))
    }

    /// URL of this entity; see [`Context::url`].
    pub fn url(&self, relative_to: Option<EntityId>, link_prefix: &str, top_ancestor: bool) -> String {
        self.ctx.url(self.id, relative_to, link_prefix, top_ancestor)
    }

    /// Dedented source of a class or function.
    pub fn source(&self) -> Option<&'a str> {
        match &self.entity().kind {
            EntityKind::Class(data) => data.source.as_deref(),
            EntityKind::Function(data) => data.source.as_deref(),
            _ => None,
        }
    }

    /// Resolve an identifier from this entity's module.
    pub fn find_ident(&self, name: &str) -> DocRef {
        self.ctx.find_ident(self.entity().module, name)
    }

    /// Direct members of a module or class, in map order.
    pub fn members(&self) -> Vec<Doc<'a>> {
        self.entity()
            .members()
            .map(|members| members.values().map(|id| Doc::new(self.ctx, *id)).collect())
            .unwrap_or_default()
    }

    /// Module view, when this is a module.
    pub fn as_module(&self) -> Option<ModuleDoc<'a>> {
        match &self.entity().kind {
            EntityKind::Module(data) => Some(ModuleDoc { doc: *self, data }),
            _ => None,
        }
    }

    /// Class view, when this is a class.
    pub fn as_class(&self) -> Option<ClassDoc<'a>> {
        match &self.entity().kind {
            EntityKind::Class(data) => Some(ClassDoc { doc: *self, data }),
            _ => None,
        }
    }

    /// Function view, when this is a function.
    pub fn as_function(&self) -> Option<FunctionDoc<'a>> {
        match &self.entity().kind {
            EntityKind::Function(data) => Some(FunctionDoc { doc: *self, data }),
            _ => None,
        }
    }

    /// Variable view, when this is a variable.
    pub fn as_variable(&self) -> Option<VariableDoc<'a>> {
        match &self.entity().kind {
            EntityKind::Variable(data) => Some(VariableDoc { doc: *self, data }),
            _ => None,
        }
    }

    fn wrap(&self, id: EntityId) -> Doc<'a> {
        Doc::new(self.ctx, id)
    }
}

impl fmt::Debug for Doc<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {:?}>", self.entity_type(), self.refname())
    }
}

impl PartialEq for Doc<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.ctx, other.ctx) && self.id == other.id
    }
}

impl Eq for Doc<'_> {}

fn sorted_if(mut docs: Vec<Doc<'_>>, sort: bool) -> Vec<Doc<'_>> {
    if sort {
        docs.sort_by(|a, b| a.name().cmp(b.name()));
    }
    docs
}

macro_rules! view_deref {
    ($view:ident) => {
        impl<'a> Deref for $view<'a> {
            type Target = Doc<'a>;

            fn deref(&self) -> &Doc<'a> {
                &self.doc
            }
        }
    };
}

/// Module view.
#[derive(Clone, Copy)]
pub struct ModuleDoc<'a> {
    doc: Doc<'a>,
    data: &'a ModuleData,
}

view_deref!(ModuleDoc);

impl<'a> ModuleDoc<'a> {
    /// Module payload.
    pub fn data(&self) -> &'a ModuleData {
        self.data
    }

    /// Has submodules.
    pub fn is_package(&self) -> bool {
        self.data.is_package
    }

    /// Package without an initializer.
    pub fn is_namespace(&self) -> bool {
        self.data.is_namespace
    }

    /// Whether inheritance linking already ran.
    pub fn is_linked(&self) -> bool {
        self.data.is_linked()
    }

    /// Enclosing package.
    pub fn supermodule(&self) -> Option<ModuleDoc<'a>> {
        self.data
            .supermodule
            .and_then(|id| self.wrap(id).as_module())
    }

    fn of_kind(&self, kind: EntityType, sort: bool) -> Vec<Doc<'a>> {
        let docs = self
            .data
            .doc
            .values()
            .map(|id| self.wrap(*id))
            .filter(|doc| doc.entity_type() == kind)
            .collect();
        sorted_if(docs, sort)
    }

    /// Module-level variables.
    pub fn variables(&self, sort: bool) -> Vec<Doc<'a>> {
        self.of_kind(EntityType::Variable, sort)
    }

    /// Classes.
    pub fn classes(&self, sort: bool) -> Vec<Doc<'a>> {
        self.of_kind(EntityType::Class, sort)
    }

    /// Module-level functions.
    pub fn functions(&self, sort: bool) -> Vec<Doc<'a>> {
        self.of_kind(EntityType::Function, sort)
    }

    /// Submodules, sorted by name.
    pub fn submodules(&self) -> Vec<Doc<'a>> {
        self.of_kind(EntityType::Module, true)
    }

    /// Resolve a type reference from this module.
    pub fn find_class(&self, ty: &TypeRef) -> DocRef {
        self.ctx.find_class(self.id, ty)
    }
}

/// Class view.
#[derive(Clone, Copy)]
pub struct ClassDoc<'a> {
    doc: Doc<'a>,
    data: &'a ClassData,
}

view_deref!(ClassDoc);

impl<'a> ClassDoc<'a> {
    /// Class payload.
    pub fn data(&self) -> &'a ClassData {
        self.data
    }

    fn filter_members(
        &self,
        include_inherited: bool,
        sort: bool,
        keep: impl Fn(&Entity) -> bool,
    ) -> Vec<Doc<'a>> {
        let docs = self
            .data
            .doc
            .values()
            .map(|id| self.wrap(*id))
            .filter(|doc| keep(doc.entity()))
            .filter(|doc| include_inherited || doc.entity().inherits.is_none())
            .collect();
        sorted_if(docs, sort)
    }

    /// Class-level variables.
    pub fn class_variables(&self, include_inherited: bool, sort: bool) -> Vec<Doc<'a>> {
        self.filter_members(include_inherited, sort, |entity| {
            matches!(&entity.kind, EntityKind::Variable(data) if !data.instance_var)
        })
    }

    /// Instance variables.
    pub fn instance_variables(&self, include_inherited: bool, sort: bool) -> Vec<Doc<'a>> {
        self.filter_members(include_inherited, sort, |entity| {
            matches!(&entity.kind, EntityKind::Variable(data) if data.instance_var)
        })
    }

    /// Instance methods.
    pub fn methods(&self, include_inherited: bool, sort: bool) -> Vec<Doc<'a>> {
        self.filter_members(include_inherited, sort, |entity| {
            matches!(&entity.kind, EntityKind::Function(data) if data.method)
        })
    }

    /// Static and class methods.
    pub fn functions(&self, include_inherited: bool, sort: bool) -> Vec<Doc<'a>> {
        self.filter_members(include_inherited, sort, |entity| {
            matches!(&entity.kind, EntityKind::Function(data) if !data.method)
        })
    }

    /// Ancestors, nearest first; see [`Context::mro`].
    pub fn mro(&self, only_documented: bool) -> Vec<DocRef> {
        self.ctx.mro(self.id, only_documented)
    }

    /// Direct subclasses, resolved from the owning module.
    pub fn subclasses(&self) -> Vec<DocRef> {
        let module = self.entity().module;
        self.data
            .subclasses
            .iter()
            .map(|ty| self.ctx.find_class(module, ty))
            .collect()
    }

    /// Inherited members grouped by the ancestor class they come from.
    ///
    /// Consecutive members inheriting from the same class form one group,
    /// members sorted by name. Groups are ordered by the ancestor's position
    /// in the MRO.
    pub fn inherited_members(&self) -> Vec<(Doc<'a>, Vec<Doc<'a>>)> {
        let mut groups: Vec<(EntityId, Vec<Doc<'a>>)> = Vec::new();

        for id in self.data.doc.values() {
            let Some(parent) = self.ctx.entity(*id).inherits else {
                continue;
            };
            let Some(owner) = self.ctx.entity(parent).owner_class() else {
                continue;
            };
            let continues_group = groups.last().map_or(false, |(last, _)| *last == owner);
            if continues_group {
                if let Some((_, members)) = groups.last_mut() {
                    members.push(self.wrap(parent));
                }
            } else {
                groups.push((owner, vec![self.wrap(parent)]));
            }
        }

        let mro = self.mro(false);
        let position = |owner: EntityId| {
            mro.iter()
                .position(|resolved| resolved.entity() == Some(owner))
                .unwrap_or(usize::MAX)
        };
        groups.sort_by_key(|(owner, _)| position(*owner));

        groups
            .into_iter()
            .map(|(owner, members)| (self.wrap(owner), sorted_if(members, true)))
            .collect()
    }

    /// Constructor parameters without the leading `self`.
    ///
    /// Empty when the module's overrides mention the constructor.
    pub fn params(&self, annotate: bool, link: Option<LinkFn<'_>>) -> Vec<String> {
        let module = self.module();
        let overrides = &module.data().overrides;
        let excluded = [
            format!("{}.__init__", self.name()),
            format!("{}.__init__", self.qualname()),
            format!("{}.__init__", self.refname()),
        ];
        if excluded.iter().any(|key| overrides.contains_key(key)) {
            return Vec::new();
        }

        let mut params = format_params(
            self.ctx,
            module.id(),
            self.data.init_signature.as_ref(),
            annotate,
            link,
        );
        if params.first().map(String::as_str) == Some("self") {
            params.remove(0);
        }
        params
    }
}

/// Function view.
#[derive(Clone, Copy)]
pub struct FunctionDoc<'a> {
    doc: Doc<'a>,
    data: &'a FunctionData,
}

view_deref!(FunctionDoc);

impl<'a> FunctionDoc<'a> {
    /// Function payload.
    pub fn data(&self) -> &'a FunctionData {
        self.data
    }

    /// Instance method.
    pub fn is_method(&self) -> bool {
        self.data.method
    }

    /// Coroutine function.
    pub fn is_async(&self) -> bool {
        self.data.is_async
    }

    /// `def` or `async def`.
    pub fn funcdef(&self) -> &'static str {
        if self.data.is_async {
            "async def"
        } else {
            "def"
        }
    }

    /// Owning class of a method.
    pub fn cls(&self) -> Option<ClassDoc<'a>> {
        self.data.cls.and_then(|id| self.wrap(id).as_class())
    }

    /// Formatted parameters; see the `signature` module rules.
    pub fn params(&self, annotate: bool, link: Option<LinkFn<'_>>) -> Vec<String> {
        format_params(
            self.ctx,
            self.entity().module,
            self.data.signature.as_ref(),
            annotate,
            link,
        )
    }

    /// Formatted return annotation, empty when absent.
    pub fn return_annotation(&self, link: Option<LinkFn<'_>>) -> String {
        self.data
            .signature
            .as_ref()
            .and_then(|signature| signature.return_annotation.as_deref())
            .map(|annotation| format_annotation(self.ctx, self.entity().module, annotation, link))
            .unwrap_or_default()
    }
}

/// Variable view.
#[derive(Clone, Copy)]
pub struct VariableDoc<'a> {
    doc: Doc<'a>,
    data: &'a VariableData,
}

view_deref!(VariableDoc);

impl<'a> VariableDoc<'a> {
    /// Instance-level rather than class-level.
    pub fn is_instance_var(&self) -> bool {
        self.data.instance_var
    }

    /// Owning class.
    pub fn cls(&self) -> Option<ClassDoc<'a>> {
        self.data.cls.and_then(|id| self.wrap(id).as_class())
    }
}
