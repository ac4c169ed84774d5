//! Entity construction from a reflection provider.
//!
//! [`ModuleBuilder`] imports a namespace, discovers its public members and
//! submodules, and registers everything it creates in a [`Context`].

mod class;
mod function;
pub(crate) mod vardocs;

use crate::config::DocConfig;
use crate::doc::Doc;
use crate::error::{DocWarning, Result};
use crate::graph::{Context, Entity, EntityId, EntityKind, ModuleData};
use docgraph_reflect_api::{
    cleandoc, is_public, MemberInfo, MemberKind, NamespaceInfo, OverrideValue, ReflectionProvider,
};
use indexmap::IndexMap;
use log::{debug, info};

/// Predicate deciding which module members are documented.
pub type DocFilter<'a> = &'a dyn Fn(Doc<'_>) -> bool;

/// Builds Module entities, recursively, into a [`Context`].
///
/// # Examples
///
/// ```rust
/// use docgraph::{DocConfig, ModuleBuilder};
/// use docgraph_reflect_api::MemoryProvider;
///
/// let mut provider = MemoryProvider::new();
/// let module = provider.add_module("tools");
/// provider.add_function(module, "run", "Run the tool.");
/// provider.add_function(module, "debug", "Debug the tool.");
///
/// let config = DocConfig::default();
/// let hide_debug = |doc: docgraph::Doc<'_>| doc.name() != "debug";
/// let (context, id) = ModuleBuilder::new(&provider, &config)
///     .with_docfilter(&hide_debug)
///     .build_standalone("tools")
///     .unwrap();
///
/// let module = context.doc(id).unwrap();
/// let names: Vec<&str> = module.members().iter().map(|d| d.name()).collect();
/// assert_eq!(names, vec!["run"]);
/// ```
pub struct ModuleBuilder<'a> {
    provider: &'a dyn ReflectionProvider,
    config: &'a DocConfig,
    docfilter: Option<DocFilter<'a>>,
}

impl<'a> ModuleBuilder<'a> {
    /// Create a builder over a provider.
    pub fn new(provider: &'a dyn ReflectionProvider, config: &'a DocConfig) -> Self {
        Self {
            provider,
            config,
            docfilter: None,
        }
    }

    /// Only keep module members accepted by `filter`.
    pub fn with_docfilter(mut self, filter: DocFilter<'a>) -> Self {
        self.docfilter = Some(filter);
        self
    }

    /// Import `name` and build it into `ctx`.
    pub fn build(&self, ctx: &mut Context, name: &str) -> Result<EntityId> {
        let namespace = self.provider.import_module(name)?;
        self.build_namespace(ctx, &namespace, None)
    }

    /// Import `name` and build it into a fresh context.
    pub fn build_standalone(&self, name: &str) -> Result<(Context, EntityId)> {
        let mut ctx = Context::new();
        let id = self.build(&mut ctx, name)?;
        Ok((ctx, id))
    }

    /// Build an already imported namespace.
    pub fn build_namespace(
        &self,
        ctx: &mut Context,
        namespace: &NamespaceInfo,
        supermodule: Option<EntityId>,
    ) -> Result<EntityId> {
        let mut name = namespace.name.clone();
        if !namespace.is_package {
            if let Some(stripped) = name.strip_suffix(".__init__") {
                name = stripped.to_string();
            }
        }
        debug!("Building module {}", name);

        let overrides: IndexMap<String, OverrideValue> =
            namespace.overrides.iter().cloned().collect();
        let module_id = ctx.alloc(Entity {
            name: name.clone(),
            module: ctx.next_id(),
            object: Some(namespace.object),
            docstring: clean_docstring(namespace.docstring.clone()),
            inherits: None,
            kind: EntityKind::Module(ModuleData {
                supermodule,
                is_package: namespace.is_package,
                is_namespace: namespace.is_namespace,
                overrides,
                ..Default::default()
            }),
        });

        let mut doc: IndexMap<String, EntityId> = IndexMap::new();

        for member in self.public_members(ctx, &name, namespace)? {
            match member.kind {
                MemberKind::Routine { .. } => {
                    let id = function::build_function(ctx, self.provider, module_id, None, &member, false);
                    doc.insert(member.name.clone(), id);
                }
                MemberKind::Class => {
                    let id = class::build_class(
                        ctx,
                        self.provider,
                        module_id,
                        &member.name,
                        member.object,
                        None,
                    )?;
                    doc.insert(member.name.clone(), id);
                }
                _ => {}
            }
        }

        if !namespace.is_namespace {
            self.add_variables(ctx, module_id, &name, namespace, &mut doc);
        }

        if namespace.is_package {
            let submodules = self
                .provider
                .submodule_names(namespace, &self.config.source_suffixes)?;
            for root in submodules {
                if doc.contains_key(&root) || !is_public(&root) {
                    continue;
                }
                let fullname = format!("{}.{}", name, root);
                let sub_namespace = self.provider.import_module(&fullname)?;
                let sub_id = self.build_namespace(ctx, &sub_namespace, Some(module_id))?;

                let hollow = matches!(
                    &ctx.entity(sub_id).kind,
                    EntityKind::Module(data) if data.is_namespace && data.doc.is_empty()
                );
                if hollow {
                    debug!("Discarding empty namespace package {}", fullname);
                    let refname = ctx.refname(sub_id);
                    ctx.unregister(&refname);
                    continue;
                }
                doc.insert(root, sub_id);
            }
        }

        if let Some(filter) = self.docfilter {
            let view: &Context = ctx;
            doc.retain(|_, id| filter(Doc::new(view, *id)));
        }

        if let EntityKind::Module(data) = &mut ctx.entity_mut(module_id).kind {
            data.doc = doc.clone();
        }
        self.register(ctx, module_id, &doc);

        info!("Built module {} with {} members", name, doc.len());
        Ok(module_id)
    }

    fn public_members(
        &self,
        ctx: &mut Context,
        module_name: &str,
        namespace: &NamespaceInfo,
    ) -> Result<Vec<MemberInfo>> {
        match &namespace.exports {
            Some(exports) => {
                let mut members = Vec::with_capacity(exports.len());
                for export in exports {
                    match self.provider.module_member(namespace.object, export)? {
                        Some(member) => members.push(member),
                        None => ctx.warn(DocWarning::MissingExport {
                            module: module_name.to_string(),
                            name: export.clone(),
                        }),
                    }
                }
                Ok(members)
            }
            None => Ok(self
                .provider
                .module_members(namespace.object)?
                .into_iter()
                .filter(|member| {
                    member.is_public()
                        && member
                            .defined_in
                            .as_deref()
                            .map_or(true, |module| module == namespace.name)
                })
                .collect()),
        }
    }

    fn add_variables(
        &self,
        ctx: &mut Context,
        module_id: EntityId,
        module_name: &str,
        namespace: &NamespaceInfo,
        doc: &mut IndexMap<String, EntityId>,
    ) {
        let Some(source) = self.provider.source(namespace.object) else {
            debug!("No source for {}, skipping variable docstrings", module_name);
            return;
        };
        let variables = vardocs::module_variables(&source, namespace.exports.as_deref());

        match variables {
            Ok(vars) => {
                for (var_name, var) in vars {
                    let id = function::build_variable(
                        ctx,
                        module_id,
                        &var_name,
                        var.docstring,
                        None,
                        None,
                        false,
                    );
                    doc.insert(var_name, id);
                }
            }
            Err(reason) => ctx.warn(DocWarning::UnparsableSource {
                refname: module_name.to_string(),
                reason,
            }),
        }
    }

    fn register(&self, ctx: &mut Context, module_id: EntityId, doc: &IndexMap<String, EntityId>) {
        let refname = ctx.refname(module_id);
        ctx.register(refname, module_id);

        for id in doc.values().copied() {
            let refname = ctx.refname(id);
            ctx.register(refname, id);

            let nested: Vec<EntityId> = match &ctx.entity(id).kind {
                EntityKind::Class(data) => data.doc.values().copied().collect(),
                _ => Vec::new(),
            };
            for member in nested {
                let refname = ctx.refname(member);
                ctx.register(refname, member);
            }
        }
    }
}

/// Clean a raw docstring the way docstrings are displayed.
pub(crate) fn clean_docstring(raw: Option<String>) -> String {
    raw.map(|doc| cleandoc(&doc).trim().to_string())
        .unwrap_or_default()
}

/// Dedent raw source text.
pub(crate) fn clean_source(source: &str) -> String {
    cleandoc(&format!("\n{}", source))
}
