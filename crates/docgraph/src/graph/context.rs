//! The shared identifier registry and entity arena.

use super::entity::{DocRef, Entity, EntityId, EntityKind, External};
use crate::doc::Doc;
use crate::error::DocWarning;
use indexmap::IndexMap;
use log::{trace, warn};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct UrlKey {
    pub(crate) target: EntityId,
    pub(crate) relative_to: Option<EntityId>,
    pub(crate) link_prefix: String,
    pub(crate) top_ancestor: bool,
}

/// Registry of every documented entity, keyed by refname.
///
/// All modules built against the same context share it, which is how a
/// class in one module finds its documented ancestors in another. The
/// context owns the entities themselves; everything else refers to them
/// by [`EntityId`].
///
/// A context is single-threaded: it is `Send` but not `Sync`.
///
/// # Examples
///
/// ```rust
/// use docgraph::{Context, ModuleBuilder, DocConfig};
/// use docgraph_reflect_api::MemoryProvider;
///
/// let mut provider = MemoryProvider::new();
/// let module = provider.add_module("shapes");
/// provider.add_function(module, "area", "Compute an area.");
///
/// let config = DocConfig::default();
/// let mut context = Context::new();
/// let id = ModuleBuilder::new(&provider, &config)
///     .build(&mut context, "shapes")
///     .unwrap();
///
/// assert_eq!(context.lookup("shapes"), Some(id));
/// assert!(context.lookup("shapes.area").is_some());
/// ```
#[derive(Debug, Default)]
pub struct Context {
    entities: Vec<Entity>,
    registry: IndexMap<String, EntityId>,
    warnings: Vec<DocWarning>,
    pub(crate) refname_cache: RefCell<HashMap<EntityId, String>>,
    pub(crate) url_cache: RefCell<HashMap<UrlKey, String>>,
}

impl Context {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Id the next allocated entity will get.
    pub(crate) fn next_id(&self) -> EntityId {
        EntityId(self.entities.len())
    }

    pub(crate) fn alloc(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.entities.len());
        self.entities.push(entity);
        id
    }

    /// Entity by id, `None` for ids this context did not issue.
    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id.0)
    }

    /// Read-only view of an entity.
    pub fn doc(&self, id: EntityId) -> Option<Doc<'_>> {
        self.get(id).map(|_| Doc::new(self, id))
    }

    pub(crate) fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.0]
    }

    pub(crate) fn entity_mut(&mut self, id: EntityId) -> &mut Entity {
        &mut self.entities[id.0]
    }

    /// Number of entities ever allocated, registered or not.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Insert or overwrite a registry entry.
    pub fn register(&mut self, refname: impl Into<String>, id: EntityId) {
        let refname = refname.into();
        trace!("Registering {} as {}", refname, id);
        self.registry.insert(refname, id);
        self.invalidate_urls();
    }

    /// Entity registered under `refname`.
    pub fn lookup(&self, refname: &str) -> Option<EntityId> {
        self.registry.get(refname).copied()
    }

    /// Placeholder for an identifier nothing documents.
    ///
    /// The sentinel is not registered: `lookup(name)` stays `None`.
    pub fn external(&self, name: impl Into<String>) -> DocRef {
        DocRef::External(External::new(name))
    }

    /// Whether `refname` is registered.
    pub fn contains(&self, refname: &str) -> bool {
        self.registry.contains_key(refname)
    }

    /// Remove one registry entry.
    pub fn unregister(&mut self, refname: &str) -> Option<EntityId> {
        let removed = self.registry.shift_remove(refname);
        if removed.is_some() {
            self.invalidate_urls();
        }
        removed
    }

    /// Remove every registry entry nested under `refname` (`refname.*`).
    ///
    /// Returns the number of removed entries.
    pub fn unregister_prefixed(&mut self, refname: &str) -> usize {
        let prefix = format!("{}.", refname);
        let before = self.registry.len();
        self.registry.retain(|key, _| !key.starts_with(&prefix));
        let removed = before - self.registry.len();
        if removed > 0 {
            self.invalidate_urls();
        }
        removed
    }

    /// Registry entries in registration order.
    pub fn refnames(&self) -> impl Iterator<Item = (&str, EntityId)> {
        self.registry.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Number of registry entries.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Registered classes, in registration order.
    pub fn classes(&self) -> Vec<EntityId> {
        self.registered(|entity| matches!(entity.kind, EntityKind::Class(_)))
    }

    /// Registered modules, in registration order.
    pub fn modules(&self) -> Vec<EntityId> {
        self.registered(|entity| matches!(entity.kind, EntityKind::Module(_)))
    }

    fn registered(&self, filter: impl Fn(&Entity) -> bool) -> Vec<EntityId> {
        let mut seen = HashSet::new();
        self.registry
            .values()
            .copied()
            .filter(|id| filter(self.entity(*id)) && seen.insert(*id))
            .collect()
    }

    /// Drop every entity, registry entry, memo and warning.
    pub fn reset(&mut self) {
        self.entities.clear();
        self.registry.clear();
        self.warnings.clear();
        self.refname_cache.borrow_mut().clear();
        self.url_cache.borrow_mut().clear();
    }

    /// Record and log a warning.
    pub fn warn(&mut self, warning: DocWarning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    /// Warnings collected so far.
    pub fn warnings(&self) -> &[DocWarning] {
        &self.warnings
    }

    /// Take the collected warnings, leaving none behind.
    pub fn take_warnings(&mut self) -> Vec<DocWarning> {
        std::mem::take(&mut self.warnings)
    }

    pub(crate) fn invalidate_urls(&self) {
        self.url_cache.borrow_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::entity::{ModuleData, VariableData};

    fn module(ctx: &mut Context, name: &str) -> EntityId {
        let id = ctx.alloc(Entity {
            name: name.to_string(),
            module: EntityId(ctx.entity_count()),
            object: None,
            docstring: String::new(),
            inherits: None,
            kind: EntityKind::Module(ModuleData::default()),
        });
        ctx.register(name, id);
        id
    }

    fn variable(ctx: &mut Context, module: EntityId, name: &str) -> EntityId {
        ctx.alloc(Entity {
            name: name.to_string(),
            module,
            object: None,
            docstring: String::new(),
            inherits: None,
            kind: EntityKind::Variable(VariableData::default()),
        })
    }

    #[test]
    fn test_register_and_lookup() {
        let mut ctx = Context::new();
        let m = module(&mut ctx, "pkg");
        assert_eq!(ctx.lookup("pkg"), Some(m));
        assert!(ctx.contains("pkg"));
        assert_eq!(ctx.lookup("other"), None);
        assert_eq!(ctx.len(), 1);
    }

    #[test]
    fn test_last_registration_wins() {
        let mut ctx = Context::new();
        let m = module(&mut ctx, "pkg");
        let a = variable(&mut ctx, m, "x");
        let b = variable(&mut ctx, m, "x");
        ctx.register("pkg.x", a);
        ctx.register("pkg.x", b);
        assert_eq!(ctx.lookup("pkg.x"), Some(b));
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_unregister_prefixed() {
        let mut ctx = Context::new();
        let m = module(&mut ctx, "pkg");
        for name in ["pkg.A", "pkg.A.f", "pkg.A.g", "pkg.AB"] {
            let v = variable(&mut ctx, m, name);
            ctx.register(name, v);
        }

        assert_eq!(ctx.unregister_prefixed("pkg.A"), 2);
        assert!(ctx.unregister("pkg.A").is_some());
        assert!(ctx.contains("pkg.AB"));
        assert!(!ctx.contains("pkg.A.f"));
    }

    #[test]
    fn test_modules_in_registration_order() {
        let mut ctx = Context::new();
        let b = module(&mut ctx, "b");
        let a = module(&mut ctx, "a");
        ctx.register("alias", a);
        assert_eq!(ctx.modules(), vec![b, a]);
        assert!(ctx.classes().is_empty());
    }

    #[test]
    fn test_warnings_and_reset() {
        let mut ctx = Context::new();
        module(&mut ctx, "pkg");
        ctx.warn(DocWarning::AlreadyLinked {
            module: "pkg".to_string(),
        });
        assert_eq!(ctx.warnings().len(), 1);
        assert_eq!(ctx.take_warnings().len(), 1);
        assert!(ctx.warnings().is_empty());

        ctx.warn(DocWarning::AlreadyLinked {
            module: "pkg".to_string(),
        });
        ctx.reset();
        assert!(ctx.is_empty());
        assert_eq!(ctx.entity_count(), 0);
        assert!(ctx.warnings().is_empty());
    }
}
