//! Reference resolution: refnames, qualified names, identifier lookup and
//! URLs.
//!
//! Refnames and URLs are memoized on the [`Context`]. URL memos are cleared
//! whenever linking or override processing changes `inherits` pointers or
//! the registry.

use crate::graph::{Context, DocRef, EntityId, EntityKind, UrlKey};
use docgraph_reflect_api::TypeRef;

impl Context {
    /// Fully qualified, globally unique reference name of an entity.
    ///
    /// Modules use their name, classes `module.qualname`, functions and
    /// variables their owner's refname (class, else module) plus their name.
    pub fn refname(&self, id: EntityId) -> String {
        if let Some(cached) = self.refname_cache.borrow().get(&id) {
            return cached.clone();
        }

        let entity = self.entity(id);
        let refname = match &entity.kind {
            EntityKind::Module(_) => entity.name.clone(),
            EntityKind::Class(data) => {
                format!("{}.{}", self.entity(entity.module).name, data.qualname)
            }
            EntityKind::Function(_) | EntityKind::Variable(_) => {
                let owner = entity.owner_class().unwrap_or(entity.module);
                format!("{}.{}", self.refname(owner), entity.name)
            }
        };

        self.refname_cache
            .borrow_mut()
            .insert(id, refname.clone());
        refname
    }

    /// Qualified name of an entity inside its module.
    pub fn qualname(&self, id: EntityId) -> String {
        let entity = self.entity(id);
        match &entity.kind {
            EntityKind::Module(_) => entity.name.clone(),
            EntityKind::Class(data) => data.qualname.clone(),
            EntityKind::Function(data) => data.qualname.clone(),
            EntityKind::Variable(data) => match data.cls {
                Some(cls) => format!("{}.{}", self.qualname(cls), entity.name),
                None => entity.name.clone(),
            },
        }
    }

    /// Resolve an identifier as seen from `module`.
    ///
    /// A trailing `()` and a `.__init__` suffix are ignored. The module's own
    /// members are tried first, then the registry under `name`, then the
    /// registry under `module.name`. Unresolved names become an
    /// [`External`](crate::graph::External) carrying the original text.
    pub fn find_ident(&self, module: EntityId, name: &str) -> DocRef {
        let mut key = name.trim_end_matches(|c| c == '(' || c == ')');
        if let Some(stripped) = key.strip_suffix(".__init__") {
            key = stripped;
        }

        let module_entity = self.entity(module);
        let found = module_entity
            .members()
            .and_then(|members| members.get(key).copied())
            .or_else(|| self.lookup(key))
            .or_else(|| self.lookup(&format!("{}.{}", module_entity.name, key)));

        match found {
            Some(id) => DocRef::Entity(id),
            None => self.external(name),
        }
    }

    /// Resolve a type reference as seen from `module`.
    pub fn find_class(&self, module: EntityId, ty: &TypeRef) -> DocRef {
        let module_name = if ty.module.is_empty() { "?" } else { &ty.module };
        self.find_ident(module, &format!("{}.{}", module_name, ty.qualname))
    }

    /// Ancestors of a class, nearest first, without the class itself and the
    /// universal base.
    ///
    /// With `only_documented`, externals and non-class entities are dropped.
    pub fn mro(&self, class: EntityId, only_documented: bool) -> Vec<DocRef> {
        let entity = self.entity(class);
        let EntityKind::Class(data) = &entity.kind else {
            return Vec::new();
        };

        data.mro
            .iter()
            .map(|ty| self.find_class(entity.module, ty))
            .filter(|resolved| !only_documented || self.is_class_ref(resolved))
            .collect()
    }

    /// Documented ancestors of a class, nearest first.
    pub fn documented_mro(&self, class: EntityId) -> Vec<EntityId> {
        self.mro(class, true)
            .into_iter()
            .filter_map(|resolved| resolved.entity())
            .collect()
    }

    fn is_class_ref(&self, resolved: &DocRef) -> bool {
        matches!(resolved, DocRef::Entity(id) if self.entity(*id).is_class())
    }

    /// Follow the `inherits` chain to its end.
    pub fn top_ancestor(&self, id: EntityId) -> EntityId {
        let mut current = id;
        let mut steps = 0;
        while let Some(parent) = self.entity(current).inherits {
            if parent == id || steps > self.entity_count() {
                break;
            }
            current = parent;
            steps += 1;
        }
        current
    }

    /// Page URL of a module: `a/b.html`, `a/b/index.html` for packages,
    /// `a/index.m.html` for a module named `index`.
    pub fn page_url(&self, module: EntityId) -> String {
        let entity = self.entity(module);
        let path = entity.name.replace('.', "/");
        let is_package = matches!(&entity.kind, EntityKind::Module(data) if data.is_package);

        if is_package {
            format!("{}/index.html", path)
        } else if path.ends_with("/index") {
            format!("{}.m.html", path)
        } else {
            format!("{}.html", path)
        }
    }

    fn absolute_url(&self, id: EntityId) -> String {
        let entity = self.entity(id);
        if entity.is_module() {
            self.page_url(id)
        } else {
            format!("{}#{}", self.page_url(entity.module), self.refname(id))
        }
    }

    /// URL of an entity.
    ///
    /// With `top_ancestor`, the end of the `inherits` chain is linked
    /// instead. Without `relative_to`, or with a non-empty `link_prefix`,
    /// the result is `link_prefix` plus the absolute URL. Entities on the
    /// same page as `relative_to` get a `#refname` anchor; others a path
    /// relative to the page of the module owning `relative_to`.
    pub fn url(
        &self,
        id: EntityId,
        relative_to: Option<EntityId>,
        link_prefix: &str,
        top_ancestor: bool,
    ) -> String {
        let key = UrlKey {
            target: id,
            relative_to,
            link_prefix: link_prefix.to_string(),
            top_ancestor,
        };
        if let Some(cached) = self.url_cache.borrow().get(&key) {
            return cached.clone();
        }

        let target = if top_ancestor {
            self.top_ancestor(id)
        } else {
            id
        };

        let url = match relative_to {
            Some(relative_to) if link_prefix.is_empty() => {
                let target_module = self.entity(self.entity(target).module);
                let relative_page = self.entity(relative_to).module;
                if target_module.name == self.entity(relative_page).name {
                    format!("#{}", self.refname(target))
                } else {
                    let url = relpath(&self.absolute_url(target), &self.page_url(relative_page));
                    match url.strip_prefix("../") {
                        Some(stripped) => stripped.to_string(),
                        None => url,
                    }
                }
            }
            _ => format!("{}{}", link_prefix, self.absolute_url(target)),
        };

        self.url_cache.borrow_mut().insert(key, url.clone());
        url
    }

    /// URL of a resolved reference; externals use their placeholder URL.
    pub fn ref_url(&self, resolved: &DocRef, relative_to: Option<EntityId>, link_prefix: &str) -> String {
        match resolved {
            DocRef::Entity(id) => self.url(*id, relative_to, link_prefix, false),
            DocRef::External(external) => external.url(),
        }
    }

    /// Refname of a resolved reference.
    pub fn ref_refname(&self, resolved: &DocRef) -> String {
        match resolved {
            DocRef::Entity(id) => self.refname(*id),
            DocRef::External(external) => external.name.clone(),
        }
    }
}

/// Relative path from directory `start` to `path`, both `/`-separated.
pub(crate) fn relpath(path: &str, start: &str) -> String {
    let path_parts: Vec<&str> = path.split('/').filter(|p| !p.is_empty() && *p != ".").collect();
    let start_parts: Vec<&str> = start.split('/').filter(|p| !p.is_empty() && *p != ".").collect();

    let common = path_parts
        .iter()
        .zip(start_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; start_parts.len() - common];
    parts.extend_from_slice(&path_parts[common..]);

    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}
