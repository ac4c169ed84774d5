//! Inheritance linking.
//!
//! Runs once per [`Context`], after every module has been built:
//!
//! 1. classes are ordered so each one comes after its documented ancestors;
//! 2. **fill**: each class records, per member name, the nearest ancestor
//!    member with a docstring and receives a clone of every such member it
//!    does not declare itself;
//! 3. module overrides are applied (removals and docstring replacements);
//! 4. **link**: members that did not change the ancestor's docstring get
//!    their `inherits` pointer and the ancestor docstring.

use crate::config::{DocConfig, Override};
use crate::error::{DocError, DocWarning, Result};
use crate::graph::algorithms::toposort;
use crate::graph::{Context, DocRef, EntityId, EntityKind};
use docgraph_reflect_api::{cleandoc, OverrideValue};
use indexmap::{IndexMap, IndexSet};
use log::{debug, info, trace};

/// Link inheritance across every module and class in the context.
///
/// Override values of all modules are validated before anything changes.
/// Modules already linked are skipped with a [`DocWarning::AlreadyLinked`].
///
/// # Errors
/// - [`DocError::CyclicInheritance`] when the ancestry graph has a cycle
/// - [`DocError::InvalidOverride`] for an override value that is neither a
///   removal marker nor text
pub fn link_inheritance(ctx: &mut Context, config: &DocConfig) -> Result<()> {
    let modules = ctx.modules();

    let mut merged = Vec::with_capacity(modules.len());
    let mut plans = Vec::with_capacity(modules.len());
    for module in &modules {
        if !is_linked(ctx, *module) {
            let (overrides, plan) = collect_overrides(ctx, *module, config)?;
            merged.push((*module, overrides));
            plans.push((*module, plan));
        }
    }

    let order = class_order(ctx)?;

    // Nothing is written until every module is validated.
    for (module, overrides) in merged {
        if let EntityKind::Module(data) = &mut ctx.entity_mut(module).kind {
            data.overrides = overrides;
        }
    }

    debug!("Filling inheritance of {} classes", order.len());
    for class in order {
        let entity = ctx.entity(class);
        if entity.is_class() && !is_linked(ctx, entity.module) {
            fill(ctx, class);
        }
    }

    for module in modules {
        if is_linked(ctx, module) {
            let refname = ctx.refname(module);
            ctx.warn(DocWarning::AlreadyLinked { module: refname });
            continue;
        }
        let plan = plans
            .iter()
            .position(|(id, _)| *id == module)
            .map(|i| plans.swap_remove(i).1)
            .unwrap_or_default();
        link_module(ctx, module, plan);
    }

    ctx.invalidate_urls();
    info!("Inheritance linked for {} registered entities", ctx.len());
    Ok(())
}

fn is_linked(ctx: &Context, module: EntityId) -> bool {
    matches!(&ctx.entity(module).kind, EntityKind::Module(data) if data.is_linked())
}

/// Topological order over every registered class.
fn class_order(ctx: &Context) -> Result<Vec<EntityId>> {
    let mut graph: IndexMap<EntityId, IndexSet<EntityId>> = IndexMap::new();
    for class in ctx.classes() {
        graph.insert(class, ctx.documented_mro(class).into_iter().collect());
    }

    toposort(&graph).map_err(|unresolved| DocError::CyclicInheritance {
        classes: unresolved.iter().map(|id| ctx.refname(*id)).collect(),
    })
}

fn fill(ctx: &mut Context, class: EntityId) {
    let mut super_members: IndexMap<String, EntityId> = IndexMap::new();

    for ancestor in ctx.documented_mro(class) {
        let members: Vec<(String, EntityId)> = ctx
            .entity(ancestor)
            .members()
            .map(|members| members.iter().map(|(k, v)| (k.clone(), *v)).collect())
            .unwrap_or_default();

        for (name, member) in members {
            if super_members.contains_key(&name) || ctx.entity(member).docstring.is_empty() {
                continue;
            }
            super_members.insert(name.clone(), member);

            let declared = ctx
                .entity(class)
                .members()
                .map_or(false, |members| members.contains_key(&name));
            if !declared {
                let clone = clone_into(ctx, member, class);
                if let Some(members) = ctx.entity_mut(class).members_mut() {
                    members.insert(name, clone);
                }
                let refname = ctx.refname(clone);
                trace!("Inherited {} from {}", refname, ctx.refname(member));
                ctx.register(refname, clone);
            }
        }
    }

    if let EntityKind::Class(data) = &mut ctx.entity_mut(class).kind {
        data.super_members = Some(super_members);
    }
}

/// Copy an ancestor member into `class`, re-owned by the class and its
/// module.
///
/// The clone lives on the subclass page, so its URL is an anchor there.
/// The ancestor stays reachable through `inherits` and `top_ancestor`.
fn clone_into(ctx: &mut Context, member: EntityId, class: EntityId) -> EntityId {
    let mut entity = ctx.entity(member).clone();
    entity.module = ctx.entity(class).module;
    match &mut entity.kind {
        EntityKind::Function(data) => data.cls = Some(class),
        EntityKind::Variable(data) => data.cls = Some(class),
        _ => {}
    }
    ctx.alloc(entity)
}

/// Merge provider-declared and configured overrides and validate them.
///
/// Returns the merged map, which the caller stores back on the module so
/// constructor exclusions see configured keys too, along with the
/// validated actions.
fn collect_overrides(
    ctx: &Context,
    module: EntityId,
    config: &DocConfig,
) -> Result<(IndexMap<String, OverrideValue>, Vec<(String, Override)>)> {
    let name = &ctx.entity(module).name;
    let mut merged: IndexMap<String, OverrideValue> = match &ctx.entity(module).kind {
        EntityKind::Module(data) => data.overrides.clone(),
        _ => IndexMap::new(),
    };
    if let Some(configured) = config.overrides_for(name) {
        for (key, value) in configured {
            merged.insert(key.clone(), value.clone());
        }
    }

    let validated = merged
        .iter()
        .map(|(key, value)| Override::from_value(name, key, value).map(|o| (key.clone(), o)))
        .collect::<Result<Vec<_>>>()?;

    Ok((merged, validated))
}

fn link_module(ctx: &mut Context, module: EntityId, overrides: Vec<(String, Override)>) {
    for (key, action) in &overrides {
        apply_override(ctx, module, key, action);
    }

    let classes: Vec<EntityId> = ctx
        .entity(module)
        .members()
        .map(|members| {
            members
                .values()
                .copied()
                .filter(|id| ctx.entity(*id).is_class())
                .collect()
        })
        .unwrap_or_default();
    for class in classes {
        link_class(ctx, class);
    }

    if let EntityKind::Module(data) = &mut ctx.entity_mut(module).kind {
        data.linked = true;
    }
    debug!("Linked module {}", ctx.entity(module).name);
}

fn apply_override(ctx: &mut Context, module: EntityId, key: &str, action: &Override) {
    let module_refname = ctx.refname(module);
    let refname = format!("{}.{}", module_refname, key);

    match action {
        Override::Remove { deprecated } => {
            if *deprecated {
                ctx.warn(DocWarning::DeprecatedNullOverride {
                    module: module_refname.clone(),
                    key: key.to_string(),
                });
            }

            let in_module = ctx
                .entity(module)
                .members()
                .map_or(false, |members| members.contains_key(key));
            if !key.ends_with(".__init__") && !in_module && !ctx.contains(&refname) {
                ctx.warn(DocWarning::UnknownOverride {
                    module: module_refname.clone(),
                    key: key.to_string(),
                });
            }

            if let DocRef::Entity(target) = ctx.find_ident(module, key) {
                let target_entity = ctx.entity(target);
                if let Some(class) = target_entity.owner_class() {
                    let member_name = target_entity.name.clone();
                    if let Some(members) = ctx.entity_mut(class).members_mut() {
                        members.shift_remove(&member_name);
                    }
                }
            }
            if let Some(members) = ctx.entity_mut(module).members_mut() {
                members.shift_remove(key);
            }
            ctx.unregister(&refname);
            ctx.unregister_prefixed(&refname);
            debug!("Removed {} by override", refname);
        }
        Override::Docstring(text) => match ctx.find_ident(module, &refname) {
            DocRef::Entity(target) => {
                ctx.entity_mut(target).docstring = cleandoc(text);
            }
            DocRef::External(_) => ctx.warn(DocWarning::UnknownOverride {
                module: module_refname,
                key: key.to_string(),
            }),
        },
    }
}

fn link_class(ctx: &mut Context, class: EntityId) {
    let super_members = match &mut ctx.entity_mut(class).kind {
        EntityKind::Class(data) => data.super_members.take(),
        _ => None,
    };
    let Some(super_members) = super_members else {
        return;
    };

    for (name, parent) in super_members {
        let Some(local) = ctx
            .entity(class)
            .members()
            .and_then(|members| members.get(&name).copied())
        else {
            continue;
        };
        if local == parent {
            continue;
        }

        let local_entity = ctx.entity(local);
        let parent_entity = ctx.entity(parent);
        if parent_entity.docstring.is_empty() {
            continue;
        }

        let same_object = matches!(
            (local_entity.object, parent_entity.object),
            (Some(a), Some(b)) if a == b
        );
        let unchanged =
            local_entity.docstring.is_empty() || local_entity.docstring == parent_entity.docstring;

        if same_object || unchanged {
            let docstring = parent_entity.docstring.clone();
            let entity = ctx.entity_mut(local);
            entity.inherits = Some(parent);
            entity.docstring = docstring;
        }
    }
}
