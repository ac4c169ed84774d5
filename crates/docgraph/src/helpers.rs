//! Convenience helpers for the common build-then-link workflow.
//!
//! Building and linking are separate steps so several modules can share one
//! [`Context`] before inheritance is linked across all of them. These helpers
//! cover the usual sequences.

use crate::build::ModuleBuilder;
use crate::config::DocConfig;
use crate::error::Result;
use crate::graph::{Context, EntityId};
use crate::inherit::link_inheritance;
use docgraph_reflect_api::ReflectionProvider;
use log::info;

/// Document a single module tree in a fresh context.
///
/// Builds `name` and its submodules, then links inheritance.
///
/// # Arguments
///
/// * `provider` - Reflection provider to import from
/// * `name` - Dotted module name (e.g., "pkg.sub")
/// * `config` - Overrides and submodule suffixes
///
/// # Returns
///
/// The linked context and the id of the top module.
pub fn document(
    provider: &dyn ReflectionProvider,
    name: &str,
    config: &DocConfig,
) -> Result<(Context, EntityId)> {
    let (mut ctx, id) = ModuleBuilder::new(provider, config).build_standalone(name)?;
    link_inheritance(&mut ctx, config)?;
    Ok((ctx, id))
}

/// Document several module trees into one shared context.
///
/// Classes in one tree see documented ancestors in the others. Linking runs
/// once, after every tree is built.
///
/// # Returns
///
/// The ids of the top modules, in the order of `names`.
pub fn document_all(
    ctx: &mut Context,
    provider: &dyn ReflectionProvider,
    names: &[&str],
    config: &DocConfig,
) -> Result<Vec<EntityId>> {
    let builder = ModuleBuilder::new(provider, config);
    let ids = names
        .iter()
        .map(|name| builder.build(ctx, name))
        .collect::<Result<Vec<_>>>()?;

    link_inheritance(ctx, config)?;
    info!("Documented {} module trees", ids.len());
    Ok(ids)
}
