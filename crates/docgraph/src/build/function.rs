//! Function and variable construction.

use super::{clean_docstring, clean_source};
use crate::graph::{Context, Entity, EntityId, EntityKind, FunctionData, VariableData};
use docgraph_reflect_api::{MemberInfo, ObjectId, ReflectionProvider};

pub(crate) fn build_function(
    ctx: &mut Context,
    provider: &dyn ReflectionProvider,
    module: EntityId,
    cls: Option<EntityId>,
    member: &MemberInfo,
    method: bool,
) -> EntityId {
    let object = member.object;
    let data = FunctionData {
        cls,
        method,
        qualname: provider
            .qualname(object)
            .unwrap_or_else(|| member.name.clone()),
        is_async: provider.is_async(object),
        signature: provider.signature(object),
        source: provider.source(object).map(|source| clean_source(&source)),
    };

    ctx.alloc(Entity {
        name: member.name.clone(),
        module,
        object: Some(object),
        docstring: clean_docstring(provider.docstring(object)),
        inherits: None,
        kind: EntityKind::Function(data),
    })
}

pub(crate) fn build_variable(
    ctx: &mut Context,
    module: EntityId,
    name: &str,
    docstring: String,
    object: Option<ObjectId>,
    cls: Option<EntityId>,
    instance_var: bool,
) -> EntityId {
    ctx.alloc(Entity {
        name: name.to_string(),
        module,
        object,
        docstring,
        inherits: None,
        kind: EntityKind::Variable(VariableData { cls, instance_var }),
    })
}
