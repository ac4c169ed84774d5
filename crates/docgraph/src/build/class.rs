//! Class construction.

use super::function::{build_function, build_variable};
use super::{clean_docstring, clean_source, vardocs};
use crate::error::{DocWarning, Result};
use crate::graph::{ClassData, Context, Entity, EntityId, EntityKind};
use docgraph_reflect_api::{ClassInfo, MemberInfo, MemberKind, ObjectId, ReflectionProvider, TypeRef};
use indexmap::IndexMap;
use log::trace;

/// Build a Class entity and its direct members.
///
/// Members are allocated but not registered; the owning module registers
/// them once its member map is final.
pub(crate) fn build_class(
    ctx: &mut Context,
    provider: &dyn ReflectionProvider,
    module: EntityId,
    name: &str,
    object: ObjectId,
    docstring: Option<String>,
) -> Result<EntityId> {
    let info = provider.class_info(object)?;
    let docstring = docstring.unwrap_or_else(|| class_docstring(&info));

    let raw_mro = provider.mro(object)?;
    let mro: Vec<TypeRef> = raw_mro
        .iter()
        .filter(|ty| ty.object != Some(object) && !provider.is_root_type(ty))
        .cloned()
        .collect();
    let subclasses = provider.subclasses(object)?;
    let source = provider.source(object);

    let class_id = ctx.alloc(Entity {
        name: name.to_string(),
        module,
        object: Some(object),
        docstring,
        inherits: None,
        kind: EntityKind::Class(ClassData {
            qualname: info.qualname.clone(),
            mro,
            subclasses,
            init_signature: info.init_signature.clone(),
            source: source.as_deref().map(clean_source),
            ..Default::default()
        }),
    });
    trace!("Building class {} ({})", info.qualname, class_id);

    let mut doc: IndexMap<String, EntityId> = IndexMap::new();

    // No source means no variable docstrings, not a parse failure.
    let variables = match &source {
        Some(source) => vardocs::class_variables(source),
        None => Ok(IndexMap::new()),
    };
    match variables {
        Ok(vars) => {
            for (var_name, var) in vars {
                let id = build_variable(
                    ctx,
                    module,
                    &var_name,
                    var.docstring,
                    None,
                    Some(class_id),
                    var.instance_var,
                );
                doc.insert(var_name, id);
            }
        }
        Err(reason) => {
            let refname = ctx.refname(class_id);
            ctx.warn(DocWarning::UnparsableSource { refname, reason });
        }
    }

    for member in provider.class_members(object)? {
        if !member.is_public() {
            continue;
        }
        if let Some(existing) = doc.get(&member.name) {
            if !ctx.entity(*existing).docstring.is_empty() {
                continue;
            }
        }

        let id = match &member.kind {
            MemberKind::Routine { .. } => {
                let method = is_instance_method(provider, &raw_mro, &member)?;
                build_function(ctx, provider, module, Some(class_id), &member, method)
            }
            MemberKind::DataDescriptor { getter } => build_variable(
                ctx,
                module,
                &member.name,
                clean_docstring(provider.docstring(member.object)),
                Some(getter.unwrap_or(member.object)),
                Some(class_id),
                true,
            ),
            MemberKind::Class => build_variable(
                ctx,
                module,
                &member.name,
                clean_docstring(provider.docstring(member.object)),
                None,
                Some(class_id),
                info.slots.contains(&member.name),
            ),
            MemberKind::Module | MemberKind::Data => build_variable(
                ctx,
                module,
                &member.name,
                String::new(),
                None,
                Some(class_id),
                info.slots.contains(&member.name),
            ),
        };
        doc.insert(member.name.clone(), id);
    }

    if let EntityKind::Class(data) = &mut ctx.entity_mut(class_id).kind {
        data.doc = doc;
    }
    Ok(class_id)
}

/// Type docstring, a blank line and the constructor docstring, trimmed.
fn class_docstring(info: &ClassInfo) -> String {
    let class_doc = clean_docstring(info.docstring.clone());
    let init_doc = clean_docstring(info.init_docstring.clone());
    format!("{}\n\n{}", class_doc, init_doc).trim().to_string()
}

/// Instance method unless already bound (class method) or declared static
/// by the first type in the MRO that declares it.
fn is_instance_method(
    provider: &dyn ReflectionProvider,
    raw_mro: &[TypeRef],
    member: &MemberInfo,
) -> Result<bool> {
    if let MemberKind::Routine { bound: true, .. } = member.kind {
        return Ok(false);
    }

    for ty in raw_mro {
        let Some(object) = ty.object else {
            continue;
        };
        if let Some(declared) = provider.class_member(object, &member.name)? {
            return Ok(!declared.kind.is_static_method());
        }
    }

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_docstring_joins_init() {
        let mut info = ClassInfo::new("A", "m", "A", ObjectId(1));
        info.docstring = Some("Class doc.".to_string());
        info.init_docstring = Some("\n    Init doc.\n    ".to_string());
        assert_eq!(class_docstring(&info), "Class doc.\n\nInit doc.");
    }

    #[test]
    fn test_class_docstring_without_init() {
        let mut info = ClassInfo::new("A", "m", "A", ObjectId(1));
        info.docstring = Some("Class doc.".to_string());
        assert_eq!(class_docstring(&info), "Class doc.");

        info.docstring = None;
        info.init_docstring = Some("Only init.".to_string());
        assert_eq!(class_docstring(&info), "Only init.");
    }
}
