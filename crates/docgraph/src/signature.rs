//! Rendering of callable signatures for documentation.

use crate::doc::Doc;
use crate::graph::{Context, DocRef, EntityId};
use docgraph_reflect_api::{is_public, ParamKind, Signature};

/// Callback turning a resolved entity into link markup.
pub type LinkFn<'l> = &'l dyn Fn(Doc<'_>) -> String;

const NBSP: char = '\u{a0}';

/// Format the parameters of a signature, one string per parameter.
///
/// Private parameters with defaults are hidden and a bare `*` marks the
/// start of keyword-only parameters. Positional-only parameters render
/// like any other, without a `/` marker. With `annotate`, annotations are
/// included; with `link`, identifiers in them are resolved from `module`
/// and rendered through the callback. A missing signature renders as
/// `["..."]`.
pub(crate) fn format_params(
    ctx: &Context,
    module: EntityId,
    signature: Option<&Signature>,
    annotate: bool,
    link: Option<LinkFn<'_>>,
) -> Vec<String> {
    let Some(signature) = signature else {
        return vec!["...".to_string()];
    };

    let mut params = Vec::new();
    let mut kw_only = false;

    for param in &signature.parameters {
        if !is_public(&param.name) && param.default.is_some() {
            continue;
        }

        if param.kind == ParamKind::VarPositional {
            kw_only = true;
        }
        if param.kind == ParamKind::KeywordOnly && !kw_only {
            kw_only = true;
            params.push("*".to_string());
        }

        let mut formatted = match param.kind {
            ParamKind::VarPositional => format!("*{}", param.name),
            ParamKind::VarKeyword => format!("**{}", param.name),
            _ => param.name.clone(),
        };

        let annotation = if annotate {
            param
                .annotation
                .as_deref()
                .map(|annotation| format_annotation(ctx, module, annotation, link))
        } else {
            None
        };

        if let Some(annotation) = &annotation {
            formatted.push(':');
            formatted.push(NBSP);
            formatted.push_str(annotation);
        }
        if let Some(default) = &param.default {
            if annotation.is_some() {
                formatted.push(NBSP);
                formatted.push('=');
                formatted.push(NBSP);
            } else {
                formatted.push('=');
            }
            formatted.push_str(default);
        }

        params.push(formatted);
    }

    params
}

/// Format an annotation: forward-reference quotes dropped, spaces made
/// non-breaking and identifiers linked when a callback is given.
pub(crate) fn format_annotation(
    ctx: &Context,
    module: EntityId,
    annotation: &str,
    link: Option<LinkFn<'_>>,
) -> String {
    let text: String = unquote_forward_refs(annotation)
        .chars()
        .map(|c| if c == ' ' { NBSP } else { c })
        .collect();

    match link {
        Some(link) => linkify(ctx, module, &text, link),
        None => text,
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

/// Drop the quotes around an annotation that is a whole forward reference.
fn unquote_forward_refs(annotation: &str) -> String {
    let trimmed = annotation.trim();
    for quote in ['\'', '"'] {
        if let Some(inner) = trimmed
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            if !inner.is_empty() && inner.chars().all(is_ident_char) {
                return inner.to_string();
            }
        }
    }
    annotation.to_string()
}

fn linkify(ctx: &Context, module: EntityId, text: &str, link: LinkFn<'_>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut token = String::new();

    let flush = |token: &mut String, out: &mut String| {
        if token.is_empty() {
            return;
        }
        match ctx.find_ident(module, token) {
            DocRef::Entity(id) => out.push_str(&link(Doc::new(ctx, id))),
            DocRef::External(_) => out.push_str(token),
        }
        token.clear();
    };

    for c in text.chars() {
        if is_ident_char(c) {
            token.push(c);
        } else {
            flush(&mut token, &mut out);
            out.push(c);
        }
    }
    flush(&mut token, &mut out);

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote_forward_refs() {
        assert_eq!(unquote_forward_refs("'Node'"), "Node");
        assert_eq!(unquote_forward_refs("\"pkg.Node\""), "pkg.Node");
        assert_eq!(unquote_forward_refs("List['pkg.Node']"), "List['pkg.Node']");
        assert_eq!(unquote_forward_refs("Dict[str, 'Node']"), "Dict[str, 'Node']");
        assert_eq!(unquote_forward_refs("'Node"), "'Node");
        assert_eq!(unquote_forward_refs("Literal['a b']"), "Literal['a b']");
        assert_eq!(unquote_forward_refs("int"), "int");
    }
}
