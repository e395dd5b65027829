use html::Node;
use html::dom_utils::{has_text_content, is_blank_text};

use crate::context::{Scope, ValidationContext};
use crate::engine::Engine;
use crate::error::{ErrorCode, Errors};

/// Check quotation structure and queue the validated `<cite>` for emission
/// just before `</blockquote>`. Returns the children still to be walked:
/// everything ahead of the cite.
pub(crate) fn validate<'n>(
    engine: &Engine<'_>,
    node: &'n Node,
    level: usize,
    ctx: &mut ValidationContext,
    errors: &mut Errors,
) -> &'n [Node] {
    let children = node.children();
    let last = children.iter().rposition(|child| !is_blank_text(child));
    let (body, cite) = match last {
        Some(i) if children[i].is_element_named("cite") => (&children[..i], Some(&children[i])),
        _ => (children, None),
    };

    if !body.iter().any(has_text_content) {
        errors.add(ErrorCode::QuotationNoText);
    }
    match cite {
        Some(cite) if has_text_content(cite) => {
            let sanitizer = engine.sanitizer;
            let inner = engine.walk_nested(cite.children(), &sanitizer.cite_tags, Scope::Cite, ctx, errors);
            ctx.push_tail_insert(level, "blockquote", format!("<cite>{inner}</cite>"));
        }
        _ => errors.add(ErrorCode::QuotationNoSource),
    }

    ctx.blockquote_active = true;
    body
}
