//! Level-indexed validation walk.
//!
//! The walk is iterative: each open element owns a [`Level`] holding its
//! remaining children and the end tag to emit once they are exhausted, so
//! nesting depth never touches the call stack. Every rejected construct is
//! recorded in [`Errors`] and the walk carries on, so one pass reports as
//! many problems as it can find.

use html::{Node, escape_text, is_void_element};
use unicode_normalization::UnicodeNormalization;

use crate::Sanitizer;
use crate::context::{Scope, ValidationContext};
use crate::error::{ErrorCode, Errors};
use crate::tags::AllowedTagSet;
use crate::validators::{self, SpecialTag, anchor, blockquote, figure, list};

/// Tags that may not appear anywhere beneath a `blockquote`.
const QUOTE_FORBIDDEN: &[&str] = &["blockquote", "figure", "ol", "ul"];

struct Level<'n> {
    pending: std::slice::Iter<'n, Node>,
    end_tag: Option<&'n str>,
}

pub(crate) struct Engine<'s> {
    pub(crate) sanitizer: &'s Sanitizer,
}

impl<'s> Engine<'s> {
    pub(crate) fn new(sanitizer: &'s Sanitizer) -> Self {
        Self { sanitizer }
    }

    /// Validate and re-serialize `nodes`. Output produced alongside recorded
    /// errors is meaningless and must be discarded by the caller.
    pub(crate) fn walk(
        &self,
        nodes: &[Node],
        ctx: &mut ValidationContext,
        errors: &mut Errors,
    ) -> String {
        let mut out = String::new();
        let mut levels = vec![Level {
            pending: nodes.iter(),
            end_tag: None,
        }];

        while let Some(depth) = levels.len().checked_sub(1) {
            match levels[depth].pending.next() {
                Some(node) => self.visit(node, depth, ctx, &mut out, &mut levels, errors),
                None => {
                    let finished = levels.pop();
                    if let Some(tag) = finished.and_then(|level| level.end_tag) {
                        // depth >= 1 here: only the root level has no end tag.
                        close(tag, depth - 1, ctx, &mut out);
                    }
                }
            }
        }
        out
    }

    /// Walk `nodes` in a fresh context restricted to `allowed`.
    pub(crate) fn walk_nested(
        &self,
        nodes: &[Node],
        allowed: &AllowedTagSet,
        scope: Scope,
        parent: &ValidationContext,
        errors: &mut Errors,
    ) -> String {
        let mut ctx = ValidationContext::new(allowed.clone(), scope, parent.allow_external_links);
        self.walk(nodes, &mut ctx, errors)
    }

    fn visit<'n>(
        &self,
        node: &'n Node,
        level: usize,
        ctx: &mut ValidationContext,
        out: &mut String,
        levels: &mut Vec<Level<'n>>,
        errors: &mut Errors,
    ) {
        let (name, children) = match node {
            Node::Text { text } => {
                out.push_str(&escape_text(&nfc(text)));
                return;
            }
            Node::Document { children } => {
                levels.push(Level {
                    pending: children.iter(),
                    end_tag: None,
                });
                return;
            }
            Node::Element { name, children, .. } => (name.as_str(), children.as_slice()),
        };

        if ctx.blockquote_active && QUOTE_FORBIDDEN.contains(&name) {
            log::trace!(target: "sanitizer.engine", "<{name}> rejected inside blockquote");
            errors.add_detail(ErrorCode::QuotationDisallowedTags, &format!("<{name}>"));
            return;
        }
        if !ctx.allowed.contains(name) {
            log::trace!(target: "sanitizer.engine", "<{name}> rejected at level {level}");
            let code = match ctx.scope {
                Scope::Caption => ErrorCode::ImageCaptionDisallowedTags,
                Scope::Body | Scope::Cite => ErrorCode::DisallowedTags,
            };
            errors.add_detail(code, &format!("<{name}>"));
            errors.set_hint(code, ctx.allowed.describe());
            return;
        }

        let classes = &self.sanitizer.config.allowed_classes;
        let (open, children) = match SpecialTag::of(name) {
            SpecialTag::Anchor => match anchor::validate(self, node, ctx, errors) {
                Some(open) => (open, children),
                None => return,
            },
            SpecialTag::Blockquote => {
                let body = blockquote::validate(self, node, level, ctx, errors);
                (validators::open_tag(node, name, classes, errors), body)
            }
            SpecialTag::Figure => {
                figure::validate(self, node, level, ctx, errors);
                (validators::open_tag(node, name, classes, errors), &[][..])
            }
            SpecialTag::List => {
                list::enter(self, name, level, ctx);
                (validators::open_tag(node, name, classes, errors), children)
            }
            SpecialTag::Other => (validators::open_tag(node, name, classes, errors), children),
        };

        out.push_str(&open);
        if is_void_element(name) {
            return;
        }
        levels.push(Level {
            pending: children.iter(),
            end_tag: Some(name),
        });
    }
}

fn close(tag: &str, level: usize, ctx: &mut ValidationContext, out: &mut String) {
    if let Some(insert) = ctx.close_element(tag, level) {
        out.push_str(&insert);
    }
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

pub(crate) fn nfc(text: &str) -> String {
    text.nfc().collect()
}
