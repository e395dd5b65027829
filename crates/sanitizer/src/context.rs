//! Mutable state threaded through one validation walk.

use crate::tags::AllowedTagSet;

/// Which whitelist family a walk is validating against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Scope {
    Body,
    Cite,
    Caption,
}

/// Remembers the whitelist to restore once the outermost list closes.
#[derive(Clone, Debug)]
pub(crate) struct ListFrame {
    tag: String,
    level: usize,
    saved: AllowedTagSet,
}

/// Markup emitted just before a given element's end tag.
#[derive(Clone, Debug)]
struct TailInsert {
    level: usize,
    tag: String,
    content: String,
}

#[derive(Clone, Debug)]
pub(crate) struct ValidationContext {
    pub(crate) allowed: AllowedTagSet,
    pub(crate) scope: Scope,
    pub(crate) allow_external_links: bool,
    pub(crate) blockquote_active: bool,
    list_frame: Option<ListFrame>,
    // Stack so that same-tag inserts at different levels cannot clobber each other.
    tail_inserts: Vec<TailInsert>,
}

impl ValidationContext {
    pub(crate) fn new(allowed: AllowedTagSet, scope: Scope, allow_external_links: bool) -> Self {
        Self {
            allowed,
            scope,
            allow_external_links,
            blockquote_active: false,
            list_frame: None,
            tail_inserts: Vec::new(),
        }
    }

    pub(crate) fn in_list(&self) -> bool {
        self.list_frame.is_some()
    }

    /// Swap in the list whitelist. Nested lists reuse the outer frame.
    pub(crate) fn enter_list(&mut self, tag: &str, level: usize, reduced: &AllowedTagSet) {
        if self.list_frame.is_some() {
            return;
        }
        let saved = std::mem::replace(&mut self.allowed, reduced.clone());
        self.list_frame = Some(ListFrame {
            tag: tag.to_string(),
            level,
            saved,
        });
    }

    pub(crate) fn push_tail_insert(&mut self, level: usize, tag: &str, content: String) {
        self.tail_inserts.push(TailInsert {
            level,
            tag: tag.to_string(),
            content,
        });
    }

    /// Bookkeeping for the end tag of `tag` at `level`; returns any pending
    /// tail insert to emit before it.
    pub(crate) fn close_element(&mut self, tag: &str, level: usize) -> Option<String> {
        let insert = match self.tail_inserts.last() {
            Some(top) if top.level == level && top.tag == tag => {
                self.tail_inserts.pop().map(|t| t.content)
            }
            _ => None,
        };

        if tag == "blockquote" {
            self.blockquote_active = false;
        }

        if let Some(frame) = self
            .list_frame
            .take_if(|frame| frame.tag == tag && frame.level == level)
        {
            self.allowed = frame.saved;
        }

        insert
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx() -> ValidationContext {
        ValidationContext::new(AllowedTagSet::new(["p", "ul", "table"]), Scope::Body, false)
    }

    #[test]
    fn outermost_list_restores_whitelist() {
        let reduced = AllowedTagSet::new(["li", "ul"]);
        let mut ctx = ctx();
        ctx.enter_list("ul", 0, &reduced);
        assert!(!ctx.allowed.contains("table"));
        ctx.enter_list("ul", 2, &reduced);
        assert_eq!(ctx.close_element("ul", 2), None);
        assert!(ctx.in_list(), "inner list must not end the frame");
        ctx.close_element("ul", 0);
        assert!(!ctx.in_list());
        assert!(ctx.allowed.contains("table"));
    }

    #[test]
    fn tail_inserts_match_level_and_tag() {
        let mut ctx = ctx();
        ctx.blockquote_active = true;
        ctx.push_tail_insert(1, "blockquote", "<cite>x</cite>".to_string());
        assert_eq!(ctx.close_element("p", 2), None);
        assert_eq!(ctx.close_element("blockquote", 2), None);
        assert_eq!(
            ctx.close_element("blockquote", 1).as_deref(),
            Some("<cite>x</cite>")
        );
        assert!(!ctx.blockquote_active);
    }

    #[test]
    fn nested_tail_inserts_unwind_in_order() {
        let mut ctx = ctx();
        ctx.push_tail_insert(0, "figure", "outer".to_string());
        ctx.push_tail_insert(3, "figure", "inner".to_string());
        assert_eq!(ctx.close_element("figure", 3).as_deref(), Some("inner"));
        assert_eq!(ctx.close_element("figure", 0).as_deref(), Some("outer"));
    }
}
