//! Per-tag validators. Tags without a dedicated validator go through
//! [`open_tag`], which keeps only whitelisted CSS classes.

pub(crate) mod anchor;
pub(crate) mod blockquote;
pub(crate) mod figure;
pub(crate) mod list;

use std::collections::BTreeSet;

use html::{Node, escape_attribute};

use crate::error::{ErrorCode, Errors};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum SpecialTag {
    Anchor,
    Blockquote,
    Figure,
    List,
    Other,
}

impl SpecialTag {
    pub(crate) fn of(name: &str) -> Self {
        match name {
            "a" => SpecialTag::Anchor,
            "blockquote" => SpecialTag::Blockquote,
            "figure" => SpecialTag::Figure,
            "ul" | "ol" => SpecialTag::List,
            _ => SpecialTag::Other,
        }
    }
}

/// `<name>` or `<name class='...'>`, dropping every other attribute.
pub(crate) fn open_tag(
    node: &Node,
    name: &str,
    allowed_classes: &BTreeSet<String>,
    errors: &mut Errors,
) -> String {
    let mut kept: Vec<&str> = Vec::new();
    for class in node.attr("class").unwrap_or("").split_ascii_whitespace() {
        if !allowed_classes.contains(class) {
            errors.add_detail(ErrorCode::DisallowedCssClasses, class);
            errors.set_hint(
                ErrorCode::DisallowedCssClasses,
                &allowed_classes.iter().map(String::as_str).collect::<Vec<_>>().join(", "),
            );
        } else if !kept.contains(&class) {
            kept.push(class);
        }
    }

    if kept.is_empty() {
        format!("<{name}>")
    } else {
        format!("<{name} class='{}'>", escape_attribute(&kept.join(" ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classes() -> BTreeSet<String> {
        ["user-left", "user-right"].iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn keeps_whitelisted_classes_only() {
        let node = Node::element(
            "p",
            &[("class", " user-left  user-left user-right"), ("style", "x"), ("id", "y")],
            Vec::new(),
        );
        let mut errors = Errors::new();
        assert_eq!(
            open_tag(&node, "p", &classes(), &mut errors),
            "<p class='user-left user-right'>"
        );
        assert!(errors.is_empty());
    }

    #[test]
    fn unknown_class_is_reported() {
        let node = Node::element("p", &[("class", "user-left evil")], Vec::new());
        let mut errors = Errors::new();
        open_tag(&node, "p", &classes(), &mut errors);
        let message = errors.message(ErrorCode::DisallowedCssClasses).unwrap();
        assert_eq!(
            message,
            "Found disallowed CSS classes: evil. Allowed classes are: user-left, user-right."
        );
    }

    #[test]
    fn dispatch_covers_special_tags() {
        assert_eq!(SpecialTag::of("a"), SpecialTag::Anchor);
        assert_eq!(SpecialTag::of("ol"), SpecialTag::List);
        assert_eq!(SpecialTag::of("figure"), SpecialTag::Figure);
        assert_eq!(SpecialTag::of("p"), SpecialTag::Other);
    }
}
