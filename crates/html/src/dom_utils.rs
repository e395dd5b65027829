use crate::Node;

/// Concatenated descendant text of `node`, in document order, tags stripped.
///
/// Element boundaries of `br` become a single space so that
/// `a<br>b` reads as "a b" rather than "ab".
pub fn text_content(node: &Node) -> String {
    let mut out = String::new();
    let mut stack: Vec<&Node> = vec![node];
    while let Some(current) = stack.pop() {
        match current {
            Node::Text { text } => out.push_str(text),
            Node::Element { name, .. } if name.eq_ignore_ascii_case("br") => out.push(' '),
            _ => {
                for child in current.children().iter().rev() {
                    stack.push(child);
                }
            }
        }
    }
    out
}

/// Whether the node is a text node holding only whitespace.
pub fn is_blank_text(node: &Node) -> bool {
    matches!(node, Node::Text { text } if text.trim().is_empty())
}

/// Whether any descendant text of `node` is non-whitespace.
pub fn has_text_content(node: &Node) -> bool {
    let mut stack: Vec<&Node> = vec![node];
    while let Some(current) = stack.pop() {
        match current {
            Node::Text { text } if !text.trim().is_empty() => return true,
            _ => stack.extend(current.children()),
        }
    }
    false
}

/// Element children of `node`, ignoring whitespace-only text between them.
///
/// Returns `None` when a non-blank text node sits among the children.
pub fn element_children(node: &Node) -> Option<Vec<&Node>> {
    let mut out = Vec::new();
    for child in node.children() {
        match child {
            Node::Element { .. } => out.push(child),
            _ if is_blank_text(child) => {}
            _ => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_fragment;

    #[test]
    fn text_content_strips_tags() {
        let dom = parse_fragment("<figcaption>A <b>bold</b> <i>move</i><br>ok</figcaption>").unwrap();
        assert_eq!(text_content(&dom), "A bold move ok");
    }

    #[test]
    fn blank_detection() {
        let dom = parse_fragment("<cite> <b> </b>\n</cite>").unwrap();
        assert!(!has_text_content(&dom));
        let dom = parse_fragment("<cite> <b>x</b></cite>").unwrap();
        assert!(has_text_content(&dom));
        assert!(is_blank_text(&Node::text(" \n\t")));
        assert!(!is_blank_text(&Node::element("br", &[], Vec::new())));
    }

    #[test]
    fn element_children_skips_whitespace_only() {
        let dom = parse_fragment("<figure>\n  <img src=x>\n  <figcaption>c</figcaption>\n</figure>").unwrap();
        let figure = &dom.children()[0];
        let kids = element_children(figure).unwrap();
        assert_eq!(kids.len(), 2);
        assert!(kids[0].is_element_named("img"));

        let dom = parse_fragment("<figure>stray<img src=x></figure>").unwrap();
        assert!(element_children(&dom.children()[0]).is_none());
    }
}
