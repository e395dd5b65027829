use crate::error::{ParseError, ParseErrorCode};
use crate::tokenizer::is_void_element;
use crate::types::{Node, Token, TokenStream};

/// Builds a tree from a token stream, failing on any structural error.
///
/// Comments are dropped and adjacent text is coalesced, so the resulting tree
/// is the same whether or not the source contained comments between text runs.
pub fn build_dom(stream: &TokenStream) -> Result<Node, ParseError> {
    let atoms = stream.atoms();
    let mut arena = NodeArena::new();
    let root_index = arena.push(ArenaNode::Document {
        children: Vec::new(),
    });

    // (arena index, source position of the start tag)
    let mut open_elements: Vec<(usize, usize)> = Vec::new();

    for (token_index, token) in stream.iter().enumerate() {
        let position = stream.position(token_index);
        let parent_index = open_elements
            .last()
            .map_or(root_index, |(index, _)| *index);
        match token {
            Token::Comment(_) => {}
            Token::Text(txt) => arena.add_text(parent_index, txt),
            Token::StartTag {
                name,
                attributes,
                self_closing,
            } => {
                let resolved_attributes: Vec<(String, String)> = attributes
                    .iter()
                    .map(|(k, v)| (atoms.resolve(*k).to_string(), v.clone()))
                    .collect();
                let new_index = arena.add_child(
                    parent_index,
                    ArenaNode::Element {
                        name: atoms.resolve(*name).to_string(),
                        attributes: resolved_attributes,
                        children: Vec::new(),
                    },
                );
                if !*self_closing {
                    open_elements.push((new_index, position));
                }
            }
            Token::EndTag(name) => {
                let target = atoms.resolve(*name);
                let closes_current = open_elements
                    .last()
                    .is_some_and(|(index, _)| arena.is_element_named(*index, target));
                if closes_current {
                    open_elements.pop();
                    continue;
                }
                let code = if !is_void_element(target)
                    && open_elements
                        .iter()
                        .any(|(index, _)| arena.is_element_named(*index, target))
                {
                    ParseErrorCode::MisnestedEndTag
                } else {
                    ParseErrorCode::StrayEndTag
                };
                return Err(ParseError::with_tag(code, position, target));
            }
        }
    }

    if let Some((open_index, position)) = open_elements.pop() {
        return Err(ParseError::with_tag(
            ParseErrorCode::UnclosedElement,
            position,
            arena.element_name(open_index),
        ));
    }

    Ok(arena.into_dom(root_index))
}

/// Tokenizes and builds a fragment in one step.
pub fn parse_fragment(input: &str) -> Result<Node, ParseError> {
    let stream = crate::tokenize(input)?;
    log::trace!(
        target: "html.dom_builder",
        "building fragment from {} tokens ({} distinct names)",
        stream.tokens().len(),
        stream.atoms().len()
    );
    build_dom(&stream)
}

#[derive(Debug)]
enum ArenaNode {
    Document {
        children: Vec<usize>,
    },
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        children: Vec<usize>,
    },
    Text {
        text: String,
    },
}

impl ArenaNode {
    fn children(&self) -> Option<&[usize]> {
        match self {
            ArenaNode::Document { children } | ArenaNode::Element { children, .. } => {
                Some(children)
            }
            ArenaNode::Text { .. } => None,
        }
    }
}

#[derive(Debug)]
struct NodeArena {
    nodes: Vec<ArenaNode>,
}

impl NodeArena {
    fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    fn push(&mut self, node: ArenaNode) -> usize {
        let index = self.nodes.len();
        self.nodes.push(node);
        index
    }

    fn add_child(&mut self, parent_index: usize, child: ArenaNode) -> usize {
        let child_index = self.push(child);
        if let Some(children) = self.children_mut(parent_index) {
            children.push(child_index);
        }
        child_index
    }

    fn add_text(&mut self, parent_index: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let last = self
            .nodes
            .get(parent_index)
            .and_then(ArenaNode::children)
            .and_then(|c| c.last().copied());
        if let Some(last) = last
            && let ArenaNode::Text { text: existing } = &mut self.nodes[last]
        {
            existing.push_str(text);
            return;
        }
        self.add_child(
            parent_index,
            ArenaNode::Text {
                text: text.to_string(),
            },
        );
    }

    fn children_mut(&mut self, index: usize) -> Option<&mut Vec<usize>> {
        match &mut self.nodes[index] {
            ArenaNode::Document { children } | ArenaNode::Element { children, .. } => {
                Some(children)
            }
            ArenaNode::Text { .. } => None,
        }
    }

    fn is_element_named(&self, node_index: usize, target: &str) -> bool {
        match &self.nodes[node_index] {
            ArenaNode::Element { name, .. } => name.eq_ignore_ascii_case(target),
            _ => false,
        }
    }

    fn element_name(&self, node_index: usize) -> &str {
        match &self.nodes[node_index] {
            ArenaNode::Element { name, .. } => name,
            _ => "",
        }
    }

    fn into_dom(self, root_index: usize) -> Node {
        let mut nodes = self.nodes;
        let mut built_nodes: Vec<Node> = Vec::with_capacity(nodes.len());

        fn take_children(n: usize, built: &mut Vec<Node>) -> Vec<Node> {
            let start = built.len().saturating_sub(n);
            built.split_off(start)
        }

        // Iterative postorder traversal over the arena so deep nesting cannot
        // overflow the call stack. When a node is revisited, its direct children
        // are the last `child_count` entries of `built_nodes`, in source order.
        let mut stack: Vec<(usize, bool)> = vec![(root_index, false)];

        while let Some((node_index, visited)) = stack.pop() {
            if !visited {
                stack.push((node_index, true));
                if let Some(children) = nodes[node_index].children() {
                    for &child_index in children.iter().rev() {
                        stack.push((child_index, false));
                    }
                }
                continue;
            }

            let node = match &mut nodes[node_index] {
                ArenaNode::Document { children } => Node::Document {
                    children: take_children(children.len(), &mut built_nodes),
                },
                ArenaNode::Element {
                    name,
                    attributes,
                    children,
                } => Node::Element {
                    name: std::mem::take(name),
                    attributes: std::mem::take(attributes),
                    children: take_children(children.len(), &mut built_nodes),
                },
                ArenaNode::Text { text } => Node::Text {
                    text: std::mem::take(text),
                },
            };

            built_nodes.push(node);
        }

        debug_assert_eq!(built_nodes.len(), 1, "dom builder builds exactly one root");
        built_nodes.pop().unwrap_or(Node::Document {
            children: Vec::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Node {
        parse_fragment(input).unwrap_or_else(|e| panic!("{input:?} failed: {e}"))
    }

    #[test]
    fn builds_nested_fragment() {
        let dom = parse("<p>See <a href='/x'>this</a>.</p>");
        assert_eq!(
            dom,
            Node::Document {
                children: vec![Node::element(
                    "p",
                    &[],
                    vec![
                        Node::text("See "),
                        Node::element("a", &[("href", "/x")], vec![Node::text("this")]),
                        Node::text("."),
                    ]
                )]
            }
        );
    }

    #[test]
    fn comments_are_dropped_and_text_coalesced() {
        let dom = parse("a<!-- x -->b<br>c");
        assert_eq!(
            dom.children(),
            [
                Node::text("ab"),
                Node::element("br", &[], Vec::new()),
                Node::text("c")
            ]
        );
    }

    #[test]
    fn structural_errors_are_fatal() {
        let cases = [
            ("<p>x", ParseErrorCode::UnclosedElement, "p"),
            ("x</p>", ParseErrorCode::StrayEndTag, "p"),
            ("<b><i>x</b></i>", ParseErrorCode::MisnestedEndTag, "b"),
            ("<p>a<br></br></p>", ParseErrorCode::StrayEndTag, "br"),
        ];
        for (input, code, tag) in cases {
            let err = parse_fragment(input).unwrap_err();
            assert_eq!(err.code, code, "{input:?}");
            assert_eq!(err.tag.as_deref(), Some(tag), "{input:?}");
        }
    }

    #[test]
    fn unclosed_error_points_at_innermost_start_tag() {
        let err = parse_fragment("<ul><li>x</ul>").unwrap_err();
        assert_eq!(err.code, ParseErrorCode::MisnestedEndTag);
        let err = parse_fragment("<ul><li>x").unwrap_err();
        assert_eq!(err.code, ParseErrorCode::UnclosedElement);
        assert_eq!(err.position, 4);
    }

    #[test]
    fn empty_input_is_an_empty_document() {
        assert_eq!(parse(""), Node::Document { children: Vec::new() });
    }

    #[test]
    fn build_dom_stress_deep_nesting() {
        let depth: usize = 10_000;
        let input = format!("{}{}", "<b>".repeat(depth), "</b>".repeat(depth));
        let dom = parse(&input);

        let mut current = &dom;
        let mut seen = 0usize;
        loop {
            match current {
                Node::Document { children } => {
                    assert_eq!(children.len(), 1);
                    current = &children[0];
                }
                Node::Element { name, children, .. } => {
                    assert_eq!(name, "b");
                    seen += 1;
                    if seen == depth {
                        assert!(children.is_empty());
                        break;
                    }
                    assert_eq!(children.len(), 1);
                    current = &children[0];
                }
                Node::Text { .. } => panic!("unexpected leaf node before reaching depth"),
            }
        }
    }
}
