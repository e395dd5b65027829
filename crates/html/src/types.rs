pub use crate::atom::{AtomId, AtomTable};

#[derive(Debug)]
pub enum Token {
    StartTag {
        name: AtomId,
        attributes: Vec<(AtomId, String)>,
        self_closing: bool,
    },
    EndTag(AtomId),
    Comment(String),
    Text(String),
}

/// Tokens plus the atom table their names were interned in.
///
/// `positions[i]` is the byte offset in the source where `tokens[i]` starts.
#[derive(Debug)]
pub struct TokenStream {
    tokens: Vec<Token>,
    positions: Vec<usize>,
    atoms: AtomTable,
}

impl TokenStream {
    pub fn new(tokens: Vec<Token>, positions: Vec<usize>, atoms: AtomTable) -> Self {
        debug_assert_eq!(tokens.len(), positions.len());
        Self {
            tokens,
            positions,
            atoms,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn atoms(&self) -> &AtomTable {
        &self.atoms
    }

    pub fn position(&self, index: usize) -> usize {
        self.positions.get(index).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }
}

/// Parsed markup tree.
///
/// Attribute names are ASCII-lowercased and values entity-decoded; an
/// attribute written without a value carries an empty string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Document {
        children: Vec<Node>,
    },
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        children: Vec<Node>,
    },
    Text {
        text: String,
    },
}

impl Node {
    pub fn element(name: &str, attributes: &[(&str, &str)], children: Vec<Node>) -> Self {
        Node::Element {
            name: name.to_string(),
            attributes: attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            children,
        }
    }

    pub fn text(text: &str) -> Self {
        Node::Text {
            text: text.to_string(),
        }
    }

    /// Tag name for elements, `None` for text and the document root.
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn is_element_named(&self, target: &str) -> bool {
        self.name().is_some_and(|n| n.eq_ignore_ascii_case(target))
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Node::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Document { children } | Node::Element { children, .. } => children,
            Node::Text { .. } => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Document { children } | Node::Element { children, .. } => Some(children),
            Node::Text { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_lookup_is_case_insensitive() {
        let node = Node::element("a", &[("href", "/x")], Vec::new());
        assert_eq!(node.attr("HREF"), Some("/x"));
        assert_eq!(node.attr("title"), None);
        assert_eq!(Node::text("x").attr("href"), None);
    }

    #[test]
    fn children_of_text_is_empty() {
        assert!(Node::text("x").children().is_empty());
        assert!(Node::text("x").name().is_none());
    }
}
