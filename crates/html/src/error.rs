//! Fatal parse errors for tokenization/tree-building.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParseErrorCode {
    UnexpectedDoctype,
    UnterminatedComment,
    UnterminatedTag,
    InvalidAttributeName,
    MalformedEndTag,
    StrayEndTag,
    MisnestedEndTag,
    UnclosedElement,
}

impl ParseErrorCode {
    pub const fn label(self) -> &'static str {
        match self {
            Self::UnexpectedDoctype => "unexpected doctype",
            Self::UnterminatedComment => "unterminated comment",
            Self::UnterminatedTag => "unterminated tag",
            Self::InvalidAttributeName => "invalid attribute name",
            Self::MalformedEndTag => "malformed end tag",
            Self::StrayEndTag => "stray end tag",
            Self::MisnestedEndTag => "misnested end tag",
            Self::UnclosedElement => "unclosed element",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{} at byte {position}{}", .code.label(), tag_suffix(.tag))]
pub struct ParseError {
    pub code: ParseErrorCode,
    pub position: usize,
    /// Tag name involved in tree-building errors.
    pub tag: Option<String>,
}

fn tag_suffix(tag: &Option<String>) -> String {
    tag.as_deref()
        .map(|t| format!(" (<{t}>)"))
        .unwrap_or_default()
}

impl ParseError {
    pub(crate) fn at(code: ParseErrorCode, position: usize) -> Self {
        Self {
            code,
            position,
            tag: None,
        }
    }

    pub(crate) fn with_tag(code: ParseErrorCode, position: usize, tag: &str) -> Self {
        Self {
            code,
            position,
            tag: Some(tag.to_string()),
        }
    }
}
