//! Strict fragment tokenizer with a constrained tag-name character set.
//!
//! Supported tag/attribute name characters (ASCII only): `[A-Za-z0-9:_-]`, and a
//! tag name must start with a letter. A `<` that does not open a tag, end tag or
//! comment is literal text.
//!
//! Unlike a browser tokenizer this one fails instead of recovering: user
//! content is expected to come from an editor that emits well-formed markup,
//! and anything else is rejected rather than guessed at.
use crate::decode_entities;
use crate::error::{ParseError, ParseErrorCode};
use crate::types::{AtomId, AtomTable, Token, TokenStream};
use memchr::memchr;

const HTML_COMMENT_START: &str = "<!--";
const HTML_COMMENT_END: &str = "-->";

// it only attempts matches starting at ASCII <
// < cannot appear in UTF-8 continuation bytes
const SCRIPT_CLOSE_TAG: &[u8] = b"</script";
const STYLE_CLOSE_TAG: &[u8] = b"</style";

fn starts_with_ignore_ascii_case_at(haystack: &[u8], start: usize, needle: &[u8]) -> bool {
    haystack.len() >= start + needle.len()
        && haystack[start..start + needle.len()].eq_ignore_ascii_case(needle)
}

fn is_name_char(c: u8) -> bool {
    c.is_ascii_alphanumeric() || c == b'-' || c == b'_' || c == b':'
}

fn find_rawtext_close_tag(haystack: &str, close_tag: &[u8]) -> Option<(usize, usize)> {
    let hay_bytes = haystack.as_bytes();
    let len = hay_bytes.len();
    let n = close_tag.len();
    let mut i = 0;
    while i + n <= len {
        let rel = memchr(b'<', &hay_bytes[i..])?;
        i += rel;
        if i + n > len {
            return None;
        }
        if starts_with_ignore_ascii_case_at(hay_bytes, i, close_tag) {
            let mut k = i + n;
            while k < len && hay_bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k < len && hay_bytes[k] == b'>' {
                return Some((i, k + 1));
            }
        }
        i += 1;
    }
    None
}

/// Elements that never have children or an end tag.
pub fn is_void_element(name: &str) -> bool {
    matches!(
        name,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

struct Emitter {
    tokens: Vec<Token>,
    positions: Vec<usize>,
    text: String,
    text_start: usize,
}

impl Emitter {
    fn push_text(&mut self, at: usize, raw: &str) {
        if self.text.is_empty() {
            self.text_start = at;
        }
        self.text.push_str(raw);
    }

    fn flush_text(&mut self) {
        if self.text.is_empty() {
            return;
        }
        let decoded = decode_entities(&self.text);
        self.text.clear();
        self.tokens.push(Token::Text(decoded));
        self.positions.push(self.text_start);
    }

    fn push(&mut self, at: usize, token: Token) {
        self.flush_text();
        log::trace!(target: "html.tokenizer", "emit token: {token:?}");
        self.tokens.push(token);
        self.positions.push(at);
    }
}

/// Tokenizes a fragment into a token stream with interned tag/attribute names.
pub fn tokenize(input: &str) -> Result<TokenStream, ParseError> {
    let mut atoms = AtomTable::new();
    let mut out = Emitter {
        tokens: Vec::new(),
        positions: Vec::new(),
        text: String::new(),
        text_start: 0,
    };
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut i = 0;
    // Invariant: we scan by byte, but slice endpoints are only ever cut at ASCII
    // structural bytes, so they remain UTF-8 char boundaries.
    while i < len {
        if bytes[i] != b'<' {
            let start = i;
            i = memchr(b'<', &bytes[i..]).map_or(len, |rel| i + rel);
            out.push_text(start, &input[start..i]);
            continue;
        }

        if input[i..].starts_with(HTML_COMMENT_START) {
            let body = i + HTML_COMMENT_START.len();
            let Some(end) = input[body..].find(HTML_COMMENT_END) else {
                return Err(ParseError::at(ParseErrorCode::UnterminatedComment, i));
            };
            out.push(i, Token::Comment(input[body..body + end].to_string()));
            i = body + end + HTML_COMMENT_END.len();
            continue;
        }

        if i + 1 < len && bytes[i + 1] == b'!' {
            // Doctypes, CDATA and processing-like constructs have no place in a fragment.
            return Err(ParseError::at(ParseErrorCode::UnexpectedDoctype, i));
        }

        if i + 1 < len && bytes[i + 1] == b'/' {
            let start = i + 2;
            if start >= len || !bytes[start].is_ascii_alphabetic() {
                return Err(ParseError::at(ParseErrorCode::MalformedEndTag, i));
            }
            let mut j = start;
            while j < len && is_name_char(bytes[j]) {
                j += 1;
            }
            let name = atoms.intern_ascii_lowercase(&input[start..j]);
            while j < len && bytes[j].is_ascii_whitespace() {
                j += 1;
            }
            if j >= len {
                return Err(ParseError::at(ParseErrorCode::UnterminatedTag, i));
            }
            if bytes[j] != b'>' {
                return Err(ParseError::at(ParseErrorCode::MalformedEndTag, i));
            }
            out.push(i, Token::EndTag(name));
            i = j + 1;
            continue;
        }

        if i + 1 >= len || !bytes[i + 1].is_ascii_alphabetic() {
            // Literal '<', e.g. "1 < 2".
            out.push_text(i, "<");
            i += 1;
            continue;
        }

        let tag_start = i;
        let tag = start_tag(input, i, &mut atoms)?;
        let (name, self_closing) = (tag.name, tag.self_closing);
        out.push(
            tag_start,
            Token::StartTag {
                name,
                attributes: tag.attributes,
                self_closing,
            },
        );
        i = tag.end;

        let name_str = atoms.resolve(name);
        if (name_str == "script" || name_str == "style") && !self_closing {
            let close_tag = if name_str == "script" {
                SCRIPT_CLOSE_TAG
            } else {
                STYLE_CLOSE_TAG
            };
            let Some((rel_start, rel_end)) = find_rawtext_close_tag(&input[i..], close_tag) else {
                return Err(ParseError::with_tag(
                    ParseErrorCode::UnclosedElement,
                    tag_start,
                    name_str,
                ));
            };
            let raw = &input[i..i + rel_start];
            if !raw.is_empty() {
                // Rawtext bodies are verbatim; no entity decoding.
                out.flush_text();
                out.tokens.push(Token::Text(raw.to_string()));
                out.positions.push(i);
            }
            out.push(i + rel_start, Token::EndTag(name));
            i += rel_end;
        }
    }
    out.flush_text();
    Ok(TokenStream::new(out.tokens, out.positions, atoms))
}

struct ScannedStartTag {
    name: AtomId,
    attributes: Vec<(AtomId, String)>,
    self_closing: bool,
    /// Offset just past the closing `>`.
    end: usize,
}

/// Scans the start tag at `at`, which points to `<`.
fn start_tag(input: &str, at: usize, atoms: &mut AtomTable) -> Result<ScannedStartTag, ParseError> {
    let bytes = input.as_bytes();
    let len = bytes.len();
    let mut k = at + 1;
    while k < len && is_name_char(bytes[k]) {
        k += 1;
    }
    let name = atoms.intern_ascii_lowercase(&input[at + 1..k]);
    let mut attributes: Vec<(AtomId, String)> = Vec::new();
    let mut self_closing = false;
    let unterminated = || ParseError::at(ParseErrorCode::UnterminatedTag, at);

    loop {
        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        if k >= len {
            return Err(unterminated());
        }
        match bytes[k] {
            b'>' => {
                k += 1;
                break;
            }
            b'/' if k + 1 < len && bytes[k + 1] == b'>' => {
                self_closing = true;
                k += 2;
                break;
            }
            c if is_name_char(c) => {}
            _ => return Err(ParseError::at(ParseErrorCode::InvalidAttributeName, k)),
        }

        let name_start = k;
        while k < len && is_name_char(bytes[k]) {
            k += 1;
        }
        let attribute_name = atoms.intern_ascii_lowercase(&input[name_start..k]);

        while k < len && bytes[k].is_ascii_whitespace() {
            k += 1;
        }
        let mut value = String::new();
        if k < len && bytes[k] == b'=' {
            k += 1;
            while k < len && bytes[k].is_ascii_whitespace() {
                k += 1;
            }
            if k >= len {
                return Err(unterminated());
            }
            if bytes[k] == b'"' || bytes[k] == b'\'' {
                let quote = bytes[k];
                let vstart = k + 1;
                let Some(rel) = memchr(quote, &bytes[vstart..]) else {
                    return Err(unterminated());
                };
                value = decode_entities(&input[vstart..vstart + rel]);
                k = vstart + rel + 1;
            } else {
                let vstart = k;
                while k < len && !bytes[k].is_ascii_whitespace() && bytes[k] != b'>' {
                    if bytes[k] == b'/' && k + 1 < len && bytes[k + 1] == b'>' {
                        break;
                    }
                    k += 1;
                }
                value = decode_entities(&input[vstart..k]);
            }
        }

        if attributes.iter().any(|(n, _)| *n == attribute_name) {
            log::trace!(
                target: "html.tokenizer",
                "ignoring duplicate attribute {:?}",
                atoms.resolve(attribute_name)
            );
            continue;
        }
        attributes.push((attribute_name, value));
    }

    if is_void_element(atoms.resolve(name)) {
        self_closing = true;
    }

    Ok(ScannedStartTag {
        name,
        attributes,
        self_closing,
        end: k,
    })
}
