//! Strict markup parser for user-authored fragments.
//!
//! `parse_fragment` turns a string into a [`Node::Document`] tree or a
//! [`ParseError`]; the sanitizer treats any error as fatal.

pub mod dom_utils;

mod atom;
mod dom_builder;
mod entities;
mod error;
mod tokenizer;
mod types;

pub use crate::dom_builder::{build_dom, parse_fragment};
pub use crate::entities::{decode_entities, escape_attribute, escape_text};
pub use crate::error::{ParseError, ParseErrorCode};
pub use crate::tokenizer::{is_void_element, tokenize};
pub use crate::types::{AtomId, AtomTable, Node, Token, TokenStream};
