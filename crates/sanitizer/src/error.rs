use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use html::escape_text;
use serde::Serialize;

/// Stable identifiers for everything the sanitizer can reject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum ErrorCode {
    InvalidMarkup,
    DisallowedTags,
    DisallowedCssClasses,
    ImageCaptionDisallowedTags,
    ImageChildren,
    ImageNoImage,
    ImageNoCaption,
    ImageInvalidSource,
    ImageExternal,
    ImageNonExistent,
    LinkNoTarget,
    LinkInvalid,
    LinkExternal,
    LinkCredentials,
    LinkPort,
    LinkUnreachable,
    QuotationDisallowedTags,
    QuotationNoSource,
    QuotationNoText,
}

impl ErrorCode {
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidMarkup => "InvalidMarkup",
            ErrorCode::DisallowedTags => "DisallowedTags",
            ErrorCode::DisallowedCssClasses => "DisallowedCssClasses",
            ErrorCode::ImageCaptionDisallowedTags => "ImageCaptionDisallowedTags",
            ErrorCode::ImageChildren => "ImageChildren",
            ErrorCode::ImageNoImage => "ImageNoImage",
            ErrorCode::ImageNoCaption => "ImageNoCaption",
            ErrorCode::ImageInvalidSource => "ImageInvalidSource",
            ErrorCode::ImageExternal => "ImageExternal",
            ErrorCode::ImageNonExistent => "ImageNonExistent",
            ErrorCode::LinkNoTarget => "LinkNoTarget",
            ErrorCode::LinkInvalid => "LinkInvalid",
            ErrorCode::LinkExternal => "LinkExternal",
            ErrorCode::LinkCredentials => "LinkCredentials",
            ErrorCode::LinkPort => "LinkPort",
            ErrorCode::LinkUnreachable => "LinkUnreachable",
            ErrorCode::QuotationDisallowedTags => "QuotationDisallowedTags",
            ErrorCode::QuotationNoSource => "QuotationNoSource",
            ErrorCode::QuotationNoText => "QuotationNoText",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Entry {
    details: BTreeSet<String>,
    // One per distinct context that reported the code, in first-seen order.
    hints: Vec<String>,
}

/// Accumulated validation failures, at most one message per [`ErrorCode`].
///
/// Repeated failures of the same kind fold their details (offending tags,
/// URLs, classes) into one message. Details are HTML-escaped on insertion so
/// messages are safe to render back to the author.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Errors {
    entries: BTreeMap<ErrorCode, Entry>,
}

impl Errors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, code: ErrorCode) -> bool {
        self.entries.contains_key(&code)
    }

    pub fn codes(&self) -> impl Iterator<Item = ErrorCode> + '_ {
        self.entries.keys().copied()
    }

    /// Record `code` without a detail.
    pub fn add(&mut self, code: ErrorCode) {
        self.entries.entry(code).or_default();
    }

    /// Record `code` with an offending item, e.g. a tag name or URL.
    pub fn add_detail(&mut self, code: ErrorCode, detail: &str) {
        self.entries
            .entry(code)
            .or_default()
            .details
            .insert(escape_text(detail));
    }

    /// Attach context to `code`, such as the tags that would have been legal.
    /// Distinct hints from different contexts are all kept.
    pub fn set_hint(&mut self, code: ErrorCode, hint: &str) {
        let entry = self.entries.entry(code).or_default();
        if !entry.hints.iter().any(|h| h == hint) {
            entry.hints.push(hint.to_string());
        }
    }

    pub fn extend(&mut self, other: Errors) {
        for (code, entry) in other.entries {
            let target = self.entries.entry(code).or_default();
            target.details.extend(entry.details);
            for hint in entry.hints {
                if !target.hints.contains(&hint) {
                    target.hints.push(hint);
                }
            }
        }
    }

    pub fn message(&self, code: ErrorCode) -> Option<String> {
        self.entries.get(&code).map(|entry| render(code, entry))
    }

    /// `(code, message)` pairs in code order.
    pub fn iter(&self) -> impl Iterator<Item = (ErrorCode, String)> + '_ {
        self.entries
            .iter()
            .map(|(code, entry)| (*code, render(*code, entry)))
    }

    pub fn to_map(&self) -> BTreeMap<ErrorCode, String> {
        self.iter().collect()
    }
}

impl Serialize for Errors {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.iter())
    }
}

impl fmt::Display for Errors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (code, message)) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{code}: {message}")?;
        }
        Ok(())
    }
}

fn render(code: ErrorCode, entry: &Entry) -> String {
    let details = entry.details.iter().map(String::as_str).collect::<Vec<_>>().join(", ");
    let hint = match entry.hints.as_slice() {
        [] => "none".to_string(),
        [only] => only.clone(),
        several => format!("{}, depending on context", several.join(" or ")),
    };
    match code {
        ErrorCode::InvalidMarkup if details.is_empty() => "Invalid HTML.".to_string(),
        ErrorCode::InvalidMarkup => format!("Invalid HTML: {details}."),
        ErrorCode::DisallowedTags => {
            format!("Found disallowed HTML tags: {details}. Allowed tags are: {hint}.")
        }
        ErrorCode::DisallowedCssClasses => {
            format!("Found disallowed CSS classes: {details}. Allowed classes are: {hint}.")
        }
        ErrorCode::ImageCaptionDisallowedTags => format!(
            "Found disallowed HTML tags in an image caption: {details}. Allowed tags are: {hint}."
        ),
        ErrorCode::ImageChildren => {
            "A figure must contain exactly one image followed by one caption.".to_string()
        }
        ErrorCode::ImageNoImage => "A figure is missing its image.".to_string(),
        ErrorCode::ImageNoCaption => "A figure is missing its caption.".to_string(),
        ErrorCode::ImageInvalidSource => format!("Invalid image source: {details}."),
        ErrorCode::ImageExternal => {
            format!("Images must be uploaded to {hint}, found: {details}.")
        }
        ErrorCode::ImageNonExistent => format!("Image does not exist: {details}."),
        ErrorCode::LinkNoTarget => "A link is missing its target.".to_string(),
        ErrorCode::LinkInvalid => format!("Invalid link: {details}."),
        ErrorCode::LinkExternal => format!("External links are not allowed: {details}."),
        ErrorCode::LinkCredentials => {
            format!("Links must not contain credentials, found on: {details}.")
        }
        ErrorCode::LinkPort => format!("Links must not specify a port: {details}."),
        ErrorCode::LinkUnreachable => format!("Link target could not be reached: {details}."),
        ErrorCode::QuotationDisallowedTags => {
            format!("Quotations must not contain: {details}.")
        }
        ErrorCode::QuotationNoSource => {
            "A quotation must end with its source in a &lt;cite&gt; tag.".to_string()
        }
        ErrorCode::QuotationNoText => "A quotation is missing its text.".to_string(),
    }
}

/// A failed sanitization: the caller's original input, untouched, and why.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("markup rejected with {} error(s)", .errors.len())]
pub struct Rejected {
    pub input: String,
    pub errors: Errors,
}
