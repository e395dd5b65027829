use std::fmt;

use html::ParseError;
use serde::Serialize;

/// Markup that passed validation and re-parses cleanly.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct SanitizedHtml(String);

impl SanitizedHtml {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for SanitizedHtml {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SanitizedHtml {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<SanitizedHtml> for String {
    fn from(html: SanitizedHtml) -> Self {
        html.0
    }
}

/// Trim the engine's output and prove it parses before handing it out.
pub(crate) fn finalize(output: &str) -> Result<SanitizedHtml, ParseError> {
    // ASCII only: a leading or trailing no-break space is author content.
    let trimmed = output.trim_matches(|c: char| c.is_ascii_whitespace());
    html::parse_fragment(trimmed)?;
    Ok(SanitizedHtml(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_output() {
        let html = finalize("\n <p>a <b>b</b></p>\n").unwrap();
        assert_eq!(html.as_str(), "<p>a <b>b</b></p>");
        assert_eq!(html.to_string(), String::from(html.clone()));
    }

    #[test]
    fn keeps_edge_no_break_spaces() {
        let html = finalize("\n\u{a0}<p>x</p>\u{a0} ").unwrap();
        assert_eq!(html.as_str(), "\u{a0}<p>x</p>\u{a0}");
    }

    #[test]
    fn rejects_broken_output() {
        assert!(finalize("<p>unclosed").is_err());
        assert!(finalize("<p></b></p>").is_err());
    }
}
