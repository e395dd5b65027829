//! Character reference decoding (input side) and escaping (output side).
//!
//! Decoding is deliberately narrow: the named references below plus
//! semicolon-terminated numeric references. Anything else passes through
//! literally and is re-escaped by the serializer, so a malformed reference
//! can never smuggle markup.

const NAMED: &[(&[u8], char)] = &[
    (b"&amp;", '&'),
    (b"&lt;", '<'),
    (b"&gt;", '>'),
    (b"&quot;", '"'),
    (b"&apos;", '\''),
    (b"&nbsp;", '\u{00A0}'),
];

const MAX_HEX_DIGITS: usize = 6; // 0x10FFFF
const MAX_DEC_DIGITS: usize = 7; // 1114111

pub fn decode_entities(s: &str) -> String {
    let bytes = s.as_bytes();
    if memchr::memchr(b'&', bytes).is_none() {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut i = 0;
    let mut copy_start = 0;

    while i < bytes.len() {
        if bytes[i] != b'&' {
            i += 1;
            continue;
        }
        // Flush up to '&' unchanged (preserves UTF-8).
        out.push_str(&s[copy_start..i]);

        if let Some((pat, ch)) = NAMED.iter().find(|(pat, _)| bytes[i..].starts_with(pat)) {
            out.push(*ch);
            i += pat.len();
            copy_start = i;
            continue;
        }

        let numeric = if bytes[i..].starts_with(b"&#x") || bytes[i..].starts_with(b"&#X") {
            Some((i + 3, MAX_HEX_DIGITS, 16))
        } else if bytes[i..].starts_with(b"&#") {
            Some((i + 2, MAX_DEC_DIGITS, 10))
        } else {
            None
        };

        if let Some((digits_start, max_digits, radix)) = numeric
            && let Some(end) = scan_numeric(bytes, digits_start, max_digits, radix)
        {
            match u32::from_str_radix(&s[digits_start..end], radix).ok().and_then(char::from_u32) {
                Some(ch) => out.push(ch),
                // Known end but not a scalar value; keep the sequence literally.
                None => out.push_str(&s[i..=end]),
            }
            i = end + 1;
            copy_start = i;
            continue;
        }

        out.push('&');
        i += 1;
        copy_start = i;
    }

    out.push_str(&s[copy_start..]);
    out
}

// Bounded scan to avoid quadratic behavior on adversarial input.
fn scan_numeric(bytes: &[u8], start: usize, max_digits: usize, radix: u32) -> Option<usize> {
    let mut digits = 0usize;
    for (j, &b) in bytes.iter().enumerate().skip(start) {
        if b == b';' {
            return (digits > 0).then_some(j);
        }
        if digits == max_digits || !(b as char).is_digit(radix) {
            return None;
        }
        digits += 1;
    }
    None
}

/// Escape text content for serialization between tags.
pub fn escape_text(s: &str) -> String {
    escape(s, false)
}

/// Escape an attribute value for serialization inside single or double quotes.
pub fn escape_attribute(s: &str) -> String {
    escape(s, true)
}

fn escape(s: &str, quotes: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            '\'' if quotes => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_entities_preserves_utf8() {
        assert_eq!(decode_entities("120×32"), "120×32");
        assert_eq!(decode_entities("π &amp; σ"), "π & σ");
    }

    #[test]
    fn decode_entities_decodes_common_entities() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;tag&gt;"), "<tag>");
        assert_eq!(decode_entities("&quot;hi&quot;"), "\"hi\"");
        assert_eq!(decode_entities("&apos;x&apos;"), "'x'");
        assert_eq!(decode_entities("a&nbsp;b"), "a\u{00A0}b");
    }

    #[test]
    fn decode_entities_decodes_numeric_entities() {
        assert_eq!(decode_entities("&#215;"), "×");
        assert_eq!(decode_entities("&#xD7;"), "×");
        assert_eq!(decode_entities("&#39;"), "'");
    }

    #[test]
    fn decode_entities_passes_through_malformed() {
        assert_eq!(decode_entities("&notanentity;"), "&notanentity;");
        assert_eq!(decode_entities("&amp"), "&amp");
        assert_eq!(decode_entities("&#xZZ;"), "&#xZZ;");
        assert_eq!(decode_entities("&#xD800;"), "&#xD800;");
        assert_eq!(decode_entities("&#11141111;"), "&#11141111;");
        assert_eq!(decode_entities("&#;"), "&#;");
        assert_eq!(decode_entities("&#xZZ;&amp;"), "&#xZZ;&");
    }

    #[test]
    fn escaping_round_trips_through_decoding() {
        let samples = ["a < b && c > d", "it's \"quoted\"", "&amp; literal", "plain"];
        for s in samples {
            assert_eq!(decode_entities(&escape_attribute(s)), s);
            assert_eq!(decode_entities(&escape_text(s)), s);
        }
    }

    #[test]
    fn text_escaping_leaves_quotes_alone() {
        assert_eq!(escape_text("it's <b>"), "it's &lt;b&gt;");
        assert_eq!(escape_attribute("it's"), "it&#39;s");
    }
}
