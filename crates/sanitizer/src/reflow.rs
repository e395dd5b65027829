//! Plain text to paragraphs for the raw editing mode.

const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "div",
    "dl",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "ul",
];

/// Turn blank-line separated text into `<p>` blocks with `<br>` for single
/// line breaks. Blocks that already contain block-level markup are passed
/// through untouched. Performs no whitelisting.
pub fn reflow(input: &str) -> String {
    let normalized = input.replace("\r\n", "\n").replace('\r', "\n");

    let mut blocks: Vec<Vec<&str>> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    for line in normalized.split('\n') {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line.trim_end());
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }

    blocks
        .iter()
        .map(|lines| {
            let block = lines.join("\n");
            if contains_block_tag(&block) {
                block
            } else {
                format!("<p>{}</p>", lines.join("<br>\n"))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn contains_block_tag(text: &str) -> bool {
    text.match_indices('<').any(|(at, _)| {
        let rest = text[at + 1..].strip_prefix('/').unwrap_or(&text[at + 1..]);
        let name_len = rest
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric())
            .count();
        name_len > 0
            && BLOCK_TAGS
                .iter()
                .any(|tag| tag.eq_ignore_ascii_case(&rest[..name_len]))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_paragraphs_and_breaks_lines() {
        let input = "First line\r\nsecond line\r\n\r\n\r\n\r\nNext paragraph  \n";
        assert_eq!(
            reflow(input),
            "<p>First line<br>\nsecond line</p>\n<p>Next paragraph</p>"
        );
    }

    #[test]
    fn block_markup_is_not_double_wrapped() {
        let input = "<ul>\n<li>a</li>\n</ul>\n\nplain <b>text</b>\n \n<P>already</P>";
        assert_eq!(
            reflow(input),
            "<ul>\n<li>a</li>\n</ul>\n<p>plain <b>text</b></p>\n<P>already</P>"
        );
    }

    #[test]
    fn inline_tags_do_not_count_as_blocks() {
        assert!(!contains_block_tag("<b>x</b> <br> <pa>"));
        assert!(contains_block_tag("x</div>"));
        assert_eq!(reflow("  \n\n "), "");
    }
}
