use html::dom_utils::text_content;
use html::{Node, ParseErrorCode, parse_fragment};

fn expect_error(input: &str) -> ParseErrorCode {
    match parse_fragment(input) {
        Ok(dom) => panic!("{input:?} parsed unexpectedly: {dom:?}"),
        Err(err) => err.code,
    }
}

#[test]
fn fragment_tree_shape() {
    let dom = parse_fragment("<p class=\"a\">Hi <b>there</b></p>\n<ul><li>x</li></ul>").unwrap();
    assert_eq!(
        dom,
        Node::Document {
            children: vec![
                Node::element(
                    "p",
                    &[("class", "a")],
                    vec![
                        Node::text("Hi "),
                        Node::element("b", &[], vec![Node::text("there")]),
                    ],
                ),
                Node::text("\n"),
                Node::element(
                    "ul",
                    &[],
                    vec![Node::element("li", &[], vec![Node::text("x")])],
                ),
            ],
        }
    );
}

#[test]
fn comments_vanish_and_text_merges() {
    let dom = parse_fragment("<p>one<!-- gone --> two<!---->!</p>").unwrap();
    assert_eq!(dom.children()[0].children(), &[Node::text("one two!")]);
}

#[test]
fn entities_decode_in_text_and_attributes() {
    let dom = parse_fragment("<a href='/q?a=1&amp;b=2' title=\"&quot;hi&quot;\">&lt;3 &#x263A; &#9731;</a>").unwrap();
    let a = &dom.children()[0];
    assert_eq!(a.attr("href"), Some("/q?a=1&b=2"));
    assert_eq!(a.attr("title"), Some("\"hi\""));
    assert_eq!(text_content(a), "<3 \u{263A} \u{2603}");
}

#[test]
fn structural_errors_are_fatal() {
    assert_eq!(expect_error("<!doctype html>"), ParseErrorCode::UnexpectedDoctype);
    assert_eq!(expect_error("<p>x<!-- open"), ParseErrorCode::UnterminatedComment);
    assert_eq!(expect_error("<p class='x'"), ParseErrorCode::UnterminatedTag);
    assert_eq!(expect_error("</p>"), ParseErrorCode::StrayEndTag);
    assert_eq!(expect_error("<b><i>x</b></i>"), ParseErrorCode::MisnestedEndTag);
    assert_eq!(expect_error("<p>open"), ParseErrorCode::UnclosedElement);
    assert_eq!(expect_error("<br></br>"), ParseErrorCode::StrayEndTag);
}

#[test]
fn errors_report_position_and_tag() {
    let err = parse_fragment("<p>ok</p><div>unclosed").unwrap_err();
    assert_eq!(err.code, ParseErrorCode::UnclosedElement);
    assert_eq!(err.position, 9);
    assert_eq!(err.tag.as_deref(), Some("div"));
    assert_eq!(err.to_string(), "unclosed element at byte 9 (<div>)");
}

#[test]
fn void_elements_need_no_end_tag() {
    let dom = parse_fragment("a<br>b<img src=x/>c<br/>").unwrap();
    let names: Vec<_> = dom.children().iter().filter_map(Node::name).collect();
    assert_eq!(names, ["br", "img", "br"]);
}
