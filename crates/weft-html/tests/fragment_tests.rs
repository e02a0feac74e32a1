//! Integration tests for fragment parsing.

use weft_dom::dump::test_format_nodes;
use weft_dom::{DomTree, Namespace, QuirksMode};
use weft_html::{ParseErrorCode, ParseFailure, ParserOptions, parse_fragment, parse_fragment_with};

/// Helper to parse `html` in a detached context element and dump the result
fn dump_fragment(context: &str, namespace: Namespace, html: &str) -> String {
    let (dom, output) = parse_fragment(context, namespace, html, &ParserOptions::default())
        .expect("context name is valid");
    test_format_nodes(&dom, &output.nodes)
}

fn tree(lines: &[&str]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

#[test]
fn test_div_context() {
    assert_eq!(
        dump_fragment("div", Namespace::Html, "<p>a</p>b"),
        tree(&["| <p>", "|   \"a\"", "| \"b\""])
    );
}

#[test]
fn test_fragment_has_no_implied_html_head_or_body() {
    let (_, output) =
        parse_fragment("div", Namespace::Html, "x", &ParserOptions::default()).expect("valid");
    assert_eq!(output.nodes.len(), 1);
    assert!(output.errors.is_empty(), "{:?}", output.errors);
}

#[test]
fn test_row_context_starts_in_row() {
    assert_eq!(
        dump_fragment("tr", Namespace::Html, "<td>x"),
        tree(&["| <td>", "|   \"x\""])
    );
}

#[test]
fn test_title_context_is_rcdata() {
    assert_eq!(
        dump_fragment("title", Namespace::Html, "<b>&amp;"),
        tree(&["| \"<b>&\""])
    );
}

#[test]
fn test_template_context_accepts_table_parts() {
    assert_eq!(
        dump_fragment("template", Namespace::Html, "<td>x"),
        tree(&["| <td>", "|   \"x\""])
    );
}

#[test]
fn test_svg_context_uses_foreign_rules() {
    assert_eq!(
        dump_fragment("svg", Namespace::Svg, "<circle/>"),
        tree(&["| <svg circle>"])
    );
}

#[test]
fn test_form_pointer_comes_from_context_ancestors() {
    let mut dom = DomTree::new();
    let form = dom.create_element(Namespace::Html, "form").expect("valid name");
    let div = dom.create_element(Namespace::Html, "div").expect("valid name");
    dom.append_child(form, div);

    let output = parse_fragment_with(
        &mut dom,
        div,
        "<form>x",
        QuirksMode::NoQuirks,
        &ParserOptions::default(),
    )
    .expect("default options are valid");
    assert_eq!(test_format_nodes(&dom, &output.nodes), tree(&["| \"x\""]));
    assert!(
        output
            .errors
            .iter()
            .any(|e| e.code == ParseErrorCode::UnexpectedStartTag)
    );
}

#[test]
fn test_invalid_context_name() {
    let result = parse_fragment("1div", Namespace::Html, "x", &ParserOptions::default());
    assert!(matches!(result, Err(ParseFailure::InvalidContext(_))));
}
