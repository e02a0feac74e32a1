//! Integration tests for tree construction.
//!
//! Trees are compared in the html5lib test format produced by
//! [`weft_dom::dump::test_format`].

use weft_dom::QuirksMode;
use weft_dom::dump::test_format;
use weft_html::{ParseErrorCode, ParseOutput, parse_html};

/// Helper to parse a string and dump the resulting tree
fn dump(html: &str) -> String {
    test_format(&parse_html(html).dom)
}

/// Join expected lines the way the dump writes them.
fn tree(lines: &[&str]) -> String {
    let mut out = String::new();
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

fn codes<D>(output: &ParseOutput<D>) -> Vec<ParseErrorCode> {
    output.errors.iter().map(|e| e.code).collect()
}

#[test]
fn test_minimal_document() {
    let output = parse_html("<!DOCTYPE html><title>T</title><p>Hi");
    assert_eq!(
        test_format(&output.dom),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|     <title>",
            "|       \"T\"",
            "|   <body>",
            "|     <p>",
            "|       \"Hi\"",
        ])
    );
    assert!(output.errors.is_empty(), "{:?}", output.errors);
    assert_eq!(output.quirks_mode, QuirksMode::NoQuirks);
}

#[test]
fn test_empty_input_still_builds_a_skeleton() {
    assert_eq!(
        dump(""),
        tree(&["| <html>", "|   <head>", "|   <body>"])
    );
}

#[test]
fn test_missing_doctype_is_quirks() {
    let output = parse_html("<p>x");
    assert_eq!(output.quirks_mode, QuirksMode::Quirks);
    assert_eq!(codes(&output)[0], ParseErrorCode::ExpectedDoctypeButGotStartTag);
}

#[test]
fn test_end_tag_before_doctype() {
    let output = parse_html("</br>");
    assert_eq!(output.quirks_mode, QuirksMode::Quirks);
    assert_eq!(codes(&output)[0], ParseErrorCode::ExpectedDoctypeButGotEndTag);
    assert_eq!(output.errors[0].message, "Expected DOCTYPE but got end tag 'br'");
    assert_eq!(
        test_format(&output.dom),
        tree(&["| <html>", "|   <head>", "|   <body>", "|     <br>"])
    );
}

#[test]
fn test_legacy_doctypes_select_document_mode() {
    let transitional = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN">"#;
    assert_eq!(parse_html(transitional).quirks_mode, QuirksMode::Quirks);

    let with_system = r#"<!DOCTYPE HTML PUBLIC "-//W3C//DTD HTML 4.01 Transitional//EN" "http://www.w3.org/TR/html4/loose.dtd">"#;
    assert_eq!(parse_html(with_system).quirks_mode, QuirksMode::LimitedQuirks);

    let xhtml = r#"<!DOCTYPE html PUBLIC "-//W3C//DTD XHTML 1.0 Transitional//EN" "http://www.w3.org/TR/xhtml1/DTD/xhtml1-transitional.dtd">"#;
    assert_eq!(parse_html(xhtml).quirks_mode, QuirksMode::LimitedQuirks);
}

#[test]
fn test_doctype_system_identifier_after_public_keyword() {
    let output = parse_html(
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#,
    );
    assert_eq!(
        test_format(&output.dom).lines().next(),
        Some(
            r#"| <!DOCTYPE html "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#
        )
    );
    assert_eq!(output.quirks_mode, QuirksMode::NoQuirks);
}

#[test]
fn test_p_start_tag_closes_open_p() {
    let output = parse_html("<p>1<p>2");
    assert_eq!(
        test_format(&output.dom),
        tree(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <p>",
            "|       \"1\"",
            "|     <p>",
            "|       \"2\"",
        ])
    );
    let unexpected = codes(&output)
        .into_iter()
        .filter(|c| *c == ParseErrorCode::UnexpectedStartTag)
        .count();
    assert_eq!(unexpected, 1);
}

#[test]
fn test_stray_p_end_tag_creates_empty_p() {
    let output = parse_html("<!DOCTYPE html><body></p>");
    assert_eq!(
        test_format(&output.dom),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <p>",
        ])
    );
    assert_eq!(codes(&output), vec![ParseErrorCode::UnexpectedEndTag]);
}

#[test]
fn test_list_items_close_each_other() {
    assert_eq!(
        dump("<ul><li>a<li>b</ul>"),
        tree(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <ul>",
            "|       <li>",
            "|         \"a\"",
            "|       <li>",
            "|         \"b\"",
        ])
    );
}

#[test]
fn test_adoption_agency_moves_formatting_into_block() {
    assert_eq!(
        dump("<b><p>foo</b>bar"),
        tree(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <b>",
            "|     <p>",
            "|       <b>",
            "|         \"foo\"",
            "|       \"bar\"",
        ])
    );
}

#[test]
fn test_formatting_elements_are_reconstructed() {
    assert_eq!(
        dump("<p><b>x</p>y"),
        tree(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <p>",
            "|       <b>",
            "|         \"x\"",
            "|     <b>",
            "|       \"y\"",
        ])
    );
}

#[test]
fn test_table_sections_are_implied() {
    assert_eq!(
        dump("<table><tr><td>1</td></tr></table>"),
        tree(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <table>",
            "|       <tbody>",
            "|         <tr>",
            "|           <td>",
            "|             \"1\"",
        ])
    );
}

#[test]
fn test_misplaced_formatting_in_table_is_foster_parented() {
    let output = parse_html("<table><b>bold</b></table>");
    assert_eq!(
        test_format(&output.dom),
        tree(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <b>",
            "|       \"bold\"",
            "|     <table>",
        ])
    );
    assert!(codes(&output).contains(&ParseErrorCode::FosteredStartTag));
}

#[test]
fn test_table_text_with_content_is_foster_parented() {
    let output = parse_html("<!DOCTYPE html><table> x<tr></tr></table>");
    assert_eq!(
        test_format(&output.dom),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     \" x\"",
            "|     <table>",
            "|       <tbody>",
            "|         <tr>",
        ])
    );
    assert!(codes(&output).contains(&ParseErrorCode::FosteredCharacters));
}

#[test]
fn test_text_kept_inside_fostered_element_is_not_reported_as_fostered() {
    let output = parse_html(r#"<a href="1">x<table><a href="2">y</a></table>"#);
    assert_eq!(
        test_format(&output.dom),
        tree(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <a>",
            "|       href=\"1\"",
            "|       \"x\"",
            "|       <a>",
            "|         href=\"2\"",
            "|         \"y\"",
            "|       <table>",
        ])
    );
    let codes = codes(&output);
    assert!(codes.contains(&ParseErrorCode::FosteredStartTag));
    assert!(codes.contains(&ParseErrorCode::UnexpectedCharacters));
    assert!(codes.contains(&ParseErrorCode::UnexpectedEndTag));
    assert!(!codes.contains(&ParseErrorCode::FosteredCharacters));
    assert!(!codes.contains(&ParseErrorCode::FosteredEndTag));
}

#[test]
fn test_table_whitespace_stays_in_table() {
    assert_eq!(
        dump("<!DOCTYPE html><table> <tr></tr></table>"),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <table>",
            "|       \" \"",
            "|       <tbody>",
            "|         <tr>",
        ])
    );
}

#[test]
fn test_form_end_tag_without_template_resets_pointer() {
    assert_eq!(
        dump("<form><div></form><form>"),
        tree(&[
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <form>",
            "|       <div>",
            "|         <form>",
        ])
    );
}

#[test]
fn test_nested_form_is_ignored() {
    let output = parse_html("<!DOCTYPE html><form><form>");
    assert_eq!(
        test_format(&output.dom),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <form>",
        ])
    );
    assert_eq!(
        codes(&output),
        vec![
            ParseErrorCode::UnexpectedStartTag,
            ParseErrorCode::ExpectedClosingTagButGotEof
        ]
    );
}

#[test]
fn test_null_is_dropped_in_body() {
    assert_eq!(
        dump("<!DOCTYPE html>a\0b"),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     \"ab\"",
        ])
    );
}

#[test]
fn test_title_is_rcdata() {
    assert_eq!(
        dump("<!DOCTYPE html><title>a<b>&amp;</title>"),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|     <title>",
            "|       \"a<b>&\"",
            "|   <body>",
        ])
    );
}

#[test]
fn test_textarea_drops_leading_newline() {
    assert_eq!(
        dump("<!DOCTYPE html><textarea>\nx</textarea>"),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <textarea>",
            "|       \"x\"",
        ])
    );
}

#[test]
fn test_script_content_is_text() {
    assert_eq!(
        dump("<!DOCTYPE html><script>if (a < b) {}</script>"),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|     <script>",
            "|       \"if (a < b) {}\"",
            "|   <body>",
        ])
    );
}

#[test]
fn test_comment_after_html_goes_to_document() {
    assert_eq!(
        dump("<!DOCTYPE html><html></html><!--c-->"),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "| <!-- c -->",
        ])
    );
}

#[test]
fn test_frameset_replaces_body() {
    assert_eq!(
        dump("<!DOCTYPE html><frameset><frame></frameset>"),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <frameset>",
            "|     <frame>",
        ])
    );
}

#[test]
fn test_select_options_close_each_other() {
    assert_eq!(
        dump("<!DOCTYPE html><select><option>a<option>b</select>"),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <select>",
            "|       <option>",
            "|         \"a\"",
            "|       <option>",
            "|         \"b\"",
        ])
    );
}

#[test]
fn test_select_start_tag_closes_open_select() {
    let output = parse_html("<!DOCTYPE html><select><option>a<select>b");
    assert_eq!(
        test_format(&output.dom),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <select>",
            "|       <option>",
            "|         \"a\"",
            "|     \"b\"",
        ])
    );
    assert_eq!(codes(&output), vec![ParseErrorCode::UnexpectedStartTag]);
}

#[test]
fn test_caption_end_tag_returns_to_table() {
    let output = parse_html("<!DOCTYPE html><table><caption>x</caption><tr><td>y</table>");
    assert_eq!(
        test_format(&output.dom),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <table>",
            "|       <caption>",
            "|         \"x\"",
            "|       <tbody>",
            "|         <tr>",
            "|           <td>",
            "|             \"y\"",
        ])
    );
    assert!(output.errors.is_empty(), "{:?}", output.errors);
}

#[test]
fn test_template_contents_hold_table_parts() {
    assert_eq!(
        dump("<!DOCTYPE html><template><td>x</td></template>"),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|     <template>",
            "|       content",
            "|         <td>",
            "|           \"x\"",
            "|   <body>",
        ])
    );
}

#[test]
fn test_svg_names_are_adjusted() {
    assert_eq!(
        dump(r#"<!DOCTYPE html><svg viewbox="0 0 1 1"><foreignobject><p>hi</p></foreignobject></svg>"#),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <svg svg>",
            "|       viewBox=\"0 0 1 1\"",
            "|       <svg foreignObject>",
            "|         <p>",
            "|           \"hi\"",
        ])
    );
}

#[test]
fn test_mathml_elements_keep_their_namespace() {
    assert_eq!(
        dump("<!DOCTYPE html><math><mi>x</mi></math>"),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <math math>",
            "|       <math mi>",
            "|         \"x\"",
        ])
    );
}

#[test]
fn test_html_element_breaks_out_of_foreign_content() {
    let output = parse_html("<!DOCTYPE html><svg><p>x");
    assert_eq!(
        test_format(&output.dom),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <svg svg>",
            "|     <p>",
            "|       \"x\"",
        ])
    );
    assert!(codes(&output).contains(&ParseErrorCode::UnexpectedHtmlElementInForeignContent));
}

#[test]
fn test_cdata_in_svg_is_text() {
    assert_eq!(
        dump("<!DOCTYPE html><svg><![CDATA[a<b]]></svg>"),
        tree(&[
            "| <!DOCTYPE html>",
            "| <html>",
            "|   <head>",
            "|   <body>",
            "|     <svg svg>",
            "|       \"a<b\"",
        ])
    );
}

#[test]
fn test_unclosed_element_at_eof_is_reported() {
    let output = parse_html("<!DOCTYPE html><div>");
    assert_eq!(
        codes(&output),
        vec![ParseErrorCode::ExpectedClosingTagButGotEof]
    );
}

#[test]
fn test_errors_display_kebab_case() {
    assert_eq!(
        ParseErrorCode::ExpectedDoctypeButGotStartTag.to_string(),
        "expected-doctype-but-got-start-tag"
    );
    assert_eq!(
        ParseErrorCode::ExpectedDoctypeButGotEndTag.to_string(),
        "expected-doctype-but-got-end-tag"
    );
}
