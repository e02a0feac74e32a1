//! Tests for named character reference lookup and decoding.

use weft_html::tokenizer::named_character_references::{
    LONGEST_NAME_LENGTH, any_entity_has_prefix, c1_replacement, lookup_entity,
};
use weft_html::{HTMLTokenizer, ParseError, ParseErrorCode, Token};

fn text_and_errors(input: &str) -> (String, Vec<ParseErrorCode>) {
    let mut tokenizer = HTMLTokenizer::from_text(input);
    let text: String = tokenizer
        .by_ref()
        .filter_map(|t| t.character_data().map(str::to_string))
        .collect();
    let errors: Vec<ParseError> = tokenizer.take_errors();
    (text, errors.into_iter().map(|e| e.code).collect())
}

fn first_attribute(input: &str) -> (String, Vec<ParseErrorCode>) {
    let mut tokenizer = HTMLTokenizer::from_text(input);
    let value = match tokenizer.next() {
        Some(Token::StartTag(tag)) => tag.attributes[0].value.clone(),
        other => panic!("expected a start tag, got {other:?}"),
    };
    let _ = tokenizer.by_ref().count();
    let codes = tokenizer.take_errors().into_iter().map(|e| e.code).collect();
    (value, codes)
}

#[test]
fn test_lookup_single_code_point() {
    let amp = lookup_entity("amp;").expect("amp; exists");
    assert_eq!(amp.first, '&');
    assert_eq!(amp.second, None);
}

#[test]
fn test_lookup_two_code_points() {
    let entity = lookup_entity("NotEqualTilde;").expect("NotEqualTilde; exists");
    assert_eq!(entity.first, '\u{2242}');
    assert_eq!(entity.second, Some('\u{338}'));

    let mut out = String::new();
    entity.push_to(&mut out);
    assert_eq!(out, "\u{2242}\u{338}");
}

#[test]
fn test_names_are_case_sensitive() {
    assert!(lookup_entity("AMP;").is_some());
    assert!(lookup_entity("aMp;").is_none());
}

#[test]
fn test_prefix_queries() {
    assert!(any_entity_has_prefix("Counter"));
    assert!(any_entity_has_prefix("CounterClockwiseContourIntegral"));
    assert!(!any_entity_has_prefix("zzz"));
    assert_eq!("CounterClockwiseContourIntegral;".len(), LONGEST_NAME_LENGTH);
}

#[test]
fn test_c1_replacements() {
    assert_eq!(c1_replacement(0x80), Some('\u{20AC}'));
    assert_eq!(c1_replacement(0x9F), Some('\u{178}'));
    assert_eq!(c1_replacement(0x81), None);
    assert_eq!(c1_replacement(0x41), None);
}

#[test]
fn test_longest_match_wins_in_text() {
    let (text, errors) = text_and_errors("&notin;&not;&noti");
    assert_eq!(text, "\u{2209}\u{AC}\u{AC}i");
    assert_eq!(
        errors,
        vec![ParseErrorCode::MissingSemicolonAfterCharacterReference]
    );
}

#[test]
fn test_two_code_point_reference_in_text() {
    let (text, errors) = text_and_errors("a&NotEqualTilde;b");
    assert_eq!(text, "a\u{2242}\u{338}b");
    assert!(errors.is_empty());
}

#[test]
fn test_ambiguous_ampersand_in_text() {
    let (text, errors) = text_and_errors("&xyz; & &");
    assert_eq!(text, "&xyz; & &");
    assert_eq!(
        errors,
        vec![ParseErrorCode::UnknownNamedCharacterReference]
    );
}

#[test]
fn test_legacy_reference_in_attribute_before_quote_decodes() {
    let (value, errors) = first_attribute(r#"<a title="x&amp">"#);
    assert_eq!(value, "x&");
    assert_eq!(
        errors,
        vec![ParseErrorCode::MissingSemicolonAfterCharacterReference]
    );
}

#[test]
fn test_legacy_reference_in_attribute_before_equals_stays() {
    let (value, errors) = first_attribute(r#"<a href="?a=1&amp=2">"#);
    assert_eq!(value, "?a=1&amp=2");
    assert!(errors.is_empty());
}

#[test]
fn test_terminated_reference_in_attribute() {
    let (value, errors) = first_attribute("<a title=&lt;b&gt;>");
    assert_eq!(value, "<b>");
    assert!(errors.is_empty());
}
