//! Integration tests for the HTML tokenizer.

use quickcheck_macros::quickcheck;
use weft_html::encoding::InputStream;
use weft_html::tokenizer::{Doctype, Tag};
use weft_html::{HTMLTokenizer, ParseError, ParseErrorCode, ParserOptions, Token, TokenizerState};

/// Helper to tokenize a string and return the tokens
fn tokenize(input: &str) -> Vec<Token> {
    HTMLTokenizer::from_text(input).collect()
}

/// Helper to tokenize a string and return the tokens and the errors
fn tokenize_with_errors(input: &str) -> (Vec<Token>, Vec<ParseError>) {
    let mut tokenizer = HTMLTokenizer::from_text(input);
    let tokens = tokenizer.by_ref().collect();
    (tokens, tokenizer.take_errors())
}

fn codes(errors: &[ParseError]) -> Vec<ParseErrorCode> {
    errors.iter().map(|e| e.code).collect()
}

fn start_tag(token: &Token) -> &Tag {
    match token {
        Token::StartTag(tag) => tag,
        other => panic!("expected a start tag, got {other}"),
    }
}

fn doctype(token: &Token) -> &Doctype {
    match token {
        Token::Doctype(doctype) => doctype,
        other => panic!("expected a DOCTYPE, got {other}"),
    }
}

#[test]
fn test_plain_text_is_one_run() {
    let tokens = tokenize("Hello");
    assert_eq!(
        tokens,
        vec![
            Token::Character {
                data: "Hello".to_string()
            },
            Token::EndOfFile
        ]
    );
}

#[test]
fn test_runs_never_mix_classes() {
    let tokens = tokenize("a b\0c");
    assert_eq!(
        tokens,
        vec![
            Token::Character {
                data: "a".to_string()
            },
            Token::Whitespace {
                data: " ".to_string()
            },
            Token::Character {
                data: "b".to_string()
            },
            Token::NullCharacter {
                data: "\0".to_string()
            },
            Token::Character {
                data: "c".to_string()
            },
            Token::EndOfFile
        ]
    );
}

#[test]
fn test_doctype() {
    let tokens = tokenize("<!DOCTYPE html>");
    assert_eq!(tokens.len(), 2);
    let doctype = doctype(&tokens[0]);
    assert_eq!(doctype.name.as_deref(), Some("html"));
    assert!(doctype.public_identifier.is_none());
    assert!(doctype.system_identifier.is_none());
    assert!(!doctype.force_quirks);
}

#[test]
fn test_doctype_name_is_lowercased() {
    let tokens = tokenize("<!doctype HTML>");
    assert_eq!(doctype(&tokens[0]).name.as_deref(), Some("html"));
}

#[test]
fn test_doctype_system_identifier_after_public_keyword() {
    let (tokens, errors) = tokenize_with_errors(
        r#"<!DOCTYPE html PUBLIC "-//W3C//DTD HTML 4.01//EN" "http://www.w3.org/TR/html4/strict.dtd">"#,
    );
    let doctype = doctype(&tokens[0]);
    assert_eq!(
        doctype.public_identifier.as_deref(),
        Some("-//W3C//DTD HTML 4.01//EN")
    );
    assert_eq!(
        doctype.system_identifier.as_deref(),
        Some("http://www.w3.org/TR/html4/strict.dtd")
    );
    assert!(!doctype.force_quirks);
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn test_doctype_without_name_forces_quirks() {
    let (tokens, errors) = tokenize_with_errors("<!DOCTYPE>");
    let doctype = doctype(&tokens[0]);
    assert!(doctype.name.is_none());
    assert!(doctype.force_quirks);
    assert_eq!(codes(&errors), vec![ParseErrorCode::MissingDoctypeName]);
}

#[test]
fn test_start_tag_with_attributes() {
    let tokens = tokenize(r#"<div class="a" id='b' data-x=c hidden>"#);
    let tag = start_tag(&tokens[0]);
    assert_eq!(tag.name, "div");
    assert!(!tag.self_closing);
    let pairs: Vec<(&str, &str)> = tag
        .attributes
        .iter()
        .map(|a| (a.name.as_str(), a.value.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![("class", "a"), ("id", "b"), ("data-x", "c"), ("hidden", "")]
    );
}

#[test]
fn test_tag_and_attribute_names_are_lowercased() {
    let tokens = tokenize("<DiV CLASS=x>");
    let tag = start_tag(&tokens[0]);
    assert_eq!(tag.name, "div");
    assert_eq!(tag.attribute("class"), Some("x"));
}

#[test]
fn test_duplicate_attribute_keeps_first() {
    let (tokens, errors) = tokenize_with_errors("<a href=1 href=2>");
    let tag = start_tag(&tokens[0]);
    assert_eq!(tag.attributes.len(), 1);
    assert_eq!(tag.attribute("href"), Some("1"));
    assert_eq!(codes(&errors), vec![ParseErrorCode::DuplicateAttribute]);
}

#[test]
fn test_self_closing_tag() {
    let tokens = tokenize("<br/>");
    assert!(start_tag(&tokens[0]).self_closing);
}

#[test]
fn test_end_tag() {
    let tokens = tokenize("</div>");
    assert_eq!(tokens.len(), 2);
    assert!(tokens[0].is_end_tag("div"));
}

#[test]
fn test_comment() {
    let tokens = tokenize("<!-- hi -->");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: " hi ".to_string()
        }
    );
}

#[test]
fn test_abrupt_empty_comment() {
    let (tokens, errors) = tokenize_with_errors("<!-->");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: String::new()
        }
    );
    assert_eq!(codes(&errors), vec![ParseErrorCode::AbruptClosingOfEmptyComment]);
}

#[test]
fn test_bogus_comment_from_question_mark() {
    let (tokens, errors) = tokenize_with_errors("<?xml version?>");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: "?xml version?".to_string()
        }
    );
    assert_eq!(
        codes(&errors),
        vec![ParseErrorCode::UnexpectedQuestionMarkInsteadOfTagName]
    );
}

#[test]
fn test_eof_in_tag_drops_the_tag() {
    let (tokens, errors) = tokenize_with_errors("<div class=");
    assert_eq!(tokens, vec![Token::EndOfFile]);
    assert_eq!(codes(&errors), vec![ParseErrorCode::EofInTag]);
}

#[test]
fn test_lone_less_than_is_text() {
    let (tokens, errors) = tokenize_with_errors("a < b");
    let text: String = tokens.iter().filter_map(Token::character_data).collect();
    assert_eq!(text, "a < b");
    assert_eq!(
        codes(&errors),
        vec![ParseErrorCode::InvalidFirstCharacterOfTagName]
    );
}

#[test]
fn test_rcdata_only_ends_at_appropriate_end_tag() {
    let mut tokenizer = HTMLTokenizer::from_text("a</b></title>");
    tokenizer.set_state(TokenizerState::RCDATA);
    tokenizer.set_last_start_tag(Some("title"));
    let tokens: Vec<Token> = tokenizer.collect();
    let text: String = tokens.iter().filter_map(Token::character_data).collect();
    assert_eq!(text, "a</b>");
    assert!(tokens.iter().any(|t| t.is_end_tag("title")));
}

#[test]
fn test_rawtext_keeps_markup_literal() {
    let mut tokenizer = HTMLTokenizer::from_text("<b>&amp;</style>");
    tokenizer.set_state(TokenizerState::RAWTEXT);
    tokenizer.set_last_start_tag(Some("style"));
    let tokens: Vec<Token> = tokenizer.collect();
    let text: String = tokens.iter().filter_map(Token::character_data).collect();
    assert_eq!(text, "<b>&amp;");
}

#[test]
fn test_null_in_rcdata_is_replaced_and_reported() {
    let mut tokenizer = HTMLTokenizer::from_text("a\0b");
    tokenizer.set_state(TokenizerState::RCDATA);
    tokenizer.set_last_start_tag(Some("textarea"));
    let tokens: Vec<Token> = tokenizer.by_ref().collect();
    let text: String = tokens.iter().filter_map(Token::character_data).collect();
    assert_eq!(text, "a\u{FFFD}b");
    assert_eq!(
        codes(&tokenizer.take_errors()),
        vec![ParseErrorCode::UnexpectedNullCharacter]
    );
}

#[test]
fn test_script_data_double_escape() {
    let mut tokenizer = HTMLTokenizer::from_text("<!--<script></script>--></script>");
    tokenizer.set_state(TokenizerState::ScriptData);
    tokenizer.set_last_start_tag(Some("script"));
    let tokens: Vec<Token> = tokenizer.collect();
    let text: String = tokens.iter().filter_map(Token::character_data).collect();
    assert_eq!(text, "<!--<script></script>-->");
    assert!(tokens.iter().any(|t| t.is_end_tag("script")));
}

#[test]
fn test_cdata_only_in_foreign_content() {
    let (tokens, errors) = tokenize_with_errors("<![CDATA[x]]>");
    assert_eq!(
        tokens[0],
        Token::Comment {
            data: "[CDATA[x]]".to_string()
        }
    );
    assert_eq!(codes(&errors), vec![ParseErrorCode::CdataInHtmlContent]);

    let mut tokenizer = HTMLTokenizer::from_text("<![CDATA[x<y]]>");
    tokenizer.set_cdata_allowed(true);
    let tokens: Vec<Token> = tokenizer.collect();
    let text: String = tokens.iter().filter_map(Token::character_data).collect();
    assert_eq!(text, "x<y");
}

#[test]
fn test_named_reference_in_text() {
    let tokens = tokenize("&notin;");
    assert_eq!(
        tokens[0],
        Token::Character {
            data: "\u{2209}".to_string()
        }
    );
}

#[test]
fn test_legacy_reference_without_semicolon_in_text() {
    let (tokens, errors) = tokenize_with_errors("&notit;");
    let text: String = tokens.iter().filter_map(Token::character_data).collect();
    assert_eq!(text, "\u{AC}it;");
    assert_eq!(
        codes(&errors),
        vec![ParseErrorCode::MissingSemicolonAfterCharacterReference]
    );
}

#[test]
fn test_legacy_reference_stays_literal_in_attribute() {
    let (tokens, errors) = tokenize_with_errors(r#"<a href="?x&notit">"#);
    assert_eq!(start_tag(&tokens[0]).attribute("href"), Some("?x&notit"));
    assert!(errors.is_empty(), "{errors:?}");
}

#[test]
fn test_unknown_reference_with_semicolon() {
    let (tokens, errors) = tokenize_with_errors("&bogus;");
    let text: String = tokens.iter().filter_map(Token::character_data).collect();
    assert_eq!(text, "&bogus;");
    assert_eq!(
        codes(&errors),
        vec![ParseErrorCode::UnknownNamedCharacterReference]
    );
}

#[test]
fn test_numeric_references() {
    let (tokens, errors) = tokenize_with_errors("&#65;&#x42;&#128;&#0;");
    let text: String = tokens.iter().filter_map(Token::character_data).collect();
    assert_eq!(text, "AB\u{20AC}\u{FFFD}");
    assert_eq!(
        codes(&errors),
        vec![
            ParseErrorCode::ControlCharacterReference,
            ParseErrorCode::NullCharacterReference
        ]
    );
}

#[test]
fn test_crlf_is_normalized() {
    let tokens = tokenize("a\r\nb\rc");
    let text: String = tokens.iter().filter_map(Token::character_data).collect();
    assert_eq!(text, "a\nb\nc");
}

#[test]
fn test_errors_carry_positions() {
    let (_, errors) = tokenize_with_errors("\n\n  </>");
    assert_eq!(codes(&errors), vec![ParseErrorCode::MissingEndTagName]);
    assert_eq!(errors[0].line, 3);
}

#[test]
fn test_token_display() {
    let tokens = tokenize(r#"<!DOCTYPE html><p id="x"/>hi</p><!--c-->"#);
    let shown: Vec<String> = tokens.iter().map(ToString::to_string).collect();
    assert_eq!(
        shown,
        vec![
            "DOCTYPE html",
            "<p id=\"x\" />",
            "Character(\"hi\")",
            "</p>",
            "<!--c-->",
            "EOF"
        ]
    );
}

#[test]
fn test_bytes_decode_through_the_input_stream() {
    let input = InputStream::new(b"<p>caf\xE9", None, None, &ParserOptions::default());
    let tokens: Vec<Token> = HTMLTokenizer::new(input).collect();
    let text: String = tokens.iter().filter_map(Token::character_data).collect();
    assert_eq!(text, "caf\u{E9}");
}

/// For any input, exactly one end-of-file token comes out, last.
#[quickcheck]
fn prop_exactly_one_eof_at_the_end(bytes: Vec<u8>) -> bool {
    let input = InputStream::new(&bytes, None, None, &ParserOptions::default());
    let mut tokenizer = HTMLTokenizer::new(input);
    let tokens: Vec<Token> = tokenizer.by_ref().collect();
    let eofs = tokens.iter().filter(|t| t.is_eof()).count();
    eofs == 1 && tokens.last().is_some_and(Token::is_eof) && tokenizer.next().is_none()
}

/// Runs never mix character classes, whatever the text.
#[quickcheck]
fn prop_character_runs_are_homogeneous(text: String) -> bool {
    tokenize(&text).iter().all(|token| match token {
        Token::Whitespace { data } => data.chars().all(|c| matches!(c, '\t' | '\n' | '\x0C' | ' ')),
        Token::NullCharacter { data } => data.chars().all(|c| c == '\0'),
        Token::Character { data } => {
            !data.is_empty() && data.chars().all(|c| !matches!(c, '\t' | '\n' | '\x0C' | ' ' | '\0'))
        }
        _ => true,
    })
}
