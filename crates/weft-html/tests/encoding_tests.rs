//! Integration tests for encoding detection and the input stream.

use quickcheck_macros::quickcheck;
use weft_html::encoding::EncodingSource;
use weft_html::{Confidence, InputStream, ParseFailure, ParserOptions, parse_document};

fn body_text(bytes: &[u8], declared: Option<&str>) -> String {
    let output = parse_document(bytes, declared, &ParserOptions::default())
        .expect("default options are valid");
    let body = output.dom.body().expect("every document gets a body");
    output.dom.text_content(body)
}

#[test]
fn test_bom_overrides_declared_charset() {
    let bytes = b"\xEF\xBB\xBF<!DOCTYPE html><p>caf\xC3\xA9";
    let output = parse_document(bytes, Some("text/html; charset=iso-8859-2"), &ParserOptions::default())
        .expect("default options are valid");
    assert_eq!(output.encoding, encoding_rs::UTF_8);
    assert_eq!(output.confidence, Confidence::Certain);
    assert_eq!(body_text(bytes, Some("iso-8859-2")), "caf\u{E9}");
}

#[test]
fn test_transport_charset_is_certain() {
    let bytes = b"<!DOCTYPE html><p>\xE9";
    let output = parse_document(bytes, Some("text/html; charset=ISO-8859-5"), &ParserOptions::default())
        .expect("default options are valid");
    assert_eq!(output.encoding, encoding_rs::ISO_8859_5);
    assert_eq!(output.confidence, Confidence::Certain);
    assert_eq!(
        body_text(bytes, Some("text/html; charset=ISO-8859-5")),
        "\u{449}"
    );
}

#[test]
fn test_fallback_is_windows_1252() {
    let bytes = b"<!DOCTYPE html><p>caf\xE9";
    let output = parse_document(bytes, None, &ParserOptions::default())
        .expect("default options are valid");
    assert_eq!(output.encoding, encoding_rs::WINDOWS_1252);
    assert_eq!(body_text(bytes, None), "caf\u{E9}");
}

#[test]
fn test_prescan_finds_meta_charset() {
    let bytes = b"<!DOCTYPE html><meta charset=\"utf-8\"><p>caf\xC3\xA9";
    let output = parse_document(bytes, None, &ParserOptions::default())
        .expect("default options are valid");
    assert_eq!(output.encoding, encoding_rs::UTF_8);
    assert_eq!(body_text(bytes, None), "caf\u{E9}");
}

#[test]
fn test_prescan_source_is_recorded() {
    let stream = InputStream::new(
        b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=koi8-r\">",
        None,
        None,
        &ParserOptions::default(),
    );
    assert_eq!(stream.encoding(), encoding_rs::KOI8_R);
    assert_eq!(stream.confidence(), Confidence::Tentative);
    assert_eq!(stream.encoding_source(), EncodingSource::Prescan);
}

#[test]
fn test_late_meta_restarts_with_new_encoding() {
    let mut bytes = b"<!DOCTYPE html><title>\xE9</title>".to_vec();
    bytes.extend_from_slice(b"<meta charset=\"iso-8859-5\"><p>\xE9");
    let options = ParserOptions {
        encoding_prescan_bytes: 16,
        ..ParserOptions::default()
    };
    let output = parse_document(&bytes, None, &options).expect("the second pass settles");
    assert_eq!(output.encoding, encoding_rs::ISO_8859_5);
    assert_eq!(output.confidence, Confidence::Certain);
    let body = output.dom.body().expect("body");
    assert_eq!(output.dom.text_content(body), "\u{449}");
}

#[test]
fn test_text_input_ignores_meta_charset() {
    let output = weft_html::parse_html("<meta charset=\"iso-8859-5\"><p>\u{E9}");
    assert_eq!(output.encoding, encoding_rs::UTF_8);
    assert_eq!(output.confidence, Confidence::Irrelevant);
}

#[test]
fn test_unknown_fallback_is_a_config_error() {
    let options = ParserOptions {
        encoding_fallback: "klingon".to_string(),
        ..ParserOptions::default()
    };
    assert!(matches!(
        parse_document(b"<p>", None, &options),
        Err(ParseFailure::InvalidConfig(_))
    ));
}

#[test]
fn test_options_from_json() {
    let options: ParserOptions =
        serde_json::from_str(r#"{ "scripting": true, "encodingPrescanBytes": 512 }"#)
            .expect("valid options");
    assert!(options.scripting);
    assert_eq!(options.encoding_prescan_bytes, 512);
    assert_eq!(options.encoding_fallback, "windows-1252");

    let unknown = serde_json::from_str::<ParserOptions>(r#"{ "scripted": true }"#);
    assert!(unknown.is_err());
}

/// Pushing characters back and reading them again yields the same
/// characters and the same position.
#[quickcheck]
fn prop_unconsume_round_trips(text: String, take: u8) -> bool {
    let mut stream = InputStream::from_text(&text);
    let take = usize::from(take);
    let before = stream.position();
    let first: Vec<char> = std::iter::from_fn(|| stream.consume()).take(take).collect();
    let after = stream.position();
    stream.unconsume(first.len());
    if stream.position() != before {
        return false;
    }
    let second: Vec<char> = std::iter::from_fn(|| stream.consume()).take(take).collect();
    first == second && stream.position() == after
}

/// Newline normalization leaves no carriage return behind.
#[quickcheck]
fn prop_no_carriage_returns_survive(text: String) -> bool {
    let mut stream = InputStream::from_text(&text);
    std::iter::from_fn(|| stream.consume()).all(|c| c != '\r')
}
