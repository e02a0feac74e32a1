//! The input byte stream and its decoding into characters.
//!
//! [§ 13.2.3 The input byte stream](https://html.spec.whatwg.org/multipage/parsing.html#the-input-byte-stream)
//!
//! [`InputStream`] picks an encoding, decodes, normalizes newlines, tracks
//! line and column, and reports the input-stream parse errors. Every other
//! parse error is reported through it too, so each error carries the position
//! of the character that caused it.

pub mod charset;
pub mod codec;

use encoding_rs::{Encoding, ISO_2022_JP, UTF_8, UTF_16BE, UTF_16LE};
use log::debug;

use crate::config::ParserOptions;
use crate::error::{ParseError, ParseErrorCode, Restart};

use codec::DecodedText;

/// [§ 13.2.3.1](https://html.spec.whatwg.org/multipage/parsing.html#concept-encoding-confidence)
///
/// "The confidence is either tentative, certain, or irrelevant."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confidence {
    /// The encoding was guessed and may still change.
    Tentative,
    /// The encoding is settled.
    Certain,
    /// The input was already characters.
    Irrelevant,
}

/// Where the chosen encoding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum EncodingSource {
    /// A byte order mark.
    ByteOrderMark,
    /// An explicit override (a restart, or the caller).
    Override,
    /// The transport layer (`Content-Type`).
    Transport,
    /// A `<meta>` found by the prescan.
    Prescan,
    /// The configured fallback.
    Fallback,
    /// The input was a string.
    Text,
}

/// Decoded, newline-normalized, position-tracking character stream.
#[derive(Debug)]
pub struct InputStream {
    bytes: Vec<u8>,
    /// Length of the byte order mark, skipped before decoding.
    bom_length: usize,
    text: DecodedText,
    encoding: &'static Encoding,
    confidence: Confidence,
    source: EncodingSource,
    /// 1-based line of the most recently consumed character.
    line: usize,
    /// Column of the most recently consumed character, in UTF-16 units.
    column: usize,
    /// Column at which each finished line ended, to undo newlines.
    line_end_columns: Vec<usize>,
    /// Character index up to which input-stream errors have been reported.
    checked_up_to: usize,
    errors: Vec<ParseError>,
}

const fn is_control(c: char) -> bool {
    matches!(c, '\u{1}'..='\u{8}' | '\u{B}' | '\u{E}'..='\u{1F}' | '\u{7F}'..='\u{9F}')
}

/// [Infra: noncharacter](https://infra.spec.whatwg.org/#noncharacter)
///
/// "A noncharacter is a code point that is in the range U+FDD0 to U+FDEF,
/// inclusive, or U+FFFE, U+FFFF, U+1FFFE, U+1FFFF, ..., U+10FFFE, or U+10FFFF."
#[must_use]
pub const fn is_noncharacter(code: u32) -> bool {
    matches!(code, 0xFDD0..=0xFDEF) || (code & 0xFFFE) == 0xFFFE
}

const fn utf16_width(c: char) -> usize {
    if (c as u32) > 0xFFFF { 2 } else { 1 }
}

impl InputStream {
    /// [§ 13.2.3.2 Determining the character encoding](https://html.spec.whatwg.org/multipage/parsing.html#determining-the-character-encoding)
    ///
    /// Decide on an encoding for `bytes` and decode them. Sources are
    /// consulted in order: BOM, `override_encoding`, the transport-declared
    /// `declared` value (a label or a full `Content-Type`), the `<meta>`
    /// prescan, and the configured fallback.
    #[must_use]
    pub fn new(
        bytes: &[u8],
        declared: Option<&str>,
        override_encoding: Option<&'static Encoding>,
        options: &ParserOptions,
    ) -> Self {
        let (encoding, confidence, source, bom_length) = if let Some((encoding, length)) =
            charset::from_bom(bytes)
        {
            (encoding, Confidence::Certain, EncodingSource::ByteOrderMark, length)
        } else if let Some(encoding) = override_encoding {
            (encoding, Confidence::Certain, EncodingSource::Override, 0)
        } else if let Some(encoding) = declared.and_then(charset::from_transport) {
            (encoding, Confidence::Certain, EncodingSource::Transport, 0)
        } else if let Some(encoding) = charset::from_prescan(bytes, options.encoding_prescan_bytes)
        {
            (encoding, Confidence::Tentative, EncodingSource::Prescan, 0)
        } else {
            (
                options.fallback_encoding(),
                Confidence::Tentative,
                EncodingSource::Fallback,
                0,
            )
        };
        debug!(
            "decoding {} bytes as {} ({source}, {confidence:?})",
            bytes.len(),
            encoding.name()
        );
        Self::from_parts(
            bytes.to_vec(),
            bom_length,
            DecodedText::decode(&bytes[bom_length..], encoding),
            encoding,
            confidence,
            source,
        )
    }

    /// A stream over text that is already Unicode. The confidence is
    /// irrelevant, so `<meta charset>` has no effect.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::from_parts(
            text.as_bytes().to_vec(),
            0,
            DecodedText::from_text(text),
            UTF_8,
            Confidence::Irrelevant,
            EncodingSource::Text,
        )
    }

    const fn from_parts(
        bytes: Vec<u8>,
        bom_length: usize,
        text: DecodedText,
        encoding: &'static Encoding,
        confidence: Confidence,
        source: EncodingSource,
    ) -> Self {
        Self {
            bytes,
            bom_length,
            text,
            encoding,
            confidence,
            source,
            line: 1,
            column: 0,
            line_end_columns: Vec::new(),
            checked_up_to: 0,
            errors: Vec::new(),
        }
    }

    /// The encoding currently used to decode.
    #[must_use]
    pub const fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// How sure we are about [`Self::encoding`].
    #[must_use]
    pub const fn confidence(&self) -> Confidence {
        self.confidence
    }

    /// Where [`Self::encoding`] came from.
    #[must_use]
    pub const fn encoding_source(&self) -> EncodingSource {
        self.source
    }

    /// Line and column of the most recently consumed character.
    #[must_use]
    pub const fn position(&self) -> (usize, usize) {
        (self.line, self.column)
    }

    /// Errors reported so far.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// Take the errors reported so far.
    pub fn take_errors(&mut self) -> Vec<ParseError> {
        std::mem::take(&mut self.errors)
    }

    /// True when every character has been consumed.
    #[must_use]
    pub fn is_at_eof(&self) -> bool {
        self.text.pos_char() >= self.text.len()
    }

    // ===== Consumption =====

    /// [§ 13.2.3.5 Preprocessing the input stream](https://html.spec.whatwg.org/multipage/parsing.html#preprocessing-the-input-stream)
    ///
    /// "Before the tokenization stage, the input stream must be preprocessed
    /// by normalizing newlines." CR LF and lone CR both come out as LF.
    pub fn consume(&mut self) -> Option<char> {
        let raw = self.text.next_char()?;
        let c = if raw == '\r' {
            if self.text.peek_char(0) == Some('\n') {
                let _ = self.text.next_char();
            }
            '\n'
        } else {
            raw
        };

        if c == '\n' {
            self.line_end_columns.push(self.column);
            self.line += 1;
            self.column = 0;
        } else {
            self.column += utf16_width(c);
        }

        let index = self.text.pos_char();
        if index > self.checked_up_to {
            self.checked_up_to = index;
            self.check_character(c, index - 1);
        }
        Some(c)
    }

    /// Report input-stream errors for the character just consumed.
    fn check_character(&mut self, c: char, index: usize) {
        if is_control(c) {
            self.report(ParseErrorCode::ControlCharacterInInputStream, &[]);
        } else if is_noncharacter(c as u32) {
            self.report(ParseErrorCode::NoncharacterInInputStream, &[]);
        } else if c == '\u{FFFD}' && self.is_encoded_surrogate(index) {
            self.report(ParseErrorCode::SurrogateInInputStream, &[]);
        }
    }

    /// A UTF-8 encoded surrogate (`ED A0..BF xx`) decodes to U+FFFD; spot it
    /// from the source bytes.
    fn is_encoded_surrogate(&self, index: usize) -> bool {
        if self.encoding != UTF_8 {
            return false;
        }
        let start = self.bom_length + self.text.byte_offset(index);
        matches!(self.bytes.get(start..start + 2), Some([0xED, 0xA0..=0xBF]))
    }

    /// The character `ahead` positions past the cursor after newline
    /// normalization, without consuming anything.
    #[must_use]
    pub fn peek(&self, ahead: usize) -> Option<char> {
        let mut index = self.text.pos_char();
        let mut remaining = ahead;
        loop {
            let raw = self.text.char_at(index)?;
            let width = if raw == '\r' && self.text.char_at(index + 1) == Some('\n') {
                2
            } else {
                1
            };
            if remaining == 0 {
                return Some(if raw == '\r' { '\n' } else { raw });
            }
            remaining -= 1;
            index += width;
        }
    }

    /// Consume characters while `accept` holds, up to `limit` characters.
    pub fn consume_while(&mut self, accept: impl Fn(char) -> bool, limit: Option<usize>) -> String {
        let mut out = String::new();
        let mut count = 0;
        while limit.is_none_or(|limit| count < limit) {
            match self.peek(0) {
                Some(c) if accept(c) => {
                    let _ = self.consume();
                    out.push(c);
                    count += 1;
                }
                _ => break,
            }
        }
        out
    }

    /// Consume characters until `stop` holds, up to `limit` characters.
    ///
    /// Control characters and noncharacters always end the run, so they pass
    /// through [`Self::consume`] one at a time and get reported.
    pub fn consume_until(&mut self, stop: impl Fn(char) -> bool, limit: Option<usize>) -> String {
        let mut out = String::new();
        let mut count = 0;
        while limit.is_none_or(|limit| count < limit) {
            match self.peek(0) {
                Some(c) if !stop(c) => {
                    let _ = self.consume();
                    out.push(c);
                    count += 1;
                    if is_control(c) || is_noncharacter(c as u32) {
                        break;
                    }
                }
                _ => break,
            }
        }
        out
    }

    /// Push the last `count` consumed characters back. A CR LF pair counts
    /// as one character, exactly as [`Self::consume`] returned it.
    pub fn unconsume(&mut self, count: usize) {
        for _ in 0..count {
            let mut index = self.text.pos_char();
            if index == 0 {
                return;
            }
            index -= 1;
            let mut c = self.text.char_at(index).unwrap_or('\n');
            if c == '\n' && index > 0 && self.text.char_at(index - 1) == Some('\r') {
                index -= 1;
            }
            if c == '\r' {
                c = '\n';
            }
            self.text.seek(index);

            if c == '\n' {
                self.line = self.line.saturating_sub(1).max(1);
                self.column = self.line_end_columns.pop().unwrap_or(0);
            } else {
                self.column = self.column.saturating_sub(utf16_width(c));
            }
        }
    }

    /// Line and column of the character `offset` positions away from the
    /// most recently consumed one. Negative offsets look back.
    #[must_use]
    pub fn where_is(&self, offset: isize) -> (usize, usize) {
        let (mut line, mut column) = (self.line, self.column);
        let mut index = self.text.pos_char();
        if offset < 0 {
            let mut line_ends = self.line_end_columns.len();
            for _ in 0..offset.unsigned_abs() {
                if index == 0 {
                    break;
                }
                index -= 1;
                let mut c = self.text.char_at(index).unwrap_or('\n');
                if c == '\n' && index > 0 && self.text.char_at(index - 1) == Some('\r') {
                    index -= 1;
                }
                if c == '\r' {
                    c = '\n';
                }
                if c == '\n' {
                    line = line.saturating_sub(1).max(1);
                    line_ends = line_ends.saturating_sub(1);
                    column = self.line_end_columns.get(line_ends).copied().unwrap_or(0);
                } else {
                    column = column.saturating_sub(utf16_width(c));
                }
            }
        } else {
            for ahead in 0..offset.unsigned_abs() {
                match self.peek(ahead) {
                    Some('\n') => {
                        line += 1;
                        column = 0;
                    }
                    Some(c) => column += utf16_width(c),
                    None => break,
                }
            }
        }
        (line, column)
    }

    /// Record a parse error at the position its code prescribes.
    pub fn report(&mut self, code: ParseErrorCode, args: &[&str]) {
        let (line, column) = self.where_is(code.report_offset());
        self.errors.push(ParseError::new(
            code,
            line,
            column,
            args.iter().map(ToString::to_string).collect(),
        ));
    }

    /// Give the error at `index` a more precise code once the caller knows
    /// what actually happened. Position and arguments stay as reported.
    pub(crate) fn reclassify(&mut self, index: usize, code: ParseErrorCode) {
        if let Some(error) = self.errors.get_mut(index) {
            let args = std::mem::take(&mut error.args);
            *error = ParseError::new(code, error.line, error.column, args);
        }
    }

    // ===== Encoding changes =====

    /// [§ 13.2.3.4 Changing the encoding while parsing](https://html.spec.whatwg.org/multipage/parsing.html#changing-the-encoding-while-parsing)
    ///
    /// Switch to `requested` if that can be done without re-parsing: either
    /// it is the encoding already in use, or every byte consumed so far
    /// decodes identically under both. Otherwise the caller must start over
    /// with the returned [`Restart`].
    ///
    /// # Errors
    /// [`Restart`] when already-consumed bytes would decode differently.
    pub fn change_encoding(&mut self, requested: &'static Encoding) -> Result<(), Restart> {
        if self.confidence != Confidence::Tentative {
            return Ok(());
        }
        // STEP 1: "If the encoding that is already being used to interpret
        // the input stream is UTF-16BE/LE, then set the confidence to certain
        // and return."
        if self.encoding == UTF_16BE || self.encoding == UTF_16LE {
            self.confidence = Confidence::Certain;
            return Ok(());
        }
        // STEP 2: UTF-16 becomes UTF-8, x-user-defined becomes windows-1252.
        let requested = charset::coerce_document_encoding(requested);

        // STEP 3: "If the new encoding is identical or equivalent to the
        // encoding that is already being used to interpret the input stream,
        // then set the confidence to certain and return."
        if requested == self.encoding {
            self.confidence = Confidence::Certain;
            return Ok(());
        }

        // STEP 4: "If all the bytes up to the last byte converted by the
        // current decoder have the same Unicode interpretations in both the
        // current encoding and the new encoding ... then change the converter
        // on the fly."
        let consumed = self.bom_length + self.text.pos_byte();
        let involves_iso_2022_jp = requested == ISO_2022_JP || self.encoding == ISO_2022_JP;
        let prefix_is_shared = requested.is_ascii_compatible()
            && self.bytes[..consumed].iter().all(|&b| {
                b.is_ascii() && !(involves_iso_2022_jp && matches!(b, 0x0E | 0x0F | 0x1B))
            });
        if prefix_is_shared {
            debug!(
                "switching decoder from {} to {} after {consumed} bytes",
                self.encoding.name(),
                requested.name()
            );
            let position = self.text.pos_char();
            self.text = DecodedText::decode(&self.bytes[self.bom_length..], requested);
            self.text.seek(position);
            self.encoding = requested;
            self.confidence = Confidence::Certain;
            self.source = EncodingSource::Override;
            return Ok(());
        }

        // STEP 5: "Otherwise, restart the navigate algorithm ... with the
        // new encoding."
        Err(Restart {
            encoding: requested,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(bytes: &[u8]) -> InputStream {
        InputStream::new(bytes, None, None, &ParserOptions::default())
    }

    #[test]
    fn crlf_and_cr_become_lf() {
        let mut input = InputStream::from_text("a\r\nb\rc");
        let consumed: String = std::iter::from_fn(|| input.consume()).collect();
        assert_eq!(consumed, "a\nb\nc");
        assert_eq!(input.position(), (3, 1));
    }

    #[test]
    fn unconsume_rewinds_crlf_as_one_character() {
        let mut input = InputStream::from_text("a\r\nb");
        assert_eq!(input.consume(), Some('a'));
        assert_eq!(input.consume(), Some('\n'));
        assert_eq!(input.consume(), Some('b'));
        input.unconsume(2);
        assert_eq!(input.position(), (1, 1));
        assert_eq!(input.consume(), Some('\n'));
        assert_eq!(input.position(), (2, 0));
    }

    #[test]
    fn astral_characters_count_two_columns() {
        let mut input = InputStream::from_text("\u{1F600}x");
        let _ = input.consume();
        assert_eq!(input.position(), (1, 2));
        let _ = input.consume();
        assert_eq!(input.position(), (1, 3));
        input.unconsume(1);
        assert_eq!(input.position(), (1, 2));
    }

    #[test]
    fn control_characters_reported_once() {
        let mut input = InputStream::from_text("a\u{1}b");
        while input.consume().is_some() {}
        input.unconsume(2);
        while input.consume().is_some() {}
        let codes: Vec<_> = input.errors().iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![ParseErrorCode::ControlCharacterInInputStream]);
        assert_eq!((input.errors()[0].line, input.errors()[0].column), (1, 2));
    }

    #[test]
    fn noncharacters_and_surrogates_reported() {
        let mut input = InputStream::new(
            b"\xEF\xBF\xBE\xED\xA0\x80",
            Some("utf-8"),
            None,
            &ParserOptions::default(),
        );
        while input.consume().is_some() {}
        let codes: Vec<_> = input.errors().iter().map(|e| e.code).collect();
        assert_eq!(codes[0], ParseErrorCode::NoncharacterInInputStream);
        assert!(codes.contains(&ParseErrorCode::SurrogateInInputStream));
    }

    #[test]
    fn consume_until_stops_at_controls() {
        let mut input = InputStream::from_text("ab\u{7F}cd<");
        assert_eq!(input.consume_until(|c| c == '<', None), "ab\u{7F}");
        assert_eq!(input.consume_until(|c| c == '<', None), "cd");
        assert_eq!(input.peek(0), Some('<'));
        assert_eq!(input.errors().len(), 1);
    }

    #[test]
    fn consume_while_honours_limit() {
        let mut input = InputStream::from_text("aaaa");
        assert_eq!(input.consume_while(|c| c == 'a', Some(3)), "aaa");
        assert_eq!(input.consume(), Some('a'));
        assert_eq!(input.consume(), None);
    }

    #[test]
    fn where_is_looks_back_across_lines() {
        let mut input = InputStream::from_text("ab\ncd");
        while input.consume().is_some() {}
        assert_eq!(input.where_is(0), (2, 2));
        assert_eq!(input.where_is(-2), (2, 0));
        assert_eq!(input.where_is(-3), (1, 2));
    }

    #[test]
    fn sniffing_order() {
        let options = ParserOptions::default();
        let bom = InputStream::new(b"\xEF\xBB\xBF<meta charset=koi8-r>", Some("latin1"), None, &options);
        assert_eq!(bom.encoding(), UTF_8);
        assert_eq!(bom.encoding_source(), EncodingSource::ByteOrderMark);

        let transport = InputStream::new(b"<meta charset=koi8-r>", Some("text/html; charset=latin1"), None, &options);
        assert_eq!(transport.encoding(), encoding_rs::WINDOWS_1252);
        assert_eq!(transport.confidence(), Confidence::Certain);

        let prescan = stream(b"<meta charset=koi8-r>");
        assert_eq!(prescan.encoding(), encoding_rs::KOI8_R);
        assert_eq!(prescan.confidence(), Confidence::Tentative);

        let fallback = stream(b"<p>plain");
        assert_eq!(fallback.encoding(), encoding_rs::WINDOWS_1252);
        assert_eq!(fallback.encoding_source(), EncodingSource::Fallback);
    }

    #[test]
    fn change_encoding_on_the_fly_when_prefix_is_ascii() {
        let mut input = stream(b"<p>abc\xE9");
        for _ in 0..4 {
            let _ = input.consume();
        }
        assert_eq!(input.change_encoding(encoding_rs::WINDOWS_1251), Ok(()));
        assert_eq!(input.confidence(), Confidence::Certain);
        assert_eq!(input.consume(), Some('b'));
        assert_eq!(input.consume(), Some('c'));
        assert_eq!(input.consume(), Some('\u{439}'));
    }

    #[test]
    fn change_encoding_restarts_after_non_ascii() {
        let mut input = stream(b"\xE9abc");
        let _ = input.consume();
        assert_eq!(
            input.change_encoding(UTF_8),
            Err(Restart { encoding: UTF_8 })
        );
    }

    #[test]
    fn change_encoding_ignored_when_certain() {
        let mut input = InputStream::new(b"\xE9", Some("utf-8"), None, &ParserOptions::default());
        let _ = input.consume();
        assert_eq!(input.change_encoding(encoding_rs::KOI8_R), Ok(()));
        assert_eq!(input.encoding(), UTF_8);
    }
}
