//! Decoding bytes into a random-access character buffer.
//!
//! The input stream needs three things a one-shot `decode` does not give:
//! the byte offset each character came from (for on-the-fly encoding
//! changes and surrogate detection), cheap lookahead, and the ability to
//! rewind.

use encoding_rs::{CoderResult, Encoding};

/// Fully decoded text with per-character byte offsets and a cursor.
#[derive(Debug, Clone)]
pub struct DecodedText {
    chars: Vec<char>,
    /// `offsets[i]` is the byte at which `chars[i]` starts; one trailing
    /// entry holds the total byte length.
    offsets: Vec<usize>,
    pos: usize,
}

impl DecodedText {
    /// Decode `bytes` with `encoding`, replacing malformed sequences with
    /// U+FFFD. BOM handling is the caller's job.
    #[must_use]
    pub fn decode(bytes: &[u8], encoding: &'static Encoding) -> Self {
        let mut decoder = encoding.new_decoder_without_bom_handling();
        let mut chars = Vec::with_capacity(bytes.len());
        let mut offsets = Vec::with_capacity(bytes.len() + 1);
        let mut chunk = String::with_capacity(16);
        let mut sequence_start = 0;

        for (i, byte) in bytes.iter().enumerate() {
            chunk.clear();
            chunk.reserve(decoder.max_utf8_buffer_length(1).unwrap_or(16));
            let last = i + 1 == bytes.len();
            let (result, _, _) = decoder.decode_to_string(std::slice::from_ref(byte), &mut chunk, last);
            debug_assert!(matches!(result, CoderResult::InputEmpty));
            let produced: Vec<char> = chunk.chars().collect();
            let count = produced.len();
            for (k, c) in produced.into_iter().enumerate() {
                // When one byte both terminates a bad sequence and starts a
                // new character, the final character belongs to this byte.
                let offset = if count > 1 && k + 1 == count { i } else { sequence_start };
                chars.push(c);
                offsets.push(offset);
            }
            if count > 0 {
                sequence_start = i + 1;
            }
        }
        offsets.push(bytes.len());

        Self {
            chars,
            offsets,
            pos: 0,
        }
    }

    /// Wrap text that is already Unicode.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let mut chars = Vec::with_capacity(text.len());
        let mut offsets = Vec::with_capacity(text.len() + 1);
        for (offset, c) in text.char_indices() {
            chars.push(c);
            offsets.push(offset);
        }
        offsets.push(text.len());
        Self {
            chars,
            offsets,
            pos: 0,
        }
    }

    /// Total number of characters.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.chars.len()
    }

    /// True when there is no text at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Return the character under the cursor and advance past it.
    pub fn next_char(&mut self) -> Option<char> {
        let c = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        Some(c)
    }

    /// The character `ahead` positions past the cursor, without moving.
    #[must_use]
    pub fn peek_char(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    /// The character at an absolute index.
    #[must_use]
    pub fn char_at(&self, index: usize) -> Option<char> {
        self.chars.get(index).copied()
    }

    /// Cursor position in characters.
    #[must_use]
    pub const fn pos_char(&self) -> usize {
        self.pos
    }

    /// Cursor position in source bytes: the number of bytes fully consumed.
    #[must_use]
    pub fn pos_byte(&self) -> usize {
        self.byte_offset(self.pos)
    }

    /// Source byte offset of the character at `index`.
    #[must_use]
    pub fn byte_offset(&self, index: usize) -> usize {
        self.offsets
            .get(index)
            .or_else(|| self.offsets.last())
            .copied()
            .unwrap_or(0)
    }

    /// Move the cursor to an absolute character index, clamped to the end.
    pub fn seek(&mut self, index: usize) {
        self.pos = index.min(self.chars.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utf8_offsets_track_multibyte_characters() {
        let text = DecodedText::decode("a\u{e9}b".as_bytes(), encoding_rs::UTF_8);
        assert_eq!(text.len(), 3);
        assert_eq!(text.byte_offset(0), 0);
        assert_eq!(text.byte_offset(1), 1);
        assert_eq!(text.byte_offset(2), 3);
        assert_eq!(text.byte_offset(3), 4);
    }

    #[test]
    fn malformed_utf8_becomes_replacement_characters() {
        let mut text = DecodedText::decode(&[b'x', 0xE2, b'A'], encoding_rs::UTF_8);
        assert_eq!(text.next_char(), Some('x'));
        assert_eq!(text.next_char(), Some('\u{FFFD}'));
        assert_eq!(text.byte_offset(1), 1);
        assert_eq!(text.next_char(), Some('A'));
        assert_eq!(text.byte_offset(2), 2);
        assert_eq!(text.next_char(), None);
    }

    #[test]
    fn single_byte_encodings_map_high_bytes() {
        let text = DecodedText::decode(&[0x80, 0xE9], encoding_rs::WINDOWS_1252);
        assert_eq!(text.char_at(0), Some('\u{20AC}'));
        assert_eq!(text.char_at(1), Some('\u{e9}'));
    }

    #[test]
    fn seek_and_peek() {
        let mut text = DecodedText::from_text("hello");
        text.seek(3);
        assert_eq!(text.peek_char(0), Some('l'));
        assert_eq!(text.peek_char(1), Some('o'));
        assert_eq!(text.pos_byte(), 3);
        text.seek(99);
        assert_eq!(text.next_char(), None);
    }
}
