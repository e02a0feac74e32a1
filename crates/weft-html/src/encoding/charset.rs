//! Character encoding determination.
//!
//! [§ 13.2.3.1 Parsing with a known character encoding](https://html.spec.whatwg.org/multipage/parsing.html#determining-the-character-encoding)
//!
//! Each source (BOM, transport header, `<meta>` prescan, `<meta>` content
//! attribute) has its own resolver. [`super::InputStream`] consults them in
//! priority order.

use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE, WINDOWS_1252, X_USER_DEFINED};

/// Bytes the prescan treats as whitespace: TAB, LF, FF, CR, SPACE.
const fn is_prescan_space(byte: u8) -> bool {
    matches!(byte, 0x09 | 0x0A | 0x0C | 0x0D | 0x20)
}

/// [§ 13.2.3.1](https://html.spec.whatwg.org/multipage/parsing.html#encoding-sniffing-algorithm)
///
/// Returns the encoding named by a byte order mark and the BOM's length.
#[must_use]
pub fn from_bom(bytes: &[u8]) -> Option<(&'static Encoding, usize)> {
    Encoding::for_bom(bytes)
}

/// [Encoding § 4.2 Get an encoding](https://encoding.spec.whatwg.org/#concept-encoding-get)
///
/// "Remove any leading and trailing ASCII whitespace from label. If label is
/// an ASCII case-insensitive match for any of the labels listed in the
/// table below, then return the corresponding encoding; otherwise return
/// failure."
#[must_use]
pub fn from_charset_name(label: &str) -> Option<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
}

/// Interpret a transport-declared value, which may be either a bare encoding
/// label (`"utf-8"`) or a full `Content-Type` (`"text/html; charset=utf-8"`).
#[must_use]
pub fn from_transport(declared: &str) -> Option<&'static Encoding> {
    from_charset_name(declared).or_else(|| from_meta_content(declared))
}

/// Map an encoding found in a document to the one actually used.
///
/// "If encoding is UTF-16BE/LE, then set encoding to UTF-8. If encoding is
/// x-user-defined, then set encoding to windows-1252."
#[must_use]
pub fn coerce_document_encoding(encoding: &'static Encoding) -> &'static Encoding {
    if encoding == UTF_16BE || encoding == UTF_16LE {
        UTF_8
    } else if encoding == X_USER_DEFINED {
        WINDOWS_1252
    } else {
        encoding
    }
}

/// [§ 2.5.5 Extracting character encodings from meta elements](https://html.spec.whatwg.org/multipage/urls-and-fetching.html#algorithm-for-extracting-a-character-encoding-from-a-meta-element)
///
/// Finds `charset=` inside a `content` attribute value such as
/// `text/html; charset=koi8-r`.
#[must_use]
pub fn from_meta_content(content: &str) -> Option<&'static Encoding> {
    let bytes = content.as_bytes();
    let mut position = 0;

    loop {
        // STEP 2: "Loop: Find the first seven characters in s after position
        // that are an ASCII case-insensitive match for the word "charset"."
        let found = bytes[position..]
            .windows(7)
            .position(|w| w.eq_ignore_ascii_case(b"charset"))?;
        position += found + 7;

        // STEP 3: "Skip any ASCII whitespace that immediately follow the word "charset""
        while position < bytes.len() && is_prescan_space(bytes[position]) {
            position += 1;
        }

        // STEP 4: "If the next character is not a U+003D EQUALS SIGN (=),
        // then move position to point just before that next character, and
        // jump back to the step labeled loop."
        if bytes.get(position) == Some(&b'=') {
            position += 1;
            break;
        }
    }

    // STEP 5: "Skip any ASCII whitespace that immediately follow the equals sign."
    while position < bytes.len() && is_prescan_space(bytes[position]) {
        position += 1;
    }

    // STEP 6: "Process the next character as follows:"
    match bytes.get(position)? {
        quote @ (b'"' | b'\'') => {
            // "If there is a later corresponding ... quote ... return the
            // result of getting an encoding from the substring that is
            // between this character and the next earliest occurrence of this
            // character."
            let start = position + 1;
            let len = bytes[start..].iter().position(|b| b == quote)?;
            from_charset_name(&content[start..start + len])
        }
        _ => {
            // "Otherwise: Return the result of getting an encoding from the
            // substring that consists of this character up to but not
            // including the first ASCII whitespace or U+003B SEMICOLON
            // character, or the end of s, whichever comes first."
            let len = bytes[position..]
                .iter()
                .position(|&b| is_prescan_space(b) || b == b';')
                .unwrap_or(bytes.len() - position);
            from_charset_name(&content[position..position + len])
        }
    }
}

/// [§ 13.2.3.2 Prescan a byte stream to determine its encoding](https://html.spec.whatwg.org/multipage/parsing.html#prescan-a-byte-stream-to-determine-its-encoding)
///
/// Looks through at most `limit` leading bytes for a `<meta>` that declares
/// an encoding.
#[must_use]
pub fn from_prescan(bytes: &[u8], limit: usize) -> Option<&'static Encoding> {
    Prescanner {
        bytes: &bytes[..bytes.len().min(limit)],
        position: 0,
    }
    .run()
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

struct Prescanner<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl Prescanner<'_> {
    fn byte(&self) -> Option<u8> {
        self.bytes.get(self.position).copied()
    }

    fn starts_with_ignore_case(&self, pattern: &[u8]) -> bool {
        self.bytes
            .get(self.position..self.position + pattern.len())
            .is_some_and(|window| window.eq_ignore_ascii_case(pattern))
    }

    fn skip_to_byte(&mut self, target: u8) {
        while self.byte().is_some_and(|b| b != target) {
            self.position += 1;
        }
    }

    fn run(&mut self) -> Option<&'static Encoding> {
        while self.position < self.bytes.len() {
            if self.starts_with_ignore_case(b"<!--") {
                // "Advance the position pointer so that it points at the
                // first 0x3E byte which is preceded by two 0x2D bytes (i.e.
                // at the end of an ASCII '-->' sequence) and comes after the
                // 0x3C byte that was found."
                let search_from = self.position + 2;
                let found = self.bytes[search_from..]
                    .windows(3)
                    .position(|w| w == b"-->")?;
                self.position = search_from + found + 2;
            } else if self.starts_with_ignore_case(b"<meta")
                && self
                    .bytes
                    .get(self.position + 5)
                    .is_some_and(|&b| is_prescan_space(b) || b == b'/')
            {
                self.position += 5;
                if let Some(encoding) = self.meta()? {
                    return Some(encoding);
                }
            } else if self.byte() == Some(b'<')
                && (self
                    .bytes
                    .get(self.position + 1)
                    .is_some_and(u8::is_ascii_alphabetic)
                    || (self.bytes.get(self.position + 1) == Some(&b'/')
                        && self
                            .bytes
                            .get(self.position + 2)
                            .is_some_and(u8::is_ascii_alphabetic)))
            {
                // "Advance the position pointer so that it points at the
                // next 0x09, 0x0A, 0x0C, 0x0D, 0x20, or 0x3E byte."
                while self.byte().is_some_and(|b| !is_prescan_space(b) && b != b'>') {
                    self.position += 1;
                }
                // "Repeatedly get an attribute until no further attributes
                // can be found."
                while self.attribute()?.is_some() {}
            } else if self.starts_with_ignore_case(b"<!")
                || self.starts_with_ignore_case(b"</")
                || self.starts_with_ignore_case(b"<?")
            {
                self.skip_to_byte(b'>');
            }
            // "Next byte: Move position so it points at the next byte in the
            // input byte stream, and return to the step above labeled loop."
            self.position += 1;
        }
        None
    }

    /// The `<meta` branch. The outer `Option` is `None` when input ran out;
    /// the inner one is the encoding, if this `<meta>` declared one.
    #[allow(clippy::option_option)]
    fn meta(&mut self) -> Option<Option<&'static Encoding>> {
        let mut seen: Vec<String> = Vec::new();
        let mut got_pragma = false;
        let mut need_pragma: Option<bool> = None;
        let mut charset: Option<&'static Encoding> = None;

        // "Attributes: Get an attribute and its value. If no attribute was
        // sniffed, then jump to the processing step below."
        while let Some((name, value)) = self.attribute()? {
            // "If the attribute's name is already in attribute list, then
            // return to the step labeled attributes."
            if seen.contains(&name) {
                continue;
            }
            seen.push(name.clone());
            match name.as_str() {
                "http-equiv" => {
                    if value.eq_ignore_ascii_case("content-type") {
                        got_pragma = true;
                    }
                }
                "content" => {
                    if charset.is_none()
                        && let Some(found) = from_meta_content(&value)
                    {
                        charset = Some(found);
                        need_pragma = Some(true);
                    }
                }
                "charset" => {
                    if charset.is_none() {
                        charset = from_charset_name(&value);
                        need_pragma = Some(false);
                    }
                }
                _ => {}
            }
        }

        // "Processing: If need pragma is null, then jump to the step below
        // labeled next byte."
        let Some(need_pragma) = need_pragma else {
            return Some(None);
        };
        if need_pragma && !got_pragma {
            return Some(None);
        }
        Some(charset.map(coerce_document_encoding))
    }

    /// [§ 13.2.3.2 "get an attribute"](https://html.spec.whatwg.org/multipage/parsing.html#concept-get-attributes-when-sniffing)
    ///
    /// Outer `None`: input ran out. Inner `None`: no attribute (at `>`).
    #[allow(clippy::option_option)]
    fn attribute(&mut self) -> Option<Option<(String, String)>> {
        // STEP 1: "If the byte at position is one of 0x09, 0x0A, 0x0C, 0x0D,
        // 0x20, or 0x2F then advance position to the next byte and redo this
        // step."
        while self.byte().is_some_and(|b| is_prescan_space(b) || b == b'/') {
            self.position += 1;
        }
        // STEP 2: "If the byte at position is 0x3E (>), then abort the get an
        // attribute algorithm. There isn't one."
        if self.byte()? == b'>' {
            return Some(None);
        }

        let mut name: Vec<u8> = Vec::new();
        let mut value: Vec<u8> = Vec::new();

        // STEP 4: "Attribute name"
        loop {
            let b = self.byte()?;
            match b {
                b'=' if !name.is_empty() => {
                    self.position += 1;
                    return self.attribute_value(lossy(&name), &mut value);
                }
                b if is_prescan_space(b) => break,
                b'/' | b'>' => return Some(Some((lossy(&name), String::new()))),
                _ => name.push(b.to_ascii_lowercase()),
            }
            self.position += 1;
        }

        // STEP 6: "Spaces: If the byte at position is one of 0x09, 0x0A,
        // 0x0C, 0x0D, or 0x20 then advance position to the next byte, then,
        // repeat this step."
        while self.byte().is_some_and(is_prescan_space) {
            self.position += 1;
        }
        // STEP 7: "If the byte at position is not 0x3D (=), abort the get an
        // attribute algorithm. The attribute's name is the value of
        // attribute name, its value is the empty string."
        if self.byte()? != b'=' {
            return Some(Some((lossy(&name), String::new())));
        }
        self.position += 1;
        self.attribute_value(lossy(&name), &mut value)
    }

    #[allow(clippy::option_option)]
    fn attribute_value(&mut self, name: String, value: &mut Vec<u8>) -> Option<Option<(String, String)>> {
        // STEP 9: skip whitespace after '='.
        while self.byte().is_some_and(is_prescan_space) {
            self.position += 1;
        }
        // STEP 10: "Process the byte at position as follows:"
        match self.byte()? {
            quote @ (b'"' | b'\'') => {
                // "Quote loop: Advance position to the next byte. If the
                // value of the byte at position is the value of b, then
                // advance position to the next byte and abort the "get an
                // attribute" algorithm."
                loop {
                    self.position += 1;
                    let b = self.byte()?;
                    if b == quote {
                        self.position += 1;
                        return Some(Some((name, lossy(value))));
                    }
                    value.push(b.to_ascii_lowercase());
                }
            }
            b'>' => return Some(Some((name, String::new()))),
            b => {
                value.push(b.to_ascii_lowercase());
                self.position += 1;
            }
        }
        // STEP 11: "Process the byte at position as follows: If it is one of
        // 0x09, 0x0A, 0x0C, 0x0D, 0x20, or 0x3E, abort."
        loop {
            let b = self.byte()?;
            if is_prescan_space(b) || b == b'>' {
                return Some(Some((name, lossy(value))));
            }
            value.push(b.to_ascii_lowercase());
            self.position += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bom_detection() {
        assert_eq!(from_bom(b"\xEF\xBB\xBFhi"), Some((UTF_8, 3)));
        assert_eq!(from_bom(b"\xFF\xFEh\0"), Some((UTF_16LE, 2)));
        assert_eq!(from_bom(b"\xFE\xFF\0h"), Some((UTF_16BE, 2)));
        assert_eq!(from_bom(b"hi"), None);
    }

    #[test]
    fn labels_are_trimmed_and_case_insensitive() {
        assert_eq!(from_charset_name("  UTF-8 "), Some(UTF_8));
        assert_eq!(from_charset_name("latin1"), Some(WINDOWS_1252));
        assert_eq!(from_charset_name("nonsense"), None);
    }

    #[test]
    fn transport_accepts_content_type() {
        assert_eq!(
            from_transport("text/html; charset=\"windows-1251\""),
            Some(encoding_rs::WINDOWS_1251)
        );
        assert_eq!(from_transport("iso-8859-2"), Some(encoding_rs::ISO_8859_2));
        assert_eq!(from_transport("text/html"), None);
    }

    #[test]
    fn meta_content_extraction() {
        assert_eq!(
            from_meta_content("text/html; charset=koi8-r"),
            Some(encoding_rs::KOI8_R)
        );
        assert_eq!(from_meta_content("text/html; charset = 'utf-8'"), Some(UTF_8));
        assert_eq!(from_meta_content("charset=\"utf-8"), None);
        assert_eq!(from_meta_content("charsetx; charset=utf-8"), Some(UTF_8));
        assert_eq!(from_meta_content("text/html"), None);
    }

    #[test]
    fn prescan_finds_meta_charset() {
        let html = b"<!DOCTYPE html><html><head><meta charset=\"windows-1251\">";
        assert_eq!(from_prescan(html, 1024), Some(encoding_rs::WINDOWS_1251));
    }

    #[test]
    fn prescan_requires_pragma_for_content() {
        let without = b"<meta content=\"text/html; charset=koi8-r\">";
        assert_eq!(from_prescan(without, 1024), None);
        let with = b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=koi8-r\">";
        assert_eq!(from_prescan(with, 1024), Some(encoding_rs::KOI8_R));
    }

    #[test]
    fn prescan_skips_comments_and_other_tags() {
        let html = b"<!-- <meta charset=koi8-r> --><p title='<meta charset=utf-16'><meta charset=iso-8859-2>";
        assert_eq!(from_prescan(html, 1024), Some(encoding_rs::ISO_8859_2));
    }

    #[test]
    fn prescan_maps_utf16_to_utf8() {
        assert_eq!(from_prescan(b"<meta charset=utf-16le>", 1024), Some(UTF_8));
        assert_eq!(
            from_prescan(b"<meta charset=x-user-defined>", 1024),
            Some(WINDOWS_1252)
        );
    }

    #[test]
    fn prescan_respects_limit() {
        let html = b"<html><meta charset=koi8-r>";
        assert_eq!(from_prescan(html, 10), None);
    }
}
