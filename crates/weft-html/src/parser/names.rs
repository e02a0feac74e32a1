//! Escaping of names a strict DOM refuses.
//!
//! The tokenizer accepts almost anything as a tag or attribute name, but the
//! DOM only takes XML names. Offending characters are rewritten as `U` plus
//! five uppercase hex digits, which is itself a valid name fragment, so the
//! result is always accepted and can be mapped back.

use std::borrow::Cow;
use std::fmt::Write;

use weft_dom::name::{is_name_char, is_name_start_char, is_valid_name};

/// Rewrite `name` into a valid XML name. Valid names come back unchanged.
#[must_use]
pub fn coerce_name(name: &str) -> Cow<'_, str> {
    if is_valid_name(name) {
        return Cow::Borrowed(name);
    }
    let mut out = String::with_capacity(name.len() + 8);
    for (i, c) in name.chars().enumerate() {
        let ok = if i == 0 {
            is_name_start_char(c)
        } else {
            is_name_char(c)
        };
        if ok && c != 'U' {
            out.push(c);
        } else {
            let _ = write!(out, "U{:05X}", u32::from(c));
        }
    }
    if out.is_empty() {
        out.push_str("U00000");
    }
    Cow::Owned(out)
}

/// Undo [`coerce_name`] for names that went through it.
#[must_use]
pub fn uncoerce_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut rest = name;
    while let Some(index) = rest.find('U') {
        out.push_str(&rest[..index]);
        let candidate = rest.get(index + 1..index + 6);
        let decoded = candidate
            .filter(|hex| hex.bytes().all(|b| b.is_ascii_digit() || (b'A'..=b'F').contains(&b)))
            .and_then(|hex| u32::from_str_radix(hex, 16).ok())
            .and_then(char::from_u32);
        if let Some(c) = decoded {
            out.push(c);
            rest = &rest[index + 6..];
        } else {
            out.push('U');
            rest = &rest[index + 1..];
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names_pass_through() {
        assert!(matches!(coerce_name("div"), Cow::Borrowed("div")));
        assert!(matches!(coerce_name("xlink:href"), Cow::Borrowed(_)));
    }

    #[test]
    fn invalid_characters_are_escaped() {
        assert_eq!(coerce_name("a\"b"), "aU00022b");
        assert_eq!(coerce_name("=x"), "U0003Dx");
        assert_eq!(coerce_name("1a"), "U00031a");
    }

    #[test]
    fn literal_u_is_escaped_once_the_name_needs_coercion() {
        assert_eq!(coerce_name("U<"), "U00055U0003C");
        assert_eq!(uncoerce_name("U00055U0003C"), "U<");
    }

    #[test]
    fn coercion_round_trips() {
        for name in ["a\"b", "<x>", "=", "foo bar", "1\u{1F600}"] {
            let coerced = coerce_name(name);
            assert!(is_valid_name(&coerced), "{coerced}");
            assert_eq!(uncoerce_name(&coerced), name);
        }
    }
}
