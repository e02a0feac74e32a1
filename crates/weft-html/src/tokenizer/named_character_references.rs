//! Named character reference lookup.
//!
//! [§ 13.5 Named character references](https://html.spec.whatwg.org/multipage/named-characters.html#named-character-references)
//!
//! The 2,231-entry table comes from `markup5ever`, which stores every name
//! without its leading `&` and also stores every proper prefix of every name
//! mapped to `(0, 0)`. That prefix closure is what makes a greedy,
//! character-at-a-time longest match possible.

use markup5ever::data::{C1_REPLACEMENTS, NAMED_ENTITIES};

/// The longest reference name, `CounterClockwiseContourIntegral;`.
pub const LONGEST_NAME_LENGTH: usize = 32;

/// The one or two code points a named reference expands to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityChars {
    /// First code point.
    pub first: char,
    /// Second code point, for the few references that expand to two.
    pub second: Option<char>,
}

impl EntityChars {
    /// Append the expansion to `out`.
    pub fn push_to(self, out: &mut String) {
        out.push(self.first);
        if let Some(second) = self.second {
            out.push(second);
        }
    }
}

/// Look up a complete reference name (without `&`, with `;` if present).
#[must_use]
pub fn lookup_entity(name: &str) -> Option<EntityChars> {
    match NAMED_ENTITIES.get(name) {
        Some(&(0, _)) | None => None,
        Some(&(first, second)) => Some(EntityChars {
            first: char::from_u32(first)?,
            second: (second != 0).then(|| char::from_u32(second)).flatten(),
        }),
    }
}

/// Whether some reference name starts with `prefix`.
#[must_use]
pub fn any_entity_has_prefix(prefix: &str) -> bool {
    NAMED_ENTITIES.get(prefix).is_some()
}

/// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
///
/// The replacement for a numeric reference into U+0080..U+009F, when the
/// table has one.
#[must_use]
pub fn c1_replacement(code: u32) -> Option<char> {
    let index = usize::try_from(code.checked_sub(0x80)?).ok()?;
    C1_REPLACEMENTS.get(index).copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_and_terminated_names() {
        assert_eq!(lookup_entity("amp;").map(|e| e.first), Some('&'));
        assert_eq!(lookup_entity("amp").map(|e| e.first), Some('&'));
        assert_eq!(lookup_entity("notin;").map(|e| e.first), Some('\u{2209}'));
        assert_eq!(lookup_entity("notin"), None);
    }

    #[test]
    fn prefixes_are_not_entities() {
        assert!(any_entity_has_prefix("noti"));
        assert!(lookup_entity("noti").is_none());
        assert!(!any_entity_has_prefix("notit"));
    }

    #[test]
    fn two_code_point_entities() {
        let fj = lookup_entity("fjlig;").unwrap();
        assert_eq!((fj.first, fj.second), ('f', Some('j')));
    }

    #[test]
    fn c1_table() {
        assert_eq!(c1_replacement(0x80), Some('\u{20AC}'));
        assert_eq!(c1_replacement(0x81), None);
        assert_eq!(c1_replacement(0x9F), Some('\u{178}'));
        assert_eq!(c1_replacement(0x7F), None);
        assert_eq!(c1_replacement(0xA0), None);
    }

    #[test]
    fn longest_name_is_known() {
        assert!(lookup_entity("CounterClockwiseContourIntegral;").is_some());
        assert_eq!("CounterClockwiseContourIntegral;".len(), LONGEST_NAME_LENGTH);
    }
}
