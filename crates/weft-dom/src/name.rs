//! Name validation for element and attribute names.
//!
//! [§ 2.3 Common Syntactic Constructs (XML 1.0)](https://www.w3.org/TR/xml/#NT-Name)
//!
//! The DOM rejects element and attribute names that are not XML `Name`s.
//! The HTML tokenizer happily produces such names (`<a"b>`), so the tree
//! builder has to coerce them before handing them to a strict DOM.

/// "NameStartChar ::= ":" | [A-Z] | "_" | [a-z] | [#xC0-#xD6] | [#xD8-#xF6] |
/// [#xF8-#x2FF] | [#x370-#x37D] | [#x37F-#x1FFF] | [#x200C-#x200D] |
/// [#x2070-#x218F] | [#x2C00-#x2FEF] | [#x3001-#xD7FF] | [#xF900-#xFDCF] |
/// [#xFDF0-#xFFFD] | [#x10000-#xEFFFF]"
#[must_use]
pub const fn is_name_start_char(c: char) -> bool {
    matches!(c,
        ':' | 'A'..='Z' | '_' | 'a'..='z'
        | '\u{C0}'..='\u{D6}'
        | '\u{D8}'..='\u{F6}'
        | '\u{F8}'..='\u{2FF}'
        | '\u{370}'..='\u{37D}'
        | '\u{37F}'..='\u{1FFF}'
        | '\u{200C}'..='\u{200D}'
        | '\u{2070}'..='\u{218F}'
        | '\u{2C00}'..='\u{2FEF}'
        | '\u{3001}'..='\u{D7FF}'
        | '\u{F900}'..='\u{FDCF}'
        | '\u{FDF0}'..='\u{FFFD}'
        | '\u{10000}'..='\u{EFFFF}')
}

/// "NameChar ::= NameStartChar | "-" | "." | [0-9] | #xB7 | [#x0300-#x036F] |
/// [#x203F-#x2040]"
#[must_use]
pub const fn is_name_char(c: char) -> bool {
    is_name_start_char(c)
        || matches!(c,
            '-' | '.' | '0'..='9' | '\u{B7}'
            | '\u{300}'..='\u{36F}'
            | '\u{203F}'..='\u{2040}')
}

/// "Name ::= NameStartChar (NameChar)*"
#[must_use]
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if is_name_start_char(first) => chars.all(is_name_char),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_names() {
        assert!(is_valid_name("div"));
        assert!(is_valid_name("xlink:href"));
        assert!(is_valid_name("data-x.y_z"));
        assert!(is_valid_name("\u{e9}l\u{e9}ment"));
    }

    #[test]
    fn rejects_malformed_names() {
        assert!(!is_valid_name(""));
        assert!(!is_valid_name("1abc"));
        assert!(!is_valid_name("a\"b"));
        assert!(!is_valid_name("-x"));
        assert!(!is_valid_name("a<b"));
    }
}
