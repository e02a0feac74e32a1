//! Character reference states for the HTML tokenizer.
//!
//! [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
//! through [§ 13.2.5.80](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state).

use super::core::{HTMLTokenizer, TokenizerState};
use super::named_character_references::{
    LONGEST_NAME_LENGTH, any_entity_has_prefix, c1_replacement, lookup_entity,
};
use crate::encoding::is_noncharacter;
use crate::error::ParseErrorCode;

impl HTMLTokenizer {
    /// "consumed as part of an attribute": the return state is one of the
    /// attribute value states.
    pub(super) const fn is_consumed_as_part_of_attribute(&self) -> bool {
        matches!(
            self.return_state,
            TokenizerState::AttributeValueDoubleQuoted
                | TokenizerState::AttributeValueSingleQuoted
                | TokenizerState::AttributeValueUnquoted
        )
    }

    /// "Flush code points consumed as a character reference"
    ///
    /// "If the character reference was consumed as part of an attribute, then
    /// append each character to the current attribute's value. Otherwise,
    /// emit each character as a character token."
    pub(super) fn flush_code_points_consumed_as_character_reference(&mut self) {
        let buffer = std::mem::take(&mut self.temporary_buffer);
        if self.is_consumed_as_part_of_attribute() {
            self.append_to_attribute_value(&buffer);
        } else {
            self.emit_str(&buffer);
        }
    }

    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    pub(super) fn handle_character_reference_state(&mut self) {
        // "Set the temporary buffer to the empty string. Append a U+0026
        // AMPERSAND (&) character to the temporary buffer."
        self.temporary_buffer.clear();
        self.temporary_buffer.push('&');
        match self.current_input_character {
            Some(c) if c.is_ascii_alphanumeric() => {
                self.reconsume_in(TokenizerState::NamedCharacterReference);
            }
            Some('#') => {
                self.temporary_buffer.push('#');
                self.switch_to(TokenizerState::NumericCharacterReference);
            }
            // "Flush code points consumed as a character reference. Reconsume
            // in the return state."
            _ => {
                self.flush_code_points_consumed_as_character_reference();
                self.reconsume_in(self.return_state);
            }
        }
    }

    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    ///
    /// "Consume the maximum number of characters possible, where the consumed
    /// characters are one of the identifiers in the named character
    /// references table."
    ///
    /// The walk extends the candidate one character at a time while some
    /// table entry still starts with it, remembering the longest complete
    /// match. Characters read past that match are pushed back.
    pub(super) fn handle_named_character_reference_state(&mut self) {
        // The current input character is the first (already consumed) one.
        let Some(first) = self.current_input_character else {
            return;
        };
        let mut candidate = String::from(first);
        let mut consumed = 1;
        let mut best = None;
        if any_entity_has_prefix(&candidate) {
            loop {
                if let Some(chars) = lookup_entity(&candidate) {
                    best = Some((consumed, candidate.clone(), chars));
                }
                if consumed >= LONGEST_NAME_LENGTH {
                    break;
                }
                let Some(next) = self.input.peek(0) else {
                    break;
                };
                candidate.push(next);
                if !any_entity_has_prefix(&candidate) {
                    break;
                }
                let _ = self.input.consume();
                consumed += 1;
            }
        }

        let Some((matched_length, name, chars)) = best else {
            // "Otherwise: Flush code points consumed as a character reference.
            // Switch to the ambiguous ampersand state."
            self.input.unconsume(consumed);
            self.flush_code_points_consumed_as_character_reference();
            self.switch_to(TokenizerState::AmbiguousAmpersand);
            return;
        };
        self.input.unconsume(consumed - matched_length);
        self.temporary_buffer.push_str(&name);

        let ends_with_semicolon = name.ends_with(';');
        // "If the character reference was consumed as part of an attribute,
        // and the last character matched is not a U+003B SEMICOLON character
        // (;), and the next input character is either a U+003D EQUALS SIGN
        // character (=) or an ASCII alphanumeric, then, for historical
        // reasons, flush code points consumed as a character reference and
        // switch to the return state."
        if self.is_consumed_as_part_of_attribute()
            && !ends_with_semicolon
            && self
                .input
                .peek(0)
                .is_some_and(|c| c == '=' || c.is_ascii_alphanumeric())
        {
            self.flush_code_points_consumed_as_character_reference();
            self.switch_to(self.return_state);
            return;
        }

        // "If the last character matched is not a U+003B SEMICOLON character
        // (;), then this is a missing-semicolon-after-character-reference
        // parse error."
        if !ends_with_semicolon {
            self.input.report(ParseErrorCode::MissingSemicolonAfterCharacterReference, &[&name]);
        }
        // "Set the temporary buffer to the empty string. Append one or two
        // characters corresponding to the character reference name (as given
        // by the second column of the named character references table) to
        // the temporary buffer."
        self.temporary_buffer.clear();
        chars.push_to(&mut self.temporary_buffer);
        self.flush_code_points_consumed_as_character_reference();
        self.switch_to(self.return_state);
    }

    /// [§ 13.2.5.74 Ambiguous ampersand state](https://html.spec.whatwg.org/multipage/parsing.html#ambiguous-ampersand-state)
    ///
    /// The alphanumerics are collected in the temporary buffer only to name
    /// the reference in the error message.
    pub(super) fn handle_ambiguous_ampersand_state(&mut self) {
        match self.current_input_character {
            // "If the character reference was consumed as part of an
            // attribute, then append the current input character to the
            // current attribute's value. Otherwise, emit the current input
            // character as a character token."
            Some(c) if c.is_ascii_alphanumeric() => {
                self.temporary_buffer.push(c);
                if self.is_consumed_as_part_of_attribute() {
                    self.append_to_attribute_value(c.encode_utf8(&mut [0; 4]));
                } else {
                    self.emit_character(c);
                }
            }
            // "This is an unknown-named-character-reference parse error.
            // Reconsume in the return state."
            Some(';') => {
                let name = std::mem::take(&mut self.temporary_buffer);
                self.input.report(ParseErrorCode::UnknownNamedCharacterReference, &[&name]);
                self.reconsume_in(self.return_state);
            }
            _ => {
                self.temporary_buffer.clear();
                self.reconsume_in(self.return_state);
            }
        }
    }

    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    pub(super) fn handle_numeric_character_reference_state(&mut self) {
        // "Set the character reference code to zero (0)."
        self.character_reference_code = 0;
        match self.current_input_character {
            Some(c @ ('x' | 'X')) => {
                self.temporary_buffer.push(c);
                self.switch_to(TokenizerState::HexadecimalCharacterReferenceStart);
            }
            _ => self.reconsume_in(TokenizerState::DecimalCharacterReferenceStart),
        }
    }

    /// [§ 13.2.5.76](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-start-state),
    /// [§ 13.2.5.77](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-start-state)
    pub(super) fn handle_numeric_character_reference_start_state(&mut self, radix: u32) {
        match self.current_input_character {
            Some(c) if c.is_digit(radix) => self.reconsume_in(if radix == 16 {
                TokenizerState::HexadecimalCharacterReference
            } else {
                TokenizerState::DecimalCharacterReference
            }),
            // "This is an absence-of-digits-in-numeric-character-reference
            // parse error. Flush code points consumed as a character
            // reference. Reconsume in the return state."
            _ => {
                self.parse_error(ParseErrorCode::AbsenceOfDigitsInNumericCharacterReference);
                self.flush_code_points_consumed_as_character_reference();
                self.reconsume_in(self.return_state);
            }
        }
    }

    /// [§ 13.2.5.78](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-state),
    /// [§ 13.2.5.79](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-state)
    pub(super) fn handle_numeric_character_reference_digits_state(&mut self, radix: u32) {
        match self.current_input_character {
            // "Multiply the character reference code by 16 (or 10). Add a
            // numeric version of the current input character to the
            // character reference code."
            //
            // Saturates once past U+10FFFF; the end state only needs to know
            // that the value is out of range.
            Some(c) if c.is_digit(radix) => {
                let digit = c.to_digit(radix).unwrap_or(0);
                self.character_reference_code = self
                    .character_reference_code
                    .saturating_mul(radix)
                    .saturating_add(digit)
                    .min(0x11_0000);
            }
            Some(';') => self.switch_to(TokenizerState::NumericCharacterReferenceEnd),
            // "This is a missing-semicolon-after-character-reference parse
            // error. Reconsume in the numeric character reference end state."
            _ => {
                let digits = self.temporary_buffer.clone();
                self.input.report(ParseErrorCode::MissingSemicolonAfterCharacterReference, &[&digits]);
                self.reconsume_in(TokenizerState::NumericCharacterReferenceEnd);
            }
        }
    }

    /// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
    ///
    /// Runs without consuming. A reconsume requested by the previous state is
    /// left pending so the return state sees the same character.
    pub(super) fn handle_numeric_character_reference_end_state(&mut self) {
        let mut code = self.character_reference_code;
        match code {
            // "If the number is 0x00, then this is a null-character-reference
            // parse error. Set the character reference code to 0xFFFD."
            0 => {
                self.parse_error(ParseErrorCode::NullCharacterReference);
                code = 0xFFFD;
            }
            // "If the number is greater than 0x10FFFF, then this is a
            // character-reference-outside-unicode-range parse error."
            0x11_0000.. => {
                self.parse_error(ParseErrorCode::CharacterReferenceOutsideUnicodeRange);
                code = 0xFFFD;
            }
            0xD800..=0xDFFF => {
                self.parse_error(ParseErrorCode::SurrogateCharacterReference);
                code = 0xFFFD;
            }
            _ if is_noncharacter(code) => {
                self.parse_error(ParseErrorCode::NoncharacterCharacterReference);
            }
            // "If the number is 0x0D, or a control that's not ASCII
            // whitespace, then this is a control-character-reference parse
            // error. If the number is one of the numbers in the first column
            // of the following table, then find the row with that number in
            // the first column, and set the character reference code to the
            // number in the second column."
            0x0D | 0x01..=0x08 | 0x0B | 0x0E..=0x1F | 0x7F..=0x9F => {
                self.parse_error(ParseErrorCode::ControlCharacterReference);
                if let Some(replacement) = c1_replacement(code) {
                    code = u32::from(replacement);
                }
            }
            _ => {}
        }
        self.temporary_buffer.clear();
        self.temporary_buffer.push(char::from_u32(code).unwrap_or('\u{FFFD}'));
        self.flush_code_points_consumed_as_character_reference();
        self.switch_to(self.return_state);
    }
}
