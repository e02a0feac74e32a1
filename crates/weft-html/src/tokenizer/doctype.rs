//! DOCTYPE states.
//!
//! [§ 13.2.5.53](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
//! through [§ 13.2.5.68](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state).
//!
//! The public and system identifier states mirror each other, so each pair
//! shares one handler keyed by `public`.

use super::core::{HTMLTokenizer, TokenizerState};
use super::helpers::DoctypeField;
use crate::error::ParseErrorCode;

impl HTMLTokenizer {
    /// "This is an eof-in-doctype parse error. Set the current DOCTYPE
    /// token's force-quirks flag to on. Emit the current DOCTYPE token. Emit
    /// an end-of-file token."
    fn eof_in_doctype(&mut self) {
        self.parse_error(ParseErrorCode::EofInDoctype);
        self.set_force_quirks();
        self.emit_current_token();
        self.emit_eof();
    }

    /// Force quirks, switch to the data state and emit the DOCTYPE.
    fn emit_quirky_doctype(&mut self, code: ParseErrorCode) {
        self.parse_error(code);
        self.set_force_quirks();
        self.switch_to(TokenizerState::Data);
        self.emit_current_token();
    }

    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    pub(super) fn handle_doctype_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeDOCTYPEName);
            }
            Some('>') => self.reconsume_in(TokenizerState::BeforeDOCTYPEName),
            // "Create a new DOCTYPE token. Set its force-quirks flag to on.
            // Emit the current token. Emit an end-of-file token."
            None => {
                self.create_doctype();
                self.eof_in_doctype();
            }
            Some(_) => {
                self.parse_error(ParseErrorCode::MissingWhitespaceBeforeDoctypeName);
                self.reconsume_in(TokenizerState::BeforeDOCTYPEName);
            }
        }
    }

    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    pub(super) fn handle_before_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('\0') => {
                self.parse_error(ParseErrorCode::UnexpectedNullCharacter);
                self.create_doctype();
                self.append_to_doctype_field(DoctypeField::Name, '\u{FFFD}');
                self.switch_to(TokenizerState::DOCTYPEName);
            }
            // "This is a missing-doctype-name parse error. Create a new
            // DOCTYPE token. Set its force-quirks flag to on. Switch to the
            // data state. Emit the current token."
            Some('>') => {
                self.create_doctype();
                self.emit_quirky_doctype(ParseErrorCode::MissingDoctypeName);
            }
            None => {
                self.create_doctype();
                self.eof_in_doctype();
            }
            Some(c) => {
                self.create_doctype();
                self.append_to_doctype_field(DoctypeField::Name, c.to_ascii_lowercase());
                self.switch_to(TokenizerState::DOCTYPEName);
            }
        }
    }

    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    pub(super) fn handle_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::AfterDOCTYPEName);
            }
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            Some('\0') => {
                self.parse_error(ParseErrorCode::UnexpectedNullCharacter);
                self.append_to_doctype_field(DoctypeField::Name, '\u{FFFD}');
            }
            None => self.eof_in_doctype(),
            Some(c) => self.append_to_doctype_field(DoctypeField::Name, c.to_ascii_lowercase()),
        }
    }

    /// [§ 13.2.5.56 After DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state)
    pub(super) fn handle_after_doctype_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            None => self.eof_in_doctype(),
            Some(c) => {
                // "If the six characters starting from the current input
                // character are an ASCII case-insensitive match for the word
                // "PUBLIC", then consume those characters and switch to the
                // after DOCTYPE public keyword state."
                if c.eq_ignore_ascii_case(&'P') && self.next_few_characters_are_case_insensitive("UBLIC") {
                    self.consume_characters(5);
                    self.switch_to(TokenizerState::AfterDOCTYPEPublicKeyword);
                } else if c.eq_ignore_ascii_case(&'S') && self.next_few_characters_are_case_insensitive("YSTEM") {
                    self.consume_characters(5);
                    self.switch_to(TokenizerState::AfterDOCTYPESystemKeyword);
                } else {
                    // "this is an invalid-character-sequence-after-doctype-name
                    // parse error. Set the current DOCTYPE token's force-quirks
                    // flag to on. Reconsume in the bogus DOCTYPE state."
                    self.parse_error(ParseErrorCode::InvalidCharacterSequenceAfterDoctypeName);
                    self.set_force_quirks();
                    self.reconsume_in(TokenizerState::BogusDOCTYPE);
                }
            }
        }
    }

    /// [§ 13.2.5.57](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state),
    /// [§ 13.2.5.63](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state)
    pub(super) fn handle_after_doctype_keyword_state(&mut self, public: bool) {
        let field = DoctypeField::identifier(public);
        let (missing_whitespace, missing_identifier, missing_quote) = if public {
            (
                ParseErrorCode::MissingWhitespaceAfterDoctypePublicKeyword,
                ParseErrorCode::MissingDoctypePublicIdentifier,
                ParseErrorCode::MissingQuoteBeforeDoctypePublicIdentifier,
            )
        } else {
            (
                ParseErrorCode::MissingWhitespaceAfterDoctypeSystemKeyword,
                ParseErrorCode::MissingDoctypeSystemIdentifier,
                ParseErrorCode::MissingQuoteBeforeDoctypeSystemIdentifier,
            )
        };
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(if public {
                    TokenizerState::BeforeDOCTYPEPublicIdentifier
                } else {
                    TokenizerState::BeforeDOCTYPESystemIdentifier
                });
            }
            Some(quote @ ('"' | '\'')) => {
                self.parse_error(missing_whitespace);
                self.clear_doctype_identifier(field);
                self.switch_to(Self::identifier_state(public, quote));
            }
            Some('>') => self.emit_quirky_doctype(missing_identifier),
            None => self.eof_in_doctype(),
            Some(_) => {
                self.parse_error(missing_quote);
                self.set_force_quirks();
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.58](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state),
    /// [§ 13.2.5.64](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state)
    pub(super) fn handle_before_doctype_identifier_state(&mut self, public: bool) {
        let field = DoctypeField::identifier(public);
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some(quote @ ('"' | '\'')) => {
                self.clear_doctype_identifier(field);
                self.switch_to(Self::identifier_state(public, quote));
            }
            Some('>') => self.emit_quirky_doctype(if public {
                ParseErrorCode::MissingDoctypePublicIdentifier
            } else {
                ParseErrorCode::MissingDoctypeSystemIdentifier
            }),
            None => self.eof_in_doctype(),
            Some(_) => {
                self.parse_error(if public {
                    ParseErrorCode::MissingQuoteBeforeDoctypePublicIdentifier
                } else {
                    ParseErrorCode::MissingQuoteBeforeDoctypeSystemIdentifier
                });
                self.set_force_quirks();
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.59](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state)
    /// through [§ 13.2.5.66](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(single-quoted)-state)
    pub(super) fn handle_doctype_identifier_quoted_state(&mut self, public: bool, quote: char) {
        let field = DoctypeField::identifier(public);
        match self.current_input_character {
            Some(c) if c == quote => self.switch_to(if public {
                TokenizerState::AfterDOCTYPEPublicIdentifier
            } else {
                TokenizerState::AfterDOCTYPESystemIdentifier
            }),
            Some('\0') => {
                self.parse_error(ParseErrorCode::UnexpectedNullCharacter);
                self.append_to_doctype_field(field, '\u{FFFD}');
            }
            Some('>') => self.emit_quirky_doctype(if public {
                ParseErrorCode::AbruptDoctypePublicIdentifier
            } else {
                ParseErrorCode::AbruptDoctypeSystemIdentifier
            }),
            None => self.eof_in_doctype(),
            Some(c) => self.append_to_doctype_field(field, c),
        }
    }

    /// [§ 13.2.5.61 After DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state)
    pub(super) fn handle_after_doctype_public_identifier_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BetweenDOCTYPEPublicAndSystemIdentifiers);
            }
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            Some(quote @ ('"' | '\'')) => {
                self.parse_error(ParseErrorCode::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers);
                self.clear_doctype_identifier(DoctypeField::SystemIdentifier);
                self.switch_to(Self::identifier_state(false, quote));
            }
            None => self.eof_in_doctype(),
            Some(_) => {
                self.parse_error(ParseErrorCode::MissingQuoteBeforeDoctypeSystemIdentifier);
                self.set_force_quirks();
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.62 Between DOCTYPE public and system identifiers state](https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state)
    pub(super) fn handle_between_doctype_public_and_system_identifiers_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            Some(quote @ ('"' | '\'')) => {
                self.clear_doctype_identifier(DoctypeField::SystemIdentifier);
                self.switch_to(Self::identifier_state(false, quote));
            }
            None => self.eof_in_doctype(),
            Some(_) => {
                self.parse_error(ParseErrorCode::MissingQuoteBeforeDoctypeSystemIdentifier);
                self.set_force_quirks();
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.67 After DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state)
    pub(super) fn handle_after_doctype_system_identifier_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            None => self.eof_in_doctype(),
            // "This is an unexpected-character-after-doctype-system-identifier
            // parse error. Reconsume in the bogus DOCTYPE state. (This does
            // not set the current DOCTYPE token's force-quirks flag to on.)"
            Some(_) => {
                self.parse_error(ParseErrorCode::UnexpectedCharacterAfterDoctypeSystemIdentifier);
                self.reconsume_in(TokenizerState::BogusDOCTYPE);
            }
        }
    }

    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    pub(super) fn handle_bogus_doctype_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            Some('\0') => self.parse_error(ParseErrorCode::UnexpectedNullCharacter),
            None => {
                self.emit_current_token();
                self.emit_eof();
            }
            Some(_) => {}
        }
    }

    const fn identifier_state(public: bool, quote: char) -> TokenizerState {
        match (public, quote) {
            (true, '"') => TokenizerState::DOCTYPEPublicIdentifierDoubleQuoted,
            (true, _) => TokenizerState::DOCTYPEPublicIdentifierSingleQuoted,
            (false, '"') => TokenizerState::DOCTYPESystemIdentifierDoubleQuoted,
            (false, _) => TokenizerState::DOCTYPESystemIdentifierSingleQuoted,
        }
    }
}
