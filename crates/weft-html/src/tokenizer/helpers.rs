//! Helper functions for the HTML tokenizer.
//!
//! [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Lookahead ("If the next few characters are")
//! - Token emission ("Emit the current token")
//! - Tag, attribute, comment and DOCTYPE builders

use super::core::{HTMLTokenizer, TokenBuilder, TokenizerState};
use super::token::{Attribute, CharClass, Doctype, Token};
use crate::error::ParseErrorCode;

// =============================================================================
// State Transition Helpers
// =============================================================================

impl HTMLTokenizer {
    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Switch to the X state"
    ///
    /// Transitions to a new state. The next character will be consumed on the
    /// next step, unless a reconsume is still pending.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
    ///
    /// "Reconsume in the X state"
    ///
    /// Transitions to a new state without consuming the current character.
    pub(super) const fn reconsume_in(&mut self, new_state: TokenizerState) {
        self.reconsume = true;
        self.state = new_state;
    }

    /// [§ 12.1.4 ASCII whitespace](https://infra.spec.whatwg.org/#ascii-whitespace)
    ///
    /// "ASCII whitespace is U+0009 TAB, U+000A LF, U+000C FF, U+000D CR,
    /// or U+0020 SPACE."
    ///
    /// NOTE: the tokenizer never sees CR, the input stream normalizes it.
    pub(super) const fn is_whitespace_char(input_char: char) -> bool {
        matches!(input_char, '\t' | '\n' | '\x0C' | ' ')
    }

    /// "If the next few characters are..."
    ///
    /// Compares against the characters after the current one without
    /// consuming them.
    pub(super) fn next_few_characters_are(&self, target: &str) -> bool {
        target
            .chars()
            .enumerate()
            .all(|(i, expected)| self.input.peek(i) == Some(expected))
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// "ASCII case-insensitive match for the word 'DOCTYPE'"
    pub(super) fn next_few_characters_are_case_insensitive(&self, target: &str) -> bool {
        target.chars().enumerate().all(|(i, expected)| {
            self.input
                .peek(i)
                .is_some_and(|c| c.eq_ignore_ascii_case(&expected))
        })
    }

    /// Consume `count` characters already checked with a lookahead.
    pub(super) fn consume_characters(&mut self, count: usize) {
        for _ in 0..count {
            let _ = self.input.consume();
        }
    }

    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    ///
    /// "An appropriate end tag token is an end tag token whose tag name matches
    /// the tag name of the last start tag to have been emitted from this
    /// tokenizer, if any. If no start tag has been emitted from this
    /// tokenizer, then no end tag token is appropriate."
    pub(super) fn is_appropriate_end_tag_token(&self) -> bool {
        match (&self.current_token, &self.last_start_tag_name) {
            (Some(TokenBuilder::EndTag(tag)), Some(last)) => tag.name == *last,
            _ => false,
        }
    }
}

// =============================================================================
// Emission
// =============================================================================

impl HTMLTokenizer {
    /// Queue a token. Adjacent character runs of the same class are merged.
    ///
    /// [§ 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
    /// "When an end tag token is emitted with attributes, that is an
    /// end-tag-with-attributes parse error. When an end tag token is emitted
    /// with its self-closing flag set, that is an end-tag-with-trailing-solidus
    /// parse error."
    pub(super) fn emit_token(&mut self, token: Token) {
        let token = match token {
            Token::StartTag(tag) => {
                self.last_start_tag_name = Some(tag.name.clone());
                Token::StartTag(tag)
            }
            Token::EndTag(mut tag) => {
                if !tag.attributes.is_empty() {
                    self.input.report(ParseErrorCode::EndTagWithAttributes, &[&tag.name]);
                    tag.attributes.clear();
                }
                if tag.self_closing {
                    self.input.report(ParseErrorCode::EndTagWithTrailingSolidus, &[&tag.name]);
                    tag.self_closing = false;
                }
                Token::EndTag(tag)
            }
            other => other,
        };
        let token = match self.pending.back_mut() {
            Some(last) => match last.try_merge(token) {
                Ok(()) => return,
                Err(token) => token,
            },
            None => token,
        };
        self.pending.push_back(token);
    }

    /// "Emit the current token"
    pub(super) fn emit_current_token(&mut self) {
        self.finish_attribute();
        let Some(builder) = self.current_token.take() else {
            return;
        };
        let token = match builder {
            TokenBuilder::StartTag(tag) => Token::StartTag(tag),
            TokenBuilder::EndTag(tag) => Token::EndTag(tag),
            TokenBuilder::Comment(data) => Token::Comment { data },
            TokenBuilder::Doctype(doctype) => Token::Doctype(doctype),
        };
        self.emit_token(token);
    }

    /// "Emit the current input character as a character token."
    pub(super) fn emit_character(&mut self, c: char) {
        self.emit_token(Token::characters(CharClass::of(c), c.to_string()));
    }

    /// Emit each character of `text` as a character token.
    pub(super) fn emit_str(&mut self, text: &str) {
        for c in text.chars() {
            self.emit_character(c);
        }
    }

    /// "Emit an end-of-file token."
    pub(super) fn emit_eof(&mut self) {
        self.emit_token(Token::EndOfFile);
        self.eof_emitted = true;
    }

    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    ///
    /// Parse errors are recorded on the input stream, at the current position.
    pub(super) fn parse_error(&mut self, code: ParseErrorCode) {
        self.input.report(code, &[]);
    }
}

// =============================================================================
// Token Builders
// =============================================================================

impl HTMLTokenizer {
    /// "Append the current input character to the current tag token's tag name."
    pub(super) fn append_to_tag_name(&mut self, c: char) {
        match &mut self.current_token {
            Some(TokenBuilder::StartTag(tag) | TokenBuilder::EndTag(tag)) => tag.name.push(c),
            _ => debug_assert!(false, "no tag under construction"),
        }
    }

    /// "Set the self-closing flag of the current tag token."
    pub(super) fn set_self_closing(&mut self) {
        if let Some(TokenBuilder::StartTag(tag) | TokenBuilder::EndTag(tag)) = &mut self.current_token {
            tag.self_closing = true;
        }
    }

    /// "Start a new attribute in the current tag token. Set that attribute
    /// name and value to the empty string."
    pub(super) fn start_new_attribute(&mut self) {
        self.finish_attribute();
        self.current_attribute = Some(Attribute::new(String::new(), String::new()));
        self.current_attribute_is_duplicate = false;
    }

    pub(super) fn append_to_attribute_name(&mut self, c: char) {
        if let Some(attr) = &mut self.current_attribute {
            attr.name.push(c);
        }
    }

    pub(super) fn append_to_attribute_value(&mut self, text: &str) {
        if let Some(attr) = &mut self.current_attribute {
            attr.value.push_str(text);
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    ///
    /// "When the user agent leaves the attribute name state (and before
    /// emitting the tag token, if appropriate), the complete attribute's name
    /// must be compared to the other attributes on the same token; if there
    /// is already an attribute on the token with the exact same name, then
    /// this is a duplicate-attribute parse error and the new attribute must
    /// be removed from the token."
    ///
    /// The attribute is only marked here. Its value is still collected and
    /// then thrown away in [`Self::finish_attribute`].
    pub(super) fn check_duplicate_attribute(&mut self) {
        let Some(attr) = &self.current_attribute else {
            return;
        };
        let is_duplicate = match &self.current_token {
            Some(TokenBuilder::StartTag(tag) | TokenBuilder::EndTag(tag)) => tag.has_attribute(&attr.name),
            _ => false,
        };
        if is_duplicate {
            let name = attr.name.clone();
            self.input.report(ParseErrorCode::DuplicateAttribute, &[&name]);
            self.current_attribute_is_duplicate = true;
        }
    }

    /// Fold the attribute under construction into the current tag.
    pub(super) fn finish_attribute(&mut self) {
        let Some(attr) = self.current_attribute.take() else {
            return;
        };
        if std::mem::take(&mut self.current_attribute_is_duplicate) {
            return;
        }
        if let Some(TokenBuilder::StartTag(tag) | TokenBuilder::EndTag(tag)) = &mut self.current_token {
            tag.attributes.push(attr);
        }
    }

    /// Append to the data of the current comment token.
    pub(super) fn append_to_comment(&mut self, text: &str) {
        match &mut self.current_token {
            Some(TokenBuilder::Comment(data)) => data.push_str(text),
            _ => debug_assert!(false, "no comment under construction"),
        }
    }

    /// "Create a new DOCTYPE token."
    pub(super) fn create_doctype(&mut self) {
        self.current_token = Some(TokenBuilder::Doctype(Doctype::default()));
    }

    /// The DOCTYPE under construction.
    pub(super) fn current_doctype(&mut self) -> Option<&mut Doctype> {
        match &mut self.current_token {
            Some(TokenBuilder::Doctype(doctype)) => Some(doctype),
            _ => None,
        }
    }

    /// "Set the current DOCTYPE token's force-quirks flag to on."
    pub(super) fn set_force_quirks(&mut self) {
        if let Some(doctype) = self.current_doctype() {
            doctype.force_quirks = true;
        }
    }

    /// Append to the DOCTYPE name, or to the public or system identifier.
    pub(super) fn append_to_doctype_field(&mut self, field: DoctypeField, c: char) {
        if let Some(doctype) = self.current_doctype() {
            let slot = match field {
                DoctypeField::Name => &mut doctype.name,
                DoctypeField::PublicIdentifier => &mut doctype.public_identifier,
                DoctypeField::SystemIdentifier => &mut doctype.system_identifier,
            };
            slot.get_or_insert_with(String::new).push(c);
        }
    }

    /// Set the public or system identifier to the empty string (not missing).
    pub(super) fn clear_doctype_identifier(&mut self, field: DoctypeField) {
        if let Some(doctype) = self.current_doctype() {
            match field {
                DoctypeField::Name => doctype.name = Some(String::new()),
                DoctypeField::PublicIdentifier => doctype.public_identifier = Some(String::new()),
                DoctypeField::SystemIdentifier => doctype.system_identifier = Some(String::new()),
            }
        }
    }
}

/// The three string fields of a DOCTYPE token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum DoctypeField {
    Name,
    PublicIdentifier,
    SystemIdentifier,
}

impl DoctypeField {
    pub(super) const fn identifier(public: bool) -> Self {
        if public {
            Self::PublicIdentifier
        } else {
            Self::SystemIdentifier
        }
    }
}
