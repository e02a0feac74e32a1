//! Markup declarations, comments and CDATA sections.
//!
//! [§ 13.2.5.41](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
//! through [§ 13.2.5.52](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state),
//! plus [§ 13.2.5.69](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-state)
//! through § 13.2.5.71.

use super::core::{HTMLTokenizer, TokenBuilder, TokenizerState};
use crate::error::ParseErrorCode;

impl HTMLTokenizer {
    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    pub(super) fn handle_bogus_comment_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            // "Emit the comment. Emit an end-of-file token."
            None => {
                self.emit_current_token();
                self.emit_eof();
            }
            Some('\0') => {
                self.parse_error(ParseErrorCode::UnexpectedNullCharacter);
                self.append_to_comment("\u{FFFD}");
            }
            Some(c) => {
                let mut run = String::from(c);
                run.push_str(&self.input.consume_until(|n| n == '>' || n == '\0', None));
                self.append_to_comment(&run);
            }
        }
    }

    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    ///
    /// Looks ahead without consuming the current character.
    pub(super) fn handle_markup_declaration_open_state(&mut self) {
        if self.next_few_characters_are("--") {
            // "Two U+002D HYPHEN-MINUS characters (-): Consume those two
            // characters, create a comment token whose data is the empty
            // string, and switch to the comment start state."
            self.consume_characters(2);
            self.current_token = Some(TokenBuilder::Comment(String::new()));
            self.switch_to(TokenizerState::CommentStart);
        } else if self.next_few_characters_are_case_insensitive("DOCTYPE") {
            // "ASCII case-insensitive match for the word "DOCTYPE": Consume
            // those characters and switch to the DOCTYPE state."
            self.consume_characters(7);
            self.switch_to(TokenizerState::DOCTYPE);
        } else if self.next_few_characters_are("[CDATA[") {
            self.consume_characters(7);
            // "If there is an adjusted current node and it is not an element
            // in the HTML namespace, then switch to the CDATA section state.
            // Otherwise, this is a cdata-in-html-content parse error. Create a
            // comment token whose data is the "[CDATA[" string. Switch to the
            // bogus comment state."
            if self.cdata_allowed {
                self.switch_to(TokenizerState::CDATASection);
            } else {
                self.parse_error(ParseErrorCode::CdataInHtmlContent);
                self.current_token = Some(TokenBuilder::Comment("[CDATA[".to_string()));
                self.switch_to(TokenizerState::BogusComment);
            }
        } else {
            // "This is an incorrectly-opened-comment parse error. Create a
            // comment token whose data is the empty string. Switch to the
            // bogus comment state (don't consume anything in the current
            // state)."
            self.parse_error(ParseErrorCode::IncorrectlyOpenedComment);
            self.current_token = Some(TokenBuilder::Comment(String::new()));
            self.switch_to(TokenizerState::BogusComment);
        }
    }

    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    pub(super) fn handle_comment_start_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentStartDash),
            Some('>') => {
                self.parse_error(ParseErrorCode::AbruptClosingOfEmptyComment);
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            _ => self.reconsume_in(TokenizerState::Comment),
        }
    }

    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    pub(super) fn handle_comment_start_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            Some('>') => {
                self.parse_error(ParseErrorCode::AbruptClosingOfEmptyComment);
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            None => self.eof_in_comment(),
            Some(_) => {
                self.append_to_comment("-");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    pub(super) fn handle_comment_state(&mut self) {
        match self.current_input_character {
            Some('<') => {
                self.append_to_comment("<");
                self.switch_to(TokenizerState::CommentLessThanSign);
            }
            Some('-') => self.switch_to(TokenizerState::CommentEndDash),
            Some('\0') => {
                self.parse_error(ParseErrorCode::UnexpectedNullCharacter);
                self.append_to_comment("\u{FFFD}");
            }
            None => self.eof_in_comment(),
            Some(c) => {
                let mut run = String::from(c);
                run.push_str(&self.input.consume_until(|n| matches!(n, '<' | '-' | '\0'), None));
                self.append_to_comment(&run);
            }
        }
    }

    /// [§ 13.2.5.46 Comment less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-state)
    pub(super) fn handle_comment_less_than_sign_state(&mut self) {
        match self.current_input_character {
            Some('!') => {
                self.append_to_comment("!");
                self.switch_to(TokenizerState::CommentLessThanSignBang);
            }
            Some('<') => self.append_to_comment("<"),
            _ => self.reconsume_in(TokenizerState::Comment),
        }
    }

    /// [§ 13.2.5.47 Comment less-than sign bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-state)
    pub(super) fn handle_comment_less_than_sign_bang_state(&mut self) {
        if self.current_input_character == Some('-') {
            self.switch_to(TokenizerState::CommentLessThanSignBangDash);
        } else {
            self.reconsume_in(TokenizerState::Comment);
        }
    }

    /// [§ 13.2.5.48 Comment less-than sign bang dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-state)
    pub(super) fn handle_comment_less_than_sign_bang_dash_state(&mut self) {
        if self.current_input_character == Some('-') {
            self.switch_to(TokenizerState::CommentLessThanSignBangDashDash);
        } else {
            self.reconsume_in(TokenizerState::CommentEndDash);
        }
    }

    /// [§ 13.2.5.49 Comment less-than sign bang dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-dash-state)
    pub(super) fn handle_comment_less_than_sign_bang_dash_dash_state(&mut self) {
        match self.current_input_character {
            Some('>') | None => self.reconsume_in(TokenizerState::CommentEnd),
            // "This is a nested-comment parse error. Reconsume in the comment
            // end state."
            Some(_) => {
                self.parse_error(ParseErrorCode::NestedComment);
                self.reconsume_in(TokenizerState::CommentEnd);
            }
        }
    }

    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    pub(super) fn handle_comment_end_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            None => self.eof_in_comment(),
            Some(_) => {
                self.append_to_comment("-");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    pub(super) fn handle_comment_end_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            Some('!') => self.switch_to(TokenizerState::CommentEndBang),
            Some('-') => self.append_to_comment("-"),
            None => self.eof_in_comment(),
            Some(_) => {
                self.append_to_comment("--");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state)
    pub(super) fn handle_comment_end_bang_state(&mut self) {
        match self.current_input_character {
            Some('-') => {
                self.append_to_comment("--!");
                self.switch_to(TokenizerState::CommentEndDash);
            }
            Some('>') => {
                self.parse_error(ParseErrorCode::IncorrectlyClosedComment);
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            None => self.eof_in_comment(),
            Some(_) => {
                self.append_to_comment("--!");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// "This is an eof-in-comment parse error. Emit the current comment
    /// token. Emit an end-of-file token."
    fn eof_in_comment(&mut self) {
        self.parse_error(ParseErrorCode::EofInComment);
        self.emit_current_token();
        self.emit_eof();
    }

    /// [§ 13.2.5.69 CDATA section state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-state)
    ///
    /// U+0000 passes through untouched; the tree builder replaces it.
    pub(super) fn handle_cdata_section_state(&mut self) {
        match self.current_input_character {
            Some(']') => self.switch_to(TokenizerState::CDATASectionBracket),
            None => {
                self.parse_error(ParseErrorCode::EofInCdata);
                self.emit_eof();
            }
            Some(c) => self.emit_text_run(c, &[']', '\0']),
        }
    }

    /// [§ 13.2.5.70 CDATA section bracket state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-bracket-state)
    pub(super) fn handle_cdata_section_bracket_state(&mut self) {
        if self.current_input_character == Some(']') {
            self.switch_to(TokenizerState::CDATASectionEnd);
        } else {
            self.emit_character(']');
            self.reconsume_in(TokenizerState::CDATASection);
        }
    }

    /// [§ 13.2.5.71 CDATA section end state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-end-state)
    pub(super) fn handle_cdata_section_end_state(&mut self) {
        match self.current_input_character {
            Some(']') => self.emit_character(']'),
            Some('>') => self.switch_to(TokenizerState::Data),
            _ => {
                self.emit_str("]]");
                self.reconsume_in(TokenizerState::CDATASection);
            }
        }
    }
}
