//! The tokenizer state machine: states, driver loop, and the data, tag and
//! attribute states. Script data, comment, DOCTYPE and character reference
//! states live in sibling modules as further `impl HTMLTokenizer` blocks.

use std::collections::VecDeque;

use strum_macros::Display;

use super::token::{Attribute, CharClass, Doctype, Tag, Token};
use crate::encoding::InputStream;
use crate::error::{ParseError, ParseErrorCode};

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// The tokenizer state machine. Each state corresponds to a section in § 13.2.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum TokenizerState {
    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    Data,
    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    RCDATA,
    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    RAWTEXT,
    /// [§ 13.2.5.4 Script data state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-state)
    ScriptData,
    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state)
    PLAINTEXT,
    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    TagOpen,
    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    EndTagOpen,
    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    TagName,
    /// [§ 13.2.5.9 RCDATA less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-less-than-sign-state)
    RCDATALessThanSign,
    /// [§ 13.2.5.10 RCDATA end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-open-state)
    RCDATAEndTagOpen,
    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    RCDATAEndTagName,
    /// [§ 13.2.5.12 RAWTEXT less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-less-than-sign-state)
    RAWTEXTLessThanSign,
    /// [§ 13.2.5.13 RAWTEXT end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-open-state)
    RAWTEXTEndTagOpen,
    /// [§ 13.2.5.14 RAWTEXT end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-end-tag-name-state)
    RAWTEXTEndTagName,
    /// [§ 13.2.5.15 Script data less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-less-than-sign-state)
    ScriptDataLessThanSign,
    /// [§ 13.2.5.16 Script data end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-open-state)
    ScriptDataEndTagOpen,
    /// [§ 13.2.5.17 Script data end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-end-tag-name-state)
    ScriptDataEndTagName,
    /// [§ 13.2.5.18 Script data escape start state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-state)
    ScriptDataEscapeStart,
    /// [§ 13.2.5.19 Script data escape start dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escape-start-dash-state)
    ScriptDataEscapeStartDash,
    /// [§ 13.2.5.20 Script data escaped state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-state)
    ScriptDataEscaped,
    /// [§ 13.2.5.21 Script data escaped dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-state)
    ScriptDataEscapedDash,
    /// [§ 13.2.5.22 Script data escaped dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-dash-dash-state)
    ScriptDataEscapedDashDash,
    /// [§ 13.2.5.23 Script data escaped less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-less-than-sign-state)
    ScriptDataEscapedLessThanSign,
    /// [§ 13.2.5.24 Script data escaped end tag open state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-open-state)
    ScriptDataEscapedEndTagOpen,
    /// [§ 13.2.5.25 Script data escaped end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-escaped-end-tag-name-state)
    ScriptDataEscapedEndTagName,
    /// [§ 13.2.5.26 Script data double escape start state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-start-state)
    ScriptDataDoubleEscapeStart,
    /// [§ 13.2.5.27 Script data double escaped state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-state)
    ScriptDataDoubleEscaped,
    /// [§ 13.2.5.28 Script data double escaped dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-state)
    ScriptDataDoubleEscapedDash,
    /// [§ 13.2.5.29 Script data double escaped dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-dash-dash-state)
    ScriptDataDoubleEscapedDashDash,
    /// [§ 13.2.5.30 Script data double escaped less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escaped-less-than-sign-state)
    ScriptDataDoubleEscapedLessThanSign,
    /// [§ 13.2.5.31 Script data double escape end state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-double-escape-end-state)
    ScriptDataDoubleEscapeEnd,
    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    BeforeAttributeName,
    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    AttributeName,
    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    AfterAttributeName,
    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    BeforeAttributeValue,
    /// [§ 13.2.5.36 Attribute value (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state)
    AttributeValueDoubleQuoted,
    /// [§ 13.2.5.37 Attribute value (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    AttributeValueSingleQuoted,
    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    AttributeValueUnquoted,
    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    AfterAttributeValueQuoted,
    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    SelfClosingStartTag,
    /// [§ 13.2.5.41 Bogus comment state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-comment-state)
    BogusComment,
    /// [§ 13.2.5.42 Markup declaration open state](https://html.spec.whatwg.org/multipage/parsing.html#markup-declaration-open-state)
    MarkupDeclarationOpen,
    /// [§ 13.2.5.43 Comment start state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-state)
    CommentStart,
    /// [§ 13.2.5.44 Comment start dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-start-dash-state)
    CommentStartDash,
    /// [§ 13.2.5.45 Comment state](https://html.spec.whatwg.org/multipage/parsing.html#comment-state)
    Comment,
    /// [§ 13.2.5.46 Comment less-than sign state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-state)
    CommentLessThanSign,
    /// [§ 13.2.5.47 Comment less-than sign bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-state)
    CommentLessThanSignBang,
    /// [§ 13.2.5.48 Comment less-than sign bang dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-state)
    CommentLessThanSignBangDash,
    /// [§ 13.2.5.49 Comment less-than sign bang dash dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-less-than-sign-bang-dash-dash-state)
    CommentLessThanSignBangDashDash,
    /// [§ 13.2.5.50 Comment end dash state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-dash-state)
    CommentEndDash,
    /// [§ 13.2.5.51 Comment end state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-state)
    CommentEnd,
    /// [§ 13.2.5.52 Comment end bang state](https://html.spec.whatwg.org/multipage/parsing.html#comment-end-bang-state)
    CommentEndBang,
    /// [§ 13.2.5.53 DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-state)
    DOCTYPE,
    /// [§ 13.2.5.54 Before DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-name-state)
    BeforeDOCTYPEName,
    /// [§ 13.2.5.55 DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-name-state)
    DOCTYPEName,
    /// [§ 13.2.5.56 After DOCTYPE name state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-name-state)
    AfterDOCTYPEName,
    /// [§ 13.2.5.57 After DOCTYPE public keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-keyword-state)
    AfterDOCTYPEPublicKeyword,
    /// [§ 13.2.5.58 Before DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-public-identifier-state)
    BeforeDOCTYPEPublicIdentifier,
    /// [§ 13.2.5.59 DOCTYPE public identifier (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(double-quoted)-state)
    DOCTYPEPublicIdentifierDoubleQuoted,
    /// [§ 13.2.5.60 DOCTYPE public identifier (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-public-identifier-(single-quoted)-state)
    DOCTYPEPublicIdentifierSingleQuoted,
    /// [§ 13.2.5.61 After DOCTYPE public identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-public-identifier-state)
    AfterDOCTYPEPublicIdentifier,
    /// [§ 13.2.5.62 Between DOCTYPE public and system identifiers state](https://html.spec.whatwg.org/multipage/parsing.html#between-doctype-public-and-system-identifiers-state)
    BetweenDOCTYPEPublicAndSystemIdentifiers,
    /// [§ 13.2.5.63 After DOCTYPE system keyword state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-keyword-state)
    AfterDOCTYPESystemKeyword,
    /// [§ 13.2.5.64 Before DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#before-doctype-system-identifier-state)
    BeforeDOCTYPESystemIdentifier,
    /// [§ 13.2.5.65 DOCTYPE system identifier (double-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(double-quoted)-state)
    DOCTYPESystemIdentifierDoubleQuoted,
    /// [§ 13.2.5.66 DOCTYPE system identifier (single-quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#doctype-system-identifier-(single-quoted)-state)
    DOCTYPESystemIdentifierSingleQuoted,
    /// [§ 13.2.5.67 After DOCTYPE system identifier state](https://html.spec.whatwg.org/multipage/parsing.html#after-doctype-system-identifier-state)
    AfterDOCTYPESystemIdentifier,
    /// [§ 13.2.5.68 Bogus DOCTYPE state](https://html.spec.whatwg.org/multipage/parsing.html#bogus-doctype-state)
    BogusDOCTYPE,
    /// [§ 13.2.5.69 CDATA section state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-state)
    CDATASection,
    /// [§ 13.2.5.70 CDATA section bracket state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-bracket-state)
    CDATASectionBracket,
    /// [§ 13.2.5.71 CDATA section end state](https://html.spec.whatwg.org/multipage/parsing.html#cdata-section-end-state)
    CDATASectionEnd,
    /// [§ 13.2.5.72 Character reference state](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-state)
    CharacterReference,
    /// [§ 13.2.5.73 Named character reference state](https://html.spec.whatwg.org/multipage/parsing.html#named-character-reference-state)
    NamedCharacterReference,
    /// [§ 13.2.5.74 Ambiguous ampersand state](https://html.spec.whatwg.org/multipage/parsing.html#ambiguous-ampersand-state)
    AmbiguousAmpersand,
    /// [§ 13.2.5.75 Numeric character reference state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-state)
    NumericCharacterReference,
    /// [§ 13.2.5.76 Hexadecimal character reference start state](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-start-state)
    HexadecimalCharacterReferenceStart,
    /// [§ 13.2.5.77 Decimal character reference start state](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-start-state)
    DecimalCharacterReferenceStart,
    /// [§ 13.2.5.78 Hexadecimal character reference state](https://html.spec.whatwg.org/multipage/parsing.html#hexadecimal-character-reference-state)
    HexadecimalCharacterReference,
    /// [§ 13.2.5.79 Decimal character reference state](https://html.spec.whatwg.org/multipage/parsing.html#decimal-character-reference-state)
    DecimalCharacterReference,
    /// [§ 13.2.5.80 Numeric character reference end state](https://html.spec.whatwg.org/multipage/parsing.html#numeric-character-reference-end-state)
    NumericCharacterReferenceEnd,
}

/// The token currently under construction.
#[derive(Debug, Clone)]
pub(super) enum TokenBuilder {
    StartTag(Tag),
    EndTag(Tag),
    Comment(String),
    Doctype(Doctype),
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "Implementations must act as if they used the following state machine to tokenize HTML."
///
/// The tokenizer is a pull source: each call to [`Iterator::next`] runs the
/// state machine just until a token is ready. That lets the tree builder
/// change [`Self::state`] between tokens, which `<title>`, `<script>`,
/// `<plaintext>` and friends require.
#[derive(Debug)]
pub struct HTMLTokenizer {
    pub(super) input: InputStream,
    pub(super) state: TokenizerState,
    /// "When a state says to reconsume a matched character in a specified
    /// state, ... the return state".
    pub(super) return_state: TokenizerState,
    pub(super) current_input_character: Option<char>,
    /// When true, the next step will not consume a new character.
    /// "Reconsume in the X state" sets this flag.
    pub(super) reconsume: bool,
    pub(super) current_token: Option<TokenBuilder>,
    /// The attribute being built; folded into the current tag once complete.
    pub(super) current_attribute: Option<Attribute>,
    /// "if there is already an attribute on the token with the exact same
    /// name, then this is a duplicate-attribute parse error and the new
    /// attribute must be removed from the token."
    pub(super) current_attribute_is_duplicate: bool,

    /// "The last start tag token emitted is used as part of the tree
    /// construction stage and in the RCDATA, RAWTEXT, and script data states."
    pub(super) last_start_tag_name: Option<String>,

    /// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#temporary-buffer)
    pub(super) temporary_buffer: String,

    /// [§ 13.2.5.75](https://html.spec.whatwg.org/multipage/parsing.html#character-reference-code)
    pub(super) character_reference_code: u32,

    /// Tokens emitted but not yet handed out.
    pub(super) pending: VecDeque<Token>,

    /// "If there is an adjusted current node and it is not an element in the
    /// HTML namespace", kept up to date by the tree builder.
    pub(super) cdata_allowed: bool,

    pub(super) eof_emitted: bool,
}

impl HTMLTokenizer {
    /// Create a new tokenizer over a prepared input stream.
    ///
    /// "The tokenizer state machine consists of the states defined in the
    /// following subsections. The initial state is the data state."
    #[must_use]
    pub const fn new(input: InputStream) -> Self {
        Self {
            input,
            state: TokenizerState::Data,
            return_state: TokenizerState::Data,
            current_input_character: None,
            reconsume: false,
            current_token: None,
            current_attribute: None,
            current_attribute_is_duplicate: false,
            last_start_tag_name: None,
            temporary_buffer: String::new(),
            character_reference_code: 0,
            pending: VecDeque::new(),
            cdata_allowed: false,
            eof_emitted: false,
        }
    }

    /// Convenience constructor for text that is already decoded.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self::new(InputStream::from_text(text))
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> TokenizerState {
        self.state
    }

    /// Move the machine to `state`. Used by the tree builder after
    /// `<title>`, `<style>`, `<script>`, `<plaintext>` and so on.
    pub const fn set_state(&mut self, state: TokenizerState) {
        self.state = state;
    }

    /// Seed the "last start tag" used by the appropriate end tag check.
    pub fn set_last_start_tag(&mut self, name: Option<&str>) {
        self.last_start_tag_name = name.map(str::to_string);
    }

    /// Allow or forbid `<![CDATA[` sections at the next markup declaration.
    pub const fn set_cdata_allowed(&mut self, allowed: bool) {
        self.cdata_allowed = allowed;
    }

    /// The underlying input stream.
    #[must_use]
    pub const fn input(&self) -> &InputStream {
        &self.input
    }

    /// Mutable access to the input stream, for errors and encoding changes.
    pub const fn input_mut(&mut self) -> &mut InputStream {
        &mut self.input
    }

    /// Give the input stream back.
    #[must_use]
    pub fn into_input(self) -> InputStream {
        self.input
    }

    /// Take all errors reported so far.
    pub fn take_errors(&mut self) -> Vec<ParseError> {
        self.input.take_errors()
    }

    /// Run one step of the state machine.
    fn step(&mut self) {
        // These two states act without consuming a character. The numeric
        // end state may have been entered via "reconsume", in which case the
        // pending reconsume carries over into the return state.
        match self.state {
            TokenizerState::MarkupDeclarationOpen => {
                self.handle_markup_declaration_open_state();
                return;
            }
            TokenizerState::NumericCharacterReferenceEnd => {
                self.handle_numeric_character_reference_end_state();
                return;
            }
            _ => {}
        }

        // Each state begins by consuming the next input character,
        // unless we're reconsuming from a previous state transition.
        if self.reconsume {
            self.reconsume = false;
        } else {
            self.current_input_character = self.input.consume();
        }

        match self.state {
            TokenizerState::Data => self.handle_data_state(),
            TokenizerState::RCDATA => self.handle_rcdata_state(),
            TokenizerState::RAWTEXT => self.handle_rawtext_state(),
            TokenizerState::ScriptData => self.handle_script_data_state(),
            TokenizerState::PLAINTEXT => self.handle_plaintext_state(),
            TokenizerState::TagOpen => self.handle_tag_open_state(),
            TokenizerState::EndTagOpen => self.handle_end_tag_open_state(),
            TokenizerState::TagName => self.handle_tag_name_state(),
            TokenizerState::RCDATALessThanSign => {
                self.handle_text_less_than_sign_state(TokenizerState::RCDATA, TokenizerState::RCDATAEndTagOpen);
            }
            TokenizerState::RCDATAEndTagOpen => {
                self.handle_text_end_tag_open_state(TokenizerState::RCDATA, TokenizerState::RCDATAEndTagName);
            }
            TokenizerState::RCDATAEndTagName => self.handle_text_end_tag_name_state(TokenizerState::RCDATA),
            TokenizerState::RAWTEXTLessThanSign => {
                self.handle_text_less_than_sign_state(TokenizerState::RAWTEXT, TokenizerState::RAWTEXTEndTagOpen);
            }
            TokenizerState::RAWTEXTEndTagOpen => {
                self.handle_text_end_tag_open_state(TokenizerState::RAWTEXT, TokenizerState::RAWTEXTEndTagName);
            }
            TokenizerState::RAWTEXTEndTagName => self.handle_text_end_tag_name_state(TokenizerState::RAWTEXT),
            TokenizerState::ScriptDataLessThanSign => self.handle_script_data_less_than_sign_state(),
            TokenizerState::ScriptDataEndTagOpen => {
                self.handle_text_end_tag_open_state(TokenizerState::ScriptData, TokenizerState::ScriptDataEndTagName);
            }
            TokenizerState::ScriptDataEndTagName => self.handle_text_end_tag_name_state(TokenizerState::ScriptData),
            TokenizerState::ScriptDataEscapeStart => self.handle_script_data_escape_start_state(),
            TokenizerState::ScriptDataEscapeStartDash => self.handle_script_data_escape_start_dash_state(),
            TokenizerState::ScriptDataEscaped => self.handle_script_data_escaped_state(),
            TokenizerState::ScriptDataEscapedDash => self.handle_script_data_escaped_dash_state(),
            TokenizerState::ScriptDataEscapedDashDash => self.handle_script_data_escaped_dash_dash_state(),
            TokenizerState::ScriptDataEscapedLessThanSign => {
                self.handle_script_data_escaped_less_than_sign_state();
            }
            TokenizerState::ScriptDataEscapedEndTagOpen => {
                self.handle_text_end_tag_open_state(
                    TokenizerState::ScriptDataEscaped,
                    TokenizerState::ScriptDataEscapedEndTagName,
                );
            }
            TokenizerState::ScriptDataEscapedEndTagName => {
                self.handle_text_end_tag_name_state(TokenizerState::ScriptDataEscaped);
            }
            TokenizerState::ScriptDataDoubleEscapeStart => {
                self.handle_script_data_double_escape_boundary_state(
                    TokenizerState::ScriptDataDoubleEscaped,
                    TokenizerState::ScriptDataEscaped,
                );
            }
            TokenizerState::ScriptDataDoubleEscaped => self.handle_script_data_double_escaped_state(),
            TokenizerState::ScriptDataDoubleEscapedDash => self.handle_script_data_double_escaped_dash_state(),
            TokenizerState::ScriptDataDoubleEscapedDashDash => {
                self.handle_script_data_double_escaped_dash_dash_state();
            }
            TokenizerState::ScriptDataDoubleEscapedLessThanSign => {
                self.handle_script_data_double_escaped_less_than_sign_state();
            }
            TokenizerState::ScriptDataDoubleEscapeEnd => {
                self.handle_script_data_double_escape_boundary_state(
                    TokenizerState::ScriptDataEscaped,
                    TokenizerState::ScriptDataDoubleEscaped,
                );
            }
            TokenizerState::BeforeAttributeName => self.handle_before_attribute_name_state(),
            TokenizerState::AttributeName => self.handle_attribute_name_state(),
            TokenizerState::AfterAttributeName => self.handle_after_attribute_name_state(),
            TokenizerState::BeforeAttributeValue => self.handle_before_attribute_value_state(),
            TokenizerState::AttributeValueDoubleQuoted => self.handle_attribute_value_quoted_state('"'),
            TokenizerState::AttributeValueSingleQuoted => self.handle_attribute_value_quoted_state('\''),
            TokenizerState::AttributeValueUnquoted => self.handle_attribute_value_unquoted_state(),
            TokenizerState::AfterAttributeValueQuoted => self.handle_after_attribute_value_quoted_state(),
            TokenizerState::SelfClosingStartTag => self.handle_self_closing_start_tag_state(),
            TokenizerState::BogusComment => self.handle_bogus_comment_state(),
            TokenizerState::CommentStart => self.handle_comment_start_state(),
            TokenizerState::CommentStartDash => self.handle_comment_start_dash_state(),
            TokenizerState::Comment => self.handle_comment_state(),
            TokenizerState::CommentLessThanSign => self.handle_comment_less_than_sign_state(),
            TokenizerState::CommentLessThanSignBang => self.handle_comment_less_than_sign_bang_state(),
            TokenizerState::CommentLessThanSignBangDash => {
                self.handle_comment_less_than_sign_bang_dash_state();
            }
            TokenizerState::CommentLessThanSignBangDashDash => {
                self.handle_comment_less_than_sign_bang_dash_dash_state();
            }
            TokenizerState::CommentEndDash => self.handle_comment_end_dash_state(),
            TokenizerState::CommentEnd => self.handle_comment_end_state(),
            TokenizerState::CommentEndBang => self.handle_comment_end_bang_state(),
            TokenizerState::DOCTYPE => self.handle_doctype_state(),
            TokenizerState::BeforeDOCTYPEName => self.handle_before_doctype_name_state(),
            TokenizerState::DOCTYPEName => self.handle_doctype_name_state(),
            TokenizerState::AfterDOCTYPEName => self.handle_after_doctype_name_state(),
            TokenizerState::AfterDOCTYPEPublicKeyword => self.handle_after_doctype_keyword_state(true),
            TokenizerState::AfterDOCTYPESystemKeyword => self.handle_after_doctype_keyword_state(false),
            TokenizerState::BeforeDOCTYPEPublicIdentifier => {
                self.handle_before_doctype_identifier_state(true);
            }
            TokenizerState::BeforeDOCTYPESystemIdentifier => {
                self.handle_before_doctype_identifier_state(false);
            }
            TokenizerState::DOCTYPEPublicIdentifierDoubleQuoted => {
                self.handle_doctype_identifier_quoted_state(true, '"');
            }
            TokenizerState::DOCTYPEPublicIdentifierSingleQuoted => {
                self.handle_doctype_identifier_quoted_state(true, '\'');
            }
            TokenizerState::DOCTYPESystemIdentifierDoubleQuoted => {
                self.handle_doctype_identifier_quoted_state(false, '"');
            }
            TokenizerState::DOCTYPESystemIdentifierSingleQuoted => {
                self.handle_doctype_identifier_quoted_state(false, '\'');
            }
            TokenizerState::AfterDOCTYPEPublicIdentifier => self.handle_after_doctype_public_identifier_state(),
            TokenizerState::BetweenDOCTYPEPublicAndSystemIdentifiers => {
                self.handle_between_doctype_public_and_system_identifiers_state();
            }
            TokenizerState::AfterDOCTYPESystemIdentifier => self.handle_after_doctype_system_identifier_state(),
            TokenizerState::BogusDOCTYPE => self.handle_bogus_doctype_state(),
            TokenizerState::CDATASection => self.handle_cdata_section_state(),
            TokenizerState::CDATASectionBracket => self.handle_cdata_section_bracket_state(),
            TokenizerState::CDATASectionEnd => self.handle_cdata_section_end_state(),
            TokenizerState::CharacterReference => self.handle_character_reference_state(),
            TokenizerState::NamedCharacterReference => self.handle_named_character_reference_state(),
            TokenizerState::AmbiguousAmpersand => self.handle_ambiguous_ampersand_state(),
            TokenizerState::NumericCharacterReference => self.handle_numeric_character_reference_state(),
            TokenizerState::HexadecimalCharacterReferenceStart => {
                self.handle_numeric_character_reference_start_state(16);
            }
            TokenizerState::DecimalCharacterReferenceStart => {
                self.handle_numeric_character_reference_start_state(10);
            }
            TokenizerState::HexadecimalCharacterReference => self.handle_numeric_character_reference_digits_state(16),
            TokenizerState::DecimalCharacterReference => self.handle_numeric_character_reference_digits_state(10),
            TokenizerState::MarkupDeclarationOpen | TokenizerState::NumericCharacterReferenceEnd => {
                unreachable!("non-consuming states are handled before consumption")
            }
        }
    }

    /// Emit the run of text starting with the current input character:
    /// every following character of the same class up to one of `stops`.
    pub(super) fn emit_text_run(&mut self, first: char, stops: &[char]) {
        let class = CharClass::of(first);
        let mut data = String::from(first);
        data.push_str(
            &self
                .input
                .consume_until(|c| stops.contains(&c) || CharClass::of(c) != class, None),
        );
        self.emit_token(Token::characters(class, data));
    }

    // =========================================================================
    // Text states
    // =========================================================================

    /// [§ 13.2.5.1 Data state](https://html.spec.whatwg.org/multipage/parsing.html#data-state)
    fn handle_data_state(&mut self) {
        match self.current_input_character {
            // "U+0026 AMPERSAND (&) - Set the return state to the data state.
            // Switch to the character reference state."
            Some('&') => {
                self.return_state = TokenizerState::Data;
                self.switch_to(TokenizerState::CharacterReference);
            }
            // "U+003C LESS-THAN SIGN (<) - Switch to the tag open state."
            Some('<') => self.switch_to(TokenizerState::TagOpen),
            // "U+0000 NULL - This is an unexpected-null-character parse error.
            // Emit the current input character as a character token."
            Some('\0') => {
                self.parse_error(ParseErrorCode::UnexpectedNullCharacter);
                self.emit_character('\0');
            }
            // "EOF - Emit an end-of-file token."
            None => self.emit_eof(),
            // "Anything else - Emit the current input character as a character token."
            Some(c) => self.emit_text_run(c, &['&', '<', '\0']),
        }
    }

    /// [§ 13.2.5.2 RCDATA state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-state)
    fn handle_rcdata_state(&mut self) {
        match self.current_input_character {
            // "Set the return state to the RCDATA state. Switch to the character reference state."
            Some('&') => {
                self.return_state = TokenizerState::RCDATA;
                self.switch_to(TokenizerState::CharacterReference);
            }
            Some('<') => self.switch_to(TokenizerState::RCDATALessThanSign),
            // "This is an unexpected-null-character parse error. Emit a U+FFFD REPLACEMENT
            // CHARACTER character token."
            Some('\0') => {
                self.parse_error(ParseErrorCode::UnexpectedNullCharacter);
                self.emit_character('\u{FFFD}');
            }
            None => self.emit_eof(),
            Some(c) => self.emit_text_run(c, &['&', '<', '\0']),
        }
    }

    /// [§ 13.2.5.3 RAWTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-state)
    fn handle_rawtext_state(&mut self) {
        match self.current_input_character {
            Some('<') => self.switch_to(TokenizerState::RAWTEXTLessThanSign),
            Some('\0') => {
                self.parse_error(ParseErrorCode::UnexpectedNullCharacter);
                self.emit_character('\u{FFFD}');
            }
            None => self.emit_eof(),
            Some(c) => self.emit_text_run(c, &['<', '\0']),
        }
    }

    /// [§ 13.2.5.4 Script data state](https://html.spec.whatwg.org/multipage/parsing.html#script-data-state)
    fn handle_script_data_state(&mut self) {
        match self.current_input_character {
            Some('<') => self.switch_to(TokenizerState::ScriptDataLessThanSign),
            Some('\0') => {
                self.parse_error(ParseErrorCode::UnexpectedNullCharacter);
                self.emit_character('\u{FFFD}');
            }
            None => self.emit_eof(),
            Some(c) => self.emit_text_run(c, &['<', '\0']),
        }
    }

    /// [§ 13.2.5.5 PLAINTEXT state](https://html.spec.whatwg.org/multipage/parsing.html#plaintext-state)
    fn handle_plaintext_state(&mut self) {
        match self.current_input_character {
            Some('\0') => {
                self.parse_error(ParseErrorCode::UnexpectedNullCharacter);
                self.emit_character('\u{FFFD}');
            }
            None => self.emit_eof(),
            Some(c) => self.emit_text_run(c, &['\0']),
        }
    }

    // =========================================================================
    // Tag states
    // =========================================================================

    /// [§ 13.2.5.6 Tag open state](https://html.spec.whatwg.org/multipage/parsing.html#tag-open-state)
    fn handle_tag_open_state(&mut self) {
        match self.current_input_character {
            // "Switch to the markup declaration open state."
            Some('!') => self.switch_to(TokenizerState::MarkupDeclarationOpen),
            // "Switch to the end tag open state."
            Some('/') => self.switch_to(TokenizerState::EndTagOpen),
            // "Create a new start tag token, set its tag name to the empty
            // string. Reconsume in the tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_token = Some(TokenBuilder::StartTag(Tag::default()));
                self.reconsume_in(TokenizerState::TagName);
            }
            // "This is an unexpected-question-mark-instead-of-tag-name parse
            // error. Create a comment token whose data is the empty string.
            // Reconsume in the bogus comment state."
            Some('?') => {
                self.parse_error(ParseErrorCode::UnexpectedQuestionMarkInsteadOfTagName);
                self.current_token = Some(TokenBuilder::Comment(String::new()));
                self.reconsume_in(TokenizerState::BogusComment);
            }
            // "This is an eof-before-tag-name parse error. Emit a U+003C
            // LESS-THAN SIGN character token and an end-of-file token."
            None => {
                self.parse_error(ParseErrorCode::EofBeforeTagName);
                self.emit_character('<');
                self.emit_eof();
            }
            // "This is an invalid-first-character-of-tag-name parse error.
            // Emit a U+003C LESS-THAN SIGN character token. Reconsume in the
            // data state."
            Some(_) => {
                self.parse_error(ParseErrorCode::InvalidFirstCharacterOfTagName);
                self.emit_character('<');
                self.reconsume_in(TokenizerState::Data);
            }
        }
    }

    /// [§ 13.2.5.7 End tag open state](https://html.spec.whatwg.org/multipage/parsing.html#end-tag-open-state)
    fn handle_end_tag_open_state(&mut self) {
        match self.current_input_character {
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_token = Some(TokenBuilder::EndTag(Tag::default()));
                self.reconsume_in(TokenizerState::TagName);
            }
            // "This is a missing-end-tag-name parse error. Switch to the data state."
            Some('>') => {
                self.parse_error(ParseErrorCode::MissingEndTagName);
                self.switch_to(TokenizerState::Data);
            }
            None => {
                self.parse_error(ParseErrorCode::EofBeforeTagName);
                self.emit_str("</");
                self.emit_eof();
            }
            // "This is an invalid-first-character-of-tag-name parse error.
            // Create a comment token whose data is the empty string.
            // Reconsume in the bogus comment state."
            Some(_) => {
                self.parse_error(ParseErrorCode::InvalidFirstCharacterOfTagName);
                self.current_token = Some(TokenBuilder::Comment(String::new()));
                self.reconsume_in(TokenizerState::BogusComment);
            }
        }
    }

    /// [§ 13.2.5.8 Tag name state](https://html.spec.whatwg.org/multipage/parsing.html#tag-name-state)
    fn handle_tag_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            Some('\0') => {
                self.parse_error(ParseErrorCode::UnexpectedNullCharacter);
                self.append_to_tag_name('\u{FFFD}');
            }
            // "This is an eof-in-tag parse error. Emit an end-of-file token."
            None => {
                self.parse_error(ParseErrorCode::EofInTag);
                self.emit_eof();
            }
            // "ASCII upper alpha: Append the lowercase version of the current
            // input character to the current tag token's tag name."
            Some(c) => self.append_to_tag_name(c.to_ascii_lowercase()),
        }
    }

    /// [§ 13.2.5.9](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-less-than-sign-state),
    /// [§ 13.2.5.12](https://html.spec.whatwg.org/multipage/parsing.html#rawtext-less-than-sign-state)
    ///
    /// "U+002F SOLIDUS (/): Set the temporary buffer to the empty string.
    /// Switch to the ... end tag open state. Anything else: Emit a U+003C
    /// LESS-THAN SIGN character token. Reconsume in the ... state."
    fn handle_text_less_than_sign_state(&mut self, text_state: TokenizerState, end_tag_open: TokenizerState) {
        if self.current_input_character == Some('/') {
            self.temporary_buffer.clear();
            self.switch_to(end_tag_open);
        } else {
            self.emit_character('<');
            self.reconsume_in(text_state);
        }
    }

    /// The RCDATA, RAWTEXT, script data and script data escaped end tag open
    /// states are identical apart from where they fall back to.
    pub(super) fn handle_text_end_tag_open_state(&mut self, text_state: TokenizerState, end_tag_name: TokenizerState) {
        match self.current_input_character {
            // "Create a new end tag token, set its tag name to the empty
            // string. Reconsume in the ... end tag name state."
            Some(c) if c.is_ascii_alphabetic() => {
                self.current_token = Some(TokenBuilder::EndTag(Tag::default()));
                self.reconsume_in(end_tag_name);
            }
            // "Emit a U+003C LESS-THAN SIGN character token and a U+002F
            // SOLIDUS character token. Reconsume in the ... state."
            _ => {
                self.emit_str("</");
                self.reconsume_in(text_state);
            }
        }
    }

    /// [§ 13.2.5.11 RCDATA end tag name state](https://html.spec.whatwg.org/multipage/parsing.html#rcdata-end-tag-name-state)
    /// and its RAWTEXT and script data twins.
    pub(super) fn handle_text_end_tag_name_state(&mut self, text_state: TokenizerState) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) && self.is_appropriate_end_tag_token() => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') if self.is_appropriate_end_tag_token() => {
                self.switch_to(TokenizerState::SelfClosingStartTag);
            }
            Some('>') if self.is_appropriate_end_tag_token() => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            // "Append the lowercase version of the current input character to
            // the current tag token's tag name. Append the current input
            // character to the temporary buffer."
            Some(c) if c.is_ascii_alphabetic() => {
                self.append_to_tag_name(c.to_ascii_lowercase());
                self.temporary_buffer.push(c);
            }
            // "Emit a U+003C LESS-THAN SIGN character token, a U+002F SOLIDUS
            // character token, and a character token for each of the
            // characters in the temporary buffer (in the order they were
            // added to the buffer). Reconsume in the ... state."
            _ => {
                self.current_token = None;
                let buffer = std::mem::take(&mut self.temporary_buffer);
                self.emit_str("</");
                self.emit_str(&buffer);
                self.reconsume_in(text_state);
            }
        }
    }

    // =========================================================================
    // Attribute states
    // =========================================================================

    /// [§ 13.2.5.32 Before attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-name-state)
    fn handle_before_attribute_name_state(&mut self) {
        match self.current_input_character {
            // "Ignore the character."
            Some(c) if Self::is_whitespace_char(c) => {}
            // "Reconsume in the after attribute name state."
            Some('/' | '>') | None => self.reconsume_in(TokenizerState::AfterAttributeName),
            // "This is an unexpected-equals-sign-before-attribute-name parse
            // error. Start a new attribute in the current tag token. Set that
            // attribute's name to the current input character, and its value
            // to the empty string. Switch to the attribute name state."
            Some('=') => {
                self.parse_error(ParseErrorCode::UnexpectedEqualsSignBeforeAttributeName);
                self.start_new_attribute();
                self.append_to_attribute_name('=');
                self.switch_to(TokenizerState::AttributeName);
            }
            // "Start a new attribute in the current tag token. Set that
            // attribute name and value to the empty string. Reconsume in the
            // attribute name state."
            Some(_) => {
                self.start_new_attribute();
                self.reconsume_in(TokenizerState::AttributeName);
            }
        }
    }

    /// [§ 13.2.5.33 Attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-name-state)
    fn handle_attribute_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) || c == '/' || c == '>' => {
                self.check_duplicate_attribute();
                self.reconsume_in(TokenizerState::AfterAttributeName);
            }
            None => {
                self.check_duplicate_attribute();
                self.reconsume_in(TokenizerState::AfterAttributeName);
            }
            Some('=') => {
                self.check_duplicate_attribute();
                self.switch_to(TokenizerState::BeforeAttributeValue);
            }
            Some('\0') => {
                self.parse_error(ParseErrorCode::UnexpectedNullCharacter);
                self.append_to_attribute_name('\u{FFFD}');
            }
            // "This is an unexpected-character-in-attribute-name parse error.
            // Treat it as per the "anything else" entry below."
            Some(c @ ('"' | '\'' | '<')) => {
                self.parse_error(ParseErrorCode::UnexpectedCharacterInAttributeName);
                self.append_to_attribute_name(c);
            }
            Some(c) => self.append_to_attribute_name(c.to_ascii_lowercase()),
        }
    }

    /// [§ 13.2.5.34 After attribute name state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-name-state)
    fn handle_after_attribute_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('=') => self.switch_to(TokenizerState::BeforeAttributeValue),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            None => {
                self.parse_error(ParseErrorCode::EofInTag);
                self.emit_eof();
            }
            Some(_) => {
                self.start_new_attribute();
                self.reconsume_in(TokenizerState::AttributeName);
            }
        }
    }

    /// [§ 13.2.5.35 Before attribute value state](https://html.spec.whatwg.org/multipage/parsing.html#before-attribute-value-state)
    fn handle_before_attribute_value_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {}
            Some('"') => self.switch_to(TokenizerState::AttributeValueDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::AttributeValueSingleQuoted),
            // "This is a missing-attribute-value parse error. Switch to the
            // data state. Emit the current tag token."
            Some('>') => {
                self.parse_error(ParseErrorCode::MissingAttributeValue);
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            _ => self.reconsume_in(TokenizerState::AttributeValueUnquoted),
        }
    }

    /// [§ 13.2.5.36](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(double-quoted)-state),
    /// [§ 13.2.5.37](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(single-quoted)-state)
    fn handle_attribute_value_quoted_state(&mut self, quote: char) {
        match self.current_input_character {
            Some(c) if c == quote => self.switch_to(TokenizerState::AfterAttributeValueQuoted),
            Some('&') => {
                self.return_state = self.state;
                self.switch_to(TokenizerState::CharacterReference);
            }
            Some('\0') => {
                self.parse_error(ParseErrorCode::UnexpectedNullCharacter);
                self.append_to_attribute_value("\u{FFFD}");
            }
            None => {
                self.parse_error(ParseErrorCode::EofInTag);
                self.emit_eof();
            }
            Some(c) => {
                let mut run = String::from(c);
                run.push_str(&self.input.consume_until(|n| n == quote || n == '&' || n == '\0', None));
                self.append_to_attribute_value(&run);
            }
        }
    }

    /// [§ 13.2.5.38 Attribute value (unquoted) state](https://html.spec.whatwg.org/multipage/parsing.html#attribute-value-(unquoted)-state)
    fn handle_attribute_value_unquoted_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('&') => {
                self.return_state = TokenizerState::AttributeValueUnquoted;
                self.switch_to(TokenizerState::CharacterReference);
            }
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            Some('\0') => {
                self.parse_error(ParseErrorCode::UnexpectedNullCharacter);
                self.append_to_attribute_value("\u{FFFD}");
            }
            Some(c @ ('"' | '\'' | '<' | '=' | '`')) => {
                self.parse_error(ParseErrorCode::UnexpectedCharacterInUnquotedAttributeValue);
                self.append_to_attribute_value(c.encode_utf8(&mut [0; 4]));
            }
            None => {
                self.parse_error(ParseErrorCode::EofInTag);
                self.emit_eof();
            }
            Some(c) => self.append_to_attribute_value(c.encode_utf8(&mut [0; 4])),
        }
    }

    /// [§ 13.2.5.39 After attribute value (quoted) state](https://html.spec.whatwg.org/multipage/parsing.html#after-attribute-value-(quoted)-state)
    fn handle_after_attribute_value_quoted_state(&mut self) {
        match self.current_input_character {
            Some(c) if Self::is_whitespace_char(c) => {
                self.switch_to(TokenizerState::BeforeAttributeName);
            }
            Some('/') => self.switch_to(TokenizerState::SelfClosingStartTag),
            Some('>') => {
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            None => {
                self.parse_error(ParseErrorCode::EofInTag);
                self.emit_eof();
            }
            // "This is a missing-whitespace-between-attributes parse error.
            // Reconsume in the before attribute name state."
            Some(_) => {
                self.parse_error(ParseErrorCode::MissingWhitespaceBetweenAttributes);
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
    }

    /// [§ 13.2.5.40 Self-closing start tag state](https://html.spec.whatwg.org/multipage/parsing.html#self-closing-start-tag-state)
    fn handle_self_closing_start_tag_state(&mut self) {
        match self.current_input_character {
            // "Set the self-closing flag of the current tag token. Switch to
            // the data state. Emit the current tag token."
            Some('>') => {
                self.set_self_closing();
                self.switch_to(TokenizerState::Data);
                self.emit_current_token();
            }
            None => {
                self.parse_error(ParseErrorCode::EofInTag);
                self.emit_eof();
            }
            Some(_) => {
                self.parse_error(ParseErrorCode::UnexpectedSolidusInTag);
                self.reconsume_in(TokenizerState::BeforeAttributeName);
            }
        }
    }
}

impl TokenizerState {
    /// States a character run can continue through without the tree builder
    /// having a say in how the next markup is tokenized.
    const fn continues_text_run(self) -> bool {
        matches!(
            self,
            Self::Data
                | Self::RCDATA
                | Self::RAWTEXT
                | Self::ScriptData
                | Self::PLAINTEXT
                | Self::CharacterReference
                | Self::NamedCharacterReference
                | Self::AmbiguousAmpersand
                | Self::NumericCharacterReference
                | Self::HexadecimalCharacterReferenceStart
                | Self::DecimalCharacterReferenceStart
                | Self::HexadecimalCharacterReference
                | Self::DecimalCharacterReference
                | Self::NumericCharacterReferenceEnd
        )
    }
}

impl Iterator for HTMLTokenizer {
    type Item = Token;

    /// Run the state machine until a token is available. After the
    /// end-of-file token has been returned, yields `None` forever.
    ///
    /// A character run is held back while the machine is still in text, so
    /// `a&amp;b` comes out as one token. It is released as soon as markup
    /// starts, because the tree builder may retune the tokenizer before the
    /// markup is read.
    fn next(&mut self) -> Option<Token> {
        loop {
            let ready = match self.pending.len() {
                0 => false,
                1 => {
                    self.pending[0].character_data().is_none()
                        || !self.state.continues_text_run()
                }
                _ => true,
            };
            if ready {
                return self.pending.pop_front();
            }
            if self.eof_emitted {
                return None;
            }
            self.step();
        }
    }
}
