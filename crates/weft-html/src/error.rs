//! Parse errors, the error sink, and fatal failures.
//!
//! [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
//!
//! "This specification defines the parsing rules for HTML documents, whether
//! they are syntactically correct or not. Certain points in the parsing
//! algorithm are said to be parse errors."
//!
//! Parse errors never stop the parser. They are collected with their source
//! position and handed to an [`ErrorSink`] once the parse has settled on an
//! encoding. Only a few conditions are fatal; those are [`ParseFailure`].

use std::fmt;

use strum_macros::{Display, EnumIter, IntoStaticStr};
use thiserror::Error;

/// Every kind of parse error the input stream, tokenizer and tree builder
/// can report.
///
/// The kebab-case `Display` form is the error code; tokenizer codes match the
/// names in [§ 13.2.2](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoStaticStr, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum ParseErrorCode {
    // ===== Input stream =====
    /// A C0 or C1 control in the raw text.
    ControlCharacterInInputStream,
    /// A Unicode noncharacter in the raw text.
    NoncharacterInInputStream,
    /// A lone surrogate in the raw text.
    SurrogateInInputStream,

    // ===== Tokenizer =====
    /// `<!-->` or `<!--->`.
    AbruptClosingOfEmptyComment,
    /// `>` inside a DOCTYPE public identifier.
    AbruptDoctypePublicIdentifier,
    /// `>` inside a DOCTYPE system identifier.
    AbruptDoctypeSystemIdentifier,
    /// `&#;` or `&#x;`.
    AbsenceOfDigitsInNumericCharacterReference,
    /// `<![CDATA[` outside foreign content.
    CdataInHtmlContent,
    /// Numeric reference above U+10FFFF.
    CharacterReferenceOutsideUnicodeRange,
    /// Numeric reference to a control character.
    ControlCharacterReference,
    /// A repeated attribute name on one tag.
    DuplicateAttribute,
    /// An end tag carrying attributes.
    EndTagWithAttributes,
    /// An end tag with the self-closing flag.
    EndTagWithTrailingSolidus,
    /// End of input right after `<` or `</`.
    EofBeforeTagName,
    /// End of input inside a CDATA section.
    EofInCdata,
    /// End of input inside a comment.
    EofInComment,
    /// End of input inside a DOCTYPE.
    EofInDoctype,
    /// End of input inside `<!--` in script data.
    EofInScriptHtmlCommentLikeText,
    /// End of input inside a tag.
    EofInTag,
    /// A comment closed by `--!>`.
    IncorrectlyClosedComment,
    /// `<!` not followed by `--`, `DOCTYPE` or `[CDATA[`.
    IncorrectlyOpenedComment,
    /// Garbage after the DOCTYPE name.
    InvalidCharacterSequenceAfterDoctypeName,
    /// `<` followed by something that cannot start a tag name.
    InvalidFirstCharacterOfTagName,
    /// `=` not followed by a value.
    MissingAttributeValue,
    /// `<!DOCTYPE>` with no name.
    MissingDoctypeName,
    /// `PUBLIC` keyword without an identifier.
    MissingDoctypePublicIdentifier,
    /// `SYSTEM` keyword without an identifier.
    MissingDoctypeSystemIdentifier,
    /// `</>`.
    MissingEndTagName,
    /// Unquoted DOCTYPE public identifier.
    MissingQuoteBeforeDoctypePublicIdentifier,
    /// Unquoted DOCTYPE system identifier.
    MissingQuoteBeforeDoctypeSystemIdentifier,
    /// A named reference not terminated by `;`.
    MissingSemicolonAfterCharacterReference,
    /// `PUBLIC"`.
    MissingWhitespaceAfterDoctypePublicKeyword,
    /// `SYSTEM"`.
    MissingWhitespaceAfterDoctypeSystemKeyword,
    /// `<!DOCTYPEhtml>`.
    MissingWhitespaceBeforeDoctypeName,
    /// `a="1"b="2"`.
    MissingWhitespaceBetweenAttributes,
    /// Public and system identifiers run together.
    MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers,
    /// `<!--` inside a comment.
    NestedComment,
    /// Numeric reference to a noncharacter.
    NoncharacterCharacterReference,
    /// `<div/>` on a non-void HTML element.
    NonVoidHtmlElementStartTagWithTrailingSolidus,
    /// `&#0;`.
    NullCharacterReference,
    /// Numeric reference to a surrogate.
    SurrogateCharacterReference,
    /// Garbage after the DOCTYPE system identifier.
    UnexpectedCharacterAfterDoctypeSystemIdentifier,
    /// `"`, `'` or `<` in an attribute name.
    UnexpectedCharacterInAttributeName,
    /// `"`, `'`, `<`, `=` or `` ` `` in an unquoted attribute value.
    UnexpectedCharacterInUnquotedAttributeValue,
    /// `=` where an attribute name should start.
    UnexpectedEqualsSignBeforeAttributeName,
    /// U+0000 in the input.
    UnexpectedNullCharacter,
    /// `<?`.
    UnexpectedQuestionMarkInsteadOfTagName,
    /// `/` inside a tag not followed by `>`.
    UnexpectedSolidusInTag,
    /// `&` followed by a name that is not a known reference and ends in `;`.
    UnknownNamedCharacterReference,

    // ===== Tree construction =====
    /// A start tag before any DOCTYPE.
    ExpectedDoctypeButGotStartTag,
    /// An end tag before any DOCTYPE.
    ExpectedDoctypeButGotEndTag,
    /// Text or EOF before any DOCTYPE.
    ExpectedDoctypeButGotOther,
    /// A DOCTYPE that is not `<!DOCTYPE html>` or a permitted legacy form.
    UnknownDoctype,
    /// A DOCTYPE after the document has started.
    UnexpectedDoctype,
    /// A start tag the current insertion mode does not allow.
    UnexpectedStartTag,
    /// An end tag the current insertion mode does not allow.
    UnexpectedEndTag,
    /// Text or a comment the current insertion mode does not allow.
    UnexpectedCharacters,
    /// An end tag closed while other elements were still open.
    EndTagTooEarly,
    /// End of input with elements still open.
    ExpectedClosingTagButGotEof,
    /// End of input in RCDATA, RAWTEXT or script data.
    EofInElementThatCanContainOnlyText,
    /// A start tag moved out of a table by foster parenting.
    FosteredStartTag,
    /// An end tag inside a table whose handling moved content out of it.
    FosteredEndTag,
    /// Text moved out of a table by foster parenting.
    FosteredCharacters,
    /// A formatting end tag whose element is not open.
    AdoptionAgencyNotOpen,
    /// A formatting end tag whose element is out of scope.
    AdoptionAgencyNotInScope,
    /// A formatting end tag whose element is open but not current.
    AdoptionAgencyNotCurrent,
    /// An HTML breakout tag inside SVG or MathML.
    UnexpectedHtmlElementInForeignContent,
    /// An end tag in foreign content that does not match the current node.
    UnexpectedEndTagInForeignContent,
    /// `xmlns` or `xmlns:xlink` with the wrong URL.
    InvalidNamespaceAttributeValue,
    /// An element or attribute name the DOM refused; it was escaped.
    CoercedName,
}

impl ParseErrorCode {
    /// Human-readable template. `%1`, `%2` are replaced by the error's
    /// arguments, in order.
    #[must_use]
    pub const fn message_template(self) -> &'static str {
        match self {
            Self::ControlCharacterInInputStream => "Control character in input stream",
            Self::NoncharacterInInputStream => "Noncharacter in input stream",
            Self::SurrogateInInputStream => "Surrogate in input stream",
            Self::AbruptClosingOfEmptyComment => "Empty comment closed abruptly",
            Self::AbruptDoctypePublicIdentifier => "DOCTYPE public identifier ended by '>'",
            Self::AbruptDoctypeSystemIdentifier => "DOCTYPE system identifier ended by '>'",
            Self::AbsenceOfDigitsInNumericCharacterReference => {
                "Numeric character reference without digits"
            }
            Self::CdataInHtmlContent => "CDATA section outside foreign content",
            Self::CharacterReferenceOutsideUnicodeRange => {
                "Character reference outside the Unicode range"
            }
            Self::ControlCharacterReference => "Character reference to a control character",
            Self::DuplicateAttribute => "Duplicate attribute '%1'",
            Self::EndTagWithAttributes => "End tag '%1' has attributes",
            Self::EndTagWithTrailingSolidus => "End tag '%1' has a trailing solidus",
            Self::EofBeforeTagName => "End of file before tag name",
            Self::EofInCdata => "End of file in CDATA section",
            Self::EofInComment => "End of file in comment",
            Self::EofInDoctype => "End of file in DOCTYPE",
            Self::EofInScriptHtmlCommentLikeText => "End of file in script comment-like text",
            Self::EofInTag => "End of file in tag",
            Self::IncorrectlyClosedComment => "Comment closed by '--!>'",
            Self::IncorrectlyOpenedComment => "Incorrectly opened comment",
            Self::InvalidCharacterSequenceAfterDoctypeName => {
                "Invalid character sequence after DOCTYPE name"
            }
            Self::InvalidFirstCharacterOfTagName => "Invalid first character of tag name",
            Self::MissingAttributeValue => "Missing attribute value",
            Self::MissingDoctypeName => "Missing DOCTYPE name",
            Self::MissingDoctypePublicIdentifier => "Missing DOCTYPE public identifier",
            Self::MissingDoctypeSystemIdentifier => "Missing DOCTYPE system identifier",
            Self::MissingEndTagName => "Missing end tag name",
            Self::MissingQuoteBeforeDoctypePublicIdentifier => {
                "Missing quote before DOCTYPE public identifier"
            }
            Self::MissingQuoteBeforeDoctypeSystemIdentifier => {
                "Missing quote before DOCTYPE system identifier"
            }
            Self::MissingSemicolonAfterCharacterReference => {
                "Missing semicolon after character reference '%1'"
            }
            Self::MissingWhitespaceAfterDoctypePublicKeyword => {
                "Missing whitespace after DOCTYPE PUBLIC keyword"
            }
            Self::MissingWhitespaceAfterDoctypeSystemKeyword => {
                "Missing whitespace after DOCTYPE SYSTEM keyword"
            }
            Self::MissingWhitespaceBeforeDoctypeName => "Missing whitespace before DOCTYPE name",
            Self::MissingWhitespaceBetweenAttributes => "Missing whitespace between attributes",
            Self::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers => {
                "Missing whitespace between DOCTYPE public and system identifiers"
            }
            Self::NestedComment => "Nested comment",
            Self::NoncharacterCharacterReference => "Character reference to a noncharacter",
            Self::NonVoidHtmlElementStartTagWithTrailingSolidus => {
                "Self-closing syntax on non-void element '%1'"
            }
            Self::NullCharacterReference => "Character reference to U+0000",
            Self::SurrogateCharacterReference => "Character reference to a surrogate",
            Self::UnexpectedCharacterAfterDoctypeSystemIdentifier => {
                "Unexpected character after DOCTYPE system identifier"
            }
            Self::UnexpectedCharacterInAttributeName => "Unexpected character in attribute name",
            Self::UnexpectedCharacterInUnquotedAttributeValue => {
                "Unexpected character in unquoted attribute value"
            }
            Self::UnexpectedEqualsSignBeforeAttributeName => {
                "Unexpected '=' before attribute name"
            }
            Self::UnexpectedNullCharacter => "Unexpected U+0000",
            Self::UnexpectedQuestionMarkInsteadOfTagName => "Unexpected '?' instead of tag name",
            Self::UnexpectedSolidusInTag => "Unexpected '/' in tag",
            Self::UnknownNamedCharacterReference => "Unknown named character reference '&%1;'",
            Self::ExpectedDoctypeButGotStartTag => "Expected DOCTYPE but got start tag '%1'",
            Self::ExpectedDoctypeButGotEndTag => "Expected DOCTYPE but got end tag '%1'",
            Self::ExpectedDoctypeButGotOther => "Expected DOCTYPE",
            Self::UnknownDoctype => "Non-conforming DOCTYPE",
            Self::UnexpectedDoctype => "Unexpected DOCTYPE",
            Self::UnexpectedStartTag => "Unexpected start tag '%1'",
            Self::UnexpectedEndTag => "Unexpected end tag '%1'",
            Self::UnexpectedCharacters => "Unexpected characters",
            Self::EndTagTooEarly => "End tag '%1' seen with other elements still open",
            Self::ExpectedClosingTagButGotEof => "End of file with elements still open",
            Self::EofInElementThatCanContainOnlyText => "End of file in text-only element '%1'",
            Self::FosteredStartTag => "Start tag '%1' foster-parented out of a table",
            Self::FosteredEndTag => "End tag '%1' moved content out of a table",
            Self::FosteredCharacters => "Text foster-parented out of a table",
            Self::AdoptionAgencyNotOpen => "End tag '%1' has no open element",
            Self::AdoptionAgencyNotInScope => "End tag '%1' has no element in scope",
            Self::AdoptionAgencyNotCurrent => "End tag '%1' closes misnested formatting",
            Self::UnexpectedHtmlElementInForeignContent => {
                "HTML start tag '%1' inside foreign content"
            }
            Self::UnexpectedEndTagInForeignContent => "Unexpected end tag '%1' in foreign content",
            Self::InvalidNamespaceAttributeValue => "Attribute '%1' has an invalid namespace value",
            Self::CoercedName => "Name '%1' is not a valid DOM name and was escaped",
        }
    }

    /// Where the error is attributed, relative to the most recently consumed
    /// character: `0` for that character, `-1` for the one before it.
    #[must_use]
    pub const fn report_offset(self) -> isize {
        match self {
            Self::MissingSemicolonAfterCharacterReference
            | Self::MissingWhitespaceBetweenAttributes
            | Self::MissingWhitespaceAfterDoctypePublicKeyword
            | Self::MissingWhitespaceAfterDoctypeSystemKeyword
            | Self::MissingWhitespaceBeforeDoctypeName
            | Self::MissingWhitespaceBetweenDoctypePublicAndSystemIdentifiers => -1,
            _ => 0,
        }
    }

    /// Whether this error comes from tree construction rather than
    /// tokenization or decoding.
    #[must_use]
    pub const fn is_tree_construction(self) -> bool {
        (self as usize) >= (Self::ExpectedDoctypeButGotStartTag as usize)
    }
}

/// A single parse error with its source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    /// 1-based line.
    pub line: usize,
    /// Column of the offending character on its line (UTF-16 units).
    pub column: usize,
    /// The error kind.
    pub code: ParseErrorCode,
    /// Arguments substituted into the message template.
    pub args: Vec<String>,
    /// The formatted message.
    pub message: String,
}

impl ParseError {
    /// Build an error, formatting its message from the code's template.
    #[must_use]
    pub fn new(code: ParseErrorCode, line: usize, column: usize, args: Vec<String>) -> Self {
        let mut message = code.message_template().to_string();
        for (i, arg) in args.iter().enumerate() {
            message = message.replace(&format!("%{}", i + 1), arg);
        }
        Self {
            line,
            column,
            code,
            args,
            message,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {} ({})", self.line, self.column, self.message, self.code)
    }
}

/// Receives parse errors once the parse has completed.
pub trait ErrorSink {
    /// Record one error.
    fn report(&mut self, error: ParseError);
}

impl ErrorSink for Vec<ParseError> {
    fn report(&mut self, error: ParseError) {
        self.push(error);
    }
}

/// A sink that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct IgnoreErrors;

impl ErrorSink for IgnoreErrors {
    fn report(&mut self, _error: ParseError) {}
}

/// The restart signal raised when a `<meta>` charset changes the decoding
/// after bytes have already been turned into tree nodes.
///
/// It travels up through the tree builder as the `Err` side of every
/// insertion-mode step; only the document entry point catches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Restart {
    /// The encoding to decode with on the next attempt.
    pub encoding: &'static encoding_rs::Encoding,
}

/// Conditions that abort a parse.
#[derive(Debug, Error)]
pub enum ParseFailure {
    /// Every attempt asked for yet another encoding.
    #[error("encoding did not converge after {attempts} attempts (last: {last})")]
    EncodingDidNotConverge {
        /// Number of passes made.
        attempts: usize,
        /// The encoding requested by the final pass.
        last: &'static str,
    },
    /// The options failed validation.
    #[error("invalid parser configuration: {0}")]
    InvalidConfig(String),
    /// The fragment context element could not be created.
    #[error("invalid fragment context: {0}")]
    InvalidContext(#[from] weft_dom::DomError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn codes_display_as_kebab_case() {
        assert_eq!(
            ParseErrorCode::EofBeforeTagName.to_string(),
            "eof-before-tag-name"
        );
        assert_eq!(
            ParseErrorCode::NonVoidHtmlElementStartTagWithTrailingSolidus.to_string(),
            "non-void-html-element-start-tag-with-trailing-solidus"
        );
    }

    #[test]
    fn message_arguments_are_substituted() {
        let error = ParseError::new(
            ParseErrorCode::UnexpectedEndTag,
            3,
            7,
            vec!["div".to_string()],
        );
        assert_eq!(error.message, "Unexpected end tag 'div'");
        assert_eq!(error.to_string(), "3:7: Unexpected end tag 'div' (unexpected-end-tag)");
    }

    #[test]
    fn every_code_has_a_message() {
        for code in ParseErrorCode::iter() {
            assert!(!code.message_template().is_empty(), "{code}");
        }
    }

    #[test]
    fn tree_construction_codes_are_classified() {
        assert!(!ParseErrorCode::EofInTag.is_tree_construction());
        assert!(ParseErrorCode::UnexpectedStartTag.is_tree_construction());
        assert!(ParseErrorCode::CoercedName.is_tree_construction());
    }
}
