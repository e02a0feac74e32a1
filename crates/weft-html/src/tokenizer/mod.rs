//! HTML tokenizer module.
//!
//! Implements [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
//! of the WHATWG HTML Living Standard.

/// Character reference states per § 13.2.5.72 through § 13.2.5.80.
pub mod character_reference;
/// Comment, markup declaration and CDATA states.
pub mod comment;
/// HTML tokenizer state machine implementation.
pub mod core;
/// DOCTYPE states.
pub mod doctype;
/// Helper methods for tokenizer state transitions and token building.
pub mod helpers;
/// Named character reference lookup table per § 13.5.
pub mod named_character_references;
/// Script data escape states.
pub mod script;
/// Token types produced by the tokenizer.
pub mod token;

pub use self::core::{HTMLTokenizer, TokenizerState};
pub use token::{Attribute, Doctype, Tag, Token};
