//! A WHATWG HTML parser: input stream, tokenizer and tree builder.
//!
//! # Scope
//!
//! This crate implements:
//! - **Input byte stream** ([WHATWG § 13.2.3](https://html.spec.whatwg.org/multipage/parsing.html#the-input-byte-stream))
//!   - BOM, transport, `<meta>` prescan and fallback encoding detection
//!   - Newline normalization, position tracking, input-stream errors
//!   - Changing the encoding while parsing, with a full restart when needed
//!
//! - **HTML Tokenizer** ([WHATWG § 13.2.5](https://html.spec.whatwg.org/multipage/parsing.html#tokenization))
//!   - All 80 states, including script data escapes and CDATA sections
//!   - Named and numeric character references
//!
//! - **HTML Parser / Tree Builder** ([WHATWG § 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction))
//!   - All 23 insertion modes
//!   - Adoption agency, foster parenting, foreign content
//!   - Fragment parsing ([WHATWG § 13.4](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments))
//!
//! The tree builder is generic over [`weft_dom::DomProvider`]; the entry
//! points in [`parse`] build a [`weft_dom::DomTree`].

/// Parser options.
pub mod config;
/// The input byte stream and encoding detection.
pub mod encoding;
/// Parse errors and fatal failures.
pub mod error;
/// Document and fragment entry points.
pub mod parse;
/// HTML parser and tree construction.
pub mod parser;
/// HTML tokenizer for converting input into tokens.
pub mod tokenizer;

pub use config::ParserOptions;
pub use encoding::{Confidence, InputStream};
pub use error::{ErrorSink, ParseError, ParseErrorCode, ParseFailure, Restart};
pub use parse::{
    FragmentOutput, ParseOutput, parse_document, parse_document_with, parse_fragment,
    parse_fragment_with, parse_html, parse_text_with,
};
pub use parser::{HTMLTreeBuilder, InsertionMode};
pub use tokenizer::{Attribute, HTMLTokenizer, Token, TokenizerState};
