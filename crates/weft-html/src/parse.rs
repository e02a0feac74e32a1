//! Entry points: whole documents from bytes or text, and fragments.
//!
//! [§ 13.2 Parsing HTML documents](https://html.spec.whatwg.org/multipage/parsing.html#parsing)
//! and [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments).

use encoding_rs::Encoding;
use log::debug;
use weft_common::warning::warn_once;
use weft_dom::{DomProvider, DomTree, Namespace, NodeId, QuirksMode};

use crate::config::ParserOptions;
use crate::encoding::{Confidence, InputStream};
use crate::error::{ErrorSink, ParseError, ParseFailure, Restart};
use crate::parser::HTMLTreeBuilder;
use crate::tokenizer::HTMLTokenizer;

/// How many times a document may be decoded before the encoding is declared
/// unstable. A restart always runs with certain confidence, so the second
/// pass normally settles it.
pub const MAX_ATTEMPTS: usize = 3;

/// A parsed document.
#[derive(Debug)]
pub struct ParseOutput<D> {
    /// The tree.
    pub dom: D,
    /// Every parse error of the final pass, in input order.
    pub errors: Vec<ParseError>,
    /// The encoding the final pass decoded with.
    pub encoding: &'static Encoding,
    /// How sure the parser ended up being of that encoding.
    pub confidence: Confidence,
    /// The document mode the DOCTYPE selected.
    pub quirks_mode: QuirksMode,
}

impl<D> ParseOutput<D> {
    /// Hand the collected errors to `sink`, leaving the list empty.
    pub fn drain_errors_into(&mut self, sink: &mut impl ErrorSink) {
        for error in self.errors.drain(..) {
            sink.report(error);
        }
    }
}

/// A parsed fragment.
#[derive(Debug)]
pub struct FragmentOutput<H> {
    /// "Return root's children, in tree order."
    pub nodes: Vec<H>,
    /// Every parse error, in input order.
    pub errors: Vec<ParseError>,
}

/// Build one document from `input` into `dom`.
///
/// # Panics
/// If `dom` is not empty.
fn run_once<D: DomProvider>(
    dom: &mut D,
    input: InputStream,
    options: &ParserOptions,
) -> Result<(Vec<ParseError>, &'static Encoding, Confidence, QuirksMode), Restart> {
    let mut builder = HTMLTreeBuilder::new(dom, HTMLTokenizer::new(input), options);
    builder.run()?;
    let errors = builder.take_errors();
    let input = builder.tokenizer().input();
    Ok((errors, input.encoding(), input.confidence(), builder.quirks_mode()))
}

/// Parse a byte stream into a tree created by `new_dom`.
///
/// `declared` is the transport-layer encoding: a label or a whole
/// `Content-Type` value.
///
/// When a `<meta>` changes the encoding after bytes have already been
/// turned into nodes, the partial tree is thrown away and the whole input is
/// parsed again from a fresh `new_dom()` with the new encoding.
///
/// # Errors
/// [`ParseFailure::InvalidConfig`] for bad options, and
/// [`ParseFailure::EncodingDidNotConverge`] when every attempt asked for yet
/// another restart.
pub fn parse_document_with<D: DomProvider>(
    bytes: &[u8],
    declared: Option<&str>,
    options: &ParserOptions,
    mut new_dom: impl FnMut() -> D,
) -> Result<ParseOutput<D>, ParseFailure> {
    options.validate()?;
    let mut override_encoding = None;
    let mut last = options.fallback_encoding();
    for attempt in 1..=MAX_ATTEMPTS {
        let input = InputStream::new(bytes, declared, override_encoding, options);
        let mut dom = new_dom();
        match run_once(&mut dom, input, options) {
            Ok((errors, encoding, confidence, quirks_mode)) => {
                return Ok(ParseOutput {
                    dom,
                    errors,
                    encoding,
                    confidence,
                    quirks_mode,
                });
            }
            Err(Restart { encoding }) => {
                debug!("attempt {attempt} restarting as {}", encoding.name());
                let _ = warn_once(
                    "encoding",
                    &format!("document declared {} late; parsing again", encoding.name()),
                );
                override_encoding = Some(encoding);
                last = encoding;
            }
        }
    }
    Err(ParseFailure::EncodingDidNotConverge {
        attempts: MAX_ATTEMPTS,
        last: last.name(),
    })
}

/// Parse a byte stream into a [`DomTree`].
///
/// # Errors
/// As [`parse_document_with`].
pub fn parse_document(
    bytes: &[u8],
    declared: Option<&str>,
    options: &ParserOptions,
) -> Result<ParseOutput<DomTree>, ParseFailure> {
    parse_document_with(bytes, declared, options, DomTree::new)
}

/// Parse text that is already Unicode. `<meta charset>` has no effect, so
/// this never restarts.
///
/// # Panics
/// If `dom` is not empty.
pub fn parse_text_with<D: DomProvider>(
    mut dom: D,
    html: &str,
    options: &ParserOptions,
) -> ParseOutput<D> {
    match run_once(&mut dom, InputStream::from_text(html), options) {
        Ok((errors, encoding, confidence, quirks_mode)) => ParseOutput {
            dom,
            errors,
            encoding,
            confidence,
            quirks_mode,
        },
        Err(restart) => unreachable!(
            "text input asked to restart as {}",
            restart.encoding.name()
        ),
    }
}

/// Parse a string into a [`DomTree`] with default options.
#[must_use]
pub fn parse_html(html: &str) -> ParseOutput<DomTree> {
    parse_text_with(DomTree::new(), html, &ParserOptions::default())
}

/// [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)
///
/// Parse `html` as the contents of `context`, an element already in `dom`.
/// The nodes are built in `dom` but left detached; the `form` pointer is
/// taken from the context's ancestors.
///
/// # Errors
/// [`ParseFailure::InvalidConfig`] for bad options.
///
/// # Panics
/// If a text input asks for an encoding restart, which it cannot.
pub fn parse_fragment_with<D: DomProvider>(
    dom: &mut D,
    context: D::Handle,
    html: &str,
    quirks_mode: QuirksMode,
    options: &ParserOptions,
) -> Result<FragmentOutput<D::Handle>, ParseFailure> {
    options.validate()?;
    let (root, errors) = {
        let tokenizer = HTMLTokenizer::from_text(html);
        let (mut builder, root) =
            HTMLTreeBuilder::new_fragment(dom, tokenizer, options, context, quirks_mode);
        if let Err(restart) = builder.run() {
            unreachable!(
                "fragment input asked to restart as {}",
                restart.encoding.name()
            );
        }
        (root, builder.take_errors())
    };
    let nodes = dom.children(root);
    Ok(FragmentOutput { nodes, errors })
}

/// Parse `html` as the contents of a detached `context_name` element in
/// `namespace`, in a fresh [`DomTree`].
///
/// # Errors
/// [`ParseFailure::InvalidContext`] when `context_name` is not a valid
/// element name, and [`ParseFailure::InvalidConfig`] for bad options.
pub fn parse_fragment(
    context_name: &str,
    namespace: Namespace,
    html: &str,
    options: &ParserOptions,
) -> Result<(DomTree, FragmentOutput<NodeId>), ParseFailure> {
    let mut dom = DomTree::new();
    let context = DomProvider::create_element(&mut dom, namespace, context_name)?;
    let output = parse_fragment_with(&mut dom, context, html, QuirksMode::NoQuirks, options)?;
    Ok((dom, output))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn late_meta_restarts_once() {
        let mut html = b"<!DOCTYPE html><title>\xE9</title>".to_vec();
        html.extend_from_slice(b"<meta charset=\"iso-8859-5\">");
        let options = ParserOptions {
            encoding_prescan_bytes: 16,
            ..ParserOptions::default()
        };
        let output =
            parse_document(&html, None, &options).expect("two attempts settle the encoding");
        assert_eq!(output.encoding, encoding_rs::ISO_8859_5);
        assert_eq!(output.confidence, Confidence::Certain);
    }

    #[test]
    fn errors_drain_into_a_sink() {
        let mut output = parse_html("</p>");
        let mut sink: Vec<ParseError> = Vec::new();
        let count = output.errors.len();
        output.drain_errors_into(&mut sink);
        assert!(output.errors.is_empty());
        assert_eq!(sink.len(), count);
        assert!(count > 0);
    }
}
