//! The modes after the body or frameset has closed: "after body", "in
//! frameset", "after frameset", "after after body" and "after after
//! frameset".

use weft_dom::DomProvider;

use crate::error::ParseErrorCode;
use crate::parser::core::{Flow, HTMLTreeBuilder, InsertionMode, Step};
use crate::tokenizer::Token;

impl<D: DomProvider> HTMLTreeBuilder<'_, D> {
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    pub(in crate::parser) fn handle_after_body_mode(&mut self, token: Token) -> Flow {
        match &token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::Whitespace { .. } => self.handle_in_body_mode(token),

            // "A comment token"
            // "Insert a comment as the last child of the first element in the
            // stack of open elements (the html element)."
            Token::Comment { data } => {
                if let Some(html) = self.open_elements.get(0).map(|e| e.node) {
                    self.insert_comment_into(data, html);
                }
                Ok(Step::Done)
            }

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype(_) => {
                self.parse_error(ParseErrorCode::UnexpectedDoctype, &[]);
                Ok(Step::Done)
            }

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::StartTag(tag) if tag.name == "html" => self.handle_in_body_mode(token),

            // "An end tag whose tag name is "html""
            // "If the parser was created as part of the HTML fragment parsing
            // algorithm, this is a parse error; ignore the token. (fragment
            // case)"
            // "Otherwise, switch the insertion mode to "after after body"."
            Token::EndTag(tag) if tag.name == "html" => {
                if self.is_fragment() {
                    self.unexpected(&token);
                } else {
                    self.switch_mode(InsertionMode::AfterAfterBody);
                }
                Ok(Step::Done)
            }

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfFile => self.stop_parsing(),

            // "Anything else"
            // "Parse error. Switch the insertion mode to "in body" and
            // reprocess the token."
            _ => {
                self.unexpected(&token);
                self.reprocess_in(InsertionMode::InBody, token)
            }
        }
    }

    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    pub(in crate::parser) fn handle_in_frameset_mode(&mut self, token: Token) -> Flow {
        match &token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Insert the character."
            Token::Whitespace { data } => self.insert_characters(data),

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype(_) => self.parse_error(ParseErrorCode::UnexpectedDoctype, &[]),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::StartTag(tag) if tag.name == "html" => return self.handle_in_body_mode(token),

            // "A start tag whose tag name is "frameset""
            // "Insert an HTML element for the token."
            Token::StartTag(tag) if tag.name == "frameset" => {
                let _ = self.insert_html_element(tag);
            }

            // "An end tag whose tag name is "frameset""
            Token::EndTag(tag) if tag.name == "frameset" => {
                // "If the current node is the root html element, then this is
                // a parse error; ignore the token. (fragment case)"
                if self.open_elements.len() == 1 {
                    self.unexpected(&token);
                    return Ok(Step::Done);
                }
                // "Otherwise, pop the current node from the stack of open
                // elements."
                let _ = self.open_elements.pop();
                // "If the parser was not created as part of the HTML fragment
                // parsing algorithm (fragment case), and the current node is
                // no longer a frameset element, then switch the insertion mode
                // to "after frameset"."
                if !self.is_fragment() && !self.open_elements.current_is("frameset") {
                    self.switch_mode(InsertionMode::AfterFrameset);
                }
            }

            // "A start tag whose tag name is "frame""
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements."
            // "Acknowledge the token's self-closing flag, if it is set."
            Token::StartTag(tag) if tag.name == "frame" => {
                let _ = self.insert_html_element(tag);
                let _ = self.open_elements.pop();
                self.acknowledge_self_closing();
            }

            // "A start tag whose tag name is "noframes""
            // "Process the token using the rules for the "in head" insertion
            // mode."
            Token::StartTag(tag) if tag.name == "noframes" => {
                return self.handle_in_head_mode(token);
            }

            // "An end-of-file token"
            // "If the current node is not the root html element, then this is
            // a parse error."
            // "Note: The current node can only be the root html element in the
            // fragment case."
            // "Stop parsing."
            Token::EndOfFile => {
                if self.open_elements.len() > 1 {
                    self.parse_error(ParseErrorCode::ExpectedClosingTagButGotEof, &["frameset"]);
                }
                return self.stop_parsing();
            }

            // "Anything else"
            // "Parse error. Ignore the token."
            _ => self.unexpected(&token),
        }
        Ok(Step::Done)
    }

    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    pub(in crate::parser) fn handle_after_frameset_mode(&mut self, token: Token) -> Flow {
        match &token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Insert the character."
            Token::Whitespace { data } => self.insert_characters(data),

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype(_) => self.parse_error(ParseErrorCode::UnexpectedDoctype, &[]),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::StartTag(tag) if tag.name == "html" => return self.handle_in_body_mode(token),

            // "An end tag whose tag name is "html""
            // "Switch the insertion mode to "after after frameset"."
            Token::EndTag(tag) if tag.name == "html" => {
                self.switch_mode(InsertionMode::AfterAfterFrameset);
            }

            // "A start tag whose tag name is "noframes""
            // "Process the token using the rules for the "in head" insertion
            // mode."
            Token::StartTag(tag) if tag.name == "noframes" => {
                return self.handle_in_head_mode(token);
            }

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfFile => return self.stop_parsing(),

            // "Anything else"
            // "Parse error. Ignore the token."
            _ => self.unexpected(&token),
        }
        Ok(Step::Done)
    }

    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    pub(in crate::parser) fn handle_after_after_body_mode(&mut self, token: Token) -> Flow {
        match &token {
            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => {
                let document = self.dom.document();
                self.insert_comment_into(data, document);
                Ok(Step::Done)
            }

            // "A DOCTYPE token"
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::Doctype(_) | Token::Whitespace { .. } => self.handle_in_body_mode(token),
            Token::StartTag(tag) if tag.name == "html" => self.handle_in_body_mode(token),

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfFile => self.stop_parsing(),

            // "Anything else"
            // "Parse error. Switch the insertion mode to "in body" and
            // reprocess the token."
            _ => {
                self.unexpected(&token);
                self.reprocess_in(InsertionMode::InBody, token)
            }
        }
    }

    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    pub(in crate::parser) fn handle_after_after_frameset_mode(&mut self, token: Token) -> Flow {
        match &token {
            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => {
                let document = self.dom.document();
                self.insert_comment_into(data, document);
                Ok(Step::Done)
            }

            // "A DOCTYPE token"
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::Doctype(_) | Token::Whitespace { .. } => self.handle_in_body_mode(token),
            Token::StartTag(tag) if tag.name == "html" => self.handle_in_body_mode(token),

            // "An end-of-file token"
            // "Stop parsing."
            Token::EndOfFile => self.stop_parsing(),

            // "A start tag whose tag name is "noframes""
            // "Process the token using the rules for the "in head" insertion
            // mode."
            Token::StartTag(tag) if tag.name == "noframes" => self.handle_in_head_mode(token),

            // "Anything else"
            // "Parse error. Ignore the token."
            _ => {
                self.unexpected(&token);
                Ok(Step::Done)
            }
        }
    }
}
