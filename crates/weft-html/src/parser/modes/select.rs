//! [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
//! and "in select in table".

use weft_dom::DomProvider;

use crate::error::ParseErrorCode;
use crate::parser::core::{Flow, HTMLTreeBuilder, Step};
use crate::parser::stack::Scope;
use crate::tokenizer::Token;

/// The table tags that close a select inside a table.
fn is_table_boundary(name: &str) -> bool {
    matches!(
        name,
        "caption" | "table" | "tbody" | "tfoot" | "thead" | "tr" | "td" | "th"
    )
}

impl<D: DomProvider> HTMLTreeBuilder<'_, D> {
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    pub(in crate::parser) fn handle_in_select_mode(&mut self, token: Token) -> Flow {
        match &token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Ignore the token."
            Token::NullCharacter { .. } => {}

            // "Any other character token"
            // "Insert the token's character."
            Token::Character { data } | Token::Whitespace { data } => self.insert_characters(data),

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype(_) => self.parse_error(ParseErrorCode::UnexpectedDoctype, &[]),

            Token::StartTag(tag) => match tag.name.as_str() {
                // "A start tag whose tag name is "html""
                // "Process the token using the rules for the "in body"
                // insertion mode."
                "html" => return self.handle_in_body_mode(token),

                // "A start tag whose tag name is "option""
                // "If the current node is an option element, pop that node
                // from the stack of open elements."
                // "Insert an HTML element for the token."
                "option" => {
                    if self.open_elements.current_is("option") {
                        let _ = self.open_elements.pop();
                    }
                    let _ = self.insert_html_element(tag);
                }

                // "A start tag whose tag name is "optgroup""
                // "If the current node is an option element, pop that node
                // from the stack of open elements."
                // "If the current node is an optgroup element, pop that node
                // from the stack of open elements."
                // "Insert an HTML element for the token."
                "optgroup" => {
                    if self.open_elements.current_is("option") {
                        let _ = self.open_elements.pop();
                    }
                    if self.open_elements.current_is("optgroup") {
                        let _ = self.open_elements.pop();
                    }
                    let _ = self.insert_html_element(tag);
                }

                // "A start tag whose tag name is "hr""
                // Same popping as "optgroup", then the element is void.
                "hr" => {
                    if self.open_elements.current_is("option") {
                        let _ = self.open_elements.pop();
                    }
                    if self.open_elements.current_is("optgroup") {
                        let _ = self.open_elements.pop();
                    }
                    let _ = self.insert_html_element(tag);
                    let _ = self.open_elements.pop();
                    self.acknowledge_self_closing();
                }

                // "A start tag whose tag name is "select""
                // "Parse error."
                // "If the stack of open elements does not have a select
                // element in select scope, ignore the token. (fragment case)"
                // "Otherwise: Pop elements from the stack of open elements
                // until a select element has been popped from the stack.
                // Reset the insertion mode appropriately."
                "select" => {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag, &["select"]);
                    let _ = self.close_select();
                }

                // "A start tag whose tag name is one of: "input", "keygen",
                // "textarea""
                // "Parse error."
                // "If the stack of open elements does not have a select
                // element in select scope, ignore the token. (fragment case)"
                // "Otherwise: ... Reprocess the token."
                "input" | "keygen" | "textarea" => {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag, &[&tag.name]);
                    if self.close_select() {
                        return Ok(Step::Reprocess(token));
                    }
                }

                // "A start tag whose tag name is one of: "script", "template""
                // "Process the token using the rules for the "in head"
                // insertion mode."
                "script" | "template" => return self.handle_in_head_mode(token),

                // "Anything else"
                // "Parse error. Ignore the token."
                _ => self.unexpected(&token),
            },

            Token::EndTag(tag) => match tag.name.as_str() {
                // "An end tag whose tag name is "optgroup""
                // "First, if the current node is an option element, and the
                // node immediately before it in the stack of open elements is
                // an optgroup element, then pop the current node from the
                // stack of open elements."
                // "If the current node is an optgroup element, then pop that
                // node from the stack of open elements. Otherwise, this is a
                // parse error; ignore the token."
                "optgroup" => {
                    let len = self.open_elements.len();
                    if self.open_elements.current_is("option")
                        && len >= 2
                        && self
                            .open_elements
                            .get(len - 2)
                            .is_some_and(|e| e.is_html("optgroup"))
                    {
                        let _ = self.open_elements.pop();
                    }
                    if self.open_elements.current_is("optgroup") {
                        let _ = self.open_elements.pop();
                    } else {
                        self.unexpected(&token);
                    }
                }

                // "An end tag whose tag name is "option""
                // "If the current node is an option element, then pop that
                // node from the stack of open elements. Otherwise, this is a
                // parse error; ignore the token."
                "option" => {
                    if self.open_elements.current_is("option") {
                        let _ = self.open_elements.pop();
                    } else {
                        self.unexpected(&token);
                    }
                }

                // "An end tag whose tag name is "select""
                // "If the stack of open elements does not have a select
                // element in select scope, this is a parse error; ignore the
                // token. (fragment case)"
                // "Otherwise: Pop elements from the stack of open elements
                // until a select element has been popped from the stack.
                // Reset the insertion mode appropriately."
                "select" => {
                    if !self.close_select() {
                        self.unexpected(&token);
                    }
                }

                // "An end tag whose tag name is "template""
                // "Process the token using the rules for the "in head"
                // insertion mode."
                "template" => return self.handle_in_head_mode(token),

                // "Anything else"
                // "Parse error. Ignore the token."
                _ => self.unexpected(&token),
            },

            // "An end-of-file token"
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::EndOfFile => return self.handle_in_body_mode(token),
        }
        Ok(Step::Done)
    }

    /// Pop through the open `select` and reset the mode. Returns false when
    /// there is no select in select scope.
    fn close_select(&mut self) -> bool {
        if !self.open_elements.has_element_in_scope("select", Scope::Select) {
            return false;
        }
        let _ = self.open_elements.pop_until_named("select");
        self.reset_insertion_mode_appropriately();
        true
    }

    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    pub(in crate::parser) fn handle_in_select_in_table_mode(&mut self, token: Token) -> Flow {
        match &token {
            // "A start tag whose tag name is one of: "caption", "table",
            // "tbody", "tfoot", "thead", "tr", "td", "th""
            // "Parse error."
            // "Pop elements from the stack of open elements until a select
            // element has been popped from the stack."
            // "Reset the insertion mode appropriately."
            // "Reprocess the token."
            Token::StartTag(tag) if is_table_boundary(&tag.name) => {
                self.unexpected(&token);
                let _ = self.open_elements.pop_until_named("select");
                self.reset_insertion_mode_appropriately();
                Ok(Step::Reprocess(token))
            }

            // "An end tag whose tag name is one of: "caption", "table",
            // "tbody", "tfoot", "thead", "tr", "td", "th""
            // "Parse error."
            // "If the stack of open elements does not have an element in table
            // scope that is an HTML element with the same tag name as that of
            // the token, then ignore the token."
            // "Otherwise: Pop elements from the stack of open elements until a
            // select element has been popped from the stack. Reset the
            // insertion mode appropriately. Reprocess the token."
            Token::EndTag(tag) if is_table_boundary(&tag.name) => {
                self.unexpected(&token);
                if !self.open_elements.has_element_in_scope(&tag.name, Scope::Table) {
                    return Ok(Step::Done);
                }
                let _ = self.open_elements.pop_until_named("select");
                self.reset_insertion_mode_appropriately();
                Ok(Step::Reprocess(token))
            }

            // "Anything else"
            // "Process the token using the rules for the "in select" insertion
            // mode."
            _ => self.handle_in_select_mode(token),
        }
    }
}
