//! The table insertion modes: "in table", "in table text", "in caption",
//! "in column group", "in table body", "in row" and "in cell".

use log::trace;
use weft_dom::DomProvider;

use crate::error::ParseErrorCode;
use crate::parser::core::{Flow, HTMLTreeBuilder, InsertionMode, Step};
use crate::parser::stack::Scope;
use crate::tokenizer::{Tag, Token};

/// "A start tag whose tag name is one of: "caption", "col", "colgroup",
/// "tbody", "td", "tfoot", "th", "thead", "tr""
fn is_table_part(name: &str) -> bool {
    matches!(
        name,
        "caption" | "col" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
    )
}

fn is_table_section(name: &str) -> bool {
    matches!(name, "tbody" | "tfoot" | "thead")
}

impl<D: DomProvider> HTMLTreeBuilder<'_, D> {
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    #[allow(clippy::too_many_lines)]
    pub(in crate::parser) fn handle_in_table_mode(&mut self, token: Token) -> Flow {
        match &token {
            // "A character token, if the current node is table, tbody,
            // template, tfoot, thead, or tr element"
            // "Let the pending table character tokens be an empty list of
            // tokens."
            // "Let the original insertion mode be the current insertion mode."
            // "Switch the insertion mode to "in table text" and reprocess the
            // token."
            Token::Character { .. } | Token::Whitespace { .. } | Token::NullCharacter { .. }
                if self.open_elements.current().is_some_and(|e| {
                    e.is_html_where(|n| {
                        matches!(n, "table" | "tbody" | "template" | "tfoot" | "thead" | "tr")
                    })
                }) =>
            {
                self.pending_table_characters.clear();
                self.pending_table_characters_dirty = false;
                self.original_insertion_mode = Some(self.insertion_mode);
                self.reprocess_in(InsertionMode::InTableText, token)
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => {
                self.insert_comment(data);
                Ok(Step::Done)
            }

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype(_) => {
                self.parse_error(ParseErrorCode::UnexpectedDoctype, &[]);
                Ok(Step::Done)
            }

            Token::StartTag(tag) => match tag.name.as_str() {
                // "A start tag whose tag name is "caption""
                // "Clear the stack back to a table context."
                // "Insert a marker at the end of the list of active formatting
                // elements."
                // "Insert an HTML element for the token, then switch the
                // insertion mode to "in caption"."
                "caption" => {
                    self.open_elements.clear_back_to_table_context();
                    self.active_formatting_elements.push_marker();
                    let _ = self.insert_html_element(tag);
                    self.switch_mode(InsertionMode::InCaption);
                    Ok(Step::Done)
                }

                // "A start tag whose tag name is "colgroup""
                // "Clear the stack back to a table context."
                // "Insert an HTML element for the token, then switch the
                // insertion mode to "in column group"."
                "colgroup" => {
                    self.open_elements.clear_back_to_table_context();
                    let _ = self.insert_html_element(tag);
                    self.switch_mode(InsertionMode::InColumnGroup);
                    Ok(Step::Done)
                }

                // "A start tag whose tag name is "col""
                // "Clear the stack back to a table context."
                // "Insert an HTML element for a "colgroup" start tag token
                // with no attributes, then switch the insertion mode to "in
                // column group"."
                // "Reprocess the current token."
                "col" => {
                    self.open_elements.clear_back_to_table_context();
                    let _ = self.insert_html_element(&Tag::named("colgroup"));
                    self.reprocess_in(InsertionMode::InColumnGroup, token)
                }

                // "A start tag whose tag name is one of: "tbody", "tfoot",
                // "thead""
                // "Clear the stack back to a table context."
                // "Insert an HTML element for the token, then switch the
                // insertion mode to "in table body"."
                name if is_table_section(name) => {
                    self.open_elements.clear_back_to_table_context();
                    let _ = self.insert_html_element(tag);
                    self.switch_mode(InsertionMode::InTableBody);
                    Ok(Step::Done)
                }

                // "A start tag whose tag name is one of: "td", "th", "tr""
                // "Clear the stack back to a table context."
                // "Insert an HTML element for a "tbody" start tag token with
                // no attributes, then switch the insertion mode to "in table
                // body"."
                // "Reprocess the current token."
                "td" | "th" | "tr" => {
                    self.open_elements.clear_back_to_table_context();
                    let _ = self.insert_html_element(&Tag::named("tbody"));
                    self.reprocess_in(InsertionMode::InTableBody, token)
                }

                // "A start tag whose tag name is "table""
                "table" => {
                    // "Parse error."
                    self.parse_error(ParseErrorCode::UnexpectedStartTag, &["table"]);
                    // "If the stack of open elements does not have a table
                    // element in table scope, ignore the token."
                    if !self.open_elements.has_element_in_scope("table", Scope::Table) {
                        return Ok(Step::Done);
                    }
                    // "Otherwise: Pop elements from this stack until a table
                    // element has been popped from the stack. Reset the
                    // insertion mode appropriately. Reprocess the token."
                    let _ = self.open_elements.pop_until_named("table");
                    self.reset_insertion_mode_appropriately();
                    Ok(Step::Reprocess(token))
                }

                // "A start tag whose tag name is one of: "style", "script",
                // "template""
                // "Process the token using the rules for the "in head"
                // insertion mode."
                "style" | "script" | "template" => self.handle_in_head_mode(token),

                // "A start tag whose tag name is "input""
                // "If the token does not have an attribute with the name
                // "type", or if it does, but that attribute's value is not an
                // ASCII case-insensitive match for the string "hidden", then:
                // act as described in the "anything else" entry below."
                // "Otherwise: Parse error. Insert an HTML element for the
                // token. Pop that input element off the stack of open
                // elements. Acknowledge the token's self-closing flag, if it
                // is set."
                "input"
                    if tag
                        .attribute("type")
                        .is_some_and(|t| t.eq_ignore_ascii_case("hidden")) =>
                {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag, &["input"]);
                    let _ = self.insert_html_element(tag);
                    let _ = self.open_elements.pop();
                    self.acknowledge_self_closing();
                    Ok(Step::Done)
                }

                // "A start tag whose tag name is "form""
                // "Parse error."
                // "If there is a template element on the stack of open
                // elements, or if the form element pointer is not null,
                // ignore the token."
                // "Otherwise: Insert an HTML element for the token, and set
                // the form element pointer to point to the element created.
                // Pop that form element off the stack of open elements."
                "form" => {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag, &["form"]);
                    if self.open_elements.contains_html("template")
                        || self.form_element_pointer.is_some()
                    {
                        return Ok(Step::Done);
                    }
                    let form = self.insert_html_element(tag);
                    self.form_element_pointer = Some(form);
                    let _ = self.open_elements.pop();
                    Ok(Step::Done)
                }

                _ => self.foster_parent_token(token),
            },

            Token::EndTag(tag) => match tag.name.as_str() {
                // "An end tag whose tag name is "table""
                // "If the stack of open elements does not have a table element
                // in table scope, this is a parse error; ignore the token."
                // "Otherwise: Pop elements from this stack until a table
                // element has been popped from the stack. Reset the insertion
                // mode appropriately."
                "table" => {
                    if self.open_elements.has_element_in_scope("table", Scope::Table) {
                        let _ = self.open_elements.pop_until_named("table");
                        self.reset_insertion_mode_appropriately();
                    } else {
                        self.parse_error(ParseErrorCode::UnexpectedEndTag, &["table"]);
                    }
                    Ok(Step::Done)
                }

                // "An end tag whose tag name is one of: "body", "caption",
                // "col", "colgroup", "html", "tbody", "td", "tfoot", "th",
                // "thead", "tr""
                // "Parse error. Ignore the token."
                "body" | "html" => {
                    self.unexpected(&token);
                    Ok(Step::Done)
                }
                name if is_table_part(name) => {
                    self.unexpected(&token);
                    Ok(Step::Done)
                }

                // "An end tag whose tag name is "template""
                // "Process the token using the rules for the "in head"
                // insertion mode."
                "template" => self.handle_in_head_mode(token),

                _ => self.foster_parent_token(token),
            },

            // "An end-of-file token"
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::EndOfFile => self.handle_in_body_mode(token),

            // Characters when the current node is not a table part.
            Token::Character { .. } | Token::Whitespace { .. } | Token::NullCharacter { .. } => {
                self.foster_parent_token(token)
            }
        }
    }

    /// "Anything else" in table: "Parse error. Enable foster parenting,
    /// process the token using the rules for the "in body" insertion mode,
    /// and then disable foster parenting."
    ///
    /// The error is reported up front with a generic code and upgraded to a
    /// `Fostered*` code only if something was really placed outside the
    /// table.
    fn foster_parent_token(&mut self, token: Token) -> Flow {
        let index = self.tokenizer.input().errors().len();
        let fostered_code = match &token {
            Token::StartTag(tag) => {
                self.parse_error(ParseErrorCode::UnexpectedStartTag, &[&tag.name]);
                ParseErrorCode::FosteredStartTag
            }
            Token::EndTag(tag) => {
                self.parse_error(ParseErrorCode::UnexpectedEndTag, &[&tag.name]);
                ParseErrorCode::FosteredEndTag
            }
            _ => {
                self.parse_error(ParseErrorCode::UnexpectedCharacters, &[]);
                ParseErrorCode::FosteredCharacters
            }
        };
        trace!("processing {token} with foster parenting enabled");
        self.foster_parenting = true;
        self.content_fostered = false;
        let flow = self.handle_in_body_mode(token);
        self.foster_parenting = false;
        if std::mem::take(&mut self.content_fostered) {
            self.tokenizer.input_mut().reclassify(index, fostered_code);
        }
        flow
    }

    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    pub(in crate::parser) fn handle_in_table_text_mode(&mut self, token: Token) -> Flow {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Ignore the token."
            Token::NullCharacter { .. } => Ok(Step::Done),

            // "Any other character token"
            // "Append the character token to the pending table character
            // tokens list."
            Token::Whitespace { data } => {
                self.pending_table_characters.push_str(&data);
                Ok(Step::Done)
            }
            Token::Character { data } => {
                self.pending_table_characters.push_str(&data);
                self.pending_table_characters_dirty = true;
                Ok(Step::Done)
            }

            // "Anything else"
            other => {
                let pending = std::mem::take(&mut self.pending_table_characters);
                if std::mem::take(&mut self.pending_table_characters_dirty) {
                    // "If any of the tokens in the pending table character
                    // tokens list are character tokens that are not ASCII
                    // whitespace, then this is a parse error: reprocess the
                    // character tokens in the pending table character tokens
                    // list using the rules given in the "anything else" entry
                    // in the "in table" insertion mode."
                    //
                    // The run is fostered as one piece: the "in body" rules
                    // do the same thing to a whitespace run and a character
                    // run except for the frameset-ok flag, which any
                    // non-whitespace clears anyway.
                    let _ = self.foster_parent_token(Token::Character { data: pending })?;
                } else {
                    // "Otherwise, insert the characters given by the pending
                    // table character tokens list."
                    self.insert_characters(&pending);
                }
                // "Switch the insertion mode to the original insertion mode
                // and reprocess the token."
                let mode = self.original_insertion_mode.take().unwrap_or(InsertionMode::InTable);
                self.reprocess_in(mode, other)
            }
        }
    }

    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    pub(in crate::parser) fn handle_in_caption_mode(&mut self, token: Token) -> Flow {
        match &token {
            // "An end tag whose tag name is "caption""
            Token::EndTag(tag) if tag.name == "caption" => {
                let _ = self.close_caption();
                Ok(Step::Done)
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "An end tag whose tag name is "table""
            // "If the stack of open elements does not have a caption element
            // in table scope, this is a parse error; ignore the token.
            // (fragment case)"
            // "Otherwise: ... Reprocess the token."
            Token::StartTag(tag) if is_table_part(&tag.name) => self.close_caption_and_reprocess(token),
            Token::EndTag(tag) if tag.name == "table" => self.close_caption_and_reprocess(token),

            // "An end tag whose tag name is one of: "body", "col",
            // "colgroup", "html", "tbody", "td", "tfoot", "th", "thead",
            // "tr""
            // "Parse error. Ignore the token."
            Token::EndTag(tag)
                if tag.name == "body"
                    || tag.name == "html"
                    || (is_table_part(&tag.name) && tag.name != "caption") =>
            {
                self.unexpected(&token);
                Ok(Step::Done)
            }

            // "Anything else"
            // "Process the token using the rules for the "in body" insertion
            // mode."
            _ => self.handle_in_body_mode(token),
        }
    }

    /// The shared steps of `</caption>`: returns whether a caption was
    /// closed.
    fn close_caption(&mut self) -> bool {
        // "If the stack of open elements does not have a caption element in
        // table scope, this is a parse error; ignore the token. (fragment
        // case)"
        if !self.open_elements.has_element_in_scope("caption", Scope::Table) {
            self.parse_error(ParseErrorCode::UnexpectedEndTag, &["caption"]);
            return false;
        }
        // "Otherwise: Generate implied end tags."
        self.open_elements.generate_implied_end_tags(None);
        // "Now, if the current node is not a caption element, then this is a
        // parse error."
        if !self.open_elements.current_is("caption") {
            self.parse_error(ParseErrorCode::EndTagTooEarly, &["caption"]);
        }
        // "Pop elements from this stack until a caption element has been
        // popped from the stack."
        let _ = self.open_elements.pop_until_named("caption");
        // "Clear the list of active formatting elements up to the last
        // marker."
        self.active_formatting_elements.clear_to_last_marker();
        // "Switch the insertion mode to "in table"."
        self.switch_mode(InsertionMode::InTable);
        true
    }

    fn close_caption_and_reprocess(&mut self, token: Token) -> Flow {
        if self.close_caption() {
            Ok(Step::Reprocess(token))
        } else {
            Ok(Step::Done)
        }
    }

    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    pub(in crate::parser) fn handle_in_column_group_mode(&mut self, token: Token) -> Flow {
        match &token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Insert the character."
            Token::Whitespace { data } => {
                self.insert_characters(data);
                Ok(Step::Done)
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => {
                self.insert_comment(data);
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

            // "A start tag whose tag name is "col""
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements."
            // "Acknowledge the token's self-closing flag, if it is set."
            Token::StartTag(tag) if tag.name == "col" => {
                let _ = self.insert_html_element(tag);
                let _ = self.open_elements.pop();
                self.acknowledge_self_closing();
                Ok(Step::Done)
            }

            // "An end tag whose tag name is "colgroup""
            // "If the current node is not a colgroup element, then this is a
            // parse error; ignore the token."
            // "Otherwise, pop the current node from the stack of open
            // elements. Switch the insertion mode to "in table"."
            Token::EndTag(tag) if tag.name == "colgroup" => {
                if self.open_elements.current_is("colgroup") {
                    let _ = self.open_elements.pop();
                    self.switch_mode(InsertionMode::InTable);
                } else {
                    self.unexpected(&token);
                }
                Ok(Step::Done)
            }

            // "An end tag whose tag name is "col""
            // "Parse error. Ignore the token."
            Token::EndTag(tag) if tag.name == "col" => {
                self.unexpected(&token);
                Ok(Step::Done)
            }

            // "A start tag whose tag name is "template""
            // "An end tag whose tag name is "template""
            // "Process the token using the rules for the "in head" insertion
            // mode."
            Token::StartTag(tag) | Token::EndTag(tag) if tag.name == "template" => {
                self.handle_in_head_mode(token)
            }

            // "An end-of-file token"
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::EndOfFile => self.handle_in_body_mode(token),

            // "Anything else"
            // "If the current node is not a colgroup element, then this is a
            // parse error; ignore the token."
            // "Otherwise, pop the current node from the stack of open
            // elements."
            // "Switch the insertion mode to "in table"."
            // "Reprocess the token."
            _ => {
                if !self.open_elements.current_is("colgroup") {
                    self.unexpected(&token);
                    return Ok(Step::Done);
                }
                let _ = self.open_elements.pop();
                self.reprocess_in(InsertionMode::InTable, token)
            }
        }
    }

    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    pub(in crate::parser) fn handle_in_table_body_mode(&mut self, token: Token) -> Flow {
        match &token {
            // "A start tag whose tag name is "tr""
            // "Clear the stack back to a table body context."
            // "Insert an HTML element for the token, then switch the
            // insertion mode to "in row"."
            Token::StartTag(tag) if tag.name == "tr" => {
                self.open_elements.clear_back_to_table_body_context();
                let _ = self.insert_html_element(tag);
                self.switch_mode(InsertionMode::InRow);
                Ok(Step::Done)
            }

            // "A start tag whose tag name is one of: "th", "td""
            // "Parse error."
            // "Clear the stack back to a table body context."
            // "Insert an HTML element for a "tr" start tag token with no
            // attributes, then switch the insertion mode to "in row"."
            // "Reprocess the current token."
            Token::StartTag(tag) if matches!(tag.name.as_str(), "th" | "td") => {
                self.unexpected(&token);
                self.open_elements.clear_back_to_table_body_context();
                let _ = self.insert_html_element(&Tag::named("tr"));
                self.reprocess_in(InsertionMode::InRow, token)
            }

            // "An end tag whose tag name is one of: "tbody", "tfoot", "thead""
            // "If the stack of open elements does not have an element in table
            // scope that is an HTML element with the same tag name as the
            // token, this is a parse error; ignore the token."
            // "Otherwise: Clear the stack back to a table body context. Pop
            // the current node from the stack of open elements. Switch the
            // insertion mode to "in table"."
            Token::EndTag(tag) if is_table_section(&tag.name) => {
                if self.open_elements.has_element_in_scope(&tag.name, Scope::Table) {
                    self.open_elements.clear_back_to_table_body_context();
                    let _ = self.open_elements.pop();
                    self.switch_mode(InsertionMode::InTable);
                } else {
                    self.unexpected(&token);
                }
                Ok(Step::Done)
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "tfoot", "thead""
            // "An end tag whose tag name is "table""
            // "If the stack of open elements does not have a tbody, thead, or
            // tfoot element in table scope, this is a parse error; ignore the
            // token."
            // "Otherwise: Clear the stack back to a table body context. Pop
            // the current node from the stack of open elements. Switch the
            // insertion mode to "in table". Reprocess the token."
            Token::StartTag(tag)
                if matches!(
                    tag.name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead"
                ) =>
            {
                self.leave_table_body(token)
            }
            Token::EndTag(tag) if tag.name == "table" => self.leave_table_body(token),

            // "An end tag whose tag name is one of: "body", "caption", "col",
            // "colgroup", "html", "td", "th", "tr""
            // "Parse error. Ignore the token."
            Token::EndTag(tag)
                if matches!(
                    tag.name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th" | "tr"
                ) =>
            {
                self.unexpected(&token);
                Ok(Step::Done)
            }

            // "Anything else"
            // "Process the token using the rules for the "in table" insertion
            // mode."
            _ => self.handle_in_table_mode(token),
        }
    }

    fn leave_table_body(&mut self, token: Token) -> Flow {
        if !self
            .open_elements
            .has_in_scope(is_table_section, Scope::Table)
        {
            self.unexpected(&token);
            return Ok(Step::Done);
        }
        self.open_elements.clear_back_to_table_body_context();
        let _ = self.open_elements.pop();
        self.reprocess_in(InsertionMode::InTable, token)
    }

    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    pub(in crate::parser) fn handle_in_row_mode(&mut self, token: Token) -> Flow {
        match &token {
            // "A start tag whose tag name is one of: "th", "td""
            // "Clear the stack back to a table row context."
            // "Insert an HTML element for the token, then switch the
            // insertion mode to "in cell"."
            // "Insert a marker at the end of the list of active formatting
            // elements."
            Token::StartTag(tag) if matches!(tag.name.as_str(), "th" | "td") => {
                self.open_elements.clear_back_to_table_row_context();
                let _ = self.insert_html_element(tag);
                self.switch_mode(InsertionMode::InCell);
                self.active_formatting_elements.push_marker();
                Ok(Step::Done)
            }

            // "An end tag whose tag name is "tr""
            // "If the stack of open elements does not have a tr element in
            // table scope, this is a parse error; ignore the token."
            // "Otherwise: Clear the stack back to a table row context. Pop
            // the current node (which will be a tr element) from the stack of
            // open elements. Switch the insertion mode to "in table body"."
            Token::EndTag(tag) if tag.name == "tr" => {
                let _ = self.close_row();
                Ok(Step::Done)
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "tfoot", "thead", "tr""
            // "An end tag whose tag name is "table""
            // "If the stack of open elements does not have a tr element in
            // table scope, this is a parse error; ignore the token."
            // "Otherwise: ... Reprocess the token."
            Token::StartTag(tag)
                if matches!(
                    tag.name.as_str(),
                    "caption" | "col" | "colgroup" | "tbody" | "tfoot" | "thead" | "tr"
                ) =>
            {
                self.close_row_and_reprocess(token)
            }
            Token::EndTag(tag) if tag.name == "table" => self.close_row_and_reprocess(token),

            // "An end tag whose tag name is one of: "tbody", "tfoot", "thead""
            // "If the stack of open elements does not have an element in table
            // scope that is an HTML element with the same tag name as the
            // token, this is a parse error; ignore the token."
            // "If the stack of open elements does not have a tr element in
            // table scope, ignore the token."
            // "Otherwise: ... Reprocess the token."
            Token::EndTag(tag) if is_table_section(&tag.name) => {
                if !self.open_elements.has_element_in_scope(&tag.name, Scope::Table) {
                    self.unexpected(&token);
                    return Ok(Step::Done);
                }
                self.close_row_and_reprocess(token)
            }

            // "An end tag whose tag name is one of: "body", "caption", "col",
            // "colgroup", "html", "td", "th""
            // "Parse error. Ignore the token."
            Token::EndTag(tag)
                if matches!(
                    tag.name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html" | "td" | "th"
                ) =>
            {
                self.unexpected(&token);
                Ok(Step::Done)
            }

            // "Anything else"
            // "Process the token using the rules for the "in table" insertion
            // mode."
            _ => self.handle_in_table_mode(token),
        }
    }

    /// The `</tr>` steps; returns whether a row was closed.
    fn close_row(&mut self) -> bool {
        if !self.open_elements.has_element_in_scope("tr", Scope::Table) {
            self.parse_error(ParseErrorCode::UnexpectedEndTag, &["tr"]);
            return false;
        }
        self.open_elements.clear_back_to_table_row_context();
        let _ = self.open_elements.pop();
        self.switch_mode(InsertionMode::InTableBody);
        true
    }

    fn close_row_and_reprocess(&mut self, token: Token) -> Flow {
        if self.close_row() {
            Ok(Step::Reprocess(token))
        } else {
            Ok(Step::Done)
        }
    }

    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    pub(in crate::parser) fn handle_in_cell_mode(&mut self, token: Token) -> Flow {
        match &token {
            // "An end tag whose tag name is one of: "td", "th""
            Token::EndTag(tag) if matches!(tag.name.as_str(), "td" | "th") => {
                let name = tag.name.as_str();
                // "If the stack of open elements does not have an element in
                // table scope that is an HTML element with the same tag name
                // as that of the token, then this is a parse error; ignore the
                // token."
                if !self.open_elements.has_element_in_scope(name, Scope::Table) {
                    self.parse_error(ParseErrorCode::UnexpectedEndTag, &[name]);
                    return Ok(Step::Done);
                }
                // "Otherwise: Generate implied end tags."
                self.open_elements.generate_implied_end_tags(None);
                // "Now, if the current node is not an HTML element with the
                // same tag name as the token, then this is a parse error."
                if !self.open_elements.current_is(name) {
                    self.parse_error(ParseErrorCode::EndTagTooEarly, &[name]);
                }
                // "Pop elements from the stack of open elements until an HTML
                // element with the same tag name as the token has been popped
                // from the stack."
                let _ = self.open_elements.pop_until_named(name);
                // "Clear the list of active formatting elements up to the last
                // marker."
                self.active_formatting_elements.clear_to_last_marker();
                // "Switch the insertion mode to "in row"."
                self.switch_mode(InsertionMode::InRow);
                Ok(Step::Done)
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "tbody", "td", "tfoot", "th", "thead", "tr""
            // "Assert: The stack of open elements has a td or th element in
            // table scope."
            // "Close the cell (see below) and reprocess the token."
            Token::StartTag(tag) if is_table_part(&tag.name) => {
                if !self
                    .open_elements
                    .has_in_scope(|n| matches!(n, "td" | "th"), Scope::Table)
                {
                    // Only reachable in the fragment case.
                    self.unexpected(&token);
                    return Ok(Step::Done);
                }
                self.close_the_cell();
                Ok(Step::Reprocess(token))
            }

            // "An end tag whose tag name is one of: "body", "caption", "col",
            // "colgroup", "html""
            // "Parse error. Ignore the token."
            Token::EndTag(tag)
                if matches!(
                    tag.name.as_str(),
                    "body" | "caption" | "col" | "colgroup" | "html"
                ) =>
            {
                self.unexpected(&token);
                Ok(Step::Done)
            }

            // "An end tag whose tag name is one of: "table", "tbody",
            // "tfoot", "thead", "tr""
            // "If the stack of open elements does not have an element in table
            // scope that is an HTML element with the same tag name as that of
            // the token, then this is a parse error; ignore the token."
            // "Otherwise, close the cell (see below) and reprocess the token."
            Token::EndTag(tag)
                if matches!(
                    tag.name.as_str(),
                    "table" | "tbody" | "tfoot" | "thead" | "tr"
                ) =>
            {
                if !self.open_elements.has_element_in_scope(&tag.name, Scope::Table) {
                    self.unexpected(&token);
                    return Ok(Step::Done);
                }
                self.close_the_cell();
                Ok(Step::Reprocess(token))
            }

            // "Anything else"
            // "Process the token using the rules for the "in body" insertion
            // mode."
            _ => self.handle_in_body_mode(token),
        }
    }

    /// "Where the steps above say to close the cell, they mean to run the
    /// following algorithm:"
    fn close_the_cell(&mut self) {
        // STEP 1: "Generate implied end tags."
        self.open_elements.generate_implied_end_tags(None);
        // STEP 2: "If the current node is not now a td element or a th
        // element, then this is a parse error."
        let is_cell = self
            .open_elements
            .current()
            .is_some_and(|e| e.is_html_where(|n| matches!(n, "td" | "th")));
        if !is_cell {
            self.parse_error(ParseErrorCode::EndTagTooEarly, &["td"]);
        }
        // STEP 3: "Pop elements from the stack of open elements until a td
        // element or a th element has been popped from the stack."
        let _ = self.open_elements.pop_until(|n| matches!(n, "td" | "th"));
        // STEP 4: "Clear the list of active formatting elements up to the
        // last marker."
        self.active_formatting_elements.clear_to_last_marker();
        // STEP 5: "Switch the insertion mode to "in row"."
        self.switch_mode(InsertionMode::InRow);
    }
}
