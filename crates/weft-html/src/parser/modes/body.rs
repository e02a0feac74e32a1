//! [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
//! and [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata).

use weft_dom::{DomProvider, Namespace, QuirksMode};

use crate::error::ParseErrorCode;
use crate::parser::adoption::Adoption;
use crate::parser::core::{Flow, HTMLTreeBuilder, InsertionMode, Step};
use crate::parser::stack::Scope;
use crate::parser::tag_sets;
use crate::tokenizer::{Tag, Token, TokenizerState};

/// "A start tag whose tag name is one of: "address", "article", "aside",
/// "blockquote", "center", "details", "dialog", "dir", "div", "dl",
/// "fieldset", "figcaption", "figure", "footer", "header", "hgroup", "main",
/// "menu", "nav", "ol", "p", "search", "section", "summary", "ul""
fn is_block_start(name: &str) -> bool {
    matches!(
        name,
        "address"
            | "article"
            | "aside"
            | "blockquote"
            | "center"
            | "details"
            | "dialog"
            | "dir"
            | "div"
            | "dl"
            | "fieldset"
            | "figcaption"
            | "figure"
            | "footer"
            | "header"
            | "hgroup"
            | "main"
            | "menu"
            | "nav"
            | "ol"
            | "p"
            | "search"
            | "section"
            | "summary"
            | "ul"
    )
}

/// "An end tag whose tag name is one of: "address", "article", "aside",
/// "blockquote", "button", "center", "details", "dialog", "dir", "div", "dl",
/// "fieldset", "figcaption", "figure", "footer", "header", "hgroup",
/// "listing", "main", "menu", "nav", "ol", "pre", "search", "section",
/// "summary", "ul""
fn is_block_end(name: &str) -> bool {
    (is_block_start(name) && name != "p") || matches!(name, "button" | "listing" | "pre")
}

impl<D: DomProvider> HTMLTreeBuilder<'_, D> {
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    pub(in crate::parser) fn handle_in_body_mode(&mut self, token: Token) -> Flow {
        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Ignore the token."
            //
            // The tokenizer has already reported it.
            Token::NullCharacter { .. } => {}

            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Reconstruct the active formatting elements, if any."
            // "Insert the token's character."
            Token::Whitespace { data } => {
                self.reconstruct_active_formatting_elements();
                self.insert_characters(&data);
            }

            // "Any other character token"
            // "Reconstruct the active formatting elements, if any."
            // "Insert the token's character."
            // "Set the frameset-ok flag to "not ok"."
            Token::Character { data } => {
                self.reconstruct_active_formatting_elements();
                self.insert_characters(&data);
                self.frameset_ok = false;
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(&data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype(_) => self.parse_error(ParseErrorCode::UnexpectedDoctype, &[]),

            Token::StartTag(tag) => return self.in_body_start_tag(tag),
            Token::EndTag(tag) => return self.in_body_end_tag(tag),

            // "An end-of-file token"
            Token::EndOfFile => {
                // "If the stack of template insertion modes is not empty, then
                // process the token using the rules for the "in template"
                // insertion mode."
                if !self.template_insertion_modes.is_empty() {
                    return self.handle_in_template_mode(Token::EndOfFile);
                }
                // "Otherwise, follow these steps: If there is a node in the
                // stack of open elements that is not either a dd element, a dt
                // element, an li element, an optgroup element, an option
                // element, a p element, an rb element, an rp element, an rt
                // element, an rtc element, a tbody element, a td element, a
                // tfoot element, a th element, a thead element, a tr element,
                // the body element, or the html element, then this is a parse
                // error."
                self.report_unclosed_elements(ParseErrorCode::ExpectedClosingTagButGotEof, None);
                // "Stop parsing."
                return self.stop_parsing();
            }
        }
        Ok(Step::Done)
    }

    /// Report `code` once if anything other than the elements that may be
    /// left open is still on the stack.
    fn report_unclosed_elements(&mut self, code: ParseErrorCode, name: Option<&str>) {
        if self
            .open_elements
            .find_not(|e| e.is_html_where(tag_sets::may_be_left_open))
            .is_some()
        {
            self.parse_error(code, name.as_slice());
        }
    }

    /// Copy attributes the element does not have yet from a duplicate `html`
    /// or `body` start tag.
    fn merge_attributes(&mut self, node: D::Handle, tag: &Tag) {
        for attribute in &tag.attributes {
            if !self.dom.has_attribute(node, &attribute.name) {
                self.set_attribute_escaped(node, attribute);
            }
        }
    }

    /// "close a p element"
    ///
    /// "Generate implied end tags, except for p elements. If the current node
    /// is not a p element, then this is a parse error. Pop elements from the
    /// stack of open elements until a p element has been popped from the
    /// stack."
    pub(in crate::parser) fn close_p_element(&mut self) {
        self.open_elements.generate_implied_end_tags(Some("p"));
        if !self.open_elements.current_is("p") {
            self.parse_error(ParseErrorCode::EndTagTooEarly, &["p"]);
        }
        let _ = self.open_elements.pop_until_named("p");
    }

    /// "If the stack of open elements has a p element in button scope, then
    /// close a p element."
    fn close_p_in_button_scope(&mut self) {
        if self.open_elements.has_element_in_scope("p", Scope::Button) {
            self.close_p_element();
        }
    }

    #[allow(clippy::too_many_lines)]
    fn in_body_start_tag(&mut self, tag: Tag) -> Flow {
        match tag.name.as_str() {
            // "A start tag whose tag name is "html""
            // "Parse error."
            // "If there is a template element on the stack of open elements,
            // then ignore the token."
            // "Otherwise, for each attribute on the token, check to see if the
            // attribute is already present on the top element of the stack of
            // open elements. If it is not, add the attribute and its
            // corresponding value to that element."
            "html" => {
                self.parse_error(ParseErrorCode::UnexpectedStartTag, &["html"]);
                if !self.open_elements.contains_html("template")
                    && let Some(root) = self.open_elements.get(0).map(|e| e.node)
                {
                    self.merge_attributes(root, &tag);
                }
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link", "meta", "noframes", "script", "style",
            // "template", "title""
            // "Process the token using the rules for the "in head" insertion
            // mode."
            "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
            | "style" | "template" | "title" => {
                return self.handle_in_head_mode(Token::StartTag(tag));
            }

            // "A start tag whose tag name is "body""
            "body" => {
                // "Parse error."
                self.parse_error(ParseErrorCode::UnexpectedStartTag, &["body"]);
                // "If the stack of open elements has only one node on it, if
                // the second element on the stack of open elements is not a
                // body element, or if there is a template element on the stack
                // of open elements, then ignore the token. (fragment case or
                // there is a template element on the stack)"
                let body = self
                    .open_elements
                    .get(1)
                    .filter(|e| e.is_html("body"))
                    .map(|e| e.node);
                if let Some(body) = body
                    && !self.open_elements.contains_html("template")
                {
                    // "Otherwise, set the frameset-ok flag to "not ok"; then,
                    // for each attribute on the token, check to see if the
                    // attribute is already present on the body element (the
                    // second element) on the stack of open elements, and if it
                    // is not, add the attribute and its corresponding value to
                    // that element."
                    self.frameset_ok = false;
                    self.merge_attributes(body, &tag);
                }
            }

            // "A start tag whose tag name is "frameset""
            "frameset" => {
                // "Parse error."
                self.parse_error(ParseErrorCode::UnexpectedStartTag, &["frameset"]);
                // "If the stack of open elements has only one node on it, or
                // if the second element on the stack of open elements is not
                // a body element, then ignore the token. (fragment case or
                // there is a template element on the stack)"
                // "If the frameset-ok flag is set to "not ok", ignore the
                // token."
                let body = self
                    .open_elements
                    .get(1)
                    .filter(|e| e.is_html("body"))
                    .map(|e| e.node);
                let Some(body) = body.filter(|_| self.frameset_ok) else {
                    return Ok(Step::Done);
                };
                // "Otherwise, run the following steps: Remove the second
                // element on the stack of open elements from its parent node,
                // if it has one."
                self.dom.remove_from_parent(body);
                // "Pop all the nodes from the bottom of the stack of open
                // elements, from the current node up to, but not including,
                // the root html element."
                self.open_elements.truncate(1);
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(&tag);
                // "Switch the insertion mode to "in frameset"."
                self.switch_mode(InsertionMode::InFrameset);
            }

            // "A start tag whose tag name is one of: "address", "article", ...
            // "ul""
            // "If the stack of open elements has a p element in button scope,
            // then close a p element."
            // "Insert an HTML element for the token."
            name if is_block_start(name) => {
                if name == "p" && self.open_elements.has_element_in_scope("p", Scope::Button) {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag, &["p"]);
                }
                self.close_p_in_button_scope();
                let _ = self.insert_html_element(&tag);
            }

            // "A start tag whose tag name is one of: "h1", "h2", "h3", "h4",
            // "h5", "h6""
            name if tag_sets::is_heading(name) => {
                // "If the stack of open elements has a p element in button
                // scope, then close a p element."
                self.close_p_in_button_scope();
                // "If the current node is an HTML element whose tag name is
                // one of "h1", "h2", "h3", "h4", "h5", or "h6", then this is a
                // parse error; pop the current node off the stack of open
                // elements."
                if self
                    .open_elements
                    .current()
                    .is_some_and(|e| e.is_html_where(tag_sets::is_heading))
                {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag, &[name]);
                    let _ = self.open_elements.pop();
                }
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(&tag);
            }

            // "A start tag whose tag name is one of: "pre", "listing""
            // "If the stack of open elements has a p element in button scope,
            // then close a p element."
            // "Insert an HTML element for the token."
            // "If the next token is a U+000A LINE FEED (LF) character token,
            // then ignore that token and move on to the next one. (Newlines at
            // the start of pre blocks are ignored as an authoring
            // convenience.)"
            // "Set the frameset-ok flag to "not ok"."
            "pre" | "listing" => {
                self.close_p_in_button_scope();
                let _ = self.insert_html_element(&tag);
                self.ignore_next_line_feed = true;
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "form""
            "form" => {
                // "If the form element pointer is not null, and there is no
                // template element on the stack of open elements, then this is
                // a parse error; ignore the token."
                let in_template = self.open_elements.contains_html("template");
                if self.form_element_pointer.is_some() && !in_template {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag, &["form"]);
                    return Ok(Step::Done);
                }
                // "Otherwise: If the stack of open elements has a p element in
                // button scope, then close a p element. Insert an HTML element
                // for the token, and, if there is no template element on the
                // stack of open elements, set the form element pointer to
                // point to the element created."
                self.close_p_in_button_scope();
                let form = self.insert_html_element(&tag);
                if !in_template {
                    self.form_element_pointer = Some(form);
                }
            }

            // "A start tag whose tag name is "li""
            // "A start tag whose tag name is one of: "dd", "dt""
            "li" | "dd" | "dt" => {
                // STEP 1: "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
                let closes = |name: &str| match tag.name.as_str() {
                    "li" => name == "li",
                    _ => matches!(name, "dd" | "dt"),
                };
                // STEP 2: "Initialize node to be the current node (the
                // bottommost node of the stack)."
                for index in (0..self.open_elements.len()).rev() {
                    let Some(node) = self.open_elements.get(index) else {
                        break;
                    };
                    // STEP 3: "Loop: If node is an li element, then run these
                    // substeps: Generate implied end tags, except for li
                    // elements. If the current node is not an li element, then
                    // this is a parse error. Pop elements from the stack of
                    // open elements until an li element has been popped from
                    // the stack. Jump to the step labeled done below."
                    if node.is_html_where(closes) {
                        let name = node.name.clone();
                        self.open_elements.generate_implied_end_tags(Some(&name));
                        if !self.open_elements.current_is(&name) {
                            self.parse_error(ParseErrorCode::EndTagTooEarly, &[&name]);
                        }
                        let _ = self.open_elements.pop_until_named(&name);
                        break;
                    }
                    // STEP 4: "If node is in the special category, but is not
                    // an address, div, or p element, then jump to the step
                    // labeled done below."
                    if node.is_special()
                        && !node.is_html_where(|n| matches!(n, "address" | "div" | "p"))
                    {
                        break;
                    }
                    // STEP 5: "Otherwise, set node to the previous entry in the
                    // stack of open elements and return to the step labeled
                    // loop."
                }
                // STEP 6: "Done: If the stack of open elements has a p element
                // in button scope, then close a p element."
                self.close_p_in_button_scope();
                // STEP 7: "Finally, insert an HTML element for the token."
                let _ = self.insert_html_element(&tag);
            }

            // "A start tag whose tag name is "plaintext""
            // "If the stack of open elements has a p element in button scope,
            // then close a p element."
            // "Insert an HTML element for the token."
            // "Switch the tokenizer to the PLAINTEXT state."
            "plaintext" => {
                self.close_p_in_button_scope();
                let _ = self.insert_html_element(&tag);
                self.tokenizer.set_state(TokenizerState::PLAINTEXT);
            }

            // "A start tag whose tag name is "button""
            "button" => {
                // "If the stack of open elements has a button element in
                // scope, then run these substeps: Parse error. Generate
                // implied end tags. Pop elements from the stack of open
                // elements until a button element has been popped from the
                // stack."
                if self.open_elements.has_element_in_scope("button", Scope::Default) {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag, &["button"]);
                    self.open_elements.generate_implied_end_tags(None);
                    let _ = self.open_elements.pop_until_named("button");
                }
                // "Reconstruct the active formatting elements, if any."
                // "Insert an HTML element for the token."
                // "Set the frameset-ok flag to "not ok"."
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(&tag);
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "a""
            "a" => {
                // "If the list of active formatting elements contains an a
                // element between the end of the list and the last marker on
                // the list (or the start of the list if there is no marker on
                // the list), then this is a parse error; run the adoption
                // agency algorithm for the token, then remove that element
                // from the list of active formatting elements and the stack of
                // open elements if the adoption agency algorithm didn't
                // already remove it (it might not have if the element is not
                // in table scope)."
                if let Some(existing) = self.formatting_element_after_last_marker("a") {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag, &["a"]);
                    let _ = self.run_adoption_agency("a");
                    self.forget_formatting_element(existing);
                }
                // "Reconstruct the active formatting elements, if any."
                // "Insert an HTML element for the token. Push onto the list of
                // active formatting elements that element."
                self.reconstruct_active_formatting_elements();
                let node = self.insert_html_element(&tag);
                self.active_formatting_elements.push(node, tag);
            }

            // "A start tag whose tag name is "nobr""
            "nobr" => {
                // "Reconstruct the active formatting elements, if any."
                self.reconstruct_active_formatting_elements();
                // "If the stack of open elements has a nobr element in scope,
                // then this is a parse error; run the adoption agency
                // algorithm for the token, then once again reconstruct the
                // active formatting elements, if any."
                if self.open_elements.has_element_in_scope("nobr", Scope::Default) {
                    self.parse_error(ParseErrorCode::UnexpectedStartTag, &["nobr"]);
                    let _ = self.run_adoption_agency("nobr");
                    self.reconstruct_active_formatting_elements();
                }
                // "Insert an HTML element for the token. Push onto the list of
                // active formatting elements that element."
                let node = self.insert_html_element(&tag);
                self.active_formatting_elements.push(node, tag);
            }

            // "A start tag whose tag name is one of: "b", "big", "code", "em",
            // "font", "i", "s", "small", "strike", "strong", "tt", "u""
            // "Reconstruct the active formatting elements, if any."
            // "Insert an HTML element for the token. Push onto the list of
            // active formatting elements that element."
            name if tag_sets::is_formatting(name) => {
                self.reconstruct_active_formatting_elements();
                let node = self.insert_html_element(&tag);
                self.active_formatting_elements.push(node, tag);
            }

            // "A start tag whose tag name is one of: "applet", "marquee",
            // "object""
            // "Reconstruct the active formatting elements, if any."
            // "Insert an HTML element for the token."
            // "Insert a marker at the end of the list of active formatting
            // elements."
            // "Set the frameset-ok flag to "not ok"."
            "applet" | "marquee" | "object" => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(&tag);
                self.active_formatting_elements.push_marker();
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "table""
            // "If the Document is not set to quirks mode, and the stack of
            // open elements has a p element in button scope, then close a p
            // element."
            // "Insert an HTML element for the token."
            // "Set the frameset-ok flag to "not ok"."
            // "Switch the insertion mode to "in table"."
            "table" => {
                if self.quirks_mode != QuirksMode::Quirks {
                    self.close_p_in_button_scope();
                }
                let _ = self.insert_html_element(&tag);
                self.frameset_ok = false;
                self.switch_mode(InsertionMode::InTable);
            }

            // "A start tag whose tag name is one of: "area", "br", "embed",
            // "img", "keygen", "wbr""
            // "Reconstruct the active formatting elements, if any."
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements."
            // "Acknowledge the token's self-closing flag, if it is set."
            // "Set the frameset-ok flag to "not ok"."
            "area" | "br" | "embed" | "img" | "keygen" | "wbr" => {
                self.insert_void_element(&tag);
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "input""
            // "Reconstruct the active formatting elements, if any."
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements."
            // "Acknowledge the token's self-closing flag, if it is set."
            // "If the token does not have an attribute with the name "type",
            // or if it does, but that attribute's value is not an ASCII
            // case-insensitive match for the string "hidden", then: set the
            // frameset-ok flag to "not ok"."
            "input" => {
                self.insert_void_element(&tag);
                if !tag
                    .attribute("type")
                    .is_some_and(|t| t.eq_ignore_ascii_case("hidden"))
                {
                    self.frameset_ok = false;
                }
            }

            // "A start tag whose tag name is one of: "param", "source",
            // "track""
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements."
            // "Acknowledge the token's self-closing flag, if it is set."
            "param" | "source" | "track" => {
                let _ = self.insert_html_element(&tag);
                let _ = self.open_elements.pop();
                self.acknowledge_self_closing();
            }

            // "A start tag whose tag name is "hr""
            // "If the stack of open elements has a p element in button scope,
            // then close a p element."
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements."
            // "Acknowledge the token's self-closing flag, if it is set."
            // "Set the frameset-ok flag to "not ok"."
            "hr" => {
                self.close_p_in_button_scope();
                let _ = self.insert_html_element(&tag);
                let _ = self.open_elements.pop();
                self.acknowledge_self_closing();
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "image""
            // "Parse error. Change the token's tag name to "img" and reprocess
            // it. (Don't ask.)"
            "image" => {
                self.parse_error(ParseErrorCode::UnexpectedStartTag, &["image"]);
                let mut tag = tag;
                "img".clone_into(&mut tag.name);
                return Ok(Step::Reprocess(Token::StartTag(tag)));
            }

            // "A start tag whose tag name is "textarea""
            // "Insert an HTML element for the token."
            // "If the next token is a U+000A LINE FEED (LF) character token,
            // then ignore that token and move on to the next one. (Newlines at
            // the start of textarea elements are ignored as an authoring
            // convenience.)"
            // "Switch the tokenizer to the RCDATA state."
            // "Let the original insertion mode be the current insertion mode."
            // "Set the frameset-ok flag to "not ok"."
            // "Switch the insertion mode to "text"."
            "textarea" => {
                self.parse_text_only_element(&tag, TokenizerState::RCDATA);
                self.ignore_next_line_feed = true;
                self.frameset_ok = false;
            }

            // "A start tag whose tag name is "xmp""
            // "If the stack of open elements has a p element in button scope,
            // then close a p element."
            // "Reconstruct the active formatting elements, if any."
            // "Set the frameset-ok flag to "not ok"."
            // "Follow the generic raw text element parsing algorithm."
            "xmp" => {
                self.close_p_in_button_scope();
                self.reconstruct_active_formatting_elements();
                self.frameset_ok = false;
                self.parse_text_only_element(&tag, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "iframe""
            // "Set the frameset-ok flag to "not ok"."
            // "Follow the generic raw text element parsing algorithm."
            "iframe" => {
                self.frameset_ok = false;
                self.parse_text_only_element(&tag, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "noembed""
            // "A start tag whose tag name is "noscript", if the scripting
            // flag is enabled"
            // "Follow the generic raw text element parsing algorithm."
            "noembed" => self.parse_text_only_element(&tag, TokenizerState::RAWTEXT),
            "noscript" if self.scripting => {
                self.parse_text_only_element(&tag, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "select""
            "select" => {
                // "Reconstruct the active formatting elements, if any."
                // "Insert an HTML element for the token."
                // "Set the frameset-ok flag to "not ok"."
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(&tag);
                self.frameset_ok = false;
                // "If the insertion mode is one of "in table", "in caption",
                // "in table body", "in row", or "in cell", then switch the
                // insertion mode to "in select in table". Otherwise, switch
                // the insertion mode to "in select"."
                let mode = match self.insertion_mode {
                    InsertionMode::InTable
                    | InsertionMode::InCaption
                    | InsertionMode::InTableBody
                    | InsertionMode::InRow
                    | InsertionMode::InCell => InsertionMode::InSelectInTable,
                    _ => InsertionMode::InSelect,
                };
                self.switch_mode(mode);
            }

            // "A start tag whose tag name is one of: "optgroup", "option""
            // "If the current node is an option element, then pop the current
            // node off the stack of open elements."
            // "Reconstruct the active formatting elements, if any."
            // "Insert an HTML element for the token."
            "optgroup" | "option" => {
                if self.open_elements.current_is("option") {
                    let _ = self.open_elements.pop();
                }
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(&tag);
            }

            // "A start tag whose tag name is one of: "rb", "rtc""
            // "If the stack of open elements has a ruby element in scope, then
            // generate implied end tags. If the current node is not now a ruby
            // element, this is a parse error."
            // "Insert an HTML element for the token."
            "rb" | "rtc" => {
                if self.open_elements.has_element_in_scope("ruby", Scope::Default) {
                    self.open_elements.generate_implied_end_tags(None);
                    if !self.open_elements.current_is("ruby") {
                        self.parse_error(ParseErrorCode::UnexpectedStartTag, &[&tag.name]);
                    }
                }
                let _ = self.insert_html_element(&tag);
            }

            // "A start tag whose tag name is one of: "rp", "rt""
            // "If the stack of open elements has a ruby element in scope, then
            // generate implied end tags, except for rtc elements. If the
            // current node is not now a rtc element or a ruby element, this is
            // a parse error."
            // "Insert an HTML element for the token."
            "rp" | "rt" => {
                if self.open_elements.has_element_in_scope("ruby", Scope::Default) {
                    self.open_elements.generate_implied_end_tags(Some("rtc"));
                    if !self.open_elements.current_is("rtc")
                        && !self.open_elements.current_is("ruby")
                    {
                        self.parse_error(ParseErrorCode::UnexpectedStartTag, &[&tag.name]);
                    }
                }
                let _ = self.insert_html_element(&tag);
            }

            // "A start tag whose tag name is "math""
            // "Reconstruct the active formatting elements, if any."
            // "Adjust MathML attributes for the token. (This fixes the case of
            // MathML attributes that are not all lowercase.)"
            // "Adjust foreign attributes for the token. (This fixes the use of
            // namespaced attributes, in particular XLink.)"
            // "Insert a foreign element for the token, with MathML namespace
            // and false."
            // "If the token has its self-closing flag set, pop the current
            // node off the stack of open elements and acknowledge the token's
            // self-closing flag."
            "math" => {
                self.reconstruct_active_formatting_elements();
                self.insert_foreign_start_tag(tag, Namespace::MathMl);
            }

            // "A start tag whose tag name is "svg""
            // Same as "math", with SVG attribute adjustments and the SVG
            // namespace.
            "svg" => {
                self.reconstruct_active_formatting_elements();
                self.insert_foreign_start_tag(tag, Namespace::Svg);
            }

            // "A start tag whose tag name is one of: "caption", "col",
            // "colgroup", "frame", "head", "tbody", "td", "tfoot", "th",
            // "thead", "tr""
            // "Parse error. Ignore the token."
            "caption" | "col" | "colgroup" | "frame" | "head" | "tbody" | "td" | "tfoot"
            | "th" | "thead" | "tr" => {
                self.parse_error(ParseErrorCode::UnexpectedStartTag, &[&tag.name]);
            }

            // "Any other start tag"
            // "Reconstruct the active formatting elements, if any."
            // "Insert an HTML element for the token."
            _ => {
                self.reconstruct_active_formatting_elements();
                let _ = self.insert_html_element(&tag);
            }
        }
        Ok(Step::Done)
    }

    fn insert_void_element(&mut self, tag: &Tag) {
        self.reconstruct_active_formatting_elements();
        let _ = self.insert_html_element(tag);
        let _ = self.open_elements.pop();
        self.acknowledge_self_closing();
    }

    #[allow(clippy::too_many_lines)]
    fn in_body_end_tag(&mut self, tag: Tag) -> Flow {
        match tag.name.as_str() {
            // "An end tag whose tag name is "template""
            // "Process the token using the rules for the "in head" insertion
            // mode."
            "template" => return self.handle_in_head_mode(Token::EndTag(tag)),

            // "An end tag whose tag name is "body""
            "body" => {
                // "If the stack of open elements does not have a body element
                // in scope, this is a parse error; ignore the token."
                if !self.open_elements.has_element_in_scope("body", Scope::Default) {
                    self.parse_error(ParseErrorCode::UnexpectedEndTag, &["body"]);
                    return Ok(Step::Done);
                }
                // "Otherwise, if there is a node in the stack of open elements
                // that is not either a dd element, ..., the body element, or
                // the html element, then this is a parse error."
                self.report_unclosed_elements(ParseErrorCode::EndTagTooEarly, Some("body"));
                // "Switch the insertion mode to "after body"."
                self.switch_mode(InsertionMode::AfterBody);
            }

            // "An end tag whose tag name is "html""
            "html" => {
                // "If the stack of open elements does not have a body element
                // in scope, this is a parse error; ignore the token."
                if !self.open_elements.has_element_in_scope("body", Scope::Default) {
                    self.parse_error(ParseErrorCode::UnexpectedEndTag, &["html"]);
                    return Ok(Step::Done);
                }
                self.report_unclosed_elements(ParseErrorCode::EndTagTooEarly, Some("html"));
                // "Switch the insertion mode to "after body"."
                // "Reprocess the token."
                return self.reprocess_in(InsertionMode::AfterBody, Token::EndTag(tag));
            }

            // "An end tag whose tag name is one of: "address", "article", ...
            // "ul""
            // "If the stack of open elements does not have an element in scope
            // that is an HTML element with the same tag name as that of the
            // token, then this is a parse error; ignore the token."
            // "Otherwise, run these steps: Generate implied end tags. If the
            // current node is not an HTML element with the same tag name as
            // that of the token, then this is a parse error. Pop elements from
            // the stack of open elements until an HTML element with the same
            // tag name as the token has been popped from the stack."
            name if is_block_end(name) => self.close_element_in_scope(name, Scope::Default),

            // "An end tag whose tag name is "form""
            "form" => {
                if self.open_elements.contains_html("template") {
                    // "If there is a template element on the stack of open
                    // elements, then run these substeps instead: If the stack
                    // of open elements does not have a form element in scope,
                    // then this is a parse error; return and ignore the token.
                    // Generate implied end tags. If the current node is not a
                    // form element, then this is a parse error. Pop elements
                    // from the stack of open elements until a form element has
                    // been popped from the stack."
                    self.close_element_in_scope("form", Scope::Default);
                    return Ok(Step::Done);
                }
                // STEP 1: "Let node be the element that the form element
                // pointer is set to, or null if it is not set to an element."
                // STEP 2: "Set the form element pointer to null."
                let node = self.form_element_pointer.take();
                // STEP 3: "If node is null or if the stack of open elements
                // does not have node in scope, then this is a parse error;
                // return and ignore the token."
                let Some(node) =
                    node.filter(|&node| self.open_elements.has_node_in_scope(node, Scope::Default))
                else {
                    self.parse_error(ParseErrorCode::UnexpectedEndTag, &["form"]);
                    return Ok(Step::Done);
                };
                // STEP 4: "Generate implied end tags."
                self.open_elements.generate_implied_end_tags(None);
                // STEP 5: "If the current node is not node, then this is a
                // parse error."
                if self.open_elements.current_node() != Some(node) {
                    self.parse_error(ParseErrorCode::EndTagTooEarly, &["form"]);
                }
                // STEP 6: "Remove node from the stack of open elements."
                let _ = self.open_elements.remove_node(node);
            }

            // "An end tag whose tag name is "p""
            // "If the stack of open elements does not have a p element in
            // button scope, then this is a parse error; insert an HTML element
            // for a "p" start tag token with no attributes."
            // "Close a p element."
            "p" => {
                if !self.open_elements.has_element_in_scope("p", Scope::Button) {
                    self.parse_error(ParseErrorCode::UnexpectedEndTag, &["p"]);
                    let _ = self.insert_html_element(&Tag::named("p"));
                }
                self.close_p_element();
            }

            // "An end tag whose tag name is "li""
            // "If the stack of open elements does not have an li element in
            // list item scope, then this is a parse error; ignore the token."
            // "Otherwise, run these steps: Generate implied end tags, except
            // for li elements. If the current node is not an li element, then
            // this is a parse error. Pop elements from the stack of open
            // elements until an li element has been popped from the stack."
            "li" => self.close_element_in_scope("li", Scope::ListItem),

            // "An end tag whose tag name is one of: "dd", "dt""
            "dd" | "dt" => self.close_element_in_scope(&tag.name, Scope::Default),

            // "An end tag whose tag name is one of: "h1", "h2", "h3", "h4",
            // "h5", "h6""
            name if tag_sets::is_heading(name) => {
                // "If the stack of open elements does not have an element in
                // scope that is an HTML element and whose tag name is one of
                // "h1", "h2", "h3", "h4", "h5", or "h6", then this is a parse
                // error; ignore the token."
                if !self
                    .open_elements
                    .has_in_scope(tag_sets::is_heading, Scope::Default)
                {
                    self.parse_error(ParseErrorCode::UnexpectedEndTag, &[name]);
                    return Ok(Step::Done);
                }
                // "Otherwise, run these steps: Generate implied end tags. If
                // the current node is not an HTML element with the same tag
                // name as that of the token, then this is a parse error. Pop
                // elements from the stack of open elements until an HTML
                // element whose tag name is one of "h1", "h2", "h3", "h4",
                // "h5", or "h6" has been popped from the stack."
                self.open_elements.generate_implied_end_tags(None);
                if !self.open_elements.current_is(name) {
                    self.parse_error(ParseErrorCode::EndTagTooEarly, &[name]);
                }
                let _ = self.open_elements.pop_until(tag_sets::is_heading);
            }

            // "An end tag whose tag name is one of: "a", "b", "big", "code",
            // "em", "font", "i", "nobr", "s", "small", "strike", "strong",
            // "tt", "u""
            // "Run the adoption agency algorithm for the token."
            name if tag_sets::is_formatting(name) => {
                if self.run_adoption_agency(name) == Adoption::ActAsAnyOtherEndTag {
                    self.any_other_end_tag(&tag);
                }
            }

            // "An end tag token whose tag name is one of: "applet",
            // "marquee", "object""
            // "If the stack of open elements does not have an element in scope
            // that is an HTML element with the same tag name as that of the
            // token, then this is a parse error; ignore the token."
            // "Otherwise, run these steps: Generate implied end tags. If the
            // current node is not an HTML element with the same tag name as
            // that of the token, then this is a parse error. Pop elements from
            // the stack of open elements until an HTML element with the same
            // tag name as the token has been popped from the stack. Clear the
            // list of active formatting elements up to the last marker."
            "applet" | "marquee" | "object" => {
                if self.open_elements.has_element_in_scope(&tag.name, Scope::Default) {
                    self.close_element_in_scope(&tag.name, Scope::Default);
                    self.active_formatting_elements.clear_to_last_marker();
                } else {
                    self.parse_error(ParseErrorCode::UnexpectedEndTag, &[&tag.name]);
                }
            }

            // "An end tag whose tag name is "br""
            // "Parse error. Drop the attributes from the token, and act as
            // described in the next entry; i.e. act as if this was a "br"
            // start tag token with no attributes, rather than the end tag
            // token that it actually is."
            "br" => {
                self.parse_error(ParseErrorCode::UnexpectedEndTag, &["br"]);
                self.insert_void_element(&Tag::named("br"));
                self.frameset_ok = false;
            }

            // "Any other end tag"
            _ => self.any_other_end_tag(&tag),
        }
        Ok(Step::Done)
    }

    /// The shared shape of most end tag rules: error and ignore when `name`
    /// is not in `scope`; otherwise generate implied end tags (keeping
    /// `name`), report if the current node is not `name`, and pop through it.
    pub(in crate::parser) fn close_element_in_scope(&mut self, name: &str, scope: Scope) {
        if !self.open_elements.has_element_in_scope(name, scope) {
            self.parse_error(ParseErrorCode::UnexpectedEndTag, &[name]);
            return;
        }
        self.open_elements.generate_implied_end_tags(Some(name));
        if !self.open_elements.current_is(name) {
            self.parse_error(ParseErrorCode::EndTagTooEarly, &[name]);
        }
        let _ = self.open_elements.pop_until_named(name);
    }

    /// "Any other end tag"
    pub(in crate::parser) fn any_other_end_tag(&mut self, tag: &Tag) {
        // STEP 1: "Initialize node to be the current node (the bottommost
        // node of the stack)."
        for index in (0..self.open_elements.len()).rev() {
            let Some(node) = self.open_elements.get(index) else {
                break;
            };
            // STEP 2: "Loop: If node is an HTML element with the same tag name
            // as the token, then: Generate implied end tags, except for HTML
            // elements with the same tag name as the token. If node is not
            // the current node, then this is a parse error. Pop all the nodes
            // from the current node up to node, including node, then stop
            // these steps."
            if node.is_html(&tag.name) {
                self.open_elements.generate_implied_end_tags(Some(&tag.name));
                if self.open_elements.len() != index + 1 {
                    self.parse_error(ParseErrorCode::EndTagTooEarly, &[&tag.name]);
                }
                self.open_elements.truncate(index);
                return;
            }
            // STEP 3: "Otherwise, if node is in the special category, then
            // this is a parse error; ignore the token, and return."
            if node.is_special() {
                self.parse_error(ParseErrorCode::UnexpectedEndTag, &[&tag.name]);
                return;
            }
            // STEP 4: "Set node to the previous entry in the stack of open
            // elements."
            // STEP 5: "Return to the step labeled loop."
        }
    }

    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    pub(in crate::parser) fn handle_text_mode(&mut self, token: Token) -> Flow {
        match token {
            // "A character token"
            // "Insert the token's character."
            Token::Character { data } | Token::Whitespace { data } => {
                self.insert_characters(&data);
            }
            Token::NullCharacter { data } => {
                let replacement = "\u{FFFD}".repeat(data.chars().count());
                self.insert_characters(&replacement);
            }

            // "An end-of-file token"
            // "Parse error."
            // "If the current node is a script element, then set its already
            // started to true."
            // "Pop the current node off the stack of open elements."
            // "Switch the insertion mode to the original insertion mode and
            // reprocess the token."
            Token::EndOfFile => {
                let name = self
                    .open_elements
                    .current()
                    .map(|e| e.name.clone())
                    .unwrap_or_default();
                self.parse_error(ParseErrorCode::EofInElementThatCanContainOnlyText, &[&name]);
                let _ = self.open_elements.pop();
                let mode = self.original_insertion_mode.take().unwrap_or(InsertionMode::InBody);
                return self.reprocess_in(mode, Token::EndOfFile);
            }

            // "An end tag whose tag name is "script""
            // "Any other end tag"
            // "Pop the current node off the stack of open elements."
            // "Switch the insertion mode to the original insertion mode."
            Token::EndTag(_) => {
                let _ = self.open_elements.pop();
                let mode = self.original_insertion_mode.take().unwrap_or(InsertionMode::InBody);
                self.switch_mode(mode);
            }

            // The tokenizer emits nothing else in the text-only states.
            Token::StartTag(_) | Token::Comment { .. } | Token::Doctype(_) => {}
        }
        Ok(Step::Done)
    }
}
