//! The modes that scaffold the document: "before html", "before head",
//! "in head", "in head noscript" and "after head".

use log::debug;
use weft_dom::{DomProvider, Namespace};

use crate::encoding::{Confidence, charset};
use crate::error::{ParseErrorCode, Restart};
use crate::parser::core::{Flow, HTMLTreeBuilder, InsertionMode, Step};
use crate::parser::stack::OpenElement;
use crate::tokenizer::{Tag, Token, TokenizerState};

impl<D: DomProvider> HTMLTreeBuilder<'_, D> {
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    pub(in crate::parser) fn handle_before_html_mode(&mut self, token: Token) -> Flow {
        match &token {
            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype(_) => self.unexpected(&token),

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => {
                let document = self.dom.document();
                self.insert_comment_into(data, document);
            }

            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::Whitespace { .. } => {}

            // "A start tag whose tag name is "html""
            // "Create an element for the token in the HTML namespace, with
            // the Document as the intended parent. Append it to the Document
            // object. Put this element in the stack of open elements."
            // "Switch the insertion mode to "before head"."
            Token::StartTag(tag) if tag.name == "html" => {
                self.insert_root_element(tag);
                self.switch_mode(InsertionMode::BeforeHead);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag(tag) if !matches!(tag.name.as_str(), "head" | "body" | "html" | "br") => {
                self.unexpected(&token);
            }

            // "Anything else"
            // "Create an html element whose node document is the Document
            // object. Append it to the Document object. Put this element in
            // the stack of open elements."
            // "Switch the insertion mode to "before head", then reprocess the
            // token."
            _ => {
                self.insert_root_element(&Tag::named("html"));
                return self.reprocess_in(InsertionMode::BeforeHead, token);
            }
        }
        Ok(Step::Done)
    }

    fn insert_root_element(&mut self, tag: &Tag) {
        let element = self.create_element_for_token(tag, Namespace::Html);
        let document = self.dom.document();
        self.dom.append_child(document, element.node);
        self.open_elements.push(element);
    }

    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    pub(in crate::parser) fn handle_before_head_mode(&mut self, token: Token) -> Flow {
        match &token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::Whitespace { .. } => {}

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype(_) => self.unexpected(&token),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::StartTag(tag) if tag.name == "html" => return self.handle_in_body_mode(token),

            // "A start tag whose tag name is "head""
            // "Insert an HTML element for the token."
            // "Set the head element pointer to the newly created head
            // element."
            // "Switch the insertion mode to "in head"."
            Token::StartTag(tag) if tag.name == "head" => {
                let head = self.insert_html_element(tag);
                self.head_element_pointer = Some(head);
                self.switch_mode(InsertionMode::InHead);
            }

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag(tag) if !matches!(tag.name.as_str(), "head" | "body" | "html" | "br") => {
                self.unexpected(&token);
            }

            // "Anything else"
            // "Insert an HTML element for a "head" start tag token with no
            // attributes."
            // "Set the head element pointer to the newly created head
            // element."
            // "Switch the insertion mode to "in head"."
            // "Reprocess the current token."
            _ => {
                let head = self.insert_html_element(&Tag::named("head"));
                self.head_element_pointer = Some(head);
                return self.reprocess_in(InsertionMode::InHead, token);
            }
        }
        Ok(Step::Done)
    }

    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    pub(in crate::parser) fn handle_in_head_mode(&mut self, token: Token) -> Flow {
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
            Token::Doctype(_) => self.unexpected(&token),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::StartTag(tag) if tag.name == "html" => return self.handle_in_body_mode(token),

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link""
            // "Insert an HTML element for the token. Immediately pop the
            // current node off the stack of open elements."
            // "Acknowledge the token's self-closing flag, if it is set."
            Token::StartTag(tag)
                if matches!(tag.name.as_str(), "base" | "basefont" | "bgsound" | "link") =>
            {
                let _ = self.insert_html_element(tag);
                let _ = self.open_elements.pop();
                self.acknowledge_self_closing();
            }

            // "A start tag whose tag name is "meta""
            Token::StartTag(tag) if tag.name == "meta" => {
                let _ = self.insert_html_element(tag);
                let _ = self.open_elements.pop();
                self.acknowledge_self_closing();
                self.apply_meta_encoding(tag)?;
            }

            // "A start tag whose tag name is "title""
            // "Follow the generic RCDATA element parsing algorithm."
            Token::StartTag(tag) if tag.name == "title" => {
                self.parse_text_only_element(tag, TokenizerState::RCDATA);
            }

            // "A start tag whose tag name is "noscript", if the scripting
            // flag is enabled"
            // "A start tag whose tag name is one of: "noframes", "style""
            // "Follow the generic raw text element parsing algorithm."
            Token::StartTag(tag)
                if (tag.name == "noscript" && self.scripting)
                    || matches!(tag.name.as_str(), "noframes" | "style") =>
            {
                self.parse_text_only_element(tag, TokenizerState::RAWTEXT);
            }

            // "A start tag whose tag name is "noscript", if the scripting
            // flag is disabled"
            // "Insert an HTML element for the token."
            // "Switch the insertion mode to "in head noscript"."
            Token::StartTag(tag) if tag.name == "noscript" => {
                let _ = self.insert_html_element(tag);
                self.switch_mode(InsertionMode::InHeadNoscript);
            }

            // "A start tag whose tag name is "script""
            // "Switch the tokenizer to the script data state."
            // "Let the original insertion mode be the current insertion
            // mode."
            // "Switch the insertion mode to "text"."
            Token::StartTag(tag) if tag.name == "script" => {
                self.parse_text_only_element(tag, TokenizerState::ScriptData);
            }

            // "An end tag whose tag name is "head""
            // "Pop the current node (which will be the head element) off the
            // stack of open elements."
            // "Switch the insertion mode to "after head"."
            Token::EndTag(tag) if tag.name == "head" => {
                let _ = self.open_elements.pop();
                self.switch_mode(InsertionMode::AfterHead);
            }

            // "A start tag whose tag name is "template""
            Token::StartTag(tag) if tag.name == "template" => {
                // "Insert an HTML element for the token."
                let _ = self.insert_html_element(tag);
                // "Insert a marker at the end of the list of active
                // formatting elements."
                self.active_formatting_elements.push_marker();
                // "Set the frameset-ok flag to "not ok"."
                self.frameset_ok = false;
                // "Switch the insertion mode to "in template"."
                self.switch_mode(InsertionMode::InTemplate);
                // "Push "in template" onto the stack of template insertion
                // modes so that it is the new current template insertion
                // mode."
                self.template_insertion_modes.push(InsertionMode::InTemplate);
            }

            // "An end tag whose tag name is "template""
            Token::EndTag(tag) if tag.name == "template" => {
                // "If there is no template element on the stack of open
                // elements, then this is a parse error; ignore the token."
                if !self.open_elements.contains_html("template") {
                    self.unexpected(&token);
                    return Ok(Step::Done);
                }
                // "Generate all implied end tags thoroughly."
                self.open_elements.generate_all_implied_end_tags_thoroughly();
                // "If the current node is not a template element, then this is
                // a parse error."
                if !self.open_elements.current_is("template") {
                    self.parse_error(ParseErrorCode::EndTagTooEarly, &["template"]);
                }
                // "Pop elements from the stack of open elements until a
                // template element has been popped from the stack."
                let _ = self.open_elements.pop_until_named("template");
                // "Clear the list of active formatting elements up to the last
                // marker."
                self.active_formatting_elements.clear_to_last_marker();
                // "Pop the current template insertion mode off the stack of
                // template insertion modes."
                let _ = self.template_insertion_modes.pop();
                // "Reset the insertion mode appropriately."
                self.reset_insertion_mode_appropriately();
            }

            // "A start tag whose tag name is "head""
            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::StartTag(tag) if tag.name == "head" => self.unexpected(&token),
            Token::EndTag(tag) if !matches!(tag.name.as_str(), "body" | "html" | "br") => {
                self.unexpected(&token);
            }

            // "Anything else"
            // "Pop the current node (which will be the head element) off the
            // stack of open elements."
            // "Switch the insertion mode to "after head"."
            // "Reprocess the token."
            _ => {
                let _ = self.open_elements.pop();
                return self.reprocess_in(InsertionMode::AfterHead, token);
            }
        }
        Ok(Step::Done)
    }

    /// The encoding part of the "meta" start tag rule:
    ///
    /// "If the element has a charset attribute, and getting an encoding from
    /// its value results in an encoding, and the confidence is currently
    /// tentative, then change the encoding to the resulting encoding."
    ///
    /// "Otherwise, if the element has an http-equiv attribute whose value is
    /// an ASCII case-insensitive match for the string "Content-Type", and the
    /// element has a content attribute, and applying the algorithm for
    /// extracting a character encoding from a meta element to that
    /// attribute's value returns an encoding, and the confidence is currently
    /// tentative, then change the encoding to the extracted encoding."
    fn apply_meta_encoding(&mut self, tag: &Tag) -> Result<(), Restart> {
        if self.tokenizer.input().confidence() != Confidence::Tentative {
            return Ok(());
        }
        let requested = if let Some(label) = tag.attribute("charset") {
            charset::from_charset_name(label)
        } else if tag
            .attribute("http-equiv")
            .is_some_and(|value| value.eq_ignore_ascii_case("content-type"))
            && let Some(content) = tag.attribute("content")
        {
            charset::from_meta_content(content)
        } else {
            None
        };
        if let Some(encoding) = requested {
            debug!("<meta> asks for {}", encoding.name());
            self.tokenizer.input_mut().change_encoding(encoding)?;
        }
        Ok(())
    }

    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    pub(in crate::parser) fn handle_in_head_noscript_mode(&mut self, token: Token) -> Flow {
        match &token {
            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype(_) => self.unexpected(&token),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::StartTag(tag) if tag.name == "html" => return self.handle_in_body_mode(token),

            // "An end tag whose tag name is "noscript""
            // "Pop the current node (which will be a noscript element) from
            // the stack of open elements; the new current node will be a head
            // element."
            // "Switch the insertion mode to "in head"."
            Token::EndTag(tag) if tag.name == "noscript" => {
                let _ = self.open_elements.pop();
                self.switch_mode(InsertionMode::InHead);
            }

            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "A comment token"
            // "A start tag whose tag name is one of: "basefont", "bgsound",
            // "link", "meta", "noframes", "style""
            // "Process the token using the rules for the "in head" insertion
            // mode."
            Token::Whitespace { .. } | Token::Comment { .. } => {
                return self.handle_in_head_mode(token);
            }
            Token::StartTag(tag)
                if matches!(
                    tag.name.as_str(),
                    "basefont" | "bgsound" | "link" | "meta" | "noframes" | "style"
                ) =>
            {
                return self.handle_in_head_mode(token);
            }

            // "A start tag whose tag name is one of: "head", "noscript""
            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::StartTag(tag) if matches!(tag.name.as_str(), "head" | "noscript") => {
                self.unexpected(&token);
            }
            Token::EndTag(tag) if tag.name != "br" => self.unexpected(&token),

            // "Anything else"
            // "Parse error."
            // "Pop the current node (which will be a noscript element) from
            // the stack of open elements; the new current node will be a head
            // element."
            // "Switch the insertion mode to "in head"."
            // "Reprocess the token."
            _ => {
                self.unexpected(&token);
                let _ = self.open_elements.pop();
                return self.reprocess_in(InsertionMode::InHead, token);
            }
        }
        Ok(Step::Done)
    }

    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    pub(in crate::parser) fn handle_after_head_mode(&mut self, token: Token) -> Flow {
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
            Token::Doctype(_) => self.unexpected(&token),

            // "A start tag whose tag name is "html""
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::StartTag(tag) if tag.name == "html" => return self.handle_in_body_mode(token),

            // "A start tag whose tag name is "body""
            // "Insert an HTML element for the token."
            // "Set the frameset-ok flag to "not ok"."
            // "Switch the insertion mode to "in body"."
            Token::StartTag(tag) if tag.name == "body" => {
                let _ = self.insert_html_element(tag);
                self.frameset_ok = false;
                self.switch_mode(InsertionMode::InBody);
            }

            // "A start tag whose tag name is "frameset""
            // "Insert an HTML element for the token."
            // "Switch the insertion mode to "in frameset"."
            Token::StartTag(tag) if tag.name == "frameset" => {
                let _ = self.insert_html_element(tag);
                self.switch_mode(InsertionMode::InFrameset);
            }

            // "A start tag whose tag name is one of: "base", "basefont",
            // "bgsound", "link", "meta", "noframes", "script", "style",
            // "template", "title""
            // "Parse error."
            // "Push the node pointed to by the head element pointer onto the
            // stack of open elements."
            // "Process the token using the rules for the "in head" insertion
            // mode."
            // "Remove the node pointed to by the head element pointer from the
            // stack of open elements. (It might not be the current node at
            // this point.)"
            Token::StartTag(tag)
                if matches!(
                    tag.name.as_str(),
                    "base"
                        | "basefont"
                        | "bgsound"
                        | "link"
                        | "meta"
                        | "noframes"
                        | "script"
                        | "style"
                        | "template"
                        | "title"
                ) =>
            {
                self.unexpected(&token);
                let Some(head) = self.head_element_pointer else {
                    return self.handle_in_head_mode(token);
                };
                self.open_elements
                    .push(OpenElement::new(head, Namespace::Html, "head"));
                let step = self.handle_in_head_mode(token)?;
                let _ = self.open_elements.remove_node(head);
                return Ok(step);
            }

            // "An end tag whose tag name is "template""
            // "Process the token using the rules for the "in head" insertion
            // mode."
            Token::EndTag(tag) if tag.name == "template" => return self.handle_in_head_mode(token),

            // "A start tag whose tag name is "head""
            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::StartTag(tag) if tag.name == "head" => self.unexpected(&token),
            Token::EndTag(tag) if !matches!(tag.name.as_str(), "body" | "html" | "br") => {
                self.unexpected(&token);
            }

            // "Anything else"
            // "Insert an HTML element for a "body" start tag token with no
            // attributes."
            // "Switch the insertion mode to "in body"."
            // "Reprocess the current token."
            _ => {
                let _ = self.insert_html_element(&Tag::named("body"));
                return self.reprocess_in(InsertionMode::InBody, token);
            }
        }
        Ok(Step::Done)
    }
}
