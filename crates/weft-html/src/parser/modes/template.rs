//! [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)

use weft_dom::DomProvider;

use crate::error::ParseErrorCode;
use crate::parser::core::{Flow, HTMLTreeBuilder, InsertionMode, Step};
use crate::tokenizer::Token;

impl<D: DomProvider> HTMLTreeBuilder<'_, D> {
    /// Pop the current template insertion mode and push `mode` in its place,
    /// then switch to it and reprocess.
    fn retarget_template(&mut self, mode: InsertionMode, token: Token) -> Flow {
        let _ = self.template_insertion_modes.pop();
        self.template_insertion_modes.push(mode);
        self.reprocess_in(mode, token)
    }

    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    pub(in crate::parser) fn handle_in_template_mode(&mut self, token: Token) -> Flow {
        match &token {
            // "A character token"
            // "A comment token"
            // "A DOCTYPE token"
            // "Process the token using the rules for the "in body" insertion
            // mode."
            Token::Character { .. }
            | Token::Whitespace { .. }
            | Token::NullCharacter { .. }
            | Token::Comment { .. }
            | Token::Doctype(_) => self.handle_in_body_mode(token),

            Token::StartTag(tag) => match tag.name.as_str() {
                // "A start tag whose tag name is one of: "base", "basefont",
                // "bgsound", "link", "meta", "noframes", "script", "style",
                // "template", "title""
                // "Process the token using the rules for the "in head"
                // insertion mode."
                "base" | "basefont" | "bgsound" | "link" | "meta" | "noframes" | "script"
                | "style" | "template" | "title" => self.handle_in_head_mode(token),

                // "A start tag whose tag name is one of: "caption",
                // "colgroup", "tbody", "tfoot", "thead""
                // "Pop the current template insertion mode off the stack of
                // template insertion modes."
                // "Push "in table" onto the stack of template insertion modes
                // so that it is the new current template insertion mode."
                // "Switch the insertion mode to "in table", and reprocess the
                // token."
                "caption" | "colgroup" | "tbody" | "tfoot" | "thead" => {
                    self.retarget_template(InsertionMode::InTable, token)
                }

                // "A start tag whose tag name is "col""
                "col" => self.retarget_template(InsertionMode::InColumnGroup, token),

                // "A start tag whose tag name is "tr""
                "tr" => self.retarget_template(InsertionMode::InTableBody, token),

                // "A start tag whose tag name is one of: "td", "th""
                "td" | "th" => self.retarget_template(InsertionMode::InRow, token),

                // "Any other start tag"
                _ => self.retarget_template(InsertionMode::InBody, token),
            },

            // "An end tag whose tag name is "template""
            // "Process the token using the rules for the "in head" insertion
            // mode."
            Token::EndTag(tag) if tag.name == "template" => self.handle_in_head_mode(token),

            // "Any other end tag"
            // "Parse error. Ignore the token."
            Token::EndTag(_) => {
                self.unexpected(&token);
                Ok(Step::Done)
            }

            // "An end-of-file token"
            Token::EndOfFile => {
                // "If there is no template element on the stack of open
                // elements, then stop parsing. (fragment case)"
                if !self.open_elements.contains_html("template") {
                    return self.stop_parsing();
                }
                // "Otherwise, this is a parse error."
                self.parse_error(ParseErrorCode::ExpectedClosingTagButGotEof, &["template"]);
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
                // "Reprocess the token."
                Ok(Step::Reprocess(token))
            }
        }
    }
}
