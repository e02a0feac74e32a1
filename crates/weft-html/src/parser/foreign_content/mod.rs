//! Foreign content parsing support for SVG and MathML.
//!
//! [§ 13.2.6.3 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)
//! [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)

pub mod mathml;
pub mod svg;

pub use mathml::adjust_mathml_attributes;
pub use svg::{adjust_svg_attributes, adjust_svg_tag_name};

use weft_dom::{DomProvider, Namespace};

use super::core::{Flow, HTMLTreeBuilder, Step};
use crate::error::ParseErrorCode;
use crate::tokenizer::{Attribute, Tag, Token};

/// [§ 13.2.6.3 Adjust foreign attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes)
///
/// "When the steps below require the user agent to adjust foreign attributes
/// for a token, then, if any of the attributes on the token match the strings
/// in the first column of the following table, let the attribute be a
/// namespaced attribute, with the prefix being the string in the second
/// column, the local name being the string in the third column, and the
/// namespace being the namespace in the fourth column."
///
/// The qualified name is kept as written; only the namespace is attached.
const FOREIGN_ATTRIBUTE_ADJUSTMENTS: &[(&str, Namespace)] = &[
    ("xlink:actuate", Namespace::XLink),
    ("xlink:arcrole", Namespace::XLink),
    ("xlink:href", Namespace::XLink),
    ("xlink:role", Namespace::XLink),
    ("xlink:show", Namespace::XLink),
    ("xlink:title", Namespace::XLink),
    ("xlink:type", Namespace::XLink),
    ("xml:lang", Namespace::Xml),
    ("xml:space", Namespace::Xml),
    ("xmlns", Namespace::Xmlns),
    ("xmlns:xlink", Namespace::Xmlns),
];

/// [§ 13.2.6.3 Adjust foreign attributes](https://html.spec.whatwg.org/multipage/parsing.html#adjust-foreign-attributes)
pub fn adjust_foreign_attributes(attributes: &mut [Attribute]) {
    for attr in attributes {
        if let Some(&(_, namespace)) = FOREIGN_ATTRIBUTE_ADJUSTMENTS
            .iter()
            .find(|(name, _)| *name == attr.name)
        {
            attr.namespace = Some(namespace);
        }
    }
}

/// "A start tag whose tag name is one of: "b", "big", "blockquote", "body",
/// "br", "center", "code", "dd", "div", "dl", "dt", "em", "embed", "h1", "h2",
/// "h3", "h4", "h5", "h6", "head", "hr", "i", "img", "li", "listing", "menu",
/// "meta", "nobr", "ol", "p", "pre", "ruby", "s", "small", "span", "strong",
/// "strike", "sub", "sup", "table", "tt", "u", "ul", "var"; A start tag whose
/// tag name is "font", if the token has any attributes named "color", "face",
/// or "size"; An end tag whose tag name is "br", "p""
fn breaks_out_of_foreign_content(token: &Token) -> bool {
    match token {
        Token::StartTag(tag) => {
            matches!(
                tag.name.as_str(),
                "b" | "big"
                    | "blockquote"
                    | "body"
                    | "br"
                    | "center"
                    | "code"
                    | "dd"
                    | "div"
                    | "dl"
                    | "dt"
                    | "em"
                    | "embed"
                    | "h1"
                    | "h2"
                    | "h3"
                    | "h4"
                    | "h5"
                    | "h6"
                    | "head"
                    | "hr"
                    | "i"
                    | "img"
                    | "li"
                    | "listing"
                    | "menu"
                    | "meta"
                    | "nobr"
                    | "ol"
                    | "p"
                    | "pre"
                    | "ruby"
                    | "s"
                    | "small"
                    | "span"
                    | "strong"
                    | "strike"
                    | "sub"
                    | "sup"
                    | "table"
                    | "tt"
                    | "u"
                    | "ul"
                    | "var"
            ) || (tag.name == "font"
                && ["color", "face", "size"]
                    .iter()
                    .any(|name| tag.has_attribute(name)))
        }
        Token::EndTag(tag) => matches!(tag.name.as_str(), "br" | "p"),
        _ => false,
    }
}

impl<D: DomProvider> HTMLTreeBuilder<'_, D> {
    /// Insert a start tag as an SVG or MathML element, with every name
    /// adjustment the namespace calls for. Used both from "in body" (for
    /// `<svg>` and `<math>`) and from foreign content.
    pub(super) fn insert_foreign_start_tag(&mut self, mut tag: Tag, namespace: Namespace) {
        match namespace {
            // "If the adjusted current node is an element in the MathML
            // namespace, adjust MathML attributes for the token."
            Namespace::MathMl => adjust_mathml_attributes(&mut tag.attributes),
            // "If the adjusted current node is an element in the SVG
            // namespace, and the token's tag name is one of the ones in the
            // first column of the following table, change the tag name to the
            // name given in the corresponding cell in the second column."
            // "If the adjusted current node is an element in the SVG
            // namespace, adjust SVG attributes for the token."
            Namespace::Svg => {
                adjust_svg_tag_name(&mut tag);
                adjust_svg_attributes(&mut tag.attributes);
            }
            _ => {}
        }
        // "Adjust foreign attributes for the token."
        adjust_foreign_attributes(&mut tag.attributes);

        // "Insert a foreign element for the token, with adjusted current
        // node's namespace and false."
        let _ = self.insert_foreign_element(&tag, namespace);

        // "If the token has its self-closing flag set, then run the
        // appropriate steps from the following list: If the token's tag name
        // is "script", and the new current node is in the SVG namespace:
        // Acknowledge the token's self-closing flag, and then act as
        // described in the steps for a "script" end tag below. Otherwise: Pop
        // the current node off the stack of open elements and acknowledge the
        // token's self-closing flag."
        if tag.self_closing {
            let _ = self.open_elements.pop();
            self.acknowledge_self_closing();
        }
    }

    /// [§ 13.2.6.5 The rules for parsing tokens in foreign content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inforeign)
    pub(super) fn process_using_foreign_content_rules(&mut self, token: Token) -> Flow {
        if breaks_out_of_foreign_content(&token) {
            return self.break_out_of_foreign_content(token);
        }

        match token {
            // "A character token that is U+0000 NULL"
            // "Parse error. Insert a U+FFFD REPLACEMENT CHARACTER character."
            Token::NullCharacter { data } => {
                let replacement = "\u{FFFD}".repeat(data.chars().count());
                self.insert_characters(&replacement);
            }

            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Insert the token's character."
            Token::Whitespace { data } => self.insert_characters(&data),

            // "Any other character token"
            // "Insert the token's character. Set the frameset-ok flag to "not
            // ok"."
            Token::Character { data } => {
                self.insert_characters(&data);
                self.frameset_ok = false;
            }

            // "A comment token"
            // "Insert a comment."
            Token::Comment { data } => self.insert_comment(&data),

            // "A DOCTYPE token"
            // "Parse error. Ignore the token."
            Token::Doctype(_) => self.parse_error(ParseErrorCode::UnexpectedDoctype, &[]),

            // "Any other start tag"
            Token::StartTag(tag) => {
                let namespace = self
                    .adjusted_current_node()
                    .map_or(Namespace::Html, |node| node.namespace);
                self.insert_foreign_start_tag(tag, namespace);
            }

            // "An end tag whose tag name is "script", if the current node is
            // an SVG script element"
            // "Pop the current node off the stack of open elements."
            Token::EndTag(tag)
                if tag.name == "script"
                    && self
                        .open_elements
                        .current()
                        .is_some_and(|e| e.namespace == Namespace::Svg && e.name == "script") =>
            {
                let _ = self.open_elements.pop();
            }

            // "Any other end tag"
            Token::EndTag(tag) => return self.foreign_content_end_tag(tag),

            Token::EndOfFile => unreachable!("end of file always uses the HTML content rules"),
        }
        Ok(Step::Done)
    }

    /// The breakout entries: "Parse error. While the current node is not a
    /// MathML text integration point, an HTML integration point, or an
    /// element in the HTML namespace, pop elements from the stack of open
    /// elements. Reprocess the token according to the rules given in the
    /// section corresponding to the current insertion mode in HTML content."
    fn break_out_of_foreign_content(&mut self, token: Token) -> Flow {
        let name = match &token {
            Token::StartTag(tag) | Token::EndTag(tag) => tag.name.clone(),
            _ => String::new(),
        };
        self.parse_error(ParseErrorCode::UnexpectedHtmlElementInForeignContent, &[&name]);
        while self.open_elements.current().is_some_and(|node| {
            !(node.is_mathml_text_integration_point()
                || node.is_html_integration_point()
                || node.namespace == Namespace::Html)
        }) {
            let _ = self.open_elements.pop();
        }
        self.process_using_rules_for(self.insertion_mode, token)
    }

    /// "Any other end tag" in foreign content.
    fn foreign_content_end_tag(&mut self, tag: Tag) -> Flow {
        let Some(mut index) = self.open_elements.len().checked_sub(1) else {
            return Ok(Step::Done);
        };

        // STEP 1: "Initialize node to be the current node (the bottommost
        // node of the stack)."
        // STEP 2: "If node's tag name, converted to ASCII lowercase, is not
        // the same as the tag name of the token, then this is a parse error."
        if self
            .open_elements
            .get(index)
            .is_some_and(|node| !node.name.eq_ignore_ascii_case(&tag.name))
        {
            self.parse_error(ParseErrorCode::UnexpectedEndTagInForeignContent, &[&tag.name]);
        }

        loop {
            // STEP 3: "Loop: If node is the topmost element in the stack of
            // open elements, then return. (fragment case)"
            if index == 0 {
                return Ok(Step::Done);
            }

            // STEP 4: "If node's tag name, converted to ASCII lowercase, is
            // the same as the tag name of the token, pop elements from the
            // stack of open elements until node has been popped from the
            // stack, and then return."
            if self
                .open_elements
                .get(index)
                .is_some_and(|node| node.name.eq_ignore_ascii_case(&tag.name))
            {
                self.open_elements.truncate(index);
                return Ok(Step::Done);
            }

            // STEP 5: "Set node to the previous entry in the stack of open
            // elements."
            index -= 1;

            // STEP 6: "If node is not an element in the HTML namespace, return
            // to the step labeled loop."
            if self
                .open_elements
                .get(index)
                .is_some_and(|node| node.namespace != Namespace::Html)
            {
                continue;
            }

            // STEP 7: "Otherwise, process the token according to the rules
            // given in the section corresponding to the current insertion mode
            // in HTML content."
            return self.process_using_rules_for(self.insertion_mode, Token::EndTag(tag));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xlink_attributes_get_a_namespace() {
        let mut attrs = vec![
            Attribute::new("xlink:href".to_string(), "#a".to_string()),
            Attribute::new("xmlns".to_string(), "http://www.w3.org/2000/svg".to_string()),
            Attribute::new("href".to_string(), "#b".to_string()),
        ];
        adjust_foreign_attributes(&mut attrs);
        assert_eq!(attrs[0].namespace, Some(Namespace::XLink));
        assert_eq!(attrs[0].name, "xlink:href");
        assert_eq!(attrs[1].namespace, Some(Namespace::Xmlns));
        assert_eq!(attrs[2].namespace, None);
    }

    #[test]
    fn font_breaks_out_only_with_presentational_attributes() {
        let mut font = Tag::named("font");
        assert!(!breaks_out_of_foreign_content(&Token::StartTag(font.clone())));
        font.attributes
            .push(Attribute::new("color".to_string(), "red".to_string()));
        assert!(breaks_out_of_foreign_content(&Token::StartTag(font)));
        assert!(breaks_out_of_foreign_content(&Token::EndTag(Tag::named("p"))));
        assert!(!breaks_out_of_foreign_content(&Token::EndTag(Tag::named("b"))));
    }
}
