//! [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)

use weft_dom::{DomProvider, QuirksMode};

use crate::error::ParseErrorCode;
use crate::parser::core::{Flow, HTMLTreeBuilder, InsertionMode, Step};
use crate::tokenizer::{Doctype, Token};

/// "The public identifier starts with:" any of these, compared ASCII
/// case-insensitively, puts the document in quirks mode.
const QUIRKY_PUBLIC_PREFIXES: &[&str] = &[
    "+//silmaril//dtd html pro v0r11 19970101//",
    "-//as//dtd html 3.0 aswedit + extensions//",
    "-//advasoft ltd//dtd html 3.0 aswedit + extensions//",
    "-//ietf//dtd html 2.0 level 1//",
    "-//ietf//dtd html 2.0 level 2//",
    "-//ietf//dtd html 2.0 strict level 1//",
    "-//ietf//dtd html 2.0 strict level 2//",
    "-//ietf//dtd html 2.0 strict//",
    "-//ietf//dtd html 2.0//",
    "-//ietf//dtd html 2.1e//",
    "-//ietf//dtd html 3.0//",
    "-//ietf//dtd html 3.2 final//",
    "-//ietf//dtd html 3.2//",
    "-//ietf//dtd html 3//",
    "-//ietf//dtd html level 0//",
    "-//ietf//dtd html level 1//",
    "-//ietf//dtd html level 2//",
    "-//ietf//dtd html level 3//",
    "-//ietf//dtd html strict level 0//",
    "-//ietf//dtd html strict level 1//",
    "-//ietf//dtd html strict level 2//",
    "-//ietf//dtd html strict level 3//",
    "-//ietf//dtd html strict//",
    "-//ietf//dtd html//",
    "-//metrius//dtd metrius presentational//",
    "-//microsoft//dtd internet explorer 2.0 html strict//",
    "-//microsoft//dtd internet explorer 2.0 html//",
    "-//microsoft//dtd internet explorer 2.0 tables//",
    "-//microsoft//dtd internet explorer 3.0 html strict//",
    "-//microsoft//dtd internet explorer 3.0 html//",
    "-//microsoft//dtd internet explorer 3.0 tables//",
    "-//netscape comm. corp.//dtd html//",
    "-//netscape comm. corp.//dtd strict html//",
    "-//o'reilly and associates//dtd html 2.0//",
    "-//o'reilly and associates//dtd html extended 1.0//",
    "-//o'reilly and associates//dtd html extended relaxed 1.0//",
    "-//sq//dtd html 2.0 hotmetal + extensions//",
    "-//softquad software//dtd hotmetal pro 6.0::19990601::extensions to html 4.0//",
    "-//softquad//dtd hotmetal pro 4.0::19971010::extensions to html 4.0//",
    "-//spyglass//dtd html 2.0 extended//",
    "-//sun microsystems corp.//dtd hotjava html//",
    "-//sun microsystems corp.//dtd hotjava strict html//",
    "-//w3c//dtd html 3 1995-03-24//",
    "-//w3c//dtd html 3.2 draft//",
    "-//w3c//dtd html 3.2 final//",
    "-//w3c//dtd html 3.2//",
    "-//w3c//dtd html 3.2s draft//",
    "-//w3c//dtd html 4.0 frameset//",
    "-//w3c//dtd html 4.0 transitional//",
    "-//w3c//dtd html experimental 19960712//",
    "-//w3c//dtd html experimental 970421//",
    "-//w3c//dtd w3 html//",
    "-//w3o//dtd w3 html 3.0//",
    "-//webtechs//dtd mozilla html 2.0//",
    "-//webtechs//dtd mozilla html//",
];

/// "The public identifier is set to:" one of these.
const QUIRKY_PUBLIC_IDENTIFIERS: &[&str] = &[
    "-//w3o//dtd w3 html strict 3.0//en//",
    "-/w3c/dtd html 4.0 transitional/en",
    "html",
];

/// "The system identifier is set to:"
const QUIRKY_SYSTEM_IDENTIFIER: &str =
    "http://www.ibm.com/data/dtd/v11/ibmxhtml1-transitional.dtd";

/// Quirks when the system identifier is missing, limited quirks when present.
const HTML_401_PREFIXES: &[&str] = &[
    "-//w3c//dtd html 4.01 frameset//",
    "-//w3c//dtd html 4.01 transitional//",
];

/// Always limited quirks.
const LIMITED_QUIRKS_PREFIXES: &[&str] = &[
    "-//w3c//dtd xhtml 1.0 frameset//",
    "-//w3c//dtd xhtml 1.0 transitional//",
];

fn starts_with_any(value: &str, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| {
        value
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
    })
}

/// Work out the document mode a DOCTYPE token asks for.
#[must_use]
pub fn quirks_mode_for(doctype: &Doctype) -> QuirksMode {
    let public = doctype.public_identifier.as_deref();
    let system = doctype.system_identifier.as_deref();

    // "The force-quirks flag is set to on. The name is not "html". ..."
    let quirks = doctype.force_quirks
        || doctype.name.as_deref() != Some("html")
        || public.is_some_and(|id| {
            QUIRKY_PUBLIC_IDENTIFIERS
                .iter()
                .any(|exact| id.eq_ignore_ascii_case(exact))
                || starts_with_any(id, QUIRKY_PUBLIC_PREFIXES)
                || (system.is_none() && starts_with_any(id, HTML_401_PREFIXES))
        })
        || system.is_some_and(|id| id.eq_ignore_ascii_case(QUIRKY_SYSTEM_IDENTIFIER));
    if quirks {
        return QuirksMode::Quirks;
    }

    // "Otherwise, if the document is not an iframe srcdoc document, and the
    // parser cannot change the mode flag is false, and the DOCTYPE token
    // matches one of the conditions in the following list, then then set the
    // Document to limited-quirks mode"
    let limited = public.is_some_and(|id| {
        starts_with_any(id, LIMITED_QUIRKS_PREFIXES)
            || (system.is_some() && starts_with_any(id, HTML_401_PREFIXES))
    });
    if limited {
        QuirksMode::LimitedQuirks
    } else {
        QuirksMode::NoQuirks
    }
}

impl<D: DomProvider> HTMLTreeBuilder<'_, D> {
    fn set_document_mode(&mut self, mode: QuirksMode) {
        self.quirks_mode = mode;
        self.dom.set_quirks_mode(mode);
    }

    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    pub(in crate::parser) fn handle_initial_mode(&mut self, token: Token) -> Flow {
        match &token {
            // "A character token that is one of U+0009 CHARACTER TABULATION,
            // U+000A LINE FEED (LF), U+000C FORM FEED (FF), U+000D CARRIAGE
            // RETURN (CR), or U+0020 SPACE"
            // "Ignore the token."
            Token::Whitespace { .. } => Ok(Step::Done),

            // "A comment token"
            // "Insert a comment as the last child of the Document object."
            Token::Comment { data } => {
                let document = self.dom.document();
                self.insert_comment_into(data, document);
                Ok(Step::Done)
            }

            // "A DOCTYPE token"
            Token::Doctype(doctype) => {
                // "If the DOCTYPE token's name is not "html", or the token's
                // public identifier is not missing, or the token's system
                // identifier is neither missing nor "about:legacy-compat",
                // then there is a parse error."
                if doctype.name.as_deref() != Some("html")
                    || doctype.public_identifier.is_some()
                    || doctype
                        .system_identifier
                        .as_deref()
                        .is_some_and(|id| id != "about:legacy-compat")
                {
                    self.parse_error(ParseErrorCode::UnknownDoctype, &[]);
                }

                // "Append a DocumentType node to the Document node, with its
                // name set to the name given in the DOCTYPE token, or the
                // empty string if the name was missing; its public ID set to
                // the public identifier given in the DOCTYPE token, or the
                // empty string if the public identifier was missing; and its
                // system ID set to the system identifier given in the DOCTYPE
                // token, or the empty string if the system identifier was
                // missing."
                let node = self.dom.create_doctype(
                    doctype.name.as_deref().unwrap_or_default(),
                    doctype.public_identifier.as_deref().unwrap_or_default(),
                    doctype.system_identifier.as_deref().unwrap_or_default(),
                );
                let document = self.dom.document();
                self.dom.append_child(document, node);

                let mode = quirks_mode_for(doctype);
                self.set_document_mode(mode);

                // "Then, switch the insertion mode to "before html"."
                self.switch_mode(InsertionMode::BeforeHtml);
                Ok(Step::Done)
            }

            // "Anything else"
            // "If the document is not an iframe srcdoc document, then this is
            // a parse error; if the parser cannot change the mode flag is
            // false, set the Document to quirks mode."
            // "In any case, switch the insertion mode to "before html", then
            // reprocess the token."
            _ => {
                match &token {
                    Token::StartTag(tag) => {
                        self.parse_error(ParseErrorCode::ExpectedDoctypeButGotStartTag, &[&tag.name]);
                    }
                    Token::EndTag(tag) => {
                        self.parse_error(ParseErrorCode::ExpectedDoctypeButGotEndTag, &[&tag.name]);
                    }
                    _ => self.parse_error(ParseErrorCode::ExpectedDoctypeButGotOther, &[]),
                }
                self.set_document_mode(QuirksMode::Quirks);
                self.reprocess_in(InsertionMode::BeforeHtml, token)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doctype(public: Option<&str>, system: Option<&str>) -> Doctype {
        Doctype {
            name: Some("html".to_string()),
            public_identifier: public.map(str::to_string),
            system_identifier: system.map(str::to_string),
            force_quirks: false,
        }
    }

    #[test]
    fn html5_doctype_is_no_quirks() {
        assert_eq!(quirks_mode_for(&doctype(None, None)), QuirksMode::NoQuirks);
    }

    #[test]
    fn html401_transitional_depends_on_system_identifier() {
        let public = Some("-//W3C//DTD HTML 4.01 Transitional//EN");
        assert_eq!(quirks_mode_for(&doctype(public, None)), QuirksMode::Quirks);
        assert_eq!(
            quirks_mode_for(&doctype(public, Some("http://www.w3.org/TR/html4/loose.dtd"))),
            QuirksMode::LimitedQuirks
        );
    }

    #[test]
    fn xhtml_transitional_is_limited_quirks() {
        let public = Some("-//W3C//DTD XHTML 1.0 Transitional//EN");
        assert_eq!(quirks_mode_for(&doctype(public, None)), QuirksMode::LimitedQuirks);
    }

    #[test]
    fn force_quirks_and_odd_names_are_quirks() {
        let mut forced = doctype(None, None);
        forced.force_quirks = true;
        assert_eq!(quirks_mode_for(&forced), QuirksMode::Quirks);

        let mut named = doctype(None, None);
        named.name = Some("svg".to_string());
        assert_eq!(quirks_mode_for(&named), QuirksMode::Quirks);
    }

    #[test]
    fn legacy_public_identifiers_match_case_insensitively() {
        assert_eq!(
            quirks_mode_for(&doctype(Some("-//IETF//DTD HTML 2.0//EN"), None)),
            QuirksMode::Quirks
        );
        assert_eq!(quirks_mode_for(&doctype(Some("HTML"), None)), QuirksMode::Quirks);
    }
}
