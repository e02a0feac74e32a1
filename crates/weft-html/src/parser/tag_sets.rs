//! Element categories the tree construction rules switch on.

use weft_dom::Namespace;

/// [§ 13.2.4.3 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#special)
///
/// "The following elements have varying levels of special parsing rules: ..."
#[must_use]
pub fn is_special(namespace: Namespace, name: &str) -> bool {
    match namespace {
        Namespace::Html => matches!(
            name,
            "address"
                | "applet"
                | "area"
                | "article"
                | "aside"
                | "base"
                | "basefont"
                | "bgsound"
                | "blockquote"
                | "body"
                | "br"
                | "button"
                | "caption"
                | "center"
                | "col"
                | "colgroup"
                | "dd"
                | "details"
                | "dir"
                | "div"
                | "dl"
                | "dt"
                | "embed"
                | "fieldset"
                | "figcaption"
                | "figure"
                | "footer"
                | "form"
                | "frame"
                | "frameset"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "head"
                | "header"
                | "hgroup"
                | "hr"
                | "html"
                | "iframe"
                | "img"
                | "input"
                | "keygen"
                | "li"
                | "link"
                | "listing"
                | "main"
                | "marquee"
                | "menu"
                | "meta"
                | "nav"
                | "noembed"
                | "noframes"
                | "noscript"
                | "object"
                | "ol"
                | "p"
                | "param"
                | "plaintext"
                | "pre"
                | "script"
                | "search"
                | "section"
                | "select"
                | "source"
                | "style"
                | "summary"
                | "table"
                | "tbody"
                | "td"
                | "template"
                | "textarea"
                | "tfoot"
                | "th"
                | "thead"
                | "title"
                | "tr"
                | "track"
                | "ul"
                | "wbr"
                | "xmp"
        ),
        Namespace::MathMl => {
            matches!(name, "mi" | "mo" | "mn" | "ms" | "mtext" | "annotation-xml")
        }
        Namespace::Svg => matches!(name, "foreignObject" | "desc" | "title"),
        _ => false,
    }
}

/// "The following HTML elements are those that end up in the list of active
/// formatting elements: a, b, big, code, em, font, i, nobr, s, small, strike,
/// strong, tt, and u."
#[must_use]
pub fn is_formatting(name: &str) -> bool {
    matches!(
        name,
        "a" | "b"
            | "big"
            | "code"
            | "em"
            | "font"
            | "i"
            | "nobr"
            | "s"
            | "small"
            | "strike"
            | "strong"
            | "tt"
            | "u"
    )
}

/// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
///
/// "while the current node is a dd element, a dt element, an li element, an
/// optgroup element, an option element, a p element, an rb element, an rp
/// element, an rt element, or an rtc element, ..."
#[must_use]
pub fn has_implied_end_tag(name: &str) -> bool {
    matches!(
        name,
        "dd" | "dt" | "li" | "optgroup" | "option" | "p" | "rb" | "rp" | "rt" | "rtc"
    )
}

/// The thorough variant adds the table parts.
#[must_use]
pub fn has_implied_end_tag_thoroughly(name: &str) -> bool {
    has_implied_end_tag(name)
        || matches!(
            name,
            "caption" | "colgroup" | "tbody" | "td" | "tfoot" | "th" | "thead" | "tr"
        )
}

/// `h1` through `h6`.
#[must_use]
pub fn is_heading(name: &str) -> bool {
    matches!(name, "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

/// Elements that may still be open at end of file or at `</body>` without a
/// parse error.
#[must_use]
pub fn may_be_left_open(name: &str) -> bool {
    matches!(
        name,
        "dd" | "dt"
            | "li"
            | "optgroup"
            | "option"
            | "p"
            | "rb"
            | "rp"
            | "rt"
            | "rtc"
            | "tbody"
            | "td"
            | "tfoot"
            | "th"
            | "thead"
            | "tr"
            | "body"
            | "html"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn special_depends_on_namespace() {
        assert!(is_special(Namespace::Html, "p"));
        assert!(!is_special(Namespace::Svg, "p"));
        assert!(is_special(Namespace::Svg, "foreignObject"));
        assert!(is_special(Namespace::MathMl, "annotation-xml"));
        assert!(!is_special(Namespace::Html, "span"));
    }

    #[test]
    fn thorough_end_tags_include_table_parts() {
        assert!(!has_implied_end_tag("td"));
        assert!(has_implied_end_tag_thoroughly("td"));
        assert!(has_implied_end_tag_thoroughly("p"));
    }
}
