//! Namespaces and document modes.

use strum_macros::{Display, EnumString, IntoStaticStr};

/// [§ 2.9 Namespaces](https://infra.spec.whatwg.org/#namespaces)
///
/// The six namespaces an HTML parser can place elements or attributes in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum Namespace {
    /// "The HTML namespace is `http://www.w3.org/1999/xhtml`."
    Html,
    /// "The MathML namespace is `http://www.w3.org/1998/Math/MathML`."
    #[strum(serialize = "math")]
    MathMl,
    /// "The SVG namespace is `http://www.w3.org/2000/svg`."
    Svg,
    /// "The XLink namespace is `http://www.w3.org/1999/xlink`."
    XLink,
    /// "The XML namespace is `http://www.w3.org/XML/1998/namespace`."
    Xml,
    /// "The XMLNS namespace is `http://www.w3.org/2000/xmlns/`."
    Xmlns,
}

impl Namespace {
    /// The namespace URL.
    #[must_use]
    pub const fn url(self) -> &'static str {
        match self {
            Self::Html => "http://www.w3.org/1999/xhtml",
            Self::MathMl => "http://www.w3.org/1998/Math/MathML",
            Self::Svg => "http://www.w3.org/2000/svg",
            Self::XLink => "http://www.w3.org/1999/xlink",
            Self::Xml => "http://www.w3.org/XML/1998/namespace",
            Self::Xmlns => "http://www.w3.org/2000/xmlns/",
        }
    }

    /// Look a namespace up by its URL.
    #[must_use]
    pub fn from_url(url: &str) -> Option<Self> {
        [
            Self::Html,
            Self::MathMl,
            Self::Svg,
            Self::XLink,
            Self::Xml,
            Self::Xmlns,
        ]
        .into_iter()
        .find(|ns| ns.url() == url)
    }
}

/// [§ 4.5 Interface Document](https://dom.spec.whatwg.org/#concept-document-mode)
///
/// "Each document has an associated mode ("no-quirks", "quirks", or
/// "limited-quirks")."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum QuirksMode {
    /// "no-quirks"
    #[default]
    NoQuirks,
    /// "limited-quirks"
    LimitedQuirks,
    /// "quirks"
    Quirks,
}
