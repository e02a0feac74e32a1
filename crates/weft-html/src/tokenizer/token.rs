//! Tokens produced by the tokenizer.

use std::fmt;

use weft_dom::Namespace;

/// An attribute on a start or end tag token.
///
/// Per [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization):
/// "a list of attributes, each of which has a name and a value"
///
/// The namespace is always `None` out of the tokenizer; the tree builder
/// fills it in when it adjusts foreign attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// "each of which has a name"
    pub name: String,
    /// "and a value"
    pub value: String,
    /// Set for `xlink:`, `xml:` and `xmlns` attributes on foreign elements.
    pub namespace: Option<Namespace>,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub const fn new(name: String, value: String) -> Self {
        Self {
            name,
            value,
            namespace: None,
        }
    }
}

/// "Start and end tag tokens have a tag name, a self-closing flag, and a list
/// of attributes."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    /// "a tag name", always lowercased by the tokenizer.
    pub name: String,
    /// "a self-closing flag"
    pub self_closing: bool,
    /// "a list of attributes", duplicates already dropped.
    pub attributes: Vec<Attribute>,
}

impl Tag {
    /// A tag with no attributes, for tokens the tree builder synthesizes.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    /// The value of the attribute called `name`.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Whether the tag carries an attribute called `name`.
    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.iter().any(|attr| attr.name == name)
    }
}

/// "DOCTYPE tokens have a name, a public identifier, a system identifier,
/// and a force-quirks flag. When a DOCTYPE token is created, its name,
/// public identifier, and system identifier must be marked as missing
/// (which is a distinct state from the empty string), and the force-quirks
/// flag must be set to off (its other state is on)."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Doctype {
    /// "a name"
    pub name: Option<String>,
    /// "a public identifier"
    pub public_identifier: Option<String>,
    /// "a system identifier"
    pub system_identifier: Option<String>,
    /// "a force-quirks flag"
    pub force_quirks: bool,
}

/// [§ 13.2.5 Tokenization](https://html.spec.whatwg.org/multipage/parsing.html#tokenization)
///
/// "The output of the tokenization step is a series of zero or more of the
/// following tokens: DOCTYPE, start tag, end tag, comment, character,
/// end-of-file."
///
/// Character tokens come in runs. A run never mixes classes: whitespace
/// (TAB, LF, FF, SPACE), U+0000, and everything else each get their own
/// variant, which is what every insertion mode switches on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// A DOCTYPE.
    Doctype(Doctype),
    /// A start tag.
    StartTag(Tag),
    /// An end tag. Never has attributes or the self-closing flag.
    EndTag(Tag),
    /// "Comment and character tokens have data."
    Comment {
        /// "data"
        data: String,
    },
    /// A run of characters containing no whitespace and no U+0000.
    Character {
        /// "data"
        data: String,
    },
    /// A run of ASCII whitespace.
    Whitespace {
        /// "data"
        data: String,
    },
    /// A run of U+0000 characters, left for the tree builder to judge.
    NullCharacter {
        /// "data"
        data: String,
    },
    /// End-of-file token signals the end of input.
    EndOfFile,
}

/// The three character-run classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CharClass {
    Whitespace,
    Null,
    Other,
}

impl CharClass {
    pub(crate) const fn of(c: char) -> Self {
        match c {
            '\t' | '\n' | '\x0C' | ' ' => Self::Whitespace,
            '\0' => Self::Null,
            _ => Self::Other,
        }
    }
}

impl Token {
    /// A character run of the right variant for `data`'s first character.
    /// The caller guarantees `data` is a single class.
    #[must_use]
    pub(crate) fn characters(class: CharClass, data: String) -> Self {
        match class {
            CharClass::Whitespace => Self::Whitespace { data },
            CharClass::Null => Self::NullCharacter { data },
            CharClass::Other => Self::Character { data },
        }
    }

    /// Returns true if this is an end-of-file token.
    #[must_use]
    pub const fn is_eof(&self) -> bool {
        matches!(self, Self::EndOfFile)
    }

    /// Returns true for start tags named `name`.
    #[must_use]
    pub fn is_start_tag(&self, name: &str) -> bool {
        matches!(self, Self::StartTag(tag) if tag.name == name)
    }

    /// Returns true for end tags named `name`.
    #[must_use]
    pub fn is_end_tag(&self, name: &str) -> bool {
        matches!(self, Self::EndTag(tag) if tag.name == name)
    }

    /// The character data of any character-run token.
    #[must_use]
    pub fn character_data(&self) -> Option<&str> {
        match self {
            Self::Character { data } | Self::Whitespace { data } | Self::NullCharacter { data } => {
                Some(data)
            }
            _ => None,
        }
    }

    /// Append `extra` if it is the same kind of character run.
    /// Returns the rejected token otherwise.
    pub(crate) fn try_merge(&mut self, extra: Self) -> Result<(), Self> {
        match (self, extra) {
            (Self::Character { data }, Self::Character { data: more })
            | (Self::Whitespace { data }, Self::Whitespace { data: more })
            | (Self::NullCharacter { data }, Self::NullCharacter { data: more }) => {
                data.push_str(&more);
                Ok(())
            }
            (_, other) => Err(other),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Doctype(doctype) => {
                write!(f, "DOCTYPE")?;
                if let Some(n) = &doctype.name {
                    write!(f, " {n}")?;
                }
                if let Some(pub_id) = &doctype.public_identifier {
                    write!(f, " PUBLIC \"{pub_id}\"")?;
                }
                if let Some(sys_id) = &doctype.system_identifier {
                    write!(f, " SYSTEM \"{sys_id}\"")?;
                }
                if doctype.force_quirks {
                    write!(f, " (force-quirks)")?;
                }
                Ok(())
            }
            Self::StartTag(tag) => {
                write!(f, "<{}", tag.name)?;
                for attr in &tag.attributes {
                    write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                }
                if tag.self_closing {
                    write!(f, " /")?;
                }
                write!(f, ">")
            }
            Self::EndTag(tag) => write!(f, "</{}>", tag.name),
            Self::Comment { data } => write!(f, "<!--{data}-->"),
            Self::Character { data } => write!(f, "Character({data:?})"),
            Self::Whitespace { data } => write!(f, "Whitespace({data:?})"),
            Self::NullCharacter { data } => write!(f, "Null({})", data.chars().count()),
            Self::EndOfFile => write!(f, "EOF"),
        }
    }
}
