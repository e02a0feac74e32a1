//! Parser options.
//!
//! Options deserialize from camelCase JSON with every field optional:
//!
//! ```json
//! { "scripting": true, "encodingPrescanBytes": 512 }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ParseFailure;

/// Tunables for a single parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase", deny_unknown_fields)]
pub struct ParserOptions {
    /// How many leading bytes the `<meta>` prescan may look at.
    pub encoding_prescan_bytes: usize,
    /// Encoding label used when nothing else determines one.
    pub encoding_fallback: String,
    /// [§ 13.2.1](https://html.spec.whatwg.org/multipage/parsing.html#scripting-flag)
    ///
    /// "The scripting flag is set to "enabled" if scripting was enabled for
    /// the Document with which the parser is associated when the parser was
    /// created, and "disabled" otherwise."
    pub scripting: bool,
    /// Upper bound on how often one token may be reprocessed before the tree
    /// builder declares a bug.
    pub max_reprocess: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            encoding_prescan_bytes: 1024,
            encoding_fallback: "windows-1252".to_string(),
            scripting: false,
            max_reprocess: 64,
        }
    }
}

impl ParserOptions {
    /// Check the options before a parse starts.
    ///
    /// # Errors
    /// [`ParseFailure::InvalidConfig`] for an unknown fallback label, a zero
    /// prescan window, or a reprocess bound too small to finish any document.
    pub fn validate(&self) -> Result<(), ParseFailure> {
        if encoding_rs::Encoding::for_label(self.encoding_fallback.trim().as_bytes()).is_none() {
            return Err(ParseFailure::InvalidConfig(format!(
                "unknown fallback encoding {:?}",
                self.encoding_fallback
            )));
        }
        if self.encoding_prescan_bytes == 0 {
            return Err(ParseFailure::InvalidConfig(
                "encodingPrescanBytes must be positive".to_string(),
            ));
        }
        if self.max_reprocess < 8 {
            return Err(ParseFailure::InvalidConfig(format!(
                "maxReprocess must be at least 8, got {}",
                self.max_reprocess
            )));
        }
        Ok(())
    }

    /// The fallback encoding, defaulting to windows-1252 for labels that do
    /// not resolve.
    #[must_use]
    pub fn fallback_encoding(&self) -> &'static encoding_rs::Encoding {
        encoding_rs::Encoding::for_label(self.encoding_fallback.trim().as_bytes())
            .unwrap_or(encoding_rs::WINDOWS_1252)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let options = ParserOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.fallback_encoding(), encoding_rs::WINDOWS_1252);
    }

    #[test]
    fn unknown_fallback_is_rejected() {
        let options = ParserOptions {
            encoding_fallback: "klingon".to_string(),
            ..ParserOptions::default()
        };
        assert!(matches!(
            options.validate(),
            Err(ParseFailure::InvalidConfig(_))
        ));
    }

    #[test]
    fn tiny_reprocess_bound_is_rejected() {
        let options = ParserOptions {
            max_reprocess: 2,
            ..ParserOptions::default()
        };
        assert!(options.validate().is_err());
    }
}
