//! HTML tree construction.
//!
//! [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)

/// The adoption agency algorithm for misnested formatting elements.
mod adoption;
/// Builder state, the dispatcher and the reprocess loop.
pub mod core;
/// Rules for parsing tokens in foreign content.
pub mod foreign_content;
/// The list of active formatting elements.
pub mod formatting;
/// Node creation and the appropriate place for inserting a node.
pub mod insertion;
/// The insertion modes.
mod modes;
/// Escaping of names the DOM cannot hold.
pub mod names;
/// The stack of open elements.
pub mod stack;
/// Element categories used across the insertion modes.
pub mod tag_sets;

pub use self::core::{HTMLTreeBuilder, InsertionMode};
pub use formatting::{ActiveFormattingElements, FormattingEntry};
pub use insertion::InsertionPoint;
pub use modes::quirks_mode_for;
pub use names::{coerce_name, uncoerce_name};
pub use stack::{OpenElement, OpenElementsStack, Scope};
