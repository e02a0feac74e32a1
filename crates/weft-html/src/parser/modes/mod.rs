//! The insertion modes, one `impl HTMLTreeBuilder` block per group.
//!
//! [§ 13.2.6.4 The rules for parsing tokens in HTML content](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhtml)

mod after;
mod body;
mod head;
mod initial;
mod select;
mod table;
mod template;

pub use initial::quirks_mode_for;
