//! Common utilities shared by the weft parser crates.
//!
//! - **Warning System** - colored, deduplicated terminal output for
//!   recoverable conditions worth surfacing to a human (encoding restarts,
//!   coerced element names)

pub mod warning;
