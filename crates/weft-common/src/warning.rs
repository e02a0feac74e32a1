//! Parser warnings with colored terminal output.
//!
//! Warnings are deduplicated so a document with thousands of mangled names
//! produces one line per distinct message, not one per occurrence.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

use owo_colors::OwoColorize;

/// Global set of warnings we've already printed (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about a recoverable condition (prints once per unique message).
///
/// Returns `true` when the message was printed, `false` when it had already
/// been seen since the last [`clear_warnings`].
///
/// # Example
/// ```
/// use weft_common::warning::warn_once;
///
/// let first = warn_once("encoding", "restarting parse as windows-1251");
/// let second = warn_once("encoding", "restarting parse as windows-1251");
/// assert!(first || !second);
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_print = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_print {
        eprintln!("{}", format!("[weft {component}] warning: {message}").yellow());
    }
    should_print
}

/// Clear all recorded warnings (call before parsing an unrelated document).
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_messages_print_once() {
        let message = "duplicate-message-unit-test";
        let _ = warn_once("test", message);
        assert!(!warn_once("test", message));
        assert!(warn_once("other", message));
    }
}
