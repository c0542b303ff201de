//! Deduplicated warnings for unsupported input.
//!
//! Layout passes run over every node of every page, so the same unsupported
//! value is usually met many times per render. Each distinct message is
//! forwarded to `tracing` once per process (or once per render when the host
//! calls [`clear_warnings`] between documents).

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Global set of warnings we've already emitted (to deduplicate)
static WARNED: Mutex<Option<HashSet<String>>> = Mutex::new(None);

/// Warn about an unsupported feature (emitted once per unique message).
///
/// Returns `true` when this call emitted the warning and `false` when the
/// same `component`/`message` pair was already reported.
///
/// # Example
/// ```
/// use folio_common::warning::warn_once;
///
/// let first = warn_once("style", "unknown float keyword 'middle'");
/// let second = warn_once("style", "unknown float keyword 'middle'");
/// assert!(first);
/// assert!(!second);
/// ```
pub fn warn_once(component: &str, message: &str) -> bool {
    let key = format!("[{component}] {message}");
    let should_emit = WARNED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .get_or_insert_with(HashSet::new)
        .insert(key);

    if should_emit {
        tracing::warn!(target: "folio", component, "{message}");
    }
    should_emit
}

/// Clear all recorded warnings (call when starting a new document)
pub fn clear_warnings() {
    let mut guard = WARNED.lock().unwrap_or_else(PoisonError::into_inner);
    if let Some(set) = guard.as_mut() {
        set.clear();
    }
}
