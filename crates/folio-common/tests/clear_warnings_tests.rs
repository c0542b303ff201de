//! Integration test for resetting the warning registry.
//!
//! Lives in its own test binary because clearing is process-wide.

use folio_common::warning::{clear_warnings, warn_once};

#[test]
fn test_clear_warnings_allows_reemission() {
    assert!(warn_once("clear-test", "float keyword 'middle'"));
    assert!(!warn_once("clear-test", "float keyword 'middle'"));
    clear_warnings();
    assert!(warn_once("clear-test", "float keyword 'middle'"));
}
