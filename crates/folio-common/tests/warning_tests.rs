//! Integration tests for the deduplicated warning channel.

use folio_common::warning::warn_once;

#[test]
fn test_warn_once_deduplicates_per_component() {
    assert!(warn_once("dedup-test", "unsupported value 'x'"));
    assert!(!warn_once("dedup-test", "unsupported value 'x'"));
    // Same message from a different component is a distinct warning.
    assert!(warn_once("dedup-test-other", "unsupported value 'x'"));
}
