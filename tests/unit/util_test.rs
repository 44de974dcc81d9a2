//! Tests for utility functions

use prometheus_task_core::util::{init_tracing, DEFAULT_LOG_FILTER};

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
    assert!(tracing::dispatcher::has_been_set());
}

#[test]
fn test_default_filter_targets_this_crate() {
    assert!(DEFAULT_LOG_FILTER.starts_with("prometheus_task_core"));
}
