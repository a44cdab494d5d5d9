//! Metrics collection.
//!
//! # Metrics
//! - `registry_operations_total` (counter): operations by kind and outcome
//! - `registry_errors_total` (counter): classified failures by kind

use crate::registry::ErrorKind;

pub fn record_operation(operation: &'static str, outcome: &'static str) {
    ::metrics::counter!(
        "registry_operations_total",
        "operation" => operation,
        "outcome" => outcome
    )
    .increment(1);
}

pub fn record_error(kind: ErrorKind) {
    ::metrics::counter!("registry_errors_total", "kind" => kind.as_str()).increment(1);
}
