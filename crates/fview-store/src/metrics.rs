//! Store metrics collection.

use metrics::counter;

/// Metric name constants for consistency.
pub mod names {
    /// Total store operations by kind.
    pub const OPS_TOTAL: &str = "fview_store_ops_total";

    /// Total CAS-conflict retries by operation.
    pub const CONFLICT_RETRIES_TOTAL: &str = "fview_store_conflict_retries_total";
}

/// Record a store operation.
pub fn record_store_op(op: &str) {
    counter!(names::OPS_TOTAL, "op" => op.to_string()).increment(1);
}

/// Record a retry caused by a lost write race.
pub fn record_conflict_retry(operation: &str) {
    counter!(
        names::CONFLICT_RETRIES_TOTAL,
        "operation" => operation.to_string()
    )
    .increment(1);
}
