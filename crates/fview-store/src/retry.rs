//! Bounded retry for lost optimistic-concurrency races.
//!
//! A writer that loses a version CAS race must re-read the record and
//! re-apply its mutation; this helper bounds those attempts with a short
//! linear backoff. Anything other than a conflict propagates immediately.

use std::time::Duration;

use tracing::warn;

use crate::error::{StoreError, StoreResult};
use crate::metrics::record_conflict_retry;

/// Retry policy for CAS conflicts.
#[derive(Debug, Clone)]
pub struct ConflictRetry {
    /// Maximum number of re-apply attempts after the first try.
    pub max_retries: u32,
    /// Delay between attempts (in milliseconds).
    pub backoff_ms: u64,
}

impl Default for ConflictRetry {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_ms: 25,
        }
    }
}

/// Execute `op` (a full read-mutate-save cycle) with conflict retry.
pub async fn retry_on_conflict<T, F, Fut>(
    policy: &ConflictRetry,
    operation: &str,
    op: F,
) -> StoreResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = StoreResult<T>>,
{
    let mut last_conflict = None;

    for attempt in 0..=policy.max_retries {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_conflict() && attempt < policy.max_retries => {
                warn!(
                    operation = %operation,
                    attempt = attempt + 1,
                    "Lost store write race, re-applying: {e}"
                );
                record_conflict_retry(operation);
                tokio::time::sleep(Duration::from_millis(policy.backoff_ms)).await;
                last_conflict = Some(e);
            }
            Err(e) => return Err(e),
        }
    }

    Err(last_conflict.unwrap_or_else(|| StoreError::backend("retry loop exhausted")))
}
