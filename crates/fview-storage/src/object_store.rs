//! The `ObjectStore` trait.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StorageResult;

/// Blob-store operations the orchestration core consumes.
///
/// The core never retries storage failures synchronously. Deletion
/// failures are swallowed (with logging) by delete-video flows; presign
/// failures are fatal to download-URL issuance.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Check whether an object exists.
    async fn exists(&self, key: &str) -> StorageResult<bool>;

    /// Delete an object by key.
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Generate a time-limited signed read URL.
    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// Probe backend connectivity, for readiness checks.
    async fn check_connectivity(&self) -> StorageResult<()>;
}
