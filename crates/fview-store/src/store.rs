//! The `VideoStore` trait.

use async_trait::async_trait;

use fview_models::{VideoId, VideoRecord};

use crate::error::StoreResult;

/// One page of records, ordered by creation time descending.
#[derive(Debug, Clone)]
pub struct RecordPage {
    pub records: Vec<VideoRecord>,
    /// Offset of the next page, None when exhausted.
    pub next_offset: Option<u32>,
}

/// Persistence seam for video records.
///
/// Every user-facing read/write is owner-scoped: a record belonging to
/// another owner is indistinguishable from a missing one. `get_any` exists
/// solely for the callback path, where ownership is verified against the
/// event instead.
#[async_trait]
pub trait VideoStore: Send + Sync {
    /// Owner-scoped lookup.
    async fn get(&self, id: &VideoId, owner: &str) -> StoreResult<Option<VideoRecord>>;

    /// Unscoped lookup for inbound callbacks.
    async fn get_any(&self, id: &VideoId) -> StoreResult<Option<VideoRecord>>;

    /// Insert a new record. Fails with `AlreadyExists` on a duplicate id.
    async fn create(&self, record: &VideoRecord) -> StoreResult<()>;

    /// Persist a mutated record with compare-and-swap on `version`.
    ///
    /// Fails with `VersionConflict` if the stored version differs from
    /// `record.version`; on success the record's `version` is bumped and
    /// `updated_at` refreshed, both in the store and on the passed record.
    async fn save(&self, record: &mut VideoRecord) -> StoreResult<()>;

    /// Owner-scoped delete. Returns false when nothing was removed.
    async fn delete(&self, id: &VideoId, owner: &str) -> StoreResult<bool>;

    /// Owner-scoped listing, newest first.
    async fn list_by_owner(&self, owner: &str, limit: u32, offset: u32) -> StoreResult<RecordPage>;
}
