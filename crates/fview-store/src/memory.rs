//! In-memory `VideoStore` implementation.
//!
//! Backs the orchestration core in tests and single-node deployments; any
//! durable backend slots in behind the same trait.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;

use fview_models::{VideoId, VideoRecord};

use crate::error::{StoreError, StoreResult};
use crate::metrics::record_store_op;
use crate::store::{RecordPage, VideoStore};

/// In-memory store keyed by video id.
#[derive(Default)]
pub struct MemoryVideoStore {
    records: RwLock<HashMap<VideoId, VideoRecord>>,
}

impl MemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VideoStore for MemoryVideoStore {
    async fn get(&self, id: &VideoId, owner: &str) -> StoreResult<Option<VideoRecord>> {
        record_store_op("get");
        let records = self.records.read().await;
        Ok(records.get(id).filter(|r| r.user_id == owner).cloned())
    }

    async fn get_any(&self, id: &VideoId) -> StoreResult<Option<VideoRecord>> {
        record_store_op("get_any");
        let records = self.records.read().await;
        Ok(records.get(id).cloned())
    }

    async fn create(&self, record: &VideoRecord) -> StoreResult<()> {
        record_store_op("create");
        let mut records = self.records.write().await;
        if records.contains_key(&record.video_id) {
            return Err(StoreError::already_exists(record.video_id.as_str()));
        }
        records.insert(record.video_id.clone(), record.clone());
        debug!("Created video record {}", record.video_id);
        Ok(())
    }

    async fn save(&self, record: &mut VideoRecord) -> StoreResult<()> {
        record_store_op("save");
        let mut records = self.records.write().await;
        let stored = records
            .get_mut(&record.video_id)
            .ok_or_else(|| StoreError::not_found(record.video_id.as_str()))?;

        if stored.version != record.version {
            return Err(StoreError::VersionConflict {
                id: record.video_id.to_string(),
                expected: record.version,
                found: stored.version,
            });
        }

        record.version += 1;
        record.updated_at = Utc::now();
        *stored = record.clone();
        Ok(())
    }

    async fn delete(&self, id: &VideoId, owner: &str) -> StoreResult<bool> {
        record_store_op("delete");
        let mut records = self.records.write().await;
        match records.get(id) {
            Some(r) if r.user_id == owner => {
                records.remove(id);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_by_owner(&self, owner: &str, limit: u32, offset: u32) -> StoreResult<RecordPage> {
        record_store_op("list");
        let records = self.records.read().await;
        let mut owned: Vec<VideoRecord> = records
            .values()
            .filter(|r| r.user_id == owner)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total = owned.len() as u32;
        let page: Vec<VideoRecord> = owned
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();

        let consumed = offset.saturating_add(page.len() as u32);
        let next_offset = (consumed < total).then_some(consumed);

        Ok(RecordPage { records: page, next_offset })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn record(owner: &str, title: &str) -> VideoRecord {
        VideoRecord::new(owner, title, format!("uploads/{title}.mp4"))
    }

    #[tokio::test]
    async fn test_get_is_owner_scoped() {
        let store = MemoryVideoStore::new();
        let r = record("user-1", "match");
        store.create(&r).await.unwrap();

        assert!(store.get(&r.video_id, "user-1").await.unwrap().is_some());
        // Another owner's record looks exactly like a missing one
        assert!(store.get(&r.video_id, "user-2").await.unwrap().is_none());
        assert!(store.get_any(&r.video_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_id() {
        let store = MemoryVideoStore::new();
        let r = record("user-1", "match");
        store.create(&r).await.unwrap();
        assert!(matches!(
            store.create(&r).await,
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_save_bumps_version() {
        let store = MemoryVideoStore::new();
        let mut r = record("user-1", "match");
        store.create(&r).await.unwrap();

        r.progress = 10;
        store.save(&mut r).await.unwrap();
        assert_eq!(r.version, 1);

        let stored = store.get(&r.video_id, "user-1").await.unwrap().unwrap();
        assert_eq!(stored.version, 1);
        assert_eq!(stored.progress, 10);
    }

    #[tokio::test]
    async fn test_save_detects_lost_race() {
        let store = MemoryVideoStore::new();
        let r = record("user-1", "match");
        store.create(&r).await.unwrap();

        let mut writer_a = store.get(&r.video_id, "user-1").await.unwrap().unwrap();
        let mut writer_b = store.get(&r.video_id, "user-1").await.unwrap().unwrap();

        writer_a.progress = 30;
        store.save(&mut writer_a).await.unwrap();

        writer_b.progress = 20;
        let err = store.save(&mut writer_b).await.unwrap_err();
        assert!(err.is_conflict());

        // The winner's write survives
        let stored = store.get(&r.video_id, "user-1").await.unwrap().unwrap();
        assert_eq!(stored.progress, 30);
    }

    #[tokio::test]
    async fn test_delete_is_owner_scoped() {
        let store = MemoryVideoStore::new();
        let r = record("user-1", "match");
        store.create(&r).await.unwrap();

        assert!(!store.delete(&r.video_id, "user-2").await.unwrap());
        assert!(store.delete(&r.video_id, "user-1").await.unwrap());
        assert!(store.get_any(&r.video_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_newest_first_with_paging() {
        let store = MemoryVideoStore::new();
        let base = Utc::now();
        for i in 0..5 {
            let mut r = record("user-1", &format!("m{i}"));
            r.created_at = base + Duration::seconds(i);
            store.create(&r).await.unwrap();
        }
        store.create(&record("user-2", "other")).await.unwrap();

        let page = store.list_by_owner("user-1", 2, 0).await.unwrap();
        assert_eq!(page.records.len(), 2);
        assert_eq!(page.records[0].title, "m4");
        assert_eq!(page.records[1].title, "m3");
        assert_eq!(page.next_offset, Some(2));

        let page = store.list_by_owner("user-1", 10, 2).await.unwrap();
        assert_eq!(page.records.len(), 3);
        assert_eq!(page.next_offset, None);
    }
}
