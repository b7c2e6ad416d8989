//! Registration, status and analytics read path, download URLs, deletion.
//!
//! Everything here is owner-scoped: a record belonging to another user is
//! indistinguishable from a missing one.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use fview_analytics::{empty_placeholder, normalize};
use fview_models::{ProcessingStatus, VideoId, VideoRecord};
use fview_store::VideoStore;
use fview_storage::ObjectStore;

use crate::error::{ApiError, ApiResult};

/// Metadata for a newly registered video.
#[derive(Debug, Clone, Deserialize)]
pub struct NewVideo {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Object-store key of the already-uploaded source file
    pub source_key: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub file_size: Option<i64>,
}

/// Full processing view of a single video.
#[derive(Debug, Serialize)]
pub struct StatusView {
    pub video_id: String,
    pub title: String,
    pub status: String,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Present only once processing completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,
    pub ai_analysis_completed: bool,
    pub analytics: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// Analytics for a single video.
#[derive(Debug, Serialize)]
pub struct AnalyticsView {
    pub video_id: String,
    pub status: String,
    /// False until AI analysis has completed for this video
    pub available: bool,
    pub analytics: Value,
}

/// One named section of the normalized analytics map.
#[derive(Debug, Serialize)]
pub struct AnalyticsSection {
    pub video_id: String,
    pub status: String,
    pub available: bool,
    pub section: String,
    pub data: Value,
}

/// One row of a video listing.
#[derive(Debug, Serialize)]
pub struct VideoSummary {
    pub video_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub status: String,
    pub progress: u8,
    pub ai_analysis_completed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A page of a video listing.
#[derive(Debug, Serialize)]
pub struct VideoPage {
    pub videos: Vec<VideoSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_offset: Option<u32>,
}

const DEFAULT_PAGE_SIZE: u32 = 50;
const MAX_PAGE_SIZE: u32 = 100;

/// Read path and CRUD over the video store and the object store.
#[derive(Clone)]
pub struct QueryService {
    store: Arc<dyn VideoStore>,
    storage: Arc<dyn ObjectStore>,
    download_url_ttl: Duration,
}

impl QueryService {
    pub fn new(
        store: Arc<dyn VideoStore>,
        storage: Arc<dyn ObjectStore>,
        download_url_ttl: Duration,
    ) -> Self {
        Self {
            store,
            storage,
            download_url_ttl,
        }
    }

    /// Register an already-uploaded video for processing.
    pub async fn register_video(&self, owner: &str, new: NewVideo) -> ApiResult<VideoRecord> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(ApiError::bad_request("Title must not be empty"));
        }
        let source_key = new.source_key.trim();
        if source_key.is_empty() {
            return Err(ApiError::bad_request("Source key must not be empty"));
        }
        if let Some(size) = new.file_size {
            if size < 0 {
                return Err(ApiError::bad_request("File size must not be negative"));
            }
        }

        // The upload happens out of band; refuse to register a key the
        // object store has never seen.
        if !self.storage.exists(source_key).await? {
            return Err(ApiError::bad_request("Source video not found in storage"));
        }

        let mut record = VideoRecord::new(owner, title, source_key);
        record.description = new.description.map(|d| d.trim().to_string()).unwrap_or_default();
        record.content_type = new.content_type;
        record.file_size = new.file_size.map(|s| s as u64);

        self.store.create(&record).await?;
        info!("Registered video {} for user {}", record.video_id, owner);
        Ok(record)
    }

    /// Processing status plus normalized analytics.
    pub async fn status_view(&self, id: &VideoId, owner: &str) -> ApiResult<StatusView> {
        let record = self.load(id, owner).await?;

        let analytics = match &record.analytics_data {
            Some(raw) => normalize(raw).into_value(),
            None => empty_placeholder(),
        };

        Ok(StatusView {
            video_id: record.video_id.to_string(),
            title: record.title.clone(),
            status: record.status.as_str().to_string(),
            progress: record.progress,
            current_task: record.current_task.clone(),
            error_message: record.error_message.clone(),
            output_key: record.authoritative_output_key().map(str::to_string),
            ai_analysis_completed: record.ai_analysis_completed,
            analytics,
            started_at: record.started_at,
            completed_at: record.completed_at,
            updated_at: record.updated_at,
        })
    }

    /// Analytics only; a placeholder until analysis has completed.
    pub async fn get_analytics(&self, id: &VideoId, owner: &str) -> ApiResult<AnalyticsView> {
        let record = self.load(id, owner).await?;

        let (available, analytics) = match (&record.analytics_data, record.ai_analysis_completed) {
            (Some(raw), true) => (true, normalize(raw).into_value()),
            _ => (false, empty_placeholder()),
        };

        Ok(AnalyticsView {
            video_id: record.video_id.to_string(),
            status: record.status.as_str().to_string(),
            available,
            analytics,
        })
    }

    /// A single section of the analytics map, for the focused sub-views.
    ///
    /// A section absent from the payload comes back as an empty object, so
    /// the shape is stable whatever the AI service reported.
    pub async fn analytics_section(
        &self,
        id: &VideoId,
        owner: &str,
        section: &str,
    ) -> ApiResult<AnalyticsSection> {
        let view = self.get_analytics(id, owner).await?;
        let data = view
            .analytics
            .get(section)
            .cloned()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));

        Ok(AnalyticsSection {
            video_id: view.video_id,
            status: view.status,
            available: view.available,
            section: section.to_string(),
            data,
        })
    }

    /// Presigned download URL for the processed output.
    ///
    /// Only a Completed record has an output to hand out; storage failures
    /// here are fatal, not swallowed.
    pub async fn get_download_url(&self, id: &VideoId, owner: &str) -> ApiResult<String> {
        let record = self.load(id, owner).await?;

        if record.status != ProcessingStatus::Completed {
            return Err(ApiError::bad_request("Video processing is not completed"));
        }
        let key = record
            .authoritative_output_key()
            .ok_or_else(|| ApiError::bad_request("Processed video is not available"))?;

        let url = self
            .storage
            .presigned_get_url(key, self.download_url_ttl)
            .await?;
        Ok(url)
    }

    /// Delete a video record and its stored objects.
    ///
    /// Object deletions are best effort; a storage failure is logged and
    /// the record is removed regardless, so a retried delete converges.
    pub async fn delete_video(&self, id: &VideoId, owner: &str) -> ApiResult<()> {
        let record = self.load(id, owner).await?;

        for key in [Some(record.source_key.as_str()), record.output_key.as_deref()]
            .into_iter()
            .flatten()
        {
            if let Err(e) = self.storage.delete(key).await {
                warn!("Failed to delete object {} for video {}: {}", key, id, e);
            }
        }

        if !self.store.delete(id, owner).await? {
            return Err(ApiError::not_found("Video not found"));
        }
        info!("Deleted video {} for user {}", id, owner);
        Ok(())
    }

    /// List the owner's videos, newest first.
    pub async fn list_videos(
        &self,
        owner: &str,
        limit: Option<u32>,
        offset: Option<u32>,
    ) -> ApiResult<VideoPage> {
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = offset.unwrap_or(0);

        let page = self.store.list_by_owner(owner, limit, offset).await?;
        let videos = page
            .records
            .into_iter()
            .map(|r| VideoSummary {
                video_id: r.video_id.to_string(),
                title: r.title,
                description: r.description,
                status: r.status.as_str().to_string(),
                progress: r.progress,
                ai_analysis_completed: r.ai_analysis_completed,
                created_at: r.created_at,
                updated_at: r.updated_at,
            })
            .collect();

        Ok(VideoPage {
            videos,
            next_offset: page.next_offset,
        })
    }

    async fn load(&self, id: &VideoId, owner: &str) -> ApiResult<VideoRecord> {
        self.store
            .get(id, owner)
            .await?
            .ok_or_else(|| ApiError::not_found("Video not found"))
    }
}
