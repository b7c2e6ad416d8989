//! Video record model and processing lifecycle.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a registered video.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct VideoId(pub String);

impl VideoId {
    /// Generate a new random video ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for VideoId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VideoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for VideoId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for VideoId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Processing status of a video.
///
/// Status only moves forward along
/// Uploaded -> {Queued | Processing} -> {Completed | Failed}.
/// Queued is transient: it is only observed while a dispatch to the AI
/// service is outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Upload confirmed, processing not yet requested
    #[default]
    Uploaded,
    /// Dispatch to the AI service is outstanding
    Queued,
    /// The AI service is analyzing the video
    Processing,
    /// Analysis finished successfully
    Completed,
    /// Analysis failed
    Failed,
}

impl ProcessingStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Uploaded => "uploaded",
            ProcessingStatus::Queued => "queued",
            ProcessingStatus::Processing => "processing",
            ProcessingStatus::Completed => "completed",
            ProcessingStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no further status transition accepted).
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStatus::Completed | ProcessingStatus::Failed)
    }
}

impl fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Persisted record for one video-analysis job.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VideoRecord {
    /// Unique video ID
    pub video_id: VideoId,

    /// User ID (owner); every read/write is scoped to this value
    pub user_id: String,

    /// Display title
    pub title: String,

    /// Optional description
    #[serde(default)]
    pub description: String,

    /// Object-store key of the uploaded source video
    pub source_key: String,

    /// Object-store key of the processed output.
    ///
    /// Only authoritative once status is Completed; a key received
    /// mid-processing is stored but not surfaced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,

    /// MIME type reported at registration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,

    /// File size in bytes reported at registration
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,

    /// Current processing status
    #[serde(default)]
    pub status: ProcessingStatus,

    /// Progress percentage (0-100), monotonic within an attempt
    #[serde(default)]
    pub progress: u8,

    /// Job handle assigned by the AI service; immutable once set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_handle: Option<String>,

    /// Human-readable stage label, advisory only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_task: Option<String>,

    /// Error message; present only when status is Failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    /// Raw analytics payload as supplied by the AI service.
    ///
    /// Stored verbatim and canonicalized lazily at read time, so an
    /// unparseable-but-recoverable payload is never lost at ingestion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analytics_data: Option<String>,

    /// Whether AI analysis has completed for this video
    #[serde(default)]
    pub ai_analysis_completed: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp, bumped on every save
    pub updated_at: DateTime<Utc>,

    /// When processing first started (set once)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    /// When processing completed (set once)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,

    /// Optimistic-concurrency version, bumped by the store on every save
    #[serde(default)]
    pub version: u64,
}

impl VideoRecord {
    /// Create a new record in the Uploaded state.
    pub fn new(user_id: impl Into<String>, title: impl Into<String>, source_key: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            video_id: VideoId::new(),
            user_id: user_id.into(),
            title: title.into(),
            description: String::new(),
            source_key: source_key.into(),
            output_key: None,
            content_type: None,
            file_size: None,
            status: ProcessingStatus::Uploaded,
            progress: 0,
            job_handle: None,
            current_task: None,
            error_message: None,
            analytics_data: None,
            ai_analysis_completed: false,
            created_at: now,
            updated_at: now,
            started_at: None,
            completed_at: None,
            version: 0,
        }
    }

    /// Check if the record is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Check if the record is currently being processed.
    pub fn is_processing(&self) -> bool {
        self.status == ProcessingStatus::Processing
    }

    /// Move into Processing for a new attempt.
    ///
    /// Resets progress, clears a previous error and records `started_at`
    /// on the first attempt only.
    pub fn begin_processing(&mut self) {
        self.status = ProcessingStatus::Processing;
        self.progress = 0;
        self.error_message = None;
        self.started_at.get_or_insert_with(Utc::now);
    }

    /// Adopt the job handle returned by the AI service.
    ///
    /// First-wins: an already-recorded handle is never overwritten.
    pub fn adopt_job_handle(&mut self, handle: impl Into<String>) {
        self.job_handle.get_or_insert_with(|| handle.into());
    }

    /// Adopt a progress value if it is in range and non-regressing.
    ///
    /// Returns true if the value was applied.
    pub fn adopt_progress(&mut self, progress: i64) -> bool {
        if !(0..=100).contains(&progress) {
            return false;
        }
        let progress = progress as u8;
        if progress < self.progress {
            return false;
        }
        self.progress = progress;
        true
    }

    /// Mark the record completed.
    ///
    /// Forces progress to 100, records `completed_at` on first completion
    /// and clears any stale error.
    pub fn complete(&mut self) {
        self.status = ProcessingStatus::Completed;
        self.progress = 100;
        self.error_message = None;
        self.ai_analysis_completed = true;
        self.completed_at.get_or_insert_with(Utc::now);
    }

    /// Mark the record failed with an error message.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = ProcessingStatus::Failed;
        self.error_message = Some(error.into());
    }

    /// The output key, surfaced only once it is authoritative.
    pub fn authoritative_output_key(&self) -> Option<&str> {
        if self.status == ProcessingStatus::Completed {
            self.output_key.as_deref()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_uploaded() {
        let record = VideoRecord::new("user-1", "Derby day", "uploads/derby.mp4");
        assert_eq!(record.status, ProcessingStatus::Uploaded);
        assert_eq!(record.progress, 0);
        assert!(!record.is_terminal());
        assert!(record.started_at.is_none());
        assert_eq!(record.version, 0);
    }

    #[test]
    fn test_begin_processing_sets_started_at_once() {
        let mut record = VideoRecord::new("user-1", "t", "k");
        record.begin_processing();
        let first = record.started_at.expect("started_at set");

        record.fail("boom");
        record.begin_processing();
        assert_eq!(record.started_at, Some(first));
        assert!(record.error_message.is_none());
    }

    #[test]
    fn test_job_handle_first_wins() {
        let mut record = VideoRecord::new("user-1", "t", "k");
        record.adopt_job_handle("job-a");
        record.adopt_job_handle("job-b");
        assert_eq!(record.job_handle.as_deref(), Some("job-a"));
    }

    #[test]
    fn test_adopt_progress_range_and_monotonicity() {
        let mut record = VideoRecord::new("user-1", "t", "k");
        assert!(record.adopt_progress(40));
        assert_eq!(record.progress, 40);

        // Out of range leaves progress unchanged
        assert!(!record.adopt_progress(150));
        assert!(!record.adopt_progress(-1));
        assert_eq!(record.progress, 40);

        // Lower in-range values do not regress
        assert!(!record.adopt_progress(20));
        assert_eq!(record.progress, 40);

        assert!(record.adopt_progress(55));
        assert_eq!(record.progress, 55);
    }

    #[test]
    fn test_complete_forces_progress_and_timestamp() {
        let mut record = VideoRecord::new("user-1", "t", "k");
        record.begin_processing();
        record.adopt_progress(70);
        record.complete();

        assert_eq!(record.status, ProcessingStatus::Completed);
        assert_eq!(record.progress, 100);
        assert!(record.ai_analysis_completed);
        assert!(record.completed_at.is_some());
        assert!(record.is_terminal());

        let completed = record.completed_at;
        record.complete();
        assert_eq!(record.completed_at, completed);
    }

    #[test]
    fn test_output_key_only_authoritative_when_completed() {
        let mut record = VideoRecord::new("user-1", "t", "k");
        record.begin_processing();
        record.output_key = Some("out/1".into());
        assert_eq!(record.authoritative_output_key(), None);

        record.complete();
        assert_eq!(record.authoritative_output_key(), Some("out/1"));
    }

    #[test]
    fn test_status_serde_snake_case() {
        let json = serde_json::to_string(&ProcessingStatus::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
        assert_eq!(ProcessingStatus::Uploaded.as_str(), "uploaded");
    }
}
