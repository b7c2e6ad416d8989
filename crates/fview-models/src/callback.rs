//! Inbound callback events from the AI service.
//!
//! Callbacks arrive over HTTP with a loosely specified body: every field
//! except `video_id` and `status` is optional, and the analytics payload may
//! be either a JSON object or a pre-serialized string. Validation happens
//! field-by-field in the processing service, never by blind key lookup.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::video::ProcessingStatus;

/// Callback event posted by the AI service for one job.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CallbackEvent {
    /// Video this event belongs to
    pub video_id: String,

    /// Owner as seen by the AI service; verified against the record when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Raw status token: queued | processing | completed | failed
    pub status: String,

    /// Progress percentage; validated to [0,100] before adoption
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<i64>,

    /// Human-readable stage description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Object-store key of the processed output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_key: Option<String>,

    /// Analytics payload, string or structured
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analytics: Option<serde_json::Value>,

    /// Error description for failed jobs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CallbackEvent {
    /// Parse the raw status token into a target status.
    pub fn status_token(&self) -> Result<StatusToken, UnknownStatusToken> {
        StatusToken::parse(&self.status)
    }

    /// The analytics payload as verbatim text, if any.
    ///
    /// A string payload is kept as-is; a structured payload is serialized
    /// to compact JSON. Either way the text is stored unparsed.
    pub fn analytics_text(&self) -> Option<String> {
        match &self.analytics {
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(value) => Some(value.to_string()),
            None => None,
        }
    }
}

/// Recognized callback status tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusToken {
    Queued,
    Processing,
    Completed,
    Failed,
}

impl StatusToken {
    /// Parse a token, case-insensitively.
    pub fn parse(raw: &str) -> Result<Self, UnknownStatusToken> {
        match raw.to_ascii_lowercase().as_str() {
            "queued" => Ok(StatusToken::Queued),
            "processing" => Ok(StatusToken::Processing),
            "completed" => Ok(StatusToken::Completed),
            "failed" => Ok(StatusToken::Failed),
            _ => Err(UnknownStatusToken(raw.to_string())),
        }
    }

    /// The internal status this token targets.
    pub fn target_status(&self) -> ProcessingStatus {
        match self {
            StatusToken::Queued => ProcessingStatus::Queued,
            StatusToken::Processing => ProcessingStatus::Processing,
            StatusToken::Completed => ProcessingStatus::Completed,
            StatusToken::Failed => ProcessingStatus::Failed,
        }
    }
}

/// A callback carried a status token this service does not recognize.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown processing status token: {0}")]
pub struct UnknownStatusToken(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_token_parsing() {
        assert_eq!(StatusToken::parse("completed"), Ok(StatusToken::Completed));
        assert_eq!(StatusToken::parse("PROCESSING"), Ok(StatusToken::Processing));
        assert_eq!(StatusToken::parse("Queued"), Ok(StatusToken::Queued));
        assert!(StatusToken::parse("exploded").is_err());
    }

    #[test]
    fn test_event_deserializes_with_minimal_fields() {
        let event: CallbackEvent =
            serde_json::from_str(r#"{"video_id": "v1", "status": "processing"}"#).unwrap();
        assert_eq!(event.video_id, "v1");
        assert!(event.progress.is_none());
        assert!(event.user_id.is_none());
        assert!(event.analytics.is_none());
    }

    #[test]
    fn test_analytics_text_keeps_strings_verbatim() {
        let event: CallbackEvent = serde_json::from_str(
            r#"{"video_id": "v1", "status": "completed", "analytics": "{team='A'}"}"#,
        )
        .unwrap();
        assert_eq!(event.analytics_text().as_deref(), Some("{team='A'}"));
    }

    #[test]
    fn test_analytics_text_serializes_objects() {
        let event: CallbackEvent = serde_json::from_str(
            r#"{"video_id": "v1", "status": "completed", "analytics": {"total_passes": 3}}"#,
        )
        .unwrap();
        assert_eq!(event.analytics_text().as_deref(), Some(r#"{"total_passes":3}"#));
    }

    #[test]
    fn test_out_of_range_progress_still_deserializes() {
        let event: CallbackEvent =
            serde_json::from_str(r#"{"video_id": "v1", "status": "processing", "progress": 150}"#)
                .unwrap();
        assert_eq!(event.progress, Some(150));
    }
}
