//! Shared data models for the FieldView backend.
//!
//! This crate provides Serde-serializable types for:
//! - Video records and their processing lifecycle
//! - Inbound AI-service callback events

pub mod callback;
pub mod video;

// Re-export common types
pub use callback::{CallbackEvent, StatusToken, UnknownStatusToken};
pub use video::{ProcessingStatus, VideoId, VideoRecord};
