//! The processing state machine.
//!
//! Owns every status-affecting transition of a video record. Two inputs
//! drive it: a start-processing command from a caller, and progress
//! callbacks from the AI service. Callbacks arrive out of order, duplicated,
//! and sometimes after polling clients have already observed completion; the
//! rules here make the record converge regardless of delivery order.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use fview_ai_client::{Dispatch, DispatchError, ProcessingRequest};
use fview_models::{CallbackEvent, ProcessingStatus, StatusToken, VideoId, VideoRecord};
use fview_store::{retry_on_conflict, ConflictRetry, StoreError, VideoStore};

use crate::error::{ApiError, ApiResult};
use crate::metrics::{record_callback, record_callback_rejection, record_dispatch};

/// Options applied to every dispatch.
#[derive(Debug, Clone)]
pub struct DispatchOptions {
    /// Where the AI service posts callbacks
    pub callback_url: String,
    /// Run the AI service's stub pipeline
    pub stub_mode: bool,
    /// Keep the source audio track
    pub preserve_audio: bool,
}

/// Result of a start-processing command.
#[derive(Debug)]
pub enum StartOutcome {
    /// The record moved to Processing and the dispatch was accepted.
    Started { job_handle: Option<String> },
    /// The record is already Completed; informational, not an error.
    AlreadyCompleted,
    /// Dispatch failed; the record was moved to Failed with the
    /// classified error (absorbed, not propagated).
    DispatchFailed { kind: &'static str, message: String },
}

/// A rejected callback.
#[derive(Debug, Error)]
pub enum CallbackError {
    #[error("Unknown video id in callback: {0}")]
    UnknownJob(String),

    #[error("Callback user id mismatch for video {0}")]
    OwnerMismatch(String),

    #[error("Unknown processing status token: {0}")]
    UnknownStatus(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<CallbackError> for ApiError {
    fn from(e: CallbackError) -> Self {
        match e {
            CallbackError::UnknownJob(_) => ApiError::not_found("Video not found"),
            CallbackError::OwnerMismatch(_) => ApiError::forbidden("User id mismatch"),
            CallbackError::UnknownStatus(token) => {
                ApiError::bad_request(format!("Unknown processing status: {token}"))
            }
            CallbackError::Store(e) => ApiError::Store(e),
        }
    }
}

/// Outcome of the gated transition into Processing.
enum StartGate {
    Missing,
    InProgress,
    Completed,
    Proceed(VideoRecord),
}

/// State machine over the video store and the AI dispatcher.
#[derive(Clone)]
pub struct ProcessingService {
    store: Arc<dyn VideoStore>,
    dispatcher: Arc<dyn Dispatch>,
    options: DispatchOptions,
    retry: ConflictRetry,
}

impl ProcessingService {
    pub fn new(
        store: Arc<dyn VideoStore>,
        dispatcher: Arc<dyn Dispatch>,
        options: DispatchOptions,
    ) -> Self {
        Self {
            store,
            dispatcher,
            options,
            retry: ConflictRetry::default(),
        }
    }

    /// Start processing a video.
    ///
    /// Rejected with Conflict while a processing attempt is underway;
    /// idempotent (informational outcome) once completed. A dispatch
    /// failure lands the record in Failed and is reported in the outcome
    /// rather than as a call failure.
    pub async fn start_processing(&self, id: &VideoId, owner: &str) -> ApiResult<StartOutcome> {
        let gate = retry_on_conflict(&self.retry, "start_processing", || async {
            let Some(mut record) = self.store.get(id, owner).await? else {
                return Ok(StartGate::Missing);
            };
            if record.is_processing() {
                return Ok(StartGate::InProgress);
            }
            if record.status == ProcessingStatus::Completed {
                return Ok(StartGate::Completed);
            }

            record.begin_processing();
            self.store.save(&mut record).await?;
            Ok(StartGate::Proceed(record))
        })
        .await?;

        let record = match gate {
            StartGate::Missing => return Err(ApiError::not_found("Video not found")),
            StartGate::InProgress => {
                return Err(ApiError::conflict("Video is already being processed"))
            }
            StartGate::Completed => return Ok(StartOutcome::AlreadyCompleted),
            StartGate::Proceed(record) => record,
        };

        info!("Started processing for video {} (user {})", id, owner);

        let request = ProcessingRequest {
            video_id: record.video_id.to_string(),
            video_key: record.source_key.clone(),
            user_id: owner.to_string(),
            callback_url: self.options.callback_url.clone(),
            stub_mode: self.options.stub_mode,
            preserve_audio: self.options.preserve_audio,
        };

        match self.dispatcher.dispatch(&request).await {
            Ok(ack) => {
                record_dispatch("ok");
                let handle = self.persist_job_handle(id, owner, &ack.job_id).await?;
                Ok(StartOutcome::Started { job_handle: handle })
            }
            Err(e) => {
                record_dispatch(e.kind());
                warn!("Dispatch failed for video {}: {}", id, e);
                self.fail_after_dispatch(id, owner, &e).await?;
                Ok(StartOutcome::DispatchFailed {
                    kind: e.kind(),
                    message: e.to_string(),
                })
            }
        }
    }

    /// Persist the job handle before anything else happens.
    ///
    /// First-wins: a handle already on the record is kept.
    async fn persist_job_handle(
        &self,
        id: &VideoId,
        owner: &str,
        job_id: &str,
    ) -> ApiResult<Option<String>> {
        let record = retry_on_conflict(&self.retry, "persist_job_handle", || async {
            let mut record = self
                .store
                .get(id, owner)
                .await?
                .ok_or_else(|| StoreError::not_found(id.as_str()))?;
            record.adopt_job_handle(job_id);
            self.store.save(&mut record).await?;
            Ok(record)
        })
        .await?;
        Ok(record.job_handle)
    }

    /// Compensating transition after a failed dispatch.
    ///
    /// Skipped if a racing callback already drove the record terminal.
    async fn fail_after_dispatch(
        &self,
        id: &VideoId,
        owner: &str,
        error: &DispatchError,
    ) -> ApiResult<()> {
        retry_on_conflict(&self.retry, "fail_after_dispatch", || async {
            let Some(mut record) = self.store.get(id, owner).await? else {
                return Ok(());
            };
            if record.is_terminal() {
                return Ok(());
            }
            record.fail(format!("Failed to start processing: {error}"));
            self.store.save(&mut record).await?;
            Ok(())
        })
        .await?;
        Ok(())
    }

    /// Apply a callback event from the AI service.
    ///
    /// Rules, in order: resolve the video (never create one from a
    /// callback), verify the owner when the event names one, map the status
    /// token, apply the per-token mutation, persist under CAS. Terminal
    /// records freeze status, progress, completion timestamp and error;
    /// only advisory fields stay writable.
    pub async fn apply_callback(&self, event: &CallbackEvent) -> Result<(), CallbackError> {
        let applied = retry_on_conflict(&self.retry, "apply_callback", || async {
            self.try_apply(event).await
        })
        .await?;

        match applied {
            Ok(token) => {
                record_callback(token.target_status().as_str());
                Ok(())
            }
            Err(rejection) => {
                record_callback_rejection(match &rejection {
                    CallbackError::UnknownJob(_) => "unknown_job",
                    CallbackError::OwnerMismatch(_) => "owner_mismatch",
                    CallbackError::UnknownStatus(_) => "unknown_status",
                    CallbackError::Store(_) => "store",
                });
                warn!("Rejected callback for video {}: {}", event.video_id, rejection);
                Err(rejection)
            }
        }
    }

    /// One read-mutate-save cycle; conflicts bubble up for retry.
    async fn try_apply(
        &self,
        event: &CallbackEvent,
    ) -> Result<Result<StatusToken, CallbackError>, StoreError> {
        let id = VideoId::from(event.video_id.as_str());

        let Some(mut record) = self.store.get_any(&id).await? else {
            return Ok(Err(CallbackError::UnknownJob(event.video_id.clone())));
        };

        if let Some(user_id) = &event.user_id {
            if user_id != &record.user_id {
                return Ok(Err(CallbackError::OwnerMismatch(event.video_id.clone())));
            }
        }

        let token = match event.status_token() {
            Ok(token) => token,
            Err(e) => return Ok(Err(CallbackError::UnknownStatus(e.0))),
        };

        let changed = Self::apply_event(&mut record, token, event);
        if changed {
            self.store.save(&mut record).await?;
        }

        Ok(Ok(token))
    }

    /// Apply the event to the record in memory. Returns true if anything
    /// changed and a save is needed.
    fn apply_event(record: &mut VideoRecord, token: StatusToken, event: &CallbackEvent) -> bool {
        let mut changed = false;

        // Advisory fields are writable in every state.
        if let Some(message) = &event.message {
            if record.current_task.as_deref() != Some(message) {
                record.current_task = Some(message.clone());
                changed = true;
            }
        }
        if let Some(text) = event.analytics_text() {
            if record.analytics_data.as_deref() != Some(text.as_str()) {
                record.analytics_data = Some(text);
                changed = true;
            }
        }

        if record.is_terminal() {
            // Frozen: status, progress, completed_at and error_message are
            // settled. A replayed completed event may still fill a missing
            // output key; an unchanged one is a no-op.
            if token == StatusToken::Completed && record.output_key.is_none() {
                if let Some(key) = &event.output_key {
                    record.output_key = Some(key.clone());
                    changed = true;
                }
            }
            return changed;
        }

        match token {
            StatusToken::Queued => {
                // Queued never demotes a record that already reached Processing.
                if record.status != ProcessingStatus::Processing
                    && (record.status != ProcessingStatus::Queued || record.progress != 0)
                {
                    record.status = ProcessingStatus::Queued;
                    record.progress = 0;
                    changed = true;
                }
            }
            StatusToken::Processing => {
                if record.status != ProcessingStatus::Processing {
                    record.status = ProcessingStatus::Processing;
                    changed = true;
                }
                if let Some(progress) = event.progress {
                    if record.adopt_progress(progress) {
                        changed = true;
                    }
                }
                // Stored, but not authoritative until completion.
                if let Some(key) = &event.output_key {
                    if record.output_key.as_deref() != Some(key.as_str()) {
                        record.output_key = Some(key.clone());
                        changed = true;
                    }
                }
            }
            StatusToken::Completed => {
                record.complete();
                if let Some(key) = &event.output_key {
                    record.output_key = Some(key.clone());
                }
                changed = true;
            }
            StatusToken::Failed => {
                record.fail(
                    event
                        .error
                        .clone()
                        .unwrap_or_else(|| "Unknown error".to_string()),
                );
                changed = true;
            }
        }

        changed
    }
}
