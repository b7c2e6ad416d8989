//! Shared test doubles for the service layer.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use fview_ai_client::{Dispatch, DispatchAck, DispatchError, DispatchResult, ProcessingRequest};
use fview_models::{CallbackEvent, VideoId};
use fview_storage::{ObjectStore, StorageError, StorageResult};

/// Dispatcher returning a programmed result and counting calls.
pub struct FakeDispatcher {
    result: Result<String, DispatchError>,
    calls: AtomicU32,
}

impl FakeDispatcher {
    pub fn ok(job_id: &str) -> Self {
        Self {
            result: Ok(job_id.to_string()),
            calls: AtomicU32::new(0),
        }
    }

    pub fn err(error: DispatchError) -> Self {
        Self {
            result: Err(error),
            calls: AtomicU32::new(0),
        }
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Dispatch for FakeDispatcher {
    async fn dispatch(&self, _request: &ProcessingRequest) -> DispatchResult<DispatchAck> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.result {
            Ok(job_id) => Ok(DispatchAck {
                job_id: job_id.clone(),
            }),
            Err(e) => Err(e.clone()),
        }
    }
}

/// Object store recording deletions; failure modes are switchable.
pub struct FakeObjectStore {
    deleted: Mutex<Vec<String>>,
    missing: Mutex<Vec<String>>,
    fail_deletes: AtomicBool,
    fail_connectivity: AtomicBool,
}

impl FakeObjectStore {
    pub fn new() -> Self {
        Self {
            deleted: Mutex::new(Vec::new()),
            missing: Mutex::new(Vec::new()),
            fail_deletes: AtomicBool::new(false),
            fail_connectivity: AtomicBool::new(false),
        }
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn fail_connectivity(&self) {
        self.fail_connectivity.store(true, Ordering::SeqCst);
    }

    /// Make `exists` report false for this key.
    pub fn mark_missing(&self, key: &str) {
        self.missing.lock().unwrap().push(key.to_string());
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn exists(&self, key: &str) -> StorageResult<bool> {
        Ok(!self.missing.lock().unwrap().iter().any(|k| k == key))
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StorageError::delete_failed("simulated outage"));
        }
        self.deleted.lock().unwrap().push(key.to_string());
        Ok(())
    }

    async fn check_connectivity(&self) -> StorageResult<()> {
        if self.fail_connectivity.load(Ordering::SeqCst) {
            return Err(StorageError::AwsSdk("simulated outage".to_string()));
        }
        Ok(())
    }

    async fn presigned_get_url(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        Ok(format!(
            "https://fake.test/{key}?expires={}",
            expires_in.as_secs()
        ))
    }
}

/// Minimal callback event for a video, tweaked via [`CallbackEventExt`].
pub fn callback(id: &VideoId, status: &str) -> CallbackEvent {
    CallbackEvent {
        video_id: id.to_string(),
        user_id: None,
        status: status.to_string(),
        progress: None,
        message: None,
        output_key: None,
        analytics: None,
        error: None,
    }
}

/// Builder-style tweaks for test callback events.
pub trait CallbackEventExt: Sized {
    fn progress(self, p: i64) -> Self;
    fn output_key(self, key: &str) -> Self;
    fn user(self, user_id: &str) -> Self;
    fn message(self, msg: &str) -> Self;
    fn error(self, msg: &str) -> Self;
    fn analytics_str(self, raw: &str) -> Self;
}

impl CallbackEventExt for CallbackEvent {
    fn progress(mut self, p: i64) -> Self {
        self.progress = Some(p);
        self
    }

    fn output_key(mut self, key: &str) -> Self {
        self.output_key = Some(key.to_string());
        self
    }

    fn user(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    fn message(mut self, msg: &str) -> Self {
        self.message = Some(msg.to_string());
        self
    }

    fn error(mut self, msg: &str) -> Self {
        self.error = Some(msg.to_string());
        self
    }

    fn analytics_str(mut self, raw: &str) -> Self {
        self.analytics = Some(serde_json::Value::String(raw.to_string()));
        self
    }
}
