//! Health check handlers.

use std::time::Instant;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

/// Health response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

/// Health check endpoint (liveness probe).
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub checks: ReadinessChecks,
}

#[derive(Serialize)]
pub struct ReadinessChecks {
    pub storage: CheckStatus,
}

#[derive(Serialize)]
pub struct CheckStatus {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl CheckStatus {
    fn ok(latency_ms: u64) -> Self {
        Self {
            status: "ok".to_string(),
            error: None,
            latency_ms: Some(latency_ms),
        }
    }

    fn error(msg: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            error: Some(msg.into()),
            latency_ms: None,
        }
    }
}

/// Readiness probe: the record store is in-process, so the object store is
/// the only external dependency worth checking.
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let start = Instant::now();
    let storage = match state.storage.check_connectivity().await {
        Ok(()) => CheckStatus::ok(start.elapsed().as_millis() as u64),
        Err(e) => CheckStatus::error(e.to_string()),
    };

    let all_ok = storage.status == "ok";
    let response = ReadinessResponse {
        status: if all_ok { "ready" } else { "not_ready" }.to_string(),
        checks: ReadinessChecks { storage },
    };

    let code = if all_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::testutil::{FakeDispatcher, FakeObjectStore};
    use fview_store::MemoryVideoStore;
    use std::sync::Arc;

    fn state(storage: Arc<FakeObjectStore>) -> AppState {
        AppState::with_collaborators(
            ApiConfig::default(),
            Arc::new(MemoryVideoStore::new()),
            storage,
            Arc::new(FakeDispatcher::ok("h")),
            "http://backend:8082/api/videos/processing-callback".to_string(),
        )
    }

    #[tokio::test]
    async fn test_ready_probes_storage() {
        let (code, Json(body)) = ready(State(state(Arc::new(FakeObjectStore::new())))).await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(body.status, "ready");
        assert_eq!(body.checks.storage.status, "ok");
        assert!(body.checks.storage.latency_ms.is_some());
    }

    #[tokio::test]
    async fn test_ready_reports_storage_outage() {
        let storage = Arc::new(FakeObjectStore::new());
        storage.fail_connectivity();

        let (code, Json(body)) = ready(State(state(storage))).await;
        assert_eq!(code, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, "not_ready");
        assert_eq!(body.checks.storage.status, "error");
        assert!(body.checks.storage.error.is_some());
    }
}
