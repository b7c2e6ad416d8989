//! Inbound callback acceptor for the AI service.

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::debug;

use fview_models::CallbackEvent;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Acknowledgement returned to the AI service.
#[derive(Serialize)]
pub struct CallbackResponse {
    pub status: String,
}

/// Accept a processing progress callback.
///
/// This endpoint is reached only over the internal network; the event's
/// own user id is verified against the record instead of a caller header.
pub async fn processing_callback(
    State(state): State<AppState>,
    Json(event): Json<CallbackEvent>,
) -> ApiResult<Json<CallbackResponse>> {
    debug!(
        "Callback for video {}: status={} progress={:?}",
        event.video_id, event.status, event.progress
    );

    state
        .processing
        .apply_callback(&event)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(CallbackResponse {
        status: "accepted".to_string(),
    }))
}
