//! Video API handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use tracing::info;

use fview_models::VideoId;

use crate::error::ApiResult;
use crate::identity::OwnerId;
use crate::services::{NewVideo, StartOutcome};
use crate::state::AppState;

/// Response for a newly registered video.
#[derive(Serialize)]
pub struct RegisterVideoResponse {
    pub video_id: String,
    pub status: String,
    pub created_at: String,
}

/// Register an already-uploaded video for processing.
pub async fn register_video(
    State(state): State<AppState>,
    owner: OwnerId,
    Json(body): Json<NewVideo>,
) -> ApiResult<(StatusCode, Json<RegisterVideoResponse>)> {
    let record = state.query.register_video(owner.as_str(), body).await?;
    Ok((
        StatusCode::CREATED,
        Json(RegisterVideoResponse {
            video_id: record.video_id.to_string(),
            status: record.status.as_str().to_string(),
            created_at: record.created_at.to_rfc3339(),
        }),
    ))
}

/// Response for a start-processing command.
#[derive(Serialize)]
pub struct StartProcessingResponse {
    /// processing | already_completed | failed
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Kick off AI processing for a video.
///
/// Always answers 202 once the command was accepted; a dispatch failure is
/// reported in the body, with the record already moved to Failed.
pub async fn start_processing(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(video_id): Path<String>,
) -> ApiResult<(StatusCode, Json<StartProcessingResponse>)> {
    let id = VideoId::from(video_id.as_str());
    let outcome = state.processing.start_processing(&id, owner.as_str()).await?;

    let response = match outcome {
        StartOutcome::Started { job_handle } => StartProcessingResponse {
            status: "processing".to_string(),
            job_id: job_handle,
            error: None,
        },
        StartOutcome::AlreadyCompleted => StartProcessingResponse {
            status: "already_completed".to_string(),
            job_id: None,
            error: None,
        },
        StartOutcome::DispatchFailed { message, .. } => StartProcessingResponse {
            status: "failed".to_string(),
            job_id: None,
            error: Some(message),
        },
    };
    Ok((StatusCode::ACCEPTED, Json(response)))
}

/// Presigned download URL response.
#[derive(Serialize)]
pub struct DownloadUrlResponse {
    pub download_url: String,
    pub expires_in_secs: u64,
}

/// Get a presigned download URL for the processed output.
pub async fn get_download_url(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(video_id): Path<String>,
) -> ApiResult<Json<DownloadUrlResponse>> {
    let id = VideoId::from(video_id.as_str());
    let url = state.query.get_download_url(&id, owner.as_str()).await?;
    Ok(Json(DownloadUrlResponse {
        download_url: url,
        expires_in_secs: state.config.download_url_ttl.as_secs(),
    }))
}

/// Get the analytics for a video.
pub async fn get_analytics(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(video_id): Path<String>,
) -> ApiResult<Json<crate::services::query::AnalyticsView>> {
    let id = VideoId::from(video_id.as_str());
    let view = state.query.get_analytics(&id, owner.as_str()).await?;
    Ok(Json(view))
}

/// Get the team-statistics section of the analytics.
pub async fn get_team_stats(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(video_id): Path<String>,
) -> ApiResult<Json<crate::services::query::AnalyticsSection>> {
    let id = VideoId::from(video_id.as_str());
    let section = state
        .query
        .analytics_section(&id, owner.as_str(), "team_stats")
        .await?;
    Ok(Json(section))
}

/// Get the speed and distance section of the analytics.
pub async fn get_speed_distance(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(video_id): Path<String>,
) -> ApiResult<Json<crate::services::query::AnalyticsSection>> {
    let id = VideoId::from(video_id.as_str());
    let section = state
        .query
        .analytics_section(&id, owner.as_str(), "speed_analysis")
        .await?;
    Ok(Json(section))
}

/// Delete a video and its stored objects.
pub async fn delete_video(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(video_id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = VideoId::from(video_id.as_str());
    state.query.delete_video(&id, owner.as_str()).await?;
    info!("Video {} deleted by {}", id, owner.as_str());
    Ok(StatusCode::NO_CONTENT)
}
