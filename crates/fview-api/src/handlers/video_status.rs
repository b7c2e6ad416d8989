//! Status polling and listing handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use fview_models::VideoId;

use crate::error::ApiResult;
use crate::identity::OwnerId;
use crate::services::query::{StatusView, VideoPage};
use crate::state::AppState;

/// Get the processing status of a video, polled by the frontend.
pub async fn get_processing_status(
    State(state): State<AppState>,
    owner: OwnerId,
    Path(video_id): Path<String>,
) -> ApiResult<Json<StatusView>> {
    let id = VideoId::from(video_id.as_str());
    let view = state.query.status_view(&id, owner.as_str()).await?;
    Ok(Json(view))
}

/// Listing query parameters.
#[derive(Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub offset: Option<u32>,
}

/// List the caller's videos, newest first.
pub async fn list_user_videos(
    State(state): State<AppState>,
    owner: OwnerId,
    Query(params): Query<ListParams>,
) -> ApiResult<Json<VideoPage>> {
    let page = state
        .query
        .list_videos(owner.as_str(), params.limit, params.offset)
        .await?;
    Ok(Json(page))
}
