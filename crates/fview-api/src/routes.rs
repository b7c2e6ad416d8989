//! API routes.

use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;

use crate::handlers::callbacks::processing_callback;
use crate::handlers::health::{health, ready};
use crate::handlers::video_status::{get_processing_status, list_user_videos};
use crate::handlers::videos::{
    delete_video, get_analytics, get_download_url, get_speed_distance, get_team_stats,
    register_video, start_processing,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{cors_layer, request_logging, security_headers};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let video_routes = Router::new()
        .route("/videos", post(register_video))
        .route("/videos", get(list_user_videos))
        // Internal callback endpoint; static segment, never captured by :video_id
        .route("/videos/processing-callback", post(processing_callback))
        .route("/videos/:video_id", delete(delete_video))
        .route("/videos/:video_id/process", post(start_processing))
        .route("/videos/:video_id/status", get(get_processing_status))
        .route("/videos/:video_id/analytics", get(get_analytics))
        .route("/videos/:video_id/analytics/team-stats", get(get_team_stats))
        .route(
            "/videos/:video_id/analytics/speed-distance",
            get(get_speed_distance),
        )
        .route("/videos/:video_id/download-url", get(get_download_url));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .nest("/api", video_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
