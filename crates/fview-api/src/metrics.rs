//! Prometheus metrics for the API server.

use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::time::Instant;

/// Initialize the Prometheus metrics recorder.
/// Returns a handle that can be used to render metrics.
pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus recorder")
}

/// Metric names as constants for consistency.
pub mod names {
    // HTTP metrics
    pub const HTTP_REQUESTS_TOTAL: &str = "fview_http_requests_total";
    pub const HTTP_REQUEST_DURATION_SECONDS: &str = "fview_http_request_duration_seconds";

    // Orchestration metrics
    pub const CALLBACKS_TOTAL: &str = "fview_callbacks_total";
    pub const CALLBACK_REJECTIONS_TOTAL: &str = "fview_callback_rejections_total";
    pub const DISPATCHES_TOTAL: &str = "fview_dispatches_total";
}

/// Record an HTTP request.
pub fn record_http_request(method: &str, path: &str, status: u16, duration_secs: f64) {
    let labels = [
        ("method", method.to_string()),
        ("path", sanitize_path(path)),
        ("status", status.to_string()),
    ];

    counter!(names::HTTP_REQUESTS_TOTAL, &labels).increment(1);
    histogram!(names::HTTP_REQUEST_DURATION_SECONDS, &labels).record(duration_secs);
}

/// Record an applied callback by status token.
pub fn record_callback(token: &str) {
    counter!(names::CALLBACKS_TOTAL, "token" => token.to_string()).increment(1);
}

/// Record a rejected callback by reason.
pub fn record_callback_rejection(reason: &'static str) {
    counter!(names::CALLBACK_REJECTIONS_TOTAL, "reason" => reason).increment(1);
}

/// Record a dispatch attempt outcome ("ok" or a failure class).
pub fn record_dispatch(outcome: &'static str) {
    counter!(names::DISPATCHES_TOTAL, "outcome" => outcome).increment(1);
}

/// Axum middleware recording request count and latency.
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req.uri().path().to_string();
    let start = Instant::now();

    let response = next.run(req).await;

    record_http_request(
        &method,
        &path,
        response.status().as_u16(),
        start.elapsed().as_secs_f64(),
    );
    response
}

/// Collapse id-like path segments to keep label cardinality bounded.
///
/// A segment counts as an id when it is all digits, or long and carrying at
/// least one digit (UUIDs). Long static route literals have no digits and
/// pass through untouched.
fn sanitize_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let all_digits = !segment.is_empty() && segment.chars().all(|c| c.is_ascii_digit());
            let long_with_digit =
                segment.len() >= 16 && segment.chars().any(|c| c.is_ascii_digit());
            if all_digits || long_with_digit {
                ":id"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_path_collapses_ids() {
        assert_eq!(
            sanitize_path("/api/videos/550e8400-e29b-41d4-a716-446655440000/status"),
            "/api/videos/:id/status"
        );
        assert_eq!(sanitize_path("/api/videos/12345/status"), "/api/videos/:id/status");
        assert_eq!(sanitize_path("/health"), "/health");
    }

    // Long static route literals must keep their own metric label.
    #[test]
    fn test_sanitize_path_keeps_static_segments() {
        assert_eq!(
            sanitize_path("/api/videos/processing-callback"),
            "/api/videos/processing-callback"
        );
        assert_eq!(
            sanitize_path("/api/videos/550e8400-e29b-41d4-a716-446655440000/download-url"),
            "/api/videos/:id/download-url"
        );
    }
}
