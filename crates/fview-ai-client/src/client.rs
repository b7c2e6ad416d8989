//! AI service client implementation.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{DispatchError, DispatchResult};

/// Configuration for the AI service client.
#[derive(Debug, Clone)]
pub struct AiServiceConfig {
    /// Base URL of the AI service
    pub base_url: String,
    /// Base URL the AI service should post callbacks to
    pub callback_base_url: String,
    /// Timeout applied to the probe and the main call
    pub request_timeout: Duration,
}

impl Default for AiServiceConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            callback_base_url: "http://localhost:8082".to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl AiServiceConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("AI_SERVICE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            callback_base_url: std::env::var("CALLBACK_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8082".to_string()),
            request_timeout: Duration::from_secs(
                std::env::var("AI_REQUEST_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
        }
    }

    /// The callback URL handed to the AI service.
    pub fn callback_url(&self) -> String {
        format!(
            "{}/api/videos/processing-callback",
            self.callback_base_url.trim_end_matches('/')
        )
    }
}

/// Processing submission sent to the AI service.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingRequest {
    /// Video id, echoed back in callbacks
    pub video_id: String,
    /// Object-store key of the source video
    pub video_key: String,
    /// Owning user
    pub user_id: String,
    /// Where to post progress callbacks
    pub callback_url: String,
    /// Run the service's stub pipeline instead of real analysis
    pub stub_mode: bool,
    /// Keep the source audio track in the rendered output
    pub preserve_audio: bool,
}

/// Acknowledgement from a successful submission.
#[derive(Debug, Clone, Deserialize)]
pub struct DispatchAck {
    /// Job handle assigned by the AI service
    pub job_id: String,
}

/// Dispatch seam consumed by the processing state machine.
#[async_trait]
pub trait Dispatch: Send + Sync {
    /// Probe the service, then submit the job. Never retries.
    async fn dispatch(&self, request: &ProcessingRequest) -> DispatchResult<DispatchAck>;
}

/// HTTP client for the Python AI service.
#[derive(Clone)]
pub struct AiServiceClient {
    http: reqwest::Client,
    config: AiServiceConfig,
}

impl AiServiceClient {
    /// Create a new client from configuration.
    pub fn new(config: AiServiceConfig) -> DispatchResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DispatchError::Unknown(e.to_string()))?;
        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> DispatchResult<Self> {
        Self::new(AiServiceConfig::from_env())
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &AiServiceConfig {
        &self.config
    }

    /// Liveness probe. Any failure classifies as ServiceUnavailable.
    pub async fn health(&self) -> DispatchResult<()> {
        let url = format!("{}/health", self.config.base_url.trim_end_matches('/'));
        debug!("Probing AI service health at {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| DispatchError::ServiceUnavailable(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(DispatchError::ServiceUnavailable(format!(
                "health check returned HTTP {}",
                response.status()
            )))
        }
    }
}

#[async_trait]
impl Dispatch for AiServiceClient {
    async fn dispatch(&self, request: &ProcessingRequest) -> DispatchResult<DispatchAck> {
        // Probe first: a dead service short-circuits before the main call.
        if let Err(e) = self.health().await {
            warn!("AI service health probe failed: {}", e);
            return Err(e);
        }

        let url = format!(
            "{}/internal/process-video",
            self.config.base_url.trim_end_matches('/')
        );
        info!(
            "Dispatching video {} to AI service (callback: {})",
            request.video_id, request.callback_url
        );

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(DispatchError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DispatchError::RejectedByService {
                status: status.as_u16(),
                body,
            });
        }

        let ack: DispatchAck = response
            .json()
            .await
            .map_err(|e| DispatchError::Unknown(format!("invalid dispatch response: {}", e)))?;

        info!(
            "AI service accepted video {} as job {}",
            request.video_id, ack.job_id
        );
        Ok(ack)
    }
}
