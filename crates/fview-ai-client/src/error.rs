//! Dispatch error classification.

use thiserror::Error;

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;

/// A failed dispatch attempt, classified.
///
/// Every class is terminal for the current attempt: the client never
/// retries internally. Retry, if desired, is a fresh start-processing call.
#[derive(Debug, Clone, Error)]
pub enum DispatchError {
    /// The AI service could not be reached (probe failure, connection
    /// error, or timeout).
    #[error("AI service unavailable: {0}")]
    ServiceUnavailable(String),

    /// The AI service answered with a non-2xx response.
    #[error("AI service rejected the request: HTTP {status} - {body}")]
    RejectedByService { status: u16, body: String },

    /// Anything else.
    #[error("AI service error: {0}")]
    Unknown(String),
}

impl DispatchError {
    /// Stable label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            DispatchError::ServiceUnavailable(_) => "service_unavailable",
            DispatchError::RejectedByService { .. } => "rejected_by_service",
            DispatchError::Unknown(_) => "unknown",
        }
    }

    /// Classify a transport-level error.
    pub fn from_transport(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            DispatchError::ServiceUnavailable(e.to_string())
        } else {
            DispatchError::Unknown(e.to_string())
        }
    }
}
