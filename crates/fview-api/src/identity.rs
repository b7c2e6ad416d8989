//! Owner identity extraction.
//!
//! Authentication lives at the edge gateway; by the time a request reaches
//! this service the verified principal arrives as the `X-User-ID` header.

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::ApiError;

/// The authenticated owner of the request.
#[derive(Debug, Clone)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for OwnerId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get("x-user-id")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| OwnerId(s.to_string()))
            .ok_or_else(|| ApiError::unauthorized("Missing X-User-ID header"))
    }
}
