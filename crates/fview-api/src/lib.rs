//! Axum HTTP API server for FieldView.
//!
//! This crate provides:
//! - REST surface for registering, processing and polling match videos
//! - The processing state machine and the status/analytics read path
//! - Inbound callback acceptor for the AI service
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
mod testutil;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use services::{ProcessingService, QueryService};
pub use state::AppState;
