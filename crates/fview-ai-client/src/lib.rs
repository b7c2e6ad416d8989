//! Client for the Python AI analysis service.
//!
//! This crate provides:
//! - The `Dispatch` trait: the seam the state machine dispatches through
//! - `AiServiceClient`: liveness probe + process submission over HTTP
//! - Failure classification into ServiceUnavailable / RejectedByService /
//!   Unknown; every classification is terminal for the attempt (no retries)

pub mod client;
pub mod error;


pub use client::{AiServiceClient, AiServiceConfig, Dispatch, DispatchAck, ProcessingRequest};
pub use error::{DispatchError, DispatchResult};
