//! DigitalOcean Spaces storage gateway.
//!
//! This crate provides:
//! - The `ObjectStore` trait consumed by the orchestration core
//! - A Spaces (S3 API) client: existence check, best-effort delete,
//!   presigned GET URLs with TTL

pub mod client;
pub mod error;
pub mod object_store;

pub use client::{SpacesClient, SpacesConfig};
pub use error::{StorageError, StorageResult};
pub use object_store::ObjectStore;
