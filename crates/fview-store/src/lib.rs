//! Video record persistence.
//!
//! This crate provides:
//! - The `VideoStore` trait: the seam to the persistence collaborator
//! - An in-memory implementation with version compare-and-swap
//! - A bounded retry helper for lost CAS races
//! - Store operation metrics

pub mod error;
pub mod memory;
pub mod metrics;
pub mod retry;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryVideoStore;
pub use retry::{retry_on_conflict, ConflictRetry};
pub use store::{RecordPage, VideoStore};
