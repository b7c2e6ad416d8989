//! Domain services.

pub mod processing;
pub mod query;

pub use processing::{CallbackError, DispatchOptions, ProcessingService, StartOutcome};
pub use query::{NewVideo, QueryService};
