//! Request handlers.

pub mod callbacks;
pub mod health;
pub mod video_status;
pub mod videos;

pub use callbacks::*;
pub use health::*;
pub use video_status::*;
pub use videos::*;
