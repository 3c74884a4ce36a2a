//! Inbound surfaces: the Telegram update loop and the HTTP health router.

pub mod commands;
pub mod health;
pub mod message;
pub mod updates;

pub use message::{MessagePipeline, PipelineLimits};
pub use updates::UpdateHandler;
