//! The chat relay: parameter sanitizing, message formatting, token fan-out
//! and per-stream cancellation.

pub mod format;
pub mod hub;
pub mod relay;
pub mod sanitize;
pub mod streams;

pub use relay::{ChatRelay, ChatRequest, RelayError};
