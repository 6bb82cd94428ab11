//! Model backend integration.
//!
//! Provides an OpenAI-compatible client that fetches one response per
//! (model, prompt) pair under a caller-supplied timeout.

mod client;

pub use client::{ModelClient, ModelResponse};
