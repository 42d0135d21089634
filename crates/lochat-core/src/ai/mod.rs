//! Model server layer
//!
//! Talks to an Ollama-compatible server: request building, NDJSON stream
//! decoding, cancellation, prompt modes and reasoning extraction.

pub mod client;
pub mod controller;
pub mod models;
pub mod ndjson;
pub mod prompts;
pub mod reasoning;
pub mod types;

#[cfg(test)]
pub(crate) mod test_server;

pub use client::{ChatClient, ChatClientConfig};
pub use controller::{CancelHandle, ChatOutcome, RequestController};
pub use prompts::PromptMode;
