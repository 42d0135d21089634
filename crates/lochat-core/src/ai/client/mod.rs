//! Model client
//!
//! HTTP transport to an Ollama-compatible server:
//! - Streaming chat (`POST /api/chat`, NDJSON body)
//! - Non-streaming chat
//! - Installed model listing (`GET /api/tags`, see [`crate::ai::models`])

pub mod config;
pub mod core;
pub mod simple;
pub mod streaming;

pub use config::ChatClientConfig;
pub use core::ChatClient;
pub use streaming::FragmentStream;
