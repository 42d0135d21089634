//! lochat core - shared library for the terminal chat client
//!
//! This crate provides:
//! - Streaming client for Ollama-compatible servers (NDJSON decoding, cancellation)
//! - Prompt modes and reasoning extraction
//! - Session store with snapshot persistence (SQLite)
//! - Configuration and paths

pub mod ai;
pub mod chat;
pub mod config;
pub mod constants;
pub mod error;
pub mod paths;
pub mod storage;

// Re-exports for convenience
pub use ai::client::{ChatClient, ChatClientConfig};
pub use ai::controller::{CancelHandle, ChatOutcome, RequestController};
pub use ai::prompts::PromptMode;
pub use ai::reasoning::{is_thinking, split_reasoning, ReasoningSplit};
pub use chat::{run_turn, TurnOutcome};
pub use config::AppConfig;
pub use error::{ChatError, ConfigError, PersistenceError};
pub use storage::{Database, Message, MessageRole, Session, SessionStore};
