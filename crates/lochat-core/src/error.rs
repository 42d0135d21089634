//! Error types shared across the core
//!
//! Cancellation is deliberately absent here: a cancelled generation resolves
//! with [`crate::ai::controller::ChatOutcome::Cancelled`], not an error.

use thiserror::Error;

/// Failure talking to the model server
#[derive(Debug, Error)]
pub enum ChatError {
    /// Server answered with a non-success status
    #[error("request failed: {status} - {body}")]
    RequestFailed { status: u16, body: String },

    /// Network-level failure (connect, timeout, body read)
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-streaming response body did not have the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// Failure reading or writing the durable snapshot
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// SQLite error
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// Snapshot could not be (de)serialized
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend deliberately unavailable (tests, read-only mode)
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Failure loading the config file
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error
    #[error("io error reading config: {0}")]
    Io(#[from] std::io::Error),

    /// TOML syntax or type error
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}
