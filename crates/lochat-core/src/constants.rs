//! Application constants and configuration defaults
//!
//! Centralized location for magic numbers and default values

use std::time::Duration;

/// HTTP client configuration
pub mod http {
    use super::*;

    /// Connection timeout for HTTP requests
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Streaming timeout - local models on slow hardware can take minutes per answer
    pub const STREAM_TIMEOUT: Duration = Duration::from_secs(600);

    /// Timeout for the model listing call
    pub const LIST_TIMEOUT: Duration = Duration::from_secs(10);
}

/// Model server configuration
pub mod ai {
    /// Default model server base URL (Ollama's default port)
    pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

    /// Environment variable overriding the base URL
    pub const BASE_URL_ENV: &str = "OLLAMA_BASE_URL";

    /// Default model ID
    pub const DEFAULT_MODEL: &str = "hrbrmstr/jamba:latest";

    /// Models offered when the server cannot be reached
    pub const FALLBACK_MODELS: &[&str] = &["mistral", "neural-chat"];

    /// Default nucleus sampling
    pub const DEFAULT_TOP_P: f32 = 0.9;

    /// Default top-k sampling
    pub const DEFAULT_TOP_K: u32 = 40;

    /// Text shown in place of an assistant reply when the request failed
    pub const FAILED_RESPONSE_TEXT: &str = "Error: Failed to get response. Is Ollama running?";
}

/// Storage configuration
pub mod storage {
    /// Key of the single snapshot record
    pub const SNAPSHOT_KEY: &str = "chatStore";

    /// Title given to sessions created without one
    pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

    /// Database file name inside the data directory
    pub const DATABASE_FILE: &str = "lochat.db";
}

/// UI configuration
pub mod ui {
    /// Config directory name
    pub const CONFIG_DIR_NAME: &str = ".lochat";

    /// Config file name inside the config directory
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}
