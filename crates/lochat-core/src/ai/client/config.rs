//! Model client configuration

use crate::ai::prompts::PromptMode;
use crate::ai::types::SamplingOptions;
use crate::config::AppConfig;
use crate::constants;

/// Configuration for the model client
#[derive(Debug, Clone, PartialEq)]
pub struct ChatClientConfig {
    /// Server root, e.g. `http://localhost:11434`
    pub base_url: String,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for ChatClientConfig {
    fn default() -> Self {
        Self {
            base_url: constants::ai::DEFAULT_BASE_URL.to_string(),
            top_p: constants::ai::DEFAULT_TOP_P,
            top_k: constants::ai::DEFAULT_TOP_K,
        }
    }
}

impl From<&AppConfig> for ChatClientConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            top_p: config.top_p,
            top_k: config.top_k,
        }
    }
}

impl ChatClientConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// `POST` target for chat turns
    pub fn chat_url(&self) -> String {
        self.endpoint("/api/chat")
    }

    /// `GET` target for the installed model list
    pub fn tags_url(&self) -> String {
        self.endpoint("/api/tags")
    }

    /// Sampling for a request in `mode`
    pub fn sampling(&self, mode: PromptMode) -> SamplingOptions {
        SamplingOptions {
            temperature: mode.temperature(),
            top_p: self.top_p,
            top_k: self.top_k,
        }
    }
}
