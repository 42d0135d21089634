//! Wire types for the model server's chat API
//!
//! Request and response shapes for `/api/chat` and `/api/tags`.

use serde::{Deserialize, Serialize};

/// Message role on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single `{role, content}` pair sent to the model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: Role,
    pub content: String,
}

impl WireMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling parameters for one request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

/// Body of `POST /api/chat`
///
/// Sampling is sent both at the top level and under `options`; Ollama reads
/// the latter, older proxies forwarded the former.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    pub stream: bool,
    #[serde(flatten)]
    pub sampling: SamplingOptions,
    pub options: SamplingOptions,
}

impl ChatRequest {
    pub fn new(
        model: impl Into<String>,
        messages: Vec<WireMessage>,
        stream: bool,
        sampling: SamplingOptions,
    ) -> Self {
        Self {
            model: model.into(),
            messages,
            stream,
            sampling,
            options: sampling,
        }
    }
}

/// `message` object inside a chat record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecordMessage {
    #[serde(default)]
    pub content: Option<String>,
}

/// One NDJSON record of a streaming response, or the whole non-streaming body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatRecord {
    #[serde(default)]
    pub message: Option<RecordMessage>,
    #[serde(default)]
    pub done: bool,
    /// Server-side error reported inside the stream
    #[serde(default)]
    pub error: Option<String>,
}

impl ChatRecord {
    /// Text carried by this record, if any
    pub fn content(&self) -> Option<&str> {
        self.message.as_ref().and_then(|m| m.content.as_deref())
    }
}

/// One entry of `GET /api/tags`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub modified_at: String,
    #[serde(default)]
    pub size: u64,
}

impl ModelInfo {
    /// Placeholder entry used when the server cannot be reached
    pub fn placeholder(name: &str) -> Self {
        Self {
            name: name.to_string(),
            modified_at: chrono::Utc::now().to_rfc3339(),
            size: 0,
        }
    }
}

/// Body of `GET /api/tags`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModelList {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
}
