//! Chat message model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ai::prompts::PromptMode;
use crate::ai::types::WireMessage;

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One message of a session
///
/// User messages are fixed once appended; the trailing assistant message is
/// rewritten in place while its reply streams in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub role: MessageRole,
    pub content: String,
    /// Mode active when the message was created
    #[serde(default, alias = "promptType")]
    pub prompt_mode: PromptMode,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    /// Create a message with a fresh id
    pub fn new(role: MessageRole, content: impl Into<String>, prompt_mode: PromptMode) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            prompt_mode,
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>, prompt_mode: PromptMode) -> Self {
        Self::new(MessageRole::User, content, prompt_mode)
    }

    /// Empty assistant message that streamed text will fill
    pub fn assistant_placeholder(prompt_mode: PromptMode) -> Self {
        Self::new(MessageRole::Assistant, String::new(), prompt_mode)
    }

    /// Role/content pair for the request history
    pub fn to_wire(&self) -> WireMessage {
        match self.role {
            MessageRole::User => WireMessage::user(self.content.clone()),
            MessageRole::Assistant => WireMessage::assistant(self.content.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::types::Role;

    #[test]
    fn test_ids_are_unique() {
        let a = Message::user("hi", PromptMode::Chat);
        let b = Message::user("hi", PromptMode::Chat);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_placeholder_is_empty_assistant() {
        let msg = Message::assistant_placeholder(PromptMode::Code);
        assert_eq!(msg.role, MessageRole::Assistant);
        assert!(msg.content.is_empty());
        assert_eq!(msg.prompt_mode, PromptMode::Code);
    }

    #[test]
    fn test_to_wire() {
        let wire = Message::user("question", PromptMode::Chat).to_wire();
        assert_eq!(wire.role, Role::User);
        assert_eq!(wire.content, "question");
    }

    #[test]
    fn test_serialized_field_names() {
        let msg = Message::user("x", PromptMode::DeepResearch);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["promptMode"], "deep-research");
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_accepts_legacy_prompt_type_field() {
        let msg: Message = serde_json::from_str(
            r#"{"id":"m1","role":"assistant","content":"ok","promptType":"creative","timestamp":"2024-05-01T10:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(msg.prompt_mode, PromptMode::Creative);
    }
}
