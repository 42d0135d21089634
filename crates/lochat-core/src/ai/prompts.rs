//! Prompt modes
//!
//! Each mode fixes the system prompt and the sampling temperature used for a
//! turn. The set is closed; adding a mode means adding a variant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Conversation mode selected by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PromptMode {
    #[default]
    Chat,
    Creative,
    Code,
    Research,
    DeepResearch,
}

impl PromptMode {
    /// All modes in menu order
    pub const ALL: [PromptMode; 5] = [
        PromptMode::Chat,
        PromptMode::Creative,
        PromptMode::Code,
        PromptMode::Research,
        PromptMode::DeepResearch,
    ];

    /// Stable identifier (also the serialized form)
    pub fn id(self) -> &'static str {
        match self {
            PromptMode::Chat => "chat",
            PromptMode::Creative => "creative",
            PromptMode::Code => "code",
            PromptMode::Research => "research",
            PromptMode::DeepResearch => "deep-research",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PromptMode::Chat => "Chat",
            PromptMode::Creative => "Creative",
            PromptMode::Code => "Code",
            PromptMode::Research => "Research",
            PromptMode::DeepResearch => "Deep Research",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PromptMode::Chat => "General conversation",
            PromptMode::Creative => "Creative writing & ideas",
            PromptMode::Code => "Programming & debugging",
            PromptMode::Research => "Research & analysis",
            PromptMode::DeepResearch => "In-depth research",
        }
    }

    /// System prompt prepended to every request in this mode
    pub fn system_prompt(self) -> &'static str {
        match self {
            PromptMode::Chat => {
                "You are a helpful AI assistant. Provide clear, concise responses."
            }
            PromptMode::Creative => {
                "You are a creative AI assistant. Generate imaginative, engaging, and original \
                 content. Think outside the box and provide unique perspectives."
            }
            PromptMode::Code => {
                "You are an expert programming assistant. Provide well-commented code, explain \
                 solutions, and follow best practices. Support multiple languages."
            }
            PromptMode::Research => {
                "You are a research assistant. Provide detailed, well-sourced answers with \
                 citations. Be thorough and cite credible sources."
            }
            PromptMode::DeepResearch => {
                "You are an advanced research assistant. Conduct comprehensive research, analyze \
                 multiple sources, and provide detailed insights with citations."
            }
        }
    }

    /// Default sampling temperature
    pub fn temperature(self) -> f32 {
        match self {
            PromptMode::Chat => 0.7,
            PromptMode::Creative => 0.9,
            PromptMode::Code => 0.2,
            PromptMode::Research => 0.5,
            PromptMode::DeepResearch => 0.4,
        }
    }
}

impl fmt::Display for PromptMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Unknown prompt mode name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown prompt mode '{0}' (expected one of: chat, creative, code, research, deep-research)")]
pub struct UnknownPromptMode(pub String);

impl FromStr for PromptMode {
    type Err = UnknownPromptMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        PromptMode::ALL
            .into_iter()
            .find(|mode| mode.id() == normalized)
            .ok_or_else(|| UnknownPromptMode(s.to_string()))
    }
}

/// Wrap a query in the structured research request
pub fn research_prompt(query: &str) -> String {
    format!(
        "Please conduct in-depth research on the following query and provide:\n\
         1. A comprehensive answer\n\
         2. Key findings and insights\n\
         3. Multiple perspectives on the topic\n\
         4. Recommendations for further reading\n\
         \n\
         Query: {}",
        query
    )
}

/// Wrap content in the structured analysis request
pub fn analysis_prompt(content: &str, kind: &str) -> String {
    format!(
        "Please analyze the following {} content and provide insights:\n\
         \n\
         {}\n\
         \n\
         Please structure your analysis with:\n\
         1. Summary\n\
         2. Key points\n\
         3. Strengths\n\
         4. Areas for improvement\n\
         5. Recommendations",
        kind, content
    )
}
