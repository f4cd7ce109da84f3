//! Anthropic Messages API wire format types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Usage;

// -- Request types --

#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    /// Required by Anthropic
    pub max_tokens: u32,
    /// Top-level system prompt
    pub system: String,
    pub messages: Vec<AnthropicMessage>,
    pub tools: Vec<AnthropicTool>,
    pub tool_choice: AnthropicToolChoice,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnthropicMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnthropicTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Only the forced single-tool choice is used
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicToolChoice {
    Tool { name: String },
}

// -- Response types --

#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicResponse {
    pub content: Vec<AnthropicResponseBlock>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: AnthropicUsage,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicResponseBlock {
    Text {
        text: String,
    },
    ToolUse {
        name: String,
        input: Value,
    },
    /// Block kinds this tool does not read (thinking, etc.)
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AnthropicUsage {
    #[serde(default)]
    pub input_tokens: u64,
    #[serde(default)]
    pub output_tokens: u64,
}

impl From<AnthropicUsage> for Usage {
    fn from(usage: AnthropicUsage) -> Self {
        Usage { prompt_tokens: usage.input_tokens, completion_tokens: usage.output_tokens }
    }
}
