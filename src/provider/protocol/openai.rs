//! `OpenAI` chat completion wire format types

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::Usage;

// -- Request types --

/// Chat completion request constrained to a JSON schema
#[derive(Debug, Clone, Serialize)]
pub struct OpenAiRequest {
    pub model: String,
    pub messages: Vec<OpenAiMessage>,
    pub response_format: OpenAiResponseFormat,
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenAiMessage {
    /// "system" or "user"
    pub role: String,
    pub content: String,
}

impl OpenAiMessage {
    pub fn new(role: &str, content: &str) -> Self {
        Self { role: role.to_string(), content: content.to_string() }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OpenAiResponseFormat {
    JsonSchema { json_schema: OpenAiJsonSchema },
}

#[derive(Debug, Clone, Serialize)]
pub struct OpenAiJsonSchema {
    pub name: String,
    /// Strict mode makes the model follow the schema exactly
    pub strict: bool,
    pub schema: Value,
}

// -- Response types --

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiResponse {
    pub choices: Vec<OpenAiChoice>,
    #[serde(default)]
    pub usage: Option<OpenAiUsage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiChoice {
    pub message: OpenAiChoiceMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiChoiceMessage {
    /// Schema-constrained JSON text
    #[serde(default)]
    pub content: Option<String>,
    /// Set instead of `content` when the model declines
    #[serde(default)]
    pub refusal: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct OpenAiUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl From<OpenAiUsage> for Usage {
    fn from(usage: OpenAiUsage) -> Self {
        Usage { prompt_tokens: usage.prompt_tokens, completion_tokens: usage.completion_tokens }
    }
}
