//! Google Gemini `generateContent` with a JSON response schema

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use tracing::debug;

use super::protocol::gemini::{GeminiContent, GeminiGenerationConfig, GeminiRequest, GeminiResponse};
use super::{send_json, Generator};
use crate::domain::{Generation, Usage};
use crate::error::GenerationError;
use crate::prompt::PromptParts;
use crate::registry::Provider;

/// Default Google Generative Language API base URL
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

impl GeminiGenerator {
    pub fn new(client: Client, base_url: Option<&str>, model: String, api_key: SecretString) -> Self {
        Self { client, base_url: super::base_url(base_url, DEFAULT_BASE_URL), model, api_key }
    }

    fn generate_url(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn wire_request(&self, prompt: &PromptParts) -> GeminiRequest {
        GeminiRequest {
            system_instruction: GeminiContent::text(None, &prompt.system),
            contents: vec![GeminiContent::text(Some("user"), &prompt.user)],
            generation_config: GeminiGenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: response_schema(),
            },
        }
    }
}

/// The file-set schema in Gemini's OpenAPI subset (no `additionalProperties`).
fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "files": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "path": {"type": "STRING"},
                        "content": {"type": "STRING"}
                    },
                    "required": ["path", "content"],
                    "propertyOrdering": ["path", "content"]
                }
            }
        },
        "required": ["files"]
    })
}

#[async_trait]
impl Generator for GeminiGenerator {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &PromptParts) -> Result<Generation, GenerationError> {
        debug!(model = %self.model, "requesting structured output from Gemini");
        let request = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(&self.wire_request(prompt));
        let response: GeminiResponse = send_json(Provider::Gemini, request).await?;
        into_generation(response)
    }
}

fn into_generation(response: GeminiResponse) -> Result<Generation, GenerationError> {
    let usage = response.usage_metadata.map(Usage::from).unwrap_or_default();

    if let Some(reason) = response.prompt_feedback.and_then(|feedback| feedback.block_reason) {
        return Err(GenerationError::Refused(format!("prompt blocked ({reason})")));
    }
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::Refused("no candidates returned".to_string()))?;

    let text: String = candidate
        .content
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .unwrap_or_default();
    if text.is_empty() {
        let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
        return Err(GenerationError::MalformedOutput(format!(
            "candidate has no text (finishReason: {reason})"
        )));
    }
    Generation::from_json_text(&text, usage)
}
