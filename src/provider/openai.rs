//! OpenAI Chat Completions with a strict JSON schema response format

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::protocol::openai::{
    OpenAiJsonSchema, OpenAiMessage, OpenAiRequest, OpenAiResponse, OpenAiResponseFormat,
};
use super::{file_set_schema, send_json, Generator, FILE_SET_NAME};
use crate::domain::{Generation, Usage};
use crate::error::GenerationError;
use crate::prompt::PromptParts;
use crate::registry::Provider;

/// Default OpenAI API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

impl OpenAiGenerator {
    pub fn new(client: Client, base_url: Option<&str>, model: String, api_key: SecretString) -> Self {
        Self { client, base_url: super::base_url(base_url, DEFAULT_BASE_URL), model, api_key }
    }

    fn wire_request(&self, prompt: &PromptParts) -> OpenAiRequest {
        OpenAiRequest {
            model: self.model.clone(),
            messages: vec![
                OpenAiMessage::new("system", &prompt.system),
                OpenAiMessage::new("user", &prompt.user),
            ],
            response_format: OpenAiResponseFormat::JsonSchema {
                json_schema: OpenAiJsonSchema {
                    name: FILE_SET_NAME.to_string(),
                    strict: true,
                    schema: file_set_schema(),
                },
            },
        }
    }
}

#[async_trait]
impl Generator for OpenAiGenerator {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &PromptParts) -> Result<Generation, GenerationError> {
        debug!(model = %self.model, "requesting structured output from OpenAI");
        let request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&self.wire_request(prompt));
        let response: OpenAiResponse = send_json(Provider::OpenAi, request).await?;
        into_generation(response)
    }
}

fn into_generation(response: OpenAiResponse) -> Result<Generation, GenerationError> {
    let usage = response.usage.map(Usage::from).unwrap_or_default();
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::MalformedOutput("response has no choices".to_string()))?;

    if let Some(refusal) = choice.message.refusal {
        return Err(GenerationError::Refused(refusal));
    }
    let content = choice.message.content.ok_or_else(|| {
        let reason = choice.finish_reason.as_deref().unwrap_or("unknown");
        GenerationError::MalformedOutput(format!("message has no content (finish_reason: {reason})"))
    })?;
    Generation::from_json_text(&content, usage)
}
