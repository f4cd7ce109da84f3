//! Anthropic Messages API with a single forced tool carrying the file set

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use super::protocol::anthropic::{
    AnthropicMessage, AnthropicRequest, AnthropicResponse, AnthropicResponseBlock, AnthropicTool,
    AnthropicToolChoice,
};
use super::{file_set_schema, send_json, Generator, FILE_SET_NAME};
use crate::domain::{Generation, Usage};
use crate::error::GenerationError;
use crate::prompt::PromptParts;
use crate::registry::Provider;

/// Default Anthropic API base URL
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Anthropic API version header value
const ANTHROPIC_VERSION: &str = "2023-06-01";

const MAX_OUTPUT_TOKENS: u32 = 8192;

pub struct AnthropicGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

impl AnthropicGenerator {
    pub fn new(client: Client, base_url: Option<&str>, model: String, api_key: SecretString) -> Self {
        Self { client, base_url: super::base_url(base_url, DEFAULT_BASE_URL), model, api_key }
    }

    fn wire_request(&self, prompt: &PromptParts) -> AnthropicRequest {
        AnthropicRequest {
            model: self.model.clone(),
            max_tokens: MAX_OUTPUT_TOKENS,
            system: prompt.system.clone(),
            messages: vec![AnthropicMessage {
                role: "user".to_string(),
                content: prompt.user.clone(),
            }],
            tools: vec![AnthropicTool {
                name: FILE_SET_NAME.to_string(),
                description: "Write the converted context files.".to_string(),
                input_schema: file_set_schema(),
            }],
            tool_choice: AnthropicToolChoice::Tool { name: FILE_SET_NAME.to_string() },
        }
    }
}

#[async_trait]
impl Generator for AnthropicGenerator {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &PromptParts) -> Result<Generation, GenerationError> {
        debug!(model = %self.model, "requesting structured output from Anthropic");
        let request = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.wire_request(prompt));
        let response: AnthropicResponse = send_json(Provider::Anthropic, request).await?;
        into_generation(response)
    }
}

fn into_generation(response: AnthropicResponse) -> Result<Generation, GenerationError> {
    let usage = Usage::from(response.usage);
    let input = response.content.into_iter().find_map(|block| match block {
        AnthropicResponseBlock::ToolUse { name, input } if name == FILE_SET_NAME => Some(input),
        _ => None,
    });
    let Some(input) = input else {
        let stop = response.stop_reason.as_deref().unwrap_or("unknown");
        return Err(GenerationError::MalformedOutput(format!(
            "no {FILE_SET_NAME} tool call in response (stop_reason: {stop})"
        )));
    };
    Generation::from_payload(input, usage)
}
