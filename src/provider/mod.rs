//! Model providers for structured generation
//!
//! Each provider turns a [`PromptParts`] into a validated [`Generation`] with exactly one HTTP
//! request. Nothing is retried; a rejected or malformed response is returned as-is.

pub mod anthropic;
pub mod gemini;
pub mod openai;
pub mod protocol;

use async_trait::async_trait;
use reqwest::{Client, Response};
use secrecy::SecretString;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::config::Endpoints;
use crate::domain::Generation;
use crate::error::GenerationError;
use crate::prompt::PromptParts;
use crate::registry::Provider;

pub use anthropic::AnthropicGenerator;
pub use gemini::GeminiGenerator;
pub use openai::OpenAiGenerator;

/// Name given to the schema / tool carrying the file set.
pub const FILE_SET_NAME: &str = "generated_files";

/// Uniform "generate structured output from prompt" capability.
///
/// `generate` makes exactly one provider request. Rate limits and transient failures surface as
/// errors instead of being retried.
#[async_trait]
pub trait Generator: Send + Sync {
    fn provider(&self) -> Provider;

    fn model(&self) -> &str;

    /// Issue a single structured-generation request.
    async fn generate(&self, prompt: &PromptParts) -> Result<Generation, GenerationError>;
}

/// Builds the generator for a resolved provider/model once, during setup.
pub trait GeneratorFactory: Send + Sync {
    fn build(&self, provider: Provider, model: &str, api_key: SecretString) -> Box<dyn Generator>;
}

/// Production factory backed by the providers' HTTP APIs.
#[derive(Debug, Clone, Default)]
pub struct HttpGeneratorFactory {
    client: Client,
    endpoints: Endpoints,
}

impl HttpGeneratorFactory {
    pub fn new(client: Client, endpoints: Endpoints) -> Self {
        Self { client, endpoints }
    }
}

impl GeneratorFactory for HttpGeneratorFactory {
    fn build(&self, provider: Provider, model: &str, api_key: SecretString) -> Box<dyn Generator> {
        let client = self.client.clone();
        let model = model.to_string();
        match provider {
            Provider::OpenAi => Box::new(OpenAiGenerator::new(
                client,
                self.endpoints.openai.as_deref(),
                model,
                api_key,
            )),
            Provider::Anthropic => Box::new(AnthropicGenerator::new(
                client,
                self.endpoints.anthropic.as_deref(),
                model,
                api_key,
            )),
            Provider::Gemini => Box::new(GeminiGenerator::new(
                client,
                self.endpoints.gemini.as_deref(),
                model,
                api_key,
            )),
        }
    }
}

/// JSON Schema for `{files: [{path, content}]}`.
pub fn file_set_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "files": {
                "type": "array",
                "minItems": 1,
                "items": {
                    "type": "object",
                    "properties": {
                        "path": {
                            "type": "string",
                            "description": "File path relative to the project root"
                        },
                        "content": {
                            "type": "string",
                            "description": "Complete file content"
                        }
                    },
                    "required": ["path", "content"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["files"],
        "additionalProperties": false
    })
}

fn base_url(configured: Option<&str>, default: &str) -> String {
    configured.unwrap_or(default).trim_end_matches('/').to_string()
}

/// Send a prepared request and decode the JSON body, mapping failures to [`GenerationError`].
async fn send_json<T: DeserializeOwned>(
    provider: Provider,
    request: reqwest::RequestBuilder,
) -> Result<T, GenerationError> {
    let response = request.send().await.map_err(|e| {
        tracing::error!(provider = %provider, error = %e, "provider request failed");
        GenerationError::Transport { provider, message: e.to_string() }
    })?;
    read_json(provider, response).await
}

async fn read_json<T: DeserializeOwned>(
    provider: Provider,
    response: Response,
) -> Result<T, GenerationError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::warn!(provider = %provider, status = %status, "provider returned error");
        return Err(GenerationError::Rejected {
            provider,
            status: status.as_u16(),
            message: error_message(&body),
        });
    }
    let body = response.bytes().await.map_err(|e| {
        tracing::error!(provider = %provider, error = %e, "failed to read provider response");
        GenerationError::Transport { provider, message: e.to_string() }
    })?;
    serde_json::from_slice(&body).map_err(|e| {
        GenerationError::MalformedOutput(format!(
            "unexpected {} response: {e}",
            provider.display_name()
        ))
    })
}

/// Pull `error.message` out of a provider error body, falling back to the raw text.
fn error_message(body: &str) -> String {
    serde_json::from_str::<protocol::ErrorResponse>(body)
        .map(|response| response.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_structured_body() {
        let body = r#"{"error":{"type":"authentication_error","message":"invalid x-api-key"}}"#;
        assert_eq!(error_message(body), "invalid x-api-key");
        assert_eq!(error_message(" upstream overloaded \n"), "upstream overloaded");
    }

    #[test]
    fn schema_requires_paths_and_content() {
        let schema = file_set_schema();
        assert_eq!(schema["required"], json!(["files"]));
        assert_eq!(schema["properties"]["files"]["minItems"], json!(1));
        assert_eq!(
            schema["properties"]["files"]["items"]["required"],
            json!(["path", "content"])
        );
    }

    #[test]
    fn factory_selects_backend_by_provider() {
        let factory = HttpGeneratorFactory::default();
        for provider in Provider::ALL {
            let generator = factory.build(
                provider,
                provider.default_model(),
                SecretString::from("key".to_string()),
            );
            assert_eq!(generator.provider(), provider);
            assert_eq!(generator.model(), provider.default_model());
        }
    }
}
