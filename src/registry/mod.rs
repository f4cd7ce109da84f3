//! Supported formats, providers and models
//!
//! Everything here is static data. Lookups fail with [`RegistryError`] for identifiers outside
//! the closed sets so callers can reject bad input before touching the network.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Lookup failures for identifiers outside the supported sets.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("unknown format '{0}' (expected one of: {list})", list = Format::id_list())]
    UnknownFormat(String),

    #[error("unknown provider '{0}' (expected one of: {list})", list = Provider::id_list())]
    UnknownProvider(String),

    #[error("unknown model '{0}' (run with --help for the list of supported models)")]
    UnknownModel(String),
}

/// An AI coding assistant's context file convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    ClaudeCode,
    Copilot,
    Cursor,
    GeminiCli,
}

impl Format {
    pub const ALL: [Format; 4] =
        [Format::ClaudeCode, Format::Copilot, Format::Cursor, Format::GeminiCli];

    /// Identifier used on the command line and in config files.
    pub fn id(self) -> &'static str {
        match self {
            Format::ClaudeCode => "claude-code",
            Format::Copilot => "copilot",
            Format::Cursor => "cursor",
            Format::GeminiCli => "gemini-cli",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Format::ClaudeCode => "Claude Code",
            Format::Copilot => "GitHub Copilot",
            Format::Cursor => "Cursor",
            Format::GeminiCli => "Gemini CLI",
        }
    }

    /// Reference documents describing the format, in prompt order.
    pub fn doc_urls(self) -> &'static [&'static str] {
        match self {
            Format::ClaudeCode => &["https://docs.anthropic.com/en/docs/claude-code/memory"],
            Format::Copilot => &[
                "https://docs.github.com/en/copilot/how-tos/configure-custom-instructions/add-repository-instructions",
            ],
            Format::Cursor => &["https://docs.cursor.com/context/rules"],
            Format::GeminiCli => &[
                "https://raw.githubusercontent.com/google-gemini/gemini-cli/main/docs/cli/configuration.md",
            ],
        }
    }

    /// Where the format's files conventionally live, phrased for the model.
    pub fn output_guidance(self) -> &'static str {
        match self {
            Format::ClaudeCode => {
                "Claude Code reads project memory from a file named `CLAUDE.md` in the project root. \
                 Write a single `CLAUDE.md` unless the source clearly describes separate \
                 subdirectory memories, which go in `<subdir>/CLAUDE.md`."
            }
            Format::Copilot => {
                "GitHub Copilot reads repository-wide instructions from \
                 `.github/copilot-instructions.md`. Path-specific instructions go in \
                 `.github/instructions/<name>.instructions.md` with an `applyTo` glob in YAML \
                 front matter. Prefer the single repository-wide file."
            }
            Format::Cursor => {
                "Cursor reads project rules from `.cursor/rules/<name>.mdc`. Each rule file starts \
                 with YAML front matter (`description`, `globs`, `alwaysApply`) followed by \
                 markdown. Use a descriptive kebab-case rule name."
            }
            Format::GeminiCli => {
                "Gemini CLI reads instructional context from a file named `GEMINI.md` in the \
                 project root. Write a single `GEMINI.md`."
            }
        }
    }

    fn id_list() -> String {
        Self::ALL.iter().map(|f| f.id()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Format {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.id() == needle)
            .ok_or_else(|| RegistryError::UnknownFormat(s.to_string()))
    }
}

/// An LLM vendor used to perform the conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    OpenAi,
    Anthropic,
    Gemini,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Anthropic, Provider::Gemini];

    pub fn id(self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Gemini => "gemini",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Provider::OpenAi => "OpenAI",
            Provider::Anthropic => "Anthropic",
            Provider::Gemini => "Google Gemini",
        }
    }

    /// Environment variable holding the provider's API key.
    pub fn credential_var(self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Gemini => "GOOGLE_GENERATIVE_AI_API_KEY",
        }
    }

    pub fn default_model(self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4.1",
            Provider::Anthropic => "claude-sonnet-4-20250514",
            Provider::Gemini => "gemini-2.5-flash",
        }
    }

    pub fn models(self) -> &'static [&'static str] {
        match self {
            Provider::OpenAi => &[
                "gpt-4.1",
                "gpt-4.1-mini",
                "gpt-4.1-nano",
                "gpt-4o",
                "gpt-4o-mini",
                "o3",
                "o3-mini",
                "o4-mini",
            ],
            Provider::Anthropic => &[
                "claude-opus-4-20250514",
                "claude-sonnet-4-20250514",
                "claude-3-7-sonnet-20250219",
                "claude-3-5-sonnet-20241022",
                "claude-3-5-haiku-20241022",
            ],
            Provider::Gemini => &[
                "gemini-2.5-pro",
                "gemini-2.5-flash",
                "gemini-2.5-flash-lite",
                "gemini-2.0-flash",
                "gemini-1.5-pro",
                "gemini-1.5-flash",
            ],
        }
    }

    pub fn supports_model(self, model: &str) -> bool {
        self.models().contains(&model)
    }

    fn id_list() -> String {
        Self::ALL.iter().map(|p| p.id()).collect::<Vec<_>>().join(", ")
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Provider {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|p| p.id() == needle)
            .ok_or_else(|| RegistryError::UnknownProvider(s.to_string()))
    }
}

static MODEL_OWNERS: Lazy<HashMap<&'static str, Provider>> = Lazy::new(|| {
    let mut owners = HashMap::new();
    for provider in Provider::ALL {
        for model in provider.models() {
            owners.insert(*model, provider);
        }
    }
    owners
});

/// Provider that owns `model`.
pub fn provider_for_model(model: &str) -> Result<Provider, RegistryError> {
    MODEL_OWNERS
        .get(model.trim())
        .copied()
        .ok_or_else(|| RegistryError::UnknownModel(model.to_string()))
}

/// One line per provider listing its models, default first. Used in `--help`.
pub fn model_overview() -> String {
    Provider::ALL
        .iter()
        .map(|p| format!("{}: {} (default: {})", p.id(), p.models().join(", "), p.default_model()))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn formats_round_trip_through_ids() {
        for format in Format::ALL {
            assert_eq!(format.id().parse::<Format>(), Ok(format));
            assert!(!format.doc_urls().is_empty());
        }
        assert_eq!("Claude-Code".parse::<Format>(), Ok(Format::ClaudeCode));
    }

    #[test]
    fn unknown_identifiers_are_rejected() {
        assert_eq!(
            "windsurf".parse::<Format>(),
            Err(RegistryError::UnknownFormat("windsurf".to_string()))
        );
        assert_eq!(
            "mistral".parse::<Provider>(),
            Err(RegistryError::UnknownProvider("mistral".to_string()))
        );
        assert_eq!(
            provider_for_model("gpt-2"),
            Err(RegistryError::UnknownModel("gpt-2".to_string()))
        );
    }

    #[test]
    fn no_model_is_shared_between_providers() {
        let mut seen = HashSet::new();
        for provider in Provider::ALL {
            for model in provider.models() {
                assert!(seen.insert(*model), "model {model} listed twice");
                assert_eq!(provider_for_model(model), Ok(provider));
            }
        }
    }

    #[test]
    fn default_models_belong_to_their_provider() {
        for provider in Provider::ALL {
            assert!(provider.supports_model(provider.default_model()));
        }
    }

    #[test]
    fn unknown_format_message_lists_supported_ids() {
        let msg = RegistryError::UnknownFormat("vim".to_string()).to_string();
        assert!(msg.contains("claude-code, copilot, cursor, gemini-cli"));
    }
}
