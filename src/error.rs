//! Error taxonomy for a conversion run

use std::path::PathBuf;
use thiserror::Error;

use crate::registry::Provider;

/// Terminal failure of a conversion run. The binary maps every variant to exit code 1.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// Bad flags. Carries every violated constraint, not just the first.
    #[error("invalid arguments:\n{}", format_violations(.0))]
    Validation(Vec<String>),

    #[error("{var} environment variable is required for the {} provider", .provider.display_name())]
    Credential { provider: Provider, var: &'static str },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A documentation URL could not be fetched. Fetches are attempted once.
    #[error("failed to fetch documentation from {url}: {reason}")]
    DocumentationFetch { url: String, reason: String },

    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ConvertError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io { path: path.into(), source }
    }
}

fn format_violations(violations: &[String]) -> String {
    violations.iter().map(|v| format!("  - {v}")).collect::<Vec<_>>().join("\n")
}

/// Failure of the single structured-generation request.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The provider answered with a non-success status (auth, rate limit, quota, bad request).
    #[error("{} rejected the request ({status}): {message} (not retried)", .provider.display_name())]
    Rejected { provider: Provider, status: u16, message: String },

    #[error("request to {} failed: {message}", .provider.display_name())]
    Transport { provider: Provider, message: String },

    /// The model declined to answer or the response was blocked.
    #[error("model refused to produce output: {0}")]
    Refused(String),

    /// Output missing or not parseable against the file-set schema.
    #[error("model output does not match the file schema: {0}")]
    MalformedOutput(String),

    #[error("model returned no files")]
    EmptyFileSet,

    #[error("model returned an unusable file path '{path}': {reason}")]
    InvalidPath { path: String, reason: &'static str },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_lists_every_violation() {
        let err = ConvertError::Validation(vec![
            "--from and --to must be different formats (both are 'cursor')".to_string(),
            "unknown provider 'foo'".to_string(),
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("invalid arguments:"));
        assert!(msg.contains("  - --from and --to must be different"));
        assert!(msg.contains("  - unknown provider 'foo'"));
    }

    #[test]
    fn credential_error_names_variable() {
        let err = ConvertError::Credential {
            provider: Provider::Anthropic,
            var: Provider::Anthropic.credential_var(),
        };
        assert_eq!(
            err.to_string(),
            "ANTHROPIC_API_KEY environment variable is required for the Anthropic provider"
        );
    }
}
