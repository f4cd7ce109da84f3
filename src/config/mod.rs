//! Configuration loading
//!
//! Layers, lowest to highest: built-in defaults, `x-context.toml` (or `--config`), `X_CONTEXT_*`
//! environment variables, then command-line overrides via [`merge_cli_with_config`].

mod merge;

pub use merge::{merge_cli_with_config, CliOverrides};

use figment::providers::{Env, Format as _, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::ConvertError;
use crate::registry::Format;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "x-context.toml";

/// Prefix for environment overrides; nested keys use `__` (e.g. `X_CONTEXT_ENDPOINTS__OPENAI`).
pub const ENV_PREFIX: &str = "X_CONTEXT_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Provider used when none is given on the command line
    pub provider: Option<String>,

    /// Model used when none is given on the command line
    pub model: Option<String>,

    /// Directory generated paths are resolved against
    pub output_dir: PathBuf,

    /// Write without asking for confirmation
    pub assume_yes: bool,

    /// Provider API base URLs
    pub endpoints: Endpoints,

    /// Documentation URL overrides keyed by format id
    pub docs: BTreeMap<String, Vec<String>>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            output_dir: PathBuf::from("."),
            assume_yes: false,
            endpoints: Endpoints::default(),
            docs: BTreeMap::new(),
        }
    }
}

/// Base URL overrides for the provider APIs. `None` uses the public endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub openai: Option<String>,
    pub anthropic: Option<String>,
    pub gemini: Option<String>,
}

impl Config {
    /// Documentation URLs for `format`, honouring `[docs]` overrides.
    pub fn doc_urls(&self, format: Format) -> Vec<String> {
        match self.docs.get(format.id()) {
            Some(urls) => urls.clone(),
            None => format.doc_urls().iter().map(|u| u.to_string()).collect(),
        }
    }

    fn check(&self) -> Result<(), ConvertError> {
        for (key, urls) in &self.docs {
            key.parse::<Format>().map_err(|e| ConvertError::Config(format!("[docs] {e}")))?;
            if urls.is_empty() {
                return Err(ConvertError::Config(format!("[docs] {key} has no URLs")));
            }
        }
        Ok(())
    }
}

/// Load configuration for a run started in `cwd`.
///
/// An explicit `config_path` must exist; the default file is optional.
pub fn load_config(cwd: &Path, config_path: Option<&Path>) -> Result<Config, ConvertError> {
    let file = match config_path {
        Some(path) => {
            if !path.is_file() {
                return Err(ConvertError::Config(format!(
                    "config file {} does not exist",
                    path.display()
                )));
            }
            path.to_path_buf()
        }
        None => cwd.join(DEFAULT_CONFIG_FILE),
    };

    tracing::debug!(file = %file.display(), "loading configuration");
    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&file))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .extract()
        .map_err(|e| ConvertError::Config(e.to_string()))?;
    config.check()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_default_file_yields_defaults() {
        let dir = TempDir::new().expect("temp dir");
        let config = load_config(dir.path(), None).expect("load");
        assert_eq!(config.output_dir, PathBuf::from("."));
        assert!(config.provider.is_none());
        assert_eq!(
            config.doc_urls(Format::Cursor),
            vec!["https://docs.cursor.com/context/rules".to_string()]
        );
    }

    #[test]
    fn file_values_and_doc_overrides_apply() {
        let dir = TempDir::new().expect("temp dir");
        fs::write(
            dir.path().join(DEFAULT_CONFIG_FILE),
            r#"
provider = "anthropic"
assume_yes = true

[endpoints]
anthropic = "http://127.0.0.1:9999/v1"

[docs]
copilot = ["http://docs.local/copilot.md", "http://docs.local/copilot-2.md"]
"#,
        )
        .expect("write config");

        let config = load_config(dir.path(), None).expect("load");
        assert_eq!(config.provider.as_deref(), Some("anthropic"));
        assert!(config.assume_yes);
        assert_eq!(config.endpoints.anthropic.as_deref(), Some("http://127.0.0.1:9999/v1"));
        assert_eq!(config.doc_urls(Format::Copilot).len(), 2);
        assert_eq!(config.doc_urls(Format::GeminiCli).len(), Format::GeminiCli.doc_urls().len());
    }

    #[test]
    fn unknown_docs_key_is_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[docs]\nwindsurf = [\"http://x\"]\n").expect("write config");

        let err = load_config(dir.path(), Some(&path)).unwrap_err();
        assert!(err.to_string().contains("unknown format 'windsurf'"));
    }

    #[test]
    fn explicit_config_must_exist() {
        let dir = TempDir::new().expect("temp dir");
        let err = load_config(dir.path(), Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConvertError::Config(_)));
    }
}
