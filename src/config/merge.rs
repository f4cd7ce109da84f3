//! CLI argument merging with config

use super::Config;
use std::path::PathBuf;

#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub provider: Option<String>,
    pub model: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub assume_yes: Option<bool>,
}

impl CliOverrides {
    /// True when `--provider` or `--model` was given.
    pub fn selects_model(&self) -> bool {
        self.provider.is_some() || self.model.is_some()
    }
}

/// Apply command-line values on top of the loaded config.
///
/// Provider and model are one selection: if either is given on the command line, both configured
/// values are replaced so a configured provider never conflicts with a `--model` of another one.
pub fn merge_cli_with_config(mut base_config: Config, cli: CliOverrides) -> Config {
    if cli.selects_model() {
        base_config.provider = cli.provider;
        base_config.model = cli.model;
    }

    if let Some(output_dir) = cli.output_dir {
        base_config.output_dir = output_dir;
    }
    if let Some(assume_yes) = cli.assume_yes {
        base_config.assume_yes = assume_yes;
    }

    base_config
}
