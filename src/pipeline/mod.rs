//! Conversion pipeline
//!
//! One run walks these stages in order:
//!
//! `ParsingArgs -> ValidatingCredentials -> ReadingInput -> FetchingDocs -> Generating ->
//! AwaitingConfirmation -> WritingOutput -> Done`
//!
//! Any stage may fail, which ends the run. A "no" at the confirmation step ends it cleanly with
//! nothing written. Collaborators (documentation source, generator factory, credentials,
//! confirmation, progress) are passed in so every stage can be exercised with stubs.

pub mod confirm;
pub mod credentials;
pub mod progress;

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::Config;
use crate::domain::{ConversionSummary, GeneratedFile, SourceFile};
use crate::error::ConvertError;
use crate::fetch::{fetch_pair, DocumentSource};
use crate::prompt::build_prompt;
use crate::provider::GeneratorFactory;
use crate::registry::{provider_for_model, Format, Provider};

use confirm::Confirm;
use credentials::{require_credential, CredentialSource};
use progress::{Progress, SilentProgress};

static SILENT: SilentProgress = SilentProgress;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ParsingArgs,
    ValidatingCredentials,
    ReadingInput,
    FetchingDocs,
    Generating,
    AwaitingConfirmation,
    WritingOutput,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::ParsingArgs => "parsing-args",
            Stage::ValidatingCredentials => "validating-credentials",
            Stage::ReadingInput => "reading-input",
            Stage::FetchingDocs => "fetching-docs",
            Stage::Generating => "generating",
            Stage::AwaitingConfirmation => "awaiting-confirmation",
            Stage::WritingOutput => "writing-output",
            Stage::Done => "done",
        };
        f.write_str(name)
    }
}

/// Unvalidated user selection, as collected from flags and config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionRequest {
    pub from: String,
    pub to: String,
    pub provider: Option<String>,
    pub model: Option<String>,
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
    /// Where `provider` and `model` were set; they always come from the same place.
    pub selection_origin: SelectionOrigin,
}

/// Source of the provider/model selection, used to word validation errors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionOrigin {
    #[default]
    CommandLine,
    /// `x-context.toml` or `X_CONTEXT_*` variables
    Config,
}

impl SelectionOrigin {
    fn label(self, key: &str) -> String {
        match self {
            SelectionOrigin::CommandLine => format!("--{key}"),
            SelectionOrigin::Config => format!("{key}{}", self.note()),
        }
    }

    fn note(self) -> &'static str {
        match self {
            SelectionOrigin::CommandLine => "",
            SelectionOrigin::Config => " (from configuration)",
        }
    }
}

/// A request that passed validation, with provider and model resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionPlan {
    pub from: Format,
    pub to: Format,
    pub provider: Provider,
    pub model: String,
    pub inputs: Vec<PathBuf>,
    pub output_dir: PathBuf,
}

impl ConversionPlan {
    /// Validate every field, collecting all violations before failing.
    pub fn from_request(request: &ConversionRequest) -> Result<Self, ConvertError> {
        let mut violations = Vec::new();

        let from = keep(&mut violations, "--from", request.from.parse::<Format>());
        let to = keep(&mut violations, "--to", request.to.parse::<Format>());
        if let (Some(from), Some(to)) = (from, to) {
            if from == to {
                violations
                    .push(format!("--from and --to must be different formats (both are '{from}')"));
            }
        }

        let origin = request.selection_origin;
        let provider = request
            .provider
            .as_deref()
            .and_then(|p| keep(&mut violations, &origin.label("provider"), p.parse::<Provider>()));
        let model_owner = request
            .model
            .as_deref()
            .and_then(|m| keep(&mut violations, &origin.label("model"), provider_for_model(m)));

        let provider = match (provider, model_owner) {
            (Some(provider), Some(owner)) if provider != owner => {
                violations.push(format!(
                    "model '{}'{} belongs to the {} provider, not {}",
                    request.model.as_deref().unwrap_or_default().trim(),
                    origin.note(),
                    owner,
                    provider
                ));
                None
            }
            (Some(provider), _) => Some(provider),
            (None, Some(owner)) => Some(owner),
            (None, None) => {
                if request.provider.is_none() && request.model.is_none() {
                    violations.push(
                        "--provider is required (or pass --model to infer it)".to_string(),
                    );
                }
                None
            }
        };

        if request.inputs.is_empty() {
            violations.push("at least one input file is required".to_string());
        }

        match (from, to, provider) {
            (Some(from), Some(to), Some(provider)) if violations.is_empty() => Ok(Self {
                from,
                to,
                provider,
                model: request
                    .model
                    .as_deref()
                    .map(|m| m.trim().to_string())
                    .unwrap_or_else(|| provider.default_model().to_string()),
                inputs: request.inputs.clone(),
                output_dir: request.output_dir.clone(),
            }),
            _ => Err(ConvertError::Validation(violations)),
        }
    }
}

fn keep<T, E: fmt::Display>(violations: &mut Vec<String>, flag: &str, parsed: Result<T, E>) -> Option<T> {
    match parsed {
        Ok(value) => Some(value),
        Err(e) => {
            violations.push(format!("{flag}: {e}"));
            None
        }
    }
}

/// How a run ended without error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed(ConversionSummary),
    /// The user declined; nothing was written.
    Declined { planned: Vec<PathBuf> },
}

/// Drives one conversion through all stages.
pub struct Converter<'a> {
    docs: &'a dyn DocumentSource,
    generators: &'a dyn GeneratorFactory,
    credentials: &'a dyn CredentialSource,
    confirm: &'a dyn Confirm,
    progress: &'a dyn Progress,
    doc_urls: HashMap<Format, Vec<String>>,
}

impl<'a> Converter<'a> {
    pub fn new(
        docs: &'a dyn DocumentSource,
        generators: &'a dyn GeneratorFactory,
        credentials: &'a dyn CredentialSource,
        confirm: &'a dyn Confirm,
    ) -> Self {
        Self {
            docs,
            generators,
            credentials,
            confirm,
            progress: &SILENT,
            doc_urls: urls_from(&Config::default()),
        }
    }

    pub fn progress(mut self, progress: &'a dyn Progress) -> Self {
        self.progress = progress;
        self
    }

    /// Use the documentation URLs from `config`, including `[docs]` overrides.
    pub fn config(mut self, config: &Config) -> Self {
        self.doc_urls = urls_from(config);
        self
    }

    pub async fn convert(&self, request: &ConversionRequest) -> Result<Outcome, ConvertError> {
        enter(Stage::ParsingArgs);
        let plan = ConversionPlan::from_request(request)?;
        info!(
            from = %plan.from,
            to = %plan.to,
            provider = %plan.provider,
            model = %plan.model,
            inputs = plan.inputs.len(),
            "conversion planned"
        );

        enter(Stage::ValidatingCredentials);
        let api_key = require_credential(plan.provider, self.credentials)?;
        let generator = self.generators.build(plan.provider, &plan.model, api_key);

        enter(Stage::ReadingInput);
        self.progress.start("Reading source context files...");
        let sources = self.track(read_sources(&plan.inputs), "Failed to read source files")?;
        self.progress.succeed(&format!("Read {} source file(s)", sources.len()));

        enter(Stage::FetchingDocs);
        self.progress.start(&format!(
            "Fetching {} and {} documentation...",
            plan.from.display_name(),
            plan.to.display_name()
        ));
        let fetched = fetch_pair(
            self.docs,
            (plan.from, self.urls(plan.from)),
            (plan.to, self.urls(plan.to)),
        )
        .await;
        let (source_docs, target_docs) = self.track(fetched, "Failed to fetch documentation")?;
        self.progress.succeed("Documentation fetched");

        enter(Stage::Generating);
        let prompt = build_prompt(plan.from, plan.to, &source_docs, &target_docs, &sources);
        debug!(
            system_bytes = prompt.system.len(),
            user_bytes = prompt.user.len(),
            "prompt assembled"
        );
        self.progress.start(&format!(
            "Converting with {} ({})...",
            generator.provider().display_name(),
            generator.model()
        ));
        let generated = generator.generate(&prompt).await.map_err(ConvertError::from);
        let generation = self.track(generated, "Conversion failed")?;
        self.progress.succeed(&format!("Generated {} file(s)", generation.files.len()));

        enter(Stage::AwaitingConfirmation);
        let planned: Vec<PathBuf> =
            generation.files.iter().map(|f| plan.output_dir.join(&f.path)).collect();
        let approved = self
            .confirm
            .confirm_writes(&planned)
            .map_err(|e| ConvertError::io("<stdin>", e))?;
        if !approved {
            info!("write declined by user");
            return Ok(Outcome::Declined { planned });
        }

        enter(Stage::WritingOutput);
        self.progress.start("Writing converted files...");
        let written =
            self.track(write_files(&plan.output_dir, &generation.files), "Failed to write files")?;
        self.progress.succeed("Files written successfully");

        enter(Stage::Done);
        Ok(Outcome::Completed(ConversionSummary {
            from: plan.from,
            to: plan.to,
            provider: plan.provider,
            model: plan.model,
            written,
            usage: generation.usage,
        }))
    }

    fn urls(&self, format: Format) -> &[String] {
        self.doc_urls.get(&format).map(Vec::as_slice).unwrap_or_default()
    }

    fn track<T>(&self, result: Result<T, ConvertError>, failure: &str) -> Result<T, ConvertError> {
        if result.is_err() {
            self.progress.fail(failure);
        }
        result
    }
}

fn enter(stage: Stage) {
    debug!(%stage, "entering stage");
}

fn urls_from(config: &Config) -> HashMap<Format, Vec<String>> {
    Format::ALL.into_iter().map(|format| (format, config.doc_urls(format))).collect()
}

/// Read every input as UTF-8. The first unreadable path aborts the run.
pub fn read_sources(paths: &[PathBuf]) -> Result<Vec<SourceFile>, ConvertError> {
    paths
        .iter()
        .map(|path| {
            let content = fs::read_to_string(path).map_err(|e| ConvertError::io(path, e))?;
            debug!(path = %path.display(), bytes = content.len(), "read source file");
            Ok(SourceFile { path: path.clone(), content })
        })
        .collect()
}

/// Write generated files under `output_dir`, creating parent directories.
///
/// Not transactional: files written before a failure stay on disk.
pub fn write_files(output_dir: &Path, files: &[GeneratedFile]) -> Result<Vec<PathBuf>, ConvertError> {
    let mut written = Vec::with_capacity(files.len());
    for file in files {
        let target = output_dir.join(&file.path);
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
        }
        fs::write(&target, &file.content).map_err(|e| ConvertError::io(&target, e))?;
        info!(path = %target.display(), bytes = file.content.len(), "wrote file");
        written.push(target);
    }
    Ok(written)
}
