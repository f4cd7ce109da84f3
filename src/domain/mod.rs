//! Core domain types for a conversion run
//!
//! Everything here lives for one invocation only.

use serde::{Deserialize, Serialize};
use std::path::{Component, Path, PathBuf};

use crate::error::GenerationError;
use crate::registry::{Format, Provider};

/// An input file as read from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Path as given on the command line
    pub path: PathBuf,

    /// Raw UTF-8 content
    pub content: String,
}

/// Documentation texts for one format, in URL order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSet {
    pub format: Format,
    pub documents: Vec<String>,
}

/// One file of the model's structured output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFile {
    /// Output path relative to the output directory
    pub path: String,

    /// Complete file content
    pub content: String,
}

/// Provider-reported token accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

impl Usage {
    pub fn total_tokens(&self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Validated result of one structured-generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generation {
    pub files: Vec<GeneratedFile>,
    pub usage: Usage,
}

#[derive(Deserialize)]
struct FileSetPayload {
    files: Vec<GeneratedFile>,
}

impl Generation {
    /// Validate a raw `{files: [...]}` payload against the file-set contract.
    pub fn from_payload(payload: serde_json::Value, usage: Usage) -> Result<Self, GenerationError> {
        let parsed: FileSetPayload = serde_json::from_value(payload)
            .map_err(|e| GenerationError::MalformedOutput(e.to_string()))?;
        Self::validated(parsed.files, usage)
    }

    /// Same as [`Generation::from_payload`] for payloads delivered as JSON text.
    pub fn from_json_text(text: &str, usage: Usage) -> Result<Self, GenerationError> {
        let parsed: FileSetPayload = serde_json::from_str(text)
            .map_err(|e| GenerationError::MalformedOutput(e.to_string()))?;
        Self::validated(parsed.files, usage)
    }

    fn validated(files: Vec<GeneratedFile>, usage: Usage) -> Result<Self, GenerationError> {
        if files.is_empty() {
            return Err(GenerationError::EmptyFileSet);
        }
        for file in &files {
            check_output_path(&file.path)?;
        }
        Ok(Self { files, usage })
    }
}

/// Output paths must be non-empty and stay inside the output directory.
fn check_output_path(path: &str) -> Result<(), GenerationError> {
    let invalid = |reason| GenerationError::InvalidPath { path: path.to_string(), reason };
    if path.trim().is_empty() {
        return Err(invalid("path is empty"));
    }
    let p = Path::new(path);
    if p.has_root() {
        return Err(invalid("absolute paths are not allowed"));
    }
    if p.components().any(|c| matches!(c, Component::ParentDir | Component::Prefix(_))) {
        return Err(invalid("path escapes the output directory"));
    }
    Ok(())
}

/// What a completed run did, for the final report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionSummary {
    pub from: Format,
    pub to: Format,
    pub provider: Provider,
    pub model: String,
    pub written: Vec<PathBuf>,
    pub usage: Usage,
}
