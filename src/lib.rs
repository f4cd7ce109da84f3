//! x-context: Convert AI coding assistant context files between tool formats
//!
//! Reads context files written for one assistant (Claude Code, GitHub Copilot, Cursor,
//! Gemini CLI), fetches documentation for the source and target formats and asks an LLM provider
//! for the converted file set as schema-constrained structured output.

pub mod cli;
pub mod config;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod registry;
pub mod utils;
