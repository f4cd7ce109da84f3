//! Integration tests for CLI

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn x_context(workdir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("x-context"));
    cmd.current_dir(workdir)
        .env_remove("RUST_LOG")
        .env_remove("OPENAI_API_KEY")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("GOOGLE_GENERATIVE_AI_API_KEY");
    cmd
}

fn workdir_with_notes() -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    fs::write(dir.path().join("notes.md"), "Hello").expect("write notes");
    dir
}

#[test]
fn test_cli_version() {
    let dir = TempDir::new().expect("temp dir");
    x_context(dir.path())
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("x-context"));
}

#[test]
fn test_cli_help() {
    let dir = TempDir::new().expect("temp dir");
    x_context(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Convert AI coding assistant context files between tool formats"))
        .stdout(predicate::str::contains("--from"))
        .stdout(predicate::str::contains("Supported models:"))
        .stdout(predicate::str::contains("gpt-4.1"));
}

#[test]
fn test_missing_required_flag_exits_one() {
    let dir = workdir_with_notes();
    x_context(dir.path())
        .args(["--from", "claude-code", "notes.md"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--to"));
}

#[test]
fn test_same_format_exits_one() {
    let dir = workdir_with_notes();
    x_context(dir.path())
        .env("OPENAI_API_KEY", "sk-test")
        .args(["--from", "cursor", "--to", "cursor", "--provider", "openai", "notes.md"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--from and --to must be different formats"));
}

#[test]
fn test_reports_every_violation() {
    let dir = workdir_with_notes();
    x_context(dir.path())
        .args(["--from", "vim", "--to", "cursor", "--provider", "openai", "--model", "claude-opus-4-20250514", "notes.md"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown format 'vim'"))
        .stderr(predicate::str::contains(
            "model 'claude-opus-4-20250514' belongs to the anthropic provider, not openai",
        ));
}

#[test]
fn test_configured_provider_errors_name_the_config() {
    let dir = workdir_with_notes();
    fs::write(dir.path().join("x-context.toml"), "provider = \"mistral\"\n").expect("write config");
    x_context(dir.path())
        .args(["--from", "claude-code", "--to", "cursor", "notes.md"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("provider (from configuration): unknown provider 'mistral'"))
        .stderr(predicate::str::contains("--provider:").not());
}

#[test]
fn test_rust_log_enables_stage_logging() {
    let dir = workdir_with_notes();
    x_context(dir.path())
        .env("RUST_LOG", "debug")
        .args(["--from", "claude-code", "--to", "cursor", "--provider", "openai", "notes.md"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("entering stage"))
        .stderr(predicate::str::contains("OPENAI_API_KEY environment variable is required"));
}

#[test]
fn test_quiet_by_default() {
    let dir = workdir_with_notes();
    x_context(dir.path())
        .args(["--from", "claude-code", "--to", "cursor", "--provider", "openai", "notes.md"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("entering stage").not());
}

#[test]
fn test_missing_credential_exits_one() {
    let dir = workdir_with_notes();
    x_context(dir.path())
        .args(["--from", "claude-code", "--to", "gemini-cli", "--model", "gemini-2.5-pro", "notes.md"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("GOOGLE_GENERATIVE_AI_API_KEY environment variable is required"));
}

#[test]
fn test_unreadable_input_names_path() {
    let dir = TempDir::new().expect("temp dir");
    x_context(dir.path())
        .env("ANTHROPIC_API_KEY", "ant-test")
        .args(["--from", "copilot", "--to", "claude-code", "--provider", "anthropic", "missing.md"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("missing.md"));
}

async fn mock_services() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/docs/claude-code"))
        .respond_with(ResponseTemplate::new(200).set_body_string("CLAUDE.md holds project memory."))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/docs/cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Rules live in .cursor/rules."))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "content": "{\"files\":[{\"path\":\".cursor/rules/notes.mdc\",\"content\":\"Hello\"}]}"
                }
            }],
            "usage": {"prompt_tokens": 1200, "completion_tokens": 30}
        })))
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn write_config(dir: &Path, server: &MockServer) {
    let uri = server.uri();
    fs::write(
        dir.join("x-context.toml"),
        format!(
            "[endpoints]\nopenai = \"{uri}/v1\"\n\n[docs]\nclaude-code = [\"{uri}/docs/claude-code\"]\ncursor = [\"{uri}/docs/cursor\"]\n"
        ),
    )
    .expect("write config");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_end_to_end_conversion_writes_confirmed_files() {
    let server = mock_services().await;
    let dir = workdir_with_notes();
    write_config(dir.path(), &server);

    x_context(dir.path())
        .env("OPENAI_API_KEY", "sk-test")
        .args(["--from", "claude-code", "--to", "cursor", "--provider", "openai", "notes.md"])
        .write_stdin("y\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Files to be written:"))
        .stdout(predicate::str::contains("Files written:"))
        .stdout(predicate::str::contains(".cursor/rules/notes.mdc"))
        .stdout(predicate::str::contains("OpenAI (gpt-4.1)"))
        .stdout(predicate::str::contains("1,230 total"));

    let written = fs::read_to_string(dir.path().join(".cursor/rules/notes.mdc")).expect("read output");
    assert_eq!(written, "Hello");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_declined_confirmation_exits_zero_without_writing() {
    let server = mock_services().await;
    let dir = workdir_with_notes();
    write_config(dir.path(), &server);

    x_context(dir.path())
        .env("OPENAI_API_KEY", "sk-test")
        .args(["--from", "claude-code", "--to", "cursor", "--provider", "openai", "notes.md"])
        .write_stdin("n\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Operation cancelled."));

    assert!(!dir.path().join(".cursor").exists());
}
