//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run and verify outputs. Only commands
//! that stay offline are exercised here; networked flows are covered by the
//! core crate's mocked integration tests.

use std::process::Command;

/// Run a CLI command and return output.
fn run_cli(args: &[&str]) -> (String, String, i32) {
    let output = Command::new("cargo")
        .args(["run", "-p", "planbot-cli", "--"])
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_help_lists_subcommands() {
    let (stdout, _, code) = run_cli(&["--help"]);
    assert_eq!(code, 0, "help failed");
    assert!(stdout.contains("chat"));
    assert!(stdout.contains("extract"));
    assert!(stdout.contains("auth"));
    assert!(stdout.contains("config"));
}

#[test]
fn test_config_path() {
    let (stdout, _, code) = run_cli(&["config", "path"]);
    assert_eq!(code, 0, "config path failed");
    assert!(stdout.trim().ends_with("config.toml"));
}

#[test]
fn test_config_list() {
    let (stdout, _, code) = run_cli(&["config", "list"]);
    assert_eq!(code, 0, "config list failed");
    assert!(stdout.contains("[completion]"));
    assert!(stdout.contains("[google]"));
    assert!(stdout.contains("[todoist]"));
}

#[test]
fn test_auth_google_url() {
    let (stdout, _, code) = run_cli(&["auth", "google", "url"]);
    assert_eq!(code, 0, "auth google url failed");
    assert!(stdout.contains("https://accounts.google.com/o/oauth2/v2/auth?"));
}

#[test]
fn test_auth_todoist_url() {
    let (stdout, _, code) = run_cli(&["auth", "todoist", "url"]);
    assert_eq!(code, 0, "auth todoist url failed");
    assert!(stdout.contains("https://todoist.com/oauth/authorize?"));
}
