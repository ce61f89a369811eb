use std::fs;
use std::net::TcpListener;
use std::path::Path;
use std::process::{Command, Output};

use serde_json::Value;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn notion_tool(args: &[&str], api_key: Option<&str>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_notion-tool"));
    cmd.args(args).env_remove("NOTION_TOOL_LOG");
    match api_key {
        Some(key) => cmd.env("NOTION_API_KEY", key),
        None => cmd.env_remove("NOTION_API_KEY"),
    };
    cmd.output().expect("failed to run notion-tool")
}

fn envelope(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|err| {
        panic!(
            "stdout is not JSON ({err}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

/// Port on loopback with nothing listening.
fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

fn write_settings(dir: &Path, base_url: &str) -> String {
    let path = dir.join("notion-tool.yml");
    fs::write(&path, format!("base_url: \"{base_url}\"\ntimeout_secs: 5\n"))
        .expect("failed to write settings");
    path.to_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[test]
fn missing_api_key_reports_config_error() {
    let output = notion_tool(&["list-status", "--database", "db1"], None);

    assert!(!output.status.success());
    let json = envelope(&output);
    assert_eq!(json["success"], Value::Bool(false));
    assert_eq!(json["data"], Value::Null);
    let message = json["error"]["message"].as_str().unwrap();
    assert!(message.contains("NOTION_API_KEY"), "message: {message}");
    assert!(json["error"].get("status_code").is_none());
}

#[test]
fn unreadable_config_file_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("absent.yml");
    let output = notion_tool(
        &["schema", "-d", "db1", "--config", missing.to_str().unwrap()],
        Some("test-key"),
    );

    assert!(!output.status.success());
    let json = envelope(&output);
    assert!(
        json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("absent.yml")
    );
}

// ---------------------------------------------------------------------------
// Transport errors
// ---------------------------------------------------------------------------

#[test]
fn unreachable_api_reports_error_without_status_code() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_settings(
        dir.path(),
        &format!("http://127.0.0.1:{}/v1", closed_port()),
    );

    let output = notion_tool(
        &["query", "-d", "db1", "--status", "Done", "--config", &config],
        Some("test-key"),
    );

    assert!(!output.status.success());
    let json = envelope(&output);
    assert_eq!(json["success"], Value::Bool(false));
    assert!(json["error"]["message"].as_str().unwrap().starts_with("HTTP error"));
    assert!(json["error"].get("status_code").is_none());
}

// ---------------------------------------------------------------------------
// Argument surface
// ---------------------------------------------------------------------------

#[test]
fn help_lists_subcommands() {
    let output = notion_tool(&["--help"], None);
    assert!(output.status.success());

    let help = String::from_utf8_lossy(&output.stdout);
    for sub in ["read", "update-status", "query", "list-status", "list-tags", "schema"] {
        assert!(help.contains(sub), "help is missing {sub}:\n{help}");
    }
}

#[test]
fn missing_database_is_usage_error() {
    let output = notion_tool(&["list-tags"], Some("test-key"));
    assert_eq!(output.status.code(), Some(2));
    assert!(output.stdout.is_empty());
}
