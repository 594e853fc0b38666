//! Basic CLI E2E tests.
//!
//! Tests invoke CLI commands via cargo run against a throwaway config
//! directory and verify outputs.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

fn cli(config_dir: &Path) -> Command {
    let mut cmd = Command::new("cargo");
    cmd.args(["run", "-q", "-p", "taskfocus-cli", "--"])
        .env("TASKFOCUS_CONFIG_DIR", config_dir)
        .env_remove("RUST_LOG");
    cmd
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(config_dir: &Path, args: &[&str]) -> (String, String, i32) {
    let output = cli(config_dir)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

/// Run a CLI command feeding `input` on stdin.
fn run_cli_with_input(config_dir: &Path, args: &[&str], input: &str) -> (String, String, i32) {
    let mut child = cli(config_dir)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI command");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");
    let output = child.wait_with_output().expect("Failed to wait for CLI");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

#[test]
fn test_help() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("timer"));
    assert!(stdout.contains("config"));
}

#[test]
fn test_config_path_points_into_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with("config.toml"));
}

#[test]
fn test_config_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "timer.work_duration_min"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");
    assert!(dir.path().join("config.toml").exists());
}

#[test]
fn test_config_set_then_get() {
    let dir = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(dir.path(), &["config", "set", "timer.break_duration_min", "10"]);
    assert_eq!(code, 0);
    let (stdout, _, code) = run_cli(dir.path(), &["config", "get", "timer.break_duration_min"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "10");
}

#[test]
fn test_config_rejects_bad_values() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["config", "set", "timer.work_duration_min", "0"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));

    let (_, stderr, code) = run_cli(dir.path(), &["config", "get", "timer.nope"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown config key"));
}

#[test]
fn test_config_list_json() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(dir.path(), &["config", "list", "--json"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).expect("valid JSON");
    assert_eq!(parsed["timer"]["break_duration_min"], 5);
}

#[test]
fn test_offline_timer_refuses_to_start_todo_task() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli_with_input(
        dir.path(),
        &["timer", "run", "--offline", "--task-id", "t1"],
        "start\nquit\n",
    );
    assert_eq!(code, 0);
    assert!(stderr.contains("must be In Progress"));

    let last = stdout.lines().last().expect("final snapshot");
    let snapshot: serde_json::Value = serde_json::from_str(last).unwrap();
    assert_eq!(snapshot["running"], false);
    assert_eq!(snapshot["remaining_secs"], 1500);
}

#[test]
fn test_offline_timer_switches_kind() {
    let dir = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli_with_input(
        dir.path(),
        &["timer", "run", "--offline", "--task-id", "t1", "--break-min", "7"],
        "switch\nquit\n",
    );
    assert_eq!(code, 0);

    let last = stdout.lines().last().expect("final snapshot");
    let snapshot: serde_json::Value = serde_json::from_str(last).unwrap();
    assert_eq!(snapshot["kind"], "break");
    assert_eq!(snapshot["display"], "07:00");
}

#[test]
fn test_task_analytics_needs_user_id() {
    let dir = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(dir.path(), &["task", "analytics"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("api.user_id is not set"));
}
