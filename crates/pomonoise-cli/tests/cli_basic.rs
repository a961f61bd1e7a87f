//! Basic CLI E2E tests.
//!
//! Each test runs the built binary with `HOME` pointed at a fresh temp
//! directory so config, work log and noise cache never touch the real ones.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

fn cli(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pomonoise"));
    cmd.env("HOME", home)
        .env_remove("POMONOISE_ENV")
        .env("RUST_LOG", "off");
    cmd
}

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = cli(home)
        .args(args)
        .output()
        .expect("Failed to execute CLI command");
    decode(output)
}

fn run_cli_with_stdin(home: &Path, args: &[&str], stdin: &str) -> (String, String, i32) {
    let mut child = cli(home)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn CLI command");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    decode(child.wait_with_output().unwrap())
}

fn decode(output: Output) -> (String, String, i32) {
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);
    (stdout, stderr, code)
}

#[test]
fn test_config_list_is_json_with_defaults() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "list"]);
    assert_eq!(code, 0);

    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value["timer"]["default_mode"], "focus25");
    assert_eq!(value["audio"]["noise_color"], "pink");
    assert_eq!(value["audio"]["alarm_enabled"], true);
    assert!(home.path().join(".config/pomonoise/config.toml").exists());
}

#[test]
fn test_config_set_then_get() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["config", "set", "audio.volume", "0.25"]);
    assert_eq!(code, 0);
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "audio.volume"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "0.25");

    let (_, _, code) = run_cli(home.path(), &["config", "set", "audio.noise_color", "brown"]);
    assert_eq!(code, 0);
    let (stdout, _, _) = run_cli(home.path(), &["config", "get", "audio.noise_color"]);
    assert_eq!(stdout.trim(), "brown");
}

#[test]
fn test_config_rejects_bad_values() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "audio.noise_color", "purple"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));

    let (_, _, code) = run_cli(home.path(), &["config", "get", "no.such.key"]);
    assert_ne!(code, 0);
}

#[test]
fn test_noise_path_is_under_data_dir() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["noise", "path"]);
    assert_eq!(code, 0);
    assert!(stdout.trim().ends_with(".config/pomonoise/noise"));
}

#[test]
fn test_noise_generate_writes_wav() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["noise", "generate", "white"]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("white: 220500 samples"));
    assert!(home.path().join(".config/pomonoise/noise/white.wav").exists());
    assert!(!home.path().join(".config/pomonoise/noise/pink.wav").exists());
}

#[test]
fn test_log_list_empty() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["log", "list", "--json"]);
    assert_eq!(code, 0);
    let value: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(value, serde_json::json!([]));

    let (stdout, _, code) = run_cli(home.path(), &["log", "list"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("no sessions logged yet"));
}

#[test]
fn test_run_quits_on_q() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli_with_stdin(
        home.path(),
        &["run", "--mode", "break5", "--color", "none"],
        "q\n",
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("Break 5"));
}

#[test]
fn test_run_mode_change_and_status() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli_with_stdin(
        home.path(),
        &["run", "--color", "none", "--paused"],
        "m focus50\ns\nq\n",
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("\"type\":\"StateSnapshot\""));
    assert!(stdout.contains("50:00"));
    assert!(stdout.contains("  0%"));
}

#[test]
fn test_run_rejects_unknown_color() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["run", "--color", "purple"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("unknown noise color"));
}
