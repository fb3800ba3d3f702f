//! Integration tests for basic CLI behavior.
//!
//! Tests that the binary accepts its flags and reports the outcome of runs
//! that never reach the network.

#![allow(deprecated)] // cargo_bin deprecation

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper: get a Command for the `clearfetch` binary.
fn clearfetch() -> Command {
    Command::cargo_bin("clearfetch").expect("binary 'clearfetch' should be built")
}

/// Write a config pointing at `cookie_file` and artifacts inside `dir`.
fn write_config(dir: &Path, cookie_file: &Path) -> std::path::PathBuf {
    let config = dir.join("config.toml");
    let body = format!(
        "cookie_file = '{}'\noutput_dir = '{}'\ntimeout_secs = 5\n",
        cookie_file.display(),
        dir.display()
    );
    std::fs::write(&config, body).expect("write config");
    config
}

fn workspace() -> TempDir {
    tempfile::tempdir().expect("tempdir")
}

// ─── Flags ───────────────────────────────────────────────────────────────────

#[test]
fn help_flag_shows_usage() {
    clearfetch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage: clearfetch"))
        .stdout(predicate::str::contains("--url"));
}

#[test]
fn version_flag_shows_semver() {
    clearfetch()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^clearfetch \d+\.\d+\.\d+\n$").unwrap());
}

#[test]
fn unknown_flag_is_rejected() {
    clearfetch()
        .arg("--no-such-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unexpected argument"));
}

#[test]
fn url_flag_requires_value() {
    clearfetch().arg("--url").assert().failure();
}

// ─── Offline runs ────────────────────────────────────────────────────────────

#[test]
fn missing_clearance_cookie_warns_and_exits_zero() {
    let dir = workspace();
    let cookie_file = dir.path().join("captured_cookies.json");
    std::fs::write(
        &cookie_file,
        r#"{"timestamp": "2025-02-20T09:41:07", "cookies": [{"name": "lang", "value": "de"}]}"#,
    )
    .unwrap();
    let config = write_config(dir.path(), &cookie_file);

    clearfetch()
        .env("CLEARFETCH_CONFIG", &config)
        .args(["--url", "https://shop.example/basket"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Starting fetch"))
        .stdout(predicate::str::contains("completed with warnings"))
        .stdout(predicate::str::contains("no cf_clearance cookie found"));

    assert!(!dir.path().join("final_page.html").exists());
}

#[test]
fn missing_cookie_file_fails() {
    let dir = workspace();
    let config = write_config(dir.path(), &dir.path().join("absent.json"));

    clearfetch()
        .env("CLEARFETCH_CONFIG", &config)
        .args(["--url", "https://shop.example/basket"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Fetch failed"))
        .stderr(predicate::str::contains("absent.json"));
}

#[test]
fn invalid_config_fails() {
    let dir = workspace();
    let config = dir.path().join("config.toml");
    std::fs::write(&config, "timeout_secs = \"soon\"\n").unwrap();

    clearfetch()
        .env("CLEARFETCH_CONFIG", &config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to load configuration"));
}
