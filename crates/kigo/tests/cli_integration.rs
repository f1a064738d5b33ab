//! CLI integration tests for the Kigo command-line interface.
//!
//! These tests never bind a socket: they cover help output, config
//! resolution, and startup failures that happen before the server runs.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Get a command for the kigo binary.
fn kigo() -> Command {
    let mut cmd = Command::cargo_bin("kigo").unwrap();
    cmd.env_remove("KIGO_CONFIG").env_remove("KIGO_BIND");
    cmd
}

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("kigo.toml");
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_help_lists_subcommands() {
    kigo()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("start"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_config_prints_file_values() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[session]\ncookie_name = \"oauthstate\"\n");

    kigo()
        .arg("--config")
        .arg(&path)
        .args(["config", "--providers"])
        .assert()
        .success()
        .stdout(predicate::str::contains("cookie_name = \"oauthstate\""))
        .stdout(predicate::str::contains("max_lifetime_secs = 3600"))
        .stdout(predicate::str::contains("registered providers: memory"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    kigo()
        .arg("--config")
        .arg(dir.path().join("absent.toml"))
        .arg("config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn test_start_rejects_unknown_provider() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[session]\nprovider = \"database\"\n");

    kigo()
        .arg("--config")
        .arg(&path)
        .arg("start")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown session provider: database"));
}

#[test]
fn test_start_rejects_zero_lifetime() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");

    kigo()
        .arg("--config")
        .arg(&path)
        .args(["start", "--max-lifetime", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("max lifetime must be non-zero"));
}

#[test]
fn test_start_rejects_bad_bind() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "");

    kigo()
        .arg("--config")
        .arg(&path)
        .args(["start", "--bind", "not-an-address"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("server.bind"));
}
