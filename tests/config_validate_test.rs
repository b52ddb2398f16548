// Allow deprecated cargo_bin - the deprecation is for custom build-dir edge case
// which doesn't apply to this project. See: https://docs.rs/assert_cmd
#![allow(deprecated)]

use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_config_validate_with_valid_file() {
    let temp = tempfile::tempdir().unwrap();
    let config_path = temp.path().join("config.toml");
    fs::write(&config_path, "").unwrap();

    Command::cargo_bin("lostfound")
        .unwrap()
        .args(["config", "validate"])
        .env("LOSTFOUND_CONFIG", &config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration valid"));
}

#[test]
fn test_config_validate_with_no_file_uses_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let config_path = temp.path().join("missing.toml");

    Command::cargo_bin("lostfound")
        .unwrap()
        .args(["config", "validate"])
        .env("LOSTFOUND_CONFIG", &config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "No config file found, will use defaults",
        ));
}

#[test]
fn test_config_validate_reports_syntax_error() {
    let temp = tempfile::tempdir().unwrap();
    let config_path = temp.path().join("config.toml");
    fs::write(&config_path, "[server\nport = 7777").unwrap();

    Command::cargo_bin("lostfound")
        .unwrap()
        .args(["config", "validate"])
        .env("LOSTFOUND_CONFIG", &config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration syntax error"))
        .stderr(predicate::str::contains("line"));
}

#[test]
fn test_config_validate_reports_type_error() {
    let temp = tempfile::tempdir().unwrap();
    let config_path = temp.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[server]
port = "not-a-number"
"#,
    )
    .unwrap();

    Command::cargo_bin("lostfound")
        .unwrap()
        .args(["config", "validate"])
        .env("LOSTFOUND_CONFIG", &config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration value error"));
}

#[test]
fn test_config_validate_reports_unsupported_endpoint_scheme() {
    let temp = tempfile::tempdir().unwrap();
    let config_path = temp.path().join("config.toml");
    fs::write(
        &config_path,
        r#"
[[notifications.endpoints]]
name = "mail"
url = "mailto://owner@example.com"
"#,
    )
    .unwrap();

    Command::cargo_bin("lostfound")
        .unwrap()
        .args(["config", "validate"])
        .env("LOSTFOUND_CONFIG", &config_path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration errors"))
        .stderr(predicate::str::contains("notifications.endpoints[0].url"))
        .stderr(predicate::str::contains("Unsupported notification scheme: mailto"));
}

#[test]
fn test_config_validate_uses_custom_path() {
    let temp = tempfile::tempdir().unwrap();
    let default_path = temp.path().join("default.toml");
    let custom_path = temp.path().join("custom.toml");

    fs::write(&default_path, "[server\nport = 7777").unwrap();
    fs::write(&custom_path, "").unwrap();

    Command::cargo_bin("lostfound")
        .unwrap()
        .args([
            "config",
            "validate",
            "--path",
            custom_path.to_str().unwrap(),
        ])
        .env("LOSTFOUND_CONFIG", &default_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration valid"));
}

#[test]
fn test_config_init_then_show_round_trips_defaults() {
    let temp = tempfile::tempdir().unwrap();
    let config_path = temp.path().join("nested").join("config.toml");

    Command::cargo_bin("lostfound")
        .unwrap()
        .args(["config", "init", "--path", config_path.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Config created at"));
    assert!(config_path.exists());

    Command::cargo_bin("lostfound")
        .unwrap()
        .args(["config", "show"])
        .env("LOSTFOUND_CONFIG", &config_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("port = 3000"))
        .stdout(predicate::str::contains("level = \"info\""));
}
