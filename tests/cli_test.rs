// Allow deprecated cargo_bin - the deprecation is for custom build-dir edge case
// which doesn't apply to this project. See: https://docs.rs/assert_cmd
#![allow(deprecated)]

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn test_help_shows_all_subcommands() {
    Command::cargo_bin("lostfound")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("serve"))
        .stdout(predicate::str::contains("send"))
        .stdout(predicate::str::contains("schemes"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_is_semver() {
    Command::cargo_bin("lostfound")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"\d+\.\d+\.\d+").unwrap());
}

#[test]
fn test_serve_help_lists_overrides() {
    Command::cargo_bin("lostfound")
        .unwrap()
        .args(["serve", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--bind"))
        .stdout(predicate::str::contains("--port"))
        .stdout(predicate::str::contains("--debug"));
}

#[test]
fn test_schemes_lists_every_backend() {
    let output = Command::cargo_bin("lostfound")
        .unwrap()
        .arg("schemes")
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    for pattern in [
        "ntfy://topic",
        "ntfys://",
        "tgram://bottoken/ChatID",
        "discord://webhook_id/webhook_token",
        "slack://TokenA/TokenB/TokenC",
        "pushover://user_key@api_token",
        "http://host/path",
        "https://host/path",
    ] {
        assert!(stdout.contains(pattern), "missing {pattern} in:\n{stdout}");
    }
}

#[test]
fn test_send_with_malformed_descriptor_exits_nonzero() {
    Command::cargo_bin("lostfound")
        .unwrap()
        .args(["send", "not-a-descriptor"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid endpoint descriptor format"));
}

#[test]
fn test_send_with_unknown_scheme_lists_supported() {
    Command::cargo_bin("lostfound")
        .unwrap()
        .args(["send", "gopher://hole"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported notification scheme: gopher"))
        .stderr(predicate::str::contains("pushover"));
}

#[test]
fn test_send_with_invalid_slack_descriptor_fails_before_network() {
    Command::cargo_bin("lostfound")
        .unwrap()
        .args(["send", "slack://only-one"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid Slack URL format"));
}
