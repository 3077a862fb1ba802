//! CLI integration tests for saferoute-sos

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Config without the SMS delay so tests finish quickly
fn setup_config(extra: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("config.toml"),
        format!("[share]\nsos_sms_delay_ms = 0\n\n{}", extra),
    )
    .unwrap();
    temp_dir
}

fn sos_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("saferoute-sos").unwrap();
    cmd.env("SAFEROUTE_CONFIG", temp_dir.path().join("config.toml"))
        .env_remove("RUST_LOG")
        .env_remove("SAFEROUTE_LOG_LEVEL")
        .env_remove("SAFEROUTE_LOG_FORMAT");
    cmd
}

#[test]
fn test_help_flag_output() {
    let temp_dir = setup_config("");
    sos_cmd(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("SOS"))
        .stdout(predicate::str::contains("--yes"));
}

#[test]
fn test_refuses_without_confirmation_when_not_a_terminal() {
    let temp_dir = setup_config("");
    sos_cmd(&temp_dir)
        .args(["--no-gps", "--dry-run"])
        .write_stdin("y\n")
        .assert()
        .code(3)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_with_coordinates_sends_map_link() {
    let temp_dir = setup_config("");
    let output = sos_cmd(&temp_dir)
        .args(["--yes", "--dry-run", "--lat", "19.1197", "--lon", "72.8464"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("https://wa.me/?text="));
    assert!(lines[0].contains("SOS!%20EMERGENCY!"));
    assert!(lines[0].contains("19.1197%2C72.8464"));
    assert!(lines[1].starts_with("sms:?body="));

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("HIT SEND ON BOTH!"));
}

#[test]
fn test_without_position_source_reports_unavailable() {
    let temp_dir = setup_config("");
    sos_cmd(&temp_dir)
        .args(["--yes", "--dry-run", "--no-gps"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Location%20unavailable"));
}

#[test]
fn test_denied_location_sends_fallback_with_place() {
    let temp_dir = setup_config("[location]\nprovider = \"deny\"\n");
    sos_cmd(&temp_dir)
        .args(["--yes", "--dry-run", "--near", "Andheri Station"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Near%20Andheri%20Station"))
        .stderr(predicate::str::contains("⚠️ Location Access Denied."))
        .stderr(predicate::str::contains(
            "Please ALLOW location access in your device settings.",
        ));
}
