//! CLI integration tests for saferoute-share
//!
//! Every test runs with `--dry-run` and either `--no-gps` or an explicit
//! coordinate, so no link is opened and no position service is contacted.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Config without the SMS delay so tests finish quickly
fn setup_config() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("config.toml"),
        "[share]\nshare_sms_delay_ms = 0\n",
    )
    .unwrap();
    temp_dir
}

fn share_cmd(temp_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("saferoute-share").unwrap();
    cmd.env("SAFEROUTE_CONFIG", temp_dir.path().join("config.toml"))
        .env_remove("RUST_LOG")
        .env_remove("SAFEROUTE_LOG_LEVEL")
        .env_remove("SAFEROUTE_LOG_FORMAT");
    cmd
}

#[test]
fn test_help_flag_output() {
    let temp_dir = setup_config();
    share_cmd(&temp_dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Share your live location"))
        .stdout(predicate::str::contains("--dry-run"));
}

#[test]
fn test_dry_run_prints_both_links_in_order() {
    let temp_dir = setup_config();
    let output = share_cmd(&temp_dir)
        .args(["--from", "Mumbai", "--to", "Pune", "--lat", "19.076", "--lon", "72.8777", "--dry-run"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("https://wa.me/?text="));
    assert!(lines[1].starts_with("sms:?body="));
    assert!(lines[0].contains("19.076%2C72.8777"));
    assert!(lines[0].contains("travelling%20from%20*Mumbai*%20to%20*Pune*"));

    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("✅ Live Link Generated!"));
}

#[test]
fn test_no_gps_links_to_destination() {
    let temp_dir = setup_config();
    share_cmd(&temp_dir)
        .args(["--to", "Gateway of India", "--no-gps", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("q%3DGateway%2520of%2520India"))
        .stderr(predicate::str::contains("⚠️ Geolocation not supported."));
}

#[test]
fn test_json_summary() {
    let temp_dir = setup_config();
    let output = share_cmd(&temp_dir)
        .args(["--lat", "18.5204", "--lon", "73.8567", "--dry-run", "--format", "json"])
        .output()
        .unwrap();

    assert!(output.status.success());
    let summary: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(summary["latitude"], 18.5204);
    assert!(summary["message"]
        .as_str()
        .unwrap()
        .contains("I am sharing my live location with you."));
}

#[test]
fn test_lat_requires_lon() {
    let temp_dir = setup_config();
    share_cmd(&temp_dir)
        .args(["--lat", "19.0", "--dry-run"])
        .assert()
        .failure();
}

#[test]
fn test_no_gps_conflicts_with_coordinates() {
    let temp_dir = setup_config();
    share_cmd(&temp_dir)
        .args(["--lat", "19.0", "--lon", "72.0", "--no-gps", "--dry-run"])
        .assert()
        .failure();
}

#[test]
fn test_invalid_timeout_rejected() {
    let temp_dir = setup_config();
    share_cmd(&temp_dir)
        .args(["--timeout", "soon", "--no-gps", "--dry-run"])
        .assert()
        .failure();
}
