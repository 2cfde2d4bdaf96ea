//! Integration tests for the `unistat` binary.
//!
//! Argument parsing, help output, configuration errors, and startup
//! failures against mock controllers. No real controller is needed.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a command for the `unistat` binary with env isolation.
///
/// Clears the `UNISTAT_*` variables and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn unistat_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("unistat");
    cmd.env("HOME", "/tmp/unistat-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/unistat-cli-test-nonexistent")
        .env_remove("RUST_LOG")
        .env_remove("UNISTAT_WATCH_NETWORKS")
        .env_remove("UNISTAT_UNIFI__ADDRESS")
        .env_remove("UNISTAT_UNIFI__USER")
        .env_remove("UNISTAT_UNIFI__PASSWORD")
        .env_remove("UNISTAT_UNIFI__INSECURE")
        .env_remove("UNISTAT_UNIFI__TIMEOUT")
        .env_remove("UNISTAT_PROMETHEUS__LISTEN")
        .env_remove("UNISTAT_INFLUXDB__ADDRESS")
        .env_remove("UNISTAT_INFLUXDB__DATABASE")
        .env_remove("UNISTAT_INFLUXDB__SYNC_FREQUENCY")
        .env_remove("UNISTAT_INFLUXDB__USERNAME")
        .env_remove("UNISTAT_INFLUXDB__PASSWORD")
        .env_remove("UNISTAT_INFLUXDB__TIMEOUT");
    cmd
}

fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

async fn controller(login_status: u16) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/login"))
        .respond_with(ResponseTemplate::new(login_status))
        .mount(&server)
        .await;
    server
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = unistat_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    unistat_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("Unifi")
            .and(predicate::str::contains("prometheus"))
            .and(predicate::str::contains("influxdb")),
    );
}

#[test]
fn test_version_flag() {
    unistat_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("unistat"));
}

#[test]
fn test_unknown_subcommand() {
    unistat_cmd().arg("graphite").assert().code(2);
}

#[test]
fn test_influxdb_help_lists_flags() {
    unistat_cmd()
        .args(["influxdb", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("--influx-address")
                .and(predicate::str::contains("--influx-db"))
                .and(predicate::str::contains("--sync-frequency")),
        );
}

// ── Configuration errors ────────────────────────────────────────────

#[test]
fn test_missing_watch_networks() {
    unistat_cmd()
        .args(["--unifi-address", "unifi.lan", "prometheus"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("watch_networks"));
}

#[test]
fn test_missing_controller_address() {
    unistat_cmd()
        .args(["--watch-networks", "LAN", "prometheus"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unifi.address"));
}

#[test]
fn test_missing_influx_database() {
    unistat_cmd()
        .args([
            "--watch-networks",
            "LAN",
            "influxdb",
            "--influx-address",
            "http://127.0.0.1:8086",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("influxdb.database"));
}

#[test]
fn test_zero_sync_frequency_rejected() {
    unistat_cmd()
        .args([
            "--watch-networks",
            "LAN",
            "influxdb",
            "--influx-address",
            "http://127.0.0.1:8086",
            "--influx-db",
            "unifi",
            "--sync-frequency",
            "0",
        ])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("sync_frequency"));
}

#[test]
fn test_config_file_values_are_used() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("unistat.toml");
    std::fs::write(&path, "watch_networks = [\"LAN\"]\n[prometheus]\nlisten = \"bogus\"\n")
        .unwrap();

    unistat_cmd()
        .arg("--config")
        .arg(&path)
        .args(["--unifi-address", "unifi.lan", "--unifi-user", "u", "--unifi-password", "p"])
        .arg("prometheus")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("prometheus.listen"));
}

#[test]
fn test_verbose_log_hides_passwords() {
    let output = unistat_cmd()
        .args([
            "-vv",
            "--unifi-password",
            "CONTROLLER-SECRET",
            "--watch-networks",
            "LAN",
            "influxdb",
            "--influx-address",
            "http://127.0.0.1:8086",
            "--influx-password",
            "TOPSECRET",
        ])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(2));
    let text = combined_output(&output);
    assert!(text.contains("dispatching command"), "{text}");
    assert!(!text.contains("TOPSECRET"), "{text}");
    assert!(!text.contains("CONTROLLER-SECRET"), "{text}");
}

// ── Startup failures ────────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_login_is_fatal() {
    let server = controller(401).await;

    unistat_cmd()
        .args([
            "--unifi-address",
            &server.uri(),
            "--unifi-user",
            "admin",
            "--unifi-password",
            "wrong",
            "--watch-networks",
            "LAN",
            "prometheus",
            "--listen",
            "127.0.0.1:0",
        ])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("Authentication"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_unreachable_influx_is_fatal() {
    let server = controller(200).await;

    unistat_cmd()
        .args([
            "--unifi-address",
            &server.uri(),
            "--unifi-user",
            "admin",
            "--unifi-password",
            "pw",
            "--watch-networks",
            "LAN",
            "influxdb",
            "--influx-address",
            "http://127.0.0.1:1",
            "--influx-db",
            "unifi",
        ])
        .assert()
        .code(7)
        .stderr(predicate::str::contains("InfluxDB"));
}
