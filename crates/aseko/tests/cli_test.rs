//! Integration tests for the `aseko` CLI binary.
//!
//! Argument parsing, help output, completions and config handling run
//! offline; API-bound commands run against a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::{Value, json};
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `aseko` binary with env isolation.
///
/// Clears all `ASEKO_*` env vars and points config directories at `home`
/// so tests never touch the user's real configuration.
fn aseko_cmd(home: &TempDir) -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("aseko");
    cmd.env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path())
        .env("NO_COLOR", "1")
        .env_remove("ASEKO_API_KEY")
        .env_remove("ASEKO_BASE_URL")
        .env_remove("ASEKO_OUTPUT")
        .env_remove("ASEKO_TIMEOUT")
        .env_remove("RUST_LOG");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Run the binary against `server` on a blocking thread so the mock
/// server keeps serving on the test runtime.
async fn run_against(server: &MockServer, args: &[&str]) -> std::process::Output {
    let home = TempDir::new().unwrap();
    let mut cmd = aseko_cmd(&home);
    cmd.args([
        "--base-url",
        &format!("{}/api/v1", server.uri()),
        "--api-key",
        "test-api-key",
    ])
    .args(args);

    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();
    drop(home);
    output
}

async fn mount_serials(server: &MockServer, serials: &[&str]) {
    let items: Vec<Value> = serials
        .iter()
        .map(|sn| json!({ "serialNumber": sn }))
        .collect();
    Mock::given(method("GET"))
        .and(path("/api/v1/paired-units"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": items,
            "totalItems": serials.len(),
        })))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, serial: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/paired-units/{serial}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn pool(serial: &str) -> Value {
    json!({
        "serialNumber": serial,
        "name": "Garden pool",
        "online": true,
        "brandName": { "primary": "ASIN", "secondary": "AQUA" },
        "statusMessages": [],
        "statusValues": {
            "waterTemperature": "27.5",
            "ph": "7.2",
            "filtrationRunning": true
        }
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let home = TempDir::new().unwrap();
    let output = aseko_cmd(&home).output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    let home = TempDir::new().unwrap();
    aseko_cmd(&home).arg("--help").assert().success().stdout(
        predicate::str::contains("Aseko")
            .and(predicate::str::contains("units"))
            .and(predicate::str::contains("sensors"))
            .and(predicate::str::contains("watch")),
    );
}

#[test]
fn test_version_flag() {
    let home = TempDir::new().unwrap();
    aseko_cmd(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("aseko"));
}

#[test]
fn test_invalid_subcommand() {
    let home = TempDir::new().unwrap();
    aseko_cmd(&home)
        .arg("pumps")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_invalid_output_format() {
    let home = TempDir::new().unwrap();
    aseko_cmd(&home)
        .args(["--output", "xml", "units", "list"])
        .assert()
        .code(2);
}

#[test]
fn test_watch_rejects_zero_interval() {
    let home = TempDir::new().unwrap();
    aseko_cmd(&home)
        .args(["watch", "--interval", "0"])
        .assert()
        .code(2);
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_generate_scripts() {
    for shell in ["bash", "zsh", "fish"] {
        let home = TempDir::new().unwrap();
        aseko_cmd(&home)
            .args(["completions", shell])
            .assert()
            .success()
            .stdout(predicate::str::contains("aseko"));
    }
}

// ── Credentials ─────────────────────────────────────────────────────

#[test]
fn test_missing_api_key_exits_with_auth_code() {
    let home = TempDir::new().unwrap();
    let output = aseko_cmd(&home)
        .args(["--base-url", "http://127.0.0.1:9/api/v1", "units", "list"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    assert!(combined_output(&output).contains("No API key configured"));
}

// ── Config ──────────────────────────────────────────────────────────

#[test]
fn test_config_path_is_under_config_home() {
    let home = TempDir::new().unwrap();
    aseko_cmd(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains(home.path().to_string_lossy().as_ref()));
}

#[test]
fn test_config_set_then_show_json() {
    let home = TempDir::new().unwrap();
    aseko_cmd(&home)
        .args(["config", "set", "scan_interval", "30"])
        .assert()
        .success();

    let output = aseko_cmd(&home)
        .args(["--output", "json", "config", "show"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));

    let shown: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(shown["account"]["scan_interval"], 30);
    assert_eq!(shown["account"]["base_url"], "https://api.aseko.cloud/api/v1");
}

/// Write `contents` to the config file the binary resolves under `home`.
fn write_config(home: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = aseko_cmd(home).args(["config", "path"]).output().unwrap();
    let path = std::path::PathBuf::from(String::from_utf8(path.stdout).unwrap().trim());
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_config_show_redacts_plaintext_key() {
    let home = TempDir::new().unwrap();
    write_config(&home, "[account]\napi_key = \"super-secret\"\n");

    aseko_cmd(&home)
        .args(["--output", "json", "config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("super-secret").not())
        .stdout(predicate::str::contains("********"));
}

#[test]
fn test_config_set_keeps_invalid_file_untouched() {
    let home = TempDir::new().unwrap();
    let original = "[defaults]\ntimeout = 0\n\n[account]\nunique_id = \"110123456\"\n";
    let path = write_config(&home, original);

    aseko_cmd(&home)
        .args(["config", "set", "scan_interval", "30"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("timeout"));

    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_config_set_fails_on_unparsable_file() {
    let home = TempDir::new().unwrap();
    let original = "[account\nunique_id = \"110123456\"\n";
    let path = write_config(&home, original);

    let output = aseko_cmd(&home)
        .args(["config", "set", "scan_interval", "30"])
        .output()
        .unwrap();
    assert!(!output.status.success(), "{}", combined_output(&output));
    assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

#[test]
fn test_config_set_rejects_unknown_key() {
    let home = TempDir::new().unwrap();
    aseko_cmd(&home)
        .args(["config", "set", "heater", "on"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown config key"));
}

#[test]
fn test_config_set_rejects_bad_output_value() {
    let home = TempDir::new().unwrap();
    aseko_cmd(&home)
        .args(["config", "set", "output", "xml"])
        .assert()
        .code(2);
}

// ── API-bound commands ──────────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_units_list_json() {
    let server = MockServer::start().await;
    mount_serials(&server, &["110123456"]).await;
    mount_detail(&server, "110123456", pool("110123456")).await;

    let output = run_against(&server, &["--output", "json", "units", "list"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let units: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(units[0]["serial_number"], "110123456");
    assert_eq!(units[0]["brand_name"], "ASIN AQUA");
    assert_eq!(units[0]["online"], true);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_units_serials_plain() {
    let server = MockServer::start().await;
    mount_serials(&server, &["B", "A"]).await;

    let output = run_against(&server, &["--output", "plain", "units", "serials"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "A\nB");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_units_get_missing_exits_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/paired-units/nope"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let output = run_against(&server, &["units", "get", "nope"]).await;
    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
    assert!(combined_output(&output).contains("unit 'nope' not found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_auth_check_rejected_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/check"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let output = run_against(&server, &["auth", "check"]).await;
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_auth_check_reports_identity() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/auth/check"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "valid": true })))
        .mount(&server)
        .await;
    mount_serials(&server, &["200", "100"]).await;

    let output = run_against(&server, &["--output", "json", "auth", "check"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["valid"], true);
    assert_eq!(report["unique_id"], "100");
    assert_eq!(report["units"], 2);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sensors_json_lists_entities() {
    let server = MockServer::start().await;
    mount_serials(&server, &["110123456"]).await;
    mount_detail(&server, "110123456", pool("110123456")).await;

    let output = run_against(&server, &["--output", "json", "sensors"]).await;
    assert!(output.status.success(), "{}", combined_output(&output));

    let entities: Vec<Value> = serde_json::from_slice(&output.stdout).unwrap();
    let by_id = |id: &str| {
        entities
            .iter()
            .find(|e| e["unique_id"] == id)
            .unwrap_or_else(|| panic!("missing {id} in {entities:?}"))
    };

    let temp = by_id("110123456_water_temperature");
    assert_eq!(temp["state"], 27.5);
    assert_eq!(temp["available"], true);
    assert_eq!(temp["platform"], "sensor");

    let filtration = by_id("110123456_filtration_running");
    assert_eq!(filtration["state"], true);
    assert_eq!(filtration["platform"], "binary_sensor");

    // Absent status keys produce no entity.
    assert!(entities.iter().all(|e| e["key"] != "heating"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_sensors_unknown_unit_filter() {
    let server = MockServer::start().await;
    mount_serials(&server, &["110123456"]).await;
    mount_detail(&server, "110123456", pool("110123456")).await;

    let output = run_against(&server, &["sensors", "--unit", "999"]).await;
    assert_eq!(output.status.code(), Some(4), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_watch_rejected_key_exits_with_auth_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/paired-units"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let output = run_against(&server, &["watch", "--interval", "60"]).await;
    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}
