//! Integration tests for the `senda` CLI binary.
//!
//! Argument parsing, help output, shell completions and error handling run
//! without a backend; the few end-to-end cases talk to a wiremock server.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER: &str = "6f1c2a9e-0b7d-4c1e-9a55-3d2f8e4b1a70";

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `senda` binary with env isolation.
///
/// Clears all `SENDA_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn senda_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("senda");
    cmd.env("HOME", "/tmp/senda-cli-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/senda-cli-test-nonexistent")
        .env("XDG_DATA_HOME", "/tmp/senda-cli-test-nonexistent")
        .env("SENDA_CONFIG", "/tmp/senda-cli-test-nonexistent/config.toml")
        .env_remove("SENDA_PROFILE")
        .env_remove("SENDA_URL")
        .env_remove("SENDA_ANON_KEY")
        .env_remove("SENDA_EMAIL")
        .env_remove("SENDA_PASSWORD")
        .env_remove("SENDA_OUTPUT")
        .env_remove("SENDA_LANG")
        .env_remove("SENDA_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

/// Mock GoTrue sign-in plus the given `animals` rows.
async fn mock_backend(animals: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .and(header("apikey", "anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "user-jwt",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-xyz",
            "user": { "id": USER, "email": "ana@example.com" }
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/animals"))
        .and(query_param("user_id", format!("eq.{USER}")))
        .and(header("authorization", "Bearer user-jwt"))
        .respond_with(ResponseTemplate::new(200).set_body_json(animals))
        .mount(&server)
        .await;

    server
}

/// `senda` pointed at `server` with credentials from flags and env.
fn signed_in_cmd(server: &MockServer) -> assert_cmd::Command {
    let mut cmd = senda_cmd();
    cmd.env("SENDA_PASSWORD", "s3cret").args([
        "--url",
        &server.uri(),
        "--anon-key",
        "anon-key",
        "--email",
        "ana@example.com",
        "--color",
        "never",
    ]);
    cmd
}

fn animal_row(id: &str, tag: &str, gender: &str) -> serde_json::Value {
    json!({
        "id": id,
        "tag": tag,
        "name": format!("Animal {tag}"),
        "gender": gender,
        "birth_date": "2021-03-04",
        "breed": "Brahman",
        "status": "healthy",
        "owner": "Finca Norte",
        "farm": "Norte",
        "weight": "410",
        "created_at": "2024-06-15T10:30:00+00:00",
        "user_id": USER
    })
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = senda_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    senda_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("herd")
            .and(predicate::str::contains("animals"))
            .and(predicate::str::contains("vaccines"))
            .and(predicate::str::contains("dashboard")),
    );
}

#[test]
fn test_version_flag() {
    senda_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("senda"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    senda_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    senda_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

#[test]
fn test_completions_fish() {
    senda_cmd()
        .args(["completions", "fish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("senda"));
}

// ── Error handling ──────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    senda_cmd().arg("milk-yield").assert().failure();
}

#[test]
fn test_animals_without_config_fails() {
    let output = senda_cmd().args(["animals", "list"]).output().unwrap();
    assert!(!output.status.success());
    let text = combined_output(&output);
    assert!(
        text.contains("config") || text.contains("Configuration") || text.contains("profile"),
        "Expected a configuration hint:\n{text}"
    );
}

#[test]
fn test_config_show_without_file_succeeds() {
    senda_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_invalid_output_format() {
    senda_cmd()
        .args(["-o", "csv", "animals", "list"])
        .assert()
        .failure();
}

#[test]
fn test_zero_poll_interval_rejected() {
    senda_cmd()
        .args(["activity", "--watch", "--interval", "0"])
        .assert()
        .failure()
        .code(2);
}

#[test]
fn test_global_flags_parse() {
    // Parsing succeeds; the command then fails on the unreachable backend
    // or the missing password, never on argument errors.
    let output = senda_cmd()
        .args([
            "--url",
            "http://127.0.0.1:9",
            "--anon-key",
            "k",
            "--email",
            "ana@example.com",
            "--timeout",
            "1",
            "--lang",
            "es",
            "--color",
            "never",
            "-q",
            "-y",
            "animals",
            "list",
        ])
        .output()
        .unwrap();
    assert_ne!(output.status.code(), Some(2), "{}", combined_output(&output));
}

// ── Offline commands ────────────────────────────────────────────────

#[test]
fn test_due_date_adds_gestation() {
    senda_cmd()
        .args(["reproductions", "due-date", "2024-02-01"])
        .assert()
        .success()
        .stdout(predicate::str::contains("2024-11-05"));
}

#[test]
fn test_due_date_json() {
    senda_cmd()
        .args(["-o", "json", "reproductions", "due-date", "2024-02-01"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("expected_birth_date")
                .and(predicate::str::contains("2024-11-05")),
        );
}

#[test]
fn test_due_date_rejects_bad_date() {
    senda_cmd()
        .args(["reproductions", "due-date", "01/02/2024"])
        .assert()
        .failure()
        .code(2)
        .stderr(predicate::str::contains("service_date"));
}

// ── Subcommand help ─────────────────────────────────────────────────

#[test]
fn test_animals_help() {
    senda_cmd().args(["animals", "--help"]).assert().success().stdout(
        predicate::str::contains("list")
            .and(predicate::str::contains("show"))
            .and(predicate::str::contains("create"))
            .and(predicate::str::contains("edit"))
            .and(predicate::str::contains("status"))
            .and(predicate::str::contains("delete")),
    );
}

#[test]
fn test_notifications_help() {
    senda_cmd()
        .args(["notifications", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("watch"))
                .and(predicate::str::contains("read-all")),
        );
}

#[test]
fn test_config_help() {
    senda_cmd().args(["config", "--help"]).assert().success().stdout(
        predicate::str::contains("init")
            .and(predicate::str::contains("show"))
            .and(predicate::str::contains("profiles"))
            .and(predicate::str::contains("use")),
    );
}

// ── Config file ─────────────────────────────────────────────────────

const TWO_PROFILES: &str = r#"
default_profile = "norte"

[profiles.norte]
url = "https://norte.example.co"
anon_key = "anon-norte"
email = "ana@example.com"
password = "hunter2"

[profiles.sur]
url = "https://sur.example.co"
"#;

/// `senda` reading the given config file from a temp dir.
fn with_config(dir: &tempfile::TempDir, contents: &str) -> assert_cmd::Command {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, contents).unwrap();
    let mut cmd = senda_cmd();
    cmd.env("SENDA_CONFIG", &path);
    cmd
}

#[test]
fn test_config_profiles_marks_default() {
    let dir = tempfile::tempdir().unwrap();
    let output = with_config(&dir, TWO_PROFILES)
        .args(["config", "profiles"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().collect::<Vec<_>>(), ["norte *", "sur"]);
}

#[test]
fn test_config_show_redacts_secrets() {
    let dir = tempfile::tempdir().unwrap();
    with_config(&dir, TWO_PROFILES)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("norte.example.co")
                .and(predicate::str::contains("hunter2").not())
                .and(predicate::str::contains("anon-norte").not()),
        );
}

#[test]
fn test_config_use_switches_default() {
    let dir = tempfile::tempdir().unwrap();
    with_config(&dir, TWO_PROFILES)
        .args(["config", "use", "sur"])
        .assert()
        .success();

    let saved = std::fs::read_to_string(dir.path().join("config.toml")).unwrap();
    assert!(saved.contains(r#"default_profile = "sur""#), "{saved}");
}

#[test]
fn test_config_use_unknown_profile_fails() {
    let dir = tempfile::tempdir().unwrap();
    with_config(&dir, TWO_PROFILES)
        .args(["config", "use", "este"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("este"));
}

// ── Against a mock backend ──────────────────────────────────────────

#[tokio::test(flavor = "multi_thread")]
async fn test_animals_list_plain_prints_tags() {
    let server = mock_backend(json!([
        animal_row("0c9e7f52-1d3a-4b8e-a2f4-5e6d7c8b9a01", "SND-001", "female"),
        animal_row("a7b8c9d0-e1f2-4a3b-8c4d-5e6f7a8b9c0d", "SND-002", "male"),
    ]))
    .await;

    let mut cmd = signed_in_cmd(&server);
    cmd.args(["-o", "plain", "animals", "list"]);
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().collect::<Vec<_>>(), ["SND-001", "SND-002"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_animals_list_filter_by_gender() {
    let server = mock_backend(json!([
        animal_row("0c9e7f52-1d3a-4b8e-a2f4-5e6d7c8b9a01", "SND-001", "female"),
        animal_row("a7b8c9d0-e1f2-4a3b-8c4d-5e6f7a8b9c0d", "SND-002", "male"),
    ]))
    .await;

    let mut cmd = signed_in_cmd(&server);
    cmd.args(["-o", "plain", "animals", "list", "--filter", "gender=male"]);
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "SND-002");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_rejected_sign_in_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "code": 400,
            "error_code": "invalid_credentials",
            "msg": "Invalid login credentials"
        })))
        .mount(&server)
        .await;

    let mut cmd = signed_in_cmd(&server);
    cmd.args(["animals", "list"]);
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();

    assert_eq!(output.status.code(), Some(3), "{}", combined_output(&output));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_show_unknown_tag_is_empty_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "user-jwt",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "refresh-xyz",
            "user": { "id": USER, "email": "ana@example.com" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/animals"))
        .and(query_param("tag", "eq.SND-404"))
        .respond_with(ResponseTemplate::new(406).set_body_json(json!({
            "code": "PGRST116",
            "message": "JSON object requested, multiple (or no) rows returned",
            "details": "The result contains 0 rows",
            "hint": null
        })))
        .mount(&server)
        .await;

    let mut cmd = signed_in_cmd(&server);
    cmd.args(["animals", "show", "SND-404"]);
    let output = tokio::task::spawn_blocking(move || cmd.output().unwrap())
        .await
        .unwrap();

    assert!(output.status.success(), "{}", combined_output(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("No animal matches 'SND-404'"));
}
