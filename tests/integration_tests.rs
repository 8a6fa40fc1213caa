//! Integration tests for the devprof CLI
//!
//! These tests exercise the CLI commands end-to-end using assert_cmd,
//! against a mock profile service where a service is needed.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::process::Output;
use tempfile::TempDir;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Helper to get a devprof command isolated from the user's config
fn devprof(config_dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("devprof").unwrap();
    cmd.env("DEVPROF_CONFIG_DIR", config_dir.path())
        .env_remove("DEVPROF_API_URL")
        .env_remove("DEVPROF_TIMEOUT_SECS")
        .env_remove("RUST_LOG");
    cmd
}

/// Run the CLI against `server` off the async runtime
async fn run_against(server: &MockServer, args: &[&str]) -> Output {
    let uri = server.uri();
    let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
    tokio::task::spawn_blocking(move || {
        let config_dir = TempDir::new().unwrap();
        devprof(&config_dir)
            .arg("--api-url")
            .arg(uri)
            .args(args)
            .output()
            .unwrap()
    })
    .await
    .unwrap()
}

fn profile_json(id: &str, name: &str, created: &str, skills: &[&str]) -> serde_json::Value {
    json!({
        "_id": id,
        "name": name,
        "email": format!("{}@example.com", id),
        "skills": skills,
        "projects": [{"title": format!("{} project", name), "skills": skills}],
        "createdAt": created
    })
}

async fn mock_profiles(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/profile/get-all-profiles"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "profiles": [
                profile_json("p2", "bob", "2024-01-01T00:00:00Z", &["go"]),
                profile_json("p1", "Alice", "2022-01-01T00:00:00Z", &["rust", "go"]),
                profile_json("p3", "Carol", "2023-01-01T00:00:00Z", &["python"])
            ]
        })))
        .mount(server)
        .await;
}

// ============================================================================
// Basics
// ============================================================================

#[test]
fn test_help_displays() {
    let tmp = TempDir::new().unwrap();
    devprof(&tmp)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("list"))
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("skills"));
}

#[test]
fn test_version_displays() {
    let tmp = TempDir::new().unwrap();
    devprof(&tmp)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("devprof"));
}

#[test]
fn test_unknown_command_fails() {
    let tmp = TempDir::new().unwrap();
    devprof(&tmp).arg("frobnicate").assert().failure();
}

#[test]
fn test_completions_bash() {
    let tmp = TempDir::new().unwrap();
    devprof(&tmp)
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("devprof"));
}

// ============================================================================
// Config
// ============================================================================

#[test]
fn test_config_set_then_show_key() {
    let tmp = TempDir::new().unwrap();
    devprof(&tmp)
        .args(["config", "set", "api_url", "http://profiles.test:9000/"])
        .assert()
        .success();

    assert!(tmp.path().join("config.yaml").exists());

    devprof(&tmp)
        .args(["config", "show", "api_url"])
        .assert()
        .success()
        .stdout("http://profiles.test:9000\n");
}

#[test]
fn test_config_env_overrides_file() {
    let tmp = TempDir::new().unwrap();
    devprof(&tmp)
        .args(["config", "set", "api_url", "http://from-file"])
        .assert()
        .success();

    devprof(&tmp)
        .env("DEVPROF_API_URL", "http://from-env")
        .args(["config", "show", "api_url"])
        .assert()
        .success()
        .stdout("http://from-env\n");
}

#[test]
fn test_config_set_rejects_bad_values() {
    let tmp = TempDir::new().unwrap();
    devprof(&tmp)
        .args(["config", "set", "colour", "blue"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown configuration key"));

    devprof(&tmp)
        .args(["config", "set", "debounce_ms", "soon"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid value"));
}

#[test]
fn test_config_unset_removes_key() {
    let tmp = TempDir::new().unwrap();
    devprof(&tmp)
        .args(["config", "set", "top_skills_limit", "3"])
        .assert()
        .success();
    devprof(&tmp)
        .args(["config", "unset", "top_skills_limit"])
        .assert()
        .success();
    devprof(&tmp)
        .args(["config", "show", "top_skills_limit"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not set"));
}

#[test]
fn test_config_path_and_keys() {
    let tmp = TempDir::new().unwrap();
    devprof(&tmp)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yaml"));

    devprof(&tmp)
        .args(["config", "keys"])
        .assert()
        .success()
        .stdout(predicate::str::contains("debounce_ms"));
}

// ============================================================================
// List / search / sort
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_sorts_by_name_case_insensitively() {
    let server = MockServer::start().await;
    mock_profiles(&server).await;

    run_against(&server, &["list", "-f", "id"])
        .await
        .assert()
        .success()
        .stdout("p1\np2\np3\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_sorts_newest_first() {
    let server = MockServer::start().await;
    mock_profiles(&server).await;

    run_against(&server, &["list", "--sort", "newest", "-f", "id"])
        .await
        .assert()
        .success()
        .stdout("p2\np3\np1\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_count_and_available_skills() {
    let server = MockServer::start().await;
    mock_profiles(&server).await;

    run_against(&server, &["list", "--count"])
        .await
        .assert()
        .success()
        .stdout("3\n");

    run_against(&server, &["list", "--available-skills"])
        .await
        .assert()
        .success()
        .stdout("go\npython\nrust\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_search_uses_service_results() {
    let server = MockServer::start().await;
    mock_profiles(&server).await;
    Mock::given(method("GET"))
        .and(path("/profile/search"))
        .and(query_param("q", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [profile_json("p1", "Alice", "2022-01-01T00:00:00Z", &["rust"])]
        })))
        .expect(1)
        .mount(&server)
        .await;

    run_against(&server, &["list", "--search", "rust", "-f", "json"])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("\"_id\": \"p1\""))
        .stdout(predicate::str::contains("p2").not());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_failed_search_shows_no_matches() {
    let server = MockServer::start().await;
    mock_profiles(&server).await;
    Mock::given(method("GET"))
        .and(path("/profile/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    run_against(&server, &["list", "--search", "zig"])
        .await
        .assert()
        .success()
        .stderr(predicate::str::contains("No profiles found matching your criteria"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_list_load_failure_surfaces_server_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile/get-all-profiles"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({"message": "Database offline"})),
        )
        .mount(&server)
        .await;

    run_against(&server, &["list"])
        .await
        .assert()
        .failure()
        .stderr(predicate::str::contains("Database offline"));
}

// ============================================================================
// Show
// ============================================================================

async fn mock_detail(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/profile/get-profile"))
        .and(query_param("profileId", "p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "profile": profile_json("p1", "Alice", "2022-01-01T00:00:00Z", &["rust", "go"])
        })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/profile/profile-top-skills"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "skills": [{"skill": "rust", "count": 2}, {"skill": "go", "count": 1}]
        })))
        .mount(server)
        .await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_show_card_lists_tabs() {
    let server = MockServer::start().await;
    mock_detail(&server).await;

    run_against(&server, &["show", "p1"])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("Alice"))
        .stdout(predicate::str::contains("all | rust | go"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_show_skill_tab_fetches_projects() {
    let server = MockServer::start().await;
    mock_detail(&server).await;
    Mock::given(method("GET"))
        .and(path("/profile/projects"))
        .and(query_param("profileId", "p1"))
        .and(query_param("skill", "rust"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "projects": [{"title": "Borrow checker", "skills": ["rust"]}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    run_against(&server, &["show", "p1", "--skill", "rust"])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("Borrow checker"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_show_all_tab_never_fetches_projects() {
    let server = MockServer::start().await;
    mock_detail(&server).await;
    Mock::given(method("GET"))
        .and(path("/profile/projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"projects": []})))
        .expect(0)
        .mount(&server)
        .await;

    run_against(&server, &["show", "p1", "--skill", "all"])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("Alice project"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_show_missing_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile/get-profile"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/profile/profile-top-skills"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    run_against(&server, &["show", "nobody"])
        .await
        .assert()
        .failure()
        .stderr(predicate::str::contains("No profile found"));
}

// ============================================================================
// New / edit
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_new_without_skill_never_reaches_service() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    run_against(
        &server,
        &["new", "--name", "Ada", "--email", "ada@example.com"],
    )
    .await
    .assert()
    .failure()
    .stderr(predicate::str::contains("validation failed"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_new_creates_and_prints_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/profile/create-profile"))
        .and(body_partial_json(json!({
            "profileData": {"name": "Ada", "skills": ["rust", "math"]}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "profile": profile_json("new1", "Ada", "2024-05-01T00:00:00Z", &["rust", "math"])
        })))
        .expect(1)
        .mount(&server)
        .await;

    run_against(
        &server,
        &[
            "new",
            "--name",
            "Ada",
            "--email",
            "ada@example.com",
            "--skill",
            "rust,math",
            "-f",
            "id",
        ],
    )
    .await
    .assert()
    .success()
    .stdout("new1\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_new_reports_server_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/profile/create-profile"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"message": "Email already registered"})),
        )
        .mount(&server)
        .await;

    run_against(
        &server,
        &["new", "--name", "Ada", "--email", "ada@example.com", "-s", "rust"],
    )
    .await
    .assert()
    .failure()
    .stderr(predicate::str::contains("Email already registered"));
}

#[test]
fn test_edit_without_changes_fails() {
    let tmp = TempDir::new().unwrap();
    devprof(&tmp)
        .args(["edit", "p1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to change"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_edit_sends_whole_record() {
    let server = MockServer::start().await;
    mock_detail(&server).await;
    Mock::given(method("PUT"))
        .and(path("/profile/update-profile"))
        .and(query_param("profileId", "p1"))
        .and(body_partial_json(json!({
            "profileData": {
                "name": "Alice",
                "email": "p1@example.com",
                "skills": ["rust", "zig"],
                "projects": [{"title": "Alice project"}]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "profile": profile_json("p1", "Alice", "2022-01-01T00:00:00Z", &["rust", "zig"])
        })))
        .expect(1)
        .mount(&server)
        .await;

    run_against(
        &server,
        &["edit", "p1", "--remove-skill", "go", "--add-skill", "zig"],
    )
    .await
    .assert()
    .success()
    .stdout(predicate::str::contains("Updated profile"));
}

// ============================================================================
// Skills
// ============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_skills_uses_configured_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile/skills/top"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "skills": [{"skill": "rust", "count": 9}, {"skill": "go", "count": 4}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    run_against(&server, &["skills", "-f", "id"])
        .await
        .assert()
        .success()
        .stdout("rust\ngo\n");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_skills_for_one_profile() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/profile/profile-top-skills"))
        .and(query_param("profileId", "p1"))
        .and(query_param("limit", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "skills": [{"skill": "rust", "count": 2}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    run_against(&server, &["skills", "--profile", "p1", "--limit", "2", "-f", "md"])
        .await
        .assert()
        .success()
        .stdout(predicate::str::contains("| 1 "))
        .stdout(predicate::str::contains("rust"));
}
