//! Integration tests for ballot-box

#![allow(deprecated)] // cargo_bin is the standard way to test CLI binaries

mod common;

use assert_cmd::Command;
use ballot_box::error::Error;
use ballot_box::merge::MergeExecutor;
use ballot_box::platform::{GitHub, HttpClient};
use ballot_box::status::StatusGateway;
use ballot_box::types::RepoSlug;
use ballot_box::voting::weighted_tally;
use chrono::{Duration, Utc};
use common::{CI_CONTEXT, make_pr};
use mockito::Matcher;
use predicates::prelude::*;
use serde_json::json;
use std::sync::Arc;

const TOKEN: &str = "test-token";

fn http_github(base_url: &str) -> GitHub {
    let client = HttpClient::new(base_url, TOKEN).expect("client");
    GitHub::new(Arc::new(client), RepoSlug::new("test", "repo"), 100, "ballot")
}

fn write_config(dir: &tempfile::TempDir, api_base: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        format!(
            r#"
[github]
repo = "test/repo"
api_base = "{api_base}"
token_env = "BALLOT_TEST_TOKEN"
"#
        ),
    )
    .expect("write config");
    path
}

// =============================================================================
// CLI Tests
// =============================================================================

#[test]
fn test_cli_help() {
    let mut cmd = Command::cargo_bin("ballot").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Reaction-voted pull request governance"));
}

#[test]
fn test_cli_version() {
    let mut cmd = Command::cargo_bin("ballot").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_run_help() {
    let mut cmd = Command::cargo_bin("ballot").unwrap();
    cmd.args(["run", "--help"]);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Evaluate every open PR once"));
}

#[test]
fn test_tally_requires_pr_number() {
    let mut cmd = Command::cargo_bin("ballot").unwrap();
    cmd.arg("tally");

    cmd.assert().failure();
}

#[test]
fn test_missing_config_file_fails() {
    let mut cmd = Command::cargo_bin("ballot").unwrap();
    cmd.args(["--config", "/nonexistent/ballot/config.toml", "run"]);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("config error"));
}

#[test]
fn test_invalid_repo_override_fails() {
    let mut cmd = Command::cargo_bin("ballot").unwrap();
    cmd.args(["--repo", "not-a-slug", "run"])
        .env("BALLOT_TEST_TOKEN", TOKEN);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("owner/name"));
}

#[test]
fn test_run_with_no_open_prs() {
    let mut server = mockito::Server::new();
    let listing = server
        .mock("GET", "/repos/test/repo/pulls")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("state".into(), "open".into()),
            Matcher::UrlEncoded("per_page".into(), "100".into()),
        ]))
        .match_header("authorization", "Bearer test-token")
        .with_header("content-type", "application/json")
        .with_body("[]")
        .create();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, &server.url());

    let mut cmd = Command::cargo_bin("ballot").unwrap();
    cmd.arg("--config")
        .arg(&config)
        .arg("run")
        .env("BALLOT_TEST_TOKEN", TOKEN);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No open PRs."));
    listing.assert();
}

#[test]
fn test_run_posts_status_for_pr_in_window() {
    let mut server = mockito::Server::new();
    let pushed_at = (Utc::now() - Duration::hours(1)).to_rfc3339();
    let pr = json!({
        "number": 1,
        "title": "Add feature",
        "body": "Adds a feature",
        "html_url": "https://github.com/test/repo/pull/1",
        "user": { "login": "alice" },
        "head": { "sha": "sha1", "repo": { "pushed_at": pushed_at } },
        "statuses_url": format!("{}/repos/test/repo/statuses/sha1", server.url()),
    });

    let mut mocks = vec![
        server
            .mock("GET", "/repos/test/repo/pulls")
            .match_query(Matcher::Any)
            .with_body(json!([pr]).to_string())
            .create(),
    ];
    for path in [
        "/repos/test/repo/issues/1/comments",
        "/repos/test/repo/issues/1/reactions",
        "/repos/test/repo/pulls/1/reviews",
        "/repos/test/repo/collaborators",
    ] {
        mocks.push(
            server
                .mock("GET", path)
                .match_query(Matcher::Any)
                .with_body("[]")
                .create(),
        );
    }
    mocks.push(
        server
            .mock("GET", "/users/alice")
            .with_body(r#"{"login":"alice","created_at":"2012-10-23T21:35:35Z"}"#)
            .create(),
    );
    mocks.push(
        server
            .mock("GET", "/repos/test/repo")
            .with_body(r#"{"subscribers_count":3}"#)
            .create(),
    );
    let status = server
        .mock("POST", "/repos/test/repo/statuses/sha1")
        .match_body(Matcher::PartialJson(
            json!({ "state": "success", "context": "ballot" }),
        ))
        .with_status(201)
        .with_body("{}")
        .create();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, &server.url());

    let mut cmd = Command::cargo_bin("ballot").unwrap();
    cmd.arg("--config")
        .arg(&config)
        .arg("run")
        .env("BALLOT_TEST_TOKEN", TOKEN);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("#1"))
        .stdout(predicate::str::contains("accepted"));
    status.assert();
    for mock in &mocks {
        mock.assert();
    }
}

#[test]
fn test_check_ci_command() {
    let mut server = mockito::Server::new();
    let statuses = server
        .mock("GET", "/repos/test/repo/statuses/abc")
        .match_query(Matcher::Any)
        .with_body(json!([{ "context": CI_CONTEXT, "state": "failure" }]).to_string())
        .create();
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(&dir, &server.url());

    let mut cmd = Command::cargo_bin("ballot").unwrap();
    cmd.arg("--config")
        .arg(&config)
        .arg("check-ci")
        .arg(format!("{}/repos/test/repo/statuses/abc", server.url()))
        .env("BALLOT_TEST_TOKEN", TOKEN);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("CI not passing"));
    statuses.assert();
}

// =============================================================================
// HTTP Client Tests
// =============================================================================

#[tokio::test]
async fn test_http_client_follows_link_header() {
    let mut server = mockito::Server::new_async().await;
    let next = format!("{}/repos/test/repo/collaborators?page=2", server.url());
    let first = server
        .mock("GET", "/repos/test/repo/collaborators")
        .match_query(Matcher::UrlEncoded("per_page".into(), "100".into()))
        .match_header("authorization", "Bearer test-token")
        .with_header("content-type", "application/json")
        .with_header("link", &format!(r#"<{next}>; rel="next""#))
        .with_body(r#"[{"login":"alice"}]"#)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/repos/test/repo/collaborators")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_header("content-type", "application/json")
        .with_body(r#"[{"login":"bob"}]"#)
        .create_async()
        .await;

    let github = http_github(&server.url());
    let logins = github.collaborators().await.expect("collaborators");

    assert_eq!(logins, vec!["alice".to_string(), "bob".to_string()]);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_http_client_withholds_token_from_foreign_link() {
    let mut server = mockito::Server::new_async().await;
    let mut foreign = mockito::Server::new_async().await;
    let next = format!("{}/collaborators?page=2", foreign.url());
    let first = server
        .mock("GET", "/repos/test/repo/collaborators")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer test-token")
        .with_header("link", &format!(r#"<{next}>; rel="next""#))
        .with_body(r#"[{"login":"alice"}]"#)
        .create_async()
        .await;
    let second = foreign
        .mock("GET", "/collaborators")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .match_header("authorization", Matcher::Missing)
        .with_body(r#"[{"login":"bob"}]"#)
        .create_async()
        .await;

    let github = http_github(&server.url());
    let logins = github.collaborators().await.expect("collaborators");

    assert_eq!(logins, vec!["alice".to_string(), "bob".to_string()]);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_http_client_stops_paging_at_ci_match() {
    let mut server = mockito::Server::new_async().await;
    let url = format!("{}/repos/test/repo/statuses/abc", server.url());
    let first = server
        .mock("GET", "/repos/test/repo/statuses/abc")
        .match_query(Matcher::UrlEncoded("per_page".into(), "100".into()))
        .with_header("link", &format!(r#"<{url}?page=2>; rel="next""#))
        .with_body(json!([{ "context": CI_CONTEXT, "state": "success" }]).to_string())
        .create_async()
        .await;
    let second = server
        .mock("GET", "/repos/test/repo/statuses/abc")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_body("[]")
        .expect(0)
        .create_async()
        .await;

    let github = http_github(&server.url());
    let passed = StatusGateway::new(&github, CI_CONTEXT)
        .has_ci_build_passed(Some(&url))
        .await
        .expect("ci check");

    assert!(passed);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_http_client_maps_not_found_to_transient() {
    let mut server = mockito::Server::new_async().await;
    let _pr = server
        .mock("GET", "/repos/test/repo/pulls/4")
        .with_status(404)
        .with_body(r#"{"message":"Not Found"}"#)
        .create_async()
        .await;

    let github = http_github(&server.url());
    let err = github.get_pr(4).await.unwrap_err();

    assert!(matches!(err, Error::TransientLookup(_)));
}

#[tokio::test]
async fn test_http_client_surfaces_error_message() {
    let mut server = mockito::Server::new_async().await;
    let _repo = server
        .mock("GET", "/repos/test/repo")
        .with_status(500)
        .with_body("upstream exploded\n")
        .create_async()
        .await;

    let github = http_github(&server.url());
    let err = github.watcher_count().await.unwrap_err();

    match err {
        Error::Http {
            status, message, ..
        } => {
            assert_eq!(status, 500);
            assert_eq!(message, "upstream exploded");
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_http_merge_conflict_is_couldnt_merge() {
    let mut server = mockito::Server::new_async().await;
    let merge = server
        .mock("PUT", "/repos/test/repo/pulls/7/merge")
        .match_body(Matcher::PartialJson(json!({ "sha": "sha7", "merge_method": "merge" })))
        .with_status(409)
        .with_body(r#"{"message":"Head branch was modified. Review and try the merge again."}"#)
        .create_async()
        .await;

    let github = http_github(&server.url());
    let pr = make_pr(7, "Add feature", "alice", Some(Utc::now()));
    let votes = [("alice".to_string(), ballot_box::types::Polarity::For)]
        .into_iter()
        .collect();
    let tally = weighted_tally(&votes, |_| 1.0);

    let err = MergeExecutor::new(&github)
        .merge(&pr, &tally, 1.0)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::CouldntMerge { pr_number: 7, .. }));
    merge.assert_async().await;
}

#[tokio::test]
async fn test_http_empty_body_is_accepted() {
    let mut server = mockito::Server::new_async().await;
    let close = server
        .mock("PATCH", "/repos/test/repo/pulls/3")
        .match_body(Matcher::Json(json!({ "state": "closed" })))
        .with_status(204)
        .create_async()
        .await;

    let github = http_github(&server.url());
    github.close_pr(3).await.expect("close");

    close.assert_async().await;
}

#[tokio::test]
async fn test_http_client_respects_api_base_path() {
    let mut server = mockito::Server::new_async().await;
    let user = server
        .mock("GET", "/api/v3/users/alice")
        .with_body(r#"{"login":"alice","created_at":"2012-10-23T21:35:35Z"}"#)
        .create_async()
        .await;

    let github = http_github(&format!("{}/api/v3", server.url()));
    let profile = github.user("alice").await.expect("user");

    assert_eq!(profile.login, "alice");
    user.assert_async().await;
}
