//! Scripted API client for testing
//!
//! These are test utilities - not all may be used in every test binary.

#![allow(dead_code)]

use async_trait::async_trait;
use ballot_box::error::{Error, Result};
use ballot_box::platform::{ApiClient, ApiRequest, ApiResponse, GitHub, Method};
use ballot_box::types::{Account, HeadRef, HeadRepo, PullRequest, RepoSlug};
use chrono::{DateTime, Duration, Utc};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Repository every fixture lives in
pub const OWNER: &str = "test";
pub const REPO: &str = "repo";
pub const REPO_PATH: &str = "/repos/test/repo";
pub const CI_CONTEXT: &str = "continuous-integration/travis-ci/pr";

#[derive(Debug, Clone)]
enum Scripted {
    Ok(ApiResponse),
    Http { status: u16, message: String },
}

/// Fake [`ApiClient`] answering from a table keyed by method and path
///
/// Features:
/// - Fixed responses per (method, path); absolute URLs are their own key
/// - Error injection per (method, path)
/// - Every request is recorded for verification
/// - Unscripted GETs fail loudly, unscripted writes succeed with an empty body
pub struct ScriptedApi {
    routes: Mutex<HashMap<(Method, String), Scripted>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl ScriptedApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            routes: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    // === Scripting ===

    /// Answer `method path` with `response`
    pub fn respond(&self, method: Method, path: &str, response: ApiResponse) {
        self.routes
            .lock()
            .unwrap()
            .insert((method, path.to_string()), Scripted::Ok(response));
    }

    /// Answer `GET path` with `body`
    pub fn get(&self, path: &str, body: Value) {
        self.respond(Method::Get, path, ApiResponse::ok(body));
    }

    /// Make `method path` fail with an HTTP status
    pub fn fail(&self, method: Method, path: &str, status: u16, message: &str) {
        self.routes.lock().unwrap().insert(
            (method, path.to_string()),
            Scripted::Http {
                status,
                message: message.to_string(),
            },
        );
    }

    // === Call tracking ===

    /// All recorded requests, in order
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Requests sent to exactly `method path`
    pub fn calls_to(&self, method: Method, path: &str) -> Vec<ApiRequest> {
        self.calls()
            .into_iter()
            .filter(|c| c.method == method && c.path == path)
            .collect()
    }

    /// Number of requests sent to exactly `method path`
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.calls_to(method, path).len()
    }

    /// Number of requests with `method` whose path starts with `prefix`
    pub fn count_prefix(&self, method: Method, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.method == method && c.path.starts_with(prefix))
            .count()
    }

    /// Number of write requests (anything but GET)
    pub fn write_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| c.method != Method::Get)
            .count()
    }

    /// Total number of requests
    pub fn total(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ApiClient for ScriptedApi {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        self.calls.lock().unwrap().push(request.clone());

        let scripted = self
            .routes
            .lock()
            .unwrap()
            .get(&(request.method, request.path.clone()))
            .cloned();
        match scripted {
            Some(Scripted::Ok(response)) => Ok(response),
            Some(Scripted::Http { status, message }) => Err(Error::Http {
                status,
                path: request.path,
                message,
            }),
            None if request.method == Method::Get => Err(Error::Internal(format!(
                "unscripted request: GET {}",
                request.path
            ))),
            None => Ok(ApiResponse::ok(Value::Null)),
        }
    }
}

// === Fixtures ===

/// Repository handle over `api` with default page size and status context
pub fn github(api: &Arc<ScriptedApi>) -> GitHub {
    let client: Arc<dyn ApiClient> = api.clone();
    GitHub::new(client, RepoSlug::new(OWNER, REPO), 100, "ballot")
}

/// Fixed evaluation time used across tests
pub fn now() -> DateTime<Utc> {
    "2024-03-01T12:00:00Z".parse().unwrap()
}

/// `hours` before [`now`]
pub fn hours_ago(hours: i64) -> DateTime<Utc> {
    now() - Duration::hours(hours)
}

/// Statuses URL for `sha`
pub fn statuses_url(sha: &str) -> String {
    format!("https://api.github.com{REPO_PATH}/statuses/{sha}")
}

/// An open PR by `author` whose branch was last pushed at `pushed_at`
/// (`None` means the source branch was deleted)
pub fn make_pr(number: u64, title: &str, author: &str, pushed_at: Option<DateTime<Utc>>) -> PullRequest {
    let sha = format!("sha{number}");
    PullRequest {
        number,
        title: title.to_string(),
        body: Some("PR body".to_string()),
        html_url: format!("https://github.com/{OWNER}/{REPO}/pull/{number}"),
        user: Account {
            login: author.to_string(),
        },
        statuses_url: Some(statuses_url(&sha)),
        head: HeadRef {
            sha,
            repo: pushed_at.map(|pushed_at| HeadRepo { pushed_at }),
        },
        mergeable: None,
    }
}

/// Same PR as the direct fetch returns it, with `mergeable` filled in
pub fn with_mergeable(pr: &PullRequest, mergeable: Option<bool>) -> PullRequest {
    PullRequest {
        mergeable,
        ..pr.clone()
    }
}

pub fn pr_json(pr: &PullRequest) -> Value {
    serde_json::to_value(pr).unwrap()
}

pub fn reaction(login: &str, content: &str) -> Value {
    json!({ "user": { "login": login }, "content": content })
}

pub fn comment(login: &str, body: &str) -> Value {
    json!({ "user": { "login": login }, "body": body })
}

pub fn status(context: &str, state: &str) -> Value {
    json!({ "context": context, "state": state })
}

pub fn pr_path(number: u64) -> String {
    format!("{REPO_PATH}/pulls/{number}")
}

pub fn comments_path(number: u64) -> String {
    format!("{REPO_PATH}/issues/{number}/comments")
}

pub fn reviews_path(number: u64) -> String {
    format!("{REPO_PATH}/pulls/{number}/reviews")
}

pub fn review(login: &str, state: &str) -> Value {
    json!({ "user": { "login": login }, "state": state })
}

pub fn reactions_path(number: u64) -> String {
    format!("{REPO_PATH}/issues/{number}/reactions")
}

pub fn labels_path(number: u64) -> String {
    format!("{REPO_PATH}/issues/{number}/labels")
}

pub fn merge_path(number: u64) -> String {
    format!("{REPO_PATH}/pulls/{number}/merge")
}

pub fn status_post_path(sha: &str) -> String {
    format!("{REPO_PATH}/statuses/{sha}")
}

/// Script the open PR listing
pub fn script_open_prs(api: &ScriptedApi, prs: &[PullRequest]) {
    api.get(
        &format!("{REPO_PATH}/pulls"),
        Value::Array(prs.iter().map(pr_json).collect()),
    );
}

/// Script the direct PR fetch, with `mergeable` filled in
pub fn script_pr_fetch(api: &ScriptedApi, pr: &PullRequest, mergeable: Option<bool>) {
    api.get(&pr_path(pr.number), pr_json(&with_mergeable(pr, mergeable)));
}

/// Script comments and reactions on a PR, with no reviews
pub fn script_votes(api: &ScriptedApi, number: u64, comments: Vec<Value>, reactions: Vec<Value>) {
    script_reviews(api, number, Vec::new());
    api.get(&comments_path(number), Value::Array(comments));
    api.get(&reactions_path(number), Value::Array(reactions));
}

/// Script submitted reviews on a PR
pub fn script_reviews(api: &ScriptedApi, number: u64, reviews: Vec<Value>) {
    api.get(&reviews_path(number), Value::Array(reviews));
}

/// Script repository metadata (watcher count)
pub fn script_watchers(api: &ScriptedApi, watchers: u64) {
    api.get(REPO_PATH, json!({ "subscribers_count": watchers }));
}

/// Script the collaborator listing
pub fn script_collaborators(api: &ScriptedApi, logins: &[&str]) {
    api.get(
        &format!("{REPO_PATH}/collaborators"),
        Value::Array(logins.iter().map(|l| json!({ "login": l })).collect()),
    );
}

/// Script an account profile created at `created_at`
pub fn script_user(api: &ScriptedApi, login: &str, created_at: &str) {
    api.get(
        &format!("/users/{login}"),
        json!({ "login": login, "created_at": created_at }),
    );
}

/// Script established accounts for each of `logins`
pub fn script_users(api: &ScriptedApi, logins: &[&str]) {
    for login in logins {
        script_user(api, login, "2012-10-23T21:35:35Z");
    }
}

/// Script a single page of statuses for `sha`
pub fn script_statuses(api: &ScriptedApi, sha: &str, entries: Vec<Value>) {
    api.get(&statuses_url(sha), Value::Array(entries));
}

/// Script `pages` chained through `Link` headers starting at `first_url`.
///
/// Follow-up pages live at `{first_url}?page=N`.
pub fn script_status_pages(api: &ScriptedApi, first_url: &str, pages: Vec<Vec<Value>>) {
    let count = pages.len();
    for (i, entries) in pages.into_iter().enumerate() {
        let url = if i == 0 {
            first_url.to_string()
        } else {
            format!("{first_url}?page={}", i + 1)
        };
        let mut response = ApiResponse::ok(Value::Array(entries));
        if i + 1 < count {
            response = response.with_link(format!(
                r#"<{first_url}?page={}>; rel="next", <{first_url}?page={count}>; rel="last""#,
                i + 2
            ));
        }
        api.respond(Method::Get, &url, response);
    }
}

/// Script a successful merge producing `sha`
pub fn script_merge(api: &ScriptedApi, number: u64, sha: &str) {
    api.respond(
        Method::Put,
        &merge_path(number),
        ApiResponse::ok(json!({ "sha": sha, "merged": true, "message": "Pull Request successfully merged" })),
    );
}
