//! Typed GitHub repository operations

use super::{ApiClient, ApiRequest, Method, Pages};
use crate::error::{Error, Result};
use crate::types::{
    Account, CommitState, IssueComment, PullRequest, PullRequestReview, Reaction, RepoSlug,
    StatusEntry, UserProfile,
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::debug;

/// Payload for the merge endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergeRequest {
    /// Merge commit title
    pub commit_title: String,
    /// Merge commit body
    pub commit_message: String,
    /// `merge`, `squash` or `rebase`
    pub merge_method: String,
    /// Head sha the merge is pinned to
    pub sha: String,
}

/// Repository-scoped GitHub operations over an [`ApiClient`]
#[derive(Clone)]
pub struct GitHub {
    client: Arc<dyn ApiClient>,
    repo: RepoSlug,
    per_page: u32,
    status_context: String,
}

impl GitHub {
    /// Create a repository handle
    pub fn new(
        client: Arc<dyn ApiClient>,
        repo: RepoSlug,
        per_page: u32,
        status_context: impl Into<String>,
    ) -> Self {
        Self {
            client,
            repo,
            per_page,
            status_context: status_context.into(),
        }
    }

    /// Repository this handle operates on
    pub const fn repo(&self) -> &RepoSlug {
        &self.repo
    }

    /// Underlying request executor
    pub fn client(&self) -> &dyn ApiClient {
        self.client.as_ref()
    }

    /// Configured page size
    pub const fn per_page(&self) -> u32 {
        self.per_page
    }

    fn path(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.repo.api_path())
    }

    fn paged<T: serde::de::DeserializeOwned>(&self, path: String) -> Pages<'_, T> {
        Pages::new(
            self.client(),
            ApiRequest::get(path).query("per_page", self.per_page),
        )
    }

    /// Open PRs, least recently updated first
    pub async fn list_open_prs(&self) -> Result<Vec<PullRequest>> {
        let request = ApiRequest::get(self.path("/pulls"))
            .query("state", "open")
            .query("sort", "updated")
            .query("direction", "asc")
            .query("per_page", self.per_page);
        let prs = Pages::new(self.client(), request).collect_all().await?;
        debug!(repo = %self.repo, count = prs.len(), "listed open PRs");
        Ok(prs)
    }

    /// Fetch a single PR, including its mergeability.
    ///
    /// A 404 right after the PR showed up in a listing is a known
    /// eventual-consistency gap and maps to [`Error::TransientLookup`].
    pub async fn get_pr(&self, pr_number: u64) -> Result<PullRequest> {
        let path = self.path(&format!("/pulls/{pr_number}"));
        match self.client.send(ApiRequest::get(path)).await {
            Ok(response) => Ok(serde_json::from_value(response.body)?),
            Err(Error::Http { status: 404, .. }) => Err(Error::TransientLookup(format!(
                "PR #{pr_number} not found yet"
            ))),
            Err(e) => Err(e),
        }
    }

    /// Replace all labels on a PR
    pub async fn set_labels(&self, pr_number: u64, labels: &[&str]) -> Result<()> {
        debug!(pr_number, ?labels, "setting labels");
        let request = ApiRequest::new(Method::Put, self.path(&format!("/issues/{pr_number}/labels")))
            .json(json!(labels));
        self.client.send(request).await?;
        Ok(())
    }

    /// Close a PR without merging
    pub async fn close_pr(&self, pr_number: u64) -> Result<()> {
        debug!(pr_number, "closing PR");
        let request = ApiRequest::new(Method::Patch, self.path(&format!("/pulls/{pr_number}")))
            .json(json!({ "state": "closed" }));
        self.client.send(request).await?;
        Ok(())
    }

    /// Post a comment on a PR
    pub async fn post_comment(&self, pr_number: u64, body: &str) -> Result<()> {
        debug!(pr_number, "posting comment");
        let request =
            ApiRequest::new(Method::Post, self.path(&format!("/issues/{pr_number}/comments")))
                .json(json!({ "body": body }));
        self.client.send(request).await?;
        Ok(())
    }

    /// Post the bot's commit status on `sha`
    pub async fn post_status(&self, sha: &str, state: CommitState, description: &str) -> Result<()> {
        debug!(sha, %state, "posting status");
        let request = ApiRequest::new(Method::Post, self.path(&format!("/statuses/{sha}"))).json(
            json!({
                "state": state,
                "description": description,
                "context": self.status_context,
            }),
        );
        self.client.send(request).await?;
        Ok(())
    }

    /// Merge a PR, returning the merge commit sha
    pub async fn merge_pr(&self, pr_number: u64, request: &MergeRequest) -> Result<String> {
        #[derive(Deserialize)]
        struct MergeResponse {
            sha: String,
        }

        let api_request =
            ApiRequest::new(Method::Put, self.path(&format!("/pulls/{pr_number}/merge")))
                .json(serde_json::to_value(request)?);
        let response = self.client.send(api_request).await?;
        let merged: MergeResponse = serde_json::from_value(response.body)?;
        Ok(merged.sha)
    }

    /// Logins with collaborator access
    pub async fn collaborators(&self) -> Result<Vec<String>> {
        let accounts: Vec<Account> = self.paged(self.path("/collaborators")).collect_all().await?;
        Ok(accounts.into_iter().map(|a| a.login).collect())
    }

    /// Account profile for `login`
    pub async fn user(&self, login: &str) -> Result<UserProfile> {
        let response = self
            .client
            .send(ApiRequest::get(format!("/users/{login}")))
            .await?;
        Ok(serde_json::from_value(response.body)?)
    }

    /// Number of accounts watching the repository
    pub async fn watcher_count(&self) -> Result<u64> {
        let response = self
            .client
            .send(ApiRequest::get(self.repo.api_path()))
            .await?;
        Ok(response
            .body
            .get("subscribers_count")
            .and_then(Value::as_u64)
            .unwrap_or(0))
    }

    /// Reactions on the PR itself
    pub async fn pr_reactions(&self, pr_number: u64) -> Result<Vec<Reaction>> {
        self.paged(self.path(&format!("/issues/{pr_number}/reactions")))
            .collect_all()
            .await
    }

    /// Comments on the PR (excluding the description)
    pub async fn pr_comments(&self, pr_number: u64) -> Result<Vec<IssueComment>> {
        self.paged(self.path(&format!("/issues/{pr_number}/comments")))
            .collect_all()
            .await
    }

    /// Submitted reviews, oldest first
    pub async fn pr_reviews(&self, pr_number: u64) -> Result<Vec<PullRequestReview>> {
        self.paged(self.path(&format!("/pulls/{pr_number}/reviews")))
            .collect_all()
            .await
    }

    /// Lazy cursor over the statuses at `statuses_url`
    pub fn status_pages(&self, statuses_url: &str) -> Pages<'_, StatusEntry> {
        self.paged(statuses_url.to_string())
    }
}
