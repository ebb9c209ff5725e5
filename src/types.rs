//! Core types for ballot-box

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Repository identifier (`owner/name`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepoSlug {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepoSlug {
    /// Create a slug from its parts
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// API path prefix for this repository (`/repos/owner/name`)
    pub fn api_path(&self) -> String {
        format!("/repos/{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoSlug {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(Error::Config(format!(
                "repository must look like owner/name, got {s:?}"
            ))),
        }
    }
}

impl std::fmt::Display for RepoSlug {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A platform account reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Login name
    pub login: String,
}

/// Repository the PR's head branch lives in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadRepo {
    /// Last push to any branch of the source repository
    pub pushed_at: DateTime<Utc>,
}

/// Head (source) side of a pull request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeadRef {
    /// Head commit hash
    pub sha: String,
    /// Source repository; `None` once the author deleted it
    #[serde(default)]
    pub repo: Option<HeadRepo>,
}

/// Whether the platform considers a PR mergeable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mergeable {
    /// No conflicts with the base branch
    Yes,
    /// Conflicts with the base branch
    No,
    /// Still being computed by the platform
    Unknown,
}

impl From<Option<bool>> for Mergeable {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Self::Yes,
            Some(false) => Self::No,
            None => Self::Unknown,
        }
    }
}

/// A pull request as returned by the platform
///
/// The listing endpoint never fills `mergeable`; only a direct fetch does.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
    /// PR number
    pub number: u64,
    /// PR title
    pub title: String,
    /// PR description
    #[serde(default)]
    pub body: Option<String>,
    /// Web URL for the PR
    #[serde(default)]
    pub html_url: String,
    /// PR author
    pub user: Account,
    /// Head branch info
    pub head: HeadRef,
    /// URL of the head commit's status list
    #[serde(default)]
    pub statuses_url: Option<String>,
    /// Mergeability as reported by the platform
    #[serde(default)]
    pub mergeable: Option<bool>,
}

impl PullRequest {
    /// Last push to the source branch, `None` if it was deleted
    pub fn last_pushed_at(&self) -> Option<DateTime<Utc>> {
        self.head.repo.as_ref().map(|r| r.pushed_at)
    }

    /// Mergeability tri-state
    pub fn mergeable_state(&self) -> Mergeable {
        self.mergeable.into()
    }
}

/// Reaction attached to a PR
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reaction {
    /// Who reacted
    pub user: Account,
    /// Reaction content (`+1`, `-1`, `heart`, ...)
    pub content: String,
}

/// Comment on a PR
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueComment {
    /// Comment author
    pub user: Account,
    /// Comment body text
    #[serde(default)]
    pub body: Option<String>,
}

/// Submitted review on a PR
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequestReview {
    /// Reviewer
    pub user: Account,
    /// Review state (`APPROVED`, `CHANGES_REQUESTED`, `COMMENTED`, ...)
    pub state: String,
}

/// Account profile used by trust policies
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    /// Login name
    pub login: String,
    /// Account creation time
    pub created_at: DateTime<Utc>,
}

/// Direction of a single vote
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Polarity {
    /// Thumbs up
    For,
    /// Thumbs down
    Against,
}

impl Polarity {
    /// Raw vote value (+1 / -1)
    pub const fn value(self) -> f64 {
        match self {
            Self::For => 1.0,
            Self::Against => -1.0,
        }
    }
}

impl std::fmt::Display for Polarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::For => write!(f, "+1"),
            Self::Against => write!(f, "-1"),
        }
    }
}

/// One vote per voter; the login is the dedup key
pub type VoteMap = BTreeMap<String, Polarity>;

/// Commit status state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommitState {
    /// Voting or CI still in progress
    Pending,
    /// Passing
    Success,
    /// Failing
    Failure,
}

impl std::fmt::Display for CommitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

/// A single commit status entry posted by some integration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEntry {
    /// State string as reported (`success`, `failure`, `error`, `pending`)
    pub state: String,
    /// Context label identifying the integration
    pub context: String,
}

/// Outcome of evaluating one PR in one cycle
///
/// Never stored; labels and commit statuses are the only durable trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// Voting in progress, threshold not reached
    Pending,
    /// Threshold reached (in window, or waiting on CI)
    Accepted,
    /// Threshold not reached (or net opposition in window)
    Rejected,
    /// Merged into the base branch
    Merged {
        /// Resulting merge commit
        sha: String,
    },
    /// Conflicted past the stale threshold and closed
    ClosedStale,
    /// Source branch deleted; closed
    ClosedDeleted,
    /// Has conflicts, or the merge was rejected by the platform
    Conflicted,
    /// Not evaluated this cycle
    Skipped {
        /// Why evaluation was skipped
        reason: String,
    },
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
            Self::Merged { sha } => write!(f, "merged ({sha})"),
            Self::ClosedStale => write!(f, "closed (stale)"),
            Self::ClosedDeleted => write!(f, "closed (branch deleted)"),
            Self::Conflicted => write!(f, "conflicted"),
            Self::Skipped { reason } => write!(f, "skipped: {reason}"),
        }
    }
}
