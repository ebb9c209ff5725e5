//! Merge execution - effectful operations
//!
//! Sends the merge request built by [`build_merge_request`] and maps the
//! platform's rejection codes onto [`Error::CouldntMerge`].

use crate::error::{Error, Result};
use crate::merge::plan::build_merge_request;
use crate::platform::GitHub;
use crate::types::PullRequest;
use crate::voting::WeightedTally;
use tracing::{debug, info};

/// Platform status for "PR is not mergeable"
const NOT_MERGEABLE: u16 = 405;

/// Platform status for "head moved since the sha we pinned"
const HEAD_CHANGED: u16 = 409;

/// Merges accepted PRs
pub struct MergeExecutor<'a> {
    github: &'a GitHub,
}

impl<'a> MergeExecutor<'a> {
    /// Create an executor for the repository behind `github`
    pub const fn new(github: &'a GitHub) -> Self {
        Self { github }
    }

    /// Merge `pr`, returning the new commit sha.
    ///
    /// The request is pinned to the head sha captured at evaluation time, so
    /// commits pushed during voting make the merge fail instead of landing
    /// unreviewed.
    pub async fn merge(&self, pr: &PullRequest, tally: &WeightedTally, threshold: f64) -> Result<String> {
        let request = build_merge_request(self.github.repo(), pr, tally, threshold);
        debug!(pr_number = pr.number, sha = %request.sha, "merging PR");

        match self.github.merge_pr(pr.number, &request).await {
            Ok(sha) => {
                info!(pr_number = pr.number, %sha, "merged PR");
                Ok(sha)
            }
            Err(Error::Http {
                status: status @ (NOT_MERGEABLE | HEAD_CHANGED),
                message,
                ..
            }) => {
                debug!(pr_number = pr.number, status, %message, "merge rejected");
                Err(Error::CouldntMerge {
                    pr_number: pr.number,
                    reason: message,
                })
            }
            Err(e) => Err(e),
        }
    }
}
