//! PR readiness classification
//!
//! Decides which open PRs are eligible for a verdict this cycle and performs
//! the housekeeping that may happen before voting ends: closing PRs whose
//! branch was deleted, labeling conflicts and closing stale conflicted PRs.
//!
//! Mergeability is only fetched once a PR is past its voting window. The
//! listing and single-PR endpoints disagree for a while after a PR is
//! created, and an early direct fetch can 404.

use crate::comments;
use crate::config::ReadinessSettings;
use crate::error::{Error, Result};
use crate::platform::GitHub;
use crate::types::{Mergeable, PullRequest};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Readiness of one PR at one point in time
#[derive(Debug, Clone, PartialEq)]
pub enum Readiness {
    /// Source branch deleted; the PR was closed
    ClosedDeleted,
    /// Title carries the work-in-progress marker
    WorkInProgress,
    /// Voting still open
    InWindow {
        /// Seconds until the window closes
        remaining_secs: f64,
    },
    /// Past the window and mergeable
    Ready,
    /// Past the window with conflicts; labeled, and closed once stale
    Conflicted {
        /// Whether the PR was closed as stale
        closed_stale: bool,
    },
    /// Platform hasn't computed mergeability yet
    MergeabilityUnknown,
}

/// Seconds since the last push to `pr`'s branch, or `None` if the branch is gone
#[allow(clippy::cast_precision_loss)]
pub fn seconds_since_push(pr: &PullRequest, now: DateTime<Utc>) -> Option<f64> {
    pr.last_pushed_at()
        .map(|pushed| (now - pushed).num_milliseconds() as f64 / 1000.0)
}

/// Seconds of voting left for `pr`; infinite when the branch is gone
#[allow(clippy::cast_precision_loss)]
pub fn voting_window_remaining(pr: &PullRequest, window_secs: u64, now: DateTime<Utc>) -> f64 {
    seconds_since_push(pr, now).map_or(f64::INFINITY, |elapsed| window_secs as f64 - elapsed)
}

/// Classifies open PRs for one repository
pub struct ReadinessEngine<'a> {
    github: &'a GitHub,
    settings: ReadinessSettings,
    window_secs: u64,
}

impl<'a> ReadinessEngine<'a> {
    /// Create an engine with the given voting window
    pub const fn new(github: &'a GitHub, settings: ReadinessSettings, window_secs: u64) -> Self {
        Self {
            github,
            settings,
            window_secs,
        }
    }

    fn is_wip(&self, pr: &PullRequest) -> bool {
        !self.settings.wip_marker.is_empty() && pr.title.contains(&self.settings.wip_marker)
    }

    /// Classify `pr`, performing any side effects its state calls for
    #[allow(clippy::cast_precision_loss)]
    pub async fn classify(&self, pr: &PullRequest, now: DateTime<Utc>) -> Result<Readiness> {
        let Some(elapsed) = seconds_since_push(pr, now) else {
            info!(pr_number = pr.number, "source branch deleted, closing");
            self.github
                .post_comment(pr.number, &comments::deleted_branch_comment())
                .await?;
            self.github.close_pr(pr.number).await?;
            return Ok(Readiness::ClosedDeleted);
        };

        if self.is_wip(pr) {
            debug!(pr_number = pr.number, "work in progress, skipping");
            return Ok(Readiness::WorkInProgress);
        }

        let window = self.window_secs as f64;
        if elapsed <= window {
            return Ok(Readiness::InWindow {
                remaining_secs: window - elapsed,
            });
        }

        let fresh = self.github.get_pr(pr.number).await?;
        match fresh.mergeable_state() {
            Mergeable::Yes => {
                self.github.set_labels(pr.number, &[]).await?;
                Ok(Readiness::Ready)
            }
            Mergeable::No => {
                self.github
                    .set_labels(pr.number, &[self.settings.conflict_label.as_str()])
                    .await?;
                let stale_after = self.settings.stale_hours as f64 * 3600.0;
                if elapsed < stale_after {
                    debug!(pr_number = pr.number, "conflicted, labeled");
                    return Ok(Readiness::Conflicted {
                        closed_stale: false,
                    });
                }
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let hours = (elapsed / 3600.0).round() as u64;
                info!(pr_number = pr.number, hours, "conflicted and stale, closing");
                self.github
                    .post_comment(pr.number, &comments::stale_comment(hours))
                    .await?;
                self.github.close_pr(pr.number).await?;
                Ok(Readiness::Conflicted { closed_stale: true })
            }
            Mergeable::Unknown => {
                debug!(pr_number = pr.number, "mergeability not computed yet");
                Ok(Readiness::MergeabilityUnknown)
            }
        }
    }

    /// Open PRs ready for a verdict, least recently updated first.
    ///
    /// Per-PR failures are logged and the PR is left for the next cycle.
    /// For callers that only want merge candidates; a full evaluation cycle
    /// classifies each PR itself.
    pub async fn ready_prs(&self, now: DateTime<Utc>) -> Result<Vec<PullRequest>> {
        let mut ready = Vec::new();
        for pr in self.github.list_open_prs().await? {
            match self.classify(&pr, now).await {
                Ok(Readiness::Ready) => ready.push(pr),
                Ok(_) => {}
                Err(e @ Error::TransientLookup(_)) => {
                    debug!(pr_number = pr.number, error = %e, "deferring PR");
                }
                Err(e) => warn!(pr_number = pr.number, error = %e, "failed to classify PR"),
            }
        }
        Ok(ready)
    }
}
