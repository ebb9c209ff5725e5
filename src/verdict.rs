//! End-to-end evaluation of open PRs
//!
//! One cycle walks the open PRs in listing order and, for each:
//!
//! - lets [`ReadinessEngine`] classify it (and close or label it if needed)
//! - inside the voting window, tallies votes and posts a pending, success or
//!   failure status
//! - past the window, posts the final vote status, gates on CI and merges
//!
//! Nothing is cached between cycles; labels and commit statuses written back
//! to the platform are the only memory the bot has.

use crate::config::BotConfig;
use crate::error::{Error, Result, Severity};
use crate::format::seconds_to_human;
use crate::merge::{MergeExecutor, votes_short_summary};
use crate::platform::GitHub;
use crate::readiness::{Readiness, ReadinessEngine, voting_window_remaining};
use crate::status::StatusGateway;
use crate::types::{CommitState, PullRequest, Verdict};
use crate::voting::{TrustPolicy, VoteAggregator, WeightedTally, fetch_votes};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Receives per-PR results as a cycle progresses
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// Called after a PR was evaluated
    async fn on_verdict(&self, pr: &PullRequest, verdict: &Verdict);

    /// Called when a PR's evaluation failed
    async fn on_error(&self, pr: &PullRequest, error: &Error);
}

/// Progress callback that ignores everything
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_verdict(&self, _pr: &PullRequest, _verdict: &Verdict) {}

    async fn on_error(&self, _pr: &PullRequest, _error: &Error) {}
}

/// Result for a single PR within a cycle
#[derive(Debug)]
pub struct PrOutcome {
    /// PR number
    pub pr_number: u64,
    /// PR title
    pub title: String,
    /// Verdict, or the error that aborted this PR's evaluation
    pub result: Result<Verdict>,
}

/// Everything that happened in one cycle
#[derive(Debug, Default)]
pub struct CycleReport {
    /// One entry per open PR, in processing order
    pub outcomes: Vec<PrOutcome>,
}

impl CycleReport {
    /// Numbers of PRs merged this cycle
    pub fn merged(&self) -> Vec<u64> {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.result, Ok(Verdict::Merged { .. })))
            .map(|o| o.pr_number)
            .collect()
    }

    /// Number of PRs whose evaluation failed
    pub fn failure_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_err()).count()
    }

    /// Verdict for `pr_number`, if it was evaluated successfully
    pub fn verdict(&self, pr_number: u64) -> Option<&Verdict> {
        self.outcomes
            .iter()
            .find(|o| o.pr_number == pr_number)
            .and_then(|o| o.result.as_ref().ok())
    }
}

/// Components for a single evaluation cycle
///
/// Per-repository caches (collaborators, threshold) live exactly as long
/// as this value.
pub struct EvaluationCycle<'a> {
    github: &'a GitHub,
    readiness: ReadinessEngine<'a>,
    votes: VoteAggregator<'a>,
    ci: StatusGateway<'a>,
    merger: MergeExecutor<'a>,
}

impl<'a> EvaluationCycle<'a> {
    /// Build a cycle using the default trust policy
    pub fn new(github: &'a GitHub, config: &BotConfig) -> Self {
        Self::with_votes(github, config, VoteAggregator::new(github, config.voting.clone()))
    }

    /// Build a cycle with a custom trust policy
    pub fn with_trust_policy(
        github: &'a GitHub,
        config: &BotConfig,
        policy: Box<dyn TrustPolicy>,
    ) -> Self {
        let votes = VoteAggregator::with_policy(github, config.voting.clone(), policy);
        Self::with_votes(github, config, votes)
    }

    fn with_votes(github: &'a GitHub, config: &BotConfig, votes: VoteAggregator<'a>) -> Self {
        Self {
            github,
            readiness: ReadinessEngine::new(
                github,
                config.readiness.clone(),
                config.voting.window_secs,
            ),
            votes,
            ci: StatusGateway::new(github, config.ci.context.clone()),
            merger: MergeExecutor::new(github),
        }
    }

    /// Weighted tally and threshold for `pr`
    pub async fn tally(&self, pr: &PullRequest, now: DateTime<Utc>) -> Result<(WeightedTally, f64)> {
        let votes = fetch_votes(self.github, pr, self.votes.settings().author_auto_vote).await?;
        let tally = self.votes.tally(&votes, now).await?;
        let threshold = self.votes.threshold().await?;
        Ok((tally, threshold))
    }

    async fn post_vote_status(
        &self,
        pr: &PullRequest,
        state: CommitState,
        now: DateTime<Utc>,
        tally: &WeightedTally,
        threshold: f64,
    ) -> Result<()> {
        let remaining = voting_window_remaining(pr, self.votes.settings().window_secs, now);
        let description = format!(
            "remaining: {}, {}",
            seconds_to_human(remaining),
            votes_short_summary(tally, threshold)
        );
        self.github
            .post_status(&pr.head.sha, state, &description)
            .await
    }

    /// Evaluate one PR
    pub async fn evaluate(&self, pr: &PullRequest, now: DateTime<Utc>) -> Result<Verdict> {
        let readiness = match self.readiness.classify(pr, now).await {
            Ok(readiness) => readiness,
            Err(e) if e.severity() == Severity::Transient => {
                debug!(pr_number = pr.number, error = %e, "deferring to next cycle");
                return Ok(Verdict::Skipped {
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        };

        match readiness {
            Readiness::ClosedDeleted => Ok(Verdict::ClosedDeleted),
            Readiness::WorkInProgress => Ok(Verdict::Skipped {
                reason: "work in progress".to_string(),
            }),
            Readiness::MergeabilityUnknown => Ok(Verdict::Skipped {
                reason: "mergeability not computed yet".to_string(),
            }),
            Readiness::Conflicted { closed_stale: true } => Ok(Verdict::ClosedStale),
            Readiness::Conflicted {
                closed_stale: false,
            } => Ok(Verdict::Conflicted),
            Readiness::InWindow { .. } => self.evaluate_in_window(pr, now).await,
            Readiness::Ready => self.evaluate_ready(pr, now).await,
        }
    }

    async fn evaluate_in_window(&self, pr: &PullRequest, now: DateTime<Utc>) -> Result<Verdict> {
        let (tally, threshold) = self.tally(pr, now).await?;
        let (verdict, state) = if tally.is_approved(threshold) {
            (Verdict::Accepted, CommitState::Success)
        } else if tally.net() < 0.0 {
            (Verdict::Rejected, CommitState::Failure)
        } else {
            (Verdict::Pending, CommitState::Pending)
        };
        self.post_vote_status(pr, state, now, &tally, threshold)
            .await?;
        debug!(pr_number = pr.number, %verdict, "voting still open");
        Ok(verdict)
    }

    async fn evaluate_ready(&self, pr: &PullRequest, now: DateTime<Utc>) -> Result<Verdict> {
        let (tally, threshold) = self.tally(pr, now).await?;

        if !tally.is_approved(threshold) {
            self.post_vote_status(pr, CommitState::Failure, now, &tally, threshold)
                .await?;
            info!(pr_number = pr.number, net = tally.net(), threshold, "vote failed");
            return Ok(Verdict::Rejected);
        }
        self.post_vote_status(pr, CommitState::Success, now, &tally, threshold)
            .await?;

        if !self
            .ci
            .has_ci_build_passed(pr.statuses_url.as_deref())
            .await?
        {
            info!(pr_number = pr.number, "vote passed, waiting on CI");
            return Ok(Verdict::Accepted);
        }

        match self.merger.merge(pr, &tally, threshold).await {
            Ok(sha) => Ok(Verdict::Merged { sha }),
            Err(e) if e.severity() == Severity::Recoverable => {
                warn!(pr_number = pr.number, error = %e, "merge rejected, will retry next cycle");
                Ok(Verdict::Conflicted)
            }
            Err(e) => Err(e),
        }
    }

    /// Evaluate every open PR, sequentially.
    ///
    /// Only a failure to list PRs fails the whole cycle; anything else is
    /// recorded against the PR it happened on.
    ///
    /// Every PR is classified here rather than through
    /// [`ReadinessEngine::ready_prs`], since PRs still in their voting
    /// window get a vote status too.
    pub async fn run(&self, now: DateTime<Utc>, progress: &dyn ProgressCallback) -> Result<CycleReport> {
        let prs = self.github.list_open_prs().await?;
        info!(repo = %self.github.repo(), count = prs.len(), "starting evaluation cycle");

        let mut report = CycleReport::default();
        for pr in prs {
            let result = self.evaluate(&pr, now).await;
            match &result {
                Ok(verdict) => progress.on_verdict(&pr, verdict).await,
                Err(e) => {
                    warn!(pr_number = pr.number, error = %e, "evaluation failed");
                    progress.on_error(&pr, e).await;
                }
            }
            report.outcomes.push(PrOutcome {
                pr_number: pr.number,
                title: pr.title,
                result,
            });
        }

        info!(
            merged = report.merged().len(),
            failed = report.failure_count(),
            "finished evaluation cycle"
        );
        Ok(report)
    }
}

/// Run one cycle with fresh per-repository caches
pub async fn run_cycle(
    github: &GitHub,
    config: &BotConfig,
    now: DateTime<Utc>,
    progress: &dyn ProgressCallback,
) -> Result<CycleReport> {
    EvaluationCycle::new(github, config).run(now, progress).await
}
