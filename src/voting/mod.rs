//! Trust-weighted voting
//!
//! Reactions, reviews and comment emojis become one vote per voter; each vote is
//! scaled by the voter's trust multiplier and the net result is compared
//! against a threshold sized by the repository's watcher count.

mod ballots;
mod tally;
mod weight;

pub use ballots::{collect_votes, fetch_votes, parse_emojis_for_vote, reaction_vote, review_vote};
pub use tally::{WeightedTally, approval_threshold, weighted_tally};
pub use weight::{AccountTrustPolicy, TrustPolicy, vote_weight};

use crate::config::VotingSettings;
use crate::error::{Error, Result};
use crate::platform::GitHub;
use crate::types::VoteMap;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use tokio::sync::OnceCell;
use tracing::debug;

/// Computes weights, tallies and thresholds for one repository.
///
/// The collaborator list and the threshold are fetched at most once per
/// aggregator; build a fresh one for every evaluation cycle.
pub struct VoteAggregator<'a> {
    github: &'a GitHub,
    settings: VotingSettings,
    policy: Box<dyn TrustPolicy>,
    collaborators: OnceCell<HashSet<String>>,
    threshold: OnceCell<f64>,
}

impl<'a> VoteAggregator<'a> {
    /// Aggregator using [`AccountTrustPolicy`] built from `settings`
    pub fn new(github: &'a GitHub, settings: VotingSettings) -> Self {
        let policy = Box::new(AccountTrustPolicy::from_settings(&settings.trust));
        Self::with_policy(github, settings, policy)
    }

    /// Aggregator with a custom trust policy
    pub fn with_policy(
        github: &'a GitHub,
        settings: VotingSettings,
        policy: Box<dyn TrustPolicy>,
    ) -> Self {
        Self {
            github,
            settings,
            policy,
            collaborators: OnceCell::new(),
            threshold: OnceCell::new(),
        }
    }

    /// Voting settings in effect
    pub const fn settings(&self) -> &VotingSettings {
        &self.settings
    }

    /// Collaborator logins, fetched on first use
    pub async fn collaborators(&self) -> Result<&HashSet<String>> {
        self.collaborators
            .get_or_try_init(|| async {
                let logins = self.github.collaborators().await?;
                debug!(count = logins.len(), "fetched collaborators");
                Ok::<_, Error>(logins.into_iter().collect())
            })
            .await
    }

    /// Trust multiplier for `voter`.
    ///
    /// Collaborators skip the profile lookup entirely.
    pub async fn weight(&self, voter: &str, is_collaborator: bool, now: DateTime<Utc>) -> Result<f64> {
        let is_reduced = if is_collaborator {
            false
        } else {
            let profile = self.github.user(voter).await?;
            self.policy.is_reduced(&profile, now)
        };
        Ok(vote_weight(&self.settings.trust, is_collaborator, is_reduced))
    }

    /// Weighted tally of `votes`
    pub async fn tally(&self, votes: &VoteMap, now: DateTime<Utc>) -> Result<WeightedTally> {
        let collaborators = self.collaborators().await?;

        let mut weights = HashMap::with_capacity(votes.len());
        for voter in votes.keys() {
            let weight = self
                .weight(voter, collaborators.contains(voter), now)
                .await?;
            weights.insert(voter.as_str(), weight);
        }

        let tally = weighted_tally(votes, |voter| weights.get(voter).copied().unwrap_or(1.0));
        debug!(
            for_total = tally.for_total,
            against_total = tally.against_total,
            net = tally.net(),
            "tallied votes"
        );
        Ok(tally)
    }

    /// Approval threshold for the repository, fetched on first use
    pub async fn threshold(&self) -> Result<f64> {
        self.threshold
            .get_or_try_init(|| async {
                let watchers = self.github.watcher_count().await?;
                let threshold = approval_threshold(watchers, self.settings.min_vote_fraction);
                debug!(watchers, threshold, "computed approval threshold");
                Ok::<_, Error>(threshold)
            })
            .await
            .copied()
    }
}
