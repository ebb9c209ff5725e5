//! Weighted tally arithmetic (pure)

use crate::types::{Polarity, VoteMap};
use std::collections::BTreeMap;

/// Weighted result of one PR's votes
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WeightedTally {
    /// Raw votes by voter
    pub votes: VoteMap,
    /// Signed weighted vote by voter (polarity × multiplier)
    pub weighted: BTreeMap<String, f64>,
    /// Sum of weighted votes for
    pub for_total: f64,
    /// Absolute sum of weighted votes against
    pub against_total: f64,
}

impl WeightedTally {
    /// Net weighted support; compared against the approval threshold
    pub fn net(&self) -> f64 {
        self.for_total - self.against_total
    }

    /// Unweighted number of votes for
    pub fn raw_support(&self) -> usize {
        self.votes.values().filter(|v| **v == Polarity::For).count()
    }

    /// Unweighted number of votes against
    pub fn raw_opposition(&self) -> usize {
        self.votes.values().filter(|v| **v == Polarity::Against).count()
    }

    /// How far trust weighting moved the net result above plain support
    #[allow(clippy::cast_precision_loss)]
    pub fn margin_over_support(&self) -> f64 {
        self.net() - self.raw_support() as f64
    }

    /// Whether the net result clears `threshold`
    pub fn is_approved(&self, threshold: f64) -> bool {
        self.net() >= threshold
    }
}

/// Apply per-voter multipliers to `votes`
pub fn weighted_tally(votes: &VoteMap, mut weight_of: impl FnMut(&str) -> f64) -> WeightedTally {
    let mut tally = WeightedTally {
        votes: votes.clone(),
        ..WeightedTally::default()
    };
    for (voter, polarity) in votes {
        let weighted = polarity.value() * weight_of(voter);
        match polarity {
            Polarity::For => tally.for_total += weighted,
            Polarity::Against => tally.against_total += weighted.abs(),
        }
        tally.weighted.insert(voter.clone(), weighted);
    }
    tally
}

/// Net weighted approval a repository requires: `max(1, watchers × fraction)`
#[allow(clippy::cast_precision_loss)]
pub fn approval_threshold(watchers: u64, min_vote_fraction: f64) -> f64 {
    (watchers as f64 * min_vote_fraction).max(1.0)
}
