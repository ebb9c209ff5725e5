//! Race-safe merging of accepted PRs
//!
//! Two-phase pattern:
//! 1. Plan - build the merge payload (pure, testable)
//! 2. Execute - send it and classify failures (effectful)

mod execute;
mod plan;

pub use execute::MergeExecutor;
pub use plan::{build_merge_request, votes_short_summary, votes_summary, voting_record};
