//! ballot-box: reaction-voted pull request governance for GitHub
//!
//! Each evaluation cycle classifies the open PRs of a repository, tallies
//! trust-weighted thumbs-up/down votes against a threshold sized by the
//! repository's watcher count, gates accepted PRs on CI, and merges them
//! pinned to the head commit that was voted on.

pub mod auth;
pub mod comments;
pub mod config;
pub mod error;
pub mod format;
pub mod merge;
pub mod platform;
pub mod readiness;
pub mod status;
pub mod types;
pub mod verdict;
pub mod voting;
