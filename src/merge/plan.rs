//! Merge payload construction - pure functions
//!
//! No I/O happens here; everything is derived from the PR and its tally,
//! which keeps the commit text easy to unit test.

use crate::platform::MergeRequest;
use crate::types::{Polarity, PullRequest, RepoSlug};
use crate::voting::WeightedTally;
use std::fmt::Write;

/// Long vote summary used in merge commit bodies
pub fn votes_summary(tally: &WeightedTally, threshold: f64) -> String {
    format!(
        "with a vote of {} for and {} against, with a weighted total of {:.1} and a threshold of {:.1}",
        tally.raw_support(),
        tally.raw_opposition(),
        tally.net(),
        threshold
    )
}

/// Short vote summary used in commit status descriptions
pub fn votes_short_summary(tally: &WeightedTally, threshold: f64) -> String {
    format!(
        "vote: {}-{}, weighted total: {:.1}, threshold: {:.1}",
        tally.raw_support(),
        tally.raw_opposition(),
        tally.net(),
        threshold
    )
}

/// One line per voter, alphabetical
pub fn voting_record(tally: &WeightedTally) -> String {
    let mut record = String::new();
    for (voter, vote) in &tally.votes {
        let emoji = match vote {
            Polarity::For => ":white_check_mark:",
            Polarity::Against => ":no_entry:",
        };
        let _ = writeln!(record, "@{voter}: {emoji}");
    }
    record.trim_end().to_string()
}

/// Web URL of the PR, derived from the repo when the platform omitted it
fn pr_url(repo: &RepoSlug, pr: &PullRequest) -> String {
    if pr.html_url.is_empty() {
        format!("https://github.com/{repo}/pull/{}", pr.number)
    } else {
        pr.html_url.clone()
    }
}

/// Build the merge request for `pr`, pinned to its evaluated head sha
pub fn build_merge_request(
    repo: &RepoSlug,
    pr: &PullRequest,
    tally: &WeightedTally,
    threshold: f64,
) -> MergeRequest {
    let record = voting_record(tally);
    let record = if record.is_empty() {
        String::new()
    } else {
        format!("Vote record:\n{record}")
    };

    let commit_message = format!(
        "{url}: {title}\n\nDescription:\n{description}\n\n:ok_woman: PR passed {summary}.\n\n{record}",
        url = pr_url(repo, pr),
        title = pr.title,
        description = pr.body.as_deref().unwrap_or_default(),
        summary = votes_summary(tally, threshold),
    );

    MergeRequest {
        commit_title: format!("merging PR #{}: {}", pr.number, pr.title),
        commit_message: commit_message.trim().to_string(),
        merge_method: "merge".to_string(),
        sha: pr.head.sha.clone(),
    }
}
