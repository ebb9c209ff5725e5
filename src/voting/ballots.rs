//! Turning comments, reviews and reactions into votes

use crate::error::Result;
use crate::platform::GitHub;
use crate::types::{IssueComment, Polarity, PullRequest, PullRequestReview, Reaction, VoteMap};
use tracing::debug;

const THUMBS_UP: [&str; 2] = [":+1:", "\u{1F44D}"];
const THUMBS_DOWN: [&str; 2] = [":-1:", "\u{1F44E}"];

/// Vote expressed by a comment body.
///
/// A body containing both markers counts as a vote for.
pub fn parse_emojis_for_vote(body: &str) -> Option<Polarity> {
    if THUMBS_UP.iter().any(|m| body.contains(m)) {
        Some(Polarity::For)
    } else if THUMBS_DOWN.iter().any(|m| body.contains(m)) {
        Some(Polarity::Against)
    } else {
        None
    }
}

/// Vote expressed by a reaction's content
pub fn reaction_vote(content: &str) -> Option<Polarity> {
    match content {
        "+1" => Some(Polarity::For),
        "-1" => Some(Polarity::Against),
        _ => None,
    }
}

/// Vote expressed by a review's state
pub fn review_vote(state: &str) -> Option<Polarity> {
    match state {
        "APPROVED" => Some(Polarity::For),
        "CHANGES_REQUESTED" => Some(Polarity::Against),
        _ => None,
    }
}

/// Fold comment votes, then review votes, then reaction votes, into one
/// vote per voter.
///
/// Later entries win: a review overrides the same voter's comment and a
/// reaction overrides both. Within reviews the newest one counts.
pub fn collect_votes(
    comments: &[IssueComment],
    reviews: &[PullRequestReview],
    reactions: &[Reaction],
) -> VoteMap {
    let mut votes = VoteMap::new();
    for comment in comments {
        if let Some(vote) = comment.body.as_deref().and_then(parse_emojis_for_vote) {
            votes.insert(comment.user.login.clone(), vote);
        }
    }
    for review in reviews {
        if let Some(vote) = review_vote(&review.state) {
            votes.insert(review.user.login.clone(), vote);
        }
    }
    for reaction in reactions {
        if let Some(vote) = reaction_vote(&reaction.content) {
            votes.insert(reaction.user.login.clone(), vote);
        }
    }
    votes
}

/// Gather the current votes on `pr`
pub async fn fetch_votes(github: &GitHub, pr: &PullRequest, author_auto_vote: bool) -> Result<VoteMap> {
    let comments = github.pr_comments(pr.number).await?;
    let reviews = github.pr_reviews(pr.number).await?;
    let reactions = github.pr_reactions(pr.number).await?;
    let mut votes = collect_votes(&comments, &reviews, &reactions);
    if author_auto_vote {
        votes.insert(pr.user.login.clone(), Polarity::For);
    }
    debug!(pr_number = pr.number, voters = votes.len(), "collected votes");
    Ok(votes)
}
