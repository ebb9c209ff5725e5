//! Text of the comments the bot leaves when it closes a PR

/// Comment for a PR whose source branch no longer exists
pub fn deleted_branch_comment() -> String {
    ":no_entry: The source branch of this PR was deleted, so there is nothing \
     left to vote on. Closing it."
        .to_string()
}

/// Comment for a PR that stayed conflicted for `hours` after its last push
pub fn stale_comment(hours: u64) -> String {
    format!(
        ":hourglass: This PR has had merge conflicts for {hours} hours since its last \
         push. Closing it; rebase and open a new PR to try again."
    )
}
