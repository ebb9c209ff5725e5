//! Run command - one evaluation cycle over every open PR

use crate::cli::context::CommandContext;
use crate::cli::style::{CHECK, CROSS, Stylize};
use anstream::println;
use async_trait::async_trait;
use ballot_box::error::{Error, Result};
use ballot_box::types::{PullRequest, Verdict};
use ballot_box::verdict::{CycleReport, ProgressCallback, run_cycle as run_evaluation_cycle};
use chrono::Utc;

/// Prints one line per evaluated PR
pub struct CliProgress;

#[async_trait]
impl ProgressCallback for CliProgress {
    async fn on_verdict(&self, pr: &PullRequest, verdict: &Verdict) {
        let label = match verdict {
            Verdict::Merged { .. } => verdict.to_string().success(),
            Verdict::Accepted => verdict.to_string().accent(),
            Verdict::Rejected | Verdict::Conflicted => verdict.to_string().warn(),
            Verdict::ClosedStale | Verdict::ClosedDeleted => verdict.to_string().error(),
            Verdict::Pending | Verdict::Skipped { .. } => verdict.to_string().muted(),
        };
        println!("  #{} {}  {}", pr.number, pr.title.emphasis(), label);
    }

    async fn on_error(&self, pr: &PullRequest, error: &Error) {
        println!(
            "  #{} {}  {}",
            pr.number,
            pr.title.emphasis(),
            format!("{CROSS} {error}").error()
        );
    }
}

/// Run one evaluation cycle
pub async fn run_cycle(ctx: &CommandContext) -> Result<()> {
    println!(
        "{} {}",
        "Evaluating open PRs in".emphasis(),
        ctx.github.repo().to_string().accent()
    );

    let report = run_evaluation_cycle(&ctx.github, &ctx.config, Utc::now(), &CliProgress).await?;
    print_cycle_summary(&report);
    Ok(())
}

fn print_cycle_summary(report: &CycleReport) {
    println!();
    if report.outcomes.is_empty() {
        println!("{}", "No open PRs.".muted());
        return;
    }

    let merged = report.merged();
    println!(
        "{} {} evaluated, {} merged, {} failed",
        format!("{CHECK} Cycle complete:").success(),
        report.outcomes.len().accent(),
        merged.len().accent(),
        report.failure_count().accent()
    );
}
