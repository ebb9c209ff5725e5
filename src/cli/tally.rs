//! Inspection commands - tally and check-ci

use crate::cli::context::CommandContext;
use crate::cli::style::{CHECK, CROSS, Stylize};
use anstream::println;
use ballot_box::error::Result;
use ballot_box::format::seconds_to_human;
use ballot_box::readiness::voting_window_remaining;
use ballot_box::status::StatusGateway;
use ballot_box::verdict::EvaluationCycle;
use chrono::Utc;

/// Print the weighted tally for a PR
pub async fn run_tally(ctx: &CommandContext, pr_number: u64) -> Result<()> {
    let now = Utc::now();
    let pr = ctx.github.get_pr(pr_number).await?;
    let cycle = EvaluationCycle::new(&ctx.github, &ctx.config);
    let (tally, threshold) = cycle.tally(&pr, now).await?;

    println!("PR #{}: {}", pr.number, pr.title.emphasis());
    println!();
    for (voter, weighted) in &tally.weighted {
        let line = format!("{weighted:+.1}  @{voter}");
        if *weighted >= 0.0 {
            println!("  {}", line.success());
        } else {
            println!("  {}", line.warn());
        }
    }
    if tally.weighted.is_empty() {
        println!("  {}", "No votes yet.".muted());
    }
    println!();
    println!(
        "  for {:.1}, against {:.1}, net {:.1}, threshold {:.1}",
        tally.for_total,
        tally.against_total,
        tally.net(),
        threshold
    );

    let remaining = voting_window_remaining(&pr, ctx.config.voting.window_secs, now);
    println!(
        "  voting window remaining: {}",
        seconds_to_human(remaining).accent()
    );
    if tally.is_approved(threshold) {
        println!("  {}", format!("{CHECK} approved").success());
    } else {
        println!("  {}", format!("{CROSS} not approved").warn());
    }
    Ok(())
}

/// Print whether CI passed for a statuses URL
pub async fn run_check_ci(ctx: &CommandContext, statuses_url: &str) -> Result<()> {
    let gateway = StatusGateway::new(&ctx.github, ctx.config.ci.context.clone());
    if gateway.has_ci_build_passed(Some(statuses_url)).await? {
        println!("{}", format!("{CHECK} CI passed").success());
    } else {
        println!("{}", format!("{CROSS} CI not passing").warn());
    }
    Ok(())
}
