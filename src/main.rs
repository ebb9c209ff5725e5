//! `ballot` - run reaction-voted PR governance against a GitHub repository

mod cli;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ballot", version, about = "Reaction-voted pull request governance for GitHub")]
struct Cli {
    /// Path to the config file (defaults to <config dir>/ballot/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Repository to govern (owner/name), overrides the config file
    #[arg(long, global = true)]
    repo: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate every open PR once: label, close, post statuses and merge
    Run,
    /// Show the weighted vote tally for a PR
    Tally {
        /// PR number
        pr: u64,
    },
    /// Check whether CI passed for a commit's statuses URL
    CheckCi {
        /// Statuses URL of the commit
        statuses_url: String,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "ballot_box=debug" } else { "ballot_box=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = cli::CommandContext::new(cli.config.as_deref(), cli.repo.as_deref())?;

    match cli.command {
        Commands::Run => cli::run_cycle(&ctx).await?,
        Commands::Tally { pr } => cli::run_tally(&ctx, pr).await?,
        Commands::CheckCi { statuses_url } => cli::run_check_ci(&ctx, &statuses_url).await?,
    }

    Ok(())
}
