//! Shared command context for CLI commands
//!
//! Extracts common setup code shared by run, tally and check-ci.

use ballot_box::auth::get_github_auth;
use ballot_box::config::BotConfig;
use ballot_box::error::Result;
use ballot_box::platform::{GitHub, HttpClient};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Shared context for CLI commands that interact with the platform
///
/// This struct encapsulates the common setup:
/// - Loading and validating configuration
/// - Resolving the repository (flag overrides config)
/// - Resolving the API token
/// - Creating the platform client
pub struct CommandContext {
    /// Effective configuration
    pub config: BotConfig,
    /// Repository handle
    pub github: GitHub,
}

impl CommandContext {
    /// Create a new command context
    pub fn new(config_path: Option<&Path>, repo_override: Option<&str>) -> Result<Self> {
        let mut config = BotConfig::load(config_path)?;
        if let Some(repo) = repo_override {
            config.github.repo = repo.to_string();
        }
        let repo = config.repo()?;

        let auth = get_github_auth(&config.github.token_env)?;
        debug!(source = ?auth.source, %repo, "authenticated");

        let client = HttpClient::new(&config.github.api_base, &auth.token)?;
        let github = GitHub::new(
            Arc::new(client),
            repo,
            config.per_page,
            config.ci.status_context.clone(),
        );

        Ok(Self { config, github })
    }
}
