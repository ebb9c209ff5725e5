//! Authentication for GitHub
//!
//! Supports an environment variable and the `gh` CLI.

use crate::error::{Error, Result};
use std::process::Command;
use tracing::debug;

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from CLI tool (gh)
    Cli,
    /// Token from environment variable
    EnvVar,
}

/// A resolved API token
#[derive(Debug, Clone)]
pub struct GitHubAuth {
    /// The token
    pub token: String,
    /// Where it came from
    pub source: AuthSource,
}

/// Resolve a token from `token_env`, falling back to `gh auth token`
pub fn get_github_auth(token_env: &str) -> Result<GitHubAuth> {
    resolve_github_auth(token_env, |name| std::env::var(name).ok(), gh_cli_token)
}

/// Token resolution with injectable lookups
pub fn resolve_github_auth(
    token_env: &str,
    env: impl Fn(&str) -> Option<String>,
    cli: impl Fn() -> Option<String>,
) -> Result<GitHubAuth> {
    if let Some(token) = env(token_env).filter(|t| !t.trim().is_empty()) {
        debug!(token_env, "using token from environment");
        return Ok(GitHubAuth {
            token: token.trim().to_string(),
            source: AuthSource::EnvVar,
        });
    }
    if let Some(token) = cli() {
        debug!("using token from gh CLI");
        return Ok(GitHubAuth {
            token,
            source: AuthSource::Cli,
        });
    }
    Err(Error::Config(format!(
        "no GitHub token found: set {token_env} or run 'gh auth login'"
    )))
}

fn gh_cli_token() -> Option<String> {
    let output = Command::new("gh").args(["auth", "token"]).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let token = String::from_utf8(output.stdout).ok()?;
    let token = token.trim();
    (!token.is_empty()).then(|| token.to_string())
}
