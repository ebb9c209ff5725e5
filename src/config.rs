//! Bot configuration
//!
//! Loaded once at startup from TOML and handed to each component's
//! constructor. Every field has a default so partial files work.
//!
//! ```toml
//! per_page = 100
//!
//! [github]
//! repo = "octo/widgets"
//!
//! [voting]
//! window_secs = 10800
//! min_vote_fraction = 0.03
//!
//! [voting.trust]
//! reduced_logins = ["sockpuppet"]
//!
//! [readiness]
//! stale_hours = 36
//! ```

use crate::error::{Error, Result};
use crate::types::RepoSlug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Directory name under the platform config dir
const CONFIG_DIR_NAME: &str = "ballot";

/// Config filename
const CONFIG_FILE: &str = "config.toml";

/// Largest page size the platform accepts
const MAX_PER_PAGE: u32 = 100;

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Page size for every paginated listing
    pub per_page: u32,
    /// Platform connection settings
    pub github: GitHubSettings,
    /// Vote weighting and thresholds
    pub voting: VotingSettings,
    /// PR readiness rules
    pub readiness: ReadinessSettings,
    /// CI gating
    pub ci: CiSettings,
}

/// Platform connection settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    /// Repository to govern (`owner/name`)
    pub repo: String,
    /// API base URL
    pub api_base: String,
    /// Environment variable holding the API token
    pub token_env: String,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        Self {
            repo: String::new(),
            api_base: "https://api.github.com".to_string(),
            token_env: "GITHUB_TOKEN".to_string(),
        }
    }
}

/// Vote weighting and thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VotingSettings {
    /// Seconds after the last push during which voting stays open
    pub window_secs: u64,
    /// Fraction of watchers whose net weighted approval is required
    pub min_vote_fraction: f64,
    /// Count the PR author as an implicit +1
    pub author_auto_vote: bool,
    /// Trust weighting
    pub trust: TrustSettings,
}

impl Default for VotingSettings {
    fn default() -> Self {
        Self {
            window_secs: 3 * 60 * 60,
            min_vote_fraction: 0.03,
            author_auto_vote: true,
            trust: TrustSettings::default(),
        }
    }
}

/// Trust weighting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrustSettings {
    /// Multiplier for repository collaborators
    pub collaborator_weight: f64,
    /// Multiplier for accounts failing the trust check
    pub reduced_weight: f64,
    /// Logins that always get the reduced multiplier
    pub reduced_logins: Vec<String>,
    /// Accounts younger than this get the reduced multiplier (0 disables)
    pub min_account_age_days: u32,
}

impl Default for TrustSettings {
    fn default() -> Self {
        Self {
            collaborator_weight: 1.5,
            reduced_weight: 0.5,
            reduced_logins: Vec::new(),
            min_account_age_days: 0,
        }
    }
}

/// PR readiness rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadinessSettings {
    /// Hours after the last push before a conflicted PR is closed
    pub stale_hours: u64,
    /// Title marker for work-in-progress PRs
    pub wip_marker: String,
    /// Label applied to conflicted PRs
    pub conflict_label: String,
}

impl Default for ReadinessSettings {
    fn default() -> Self {
        Self {
            stale_hours: 36,
            wip_marker: "WIP".to_string(),
            conflict_label: "conflicts".to_string(),
        }
    }
}

/// CI gating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CiSettings {
    /// Status context that identifies the canonical CI build
    pub context: String,
    /// Context the bot posts its own vote status under
    pub status_context: String,
}

impl Default for CiSettings {
    fn default() -> Self {
        Self {
            context: "continuous-integration/travis-ci/pr".to_string(),
            status_context: "ballot".to_string(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            per_page: MAX_PER_PAGE,
            github: GitHubSettings::default(),
            voting: VotingSettings::default(),
            readiness: ReadinessSettings::default(),
            ci: CiSettings::default(),
        }
    }
}

impl BotConfig {
    /// Default config location (`<config dir>/ballot/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. Without one, the default location is
    /// used when present, otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without validating it
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_PER_PAGE).contains(&self.per_page) {
            return Err(Error::Config(format!(
                "per_page must be between 1 and {MAX_PER_PAGE}, got {}",
                self.per_page
            )));
        }
        if !(0.0..=1.0).contains(&self.voting.min_vote_fraction) {
            return Err(Error::Config(format!(
                "voting.min_vote_fraction must be within [0, 1], got {}",
                self.voting.min_vote_fraction
            )));
        }
        let trust = &self.voting.trust;
        for (name, weight) in [
            ("collaborator_weight", trust.collaborator_weight),
            ("reduced_weight", trust.reduced_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(Error::Config(format!(
                    "voting.trust.{name} must be a non-negative number, got {weight}"
                )));
            }
        }
        if !self.github.repo.is_empty() {
            self.repo()?;
        }
        Ok(())
    }

    /// The configured repository
    pub fn repo(&self) -> Result<RepoSlug> {
        if self.github.repo.is_empty() {
            return Err(Error::Config(
                "no repository configured (set github.repo or pass --repo)".to_string(),
            ));
        }
        self.github.repo.parse()
    }
}
