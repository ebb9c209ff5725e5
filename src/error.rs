//! Error types for ballot-box

use thiserror::Error;

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// How the evaluation loop should treat an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// The PR stays open and is simply re-evaluated next cycle
    Recoverable,
    /// Platform inconsistency (e.g. a freshly listed PR that 404s); retry next cycle
    Transient,
    /// Unexpected failure; aborts the current PR's evaluation
    Fatal,
}

/// Errors produced by the bot
#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level GitHub failure (connection, TLS, client construction)
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// Non-2xx response from the platform
    #[error("HTTP {status} from {path}: {message}")]
    Http {
        /// Response status code
        status: u16,
        /// Request path or URL
        path: String,
        /// Message extracted from the response body
        message: String,
    },

    /// Merge rejected: PR not mergeable or head moved since evaluation
    #[error("couldn't merge PR #{pr_number}: {reason}")]
    CouldntMerge {
        /// PR number
        pr_number: u64,
        /// Platform-provided reason
        reason: String,
    },

    /// Platform returned inconsistent data for a resource it just listed
    #[error("transient lookup failure: {0}")]
    TransientLookup(String),

    /// Invalid or unreadable configuration
    #[error("config error: {0}")]
    Config(String),

    /// Response body did not match the expected shape
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Internal invariant violation
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// HTTP status code carried by this error, if any
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Classify the error for the evaluation loop
    pub const fn severity(&self) -> Severity {
        match self {
            Self::CouldntMerge { .. } => Severity::Recoverable,
            Self::TransientLookup(_) => Severity::Transient,
            _ => Severity::Fatal,
        }
    }
}
