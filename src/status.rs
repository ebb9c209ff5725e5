//! CI gate over a commit's status list
//!
//! Pages are fetched one at a time and scanning stops at the first entry
//! whose context matches the configured CI context. No statuses URL, or no
//! matching context anywhere, counts as a pass: missing CI never blocks a
//! merge.

use crate::error::Result;
use crate::platform::GitHub;
use tracing::debug;

/// Answers "did the CI build pass?" for a commit
pub struct StatusGateway<'a> {
    github: &'a GitHub,
    ci_context: String,
}

impl<'a> StatusGateway<'a> {
    /// Create a gateway that looks for `ci_context`
    pub fn new(github: &'a GitHub, ci_context: impl Into<String>) -> Self {
        Self {
            github,
            ci_context: ci_context.into(),
        }
    }

    /// Whether the CI context reported success
    pub async fn has_ci_build_passed(&self, statuses_url: Option<&str>) -> Result<bool> {
        let Some(url) = statuses_url.filter(|u| !u.is_empty()) else {
            debug!("no statuses URL, treating CI as passed");
            return Ok(true);
        };

        let mut pages = self.github.status_pages(url);
        while let Some(page) = pages.next_page().await? {
            if let Some(entry) = page.items.iter().find(|s| s.context == self.ci_context) {
                debug!(
                    context = %entry.context,
                    state = %entry.state,
                    pages = pages.fetched(),
                    "found CI status"
                );
                return Ok(entry.state == "success");
            }
        }

        debug!(
            pages = pages.fetched(),
            context = %self.ci_context,
            "CI context not found, treating as passed"
        );
        Ok(true)
    }
}
