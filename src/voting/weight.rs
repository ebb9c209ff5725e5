//! Trust weighting for voters

use crate::config::TrustSettings;
use crate::types::UserProfile;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;

/// Decides whether an account gets the reduced multiplier
pub trait TrustPolicy: Send + Sync {
    /// `true` when `profile` fails the trust check at `now`
    fn is_reduced(&self, profile: &UserProfile, now: DateTime<Utc>) -> bool;
}

/// Default policy: an explicit login list plus a minimum account age
#[derive(Debug, Clone, Default)]
pub struct AccountTrustPolicy {
    reduced_logins: HashSet<String>,
    min_account_age: Option<Duration>,
}

impl AccountTrustPolicy {
    /// Build the policy from configuration
    pub fn from_settings(settings: &TrustSettings) -> Self {
        Self {
            reduced_logins: settings
                .reduced_logins
                .iter()
                .map(|l| l.to_lowercase())
                .collect(),
            min_account_age: (settings.min_account_age_days > 0)
                .then(|| Duration::days(i64::from(settings.min_account_age_days))),
        }
    }
}

impl TrustPolicy for AccountTrustPolicy {
    fn is_reduced(&self, profile: &UserProfile, now: DateTime<Utc>) -> bool {
        if self.reduced_logins.contains(&profile.login.to_lowercase()) {
            return true;
        }
        self.min_account_age
            .is_some_and(|min| now - profile.created_at < min)
    }
}

/// Multiplier for a voter
pub fn vote_weight(settings: &TrustSettings, is_collaborator: bool, is_reduced: bool) -> f64 {
    if is_collaborator {
        settings.collaborator_weight
    } else if is_reduced {
        settings.reduced_weight
    } else {
        1.0
    }
}
