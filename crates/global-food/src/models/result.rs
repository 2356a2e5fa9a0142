//! Search output and per-provider diagnostics.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{CanonicalRecord, ProviderKind};
use crate::errors::GlobalFoodError;

/// Why a provider did not take part in a search.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    /// No usable credentials were ever supplied.
    NotConfigured,

    /// Credentials are set, the token exchange has not finished yet.
    Authenticating,

    /// Credentials were rejected or the client could not be built.
    Unavailable { error: GlobalFoodError },

    /// The provider needs coordinates and the query only had a place.
    MissingCoordinates,

    /// The provider needs a free-text place and the query had none.
    MissingPlace,
}

/// Outcome for one provider in one search.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProviderStatus {
    /// Records contributed after validation.
    Succeeded { count: usize },
    Failed { error: GlobalFoodError },
    Skipped { reason: SkipReason },
}

impl ProviderStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

/// Ranked, deduplicated records plus how each provider fared.
#[derive(Clone, Debug, Serialize)]
pub struct AggregatedResult {
    pub records: Vec<CanonicalRecord>,
    pub statuses: BTreeMap<ProviderKind, ProviderStatus>,
    pub completed_at: DateTime<Utc>,
}

impl AggregatedResult {
    pub fn status(&self, provider: ProviderKind) -> Option<&ProviderStatus> {
        self.statuses.get(&provider)
    }

    /// Check if any provider succeeded.
    pub fn has_success(&self) -> bool {
        self.statuses.values().any(ProviderStatus::is_success)
    }

    /// Get all provider errors.
    pub fn errors(&self) -> Vec<(ProviderKind, &GlobalFoodError)> {
        self.statuses
            .iter()
            .filter_map(|(kind, status)| match status {
                ProviderStatus::Failed { error } => Some((*kind, error)),
                _ => None,
            })
            .collect()
    }

    /// Summary for logging/debugging.
    pub fn summary(&self) -> String {
        self.statuses
            .iter()
            .map(|(kind, status)| match status {
                ProviderStatus::Succeeded { count } => format!("{}: SUCCESS ({})", kind, count),
                ProviderStatus::Failed { error } => format!("{}: ERROR ({})", kind, error),
                ProviderStatus::Skipped { reason } => format!("{}: SKIPPED ({:?})", kind, reason),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}
