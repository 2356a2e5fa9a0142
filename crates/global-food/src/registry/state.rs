//! Per-provider lifecycle.
//!
//! ```text
//!                 valid bundle           handshake ok
//! Unconfigured ─────────────────▶ Authenticating ─────────▶ Ready
//!      ▲                               │                     │
//!      │ required field missing        │ handshake failed    │ bundle changed
//!      └───────────────────────────────┴──────▶ Failed ◀─────┘ (rebuild)
//! ```
//!
//! Providers without a handshake go straight from `Unconfigured` to `Ready`
//! or `Failed`.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::errors::GlobalFoodError;
use crate::models::SkipReason;
use crate::provider::ProviderAdapter;

/// Where a provider currently stands.
#[derive(Clone)]
pub enum ProviderState {
    Unconfigured,
    Authenticating,
    Ready(Arc<dyn ProviderAdapter>),
    Failed(GlobalFoodError),
}

impl ProviderState {
    pub fn adapter(&self) -> Option<Arc<dyn ProviderAdapter>> {
        match self {
            Self::Ready(adapter) => Some(Arc::clone(adapter)),
            _ => None,
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    /// Why a search would leave this provider out. `None` when ready.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Unconfigured => Some(SkipReason::NotConfigured),
            Self::Authenticating => Some(SkipReason::Authenticating),
            Self::Ready(_) => None,
            Self::Failed(error) => Some(SkipReason::Unavailable {
                error: error.clone(),
            }),
        }
    }

    /// Adapter-free view of the state.
    pub fn health(&self) -> ProviderHealth {
        match self {
            Self::Unconfigured => ProviderHealth::Unconfigured,
            Self::Authenticating => ProviderHealth::Authenticating,
            Self::Ready(_) => ProviderHealth::Ready,
            Self::Failed(error) => ProviderHealth::Failed {
                error: error.clone(),
            },
        }
    }
}

impl fmt::Debug for ProviderState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconfigured => write!(f, "Unconfigured"),
            Self::Authenticating => write!(f, "Authenticating"),
            Self::Ready(adapter) => write!(f, "Ready({})", adapter.kind()),
            Self::Failed(error) => write!(f, "Failed({})", error),
        }
    }
}

/// Serializable provider state, as reported by `GlobalFood::provider_states`.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ProviderHealth {
    Unconfigured,
    Authenticating,
    Ready,
    Failed { error: GlobalFoodError },
}

impl fmt::Display for ProviderHealth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconfigured => write!(f, "Unconfigured"),
            Self::Authenticating => write!(f, "Authenticating"),
            Self::Ready => write!(f, "Ready"),
            Self::Failed { error } => write!(f, "Failed: {}", error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProviderKind;
    use crate::test_support::FakeAdapter;

    #[test]
    fn test_skip_reasons() {
        assert_eq!(
            ProviderState::Unconfigured.skip_reason(),
            Some(SkipReason::NotConfigured)
        );
        assert_eq!(
            ProviderState::Authenticating.skip_reason(),
            Some(SkipReason::Authenticating)
        );

        let error = GlobalFoodError::InvalidCredentials {
            provider: ProviderKind::Zomato,
            field: "user_key".to_string(),
        };
        assert_eq!(
            ProviderState::Failed(error.clone()).skip_reason(),
            Some(SkipReason::Unavailable { error })
        );

        let ready = ProviderState::Ready(Arc::new(FakeAdapter::new(ProviderKind::Yelp)));
        assert_eq!(ready.skip_reason(), None);
        assert_eq!(ready.health(), ProviderHealth::Ready);
        assert_eq!(format!("{:?}", ready), "Ready(yelp)");
    }
}
