//! Error types and scope classification for GlobalFood.
//!
//! This module provides:
//! - [`GlobalFoodError`]: The error enum shared by every component
//! - [`ErrorScope`]: Whether an error stays with one provider or ends the search

mod scope;

pub use scope::ErrorScope;

use serde::Serialize;
use thiserror::Error;

use crate::models::ProviderKind;

/// Errors that can occur while configuring providers or searching.
///
/// Provider-scoped variants are recorded in the per-provider status of an
/// [`AggregatedResult`](crate::models::AggregatedResult); only search-scoped
/// variants are returned from `search`.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GlobalFoodError {
    /// A required credential field is present but unusable.
    #[error("Invalid credentials: {provider} - field '{field}' is blank")]
    InvalidCredentials {
        provider: ProviderKind,
        field: String,
    },

    /// The provider rejected the token exchange.
    #[error("Auth handshake failed: {provider} - {message}")]
    AuthHandshakeFailed {
        provider: ProviderKind,
        message: String,
    },

    /// Network failure or timeout talking to the provider.
    #[error("Transport error: {provider} - {message}")]
    Transport {
        provider: ProviderKind,
        message: String,
    },

    /// Non-success response or a payload we could not parse.
    #[error("Provider error: {provider} - {message}")]
    Provider {
        provider: ProviderKind,
        message: String,
    },

    /// No configured provider could take part in the search.
    #[error("No providers available")]
    NoProviderAvailable,

    /// Malformed caller input (search request or credential document).
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl GlobalFoodError {
    pub(crate) fn transport(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::Transport {
            provider,
            message: message.into(),
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub(crate) fn provider(provider: ProviderKind, message: impl Into<String>) -> Self {
        Self::Provider {
            provider,
            message: message.into(),
        }
    }

    /// Returns whether this error stays with one provider or ends the search.
    ///
    /// # Examples
    ///
    /// ```
    /// use global_food::errors::{ErrorScope, GlobalFoodError};
    /// use global_food::ProviderKind;
    ///
    /// let error = GlobalFoodError::Transport {
    ///     provider: ProviderKind::Yelp,
    ///     message: "timed out".to_string(),
    /// };
    /// assert_eq!(error.scope(), ErrorScope::Provider);
    ///
    /// assert_eq!(GlobalFoodError::NoProviderAvailable.scope(), ErrorScope::Search);
    /// ```
    pub fn scope(&self) -> ErrorScope {
        match self {
            Self::InvalidCredentials { .. }
            | Self::AuthHandshakeFailed { .. }
            | Self::Transport { .. }
            | Self::Provider { .. } => ErrorScope::Provider,

            Self::NoProviderAvailable | Self::InvalidInput { .. } => ErrorScope::Search,
        }
    }

    /// The provider this error belongs to, if any.
    pub fn provider_kind(&self) -> Option<ProviderKind> {
        match self {
            Self::InvalidCredentials { provider, .. }
            | Self::AuthHandshakeFailed { provider, .. }
            | Self::Transport { provider, .. }
            | Self::Provider { provider, .. } => Some(*provider),
            Self::NoProviderAvailable | Self::InvalidInput { .. } => None,
        }
    }
}
