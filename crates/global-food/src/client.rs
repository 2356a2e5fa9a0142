//! GlobalFood client - the public entry point.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                            GlobalFood                             │
//! │                                                                   │
//! │  SearchRequest ─▶ CanonicalQuery ──────────────┐                  │
//! │                                                ▼                  │
//! │  Credentials ─▶ CredentialStore ─▶ snapshot ─▶ Aggregator         │
//! │                       │                        │  fan-out         │
//! │                       │ connect                ▼                  │
//! │                       ▼                  Yelp / Foursquare /      │
//! │               ProviderConnector          Zomato / Factual         │
//! │                                                │  fan-in          │
//! │                                                ▼                  │
//! │                                  merge ─▶ rank ─▶ AggregatedResult│
//! └───────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use log::debug;

use crate::aggregate::Aggregator;
use crate::config::Config;
use crate::errors::GlobalFoodError;
use crate::models::{
    AggregatedResult, CanonicalQuery, Credentials, ProviderKind, ProviderStatus, SearchRequest,
};
use crate::provider::{HttpConnector, ProviderConnector};
use crate::registry::{CredentialReport, CredentialStore, ProviderHealth, UpdateOutcome};

/// Credential-holding search facade over every supported provider.
///
/// Handles:
/// - Building provider adapters from credentials (Yelp in the background)
/// - Validating search requests
/// - Fanning each search out to ready providers and merging the results
pub struct GlobalFood {
    store: CredentialStore,
    aggregator: Aggregator,
}

impl GlobalFood {
    /// Create a client with default settings and the HTTP adapters.
    ///
    /// Providers needing a token handshake are still `Authenticating` when
    /// this returns; see [`wait_for_handshakes`](Self::wait_for_handshakes).
    pub async fn new(credentials: Credentials) -> Self {
        Self::with_config(credentials, Config::default()).await
    }

    pub async fn with_config(credentials: Credentials, config: Config) -> Self {
        let connector = Arc::new(HttpConnector::new(config.provider_timeout));
        Self::with_connector(credentials, config, connector).await
    }

    /// Create a client that builds adapters through `connector`.
    pub async fn with_connector(
        credentials: Credentials,
        config: Config,
        connector: Arc<dyn ProviderConnector>,
    ) -> Self {
        let client = Self {
            store: CredentialStore::new(connector),
            aggregator: Aggregator::new(config),
        };
        if !credentials.is_empty() {
            let report = client.store.update(&credentials).await;
            debug!("Initial credentials: {:?}", report.outcomes);
        }
        client
    }

    pub fn config(&self) -> &Config {
        self.aggregator.config()
    }

    /// Merge new credential fields into the stored ones.
    ///
    /// Only providers named in `partial` are touched, and only those whose
    /// bundle actually changed are rebuilt. Resending the bundle of a provider
    /// whose handshake failed reports `Unchanged`; call
    /// [`remove_credentials`](Self::remove_credentials) first to retry it.
    pub async fn set_credentials(&self, partial: &Credentials) -> CredentialReport {
        self.store.update(partial).await
    }

    /// Forget a provider's credentials.
    pub async fn remove_credentials(&self, kind: ProviderKind) -> UpdateOutcome {
        self.store.remove(kind).await
    }

    /// Search every ready provider and return the merged, ranked records.
    ///
    /// Provider failures are reported in the result's statuses. Errors are
    /// returned only for an invalid request or when no provider could take
    /// part.
    pub async fn search(&self, request: SearchRequest) -> Result<AggregatedResult, GlobalFoodError> {
        let query = CanonicalQuery::from_request(request, self.config().default_limit)?;
        let snapshot = self.store.snapshot();

        let mut result = self.aggregator.search(&query, &snapshot.ready).await?;
        for (kind, reason) in snapshot.unavailable {
            result
                .statuses
                .entry(kind)
                .or_insert(ProviderStatus::Skipped { reason });
        }
        Ok(result)
    }

    pub fn provider_states(&self) -> BTreeMap<ProviderKind, ProviderHealth> {
        self.store.states()
    }

    /// Wait for in-flight token handshakes to settle.
    pub async fn wait_for_handshakes(&self) {
        self.store.wait_for_handshakes().await
    }
}
