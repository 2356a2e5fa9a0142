//! Building adapters from credential bundles.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::errors::GlobalFoodError;
use crate::models::{CredentialBundle, ProviderKind};

use super::factual::FactualAdapter;
use super::foursquare::FoursquareAdapter;
use super::http::build_client;
use super::yelp::YelpAdapter;
use super::zomato::ZomatoAdapter;
use super::ProviderAdapter;

/// Turns a validated credential bundle into a live adapter.
///
/// The credential store calls `connect` whenever a provider's bundle becomes
/// valid or changes. Providers that report `requires_handshake` are connected
/// in the background; the rest are connected before `update` returns.
#[async_trait]
pub trait ProviderConnector: Send + Sync {
    /// Whether connecting `kind` involves a network round trip.
    fn requires_handshake(&self, kind: ProviderKind) -> bool;

    async fn connect(
        &self,
        kind: ProviderKind,
        bundle: &CredentialBundle,
    ) -> Result<Arc<dyn ProviderAdapter>, GlobalFoodError>;
}

/// Connector for the real HTTP adapters, sharing one reqwest client.
#[derive(Clone)]
pub struct HttpConnector {
    client: Client,
}

impl HttpConnector {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: build_client(timeout),
        }
    }
}

fn required<'a>(
    kind: ProviderKind,
    bundle: &'a CredentialBundle,
    field: &str,
) -> Result<&'a str, GlobalFoodError> {
    bundle
        .get(field)
        .ok_or_else(|| GlobalFoodError::InvalidCredentials {
            provider: kind,
            field: field.to_string(),
        })
}

#[async_trait]
impl ProviderConnector for HttpConnector {
    fn requires_handshake(&self, kind: ProviderKind) -> bool {
        matches!(kind, ProviderKind::Yelp)
    }

    async fn connect(
        &self,
        kind: ProviderKind,
        bundle: &CredentialBundle,
    ) -> Result<Arc<dyn ProviderAdapter>, GlobalFoodError> {
        debug!("Connecting {} adapter", kind);
        let client = self.client.clone();
        let adapter: Arc<dyn ProviderAdapter> = match kind {
            ProviderKind::Yelp => {
                let id = required(kind, bundle, "client_id")?;
                let secret = required(kind, bundle, "client_secret")?;
                Arc::new(YelpAdapter::authenticate(client, id, secret).await?)
            }
            ProviderKind::Foursquare => Arc::new(FoursquareAdapter::new(
                client,
                required(kind, bundle, "client_id")?,
                required(kind, bundle, "client_secret")?,
                bundle.get("version"),
                bundle.get("mode"),
            )),
            ProviderKind::Zomato => Arc::new(ZomatoAdapter::new(
                client,
                required(kind, bundle, "user_key")?,
            )),
            ProviderKind::Factual => Arc::new(FactualAdapter::new(
                client,
                required(kind, bundle, "key")?,
                required(kind, bundle, "secret")?,
            )),
        };
        Ok(adapter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connector() -> HttpConnector {
        HttpConnector::new(Duration::from_secs(1))
    }

    #[test]
    fn test_only_yelp_needs_a_handshake() {
        let connector = connector();
        assert!(connector.requires_handshake(ProviderKind::Yelp));
        assert!(!connector.requires_handshake(ProviderKind::Foursquare));
        assert!(!connector.requires_handshake(ProviderKind::Zomato));
        assert!(!connector.requires_handshake(ProviderKind::Factual));
    }

    #[tokio::test]
    async fn test_connect_local_adapters() {
        let connector = connector();

        let zomato = connector
            .connect(
                ProviderKind::Zomato,
                &CredentialBundle::new().with("user_key", "abc"),
            )
            .await
            .unwrap();
        assert_eq!(zomato.kind(), ProviderKind::Zomato);

        let factual = connector
            .connect(
                ProviderKind::Factual,
                &CredentialBundle::new().with("key", "k").with("secret", "s"),
            )
            .await
            .unwrap();
        assert_eq!(factual.kind(), ProviderKind::Factual);
    }

    #[tokio::test]
    async fn test_connect_reports_missing_field() {
        let result = connector()
            .connect(
                ProviderKind::Foursquare,
                &CredentialBundle::new().with("client_id", "id"),
            )
            .await;
        assert_eq!(
            result.err(),
            Some(GlobalFoodError::InvalidCredentials {
                provider: ProviderKind::Foursquare,
                field: "client_secret".to_string(),
            })
        );
    }
}
