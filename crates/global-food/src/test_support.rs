//! Fakes shared by the unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::errors::GlobalFoodError;
use crate::models::{CanonicalQuery, CanonicalRecord, Coordinates, CredentialBundle, ProviderKind};
use crate::provider::{
    ProviderAdapter, ProviderCapabilities, ProviderConnector, ProviderRequest, ProviderResponse,
    Translation,
};

pub(crate) fn record(
    kind: ProviderKind,
    native_id: &str,
    name: &str,
    lat: f64,
    lng: f64,
    rank: usize,
) -> CanonicalRecord {
    CanonicalRecord::new(kind, native_id, name, Coordinates::new(lat, lng), rank)
}

/// Adapter that replays canned records (or a canned error).
pub(crate) struct FakeAdapter {
    kind: ProviderKind,
    capabilities: ProviderCapabilities,
    records: Vec<CanonicalRecord>,
    failure: Option<GlobalFoodError>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl FakeAdapter {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            capabilities: ProviderCapabilities {
                supports_coordinates: true,
                supports_place: true,
                max_limit: 50,
                max_radius_meters: None,
                rating_scale: 5.0,
            },
            records: Vec::new(),
            failure: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_records(mut self, records: Vec<CanonicalRecord>) -> Self {
        self.records = records;
        self
    }

    pub fn failing(mut self, error: GlobalFoodError) -> Self {
        self.failure = Some(error);
        self
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn coordinates_only(mut self) -> Self {
        self.capabilities.supports_place = false;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProviderAdapter for FakeAdapter {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn capabilities(&self) -> ProviderCapabilities {
        self.capabilities.clone()
    }

    fn translate_query(&self, query: &CanonicalQuery) -> Translation {
        match self.capabilities.location_gap(query) {
            Some(reason) => Translation::Skip(reason),
            None => Translation::Request(
                ProviderRequest::new(format!("fake://{}", self.kind))
                    .param("limit", query.limit),
            ),
        }
    }

    async fn execute_search(
        &self,
        _request: &ProviderRequest,
    ) -> Result<ProviderResponse, GlobalFoodError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = &self.failure {
            return Err(error.clone());
        }
        let body = serde_json::to_value(&self.records)
            .map_err(|e| GlobalFoodError::provider(self.kind, e.to_string()))?;
        Ok(ProviderResponse { body })
    }

    fn normalize_response(
        &self,
        response: ProviderResponse,
    ) -> Result<Vec<CanonicalRecord>, GlobalFoodError> {
        serde_json::from_value(response.body)
            .map_err(|e| GlobalFoodError::provider(self.kind, e.to_string()))
    }
}

/// Connector that builds `FakeAdapter`s and counts how often it was asked to.
///
/// Kinds listed in `handshake` sleep for `handshake_delay` first. A bundle
/// whose `client_secret` is `"bad"` fails the handshake.
pub(crate) struct FakeConnector {
    handshake: Vec<ProviderKind>,
    handshake_delay: Duration,
    builds: AtomicUsize,
    completed: Mutex<Vec<String>>,
}

impl FakeConnector {
    pub fn new() -> Self {
        Self {
            handshake: vec![ProviderKind::Yelp],
            handshake_delay: Duration::from_millis(100),
            builds: AtomicUsize::new(0),
            completed: Mutex::new(Vec::new()),
        }
    }

    pub fn with_handshake_delay(mut self, delay: Duration) -> Self {
        self.handshake_delay = delay;
        self
    }

    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::SeqCst)
    }

    /// `client_secret`/`user_key`/`secret` of every connect that ran to the end.
    pub fn completed(&self) -> Vec<String> {
        self.completed.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderConnector for FakeConnector {
    fn requires_handshake(&self, kind: ProviderKind) -> bool {
        self.handshake.contains(&kind)
    }

    async fn connect(
        &self,
        kind: ProviderKind,
        bundle: &CredentialBundle,
    ) -> Result<Arc<dyn ProviderAdapter>, GlobalFoodError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        if self.requires_handshake(kind) {
            tokio::time::sleep(self.handshake_delay).await;
        }

        let secret = ["client_secret", "user_key", "secret"]
            .iter()
            .find_map(|field| bundle.get(field))
            .unwrap_or_default()
            .to_string();
        self.completed.lock().unwrap().push(secret.clone());

        if secret == "bad" {
            return Err(GlobalFoodError::AuthHandshakeFailed {
                provider: kind,
                message: "HTTP 400 - invalid client".to_string(),
            });
        }
        Ok(Arc::new(FakeAdapter::new(kind)))
    }
}
