//! Provider adapter trait definitions.
//!
//! This module defines the `ProviderAdapter` trait that every restaurant-data
//! backend implements, plus the provider-neutral request/response envelopes
//! that travel between translation, execution and normalization.

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::GlobalFoodError;
use crate::models::{CanonicalQuery, CanonicalRecord, ProviderKind, SkipReason};

use super::capabilities::ProviderCapabilities;

/// A provider-specific search call, built from a canonical query.
///
/// Holds only search parameters. Credentials stay inside the adapter's client.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderRequest {
    pub url: String,
    pub params: Vec<(String, String)>,
}

impl ProviderRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            params: Vec::new(),
        }
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn param_opt(self, key: impl Into<String>, value: Option<impl ToString>) -> Self {
        match value {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Raw decoded payload returned by a provider.
#[derive(Clone, Debug, PartialEq)]
pub struct ProviderResponse {
    pub body: Value,
}

/// Outcome of translating a canonical query for one provider.
#[derive(Clone, Debug, PartialEq)]
pub enum Translation {
    Request(ProviderRequest),
    /// The provider cannot express this query and sits the search out.
    Skip(SkipReason),
}

/// Trait for restaurant-data providers.
///
/// Implement this trait to add a new backend. An adapter owns its
/// authenticated client; rebuilding credentials creates a new adapter rather
/// than mutating an existing one.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use global_food::provider::{ProviderAdapter, ProviderCapabilities, Translation};
///
/// struct MyProvider {
///     api_key: String,
/// }
///
/// #[async_trait]
/// impl ProviderAdapter for MyProvider {
///     fn kind(&self) -> ProviderKind {
///         ProviderKind::Zomato
///     }
///
///     fn capabilities(&self) -> ProviderCapabilities {
///         ProviderCapabilities {
///             supports_coordinates: true,
///             supports_place: false,
///             max_limit: 20,
///             max_radius_meters: None,
///             rating_scale: 5.0,
///         }
///     }
///
///     // ... translate_query, execute_search, normalize_response
/// }
/// ```
#[async_trait]
pub trait ProviderAdapter: Send + Sync {
    /// Which backend this adapter talks to.
    fn kind(&self) -> ProviderKind;

    /// Describes what location input and limits the provider accepts.
    fn capabilities(&self) -> ProviderCapabilities;

    /// Build the provider call for a canonical query.
    ///
    /// Returns [`Translation::Skip`] when the query lacks something the
    /// provider needs. Skipping is not an error.
    fn translate_query(&self, query: &CanonicalQuery) -> Translation;

    /// Perform the remote call.
    ///
    /// # Returns
    ///
    /// The decoded payload, `Transport` on network failure or timeout, or
    /// `Provider` on a non-success status or unparseable body.
    async fn execute_search(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, GlobalFoodError>;

    /// Map a payload into canonical records.
    ///
    /// Records missing a name or coordinates are dropped. An envelope that
    /// does not have the provider's shape at all is a `Provider` error.
    fn normalize_response(
        &self,
        response: ProviderResponse,
    ) -> Result<Vec<CanonicalRecord>, GlobalFoodError>;
}
