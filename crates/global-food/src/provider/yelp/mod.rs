//! Yelp Fusion provider.
//!
//! Searches `/v3/businesses/search` with a bearer token. The token comes from
//! an OAuth2 client-credentials exchange, so building this adapter needs a
//! network round trip.
//!
//! API documentation: https://www.yelp.com/developers/documentation/v3

mod models;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

use crate::errors::GlobalFoodError;
use crate::models::{
    CanonicalQuery, CanonicalRecord, Coordinates, PriceTier, ProviderKind, SkipReason,
};
use crate::provider::http::{items_at, send_json};
use crate::provider::{
    ProviderAdapter, ProviderCapabilities, ProviderRequest, ProviderResponse, Translation,
};

use models::{YelpBusiness, YelpErrorResponse, YelpTokenResponse};

const PROVIDER: ProviderKind = ProviderKind::Yelp;
const TOKEN_URL: &str = "https://api.yelp.com/oauth2/token";
const SEARCH_URL: &str = "https://api.yelp.com/v3/businesses/search";

/// Yelp Fusion adapter holding an access token.
pub struct YelpAdapter {
    client: Client,
    access_token: String,
}

impl YelpAdapter {
    /// Build an adapter around an already issued access token.
    pub fn with_token(client: Client, access_token: impl Into<String>) -> Self {
        Self {
            client,
            access_token: access_token.into(),
        }
    }

    /// Exchange a client id/secret pair for an access token.
    pub async fn authenticate(
        client: Client,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self, GlobalFoodError> {
        let handshake_failed = |message: String| GlobalFoodError::AuthHandshakeFailed {
            provider: PROVIDER,
            message,
        };

        let response = client
            .post(TOKEN_URL)
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", client_id),
                ("client_secret", client_secret),
            ])
            .send()
            .await
            .map_err(|e| handshake_failed(format!("token request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| handshake_failed(format!("failed to read token response: {}", e)))?;

        if !status.is_success() {
            let detail = serde_json::from_str::<YelpErrorResponse>(&body)
                .ok()
                .and_then(|e| {
                    e.error_description
                        .or_else(|| e.error.and_then(|d| d.description))
                })
                .unwrap_or_else(|| body.clone());
            warn!("Yelp token exchange rejected with {}: {}", status, detail);
            return Err(handshake_failed(format!("HTTP {} - {}", status.as_u16(), detail)));
        }

        let token: YelpTokenResponse = serde_json::from_str(&body)
            .map_err(|e| handshake_failed(format!("failed to parse token response: {}", e)))?;

        if token.access_token.trim().is_empty() {
            return Err(handshake_failed("empty access token".to_string()));
        }

        debug!("Yelp access token acquired");
        Ok(Self::with_token(client, token.access_token))
    }

    fn to_record(
        business: YelpBusiness,
        rank: usize,
        caps: &ProviderCapabilities,
    ) -> Option<CanonicalRecord> {
        let name = business.name.filter(|n| !n.trim().is_empty())?;
        let coordinates = business
            .coordinates
            .and_then(|c| Some(Coordinates::new(c.latitude?, c.longitude?)))?;

        let address = business.location.and_then(|location| {
            if location.display_address.is_empty() {
                location.address1
            } else {
                Some(location.display_address.join(", "))
            }
        });

        Some(
            CanonicalRecord::new(PROVIDER, business.id, name.trim(), coordinates, rank)
                .with_address(address)
                .with_categories(business.categories.into_iter().map(|c| c.title).collect())
                .with_rating(business.rating.and_then(|r| caps.scale_rating(r)))
                .with_price(business.price.as_deref().and_then(PriceTier::from_symbols))
                .with_url(business.url),
        )
    }
}

#[async_trait]
impl ProviderAdapter for YelpAdapter {
    fn kind(&self) -> ProviderKind {
        PROVIDER
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_coordinates: true,
            supports_place: true,
            max_limit: 50,
            max_radius_meters: Some(40_000),
            rating_scale: 5.0,
        }
    }

    fn translate_query(&self, query: &CanonicalQuery) -> Translation {
        let caps = self.capabilities();
        if let Some(reason) = caps.location_gap(query) {
            return Translation::Skip(reason);
        }

        let mut request = ProviderRequest::new(SEARCH_URL).param("categories", "restaurants");
        request = match (&query.coordinates, &query.place) {
            (Some(coordinates), _) => request
                .param("latitude", coordinates.lat)
                .param("longitude", coordinates.lng),
            (None, Some(place)) => request.param("location", place),
            (None, None) => return Translation::Skip(SkipReason::MissingPlace),
        };

        Translation::Request(
            request
                .param_opt("term", query.term.as_ref())
                .param_opt("radius", query.radius.map(|r| caps.clamp_radius(r)))
                .param("limit", caps.clamp_limit(query.limit)),
        )
    }

    async fn execute_search(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, GlobalFoodError> {
        let builder = self
            .client
            .get(&request.url)
            .bearer_auth(&self.access_token)
            .query(&request.params);

        let body = send_json(PROVIDER, builder).await?;
        Ok(ProviderResponse { body })
    }

    fn normalize_response(
        &self,
        response: ProviderResponse,
    ) -> Result<Vec<CanonicalRecord>, GlobalFoodError> {
        let caps = self.capabilities();
        let items = items_at(PROVIDER, &response.body, "/businesses")?;

        let records = items
            .iter()
            .enumerate()
            .filter_map(|(rank, item)| {
                let business: YelpBusiness = match serde_json::from_value(item.clone()) {
                    Ok(b) => b,
                    Err(e) => {
                        debug!("Skipping malformed Yelp business at {}: {}", rank, e);
                        return None;
                    }
                };
                let record = Self::to_record(business, rank, &caps);
                if record.is_none() {
                    debug!("Skipping Yelp business at {} without name or coordinates", rank);
                }
                record
            })
            .collect();

        Ok(records)
    }
}
