//! Foursquare venues provider.
//!
//! Uses the v2 `/venues/explore` endpoint, which unlike `/venues/search`
//! returns ratings (0-10) and price tiers. Authentication is userless: the
//! client id and secret ride along as query parameters together with the API
//! version date (`v`) and response mode (`m`).
//!
//! API documentation: https://developer.foursquare.com/docs/api-reference/venues/explore

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::errors::GlobalFoodError;
use crate::models::{CanonicalQuery, CanonicalRecord, Coordinates, PriceTier, ProviderKind};
use crate::provider::http::{items_at, send_json};
use crate::provider::{
    ProviderAdapter, ProviderCapabilities, ProviderRequest, ProviderResponse, Translation,
};

const PROVIDER: ProviderKind = ProviderKind::Foursquare;
const EXPLORE_URL: &str = "https://api.foursquare.com/v2/venues/explore";

/// API version date used when the credentials do not pin one.
pub const DEFAULT_VERSION: &str = "20180323";

/// Response mode used when the credentials do not pin one.
pub const DEFAULT_MODE: &str = "foursquare";

// ============================================================================
// API Response Structures
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Meta {
    code: u16,
    error_detail: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExploreItem {
    venue: Venue,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Venue {
    id: String,
    name: Option<String>,
    location: Option<VenueLocation>,
    #[serde(default)]
    categories: Vec<VenueCategory>,
    rating: Option<f64>,
    price: Option<VenuePrice>,
    canonical_url: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VenueLocation {
    lat: Option<f64>,
    lng: Option<f64>,
    address: Option<String>,
    #[serde(default)]
    formatted_address: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct VenueCategory {
    name: String,
}

#[derive(Debug, Deserialize)]
struct VenuePrice {
    tier: i64,
}

// ============================================================================
// FoursquareAdapter
// ============================================================================

/// Foursquare adapter for userless venue search.
pub struct FoursquareAdapter {
    client: Client,
    client_id: String,
    client_secret: String,
    version: String,
    mode: String,
}

impl FoursquareAdapter {
    /// Create an adapter. `version` and `mode` fall back to the defaults.
    pub fn new(
        client: Client,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        version: Option<&str>,
        mode: Option<&str>,
    ) -> Self {
        Self {
            client,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            version: version.unwrap_or(DEFAULT_VERSION).to_string(),
            mode: mode.unwrap_or(DEFAULT_MODE).to_string(),
        }
    }

    fn check_meta(body: &Value) -> Result<(), GlobalFoodError> {
        let Some(meta) = body.get("meta") else {
            return Ok(());
        };
        let meta: Meta = serde_json::from_value(meta.clone()).map_err(|e| {
            GlobalFoodError::provider(PROVIDER, format!("malformed meta block: {}", e))
        })?;
        if meta.code != 200 {
            return Err(GlobalFoodError::provider(
                PROVIDER,
                format!(
                    "meta code {} - {}",
                    meta.code,
                    meta.error_detail.unwrap_or_default()
                ),
            ));
        }
        Ok(())
    }

    fn to_record(venue: Venue, rank: usize, caps: &ProviderCapabilities) -> Option<CanonicalRecord> {
        let name = venue.name.filter(|n| !n.trim().is_empty())?;
        let location = venue.location?;
        let coordinates = Coordinates::new(location.lat?, location.lng?);

        let address = if location.formatted_address.is_empty() {
            location.address
        } else {
            Some(location.formatted_address.join(", "))
        };

        Some(
            CanonicalRecord::new(PROVIDER, venue.id, name.trim(), coordinates, rank)
                .with_address(address)
                .with_categories(venue.categories.into_iter().map(|c| c.name).collect())
                .with_rating(venue.rating.and_then(|r| caps.scale_rating(r)))
                .with_price(venue.price.and_then(|p| PriceTier::from_level(p.tier)))
                .with_url(venue.canonical_url),
        )
    }
}

#[async_trait]
impl ProviderAdapter for FoursquareAdapter {
    fn kind(&self) -> ProviderKind {
        PROVIDER
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_coordinates: true,
            supports_place: true,
            max_limit: 50,
            max_radius_meters: Some(100_000),
            rating_scale: 10.0,
        }
    }

    fn translate_query(&self, query: &CanonicalQuery) -> Translation {
        let caps = self.capabilities();
        if let Some(reason) = caps.location_gap(query) {
            return Translation::Skip(reason);
        }

        let request = ProviderRequest::new(EXPLORE_URL).param("section", "food");
        let request = match &query.coordinates {
            Some(c) => request.param("ll", format!("{},{}", c.lat, c.lng)),
            None => request.param_opt("near", query.place.as_ref()),
        };

        Translation::Request(
            request
                .param_opt("query", query.term.as_ref())
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
            .query(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("v", self.version.as_str()),
                ("m", self.mode.as_str()),
            ])
            .query(&request.params);

        let body = send_json(PROVIDER, builder).await?;
        Self::check_meta(&body)?;
        Ok(ProviderResponse { body })
    }

    fn normalize_response(
        &self,
        response: ProviderResponse,
    ) -> Result<Vec<CanonicalRecord>, GlobalFoodError> {
        Self::check_meta(&response.body)?;
        let caps = self.capabilities();
        let groups = items_at(PROVIDER, &response.body, "/response/groups")?;

        let items = groups
            .iter()
            .filter_map(|group| group.get("items").and_then(Value::as_array))
            .flatten();

        let records = items
            .enumerate()
            .filter_map(|(rank, item)| {
                let item: ExploreItem = match serde_json::from_value(item.clone()) {
                    Ok(i) => i,
                    Err(e) => {
                        debug!("Skipping malformed Foursquare item at {}: {}", rank, e);
                        return None;
                    }
                };
                Self::to_record(item.venue, rank, &caps)
            })
            .collect();

        Ok(records)
    }
}
