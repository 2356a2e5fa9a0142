//! Factual provider.
//!
//! Reads the `restaurants-us` table of the v3 API. Requests are signed with
//! two-legged OAuth 1.0a, and searches are geo-filtered with a `$circle`, so
//! this adapter needs coordinates.
//!
//! Factual rates on a 1-5 scale and prices on 1-5; price 5 folds into the
//! top canonical tier.

mod oauth;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::errors::GlobalFoodError;
use crate::models::{
    CanonicalQuery, CanonicalRecord, Coordinates, PriceTier, ProviderKind, SkipReason,
};
use crate::provider::http::{items_at, send_json};
use crate::provider::{
    ProviderAdapter, ProviderCapabilities, ProviderRequest, ProviderResponse, Translation,
};

use oauth::{query_string, Freshness, OAuthSigner};

const PROVIDER: ProviderKind = ProviderKind::Factual;
const TABLE_URL: &str = "https://api.v3.factual.com/t/restaurants-us";

/// Radius used for the geo filter when the query has none.
const DEFAULT_RADIUS_METERS: u32 = 1_000;

#[derive(Debug, Deserialize)]
struct Place {
    factual_id: String,
    name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    address: Option<String>,
    locality: Option<String>,
    region: Option<String>,
    postcode: Option<String>,
    #[serde(default)]
    cuisine: Vec<String>,
    #[serde(default)]
    category_labels: Vec<Vec<String>>,
    rating: Option<f64>,
    price: Option<i64>,
    website: Option<String>,
}

impl Place {
    /// "7 Carmine St, New York, NY 10014" from the split address fields.
    fn full_address(&self) -> Option<String> {
        let region_line = match (&self.region, &self.postcode) {
            (Some(region), Some(postcode)) => Some(format!("{} {}", region, postcode)),
            (Some(region), None) => Some(region.clone()),
            (None, Some(postcode)) => Some(postcode.clone()),
            (None, None) => None,
        };
        let parts: Vec<String> = [self.address.clone(), self.locality.clone(), region_line]
            .into_iter()
            .flatten()
            .filter(|p| !p.trim().is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Factual adapter signing every call with the key/secret pair.
pub struct FactualAdapter {
    client: Client,
    signer: OAuthSigner,
}

impl FactualAdapter {
    pub fn new(client: Client, key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            client,
            signer: OAuthSigner::new(key, secret),
        }
    }

    fn check_status(body: &Value) -> Result<(), GlobalFoodError> {
        match body.get("status").and_then(Value::as_str) {
            Some("ok") | None => Ok(()),
            Some(status) => {
                let message = body
                    .get("message")
                    .and_then(Value::as_str)
                    .unwrap_or("no message");
                Err(GlobalFoodError::provider(
                    PROVIDER,
                    format!("status {} - {}", status, message),
                ))
            }
        }
    }

    fn to_record(place: Place, rank: usize, caps: &ProviderCapabilities) -> Option<CanonicalRecord> {
        let name = place.name.clone().filter(|n| !n.trim().is_empty())?;
        let coordinates = Coordinates::new(place.latitude?, place.longitude?);
        let address = place.full_address();

        let mut categories = place.cuisine.clone();
        categories.extend(
            place
                .category_labels
                .iter()
                .filter_map(|path| path.last().cloned()),
        );

        Some(
            CanonicalRecord::new(PROVIDER, place.factual_id, name.trim(), coordinates, rank)
                .with_address(address)
                .with_categories(categories)
                .with_rating(place.rating.and_then(|r| caps.scale_rating(r)))
                .with_price(place.price.and_then(PriceTier::from_level))
                .with_url(place.website),
        )
    }
}

#[async_trait]
impl ProviderAdapter for FactualAdapter {
    fn kind(&self) -> ProviderKind {
        PROVIDER
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_coordinates: true,
            supports_place: false,
            max_limit: 50,
            max_radius_meters: Some(50_000),
            rating_scale: 5.0,
        }
    }

    fn translate_query(&self, query: &CanonicalQuery) -> Translation {
        let caps = self.capabilities();
        if let Some(reason) = caps.location_gap(query) {
            return Translation::Skip(reason);
        }
        let Some(coordinates) = query.coordinates else {
            return Translation::Skip(SkipReason::MissingCoordinates);
        };

        let meters = query
            .radius
            .map(|r| caps.clamp_radius(r))
            .unwrap_or(DEFAULT_RADIUS_METERS);
        let geo = json!({
            "$circle": {
                "$center": [coordinates.lat, coordinates.lng],
                "$meters": meters,
            }
        });

        Translation::Request(
            ProviderRequest::new(TABLE_URL)
                .param_opt("q", query.term.as_ref())
                .param("geo", geo)
                .param("limit", caps.clamp_limit(query.limit)),
        )
    }

    async fn execute_search(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, GlobalFoodError> {
        let authorization =
            self.signer
                .authorization("GET", &request.url, &request.params, &Freshness::now());
        let url = format!("{}?{}", request.url, query_string(&request.params));

        let builder = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, authorization);

        let body = send_json(PROVIDER, builder).await?;
        Self::check_status(&body)?;
        Ok(ProviderResponse { body })
    }

    fn normalize_response(
        &self,
        response: ProviderResponse,
    ) -> Result<Vec<CanonicalRecord>, GlobalFoodError> {
        Self::check_status(&response.body)?;
        let caps = self.capabilities();
        let items = items_at(PROVIDER, &response.body, "/response/data")?;

        let records = items
            .iter()
            .enumerate()
            .filter_map(|(rank, item)| {
                match serde_json::from_value::<Place>(item.clone()) {
                    Ok(place) => Self::to_record(place, rank, &caps),
                    Err(e) => {
                        debug!("Skipping malformed Factual row at {}: {}", rank, e);
                        None
                    }
                }
            })
            .collect();

        Ok(records)
    }
}
