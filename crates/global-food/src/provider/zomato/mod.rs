//! Zomato provider.
//!
//! Uses the v2.1 `/search` endpoint with a `user-key` header. Zomato resolves
//! free-text places through a separate locations lookup, so this adapter only
//! searches around coordinates and sits out place-only queries.
//!
//! Zomato encodes coordinates and ratings as strings, and an aggregate rating
//! of "0" means the restaurant has not been rated.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::errors::GlobalFoodError;
use crate::models::{
    CanonicalQuery, CanonicalRecord, Coordinates, PriceTier, ProviderKind, SkipReason,
};
use crate::provider::http::{items_at, lenient_f64, lenient_id, send_json};
use crate::provider::{
    ProviderAdapter, ProviderCapabilities, ProviderRequest, ProviderResponse, Translation,
};

const PROVIDER: ProviderKind = ProviderKind::Zomato;
const SEARCH_URL: &str = "https://developers.zomato.com/api/v2.1/search";

/// `restaurants[].restaurant` in a search response.
#[derive(Debug, Deserialize)]
struct Restaurant {
    id: Value,
    name: Option<String>,
    url: Option<String>,
    location: Option<RestaurantLocation>,
    cuisines: Option<String>,
    user_rating: Option<UserRating>,
    price_range: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RestaurantLocation {
    address: Option<String>,
    #[serde(default)]
    latitude: Value,
    #[serde(default)]
    longitude: Value,
}

#[derive(Debug, Deserialize)]
struct UserRating {
    #[serde(default)]
    aggregate_rating: Value,
}

/// Zomato adapter keyed by a developer `user-key`.
pub struct ZomatoAdapter {
    client: Client,
    user_key: String,
}

impl ZomatoAdapter {
    pub fn new(client: Client, user_key: impl Into<String>) -> Self {
        Self {
            client,
            user_key: user_key.into(),
        }
    }

    fn to_record(
        restaurant: Restaurant,
        rank: usize,
        caps: &ProviderCapabilities,
    ) -> Option<CanonicalRecord> {
        let id = lenient_id(&restaurant.id)?;
        let name = restaurant.name.filter(|n| !n.trim().is_empty())?;
        let location = restaurant.location?;
        let coordinates = Coordinates::new(
            lenient_f64(&location.latitude)?,
            lenient_f64(&location.longitude)?,
        );

        // Zomato reports 0 for "not rated yet".
        let rating = restaurant
            .user_rating
            .and_then(|r| lenient_f64(&r.aggregate_rating))
            .filter(|r| *r > 0.0)
            .and_then(|r| caps.scale_rating(r));

        let categories = restaurant
            .cuisines
            .map(|c| c.split(',').map(str::to_string).collect())
            .unwrap_or_default();

        Some(
            CanonicalRecord::new(PROVIDER, id, name.trim(), coordinates, rank)
                .with_address(location.address)
                .with_categories(categories)
                .with_rating(rating)
                .with_price(restaurant.price_range.and_then(PriceTier::from_level))
                .with_url(restaurant.url),
        )
    }
}

#[async_trait]
impl ProviderAdapter for ZomatoAdapter {
    fn kind(&self) -> ProviderKind {
        PROVIDER
    }

    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            supports_coordinates: true,
            supports_place: false,
            max_limit: 20,
            max_radius_meters: None,
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

        Translation::Request(
            ProviderRequest::new(SEARCH_URL)
                .param("lat", coordinates.lat)
                .param("lon", coordinates.lng)
                .param_opt("q", query.term.as_ref())
                .param_opt("radius", query.radius.map(|r| caps.clamp_radius(r)))
                .param("count", caps.clamp_limit(query.limit)),
        )
    }

    async fn execute_search(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, GlobalFoodError> {
        let builder = self
            .client
            .get(&request.url)
            .header("user-key", &self.user_key)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(&request.params);

        let body = send_json(PROVIDER, builder).await?;
        Ok(ProviderResponse { body })
    }

    fn normalize_response(
        &self,
        response: ProviderResponse,
    ) -> Result<Vec<CanonicalRecord>, GlobalFoodError> {
        let caps = self.capabilities();
        let items = items_at(PROVIDER, &response.body, "/restaurants")?;

        let records = items
            .iter()
            .enumerate()
            .filter_map(|(rank, item)| {
                let restaurant = item.get("restaurant")?;
                match serde_json::from_value::<Restaurant>(restaurant.clone()) {
                    Ok(r) => Self::to_record(r, rank, &caps),
                    Err(e) => {
                        debug!("Skipping malformed Zomato restaurant at {}: {}", rank, e);
                        None
                    }
                }
            })
            .collect();

        Ok(records)
    }
}
