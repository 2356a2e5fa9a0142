//! Yelp Fusion wire types.

use serde::Deserialize;

/// Response from the OAuth2 token endpoint.
#[derive(Debug, Deserialize)]
pub struct YelpTokenResponse {
    pub access_token: String,
}

/// Error envelope Yelp returns on failed calls.
#[derive(Debug, Deserialize)]
pub struct YelpErrorResponse {
    pub error: Option<YelpErrorDetail>,
    /// Token endpoint uses a flat `error_description`.
    pub error_description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct YelpErrorDetail {
    pub description: Option<String>,
}

/// One entry of `businesses` in /v3/businesses/search.
#[derive(Debug, Deserialize)]
pub struct YelpBusiness {
    pub id: String,
    pub name: Option<String>,
    pub url: Option<String>,
    pub coordinates: Option<YelpCoordinates>,
    pub location: Option<YelpLocation>,
    #[serde(default)]
    pub categories: Vec<YelpCategory>,
    pub rating: Option<f64>,
    pub price: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct YelpCoordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct YelpLocation {
    pub address1: Option<String>,
    #[serde(default)]
    pub display_address: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct YelpCategory {
    pub title: String,
}
