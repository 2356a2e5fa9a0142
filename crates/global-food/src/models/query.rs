//! Search input: the caller-facing request and its validated canonical form.

use serde::{Deserialize, Serialize};

use super::Coordinates;
use crate::errors::GlobalFoodError;

/// Search input as supplied by the caller.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,

    /// Free-text location, e.g. "Brooklyn, NY".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub term: Option<String>,

    /// Search radius in meters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl SearchRequest {
    pub fn near(lat: f64, lng: f64) -> Self {
        Self {
            coordinates: Some(Coordinates::new(lat, lng)),
            ..Self::default()
        }
    }

    pub fn in_place(place: impl Into<String>) -> Self {
        Self {
            place: Some(place.into()),
            ..Self::default()
        }
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    pub fn with_radius(mut self, meters: f64) -> Self {
        self.radius = Some(meters);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Validated, provider-agnostic search query.
///
/// Always carries coordinates, a place, or both.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CanonicalQuery {
    pub coordinates: Option<Coordinates>,
    pub place: Option<String>,
    pub term: Option<String>,
    pub radius: Option<f64>,
    pub limit: u32,
}

impl CanonicalQuery {
    /// Validate caller input. Blank strings count as absent.
    pub fn from_request(
        request: SearchRequest,
        default_limit: u32,
    ) -> Result<Self, GlobalFoodError> {
        let place = non_blank(request.place);
        let term = non_blank(request.term);

        if let Some(coordinates) = &request.coordinates {
            if !coordinates.is_valid() {
                return Err(GlobalFoodError::invalid_input(format!(
                    "coordinates out of range: {}, {}",
                    coordinates.lat, coordinates.lng
                )));
            }
        }

        if request.coordinates.is_none() && place.is_none() {
            return Err(GlobalFoodError::invalid_input(
                "a location (coordinates or place) is required",
            ));
        }

        if let Some(radius) = request.radius {
            if !radius.is_finite() || radius <= 0.0 {
                return Err(GlobalFoodError::invalid_input(format!(
                    "radius must be a positive number of meters, got {}",
                    radius
                )));
            }
        }

        let limit = match request.limit {
            Some(0) => {
                return Err(GlobalFoodError::invalid_input(
                    "limit must be a positive integer",
                ))
            }
            Some(limit) => limit,
            None => default_limit.max(1),
        };

        Ok(Self {
            coordinates: request.coordinates,
            place,
            term,
            radius: request.radius,
            limit,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_query() {
        let request = SearchRequest::near(40.730, -73.997)
            .with_term("pizza")
            .with_limit(10);
        let query = CanonicalQuery::from_request(request, 20).unwrap();

        assert_eq!(query.coordinates, Some(Coordinates::new(40.730, -73.997)));
        assert_eq!(query.term.as_deref(), Some("pizza"));
        assert_eq!(query.limit, 10);
    }

    #[test]
    fn test_default_limit_applies() {
        let query = CanonicalQuery::from_request(SearchRequest::in_place("Queens"), 20).unwrap();
        assert_eq!(query.limit, 20);
        assert_eq!(query.place.as_deref(), Some("Queens"));
    }

    #[test]
    fn test_location_is_required() {
        let request = SearchRequest {
            place: Some("   ".to_string()),
            term: Some("sushi".to_string()),
            ..SearchRequest::default()
        };
        let err = CanonicalQuery::from_request(request, 20).unwrap_err();
        assert!(matches!(err, GlobalFoodError::InvalidInput { .. }));
    }

    #[test]
    fn test_rejects_bad_numbers() {
        assert!(CanonicalQuery::from_request(SearchRequest::near(95.0, 0.0), 20).is_err());
        assert!(
            CanonicalQuery::from_request(SearchRequest::near(1.0, 1.0).with_radius(-5.0), 20)
                .is_err()
        );
        assert!(
            CanonicalQuery::from_request(SearchRequest::near(1.0, 1.0).with_limit(0), 20).is_err()
        );
    }

    #[test]
    fn test_blank_term_is_dropped() {
        let query =
            CanonicalQuery::from_request(SearchRequest::near(1.0, 1.0).with_term(" "), 20).unwrap();
        assert_eq!(query.term, None);
    }
}
