//! Provider capabilities.
//!
//! Describes what location input a provider accepts and the limits it places
//! on result counts and radii.

use crate::models::{CanonicalQuery, SkipReason};

/// Describes the capabilities of a restaurant-data provider.
///
/// Used by adapters to decide whether a canonical query can be translated
/// and how to clamp its numbers.
#[derive(Clone, Debug)]
pub struct ProviderCapabilities {
    /// Whether the provider can search around a coordinate pair.
    pub supports_coordinates: bool,

    /// Whether the provider can search a free-text place.
    pub supports_place: bool,

    /// Largest page size the provider accepts.
    pub max_limit: u32,

    /// Largest search radius in meters, if the provider caps it.
    pub max_radius_meters: Option<u32>,

    /// Upper bound of the provider's native rating scale.
    pub rating_scale: f64,
}

impl ProviderCapabilities {
    /// `None` when the query's location can be expressed, otherwise the skip reason.
    pub fn location_gap(&self, query: &CanonicalQuery) -> Option<SkipReason> {
        let coordinates = self.supports_coordinates && query.coordinates.is_some();
        let place = self.supports_place && query.place.is_some();
        if coordinates || place {
            return None;
        }
        if self.supports_coordinates {
            Some(SkipReason::MissingCoordinates)
        } else {
            Some(SkipReason::MissingPlace)
        }
    }

    pub fn clamp_limit(&self, limit: u32) -> u32 {
        limit.clamp(1, self.max_limit)
    }

    /// Whole meters, capped at `max_radius_meters`.
    pub fn clamp_radius(&self, radius: f64) -> u32 {
        let meters = radius.round().max(1.0) as u32;
        match self.max_radius_meters {
            Some(max) => meters.min(max),
            None => meters,
        }
    }

    /// Rescale a native rating onto 0-5. Out-of-scale values give `None`.
    pub fn scale_rating(&self, native: f64) -> Option<f64> {
        if !native.is_finite() || native < 0.0 || native > self.rating_scale {
            return None;
        }
        if self.rating_scale == 5.0 {
            return Some(native);
        }
        Some(native * 5.0 / self.rating_scale)
    }
}
