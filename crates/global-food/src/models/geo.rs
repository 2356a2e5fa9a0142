use serde::{Deserialize, Serialize};

const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// WGS84 latitude/longitude pair in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and within [-90, 90] / [-180, 180].
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance (haversine).
    pub fn distance_meters(&self, other: &Coordinates) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlng = (other.lng - self.lng).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_between_nearby_points() {
        let a = Coordinates::new(40.7301, -73.9971);
        let b = Coordinates::new(40.7300, -73.9970);
        let d = a.distance_meters(&b);
        assert!(d > 10.0 && d < 20.0, "distance was {}", d);
        assert_eq!(a.distance_meters(&a), 0.0);
    }

    #[test]
    fn test_one_degree_of_latitude() {
        let d = Coordinates::new(0.0, 0.0).distance_meters(&Coordinates::new(1.0, 0.0));
        assert!((d - 111_195.0).abs() < 100.0, "distance was {}", d);
    }

    #[test]
    fn test_validity() {
        assert!(Coordinates::new(40.73, -73.99).is_valid());
        assert!(!Coordinates::new(91.0, 0.0).is_valid());
        assert!(!Coordinates::new(0.0, f64::NAN).is_valid());
    }
}
