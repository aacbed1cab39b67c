//! Great-circle distance between coordinates

use crate::constants::geo::EARTH_RADIUS_METERS;
use crate::coord::Coordinates;
use std::f64::consts::PI;

/// Calculate the distance between two points in meters (Haversine formula)
pub fn haversine_distance(p1: Coordinates, p2: Coordinates) -> f64 {
    let lat1 = p1.lat * PI / 180.0;
    let lat2 = p2.lat * PI / 180.0;
    let delta_lat = (p2.lat - p1.lat) * PI / 180.0;
    let delta_lng = (p2.lng - p1.lng) * PI / 180.0;

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // One degree of latitude is roughly 111 km
        let a = Coordinates::new(33.5138, 36.2765);
        let b = Coordinates::new(34.5138, 36.2765);

        let distance = haversine_distance(a, b);
        assert!(
            (distance - 111_000.0).abs() < 1000.0,
            "Distance {} should be approximately 111000",
            distance
        );
    }

    #[test]
    fn test_haversine_is_symmetric() {
        let marjeh = Coordinates::new(33.5138, 36.2765);
        let mosque = Coordinates::new(33.5116, 36.3064);

        approx::assert_relative_eq!(
            haversine_distance(marjeh, mosque),
            haversine_distance(mosque, marjeh),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_haversine_same_point() {
        let a = Coordinates::new(33.5138, 36.2765);
        assert_eq!(haversine_distance(a, a), 0.0);
    }
}
