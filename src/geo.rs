//! Spherical geometry used by trip classification and camera framing.
//!
//! All coordinates are WGS84 latitude/longitude in degrees.

use serde::{Deserialize, Serialize};

/// Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

const MILES_PER_METER: f64 = 0.000_621_371_2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Parse an export coordinate string such as `"40.7128, -74.0060"`.
    ///
    /// Each half is trimmed and may carry a trailing degree sign
    /// (`"40.7128°, -74.0060°"`). Returns `None` unless both halves parse to
    /// finite numbers.
    pub fn parse(raw: &str) -> Option<Self> {
        let (lat, lng) = raw.split_once(',')?;
        let lat = parse_degrees(lat)?;
        let lng = parse_degrees(lng)?;
        Some(Self { lat, lng })
    }
}

fn parse_degrees(raw: &str) -> Option<f64> {
    let value: f64 = raw.trim().trim_end_matches('°').trim_end().parse().ok()?;
    value.is_finite().then_some(value)
}

pub fn meters_to_miles(meters: f64) -> f64 {
    meters * MILES_PER_METER
}

/// Haversine great-circle distance in meters.
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Central angle between two points (spherical law of cosines).
pub fn angular_distance_radians(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    // Rounding can push the cosine just past 1.0 for coincident points.
    let cosine = phi1.sin() * phi2.sin() + phi1.cos() * phi2.cos() * dlambda.cos();
    cosine.clamp(-1.0, 1.0).acos()
}

/// Coordinate-wise mean of two points, with the longitude moved to the far
/// side of the globe when the pair straddles the antimeridian.
///
/// This is a framing approximation, not a great-circle midpoint.
pub fn midpoint(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> (f64, f64) {
    let mid_lat = (lat1 + lat2) / 2.0;
    let mut mid_lng = (lon1 + lon2) / 2.0;
    if (lon1 - lon2).abs() > 180.0 {
        mid_lng += if mid_lng < 0.0 { 180.0 } else { -180.0 };
    }
    (mid_lat, mid_lng)
}

/// Planar distance in degrees, `sqrt(dlat^2 + dlng^2)`. Only used to pace
/// camera transitions.
pub fn angular_distance_degrees(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat1 - lat2).abs();
    let dlng = (lon1 - lon2).abs();
    (dlat * dlat + dlng * dlng).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
        (a - b).abs() < epsilon
    }

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (40.7, -74.0, 34.0, -118.2),
            (51.5074, -0.1278, 48.8566, 2.3522),
            (-33.86, 151.2, 35.68, 139.69),
            (0.0, 179.9, 0.0, -179.9),
        ];
        for (a_lat, a_lng, b_lat, b_lng) in pairs {
            let ab = distance_meters(a_lat, a_lng, b_lat, b_lng);
            let ba = distance_meters(b_lat, b_lng, a_lat, a_lng);
            assert!(approx_eq(ab, ba, 1e-6), "{ab} != {ba}");
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert!(distance_meters(40.7, -74.0, 40.7, -74.0).abs() < 1e-6);
    }

    #[test]
    fn distance_london_paris() {
        let d = distance_meters(51.5074, -0.1278, 48.8566, 2.3522);
        assert!(approx_eq(d, 343_500.0, 5_000.0), "got {d}");
    }

    #[test]
    fn new_york_to_los_angeles_in_miles() {
        let miles = meters_to_miles(distance_meters(40.7, -74.0, 34.0, -118.2));
        assert!(approx_eq(miles, 2_445.0, 30.0), "got {miles}");
    }

    #[test]
    fn angular_distance_of_coincident_points_is_zero() {
        let angle = angular_distance_radians(12.345678, 98.765432, 12.345678, 98.765432);
        assert!(!angle.is_nan());
        assert!(angle.abs() < 1e-6);
    }

    #[test]
    fn angular_distance_matches_haversine() {
        let angle = angular_distance_radians(40.7, -74.0, 34.0, -118.2);
        let meters = distance_meters(40.7, -74.0, 34.0, -118.2);
        assert!(approx_eq(angle * EARTH_RADIUS_M, meters, 10.0));
    }

    #[test]
    fn midpoint_crosses_antimeridian() {
        let (lat, lng) = midpoint(0.0, 170.0, 0.0, -170.0);
        assert!(approx_eq(lat, 0.0, 1e-9));
        assert!(approx_eq(lng.abs(), 180.0, 1e-9), "got {lng}");
    }

    #[test]
    fn midpoint_without_wraparound_is_plain_mean() {
        let (lat, lng) = midpoint(40.0, -74.0, 34.0, -118.0);
        assert!(approx_eq(lat, 37.0, 1e-9));
        assert!(approx_eq(lng, -96.0, 1e-9));
    }

    #[test]
    fn planar_degrees() {
        assert!(approx_eq(angular_distance_degrees(0.0, 0.0, 3.0, 4.0), 5.0, 1e-9));
    }

    #[test]
    fn parse_lat_lng_variants() {
        assert_eq!(LatLng::parse("40.7,-74.0"), Some(LatLng::new(40.7, -74.0)));
        assert_eq!(
            LatLng::parse(" 40.7128°,  -74.006° "),
            Some(LatLng::new(40.7128, -74.006))
        );
        assert_eq!(LatLng::parse("40.7"), None);
        assert_eq!(LatLng::parse("abc, 1.0"), None);
        assert_eq!(LatLng::parse("NaN, 1.0"), None);
    }
}
