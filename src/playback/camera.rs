use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::db::models::TransportMode;
use crate::geo::{angular_distance_degrees, angular_distance_radians, LatLng};

pub const FIRST_TRANSITION_MS: u64 = 500;
pub const MIN_TRANSITION_MS: f64 = 400.0;
pub const MAX_TRANSITION_MS: f64 = 900.0;
const TRANSITION_MS_PER_DEGREE: f64 = 150.0;
const JITTER_FACTOR: f64 = 0.1;

/// Altitude window for a mode: the central angle between endpoints is
/// scaled by `scale` and clamped to `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AltitudeRange {
    pub min: f64,
    pub max: f64,
    pub scale: f64,
}

impl AltitudeRange {
    pub fn for_mode(mode: TransportMode) -> Self {
        if mode.is_flying() {
            // Flights zoom out to show more of the globe.
            Self {
                min: 1.5,
                max: 4.0,
                scale: 2.0,
            }
        } else {
            Self {
                min: 0.1,
                max: 1.5,
                scale: 40.0,
            }
        }
    }

    pub fn fit(&self, angle_radians: f64) -> f64 {
        (angle_radians * self.scale).clamp(self.min, self.max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    QuadraticInOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraMove {
    pub lat: f64,
    pub lng: f64,
    pub altitude: f64,
    pub duration_ms: u64,
    pub easing: Easing,
}

/// Camera altitude that frames both endpoints, before jitter.
pub fn base_altitude(start: LatLng, end: LatLng, mode: TransportMode) -> f64 {
    let angle = angular_distance_radians(start.lat, start.lng, end.lat, end.lng);
    AltitudeRange::for_mode(mode).fit(angle)
}

/// [`base_altitude`] raised by a random amount in `[0, angle * 0.1)` so
/// that consecutive views do not all sit at the same height.
pub fn fit_altitude<R: Rng + ?Sized>(
    start: LatLng,
    end: LatLng,
    mode: TransportMode,
    rng: &mut R,
) -> f64 {
    let angle = angular_distance_radians(start.lat, start.lng, end.lat, end.lng);
    let jitter = rng.gen::<f64>() * angle * JITTER_FACTOR;
    AltitudeRange::for_mode(mode).fit(angle) + jitter
}

/// How long the camera takes to reach `current` from the previous target.
pub fn transition_duration_ms(previous: Option<(f64, f64)>, current: (f64, f64)) -> u64 {
    match previous {
        None => FIRST_TRANSITION_MS,
        Some((prev_lat, prev_lng)) => {
            let degrees = angular_distance_degrees(prev_lat, prev_lng, current.0, current.1);
            (degrees * TRANSITION_MS_PER_DEGREE).clamp(MIN_TRANSITION_MS, MAX_TRANSITION_MS) as u64
        }
    }
}
