use std::collections::HashSet;

use rand::Rng;

use crate::db::models::Trip;
use crate::geo::{distance_meters, meters_to_miles, midpoint};

use super::camera::{fit_altitude, transition_duration_ms, CameraMove, Easing};
use super::sink::{ArcDatum, CityMarker, TripInfo};

/// What one playback step puts on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct StepFrame {
    pub info: TripInfo,
    pub camera: CameraMove,
    /// Markers appended by this step (0, 1 or 2).
    pub new_markers: usize,
}

/// Everything drawn so far in one playback run: arcs only grow, and each
/// city name gets a single marker the first time it appears.
#[derive(Debug, Default)]
pub struct Trail {
    arcs: Vec<ArcDatum>,
    markers: Vec<CityMarker>,
    visited: HashSet<String>,
    previous_midpoint: Option<(f64, f64)>,
}

impl Trail {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arcs(&self) -> &[ArcDatum] {
        &self.arcs
    }

    pub fn markers(&self) -> &[CityMarker] {
        &self.markers
    }

    /// Add `trip` to the trail and compute its camera framing.
    pub fn advance<R: Rng + ?Sized>(&mut self, trip: &Trip, rng: &mut R) -> StepFrame {
        let (start, end) = (trip.start, trip.end);

        let mid = midpoint(start.lat, start.lng, end.lat, end.lng);
        let duration_ms = transition_duration_ms(self.previous_midpoint, mid);
        self.previous_midpoint = Some(mid);

        let camera = CameraMove {
            lat: mid.0,
            lng: mid.1,
            altitude: fit_altitude(start, end, trip.mode, rng),
            duration_ms,
            easing: Easing::QuadraticInOut,
        };

        let distance_miles = meters_to_miles(distance_meters(start.lat, start.lng, end.lat, end.lng));
        let info = TripInfo {
            icon: trip.mode.icon().to_string(),
            label: trip.mode.label().to_string(),
            elapsed: format_elapsed(trip.duration().num_milliseconds()),
            distance_miles,
            distance_text: format!("{distance_miles:.1} miles"),
            start_city: trip.start_city.clone(),
            end_city: trip.end_city.clone(),
        };

        self.arcs.push(ArcDatum {
            start_lat: start.lat,
            start_lng: start.lng,
            end_lat: end.lat,
            end_lng: end.lng,
            color: trip.mode.color().to_string(),
            mode: trip.mode.as_str().to_string(),
            start_time: trip.start_time,
            end_time: trip.end_time,
            label: format!("{}: {}", trip.mode, trip.start_time.format("%Y-%m-%d %H:%M")),
        });

        let before = self.markers.len();
        for (city, point) in [(&trip.start_city, start), (&trip.end_city, end)] {
            if self.visited.insert(city.clone()) {
                self.markers.push(CityMarker {
                    city: city.clone(),
                    lat: point.lat,
                    lng: point.lng,
                    label: city.clone(),
                });
            }
        }

        StepFrame {
            info,
            camera,
            new_markers: self.markers.len() - before,
        }
    }
}

/// `"{hours}h {minutes}m"`, dropping leftover seconds.
pub fn format_elapsed(duration_ms: i64) -> String {
    let total_seconds = duration_ms.max(0) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    format!("{hours}h {minutes}m")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::TransportMode;
    use crate::geo::LatLng;
    use chrono::DateTime;
    use rand::{rngs::StdRng, SeedableRng};

    fn trip(mode: TransportMode, from: (&str, f64, f64), to: (&str, f64, f64)) -> Trip {
        let start_time = DateTime::parse_from_rfc3339("2025-02-01T09:00:00+01:00").unwrap();
        Trip {
            id: "t".into(),
            mode,
            start: LatLng::new(from.1, from.2),
            end: LatLng::new(to.1, to.2),
            start_time,
            end_time: start_time + chrono::Duration::minutes(135) + chrono::Duration::seconds(59),
            distance_meters: 0.0,
            probability: None,
            start_city: from.0.into(),
            end_city: to.0.into(),
        }
    }

    #[test]
    fn elapsed_formatting() {
        assert_eq!(format_elapsed(0), "0h 0m");
        assert_eq!(format_elapsed(59_999), "0h 0m");
        assert_eq!(format_elapsed(6 * 3_600_000), "6h 0m");
        assert_eq!(format_elapsed(3_600_000 + 61_000), "1h 1m");
    }

    #[test]
    fn first_step_frames_trip() {
        let mut trail = Trail::new();
        let mut rng = StdRng::seed_from_u64(1);
        let frame = trail.advance(
            &trip(TransportMode::InTrain, ("Paris", 48.85, 2.35), ("Lyon", 45.76, 4.84)),
            &mut rng,
        );

        assert_eq!(frame.camera.duration_ms, 500);
        assert!((frame.camera.lat - 47.305).abs() < 1e-9);
        assert!((frame.camera.lng - 3.595).abs() < 1e-9);
        assert_eq!(frame.info.icon, "train");
        assert_eq!(frame.info.label, "Train");
        assert_eq!(frame.info.elapsed, "2h 15m");
        assert!(frame.info.distance_text.ends_with(" miles"));
        assert_eq!(frame.new_markers, 2);

        let arc = &trail.arcs()[0];
        assert_eq!(arc.color, "orange");
        assert_eq!(arc.mode, "IN_TRAIN");
        assert_eq!(arc.label, "IN_TRAIN: 2025-02-01 09:00");
    }

    #[test]
    fn arcs_accumulate_and_markers_dedupe_by_name() {
        let mut trail = Trail::new();
        let mut rng = StdRng::seed_from_u64(2);
        let trips = [
            trip(TransportMode::Flying, ("A", 0.0, 0.0), ("B", 10.0, 10.0)),
            trip(TransportMode::Flying, ("B", 10.0, 10.0), ("A", 0.0, 0.0)),
            // Same name at a different spot still counts as visited.
            trip(TransportMode::Walking, ("A", 5.0, 5.0), ("C", 5.1, 5.1)),
        ];

        let added: Vec<usize> = trips
            .iter()
            .map(|trip| trail.advance(trip, &mut rng).new_markers)
            .collect();

        assert_eq!(added, vec![2, 0, 1]);
        assert_eq!(trail.arcs().len(), 3);
        let cities: Vec<&str> = trail.markers().iter().map(|m| m.city.as_str()).collect();
        assert_eq!(cities, vec!["A", "B", "C"]);
        assert_eq!((trail.markers()[0].lat, trail.markers()[0].lng), (0.0, 0.0));
    }

    #[test]
    fn later_steps_pace_by_midpoint_distance() {
        let mut trail = Trail::new();
        let mut rng = StdRng::seed_from_u64(3);
        trail.advance(&trip(TransportMode::InBus, ("A", 0.0, 0.0), ("B", 0.0, 2.0)), &mut rng);
        let frame = trail.advance(
            &trip(TransportMode::InBus, ("B", 0.0, 2.0), ("C", 0.0, 10.0)),
            &mut rng,
        );
        // Midpoints (0, 1) and (0, 6): 5 degrees apart.
        assert_eq!(frame.camera.duration_ms, 750);
    }

    #[test]
    fn unrecognized_mode_uses_fallbacks() {
        let mut trail = Trail::new();
        let mut rng = StdRng::seed_from_u64(4);
        let frame = trail.advance(
            &trip(TransportMode::Unrecognized, ("X", 1.0, 1.0), ("Y", 1.5, 1.5)),
            &mut rng,
        );
        assert_eq!(frame.info.icon, "help_outline");
        assert_eq!(frame.info.label, "Unknown");
        assert_eq!(trail.arcs()[0].color, "grey");
    }
}
