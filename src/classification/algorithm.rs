use std::collections::BTreeMap;

use chrono::Duration;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::cities::CityIndex;
use crate::classification::config::TripConfig;
use crate::db::models::{Segment, TransportMode, Trip};
use crate::geo::meters_to_miles;

/// Turn raw segments into trips.
///
/// Only activity segments are considered. A segment qualifies when its mode
/// has a threshold in `config` and both the recorded distance (miles) and
/// the elapsed time (minutes) reach it. `on_trip` receives the running
/// total after every accepted trip.
///
/// Trips are collected per mode while scanning and returned mode by mode.
pub fn classify_segments<I, F>(
    segments: I,
    config: &TripConfig,
    cities: &CityIndex,
    mut on_trip: F,
) -> Vec<Trip>
where
    I: IntoIterator<Item = Segment>,
    F: FnMut(usize),
{
    let mut by_mode: BTreeMap<TransportMode, Vec<Trip>> = BTreeMap::new();
    let mut total = 0usize;

    for segment in segments {
        if let Some(trip) = classify_segment(&segment, config, cities) {
            by_mode.entry(trip.mode).or_default().push(trip);
            total += 1;
            on_trip(total);
        }
    }

    for (mode, trips) in &by_mode {
        info!("{} {} trips", trips.len(), mode);
    }

    by_mode.into_values().flatten().collect()
}

/// Classify a single segment; `None` when it is not a qualifying activity.
pub fn classify_segment(segment: &Segment, config: &TripConfig, cities: &CityIndex) -> Option<Trip> {
    let activity = segment.activity.as_ref()?;
    let candidate = activity.top_candidate.as_ref()?;
    let mode = TransportMode::from_tag(&candidate.kind);

    let Some(threshold) = config.threshold(mode) else {
        debug!("No threshold for activity type {}, skipping", candidate.kind);
        return None;
    };

    let distance_meters = match activity.distance_meters {
        Some(meters) if meters.is_finite() => meters,
        _ => {
            debug!(
                "{} segment starting {} has no usable distance, skipping",
                mode, segment.start_time
            );
            return None;
        }
    };

    let distance_miles = meters_to_miles(distance_meters);
    let duration_minutes = duration_minutes(segment.duration());
    if !threshold.admits(distance_miles, duration_minutes) {
        return None;
    }

    let (Some(start), Some(end)) = (activity.start_point(), activity.end_point()) else {
        warn!(
            "{} segment starting {} has missing or invalid coordinates, skipping",
            mode, segment.start_time
        );
        return None;
    };

    let start_city = cities.resolve(start.lat, start.lng);
    let end_city = cities.resolve(end.lat, end.lng);

    debug!(
        "{} trip with length {:.1} miles and duration {:.0} minutes between {} and {}",
        mode, distance_miles, duration_minutes, start_city, end_city
    );

    Some(Trip {
        id: Uuid::new_v4().to_string(),
        mode,
        start,
        end,
        start_time: segment.start_time,
        end_time: segment.end_time,
        distance_meters,
        probability: candidate.probability,
        start_city,
        end_city,
    })
}

fn duration_minutes(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 60_000.0
}
