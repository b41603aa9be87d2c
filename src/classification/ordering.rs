use anyhow::{bail, Result};
use chrono::Datelike;

use crate::db::models::Trip;

/// Sort trips by start time and keep those that started in `year`.
///
/// The sort is stable, so trips sharing a start time keep their stored
/// order. The year is read in the offset the trip was recorded in. An empty
/// result is an error: there is nothing to play back.
pub fn order_trips(mut trips: Vec<Trip>, year: i32) -> Result<Vec<Trip>> {
    trips.sort_by_key(|trip| trip.start_time);
    trips.retain(|trip| trip.start_time.year() == year);

    if trips.is_empty() {
        bail!("no trips found for {year}");
    }

    Ok(trips)
}
