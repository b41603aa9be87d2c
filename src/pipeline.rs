//! Import, classification and playback preparation, wired to storage.

use std::{fs, path::Path, sync::Arc};

use anyhow::{Context, Result};
use log::info;

use crate::cities::CityIndex;
use crate::classification::{classify_segments, order_trips, TripConfig};
use crate::db::{Database, TimelineExport, TimelineSummary, Trip};
use crate::status::{import_progress_message, trips_found_message, StatusReporter};

/// Progress is reported once per this many imported segments.
pub const IMPORT_PROGRESS_EVERY: usize = 100;

pub fn read_export(path: &Path) -> Result<TimelineExport> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read timeline export {}", path.display()))?;
    parse_export(&raw).with_context(|| format!("invalid timeline export {}", path.display()))
}

pub fn parse_export(raw: &str) -> Result<TimelineExport> {
    Ok(serde_json::from_str(raw)?)
}

/// Rebuild the stored segment log from `export`.
pub async fn import_timeline(
    db: &Database,
    export: TimelineExport,
    reporter: Arc<dyn StatusReporter>,
) -> Result<TimelineSummary> {
    let progress = reporter.clone();
    let summary = db
        .replace_timeline(
            export.semantic_segments,
            IMPORT_PROGRESS_EVERY,
            move |done, total| progress.report(&import_progress_message(done, total)),
        )
        .await?;

    info!("Imported {} timeline segments", summary.segment_count);
    for (activity_type, count) in &summary.activity_counts {
        info!("{activity_type}: {count}");
    }

    Ok(summary)
}

/// Classify the stored activity segments and replace the stored trip set.
pub async fn find_trips(
    db: &Database,
    cities: &CityIndex,
    config: &TripConfig,
    reporter: &dyn StatusReporter,
) -> Result<Vec<Trip>> {
    let segments = db.get_activity_segments().await?;
    info!("Classifying {} activity segments", segments.len());

    let trips = classify_segments(segments, config, cities, |found| {
        reporter.report(&trips_found_message(found))
    });

    db.replace_trips(&trips).await?;
    info!("Stored {} trips", trips.len());
    Ok(trips)
}

/// Stored trips for `year`, in playback order.
pub async fn load_playable_trips(db: &Database, year: i32) -> Result<Vec<Trip>> {
    let trips = db.list_trips().await?;
    order_trips(trips, year)
}
