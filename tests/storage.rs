use std::{
    fs,
    path::PathBuf,
    sync::{Arc, Mutex},
};

use chrono::DateTime;
use tripglobe_lib::{
    db::{Database, TransportMode, Trip},
    geo::LatLng,
    pipeline,
};

fn scratch_db() -> (PathBuf, Database) {
    let dir = std::env::temp_dir().join(format!("tripglobe-db-{}", uuid::Uuid::new_v4()));
    let db = Database::new(dir.join("tripglobe.sqlite3")).unwrap();
    (dir, db)
}

fn trip(id: &str, mode: TransportMode, start: &str) -> Trip {
    let start_time = DateTime::parse_from_rfc3339(start).unwrap();
    Trip {
        id: id.into(),
        mode,
        start: LatLng::new(51.5074, -0.1278),
        end: LatLng::new(48.8566, 2.3522),
        start_time,
        end_time: start_time + chrono::Duration::hours(2),
        distance_meters: 343_000.0,
        probability: Some(0.71),
        start_city: "London (8.9M)".into(),
        end_city: "Paris (2.1M)".into(),
    }
}

#[tokio::test]
async fn timeline_import_reports_progress_and_replaces_previous_log() {
    let (dir, db) = scratch_db();
    assert!(db.path().starts_with(&dir));

    let segments: Vec<serde_json::Value> = (0..250)
        .map(|i| {
            let kind = if i % 2 == 0 { "WALKING" } else { "IN_BUS" };
            serde_json::json!({
                "startTime": "2024-06-01T10:00:00+02:00",
                "endTime": "2024-06-01T10:30:00+02:00",
                "activity": {
                    "distanceMeters": 1000.0 + i as f64,
                    "topCandidate": { "type": kind }
                }
            })
        })
        .collect();
    let export = pipeline::parse_export(
        &serde_json::json!({ "semanticSegments": segments }).to_string(),
    )
    .unwrap();

    let calls = Arc::new(Mutex::new(Vec::new()));
    let recorded = calls.clone();
    let summary = db
        .replace_timeline(export.semantic_segments, 100, move |done, total| {
            recorded.lock().unwrap().push((done, total));
        })
        .await
        .unwrap();

    assert_eq!(summary.segment_count, 250);
    assert_eq!(summary.activity_counts.get("WALKING"), Some(&125));
    assert_eq!(summary.activity_counts.get("IN_BUS"), Some(&125));
    assert_eq!(*calls.lock().unwrap(), vec![(0, 250), (100, 250), (200, 250)]);
    assert_eq!(db.count_timeline_segments().await.unwrap(), 250);

    let stored = db.get_activity_segments().await.unwrap();
    assert_eq!(stored.len(), 250);
    // Walked through the activity-type index: IN_BUS sorts first.
    assert_eq!(stored[0].activity_type(), Some("IN_BUS"));
    assert_eq!(stored[0].start_time.offset().local_minus_utc(), 7200);

    db.replace_timeline(Vec::new(), 100, |_, _| {}).await.unwrap();
    assert_eq!(db.count_timeline_segments().await.unwrap(), 0);

    drop(db);
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn trips_round_trip_and_filter_by_mode() {
    let (dir, db) = scratch_db();

    let stored = vec![
        trip("b", TransportMode::InTrain, "2024-05-02T08:00:00+01:00"),
        trip("a", TransportMode::Flying, "2024-05-01T08:00:00+01:00"),
        trip("c", TransportMode::InTrain, "2024-05-03T08:00:00+01:00"),
    ];
    db.replace_trips(&stored).await.unwrap();

    let all = db.list_trips().await.unwrap();
    assert_eq!(all, stored, "stored order and offsets are preserved");

    let trains = db.list_trips_by_mode(TransportMode::InTrain).await.unwrap();
    let ids: Vec<&str> = trains.iter().map(|trip| trip.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "c"]);

    db.replace_trips(&stored[1..2]).await.unwrap();
    let remaining = db.list_trips().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, "a");
    assert!(db
        .list_trips_by_mode(TransportMode::InTrain)
        .await
        .unwrap()
        .is_empty());

    drop(db);
    let _ = fs::remove_dir_all(&dir);
}
