//! Render commands emitted during playback and the sinks that receive them.
//!
//! The globe itself lives outside this crate. Playback only ever writes to a
//! [`RenderSink`]: it never reads render state back.

use std::{
    io::Write,
    sync::{Mutex, PoisonError},
};

use chrono::{DateTime, FixedOffset};
use log::{error, info};
use serde::{Deserialize, Serialize};

use super::camera::CameraMove;

/// One trip drawn on the globe. Arcs accumulate for the whole playback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArcDatum {
    pub start_lat: f64,
    pub start_lng: f64,
    pub end_lat: f64,
    pub end_lng: f64,
    pub color: String,
    #[serde(rename = "type")]
    pub mode: String,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub label: String,
}

/// Marker for a city the playback has passed through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityMarker {
    pub city: String,
    pub lat: f64,
    pub lng: f64,
    pub label: String,
}

/// Info panel contents for the trip on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TripInfo {
    pub icon: String,
    pub label: String,
    pub elapsed: String,
    pub distance_miles: f64,
    pub distance_text: String,
    pub start_city: String,
    pub end_city: String,
}

pub trait RenderSink: Send + Sync {
    /// Replace the displayed arcs with the full cumulative list.
    fn set_arcs(&self, arcs: &[ArcDatum]);
    /// Replace the displayed city markers with the full cumulative list.
    fn set_markers(&self, markers: &[CityMarker]);
    fn move_camera(&self, camera: &CameraMove);
    fn show_trip_info(&self, info: &TripInfo);
}

/// Writes render commands to the log.
#[derive(Debug, Default)]
pub struct LogSink;

impl RenderSink for LogSink {
    fn set_arcs(&self, arcs: &[ArcDatum]) {
        if let Some(latest) = arcs.last() {
            info!("[arcs] {} on globe, latest {}", arcs.len(), latest.label);
        }
    }

    fn set_markers(&self, markers: &[CityMarker]) {
        if let Some(latest) = markers.last() {
            info!("[markers] {} cities, latest {}", markers.len(), latest.city);
        }
    }

    fn move_camera(&self, camera: &CameraMove) {
        info!(
            "[camera] lat {:.3} lng {:.3} altitude {:.2} over {} ms",
            camera.lat, camera.lng, camera.altitude, camera.duration_ms
        );
    }

    fn show_trip_info(&self, info: &TripInfo) {
        info!(
            "[{}] {}: {}, {} | {} -> {}",
            info.icon, info.label, info.elapsed, info.distance_text, info.start_city, info.end_city
        );
    }
}

#[derive(Serialize)]
#[serde(tag = "command", rename_all = "camelCase")]
enum RenderCommand<'a> {
    SetArcs { arcs: &'a [ArcDatum] },
    SetMarkers { markers: &'a [CityMarker] },
    MoveCamera { camera: &'a CameraMove },
    TripInfo { info: &'a TripInfo },
}

/// Writes each render command as one JSON object per line, for a renderer
/// running in another process.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self, command: RenderCommand<'_>) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let result = serde_json::to_writer(&mut *writer, &command)
            .map_err(std::io::Error::from)
            .and_then(|_| writer.write_all(b"\n"))
            .and_then(|_| writer.flush());
        if let Err(err) = result {
            error!("Failed to write render command: {err}");
        }
    }
}

impl<W: Write + Send> RenderSink for JsonLinesSink<W> {
    fn set_arcs(&self, arcs: &[ArcDatum]) {
        self.write(RenderCommand::SetArcs { arcs });
    }

    fn set_markers(&self, markers: &[CityMarker]) {
        self.write(RenderCommand::SetMarkers { markers });
    }

    fn move_camera(&self, camera: &CameraMove) {
        self.write(RenderCommand::MoveCamera { camera });
    }

    fn show_trip_info(&self, info: &TripInfo) {
        self.write(RenderCommand::TripInfo { info });
    }
}

/// Latest render state kept in memory, plus the history of camera moves.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RenderSnapshot {
    pub arcs: Vec<ArcDatum>,
    pub markers: Vec<CityMarker>,
    pub camera_moves: Vec<CameraMove>,
    pub trip_infos: Vec<TripInfo>,
    /// Number of `set_arcs` calls received.
    pub arc_updates: usize,
    /// Number of `set_markers` calls received.
    pub marker_updates: usize,
}

#[derive(Debug, Default)]
pub struct MemorySink {
    snapshot: Mutex<RenderSnapshot>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> RenderSnapshot {
        self.snapshot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update(&self, apply: impl FnOnce(&mut RenderSnapshot)) {
        let mut guard = self.snapshot.lock().unwrap_or_else(PoisonError::into_inner);
        apply(&mut guard);
    }
}

impl RenderSink for MemorySink {
    fn set_arcs(&self, arcs: &[ArcDatum]) {
        self.update(|snapshot| {
            snapshot.arcs = arcs.to_vec();
            snapshot.arc_updates += 1;
        });
    }

    fn set_markers(&self, markers: &[CityMarker]) {
        self.update(|snapshot| {
            snapshot.markers = markers.to_vec();
            snapshot.marker_updates += 1;
        });
    }

    fn move_camera(&self, camera: &CameraMove) {
        self.update(|snapshot| snapshot.camera_moves.push(camera.clone()));
    }

    fn show_trip_info(&self, info: &TripInfo) {
        self.update(|snapshot| snapshot.trip_infos.push(info.clone()));
    }
}
