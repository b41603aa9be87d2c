//! Raw timeline segments as they appear in a location-history export.
//!
//! A segment carries exactly one payload: an `activity` (movement between two
//! points), a `visit` (a stay at a place) or a `timelinePath` (raw points).
//! Each payload is kept as an optional field so that an odd record never
//! fails the whole import.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

use super::TransportMode;

/// Top-level export document. `rawSignals` and `userLocationProfile` are
/// ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineExport {
    #[serde(default)]
    pub semantic_segments: Vec<Segment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time_timezone_utc_offset_minutes: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time_timezone_utc_offset_minutes: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity: Option<Activity>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit: Option<Visit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline_path: Option<Vec<PathPoint>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Activity,
    Visit,
    TimelinePath,
    Empty,
}

impl SegmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SegmentKind::Activity => "activity",
            SegmentKind::Visit => "visit",
            SegmentKind::TimelinePath => "timelinePath",
            SegmentKind::Empty => "empty",
        }
    }
}

impl Segment {
    pub fn kind(&self) -> SegmentKind {
        if self.activity.is_some() {
            SegmentKind::Activity
        } else if self.visit.is_some() {
            SegmentKind::Visit
        } else if self.timeline_path.is_some() {
            SegmentKind::TimelinePath
        } else {
            SegmentKind::Empty
        }
    }

    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// Raw `topCandidate.type` of an activity segment.
    pub fn activity_type(&self) -> Option<&str> {
        self.activity
            .as_ref()
            .and_then(|activity| activity.top_candidate.as_ref())
            .map(|candidate| candidate.kind.as_str())
    }

    pub fn transport_mode(&self) -> Option<TransportMode> {
        self.activity_type().map(TransportMode::from_tag)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Activity {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<Place>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<Place>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_candidate: Option<ActivityCandidate>,
}

impl Activity {
    pub fn start_point(&self) -> Option<LatLng> {
        self.start.as_ref().and_then(Place::point)
    }

    pub fn end_point(&self) -> Option<LatLng> {
        self.end.as_ref().and_then(Place::point)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat_lng: Option<String>,
}

impl Place {
    pub fn point(&self) -> Option<LatLng> {
        self.lat_lng.as_deref().and_then(LatLng::parse)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityCandidate {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hierarchy_level: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_candidate: Option<VisitCandidate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitCandidate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_location: Option<Place>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathPoint {
    pub point: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<DateTime<FixedOffset>>,
}
