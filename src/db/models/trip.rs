use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::geo::LatLng;

use super::TransportMode;

/// An activity segment that met its mode's threshold, with resolved city
/// names for both ends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trip {
    pub id: String,
    pub mode: TransportMode,
    pub start: LatLng,
    pub end: LatLng,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    /// Distance recorded in the export, not recomputed from the endpoints.
    pub distance_meters: f64,
    pub probability: Option<f64>,
    pub start_city: String,
    pub end_city: String,
}

impl Trip {
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }
}
