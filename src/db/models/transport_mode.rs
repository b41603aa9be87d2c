use serde::{Deserialize, Serialize};

/// Minimum distance and duration a segment must reach to count as a trip.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeThreshold {
    /// Miles.
    pub distance: f64,
    /// Minutes.
    pub duration: f64,
}

impl ModeThreshold {
    pub const fn new(distance: f64, duration: f64) -> Self {
        Self { distance, duration }
    }

    /// Both bounds are inclusive.
    pub fn admits(&self, distance_miles: f64, duration_minutes: f64) -> bool {
        distance_miles >= self.distance && duration_minutes >= self.duration
    }
}

/// Transport mode tag of an activity segment.
///
/// Tags outside the known set deserialize to `Unrecognized` and render with
/// the same fallback look as `UNKNOWN_ACTIVITY_TYPE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransportMode {
    Flying,
    InBus,
    InFerry,
    InPassengerVehicle,
    InSubway,
    InTrain,
    InTram,
    Cycling,
    Motorcycling,
    Running,
    Walking,
    UnknownActivityType,
    #[serde(other)]
    Unrecognized,
}

impl TransportMode {
    pub const KNOWN: [TransportMode; 12] = [
        TransportMode::Flying,
        TransportMode::InBus,
        TransportMode::InFerry,
        TransportMode::InPassengerVehicle,
        TransportMode::InSubway,
        TransportMode::InTrain,
        TransportMode::InTram,
        TransportMode::Cycling,
        TransportMode::Motorcycling,
        TransportMode::Running,
        TransportMode::Walking,
        TransportMode::UnknownActivityType,
    ];

    pub fn from_tag(tag: &str) -> Self {
        Self::KNOWN
            .into_iter()
            .find(|mode| mode.as_str() == tag)
            .unwrap_or(TransportMode::Unrecognized)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransportMode::Flying => "FLYING",
            TransportMode::InBus => "IN_BUS",
            TransportMode::InFerry => "IN_FERRY",
            TransportMode::InPassengerVehicle => "IN_PASSENGER_VEHICLE",
            TransportMode::InSubway => "IN_SUBWAY",
            TransportMode::InTrain => "IN_TRAIN",
            TransportMode::InTram => "IN_TRAM",
            TransportMode::Cycling => "CYCLING",
            TransportMode::Motorcycling => "MOTORCYCLING",
            TransportMode::Running => "RUNNING",
            TransportMode::Walking => "WALKING",
            TransportMode::UnknownActivityType => "UNKNOWN_ACTIVITY_TYPE",
            TransportMode::Unrecognized => "UNRECOGNIZED",
        }
    }

    pub fn color(&self) -> &'static str {
        match self {
            TransportMode::Flying => "pink",
            TransportMode::InBus => "yellow",
            TransportMode::InFerry => "blue",
            TransportMode::InPassengerVehicle => "green",
            TransportMode::InSubway => "purple",
            TransportMode::InTrain => "orange",
            TransportMode::InTram => "cyan",
            TransportMode::Cycling => "lime",
            TransportMode::Motorcycling => "red",
            TransportMode::Running => "magenta",
            TransportMode::Walking => "white",
            TransportMode::UnknownActivityType | TransportMode::Unrecognized => "grey",
        }
    }

    /// Material icon name.
    pub fn icon(&self) -> &'static str {
        match self {
            TransportMode::Flying => "flight",
            TransportMode::InBus => "directions_bus",
            TransportMode::InFerry => "directions_boat",
            TransportMode::InPassengerVehicle => "drive_eta",
            TransportMode::InSubway => "subway",
            TransportMode::InTrain => "train",
            TransportMode::InTram => "tram",
            TransportMode::Cycling => "directions_bike",
            TransportMode::Motorcycling => "two_wheeler",
            TransportMode::Running => "directions_run",
            TransportMode::Walking => "directions_walk",
            TransportMode::UnknownActivityType | TransportMode::Unrecognized => "help_outline",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TransportMode::Flying => "Airplane",
            TransportMode::InBus => "Bus",
            TransportMode::InFerry => "Ferry",
            TransportMode::InPassengerVehicle => "Car",
            TransportMode::InSubway => "Subway",
            TransportMode::InTrain => "Train",
            TransportMode::InTram => "Tram",
            TransportMode::Cycling => "Cycling",
            TransportMode::Motorcycling => "Motorcycle",
            TransportMode::Running => "Running",
            TransportMode::Walking => "Walking",
            TransportMode::UnknownActivityType | TransportMode::Unrecognized => "Unknown",
        }
    }

    /// Threshold used when no custom configuration overrides it. Modes
    /// without one never become trips by default.
    pub fn default_threshold(&self) -> Option<ModeThreshold> {
        match self {
            TransportMode::Flying => Some(ModeThreshold::new(0.0, 0.0)),
            TransportMode::InBus => Some(ModeThreshold::new(50.0, 60.0)),
            TransportMode::InFerry => Some(ModeThreshold::new(0.0, 0.0)),
            TransportMode::InPassengerVehicle => Some(ModeThreshold::new(100.0, 60.0)),
            TransportMode::InSubway => Some(ModeThreshold::new(50.0, 60.0)),
            TransportMode::InTrain => Some(ModeThreshold::new(20.0, 30.0)),
            TransportMode::InTram => Some(ModeThreshold::new(20.0, 30.0)),
            TransportMode::Cycling => Some(ModeThreshold::new(10.0, 0.0)),
            TransportMode::Motorcycling => Some(ModeThreshold::new(50.0, 0.0)),
            TransportMode::Running => Some(ModeThreshold::new(10.0, 0.0)),
            TransportMode::Walking => Some(ModeThreshold::new(5.0, 30.0)),
            TransportMode::UnknownActivityType | TransportMode::Unrecognized => None,
        }
    }

    pub fn is_flying(&self) -> bool {
        matches!(self, TransportMode::Flying)
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
