use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::db::models::{ModeThreshold, TransportMode};

/// Per-mode distance/duration thresholds for trip classification.
///
/// Serialized as a map keyed by mode tag, e.g.
/// `{"WALKING": {"distance": 5.0, "duration": 30.0}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TripConfig {
    thresholds: BTreeMap<TransportMode, ModeThreshold>,
}

impl Default for TripConfig {
    fn default() -> Self {
        let thresholds = TransportMode::KNOWN
            .into_iter()
            .filter_map(|mode| mode.default_threshold().map(|threshold| (mode, threshold)))
            .collect();
        Self { thresholds }
    }
}

impl TripConfig {
    /// A configuration with no modes; nothing qualifies until thresholds are
    /// added.
    pub fn empty() -> Self {
        Self {
            thresholds: BTreeMap::new(),
        }
    }

    pub fn threshold(&self, mode: TransportMode) -> Option<&ModeThreshold> {
        self.thresholds.get(&mode)
    }

    pub fn set_threshold(&mut self, mode: TransportMode, threshold: ModeThreshold) {
        self.thresholds.insert(mode, threshold);
    }

    pub fn with_threshold(mut self, mode: TransportMode, distance: f64, duration: f64) -> Self {
        self.set_threshold(mode, ModeThreshold::new(distance, duration));
        self
    }

    pub fn remove_threshold(&mut self, mode: TransportMode) -> Option<ModeThreshold> {
        self.thresholds.remove(&mode)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TransportMode, &ModeThreshold)> {
        self.thresholds.iter().map(|(mode, threshold)| (*mode, threshold))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_covers_every_mode_with_a_threshold() {
        let config = TripConfig::default();
        assert_eq!(config.iter().count(), 11);
        assert_eq!(
            config.threshold(TransportMode::InPassengerVehicle),
            Some(&ModeThreshold::new(100.0, 60.0))
        );
        assert!(config.threshold(TransportMode::UnknownActivityType).is_none());
    }

    #[test]
    fn serializes_as_tag_map() {
        let config = TripConfig::empty().with_threshold(TransportMode::Walking, 5.0, 30.0);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"WALKING":{"distance":5.0,"duration":30.0}}"#);

        let parsed: TripConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }
}
