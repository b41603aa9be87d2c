use anyhow::{Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::{PoisonError, RwLock},
};

use crate::classification::TripConfig;
use crate::db::models::{ModeThreshold, TransportMode};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct UserSettings {
    trip_thresholds: TripConfig,
    cities_path: Option<PathBuf>,
}

/// User settings persisted as JSON. Every update is written through to disk.
pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                warn!("Ignoring invalid settings in {}: {err}", path.display());
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn trip_config(&self) -> TripConfig {
        self.read(|settings| settings.trip_thresholds.clone())
    }

    pub fn set_threshold(&self, mode: TransportMode, threshold: ModeThreshold) -> Result<()> {
        self.update(|settings| settings.trip_thresholds.set_threshold(mode, threshold))
    }

    pub fn remove_threshold(&self, mode: TransportMode) -> Result<()> {
        self.update(|settings| {
            settings.trip_thresholds.remove_threshold(mode);
        })
    }

    pub fn reset_thresholds(&self) -> Result<()> {
        self.update(|settings| settings.trip_thresholds = TripConfig::default())
    }

    pub fn cities_path(&self) -> Option<PathBuf> {
        self.read(|settings| settings.cities_path.clone())
    }

    pub fn set_cities_path(&self, path: Option<PathBuf>) -> Result<()> {
        self.update(|settings| settings.cities_path = path)
    }

    fn read<T>(&self, view: impl FnOnce(&UserSettings) -> T) -> T {
        let guard = self.data.read().unwrap_or_else(PoisonError::into_inner);
        view(&guard)
    }

    fn update(&self, change: impl FnOnce(&mut UserSettings)) -> Result<()> {
        let mut guard = self.data.write().unwrap_or_else(PoisonError::into_inner);
        change(&mut guard);
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("tripglobe-settings-{}", uuid::Uuid::new_v4()))
            .join("settings.json")
    }

    #[test]
    fn defaults_when_file_missing() {
        let store = SettingsStore::new(scratch_path()).unwrap();
        assert_eq!(store.trip_config(), TripConfig::default());
        assert_eq!(store.cities_path(), None);
    }

    #[test]
    fn updates_persist_across_reloads() {
        let path = scratch_path();
        let store = SettingsStore::new(path.clone()).unwrap();
        store
            .set_threshold(TransportMode::Walking, ModeThreshold::new(1.0, 10.0))
            .unwrap();
        store
            .set_cities_path(Some(PathBuf::from("/data/cities.json")))
            .unwrap();

        let reloaded = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(
            reloaded.trip_config().threshold(TransportMode::Walking),
            Some(&ModeThreshold::new(1.0, 10.0))
        );
        assert_eq!(reloaded.cities_path(), Some(PathBuf::from("/data/cities.json")));

        reloaded.remove_threshold(TransportMode::Flying).unwrap();
        assert_eq!(reloaded.trip_config().threshold(TransportMode::Flying), None);

        reloaded.reset_thresholds().unwrap();
        let again = SettingsStore::new(path).unwrap();
        assert_eq!(again.trip_config(), TripConfig::default());
    }

    #[test]
    fn invalid_file_falls_back_to_defaults() {
        let path = scratch_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        let store = SettingsStore::new(path).unwrap();
        assert_eq!(store.trip_config(), TripConfig::default());
    }
}
