//! Reference city dataset and nearest-city lookup for trip endpoints.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Deserializer};

use crate::geo::distance_meters;

pub const UNKNOWN_LOCATION: &str = "Unknown Location";

const MAX_DISTANCE_KM: f64 = 50.0;
const MIN_POPULATION: u64 = 50_000;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CityRecord {
    pub name: String,
    #[serde(deserialize_with = "lenient_f64")]
    pub lat: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub lon: f64,
    #[serde(deserialize_with = "lenient_population")]
    pub population: u64,
}

impl CityRecord {
    pub fn new(name: impl Into<String>, lat: f64, lon: f64, population: u64) -> Self {
        Self {
            name: name.into(),
            lat,
            lon,
            population,
        }
    }
}

/// City datasets in the wild store numbers either as JSON numbers or as
/// strings; accept both.
fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(number) => number
            .as_f64()
            .ok_or_else(|| D::Error::custom("number out of range")),
        serde_json::Value::String(raw) => raw
            .trim()
            .parse()
            .map_err(|err| D::Error::custom(format!("invalid number '{raw}': {err}"))),
        other => Err(D::Error::custom(format!("expected a number, got {other}"))),
    }
}

fn lenient_population<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = lenient_f64(deserializer)?;
    Ok(if value.is_finite() && value > 0.0 {
        value as u64
    } else {
        0
    })
}

/// Immutable city list shared by every classification run.
#[derive(Debug, Clone, Default)]
pub struct CityIndex {
    cities: Vec<CityRecord>,
}

impl CityIndex {
    pub fn from_records(cities: Vec<CityRecord>) -> Self {
        Self { cities }
    }

    /// Parse a JSON array of city records. Records that do not convert
    /// (missing name, null or non-numeric coordinates or population) are
    /// skipped; only a document that is not an array is an error.
    pub fn from_json(raw: &str) -> Result<Self> {
        let entries: Vec<serde_json::Value> =
            serde_json::from_str(raw).context("invalid city dataset JSON")?;
        let total = entries.len();

        let cities: Vec<CityRecord> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect();

        let skipped = total - cities.len();
        if skipped > 0 {
            warn!("Skipped {skipped} of {total} city records with missing or invalid fields");
        }
        Ok(Self { cities })
    }

    /// Load the dataset at `path`. A missing or malformed file leaves the
    /// index empty, so every lookup resolves to [`UNKNOWN_LOCATION`].
    pub fn load(path: &Path) -> Self {
        let result = fs::read_to_string(path)
            .with_context(|| format!("failed to read city dataset {}", path.display()))
            .and_then(|raw| Self::from_json(&raw));

        match result {
            Ok(index) => {
                info!("City data loaded: {} cities", index.len());
                index
            }
            Err(err) => {
                warn!("City names unavailable, continuing without them: {err:#}");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.cities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cities.is_empty()
    }

    /// Name the most significant city near a point.
    ///
    /// Cities within 50 km with at least 50,000 inhabitants are scored by
    /// `population / max(1, km)`; on equal scores the later city wins.
    pub fn resolve(&self, lat: f64, lon: f64) -> String {
        let mut best: Option<&CityRecord> = None;
        let mut best_score = 0.0;

        for city in &self.cities {
            let distance_km = distance_meters(lat, lon, city.lat, city.lon) / 1000.0;
            if distance_km > MAX_DISTANCE_KM || city.population < MIN_POPULATION {
                continue;
            }

            let score = city.population as f64 / distance_km.max(1.0);
            if score >= best_score {
                best = Some(city);
                best_score = score;
            }
        }

        match best {
            Some(city) => format!("{} ({})", city.name, format_population(city.population)),
            None => UNKNOWN_LOCATION.to_string(),
        }
    }
}

/// Abbreviated population with one decimal, halves rounded up.
pub fn format_population(population: u64) -> String {
    if population > 1_000_000 {
        format!("{:.1}M", (population as f64 / 100_000.0).round() / 10.0)
    } else if population > 1_000 {
        format!("{:.1}K", (population as f64 / 100.0).round() / 10.0)
    } else {
        population.to_string()
    }
}
