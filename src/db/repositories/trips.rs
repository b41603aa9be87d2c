use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::parse_datetime,
    models::{TransportMode, Trip},
};
use crate::geo::LatLng;

const TRIP_COLUMNS: &str = "id, mode, start_lat, start_lng, end_lat, end_lng, start_time, end_time,
     distance_meters, probability, start_city, end_city";

fn row_to_trip(row: &Row) -> Result<Trip> {
    let mode: String = row.get("mode")?;
    let start_time: String = row.get("start_time")?;
    let end_time: String = row.get("end_time")?;

    Ok(Trip {
        id: row.get("id")?,
        mode: TransportMode::from_tag(&mode),
        start: LatLng::new(row.get("start_lat")?, row.get("start_lng")?),
        end: LatLng::new(row.get("end_lat")?, row.get("end_lng")?),
        start_time: parse_datetime(&start_time, "start_time")?,
        end_time: parse_datetime(&end_time, "end_time")?,
        distance_meters: row.get("distance_meters")?,
        probability: row.get("probability")?,
        start_city: row.get("start_city")?,
        end_city: row.get("end_city")?,
    })
}

impl Database {
    /// Replace the confirmed trip set.
    pub async fn replace_trips(&self, trips: &[Trip]) -> Result<()> {
        let trips = trips.to_vec();
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM trips", [])
                .context("failed to clear trips")?;

            let created_at = Utc::now().to_rfc3339();
            for trip in &trips {
                tx.execute(
                    "INSERT INTO trips (
                        id,
                        mode,
                        start_lat,
                        start_lng,
                        end_lat,
                        end_lng,
                        start_time,
                        end_time,
                        distance_meters,
                        probability,
                        start_city,
                        end_city,
                        created_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                    params![
                        trip.id,
                        trip.mode.as_str(),
                        trip.start.lat,
                        trip.start.lng,
                        trip.end.lat,
                        trip.end.lng,
                        trip.start_time.to_rfc3339(),
                        trip.end_time.to_rfc3339(),
                        trip.distance_meters,
                        trip.probability,
                        trip.start_city,
                        trip.end_city,
                        created_at,
                    ],
                )
                .with_context(|| format!("failed to insert trip {}", trip.id))?;
            }

            tx.commit()?;
            Ok(())
        })
        .await
    }

    /// All confirmed trips in the order they were stored.
    pub async fn list_trips(&self) -> Result<Vec<Trip>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TRIP_COLUMNS} FROM trips ORDER BY rowid ASC"
            ))?;

            let mut rows = stmt.query([])?;
            let mut trips = Vec::new();
            while let Some(row) = rows.next()? {
                trips.push(row_to_trip(row)?);
            }
            Ok(trips)
        })
        .await
    }

    pub async fn list_trips_by_mode(&self, mode: TransportMode) -> Result<Vec<Trip>> {
        self.execute(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TRIP_COLUMNS} FROM trips WHERE mode = ?1 ORDER BY rowid ASC"
            ))?;

            let mut rows = stmt.query(params![mode.as_str()])?;
            let mut trips = Vec::new();
            while let Some(row) = rows.next()? {
                trips.push(row_to_trip(row)?);
            }
            Ok(trips)
        })
        .await
    }
}
