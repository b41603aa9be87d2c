use std::collections::BTreeMap;

use anyhow::{Context, Result};
use rusqlite::params;

use crate::db::{connection::Database, helpers::to_usize, models::Segment};

/// Outcome of rebuilding the segment log.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TimelineSummary {
    pub segment_count: usize,
    /// Activity segments per raw `topCandidate.type`.
    pub activity_counts: BTreeMap<String, usize>,
}

impl Database {
    /// Replace the stored segment log with `segments`.
    ///
    /// `on_progress` is called with the number of segments written so far,
    /// every `progress_every` segments, from the database thread.
    pub async fn replace_timeline<F>(
        &self,
        segments: Vec<Segment>,
        progress_every: usize,
        mut on_progress: F,
    ) -> Result<TimelineSummary>
    where
        F: FnMut(usize, usize) + Send + 'static,
    {
        self.execute(move |conn| {
            let tx = conn.transaction()?;
            tx.execute("DELETE FROM timeline", [])
                .context("failed to clear timeline")?;

            let total = segments.len();
            let mut summary = TimelineSummary {
                segment_count: total,
                ..TimelineSummary::default()
            };

            {
                let mut stmt = tx.prepare(
                    "INSERT INTO timeline (start_time, end_time, kind, activity_type, payload)
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                )?;

                for (index, segment) in segments.iter().enumerate() {
                    if progress_every > 0 && index % progress_every == 0 {
                        on_progress(index, total);
                    }

                    let activity_type = segment.activity_type();
                    if let Some(kind) = activity_type {
                        *summary.activity_counts.entry(kind.to_string()).or_insert(0) += 1;
                    }

                    let payload = serde_json::to_string(segment)
                        .context("failed to serialize segment")?;
                    stmt.execute(params![
                        segment.start_time.to_rfc3339(),
                        segment.end_time.to_rfc3339(),
                        segment.kind().as_str(),
                        activity_type,
                        payload,
                    ])
                    .context("failed to insert segment")?;
                }
            }

            tx.commit().context("failed to commit timeline import")?;
            Ok(summary)
        })
        .await
    }

    /// Activity segments, walked through the activity-type index.
    pub async fn get_activity_segments(&self) -> Result<Vec<Segment>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT payload FROM timeline
                 WHERE activity_type IS NOT NULL
                 ORDER BY activity_type ASC, id ASC",
            )?;

            let mut rows = stmt.query([])?;
            let mut segments = Vec::new();
            while let Some(row) = rows.next()? {
                let payload: String = row.get(0)?;
                let segment: Segment = serde_json::from_str(&payload)
                    .context("stored segment payload is not valid JSON")?;
                segments.push(segment);
            }

            Ok(segments)
        })
        .await
    }

    pub async fn count_timeline_segments(&self) -> Result<usize> {
        self.execute(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM timeline", [], |row| row.get(0))?;
            to_usize(count, "timeline count")
        })
        .await
    }
}
