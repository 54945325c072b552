use std::{collections::HashSet, path::PathBuf};

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

use crate::types::{PlayRecord, TrackEvent};

/// Length of the trailing window the weekly favorite is computed over.
pub const WINDOW_DAYS: i64 = 7;

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid history file: {0}")]
    Serde(#[from] serde_json::Error),
}

/// Persisted log of playback events.
///
/// The recently played buffer of the API only covers the last 50 plays. Each
/// run merges that buffer into this log so that play counts over the last
/// [`WINDOW_DAYS`] days stay accurate. Records are kept in chronological
/// order.
pub struct PlayHistory {
    path: PathBuf,
    records: Vec<PlayRecord>,
}

impl PlayHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    /// Reads the log at `path`. A missing file is an empty log.
    pub async fn load(path: impl Into<PathBuf>) -> Result<Self, HistoryError> {
        let path = path.into();
        let json = match async_fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::new(path));
            }
            Err(e) => return Err(HistoryError::Io(e)),
        };

        let records: Vec<PlayRecord> = serde_json::from_str(&json)?;
        Ok(Self { path, records })
    }

    pub async fn persist(&self) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.records)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Adds the playback events that are not logged yet and returns how many were new.
    pub fn record(&mut self, plays: &[TrackEvent]) -> usize {
        let mut known: HashSet<(String, String, String)> =
            self.records.iter().map(Self::key).collect();

        let mut added = 0;
        for event in plays {
            let Some(played_at) = event.played_at() else {
                continue;
            };
            let record = PlayRecord {
                name: event.name.clone(),
                artist: event.artist.clone(),
                id: event.id.clone(),
                played_at: played_at.to_string(),
            };
            if known.insert(Self::key(&record)) {
                self.records.push(record);
                added += 1;
            }
        }

        if added > 0 {
            self.records.sort_by_key(|r| parse_time(&r.played_at));
        }
        added
    }

    /// Drops records older than `retention_days` and records without a readable timestamp.
    pub fn prune(&mut self, now: DateTime<Utc>, retention_days: i64) -> usize {
        let cutoff = now - Duration::days(retention_days);
        let before = self.records.len();
        self.records
            .retain(|r| parse_time(&r.played_at).is_some_and(|t| t >= cutoff));
        before - self.records.len()
    }

    /// `(track, artist)` of every play within the last `days` days, oldest first.
    pub fn window(&self, now: DateTime<Utc>, days: i64) -> Vec<(String, String)> {
        let cutoff = now - Duration::days(days);
        self.records
            .iter()
            .filter(|r| parse_time(&r.played_at).is_some_and(|t| t >= cutoff && t <= now))
            .map(|r| (r.name.clone(), r.artist.clone()))
            .collect()
    }

    pub fn records(&self) -> &[PlayRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn key(record: &PlayRecord) -> (String, String, String) {
        (
            record.played_at.clone(),
            record.name.clone(),
            record.artist.clone(),
        )
    }
}

fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}
