//! Where listening events come from.
//!
//! [`EventSource`] is the contract the pipeline pulls raw records through.
//! The Spotify client implements it against the Web API, [`SampleSource`]
//! against a local JSON fixture so the whole job can run offline.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::{Res, report::Observer, stats, types::TrackEvent};

/// Items per page, matching the Spotify maximum for saved tracks.
pub const PAGE_SIZE: usize = 50;
/// Size of the recently played buffer.
pub const RECENT_LIMIT: usize = 50;

/// One page of raw records and the offset of the next one, if any.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub items: Vec<Value>,
    pub next: Option<usize>,
}

#[async_trait]
pub trait EventSource: Send + Sync {
    /// Saved tracks starting at `offset`.
    async fn fetch_events(&self, offset: usize) -> Res<Page>;

    /// The most recent playback events, newest first, at most `limit`.
    async fn fetch_recent(&self, limit: usize) -> Res<Vec<Value>>;
}

/// Pages through `source` until it is exhausted or `max` events were read.
///
/// Any page failing is an error: a partial library would produce misleading
/// statistics.
pub async fn collect_events(
    source: &dyn EventSource,
    max: usize,
    observer: &dyn Observer,
) -> Res<Vec<TrackEvent>> {
    let mut events = Vec::new();
    let mut offset = 0;

    while offset < max {
        let page = source.fetch_events(offset).await?;
        if page.items.is_empty() {
            break;
        }

        events.extend(stats::normalize_all(&page.items));
        observer.info(&format!("Fetched {} tracks...", events.len()));

        match page.next {
            Some(next) if next > offset => offset = next,
            _ => break,
        }
    }

    events.truncate(max);
    Ok(events)
}

pub async fn collect_recent(source: &dyn EventSource, limit: usize) -> Res<Vec<TrackEvent>> {
    let items = source.fetch_recent(limit).await?;
    Ok(stats::normalize_all(&items))
}

#[derive(Debug, Deserialize)]
struct SampleFile {
    #[serde(default)]
    tracks: Vec<Value>,
}

/// Serves saved tracks from a `{"tracks": [...]}` file.
#[derive(Debug, Clone)]
pub struct SampleSource {
    path: PathBuf,
}

impl SampleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn load(&self) -> Res<Vec<Value>> {
        let content = async_fs::read_to_string(&self.path)
            .await
            .map_err(|e| format!("Cannot read sample data {}: {}", self.path.display(), e))?;
        let file: SampleFile = serde_json::from_str(&content)?;
        Ok(file.tracks)
    }
}

#[async_trait]
impl EventSource for SampleSource {
    async fn fetch_events(&self, offset: usize) -> Res<Page> {
        let tracks = self.load().await?;
        let end = (offset + PAGE_SIZE).min(tracks.len());
        let items = tracks
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|t| json!({ "track": t, "added_at": t.get("added_at") }))
            .collect();

        Ok(Page {
            items,
            next: (end < tracks.len()).then_some(end),
        })
    }

    // Sample data has no playback events.
    async fn fetch_recent(&self, _limit: usize) -> Res<Vec<Value>> {
        Ok(Vec::new())
    }
}
