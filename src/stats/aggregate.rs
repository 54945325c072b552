use std::collections::{BTreeMap, HashSet};

use crate::{
    stats::ranked,
    types::{
        AggregateSummary, DateRange, LibraryReport, MonthBucket, RankedArtist, RecentTrack,
        TrackEvent,
    },
};

pub const TOP_ARTISTS: usize = 15;
pub const RECENT_TRACKS: usize = 40;

const MS_PER_HOUR: f64 = 3_600_000.0;
const MS_PER_MINUTE: f64 = 60_000.0;

/// Computes the dashboard statistics for one batch of saved tracks.
///
/// Running it twice on the same batch yields identical output. An empty
/// batch yields zeros, the `N/A` date range and empty lists.
pub fn aggregate(events: &[TrackEvent]) -> LibraryReport {
    LibraryReport {
        summary: summarize(events),
        top_artists: top_artists(events, TOP_ARTISTS),
        monthly_additions: monthly_additions(events),
        recent_tracks: recent_tracks(events, RECENT_TRACKS),
    }
}

pub fn summarize(events: &[TrackEvent]) -> AggregateSummary {
    let total_ms: u64 = events.iter().map(|e| e.duration_ms).sum();
    let unique_artists = events
        .iter()
        .map(|e| e.artist.as_str())
        .collect::<HashSet<_>>()
        .len();

    let avg_duration_minutes = if events.is_empty() {
        0.0
    } else {
        round_to(total_ms as f64 / events.len() as f64 / MS_PER_MINUTE, 2)
    };

    AggregateSummary {
        total_tracks: events.len(),
        total_duration_hours: round_to(total_ms as f64 / MS_PER_HOUR, 1),
        avg_duration_minutes,
        unique_artists,
        date_range: date_range(events),
    }
}

/// Artists by number of tracks, descending. Ties keep first-seen order.
pub fn top_artists(events: &[TrackEvent], limit: usize) -> Vec<RankedArtist> {
    ranked(events.iter().map(|e| e.artist.clone()))
        .into_iter()
        .take(limit)
        .map(|(artist, count)| RankedArtist { artist, count })
        .collect()
}

/// One bucket per `YYYY-MM` of `added_at`, oldest first. Undated events are skipped.
pub fn monthly_additions(events: &[TrackEvent]) -> Vec<MonthBucket> {
    let mut months: BTreeMap<String, usize> = BTreeMap::new();
    for added_at in events.iter().filter_map(TrackEvent::added_at) {
        *months.entry(prefix(added_at, 7).to_string()).or_insert(0) += 1;
    }

    months
        .into_iter()
        .map(|(month, count)| MonthBucket { month, count })
        .collect()
}

/// Most recently added tracks first, limited to `limit` entries.
pub fn recent_tracks(events: &[TrackEvent], limit: usize) -> Vec<RecentTrack> {
    let mut dated: Vec<(&TrackEvent, &str)> = events
        .iter()
        .filter_map(|e| e.added_at().map(|at| (e, at)))
        .collect();
    dated.sort_by(|a, b| b.1.cmp(a.1));

    dated
        .into_iter()
        .take(limit)
        .map(|(e, at)| RecentTrack {
            name: e.name.clone(),
            artist: e.artist.clone(),
            added: prefix(at, 10).to_string(),
        })
        .collect()
}

fn date_range(events: &[TrackEvent]) -> DateRange {
    let days: Vec<&str> = events
        .iter()
        .filter_map(TrackEvent::added_at)
        .map(|at| prefix(at, 10))
        .collect();

    match (days.iter().min(), days.iter().max()) {
        (Some(min), Some(max)) => DateRange(Some((min.to_string(), max.to_string()))),
        _ => DateRange(None),
    }
}

fn prefix(value: &str, len: usize) -> &str {
    match value.char_indices().nth(len) {
        Some((idx, _)) => &value[..idx],
        None => value,
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
