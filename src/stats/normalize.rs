use serde_json::Value;

use crate::types::{Moment, TrackEvent};

pub const UNKNOWN: &str = "Unknown";

/// Converts one raw record from the upstream source into a [`TrackEvent`].
///
/// Two shapes are understood:
///
/// - API items: `{"added_at" | "played_at", "track": {"name", "artists": [{"name"}], "album": {"name"}, "duration_ms", "id"}}`
/// - flat fixture items: `{"name", "artist", "album", "duration_ms", "added_at"}`, optionally wrapped in `track`
///
/// Any field that is missing or has an unexpected type falls back to its
/// default, so a single malformed record never aborts a batch.
pub fn normalize(item: &Value) -> TrackEvent {
    let track = item.get("track").filter(|t| t.is_object()).unwrap_or(item);

    let artist = match track.get("artists").and_then(Value::as_array) {
        Some(artists) => {
            let names: Vec<&str> = artists
                .iter()
                .filter_map(|a| a.get("name").and_then(Value::as_str))
                .collect();
            if names.is_empty() {
                UNKNOWN.to_string()
            } else {
                names.join(", ")
            }
        }
        None => string_field(track, "artist").unwrap_or_else(|| UNKNOWN.to_string()),
    };

    let album = match track.get("album") {
        Some(Value::Object(album)) => album
            .get("name")
            .and_then(Value::as_str)
            .map(str::to_string),
        Some(Value::String(album)) => Some(album.clone()),
        _ => None,
    };

    let moment = if let Some(added_at) =
        string_field(item, "added_at").or_else(|| string_field(track, "added_at"))
    {
        Some(Moment::Added(added_at))
    } else {
        string_field(item, "played_at").map(Moment::Played)
    };

    TrackEvent {
        name: string_field(track, "name").unwrap_or_else(|| UNKNOWN.to_string()),
        artist,
        album,
        duration_ms: track.get("duration_ms").map_or(0, duration_ms),
        moment,
        id: string_field(track, "id").unwrap_or_default(),
    }
}

pub fn normalize_all(items: &[Value]) -> Vec<TrackEvent> {
    items.iter().map(normalize).collect()
}

// Negative or non-numeric durations count as zero.
fn duration_ms(value: &Value) -> u64 {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|d| *d > 0.0).map(|d| d as u64))
        .unwrap_or(0)
}

// Empty strings count as absent.
fn string_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
