use std::fmt;

use serde::{Deserialize, Serialize};
use tabled::Tabled;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
}

/// When a [`TrackEvent`] happened, depending on what kind of event it is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Moment {
    /// The track was saved to the library.
    Added(String),
    /// The track was played.
    Played(String),
}

/// Canonical track event every statistic is computed from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackEvent {
    pub name: String,
    pub artist: String,
    pub album: Option<String>,
    pub duration_ms: u64,
    pub moment: Option<Moment>,
    /// Empty when the source has no identifier (sample data, local files).
    pub id: String,
}

impl TrackEvent {
    pub fn added_at(&self) -> Option<&str> {
        match &self.moment {
            Some(Moment::Added(at)) => Some(at.as_str()),
            _ => None,
        }
    }

    pub fn played_at(&self) -> Option<&str> {
        match &self.moment {
            Some(Moment::Played(at)) => Some(at.as_str()),
            _ => None,
        }
    }

    pub fn has_id(&self) -> bool {
        !self.id.is_empty()
    }
}

/// Inclusive `(earliest, latest)` day over dated events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange(pub Option<(String, String)>);

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some((min, max)) => write!(f, "{min} to {max}"),
            None => write!(f, "N/A to N/A"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSummary {
    pub total_tracks: usize,
    pub total_duration_hours: f64,
    pub avg_duration_minutes: f64,
    pub unique_artists: usize,
    pub date_range: DateRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedArtist {
    pub artist: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthBucket {
    pub month: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentTrack {
    pub name: String,
    pub artist: String,
    pub added: String,
}

/// Everything the Aggregator derives from one batch of events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryReport {
    pub summary: AggregateSummary,
    pub top_artists: Vec<RankedArtist>,
    pub monthly_additions: Vec<MonthBucket>,
    pub recent_tracks: Vec<RecentTrack>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreShare {
    pub genre: String,
    pub percentage: i64,
}

/// Which data produced a [`FavoriteResolution`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SourceWindow {
    /// Persisted playback history of the trailing 7 days.
    HistoryLog,
    /// The short recently-played buffer returned by the API.
    RecentPlays,
}

impl fmt::Display for SourceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceWindow::HistoryLog => write!(f, "history_7d"),
            SourceWindow::RecentPlays => write!(f, "recently_played"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteResolution {
    pub track: String,
    pub artist: String,
    pub id: String,
    pub play_count: usize,
    pub source_window: SourceWindow,
}

/// A `(track, artist)` pair with its play count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayCount {
    pub track: String,
    pub artist: String,
    pub count: usize,
}

/// One entry of the persisted playback history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayRecord {
    pub name: String,
    pub artist: String,
    pub id: String,
    pub played_at: String,
}

/// Details about one track, used to ground the weekly favorite analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackDetails {
    pub popularity: u32,
    pub duration_ms: u64,
    pub explicit: bool,
    pub album_name: String,
    pub release_date: String,
    pub artist_genres: Vec<String>,
    pub artist_popularity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongSuggestion {
    pub song: String,
    pub artist: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FavoriteAnalysis {
    pub favorite: FavoriteResolution,
    #[serde(default)]
    pub mood_analysis: String,
    #[serde(default)]
    pub taste_profile: String,
    #[serde(default)]
    pub recommendations: Vec<SongSuggestion>,
    #[serde(default)]
    pub track_details: Option<TrackDetails>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongAnalysis {
    pub track: String,
    pub artist: String,
    #[serde(default)]
    pub why_you_love_it: String,
    #[serde(default)]
    pub play_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSong {
    pub track: String,
    pub artist: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistSuggestion {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub songs: Vec<PlaylistSong>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopSongsAnalysis {
    #[serde(default)]
    pub song_analyses: Vec<SongAnalysis>,
    #[serde(default)]
    pub playlist: Option<PlaylistSuggestion>,
}

/// Paging envelope of `GET /me/tracks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTracksResponse {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
    pub next: Option<String>,
    pub total: Option<u64>,
}

/// Envelope of `GET /me/player/recently-played`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentlyPlayedResponse {
    #[serde(default)]
    pub items: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleArtist {
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleAlbum {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub release_date: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullTrack {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub artists: Vec<SimpleArtist>,
    pub album: Option<SimpleAlbum>,
    #[serde(default)]
    pub duration_ms: u64,
    #[serde(default)]
    pub popularity: u32,
    #[serde(default)]
    pub explicit: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralTracksResponse {
    #[serde(default)]
    pub tracks: Vec<Option<FullTrack>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FullArtist {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub popularity: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeveralArtistsResponse {
    #[serde(default)]
    pub artists: Vec<Option<FullArtist>>,
}

#[derive(Tabled)]
pub struct SummaryTableRow {
    pub metric: String,
    pub value: String,
}

#[derive(Tabled)]
pub struct ArtistTableRow {
    pub artist: String,
    pub tracks: usize,
}

#[derive(Tabled)]
pub struct GenreTableRow {
    pub genre: String,
    pub share: String,
}

#[derive(Tabled)]
pub struct PlayCountTableRow {
    pub track: String,
    pub artist: String,
    pub plays: usize,
}
