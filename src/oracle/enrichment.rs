use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Deserialize, de::DeserializeOwned};

use crate::{
    Res,
    oracle::{CompletionOptions, Oracle},
    report::Observer,
    stats::{ArtistSample, GenreClassifier},
    types::{
        FavoriteAnalysis, FavoriteResolution, LibraryReport, PlayCount, SongSuggestion,
        TopSongsAnalysis, TrackDetails, TrackEvent,
    },
    utils,
};

pub const VALIDATION_TIMEOUT: Duration = Duration::from_secs(10);
pub const ANALYSIS_TIMEOUT: Duration = Duration::from_secs(30);

/// Recent plays shown to the model when asking for suggestions.
pub const SUGGESTION_CONTEXT: usize = 20;
pub const MAX_SUGGESTIONS: usize = 5;
pub const MAX_RECOMMENDATIONS: usize = 3;
pub const TOP_SONGS: usize = 3;
pub const FAVORITE_CONTEXT: usize = 5;

/// Error messages are cut to this many characters before they are logged.
const ERROR_PREVIEW: usize = 50;

/// Asks for a plausibility check of the library summary.
///
/// The answer is either `OK` or a short description of what looks wrong.
pub async fn validate_summary(
    oracle: &dyn Oracle,
    report: &LibraryReport,
    observer: &dyn Observer,
) -> Option<String> {
    let summary = &report.summary;
    let top = report
        .top_artists
        .iter()
        .take(5)
        .map(|a| format!("{} ({})", a.artist, a.count))
        .collect::<Vec<_>>()
        .join(", ");

    let prompt = format!(
        "Check this Spotify library summary for obvious problems.\n\n\
         Summary:\n\
         - Total tracks: {}\n\
         - Total duration: {} hours\n\
         - Average song: {} minutes\n\
         - Unique artists: {}\n\
         - Date range: {}\n\n\
         Top 5 artists: {}\n\n\
         Answer with ONLY one of these:\n\
         - \"OK\" when the numbers look plausible\n\
         - a short issue description (at most 10 words) otherwise\n\n\
         Typical problems: negative numbers, impossible dates, an average song over 60 minutes, 0 tracks.",
        summary.total_tracks,
        summary.total_duration_hours,
        summary.avg_duration_minutes,
        summary.unique_artists,
        summary.date_range,
        top,
    );

    match oracle
        .complete(&prompt, &CompletionOptions::text(VALIDATION_TIMEOUT))
        .await
    {
        Ok(answer) if !answer.trim().is_empty() => Some(answer.trim().to_string()),
        Ok(_) => {
            observer.warn(&format!("Validation skipped: empty answer from {}", oracle.name()));
            None
        }
        Err(e) => {
            observer.warn(&format!(
                "Validation skipped: {}: {}",
                oracle.name(),
                utils::truncate_chars(&e.to_string(), ERROR_PREVIEW)
            ));
            None
        }
    }
}

/// Suggests up to [`MAX_SUGGESTIONS`] songs based on the recent plays.
pub async fn suggest_songs(
    oracle: &dyn Oracle,
    recent: &[TrackEvent],
    observer: &dyn Observer,
) -> Option<Vec<SongSuggestion>> {
    if recent.is_empty() {
        return None;
    }

    let listened = recent
        .iter()
        .take(SUGGESTION_CONTEXT)
        .map(|t| format!("- {} by {}", t.name, t.artist))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        "Suggest 5 songs this listener might enjoy, based on what they played recently.\n\n\
         Recently played:\n{listened}\n\n\
         Return ONLY a JSON array with exactly 5 entries, each with:\n\
         - \"song\": the song title\n\
         - \"artist\": the artist name\n\
         - \"reason\": why they might like it (at most 15 words)\n\n\
         Example:\n\
         [{{\"song\": \"Song Name\", \"artist\": \"Artist Name\", \"reason\": \"Same vibe as X you played\"}}]\n\n\
         Match the mood, genre and style of the recent listening. No other text."
    );

    let mut suggestions: Vec<SongSuggestion> =
        complete_json(oracle, &prompt, "Song suggestions", observer).await?;
    suggestions.truncate(MAX_SUGGESTIONS);
    Some(suggestions)
}

#[derive(Debug, Deserialize)]
struct FavoriteAnswer {
    #[serde(default)]
    mood_analysis: String,
    #[serde(default)]
    taste_profile: String,
    #[serde(default)]
    recommendations: Vec<SongSuggestion>,
}

/// Describes the mood of the weekly favorite and recommends similar songs.
///
/// `context` holds the most played tracks of the same window; at most
/// [`FAVORITE_CONTEXT`] of them are shown to the model.
pub async fn analyze_weekly_favorite(
    oracle: &dyn Oracle,
    favorite: FavoriteResolution,
    details: Option<TrackDetails>,
    context: &[PlayCount],
    observer: &dyn Observer,
) -> Option<FavoriteAnalysis> {
    let details_text = details
        .as_ref()
        .map(|d| describe_details(&favorite.track, d))
        .unwrap_or_default();

    let others = context
        .iter()
        .take(FAVORITE_CONTEXT)
        .map(|p| format!("- {} by {} ({} plays)", p.track, p.artist, p.count))
        .collect::<Vec<_>>()
        .join("\n");

    let track = &favorite.track;
    let prompt = format!(
        "Analyze this listener's favorite song and what it says about their taste.\n\n\
         Most played song recently: \"{track}\" by {artist} (played {plays} times)\n\
         {details_text}\n\
         Other frequently played songs:\n{others}\n\n\
         Return ONLY a JSON object with this structure:\n\
         {{\n\
         \"mood_analysis\": \"<2-3 sentences on the mood of the favorite>\",\n\
         \"taste_profile\": \"<2-3 sentences on their music taste>\",\n\
         \"recommendations\": [\n\
         {{\"song\": \"<title>\", \"artist\": \"<artist>\", \"reason\": \"<link to {track}, at most 15 words>\"}}\n\
         ]\n\
         }}\n\n\
         Rules:\n\
         - Recommend exactly 3 songs matching the mood and style of \"{track}\"\n\
         - Every reason must mention \"{track}\" and name the similarity\n\
         - Do not recommend songs from the listening history above\n\
         - No other text",
        artist = favorite.artist,
        plays = favorite.play_count,
    );

    let mut answer: FavoriteAnswer =
        complete_json(oracle, &prompt, "Weekly favorite analysis", observer).await?;
    answer.recommendations.truncate(MAX_RECOMMENDATIONS);

    Some(FavoriteAnalysis {
        favorite,
        mood_analysis: answer.mood_analysis,
        taste_profile: answer.taste_profile,
        recommendations: answer.recommendations,
        track_details: details,
    })
}

fn describe_details(track: &str, details: &TrackDetails) -> String {
    let genres = if details.artist_genres.is_empty() {
        "not categorized (indie artist)".to_string()
    } else {
        details.artist_genres.join(", ")
    };

    format!(
        "\nSpotify track info for \"{track}\":\n\
         - Duration: {:.1} minutes\n\
         - Track popularity: {}/100\n\
         - Artist popularity: {}/100\n\
         - Artist genres: {genres}\n\
         - Album: {}\n\
         - Release date: {}\n\
         - Explicit: {}\n",
        details.duration_ms as f64 / 60_000.0,
        details.popularity,
        details.artist_popularity,
        details.album_name,
        details.release_date,
        details.explicit,
    )
}

/// Explains the appeal of the [`TOP_SONGS`] most played songs of the playback
/// history window and proposes a five song playlist in the same vein.
///
/// Play counts are attached to the analyses by position.
pub async fn analyze_top_songs(
    oracle: &dyn Oracle,
    top: &[PlayCount],
    observer: &dyn Observer,
) -> Option<TopSongsAnalysis> {
    if top.is_empty() {
        return None;
    }
    let top = &top[..top.len().min(TOP_SONGS)];

    let songs = top
        .iter()
        .enumerate()
        .map(|(i, p)| format!("{}. \"{}\" by {} ({} plays)", i + 1, p.track, p.artist, p.count))
        .collect::<Vec<_>>()
        .join("\n");

    let prompt = format!(
        "Explain why this listener loves these songs and build a playlist for them.\n\n\
         Their most played songs of the last 7 days:\n{songs}\n\n\
         Return ONLY a JSON object with this structure:\n\
         {{\n\
         \"song_analyses\": [\n\
         {{\"track\": \"<name>\", \"artist\": \"<artist>\", \"why_you_love_it\": \"<2 sentences>\"}}\n\
         ],\n\
         \"playlist\": {{\n\
         \"name\": \"<creative name>\",\n\
         \"description\": \"<1 sentence on the vibe>\",\n\
         \"songs\": [{{\"track\": \"<name>\", \"artist\": \"<artist>\"}}]\n\
         }}\n\
         }}\n\n\
         Rules:\n\
         - One analysis per song above, in the same order\n\
         - Be specific about musical elements, mood or themes\n\
         - The playlist has 5 songs and none of the songs above\n\
         - No other text"
    );

    let mut analysis: TopSongsAnalysis =
        complete_json(oracle, &prompt, "Top songs analysis", observer).await?;
    for (song, played) in analysis.song_analyses.iter_mut().zip(top) {
        song.play_count = played.count;
    }
    Some(analysis)
}

/// Genre classifier backed by an [`Oracle`].
pub struct OracleClassifier {
    oracle: Arc<dyn Oracle>,
}

impl OracleClassifier {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }
}

#[async_trait]
impl GenreClassifier for OracleClassifier {
    async fn classify(&self, artists: &[ArtistSample]) -> Res<HashMap<String, String>> {
        let listing = artists
            .iter()
            .map(|a| format!("- {} (songs: {})", a.artist, a.titles.join(", ")))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Classify these artists into genres. Spotify has no genre data for them.\n\n\
             Artists:\n{listing}\n\n\
             Return ONLY a JSON object mapping each artist name to ONE genre.\n\
             Use simple genres: Hip Hop, R&B, Pop, Rock, Electronic, Indie, Country, Latin, Jazz, Metal, Folk, Alternative\n\n\
             Example: {{\"Artist Name\": \"Hip Hop\", \"Another Artist\": \"Pop\"}}"
        );

        let answer = self
            .oracle
            .complete(&prompt, &CompletionOptions::json(ANALYSIS_TIMEOUT))
            .await?;
        let labels: HashMap<String, serde_json::Value> =
            serde_json::from_str(utils::strip_code_fences(&answer))?;

        Ok(labels
            .into_iter()
            .filter_map(|(artist, genre)| genre.as_str().map(|g| (artist, g.to_string())))
            .collect())
    }
}

async fn complete_json<T: DeserializeOwned>(
    oracle: &dyn Oracle,
    prompt: &str,
    feature: &str,
    observer: &dyn Observer,
) -> Option<T> {
    let answer = match oracle
        .complete(prompt, &CompletionOptions::json(ANALYSIS_TIMEOUT))
        .await
    {
        Ok(answer) => answer,
        Err(e) => {
            observer.warn(&format!(
                "{} failed: {}: {}",
                feature,
                oracle.name(),
                utils::truncate_chars(&e.to_string(), ERROR_PREVIEW)
            ));
            return None;
        }
    };

    match serde_json::from_str(utils::strip_code_fences(&answer)) {
        Ok(value) => Some(value),
        Err(e) => {
            observer.warn(&format!(
                "{}: {} returned unusable JSON: {}",
                feature,
                oracle.name(),
                utils::truncate_chars(&e.to_string(), ERROR_PREVIEW)
            ));
            None
        }
    }
}
