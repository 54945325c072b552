use crate::{
    report::Observer,
    stats::ranked,
    types::{FavoriteResolution, PlayCount, SourceWindow, TrackEvent},
};

/// Fewest recent plays that still make a meaningful favorite without history.
pub const MIN_RECENT_PLAYS: usize = 2;

/// Finds the most played track of the trailing week.
///
/// A non-empty `history` (the persisted `(track, artist)` plays of the last
/// 7 days) always decides the favorite; `recent` is then only used to find
/// the track id. Without history the favorite is the mode of `recent`, which
/// needs at least [`MIN_RECENT_PLAYS`] entries. Returns `None` when there is
/// not enough data.
pub fn resolve_favorite(
    recent: &[TrackEvent],
    history: Option<&[(String, String)]>,
    observer: &dyn Observer,
) -> Option<FavoriteResolution> {
    match history {
        Some(plays) if !plays.is_empty() => {
            observer.info(&format!(
                "Using playback history ({} plays from the last 7 days)",
                plays.len()
            ));
            from_history(recent, plays)
        }
        _ => {
            observer.info(&format!(
                "Using recently played ({} tracks), playback history not available",
                recent.len()
            ));
            from_recent(recent)
        }
    }
}

fn from_history(recent: &[TrackEvent], plays: &[(String, String)]) -> Option<FavoriteResolution> {
    let ((track, artist), play_count) = ranked(plays.iter().cloned()).into_iter().next()?;

    let id = recent
        .iter()
        .find(|e| e.name == track && e.artist == artist)
        .map(|e| e.id.clone())
        .unwrap_or_default();

    Some(FavoriteResolution {
        track,
        artist,
        id,
        play_count,
        source_window: SourceWindow::HistoryLog,
    })
}

fn from_recent(recent: &[TrackEvent]) -> Option<FavoriteResolution> {
    if recent.len() < MIN_RECENT_PLAYS {
        return None;
    }

    let ((track, artist, id), play_count) = ranked(
        recent
            .iter()
            .map(|e| (e.name.clone(), e.artist.clone(), e.id.clone())),
    )
    .into_iter()
    .next()?;

    Some(FavoriteResolution {
        track,
        artist,
        id,
        play_count,
        source_window: SourceWindow::RecentPlays,
    })
}

/// The `limit` most played tracks of the same window the favorite came from.
pub fn top_played(
    recent: &[TrackEvent],
    history: Option<&[(String, String)]>,
    limit: usize,
) -> Vec<PlayCount> {
    let counts = match history {
        Some(plays) if !plays.is_empty() => ranked(plays.iter().cloned()),
        _ => ranked(recent.iter().map(|e| (e.name.clone(), e.artist.clone()))),
    };

    counts
        .into_iter()
        .take(limit)
        .map(|((track, artist), count)| PlayCount {
            track,
            artist,
            count,
        })
        .collect()
}
