use std::collections::{HashMap, HashSet};

use async_trait::async_trait;

use crate::{
    Res,
    report::Observer,
    stats::Tally,
    types::{GenreShare, TrackEvent},
    utils,
};

/// Largest id batch a tag lookup accepts.
pub const MAX_LOOKUP_IDS: usize = 50;
/// Most entries in a distribution, the last one being [`OTHER`] when folded.
pub const MAX_GENRES: usize = 8;
/// Sample titles sent per artist to the classifier.
pub const SAMPLE_TITLES: usize = 3;
pub const OTHER: &str = "Other";

/// Primary genre source: maps track ids to genre tags.
///
/// An id missing from the returned map means "nothing known", which is not
/// the same as an empty tag list.
#[async_trait]
pub trait GenreLookup: Send + Sync {
    async fn fetch_genres(&self, ids: &[String]) -> Res<HashMap<String, Vec<String>>>;
}

/// An artist together with a few of their track titles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtistSample {
    pub artist: String,
    pub titles: Vec<String>,
}

/// Fallback genre source: one best guess per artist.
#[async_trait]
pub trait GenreClassifier: Send + Sync {
    async fn classify(&self, artists: &[ArtistSample]) -> Res<HashMap<String, String>>;
}

/// Builds the genre distribution of the recently played tracks.
///
/// Tags from `lookup` count once per tag and play. Plays without tags are
/// grouped by artist and credited with the label `classifier` returns for
/// that artist. Failures of either source only reduce what gets counted.
///
/// Returns `None` when there is nothing to analyze: no plays, no play with
/// an id, or no genre counted at all.
pub async fn reconcile_genres(
    recent: &[TrackEvent],
    lookup: Option<&dyn GenreLookup>,
    classifier: Option<&dyn GenreClassifier>,
    observer: &dyn Observer,
) -> Option<Vec<GenreShare>> {
    let ids = lookup_ids(recent);
    if ids.is_empty() {
        return None;
    }

    let tags = match lookup {
        Some(lookup) => match lookup.fetch_genres(&ids).await {
            Ok(tags) => tags,
            Err(e) => {
                observer.warn(&format!("Genre lookup failed: {}", e));
                HashMap::new()
            }
        },
        None => HashMap::new(),
    };

    let mut counts = Tally::default();
    let mut untagged: Vec<&TrackEvent> = Vec::new();

    for event in recent {
        match tags.get(&event.id).filter(|t| !t.is_empty()) {
            Some(genres) => {
                for genre in genres {
                    counts.add(genre.to_lowercase(), 1);
                }
            }
            None => untagged.push(event),
        }
    }

    if !untagged.is_empty() {
        classify_untagged(&untagged, classifier, &mut counts, observer).await;
    }

    let counts = counts.into_ranked();
    if counts.is_empty() {
        observer.warn("No genre data available");
        return None;
    }

    distribute(&counts)
}

/// Unique non-empty ids in first-seen order, at most [`MAX_LOOKUP_IDS`].
pub fn lookup_ids(events: &[TrackEvent]) -> Vec<String> {
    let mut seen = HashSet::new();
    events
        .iter()
        .filter(|e| e.has_id())
        .filter(|e| seen.insert(e.id.as_str()))
        .take(MAX_LOOKUP_IDS)
        .map(|e| e.id.clone())
        .collect()
}

/// Groups plays by artist, keeping first-seen order and up to [`SAMPLE_TITLES`] titles.
pub fn artist_samples(events: &[&TrackEvent]) -> Vec<(ArtistSample, usize)> {
    let mut groups: Vec<(ArtistSample, usize)> = Vec::new();
    for event in events {
        match groups.iter_mut().find(|(s, _)| s.artist == event.artist) {
            Some((sample, plays)) => {
                if sample.titles.len() < SAMPLE_TITLES {
                    sample.titles.push(event.name.clone());
                }
                *plays += 1;
            }
            None => groups.push((
                ArtistSample {
                    artist: event.artist.clone(),
                    titles: vec![event.name.clone()],
                },
                1,
            )),
        }
    }
    groups
}

async fn classify_untagged(
    untagged: &[&TrackEvent],
    classifier: Option<&dyn GenreClassifier>,
    counts: &mut Tally<String>,
    observer: &dyn Observer,
) {
    let Some(classifier) = classifier else {
        observer.warn(&format!(
            "{} tracks have no genre tags and no classifier is configured",
            untagged.len()
        ));
        return;
    };

    let groups = artist_samples(untagged);
    observer.info(&format!(
        "Classifying {} tracks by {} artists without genre tags",
        untagged.len(),
        groups.len()
    ));

    let samples: Vec<ArtistSample> = groups.iter().map(|(s, _)| s.clone()).collect();
    let labels = match classifier.classify(&samples).await {
        Ok(labels) => labels,
        Err(e) => {
            observer.warn(&format!("Genre classification failed: {}", e));
            return;
        }
    };

    for (sample, plays) in groups {
        let label = labels
            .get(&sample.artist)
            .map(String::as_str)
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(OTHER);
        counts.add(label.trim().to_lowercase(), plays);
    }
}

/// Turns ranked genre counts into a percentage distribution summing to 100.
///
/// `counts` must already be ordered by count descending. Genres that round
/// to 0% are dropped, then the first entry absorbs the rounding difference. More than [`MAX_GENRES`] genres are
/// folded into a trailing [`OTHER`] entry.
pub fn distribute(counts: &[(String, usize)]) -> Option<Vec<GenreShare>> {
    let total: usize = counts.iter().map(|(_, c)| c).sum();
    if total == 0 {
        return None;
    }

    let mut shares: Vec<GenreShare> = counts
        .iter()
        .map(|(genre, count)| GenreShare {
            genre: utils::title_case(genre),
            percentage: (*count as f64 * 100.0 / total as f64).round() as i64,
        })
        .filter(|s| s.percentage > 0)
        .collect();
    if shares.is_empty() {
        return None;
    }

    // Only the first entry moves unless it would drop below zero.
    let mut remaining = 100 - shares.iter().map(|s| s.percentage).sum::<i64>();
    for share in shares.iter_mut() {
        if remaining == 0 {
            break;
        }
        let adjusted = (share.percentage + remaining).max(0);
        remaining -= adjusted - share.percentage;
        share.percentage = adjusted;
    }

    if shares.len() > MAX_GENRES {
        let folded: i64 = shares[MAX_GENRES - 1..].iter().map(|s| s.percentage).sum();
        shares.truncate(MAX_GENRES - 1);
        match shares.iter_mut().find(|s| s.genre == OTHER) {
            Some(other) => other.percentage += folded,
            None => shares.push(GenreShare {
                genre: OTHER.to_string(),
                percentage: folded,
            }),
        }
    }

    Some(shares)
}
