//! # Listening Statistics
//!
//! The computational core of a run. Everything in here is deterministic and
//! free of I/O apart from the injected genre capabilities:
//!
//! ```text
//! raw JSON items ─▶ normalize ─▶ TrackEvent ─┬─▶ aggregate         (dashboard summary)
//!                                            ├─▶ resolve_favorite  (weekly favorite)
//!                                            └─▶ reconcile_genres  (genre distribution)
//! ```
//!
//! The three consumers are independent of each other and may run in any
//! order on the same normalized events.
//!
//! ## Ranking
//!
//! Every ranking in this module (top artists, favorite track, genre counts)
//! sorts by count descending and breaks ties by the order in which a key was
//! first seen. [`ranked`] implements that rule once.

use std::{collections::HashMap, hash::Hash};

mod aggregate;
mod favorite;
mod genres;
mod normalize;

pub use aggregate::{
    RECENT_TRACKS, TOP_ARTISTS, aggregate, monthly_additions, recent_tracks, summarize,
    top_artists,
};
pub use favorite::{MIN_RECENT_PLAYS, resolve_favorite, top_played};
pub use genres::{
    ArtistSample, GenreClassifier, GenreLookup, MAX_GENRES, MAX_LOOKUP_IDS, OTHER,
    SAMPLE_TITLES, artist_samples, distribute, lookup_ids, reconcile_genres,
};
pub use normalize::{UNKNOWN, normalize, normalize_all};

/// Counts keys while remembering the order they were first seen in.
#[derive(Debug, Clone)]
pub struct Tally<K> {
    index: HashMap<K, usize>,
    counts: Vec<(K, usize)>,
}

impl<K> Default for Tally<K> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            counts: Vec::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> Tally<K> {
    pub fn add(&mut self, key: K, amount: usize) {
        match self.index.get(&key) {
            Some(&pos) => self.counts[pos].1 += amount,
            None => {
                self.index.insert(key.clone(), self.counts.len());
                self.counts.push((key, amount));
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Count descending, first-seen order on ties.
    pub fn into_ranked(self) -> Vec<(K, usize)> {
        let mut counts = self.counts;
        // sort_by is stable, so equal counts keep insertion order
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        counts
    }
}

/// Counts every item and ranks the distinct ones.
pub fn ranked<K, I>(items: I) -> Vec<(K, usize)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = K>,
{
    let mut tally = Tally::default();
    for item in items {
        tally.add(item, 1);
    }
    tally.into_ranked()
}
