use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use spotdash::Res;
use spotdash::report::{RecordingObserver, SilentObserver};
use spotdash::stats::{
    ArtistSample, GenreClassifier, GenreLookup, MAX_GENRES, MAX_LOOKUP_IDS, artist_samples,
    distribute, lookup_ids, reconcile_genres,
};
use spotdash::types::{GenreShare, Moment, TrackEvent};

fn play(name: &str, artist: &str, id: &str) -> TrackEvent {
    TrackEvent {
        name: name.to_string(),
        artist: artist.to_string(),
        album: None,
        duration_ms: 180_000,
        moment: Some(Moment::Played("2025-01-16T08:00:00Z".to_string())),
        id: id.to_string(),
    }
}

fn counts(pairs: &[(&str, usize)]) -> Vec<(String, usize)> {
    pairs.iter().map(|(g, c)| (g.to_string(), *c)).collect()
}

fn shares(result: &[GenreShare]) -> Vec<(&str, i64)> {
    result
        .iter()
        .map(|s| (s.genre.as_str(), s.percentage))
        .collect()
}

struct StaticLookup {
    tags: HashMap<String, Vec<String>>,
}

#[async_trait]
impl GenreLookup for StaticLookup {
    async fn fetch_genres(&self, _ids: &[String]) -> Res<HashMap<String, Vec<String>>> {
        Ok(self.tags.clone())
    }
}

struct FailingLookup;

#[async_trait]
impl GenreLookup for FailingLookup {
    async fn fetch_genres(&self, _ids: &[String]) -> Res<HashMap<String, Vec<String>>> {
        Err("service unavailable".into())
    }
}

#[derive(Default)]
struct StaticClassifier {
    labels: HashMap<String, String>,
    seen: Mutex<Vec<ArtistSample>>,
}

#[async_trait]
impl GenreClassifier for StaticClassifier {
    async fn classify(&self, artists: &[ArtistSample]) -> Res<HashMap<String, String>> {
        self.seen.lock().unwrap().extend(artists.iter().cloned());
        Ok(self.labels.clone())
    }
}

struct FailingClassifier;

#[async_trait]
impl GenreClassifier for FailingClassifier {
    async fn classify(&self, _artists: &[ArtistSample]) -> Res<HashMap<String, String>> {
        Err("timeout".into())
    }
}

#[test]
fn test_distribute_exact_percentages() {
    let result = distribute(&counts(&[("rock", 6), ("jazz", 3), ("pop", 1)])).unwrap();

    assert_eq!(shares(&result), vec![("Rock", 60), ("Jazz", 30), ("Pop", 10)]);
}

#[test]
fn test_distribute_first_entry_absorbs_rounding() {
    let result = distribute(&counts(&[("a", 1), ("b", 1), ("c", 1)])).unwrap();

    assert_eq!(shares(&result), vec![("A", 34), ("B", 33), ("C", 33)]);
}

#[test]
fn test_distribute_first_entry_gives_back_overshoot() {
    // 37.5 and 12.5 both round up, 102 in total
    let result = distribute(&counts(&[("x", 3), ("y", 3), ("z", 1), ("w", 1)])).unwrap();

    assert_eq!(
        shares(&result),
        vec![("X", 36), ("Y", 38), ("Z", 13), ("W", 13)]
    );
}

#[test]
fn test_distribute_drops_genres_rounding_to_zero() {
    let result = distribute(&counts(&[("a", 300), ("b", 1)])).unwrap();

    assert_eq!(shares(&result), vec![("A", 100)]);
}

#[test]
fn test_distribute_title_cases_genres() {
    let result = distribute(&counts(&[("indie rock", 1), ("hip hop", 1)])).unwrap();

    assert_eq!(result[0].genre, "Indie Rock");
    assert_eq!(result[1].genre, "Hip Hop");
}

#[test]
fn test_distribute_caps_at_max_genres() {
    let pairs: Vec<(String, usize)> = (0..12)
        .map(|i| (format!("genre {}", i), 12 - i))
        .collect();

    let result = distribute(&pairs).unwrap();

    assert_eq!(result.len(), MAX_GENRES);
    assert_eq!(result.last().unwrap().genre, "Other");
    assert_eq!(result.iter().map(|s| s.percentage).sum::<i64>(), 100);
    assert!(result.iter().all(|s| s.percentage >= 0));
}

#[test]
fn test_distribute_folds_into_existing_other() {
    let mut pairs = counts(&[("other", 20), ("rock", 15)]);
    pairs.extend((0..8).map(|i| (format!("g{}", i), 5)));

    let result = distribute(&pairs).unwrap();

    assert_eq!(result.len(), MAX_GENRES - 1);
    assert_eq!(result.iter().filter(|s| s.genre == "Other").count(), 1);
    assert_eq!(result.iter().map(|s| s.percentage).sum::<i64>(), 100);
}

#[test]
fn test_distribute_nothing_counted() {
    assert_eq!(distribute(&[]), None);
    assert_eq!(distribute(&counts(&[("rock", 0)])), None);
}

#[test]
fn test_lookup_ids_unique_and_bounded() {
    let mut events: Vec<TrackEvent> = (0..60)
        .map(|i| play("Song", "Artist", &format!("id{}", i)))
        .collect();
    events.insert(0, play("Song", "Artist", "id5"));
    events.insert(0, play("Local", "Artist", ""));

    let ids = lookup_ids(&events);

    assert_eq!(ids.len(), MAX_LOOKUP_IDS);
    assert_eq!(ids[0], "id5");
    assert_eq!(ids.iter().filter(|id| *id == "id5").count(), 1);
}

#[test]
fn test_artist_samples_groups_and_limits_titles() {
    let events = [
        play("One", "A", "1"),
        play("Two", "B", "2"),
        play("Three", "A", "3"),
        play("Four", "A", "4"),
        play("Five", "A", "5"),
    ];
    let refs: Vec<&TrackEvent> = events.iter().collect();

    let groups = artist_samples(&refs);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].0.artist, "A");
    assert_eq!(groups[0].0.titles, vec!["One", "Three", "Four"]);
    assert_eq!(groups[0].1, 4);
    assert_eq!(groups[1].1, 1);
}

#[tokio::test]
async fn test_reconcile_without_plays_or_ids() {
    assert_eq!(reconcile_genres(&[], None, None, &SilentObserver).await, None);

    let no_ids = vec![play("Local", "Artist", "")];
    assert_eq!(
        reconcile_genres(&no_ids, None, None, &SilentObserver).await,
        None
    );
}

#[tokio::test]
async fn test_reconcile_tags_and_classifier() {
    let recent = vec![
        play("Tagged", "Art1", "t1"),
        play("Empty Tags", "Art2", "t2"),
        play("Unknown Id", "Art3", "t3"),
    ];
    let lookup = StaticLookup {
        tags: HashMap::from([
            (
                "t1".to_string(),
                vec!["Indie Rock".to_string(), "shoegaze".to_string()],
            ),
            ("t2".to_string(), Vec::new()),
        ]),
    };
    let classifier = StaticClassifier {
        labels: HashMap::from([("Art2".to_string(), "Jazz".to_string())]),
        ..Default::default()
    };

    let result = reconcile_genres(&recent, Some(&lookup), Some(&classifier), &SilentObserver)
        .await
        .unwrap();

    assert_eq!(
        shares(&result),
        vec![
            ("Indie Rock", 25),
            ("Shoegaze", 25),
            ("Jazz", 25),
            ("Other", 25)
        ]
    );

    let seen = classifier.seen.lock().unwrap();
    let artists: Vec<&str> = seen.iter().map(|s| s.artist.as_str()).collect();
    assert_eq!(artists, vec!["Art2", "Art3"]);
}

#[tokio::test]
async fn test_reconcile_classifier_counts_every_play_of_artist() {
    let recent = vec![
        play("a", "Solo", "1"),
        play("b", "Solo", "2"),
        play("c", "Solo", "3"),
        play("d", "Band", "4"),
    ];
    let lookup = StaticLookup {
        tags: HashMap::from([("4".to_string(), vec!["rock".to_string()])]),
    };
    let classifier = StaticClassifier {
        labels: HashMap::from([("Solo".to_string(), "Hip Hop".to_string())]),
        ..Default::default()
    };

    let result = reconcile_genres(&recent, Some(&lookup), Some(&classifier), &SilentObserver)
        .await
        .unwrap();

    assert_eq!(shares(&result), vec![("Hip Hop", 75), ("Rock", 25)]);
}

#[tokio::test]
async fn test_reconcile_lookup_failure_degrades_to_classifier() {
    let recent = vec![play("a", "Solo", "1")];
    let classifier = StaticClassifier {
        labels: HashMap::from([("Solo".to_string(), "Pop".to_string())]),
        ..Default::default()
    };
    let observer = RecordingObserver::new();

    let result = reconcile_genres(&recent, Some(&FailingLookup), Some(&classifier), &observer)
        .await
        .unwrap();

    assert_eq!(shares(&result), vec![("Pop", 100)]);
    assert!(
        observer
            .warnings()
            .iter()
            .any(|w| w.contains("service unavailable"))
    );
}

#[tokio::test]
async fn test_reconcile_classifier_failure_keeps_tagged_counts() {
    let recent = vec![play("a", "Tagged", "1"), play("b", "Untagged", "2")];
    let lookup = StaticLookup {
        tags: HashMap::from([("1".to_string(), vec!["metal".to_string()])]),
    };
    let observer = RecordingObserver::new();

    let result = reconcile_genres(&recent, Some(&lookup), Some(&FailingClassifier), &observer)
        .await
        .unwrap();

    assert_eq!(shares(&result), vec![("Metal", 100)]);
    assert_eq!(observer.warnings().len(), 1);
}

#[tokio::test]
async fn test_reconcile_nothing_counted() {
    let recent = vec![play("a", "Untagged", "1")];
    let observer = RecordingObserver::new();

    let result = reconcile_genres(&recent, None, None, &observer).await;

    assert_eq!(result, None);
    assert!(!observer.warnings().is_empty());
}
