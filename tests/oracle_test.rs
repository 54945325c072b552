use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use spotdash::oracle::enrichment::{
    analyze_top_songs, analyze_weekly_favorite, suggest_songs, validate_summary,
};
use spotdash::oracle::{CompletionOptions, GeminiClient, Oracle, OracleClassifier, OracleError};
use spotdash::report::{RecordingObserver, SilentObserver};
use spotdash::stats::{ArtistSample, GenreClassifier, aggregate};
use spotdash::types::{
    FavoriteResolution, Moment, PlayCount, SourceWindow, TrackDetails, TrackEvent,
};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Answers every prompt with the same text and remembers the prompts.
struct ScriptedOracle {
    answer: Result<String, String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    fn answering(answer: &str) -> Self {
        Self {
            answer: Ok(answer.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            answer: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        prompt: &str,
        _options: &CompletionOptions,
    ) -> Result<String, OracleError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.answer.clone().map_err(OracleError::Connection)
    }
}

fn play(name: &str, artist: &str) -> TrackEvent {
    TrackEvent {
        name: name.to_string(),
        artist: artist.to_string(),
        album: None,
        duration_ms: 200_000,
        moment: Some(Moment::Played("2025-01-16T08:00:00Z".to_string())),
        id: String::new(),
    }
}

fn favorite() -> FavoriteResolution {
    FavoriteResolution {
        track: "Nights".to_string(),
        artist: "Frank Ocean".to_string(),
        id: "id-nights".to_string(),
        play_count: 4,
        source_window: SourceWindow::HistoryLog,
    }
}

fn gemini_answer(text: &str) -> serde_json::Value {
    json!({"candidates": [{"content": {"parts": [{"text": text}]}}]})
}

#[tokio::test]
async fn test_gemini_complete_json() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/models/gemini-test:generateContent"))
        .and(query_param("key", "secret"))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": "Say hi"}]}],
            "generationConfig": {"responseMimeType": "application/json"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_answer("  {\"hi\": true}\n")))
        .expect(1)
        .mount(&server)
        .await;

    let gemini = GeminiClient::new(server.uri(), "gemini-test", "secret");
    let answer = gemini
        .complete("Say hi", &CompletionOptions::json(Duration::from_secs(5)))
        .await
        .unwrap();

    assert_eq!(answer, "{\"hi\": true}");
}

#[tokio::test]
async fn test_gemini_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("backend down"))
        .mount(&server)
        .await;

    let gemini = GeminiClient::new(server.uri(), "gemini-test", "secret");
    let result = gemini
        .complete("x", &CompletionOptions::text(Duration::from_secs(5)))
        .await;

    match result {
        Err(OracleError::Api { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "backend down");
        }
        other => panic!("expected API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gemini_without_candidates() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"candidates": []})))
        .mount(&server)
        .await;

    let gemini = GeminiClient::new(server.uri(), "gemini-test", "secret");
    let result = gemini
        .complete("x", &CompletionOptions::text(Duration::from_secs(5)))
        .await;

    assert!(matches!(result, Err(OracleError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_gemini_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(gemini_answer("OK"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let gemini = GeminiClient::new(server.uri(), "gemini-test", "secret");
    let result = gemini
        .complete("x", &CompletionOptions::text(Duration::from_millis(50)))
        .await;

    assert!(matches!(result, Err(OracleError::Timeout)));
}

#[tokio::test]
async fn test_validate_summary() {
    let oracle = ScriptedOracle::answering(" OK \n");
    let report = aggregate(&[]);

    let answer = validate_summary(&oracle, &report, &SilentObserver).await;

    assert_eq!(answer.as_deref(), Some("OK"));
    assert!(oracle.prompts()[0].contains("Total tracks: 0"));
}

#[tokio::test]
async fn test_validate_summary_failure_is_skipped() {
    let oracle = ScriptedOracle::failing("connection refused");
    let observer = RecordingObserver::new();

    let answer = validate_summary(&oracle, &aggregate(&[]), &observer).await;

    assert_eq!(answer, None);
    assert_eq!(
        observer.warnings()[0],
        "Validation skipped: scripted: Connection error: connection refused"
    );
}

#[tokio::test]
async fn test_suggest_songs_limits_context_and_answers() {
    let fenced = "```json\n[\
        {\"song\": \"S1\", \"artist\": \"A\", \"reason\": \"r\"},\
        {\"song\": \"S2\", \"artist\": \"A\", \"reason\": \"r\"},\
        {\"song\": \"S3\", \"artist\": \"A\", \"reason\": \"r\"},\
        {\"song\": \"S4\", \"artist\": \"A\", \"reason\": \"r\"},\
        {\"song\": \"S5\", \"artist\": \"A\", \"reason\": \"r\"},\
        {\"song\": \"S6\", \"artist\": \"A\"}\
    ]\n```";
    let oracle = ScriptedOracle::answering(fenced);
    let recent: Vec<TrackEvent> = (0..25).map(|i| play(&format!("Song {}", i), "X")).collect();

    let suggestions = suggest_songs(&oracle, &recent, &SilentObserver)
        .await
        .unwrap();

    assert_eq!(suggestions.len(), 5);
    assert_eq!(suggestions[0].song, "S1");
    let prompt = &oracle.prompts()[0];
    assert!(prompt.contains("Song 19 by X"));
    assert!(!prompt.contains("Song 20 by X"));
}

#[tokio::test]
async fn test_suggest_songs_without_plays() {
    let oracle = ScriptedOracle::answering("[]");

    assert_eq!(suggest_songs(&oracle, &[], &SilentObserver).await, None);
    assert!(oracle.prompts().is_empty());
}

#[tokio::test]
async fn test_invalid_json_degrades_to_none() {
    let oracle = ScriptedOracle::answering("I think you would like jazz.");
    let observer = RecordingObserver::new();

    let result = suggest_songs(&oracle, &[play("A", "B")], &observer).await;

    assert_eq!(result, None);
    assert_eq!(observer.warnings().len(), 1);
    assert!(observer.warnings()[0].contains("scripted returned unusable JSON"));
}

#[tokio::test]
async fn test_weekly_favorite_analysis() {
    let answer = json!({
        "mood_analysis": "Hazy and introspective.",
        "taste_profile": "Drawn to atmospheric R&B.",
        "recommendations": [
            {"song": "Self Control", "artist": "Frank Ocean", "reason": "Like Nights"},
            {"song": "Pink + White", "artist": "Frank Ocean", "reason": "Like Nights"},
            {"song": "Redbone", "artist": "Childish Gambino", "reason": "Like Nights"},
            {"song": "Extra", "artist": "Someone", "reason": "Like Nights"}
        ]
    });
    let oracle = ScriptedOracle::answering(&answer.to_string());
    let details = TrackDetails {
        popularity: 80,
        duration_ms: 307_000,
        explicit: true,
        album_name: "Blonde".to_string(),
        release_date: "2016-08-20".to_string(),
        artist_genres: Vec::new(),
        artist_popularity: 85,
    };
    let context = vec![PlayCount {
        track: "Nights".to_string(),
        artist: "Frank Ocean".to_string(),
        count: 4,
    }];

    let analysis = analyze_weekly_favorite(
        &oracle,
        favorite(),
        Some(details.clone()),
        &context,
        &SilentObserver,
    )
    .await
    .unwrap();

    assert_eq!(analysis.favorite, favorite());
    assert_eq!(analysis.mood_analysis, "Hazy and introspective.");
    assert_eq!(analysis.recommendations.len(), 3);
    assert_eq!(analysis.track_details, Some(details));

    let prompt = &oracle.prompts()[0];
    assert!(prompt.contains("\"Nights\" by Frank Ocean (played 4 times)"));
    assert!(prompt.contains("not categorized (indie artist)"));
    assert!(prompt.contains("Album: Blonde"));
}

#[tokio::test]
async fn test_top_songs_analysis_attaches_play_counts() {
    let answer = json!({
        "song_analyses": [
            {"track": "A", "artist": "X", "why_you_love_it": "Catchy."},
            {"track": "B", "artist": "Y", "why_you_love_it": "Moody."}
        ],
        "playlist": {
            "name": "Late Nights",
            "description": "Slow and warm.",
            "songs": [{"track": "C", "artist": "Z"}]
        }
    });
    let oracle = ScriptedOracle::answering(&answer.to_string());
    let top = vec![
        PlayCount {
            track: "A".to_string(),
            artist: "X".to_string(),
            count: 7,
        },
        PlayCount {
            track: "B".to_string(),
            artist: "Y".to_string(),
            count: 5,
        },
    ];

    let analysis = analyze_top_songs(&oracle, &top, &SilentObserver)
        .await
        .unwrap();

    assert_eq!(analysis.song_analyses[0].play_count, 7);
    assert_eq!(analysis.song_analyses[1].play_count, 5);
    assert_eq!(analysis.playlist.unwrap().name, "Late Nights");
}

#[tokio::test]
async fn test_top_songs_without_plays() {
    let oracle = ScriptedOracle::answering("{}");

    assert_eq!(analyze_top_songs(&oracle, &[], &SilentObserver).await, None);
}

#[tokio::test]
async fn test_oracle_classifier() {
    let oracle = Arc::new(ScriptedOracle::answering(
        "```\n{\"Unknown Band\": \"Indie\", \"Weird\": 3}\n```",
    ));
    let classifier = OracleClassifier::new(oracle.clone());

    let labels = classifier
        .classify(&[ArtistSample {
            artist: "Unknown Band".to_string(),
            titles: vec!["First".to_string(), "Second".to_string()],
        }])
        .await
        .unwrap();

    assert_eq!(labels.len(), 1);
    assert_eq!(labels["Unknown Band"], "Indie");
    assert!(oracle.prompts()[0].contains("- Unknown Band (songs: First, Second)"));
}

#[tokio::test]
async fn test_oracle_classifier_propagates_failure() {
    let classifier = OracleClassifier::new(Arc::new(ScriptedOracle::failing("quota")));

    let result = classifier.classify(&[]).await;

    assert!(result.is_err());
}
