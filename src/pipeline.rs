//! One watchdog run, start to finish.
//!
//! The pipeline only sees capabilities: an [`EventSource`], optional genre
//! and track detail lookups, an optional [`Oracle`] and a [`Sink`]. The command
//! layer decides which concrete adapters to plug in.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::{
    Res,
    management::{PlayHistory, WINDOW_DAYS},
    oracle::{
        Oracle, OracleClassifier,
        enrichment::{self, FAVORITE_CONTEXT, TOP_SONGS},
    },
    report::Observer,
    sink::{DashboardReport, Sink},
    source::{self, EventSource, RECENT_LIMIT},
    stats::{self, GenreClassifier, GenreLookup},
    types::{FavoriteAnalysis, FavoriteResolution, TrackDetails},
};

/// Extra facts about a single track, used to ground the favorite analysis.
#[async_trait]
pub trait TrackDetailsLookup: Send + Sync {
    async fn track_details(&self, track_id: &str) -> Res<Option<TrackDetails>>;
}

/// What this run should do.
#[derive(Debug, Clone)]
pub struct RunPlan {
    pub now: DateTime<Utc>,
    /// Refresh the library statistics and the enrichments, not only the playback log.
    pub full_refresh: bool,
    pub fetch_limit: usize,
    pub retention_days: i64,
}

/// The adapters a run works with.
pub struct Services<'a> {
    pub source: &'a dyn EventSource,
    pub genres: Option<&'a dyn GenreLookup>,
    pub details: Option<&'a dyn TrackDetailsLookup>,
    pub oracle: Option<Arc<dyn Oracle>>,
    pub sink: &'a dyn Sink,
    pub observer: &'a dyn Observer,
}

/// Runs the job and returns what was handed to the sink.
///
/// Failing to read the recent plays or the saved tracks, or failing to write
/// the sink, aborts the run. Everything else degrades to missing sections.
pub async fn execute(
    services: &Services<'_>,
    plan: &RunPlan,
    history: &mut PlayHistory,
) -> Res<DashboardReport> {
    let observer = services.observer;

    observer.info("Fetching recently played tracks...");
    let recent = source::collect_recent(services.source, RECENT_LIMIT).await?;

    let added = history.record(&recent);
    let pruned = history.prune(plan.now, plan.retention_days);
    observer.info(&format!(
        "Playback history: {} new, {} expired, {} kept",
        added,
        pruned,
        history.len()
    ));
    if let Err(e) = history.persist().await {
        observer.warn(&format!("Playback history not saved: {}", e));
    }

    let mut report = DashboardReport {
        updated_at: plan.now.format("%Y-%m-%d %H:%M:%S").to_string(),
        recently_played: (!recent.is_empty()).then(|| recent.clone()),
        ..Default::default()
    };

    if plan.full_refresh {
        observer.info("Full refresh: fetching saved tracks...");
        let events = source::collect_events(services.source, plan.fetch_limit, observer).await?;
        observer.info(&format!("Processing {} tracks locally...", events.len()));
        let library = stats::aggregate(&events);

        let classifier = services
            .oracle
            .as_ref()
            .map(|o| OracleClassifier::new(Arc::clone(o)));

        if let Some(oracle) = services.oracle.as_deref() {
            report.validation = enrichment::validate_summary(oracle, &library, observer).await;
            report.suggestions = enrichment::suggest_songs(oracle, &recent, observer).await;
        }
        report.library = Some(library);

        report.genres = stats::reconcile_genres(
            &recent,
            services.genres,
            classifier.as_ref().map(|c| c as &dyn GenreClassifier),
            observer,
        )
        .await;

        let window = history.window(plan.now, WINDOW_DAYS);
        if let Some(favorite) = stats::resolve_favorite(&recent, Some(window.as_slice()), observer) {
            let details = fetch_details(services, &favorite).await;
            report.weekly_favorite = match services.oracle.as_deref() {
                Some(oracle) => {
                    let context = stats::top_played(&recent, Some(window.as_slice()), FAVORITE_CONTEXT);
                    enrichment::analyze_weekly_favorite(
                        oracle, favorite, details, &context, observer,
                    )
                    .await
                }
                None => Some(FavoriteAnalysis {
                    favorite,
                    mood_analysis: String::new(),
                    taste_profile: String::new(),
                    recommendations: Vec::new(),
                    track_details: details,
                }),
            };
        }

        // Top songs speak for the whole window, so they need a playback history.
        match services.oracle.as_deref() {
            Some(oracle) if !window.is_empty() => {
                let top = stats::top_played(&[], Some(window.as_slice()), TOP_SONGS);
                report.top_songs = enrichment::analyze_top_songs(oracle, &top, observer).await;
            }
            _ => {}
        }
    }

    let written = services.sink.write(&report).await?;
    observer.info(&format!("Wrote {} dashboard sections", written.len()));

    Ok(report)
}

async fn fetch_details(services: &Services<'_>, favorite: &FavoriteResolution) -> Option<TrackDetails> {
    let lookup = services.details?;
    if favorite.id.is_empty() {
        return None;
    }

    match lookup.track_details(&favorite.id).await {
        Ok(details) => details,
        Err(e) => {
            services
                .observer
                .warn(&format!("Track details for '{}' unavailable: {}", favorite.track, e));
            None
        }
    }
}
