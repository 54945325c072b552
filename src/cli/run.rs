use std::{path::PathBuf, sync::Arc, time::Duration};

use chrono::{Local, Timelike, Utc};
use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    config::Settings,
    error, info,
    management::PlayHistory,
    oracle::{GeminiClient, Oracle},
    pipeline::{self, RunPlan, Services},
    report::Observer,
    sink::{CsvSink, DashboardReport},
    source::SampleSource,
    spotify::SpotifyClient,
    success,
    types::{ArtistTableRow, GenreTableRow, SummaryTableRow},
    warning,
};

const SHOWN_ARTISTS: usize = 10;

#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub full: bool,
    pub sample: bool,
    pub no_ai: bool,
    pub output: Option<PathBuf>,
}

/// Shows progress on a spinner line and prints warnings above it.
struct SpinnerObserver {
    pb: ProgressBar,
}

impl SpinnerObserver {
    fn start() -> Self {
        let pb = ProgressBar::new_spinner();
        pb.enable_steady_tick(Duration::from_millis(100));
        if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
            pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }
        Self { pb }
    }

    fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl Observer for SpinnerObserver {
    fn info(&self, message: &str) {
        self.pb.set_message(message.to_string());
    }

    fn warn(&self, message: &str) {
        self.pb.suspend(|| warning!("{}", message));
    }
}

pub async fn run(settings: &Settings, options: RunOptions) {
    let full_refresh = options.full || settings.is_full_refresh_hour(Local::now().hour());
    let use_sample = options.sample || settings.use_sample_data;

    let mut history = match PlayHistory::load(&settings.history_file).await {
        Ok(history) => history,
        Err(e) => error!(
            "Cannot read playback history {}: {}",
            settings.history_file.display(),
            e
        ),
    };

    let oracle = select_oracle(settings, options.no_ai);
    let sink = CsvSink::new(
        options
            .output
            .clone()
            .unwrap_or_else(|| settings.output_dir.clone()),
    );
    let plan = RunPlan {
        now: Utc::now(),
        full_refresh,
        fetch_limit: settings.fetch_limit,
        retention_days: settings.history_retention_days,
    };

    if full_refresh {
        info!("Full refresh: library statistics and enrichment");
    } else {
        info!("Playback tracking only, next full refresh at hours {:?}", settings.full_refresh_hours);
    }

    let observer = SpinnerObserver::start();
    let result = if use_sample {
        info!("Using sample data from {}", settings.sample_data_file.display());
        let source = SampleSource::new(&settings.sample_data_file);
        let services = Services {
            source: &source,
            genres: None,
            details: None,
            oracle,
            sink: &sink,
            observer: &observer,
        };
        pipeline::execute(&services, &plan, &mut history).await
    } else {
        let client = match SpotifyClient::connect(settings).await {
            Ok(client) => client,
            Err(e) => {
                observer.finish();
                error!("Cannot connect to Spotify: {}. Run spotdash auth first.", e)
            }
        };
        let services = Services {
            source: &client,
            genres: Some(&client),
            details: Some(&client),
            oracle,
            sink: &sink,
            observer: &observer,
        };
        pipeline::execute(&services, &plan, &mut history).await
    };
    observer.finish();

    match result {
        Ok(report) => {
            print_report(&report);
            success!("Dashboard data written to {}", sink.dir().display());
        }
        Err(e) => error!("Run failed: {}", e),
    }
}

fn select_oracle(settings: &Settings, disabled: bool) -> Option<Arc<dyn Oracle>> {
    if disabled {
        return None;
    }

    match &settings.gemini_api_key {
        Some(key) => Some(Arc::new(GeminiClient::new(
            &settings.gemini_api_url,
            &settings.gemini_model,
            key,
        ))),
        None => {
            warning!("GEMINI_API_KEY not set, skipping AI enrichment");
            None
        }
    }
}

fn print_report(report: &DashboardReport) {
    if let Some(library) = &report.library {
        let s = &library.summary;
        let summary = vec![
            SummaryTableRow {
                metric: "Total tracks".to_string(),
                value: s.total_tracks.to_string(),
            },
            SummaryTableRow {
                metric: "Total hours".to_string(),
                value: s.total_duration_hours.to_string(),
            },
            SummaryTableRow {
                metric: "Avg duration (min)".to_string(),
                value: s.avg_duration_minutes.to_string(),
            },
            SummaryTableRow {
                metric: "Unique artists".to_string(),
                value: s.unique_artists.to_string(),
            },
            SummaryTableRow {
                metric: "Date range".to_string(),
                value: s.date_range.to_string(),
            },
        ];
        println!("{}", Table::new(summary));

        let artists: Vec<ArtistTableRow> = library
            .top_artists
            .iter()
            .take(SHOWN_ARTISTS)
            .map(|a| ArtistTableRow {
                artist: a.artist.clone(),
                tracks: a.count,
            })
            .collect();
        if !artists.is_empty() {
            println!("{}", Table::new(artists));
        }
    }

    if let Some(validation) = &report.validation {
        info!("Validation: {}", validation);
    }

    if let Some(genres) = &report.genres {
        let rows: Vec<GenreTableRow> = genres
            .iter()
            .map(|g| GenreTableRow {
                genre: g.genre.clone(),
                share: format!("{}%", g.percentage),
            })
            .collect();
        println!("{}", Table::new(rows));
    }

    if let Some(favorite) = &report.weekly_favorite {
        info!(
            "Weekly favorite: {} by {} ({} plays, {})",
            favorite.favorite.track,
            favorite.favorite.artist,
            favorite.favorite.play_count,
            favorite.favorite.source_window
        );
    }
}
