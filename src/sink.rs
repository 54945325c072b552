//! Dashboard output.
//!
//! A run hands everything it produced to a [`Sink`] as one [`DashboardReport`].
//! Sections that were not produced in this run are `None` and left untouched
//! by the sink, so the previous values stay visible on the dashboard.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use csv::Writer;

use crate::{
    Res,
    types::{
        FavoriteAnalysis, GenreShare, LibraryReport, SongSuggestion, TopSongsAnalysis, TrackEvent,
    },
};

/// Everything one run produced.
#[derive(Debug, Clone, Default)]
pub struct DashboardReport {
    pub updated_at: String,
    pub library: Option<LibraryReport>,
    pub validation: Option<String>,
    pub recently_played: Option<Vec<TrackEvent>>,
    pub suggestions: Option<Vec<SongSuggestion>>,
    pub genres: Option<Vec<GenreShare>>,
    pub weekly_favorite: Option<FavoriteAnalysis>,
    pub top_songs: Option<TopSongsAnalysis>,
}

#[async_trait]
pub trait Sink: Send + Sync {
    /// Writes the report and returns the names of the sections written.
    async fn write(&self, report: &DashboardReport) -> Res<Vec<String>>;
}

/// Writes one CSV file per section into a directory.
pub struct CsvSink {
    dir: PathBuf,
}

type Table = (Vec<&'static str>, Vec<Vec<String>>);

impl CsvSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn write_table(&self, name: &str, table: Table) -> Res<()> {
        let (header, rows) = table;
        let mut writer = Writer::from_writer(Vec::new());
        writer.write_record(&header)?;
        for row in &rows {
            writer.write_record(row)?;
        }
        let out = writer.into_inner().map_err(|e| e.into_error())?;
        async_fs::write(self.dir.join(format!("{}.csv", name)), out).await?;
        Ok(())
    }
}

#[async_trait]
impl Sink for CsvSink {
    async fn write(&self, report: &DashboardReport) -> Res<Vec<String>> {
        async_fs::create_dir_all(&self.dir).await?;

        let mut sections: Vec<(&str, Table)> = Vec::new();

        if let Some(library) = &report.library {
            sections.push(("summary", summary_table(library, report.validation.as_deref())));
            sections.push((
                "top_artists",
                (
                    vec!["Artist", "Tracks"],
                    library
                        .top_artists
                        .iter()
                        .map(|a| vec![a.artist.clone(), a.count.to_string()])
                        .collect(),
                ),
            ));
            sections.push((
                "monthly_additions",
                (
                    vec!["Month", "Tracks Added"],
                    library
                        .monthly_additions
                        .iter()
                        .map(|m| vec![m.month.clone(), m.count.to_string()])
                        .collect(),
                ),
            ));
            sections.push((
                "recent_tracks",
                (
                    vec!["Track", "Artist", "Added"],
                    library
                        .recent_tracks
                        .iter()
                        .map(|t| vec![t.name.clone(), t.artist.clone(), t.added.clone()])
                        .collect(),
                ),
            ));
        }

        if let Some(recent) = &report.recently_played {
            sections.push((
                "recently_played",
                (
                    vec!["Played At", "Track", "Artist", "Album"],
                    recent
                        .iter()
                        .map(|t| {
                            vec![
                                t.played_at().unwrap_or_default().to_string(),
                                t.name.clone(),
                                t.artist.clone(),
                                t.album.clone().unwrap_or_default(),
                            ]
                        })
                        .collect(),
                ),
            ));
        }

        if let Some(suggestions) = &report.suggestions {
            sections.push((
                "suggestions",
                (
                    vec!["Song", "Artist", "Reason"],
                    suggestions
                        .iter()
                        .map(|s| vec![s.song.clone(), s.artist.clone(), s.reason.clone()])
                        .collect(),
                ),
            ));
        }

        if let Some(genres) = &report.genres {
            sections.push((
                "genres",
                (
                    vec!["Genre", "Percentage"],
                    genres
                        .iter()
                        .map(|g| vec![g.genre.clone(), g.percentage.to_string()])
                        .collect(),
                ),
            ));
        }

        if let Some(favorite) = &report.weekly_favorite {
            sections.push(("weekly_favorite", favorite_table(favorite)));
        }

        if let Some(top) = &report.top_songs {
            sections.push((
                "top_songs",
                (
                    vec!["Track", "Artist", "Plays", "Why You Love It"],
                    top.song_analyses
                        .iter()
                        .map(|s| {
                            vec![
                                s.track.clone(),
                                s.artist.clone(),
                                s.play_count.to_string(),
                                s.why_you_love_it.clone(),
                            ]
                        })
                        .collect(),
                ),
            ));
            if let Some(playlist) = &top.playlist {
                let mut rows = vec![
                    vec!["Name".to_string(), playlist.name.clone()],
                    vec!["Description".to_string(), playlist.description.clone()],
                ];
                rows.extend(
                    playlist
                        .songs
                        .iter()
                        .map(|s| vec![s.track.clone(), s.artist.clone()]),
                );
                sections.push(("playlist", (vec!["Track", "Artist"], rows)));
            }
        }

        let mut written = Vec::with_capacity(sections.len() + 1);
        for (name, table) in sections {
            self.write_table(name, table).await?;
            written.push(name.to_string());
        }

        self.write_table(
            "last_updated",
            (vec!["Last Updated"], vec![vec![report.updated_at.clone()]]),
        )
        .await?;
        written.push("last_updated".to_string());

        Ok(written)
    }
}

fn summary_table(library: &LibraryReport, validation: Option<&str>) -> Table {
    let s = &library.summary;
    let mut rows = vec![
        vec!["Total Tracks".to_string(), s.total_tracks.to_string()],
        vec!["Total Hours".to_string(), s.total_duration_hours.to_string()],
        vec![
            "Avg Duration (min)".to_string(),
            s.avg_duration_minutes.to_string(),
        ],
        vec!["Unique Artists".to_string(), s.unique_artists.to_string()],
        vec!["Date Range".to_string(), s.date_range.to_string()],
    ];
    if let Some(validation) = validation {
        rows.push(vec!["Validation".to_string(), validation.to_string()]);
    }
    (vec!["Metric", "Value"], rows)
}

fn favorite_table(analysis: &FavoriteAnalysis) -> Table {
    let f = &analysis.favorite;
    let mut rows = vec![
        vec!["Track".to_string(), f.track.clone()],
        vec!["Artist".to_string(), f.artist.clone()],
        vec!["Plays".to_string(), f.play_count.to_string()],
        vec!["Source".to_string(), f.source_window.to_string()],
        vec!["Mood".to_string(), analysis.mood_analysis.clone()],
        vec!["Taste Profile".to_string(), analysis.taste_profile.clone()],
    ];
    for (i, r) in analysis.recommendations.iter().enumerate() {
        rows.push(vec![
            format!("Recommendation {}", i + 1),
            format!("{} - {}: {}", r.song, r.artist, r.reason),
        ]);
    }
    (vec!["Field", "Value"], rows)
}
