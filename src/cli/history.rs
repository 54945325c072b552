use chrono::Utc;
use tabled::Table;

use crate::{
    config::Settings,
    error,
    management::PlayHistory,
    stats,
    types::PlayCountTableRow,
    warning,
};

const SHOWN: usize = 20;

pub async fn history(settings: &Settings, days: i64) {
    let history = match PlayHistory::load(&settings.history_file).await {
        Ok(history) => history,
        Err(e) => error!(
            "Cannot read playback history {}: {}",
            settings.history_file.display(),
            e
        ),
    };

    let window = history.window(Utc::now(), days);
    if window.is_empty() {
        warning!(
            "No plays logged in the last {} days. Run spotdash run to record playback.",
            days
        );
        return;
    }

    let rows: Vec<PlayCountTableRow> = stats::top_played(&[], Some(window.as_slice()), SHOWN)
        .into_iter()
        .map(|p| PlayCountTableRow {
            track: p.track,
            artist: p.artist,
            plays: p.count,
        })
        .collect();

    println!(
        "Plays in the last {days} days: {total}\n{table}",
        days = days,
        total = window.len(),
        table = Table::new(rows)
    );
}
