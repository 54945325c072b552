use std::{path::PathBuf, sync::Arc};

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use spotdash::{
    cli::{self, RunOptions},
    config::{self, Settings},
    error,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Update the dashboard data
    Run(RunArgs),

    /// Show the most played tracks from the playback history
    History(HistoryArgs),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Force a full refresh (library statistics and enrichment)
    #[clap(long)]
    full: bool,

    /// Read saved tracks from the sample data file instead of Spotify
    #[clap(long)]
    sample: bool,

    /// Skip all AI enrichment
    #[clap(long)]
    no_ai: bool,

    /// Directory for the CSV tables (defaults to OUTPUT_DIR)
    #[clap(long)]
    output: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct HistoryArgs {
    /// Number of days to look back
    #[clap(long, default_value_t = 7, value_parser = clap::value_parser!(i64).range(1..))]
    days: i64,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        error!("Cannot load environment. Err: {}", e);
    }

    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let settings = match Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("Invalid configuration: {}", e),
    };

    match cli.command {
        Command::Auth => cli::auth(Arc::new(settings)).await,
        Command::Run(args) => {
            cli::run(
                &settings,
                RunOptions {
                    full: args.full,
                    sample: args.sample,
                    no_ai: args.no_ai,
                    output: args.output,
                },
            )
            .await
        }
        Command::History(args) => cli::history(&settings, args.days).await,
        Command::Completions(_) => {}
    }
}
