mod commands;
mod history;
mod tui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use kpss_core::{FileStore, KpssConfig, StudyTracker, TimeRange};

#[derive(Parser)]
#[command(name = "kpss")]
#[command(about = "Track KPSS study sessions and goals", long_about = None)]
struct Cli {
    /// Directory holding the JSON data files (default: ~/.kpss)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log a study session (usage: add mat Olasılık q:40 min:1h date:yesterday note:deneme)
    Add {
        /// Lesson id or prefix
        lesson: String,
        /// Topic words and key:value metadata (questions, minutes, date, note)
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<String>,
    },
    /// Delete a study session by id (or unique id prefix)
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Show totals and goal progress for a time range
    Dashboard {
        #[arg(short, long)]
        range: Option<TimeRange>,
    },
    /// List every session, newest first
    History,
    /// Per-day summaries
    Days {
        #[arg(short, long)]
        range: Option<TimeRange>,
    },
    /// Per-lesson and per-topic totals
    Lessons {
        /// Only show this lesson (id or prefix)
        #[arg(short, long)]
        lesson: Option<String>,
    },
    /// Manage the topics of a lesson
    Topic {
        #[command(subcommand)]
        action: commands::TopicAction,
    },
    /// Show or change question goals
    Goal {
        #[command(subcommand)]
        action: Option<commands::GoalAction>,
    },
    /// Open the terminal dashboard
    Tui,
}

fn main() {
    if let Err(error) = run() {
        eprintln!("kpss error: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let config = KpssConfig::load().context("failed to load configuration")?;
    let data_dir = cli.data_dir.or_else(|| config.data_dir.clone());
    let store = FileStore::new(data_dir).context("failed to open data directory")?;
    tracing::debug!(dir = %store.base_dir().display(), "using data directory");

    let mut tracker = StudyTracker::load(store).context("failed to load study data")?;

    match cli.command {
        Some(Commands::Add { lesson, args }) => {
            commands::add(&mut tracker, &config, &lesson, &args)?;
        }
        Some(Commands::Delete { id, yes }) => {
            commands::delete(&mut tracker, &id, yes)?;
        }
        Some(Commands::Dashboard { range }) => {
            history::show_dashboard(&tracker, range.unwrap_or(config.default_range));
        }
        Some(Commands::History) => {
            history::show_history(&tracker);
        }
        Some(Commands::Days { range }) => {
            history::show_days(&tracker, range);
        }
        Some(Commands::Lessons { lesson }) => {
            history::show_lessons(&tracker, lesson.as_deref())?;
        }
        Some(Commands::Topic { action }) => {
            commands::topic(&mut tracker, action)?;
        }
        Some(Commands::Goal { action }) => {
            commands::goal(&mut tracker, action)?;
        }
        Some(Commands::Tui) | None => {
            tui::run(tracker, &config)?;
        }
    }
    Ok(())
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("KPSS_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
