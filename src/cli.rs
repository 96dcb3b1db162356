use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};

use crate::core::FileEventKind;

#[derive(Parser)]
#[command(name = "watchlog")]
#[command(version)]
#[command(about = "Watch a directory and keep a deduplicated, persistent log of file events")]
#[command(
    long_about = "Watchlog monitors a single directory for file changes, collapses the noisy \
raw notifications into one classified event per logical change, and records the result in an \
embedded store you can query and export."
)]
pub struct Cli {
    /// Path to the event database (overrides the config file)
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Watch a directory and stream classified events
    Watch {
        /// Directory to watch (must exist)
        #[arg(value_name = "PATH")]
        path: PathBuf,

        /// Only watch files with this extension (empty means all)
        #[arg(short, long, default_value = "")]
        extension: String,

        /// Debounce window for Changed events, in milliseconds
        #[arg(long, value_name = "MS")]
        debounce_ms: Option<u64>,

        /// Output format for the event stream
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Do not persist events to the store
        #[arg(long)]
        no_store: bool,
    },

    /// Create an empty file and record its Created event
    Create {
        /// Directory to create the file in
        directory: PathBuf,

        /// File name for the new file
        name: String,

        /// Extension appended to the name when it is missing
        #[arg(short, long)]
        extension: Option<String>,
    },

    /// Query stored events with optional filters
    Query {
        /// Case-insensitive file name fragment
        #[arg(long)]
        name: Option<String>,

        /// Extension filter, with or without the leading dot
        #[arg(long)]
        extension: Option<String>,

        /// Event kind: created, changed, deleted, or renamed
        #[arg(long)]
        kind: Option<FileEventKind>,

        /// Directory the event paths must live under
        #[arg(long)]
        directory: Option<PathBuf>,

        /// Earliest date to include (YYYY-MM-DD, inclusive)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// Latest date to include (YYYY-MM-DD, inclusive)
        #[arg(long)]
        to: Option<NaiveDate>,

        /// Write matching rows to this CSV file instead of stdout
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },

    /// Export every stored event to a CSV file
    Export {
        /// Destination CSV path
        #[arg(value_name = "PATH")]
        out: PathBuf,
    },

    /// Delete every stored event
    Clear,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable line per event
    Text,
    /// JSON object per line for scripting
    Json,
    /// Single-letter kind plus path
    Compact,
}

impl Cli {
    pub fn setup_logging(&self) {
        let level = if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }
}
