use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use clap::Parser;
use parking_lot::Mutex;

use watchlog::cli::{Cli, Command, OutputFormat};
use watchlog::config::WatchlogConfig;
use watchlog::core::{AppEvent, EventCorrelator, FileEvent, FileEventKind};
use watchlog::export::CsvExporter;
use watchlog::filter::ExtensionFilter;
use watchlog::store::{EventStore, QueryCriteria};
use watchlog::watcher::{DirectoryWatcher, ManualInjector};

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.setup_logging();

    let config = WatchlogConfig::load_or_default().overlay_env();
    if let Err(err) = config.validate() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }

    let db_path = cli.db.clone().unwrap_or_else(|| config.store.db_path.clone());

    match cli.command {
        Command::Watch {
            path,
            extension,
            debounce_ms,
            output,
            no_color,
            no_store,
        } => run_watch(
            &config, &db_path, path, extension, debounce_ms, output, no_color, no_store,
        ),
        Command::Create {
            directory,
            name,
            extension,
        } => run_create(&config, &db_path, directory, name, extension),
        Command::Query {
            name,
            extension,
            kind,
            directory,
            from,
            to,
            csv,
        } => run_query(&db_path, name, extension, kind, directory, from, to, csv),
        Command::Export { out } => run_export(&db_path, out),
        Command::Clear => run_clear(&db_path),
    }
}

#[allow(clippy::too_many_arguments)]
fn run_watch(
    config: &WatchlogConfig,
    db_path: &Path,
    path: PathBuf,
    extension: String,
    debounce_ms: Option<u64>,
    output: OutputFormat,
    no_color: bool,
    no_store: bool,
) -> Result<()> {
    let window = Duration::from_millis(debounce_ms.unwrap_or(config.watcher.debounce_ms));
    let extension = if extension.is_empty() {
        config.watcher.extension.clone()
    } else {
        extension
    };

    let store = if no_store {
        None
    } else {
        Some(EventStore::open(db_path)?)
    };

    let correlator = Arc::new(Mutex::new(EventCorrelator::new(window)));
    if let Some(store) = &store {
        let known = store.existing_paths()?;
        tracing::debug!("seeded {} known path(s) from history", known.len());
        correlator.lock().seed(known);
    }

    let session = DirectoryWatcher::start(
        path.clone(),
        ExtensionFilter::new(&extension),
        Arc::clone(&correlator),
    )
    .context("failed to start watch session")?;

    if matches!(output, OutputFormat::Text) {
        println!("Watching: {}", path.display());
        println!("Press Ctrl+C to quit");
        println!("---");
    }

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    while running.load(Ordering::SeqCst) {
        match session.recv_timeout(Duration::from_millis(100)) {
            Ok(AppEvent::FileChanged(event)) => {
                if let Some(store) = &store {
                    store.record(&event)?;
                }
                print_event(&event, output, no_color)?;
            }
            Ok(AppEvent::SourceFailed(reason)) => {
                tracing::error!("watch session terminated: {reason}");
                break;
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}

fn run_create(
    config: &WatchlogConfig,
    db_path: &Path,
    directory: PathBuf,
    name: String,
    extension: Option<String>,
) -> Result<()> {
    let file_name = with_extension(&name, extension.as_deref());

    let store = EventStore::open(db_path)?;
    let correlator = Arc::new(Mutex::new(EventCorrelator::new(
        config.watcher.debounce_duration(),
    )));
    correlator.lock().seed(store.existing_paths()?);

    let (tx, rx) = mpsc::channel();
    let injector = ManualInjector::new(correlator, tx);
    let path = injector
        .create_file(&directory, &file_name)
        .with_context(|| format!("failed to create {file_name}"))?;
    tracing::debug!(path = %path.display(), "manual file created");

    while let Ok(AppEvent::FileChanged(event)) = rx.try_recv() {
        store.record(&event)?;
        println!("{}: {}", event.kind, event.path.display());
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_query(
    db_path: &Path,
    name: Option<String>,
    extension: Option<String>,
    kind: Option<FileEventKind>,
    directory: Option<PathBuf>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    csv: Option<PathBuf>,
) -> Result<()> {
    let criteria = QueryCriteria {
        file_name: name,
        extension,
        kind,
        directory,
        from: from.map(start_of_day),
        until: to.and_then(|d| d.succ_opt()).map(start_of_day),
    };

    let store = EventStore::open(db_path)?;
    let results = store.query(&criteria)?;

    match csv {
        Some(out) => {
            CsvExporter::new().export(&results, &out)?;
            println!("Exported {} row(s) to {}", results.len(), out.display());
        }
        None => {
            for (i, event) in results.iter().enumerate() {
                println!(
                    "{:>4}  {:<7}  {}  {}",
                    i + 1,
                    event.kind,
                    event.timestamp.format("%Y-%m-%d %H:%M:%S"),
                    event.path.display()
                );
            }
            println!("Found {} row(s).", results.len());
        }
    }

    Ok(())
}

fn run_export(db_path: &Path, out: PathBuf) -> Result<()> {
    let store = EventStore::open(db_path)?;
    let events = store.query_all()?;
    CsvExporter::new().export(&events, &out)?;
    println!("Exported {} row(s) to {}", events.len(), out.display());
    Ok(())
}

fn run_clear(db_path: &Path) -> Result<()> {
    let store = EventStore::open(db_path)?;
    store.clear_all()?;
    println!("Event store cleared.");
    Ok(())
}

fn print_event(event: &FileEvent, output: OutputFormat, no_color: bool) -> Result<()> {
    match output {
        OutputFormat::Text => print_text_event(event, no_color),
        OutputFormat::Json => println!("{}", serde_json::to_string(event)?),
        OutputFormat::Compact => {
            let letter = match event.kind {
                FileEventKind::Created => "C",
                FileEventKind::Changed => "M",
                FileEventKind::Deleted => "D",
                FileEventKind::Renamed => "R",
            };
            println!("{} {}", letter, event.path.display());
        }
    }
    Ok(())
}

fn print_text_event(event: &FileEvent, no_color: bool) {
    let time = event
        .timestamp
        .with_timezone(&chrono::Local)
        .format("%H:%M:%S");
    let label = event.kind.as_str().to_uppercase();

    if no_color {
        println!("[{}] {} {}", time, label, event.path.display());
    } else {
        let color = match event.kind {
            FileEventKind::Created => "\x1b[32m", // Green
            FileEventKind::Changed => "\x1b[33m", // Yellow
            FileEventKind::Deleted => "\x1b[31m", // Red
            FileEventKind::Renamed => "\x1b[34m", // Blue
        };
        println!("[{}] {}{}\x1b[0m {}", time, color, label, event.path.display());
    }
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn with_extension(name: &str, extension: Option<&str>) -> String {
    let Some(ext) = extension else {
        return name.to_string();
    };
    let ext = ext.trim().trim_start_matches('.');
    if ext.is_empty() {
        return name.to_string();
    }
    let suffix = format!(".{ext}");
    if name.to_ascii_lowercase().ends_with(&suffix.to_ascii_lowercase()) {
        name.to_string()
    } else {
        format!("{name}{suffix}")
    }
}
