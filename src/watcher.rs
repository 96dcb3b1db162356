use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use notify::event::ModifyKind;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use parking_lot::Mutex;
use thiserror::Error;

use crate::core::{AppEvent, EventCorrelator, RawKind, RawNotification};
use crate::filter::ExtensionFilter;

/// Errors surfaced when starting or operating a watch session.
///
/// Configuration errors are reported synchronously before a session starts;
/// backend errors after startup arrive as [`AppEvent::SourceFailed`] on the
/// sink channel instead, so the correlator state stays usable for a restart.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("watch directory does not exist: {0}")]
    DirectoryNotFound(PathBuf),
    #[error("watch target is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("watch backend error: {0}")]
    Backend(#[from] notify::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// A watch session over one directory.
///
/// Raw notifications flow through a channel into a dedicated intake thread,
/// which serializes correlator access and forwards classified events to the
/// sink channel. Emission is enqueue-and-continue: a slow consumer can never
/// stall intake or stretch the debounce window.
pub struct DirectoryWatcher {
    watcher: Option<RecommendedWatcher>,
    correlator: Arc<Mutex<EventCorrelator>>,
    event_tx: Sender<AppEvent>,
    event_rx: Receiver<AppEvent>,
    directory: PathBuf,
}

impl DirectoryWatcher {
    /// Starts watching `directory` (non-recursive). The correlator is shared
    /// so its existence and debounce state can outlive the session: stopping
    /// and starting again resumes from known state rather than regressing.
    pub fn start(
        directory: PathBuf,
        filter: ExtensionFilter,
        correlator: Arc<Mutex<EventCorrelator>>,
    ) -> Result<Self, WatchError> {
        if !directory.exists() {
            return Err(WatchError::DirectoryNotFound(directory));
        }
        if !directory.is_dir() {
            return Err(WatchError::NotADirectory(directory));
        }

        let (raw_tx, raw_rx) = mpsc::channel::<notify::Result<Event>>();
        let (event_tx, event_rx) = mpsc::channel::<AppEvent>();

        let mut watcher = notify::recommended_watcher(raw_tx)?;
        watcher.watch(&directory, RecursiveMode::NonRecursive)?;

        let intake_correlator = Arc::clone(&correlator);
        let intake_tx = event_tx.clone();
        thread::spawn(move || intake_loop(raw_rx, filter, intake_correlator, intake_tx));

        tracing::info!(directory = %directory.display(), "watch session started");

        Ok(Self {
            watcher: Some(watcher),
            correlator,
            event_tx,
            event_rx,
            directory,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// An injector bound to this session's correlator and sink.
    pub fn injector(&self) -> ManualInjector {
        ManualInjector::new(Arc::clone(&self.correlator), self.event_tx.clone())
    }

    /// Disposes the OS watcher and stops notification intake. Correlator
    /// state is intentionally left intact; a later session on the same
    /// directory reuses it.
    pub fn stop(&mut self) {
        if self.watcher.take().is_some() {
            tracing::info!(directory = %self.directory.display(), "watch session stopped");
        }
    }

    pub fn try_recv(&self) -> Result<AppEvent, mpsc::TryRecvError> {
        self.event_rx.try_recv()
    }

    pub fn recv(&self) -> Result<AppEvent, mpsc::RecvError> {
        self.event_rx.recv()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Result<AppEvent, mpsc::RecvTimeoutError> {
        self.event_rx.recv_timeout(timeout)
    }
}

/// Routes operator-initiated file creations through the same correlator and
/// sink as externally observed notifications, so a later raw Created for the
/// same path is reclassified consistently.
#[derive(Clone)]
pub struct ManualInjector {
    correlator: Arc<Mutex<EventCorrelator>>,
    sink: Sender<AppEvent>,
}

impl ManualInjector {
    pub fn new(correlator: Arc<Mutex<EventCorrelator>>, sink: Sender<AppEvent>) -> Self {
        Self { correlator, sink }
    }

    /// Creates an empty file (truncating any previous content, like the
    /// manual-creation command it backs) and injects its Created
    /// notification.
    pub fn create_file(&self, directory: &Path, file_name: &str) -> Result<PathBuf, WatchError> {
        if !directory.exists() {
            fs::create_dir_all(directory)?;
        }
        let path = directory.join(file_name);
        fs::File::create(&path)?;
        self.inject_created(path.clone());
        Ok(path)
    }

    /// Feeds a synthesized Created for `path` to the correlator exactly as an
    /// external notification would be.
    pub fn inject_created(&self, path: PathBuf) {
        let mut correlator = self.correlator.lock();
        if let Some(event) = correlator.process(RawNotification::new(path, RawKind::Created)) {
            let _ = self.sink.send(AppEvent::FileChanged(event));
        }
    }
}

fn intake_loop(
    raw_rx: Receiver<notify::Result<Event>>,
    filter: ExtensionFilter,
    correlator: Arc<Mutex<EventCorrelator>>,
    tx: Sender<AppEvent>,
) {
    while let Ok(result) = raw_rx.recv() {
        match result {
            Ok(event) => {
                let Some(kind) = raw_kind_for(&event.kind) else {
                    continue;
                };
                for path in event.paths {
                    if !filter.matches(&path) {
                        continue;
                    }
                    // Lock held across classification and emission so one
                    // notification is processed as a single unit.
                    let mut correlator = correlator.lock();
                    if let Some(classified) =
                        correlator.process(RawNotification::new(path, kind))
                    {
                        if tx.send(AppEvent::FileChanged(classified)).is_err() {
                            return; // Receiver dropped, exit thread
                        }
                    }
                }
            }
            Err(err) => {
                tracing::error!("watch backend failure: {err}");
                let _ = tx.send(AppEvent::SourceFailed(err.to_string()));
            }
        }
    }
}

/// Maps the backend's event taxonomy onto raw kinds. Access events report
/// reads, not mutations, and are dropped here; anything unrecognized falls
/// back to Changed and takes the debounce path.
fn raw_kind_for(kind: &EventKind) -> Option<RawKind> {
    match kind {
        EventKind::Create(_) => Some(RawKind::Created),
        EventKind::Modify(ModifyKind::Name(_)) => Some(RawKind::Renamed),
        EventKind::Modify(_) => Some(RawKind::Changed),
        EventKind::Remove(_) => Some(RawKind::Deleted),
        EventKind::Access(_) => None,
        EventKind::Any | EventKind::Other => Some(RawKind::Changed),
    }
}
