//! Turns raw, noisy notifications into authoritative classified events.
//!
//! The correlator owns the existence tracker and the debounce gate so that
//! every classification decision and the state mutations it implies happen in
//! one place, as one unit. Callers serialize access (the watch session wraps
//! one correlator in a mutex); processing never blocks and never fails.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use super::debounce::DebounceGate;
use super::events::{FileEvent, FileEventKind, RawKind, RawNotification};
use super::existence::ExistenceTracker;

pub struct EventCorrelator {
    existing: ExistenceTracker,
    debounce: DebounceGate,
}

impl EventCorrelator {
    pub fn new(debounce_window: Duration) -> Self {
        Self {
            existing: ExistenceTracker::new(),
            debounce: DebounceGate::new(debounce_window),
        }
    }

    /// Replaces the set of paths believed to exist. Used at startup with the
    /// persisted history's non-deleted paths, and again after any bulk change
    /// to durable state.
    pub fn seed<I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.existing.seed(paths);
    }

    /// True iff `path` is currently believed to exist.
    pub fn tracks(&self, path: &std::path::Path) -> bool {
        self.existing.contains(path)
    }

    pub fn tracked_count(&self) -> usize {
        self.existing.len()
    }

    pub fn debounce_window(&self) -> Duration {
        self.debounce.window()
    }

    /// Classifies one raw notification, producing at most one event.
    pub fn process(&mut self, raw: RawNotification) -> Option<FileEvent> {
        self.process_at(raw, Instant::now())
    }

    /// Like [`process`](Self::process) with an explicit instant for the
    /// debounce comparison.
    pub fn process_at(&mut self, raw: RawNotification, now: Instant) -> Option<FileEvent> {
        let RawNotification { path, kind } = raw;
        match kind {
            RawKind::Created => {
                if self.existing.contains(&path) {
                    // A Created for a path we already track is a rewrite
                    // (editors delete-and-recreate on save), so it takes the
                    // Changed path, debounce included.
                    self.accept_changed(path, now)
                } else {
                    self.existing.add(path.clone());
                    Some(FileEvent::new(path, FileEventKind::Created))
                }
            }
            RawKind::Changed => self.accept_changed(path, now),
            RawKind::Deleted => {
                // Deletes are never debounced; the gate entry is cleared so a
                // recreation starts with fresh debounce state.
                self.existing.remove(&path);
                self.debounce.clear(&path);
                Some(FileEvent::new(path, FileEventKind::Deleted))
            }
            RawKind::Renamed => {
                // The reported path is the canonical identity from here on.
                self.existing.add(path.clone());
                Some(FileEvent::new(path, FileEventKind::Renamed))
            }
        }
    }

    fn accept_changed(&mut self, path: PathBuf, now: Instant) -> Option<FileEvent> {
        if self.debounce.should_suppress(&path, now) {
            tracing::trace!(path = %path.display(), "suppressed Changed within debounce window");
            return None;
        }
        self.debounce.record(path.clone(), now);
        // A Changed proves the file exists; a watch that starts mid-lifetime
        // may never have seen the Created.
        self.existing.add(path.clone());
        Some(FileEvent::new(path, FileEventKind::Changed))
    }
}
