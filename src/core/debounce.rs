//! Per-path suppression of rapid Changed bursts.
//!
//! Editors and copy tools fire several write notifications for one logical
//! save; the gate admits at most one Changed per path per window. Entries are
//! not expired on a timer (staleness is resolved by comparison at lookup),
//! but Deleted clears a path's entry so a later recreation starts fresh.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct DebounceGate {
    window: Duration,
    last_accepted: HashMap<PathBuf, Instant>,
}

impl DebounceGate {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_accepted: HashMap::new(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// True iff a Changed for `path` was accepted less than one window before
    /// `now`. Uses the monotonic clock, so wall-clock adjustments during a
    /// long session cannot reopen or extend the window.
    pub fn should_suppress(&self, path: &Path, now: Instant) -> bool {
        match self.last_accepted.get(path) {
            Some(&last) => now.saturating_duration_since(last) < self.window,
            None => false,
        }
    }

    pub fn record(&mut self, path: PathBuf, now: Instant) {
        self.last_accepted.insert(path, now);
    }

    pub fn clear(&mut self, path: &Path) {
        self.last_accepted.remove(path);
    }
}
