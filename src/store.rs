//! Persistent event history, keyed by path.
//!
//! An embedded sled tree holds the most recent classified event per path;
//! recording a newer event for the same path replaces the older one. The
//! non-deleted keys are the seed set for the existence tracker at startup.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use crate::core::{FileEvent, FileEventKind};

pub struct EventStore {
    db: sled::Db,
}

impl EventStore {
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path)
            .with_context(|| format!("failed to open event store at {}", path.display()))?;
        Ok(Self { db })
    }

    /// Inserts or replaces the record for the event's path.
    pub fn record(&self, event: &FileEvent) -> Result<()> {
        let value = serde_json::to_vec(event).context("failed to encode event")?;
        self.db.insert(key_for(&event.path), value)?;
        self.db.flush()?;
        Ok(())
    }

    /// All current records, ordered by file name.
    pub fn query_all(&self) -> Result<Vec<FileEvent>> {
        let mut events = Vec::new();
        for item in self.db.iter() {
            let (_, value) = item?;
            let event: FileEvent =
                serde_json::from_slice(&value).context("corrupt event record")?;
            events.push(event);
        }
        events.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(events)
    }

    /// Paths whose most recent recorded kind is not Deleted: the set of files
    /// the application believes still exist.
    pub fn existing_paths(&self) -> Result<Vec<PathBuf>> {
        Ok(self
            .query_all()?
            .into_iter()
            .filter(|event| event.kind != FileEventKind::Deleted)
            .map(|event| event.path)
            .collect())
    }

    pub fn query(&self, criteria: &QueryCriteria) -> Result<Vec<FileEvent>> {
        Ok(self
            .query_all()?
            .into_iter()
            .filter(|event| criteria.matches(event))
            .collect())
    }

    /// Deletes every record.
    pub fn clear_all(&self) -> Result<()> {
        self.db.clear()?;
        self.db.flush()?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.db.len()
    }

    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

fn key_for(path: &Path) -> Vec<u8> {
    path.to_string_lossy().into_owned().into_bytes()
}

/// Filters for querying stored events. Every field is optional; an empty
/// criteria matches everything.
#[derive(Debug, Clone, Default)]
pub struct QueryCriteria {
    /// Case-insensitive file name fragment.
    pub file_name: Option<String>,
    /// Extension, with or without the leading dot.
    pub extension: Option<String>,
    pub kind: Option<FileEventKind>,
    /// Directory prefix the event path must live under.
    pub directory: Option<PathBuf>,
    /// Inclusive lower timestamp bound.
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper timestamp bound.
    pub until: Option<DateTime<Utc>>,
}

impl QueryCriteria {
    pub fn matches(&self, event: &FileEvent) -> bool {
        if let Some(fragment) = &self.file_name {
            let haystack = event.file_name.to_ascii_lowercase();
            if !haystack.contains(&fragment.to_ascii_lowercase()) {
                return false;
            }
        }
        if let Some(extension) = &self.extension {
            let wanted = extension.trim_start_matches('.');
            if !event.extension.eq_ignore_ascii_case(wanted) {
                return false;
            }
        }
        if let Some(kind) = self.kind {
            if event.kind != kind {
                return false;
            }
        }
        if let Some(directory) = &self.directory {
            if !event.path.starts_with(directory) {
                return false;
            }
        }
        if let Some(from) = self.from {
            if event.timestamp < from {
                return false;
            }
        }
        if let Some(until) = self.until {
            if event.timestamp >= until {
                return false;
            }
        }
        true
    }
}
