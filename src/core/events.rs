use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of a classified event, assigned by the correlator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileEventKind {
    Created,
    Changed,
    Deleted,
    Renamed,
}

impl FileEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileEventKind::Created => "Created",
            FileEventKind::Changed => "Changed",
            FileEventKind::Deleted => "Deleted",
            FileEventKind::Renamed => "Renamed",
        }
    }
}

impl fmt::Display for FileEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FileEventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "created" => Ok(FileEventKind::Created),
            "changed" => Ok(FileEventKind::Changed),
            "deleted" => Ok(FileEventKind::Deleted),
            "renamed" => Ok(FileEventKind::Renamed),
            other => Err(format!(
                "unknown event kind '{other}' (expected created, changed, deleted, or renamed)"
            )),
        }
    }
}

/// Event kind as reported by the OS notification backend, before correlation.
///
/// A raw kind is evidence, not a verdict: the correlator decides what each
/// notification actually means given per-path history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawKind {
    Created,
    Changed,
    Deleted,
    Renamed,
}

/// One unprocessed notification from the watch backend or the manual injector.
#[derive(Debug, Clone)]
pub struct RawNotification {
    pub path: PathBuf,
    pub kind: RawKind,
}

impl RawNotification {
    pub fn new(path: PathBuf, kind: RawKind) -> Self {
        Self { path, kind }
    }
}

/// A single classified file system event.
///
/// `path` is the identity key; `file_name` and `extension` are derived from
/// it at construction. `kind` is always assigned by the correlator, never
/// copied verbatim from a raw notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEvent {
    pub path: PathBuf,
    pub file_name: String,
    pub extension: String,
    pub kind: FileEventKind,
    pub timestamp: DateTime<Utc>,
}

impl FileEvent {
    pub fn new(path: PathBuf, kind: FileEventKind) -> Self {
        Self::at(path, kind, Utc::now())
    }

    pub fn at(path: PathBuf, kind: FileEventKind, timestamp: DateTime<Utc>) -> Self {
        let file_name = file_name_of(&path);
        let extension = extension_of(&path);
        Self {
            path,
            file_name,
            extension,
            kind,
            timestamp,
        }
    }
}

/// Events delivered to the sink channel by a watch session.
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// A classified file event.
    FileChanged(FileEvent),
    /// The underlying watch backend failed; the session is over but the
    /// correlator state survives for a restart.
    SourceFailed(String),
}

fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Extension without the leading dot, empty when the path has none.
fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_default()
}
