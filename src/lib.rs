pub mod cli;
pub mod config;
pub mod core;
pub mod export;
pub mod filter;
pub mod store;
pub mod watcher;

// Re-export main types
pub use crate::core::{
    AppEvent, DebounceGate, EventCorrelator, ExistenceTracker, FileEvent, FileEventKind, RawKind,
    RawNotification,
};
pub use crate::export::CsvExporter;
pub use crate::filter::ExtensionFilter;
pub use crate::store::{EventStore, QueryCriteria};
pub use crate::watcher::{DirectoryWatcher, ManualInjector, WatchError};
