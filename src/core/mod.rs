//! Event correlation core
//!
//! Consumes raw, possibly-duplicated notifications and produces one
//! authoritative classified event per logical change.

pub mod correlator;
pub mod debounce;
pub mod events;
pub mod existence;

// Re-export main types
pub use correlator::EventCorrelator;
pub use debounce::DebounceGate;
pub use events::{AppEvent, FileEvent, FileEventKind, RawKind, RawNotification};
pub use existence::ExistenceTracker;
