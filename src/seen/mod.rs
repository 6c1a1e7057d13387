//! Notification seen-state.
//!
//! Entries report when they scroll into view; the newest timestamp seen so
//! far is committed to the remote service after a quiet period, and the local
//! unread counter is adjusted once the service confirms.
//!
//! - [`SeenTracker`] owns the per-list state machine.
//! - [`UnreadCounter`] is the local copy of the remote badge count.
//! - [`sync`] runs service calls in the background and reports completions.
//! - [`viewport`] measures how much of an entry is on screen.

mod counter;
mod service;
pub mod sync;
mod timestamp;
mod tracker;
pub mod viewport;

pub use counter::UnreadCounter;
pub use service::{NotificationService, ServiceError};
pub use timestamp::{Timestamp, TimestampError};
pub use tracker::{
    CommitOutcome, CommitRequest, MarkAllRequest, SeenEntry, SeenState, SeenTracker, TrackerPhase,
    DEFAULT_DEBOUNCE,
};
pub use viewport::{ObserverOptions, DEFAULT_THRESHOLD};
