//! Seen-state tracking for a single list instance.
//!
//! The tracker is an explicit state machine driven by the host loop:
//!
//! ```text
//! Idle -> Observing -> CommitPending -> Committing -> Committed -> Observing ...
//!                                                   \-> (failure) Observing
//! any  -> Unmounted (teardown)
//! ```
//!
//! Entries that scroll into view raise `max_timestamp_in_view`; each raise
//! re-arms a trailing debounce deadline. When [`SeenTracker::poll`] finds the
//! deadline elapsed it emits one [`CommitRequest`]. The host runs the remote
//! call and reports back through [`SeenTracker::complete`], which applies the
//! read marks locally only on success.
//!
//! Only one commit is in flight at a time. Teardown and reset bump the
//! generation, so a completion for a destroyed list is ignored.
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use super::viewport::{ObserverOptions, VisibilityWatcher};
use super::{Timestamp, UnreadCounter};

/// Default quiet period after the last qualifying intersection.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(400);

// ============================================================================
// Types
// ============================================================================

/// A list entry the tracker can watch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeenEntry {
    pub id: Arc<str>,
    pub timestamp: Timestamp,
    /// Read flag as delivered by the server.
    pub read: bool,
}

/// Per-list seen bookkeeping.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeenState {
    /// Newest timestamp that has intersected the viewport. Only ever raised.
    pub max_timestamp_in_view: Timestamp,
    /// Newest timestamp confirmed by the service. Only ever raised.
    pub last_committed_timestamp: Timestamp,
    /// Read flags applied locally, ahead of the server.
    pub local_read_overrides: HashMap<Arc<str>, bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerPhase {
    /// Nothing observed yet.
    Idle,
    /// Watching entries, no commit scheduled.
    Observing,
    /// Debounce deadline armed.
    CommitPending,
    /// A service call is in flight.
    Committing,
    /// The last commit succeeded and nothing newer has been seen since.
    Committed,
    /// Torn down; ignores everything until reset.
    Unmounted,
}

/// A "mark seen up to" call the host should issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRequest {
    pub up_to: Timestamp,
    pub generation: u64,
}

/// A "mark all seen" call the host should issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkAllRequest {
    pub generation: u64,
}

/// Result of feeding a completion back into the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Read marks were applied; `newly_read` entries went from unread to read.
    Applied { newly_read: usize },
    /// The call failed. Nothing changed locally.
    Failed,
    /// The completion belongs to an older list or no call was in flight.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum InFlight {
    Commit(Timestamp),
    MarkAll,
}

#[derive(Debug, Clone)]
struct Watched {
    timestamp: Timestamp,
    server_read: bool,
}

// ============================================================================
// Tracker
// ============================================================================

#[derive(Debug)]
pub struct SeenTracker {
    phase: TrackerPhase,
    state: SeenState,
    watched: HashMap<Arc<str>, Watched>,
    watcher: VisibilityWatcher<Arc<str>>,
    debounce: Duration,
    deadline: Option<Instant>,
    in_flight: Option<InFlight>,
    /// Set after a failed call so an already-seen entry can re-arm the commit.
    retry_armed: bool,
    generation: u64,
}

impl Default for SeenTracker {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE, ObserverOptions::default())
    }
}

impl SeenTracker {
    pub fn new(debounce: Duration, options: ObserverOptions) -> Self {
        Self {
            phase: TrackerPhase::Idle,
            state: SeenState::default(),
            watched: HashMap::new(),
            watcher: VisibilityWatcher::new(options),
            debounce,
            deadline: None,
            in_flight: None,
            retry_armed: false,
            generation: 0,
        }
    }

    pub fn phase(&self) -> TrackerPhase {
        self.phase
    }

    pub fn state(&self) -> &SeenState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn observer_options(&self) -> ObserverOptions {
        self.watcher.options()
    }

    pub fn watched_count(&self) -> usize {
        self.watched.len()
    }

    /// Attach watchers to `entries`.
    ///
    /// Entries without a timestamp are skipped. Calling again with more
    /// entries (the next page) adds to the watched set without resetting
    /// anything. Returns the number of entries attached by this call.
    pub fn observe<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = SeenEntry>,
    {
        if self.phase == TrackerPhase::Unmounted {
            tracing::debug!("Ignoring observe on unmounted tracker");
            return 0;
        }

        let mut attached = 0;
        for entry in entries {
            if entry.timestamp.is_empty() {
                continue;
            }
            self.watched.insert(
                entry.id,
                Watched {
                    timestamp: entry.timestamp,
                    server_read: entry.read,
                },
            );
            attached += 1;
        }

        if attached > 0 && self.phase == TrackerPhase::Idle {
            self.phase = TrackerPhase::Observing;
        }
        tracing::trace!(attached, total = self.watched.len(), "Observing entries");
        attached
    }

    /// Feed this frame's intersection ratios.
    ///
    /// Entries not listed are out of view. Returns how many entries that
    /// became visible qualified (raised the max or re-armed a retry).
    pub fn on_visibility<I>(&mut self, ratios: I, now: Instant) -> usize
    where
        I: IntoIterator<Item = (Arc<str>, f32)>,
    {
        if matches!(self.phase, TrackerPhase::Idle | TrackerPhase::Unmounted) {
            return 0;
        }
        let entered = self.watcher.update(ratios);
        entered
            .iter()
            .filter(|id| self.on_intersection(id, now))
            .count()
    }

    /// An entry became intersecting.
    ///
    /// Returns true when it qualified: its timestamp is newer than anything
    /// seen so far, or a failed commit is waiting for a retry and the entry
    /// is newer than the last confirmed timestamp. Qualifying re-arms the
    /// debounce deadline to `now + debounce`.
    pub fn on_intersection(&mut self, id: &str, now: Instant) -> bool {
        if matches!(self.phase, TrackerPhase::Idle | TrackerPhase::Unmounted) {
            return false;
        }
        let Some(watched) = self.watched.get(id) else {
            return false;
        };

        let timestamp = &watched.timestamp;
        let raises = *timestamp > self.state.max_timestamp_in_view;
        let retries = self.retry_armed && *timestamp > self.state.last_committed_timestamp;
        if !raises && !retries {
            return false;
        }

        if raises {
            self.state.max_timestamp_in_view = timestamp.clone();
        }
        self.retry_armed = false;
        self.deadline = Some(now + self.debounce);
        if self.in_flight.is_none() {
            self.phase = TrackerPhase::CommitPending;
        }
        tracing::trace!(
            id,
            max = %self.state.max_timestamp_in_view,
            "Seen marker raised, debounce re-armed"
        );
        true
    }

    /// Check the debounce deadline.
    ///
    /// Returns a commit request when the deadline has elapsed, no call is in
    /// flight, and the max in view is newer than the last commit. A deadline
    /// that elapses while a call is in flight stays armed and fires on the
    /// first poll after completion.
    pub fn poll(&mut self, now: Instant) -> Option<CommitRequest> {
        let deadline = self.deadline?;
        if now < deadline || self.in_flight.is_some() {
            return None;
        }
        self.deadline = None;

        let up_to = self.state.max_timestamp_in_view.clone();
        if up_to.is_empty() || up_to <= self.state.last_committed_timestamp {
            self.phase = self.settled_phase();
            return None;
        }

        self.in_flight = Some(InFlight::Commit(up_to.clone()));
        self.phase = TrackerPhase::Committing;
        tracing::debug!(up_to = %up_to, generation = self.generation, "Committing seen marker");
        Some(CommitRequest {
            up_to,
            generation: self.generation,
        })
    }

    /// Apply the outcome of a [`CommitRequest`].
    ///
    /// On success every watched entry at or before the committed timestamp is
    /// marked read and `counter` drops by the number of entries that were
    /// unread before. On failure nothing changes and the next entry scrolling
    /// into view retries.
    pub fn complete<E: Display>(
        &mut self,
        generation: u64,
        result: Result<(), E>,
        counter: &mut UnreadCounter,
    ) -> CommitOutcome {
        if generation != self.generation {
            tracing::debug!(generation, current = self.generation, "Dropping stale commit result");
            return CommitOutcome::Stale;
        }
        let up_to = match self.in_flight.take() {
            Some(InFlight::Commit(up_to)) => up_to,
            other => {
                self.in_flight = other;
                return CommitOutcome::Stale;
            }
        };

        match result {
            Ok(()) => {
                let newly_read = self.apply_read_up_to(&up_to);
                let remaining = counter.decrement(newly_read as u64);
                self.phase = if self.deadline.is_some() {
                    TrackerPhase::CommitPending
                } else {
                    TrackerPhase::Committed
                };
                tracing::debug!(up_to = %up_to, newly_read, remaining, "Seen marker committed");
                CommitOutcome::Applied { newly_read }
            }
            Err(e) => {
                tracing::warn!(up_to = %up_to, error = %e, "Seen commit failed, will retry");
                self.retry_armed = true;
                self.phase = if self.deadline.is_some() {
                    TrackerPhase::CommitPending
                } else {
                    TrackerPhase::Observing
                };
                CommitOutcome::Failed
            }
        }
    }

    /// Start a full read transition. `None` while another call is in flight
    /// or after teardown. An armed debounce deadline survives the call so a
    /// failure falls back to the pending commit.
    pub fn mark_all_request(&mut self) -> Option<MarkAllRequest> {
        if self.phase == TrackerPhase::Unmounted || self.in_flight.is_some() {
            return None;
        }
        self.in_flight = Some(InFlight::MarkAll);
        self.phase = TrackerPhase::Committing;
        Some(MarkAllRequest {
            generation: self.generation,
        })
    }

    /// Apply the outcome of a [`MarkAllRequest`]. On success every watched
    /// entry becomes read and the counter goes to zero.
    pub fn complete_mark_all<E: Display>(
        &mut self,
        generation: u64,
        result: Result<(), E>,
        counter: &mut UnreadCounter,
    ) -> CommitOutcome {
        if generation != self.generation || self.in_flight != Some(InFlight::MarkAll) {
            return CommitOutcome::Stale;
        }
        self.in_flight = None;

        match result {
            Ok(()) => {
                let newest = self
                    .watched
                    .values()
                    .map(|w| &w.timestamp)
                    .max()
                    .cloned()
                    .unwrap_or_default();
                let newly_read = self.apply_read_up_to(&newest);
                if newest > self.state.max_timestamp_in_view {
                    self.state.max_timestamp_in_view = newest;
                }
                counter.clear();
                self.deadline = None;
                self.phase = TrackerPhase::Committed;
                CommitOutcome::Applied { newly_read }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Mark-all-seen failed");
                self.retry_armed = true;
                self.phase = if self.deadline.is_some() {
                    TrackerPhase::CommitPending
                } else {
                    self.settled_phase()
                };
                CommitOutcome::Failed
            }
        }
    }

    /// Read status of a watched entry: a local override, else the server
    /// flag, else whether it is at or before the last commit.
    pub fn is_read(&self, id: &str) -> bool {
        self.watched
            .get_key_value(id)
            .is_some_and(|(id, w)| self.read_before_commit(id, w))
    }

    /// Watched entries that are still unread locally.
    pub fn unread_watched(&self) -> usize {
        self.watched
            .iter()
            .filter(|(id, w)| !self.read_before_commit(id, w))
            .count()
    }

    /// Cancel any pending commit and detach every watcher. No commit is issued.
    pub fn teardown(&mut self) {
        self.detach();
        self.phase = TrackerPhase::Unmounted;
        tracing::debug!(generation = self.generation, "Seen tracker torn down");
    }

    /// Like [`SeenTracker::teardown`], but start over in `Idle` with fresh
    /// state. Used when the list is replaced wholesale.
    pub fn reset(&mut self) {
        self.detach();
        self.state = SeenState::default();
        self.phase = TrackerPhase::Idle;
        tracing::debug!(generation = self.generation, "Seen tracker reset");
    }

    // ========================================================================
    // Internal Helpers
    // ========================================================================

    fn detach(&mut self) {
        self.deadline = None;
        self.in_flight = None;
        self.retry_armed = false;
        self.watched.clear();
        self.watcher.detach();
        self.generation = self.generation.wrapping_add(1);
    }

    fn read_before_commit(&self, id: &Arc<str>, watched: &Watched) -> bool {
        if let Some(&read) = self.state.local_read_overrides.get(id) {
            return read;
        }
        watched.server_read
            || (!self.state.last_committed_timestamp.is_empty()
                && watched.timestamp <= self.state.last_committed_timestamp)
    }

    /// Mark watched entries at or before `up_to` as read and raise the commit
    /// marker. Returns how many were unread before.
    fn apply_read_up_to(&mut self, up_to: &Timestamp) -> usize {
        let newly: Vec<Arc<str>> = self
            .watched
            .iter()
            .filter(|(_, w)| w.timestamp <= *up_to)
            .filter(|(id, w)| !self.read_before_commit(id, w))
            .map(|(id, _)| Arc::clone(id))
            .collect();

        for (id, w) in &self.watched {
            if w.timestamp <= *up_to {
                self.state.local_read_overrides.insert(Arc::clone(id), true);
            }
        }
        if *up_to > self.state.last_committed_timestamp {
            self.state.last_committed_timestamp = up_to.clone();
        }
        newly.len()
    }

    fn settled_phase(&self) -> TrackerPhase {
        if self.watched.is_empty() {
            TrackerPhase::Idle
        } else if !self.state.last_committed_timestamp.is_empty()
            && self.state.max_timestamp_in_view <= self.state.last_committed_timestamp
        {
            TrackerPhase::Committed
        } else {
            TrackerPhase::Observing
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(id: &str, ts: &str, read: bool) -> SeenEntry {
        SeenEntry {
            id: Arc::from(id),
            timestamp: Timestamp::from(ts),
            read,
        }
    }

    fn tracker_with(entries: &[(&str, &str)]) -> SeenTracker {
        let mut tracker = SeenTracker::default();
        tracker.observe(entries.iter().map(|(id, ts)| entry(id, ts, false)));
        tracker
    }

    fn bootstrapped(value: u64) -> UnreadCounter {
        let mut counter = UnreadCounter::new();
        counter.apply_fetch(0);
        counter.apply_fetch(value);
        counter
    }

    #[test]
    fn test_observe_moves_idle_to_observing() {
        let mut tracker = SeenTracker::default();
        assert_eq!(tracker.phase(), TrackerPhase::Idle);
        assert_eq!(tracker.observe([entry("a", "", false)]), 0);
        assert_eq!(tracker.phase(), TrackerPhase::Idle);
        assert_eq!(tracker.observe([entry("b", "2024-01-01T00:00:00Z", false)]), 1);
        assert_eq!(tracker.phase(), TrackerPhase::Observing);
    }

    #[test]
    fn test_max_in_view_is_monotonic() {
        let mut tracker = tracker_with(&[
            ("new", "2024-01-01T00:00:01Z"),
            ("old", "2024-01-01T00:00:00Z"),
        ]);
        let now = Instant::now();
        assert!(tracker.on_intersection("new", now));
        assert!(!tracker.on_intersection("old", now + Duration::from_millis(10)));
        assert_eq!(
            tracker.state().max_timestamp_in_view,
            Timestamp::from("2024-01-01T00:00:01Z")
        );
    }

    #[test]
    fn test_trailing_debounce() {
        let mut tracker = tracker_with(&[("a", "2024-01-01T00:00:00Z"), ("b", "2024-01-01T00:00:05Z")]);
        let start = Instant::now();
        tracker.on_intersection("a", start);
        assert_eq!(tracker.phase(), TrackerPhase::CommitPending);

        // Second qualifying event re-arms the window
        tracker.on_intersection("b", start + Duration::from_millis(300));
        assert_eq!(tracker.poll(start + Duration::from_millis(450)), None);

        let request = tracker.poll(start + Duration::from_millis(700)).unwrap();
        assert_eq!(request.up_to, Timestamp::from("2024-01-01T00:00:05Z"));
        assert_eq!(tracker.phase(), TrackerPhase::Committing);
        // One request per deadline
        assert_eq!(tracker.poll(start + Duration::from_millis(800)), None);
    }

    #[test]
    fn test_successful_commit_marks_read_and_decrements() {
        let mut tracker = tracker_with(&[
            ("a", "2024-01-01T00:00:00Z"),
            ("b", "2024-01-01T00:00:01Z"),
            ("c", "2024-01-01T00:00:02Z"),
        ]);
        let mut counter = bootstrapped(5);
        let start = Instant::now();
        tracker.on_intersection("b", start);
        let request = tracker.poll(start + DEFAULT_DEBOUNCE).unwrap();

        let outcome = tracker.complete(request.generation, Ok::<(), String>(()), &mut counter);
        assert_eq!(outcome, CommitOutcome::Applied { newly_read: 2 });
        assert_eq!(counter.value(), 3);
        assert!(tracker.is_read("a"));
        assert!(tracker.is_read("b"));
        assert!(!tracker.is_read("c"));
        assert_eq!(tracker.phase(), TrackerPhase::Committed);
        assert_eq!(
            tracker.state().last_committed_timestamp,
            Timestamp::from("2024-01-01T00:00:01Z")
        );
    }

    #[test]
    fn test_commit_never_drives_counter_negative() {
        let ids = ["a", "b", "c", "d", "e"];
        let mut tracker = SeenTracker::default();
        tracker.observe(
            ids.iter()
                .enumerate()
                .map(|(i, id)| entry(id, &format!("2024-01-01T00:00:0{i}Z"), false)),
        );
        let mut counter = bootstrapped(3);
        let start = Instant::now();
        tracker.on_intersection("e", start);
        let request = tracker.poll(start + DEFAULT_DEBOUNCE).unwrap();
        let outcome = tracker.complete(request.generation, Ok::<(), String>(()), &mut counter);
        assert_eq!(outcome, CommitOutcome::Applied { newly_read: 5 });
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn test_server_read_entries_are_not_counted_again() {
        let mut tracker = SeenTracker::default();
        tracker.observe([
            entry("a", "2024-01-01T00:00:00Z", true),
            entry("b", "2024-01-01T00:00:01Z", false),
        ]);
        let mut counter = bootstrapped(4);
        let start = Instant::now();
        tracker.on_intersection("b", start);
        let request = tracker.poll(start + DEFAULT_DEBOUNCE).unwrap();
        let outcome = tracker.complete(request.generation, Ok::<(), String>(()), &mut counter);
        assert_eq!(outcome, CommitOutcome::Applied { newly_read: 1 });
        assert_eq!(counter.value(), 3);
    }

    #[test]
    fn test_failed_commit_changes_nothing_and_retries() {
        let mut tracker = tracker_with(&[("a", "2024-01-01T00:00:00Z"), ("b", "2024-01-01T00:00:01Z")]);
        let mut counter = bootstrapped(2);
        let start = Instant::now();
        tracker.on_intersection("b", start);
        let request = tracker.poll(start + DEFAULT_DEBOUNCE).unwrap();
        let before = tracker.state().clone();

        let outcome = tracker.complete(request.generation, Err("offline"), &mut counter);
        assert_eq!(outcome, CommitOutcome::Failed);
        assert_eq!(tracker.state(), &before);
        assert_eq!(counter.value(), 2);
        assert!(!tracker.is_read("b"));

        // "a" is older than the max but newer than the last commit: retry
        let later = start + Duration::from_secs(2);
        assert!(tracker.on_intersection("a", later));
        let retry = tracker.poll(later + DEFAULT_DEBOUNCE).unwrap();
        assert_eq!(retry.up_to, Timestamp::from("2024-01-01T00:00:01Z"));
    }

    #[test]
    fn test_intersection_during_commit_waits_for_next_cycle() {
        let mut tracker = tracker_with(&[("a", "2024-01-01T00:00:00Z"), ("b", "2024-01-01T00:00:01Z")]);
        let mut counter = bootstrapped(2);
        let start = Instant::now();
        tracker.on_intersection("a", start);
        let first = tracker.poll(start + DEFAULT_DEBOUNCE).unwrap();

        // b arrives mid-commit; its deadline elapses while the call is in flight
        tracker.on_intersection("b", start + Duration::from_millis(450));
        assert_eq!(tracker.phase(), TrackerPhase::Committing);
        assert_eq!(tracker.poll(start + Duration::from_secs(1)), None);

        tracker.complete(first.generation, Ok::<(), String>(()), &mut counter);
        assert_eq!(tracker.phase(), TrackerPhase::CommitPending);
        let second = tracker.poll(start + Duration::from_secs(1)).unwrap();
        assert_eq!(second.up_to, Timestamp::from("2024-01-01T00:00:01Z"));
    }

    #[test]
    fn test_teardown_cancels_and_ignores_late_results() {
        let mut tracker = tracker_with(&[("a", "2024-01-01T00:00:00Z")]);
        let mut counter = bootstrapped(1);
        let start = Instant::now();
        tracker.on_intersection("a", start);
        let request = tracker.poll(start + DEFAULT_DEBOUNCE).unwrap();

        tracker.teardown();
        assert_eq!(tracker.phase(), TrackerPhase::Unmounted);
        assert_eq!(tracker.deadline(), None);
        assert_eq!(
            tracker.complete(request.generation, Ok::<(), String>(()), &mut counter),
            CommitOutcome::Stale
        );
        assert_eq!(counter.value(), 1);
        assert_eq!(tracker.observe([entry("b", "2024-01-01T00:00:09Z", false)]), 0);
        assert!(!tracker.on_intersection("a", start));
    }

    #[test]
    fn test_teardown_with_pending_deadline_issues_nothing() {
        let mut tracker = tracker_with(&[("a", "2024-01-01T00:00:00Z")]);
        let start = Instant::now();
        tracker.on_intersection("a", start);
        tracker.teardown();
        assert_eq!(tracker.poll(start + Duration::from_secs(5)), None);
    }

    #[test]
    fn test_reset_starts_fresh() {
        let mut tracker = tracker_with(&[("a", "2024-01-01T00:00:00Z")]);
        let start = Instant::now();
        tracker.on_intersection("a", start);
        tracker.reset();
        assert_eq!(tracker.phase(), TrackerPhase::Idle);
        assert_eq!(tracker.state(), &SeenState::default());
        assert_eq!(tracker.watched_count(), 0);
        tracker.observe([entry("a", "2024-01-01T00:00:00Z", false)]);
        assert!(tracker.on_intersection("a", start));
    }

    #[test]
    fn test_on_visibility_uses_threshold() {
        let mut tracker = tracker_with(&[("a", "2024-01-01T00:00:00Z"), ("b", "2024-01-01T00:00:01Z")]);
        let now = Instant::now();
        let qualified = tracker.on_visibility([(Arc::from("a"), 1.0), (Arc::from("b"), 0.1)], now);
        assert_eq!(qualified, 1);
        assert_eq!(
            tracker.state().max_timestamp_in_view,
            Timestamp::from("2024-01-01T00:00:00Z")
        );
        // b crosses the threshold on a later frame
        let qualified = tracker.on_visibility([(Arc::from("a"), 1.0), (Arc::from("b"), 0.5)], now);
        assert_eq!(qualified, 1);
    }

    #[test]
    fn test_mark_all_clears_counter() {
        let mut tracker = tracker_with(&[("a", "2024-01-01T00:00:00Z"), ("b", "2024-01-01T00:00:01Z")]);
        let mut counter = bootstrapped(9);
        let request = tracker.mark_all_request().unwrap();
        assert!(tracker.mark_all_request().is_none());
        let outcome = tracker.complete_mark_all(request.generation, Ok::<(), String>(()), &mut counter);
        assert_eq!(outcome, CommitOutcome::Applied { newly_read: 2 });
        assert_eq!(counter.value(), 0);
        assert_eq!(tracker.unread_watched(), 0);
        assert_eq!(
            tracker.state().last_committed_timestamp,
            Timestamp::from("2024-01-01T00:00:01Z")
        );
    }

    #[test]
    fn test_failed_mark_all_keeps_pending_commit() {
        let mut tracker = tracker_with(&[("a", "2024-01-01T00:00:00Z"), ("b", "2024-01-01T00:00:01Z")]);
        let mut counter = bootstrapped(2);
        let start = Instant::now();
        tracker.on_intersection("b", start);
        let request = tracker.mark_all_request().unwrap();
        // The debounce cannot fire while mark-all is in flight
        assert_eq!(tracker.poll(start + DEFAULT_DEBOUNCE), None);

        let outcome = tracker.complete_mark_all(request.generation, Err("offline"), &mut counter);
        assert_eq!(outcome, CommitOutcome::Failed);
        assert_eq!(tracker.phase(), TrackerPhase::CommitPending);
        assert_eq!(counter.value(), 2);
        assert!(!tracker.is_read("b"));

        let retry = tracker.poll(start + Duration::from_secs(5)).unwrap();
        assert_eq!(retry.up_to, Timestamp::from("2024-01-01T00:00:01Z"));
        tracker.complete(retry.generation, Ok::<(), String>(()), &mut counter);
        assert!(tracker.is_read("a"));
        assert!(tracker.is_read("b"));
        assert_eq!(counter.value(), 0);
    }

    #[test]
    fn test_failed_mark_all_rearms_on_seen_entries() {
        let mut tracker = tracker_with(&[("a", "2024-01-01T00:00:00Z"), ("b", "2024-01-01T00:00:01Z")]);
        let mut counter = bootstrapped(2);
        let start = Instant::now();
        tracker.on_intersection("b", start);
        let request = tracker.mark_all_request().unwrap();
        tracker.complete_mark_all(request.generation, Err("offline"), &mut counter);

        // Scrolling back over already-seen entries arms another attempt
        let later = start + Duration::from_secs(2);
        assert!(tracker.on_intersection("a", later));
        assert_eq!(tracker.deadline(), Some(later + DEFAULT_DEBOUNCE));
        let retry = tracker.poll(start + Duration::from_secs(5)).unwrap();
        assert_eq!(retry.up_to, Timestamp::from("2024-01-01T00:00:01Z"));
    }

    #[test]
    fn test_entries_below_commit_count_as_read_without_override() {
        let mut tracker = tracker_with(&[("b", "2024-01-01T00:00:05Z")]);
        let mut counter = bootstrapped(1);
        let start = Instant::now();
        tracker.on_intersection("b", start);
        let request = tracker.poll(start + DEFAULT_DEBOUNCE).unwrap();
        tracker.complete(request.generation, Ok::<(), String>(()), &mut counter);

        // Next page brings an older entry
        tracker.observe([entry("a", "2024-01-01T00:00:01Z", false)]);
        assert!(tracker.is_read("a"));
        assert_eq!(tracker.unread_watched(), 0);
    }
}
