//! JSON fixture backend.
//!
//! Serves posts and notifications from a local file with offset cursors and
//! optional simulated latency, and keeps a server-side seen marker so the
//! unread count behaves like the real service: stale at start, recomputed
//! after every mark-seen call.
use std::path::Path;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use super::source::{PageSource, SourceError};
use super::types::{Item, ItemRecord, Notification, NotificationRecord, Page};
use crate::seen::{NotificationService, ServiceError, Timestamp};

/// Refuse fixture files larger than this.
const MAX_FIXTURE_SIZE: u64 = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("Failed to read fixture {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse fixture: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Fixture file too large (max {max} bytes)")]
    TooLarge { max: u64 },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixtureFile {
    #[serde(default)]
    posts: Vec<ItemRecord>,
    #[serde(default)]
    notifications: Vec<NotificationRecord>,
    /// Server badge count at startup. May disagree with the notification flags.
    #[serde(default)]
    unread_count: u64,
}

#[derive(Debug, Clone, Copy)]
pub struct FixtureOptions {
    pub page_size: usize,
    pub latency: Duration,
}

impl Default for FixtureOptions {
    fn default() -> Self {
        Self {
            page_size: 20,
            latency: Duration::ZERO,
        }
    }
}

#[derive(Debug)]
struct ServerState {
    seen_marker: Timestamp,
    unread_count: u64,
    liked: Vec<String>,
    fail_next: u32,
}

/// In-memory stand-in for the remote service.
#[derive(Debug)]
pub struct FixtureService {
    posts: Vec<Item>,
    notifications: Vec<Notification>,
    options: FixtureOptions,
    state: Mutex<ServerState>,
}

impl FixtureService {
    /// Load a fixture file.
    pub fn load(path: &Path, options: FixtureOptions) -> Result<Self, FixtureError> {
        let io_err = |source| FixtureError::Io {
            path: path.display().to_string(),
            source,
        };
        let size = std::fs::metadata(path).map_err(io_err)?.len();
        if size > MAX_FIXTURE_SIZE {
            return Err(FixtureError::TooLarge {
                max: MAX_FIXTURE_SIZE,
            });
        }
        let json = std::fs::read_to_string(path).map_err(io_err)?;
        Self::from_json(&json, options)
    }

    pub fn from_json(json: &str, options: FixtureOptions) -> Result<Self, FixtureError> {
        let file: FixtureFile = serde_json::from_str(json)?;

        let posts: Vec<Item> = file.posts.into_iter().map(ItemRecord::into_item).collect();
        let notifications: Vec<Notification> = file
            .notifications
            .into_iter()
            .map(NotificationRecord::into_notification)
            .collect();

        let invalid = notifications
            .iter()
            .map(|n| &n.indexed_at)
            .chain(posts.iter().map(|p| &p.indexed_at))
            .filter(|ts| !ts.is_empty() && Timestamp::parse_rfc3339(ts.as_str()).is_err())
            .count();
        if invalid > 0 {
            tracing::warn!(invalid, "Fixture contains timestamps that are not RFC 3339");
        }

        tracing::info!(
            posts = posts.len(),
            notifications = notifications.len(),
            unread = file.unread_count,
            "Loaded fixture"
        );

        Ok(Self {
            posts,
            notifications,
            options: FixtureOptions {
                page_size: options.page_size.max(1),
                ..options
            },
            state: Mutex::new(ServerState {
                seen_marker: Timestamp::default(),
                unread_count: file.unread_count,
                liked: Vec::new(),
                fail_next: 0,
            }),
        })
    }

    /// Make the next `calls` requests of any kind fail with a transport error.
    pub fn fail_next_calls(&self, calls: u32) {
        self.lock().fail_next = calls;
    }

    /// The server-side seen marker.
    pub fn seen_marker(&self) -> Timestamp {
        self.lock().seen_marker.clone()
    }

    /// Record a like or unlike. The fixture only remembers the set.
    pub async fn set_liked(&self, uri: &str, liked: bool) -> Result<(), SourceError> {
        self.simulate_latency().await;
        let mut state = self.lock();
        Self::take_failure(&mut state).map_err(SourceError::Transport)?;
        state.liked.retain(|u| u != uri);
        if liked {
            state.liked.push(uri.to_string());
        }
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ServerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn simulate_latency(&self) {
        if !self.options.latency.is_zero() {
            tokio::time::sleep(self.options.latency).await;
        }
    }

    fn take_failure(state: &mut ServerState) -> Result<(), String> {
        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err("simulated failure".to_string());
        }
        Ok(())
    }

    fn page<T: Clone>(&self, all: &[T], cursor: Option<&str>) -> Result<Page<T>, SourceError> {
        let offset = match cursor {
            None => 0,
            Some(c) => c
                .parse::<usize>()
                .ok()
                .filter(|&o| o <= all.len())
                .ok_or_else(|| SourceError::InvalidCursor(c.to_string()))?,
        };
        let end = (offset + self.options.page_size).min(all.len());
        let next_cursor = (end < all.len()).then(|| end.to_string());
        Ok(Page {
            items: all[offset..end].to_vec(),
            next_cursor,
        })
    }

    fn unread_after(&self, marker: &Timestamp) -> u64 {
        self.notifications
            .iter()
            .filter(|n| !n.is_read && n.indexed_at > *marker)
            .count() as u64
    }
}

impl PageSource<Item> for FixtureService {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<Item>, SourceError> {
        self.simulate_latency().await;
        Self::take_failure(&mut self.lock()).map_err(SourceError::Transport)?;
        self.page(&self.posts, cursor)
    }
}

impl PageSource<Notification> for FixtureService {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<Page<Notification>, SourceError> {
        self.simulate_latency().await;
        let marker = {
            let mut state = self.lock();
            Self::take_failure(&mut state).map_err(SourceError::Transport)?;
            state.seen_marker.clone()
        };
        let mut page = self.page(&self.notifications, cursor)?;
        for n in &mut page.items {
            n.is_read = n.is_read || (!marker.is_empty() && n.indexed_at <= marker);
        }
        Ok(page)
    }
}

impl NotificationService for FixtureService {
    async fn mark_seen_up_to(&self, up_to: &Timestamp) -> Result<(), ServiceError> {
        self.simulate_latency().await;
        let mut state = self.lock();
        Self::take_failure(&mut state).map_err(ServiceError::Transport)?;
        if *up_to > state.seen_marker {
            state.seen_marker = up_to.clone();
        }
        state.unread_count = self.unread_after(&state.seen_marker);
        tracing::debug!(marker = %state.seen_marker, unread = state.unread_count, "Fixture seen marker moved");
        Ok(())
    }

    async fn mark_all_seen(&self) -> Result<(), ServiceError> {
        self.simulate_latency().await;
        let mut state = self.lock();
        Self::take_failure(&mut state).map_err(ServiceError::Transport)?;
        if let Some(newest) = self.notifications.iter().map(|n| &n.indexed_at).max() {
            if *newest > state.seen_marker {
                state.seen_marker = newest.clone();
            }
        }
        state.unread_count = 0;
        Ok(())
    }

    async fn unread_count(&self) -> Result<u64, ServiceError> {
        self.simulate_latency().await;
        let mut state = self.lock();
        Self::take_failure(&mut state).map_err(ServiceError::Transport)?;
        Ok(state.unread_count)
    }
}
