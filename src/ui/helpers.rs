//! Helper functions for UI operations.
//!
//! Spawning of background work (page loads, likes, seen sync) and small
//! formatting helpers shared by the widgets.

use crate::app::{App, AppEvent, Tab};
use crate::feed::{spawn_page_load, Item, Notification, PageRequest};
use crate::seen::{sync, CommitRequest, Timestamp};
use crate::util::catch_task_panic;
use chrono::{DateTime, Utc};
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Spawn a load for `request` against the list it belongs to.
fn spawn_request(app: &App, tab: Tab, request: PageRequest, event_tx: &mpsc::Sender<AppEvent>) {
    let backend = Arc::clone(&app.backend);
    tracing::debug!(?tab, cursor = ?request.cursor, generation = request.generation, "Spawning page load");
    match tab {
        Tab::Feed => {
            spawn_page_load::<_, Item, _>(backend, request, event_tx.clone());
        }
        Tab::Notifications => {
            spawn_page_load::<_, Notification, _>(backend, request, event_tx.clone());
        }
    }
}

/// Reload `tab` from its first page. The result replaces the list wholesale.
pub(super) fn spawn_reload(app: &mut App, tab: Tab, event_tx: &mpsc::Sender<AppEvent>) {
    let request = app.begin_reload(tab);
    spawn_request(app, tab, request, event_tx);
}

/// Request the next page when focus is near the end of its column.
pub(super) fn maybe_load_more(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if !app.needs_more() {
        return;
    }
    let tab = app.tab;
    if let Some(request) = app.begin_next_page(tab) {
        spawn_request(app, tab, request, event_tx);
    }
}

/// Flip the like on the focused post and persist it in the background.
///
/// The change is applied locally first; `AppEvent::LikeFailed` reverts it.
pub(super) fn toggle_like(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    match app.toggle_like() {
        Some((uri, liked)) => spawn_like(app, uri, liked, event_tx),
        None => app.set_status("Only posts can be liked"),
    }
}

pub(super) fn spawn_like(app: &App, uri: Arc<str>, liked: bool, event_tx: &mpsc::Sender<AppEvent>) {
    let backend = Arc::clone(&app.backend);
    let tx = event_tx.clone();
    tokio::spawn(async move {
        let tx_panic = tx.clone();
        match catch_task_panic(async {
            if let Err(e) = backend.set_liked(&uri, liked).await {
                tracing::error!(error = %e, uri = %uri, liked, "Failed to update like");
                if let Err(e) = tx.send(AppEvent::LikeFailed { uri, liked }).await {
                    tracing::warn!(error = %e, event = "LikeFailed", "Channel send failed (receiver dropped)");
                }
            }
        })
        .await
        {
            Ok(()) => {}
            Err(panic_msg) => {
                tracing::error!(task = "like", error = %panic_msg, "Background task panicked");
                let _ = tx_panic
                    .send(AppEvent::TaskPanicked {
                        task: "like",
                        error: panic_msg,
                    })
                    .await;
            }
        }
    });
}

pub(super) fn spawn_seen_commit(
    app: &mut App,
    request: CommitRequest,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    let handle = sync::spawn_commit(Arc::clone(&app.backend), request, event_tx.clone());
    app.sync_handle = Some(handle);
}

pub(super) fn spawn_mark_all(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(request) = app.request_mark_all() {
        let handle = sync::spawn_mark_all(Arc::clone(&app.backend), request, event_tx.clone());
        app.sync_handle = Some(handle);
    }
}

pub(super) fn spawn_unread_fetch(app: &App, event_tx: &mpsc::Sender<AppEvent>) {
    sync::spawn_unread_fetch(Arc::clone(&app.backend), event_tx.clone());
}

/// Format a timestamp as a short age relative to `now`.
pub(super) fn format_relative_time(timestamp: &Timestamp, now: DateTime<Utc>) -> String {
    let Some(ts) = timestamp.to_datetime() else {
        return String::new();
    };

    let diff = now.signed_duration_since(ts).num_seconds();

    // Future dates (clock skew)
    if diff < 60 {
        return "now".to_string();
    }
    if diff < 3600 {
        return format!("{}m", diff / 60);
    }
    if diff < 86400 {
        return format!("{}h", diff / 3600);
    }
    if diff < 604800 {
        return format!("{}d", diff / 86400);
    }

    ts.format("%b %d").to_string()
}

/// Create a centered rectangle with the given percentage of the parent area.
pub(super) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Copy rows `skip..` of an off-screen card into `dst`, clipped to `area`.
///
/// Cards are drawn whole into their own buffer so a card cut off by the top
/// of the viewport still shows its lower rows.
pub(super) fn blit(card: &Buffer, skip: u16, dst: &mut Buffer, area: Rect) {
    let rows = card.area.height.saturating_sub(skip).min(area.height);
    let cols = card.area.width.min(area.width);
    for dy in 0..rows {
        for dx in 0..cols {
            let Some(cell) = card.cell((card.area.x + dx, card.area.y + skip + dy)) else {
                continue;
            };
            if let Some(target) = dst.cell_mut((area.x + dx, area.y + dy)) {
                *target = cell.clone();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs_after: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + chrono::Duration::seconds(secs_after)
    }

    #[test]
    fn test_relative_time_buckets() {
        let ts = Timestamp::from("2024-01-01T00:00:00Z");
        assert_eq!(format_relative_time(&ts, at(-30)), "now");
        assert_eq!(format_relative_time(&ts, at(59)), "now");
        assert_eq!(format_relative_time(&ts, at(300)), "5m");
        assert_eq!(format_relative_time(&ts, at(7200)), "2h");
        assert_eq!(format_relative_time(&ts, at(3 * 86400)), "3d");
        assert_eq!(format_relative_time(&ts, at(30 * 86400)), "Jan 01");
    }

    #[test]
    fn test_relative_time_invalid() {
        assert_eq!(format_relative_time(&Timestamp::default(), at(0)), "");
        assert_eq!(format_relative_time(&Timestamp::from("yesterday"), at(0)), "");
    }

    #[test]
    fn test_blit_skips_clipped_rows() {
        let mut card = Buffer::empty(Rect::new(0, 0, 3, 3));
        card.set_string(0, 0, "aaa", ratatui::style::Style::default());
        card.set_string(0, 1, "bbb", ratatui::style::Style::default());
        card.set_string(0, 2, "ccc", ratatui::style::Style::default());

        let mut dst = Buffer::empty(Rect::new(0, 0, 5, 5));
        blit(&card, 1, &mut dst, Rect::new(1, 2, 4, 3));
        assert_eq!(dst.cell((1, 2)).map(|c| c.symbol()), Some("b"));
        assert_eq!(dst.cell((3, 3)).map(|c| c.symbol()), Some("c"));
        assert_eq!(dst.cell((1, 4)).map(|c| c.symbol()), Some(" "));
    }

    #[test]
    fn test_centered_rect() {
        let r = centered_rect(50, 50, Rect::new(0, 0, 100, 40));
        assert_eq!(r, Rect::new(25, 10, 50, 20));
    }
}
