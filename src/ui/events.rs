//! Application event handling.
//!
//! Applies the results of background tasks: page loads, seen sync calls,
//! unread count fetches, and rejected likes.

use crate::app::{App, AppEvent};

/// Handle one event from a background task.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::PostsLoaded(loaded) => {
            tracing::debug!(
                generation = loaded.generation,
                replace = loaded.replace,
                ok = loaded.result.is_ok(),
                "Posts page arrived"
            );
            app.apply_posts_loaded(loaded);
        }
        AppEvent::NotificationsLoaded(loaded) => {
            tracing::debug!(
                generation = loaded.generation,
                replace = loaded.replace,
                ok = loaded.result.is_ok(),
                "Notifications page arrived"
            );
            app.apply_notifications_loaded(loaded);
        }
        AppEvent::SeenCommitted(done) => app.apply_commit(done),
        AppEvent::AllSeenMarked(done) => app.apply_mark_all(done),
        AppEvent::UnreadCountFetched(fetched) => app.apply_unread_fetch(fetched),
        AppEvent::LikeFailed { uri, liked } => {
            app.revert_like(&uri, liked);
            app.set_status(if liked {
                "Failed to like post - reverted"
            } else {
                "Failed to unlike post - reverted"
            });
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            app.set_status(format!("Internal error in {} task", task));
        }
    }
    app.needs_redraw = true;
}
