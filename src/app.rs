use crate::config::Config;
use crate::feed::{FeedGrid, FixtureService, Item, Notification, PageLoaded, PageRequest};
use crate::keybindings::{Context, KeybindingRegistry};
use crate::layout::Direction;
use crate::preferences::{Preferences, ViewMode};
use crate::seen::sync::{CommitCompleted, MarkAllCompleted, UnreadCountFetched};
use crate::seen::{
    CommitOutcome, CommitRequest, MarkAllRequest, ObserverOptions, SeenTracker, UnreadCounter,
};
use std::borrow::Cow;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Rows from the end of a column at which the next page is requested.
pub const LOAD_MORE_THRESHOLD: usize = 2;

// ============================================================================
// View and Tab Enums
// ============================================================================

/// Which list is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Feed,
    Notifications,
}

impl Tab {
    pub fn other(self) -> Self {
        match self {
            Self::Feed => Self::Notifications,
            Self::Notifications => Self::Feed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Grid or list with the tab bar.
    Browse,
    /// Full item overlay for the focused entry.
    Detail { tab: Tab, index: usize },
}

/// Geometry of the list area, recorded by the renderer each frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    /// Visible rows inside the list area.
    pub rows: usize,
    /// Width of one column in cells.
    pub column_cells: u16,
}

// ============================================================================
// Context Menu State
// ============================================================================

/// Menu items for the item context menu.
pub const CONTEXT_MENU_ITEMS: &[&str] = &["Open", "Like / Unlike", "Mark seen", "Close"];

/// State for the item context menu popup.
pub struct ContextMenuState {
    pub tab: Tab,
    /// Original index of the item the menu was opened on.
    pub index: usize,
    pub title: String,
    pub selected_item: usize,
}

// ============================================================================
// Events
// ============================================================================

/// Events from background tasks
pub enum AppEvent {
    PostsLoaded(PageLoaded<Item>),
    NotificationsLoaded(PageLoaded<Notification>),
    SeenCommitted(CommitCompleted),
    AllSeenMarked(MarkAllCompleted),
    UnreadCountFetched(UnreadCountFetched),
    /// A like or unlike was rejected; `liked` is the state that failed to apply.
    LikeFailed {
        uri: Arc<str>,
        liked: bool,
    },
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "like")
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked {
        task: &'static str,
        error: String,
    },
}

impl From<PageLoaded<Item>> for AppEvent {
    fn from(loaded: PageLoaded<Item>) -> Self {
        Self::PostsLoaded(loaded)
    }
}

impl From<PageLoaded<Notification>> for AppEvent {
    fn from(loaded: PageLoaded<Notification>) -> Self {
        Self::NotificationsLoaded(loaded)
    }
}

impl From<CommitCompleted> for AppEvent {
    fn from(done: CommitCompleted) -> Self {
        Self::SeenCommitted(done)
    }
}

impl From<MarkAllCompleted> for AppEvent {
    fn from(done: MarkAllCompleted) -> Self {
        Self::AllSeenMarked(done)
    }
}

impl From<UnreadCountFetched> for AppEvent {
    fn from(fetched: UnreadCountFetched) -> Self {
        Self::UnreadCountFetched(fetched)
    }
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub backend: Arc<FixtureService>,
    pub keybindings: KeybindingRegistry,

    pub view: View,
    pub tab: Tab,
    pub view_mode: ViewMode,
    /// Where the view mode is persisted. `None` disables persistence.
    prefs_path: Option<PathBuf>,

    pub posts: FeedGrid<Item>,
    pub notifications: FeedGrid<Notification>,
    pub seen: SeenTracker,
    pub unread: UnreadCounter,
    /// Posts liked in this session. Toggled optimistically.
    pub liked: HashSet<Arc<str>>,

    pub viewport: Viewport,
    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    pub show_help: bool,
    pub help_scroll_offset: usize,
    pub context_menu: Option<ContextMenuState>,

    unread_poll_interval: Option<Duration>,
    last_unread_poll: Instant,
    /// The in-flight seen commit or mark-all call, aborted on drop.
    pub sync_handle: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(
        backend: Arc<FixtureService>,
        config: &Config,
        view_mode: ViewMode,
        prefs_path: Option<PathBuf>,
    ) -> Self {
        let options: ObserverOptions = config.seen.observer_options();
        let mut unread = UnreadCounter::new();
        unread.session_start();

        Self {
            backend,
            keybindings: KeybindingRegistry::new(),
            view: View::Browse,
            tab: Tab::Feed,
            view_mode,
            prefs_path,
            posts: FeedGrid::new(view_mode.column_count(), config.layout),
            notifications: FeedGrid::new(1, config.layout),
            seen: SeenTracker::new(config.seen.debounce(), options),
            unread,
            liked: HashSet::new(),
            viewport: Viewport::default(),
            status_message: None,
            needs_redraw: true,
            show_help: false,
            help_scroll_offset: 0,
            context_menu: None,
            unread_poll_interval: config.notifications.poll_interval(),
            last_unread_poll: Instant::now(),
            sync_handle: None,
        }
    }

    /// Keybinding context for the current screen.
    pub fn context(&self) -> Context {
        if self.context_menu.is_some() {
            return Context::Menu;
        }
        match (self.view, self.tab) {
            (View::Detail { .. }, _) => Context::Detail,
            (View::Browse, Tab::Feed) => Context::Grid,
            (View::Browse, Tab::Notifications) => Context::Notifications,
        }
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Move focus in the active list and keep it on screen.
    pub fn move_focus(&mut self, direction: Direction) -> bool {
        let Viewport { rows, column_cells } = self.viewport;
        let moved = match self.tab {
            Tab::Feed => self.posts.move_focus(direction),
            Tab::Notifications => self.notifications.move_focus(direction),
        };
        if moved {
            match self.tab {
                Tab::Feed => self.posts.scroll_into_view(rows, column_cells),
                Tab::Notifications => self.notifications.scroll_into_view(rows, column_cells),
            }
            self.needs_redraw = true;
        }
        moved
    }

    pub fn switch_tab(&mut self) {
        self.tab = self.tab.other();
        self.context_menu = None;
        self.needs_redraw = true;
        tracing::debug!(tab = ?self.tab, "Switched tab");
    }

    /// Advance to the next view mode, relayout the feed, and persist the choice.
    pub fn cycle_view_mode(&mut self) {
        self.view_mode = self.view_mode.next();
        self.posts.set_columns(self.view_mode.column_count());
        let Viewport { rows, column_cells } = self.viewport;
        self.posts.scroll_into_view(rows, column_cells);
        self.needs_redraw = true;

        if let Some(path) = &self.prefs_path {
            let prefs = Preferences {
                view_mode: self.view_mode,
            };
            if let Err(e) = prefs.save(path) {
                tracing::warn!(error = %e, "Failed to persist view mode");
                self.set_status(format!("View: {} (not saved)", self.view_mode));
                return;
            }
        }
        self.set_status(format!("View: {}", self.view_mode));
    }

    /// Whether the focused column is close enough to its end to fetch more.
    pub fn needs_more(&self) -> bool {
        match self.tab {
            Tab::Feed => self.posts.needs_more(LOAD_MORE_THRESHOLD),
            Tab::Notifications => self.notifications.needs_more(LOAD_MORE_THRESHOLD),
        }
    }

    // ========================================================================
    // Detail View
    // ========================================================================

    /// Open the focused entry of the active list.
    ///
    /// Opening a notification counts as seeing it.
    pub fn open_focused(&mut self) -> bool {
        let index = match self.tab {
            Tab::Feed => self.posts.focus(),
            Tab::Notifications => self.notifications.focus(),
        };
        match index {
            Some(index) => self.open(self.tab, index),
            None => false,
        }
    }

    pub fn open(&mut self, tab: Tab, index: usize) -> bool {
        let exists = match tab {
            Tab::Feed => index < self.posts.len(),
            Tab::Notifications => index < self.notifications.len(),
        };
        if !exists {
            return false;
        }
        if tab == Tab::Notifications {
            self.mark_seen(index, Instant::now());
        }
        self.view = View::Detail { tab, index };
        self.needs_redraw = true;
        true
    }

    pub fn close_detail(&mut self) {
        self.view = View::Browse;
        self.needs_redraw = true;
    }

    /// Post shown in the detail view, if any.
    pub fn detail_post(&self) -> Option<&Item> {
        match self.view {
            View::Detail {
                tab: Tab::Feed,
                index,
            } => self.posts.items().get(index),
            _ => None,
        }
    }

    pub fn detail_notification(&self) -> Option<&Notification> {
        match self.view {
            View::Detail {
                tab: Tab::Notifications,
                index,
            } => self.notifications.items().get(index),
            _ => None,
        }
    }

    // ========================================================================
    // Context Menu
    // ========================================================================

    pub fn open_context_menu(&mut self) -> bool {
        let (tab, index, title) = match self.tab {
            Tab::Feed => match self.posts.focus().zip(self.posts.focused()) {
                Some((i, post)) => (Tab::Feed, i, format!("@{}", post.author)),
                None => return false,
            },
            Tab::Notifications => match self.notifications.focus().zip(self.notifications.focused()) {
                Some((i, n)) => (Tab::Notifications, i, format!("@{} {}", n.author, n.reason)),
                None => return false,
            },
        };
        self.context_menu = Some(ContextMenuState {
            tab,
            index,
            title,
            selected_item: 0,
        });
        self.needs_redraw = true;
        true
    }

    // ========================================================================
    // Likes
    // ========================================================================

    /// Flip the like on the post under focus (or in the detail view).
    ///
    /// Returns the post URI and its new state for the caller to persist.
    pub fn toggle_like(&mut self) -> Option<(Arc<str>, bool)> {
        let uri = match self.view {
            View::Detail { .. } => self.detail_post().map(|p| Arc::clone(&p.uri)),
            View::Browse if self.tab == Tab::Feed => self.posts.focused().map(|p| Arc::clone(&p.uri)),
            View::Browse => None,
        }?;
        Some(self.toggle_like_uri(uri))
    }

    pub fn toggle_like_uri(&mut self, uri: Arc<str>) -> (Arc<str>, bool) {
        let liked = !self.liked.remove(&uri);
        if liked {
            self.liked.insert(Arc::clone(&uri));
        }
        self.needs_redraw = true;
        (uri, liked)
    }

    /// Undo an optimistic toggle the backend rejected.
    pub fn revert_like(&mut self, uri: &Arc<str>, failed_state: bool) {
        if failed_state {
            self.liked.remove(uri);
        } else {
            self.liked.insert(Arc::clone(uri));
        }
        self.needs_redraw = true;
    }

    pub fn is_liked(&self, post: &Item) -> bool {
        self.liked.contains(&post.uri)
    }

    /// Like count including this session's optimistic toggle.
    pub fn like_count(&self, post: &Item) -> u32 {
        post.like_count + u32::from(self.is_liked(post))
    }

    // ========================================================================
    // Page Loads
    // ========================================================================

    pub fn begin_reload(&mut self, tab: Tab) -> PageRequest {
        match tab {
            Tab::Feed => self.posts.pagination.begin_reload(),
            Tab::Notifications => self.notifications.pagination.begin_reload(),
        }
    }

    pub fn begin_next_page(&mut self, tab: Tab) -> Option<PageRequest> {
        match tab {
            Tab::Feed => self.posts.pagination.begin_next(),
            Tab::Notifications => self.notifications.pagination.begin_next(),
        }
    }

    pub fn apply_posts_loaded(&mut self, loaded: PageLoaded<Item>) {
        let PageLoaded {
            generation,
            replace,
            result,
        } = loaded;
        match result {
            Ok(page) => {
                if !self.posts.pagination.finish(generation, page.next_cursor) {
                    tracing::debug!(generation, "Dropping stale posts page");
                    return;
                }
                if replace {
                    self.posts.replace(page.items);
                } else {
                    self.posts.append(page.items);
                }
            }
            Err(e) => {
                if self.posts.pagination.fail(generation) {
                    self.set_status(format!("Failed to load feed: {e}"));
                }
            }
        }
    }

    /// Apply a notifications page. A wholesale replace resets the tracker;
    /// a next page only adds watchers.
    pub fn apply_notifications_loaded(&mut self, loaded: PageLoaded<Notification>) {
        let PageLoaded {
            generation,
            replace,
            result,
        } = loaded;
        match result {
            Ok(page) => {
                if !self
                    .notifications
                    .pagination
                    .finish(generation, page.next_cursor)
                {
                    tracing::debug!(generation, "Dropping stale notifications page");
                    return;
                }
                let entries: Vec<_> = page.items.iter().map(Notification::seen_entry).collect();
                if replace {
                    self.seen.reset();
                    self.notifications.replace(page.items);
                } else {
                    self.notifications.append(page.items);
                }
                self.seen.observe(entries);
            }
            Err(e) => {
                if self.notifications.pagination.fail(generation) {
                    self.set_status(format!("Failed to load notifications: {e}"));
                }
            }
        }
    }

    // ========================================================================
    // Seen State
    // ========================================================================

    /// Report which notification cards are on screen this frame.
    ///
    /// When the notifications list is hidden every watcher sees zero
    /// intersection. Returns how many entries qualified.
    pub fn observe_viewport(&mut self, now: Instant) -> usize {
        let on_screen = self.tab == Tab::Notifications && self.view == View::Browse;
        let ratios: Vec<(Arc<str>, f32)> = if on_screen {
            let Viewport { rows, column_cells } = self.viewport;
            let margin = self.seen.observer_options().root_margin;
            let items = self.notifications.items();
            self.notifications
                .visible(rows, column_cells, margin)
                .into_iter()
                .filter_map(|(i, ratio)| items.get(i).map(|n| (Arc::clone(&n.uri), ratio)))
                .collect()
        } else {
            Vec::new()
        };
        self.seen.on_visibility(ratios, now)
    }

    /// Treat the notification at `index` as seen.
    pub fn mark_seen(&mut self, index: usize, now: Instant) -> bool {
        let Some(uri) = self.notifications.items().get(index).map(|n| Arc::clone(&n.uri)) else {
            return false;
        };
        self.seen.on_intersection(&uri, now)
    }

    pub fn poll_seen(&mut self, now: Instant) -> Option<CommitRequest> {
        self.seen.poll(now)
    }

    pub fn apply_commit(&mut self, done: CommitCompleted) {
        let outcome = self.seen.complete(done.generation, done.result, &mut self.unread);
        match outcome {
            CommitOutcome::Applied { newly_read } if newly_read > 0 => {
                tracing::debug!(newly_read, unread = self.unread.value(), "Notifications marked seen");
            }
            CommitOutcome::Failed => self.set_status("Could not sync seen notifications"),
            _ => {}
        }
        // A stale completion must not drop the handle of a newer call
        if outcome != CommitOutcome::Stale {
            self.sync_handle = None;
        }
    }

    pub fn request_mark_all(&mut self) -> Option<MarkAllRequest> {
        let request = self.seen.mark_all_request();
        if request.is_none() {
            self.set_status("Seen sync busy, try again");
        }
        request
    }

    pub fn apply_mark_all(&mut self, done: MarkAllCompleted) {
        match self
            .seen
            .complete_mark_all(done.generation, done.result, &mut self.unread)
        {
            CommitOutcome::Applied { .. } => self.set_status("All notifications marked seen"),
            CommitOutcome::Failed => self.set_status("Mark all seen failed"),
            CommitOutcome::Stale => return,
        }
        self.sync_handle = None;
    }

    pub fn apply_unread_fetch(&mut self, fetched: UnreadCountFetched) {
        match fetched.result {
            Ok(remote) => {
                let shown = self.unread.apply_fetch(remote);
                tracing::debug!(remote, shown, "Unread count fetched");
            }
            Err(e) => tracing::debug!(error = %e, "Unread count fetch failed"),
        }
    }

    /// True once per poll interval. Resets the interval when it fires.
    pub fn unread_poll_due(&mut self, now: Instant) -> bool {
        let Some(interval) = self.unread_poll_interval else {
            return false;
        };
        if now.duration_since(self.last_unread_poll) < interval {
            return false;
        }
        self.last_unread_poll = now;
        true
    }

    /// Read state of a notification: local reconciliation first, then the
    /// server flag.
    pub fn is_notification_read(&self, notification: &Notification) -> bool {
        notification.is_read || self.seen.is_read(&notification.uri)
    }

    // ========================================================================
    // Status
    // ========================================================================

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear status message if expired (older than 3 seconds)
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed().as_secs() >= 3 {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

// ============================================================================
// Resource Cleanup
// ============================================================================

/// Tear the tracker down and abort the in-flight sync call on drop, so no
/// commit outlives the list it belongs to.
impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.sync_handle.take() {
            handle.abort();
            tracing::debug!("Aborted seen sync task on App drop");
        }
        self.seen.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::{FixtureOptions, Page};
    use crate::seen::{Timestamp, TrackerPhase};
    use pretty_assertions::assert_eq;
    use tokio::time::{self, Duration};

    const FIXTURE: &str = r#"{
        "posts": [
            {"uri": "p0", "author": "alice", "text": "first", "indexedAt": "2024-01-01T00:00:09Z"},
            {"uri": "p1", "author": "bob", "text": "tall", "indexedAt": "2024-01-01T00:00:08Z",
             "media": {"aspectRatio": 0.5}},
            {"uri": "p2", "author": "carol", "text": "third", "indexedAt": "2024-01-01T00:00:07Z",
             "likeCount": 4},
            {"uri": "p3", "author": "dave", "text": "fourth", "indexedAt": "2024-01-01T00:00:06Z"}
        ],
        "notifications": [
            {"uri": "n0", "reason": "like", "author": "erin", "indexedAt": "2024-01-01T00:00:05Z"},
            {"uri": "n1", "reason": "follow", "author": "frank", "indexedAt": "2024-01-01T00:00:04Z"},
            {"uri": "n2", "reason": "reply", "author": "grace", "indexedAt": "2024-01-01T00:00:03Z"},
            {"uri": "n3", "reason": "mention", "author": "heidi", "indexedAt": "2024-01-01T00:00:02Z",
             "isRead": true}
        ],
        "unreadCount": 3
    }"#;

    fn test_app() -> App {
        let backend = FixtureService::from_json(FIXTURE, FixtureOptions::default()).unwrap();
        let mut app = App::new(Arc::new(backend), &Config::default(), ViewMode::Double, None);
        app.viewport = Viewport {
            rows: 10,
            column_cells: 30,
        };
        app
    }

    fn posts_page(generation: u64, replace: bool) -> PageLoaded<Item> {
        let items = ["p0", "p1", "p2", "p3"]
            .iter()
            .map(|uri| Item {
                uri: Arc::from(*uri),
                author: Arc::from("a"),
                text: Arc::from("t"),
                indexed_at: Timestamp::default(),
                media: None,
                like_count: 1,
            })
            .collect();
        PageLoaded {
            generation,
            replace,
            result: Ok(Page::last(items)),
        }
    }

    fn notification(uri: &str, ts: &str, is_read: bool) -> Notification {
        Notification {
            uri: Arc::from(uri),
            reason: crate::feed::NotificationReason::Like,
            author: Arc::from("erin"),
            subject: None,
            indexed_at: Timestamp::from(ts),
            is_read,
        }
    }

    fn load_notifications(app: &mut App, items: Vec<Notification>) {
        let request = app.begin_reload(Tab::Notifications);
        app.apply_notifications_loaded(PageLoaded {
            generation: request.generation,
            replace: true,
            result: Ok(Page::last(items)),
        });
    }

    fn three_unread() -> Vec<Notification> {
        vec![
            notification("n0", "2024-01-01T00:00:05Z", false),
            notification("n1", "2024-01-01T00:00:04Z", false),
            notification("n2", "2024-01-01T00:00:03Z", false),
            notification("n3", "2024-01-01T00:00:02Z", false),
        ]
    }

    #[tokio::test]
    async fn test_status_expires_after_3_seconds() {
        let mut app = test_app();
        time::pause();
        app.set_status("Test message");

        time::advance(Duration::from_secs(2)).await;
        app.clear_expired_status();
        assert!(app.status_message.is_some()); // Still present at 2s

        time::advance(Duration::from_secs(2)).await;
        assert!(app.clear_expired_status());
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_context_follows_view() {
        let mut app = test_app();
        assert_eq!(app.context(), Context::Grid);
        app.switch_tab();
        assert_eq!(app.context(), Context::Notifications);
        load_notifications(&mut app, three_unread());
        assert!(app.open_focused());
        assert_eq!(app.context(), Context::Detail);
        app.close_detail();
        assert!(app.open_context_menu());
        assert_eq!(app.context(), Context::Menu);
    }

    #[tokio::test]
    async fn test_posts_replace_then_stale_page_dropped() {
        let mut app = test_app();
        let first = app.begin_reload(Tab::Feed);
        let second = app.begin_reload(Tab::Feed);

        let stale = posts_page(first.generation, true);
        app.apply_posts_loaded(stale);
        assert!(app.posts.is_empty());

        let fresh = posts_page(second.generation, true);
        app.apply_posts_loaded(fresh);
        assert_eq!(app.posts.len(), 4);
        assert_eq!(app.posts.focus(), Some(0));
        assert_eq!(app.posts.partition().column_lengths(), vec![2, 2]);
    }

    #[tokio::test]
    async fn test_failed_load_sets_status() {
        let mut app = test_app();
        let request = app.begin_reload(Tab::Feed);
        app.apply_posts_loaded(PageLoaded {
            generation: request.generation,
            replace: true,
            result: Err("connection refused".into()),
        });
        assert!(!app.posts.pagination.is_loading());
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert!(msg.contains("connection refused"));
    }

    #[tokio::test]
    async fn test_cycle_view_mode_keeps_focus() {
        let mut app = test_app();
        let request = app.begin_reload(Tab::Feed);
        let page = posts_page(request.generation, true);
        app.apply_posts_loaded(page);
        app.posts.set_focus(3);

        app.cycle_view_mode();
        assert_eq!(app.view_mode, ViewMode::Triple);
        assert_eq!(app.posts.columns(), 3);
        assert_eq!(app.posts.focus(), Some(3));

        app.cycle_view_mode();
        assert_eq!(app.view_mode, ViewMode::Single);
        assert_eq!(app.posts.partition().locate(3), Some((0, 3)));
    }

    #[tokio::test]
    async fn test_cycle_view_mode_persists() {
        let dir = std::env::temp_dir().join("feedgrid_app_test_persist");
        std::fs::remove_dir_all(&dir).ok();
        let path = dir.join("state.json");

        let mut app = test_app();
        app.prefs_path = Some(path.clone());
        app.cycle_view_mode();
        assert_eq!(Preferences::load(&path).view_mode, ViewMode::Triple);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_toggle_like_and_revert() {
        let mut app = test_app();
        let request = app.begin_reload(Tab::Feed);
        let page = posts_page(request.generation, true);
        app.apply_posts_loaded(page);

        let (uri, liked) = app.toggle_like().unwrap();
        assert_eq!(&*uri, "p0");
        assert!(liked);
        let post = app.posts.focused().unwrap().clone();
        assert_eq!(app.like_count(&post), 2);

        app.revert_like(&uri, liked);
        assert!(!app.is_liked(&post));
        assert_eq!(app.like_count(&post), 1);
    }

    #[tokio::test]
    async fn test_like_not_available_on_notifications() {
        let mut app = test_app();
        app.switch_tab();
        load_notifications(&mut app, three_unread());
        assert!(app.toggle_like().is_none());
    }

    #[tokio::test]
    async fn test_viewport_drives_commit() {
        time::pause();
        let mut app = test_app();
        app.unread.apply_fetch(0);
        app.unread.apply_fetch(4);
        app.switch_tab();
        load_notifications(&mut app, three_unread());

        // Ten rows show the first two five-row cards
        let now = Instant::now();
        assert_eq!(app.observe_viewport(now), 1);
        assert_eq!(app.seen.phase(), TrackerPhase::CommitPending);
        assert!(app.poll_seen(now + Duration::from_millis(399)).is_none());

        let request = app.poll_seen(now + Duration::from_millis(400)).unwrap();
        assert_eq!(request.up_to.as_str(), "2024-01-01T00:00:05Z");

        app.apply_commit(CommitCompleted {
            generation: request.generation,
            up_to: request.up_to,
            result: Ok(()),
        });
        assert_eq!(app.unread.value(), 0);
        assert!(app.notifications.items().iter().all(|n| app.is_notification_read(n)));
    }

    #[tokio::test]
    async fn test_hidden_list_is_not_observed() {
        let mut app = test_app();
        load_notifications(&mut app, three_unread());
        // Still on the feed tab
        assert_eq!(app.observe_viewport(Instant::now()), 0);
        assert_eq!(app.seen.deadline(), None);
    }

    #[tokio::test]
    async fn test_reload_resets_tracker() {
        let mut app = test_app();
        app.switch_tab();
        load_notifications(&mut app, three_unread());
        app.observe_viewport(Instant::now());
        let before = app.seen.generation();

        load_notifications(&mut app, three_unread());
        assert!(app.seen.generation() > before);
        assert_eq!(app.seen.deadline(), None);
        assert_eq!(app.seen.watched_count(), 4);
    }

    #[tokio::test]
    async fn test_failed_commit_sets_status_and_keeps_state() {
        let mut app = test_app();
        app.switch_tab();
        load_notifications(&mut app, three_unread());
        let now = Instant::now();
        app.observe_viewport(now);
        let request = app.poll_seen(now + Duration::from_secs(1)).unwrap();

        app.apply_commit(CommitCompleted {
            generation: request.generation,
            up_to: request.up_to,
            result: Err("timed out".into()),
        });
        assert!(app.status_message.is_some());
        assert!(app.notifications.items().iter().all(|n| !app.is_notification_read(n)));
    }

    #[tokio::test]
    async fn test_open_notification_marks_it_seen() {
        let mut app = test_app();
        app.switch_tab();
        load_notifications(&mut app, three_unread());
        app.notifications.set_focus(2);
        assert!(app.open_focused());
        assert_eq!(
            app.seen.state().max_timestamp_in_view.as_str(),
            "2024-01-01T00:00:03Z"
        );
        assert_eq!(app.detail_notification().map(|n| &*n.uri), Some("n2"));
    }

    #[tokio::test]
    async fn test_mark_all_clears_counter() {
        let mut app = test_app();
        app.unread.apply_fetch(0);
        app.unread.apply_fetch(4);
        app.switch_tab();
        load_notifications(&mut app, three_unread());

        let request = app.request_mark_all().unwrap();
        assert!(app.request_mark_all().is_none());
        app.apply_mark_all(MarkAllCompleted {
            generation: request.generation,
            result: Ok(()),
        });
        assert_eq!(app.unread.value(), 0);
        assert!(app.notifications.items().iter().all(|n| app.is_notification_read(n)));
    }

    #[tokio::test]
    async fn test_first_unread_fetch_is_suppressed() {
        let mut app = test_app();
        app.apply_unread_fetch(UnreadCountFetched { result: Ok(7) });
        assert_eq!(app.unread.value(), 0);
        app.apply_unread_fetch(UnreadCountFetched { result: Ok(7) });
        assert_eq!(app.unread.value(), 7);
    }

    #[tokio::test]
    async fn test_failed_unread_fetch_does_not_bootstrap() {
        let mut app = test_app();
        app.apply_unread_fetch(UnreadCountFetched {
            result: Err("offline".into()),
        });
        assert!(!app.unread.is_bootstrapped());
        app.apply_unread_fetch(UnreadCountFetched { result: Ok(7) });
        assert_eq!(app.unread.value(), 0);
        app.apply_unread_fetch(UnreadCountFetched { result: Ok(7) });
        assert_eq!(app.unread.value(), 7);
    }

    #[tokio::test]
    async fn test_stale_completion_keeps_live_sync_handle() {
        let mut app = test_app();
        app.switch_tab();
        load_notifications(&mut app, three_unread());
        let start = Instant::now();
        app.mark_seen(0, start);
        let old = app.poll_seen(start + Duration::from_millis(400)).unwrap();

        // Reload while the first commit is in flight, then start a second one
        load_notifications(&mut app, three_unread());
        app.mark_seen(0, start);
        let new = app.poll_seen(start + Duration::from_millis(400)).unwrap();
        assert_ne!(old.generation, new.generation);
        app.sync_handle = Some(tokio::spawn(std::future::pending::<()>()));

        app.apply_commit(CommitCompleted {
            generation: old.generation,
            up_to: old.up_to,
            result: Ok(()),
        });
        assert!(app.sync_handle.is_some());
        app.apply_mark_all(MarkAllCompleted {
            generation: old.generation,
            result: Ok(()),
        });
        assert!(app.sync_handle.is_some());

        app.apply_commit(CommitCompleted {
            generation: new.generation,
            up_to: new.up_to,
            result: Ok(()),
        });
        assert!(app.sync_handle.is_none());
    }

    #[tokio::test]
    async fn test_unread_poll_interval() {
        time::pause();
        let mut app = test_app();
        let start = Instant::now();
        assert!(!app.unread_poll_due(start + Duration::from_secs(29)));
        assert!(app.unread_poll_due(start + Duration::from_secs(30)));
        assert!(!app.unread_poll_due(start + Duration::from_secs(31)));
    }

    #[tokio::test]
    async fn test_move_focus_scrolls_into_view() {
        let mut app = test_app();
        app.switch_tab();
        load_notifications(&mut app, three_unread());
        assert!(app.move_focus(Direction::Down));
        assert!(app.move_focus(Direction::Down));
        // Card 2 spans rows 10..15 in a ten-row viewport
        assert_eq!(app.notifications.scroll_top(), 5);
        assert!(!app.move_focus(Direction::Left));
    }
}
