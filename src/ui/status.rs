use crate::app::{App, Tab, View};
use crate::seen::TrackerPhase;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Paragraph, Tabs},
    Frame,
};
use std::borrow::Cow;

/// Render the tab bar with the unread badge on the notifications tab.
pub fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    let unread = app.unread.value();
    let notifications = if unread > 0 {
        Line::from(vec![
            Span::raw("Notifications "),
            Span::styled(
                format!(" {unread} "),
                Style::default().bg(Color::Red).fg(Color::White),
            ),
        ])
    } else {
        Line::from("Notifications")
    };
    let feed = Line::from(format!("Feed ({})", app.view_mode));

    let selected = match app.tab {
        Tab::Feed => 0,
        Tab::Notifications => 1,
    };
    let tabs = Tabs::new(vec![feed, notifications])
        .select(selected)
        .highlight_style(Style::default().fg(Color::Cyan))
        .divider("|");
    f.render_widget(tabs, area);
}

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // Status bar needs at least 1 char width to be meaningful
    if area.width < 1 || area.height < 1 {
        return;
    }

    let loading = match app.tab {
        Tab::Feed => app.posts.pagination.is_loading(),
        Tab::Notifications => app.notifications.pagination.is_loading(),
    };

    // Use Cow to avoid allocations for static strings and borrowed status messages
    let text: Cow<'_, str> = if let Some((msg, _)) = &app.status_message {
        Cow::Borrowed(msg.as_ref())
    } else if loading {
        Cow::Borrowed("Loading...")
    } else {
        match (app.view, app.tab) {
            (View::Detail { .. }, _) => Cow::Borrowed("[Esc/b]back [L]ike [q]uit"),
            (View::Browse, Tab::Feed) => Cow::Borrowed(
                "[hjkl]move [Enter]open [L]ike [m]enu [v]iew [Tab]notifications [r]efresh [?]help",
            ),
            (View::Browse, Tab::Notifications) => {
                let sync = match app.seen.phase() {
                    TrackerPhase::CommitPending | TrackerPhase::Committing => " (syncing)",
                    _ => "",
                };
                Cow::Owned(format!(
                    "[jk]move [Enter]open [A]ll seen [Tab]feed [r]efresh [?]help{sync}"
                ))
            }
        }
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);

    let paragraph = Paragraph::new(text).style(style);
    f.render_widget(paragraph, area);
}
