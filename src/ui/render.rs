//! Render functions for the TUI.
//!
//! Draws the tab bar, the active list, and the status bar, then any overlays
//! (detail, context menu, help) on top.

use crate::app::{App, Tab, View, CONTEXT_MENU_ITEMS};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{detail, grid, help, notifications, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    status::render_tabs(f, app, chunks[0]);
    match app.tab {
        Tab::Feed => grid::render(f, app, chunks[1]),
        Tab::Notifications => notifications::render(f, app, chunks[1]),
    }
    status::render(f, app, chunks[2]);

    if matches!(app.view, View::Detail { .. }) {
        detail::render(f, app);
    }

    if app.context_menu.is_some() {
        render_context_menu_overlay(f, app);
    }

    // Help goes over everything else
    if app.show_help {
        help::render(f, app);
    }
}

/// Render the context menu overlay centered on screen.
fn render_context_menu_overlay(f: &mut Frame, app: &App) {
    let area = f.area();

    let Some(menu) = &app.context_menu else {
        return;
    };

    let items: String = CONTEXT_MENU_ITEMS
        .iter()
        .enumerate()
        .map(|(i, item)| {
            if i == menu.selected_item {
                format!("> {item}")
            } else {
                format!("  {item}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n");
    let text = format!("{items}\n\n(Enter) Select  (Esc) Cancel");

    let content_lines = text.lines().count() as u16 + 2; // +2 for borders
    let width = 40u16.min(area.width.saturating_sub(4));
    let height = content_lines.min(area.height.saturating_sub(4));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    let overlay = Rect::new(x, y, width, height);

    if overlay.width < 20 || overlay.height < 5 {
        return;
    }

    f.render_widget(Clear, overlay);

    let paragraph = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" {} ", menu.title)),
    );

    f.render_widget(paragraph, overlay);
}
