use crate::app::{App, Viewport};
use crate::feed::Notification;
use crate::util::{strip_control_chars, truncate_to_width, wrap_to_width};
use chrono::Utc;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::grid::draw_columns;
use super::helpers::format_relative_time;

/// Render the notifications list and record its geometry on the app.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    if app.notifications.is_empty() {
        let msg = if app.notifications.pagination.is_loading() {
            "Loading notifications..."
        } else {
            "No notifications"
        };
        f.render_widget(Paragraph::new(msg).alignment(Alignment::Center), area);
        return;
    }

    let width = area.width;
    app.viewport = Viewport {
        rows: area.height as usize,
        column_cells: width,
    };
    app.notifications.scroll_into_view(area.height as usize, width);

    let spans = app.notifications.card_spans(width);
    let focus = app.notifications.focus();
    let app: &App = app;
    let items = app.notifications.items();
    draw_columns(f, area, &spans, app.notifications.scroll_top(), width, |index, _| {
        let n = &items[index];
        notification_card(n, app.is_notification_read(n), focus == Some(index), width)
    });
}

fn notification_card(n: &Notification, read: bool, focused: bool, width: u16) -> Paragraph<'static> {
    let inner = width.saturating_sub(2) as usize;
    let border_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let (marker, headline_style) = if read {
        ("  ", Style::default().fg(Color::Gray))
    } else {
        (
            "● ",
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )
    };

    let headline = format!("@{} {}", n.author, n.reason.verb());
    let age = format_relative_time(&n.indexed_at, Utc::now());
    let headline_width = inner.saturating_sub(age.chars().count() + 3);

    let mut lines = vec![Line::from(vec![
        Span::styled(marker, Style::default().fg(Color::Cyan)),
        Span::styled(
            truncate_to_width(&headline, headline_width).into_owned(),
            headline_style,
        ),
        Span::styled(format!(" {age}"), Style::default().fg(Color::DarkGray)),
    ])];

    let subject = n.subject.as_deref().map(strip_control_chars).unwrap_or_default();
    let mut wrapped = wrap_to_width(&subject, inner, 2);
    wrapped.resize(2, String::new());
    lines.extend(
        wrapped
            .into_iter()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::DarkGray)))),
    );

    Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style),
    )
}
