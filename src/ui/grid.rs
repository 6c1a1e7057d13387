//! Masonry grid widget for the feed tab.
use crate::app::{App, Viewport};
use crate::feed::Item;
use crate::layout::Media;
use crate::seen::viewport::Span as RowSpan;
use crate::util::{strip_control_chars, truncate_to_width, wrap_to_width};
use chrono::Utc;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
    Frame,
};

use super::helpers::{blit, format_relative_time};

/// Horizontal gap between columns, in cells.
const COLUMN_GAP: u16 = 1;

/// Width of each column when `area` is split into `columns`.
pub(super) fn column_cells(area: Rect, columns: usize) -> u16 {
    let columns = columns.max(1) as u16;
    area.width.saturating_sub(COLUMN_GAP * (columns - 1)) / columns
}

/// Draw every card overlapping the viewport.
///
/// `spans` holds each column's cards top to bottom; `card` builds the widget
/// for one original index at the given size.
pub(super) fn draw_columns<W, F>(
    f: &mut Frame,
    area: Rect,
    spans: &[Vec<(usize, RowSpan)>],
    scroll_top: usize,
    width: u16,
    mut card: F,
) where
    W: Widget,
    F: FnMut(usize, u16) -> W,
{
    let bottom = scroll_top + area.height as usize;
    for (column, cards) in spans.iter().enumerate() {
        let x = area.x + column as u16 * (width + COLUMN_GAP);
        for &(index, span) in cards {
            if span.bottom() <= scroll_top || span.top >= bottom {
                continue;
            }
            let height = span.height.min(u16::MAX as usize) as u16;
            let mut buf = Buffer::empty(Rect::new(0, 0, width, height));
            card(index, height).render(buf.area, &mut buf);

            let skip = scroll_top.saturating_sub(span.top) as u16;
            let y = area.y + span.top.saturating_sub(scroll_top) as u16;
            let visible = Rect::new(x, y, width, area.bottom().saturating_sub(y));
            blit(&buf, skip, f.buffer_mut(), visible);
        }
    }
}

/// Render the feed grid and record its geometry on the app.
pub fn render(f: &mut Frame, app: &mut App, area: Rect) {
    if area.width < 1 || area.height < 1 {
        return;
    }

    if app.posts.is_empty() {
        let msg = if app.posts.pagination.is_loading() {
            "Loading feed..."
        } else {
            "No posts. Press r to reload."
        };
        f.render_widget(Paragraph::new(msg).alignment(Alignment::Center), area);
        return;
    }

    let width = column_cells(area, app.posts.columns());
    app.viewport = Viewport {
        rows: area.height as usize,
        column_cells: width,
    };
    app.posts.scroll_into_view(area.height as usize, width);

    let spans = app.posts.card_spans(width);
    let focus = app.posts.focus();
    let app: &App = app;
    let items = app.posts.items();
    draw_columns(f, area, &spans, app.posts.scroll_top(), width, |index, height| {
        post_card(app, &items[index], focus == Some(index), width, height)
    });
}

/// A post card: author and likes on the border, age and two lines of text
/// inside, then the media block.
fn post_card<'a>(app: &App, post: &'a Item, focused: bool, width: u16, height: u16) -> Paragraph<'a> {
    let inner = width.saturating_sub(2) as usize;
    let border_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let liked = app.is_liked(post);
    let likes = Span::styled(
        format!(" {} {} ", if liked { "♥" } else { "♡" }, app.like_count(post)),
        if liked {
            Style::default().fg(Color::Red)
        } else {
            Style::default().fg(Color::Gray)
        },
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(format!(" @{} ", truncate_to_width(&post.author, inner.saturating_sub(3))))
        .title_bottom(Line::from(likes).right_aligned());

    let mut lines = vec![Line::from(Span::styled(
        format_relative_time(&post.indexed_at, Utc::now()),
        Style::default().fg(Color::DarkGray),
    ))];
    let text = strip_control_chars(&post.text);
    let mut wrapped = wrap_to_width(&text, inner, 2);
    wrapped.resize(2, String::new());
    lines.extend(wrapped.into_iter().map(Line::from));

    let media_rows = (height as usize).saturating_sub(5);
    if let Some(media) = post.media {
        lines.extend(media_lines(media, inner, media_rows));
    }

    Paragraph::new(lines).block(block)
}

fn media_lines(media: Media, width: usize, rows: usize) -> Vec<Line<'static>> {
    let label = match media.known_ratio() {
        Some(ratio) => format!("[image {ratio:.2}:1]"),
        None => "[media]".to_string(),
    };
    let fill = Style::default().fg(Color::DarkGray);
    (0..rows)
        .map(|row| {
            if row == rows / 2 {
                let label = truncate_to_width(&label, width).into_owned();
                let pad = width.saturating_sub(label.chars().count());
                let left = "░".repeat(pad / 2);
                let right = "░".repeat(pad - pad / 2);
                Line::from(vec![
                    Span::styled(left, fill),
                    Span::raw(label),
                    Span::styled(right, fill),
                ])
            } else {
                Line::from(Span::styled("░".repeat(width), fill))
            }
        })
        .collect()
}
