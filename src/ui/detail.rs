//! Detail overlay: the full text of one post or notification.
use crate::app::App;
use crate::feed::{Item, Notification};
use crate::seen::Timestamp;
use crate::util::strip_control_chars;
use chrono::Utc;
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::helpers::{centered_rect, format_relative_time};

pub fn render(f: &mut Frame, app: &App) {
    let overlay = centered_rect(80, 80, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }

    let (title, lines) = if let Some(post) = app.detail_post() {
        (format!(" @{} ", post.author), post_lines(app, post))
    } else if let Some(n) = app.detail_notification() {
        (
            format!(" {} ", n.reason),
            notification_lines(n, app.is_notification_read(n)),
        )
    } else {
        return;
    };

    f.render_widget(Clear, overlay);
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan))
                .title(title)
                .title_bottom(Line::from(" Esc/b back ").right_aligned()),
        );
    f.render_widget(paragraph, overlay);
}

fn metadata(ts: &Timestamp) -> Line<'static> {
    let age = format_relative_time(ts, Utc::now());
    Line::from(Span::styled(
        format!("{} ({age})", ts),
        Style::default().fg(Color::DarkGray),
    ))
}

fn post_lines(app: &App, post: &Item) -> Vec<Line<'static>> {
    let mut lines = vec![metadata(&post.indexed_at), Line::from("")];
    lines.extend(
        strip_control_chars(&post.text)
            .lines()
            .map(|l| Line::from(l.to_string())),
    );
    lines.push(Line::from(""));

    if let Some(media) = post.media {
        let desc = match media.known_ratio() {
            Some(ratio) => format!("Media: image, aspect ratio {ratio:.2}"),
            None => "Media: attachment of unknown size".to_string(),
        };
        lines.push(Line::from(Span::styled(desc, Style::default().fg(Color::Gray))));
    }

    let liked = app.is_liked(post);
    lines.push(Line::from(vec![
        Span::styled(
            if liked { "♥ " } else { "♡ " },
            Style::default().fg(if liked { Color::Red } else { Color::Gray }),
        ),
        Span::raw(format!("{} likes", app.like_count(post))),
        Span::styled("   L to toggle", Style::default().fg(Color::DarkGray)),
    ]));
    lines
}

fn notification_lines(n: &Notification, read: bool) -> Vec<Line<'static>> {
    let mut lines = vec![
        metadata(&n.indexed_at),
        Line::from(""),
        Line::from(Span::styled(
            format!("@{} {}", n.author, n.reason.verb()),
            Style::default().add_modifier(Modifier::BOLD),
        )),
    ];
    if let Some(subject) = &n.subject {
        lines.push(Line::from(""));
        lines.extend(
            strip_control_chars(subject)
                .lines()
                .map(|l| Line::from(Span::styled(l.to_string(), Style::default().fg(Color::Gray)))),
        );
    }
    lines.push(Line::from(""));
    lines.push(Line::from(if read { "Seen" } else { "Unseen" }));
    lines
}
