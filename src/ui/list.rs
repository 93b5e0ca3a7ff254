// Roster list rendering plus shared loading/error/empty helpers.

use chrono::{DateTime, Utc};
use ratatui::{prelude::*, widgets::*};

use ghpeek::state::Roster;

/// Format a timestamp as relative time (e.g., "2h ago").
pub fn format_relative_time(dt: &DateTime<Utc>) -> String {
    let now = Utc::now();
    let duration = now.signed_duration_since(*dt);

    if duration.num_days() > 365 {
        format!("{}y ago", duration.num_days() / 365)
    } else if duration.num_days() > 0 {
        format!("{}d ago", duration.num_days())
    } else if duration.num_hours() > 0 {
        format!("{}h ago", duration.num_hours())
    } else if duration.num_minutes() > 0 {
        format!("{}m ago", duration.num_minutes())
    } else {
        "just now".to_string()
    }
}

/// Render a loading indicator.
pub fn render_loading(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(format!("⏳ {}...", message))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Yellow));
    frame.render_widget(text, area);
}

/// Render an error message.
pub fn render_error(frame: &mut Frame, area: Rect, error: &str) {
    let text = Paragraph::new(format!("⚠ {}", error))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(Color::Red));
    frame.render_widget(text, area);
}

/// Render an empty state message.
pub fn render_empty(frame: &mut Frame, area: Rect, message: &str) {
    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(text, area);
}

/// Render the roster of usernames.
pub fn render_roster(frame: &mut Frame, roster: &mut Roster, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" Students ({}) ", roster.len()))
        .title_style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        );

    if roster.is_empty() {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        render_empty(
            frame,
            inner,
            "No usernames. Pass them as arguments or with --roster FILE",
        );
        return;
    }

    let items: Vec<ListItem> = roster
        .usernames
        .iter()
        .map(|name| {
            ListItem::new(Line::from(vec![
                Span::styled("@", Style::default().fg(Color::DarkGray)),
                Span::raw(name.as_str()),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("> ");

    frame.render_stateful_widget(list, area, &mut roster.list_state);
}
