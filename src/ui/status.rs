// Status bar and rate limit warning panel.

use chrono::Utc;
use ratatui::{prelude::*, widgets::*};

use ghpeek::github::{RateLimitState, StatusLevel};
use ghpeek::state::RateLimitIndicator;

use crate::app::App;

fn level_color(state: &RateLimitState) -> Color {
    match state.status_level() {
        StatusLevel::Critical => Color::Red,
        StatusLevel::Low => Color::Yellow,
        StatusLevel::Ok => Color::Green,
    }
}

/// Draw the key hints, cache stats and quota on one line.
pub fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let mut hints = vec![
        Span::raw(" ↑↓ "),
        Span::styled("Navigate", Style::default().fg(Color::DarkGray)),
        Span::raw("  ↵ "),
        Span::styled("Profile", Style::default().fg(Color::DarkGray)),
        Span::raw("  r "),
        Span::styled("Rate limit", Style::default().fg(Color::DarkGray)),
        Span::raw("  ? "),
        Span::styled("Help", Style::default().fg(Color::DarkGray)),
        Span::raw("  q "),
        Span::styled("Quit", Style::default().fg(Color::DarkGray)),
    ];

    let stats = app.cache_stats();
    hints.push(Span::styled(
        format!("  cache {}/{}", stats.valid, stats.total),
        Style::default().fg(Color::DarkGray),
    ));

    if let Some(state) = &app.indicator.state {
        hints.push(Span::styled(
            format!("  API: {}/{}", state.remaining, state.limit),
            Style::default().fg(level_color(state)),
        ));
    }
    if app.should_defer() {
        hints.push(Span::styled(
            "  quota nearly exhausted",
            Style::default().fg(Color::Red),
        ));
    }
    if let Some(notice) = &app.notice {
        hints.push(Span::styled(
            format!("  {}", notice),
            Style::default().fg(Color::Cyan),
        ));
    }

    frame.render_widget(Paragraph::new(Line::from(hints)), area);
}

/// Draw the low-quota warning in the bottom-right corner.
pub fn draw_rate_limit_panel(frame: &mut Frame, indicator: &RateLimitIndicator) {
    let Some(state) = indicator.state else {
        return;
    };

    let area = frame.area();
    let width = 40.min(area.width);
    let height = 6.min(area.height);
    let panel = Rect::new(
        area.width.saturating_sub(width + 1),
        area.height.saturating_sub(height + 1),
        width,
        height,
    );

    let color = level_color(&state);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(color))
        .title(" GitHub API Status ")
        .title_bottom(Line::from(" x = Hide ").right_aligned());
    let inner = block.inner(panel);

    frame.render_widget(Clear, panel);
    frame.render_widget(block, panel);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

    let remaining = Paragraph::new(format!(
        "{} / {} requests remaining",
        state.remaining, state.limit
    ))
    .style(Style::default().fg(color));
    frame.render_widget(remaining, chunks[0]);

    let now = Utc::now();
    let reset = match state.minutes_until_reset(now) {
        Some(minutes) if state.status_level() != StatusLevel::Ok => {
            format!("Resets in {} min", minutes)
        }
        _ => String::new(),
    };
    let detail = indicator
        .last_error
        .as_deref()
        .map_or(reset, |e| format!("Last check failed: {}", e));
    frame.render_widget(
        Paragraph::new(detail).style(Style::default().fg(Color::DarkGray)),
        chunks[1],
    );

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(color))
        .ratio(state.ratio())
        .label("");
    frame.render_widget(gauge, chunks[2]);

    if let Some(seconds) = indicator.seconds_since_check(now) {
        frame.render_widget(
            Paragraph::new(format!("Checked {}s ago", seconds))
                .style(Style::default().fg(Color::DarkGray)),
            chunks[3],
        );
    }
}
