// UI module for rendering the TUI.
// Contains the roster list, profile card popover and rate limit widgets.

mod card;
mod list;
mod status;

use ratatui::{prelude::*, widgets::*};

use crate::app::App;

/// Main draw function that renders the entire UI.
pub fn draw(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Roster
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    list::render_roster(frame, &mut app.roster, chunks[0]);
    status::draw_status_bar(frame, app, chunks[1]);

    if let Some(card) = &app.card {
        card::draw_profile_card(frame, card);
    }

    if app.indicator.visible {
        status::draw_rate_limit_panel(frame, &app.indicator);
    }

    // Help overlay (rendered last, on top of everything)
    if app.show_help {
        draw_help_overlay(frame);
    }
}

/// Draw the help overlay.
fn draw_help_overlay(frame: &mut Frame) {
    let area = frame.area();
    let width = 44.min(area.width);
    let height = 13.min(area.height);
    let help_area = Rect::new(
        area.width.saturating_sub(width) / 2,
        area.height.saturating_sub(height) / 2,
        width,
        height,
    );

    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(format!("  {:<8}", k), Style::default().fg(Color::Yellow)),
            Span::raw(desc),
        ])
    };

    let lines = vec![
        key("↑↓ j/k", "Move through roster"),
        key("Enter", "Show profile card"),
        key("Esc", "Close profile card"),
        key("r", "Check rate limit now"),
        key("x", "Hide rate limit warning"),
        key("c", "Clear cache"),
        key("?", "Toggle help"),
        key("q", "Quit"),
        Line::raw(""),
        Line::styled(
            "  Press any key to close",
            Style::default().fg(Color::DarkGray),
        ),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(" Help ");

    frame.render_widget(Clear, help_area);
    frame.render_widget(Paragraph::new(lines).block(block), help_area);
}
