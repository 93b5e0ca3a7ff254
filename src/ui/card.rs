// Profile card popover.
// Shows a user's profile and top repositories on top of the roster.

use ratatui::{prelude::*, widgets::*};

use ghpeek::github::{ProfileLookup, RepoSummary};
use ghpeek::state::{LoadingState, ProfileCard};

use super::list::{format_relative_time, render_error, render_loading};

/// Draw the profile card centered on screen.
pub fn draw_profile_card(frame: &mut Frame, card: &ProfileCard) {
    let area = frame.area();

    let card_width = 64.min(area.width);
    let card_height = 20.min(area.height);
    let card_x = (area.width.saturating_sub(card_width)) / 2;
    let card_y = (area.height.saturating_sub(card_height)) / 2;
    let card_area = Rect::new(card_x, card_y, card_width, card_height);

    // Clear the area behind the card
    frame.render_widget(Clear, card_area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan))
        .title(format!(" @{} ", card.username))
        .title_bottom(Line::from(" Esc = Close ").right_aligned());
    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    match &card.data {
        LoadingState::Idle => {}
        LoadingState::Loading => render_loading(frame, centered_row(inner), "Loading"),
        LoadingState::Error(e) => render_error(frame, centered_row(inner), e),
        LoadingState::Loaded(lookup) => {
            let text = Paragraph::new(lookup_lines(lookup)).wrap(Wrap { trim: false });
            frame.render_widget(text, inner);
        }
    }
}

fn centered_row(area: Rect) -> Rect {
    let y = area.y + area.height.saturating_sub(1) / 2;
    Rect::new(area.x, y, area.width, area.height.min(2))
}

fn lookup_lines(lookup: &ProfileLookup) -> Vec<Line<'_>> {
    let profile = &lookup.profile;
    let dim = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                profile.display_name(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  @{}", profile.login), dim),
        ]),
        Line::styled(profile.html_url.as_str(), Style::default().fg(Color::Blue)),
    ];

    if let Some(bio) = profile.bio.as_deref().filter(|b| !b.trim().is_empty()) {
        lines.push(Line::raw(""));
        lines.push(Line::raw(bio.trim()));
    }

    lines.push(Line::raw(""));
    lines.push(Line::from(vec![
        Span::styled(profile.public_repos.to_string(), Style::default().fg(Color::Yellow)),
        Span::styled(" repos   ", dim),
        Span::styled(profile.followers.to_string(), Style::default().fg(Color::Yellow)),
        Span::styled(" followers   ", dim),
        Span::styled(profile.following.to_string(), Style::default().fg(Color::Yellow)),
        Span::styled(" following", dim),
    ]));
    lines.push(Line::styled(
        format!("Joined {}", profile.created_at.format("%B %Y")),
        dim,
    ));

    if !lookup.repos.is_empty() {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            "Top repositories",
            Style::default().add_modifier(Modifier::BOLD),
        ));
        lines.extend(lookup.repos.iter().map(repo_line));
    }

    if let Some(warning) = &lookup.repos_warning {
        lines.push(Line::raw(""));
        lines.push(Line::styled(
            format!("Repositories unavailable: {}", warning),
            Style::default().fg(Color::Yellow),
        ));
    }

    lines
}

fn repo_line(repo: &RepoSummary) -> Line<'_> {
    let dim = Style::default().fg(Color::DarkGray);
    let mut spans = vec![
        Span::raw("  "),
        Span::styled(repo.name.as_str(), Style::default().fg(Color::Cyan)),
        Span::styled(format!("  ★ {}", repo.stargazers_count), dim),
        Span::styled(format!("  ⑂ {}", repo.forks_count), dim),
        Span::styled(format!("  👁 {}", repo.watchers_count), dim),
    ];
    if let Some(language) = &repo.language {
        spans.push(Span::styled(
            format!("  {}", language),
            Style::default().fg(Color::Magenta),
        ));
    }
    if let Some(updated) = &repo.updated_at {
        spans.push(Span::styled(format!("  {}", format_relative_time(updated)), dim));
    }
    Line::from(spans)
}
