//! Layout rendering (search bar, filter tabs, status line, footer)

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Padding, Paragraph, Tabs},
    Frame,
};

use crate::model::{Filter, ViewState};
use super::utils::truncate_string;

const PLACEHOLDER: &str = "Search artist or song (e.g., Drake, Oasis, Fred again...)";
const TIP: &str = "Tip: search \u{201c}Oasis\u{201d}, \u{201c}The Weeknd\u{201d}, \u{201c}Calvin Harris\u{201d}\u{2026} then favourite tracks.";

pub fn render_top_bar(frame: &mut Frame, area: Rect, state: &ViewState) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),     // Search input
            Constraint::Length(34), // Filter tabs
        ])
        .split(area);

    let (search_text, search_style) = if state.query.is_empty() {
        (PLACEHOLDER, Style::default().fg(Color::DarkGray))
    } else {
        (state.query.as_str(), Style::default().fg(Color::Green))
    };

    let title = if state.loading { " Searching... " } else { " Search (Enter) " };
    let search = Paragraph::new(search_text).style(search_style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .padding(Padding::horizontal(1))
            .border_style(Style::default().fg(Color::Green)),
    );
    frame.render_widget(search, chunks[0]);

    let selected = match state.filter {
        Filter::All => 0,
        Filter::FavouritesOnly => 1,
    };
    let tabs = Tabs::new(vec![
        "All".to_string(),
        format!("Favourites ({})", state.favourites_count),
    ])
    .select(selected)
    .style(Style::default().fg(Color::White))
    .highlight_style(Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Music Finder 🎧 ")
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
    );
    frame.render_widget(tabs, chunks[1]);
}

pub fn render_status_line(frame: &mut Frame, area: Rect, state: &ViewState) {
    let style = if state.loading {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Gray)
    };
    let status = Paragraph::new(format!(" {}", state.status)).style(style);
    frame.render_widget(status, area);
}

pub fn render_footer(frame: &mut Frame, area: Rect, state: &ViewState) {
    let width = area.width.saturating_sub(6) as usize;
    let (text, style) = match &state.now_playing {
        Some(track) => (
            format!("▶ {}", truncate_string(track, width)),
            Style::default().fg(Color::Green),
        ),
        None => ("Nothing playing".to_string(), Style::default().fg(Color::DarkGray)),
    };

    let footer = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Preview ")
            .padding(Padding::horizontal(1))
            .title_bottom(Line::from(format!(" {TIP} | F1 help ")).right_aligned()),
    );
    frame.render_widget(footer, area);
}
