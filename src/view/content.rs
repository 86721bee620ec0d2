//! Result tiles

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Padding, Paragraph},
    Frame,
};

use crate::model::{Filter, TrackRow, ViewState};
use super::utils::{render_scrollable_list, truncate_string};

pub fn render_results(frame: &mut Frame, area: Rect, state: &ViewState) {
    let title = match state.filter {
        Filter::All => format!(" Results ({}) ", state.rows.len()),
        Filter::FavouritesOnly => format!(" Favourites in results ({}) ", state.rows.len()),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .padding(Padding::horizontal(1))
        .border_style(Style::default().fg(Color::Green));

    if state.rows.is_empty() {
        let hint = if state.loading {
            "Loading..."
        } else if state.filter == Filter::FavouritesOnly {
            "No favourites among these results.\n\nPress Tab to show all results"
        } else {
            "Type in search and press Enter to find music\n\nUse ↑/↓ to select a track\nCtrl+P to preview, Ctrl+F to favourite"
        };
        let content = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(content, area);
        return;
    }

    let content_width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = state
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| render_tile(row, i == state.selected, content_width))
        .collect();

    render_scrollable_list(frame, area, items, state.selected, block);
}

fn render_tile(row: &TrackRow, is_selected: bool, width: usize) -> ListItem<'static> {
    let title_style = if is_selected {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else if row.is_playing {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::White)
    };

    let marker = if is_selected { "> " } else { "  " };
    let star = if row.is_favourite {
        Span::styled("★ ", Style::default().fg(Color::Yellow))
    } else {
        Span::styled("☆ ", Style::default().fg(Color::DarkGray))
    };

    let action = if !row.has_preview {
        Span::styled("No preview available", Style::default().fg(Color::DarkGray))
    } else if row.is_playing {
        Span::styled("[Pause]", Style::default().fg(Color::Green).add_modifier(Modifier::BOLD))
    } else {
        Span::styled("[Play]", Style::default().fg(Color::Cyan))
    };

    let text_width = width.saturating_sub(4);
    let first = Line::from(vec![
        Span::raw(marker),
        star,
        Span::styled(truncate_string(&row.title, text_width), title_style),
    ]);
    let second = Line::from(vec![
        Span::raw("    "),
        Span::styled(
            truncate_string(&format!("{} · {}", row.artist, row.album), text_width.saturating_sub(24)),
            Style::default().fg(Color::Gray),
        ),
        Span::raw("  "),
        action,
    ]);

    ListItem::new(vec![first, second])
}
