//! View module - UI rendering
//!
//! This module handles all UI rendering for the application using ratatui.
//! It is organized into submodules by component type:
//!
//! - `utils`: Shared helpers (truncation, scrollable lists, centring)
//! - `layout`: Frame structure (search bar, filter tabs, status, footer)
//! - `content`: Result tiles
//! - `overlays`: Modal overlays (error, help)

mod utils;
mod layout;
mod content;
mod overlays;

use ratatui::{
    layout::{Constraint, Direction, Layout},
    Frame,
};

use crate::model::ViewState;

pub struct AppView;

impl AppView {
    pub fn render(frame: &mut Frame, state: &ViewState) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Search bar + filter
                Constraint::Length(1), // Status line
                Constraint::Min(0),    // Results
                Constraint::Length(3), // Now playing
            ])
            .split(frame.area());

        layout::render_top_bar(frame, chunks[0], state);
        layout::render_status_line(frame, chunks[1], state);
        content::render_results(frame, chunks[2], state);
        layout::render_footer(frame, chunks[3], state);

        if let Some(error_msg) = &state.error_message {
            overlays::render_error_notification(frame, error_msg);
        }

        if state.show_help {
            overlays::render_help_popup(frame);
        }
    }
}
