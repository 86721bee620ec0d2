//! Key event handling

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::model::{AudioDevice, KeyValueStore, SearchBackend};
use super::AppController;

impl<B, S, D> AppController<B, S, D>
where
    B: SearchBackend + 'static,
    S: KeyValueStore + Send + 'static,
    D: AudioDevice + 'static,
{
    pub async fn handle_key_event(&self, key: KeyEvent) -> Result<()> {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let mut model = self.model.lock().await;

        // Quit works from anywhere
        if ctrl && matches!(key.code, KeyCode::Char('q' | 'Q' | 'c' | 'C')) {
            model.set_should_quit(true);
            return Ok(());
        }

        // Error message blocks everything else until dismissed
        if model.has_error() {
            if matches!(key.code, KeyCode::Esc | KeyCode::Enter) {
                model.clear_error();
            }
            return Ok(());
        }

        if model.is_help_popup_open() {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1)) {
                model.hide_help_popup();
            }
            return Ok(());
        }

        if ctrl {
            drop(model);
            match key.code {
                KeyCode::Char('p' | 'P') => self.toggle_selected_preview().await,
                KeyCode::Char('f' | 'F') => self.toggle_selected_favourite().await,
                KeyCode::Char('s' | 'S') => self.stop_audio().await,
                _ => {}
            }
            return Ok(());
        }

        match key.code {
            KeyCode::Enter => {
                if model.is_loading() {
                    tracing::debug!("Search already in flight, ignoring submit");
                    return Ok(());
                }
                model.stop_playback();
                let query = model.query().to_string();
                drop(model);
                self.spawn_search(query);
            }
            KeyCode::Up => model.select_previous(),
            KeyCode::Down => model.select_next(),
            KeyCode::Tab | KeyCode::BackTab => model.cycle_filter(),
            KeyCode::F(1) => model.show_help_popup(),
            KeyCode::Esc => model.set_query(String::new()),
            KeyCode::Backspace => model.backspace_query(),
            KeyCode::Char(c) => model.append_to_query(c),
            _ => {}
        }

        Ok(())
    }
}
