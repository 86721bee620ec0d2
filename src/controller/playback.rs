//! Preview and favourite actions on the selected track

use crate::model::{AudioDevice, KeyValueStore, SearchBackend};
use super::AppController;

impl<B, S, D> AppController<B, S, D>
where
    B: SearchBackend + 'static,
    S: KeyValueStore + Send + 'static,
    D: AudioDevice + 'static,
{
    pub async fn toggle_selected_preview(&self) {
        let mut model = self.model.lock().await;
        let Some(track) = model.selected_track() else {
            return;
        };

        if track.preview().is_none() {
            tracing::debug!(track_id = track.track_id, "Track has no preview");
            return;
        }

        model.toggle_preview(track.preview());
    }

    pub async fn toggle_selected_favourite(&self) {
        let mut model = self.model.lock().await;
        if let Some(track) = model.selected_track() {
            model.toggle_favourite(&track);
        }
    }

    pub async fn stop_audio(&self) {
        self.model.lock().await.stop_playback();
    }
}
