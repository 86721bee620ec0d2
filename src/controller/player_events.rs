//! Audio end-of-clip listener

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

use crate::model::{AudioDevice, KeyValueStore, PlaybackEvent, SearchBackend};
use super::AppController;

impl<B, S, D> AppController<B, S, D>
where
    B: SearchBackend + 'static,
    S: KeyValueStore + Send + 'static,
    D: AudioDevice + 'static,
{
    /// Feed playback notifications into the model until the app quits or
    /// every sender is gone.
    pub fn start_player_event_listener(
        &self,
        mut events: UnboundedReceiver<PlaybackEvent>,
    ) -> JoinHandle<()> {
        let model = self.model.clone();
        tracing::info!("Starting player event listener");

        tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                let mut model = model.lock().await;

                if model.should_quit() {
                    tracing::debug!("Player event listener shutting down");
                    break;
                }

                tracing::debug!(?event, "Player event");
                model.on_playback_event(event);
            }
        })
    }
}
