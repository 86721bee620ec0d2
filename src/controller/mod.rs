//! Controller module - Application logic and event handling
//!
//! This module contains the application controller that handles user input,
//! coordinates between the model and view, and runs searches off the UI loop.
//! It is organized into submodules by responsibility:
//!
//! - `input`: Key event handling
//! - `playback`: Preview and favourite actions on the selected track
//! - `navigation`: Search submission
//! - `player_events`: Audio end-of-clip listener

mod input;
mod playback;
mod navigation;
mod player_events;

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::model::{AppModel, AudioDevice, KeyValueStore, SearchBackend};

pub struct AppController<B, S, D: AudioDevice> {
    pub(crate) model: Arc<Mutex<AppModel<B, S, D>>>,
}

impl<B, S, D: AudioDevice> Clone for AppController<B, S, D> {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
        }
    }
}

impl<B, S, D> AppController<B, S, D>
where
    B: SearchBackend + 'static,
    S: KeyValueStore + Send + 'static,
    D: AudioDevice + 'static,
{
    pub fn new(model: Arc<Mutex<AppModel<B, S, D>>>) -> Self {
        Self { model }
    }
}
