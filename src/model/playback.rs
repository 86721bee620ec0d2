//! Preview playback state
//!
//! The [`PlaybackController`] owns at most one audio resource and knows which
//! preview URL, if any, is currently playing. The resource itself is opaque:
//! anything implementing [`AudioDevice`] can hand one out.

use anyhow::Result;
use tokio::sync::mpsc::UnboundedSender;

/// Notifications emitted by an audio resource
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// The clip bound to `url` played to its end
    Ended { url: String },
    /// The clip bound to `url` could not be played
    Failed { url: String, reason: String },
}

/// A single playable audio handle bound to one URL at a time
pub trait AudioResource: Send {
    fn play(&mut self);
    fn pause(&mut self);
    fn rebind(&mut self, url: &str);
    /// Whether the resource can still produce sound
    fn is_alive(&self) -> bool;
}

/// Source of audio resources
pub trait AudioDevice: Send {
    type Resource: AudioResource;

    /// Create a resource bound to `url`. End-of-clip and failure
    /// notifications for the lifetime of the resource are posted on `events`.
    fn acquire(&self, url: &str, events: UnboundedSender<PlaybackEvent>) -> Result<Self::Resource>;
}

pub struct PlaybackController<D: AudioDevice> {
    device: D,
    events: UnboundedSender<PlaybackEvent>,
    resource: Option<D::Resource>,
    current_url: Option<String>,
}

impl<D: AudioDevice> PlaybackController<D> {
    pub fn new(device: D, events: UnboundedSender<PlaybackEvent>) -> Self {
        Self {
            device,
            events,
            resource: None,
            current_url: None,
        }
    }

    pub fn current_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    pub fn is_playing(&self, url: &str) -> bool {
        self.current_url.as_deref() == Some(url)
    }

    /// Play `url`, or pause it if it is the clip already playing.
    ///
    /// Switching clips pauses the previous one before the new one starts.
    /// An empty URL is ignored.
    pub fn toggle(&mut self, url: &str) -> Result<()> {
        if url.is_empty() {
            return Ok(());
        }

        if self.is_playing(url) {
            tracing::debug!(url, "Pausing preview");
            if let Some(resource) = self.resource.as_mut() {
                resource.pause();
            }
            self.current_url = None;
            return Ok(());
        }

        if self.resource.as_ref().is_some_and(|resource| !resource.is_alive()) {
            tracing::warn!("Audio resource stopped, acquiring a new one");
            self.resource = None;
        }

        match self.resource.as_mut() {
            Some(resource) => {
                resource.pause();
                resource.rebind(url);
            }
            None => {
                self.resource = Some(self.device.acquire(url, self.events.clone())?);
            }
        }

        if let Some(resource) = self.resource.as_mut() {
            resource.play();
        }
        self.current_url = Some(url.to_string());
        tracing::info!(url, "Preview playing");
        Ok(())
    }

    /// Pause whatever is loaded and forget it.
    pub fn stop(&mut self) {
        if let Some(resource) = self.resource.as_mut() {
            resource.pause();
        }
        if let Some(url) = self.current_url.take() {
            tracing::debug!(url, "Preview stopped");
        }
    }

    /// Natural end of a clip. Notifications for a clip that is no longer
    /// current are ignored.
    pub fn on_ended(&mut self, url: &str) {
        if self.is_playing(url) {
            tracing::debug!(url, "Preview finished");
            self.current_url = None;
        }
    }

    /// The clip at `url` could not be played. Returns whether it was the
    /// current clip; failures for an older clip are ignored.
    pub fn on_failed(&mut self, url: &str) -> bool {
        if !self.is_playing(url) {
            return false;
        }
        self.current_url = None;
        true
    }

    /// Stop and drop the audio resource.
    pub fn release(&mut self) {
        self.stop();
        self.resource = None;
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Audio device that records every call instead of making sound
    #[derive(Clone, Default)]
    pub struct RecordingDevice {
        pub log: Arc<Mutex<Vec<String>>>,
        pub fail: bool,
        pub dead: Arc<AtomicBool>,
    }

    impl RecordingDevice {
        pub fn calls(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }

        /// Make the resource handed out last report itself stopped
        pub fn kill_resource(&self) {
            self.dead.store(true, Ordering::SeqCst);
        }
    }

    pub struct RecordingResource {
        url: String,
        log: Arc<Mutex<Vec<String>>>,
        dead: Arc<AtomicBool>,
    }

    impl AudioResource for RecordingResource {
        fn play(&mut self) {
            self.log.lock().unwrap().push(format!("play {}", self.url));
        }

        fn pause(&mut self) {
            self.log.lock().unwrap().push(format!("pause {}", self.url));
        }

        fn rebind(&mut self, url: &str) {
            self.log.lock().unwrap().push(format!("rebind {url}"));
            self.url = url.to_string();
        }

        fn is_alive(&self) -> bool {
            !self.dead.load(Ordering::SeqCst)
        }
    }

    impl AudioDevice for RecordingDevice {
        type Resource = RecordingResource;

        fn acquire(&self, url: &str, _events: UnboundedSender<PlaybackEvent>) -> Result<RecordingResource> {
            if self.fail {
                anyhow::bail!("no audio output");
            }
            self.log.lock().unwrap().push(format!("acquire {url}"));
            self.dead.store(false, Ordering::SeqCst);
            Ok(RecordingResource {
                url: url.to_string(),
                log: self.log.clone(),
                dead: self.dead.clone(),
            })
        }
    }
}
