//! rodio-backed preview audio
//!
//! Each acquired resource owns a worker thread holding the output stream and
//! the current `Sink`. Clips are downloaded with a blocking HTTP client on
//! that thread, decoded in memory and played. When a sink drains the worker
//! posts [`PlaybackEvent::Ended`] for the bound URL. Opening the output,
//! downloading and decoding all happen off the caller's thread; their
//! failures arrive as [`PlaybackEvent::Failed`].

use std::io::Cursor;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink};
use tokio::sync::mpsc::UnboundedSender;

use crate::model::{AudioDevice, AudioResource, PlaybackEvent};

const TICK_MS: u64 = 200;

#[derive(Debug)]
enum AudioCommand {
    Play,
    Pause,
    Rebind(String),
    Shutdown,
}

/// Hands out rodio preview players on the default output device
pub struct RodioDevice {
    http_timeout: Duration,
}

impl RodioDevice {
    pub fn new(http_timeout: Duration) -> Self {
        Self { http_timeout }
    }
}

impl AudioDevice for RodioDevice {
    type Resource = PreviewPlayer;

    fn acquire(&self, url: &str, events: UnboundedSender<PlaybackEvent>) -> Result<PreviewPlayer> {
        let (command_tx, command_rx) = mpsc::channel::<AudioCommand>();
        let alive = Arc::new(AtomicBool::new(true));

        let url = url.to_string();
        let http_timeout = self.http_timeout;
        let worker_alive = alive.clone();

        thread::Builder::new()
            .name("preview-audio".to_string())
            .spawn(move || {
                match PreviewEngine::new(url.clone(), http_timeout, events.clone()) {
                    Ok(mut engine) => {
                        tracing::info!("Audio output opened");
                        engine.run(command_rx);
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Audio output unavailable");
                        // Report against the clip the caller bound last
                        let url = command_rx
                            .try_iter()
                            .fold(url, |url, command| match command {
                                AudioCommand::Rebind(next) => next,
                                _ => url,
                            });
                        let _ = events.send(PlaybackEvent::Failed {
                            url,
                            reason: format!("{e:#}"),
                        });
                    }
                }
                worker_alive.store(false, Ordering::Release);
            })
            .context("Failed to spawn audio worker")?;

        Ok(PreviewPlayer { command_tx, alive })
    }
}

/// Handle to one audio worker thread
pub struct PreviewPlayer {
    command_tx: Sender<AudioCommand>,
    alive: Arc<AtomicBool>,
}

impl PreviewPlayer {
    /// Best-effort send. If the worker died, the command is dropped.
    fn send(&self, command: AudioCommand) {
        if self.command_tx.send(command).is_err() {
            tracing::warn!("Audio worker is gone, command dropped");
        }
    }
}

impl AudioResource for PreviewPlayer {
    fn play(&mut self) {
        self.send(AudioCommand::Play);
    }

    fn pause(&mut self) {
        self.send(AudioCommand::Pause);
    }

    fn rebind(&mut self, url: &str) {
        self.send(AudioCommand::Rebind(url.to_string()));
    }

    fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }
}

impl Drop for PreviewPlayer {
    fn drop(&mut self) {
        // The worker may be mid-download; it exits once it sees this
        let _ = self.command_tx.send(AudioCommand::Shutdown);
    }
}

/// Worker-side state: owns the output stream, which must stay on this thread
struct PreviewEngine {
    stream: OutputStream,
    http: reqwest::blocking::Client,
    url: String,
    sink: Option<Sink>,
    events: UnboundedSender<PlaybackEvent>,
}

impl PreviewEngine {
    fn new(url: String, http_timeout: Duration, events: UnboundedSender<PlaybackEvent>) -> Result<Self> {
        let mut stream =
            OutputStreamBuilder::open_default_stream().context("Failed to open default audio output")?;
        stream.log_on_drop(false);

        let http = reqwest::blocking::Client::builder()
            .timeout(http_timeout)
            .build()
            .context("Failed to build audio HTTP client")?;

        Ok(Self {
            stream,
            http,
            url,
            sink: None,
            events,
        })
    }

    fn run(&mut self, command_rx: Receiver<AudioCommand>) {
        let tick = Duration::from_millis(TICK_MS);

        loop {
            match command_rx.recv_timeout(tick) {
                Ok(AudioCommand::Shutdown) => break,
                Ok(command) => self.handle_command(command),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }

            self.tick();
        }

        self.unload();
    }

    fn handle_command(&mut self, command: AudioCommand) {
        match command {
            AudioCommand::Play => {
                if let Some(sink) = &self.sink {
                    sink.play();
                } else if let Err(e) = self.load_and_play() {
                    tracing::error!(url = %self.url, error = %e, "Failed to play preview");
                    let _ = self.events.send(PlaybackEvent::Failed {
                        url: self.url.clone(),
                        reason: format!("{e:#}"),
                    });
                }
            }
            AudioCommand::Pause => {
                if let Some(sink) = &self.sink {
                    sink.pause();
                }
            }
            AudioCommand::Rebind(url) => {
                self.unload();
                self.url = url;
            }
            AudioCommand::Shutdown => {}
        }
    }

    fn load_and_play(&mut self) -> Result<()> {
        let bytes = self
            .http
            .get(&self.url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.bytes())
            .with_context(|| format!("Failed to download {}", self.url))?;

        let decoder = Decoder::new(Cursor::new(bytes.to_vec())).context("Failed to decode preview")?;

        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(decoder);
        sink.play();
        self.sink = Some(sink);

        tracing::debug!(url = %self.url, "Preview loaded");
        Ok(())
    }

    fn tick(&mut self) {
        let drained = self
            .sink
            .as_ref()
            .is_some_and(|sink| !sink.is_paused() && sink.empty());

        if drained {
            self.unload();
            let _ = self.events.send(PlaybackEvent::Ended { url: self.url.clone() });
        }
    }

    fn unload(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
    }
}
