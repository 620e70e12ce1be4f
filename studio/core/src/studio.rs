//! The studio session orchestrator.
//!
//! [`Studio`] is the headless heart of maposter. It is surface-agnostic: it
//! receives [`SurfaceEvent`]s, drives the generation pipeline, and narrates
//! everything back as [`StudioMessage`]s. A terminal UI, a web surface, or a
//! test harness all speak the same two vocabularies.
//!
//! One generation at a time: a request arriving while another is in flight
//! is rejected with a notice, never queued. The studio owns a finished
//! poster until it is saved, replaced by a newer one, or the session ends;
//! whichever happens first releases the temporary artifact behind it.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::StudioConfig;
use crate::engine::PosterEngine;
use crate::events::SurfaceEvent;
use crate::generation::{GenerationRequest, Generator, Poster};
use crate::messages::{GenerationId, NotifyLevel, StudioMessage, StudioState};
use crate::progress::{GenerationEvent, ProgressRelay};

/// Buffered progress snapshots between a generation task and the studio.
const GENERATION_CHANNEL_CAPACITY: usize = 64;

/// The headless session orchestrator.
pub struct Studio<E: PosterEngine> {
    /// Effective configuration.
    config: StudioConfig,
    /// Engine shared with the generation pipeline.
    engine: Arc<E>,
    /// The pipeline runner, cloned into each generation task.
    generator: Generator<E>,
    /// Current operational state.
    state: StudioState,
    /// Channel to the surface.
    tx: mpsc::Sender<StudioMessage>,
    /// Event channel of the in-flight generation, if any.
    generation_rx: Option<mpsc::Receiver<GenerationEvent>>,
    /// Identifier of the in-flight generation, if any.
    generation_id: Option<GenerationId>,
    /// Finished poster awaiting save, replacement, or shutdown.
    finished: Option<Poster>,
    /// Result of the startup health probe.
    engine_ready: bool,
}

impl<E: PosterEngine + 'static> Studio<E> {
    /// Create a studio over the given engine.
    pub fn new(engine: E, config: StudioConfig, tx: mpsc::Sender<StudioMessage>) -> Self {
        let engine = Arc::new(engine);
        let generator = Generator::new(
            Arc::clone(&engine),
            crate::artifact::ArtifactStore::new(&config.scratch_dir),
        );

        Self {
            config,
            engine,
            generator,
            state: StudioState::Initializing,
            tx,
            generation_rx: None,
            generation_id: None,
            finished: None,
            engine_ready: false,
        }
    }

    /// Current operational state.
    #[must_use]
    pub fn state(&self) -> StudioState {
        self.state
    }

    /// Whether a generation is in flight.
    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.generation_rx.is_some()
    }

    /// Whether a finished poster is waiting to be saved.
    #[must_use]
    pub fn has_unsaved_poster(&self) -> bool {
        self.finished.is_some()
    }

    /// Start the session: probe the engine, load the theme inventory.
    ///
    /// An unreachable engine is a warning, not a failure; the first
    /// generation will report the real problem. A failing theme inventory is
    /// reported the same way and leaves the selector empty.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.set_state(StudioState::Initializing).await;

        let ready = self.engine.health_check().await;
        self.engine_ready = ready;
        if !ready {
            self.notify(
                NotifyLevel::Warning,
                "Poster engine not reachable - generation may fail",
            )
            .await;
        }

        self.send(StudioMessage::EngineInfo {
            engine: self.engine.name().to_string(),
            ready,
        })
        .await;

        self.send_theme_list().await;
        self.set_state(StudioState::Ready).await;

        Ok(())
    }

    /// Handle an event from the surface.
    pub async fn handle_event(&mut self, event: SurfaceEvent) -> anyhow::Result<()> {
        match event {
            SurfaceEvent::Connected => {
                // A (re)attaching surface gets the current session picture.
                self.send(StudioMessage::State { state: self.state }).await;
                self.send(StudioMessage::EngineInfo {
                    engine: self.engine.name().to_string(),
                    ready: self.engine_ready,
                })
                .await;
                self.send_theme_list().await;
            }

            SurfaceEvent::GenerateRequested { request } => {
                self.handle_generate(request).await;
            }

            SurfaceEvent::SaveRequested => {
                self.handle_save().await;
            }

            SurfaceEvent::QuitRequested => {
                self.shutdown().await;
            }
        }

        Ok(())
    }

    /// Start one generation, or reject it while another is in flight.
    async fn handle_generate(&mut self, request: GenerationRequest) {
        if self.generation_rx.is_some() {
            tracing::warn!("Rejected generation request while another is in flight");
            self.notify(
                NotifyLevel::Warning,
                "A poster is already being generated - wait for it to finish",
            )
            .await;
            return;
        }

        // A new request replaces an unsaved poster; its artifact goes first.
        if let Some(mut poster) = self.finished.take() {
            tracing::debug!("Releasing unsaved poster replaced by a new request");
            poster.handle.release();
        }

        let id = GenerationId::new();
        tracing::info!(id = %id, city = %request.city, "Generation accepted");

        self.set_state(StudioState::Generating).await;
        self.send(StudioMessage::GenerationStarted {
            id: id.clone(),
            request: request.clone(),
        })
        .await;

        let (events_tx, events_rx) = mpsc::channel(GENERATION_CHANNEL_CAPACITY);
        self.generation_rx = Some(events_rx);
        self.generation_id = Some(id);

        let generator = self.generator.clone();
        tokio::spawn(async move {
            let relay = ProgressRelay::new(events_tx.clone());
            let outcome = generator.generate(&request, &relay).await;
            if events_tx
                .send(GenerationEvent::Finished { outcome })
                .await
                .is_err()
            {
                // The studio is gone; Poster's drop backstop reclaims the
                // artifact on the outcome we just failed to deliver.
                tracing::warn!("Generation finished after its session ended");
            }
        });
    }

    /// Write the finished poster to the downloads directory and release it.
    async fn handle_save(&mut self) {
        let Some(mut poster) = self.finished.take() else {
            self.notify(NotifyLevel::Info, "No poster to save yet").await;
            return;
        };

        let path = self.config.downloads_dir.join(poster.request.download_file_name());
        match write_poster(&self.config.downloads_dir, &path, &poster.bytes).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Poster saved");
                poster.handle.release();
                self.send(StudioMessage::Saved { path: path.clone() }).await;
                self.notify(
                    NotifyLevel::Success,
                    &format!("Saved to {}", path.display()),
                )
                .await;
            }
            Err(e) => {
                tracing::error!(path = %path.display(), "Failed to save poster: {}", e);
                self.notify(
                    NotifyLevel::Error,
                    &format!("Failed to save poster: {e}"),
                )
                .await;
                // Keep the poster; the user may retry with a fixed target.
                self.finished = Some(poster);
            }
        }
    }

    /// Poll the in-flight generation for progress and its final outcome.
    ///
    /// Call this regularly from the surface loop. Returns true if there was
    /// activity.
    pub async fn poll_generation(&mut self) -> bool {
        // Collect first to keep the receiver borrow out of the handlers.
        let events: Vec<GenerationEvent> = {
            let Some(rx) = self.generation_rx.as_mut() else {
                return false;
            };

            let mut collected = Vec::new();
            while let Ok(event) = rx.try_recv() {
                let is_terminal = matches!(event, GenerationEvent::Finished { .. });
                collected.push(event);
                if is_terminal {
                    break;
                }
            }
            collected
        };

        if events.is_empty() {
            return false;
        }

        for event in events {
            match event {
                GenerationEvent::Progress { transcript } => {
                    if let Some(id) = self.generation_id.clone() {
                        self.send(StudioMessage::Progress { id, transcript }).await;
                    }
                }

                GenerationEvent::Finished { outcome } => {
                    self.generation_rx = None;
                    let id = self.generation_id.take().unwrap_or_default();

                    match outcome {
                        Ok(poster) => {
                            tracing::info!(id = %id, "Generation succeeded");
                            let preview = poster.preview();
                            let file_name = poster.request.download_file_name();
                            self.finished = Some(poster);
                            self.send(StudioMessage::PosterReady {
                                id,
                                preview,
                                file_name,
                            })
                            .await;
                            self.notify(NotifyLevel::Success, "Poster generated!").await;
                        }
                        Err(e) => {
                            tracing::warn!(id = %id, "Generation failed: {}", e);
                            self.send(StudioMessage::GenerationFailed {
                                id,
                                error: format!("Error generating poster: {e}"),
                            })
                            .await;
                        }
                    }

                    self.set_state(StudioState::Ready).await;
                }
            }
        }

        true
    }

    /// End the session, releasing anything unsaved.
    async fn shutdown(&mut self) {
        self.set_state(StudioState::ShuttingDown).await;

        if let Some(mut poster) = self.finished.take() {
            tracing::debug!("Releasing unsaved poster on shutdown");
            poster.handle.release();
        }

        self.send(StudioMessage::Quit {
            message: Some("Hang it somewhere nice!".to_string()),
        })
        .await;
    }

    /// Load and announce the theme inventory.
    async fn send_theme_list(&mut self) {
        match self.generator.registry().list().await {
            Ok(themes) => {
                let default = if themes.contains(&self.config.default_theme) {
                    Some(self.config.default_theme.clone())
                } else {
                    themes.first().cloned()
                };
                self.send(StudioMessage::ThemeList { themes, default }).await;
            }
            Err(e) => {
                tracing::error!("Failed to list themes: {}", e);
                self.notify(NotifyLevel::Error, &format!("Failed to list themes: {e}"))
                    .await;
                self.send(StudioMessage::ThemeList {
                    themes: Vec::new(),
                    default: None,
                })
                .await;
            }
        }
    }

    /// Set state and notify the surface.
    async fn set_state(&mut self, state: StudioState) {
        self.state = state;
        self.send(StudioMessage::State { state }).await;
    }

    /// Send a notification.
    async fn notify(&self, level: NotifyLevel, message: &str) {
        self.send(StudioMessage::Notify {
            level,
            message: message.to_string(),
        })
        .await;
    }

    /// Send a message to the surface.
    async fn send(&self, msg: StudioMessage) {
        if let Err(e) = self.tx.send(msg).await {
            tracing::warn!("Failed to send message to surface: {}", e);
        }
    }
}

/// Write poster bytes under the downloads directory, creating it if needed.
async fn write_poster(dir: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    tokio::fs::create_dir_all(dir).await?;
    tokio::fs::write(path, bytes).await
}
