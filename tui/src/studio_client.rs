//! Studio Client
//!
//! Thin wrapper around the studio for TUI integration. The studio is
//! embedded directly (no network); this client converts user intent into
//! `SurfaceEvent`s and hands `StudioMessage`s back to the display layer.
//!
//! The TUI carries no orchestration logic of its own: it sends events,
//! drains messages, and renders what the studio says.

use tokio::sync::mpsc;

use studio_core::{
    CommandEngine, GenerationRequest, Studio, StudioConfig, StudioMessage, StudioState,
    SurfaceEvent,
};

/// Client for the embedded studio.
pub struct StudioClient {
    /// The embedded studio instance.
    studio: Studio<CommandEngine>,
    /// Receiver for messages from the studio.
    rx: mpsc::Receiver<StudioMessage>,
}

impl StudioClient {
    /// Create a client with an embedded studio built from `config`.
    pub fn new(config: StudioConfig) -> Self {
        let (tx, rx) = mpsc::channel(100);
        let engine = CommandEngine::from_config(&config);
        let studio = Studio::new(engine, config, tx);
        Self { studio, rx }
    }

    /// Start the studio (engine probe, theme inventory).
    pub async fn start(&mut self) -> anyhow::Result<()> {
        self.studio.start().await
    }

    /// Attach this surface to the studio.
    pub async fn connect(&mut self) -> anyhow::Result<()> {
        self.studio.handle_event(SurfaceEvent::Connected).await
    }

    /// Request a poster.
    pub async fn generate(&mut self, request: GenerationRequest) -> anyhow::Result<()> {
        self.studio
            .handle_event(SurfaceEvent::GenerateRequested { request })
            .await
    }

    /// Save the finished poster to the downloads directory.
    pub async fn save(&mut self) -> anyhow::Result<()> {
        self.studio.handle_event(SurfaceEvent::SaveRequested).await
    }

    /// Ask the studio to end the session.
    pub async fn request_quit(&mut self) -> anyhow::Result<()> {
        self.studio.handle_event(SurfaceEvent::QuitRequested).await
    }

    /// Poll the in-flight generation (must be called regularly).
    pub async fn poll_generation(&mut self) -> bool {
        self.studio.poll_generation().await
    }

    /// Receive all pending messages from the studio (non-blocking).
    pub fn recv_all(&mut self) -> Vec<StudioMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Current studio state.
    pub fn state(&self) -> StudioState {
        self.studio.state()
    }
}
