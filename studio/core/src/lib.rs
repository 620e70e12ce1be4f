//! Studio Core - Headless Map-Poster Generation for maposter
//!
//! This crate drives stylized map-poster generation end to end, completely
//! independent of any UI framework. It can sit behind a TUI, a web surface,
//! or run headless for testing.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                         Surfaces                            │
//! │   ┌─────────┐   ┌─────────┐   ┌────────────────────────┐   │
//! │   │   TUI   │   │   Web   │   │   Headless / Tests     │   │
//! │   │(ratatui)│   │         │   │                        │   │
//! │   └────┬────┘   └────┬────┘   └───────────┬────────────┘   │
//! │        └─────────────┴────────────────────┘                │
//! │                       │                                    │
//! │                SurfaceEvent (up)                           │
//! │               StudioMessage (down)                         │
//! │                       │                                    │
//! └───────────────────────┼────────────────────────────────────┘
//!                         │
//! ┌───────────────────────┼────────────────────────────────────┐
//! │                 STUDIO CORE                                 │
//! │  ┌────────────────────┴──────────────────────────────────┐ │
//! │  │                     Studio                             │ │
//! │  │  ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌───────────┐ │ │
//! │  │  │  Theme   │ │ Progress │ │ Artifact │ │  Poster   │ │ │
//! │  │  │ Registry │ │  Relay   │ │  Store   │ │  Engine   │ │ │
//! │  │  └──────────┘ └──────────┘ └──────────┘ └───────────┘ │ │
//! │  └───────────────────────────────────────────────────────┘ │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`Studio`]: the session orchestrator managing one generation at a time
//! - [`Generator`]: the pipeline (theme → artifact → resolve → render → decode)
//! - [`StudioMessage`]: messages sent from the studio to surfaces
//! - [`SurfaceEvent`]: events sent from surfaces to the studio
//! - [`PosterEngine`]: boundary to the external geocoding/rendering pipeline
//! - [`ProgressSink`]: capability the engine reports live progress through
//! - [`ArtifactStore`]: scoped temporary files for render output
//!
//! # Quick Start
//!
//! ```ignore
//! use studio_core::{CommandEngine, Studio, SurfaceEvent, load_config};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let (tx, mut rx) = mpsc::channel(100);
//!
//!     let config = load_config()?;
//!     let engine = CommandEngine::from_config(&config);
//!     let mut studio = Studio::new(engine, config, tx);
//!
//!     studio.start().await?;
//!     studio.handle_event(SurfaceEvent::Connected).await?;
//!
//!     loop {
//!         // Forward user actions as SurfaceEvents, drain StudioMessages,
//!         // and poll the in-flight generation for progress.
//!         while let Ok(msg) = rx.try_recv() {
//!             // Fold msg into the display.
//!         }
//!         studio.poll_generation().await;
//!     }
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`artifact`]: temporary render targets with guaranteed cleanup
//! - [`config`]: defaults, `maposter.toml`, `MAPOSTER_*` overrides
//! - [`engine`]: the [`PosterEngine`] trait and the subprocess adapter
//! - [`events`]: events from surfaces to the studio
//! - [`generation`]: requests, the radius domain, the pipeline runner
//! - [`messages`]: messages from the studio to surfaces
//! - [`progress`]: the progress sink capability and the relay
//! - [`studio`]: the session orchestrator
//! - [`themes`]: theme identifiers, definitions, and the registry
//!
//! # No UI Dependencies
//!
//! This crate has **zero** dependencies on ratatui, crossterm, or any other
//! UI framework. It's pure orchestration logic that can be used anywhere.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod artifact;
pub mod config;
pub mod engine;
pub mod events;
pub mod generation;
pub mod messages;
pub mod progress;
pub mod studio;
pub mod themes;

// Re-exports for convenience
pub use artifact::{ArtifactError, ArtifactHandle, ArtifactStore};
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigSource,
    MaposterToml, StudioConfig,
};
pub use engine::{CommandEngine, Coordinates, PosterEngine, RenderError, RenderJob, ResolveError};
pub use events::SurfaceEvent;
pub use generation::{
    GenerationError, GenerationRequest, Generator, InvalidRadius, Poster, Radius,
    MAX_RADIUS_METERS, MIN_RADIUS_METERS, RADIUS_STEP_METERS,
};
pub use messages::{GenerationId, NotifyLevel, PosterPreview, StudioMessage, StudioState};
pub use progress::{GenerationEvent, ProgressRelay, ProgressSink};
pub use studio::Studio;
pub use themes::{ThemeColors, ThemeConfig, ThemeError, ThemeId, ThemeRegistry};
