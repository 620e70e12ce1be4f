//! Poster engine abstraction.
//!
//! Everything the pipeline does not do itself lives behind [`PosterEngine`]:
//! geocoding, map data retrieval, theme-aware rasterization. The shipped
//! implementation shells out to an engine executable; tests substitute
//! stubs that succeed or fail on demand.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

use crate::generation::Radius;
use crate::progress::ProgressSink;
use crate::themes::{ThemeConfig, ThemeError, ThemeId};

// ============================================================================
// Wire Types
// ============================================================================

/// A resolved location.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees.
    pub lat: f64,
    /// Longitude in decimal degrees.
    pub lon: f64,
}

/// Inputs for one render invocation.
///
/// Everything the engine needs arrives here explicitly; there is no ambient
/// "current theme" or "current output" anywhere in the process.
#[derive(Debug, Clone)]
pub struct RenderJob {
    /// City printed on the poster and used for map centering.
    pub city: String,
    /// Country that disambiguated the city.
    pub country: String,
    /// Resolved map center.
    pub coordinates: Coordinates,
    /// Half-width of the rendered area.
    pub radius: Radius,
    /// Theme threaded in from the registry.
    pub theme: ThemeConfig,
    /// Where the engine must write the PNG.
    pub output: PathBuf,
}

// ============================================================================
// Errors
// ============================================================================

/// Failures while resolving a location.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// The engine process could not be started.
    #[error("Failed to run poster engine: {0}")]
    Spawn(#[source] std::io::Error),

    /// The engine ran and reported failure.
    #[error("Coordinate resolution failed ({status}): {detail}")]
    Engine {
        /// Exit status, -1 when killed by a signal.
        status: i32,
        /// Last diagnostic line the engine printed.
        detail: String,
    },

    /// The engine exited cleanly but produced no usable coordinates.
    #[error("Engine returned no usable coordinates: {0}")]
    Output(String),
}

/// Failures while rendering a poster.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The engine process could not be started.
    #[error("Failed to run poster engine: {0}")]
    Spawn(#[source] std::io::Error),

    /// The engine ran and reported failure.
    #[error("Render failed ({status}): {detail}")]
    Engine {
        /// Exit status, -1 when killed by a signal.
        status: i32,
        /// Last diagnostic line the engine printed.
        detail: String,
    },

    /// The engine exited cleanly but wrote no output file.
    #[error("Engine exited cleanly but wrote nothing to {path}")]
    MissingArtifact {
        /// Output path that stayed empty.
        path: PathBuf,
    },
}

// ============================================================================
// Engine Trait
// ============================================================================

/// Boundary to the external poster pipeline.
///
/// Implementations are shared across tasks, so every method takes `&self`.
/// Progress-producing calls receive the request's [`ProgressSink`]; whatever
/// the engine prints while working belongs to exactly one request.
#[async_trait]
pub trait PosterEngine: Send + Sync {
    /// Engine identifier for logs and the status line.
    fn name(&self) -> &str;

    /// Cheap reachability probe. Failure is advisory, not fatal.
    async fn health_check(&self) -> bool;

    /// Enumerate available theme identifiers, sorted.
    async fn list_themes(&self) -> Result<Vec<ThemeId>, ThemeError>;

    /// Load one theme's definition.
    async fn load_theme(&self, id: &ThemeId) -> Result<ThemeConfig, ThemeError>;

    /// Resolve a city/country pair to map coordinates.
    ///
    /// May emit textual progress through `sink` while working.
    async fn resolve_coordinates(
        &self,
        city: &str,
        country: &str,
        sink: &dyn ProgressSink,
    ) -> Result<Coordinates, ResolveError>;

    /// Render a poster to `job.output`.
    ///
    /// May emit arbitrary textual progress through `sink`. On success the
    /// output file exists and holds the finished PNG.
    async fn render(&self, job: &RenderJob, sink: &dyn ProgressSink) -> Result<(), RenderError>;
}
