//! The generation pipeline.
//!
//! [`Generator::generate`] runs one request end to end: load the theme,
//! allocate a scoped render target, resolve coordinates, render, decode.
//! Progress flows through the caller's [`ProgressSink`]; the temporary file
//! is deleted exactly once on every path, immediately on failure or after
//! the returned [`Poster`] has been consumed.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::artifact::{ArtifactError, ArtifactHandle, ArtifactStore};
use crate::engine::{PosterEngine, RenderJob};
use crate::messages::PosterPreview;
use crate::progress::ProgressSink;
use crate::themes::{ThemeError, ThemeId, ThemeRegistry};

/// Smallest selectable radius in meters.
pub const MIN_RADIUS_METERS: u32 = 1_000;
/// Largest selectable radius in meters.
pub const MAX_RADIUS_METERS: u32 = 20_000;
/// Radius slider step in meters.
pub const RADIUS_STEP_METERS: u32 = 1_000;

// ============================================================================
// Radius
// ============================================================================

/// Validated map radius in meters.
///
/// The slider domain runs from [`MIN_RADIUS_METERS`] to
/// [`MAX_RADIUS_METERS`] in steps of [`RADIUS_STEP_METERS`]. Construction
/// outside that domain is rejected, so a [`GenerationRequest`] cannot carry
/// an invalid radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Radius(u32);

/// A radius value outside the slider domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Radius must be {MIN_RADIUS_METERS}..={MAX_RADIUS_METERS} meters in steps of {RADIUS_STEP_METERS}, got {meters}")]
pub struct InvalidRadius {
    /// The value that was rejected.
    pub meters: u32,
}

impl Radius {
    /// Validate a raw meter count.
    pub fn try_new(meters: u32) -> Result<Self, InvalidRadius> {
        if meters < MIN_RADIUS_METERS
            || meters > MAX_RADIUS_METERS
            || meters % RADIUS_STEP_METERS != 0
        {
            return Err(InvalidRadius { meters });
        }
        Ok(Self(meters))
    }

    /// The radius in meters.
    #[must_use]
    pub const fn meters(self) -> u32 {
        self.0
    }

    /// One slider step up, clamped to the maximum.
    #[must_use]
    pub fn step_up(self) -> Self {
        Self((self.0 + RADIUS_STEP_METERS).min(MAX_RADIUS_METERS))
    }

    /// One slider step down, clamped to the minimum.
    #[must_use]
    pub fn step_down(self) -> Self {
        Self(self.0.saturating_sub(RADIUS_STEP_METERS).max(MIN_RADIUS_METERS))
    }
}

impl Default for Radius {
    /// The slider's initial position.
    fn default() -> Self {
        Self(MIN_RADIUS_METERS)
    }
}

impl fmt::Display for Radius {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Requests
// ============================================================================

/// One user request for a poster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// City to render.
    pub city: String,
    /// Country disambiguating the city.
    pub country: String,
    /// Theme to draw with.
    pub theme: ThemeId,
    /// Map radius.
    pub radius: Radius,
}

impl GenerationRequest {
    /// Build a request.
    pub fn new(
        city: impl Into<String>,
        country: impl Into<String>,
        theme: ThemeId,
        radius: Radius,
    ) -> Self {
        Self {
            city: city.into(),
            country: country.into(),
            theme,
            radius,
        }
    }

    /// Suggested filename for saving the poster:
    /// `{city}_{radius}_{theme}.png`, spaces in the city replaced with
    /// underscores.
    #[must_use]
    pub fn download_file_name(&self) -> String {
        format!(
            "{}_{}_{}.png",
            self.city.replace(' ', "_"),
            self.radius.meters(),
            self.theme
        )
    }
}

// ============================================================================
// Results
// ============================================================================

/// A finished poster, the terminal result of one successful generation.
///
/// Owns the artifact handle; whoever consumes the poster releases it. The
/// save flow does, and so does replacement by a newer poster.
#[derive(Debug)]
pub struct Poster {
    /// The request this poster answers.
    pub request: GenerationRequest,
    /// Decoded image, for previews and dimension queries.
    pub image: image::DynamicImage,
    /// Raw PNG bytes exactly as the engine wrote them.
    pub bytes: Vec<u8>,
    /// Ownership of the temporary file backing `bytes`.
    pub handle: ArtifactHandle,
}

impl Poster {
    /// Pixel width of the rendered poster.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Pixel height of the rendered poster.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// RGBA pixels for surfaces without an image stack of their own.
    #[must_use]
    pub fn preview(&self) -> PosterPreview {
        let rgba = self.image.to_rgba8();
        PosterPreview {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        }
    }
}

/// Everything that can end a generation without a poster.
///
/// A closed set: the session boundary matches on this to build the
/// user-facing message and never needs a catch-all beyond [`Failure`].
///
/// [`Failure`]: GenerationError::Failure
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The requested theme could not be loaded.
    #[error(transparent)]
    ThemeLoad(#[from] ThemeError),

    /// The location could not be resolved.
    #[error(transparent)]
    CoordinateResolution(#[from] crate::engine::ResolveError),

    /// The engine failed while drawing.
    #[error(transparent)]
    Render(#[from] crate::engine::RenderError),

    /// Anything else: artifact I/O, image decoding.
    #[error(transparent)]
    Failure(#[from] anyhow::Error),
}

impl From<ArtifactError> for GenerationError {
    fn from(err: ArtifactError) -> Self {
        Self::Failure(err.into())
    }
}

// ============================================================================
// Generator
// ============================================================================

/// Runs generation requests end to end.
pub struct Generator<E> {
    engine: Arc<E>,
    registry: ThemeRegistry<E>,
    store: ArtifactStore,
}

impl<E: PosterEngine> Generator<E> {
    /// Create a generator over the given engine and artifact store.
    pub fn new(engine: Arc<E>, store: ArtifactStore) -> Self {
        let registry = ThemeRegistry::new(Arc::clone(&engine));
        Self {
            engine,
            registry,
            store,
        }
    }

    /// The registry this generator loads themes from.
    #[must_use]
    pub fn registry(&self) -> &ThemeRegistry<E> {
        &self.registry
    }

    /// Run one request to completion.
    ///
    /// Steps, in order: load the theme, allocate the render target, resolve
    /// coordinates, render, read and decode the output. Progress from the
    /// resolve and render steps flows through `sink`. Every failure path
    /// deletes the allocated file before returning; on success the handle
    /// rides inside the returned [`Poster`] until its consumer releases it.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
        sink: &dyn ProgressSink,
    ) -> Result<Poster, GenerationError> {
        tracing::info!(
            city = %request.city,
            country = %request.country,
            theme = %request.theme,
            radius = %request.radius,
            "Generation started"
        );

        // Theme first: a bad selection fails before any disk state exists.
        let theme = self.registry.load(&request.theme).await?;

        let mut handle = self.store.allocate().await?;

        let coordinates = match self
            .engine
            .resolve_coordinates(&request.city, &request.country, sink)
            .await
        {
            Ok(coordinates) => coordinates,
            Err(e) => {
                handle.release();
                return Err(GenerationError::CoordinateResolution(e));
            }
        };

        let job = RenderJob {
            city: request.city.clone(),
            country: request.country.clone(),
            coordinates,
            radius: request.radius,
            theme,
            output: handle.path().to_path_buf(),
        };

        if let Err(e) = self.engine.render(&job, sink).await {
            handle.release();
            return Err(GenerationError::Render(e));
        }

        let bytes = match tokio::fs::read(handle.path()).await {
            Ok(bytes) => bytes,
            Err(e) => {
                handle.release();
                return Err(GenerationError::Failure(
                    anyhow::Error::new(e).context("Failed to read rendered artifact"),
                ));
            }
        };

        let image = match image::load_from_memory(&bytes) {
            Ok(image) => image,
            Err(e) => {
                handle.release();
                return Err(GenerationError::Failure(
                    anyhow::Error::new(e).context("Rendered artifact is not a decodable image"),
                ));
            }
        };

        tracing::info!(
            width = image.width(),
            height = image.height(),
            "Generation finished"
        );

        Ok(Poster {
            request: request.clone(),
            image,
            bytes,
            handle,
        })
    }
}

impl<E> Clone for Generator<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
            registry: self.registry.clone(),
            store: self.store.clone(),
        }
    }
}
