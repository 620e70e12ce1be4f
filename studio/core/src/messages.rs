//! Messages the studio sends to its surface.
//!
//! One direction of the conversation: the studio narrates session state,
//! theme inventory, generation progress, and results, and the surface folds
//! them into whatever it draws with. The other direction is
//! [`SurfaceEvent`](crate::events::SurfaceEvent).

use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::generation::GenerationRequest;
use crate::themes::ThemeId;

// ============================================================================
// Identifiers
// ============================================================================

/// Unique identifier for one generation attempt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GenerationId(pub String);

impl GenerationId {
    /// Generate a new unique generation ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::Relaxed);
        Self(format!("gen_{id}"))
    }
}

impl Default for GenerationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GenerationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Session State
// ============================================================================

/// Lifecycle of a studio session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudioState {
    /// Probing the engine and loading the theme inventory.
    Initializing,
    /// Idle, ready to take a generation request.
    Ready,
    /// A generation is in flight.
    Generating,
    /// The session is ending.
    ShuttingDown,
}

impl StudioState {
    /// Human-readable description for the status line.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Initializing => "Starting up...",
            Self::Ready => "Ready",
            Self::Generating => "Rendering the map...",
            Self::ShuttingDown => "Shutting down...",
        }
    }
}

// ============================================================================
// Notifications
// ============================================================================

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyLevel {
    /// Informational
    Info,
    /// Something the user should look at
    Warning,
    /// Something went wrong
    Error,
    /// Something finished well
    Success,
}

// ============================================================================
// Poster Preview
// ============================================================================

/// RGBA8 pixels of a finished poster, for surfaces without an image stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterPreview {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes, RGBA, row-major.
    pub pixels: Vec<u8>,
}

impl PosterPreview {
    /// The pixel at `(x, y)`, or `None` outside the image.
    #[must_use]
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        let px = self.pixels.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

// ============================================================================
// Messages
// ============================================================================

/// Messages sent from the studio to the surface.
#[derive(Debug, Clone)]
pub enum StudioMessage {
    /// Session state changed.
    State {
        /// The new state.
        state: StudioState,
    },

    /// Engine identity and reachability, sent at startup and on connect.
    EngineInfo {
        /// Engine name for the status line.
        engine: String,
        /// Whether the startup health probe succeeded.
        ready: bool,
    },

    /// The theme inventory.
    ThemeList {
        /// Available identifiers, sorted.
        themes: Vec<ThemeId>,
        /// Suggested initial selection.
        default: Option<ThemeId>,
    },

    /// A generation was accepted and is running.
    GenerationStarted {
        /// Identifier correlating progress and results.
        id: GenerationId,
        /// The request being generated.
        request: GenerationRequest,
    },

    /// The transcript of the running generation grew.
    Progress {
        /// Which generation this belongs to.
        id: GenerationId,
        /// Full transcript so far.
        transcript: String,
    },

    /// A generation finished with a poster.
    PosterReady {
        /// Which generation finished.
        id: GenerationId,
        /// Decoded pixels for display.
        preview: PosterPreview,
        /// Suggested save filename.
        file_name: String,
    },

    /// A generation failed.
    GenerationFailed {
        /// Which generation failed.
        id: GenerationId,
        /// User-facing description of what went wrong.
        error: String,
    },

    /// A poster was written to disk.
    Saved {
        /// Where it went.
        path: PathBuf,
    },

    /// Out-of-band notification for the surface to display.
    Notify {
        /// Severity.
        level: NotifyLevel,
        /// Short user-facing text.
        message: String,
    },

    /// The session is over; the surface should exit its loop.
    Quit {
        /// Optional goodbye text.
        message: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn generation_ids_are_unique_and_prefixed() {
        let a = GenerationId::new();
        let b = GenerationId::new();
        assert_ne!(a, b);
        assert!(a.0.starts_with("gen_"));
        assert!(b.0.starts_with("gen_"));
    }

    #[test]
    fn state_descriptions_read_like_a_status_line() {
        assert_eq!(StudioState::Initializing.description(), "Starting up...");
        assert_eq!(StudioState::Ready.description(), "Ready");
        assert_eq!(StudioState::Generating.description(), "Rendering the map...");
        assert_eq!(StudioState::ShuttingDown.description(), "Shutting down...");
    }

    #[test]
    fn preview_pixel_reads_row_major_rgba() {
        // 2x2: red, green / blue, white.
        let preview = PosterPreview {
            width: 2,
            height: 2,
            pixels: vec![
                255, 0, 0, 255, 0, 255, 0, 255, //
                0, 0, 255, 255, 255, 255, 255, 255,
            ],
        };

        assert_eq!(preview.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(preview.pixel(1, 0), Some([0, 255, 0, 255]));
        assert_eq!(preview.pixel(0, 1), Some([0, 0, 255, 255]));
        assert_eq!(preview.pixel(1, 1), Some([255, 255, 255, 255]));
    }

    #[test]
    fn preview_pixel_rejects_out_of_bounds_reads() {
        let preview = PosterPreview {
            width: 1,
            height: 1,
            pixels: vec![9, 9, 9, 255],
        };
        assert_eq!(preview.pixel(1, 0), None);
        assert_eq!(preview.pixel(0, 1), None);
    }
}
