//! Events surfaces send to the studio.
//!
//! The surface's half of the conversation. Everything here is already
//! validated where it can be: a [`GenerationRequest`] cannot exist with an
//! out-of-domain radius, so the studio never re-checks it.

use crate::generation::GenerationRequest;

/// Events sent from a surface to the studio.
#[derive(Debug, Clone)]
pub enum SurfaceEvent {
    /// A surface attached and wants the current session picture.
    Connected,

    /// The user asked for a poster.
    GenerateRequested {
        /// The validated request.
        request: GenerationRequest,
    },

    /// The user asked to save the finished poster.
    SaveRequested,

    /// The user asked to leave.
    QuitRequested,
}
