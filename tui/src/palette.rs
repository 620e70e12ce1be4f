//! Palette
//!
//! The drafting-table look: warm paper, graphite ink, and a blueprint
//! accent, so the UI feels like the posters it makes.

use ratatui::style::Color;

// ============================================================================
// Surfaces
// ============================================================================

/// Main text on the default background.
pub const INK: Color = Color::Rgb(222, 222, 214);

/// Secondary text, labels, hints.
pub const GRAPHITE: Color = Color::Rgb(130, 130, 124);

/// Panel borders.
pub const RULE: Color = Color::Rgb(80, 84, 92);

// ============================================================================
// Accents
// ============================================================================

/// Blueprint blue - titles and the focused field.
pub const BLUEPRINT: Color = Color::Rgb(120, 170, 255);

/// The engine's own words in the transcript.
pub const TRANSCRIPT: Color = Color::Rgb(180, 190, 200);

/// Success notices and the saved path.
pub const SUCCESS_GREEN: Color = Color::Rgb(120, 230, 120);

/// Errors and failed generations.
pub const ERROR_RED: Color = Color::Rgb(255, 100, 100);

/// Warnings (engine unreachable, rejected requests).
pub const WARNING_AMBER: Color = Color::Rgb(255, 200, 100);
