//! Theme definitions and the registry adapter.
//!
//! Themes are data, not code: each theme is a TOML file describing the
//! palette a poster is drawn with. The registry is a thin view over the
//! engine's theme inventory. A loaded [`ThemeConfig`] is handed back to the
//! caller and threaded explicitly into the render call, so no theme state
//! lives in process-wide globals and concurrent generations cannot observe
//! each other's selection.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use thiserror::Error;

use crate::engine::PosterEngine;

// ============================================================================
// Identifiers
// ============================================================================

/// Opaque identifier for a theme, the stem of its definition file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ThemeId(pub String);

impl ThemeId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ThemeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ThemeId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

// ============================================================================
// Theme Definitions
// ============================================================================

/// Colors a theme paints with, as hex strings (e.g. `"#0b2a4a"`).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThemeColors {
    /// Page background.
    pub background: String,
    /// Water bodies.
    pub water: String,
    /// Parks and other green areas.
    pub parks: String,
    /// Road network linework.
    pub roads: String,
    /// Title and label text.
    pub text: String,
}

/// A parsed theme definition.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ThemeConfig {
    /// Identifier this config was loaded under.
    #[serde(skip)]
    pub id: ThemeId,
    /// Human-readable display name.
    pub name: String,
    /// Optional one-line description.
    #[serde(default)]
    pub description: Option<String>,
    /// The palette.
    pub colors: ThemeColors,
}

// ============================================================================
// Errors
// ============================================================================

/// Failures while listing or loading themes.
#[derive(Debug, Error)]
pub enum ThemeError {
    /// The requested identifier is not in the registry.
    #[error("Unknown theme '{id}'")]
    Unknown {
        /// Identifier that was requested.
        id: ThemeId,
    },

    /// The theme inventory could not be enumerated.
    #[error("Failed to list themes in {path}: {source}")]
    List {
        /// Directory that was scanned.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A theme definition file could not be read.
    #[error("Failed to read theme {path}: {source}")]
    Read {
        /// Definition file that was opened.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A theme definition file is not a valid theme.
    #[error("Failed to parse theme {path}: {source}")]
    Parse {
        /// Definition file that was parsed.
        path: PathBuf,
        /// Underlying TOML error.
        source: toml::de::Error,
    },
}

// ============================================================================
// Registry Adapter
// ============================================================================

/// Thin adapter over the engine's theme inventory.
///
/// Exists as the named seam between the generation pipeline and wherever
/// themes actually live; today that is the engine's themes directory.
#[derive(Debug)]
pub struct ThemeRegistry<E> {
    engine: Arc<E>,
}

impl<E: PosterEngine> ThemeRegistry<E> {
    /// Create a registry over the given engine.
    pub fn new(engine: Arc<E>) -> Self {
        Self { engine }
    }

    /// List available theme identifiers, sorted.
    pub async fn list(&self) -> Result<Vec<ThemeId>, ThemeError> {
        self.engine.list_themes().await
    }

    /// Load one theme's configuration for explicit threading into a render.
    pub async fn load(&self, id: &ThemeId) -> Result<ThemeConfig, ThemeError> {
        self.engine.load_theme(id).await
    }
}

impl<E> Clone for ThemeRegistry<E> {
    fn clone(&self) -> Self {
        Self {
            engine: Arc::clone(&self.engine),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn theme_id_displays_raw_identifier() {
        let id = ThemeId::from("blueprint");
        assert_eq!(id.to_string(), "blueprint");
        assert_eq!(id.as_str(), "blueprint");
    }

    #[test]
    fn theme_config_parses_from_toml() {
        let raw = r##"
            name = "Blueprint"
            description = "White linework on drafting blue"

            [colors]
            background = "#0b2a4a"
            water = "#10395f"
            parks = "#0e3255"
            roads = "#e8f1f8"
            text = "#e8f1f8"
        "##;

        let config: ThemeConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.name, "Blueprint");
        assert_eq!(
            config.description.as_deref(),
            Some("White linework on drafting blue")
        );
        assert_eq!(config.colors.roads, "#e8f1f8");
        // The id is not part of the file; loaders fill it in.
        assert_eq!(config.id, ThemeId::default());
    }

    #[test]
    fn theme_config_description_is_optional() {
        let raw = r##"
            name = "Noir"

            [colors]
            background = "#101010"
            water = "#1c1c1c"
            parks = "#161616"
            roads = "#f2f2f2"
            text = "#f2f2f2"
        "##;

        let config: ThemeConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.description, None);
    }

    #[test]
    fn unknown_error_names_the_identifier() {
        let err = ThemeError::Unknown {
            id: ThemeId::from("sepia"),
        };
        assert_eq!(err.to_string(), "Unknown theme 'sepia'");
    }
}
