//! Studio configuration.
//!
//! Configuration is resolved in layers: built-in defaults, then an optional
//! TOML file at `~/.config/maposter/maposter.toml`, then `MAPOSTER_*`
//! environment variables. A missing file is not an error; a malformed one
//! is. Later layers win.
//!
//! ```toml
//! [studio]
//! default_theme = "noir"
//! scratch_dir = "/tmp/maposter"
//! downloads_dir = "/home/me/Downloads"
//!
//! [engine]
//! command = "/opt/maposter/bin/maposter-engine"
//! themes_dir = "/opt/maposter/themes"
//! ```

use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::engine::command::{DEFAULT_ENGINE_COMMAND, DEFAULT_THEMES_DIR};
use crate::themes::ThemeId;

// ============================================================================
// Errors
// ============================================================================

/// Configuration loading failures.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read config file at {path}: {source}")]
    ReadError {
        /// The path that was attempted.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid TOML.
    #[error("Failed to parse TOML config: {0}")]
    ParseError(#[from] toml::de::Error),
}

// ============================================================================
// Source Tracking
// ============================================================================

/// Where the effective configuration came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// Built-in defaults
    Default,
    /// Loaded from a TOML file
    File,
    /// Environment variables
    Env,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::File => write!(f, "file"),
            Self::Env => write!(f, "environment"),
        }
    }
}

// ============================================================================
// TOML Mirror
// ============================================================================

/// Top-level structure of `maposter.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MaposterToml {
    /// `[studio]` section.
    pub studio: StudioToml,
    /// `[engine]` section.
    pub engine: EngineToml,
}

/// `[studio]` section, all fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StudioToml {
    /// Theme preselected in the surface.
    pub default_theme: Option<String>,
    /// Directory temporary render targets live in.
    pub scratch_dir: Option<PathBuf>,
    /// Directory saved posters go to.
    pub downloads_dir: Option<PathBuf>,
}

/// `[engine]` section, all fields optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineToml {
    /// Engine executable.
    pub command: Option<PathBuf>,
    /// Directory theme definitions live in.
    pub themes_dir: Option<PathBuf>,
}

// ============================================================================
// Effective Configuration
// ============================================================================

/// Effective studio configuration after all layers are applied.
#[derive(Debug, Clone)]
pub struct StudioConfig {
    /// Engine executable, resolved through `PATH` when relative.
    pub engine_command: PathBuf,
    /// Directory theme definitions live in.
    pub themes_dir: PathBuf,
    /// Directory temporary render targets live in.
    pub scratch_dir: PathBuf,
    /// Directory saved posters go to.
    pub downloads_dir: PathBuf,
    /// Theme preselected in the surface.
    pub default_theme: ThemeId,
    /// Layer the last-applied setting came from.
    pub source: ConfigSource,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            engine_command: PathBuf::from(DEFAULT_ENGINE_COMMAND),
            themes_dir: PathBuf::from(DEFAULT_THEMES_DIR),
            scratch_dir: std::env::temp_dir().join("maposter"),
            downloads_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
            default_theme: ThemeId::from("blueprint"),
            source: ConfigSource::Default,
        }
    }
}

/// Default config file location: `~/.config/maposter/maposter.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("maposter").join("maposter.toml"))
}

/// Load configuration from the default path and the environment.
pub fn load_config() -> Result<StudioConfig, ConfigError> {
    load_config_from_path(None)
}

/// Load configuration, preferring an explicit path when given.
///
/// A missing file falls back to defaults; the environment is applied on top
/// either way.
pub fn load_config_from_path(path: Option<PathBuf>) -> Result<StudioConfig, ConfigError> {
    let mut config = StudioConfig::default();

    if let Some(config_path) = path.or_else(default_config_path) {
        if config_path.exists() {
            let raw =
                std::fs::read_to_string(&config_path).map_err(|source| ConfigError::ReadError {
                    path: config_path.clone(),
                    source,
                })?;
            let parsed: MaposterToml = toml::from_str(&raw)?;
            apply_toml_config(&mut config, parsed);
            tracing::info!(path = %config_path.display(), "Loaded configuration file");
        } else {
            tracing::debug!(path = %config_path.display(), "No configuration file, using defaults");
        }
    }

    apply_env_config(&mut config);
    Ok(config)
}

fn apply_toml_config(config: &mut StudioConfig, toml: MaposterToml) {
    if let Some(theme) = toml.studio.default_theme {
        config.default_theme = ThemeId::new(theme);
        config.source = ConfigSource::File;
    }
    if let Some(dir) = toml.studio.scratch_dir {
        config.scratch_dir = dir;
        config.source = ConfigSource::File;
    }
    if let Some(dir) = toml.studio.downloads_dir {
        config.downloads_dir = dir;
        config.source = ConfigSource::File;
    }
    if let Some(command) = toml.engine.command {
        config.engine_command = command;
        config.source = ConfigSource::File;
    }
    if let Some(dir) = toml.engine.themes_dir {
        config.themes_dir = dir;
        config.source = ConfigSource::File;
    }
}

fn apply_env_config(config: &mut StudioConfig) {
    if let Ok(command) = std::env::var("MAPOSTER_ENGINE") {
        config.engine_command = PathBuf::from(command);
        config.source = ConfigSource::Env;
    }
    if let Ok(dir) = std::env::var("MAPOSTER_THEMES_DIR") {
        config.themes_dir = PathBuf::from(dir);
        config.source = ConfigSource::Env;
    }
    if let Ok(dir) = std::env::var("MAPOSTER_SCRATCH_DIR") {
        config.scratch_dir = PathBuf::from(dir);
        config.source = ConfigSource::Env;
    }
    if let Ok(dir) = std::env::var("MAPOSTER_DOWNLOADS_DIR") {
        config.downloads_dir = PathBuf::from(dir);
        config.source = ConfigSource::Env;
    }
    if let Ok(theme) = std::env::var("MAPOSTER_THEME") {
        config.default_theme = ThemeId::new(theme);
        config.source = ConfigSource::Env;
    }
}
