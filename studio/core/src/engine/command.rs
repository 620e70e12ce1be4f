//! Subprocess adapter for the poster engine.
//!
//! Drives an external engine executable (`maposter-engine` by default)
//! through two subcommands and a themes directory:
//!
//! - `<engine> geocode --city <city> --country <country>` prints human
//!   progress on stderr and the resolved location as a JSON object
//!   (`{"lat": 52.52, "lon": 13.405}`) on the last non-empty stdout line.
//! - `<engine> render --city .. --country .. --lat .. --lon .. --radius ..
//!   --theme <file.toml> --output <file.png>` prints progress on both
//!   streams and writes the poster to the output path.
//! - Themes are `*.toml` files in the themes directory; the file stem is
//!   the theme id.
//!
//! Whatever the child prints while a request runs is forwarded line by line
//! into that request's [`ProgressSink`], so the surface shows the engine's
//! own words as they happen.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::config::StudioConfig;
use crate::engine::traits::{Coordinates, PosterEngine, RenderError, RenderJob, ResolveError};
use crate::progress::ProgressSink;
use crate::themes::{ThemeConfig, ThemeError, ThemeId};

/// Default engine executable, resolved through `PATH`.
pub const DEFAULT_ENGINE_COMMAND: &str = "maposter-engine";

/// Default themes directory, relative to the working directory.
pub const DEFAULT_THEMES_DIR: &str = "themes";

/// Poster engine reached as a child process.
#[derive(Debug, Clone)]
pub struct CommandEngine {
    command: PathBuf,
    themes_dir: PathBuf,
    name: String,
}

impl CommandEngine {
    /// Create an engine around the given executable and themes directory.
    pub fn new(command: impl Into<PathBuf>, themes_dir: impl Into<PathBuf>) -> Self {
        let command = command.into();
        let name = command.file_name().map_or_else(
            || DEFAULT_ENGINE_COMMAND.to_string(),
            |n| n.to_string_lossy().into_owned(),
        );
        Self {
            command,
            themes_dir: themes_dir.into(),
            name,
        }
    }

    /// Create an engine from the studio configuration.
    pub fn from_config(config: &StudioConfig) -> Self {
        Self::new(&config.engine_command, &config.themes_dir)
    }

    fn theme_path(&self, id: &ThemeId) -> PathBuf {
        self.themes_dir.join(format!("{id}.toml"))
    }
}

impl Default for CommandEngine {
    fn default() -> Self {
        Self::new(DEFAULT_ENGINE_COMMAND, DEFAULT_THEMES_DIR)
    }
}

#[async_trait]
impl PosterEngine for CommandEngine {
    fn name(&self) -> &str {
        &self.name
    }

    async fn health_check(&self) -> bool {
        Command::new(&self.command)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|status| status.success())
            .unwrap_or(false)
    }

    async fn list_themes(&self) -> Result<Vec<ThemeId>, ThemeError> {
        let list_err = |source| ThemeError::List {
            path: self.themes_dir.clone(),
            source,
        };

        let mut entries = tokio::fs::read_dir(&self.themes_dir)
            .await
            .map_err(list_err)?;

        let mut themes = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("toml") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                themes.push(ThemeId::new(stem));
            }
        }

        themes.sort();
        Ok(themes)
    }

    async fn load_theme(&self, id: &ThemeId) -> Result<ThemeConfig, ThemeError> {
        let path = self.theme_path(id);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ThemeError::Unknown { id: id.clone() });
            }
            Err(source) => return Err(ThemeError::Read { path, source }),
        };

        let mut config: ThemeConfig =
            toml::from_str(&raw).map_err(|source| ThemeError::Parse { path, source })?;
        config.id = id.clone();
        Ok(config)
    }

    async fn resolve_coordinates(
        &self,
        city: &str,
        country: &str,
        sink: &dyn ProgressSink,
    ) -> Result<Coordinates, ResolveError> {
        tracing::debug!(engine = %self.name, city, country, "Spawning geocode");

        let mut child = Command::new(&self.command)
            .arg("geocode")
            .arg("--city")
            .arg(city)
            .arg("--country")
            .arg(country)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(ResolveError::Spawn)?;

        let stdout = child.stdout.take().expect("stdout was piped");
        let stderr = child.stderr.take().expect("stderr was piped");

        // Geocode results arrive on stdout; only stderr is progress.
        let (stdout_lines, last_diag) = pump_output(stdout, stderr, sink, false).await;

        let status = child.wait().await.map_err(ResolveError::Spawn)?;
        if !status.success() {
            return Err(ResolveError::Engine {
                status: status.code().unwrap_or(-1),
                detail: last_diag.unwrap_or_else(|| "engine printed no diagnostics".to_string()),
            });
        }

        let line = stdout_lines
            .iter()
            .rev()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| ResolveError::Output("engine printed nothing on stdout".to_string()))?;

        serde_json::from_str(line)
            .map_err(|e| ResolveError::Output(format!("bad coordinate JSON: {e}")))
    }

    async fn render(&self, job: &RenderJob, sink: &dyn ProgressSink) -> Result<(), RenderError> {
        tracing::debug!(
            engine = %self.name,
            city = %job.city,
            theme = %job.theme.id,
            output = %job.output.display(),
            "Spawning render"
        );

        let mut child = Command::new(&self.command)
            .arg("render")
            .arg("--city")
            .arg(&job.city)
            .arg("--country")
            .arg(&job.country)
            .arg("--lat")
            .arg(job.coordinates.lat.to_string())
            .arg("--lon")
            .arg(job.coordinates.lon.to_string())
            .arg("--radius")
            .arg(job.radius.meters().to_string())
            .arg("--theme")
            .arg(self.theme_path(&job.theme.id))
            .arg("--output")
            .arg(&job.output)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(RenderError::Spawn)?;

        let stdout = child.stdout.take().expect("stdout was piped");
        let stderr = child.stderr.take().expect("stderr was piped");

        // Renderers narrate on both streams; forward everything.
        let (_, last_diag) = pump_output(stdout, stderr, sink, true).await;

        let status = child.wait().await.map_err(RenderError::Spawn)?;
        if !status.success() {
            return Err(RenderError::Engine {
                status: status.code().unwrap_or(-1),
                detail: last_diag.unwrap_or_else(|| "engine printed no diagnostics".to_string()),
            });
        }

        // The render target is pre-reserved as an empty file, so "wrote
        // nothing" means it is still empty.
        match tokio::fs::metadata(&job.output).await {
            Ok(meta) if meta.len() > 0 => Ok(()),
            _ => Err(RenderError::MissingArtifact {
                path: job.output.clone(),
            }),
        }
    }
}

/// Forward child output into the sink line by line until both streams close.
///
/// Returns stdout's collected lines, for callers that parse results out of
/// them, and the last stderr line, which is where engines leave their
/// diagnostics. When `stdout_to_sink` is set, stdout lines are forwarded as
/// progress too.
async fn pump_output<O, E>(
    stdout: O,
    stderr: E,
    sink: &dyn ProgressSink,
    stdout_to_sink: bool,
) -> (Vec<String>, Option<String>)
where
    O: AsyncRead + Unpin,
    E: AsyncRead + Unpin,
{
    let mut out_lines = BufReader::new(stdout).lines();
    let mut err_lines = BufReader::new(stderr).lines();
    let mut collected = Vec::new();
    let mut last_diag = None;
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        tokio::select! {
            line = out_lines.next_line(), if out_open => match line {
                Ok(Some(line)) => {
                    if stdout_to_sink {
                        sink.on_fragment(&format!("{line}\n")).await;
                    }
                    collected.push(line);
                }
                Ok(None) => out_open = false,
                Err(e) => {
                    tracing::warn!("Error reading engine stdout: {}", e);
                    out_open = false;
                }
            },
            line = err_lines.next_line(), if err_open => match line {
                Ok(Some(line)) => {
                    sink.on_fragment(&format!("{line}\n")).await;
                    last_diag = Some(line);
                }
                Ok(None) => err_open = false,
                Err(e) => {
                    tracing::warn!("Error reading engine stderr: {}", e);
                    err_open = false;
                }
            },
        }
    }

    (collected, last_diag)
}
