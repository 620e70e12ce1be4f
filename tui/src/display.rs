//! Display State
//!
//! The TUI is a thin client: it renders what the studio tells it to, and
//! nothing else. [`DisplayState`] is the bridge between `StudioMessage`s and
//! drawing - a pure fold with no I/O, which is what makes it testable
//! without a terminal.

use std::path::PathBuf;

use studio_core::{NotifyLevel, PosterPreview, StudioMessage, StudioState, ThemeId};

/// Everything the frames are drawn from.
#[derive(Debug)]
pub struct DisplayState {
    /// Current studio state, drives the status line and the spinner.
    pub studio_state: StudioState,
    /// Engine name for the status line.
    pub engine: Option<String>,
    /// Whether the startup engine probe succeeded.
    pub engine_ready: bool,
    /// Theme inventory for the selector.
    pub themes: Vec<ThemeId>,
    /// Theme the studio suggests preselecting.
    pub default_theme: Option<ThemeId>,
    /// Live transcript of the running (or last) generation.
    pub transcript: String,
    /// Finished poster pixels, if any.
    pub preview: Option<PosterPreview>,
    /// Suggested filename for the finished poster.
    pub poster_file_name: Option<String>,
    /// Last generation failure, user-facing text.
    pub error: Option<String>,
    /// Where the last save landed.
    pub saved_to: Option<PathBuf>,
    /// Latest notification for the status line.
    pub notification: Option<(NotifyLevel, String)>,
    /// Set when the studio said goodbye.
    pub should_quit: bool,
    /// Goodbye text, shown after the terminal is restored.
    pub goodbye: Option<String>,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayState {
    /// Fresh display state, nothing received yet.
    #[must_use]
    pub fn new() -> Self {
        Self {
            studio_state: StudioState::Initializing,
            engine: None,
            engine_ready: false,
            themes: Vec::new(),
            default_theme: None,
            transcript: String::new(),
            preview: None,
            poster_file_name: None,
            error: None,
            saved_to: None,
            notification: None,
            should_quit: false,
            goodbye: None,
        }
    }

    /// Fold one studio message into the display.
    pub fn apply_message(&mut self, msg: StudioMessage) {
        match msg {
            StudioMessage::State { state } => {
                self.studio_state = state;
            }

            StudioMessage::EngineInfo { engine, ready } => {
                self.engine = Some(engine);
                self.engine_ready = ready;
            }

            StudioMessage::ThemeList { themes, default } => {
                self.themes = themes;
                self.default_theme = default;
            }

            StudioMessage::GenerationStarted { .. } => {
                // A new attempt wipes the previous one's remains.
                self.transcript.clear();
                self.preview = None;
                self.poster_file_name = None;
                self.error = None;
                self.saved_to = None;
            }

            StudioMessage::Progress { transcript, .. } => {
                self.transcript = transcript;
            }

            StudioMessage::PosterReady {
                preview, file_name, ..
            } => {
                self.preview = Some(preview);
                self.poster_file_name = Some(file_name);
                self.error = None;
            }

            StudioMessage::GenerationFailed { error, .. } => {
                self.error = Some(error);
            }

            StudioMessage::Saved { path } => {
                self.saved_to = Some(path);
            }

            StudioMessage::Notify { level, message } => {
                self.notification = Some((level, message));
            }

            StudioMessage::Quit { message } => {
                self.should_quit = true;
                self.goodbye = message;
            }
        }
    }

    /// One-line session summary for the status bar.
    #[must_use]
    pub fn status_line(&self) -> String {
        let engine = self.engine.as_deref().unwrap_or("engine");
        let mut line = format!("{} | {}", self.studio_state.description(), engine);
        if !self.engine_ready {
            line.push_str(" (unreachable)");
        }
        if let Some((_, note)) = &self.notification {
            line.push_str(" | ");
            line.push_str(note);
        }
        line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use studio_core::GenerationId;

    fn preview_1x1() -> PosterPreview {
        PosterPreview {
            width: 1,
            height: 1,
            pixels: vec![11, 42, 74, 255],
        }
    }

    // ========================================================================
    // Session Picture
    // ========================================================================

    #[test]
    fn starts_with_nothing_to_show() {
        let display = DisplayState::new();
        assert_eq!(display.studio_state, StudioState::Initializing);
        assert!(display.themes.is_empty());
        assert!(display.preview.is_none());
        assert!(!display.should_quit);
    }

    #[test]
    fn engine_info_lands_in_the_status_line() {
        let mut display = DisplayState::new();
        display.apply_message(StudioMessage::EngineInfo {
            engine: "maposter-engine".to_string(),
            ready: true,
        });
        display.apply_message(StudioMessage::State {
            state: StudioState::Ready,
        });

        assert_eq!(display.status_line(), "Ready | maposter-engine");
    }

    #[test]
    fn unreachable_engine_is_flagged() {
        let mut display = DisplayState::new();
        display.apply_message(StudioMessage::EngineInfo {
            engine: "maposter-engine".to_string(),
            ready: false,
        });
        display.apply_message(StudioMessage::State {
            state: StudioState::Ready,
        });

        assert_eq!(display.status_line(), "Ready | maposter-engine (unreachable)");
    }

    #[test]
    fn theme_list_fills_the_selector() {
        let mut display = DisplayState::new();
        display.apply_message(StudioMessage::ThemeList {
            themes: vec![ThemeId::from("blueprint"), ThemeId::from("noir")],
            default: Some(ThemeId::from("blueprint")),
        });

        assert_eq!(display.themes.len(), 2);
        assert_eq!(display.default_theme, Some(ThemeId::from("blueprint")));
    }

    // ========================================================================
    // Generation Lifecycle
    // ========================================================================

    #[test]
    fn progress_replaces_the_transcript_snapshot() {
        let mut display = DisplayState::new();
        let id = GenerationId::new();

        display.apply_message(StudioMessage::Progress {
            id: id.clone(),
            transcript: "Resolving...".to_string(),
        });
        assert_eq!(display.transcript, "Resolving...");

        display.apply_message(StudioMessage::Progress {
            id,
            transcript: "Resolving...Rendering...".to_string(),
        });
        assert_eq!(display.transcript, "Resolving...Rendering...");
    }

    #[test]
    fn a_new_generation_clears_the_previous_one() {
        let mut display = DisplayState::new();
        display.transcript = "old transcript".to_string();
        display.preview = Some(preview_1x1());
        display.error = Some("old error".to_string());
        display.saved_to = Some(PathBuf::from("/tmp/old.png"));

        display.apply_message(StudioMessage::GenerationStarted {
            id: GenerationId::new(),
            request: studio_core::GenerationRequest::new(
                "Berlin",
                "Germany",
                ThemeId::from("blueprint"),
                studio_core::Radius::try_new(5_000).unwrap(),
            ),
        });

        assert_eq!(display.transcript, "");
        assert!(display.preview.is_none());
        assert!(display.error.is_none());
        assert!(display.saved_to.is_none());
    }

    #[test]
    fn poster_ready_shows_the_preview() {
        let mut display = DisplayState::new();
        display.apply_message(StudioMessage::PosterReady {
            id: GenerationId::new(),
            preview: preview_1x1(),
            file_name: "Berlin_5000_blueprint.png".to_string(),
        });

        assert!(display.preview.is_some());
        assert_eq!(
            display.poster_file_name.as_deref(),
            Some("Berlin_5000_blueprint.png")
        );
        assert!(display.error.is_none());
    }

    #[test]
    fn failure_text_is_kept_verbatim() {
        let mut display = DisplayState::new();
        display.apply_message(StudioMessage::GenerationFailed {
            id: GenerationId::new(),
            error: "Error generating poster: no match for city".to_string(),
        });

        assert_eq!(
            display.error.as_deref(),
            Some("Error generating poster: no match for city")
        );
    }

    // ========================================================================
    // Save and Quit
    // ========================================================================

    #[test]
    fn saved_path_is_recorded() {
        let mut display = DisplayState::new();
        display.apply_message(StudioMessage::Saved {
            path: PathBuf::from("/downloads/Berlin_5000_blueprint.png"),
        });
        assert_eq!(
            display.saved_to,
            Some(PathBuf::from("/downloads/Berlin_5000_blueprint.png"))
        );
    }

    #[test]
    fn notifications_ride_the_status_line() {
        let mut display = DisplayState::new();
        display.apply_message(StudioMessage::State {
            state: StudioState::Ready,
        });
        display.apply_message(StudioMessage::Notify {
            level: NotifyLevel::Success,
            message: "Poster generated!".to_string(),
        });

        assert_eq!(display.status_line(), "Ready | engine | Poster generated!");
    }

    #[test]
    fn quit_sets_the_flag_and_keeps_the_goodbye() {
        let mut display = DisplayState::new();
        display.apply_message(StudioMessage::Quit {
            message: Some("Hang it somewhere nice!".to_string()),
        });

        assert!(display.should_quit);
        assert_eq!(display.goodbye.as_deref(), Some("Hang it somewhere nice!"));
    }
}
