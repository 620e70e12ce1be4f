//! Main Application
//!
//! The App owns the TUI lifecycle as a thin display client:
//! 1. Converts terminal events to form edits and `SurfaceEvent`s
//! 2. Sends events to the embedded studio via [`StudioClient`]
//! 3. Receives `StudioMessage`s and folds them into [`DisplayState`]
//! 4. Renders frames from the display state

use std::io;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, EventStream, KeyCode, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use unicode_width::UnicodeWidthStr;

use studio_core::{
    NotifyLevel, StudioConfig, StudioMessage, StudioState, MAX_RADIUS_METERS, RADIUS_STEP_METERS,
};

use crate::display::DisplayState;
use crate::form::{Field, FormAction, FormState};
use crate::palette;
use crate::studio_client::StudioClient;
use crate::widgets::{ImageBlock, TextBlock, TextBlockState};

/// Header title.
const TITLE: &str = "MapToPoster";
/// Header tagline.
const TAGLINE: &str = "Cities, turned into quiet geometry.";
/// Width of the request form panel.
const FORM_WIDTH: u16 = 38;
/// Spinner shown while a generation runs.
const SPINNER: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Main application state.
pub struct App {
    /// Is the app still running?
    running: bool,
    /// Client for the embedded studio.
    client: StudioClient,
    /// Display state folded from `StudioMessage`s.
    display: DisplayState,
    /// The request form.
    form: FormState,
    /// Transcript scroll state.
    transcript_scroll: TextBlockState,
    /// Current spinner frame.
    spinner: usize,
    /// Goodbye text for after the terminal is restored.
    goodbye: Option<String>,
}

impl App {
    /// Create an app over an embedded studio built from `config`.
    #[must_use]
    pub fn new(config: StudioConfig) -> Self {
        Self {
            running: true,
            client: StudioClient::new(config),
            display: DisplayState::new(),
            form: FormState::new(),
            transcript_scroll: TextBlockState::default(),
            spinner: 0,
            goodbye: None,
        }
    }

    /// Goodbye text the studio left behind, if any.
    #[must_use]
    pub fn goodbye(&self) -> Option<&str> {
        self.goodbye.as_deref()
    }

    /// Main event loop.
    pub async fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        // Terminal-friendly frame rate; the transcript does the moving.
        let frame_duration = Duration::from_millis(100);
        let mut event_stream = EventStream::new();

        // Startup is quick (a health probe and a directory listing), so run
        // it before the first frame rather than phasing it across ticks.
        if let Err(e) = self.client.start().await {
            tracing::warn!("Studio start error: {}", e);
        }
        if let Err(e) = self.client.connect().await {
            tracing::warn!("Studio connect error: {}", e);
        }

        while self.running {
            let frame_start = Instant::now();

            tokio::select! {
                biased;

                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        match event {
                            // Only Press events; Release and Repeat double up.
                            Event::Key(key) if key.kind == KeyEventKind::Press => {
                                self.handle_key(key).await;
                            }
                            _ => {}
                        }
                    }
                }

                () = tokio::time::sleep(Duration::from_millis(16)) => {}
            }

            self.client.poll_generation().await;
            self.process_messages();

            if self.display.studio_state == StudioState::Generating {
                self.spinner = (self.spinner + 1) % SPINNER.len();
            }

            terminal.draw(|frame| self.draw(frame))?;

            if self.display.should_quit {
                self.goodbye = self.display.goodbye.clone();
                self.running = false;
            }

            // Frame rate limiting
            let elapsed = frame_start.elapsed();
            if elapsed < frame_duration {
                tokio::time::sleep(frame_duration - elapsed).await;
            }
        }

        Ok(())
    }

    /// Handle one key press.
    async fn handle_key(&mut self, key: event::KeyEvent) {
        // Session keys first, whatever has focus.
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => {
                    self.send_quit().await;
                    return;
                }
                KeyCode::Char('s') => {
                    if let Err(e) = self.client.save().await {
                        tracing::warn!("Save request failed: {}", e);
                    }
                    return;
                }
                _ => {}
            }
        }

        match key.code {
            KeyCode::Esc => self.send_quit().await,
            KeyCode::PageUp => self.transcript_scroll.scroll(3),
            KeyCode::PageDown => self.transcript_scroll.scroll(-3),
            KeyCode::End => self.transcript_scroll.follow(),
            _ => {
                if let Some(FormAction::Submit(request)) = self.form.handle_key(key) {
                    // The studio enforces single-flight; a rejection comes
                    // back as a notice.
                    self.transcript_scroll.follow();
                    if let Err(e) = self.client.generate(request).await {
                        tracing::warn!("Generate request failed: {}", e);
                    }
                }
            }
        }
    }

    async fn send_quit(&mut self) {
        if let Err(e) = self.client.request_quit().await {
            tracing::warn!("Quit request failed: {}", e);
            // The studio is unreachable; leave directly.
            self.running = false;
        }
    }

    /// Drain studio messages into the display, syncing the theme selector.
    fn process_messages(&mut self) {
        for msg in self.client.recv_all() {
            if let StudioMessage::ThemeList { themes, default } = &msg {
                self.form.set_themes(themes.clone(), default.clone());
            }
            self.display.apply_message(msg);
        }
    }

    // ========================================================================
    // Rendering
    // ========================================================================

    fn draw(&mut self, frame: &mut Frame) {
        let [header, main, status] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(4),
                Constraint::Length(1),
            ])
            .areas(frame.area());

        let [form_area, right] = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(FORM_WIDTH), Constraint::Min(20)])
            .areas(main);

        let [transcript_area, preview_area] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(8), Constraint::Min(4)])
            .areas(right);

        self.draw_header(frame, header);
        self.draw_form(frame, form_area);
        self.draw_transcript(frame, transcript_area);
        self.draw_preview(frame, preview_area);
        self.draw_status(frame, status);
    }

    fn draw_header(&self, frame: &mut Frame, area: Rect) {
        let lines = vec![
            Line::styled(
                TITLE,
                Style::default()
                    .fg(palette::BLUEPRINT)
                    .add_modifier(Modifier::BOLD),
            ),
            Line::styled(
                TAGLINE,
                Style::default()
                    .fg(palette::GRAPHITE)
                    .add_modifier(Modifier::ITALIC),
            ),
        ];
        frame.render_widget(Paragraph::new(lines), area);
    }

    fn draw_form(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette::RULE))
            .title(" poster ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let focused = |field: Field| {
            if self.form.focus == field {
                Style::default()
                    .fg(palette::BLUEPRINT)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(palette::INK)
            }
        };
        let label = Style::default().fg(palette::GRAPHITE);

        let theme_text = self.form.selected_theme().map_or_else(
            || "(no themes found)".to_string(),
            |t| format!("◀ {t} ▶"),
        );

        let lines = vec![
            Line::styled("City", label),
            Line::styled(format!(" {}", self.form.city), focused(Field::City)),
            Line::raw(""),
            Line::styled("Country", label),
            Line::styled(format!(" {}", self.form.country), focused(Field::Country)),
            Line::raw(""),
            Line::styled("Theme", label),
            Line::styled(format!(" {theme_text}"), focused(Field::Theme)),
            Line::raw(""),
            Line::styled("Radius", label),
            Line::styled(
                format!(" {}", radius_slider(self.form.radius.meters())),
                focused(Field::Radius),
            ),
            Line::raw(""),
            Line::styled("[ Generate ]", focused(Field::Generate)),
        ];
        frame.render_widget(Paragraph::new(lines), inner);

        // Text cursor on the focused input.
        let cursor_line = match self.form.focus {
            Field::City => Some((1u16, self.form.city.as_str())),
            Field::Country => Some((4u16, self.form.country.as_str())),
            _ => None,
        };
        if let Some((dy, text)) = cursor_line {
            let x = inner.x + 1 + text.width() as u16;
            frame.set_cursor_position((x.min(inner.right().saturating_sub(1)), inner.y + dy));
        }
    }

    fn draw_transcript(&mut self, frame: &mut Frame, area: Rect) {
        let title = if self.display.studio_state == StudioState::Generating {
            format!(" engine {} ", SPINNER[self.spinner])
        } else {
            " engine ".to_string()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette::RULE))
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        frame.render_stateful_widget(
            TextBlock::new(&self.display.transcript)
                .style(Style::default().fg(palette::TRANSCRIPT)),
            inner,
            &mut self.transcript_scroll,
        );
    }

    fn draw_preview(&self, frame: &mut Frame, area: Rect) {
        let title = self.display.poster_file_name.as_ref().map_or_else(
            || " preview ".to_string(),
            |name| format!(" {name} "),
        );
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(palette::RULE))
            .title(title);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if let Some(preview) = &self.display.preview {
            frame.render_widget(ImageBlock::new(preview), inner);
        } else if let Some(error) = &self.display.error {
            frame.render_widget(
                Paragraph::new(error.as_str())
                    .style(Style::default().fg(palette::ERROR_RED))
                    .wrap(Wrap { trim: true }),
                inner,
            );
        } else {
            frame.render_widget(
                Paragraph::new("Fill in the form and generate a poster.")
                    .style(Style::default().fg(palette::GRAPHITE)),
                inner,
            );
        }
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let level_color = match self.display.notification {
            Some((NotifyLevel::Error, _)) => palette::ERROR_RED,
            Some((NotifyLevel::Warning, _)) => palette::WARNING_AMBER,
            Some((NotifyLevel::Success, _)) => palette::SUCCESS_GREEN,
            _ => palette::GRAPHITE,
        };

        let line = Line::from(vec![
            Span::styled(self.display.status_line(), Style::default().fg(level_color)),
            Span::styled(
                "  Tab: fields  Enter: generate  Ctrl-S: save  Esc: quit",
                Style::default().fg(palette::RULE),
            ),
        ]);
        frame.render_widget(Paragraph::new(line), area);
    }
}

/// A bar like `│████░░░░░░░░░░░░░░░░│ 4 km` over the slider domain.
fn radius_slider(meters: u32) -> String {
    let steps = (MAX_RADIUS_METERS / RADIUS_STEP_METERS) as usize;
    let filled = (meters / RADIUS_STEP_METERS) as usize;
    format!(
        "│{}{}│ {} km",
        "█".repeat(filled),
        "░".repeat(steps - filled),
        meters / 1000
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn radius_slider_fills_proportionally() {
        assert_eq!(
            radius_slider(1_000),
            "│█░░░░░░░░░░░░░░░░░░░│ 1 km"
        );
        assert_eq!(
            radius_slider(20_000),
            "│████████████████████│ 20 km"
        );
    }

    #[test]
    fn slider_matches_the_domain_width() {
        // One cell per slider step.
        let bar = radius_slider(5_000);
        let cells = bar.chars().filter(|c| *c == '█' || *c == '░').count();
        assert_eq!(cells, 20);
        assert_eq!(bar.chars().filter(|c| *c == '█').count(), 5);
    }
}
