//! Transcript Block
//!
//! A borderless text region for the live generation transcript. The
//! transcript grows from the engine's point of view, so the block anchors
//! to the bottom: the newest line is always visible unless the user has
//! scrolled up, and scrolling clamps to the content.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::StatefulWidget;
use textwrap::wrap;

/// Scroll state for a transcript block.
#[derive(Default)]
pub struct TextBlockState {
    /// Lines scrolled up from the bottom; 0 follows the newest output.
    pub from_bottom: usize,
    /// Wrapped line count of the last render, for scroll bounds.
    pub total_lines: usize,
}

impl TextBlockState {
    /// Scroll by delta lines (positive = up, away from the newest output).
    pub fn scroll(&mut self, delta: i32) {
        let next = self.from_bottom as i32 + delta;
        self.from_bottom = next.max(0) as usize;
    }

    /// Jump back to the newest output.
    pub fn follow(&mut self) {
        self.from_bottom = 0;
    }
}

/// A borderless, bottom-anchored text block.
pub struct TextBlock<'a> {
    content: &'a str,
    style: Style,
}

impl<'a> TextBlock<'a> {
    /// Wrap the given content.
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            style: Style::default(),
        }
    }

    /// Style applied to every line.
    #[must_use]
    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl StatefulWidget for TextBlock<'_> {
    type State = TextBlockState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let wrapped: Vec<String> = self
            .content
            .lines()
            .flat_map(|line| {
                if line.is_empty() {
                    vec![String::new()]
                } else {
                    wrap(line, area.width as usize)
                        .into_iter()
                        .map(|cow| cow.to_string())
                        .collect()
                }
            })
            .collect();

        state.total_lines = wrapped.len();

        let visible = area.height as usize;
        let max_from_bottom = wrapped.len().saturating_sub(visible);
        state.from_bottom = state.from_bottom.min(max_from_bottom);

        // Window ending `from_bottom` lines above the newest line.
        let end = wrapped.len() - state.from_bottom;
        let start = end.saturating_sub(visible);

        for (i, line) in wrapped[start..end].iter().enumerate() {
            let y = area.y + i as u16;
            buf.set_string(area.x, y, line, self.style);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn rendered_lines(content: &str, width: u16, height: u16, state: &mut TextBlockState) -> Vec<String> {
        let area = Rect::new(0, 0, width, height);
        let mut buf = Buffer::empty(area);
        TextBlock::new(content).render(area, &mut buf, state);

        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect()
    }

    #[test]
    fn short_content_renders_from_the_top() {
        let mut state = TextBlockState::default();
        let lines = rendered_lines("one\ntwo", 10, 4, &mut state);
        assert_eq!(lines, vec!["one", "two", "", ""]);
        assert_eq!(state.total_lines, 2);
    }

    #[test]
    fn overflowing_content_shows_the_newest_lines() {
        let mut state = TextBlockState::default();
        let lines = rendered_lines("a\nb\nc\nd\ne", 10, 3, &mut state);
        assert_eq!(lines, vec!["c", "d", "e"]);
    }

    #[test]
    fn scrolling_up_reveals_older_lines_and_clamps() {
        let mut state = TextBlockState::default();
        state.scroll(1);
        let lines = rendered_lines("a\nb\nc\nd\ne", 10, 3, &mut state);
        assert_eq!(lines, vec!["b", "c", "d"]);

        state.scroll(100);
        let lines = rendered_lines("a\nb\nc\nd\ne", 10, 3, &mut state);
        assert_eq!(lines, vec!["a", "b", "c"]);
        assert_eq!(state.from_bottom, 2);
    }

    #[test]
    fn follow_returns_to_the_newest_output() {
        let mut state = TextBlockState::default();
        state.scroll(2);
        state.follow();
        let lines = rendered_lines("a\nb\nc\nd", 10, 2, &mut state);
        assert_eq!(lines, vec!["c", "d"]);
    }

    #[test]
    fn long_lines_wrap_to_the_width() {
        let mut state = TextBlockState::default();
        let lines = rendered_lines("alpha beta", 5, 3, &mut state);
        assert_eq!(state.total_lines, 2);
        assert_eq!(lines, vec!["alpha", "beta", ""]);
    }
}
