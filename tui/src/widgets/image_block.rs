//! Image Block
//!
//! Draws a [`PosterPreview`] with half-block cells: each terminal cell
//! carries two vertically stacked pixels, `▀` with the foreground as the
//! top pixel and the background as the bottom one. The image is sampled
//! nearest-neighbor, aspect-fitted to the area, and centered.

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::widgets::Widget;

use studio_core::PosterPreview;

/// Upper half block: fg = top pixel, bg = bottom pixel.
const HALF_BLOCK: &str = "\u{2580}";

/// Renders a poster preview into a terminal region.
pub struct ImageBlock<'a> {
    preview: &'a PosterPreview,
}

impl<'a> ImageBlock<'a> {
    /// Draw the given preview.
    pub fn new(preview: &'a PosterPreview) -> Self {
        Self { preview }
    }
}

impl Widget for ImageBlock<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 || self.preview.width == 0 || self.preview.height == 0
        {
            return;
        }

        // One cell is one pixel wide and two pixels tall; fit the image into
        // the pixel grid the area offers, preserving aspect.
        let grid_w = f64::from(area.width);
        let grid_h = f64::from(area.height) * 2.0;
        let img_w = f64::from(self.preview.width);
        let img_h = f64::from(self.preview.height);
        let scale = (grid_w / img_w).min(grid_h / img_h);

        let target_w = (img_w * scale).floor().max(1.0) as u16;
        let target_px_h = (img_h * scale).floor().max(1.0) as u32;
        let target_h = target_px_h.div_ceil(2) as u16;

        let x0 = area.x + (area.width - target_w) / 2;
        let y0 = area.y + (area.height - target_h) / 2;

        for cy in 0..target_h {
            for cx in 0..target_w {
                let top = self.sample(u32::from(cx), u32::from(cy) * 2, target_w, target_px_h);
                let bottom = self
                    .sample_checked(u32::from(cx), u32::from(cy) * 2 + 1, target_w, target_px_h)
                    .unwrap_or(top);

                buf.set_string(
                    x0 + cx,
                    y0 + cy,
                    HALF_BLOCK,
                    Style::default().fg(top).bg(bottom),
                );
            }
        }
    }
}

impl ImageBlock<'_> {
    /// Nearest-neighbor sample in target pixel space.
    fn sample(&self, tx: u32, ty: u32, target_w: u16, target_px_h: u32) -> Color {
        self.sample_checked(tx, ty, target_w, target_px_h)
            .unwrap_or(Color::Reset)
    }

    fn sample_checked(&self, tx: u32, ty: u32, target_w: u16, target_px_h: u32) -> Option<Color> {
        if ty >= target_px_h {
            return None;
        }
        let sx = (tx * self.preview.width) / u32::from(target_w);
        let sy = (ty * self.preview.height) / target_px_h;
        let [r, g, b, _] = self
            .preview
            .pixel(sx.min(self.preview.width - 1), sy.min(self.preview.height - 1))?;
        Some(Color::Rgb(r, g, b))
    }
}
