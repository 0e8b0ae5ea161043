//! Drawing capability used by the transcript layout.
//!
//! Layout only needs [`TextMetrics`]; rendering replays draw operations onto
//! a [`Canvas`]. Coordinates are PDF points with the origin at the top-left
//! corner of the page and `y` growing downwards.

use std::mem;

/// 8-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Axis-aligned rectangle, top-left anchored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

/// Text measurement.
pub trait TextMetrics {
    /// Width of `text` set at `font_size`, in points.
    fn text_width(&self, text: &str, font_size: f32) -> f32;

    /// Distance from the top of a line box to the baseline.
    fn ascent(&self, font_size: f32) -> f32 {
        font_size * 0.75
    }

    /// Word-wraps `text` so every line fits in `max_width`.
    fn split_text_to_size(&self, text: &str, max_width: f32, font_size: f32) -> Vec<String> {
        wrap_text(self, text, max_width, font_size)
    }
}

/// Drawing primitives.
pub trait Canvas: TextMetrics {
    fn set_font_size(&mut self, size: f32);
    fn set_text_color(&mut self, color: Rgb);
    fn set_fill_color(&mut self, color: Rgb);
    fn set_draw_color(&mut self, color: Rgb);
    /// Filled rounded rectangle in the current fill colour.
    fn rounded_rect(&mut self, rect: Rect, radius: f32);
    /// Straight line in the current draw colour.
    fn line(&mut self, from: (f32, f32), to: (f32, f32));
    /// Text with its baseline at `y`.
    fn text(&mut self, text: &str, x: f32, y: f32);
    /// Starts a new page; subsequent drawing goes there.
    fn add_page(&mut self);
}

/// Greedy word wrap.
///
/// Explicit newlines always break. Words wider than `max_width` are split
/// between characters. Runs of spaces collapse to one.
pub fn wrap_text<M: TextMetrics + ?Sized>(
    metrics: &M,
    text: &str,
    max_width: f32,
    font_size: f32,
) -> Vec<String> {
    let fits = |s: &str| metrics.text_width(s, font_size) <= max_width;
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let paragraph = paragraph.trim_end_matches('\r');
        let mut current = String::new();

        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if fits(&candidate) {
                current = candidate;
                continue;
            }

            if !current.is_empty() {
                lines.push(mem::take(&mut current));
            }
            if fits(word) {
                current = word.to_string();
                continue;
            }

            for ch in word.chars() {
                current.push(ch);
                if !fits(&current) && current.chars().count() > 1 {
                    current.pop();
                    lines.push(mem::take(&mut current));
                    current.push(ch);
                }
            }
        }

        lines.push(current);
    }

    lines
}
