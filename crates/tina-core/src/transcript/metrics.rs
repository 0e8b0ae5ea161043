//! Helvetica glyph widths (standard 14 font AFM, 1/1000 em).

use super::canvas::TextMetrics;

/// Widths for ASCII 32..=126.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const DEFAULT_WIDTH: u16 = 556;
const ASCENT: f32 = 0.718;

/// Metrics of the built-in Helvetica face used by the PDF canvas.
#[derive(Debug, Clone, Copy, Default)]
pub struct HelveticaMetrics;

impl HelveticaMetrics {
    fn glyph_width(ch: char) -> u16 {
        let code = ch as u32;
        if (32..=126).contains(&code) {
            HELVETICA_WIDTHS[(code - 32) as usize]
        } else if ch == '\t' {
            HELVETICA_WIDTHS[0] * 4
        } else {
            DEFAULT_WIDTH
        }
    }
}

impl TextMetrics for HelveticaMetrics {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(Self::glyph_width(c))).sum();
        units as f32 * font_size / 1000.0
    }

    fn ascent(&self, font_size: f32) -> f32 {
        font_size * ASCENT
    }
}
