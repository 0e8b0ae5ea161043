//! `printpdf` implementation of [`Canvas`].
//!
//! Layout coordinates are top-left based points; PDF pages are bottom-left
//! based, so `y` is flipped against the page height on the way in.

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Rgb as PdfRgb,
};

use super::canvas::{Canvas, Rect, Rgb, TextMetrics};
use super::export::ExportError;
use super::layout::PageGeometry;
use super::metrics::HelveticaMetrics;

const LAYER_NAME: &str = "Transcript";
const PT_TO_MM: f32 = 25.4 / 72.0;
/// Bezier handle length for a quarter circle.
const KAPPA: f32 = 0.552_284_8;
const RULE_THICKNESS: f32 = 0.75;

fn mm(points: f32) -> Mm {
    Mm(points * PT_TO_MM)
}

fn pdf_color(color: Rgb) -> Color {
    Color::Rgb(PdfRgb::new(
        f32::from(color.r) / 255.0,
        f32::from(color.g) / 255.0,
        f32::from(color.b) / 255.0,
        None,
    ))
}

/// A PDF document being drawn with the built-in Helvetica face.
pub struct PdfCanvas {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    geometry: PageGeometry,
    metrics: HelveticaMetrics,
    font_size: f32,
    text_color: Rgb,
    fill_color: Rgb,
    draw_color: Rgb,
    pages: usize,
}

impl PdfCanvas {
    /// Opens a one-page document.
    ///
    /// # Errors
    /// Returns [`ExportError`] of kind `CanvasUnavailable` when the font
    /// cannot be registered.
    pub fn new(title: &str, geometry: PageGeometry) -> Result<Self, ExportError> {
        let (doc, page, layer) = PdfDocument::new(
            title,
            mm(geometry.width),
            mm(geometry.height),
            LAYER_NAME,
        );
        let font = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| ExportError::canvas_unavailable(format!("load Helvetica: {e:?}")))?;
        let layer = doc.get_page(page).get_layer(layer);

        Ok(Self {
            doc,
            layer,
            font,
            geometry,
            metrics: HelveticaMetrics,
            font_size: 10.0,
            text_color: Rgb::BLACK,
            fill_color: Rgb::BLACK,
            draw_color: Rgb::BLACK,
            pages: 1,
        })
    }

    pub fn page_count(&self) -> usize {
        self.pages
    }

    /// Serializes the document.
    ///
    /// # Errors
    /// Returns [`ExportError`] of kind `Render` when serialization fails.
    pub fn finish(self) -> Result<Vec<u8>, ExportError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| ExportError::render(format!("serialize PDF: {e:?}")))
    }

    fn point(&self, x: f32, y: f32) -> Point {
        Point::new(mm(x), mm(self.geometry.height - y))
    }
}

impl TextMetrics for PdfCanvas {
    fn text_width(&self, text: &str, font_size: f32) -> f32 {
        self.metrics.text_width(text, font_size)
    }

    fn ascent(&self, font_size: f32) -> f32 {
        self.metrics.ascent(font_size)
    }
}

impl Canvas for PdfCanvas {
    fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.text_color = color;
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.fill_color = color;
    }

    fn set_draw_color(&mut self, color: Rgb) {
        self.draw_color = color;
    }

    fn rounded_rect(&mut self, rect: Rect, radius: f32) {
        let r = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
        let k = r * KAPPA;
        let (left, right, top, bottom) = (rect.x, rect.right(), rect.y, rect.bottom());

        // Clockwise from the top edge; `true` marks bezier handles.
        let outline = [
            (left + r, top, false),
            (right - r, top, false),
            (right - r + k, top, true),
            (right, top + r - k, true),
            (right, top + r, false),
            (right, bottom - r, false),
            (right, bottom - r + k, true),
            (right - r + k, bottom, true),
            (right - r, bottom, false),
            (left + r, bottom, false),
            (left + r - k, bottom, true),
            (left, bottom - r + k, true),
            (left, bottom - r, false),
            (left, top + r, false),
            (left, top + r - k, true),
            (left + r - k, top, true),
            (left + r, top, false),
        ];
        let ring = outline
            .iter()
            .map(|&(x, y, handle)| (self.point(x, y), handle))
            .collect();

        self.layer.set_fill_color(pdf_color(self.fill_color));
        self.layer.add_polygon(Polygon {
            rings: vec![ring],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }

    fn line(&mut self, from: (f32, f32), to: (f32, f32)) {
        self.layer.set_outline_color(pdf_color(self.draw_color));
        self.layer.set_outline_thickness(RULE_THICKNESS);
        self.layer.add_line(Line {
            points: vec![
                (self.point(from.0, from.1), false),
                (self.point(to.0, to.1), false),
            ],
            is_closed: false,
        });
    }

    fn text(&mut self, text: &str, x: f32, y: f32) {
        self.layer.set_fill_color(pdf_color(self.text_color));
        self.layer.use_text(
            text,
            self.font_size,
            mm(x),
            mm(self.geometry.height - y),
            &self.font,
        );
    }

    fn add_page(&mut self) {
        let (page, layer) = self.doc.add_page(
            mm(self.geometry.width),
            mm(self.geometry.height),
            LAYER_NAME,
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.pages += 1;
    }
}
