//! PDF rendering of the report document.
//!
//! `PdfSurface` replays the top-left based draw instructions onto a US
//! Letter `printpdf` document using the built-in Helvetica faces. Text is
//! wrapped with a fixed average glyph advance.

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerIndex, PdfLayerReference, PdfPageIndex, Pt, Rect, Rgb,
};

use crate::errors::AppError;
use crate::models::document::{Align, Document, DrawOp, Font, Surface};

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const RIGHT_MARGIN: f32 = 72.0;
const LAYER_NAME: &str = "Report";

// Helvetica averages about half an em per glyph.
const GLYPH_ADVANCE_EM: f32 = 0.5;
const ASCENT_EM: f32 = 0.8;
const LINE_PITCH_EM: f32 = 1.15;

fn mm(points: f32) -> Mm {
    Mm::from(Pt(points))
}

/// Parse `#rrggbb` or one of the named colors used by the layout.
pub fn parse_color(value: &str) -> (f32, f32, f32) {
    let channel = |hex: &str| u8::from_str_radix(hex, 16).map(|v| f32::from(v) / 255.0);
    if let Some(hex) = value.strip_prefix('#').filter(|h| h.len() == 6) {
        if let (Ok(r), Ok(g), Ok(b)) = (channel(&hex[0..2]), channel(&hex[2..4]), channel(&hex[4..6])) {
            return (r, g, b);
        }
    }
    match value {
        "white" => (1.0, 1.0, 1.0),
        "red" => (1.0, 0.0, 0.0),
        "green" => (0.0, 0.5, 0.0),
        _ => (0.0, 0.0, 0.0),
    }
}

fn color(value: &str) -> Color {
    let (r, g, b) = parse_color(value);
    Color::Rgb(Rgb::new(r, g, b, None))
}

/// Greedy word wrap to at most `max_chars` characters per line. Words longer
/// than a line are split.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            loop {
                let used = line.chars().count();
                let needed = if used == 0 { word.len() } else { used + 1 + word.len() };
                if needed <= max_chars {
                    if used > 0 {
                        line.push(' ');
                    }
                    line.extend(word.iter());
                    break;
                }
                if used > 0 {
                    lines.push(std::mem::take(&mut line));
                    continue;
                }
                let rest = word.split_off(max_chars);
                lines.push(word.into_iter().collect());
                word = rest;
                if word.is_empty() {
                    break;
                }
            }
        }
        lines.push(line);
    }
    lines
}

/// `Surface` writing into an in-memory PDF.
pub struct PdfSurface {
    doc: PdfDocumentReference,
    initial: Option<(PdfPageIndex, PdfLayerIndex)>,
    layer: Option<PdfLayerReference>,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl PdfSurface {
    pub fn new(title: &str) -> Result<Self, AppError> {
        let (doc, page, layer) =
            PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER_NAME);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::Render(format!("Failed to load Helvetica: {e}")))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::Render(format!("Failed to load Helvetica-Bold: {e}")))?;

        Ok(Self {
            doc,
            initial: Some((page, layer)),
            layer: None,
            regular,
            bold,
        })
    }

    /// Serialize the finished PDF.
    pub fn finish(self) -> Result<Vec<u8>, AppError> {
        self.doc
            .save_to_bytes()
            .map_err(|e| AppError::Render(format!("Failed to serialize PDF: {e}")))
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_text(
        &self,
        layer: &PdfLayerReference,
        text: &str,
        origin: (f32, f32),
        face: Font,
        size: f32,
        fill: &str,
        width: Option<f32>,
        align: Align,
    ) {
        let (x, y) = origin;
        let font = match face {
            Font::Regular => &self.regular,
            Font::Bold => &self.bold,
        };
        let advance = size * GLYPH_ADVANCE_EM;
        let box_width = width.unwrap_or(PAGE_WIDTH - RIGHT_MARGIN - x).max(advance);
        let max_chars = (box_width / advance).floor() as usize;

        layer.set_fill_color(color(fill));
        for (index, line) in wrap_text(text, max_chars).iter().enumerate() {
            let offset = match align {
                Align::Left => 0.0,
                Align::Center => {
                    ((box_width - line.chars().count() as f32 * advance) / 2.0).max(0.0)
                }
            };
            let top = y + index as f32 * size * LINE_PITCH_EM;
            let baseline = PAGE_HEIGHT - (top + size * ASCENT_EM);
            layer.use_text(line.as_str(), size, mm(x + offset), mm(baseline), font);
        }
    }
}

fn rect(x: f32, y: f32, width: f32, height: f32, mode: PaintMode) -> Rect {
    Rect::new(
        mm(x),
        mm(PAGE_HEIGHT - (y + height)),
        mm(x + width),
        mm(PAGE_HEIGHT - y),
    )
    .with_mode(mode)
}

impl Surface for PdfSurface {
    fn begin_page(&mut self, _index: usize) {
        let (page, layer) = match self.initial.take() {
            Some(initial) => initial,
            None => self
                .doc
                .add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), LAYER_NAME),
        };
        self.layer = Some(self.doc.get_page(page).get_layer(layer));
    }

    fn draw(&mut self, op: &DrawOp) {
        let Some(layer) = self.layer.clone() else {
            return;
        };
        match op {
            DrawOp::Image { name, .. } => {
                tracing::debug!(image = %name, "Skipping image without embedded asset");
            }
            DrawOp::Text {
                text,
                x,
                y,
                font,
                size,
                color: fill,
                width,
                align,
            } => self.draw_text(&layer, text, (*x, *y), *font, *size, fill, *width, *align),
            DrawOp::FillRect {
                x,
                y,
                width,
                height,
                color: fill,
            } => {
                layer.set_fill_color(color(fill));
                layer.add_rect(rect(*x, *y, *width, *height, PaintMode::Fill));
            }
            DrawOp::StrokeRect {
                x,
                y,
                width,
                height,
                line_width,
                color: outline,
            } => {
                layer.set_outline_color(color(outline));
                layer.set_outline_thickness(*line_width);
                layer.add_rect(rect(*x, *y, *width, *height, PaintMode::Stroke));
            }
        }
    }
}

/// Replay a document onto a fresh PDF and return its bytes.
pub fn render_pdf(document: &Document, title: &str) -> Result<Vec<u8>, AppError> {
    let mut surface = PdfSurface::new(title)?;
    document.replay(&mut surface);
    let bytes = surface.finish()?;
    tracing::debug!(pages = document.page_count(), bytes = bytes.len(), "Rendered PDF");
    Ok(bytes)
}
