//! Page drawing on top of `printpdf`.
//!
//! Reports draw into a [`PdfDocument`] that records text, lines and filled
//! rectangles per page, using millimetres measured from the top-left corner.
//! Nothing touches `printpdf` until [`PdfDocument::to_bytes`], which replays
//! the recorded pages onto a printpdf document with the built-in Helvetica
//! faces. Recording first lets the layout jump back to earlier pages (page
//! footers need the final page count) and keeps rendered content inspectable.

use printpdf::path::PaintMode;
use printpdf::{
    BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument as PrintPdfDocument, PdfLayerReference,
    Point, Rect, Rgb,
};

use crate::error::{ReportError, Result};

const POINTS_PER_MM: f64 = 72.0 / 25.4;
/// Average Helvetica glyph advance as a fraction of the font size.
const AVG_GLYPH_WIDTH: f64 = 0.5;
const LAYER_NAME: &str = "Content";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b }
    }

    fn to_printpdf(self) -> printpdf::Color {
        printpdf::Color::Rgb(Rgb::new(
            (f64::from(self.r) / 255.0) as _,
            (f64::from(self.g) / 255.0) as _,
            (f64::from(self.b) / 255.0) as _,
            None,
        ))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Op {
    Text {
        x: f64,
        y: f64,
        size: f64,
        font: Font,
        color: Color,
        text: String,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Color,
    },
    FillRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
        color: Color,
    },
}

#[derive(Debug, Clone, Default)]
struct Page {
    ops: Vec<Op>,
}

#[derive(Debug, Clone)]
pub struct PdfDocument {
    width: f64,
    height: f64,
    pages: Vec<Page>,
    current: usize,
    title: String,
}

impl PdfDocument {
    /// A document with one empty page of the given size in millimetres.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            pages: vec![Page::default()],
            current: 0,
            title: String::new(),
        }
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    /// Appends a page and makes it the drawing target.
    pub fn add_page(&mut self) {
        self.pages.push(Page::default());
        self.current = self.pages.len() - 1;
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Redirects drawing to an existing page. Out-of-range indices are
    /// clamped to the last page.
    pub fn select_page(&mut self, index: usize) {
        self.current = index.min(self.pages.len() - 1);
    }

    pub fn text(&mut self, x: f64, y: f64, size: f64, font: Font, color: Color, text: &str) {
        self.push(Op::Text {
            x,
            y,
            size,
            font,
            color,
            text: text.to_string(),
        });
    }

    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, width: f64, color: Color) {
        self.push(Op::Line {
            x1,
            y1,
            x2,
            y2,
            width,
            color,
        });
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: Color) {
        self.push(Op::FillRect { x, y, w, h, color });
    }

    fn push(&mut self, op: Op) {
        self.pages[self.current].ops.push(op);
    }

    /// Text runs drawn on one page, in drawing order.
    pub fn page_texts(&self, index: usize) -> Vec<&str> {
        self.pages
            .get(index)
            .map(|page| page.ops.iter().filter_map(op_text).collect())
            .unwrap_or_default()
    }

    /// Text runs across all pages, in page then drawing order.
    pub fn texts(&self) -> Vec<&str> {
        self.pages
            .iter()
            .flat_map(|page| page.ops.iter().filter_map(op_text))
            .collect()
    }

    /// Serializes the document through printpdf.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let (doc, first_page, first_layer) = PrintPdfDocument::new(
            self.title.as_str(),
            Mm(self.width as _),
            Mm(self.height as _),
            LAYER_NAME,
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;

        for (index, page) in self.pages.iter().enumerate() {
            let (page_index, layer_index) = if index == 0 {
                (first_page, first_layer)
            } else {
                doc.add_page(Mm(self.width as _), Mm(self.height as _), LAYER_NAME)
            };
            let layer = doc.get_page(page_index).get_layer(layer_index);
            for op in &page.ops {
                self.draw(&layer, op, &regular, &bold);
            }
        }

        doc.save_to_bytes().map_err(pdf_error)
    }

    fn draw(&self, layer: &PdfLayerReference, op: &Op, regular: &IndirectFontRef, bold: &IndirectFontRef) {
        match op {
            Op::Text {
                x,
                y,
                size,
                font,
                color,
                text,
            } => {
                let face = match font {
                    Font::Regular => regular,
                    Font::Bold => bold,
                };
                layer.set_fill_color(color.to_printpdf());
                layer.use_text(text.as_str(), *size as _, Mm(*x as _), self.flip(*y), face);
            }
            Op::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => {
                layer.set_outline_color(color.to_printpdf());
                layer.set_outline_thickness((width * POINTS_PER_MM) as _);
                layer.add_line(Line {
                    points: vec![
                        (Point::new(Mm(*x1 as _), self.flip(*y1)), false),
                        (Point::new(Mm(*x2 as _), self.flip(*y2)), false),
                    ],
                    is_closed: false,
                });
            }
            Op::FillRect { x, y, w, h, color } => {
                layer.set_fill_color(color.to_printpdf());
                let rect = Rect::new(Mm(*x as _), self.flip(y + h), Mm((x + w) as _), self.flip(*y))
                    .with_mode(PaintMode::Fill);
                layer.add_rect(rect);
            }
        }
    }

    /// Top-left millimetres to printpdf's bottom-left origin.
    fn flip(&self, y: f64) -> Mm {
        Mm((self.height - y) as _)
    }
}

fn op_text(op: &Op) -> Option<&str> {
    match op {
        Op::Text { text, .. } => Some(text.as_str()),
        _ => None,
    }
}

fn pdf_error(err: printpdf::Error) -> ReportError {
    ReportError::Pdf(err.to_string())
}

/// Approximate rendered width of `text` in millimetres.
pub fn estimate_text_width(text: &str, size: f64) -> f64 {
    text.chars().count() as f64 * size * AVG_GLYPH_WIDTH / POINTS_PER_MM
}

/// Shortens `text` with a trailing "..." so it fits in `max_width` mm.
pub fn fit_text(text: &str, size: f64, max_width: f64) -> String {
    if estimate_text_width(text, size) <= max_width {
        return text.to_string();
    }
    let per_char = size * AVG_GLYPH_WIDTH / POINTS_PER_MM;
    let keep = ((max_width / per_char) as usize).saturating_sub(3);
    let mut fitted: String = text.chars().take(keep).collect();
    fitted.push_str("...");
    fitted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PdfDocument {
        let mut doc = PdfDocument::new(210.0, 297.0);
        doc.set_title("Weekly Report");
        doc.text(20.0, 30.0, 12.0, Font::Bold, Color::BLACK, "Hello");
        doc.line(20.0, 32.0, 190.0, 32.0, 0.3, Color::BLACK);
        doc.add_page();
        doc.fill_rect(0.0, 0.0, 210.0, 40.0, Color::rgb(37, 99, 235));
        doc.text(20.0, 20.0, 10.0, Font::Regular, Color::WHITE, "caf\u{e9} (draft)");
        doc
    }

    #[test]
    fn test_serializes_every_page() {
        let doc = sample();
        assert_eq!(doc.page_count(), 2);

        let bytes = doc.to_bytes().unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(String::from_utf8_lossy(&bytes).trim_end().ends_with("%%EOF"));
    }

    #[test]
    fn test_text_is_recorded_per_page() {
        let doc = sample();

        assert_eq!(doc.page_texts(0), vec!["Hello"]);
        assert_eq!(doc.page_texts(1), vec!["caf\u{e9} (draft)"]);
        assert!(doc.page_texts(5).is_empty());
        assert_eq!(doc.texts(), vec!["Hello", "caf\u{e9} (draft)"]);
    }

    #[test]
    fn test_select_page_draws_on_earlier_page() {
        let mut doc = PdfDocument::new(210.0, 297.0);
        doc.add_page();
        doc.select_page(0);
        doc.text(10.0, 10.0, 8.0, Font::Regular, Color::BLACK, "first");
        doc.select_page(99);
        doc.text(10.0, 10.0, 8.0, Font::Regular, Color::BLACK, "second");

        assert_eq!(doc.page_texts(0), vec!["first"]);
        assert_eq!(doc.page_texts(1), vec!["second"]);
    }

    #[test]
    fn test_flip_to_bottom_left_origin() {
        let doc = PdfDocument::new(100.0, 200.0);
        let Mm(y) = doc.flip(50.0);
        assert!((f64::from(y) - 150.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_text() {
        assert_eq!(fit_text("Algebra", 10.0, 100.0), "Algebra");

        let long = "A very long subject name that cannot possibly fit";
        let fitted = fit_text(long, 10.0, 30.0);
        assert!(fitted.ends_with("..."));
        assert!(estimate_text_width(&fitted, 10.0) <= 30.0);
    }
}
