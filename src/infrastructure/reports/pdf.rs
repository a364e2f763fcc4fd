//! PDF rendering with embedded DejaVu Sans fonts.
//!
//! printpdf's built-in fonts are WinAnsi-encoded and drop Cyrillic, so both
//! faces are embedded from `assets/fonts`.

use printpdf::{IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};

use super::ReportDocument;
use crate::shared::error::AppError;

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 7.0;
const BODY_SIZE: f32 = 10.0;

static REGULAR_FONT: &[u8] = include_bytes!("../../../assets/fonts/DejaVuSans.ttf");
static BOLD_FONT: &[u8] = include_bytes!("../../../assets/fonts/DejaVuSans-Bold.ttf");

fn pdf_error(e: printpdf::Error) -> AppError {
    AppError::Internal(format!("PDF rendering failed: {}", e))
}

/// Cut `text` to at most `max` characters, marking the cut.
fn fit(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('~');
    cut
}

/// Cursor over the pages of a document being written top to bottom.
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl PageWriter<'_> {
    fn line(&mut self, text: &str, size: f32, x: f32, font: &IndirectFontRef) {
        self.layer.use_text(text, size, Mm(x), Mm(self.y), font);
    }

    fn advance(&mut self, by: f32) {
        self.y -= by;
        if self.y < MARGIN {
            let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }
}

/// Render the report as PDF bytes.
pub fn render_pdf(report: &ReportDocument) -> Result<Vec<u8>, AppError> {
    let (doc, page, layer) =
        PdfDocument::new(&report.title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let regular = doc.add_external_font(REGULAR_FONT).map_err(pdf_error)?;
    let bold = doc.add_external_font(BOLD_FONT).map_err(pdf_error)?;

    {
        let mut w = PageWriter {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            y: PAGE_HEIGHT - MARGIN,
        };

        w.line(&report.title, 18.0, MARGIN, &bold);
        w.advance(LINE_HEIGHT * 1.5);
        w.line(&report.period, 12.0, MARGIN, &regular);
        w.advance(LINE_HEIGHT);
        w.line(&report.generated_label(), 9.0, MARGIN, &regular);
        w.advance(LINE_HEIGHT * 1.5);

        for (label, value) in &report.summary {
            w.line(&format!("{}: {}", label, value), 11.0, MARGIN, &regular);
            w.advance(LINE_HEIGHT);
        }
        w.advance(LINE_HEIGHT);

        let columns = report.columns.len().max(1);
        let col_width = (PAGE_WIDTH - 2.0 * MARGIN) / columns as f32;
        // DejaVu Sans at 10pt averages roughly 2mm per character.
        let max_chars = ((col_width / 2.0) as usize).max(4);

        for (i, column) in report.columns.iter().enumerate() {
            w.line(&fit(column, max_chars), BODY_SIZE, MARGIN + col_width * i as f32, &bold);
        }
        w.advance(LINE_HEIGHT);

        for row in &report.rows {
            for (i, cell) in row.iter().enumerate().take(columns) {
                w.line(&fit(cell, max_chars), BODY_SIZE, MARGIN + col_width * i as f32, &regular);
            }
            w.advance(LINE_HEIGHT);
        }
    }

    doc.save_to_bytes().map_err(pdf_error)
}
