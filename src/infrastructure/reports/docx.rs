//! Word (.docx) rendering with docx-rs.

use std::io::Cursor;

use docx_rs::{Docx, Paragraph, Run, Table, TableCell, TableRow};

use super::ReportDocument;
use crate::shared::error::AppError;

fn text(value: &str, bold: bool, size: usize) -> Paragraph {
    let run = Run::new().add_text(value).size(size);
    Paragraph::new().add_run(if bold { run.bold() } else { run })
}

fn row(cells: &[String], bold: bool) -> TableRow {
    TableRow::new(
        cells
            .iter()
            .map(|c| TableCell::new().add_paragraph(text(c, bold, 20)))
            .collect(),
    )
}

/// Render the report as a .docx archive.
pub fn render_docx(report: &ReportDocument) -> Result<Vec<u8>, AppError> {
    let mut docx = Docx::new()
        .add_paragraph(text(&report.title, true, 36))
        .add_paragraph(text(&report.period, false, 24))
        .add_paragraph(text(&report.generated_label(), false, 18));

    for (label, value) in &report.summary {
        docx = docx.add_paragraph(text(&format!("{}: {}", label, value), false, 22));
    }

    let mut rows = vec![row(&report.columns, true)];
    rows.extend(report.rows.iter().map(|r| row(r, false)));
    docx = docx.add_table(Table::new(rows));

    let mut buffer = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut buffer)
        .map_err(|e| AppError::Internal(format!("Word rendering failed: {}", e)))?;

    Ok(buffer.into_inner())
}
