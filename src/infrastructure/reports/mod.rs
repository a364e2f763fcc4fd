//! Report Rendering
//!
//! Turns a tabular `ReportDocument` into a downloadable PDF or Word file.

mod docx;
mod pdf;

use chrono::{DateTime, Utc};

pub use self::docx::render_docx;
pub use self::pdf::render_pdf;

/// Renderer-neutral report layout: a heading, key figures, one table.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub title: String,
    pub period: String,
    pub generated_at: DateTime<Utc>,
    pub summary: Vec<(String, String)>,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportDocument {
    pub(crate) fn generated_label(&self) -> String {
        format!("Generated {}", self.generated_at.format("%Y-%m-%d %H:%M UTC"))
    }
}

#[cfg(test)]
pub(crate) fn sample_document() -> ReportDocument {
    ReportDocument {
        title: "Posts report".into(),
        period: "This month".into(),
        generated_at: Utc::now(),
        summary: vec![
            ("Total views".into(), "120".into()),
            ("Average rating".into(), "4.25".into()),
        ],
        columns: vec!["Title".into(), "Author".into(), "Views".into()],
        rows: (0..60)
            .map(|i| vec![format!("Post {}", i), "alice".into(), (i * 3).to_string()])
            .collect(),
    }
}
