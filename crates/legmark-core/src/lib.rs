pub mod corpus;
pub mod error;
pub mod extraction;
pub mod layout;
pub mod markdown;
pub mod model;
pub mod report;
pub mod services;

use error::LegmarkError;
use extraction::{PageLayout, PageSource};
use layout::LayoutOptions;
use report::{DocumentReport, PageReport};
use serde::{Deserialize, Serialize};

/// Markdown for one document plus the statistics gathered while building it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvertedDocument {
    pub markdown: String,
    pub report: DocumentReport,
}

/// Main API entry point: convert PDF bytes to strikethrough-aware markdown.
pub fn convert_pdf(
    pdf_bytes: &[u8],
    source: &dyn PageSource,
    options: &LayoutOptions,
) -> Result<ConvertedDocument, LegmarkError> {
    options.validate()?;
    let layouts = source.extract_layouts(pdf_bytes)?;
    let mut converted = convert_layouts(layouts, options);
    converted.report.backend = Some(source.backend_name().to_string());
    Ok(converted)
}

/// Reconstruct already-extracted pages.
///
/// Each page keeps its own `page_number`; a zero number falls back to the
/// page's 1-based position.
pub fn convert_layouts(mut layouts: Vec<PageLayout>, options: &LayoutOptions) -> ConvertedDocument {
    let mut report = DocumentReport::default();
    let mut bodies = Vec::with_capacity(layouts.len());

    for (i, page) in layouts.iter_mut().enumerate() {
        let page_number = if page.page_number > 0 {
            page.page_number
        } else {
            i + 1
        };
        let (body, counts) = layout::reconstruct_page(&mut page.words, &page.drawings, options);
        tracing::debug!(
            page = page_number,
            words = page.words.len(),
            strike_lines = counts.strike_lines,
            struck = counts.struck_words,
            rows = counts.rows,
            "page reconstructed"
        );
        report.push_page(PageReport::new(
            page_number,
            page.words.len(),
            page.drawings.len(),
            counts,
        ));
        report.note_rotation(page_number, page.rotation);
        bodies.push((page_number, body));
    }

    ConvertedDocument {
        markdown: markdown::assemble_numbered(&bodies),
        report,
    }
}

/// Extract raw page geometry without reconstructing it.
pub fn extract_pdf(
    pdf_bytes: &[u8],
    source: &dyn PageSource,
) -> Result<Vec<PageLayout>, LegmarkError> {
    source.extract_layouts(pdf_bytes)
}
