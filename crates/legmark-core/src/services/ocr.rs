use super::retry::RetryPolicy;
use super::CollaboratorError;
use crate::error::LegmarkError;
use crate::extraction::PageSource;
use crate::layout::LayoutOptions;

/// Hosted optical recognition returning one markdown string per page.
pub trait OcrService: Send + Sync {
    fn ocr_pdf(&self, file_name: &str, pdf_bytes: &[u8]) -> Result<Vec<String>, CollaboratorError>;
}

/// Join OCR pages into one document, separated by a blank line.
pub fn join_ocr_pages<S: AsRef<str>>(pages: &[S]) -> String {
    pages
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Where the markdown for a document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkdownOrigin {
    Layout,
    Ocr,
}

/// Convert with the layout pipeline, falling back to OCR for scanned PDFs.
///
/// A document with no extractable words on any page is sent to `ocr`.
/// OCR output carries no page markers and no strikethrough markup.
pub fn convert_or_ocr(
    file_name: &str,
    pdf_bytes: &[u8],
    source: &dyn PageSource,
    ocr: &dyn OcrService,
    options: &LayoutOptions,
    policy: &RetryPolicy,
) -> Result<(String, MarkdownOrigin), LegmarkError> {
    let converted = crate::convert_pdf(pdf_bytes, source, options)?;
    if converted.report.total_words() > 0 {
        return Ok((converted.markdown, MarkdownOrigin::Layout));
    }

    tracing::info!(file = file_name, "no text layer, falling back to OCR");
    let pages = policy
        .run(|| ocr.ocr_pdf(file_name, pdf_bytes))
        .ok_or_else(|| LegmarkError::Extraction(format!("OCR failed for {file_name}")))?;
    Ok((join_ocr_pages(&pages), MarkdownOrigin::Ocr))
}
