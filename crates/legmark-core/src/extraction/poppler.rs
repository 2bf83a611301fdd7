use crate::error::LegmarkError;
use crate::extraction::bbox_xml::parse_bbox_xml;
use crate::extraction::drawings::extract_drawings;
use crate::extraction::{PageLayout, PageSource};
use std::io::Write;
use std::process::Command;

/// Layout backend combining poppler's `pdftotext -bbox` for words with a
/// content-stream scan for drawings.
pub struct PopplerExtractor;

impl PopplerExtractor {
    pub fn new() -> Self {
        PopplerExtractor
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PopplerExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PageSource for PopplerExtractor {
    fn extract_layouts(&self, pdf_bytes: &[u8]) -> Result<Vec<PageLayout>, LegmarkError> {
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| LegmarkError::Extraction(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| LegmarkError::Extraction(e.to_string()))?;

        let output = Command::new("pdftotext")
            .arg("-bbox")
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    LegmarkError::PdftotextNotFound
                } else {
                    LegmarkError::Extraction(format!("pdftotext -bbox failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            return Err(LegmarkError::PdftotextFailed { code, stderr });
        }

        let xml = String::from_utf8_lossy(&output.stdout);
        let word_pages = parse_bbox_xml(&xml)?;
        let drawing_pages = extract_drawings(pdf_bytes)?;

        if word_pages.len() != drawing_pages.len() {
            return Err(LegmarkError::PageCountMismatch {
                words: word_pages.len(),
                drawings: drawing_pages.len(),
            });
        }

        let layouts = word_pages
            .into_iter()
            .zip(drawing_pages)
            .enumerate()
            .map(|(i, (words, drawings))| PageLayout {
                page_number: i + 1,
                width: if words.width > 0.0 {
                    words.width
                } else {
                    drawings.width
                },
                height: if words.height > 0.0 {
                    words.height
                } else {
                    drawings.height
                },
                words: words.words,
                rotation: drawings.rotation,
                drawings: drawings.drawings,
            })
            .collect();

        Ok(layouts)
    }

    fn backend_name(&self) -> &str {
        "poppler+lopdf"
    }
}
