pub mod bbox_xml;
pub mod drawings;
pub mod poppler;

use crate::error::LegmarkError;
use crate::model::{Drawing, Word};
use serde::{Deserialize, Serialize};

/// Raw geometry extracted from a single page of a PDF.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageLayout {
    /// 1-based.
    pub page_number: usize,
    pub width: f64,
    pub height: f64,
    pub words: Vec<Word>,
    #[serde(default)]
    pub drawings: Vec<Drawing>,
    /// Page `/Rotate` in degrees (`0..360`).
    #[serde(default)]
    pub rotation: i64,
}

impl PageLayout {
    pub fn new(page_number: usize, words: Vec<Word>, drawings: Vec<Drawing>) -> Self {
        PageLayout {
            page_number,
            width: 0.0,
            height: 0.0,
            words,
            drawings,
            rotation: 0,
        }
    }
}

/// Trait for PDF layout extraction backends.
pub trait PageSource: Send + Sync {
    /// Extract words and drawings from PDF bytes, one `PageLayout` per page in document order.
    fn extract_layouts(&self, pdf_bytes: &[u8]) -> Result<Vec<PageLayout>, LegmarkError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}
