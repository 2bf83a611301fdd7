use crate::layout::PageCounts;
use serde::{Deserialize, Serialize};

pub const REPORT_SCHEMA_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageReport {
    pub page_number: usize,
    pub words: usize,
    pub drawings: usize,
    pub strike_lines: usize,
    pub struck_words: usize,
    pub rows: usize,
    pub lines: usize,
}

impl PageReport {
    pub fn new(page_number: usize, words: usize, drawings: usize, counts: PageCounts) -> Self {
        PageReport {
            page_number,
            words,
            drawings,
            strike_lines: counts.strike_lines,
            struck_words: counts.struck_words,
            rows: counts.rows,
            lines: counts.lines,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// No extractable words; the page is probably a scanned image.
    NoText,
    /// Every word on the page is struck.
    FullyStruck,
    /// The page carries `/Rotate`; strike lines are matched unrotated.
    Rotated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportWarning {
    pub page_number: usize,
    pub kind: WarningKind,
    pub message: String,
}

/// Per-document reconstruction statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentReport {
    pub report_schema_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    pub pages: Vec<PageReport>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ReportWarning>,
}

impl Default for DocumentReport {
    fn default() -> Self {
        Self {
            report_schema_version: REPORT_SCHEMA_VERSION.to_string(),
            backend: None,
            pages: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

impl DocumentReport {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn total_words(&self) -> usize {
        self.pages.iter().map(|p| p.words).sum()
    }

    pub fn total_struck_words(&self) -> usize {
        self.pages.iter().map(|p| p.struck_words).sum()
    }

    /// Record a page and derive its warnings.
    pub fn push_page(&mut self, page: PageReport) {
        if page.words == 0 {
            self.warnings.push(ReportWarning {
                page_number: page.page_number,
                kind: WarningKind::NoText,
                message: format!(
                    "page {} has no extractable text; it may need optical recognition",
                    page.page_number
                ),
            });
        } else if page.struck_words == page.words {
            self.warnings.push(ReportWarning {
                page_number: page.page_number,
                kind: WarningKind::FullyStruck,
                message: format!("every word on page {} is struck through", page.page_number),
            });
        }
        self.pages.push(page);
    }

    /// Record that a page is displayed rotated. Zero rotation is ignored.
    pub fn note_rotation(&mut self, page_number: usize, rotation: i64) {
        if rotation.rem_euclid(360) == 0 {
            return;
        }
        self.warnings.push(ReportWarning {
            page_number,
            kind: WarningKind::Rotated,
            message: format!(
                "page {} is rotated {} degrees; struck text may not be detected",
                page_number,
                rotation.rem_euclid(360)
            ),
        });
    }

    /// Pages that produced no text at all.
    pub fn textless_pages(&self) -> Vec<usize> {
        self.warnings
            .iter()
            .filter(|w| matches!(w.kind, WarningKind::NoText))
            .map(|w| w.page_number)
            .collect()
    }
}
