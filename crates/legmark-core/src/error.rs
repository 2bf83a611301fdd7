use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum LegmarkError {
    #[error("PDF extraction failed: {0}")]
    Extraction(String),

    #[error("pdftotext not found. Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)")]
    PdftotextNotFound,

    #[error("pdftotext failed with exit code {code}: {stderr}")]
    PdftotextFailed { code: i32, stderr: String },

    #[error("malformed pdftotext bbox output: {0}")]
    BboxXml(String),

    #[error("failed to read PDF structure: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("page count mismatch: pdftotext reported {words} page(s), PDF has {drawings}")]
    PageCountMismatch { words: usize, drawings: usize },

    #[error("invalid layout options: {0}")]
    InvalidOptions(String),

    #[error("failed to load question set from {path}: {reason}")]
    QuestionSetLoad { path: PathBuf, reason: String },

    #[error("invalid question set: {0}")]
    QuestionSetInvalid(String),

    #[error("answer does not match question set: {0}")]
    AnswerInvalid(String),

    #[error("document source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),

    #[error("input directory not found: {0}")]
    MissingInputDir(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
