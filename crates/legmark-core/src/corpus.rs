use crate::error::LegmarkError;
use crate::extraction::PageSource;
use crate::layout::LayoutOptions;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings for converting a directory of PDFs.
#[derive(Debug, Clone, Default)]
pub struct CorpusOptions {
    /// Re-convert documents whose markdown already exists.
    pub overwrite: bool,
    /// Worker threads; `None` uses the global rayon pool.
    pub jobs: Option<usize>,
    pub layout: LayoutOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentOutcome {
    Converted { pages: usize, struck_words: usize },
    /// Output already existed and `overwrite` was off.
    Skipped,
    Failed { reason: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    pub input: PathBuf,
    pub output: PathBuf,
    #[serde(flatten)]
    pub outcome: DocumentOutcome,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CorpusReport {
    pub documents: Vec<DocumentResult>,
}

impl CorpusReport {
    pub fn converted(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Converted { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DocumentOutcome::Failed { .. }))
    }

    /// Pages of the documents converted in this run.
    pub fn total_pages(&self) -> usize {
        self.documents
            .iter()
            .map(|d| match d.outcome {
                DocumentOutcome::Converted { pages, .. } => pages,
                _ => 0,
            })
            .sum()
    }

    fn count(&self, pred: impl Fn(&DocumentOutcome) -> bool) -> usize {
        self.documents.iter().filter(|d| pred(&d.outcome)).count()
    }
}

/// PDF files directly inside `dir`, sorted by path.
pub fn list_pdfs(dir: &Path) -> Result<Vec<PathBuf>, LegmarkError> {
    if !dir.is_dir() {
        return Err(LegmarkError::MissingInputDir(dir.to_path_buf()));
    }
    let mut pdfs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let is_pdf = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("pdf"))
            .unwrap_or(false);
        if is_pdf && path.is_file() {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

/// `<output_dir>/<stem>.md` for an input PDF.
pub fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".into());
    output_dir.join(format!("{stem}.md"))
}

/// Convert every PDF in `input_dir` to markdown in `output_dir`.
///
/// Documents are independent and converted in parallel. A document that fails
/// to extract is logged and recorded as failed; it never aborts the run.
pub fn convert_corpus(
    input_dir: &Path,
    output_dir: &Path,
    source: &dyn PageSource,
    options: &CorpusOptions,
) -> Result<CorpusReport, LegmarkError> {
    options.layout.validate()?;
    let inputs = list_pdfs(input_dir)?;
    std::fs::create_dir_all(output_dir)?;
    tracing::info!(
        documents = inputs.len(),
        input = %input_dir.display(),
        output = %output_dir.display(),
        "converting corpus"
    );

    let run = || -> Vec<DocumentResult> {
        inputs
            .par_iter()
            .map(|input| convert_one(input, output_dir, source, options))
            .collect()
    };

    let documents = match options.jobs {
        Some(jobs) => rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| LegmarkError::WorkerPool(e.to_string()))?
            .install(run),
        None => run(),
    };

    let report = CorpusReport { documents };
    tracing::info!(
        converted = report.converted(),
        skipped = report.skipped(),
        failed = report.failed(),
        pages = report.total_pages(),
        "corpus finished"
    );
    Ok(report)
}

fn convert_one(
    input: &Path,
    output_dir: &Path,
    source: &dyn PageSource,
    options: &CorpusOptions,
) -> DocumentResult {
    let output = output_path(output_dir, input);
    let outcome = if output.exists() && !options.overwrite {
        tracing::debug!(output = %output.display(), "already converted, skipping");
        DocumentOutcome::Skipped
    } else {
        match convert_file(input, &output, source, &options.layout) {
            Ok((pages, struck_words)) => {
                tracing::info!(input = %input.display(), pages, struck_words, "converted");
                DocumentOutcome::Converted {
                    pages,
                    struck_words,
                }
            }
            Err(e) => {
                tracing::warn!(input = %input.display(), error = %e, "unreadable document, skipping");
                DocumentOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    };

    DocumentResult {
        input: input.to_path_buf(),
        output,
        outcome,
    }
}

fn convert_file(
    input: &Path,
    output: &Path,
    source: &dyn PageSource,
    options: &LayoutOptions,
) -> Result<(usize, usize), LegmarkError> {
    let pdf_bytes = std::fs::read(input)?;
    let converted = crate::convert_pdf(&pdf_bytes, source, options)?;
    std::fs::write(output, &converted.markdown)?;
    Ok((
        converted.report.page_count(),
        converted.report.total_struck_words(),
    ))
}
