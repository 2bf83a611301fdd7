use super::retry::RetryPolicy;
use super::CollaboratorError;
use crate::error::LegmarkError;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// A bill listed for a legislative session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillListing {
    pub bill_number: String,
    pub title: Option<String>,
    pub synopsis: Option<String>,
}

/// Locators of a bill's PDFs. Amendments are in the order the source lists them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BillDocuments {
    /// `None` when the source has no text for the bill yet.
    pub bill: Option<String>,
    pub amendments: Vec<String>,
}

/// Where bill and amendment PDFs come from (a legislature website, a mirror).
pub trait DocumentSource: Send + Sync {
    /// Bills that passed in the given regular session.
    fn list_bills(&self, session_year: u16) -> Result<Vec<BillListing>, CollaboratorError>;

    /// Latest bill text and the amendments that follow it.
    fn bill_documents(
        &self,
        session_year: u16,
        bill_number: &str,
    ) -> Result<BillDocuments, CollaboratorError>;

    /// Download one document.
    fn fetch(&self, locator: &str) -> Result<Vec<u8>, CollaboratorError>;
}

/// Strip a trailing parenthetical from a listed bill number: `HB0001 (CH0012)` -> `HB0001`.
pub fn normalize_bill_number(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.rfind(" (") {
        Some(idx) if trimmed.ends_with(')') => trimmed[..idx].trim_end(),
        _ => trimmed,
    }
}

/// `<BILL>.pdf` for the bill, `<BILL>_amd<i>.pdf` (1-based) for amendments.
pub fn document_file_name(bill_number: &str, amendment: Option<usize>) -> String {
    match amendment {
        Some(i) => format!("{bill_number}_amd{i}.pdf"),
        None => format!("{bill_number}.pdf"),
    }
}

fn is_safe_stem(bill_number: &str) -> bool {
    !bill_number.is_empty()
        && bill_number
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[derive(Debug, Clone, Serialize)]
pub struct FailedFetch {
    /// Locator, or the bill number when its document list could not be read.
    pub what: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BillDownload {
    pub bill_number: String,
    pub written: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<FailedFetch>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DownloadReport {
    pub bills: Vec<BillListing>,
    pub downloads: Vec<BillDownload>,
}

impl DownloadReport {
    pub fn written(&self) -> usize {
        self.downloads.iter().map(|d| d.written.len()).sum()
    }

    pub fn failed(&self) -> usize {
        self.downloads.iter().map(|d| d.failed.len()).sum()
    }
}

/// Download every passed bill of a session, with its amendments, into `pdf_dir`.
///
/// A failed listing aborts the run. A bill or document that cannot be fetched
/// is logged and recorded; the run continues. Existing files are kept unless
/// `overwrite` is set.
pub fn download_session(
    source: &dyn DocumentSource,
    session_year: u16,
    pdf_dir: &Path,
    overwrite: bool,
    policy: &RetryPolicy,
) -> Result<DownloadReport, LegmarkError> {
    policy.validate()?;
    let mut bills = policy
        .run(|| source.list_bills(session_year))
        .ok_or_else(|| {
            LegmarkError::SourceUnavailable(format!("could not list bills for {session_year}"))
        })?;
    for bill in &mut bills {
        bill.bill_number = normalize_bill_number(&bill.bill_number).to_string();
    }
    std::fs::create_dir_all(pdf_dir)?;
    tracing::info!(session = session_year, bills = bills.len(), dir = %pdf_dir.display(), "downloading session");

    let mut downloads = Vec::with_capacity(bills.len());
    for listing in &bills {
        downloads.push(download_bill(
            source,
            session_year,
            &listing.bill_number,
            pdf_dir,
            overwrite,
            policy,
        ));
    }

    let report = DownloadReport { bills, downloads };
    tracing::info!(
        written = report.written(),
        failed = report.failed(),
        "session download finished"
    );
    Ok(report)
}

fn download_bill(
    source: &dyn DocumentSource,
    session_year: u16,
    bill_number: &str,
    pdf_dir: &Path,
    overwrite: bool,
    policy: &RetryPolicy,
) -> BillDownload {
    let mut result = BillDownload {
        bill_number: bill_number.to_string(),
        written: Vec::new(),
        skipped: Vec::new(),
        failed: Vec::new(),
    };

    if !is_safe_stem(bill_number) {
        tracing::warn!(bill = bill_number, "bill number is not a usable file name");
        result.failed.push(FailedFetch {
            what: bill_number.to_string(),
            reason: "bill number is not a usable file name".into(),
        });
        return result;
    }

    let Some(documents) = policy.run(|| source.bill_documents(session_year, bill_number)) else {
        result.failed.push(FailedFetch {
            what: bill_number.to_string(),
            reason: "document list unavailable".into(),
        });
        return result;
    };

    let Some(bill_locator) = documents.bill else {
        tracing::warn!(bill = bill_number, "no bill text listed, skipping");
        return result;
    };

    let targets = std::iter::once((bill_locator, None)).chain(
        documents
            .amendments
            .into_iter()
            .enumerate()
            .map(|(i, locator)| (locator, Some(i + 1))),
    );

    for (locator, amendment) in targets {
        let path = pdf_dir.join(document_file_name(bill_number, amendment));
        if path.exists() && !overwrite {
            result.skipped.push(path);
            continue;
        }
        match policy.run(|| source.fetch(&locator)) {
            Some(bytes) => match std::fs::write(&path, bytes) {
                Ok(()) => result.written.push(path),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "could not save document");
                    result.failed.push(FailedFetch {
                        what: locator,
                        reason: e.to_string(),
                    });
                }
            },
            None => {
                tracing::warn!(bill = bill_number, locator = %locator, "download failed");
                result.failed.push(FailedFetch {
                    what: locator,
                    reason: "download failed".into(),
                });
            }
        }
    }

    result
}
