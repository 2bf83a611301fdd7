use super::retry::RetryPolicy;
use super::CollaboratorError;
use crate::error::LegmarkError;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A model that applies an amendment to a bill given a merge prompt.
pub trait AmendmentMerger: Send + Sync {
    /// Return the amended bill markdown.
    fn merge(&self, prompt: &str) -> Result<String, CollaboratorError>;
}

/// Prompt asking the merger to apply `amendment` to `bill`.
pub fn merge_prompt(bill: &str, amendment: &str) -> String {
    format!(
        "Below you will find bill markdown wrapped in the tags <bill></bill>, \
         followed by amendment markdown wrapped in the tags <amendment></amendment>. \
         Read the bill and amendment markdown carefully, and then apply the instructions \
         found in the amendment markdown to the bill markdown. \
         Respond only with the markdown that results from applying the amendment to the bill. \
         The markdown contents are as follows:\n\
         <bill>\n{bill}\n</bill>\n\n\
         <amendment>\n{amendment}\n</amendment>"
    )
}

/// One bill with its amendments, in the order they apply.
#[derive(Debug, Clone, PartialEq)]
pub struct AmendmentJob {
    pub bill_number: String,
    pub bill: PathBuf,
    pub amendments: Vec<PathBuf>,
    /// `<BILL>_amended.md`
    pub output: PathBuf,
}

impl AmendmentJob {
    pub fn is_done(&self) -> bool {
        self.output.exists()
    }
}

/// Split `HB0548_amd2` into (`HB0548`, 2).
fn parse_amendment_stem(stem: &str) -> Option<(&str, u32)> {
    let (bill, suffix) = stem.split_once("_amd")?;
    if bill.is_empty() {
        return None;
    }
    let n = if suffix.is_empty() {
        1
    } else {
        suffix.parse().ok()?
    };
    Some((bill, n))
}

/// Find every `<BILL>_amd<N>.md` in `md_dir` whose `<BILL>.md` exists.
///
/// Amendments without a base bill are logged and left out.
pub fn plan_amendments(md_dir: &Path) -> Result<Vec<AmendmentJob>, LegmarkError> {
    if !md_dir.is_dir() {
        return Err(LegmarkError::MissingInputDir(md_dir.to_path_buf()));
    }

    let mut by_bill: BTreeMap<String, Vec<(u32, PathBuf)>> = BTreeMap::new();
    for entry in std::fs::read_dir(md_dir)? {
        let path = entry?.path();
        if path.extension().and_then(|e| e.to_str()) != Some("md") {
            continue;
        }
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if let Some((bill, n)) = parse_amendment_stem(stem) {
            by_bill.entry(bill.to_string()).or_default().push((n, path.clone()));
        }
    }

    let mut jobs = Vec::with_capacity(by_bill.len());
    for (bill_number, mut amendments) in by_bill {
        let bill = md_dir.join(format!("{bill_number}.md"));
        if !bill.is_file() {
            tracing::warn!(bill = %bill_number, "amendments found without base bill markdown");
            continue;
        }
        amendments.sort();
        jobs.push(AmendmentJob {
            output: md_dir.join(format!("{bill_number}_amended.md")),
            bill_number,
            bill,
            amendments: amendments.into_iter().map(|(_, p)| p).collect(),
        });
    }
    Ok(jobs)
}

/// Apply every amendment of `job` in order and write the result.
///
/// Returns `Ok(false)` when the merger gives up; nothing is written then.
pub fn run_amendment(
    job: &AmendmentJob,
    merger: &dyn AmendmentMerger,
    policy: &RetryPolicy,
) -> Result<bool, LegmarkError> {
    let mut current = std::fs::read_to_string(&job.bill)?;
    for amendment_path in &job.amendments {
        let amendment = std::fs::read_to_string(amendment_path)?;
        let prompt = merge_prompt(&current, &amendment);
        match policy.run(|| merger.merge(&prompt)) {
            Some(merged) => current = merged,
            None => {
                tracing::warn!(
                    bill = %job.bill_number,
                    amendment = %amendment_path.display(),
                    "amendment merge failed"
                );
                return Ok(false);
            }
        }
    }
    std::fs::write(&job.output, &current)?;
    tracing::info!(
        bill = %job.bill_number,
        amendments = job.amendments.len(),
        output = %job.output.display(),
        "amended bill written"
    );
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    struct Appender;

    impl AmendmentMerger for Appender {
        fn merge(&self, prompt: &str) -> Result<String, CollaboratorError> {
            let bill = between(prompt, "<bill>\n", "\n</bill>");
            let amendment = between(prompt, "<amendment>\n", "\n</amendment>");
            Ok(format!("{bill}+{amendment}"))
        }
    }

    struct Refuser;

    impl AmendmentMerger for Refuser {
        fn merge(&self, _prompt: &str) -> Result<String, CollaboratorError> {
            Err(CollaboratorError::Fatal("quota".into()))
        }
    }

    fn between<'a>(s: &'a str, start: &str, end: &str) -> &'a str {
        let from = s.find(start).unwrap() + start.len();
        let to = s[from..].find(end).unwrap() + from;
        &s[from..to]
    }

    fn instant() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::ZERO,
            factor: 2.0,
        }
    }

    #[test]
    fn test_merge_prompt_wraps_both_documents() {
        let prompt = merge_prompt("BILL TEXT", "AMD TEXT");
        assert!(prompt.starts_with("Below you will find bill markdown"));
        assert!(prompt.contains("<bill>\nBILL TEXT\n</bill>\n\n<amendment>\nAMD TEXT\n</amendment>"));
    }

    #[test]
    fn test_parse_amendment_stem() {
        assert_eq!(parse_amendment_stem("HB0548_amd2"), Some(("HB0548", 2)));
        assert_eq!(parse_amendment_stem("HB0548_amd"), Some(("HB0548", 1)));
        assert_eq!(parse_amendment_stem("HB0548"), None);
        assert_eq!(parse_amendment_stem("HB0548_amdx"), None);
        assert_eq!(parse_amendment_stem("_amd1"), None);
    }

    #[test]
    fn test_plan_orders_amendments_numerically() {
        let dir = tempfile::tempdir().unwrap();
        for name in [
            "HB0001.md",
            "HB0001_amd10.md",
            "HB0001_amd2.md",
            "SB0005_amd1.md",
            "HB0001_amended.md",
        ] {
            std::fs::write(dir.path().join(name), name).unwrap();
        }
        let jobs = plan_amendments(dir.path()).unwrap();
        assert_eq!(jobs.len(), 1);
        let job = &jobs[0];
        assert_eq!(job.bill_number, "HB0001");
        assert_eq!(
            job.amendments,
            vec![
                dir.path().join("HB0001_amd2.md"),
                dir.path().join("HB0001_amd10.md")
            ]
        );
        assert!(job.is_done());
    }

    #[test]
    fn test_run_applies_in_order() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("HB0002.md"), "B").unwrap();
        std::fs::write(dir.path().join("HB0002_amd1.md"), "A1").unwrap();
        std::fs::write(dir.path().join("HB0002_amd2.md"), "A2").unwrap();
        let job = plan_amendments(dir.path()).unwrap().remove(0);
        assert!(!job.is_done());

        assert!(run_amendment(&job, &Appender, &instant()).unwrap());
        let written = std::fs::read_to_string(&job.output).unwrap();
        assert_eq!(written, "B+A1+A2");
    }

    #[test]
    fn test_run_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("HB0003.md"), "B").unwrap();
        std::fs::write(dir.path().join("HB0003_amd1.md"), "A1").unwrap();
        let job = plan_amendments(dir.path()).unwrap().remove(0);
        assert!(!run_amendment(&job, &Refuser, &instant()).unwrap());
        assert!(!job.output.exists());
    }
}
