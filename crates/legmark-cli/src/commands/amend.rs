use legmark_core::error::LegmarkError;
use legmark_core::services::amend;
use std::path::Path;

pub fn plan(md_dir: &Path) -> Result<(), LegmarkError> {
    let jobs = amend::plan_amendments(md_dir)?;
    if jobs.is_empty() {
        println!("No amendments found in {}", md_dir.display());
        return Ok(());
    }

    for job in &jobs {
        let status = if job.is_done() { "done" } else { "pending" };
        println!("{} ({}, {} amendment(s))", job.bill_number, status, job.amendments.len());
        for (i, path) in job.amendments.iter().enumerate() {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            println!("  {}. {}", i + 1, name);
        }
        println!("  -> {}", job.output.display());
    }

    let pending = jobs.iter().filter(|j| !j.is_done()).count();
    println!("\n{} bill(s), {} pending", jobs.len(), pending);
    Ok(())
}
