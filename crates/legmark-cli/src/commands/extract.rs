use legmark_core::error::LegmarkError;
use legmark_core::extraction::poppler::PopplerExtractor;
use legmark_core::layout::{strike, LayoutOptions};
use std::path::PathBuf;

use crate::output;

pub fn run(
    pdf_file: PathBuf,
    output_format: &str,
    page: Option<usize>,
    output_file: Option<PathBuf>,
) -> Result<(), LegmarkError> {
    let pdf_bytes = std::fs::read(&pdf_file)?;
    let extractor = PopplerExtractor::new();
    let mut layouts = legmark_core::extract_pdf(&pdf_bytes, &extractor)?;

    if let Some(n) = page {
        if n == 0 || n > layouts.len() {
            return Err(LegmarkError::Extraction(format!(
                "page {} out of range (document has {} page(s))",
                n,
                layouts.len()
            )));
        }
        layouts.retain(|l| l.page_number == n);
    }

    // Saved layouts keep the raw geometry; struck flags are recomputed on convert.
    if let Some(path) = output_file {
        let json = serde_json::to_string_pretty(&layouts)?;
        std::fs::write(&path, json)?;
        eprintln!(
            "Extracted {} page(s), written to {}",
            layouts.len(),
            path.display()
        );
        return Ok(());
    }

    let options = LayoutOptions::default();
    for layout in &mut layouts {
        let lines = strike::candidate_lines(&layout.drawings, &options.strike);
        strike::mark_struck(&mut layout.words, &lines, &options.strike);
    }

    match output_format {
        "json" => output::json::print(&layouts)?,
        _ => output::table::print_layouts(&layouts, &options),
    }

    Ok(())
}
