use legmark_core::error::LegmarkError;
use legmark_core::extraction::poppler::PopplerExtractor;
use legmark_core::extraction::PageLayout;
use legmark_core::layout::{self, LayoutOptions};
use std::path::{Path, PathBuf};

use crate::output;

/// Options file (if any) with CLI flags applied on top.
pub fn resolve_options(
    options_file: Option<&Path>,
    omit_struck: bool,
) -> Result<LayoutOptions, LegmarkError> {
    let mut options = match options_file {
        Some(path) => layout::load_options(path)?,
        None => LayoutOptions::default(),
    };
    if omit_struck {
        options.omit_struck = true;
    }
    Ok(options)
}

pub fn run(
    input_file: PathBuf,
    output_format: &str,
    output_file: Option<PathBuf>,
    omit_struck: bool,
    options_file: Option<PathBuf>,
) -> Result<(), LegmarkError> {
    let options = resolve_options(options_file.as_deref(), omit_struck)?;

    let is_json = input_file
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let converted = if is_json {
        // Layouts saved by `legmark extract -O`
        options.validate()?;
        let json_bytes = std::fs::read(&input_file)?;
        let layouts: Vec<PageLayout> = serde_json::from_slice(&json_bytes)?;
        legmark_core::convert_layouts(layouts, &options)
    } else {
        let pdf_bytes = std::fs::read(&input_file)?;
        let extractor = PopplerExtractor::new();
        legmark_core::convert_pdf(&pdf_bytes, &extractor, &options)?
    };

    for w in &converted.report.warnings {
        tracing::warn!(page = w.page_number, "{}", w.message);
    }

    match output_file {
        Some(path) => {
            std::fs::write(&path, &converted.markdown)?;
            eprintln!(
                "Converted {} page(s), {} struck word(s), written to {}",
                converted.report.page_count(),
                converted.report.total_struck_words(),
                path.display()
            );
        }
        None => match output_format {
            "json" => output::json::print(&converted)?,
            _ => println!("{}", converted.markdown),
        },
    }

    Ok(())
}

pub fn print_default_options() -> Result<(), LegmarkError> {
    output::json::print(&LayoutOptions::default())
}
