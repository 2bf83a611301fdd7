use legmark_core::corpus::{self, CorpusOptions};
use legmark_core::error::LegmarkError;
use legmark_core::extraction::poppler::PopplerExtractor;
use std::path::PathBuf;

use super::convert::resolve_options;
use crate::output;

pub fn run(
    input_dir: PathBuf,
    output_dir: PathBuf,
    overwrite: bool,
    jobs: Option<usize>,
    omit_struck: bool,
    options_file: Option<PathBuf>,
    output_format: &str,
) -> Result<(), LegmarkError> {
    if !PopplerExtractor::is_available() {
        return Err(LegmarkError::PdftotextNotFound);
    }

    let options = CorpusOptions {
        overwrite,
        jobs,
        layout: resolve_options(options_file.as_deref(), omit_struck)?,
    };
    let extractor = PopplerExtractor::new();
    let report = corpus::convert_corpus(&input_dir, &output_dir, &extractor, &options)?;

    match output_format {
        "json" => output::json::print(&report)?,
        _ => output::table::print_corpus(&report),
    }

    Ok(())
}
