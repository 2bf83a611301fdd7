use legmark_core::corpus::{CorpusReport, DocumentOutcome};
use legmark_core::extraction::PageLayout;
use legmark_core::layout::{strike, LayoutOptions};

pub fn print_layouts(layouts: &[PageLayout], options: &LayoutOptions) {
    for (i, layout) in layouts.iter().enumerate() {
        if i > 0 {
            println!();
        }
        let struck = layout.words.iter().filter(|w| w.struck).count();
        println!(
            "=== Page {} ({:.0} x {:.0}) ===\n",
            layout.page_number, layout.width, layout.height
        );
        println!(
            "  {} word(s), {} drawing(s), {} struck\n",
            layout.words.len(),
            layout.drawings.len(),
            struck
        );

        if !layout.words.is_empty() {
            let max_text = layout
                .words
                .iter()
                .map(|w| w.text.chars().count())
                .max()
                .unwrap_or(10)
                .min(40);
            println!(
                "  {:<width$}  {:>8} {:>8} {:>8} {:>8}  Struck",
                "Word",
                "x0",
                "y0",
                "x1",
                "y1",
                width = max_text
            );
            println!("  {}", "-".repeat(max_text + 46));
            for w in &layout.words {
                println!(
                    "  {:<width$}  {:>8.2} {:>8.2} {:>8.2} {:>8.2}  {}",
                    w.text,
                    w.bbox.x0,
                    w.bbox.y0,
                    w.bbox.x1,
                    w.bbox.y1,
                    if w.struck { "~~" } else { "" },
                    width = max_text
                );
            }
            println!();
        }

        let lines = strike::candidate_lines(&layout.drawings, &options.strike);
        if !lines.is_empty() {
            println!("  Strike lines:");
            for line in &lines {
                println!("    {}", line);
            }
            println!();

            let crossed = strike::struck_boxes(&layout.words, &layout.drawings, &options.strike);
            println!("  Crossed word boxes: {}", crossed.len());
            for bbox in &crossed {
                println!("    {}", bbox);
            }
            println!();
        }
    }
}

pub fn print_corpus(report: &CorpusReport) {
    for doc in &report.documents {
        let name = doc
            .input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match &doc.outcome {
            DocumentOutcome::Converted {
                pages,
                struck_words,
            } => println!(
                "  converted  {}  ({} page(s), {} struck)",
                name, pages, struck_words
            ),
            DocumentOutcome::Skipped => println!("  skipped    {}  (already converted)", name),
            DocumentOutcome::Failed { reason } => println!("  failed     {}  ({})", name, reason),
        }
    }

    println!();
    println!(
        "{} converted, {} skipped, {} failed; {} page(s) total",
        report.converted(),
        report.skipped(),
        report.failed(),
        report.total_pages()
    );
}
