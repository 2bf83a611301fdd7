pub mod lines;
pub mod rows;
pub mod strike;

use crate::error::LegmarkError;
use crate::model::Word;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Geometry thresholds for strike-line detection, in page units (points).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrikeOptions {
    /// Candidate lines must be strictly thinner than this.
    pub max_height: f64,
    /// Candidate lines must be wider than `min_aspect * height`.
    pub min_aspect: f64,
    /// Vertical centers of word and line must differ by less than this share of the word height.
    pub center_tolerance_ratio: f64,
    /// Overlap must exceed this share of the word width...
    pub min_overlap_ratio: f64,
    /// ...or this absolute width.
    pub min_overlap_abs: f64,
}

impl Default for StrikeOptions {
    fn default() -> Self {
        StrikeOptions {
            max_height: 1.5,
            min_aspect: 2.0,
            center_tolerance_ratio: 0.25,
            min_overlap_ratio: 0.5,
            min_overlap_abs: 5.0,
        }
    }
}

/// Tunable heuristics for page reconstruction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Distinct y0 values closer than this collapse into one row.
    pub row_tolerance: f64,
    /// Row advance beyond this starts a new output line.
    pub line_break_threshold: f64,
    /// Row advance beyond `line_break_threshold * paragraph_break_factor` also emits a blank line.
    pub paragraph_break_factor: f64,
    /// Horizontal gap beyond this inserts a space between words.
    pub word_gap: f64,
    /// Drop struck words instead of wrapping them in `~~`.
    pub omit_struck: bool,
    pub strike: StrikeOptions,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        LayoutOptions {
            row_tolerance: 3.0,
            line_break_threshold: 10.0,
            paragraph_break_factor: 2.0,
            word_gap: 2.0,
            omit_struck: false,
            strike: StrikeOptions::default(),
        }
    }
}

impl LayoutOptions {
    pub fn paragraph_break_threshold(&self) -> f64 {
        self.line_break_threshold * self.paragraph_break_factor
    }

    /// Reject thresholds that would make the heuristics meaningless.
    pub fn validate(&self) -> Result<(), LegmarkError> {
        let checks = [
            ("row_tolerance", self.row_tolerance),
            ("line_break_threshold", self.line_break_threshold),
            ("paragraph_break_factor", self.paragraph_break_factor),
            ("word_gap", self.word_gap),
            ("strike.max_height", self.strike.max_height),
            ("strike.min_aspect", self.strike.min_aspect),
            (
                "strike.center_tolerance_ratio",
                self.strike.center_tolerance_ratio,
            ),
            ("strike.min_overlap_ratio", self.strike.min_overlap_ratio),
            ("strike.min_overlap_abs", self.strike.min_overlap_abs),
        ];
        for (name, value) in checks {
            if !value.is_finite() || value <= 0.0 {
                return Err(LegmarkError::InvalidOptions(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        if self.paragraph_break_factor < 1.0 {
            return Err(LegmarkError::InvalidOptions(
                "paragraph_break_factor must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Load layout options from a JSON file. Missing fields keep their defaults.
pub fn load_options(path: &Path) -> Result<LayoutOptions, LegmarkError> {
    let content = std::fs::read_to_string(path)?;
    let options: LayoutOptions = serde_json::from_str(&content).map_err(|e| {
        LegmarkError::InvalidOptions(format!("{}: {}", path.display(), e))
    })?;
    options.validate()?;
    Ok(options)
}

/// Counters gathered while reconstructing one page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageCounts {
    pub strike_lines: usize,
    pub struck_words: usize,
    pub rows: usize,
    pub lines: usize,
}

/// Run strike detection and line reconstruction for one page.
///
/// Struck flags are written onto `words`; the returned string is the page body.
pub fn reconstruct_page(
    words: &mut [Word],
    drawings: &[crate::model::Drawing],
    options: &LayoutOptions,
) -> (String, PageCounts) {
    let strike_lines = strike::candidate_lines(drawings, &options.strike);
    let struck_words = strike::mark_struck(words, &strike_lines, &options.strike);
    let rows = rows::cluster_rows(words.iter().map(|w| w.bbox.y0), options.row_tolerance);
    let ordered = rows::reading_order(words, &rows);
    let lines = lines::assemble(&ordered, options);

    let counts = PageCounts {
        strike_lines: strike_lines.len(),
        struck_words,
        rows: rows.len(),
        lines: lines.line_count(),
    };
    (lines.finish(), counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BBox, Drawing, Rgb};

    #[test]
    fn test_default_options_are_valid() {
        assert!(LayoutOptions::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = LayoutOptions {
            row_tolerance: -1.0,
            ..Default::default()
        };
        assert!(options.validate().is_err());

        let options = LayoutOptions {
            word_gap: f64::NAN,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_partial_options_json_keeps_defaults() {
        let options: LayoutOptions =
            serde_json::from_str(r#"{"omit_struck": true, "strike": {"max_height": 2.0}}"#)
                .unwrap();
        assert!(options.omit_struck);
        assert_eq!(options.strike.max_height, 2.0);
        assert_eq!(options.strike.min_overlap_abs, 5.0);
        assert_eq!(options.row_tolerance, 3.0);
    }

    #[test]
    fn test_reconstruct_page_marks_and_orders() {
        let mut words = vec![
            Word::new("repealed", BBox::new(50.0, 100.2, 90.0, 110.0)),
            Word::new("is", BBox::new(10.0, 100.0, 20.0, 110.0)),
            Word::new("Section", BBox::new(10.0, 88.0, 45.0, 98.0)),
        ];
        let drawings = vec![Drawing::filled(
            BBox::new(48.0, 104.5, 92.0, 105.5),
            Rgb::BLACK,
        )];
        let (text, counts) = reconstruct_page(&mut words, &drawings, &LayoutOptions::default());
        assert_eq!(text, "Section\nis ~~repealed~~");
        assert_eq!(counts.strike_lines, 1);
        assert_eq!(counts.struck_words, 1);
        assert_eq!(counts.rows, 2);
        assert_eq!(counts.lines, 2);
    }
}
