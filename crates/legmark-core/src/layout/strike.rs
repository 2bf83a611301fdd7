use super::StrikeOptions;
use crate::model::{BBox, Drawing, PaintKind, Word};

/// Select drawings that look like strike lines: filled, pure black, thin and wide.
pub fn candidate_lines(drawings: &[Drawing], options: &StrikeOptions) -> Vec<BBox> {
    drawings
        .iter()
        .filter(|d| is_candidate(d, options))
        .map(|d| d.bbox)
        .collect()
}

fn is_candidate(drawing: &Drawing, options: &StrikeOptions) -> bool {
    if drawing.kind != PaintKind::Fill {
        return false;
    }
    if !drawing.fill.is_some_and(|c| c.is_black()) {
        return false;
    }
    let height = drawing.bbox.height();
    let width = drawing.bbox.width();
    height < options.max_height && width > options.min_aspect * height
}

/// Whether `line` crosses through the middle of `word` with substantial overlap.
pub fn crosses(word: &BBox, line: &BBox, options: &StrikeOptions) -> bool {
    let Some(overlap) = word.intersect(line) else {
        return false;
    };

    let center_offset = (word.center_y() - line.center_y()).abs();
    if center_offset >= word.height() * options.center_tolerance_ratio {
        return false;
    }

    let overlap_width = overlap.width();
    overlap_width > word.width() * options.min_overlap_ratio
        || overlap_width > options.min_overlap_abs
}

/// Flag every word crossed by one of `lines`. Returns the number of struck words.
///
/// Flags from a previous pass are cleared first. The first matching line wins;
/// attribution order follows the drawing order of the page.
pub fn mark_struck(words: &mut [Word], lines: &[BBox], options: &StrikeOptions) -> usize {
    let mut struck = 0;
    for word in words.iter_mut() {
        word.struck = false;
        if lines.is_empty() || !word.is_strikeable() {
            continue;
        }
        if lines.iter().any(|line| crosses(&word.bbox, line, options)) {
            word.struck = true;
            struck += 1;
        }
    }
    struck
}

/// Boxes of all words crossed by a strike line on the page.
pub fn struck_boxes(words: &[Word], drawings: &[Drawing], options: &StrikeOptions) -> Vec<BBox> {
    let lines = candidate_lines(drawings, options);
    if lines.is_empty() {
        return Vec::new();
    }
    words
        .iter()
        .filter(|w| w.is_strikeable())
        .filter(|w| lines.iter().any(|line| crosses(&w.bbox, line, options)))
        .map(|w| w.bbox)
        .collect()
}
