use crate::model::Word;

/// Collapse raw y0 values into row estimates.
///
/// Distinct values are sorted ascending and walked in order; a value joins the
/// current cluster when it lies within `tolerance` of the previous value in that
/// cluster. Each cluster is replaced by its mean, so the result is ascending.
pub fn cluster_rows(ys: impl IntoIterator<Item = f64>, tolerance: f64) -> Vec<f64> {
    let mut values: Vec<f64> = ys.into_iter().filter(|y| y.is_finite()).collect();
    values.sort_by(f64::total_cmp);
    values.dedup();

    let mut rows = Vec::new();
    let mut cluster: Vec<f64> = Vec::new();

    for y in values {
        if let Some(&last) = cluster.last() {
            if y - last >= tolerance {
                rows.push(mean(&cluster));
                cluster.clear();
            }
        }
        cluster.push(y);
    }
    if !cluster.is_empty() {
        rows.push(mean(&cluster));
    }

    rows
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Nearest row estimate to `y`; the first of equally distant rows wins.
pub fn snap(y: f64, rows: &[f64]) -> f64 {
    let mut best = y;
    let mut best_distance = f64::INFINITY;
    for &row in rows {
        let distance = (row - y).abs();
        if distance < best_distance {
            best = row;
            best_distance = distance;
        }
    }
    best
}

/// A word placed on its snapped row.
#[derive(Debug, Clone, Copy)]
pub struct Placed<'a> {
    pub row: f64,
    pub word: &'a Word,
}

/// Snap every word to its row and sort top-to-bottom, then left-to-right.
///
/// Assumes a single text column.
pub fn reading_order<'a>(words: &'a [Word], rows: &[f64]) -> Vec<Placed<'a>> {
    let mut placed: Vec<Placed<'a>> = words
        .iter()
        .map(|word| Placed {
            row: snap(word.bbox.y0, rows),
            word,
        })
        .collect();
    placed.sort_by(|a, b| {
        a.row
            .total_cmp(&b.row)
            .then(a.word.bbox.x0.total_cmp(&b.word.bbox.x0))
    });
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BBox;

    #[test]
    fn test_jitter_collapses_to_mean() {
        let rows = cluster_rows([200.4, 200.0, 215.0, 200.0], 3.0);
        assert_eq!(rows.len(), 2);
        assert!((rows[0] - 200.2).abs() < 1e-9);
        assert_eq!(rows[1], 215.0);
    }

    #[test]
    fn test_chained_values_share_cluster() {
        // Each step is below tolerance even though the span is not.
        let rows = cluster_rows([100.0, 102.0, 104.0, 106.0], 3.0);
        assert_eq!(rows, vec![103.0]);
    }

    #[test]
    fn test_gap_at_tolerance_splits() {
        let rows = cluster_rows([100.0, 103.0], 3.0);
        assert_eq!(rows, vec![100.0, 103.0]);
    }

    #[test]
    fn test_clustering_is_idempotent() {
        let once = cluster_rows([72.0, 72.5, 73.1, 86.0, 86.2, 100.0, 140.7], 3.0);
        let twice = cluster_rows(once.clone(), 3.0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_rows_are_ascending() {
        let rows = cluster_rows([500.0, 12.0, 300.0, 13.5, 301.0], 3.0);
        assert!(rows.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_empty_input() {
        assert!(cluster_rows(Vec::<f64>::new(), 3.0).is_empty());
    }

    #[test]
    fn test_snap_nearest_and_tie() {
        let rows = [100.0, 110.0];
        assert_eq!(snap(103.0, &rows), 100.0);
        assert_eq!(snap(108.0, &rows), 110.0);
        assert_eq!(snap(105.0, &rows), 100.0);
    }

    #[test]
    fn test_reading_order_same_line_by_x() {
        let words = vec![
            Word::new("world", BBox::new(60.0, 200.4, 90.0, 210.0)),
            Word::new("hello", BBox::new(10.0, 200.0, 50.0, 210.0)),
        ];
        let rows = cluster_rows(words.iter().map(|w| w.bbox.y0), 3.0);
        let ordered = reading_order(&words, &rows);
        assert_eq!(ordered[0].word.text, "hello");
        assert_eq!(ordered[1].word.text, "world");
        assert_eq!(ordered[0].row, ordered[1].row);
    }
}
