use crate::error::RowError;

use super::model::{CompoundRow, ExperimentTable};

// ---------------------------------------------------------------------------
// Volcano coordinates of a valid row
// ---------------------------------------------------------------------------

/// A row placed on the volcano plane: x = log2 fold change, y = −log10(p).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolcanoPoint<'a> {
    pub row: &'a CompoundRow,
    pub x: f64,
    pub y: f64,
}

/// Place a row on the volcano plane.
///
/// Fails when −log10(p) would be infinite, NaN or negative (p ≤ 0, p > 1 or
/// non-finite) and when the fold change itself is not finite.
pub fn volcano_point(row: &CompoundRow) -> Result<VolcanoPoint<'_>, RowError> {
    let p = row.p_value;
    if !(p.is_finite() && p > 0.0 && p <= 1.0) {
        return Err(RowError::InvalidSignificance {
            compound_id: row.compound_id.clone(),
            p_value: p,
        });
    }
    if !row.fold_change.is_finite() {
        return Err(RowError::InvalidFoldChange {
            compound_id: row.compound_id.clone(),
            fold_change: row.fold_change,
        });
    }
    Ok(VolcanoPoint {
        row,
        x: row.fold_change,
        y: -p.log10(),
    })
}

// ---------------------------------------------------------------------------
// Flagged-row selection
// ---------------------------------------------------------------------------

/// The flagged rows of one experiment, split into usable points and the
/// rows that had to be rejected.
#[derive(Debug, Clone, Default)]
pub struct Selection<'a> {
    pub points: Vec<VolcanoPoint<'a>>,
    pub rejected: Vec<RowError>,
    /// Number of flagged rows (valid + rejected).
    pub flagged: usize,
}

/// Select the flagged rows of an experiment, in row order.
///
/// Unflagged rows are skipped silently; flagged rows that cannot be placed
/// on the volcano plane end up in `rejected`.
pub fn select_flagged(experiment: &ExperimentTable) -> Selection<'_> {
    let mut selection = Selection::default();
    for row in experiment.rows.iter().filter(|r| r.flagged) {
        selection.flagged += 1;
        match volcano_point(row) {
            Ok(point) => selection.points.push(point),
            Err(err) => selection.rejected.push(err),
        }
    }
    selection
}

// ---------------------------------------------------------------------------
// Significance classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regulation {
    Up,
    Down,
    Insignificant,
}

/// Classify a row the way a volcano plot colours it.
pub fn classify(fold_change: f64, p_value: f64, fc_threshold: f64, p_threshold: f64) -> Regulation {
    if p_value < p_threshold {
        if fold_change > fc_threshold {
            return Regulation::Up;
        }
        if fold_change < -fc_threshold {
            return Regulation::Down;
        }
    }
    Regulation::Insignificant
}

/// Count (up, down) regulated rows among the valid points.
pub fn regulation_counts(points: &[VolcanoPoint<'_>], fc_threshold: f64, p_threshold: f64) -> (usize, usize) {
    points.iter().fold((0, 0), |(up, down), p| {
        match classify(p.x, p.row.p_value, fc_threshold, p_threshold) {
            Regulation::Up => (up + 1, down),
            Regulation::Down => (up, down + 1),
            Regulation::Insignificant => (up, down),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_p_value_is_invalid_significance() {
        let row = CompoundRow::new("C1", 1.0, 0.0);
        assert!(matches!(
            volcano_point(&row),
            Err(RowError::InvalidSignificance { p_value, .. }) if p_value == 0.0
        ));
    }

    #[test]
    fn p_value_above_one_or_nan_is_rejected() {
        assert!(volcano_point(&CompoundRow::new("C1", 1.0, 1.5)).is_err());
        assert!(volcano_point(&CompoundRow::new("C1", 1.0, f64::NAN)).is_err());
        assert!(volcano_point(&CompoundRow::new("C1", f64::INFINITY, 0.5)).is_err());
    }

    #[test]
    fn p_value_of_one_sits_on_the_axis() {
        let row = CompoundRow::new("C1", -2.0, 1.0);
        let point = volcano_point(&row).unwrap();
        assert_eq!(point.x, -2.0);
        assert_eq!(point.y, 0.0);
    }

    #[test]
    fn selection_skips_unflagged_and_collects_rejects() {
        let exp = ExperimentTable::new(
            "e1",
            vec![
                CompoundRow::new("A", 1.0, 0.01),
                CompoundRow::new("B", 2.0, 0.01).with_flagged(false),
                CompoundRow::new("C", 3.0, 0.0),
            ],
        );
        let selection = select_flagged(&exp);
        assert_eq!(selection.flagged, 2);
        assert_eq!(selection.points.len(), 1);
        assert_eq!(selection.points[0].row.compound_id, "A");
        assert_eq!(selection.rejected.len(), 1);
    }

    #[test]
    fn classification_thresholds() {
        assert_eq!(classify(1.0, 0.01, 0.5, 0.05), Regulation::Up);
        assert_eq!(classify(-1.0, 0.01, 0.5, 0.05), Regulation::Down);
        assert_eq!(classify(0.4, 0.01, 0.5, 0.05), Regulation::Insignificant);
        assert_eq!(classify(3.0, 0.05, 0.5, 0.05), Regulation::Insignificant);
    }
}
