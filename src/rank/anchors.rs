use serde::Serialize;

use crate::data::filter::VolcanoPoint;

/// The three extremes of one experiment's volcano plot.
///
/// Distances are measured to `(leftmost_x, topmost_y)` for negative fold
/// changes and to `(rightmost_x, topmost_y)` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Anchors {
    pub leftmost_x: f64,
    pub rightmost_x: f64,
    pub topmost_y: f64,
}

/// Reduce the valid flagged points of an experiment to its anchors.
///
/// Returns `None` when there is no point, in which case the experiment
/// contributes no distance samples.
pub fn compute_anchors(points: &[VolcanoPoint<'_>]) -> Option<Anchors> {
    let first = points.first()?;
    let init = Anchors {
        leftmost_x: first.x,
        rightmost_x: first.x,
        topmost_y: first.y,
    };
    Some(points.iter().skip(1).fold(init, |acc, p| Anchors {
        leftmost_x: acc.leftmost_x.min(p.x),
        rightmost_x: acc.rightmost_x.max(p.x),
        topmost_y: acc.topmost_y.max(p.y),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::select_flagged;
    use crate::data::model::{CompoundRow, ExperimentTable};

    #[test]
    fn anchors_use_only_flagged_valid_rows() {
        let exp = ExperimentTable::new(
            "e1",
            vec![
                CompoundRow::new("A", -3.0, 0.001),
                CompoundRow::new("B", 2.0, 0.01),
                CompoundRow::new("C", 0.5, 0.1),
                // Unflagged extremes must not move the anchors.
                CompoundRow::new("D", -10.0, 1e-12).with_flagged(false),
                CompoundRow::new("E", 10.0, 0.5).with_flagged(false),
                // p = 0 is rejected instead of pushing topmost_y to infinity.
                CompoundRow::new("F", 1.0, 0.0),
            ],
        );
        let selection = select_flagged(&exp);
        let anchors = compute_anchors(&selection.points).unwrap();
        assert_eq!(anchors.leftmost_x, -3.0);
        assert_eq!(anchors.rightmost_x, 2.0);
        assert!((anchors.topmost_y - 3.0).abs() < 1e-12);
        assert!(anchors.leftmost_x <= anchors.rightmost_x);
    }

    #[test]
    fn no_points_no_anchors() {
        assert_eq!(compute_anchors(&[]), None);
    }

    #[test]
    fn single_point_is_its_own_anchor() {
        let row = CompoundRow::new("A", 1.5, 0.1);
        let exp = ExperimentTable::new("e", vec![row]);
        let selection = select_flagged(&exp);
        let anchors = compute_anchors(&selection.points).unwrap();
        assert_eq!(anchors.leftmost_x, 1.5);
        assert_eq!(anchors.rightmost_x, 1.5);
        assert!((anchors.topmost_y - 1.0).abs() < 1e-12);
    }
}
