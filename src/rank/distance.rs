use crate::data::filter::VolcanoPoint;

use super::anchors::Anchors;

/// Distance of one compound to its experiment's relevant extreme.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceSample {
    pub compound_id: String,
    pub experiment_id: String,
    pub distance: f64,
}

/// Euclidean distance from `(x, y)` to the left extreme when `x < 0`, to
/// the right extreme otherwise. Smaller is more extreme.
pub fn distance_to_extreme(x: f64, y: f64, anchors: &Anchors) -> f64 {
    let anchor_x = if x < 0.0 {
        anchors.leftmost_x
    } else {
        anchors.rightmost_x
    };
    (x - anchor_x).hypot(y - anchors.topmost_y)
}

/// One sample per point, in point order.
pub fn compute_distances(experiment_id: &str, points: &[VolcanoPoint<'_>], anchors: &Anchors) -> Vec<DistanceSample> {
    points
        .iter()
        .map(|p| DistanceSample {
            compound_id: p.row.compound_id.clone(),
            experiment_id: experiment_id.to_string(),
            distance: distance_to_extreme(p.x, p.y, anchors),
        })
        .collect()
}
