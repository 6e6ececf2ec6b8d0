use serde::Serialize;

use crate::data::model::MetadataIndex;

use super::CompoundProfile;

/// One line of the final report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCompound {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub compound_id: String,
    pub display_name: String,
    pub consensus_distance: f64,
    pub outlier_experiment_id: Option<String>,
    /// Number of experiments the compound had a distance in.
    pub samples: usize,
}

/// Sort profiles by ascending consensus distance and keep the first `top_k`.
///
/// The sort is stable, so ties keep the order of `profiles` (first-seen
/// compound order from the collector).
pub fn rank_profiles(profiles: &[CompoundProfile], metadata: &MetadataIndex, top_k: usize) -> Vec<RankedCompound> {
    let mut order: Vec<&CompoundProfile> = profiles.iter().collect();
    order.sort_by(|a, b| a.consensus_distance.total_cmp(&b.consensus_distance));

    order
        .into_iter()
        .take(top_k)
        .enumerate()
        .map(|(i, p)| RankedCompound {
            rank: i + 1,
            compound_id: p.compound_id.clone(),
            display_name: metadata.display_name(&p.compound_id),
            consensus_distance: p.consensus_distance,
            outlier_experiment_id: p.outlier_experiment_id.clone(),
            samples: p.samples.len(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rank::collect::ExperimentDistance;

    fn profile(id: &str, distance: f64) -> CompoundProfile {
        CompoundProfile {
            compound_id: id.to_string(),
            samples: vec![ExperimentDistance {
                experiment_id: "e1".to_string(),
                distance,
            }],
            outlier_experiment_id: None,
            consensus_distance: distance,
        }
    }

    #[test]
    fn ascending_with_stable_ties_and_top_k() {
        let profiles = vec![
            profile("A", 2.0),
            profile("B", 0.5),
            profile("C", 2.0),
            profile("D", 9.0),
        ];
        let ranked = rank_profiles(&profiles, &MetadataIndex::default(), 3);
        let ids: Vec<&str> = ranked.iter().map(|r| r.compound_id.as_str()).collect();
        assert_eq!(ids, vec!["B", "A", "C"]);
        assert_eq!(ranked[0].rank, 1);
        // No metadata: the id doubles as display name.
        assert_eq!(ranked[0].display_name, "B");
    }

    #[test]
    fn top_k_larger_than_input_returns_everything() {
        let ranked = rank_profiles(&[profile("A", 1.0)], &MetadataIndex::default(), 50);
        assert_eq!(ranked.len(), 1);
    }
}
