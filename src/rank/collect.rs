use std::collections::HashMap;

use super::distance::DistanceSample;

/// One distance of a compound, tagged with the experiment it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentDistance {
    pub experiment_id: String,
    pub distance: f64,
}

/// All distance samples of one compound, in experiment processing order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompoundSamples {
    pub compound_id: String,
    pub samples: Vec<ExperimentDistance>,
}

impl CompoundSamples {
    pub fn distances(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.distance).collect()
    }
}

/// Group samples by compound id.
///
/// Groups are returned in the order their compound was first seen, and each
/// group keeps its samples in input order, so the result is fully
/// determined by the order of `samples`.
pub fn collect_by_compound(samples: impl IntoIterator<Item = DistanceSample>) -> Vec<CompoundSamples> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<CompoundSamples> = Vec::new();

    for sample in samples {
        let entry = ExperimentDistance {
            experiment_id: sample.experiment_id,
            distance: sample.distance,
        };
        match index.get(&sample.compound_id) {
            Some(&i) => groups[i].samples.push(entry),
            None => {
                index.insert(sample.compound_id.clone(), groups.len());
                groups.push(CompoundSamples {
                    compound_id: sample.compound_id,
                    samples: vec![entry],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(compound: &str, experiment: &str, distance: f64) -> DistanceSample {
        DistanceSample {
            compound_id: compound.to_string(),
            experiment_id: experiment.to_string(),
            distance,
        }
    }

    #[test]
    fn groups_keep_first_seen_and_experiment_order() {
        let groups = collect_by_compound(vec![
            sample("B", "e1", 1.0),
            sample("A", "e1", 2.0),
            sample("B", "e2", 3.0),
            sample("A", "e3", 4.0),
        ]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].compound_id, "B");
        assert_eq!(groups[0].distances(), vec![1.0, 3.0]);
        assert_eq!(groups[1].compound_id, "A");
        assert_eq!(groups[1].samples[1].experiment_id, "e3");
    }

    #[test]
    fn empty_input_yields_no_groups() {
        assert!(collect_by_compound(Vec::new()).is_empty());
    }
}
