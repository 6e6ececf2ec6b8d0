use crate::stats;

use super::collect::ExperimentDistance;

/// Scale factor of the modified z-score (Iglewicz & Hoaglin).
pub const MODIFIED_Z_FACTOR: f64 = 0.6745;

/// The most anomalous sample of a compound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outlier {
    /// Position in the compound's sample list.
    pub index: usize,
    pub z_score: f64,
}

/// Modified z-scores `0.6745 (d − median) / dispersion`.
///
/// The dispersion is the MAD, or the population standard deviation when the
/// MAD is zero. Returns `None` for fewer than two values and when both are
/// zero, since no sample can then be told apart from the others.
pub fn modified_z_scores(distances: &[f64]) -> Option<Vec<f64>> {
    if distances.len() < 2 {
        return None;
    }
    let median = stats::median(distances)?;
    let mut dispersion = stats::mad(distances, median)?;
    if dispersion == 0.0 {
        dispersion = stats::population_std(distances)?;
    }
    if !(dispersion.is_finite() && dispersion > 0.0) {
        return None;
    }
    Some(
        distances
            .iter()
            .map(|d| MODIFIED_Z_FACTOR * (d - median) / dispersion)
            .collect(),
    )
}

/// Largest |z|; the first one wins on ties.
pub fn detect_outlier(distances: &[f64]) -> Option<Outlier> {
    let scores = modified_z_scores(distances)?;
    let mut best: Option<Outlier> = None;
    for (index, &z_score) in scores.iter().enumerate() {
        if best.map_or(true, |b| z_score.abs() > b.z_score.abs()) {
            best = Some(Outlier { index, z_score });
        }
    }
    best
}

/// Result of outlier screening for one compound.
#[derive(Debug, Clone, PartialEq)]
pub struct Screened {
    /// Experiment of the detected outlier, whether or not it was removed.
    pub outlier_experiment_id: Option<String>,
    /// Distances handed to the consensus step.
    pub distances: Vec<f64>,
}

/// Detect the outlier among a compound's samples and optionally drop it.
pub fn screen(samples: &[ExperimentDistance], remove_outlier: bool) -> Screened {
    let mut distances: Vec<f64> = samples.iter().map(|s| s.distance).collect();
    let Some(outlier) = detect_outlier(&distances) else {
        return Screened {
            outlier_experiment_id: None,
            distances,
        };
    };

    if remove_outlier {
        distances.remove(outlier.index);
    }
    Screened {
        outlier_experiment_id: Some(samples[outlier.index].experiment_id.clone()),
        distances,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(values: &[f64]) -> Vec<ExperimentDistance> {
        values
            .iter()
            .enumerate()
            .map(|(i, &distance)| ExperimentDistance {
                experiment_id: format!("e{}", i + 1),
                distance,
            })
            .collect()
    }

    #[test]
    fn far_sample_is_the_outlier() {
        let scores = modified_z_scores(&[1.0, 1.1, 50.0]).unwrap();
        assert!((scores[0] + 0.6745).abs() < 1e-6);
        assert!(scores[1].abs() < 1e-12);
        assert!((scores[2] - 329.8305).abs() < 1e-3);

        let outlier = detect_outlier(&[1.0, 1.1, 50.0]).unwrap();
        assert_eq!(outlier.index, 2);
    }

    #[test]
    fn zero_mad_falls_back_to_standard_deviation() {
        // Median 2, deviations [0, 0, 0, 3] → MAD 0.
        let scores = modified_z_scores(&[2.0, 2.0, 2.0, 5.0]).unwrap();
        let std = stats::population_std(&[2.0, 2.0, 2.0, 5.0]).unwrap();
        assert!((scores[3] - MODIFIED_Z_FACTOR * 3.0 / std).abs() < 1e-12);
        assert_eq!(detect_outlier(&[2.0, 2.0, 2.0, 5.0]).unwrap().index, 3);
    }

    #[test]
    fn identical_samples_have_no_outlier() {
        assert_eq!(modified_z_scores(&[4.2, 4.2, 4.2]), None);
        let screened = screen(&samples(&[4.2, 4.2, 4.2]), true);
        assert_eq!(screened.outlier_experiment_id, None);
        assert_eq!(screened.distances.len(), 3);
    }

    #[test]
    fn single_sample_passes_through() {
        let screened = screen(&samples(&[3.2]), true);
        assert_eq!(screened.outlier_experiment_id, None);
        assert_eq!(screened.distances, vec![3.2]);
    }

    #[test]
    fn ties_pick_the_first_sample() {
        // Two samples are always symmetric around their median.
        let outlier = detect_outlier(&[1.0, 3.0]).unwrap();
        assert_eq!(outlier.index, 0);
    }

    #[test]
    fn outlier_is_reported_even_when_kept() {
        let kept = screen(&samples(&[1.0, 1.1, 50.0]), false);
        assert_eq!(kept.outlier_experiment_id.as_deref(), Some("e3"));
        assert_eq!(kept.distances, vec![1.0, 1.1, 50.0]);

        let removed = screen(&samples(&[1.0, 1.1, 50.0]), true);
        assert_eq!(removed.outlier_experiment_id.as_deref(), Some("e3"));
        assert_eq!(removed.distances, vec![1.0, 1.1]);
    }
}
