use crate::stats;

/// Reduce a compound's remaining distances to a single value.
///
/// Every sample gets the same weight, `1 / population variance`, so the
/// weighted average is exactly the arithmetic mean and is computed as such.
/// When all values are equal the common value is returned as-is, which also
/// sidesteps the zero variance. `None` only for an empty slice.
pub fn consensus_distance(distances: &[f64]) -> Option<f64> {
    let (&first, rest) = distances.split_first()?;
    if rest.iter().all(|&d| d == first) {
        return Some(first);
    }
    stats::mean(distances)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_value_is_verbatim() {
        assert_eq!(consensus_distance(&[3.2]), Some(3.2));
    }

    #[test]
    fn identical_values_are_returned_exactly() {
        assert_eq!(consensus_distance(&[0.1, 0.1, 0.1]), Some(0.1));
    }

    #[test]
    fn uniform_weights_reduce_to_the_mean() {
        let d = consensus_distance(&[1.0, 1.1, 50.0]).unwrap();
        assert!((d - 52.1 / 3.0).abs() < 1e-12);
        let d = consensus_distance(&[1.0, 1.1]).unwrap();
        assert!((d - 1.05).abs() < 1e-12);
    }

    #[test]
    fn matches_explicit_inverse_variance_weighting() {
        let values = [0.4, 2.5, 1.25, 0.9];
        let w = 1.0 / stats::population_variance(&values).unwrap();
        let weighted: f64 = values.iter().map(|v| v * w).sum::<f64>() / (w * values.len() as f64);
        assert!((consensus_distance(&values).unwrap() - weighted).abs() < 1e-12);
    }

    #[test]
    fn empty_has_no_consensus() {
        assert_eq!(consensus_distance(&[]), None);
    }
}
