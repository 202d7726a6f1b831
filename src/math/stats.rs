//! Goodness-of-fit helpers.

/// Coefficient of determination `1 - SS_res / SS_tot`.
///
/// Returns 0 when the observations have no variance.
pub fn r_squared(observed: &[f64], predicted: &[f64]) -> f64 {
    let n = observed.len().min(predicted.len());
    if n == 0 {
        return 0.0;
    }
    let mean = observed[..n].iter().sum::<f64>() / n as f64;
    let ss_res: f64 = observed
        .iter()
        .zip(predicted.iter())
        .map(|(o, p)| (o - p) * (o - p))
        .sum();
    let ss_tot: f64 = observed[..n].iter().map(|o| (o - mean) * (o - mean)).sum();
    if ss_tot == 0.0 { 0.0 } else { 1.0 - ss_res / ss_tot }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn perfect_prediction_scores_one() {
        let y = [1.0, 3.0, 2.0, 5.0];
        assert!((r_squared(&y, &y) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mean_prediction_scores_zero() {
        let y = [1.0, 3.0, 2.0, 6.0];
        let mean = [3.0; 4];
        assert!(r_squared(&y, &mean).abs() < 1e-12);
    }

    #[test]
    fn constant_observations_score_zero() {
        assert_eq!(r_squared(&[2.0, 2.0], &[1.0, 3.0]), 0.0);
    }
}
