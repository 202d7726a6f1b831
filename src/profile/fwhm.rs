//! Full width at half maximum.
//!
//! The profile is resampled densely with a cubic spline before the half-max
//! crossings are located, then each crossing is refined by linear
//! interpolation between the last sample inside the band and its outside
//! neighbour.

use crate::domain::FwhmConfig;
use crate::error::BeamError;
use crate::math::{CubicSpline, linspace};

/// Measure the FWHM of a sampled profile.
///
/// Returns `Ok(0.0)` when the peak is below `config.min_peak` or fewer than
/// two dense samples reach half maximum.
pub fn measure_fwhm(coords: &[f64], values: &[f64], config: &FwhmConfig) -> Result<f64, BeamError> {
    let spline = CubicSpline::new(coords, values)?;
    let lo = coords[0];
    let hi = coords[coords.len() - 1];
    let dense_x = linspace(lo, hi, config.dense_points.max(2));
    let dense_y: Vec<f64> = dense_x.iter().map(|&x| spline.evaluate(x)).collect();
    Ok(fwhm_of_samples(&dense_x, &dense_y, config.min_peak))
}

/// FWHM of already-dense samples, without further resampling.
pub fn fwhm_of_samples(xs: &[f64], ys: &[f64], min_peak: f64) -> f64 {
    let max = ys.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() || max == 0.0 || max < min_peak {
        return 0.0;
    }

    let half = 0.5 * max;
    let Some(left_idx) = ys.iter().position(|&v| v >= half) else {
        return 0.0;
    };
    let Some(right_idx) = ys.iter().rposition(|&v| v >= half) else {
        return 0.0;
    };
    if left_idx == right_idx {
        return 0.0;
    }

    let left = if left_idx > 0 {
        crossing(xs[left_idx - 1], xs[left_idx], ys[left_idx - 1], ys[left_idx], half)
    } else {
        xs[left_idx]
    };
    let right = if right_idx + 1 < xs.len() {
        crossing(xs[right_idx], xs[right_idx + 1], ys[right_idx], ys[right_idx + 1], half)
    } else {
        xs[right_idx]
    };

    (right - left).abs()
}

fn crossing(x1: f64, x2: f64, y1: f64, y2: f64, level: f64) -> f64 {
    if y2 == y1 {
        return x1;
    }
    let t = (level - y1) / (y2 - y1);
    x1 + t * (x2 - x1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gaussian(sigma: f64, amplitude: f64) -> (Vec<f64>, Vec<f64>) {
        let xs: Vec<f64> = (0..=120).map(|i| -15.0 + 0.25 * i as f64).collect();
        let ys = xs
            .iter()
            .map(|x| amplitude * (-x * x / (2.0 * sigma * sigma)).exp())
            .collect();
        (xs, ys)
    }

    #[test]
    fn gaussian_fwhm_matches_closed_form() {
        let sigma = 3.0;
        let (xs, ys) = gaussian(sigma, 100.0);
        let fwhm = measure_fwhm(&xs, &ys, &FwhmConfig::default()).unwrap();
        let expected = 2.0 * (2.0 * 2f64.ln()).sqrt() * sigma;
        assert!((fwhm - expected).abs() < 1e-2, "fwhm={fwhm}, expected={expected}");
    }

    #[test]
    fn weak_peak_reports_zero() {
        let (xs, ys) = gaussian(3.0, 40.0);
        assert_eq!(measure_fwhm(&xs, &ys, &FwhmConfig::default()).unwrap(), 0.0);
    }

    #[test]
    fn single_sample_above_half_reports_zero() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [0.0, 0.0, 100.0, 0.0, 0.0];
        assert_eq!(fwhm_of_samples(&xs, &ys, 50.0), 0.0);
    }

    #[test]
    fn crossings_are_interpolated_linearly() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let ys = [0.0, 100.0, 100.0, 100.0, 0.0];
        // Half max 50 is crossed at 0.5 and 3.5.
        assert!((fwhm_of_samples(&xs, &ys, 50.0) - 3.0).abs() < 1e-12);
    }
}
