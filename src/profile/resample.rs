//! Peak-centered resampling onto the fixed reconstruction grid.

use serde::Serialize;

use crate::domain::RawProfile;
use crate::math::{interp_linear, linspace};

/// Half extent of the reconstruction grid (mm).
pub const GRID_HALF_RANGE: f64 = 15.0;
/// Number of samples on the reconstruction grid (1 mm spacing).
pub const GRID_POINTS: usize = 31;

/// A profile resampled onto a uniform grid centered on its peak.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CenteredSamples {
    /// Grid positions, ascending.
    pub positions: Vec<f64>,
    pub values: Vec<f64>,
    /// Original coordinate of the peak that was moved to 0.
    pub center_offset: f64,
}

/// Shift `raw` so its maximum sits at 0, then sample it linearly on
/// `linspace(-half_range, half_range, points)`. Positions outside the measured
/// range are 0.
pub fn resample_centered(raw: &RawProfile, half_range: f64, points: usize) -> CenteredSamples {
    let center_offset = raw.coords[raw.peak_index()];
    let shifted: Vec<f64> = raw.coords.iter().map(|c| c - center_offset).collect();
    let positions = linspace(-half_range, half_range, points);
    let values = positions
        .iter()
        .map(|&x| interp_linear(x, &shifted, &raw.values, 0.0, 0.0))
        .collect();

    CenteredSamples {
        positions,
        values,
        center_offset,
    }
}

/// Resample onto the standard 31-point, ±15 mm reconstruction grid.
pub fn resample_to_grid(raw: &RawProfile) -> CenteredSamples {
    resample_centered(raw, GRID_HALF_RANGE, GRID_POINTS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_lands_on_grid_center() {
        let coords: Vec<f64> = (0..=40).map(|i| 20.0 + 0.5 * i as f64).collect();
        let values: Vec<f64> = coords.iter().map(|c| (10.0 - (c - 31.0_f64).abs()).max(0.0)).collect();
        let raw = RawProfile::new(coords, values).unwrap();
        let s = resample_to_grid(&raw);
        assert_eq!(s.center_offset, 31.0);
        assert_eq!(s.values.len(), GRID_POINTS);
        assert_eq!(s.values[15], 10.0);
        assert!((s.values[14] - 9.0).abs() < 1e-12);
        assert!((s.values[16] - 9.0).abs() < 1e-12);
    }

    #[test]
    fn outside_measured_range_is_zero() {
        let raw = RawProfile::new(vec![-2.0, 0.0, 2.0], vec![1.0, 5.0, 1.0]).unwrap();
        let s = resample_to_grid(&raw);
        assert_eq!(s.values[0], 0.0);
        assert_eq!(s.values[30], 0.0);
        assert_eq!(s.values[13], 1.0);
        assert_eq!(s.values[15], 5.0);
    }
}
