//! Peak-centering, offset correction and normalization of a cross-section.

use crate::domain::{FwhmConfig, PreparedProfile, RawProfile};
use crate::error::BeamError;
use crate::profile::fwhm::measure_fwhm;

/// Percentage-of-peak convention used by normalized profiles.
pub const NORMALIZED_PEAK: f64 = 100.0;

/// Prepare a measured cross-section for interpolation.
///
/// Steps:
/// 1. reject negative intensities
/// 2. translate coordinates so the (first) maximum sits at 0
/// 3. subtract `min(first, last)` of the original coordinates from every value
///    and clamp at 0
/// 4. measure the FWHM of the corrected values
/// 5. rescale so the maximum is exactly 100
pub fn prepare(raw: &RawProfile, config: &FwhmConfig) -> Result<PreparedProfile, BeamError> {
    if let Some((i, v)) = raw.values.iter().enumerate().find(|(_, v)| **v < 0.0) {
        return Err(BeamError::invalid(format!(
            "negative intensity {v} at position {} (sample {i}); profile cannot be processed",
            raw.coords[i]
        )));
    }

    let peak_position = raw.coords[raw.peak_index()];
    let coords: Vec<f64> = raw.coords.iter().map(|c| c - peak_position).collect();

    // The offset is taken from the coordinate axis, not the value axis.
    let first = raw.coords[0];
    let last = raw.coords[raw.len() - 1];
    let value_offset = first.min(last);
    let corrected: Vec<f64> = raw.values.iter().map(|v| (v - value_offset).max(0.0)).collect();

    let fwhm = measure_fwhm(&coords, &corrected, config)?;
    if fwhm == 0.0 {
        return Err(BeamError::invalid(
            "no usable peak: FWHM could not be determined (peak too weak or too narrow)",
        ));
    }

    let values = normalize(&corrected)?;
    log::debug!(
        "prepared profile: {} samples, peak at {peak_position:.4}, value offset {value_offset:.4}, FWHM {fwhm:.4}",
        coords.len()
    );

    Ok(PreparedProfile {
        coords,
        values,
        fwhm,
        peak_position,
        value_offset,
    })
}

/// Scale values so their maximum is exactly 100.
pub fn normalize(values: &[f64]) -> Result<Vec<f64>, BeamError> {
    let peak = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if !(peak > 0.0) {
        return Err(BeamError::invalid(
            "normalization failed: corrected peak value is not positive",
        ));
    }
    Ok(values.iter().map(|v| v / peak * NORMALIZED_PEAK).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw_gaussian(center: f64, sigma: f64, amplitude: f64, lo: f64, hi: f64) -> RawProfile {
        let n = ((hi - lo) / 0.25).round() as usize;
        let coords: Vec<f64> = (0..=n).map(|i| lo + 0.25 * i as f64).collect();
        let values = coords
            .iter()
            .map(|x| amplitude * (-(x - center) * (x - center) / (2.0 * sigma * sigma)).exp())
            .collect();
        RawProfile::new(coords, values).unwrap()
    }

    #[test]
    fn normalized_profile_peaks_at_100_and_is_non_negative() {
        let raw = raw_gaussian(17.0, 3.0, 120.0, 0.0, 30.0);
        let p = prepare(&raw, &FwhmConfig::default()).unwrap();
        let max = p.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = p.values.iter().copied().fold(f64::INFINITY, f64::min);
        assert_eq!(max, 100.0);
        assert!(min >= 0.0);
    }

    #[test]
    fn peak_is_moved_to_origin() {
        let raw = raw_gaussian(17.0, 3.0, 120.0, 0.0, 30.0);
        let p = prepare(&raw, &FwhmConfig::default()).unwrap();
        assert_eq!(p.peak_position, 17.0);
        let peak_idx = p.values.iter().position(|&v| v == 100.0).unwrap();
        assert_eq!(p.coords[peak_idx], 0.0);
        assert_eq!(p.coords[0], -17.0);
    }

    #[test]
    fn value_offset_comes_from_endpoint_coordinates() {
        // Endpoints at -15 and +15: offset = -15, so every value rises by 15.
        let raw = RawProfile::new(
            vec![-15.0, -10.0, -5.0, 0.0, 5.0, 10.0, 15.0],
            vec![0.0, 10.0, 60.0, 100.0, 60.0, 10.0, 0.0],
        )
        .unwrap();
        let p = prepare(&raw, &FwhmConfig::default()).unwrap();
        assert_eq!(p.value_offset, -15.0);
        // Corrected values are v + 15, normalized by 115.
        assert!((p.values[0] - 15.0 / 115.0 * 100.0).abs() < 1e-12);
    }

    #[test]
    fn positive_offset_clamps_tails_to_zero() {
        // Endpoints at 5 and 35: offset = 5, tail samples below 5 drop to exactly 0.
        let raw = raw_gaussian(20.0, 3.0, 100.0, 5.0, 35.0);
        let p = prepare(&raw, &FwhmConfig::default()).unwrap();
        assert_eq!(p.value_offset, 5.0);

        let mut clamped = 0;
        for (raw_v, v) in raw.values.iter().zip(&p.values) {
            if *raw_v <= 5.0 {
                assert_eq!(*v, 0.0, "raw {raw_v}");
                clamped += 1;
            } else {
                let expected = (raw_v - 5.0) / 95.0 * 100.0;
                assert!((v - expected).abs() < 1e-9);
            }
        }
        assert!(clamped > 0);

        let max = p.values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = p.values.iter().copied().fold(f64::INFINITY, f64::min);
        assert_eq!(max, 100.0);
        assert!(min >= 0.0);
    }

    #[test]
    fn negative_value_is_rejected() {
        let raw = RawProfile::new(vec![0.0, 1.0, 2.0, 3.0], vec![0.0, 80.0, -1.0, 0.0]).unwrap();
        let err = prepare(&raw, &FwhmConfig::default()).unwrap_err();
        assert!(matches!(err, BeamError::InvalidInput(_)));
    }

    #[test]
    fn flat_profile_has_no_usable_peak() {
        let raw = RawProfile::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], vec![1.0; 5]).unwrap();
        let err = prepare(&raw, &FwhmConfig::default()).unwrap_err();
        assert!(matches!(err, BeamError::InvalidInput(_)));
    }

    #[test]
    fn normalize_rejects_non_positive_peak() {
        assert!(normalize(&[0.0, 0.0]).is_err());
        assert_eq!(normalize(&[1.0, 4.0]).unwrap(), vec![25.0, 100.0]);
    }
}
