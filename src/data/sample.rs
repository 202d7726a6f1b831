//! Synthetic cross-section generation.
//!
//! Produces a pair of Gaussian removal profiles with known widths so the
//! analytic and exact paths can be exercised without measured wafer data.

use std::path::PathBuf;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{RawProfile, SampleConfig};
use crate::error::BeamError;
use crate::io::write_profile_pairs;
use crate::math::linspace;

pub const X_SAMPLE_FILE: &str = "x_crosssection_sample.csv";
pub const Y_SAMPLE_FILE: &str = "y_crosssection_sample.csv";

/// `sigma = fwhm * FWHM_TO_SIGMA` for a Gaussian.
pub const FWHM_TO_SIGMA: f64 = 0.424_660_900_144_009_5;

#[derive(Debug, Clone)]
pub struct SampleProfiles {
    pub x: RawProfile,
    pub y: RawProfile,
}

pub fn generate_profiles(config: &SampleConfig) -> Result<SampleProfiles, BeamError> {
    validate(config)?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let normal = Normal::new(0.0, config.noise)
        .map_err(|e| BeamError::invalid(format!("noise distribution: {e}")))?;

    let n = (config.span / config.step).floor() as usize + 1;
    let coords = linspace(-config.span / 2.0, config.span / 2.0, n);

    let mut profile = |center: f64, fwhm: f64| -> Result<RawProfile, BeamError> {
        let sigma = fwhm * FWHM_TO_SIGMA;
        let values = coords
            .iter()
            .map(|&p| {
                let clean = config.amplitude * (-(p - center) * (p - center) / (2.0 * sigma * sigma)).exp();
                let noisy = if config.noise > 0.0 {
                    clean + normal.sample(&mut rng)
                } else {
                    clean
                };
                noisy.max(0.0)
            })
            .collect();
        RawProfile::new(coords.clone(), values)
    };

    let x = profile(config.center_x, config.fwhm_x)?;
    let y = profile(config.center_y, config.fwhm_y)?;
    Ok(SampleProfiles { x, y })
}

/// Generate both profiles and write them as headerless cross-section files.
pub fn write_sample_profiles(config: &SampleConfig) -> Result<(PathBuf, PathBuf), BeamError> {
    let profiles = generate_profiles(config)?;
    let x_path = config.output_dir.join(X_SAMPLE_FILE);
    let y_path = config.output_dir.join(Y_SAMPLE_FILE);
    write_profile_pairs(&x_path, &profiles.x.coords, &profiles.x.values)?;
    write_profile_pairs(&y_path, &profiles.y.coords, &profiles.y.values)?;
    log::info!(
        "wrote synthetic profiles ({} samples each, seed {})",
        profiles.x.len(),
        config.seed
    );
    Ok((x_path, y_path))
}

fn validate(config: &SampleConfig) -> Result<(), BeamError> {
    let positive = [
        ("x FWHM", config.fwhm_x),
        ("y FWHM", config.fwhm_y),
        ("amplitude", config.amplitude),
        ("span", config.span),
        ("step", config.step),
    ];
    for (name, v) in positive {
        if !(v.is_finite() && v > 0.0) {
            return Err(BeamError::invalid(format!("{name} must be positive, got {v}")));
        }
    }
    if config.step >= config.span {
        return Err(BeamError::invalid(format!(
            "step {} must be smaller than the span {}",
            config.step, config.span
        )));
    }
    if !(config.noise.is_finite() && config.noise >= 0.0) {
        return Err(BeamError::invalid(format!(
            "noise must be non-negative, got {}",
            config.noise
        )));
    }
    if !(config.center_x.is_finite() && config.center_y.is_finite()) {
        return Err(BeamError::invalid("beam centre must be finite"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FwhmConfig;
    use crate::profile::measure_fwhm;

    fn config() -> SampleConfig {
        SampleConfig {
            output_dir: PathBuf::from("."),
            fwhm_x: 8.0,
            fwhm_y: 5.0,
            amplitude: 120.0,
            center_x: 1.5,
            center_y: -2.0,
            span: 30.0,
            step: 0.25,
            noise: 0.0,
            seed: 42,
        }
    }

    #[test]
    fn clean_profiles_have_requested_width() {
        let s = generate_profiles(&config()).unwrap();
        assert_eq!(s.x.len(), 121);
        let fx = measure_fwhm(&s.x.coords, &s.x.values, &FwhmConfig::default()).unwrap();
        let fy = measure_fwhm(&s.y.coords, &s.y.values, &FwhmConfig::default()).unwrap();
        assert!((fx - 8.0).abs() < 0.02, "{fx}");
        assert!((fy - 5.0).abs() < 0.02, "{fy}");
        assert_eq!(s.x.coords[s.x.peak_index()], 1.5);
    }

    #[test]
    fn noise_is_seeded_and_non_negative() {
        let mut cfg = config();
        cfg.noise = 3.0;
        let a = generate_profiles(&cfg).unwrap();
        let b = generate_profiles(&cfg).unwrap();
        assert_eq!(a.x, b.x);
        assert_eq!(a.y, b.y);
        assert!(a.x.values.iter().chain(&a.y.values).all(|v| *v >= 0.0));

        cfg.seed = 43;
        let c = generate_profiles(&cfg).unwrap();
        assert_ne!(a.x, c.x);
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let mut cfg = config();
        cfg.fwhm_x = 0.0;
        assert!(matches!(generate_profiles(&cfg), Err(BeamError::InvalidInput(_))));
        let mut cfg = config();
        cfg.noise = -1.0;
        assert!(matches!(generate_profiles(&cfg), Err(BeamError::InvalidInput(_))));
    }

    #[test]
    fn sample_files_round_trip_through_loader() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config();
        cfg.output_dir = dir.path().to_path_buf();
        let (x_path, _) = write_sample_profiles(&cfg).unwrap();
        let loaded = crate::io::load_raw_profile(&x_path).unwrap();
        assert_eq!(loaded, generate_profiles(&cfg).unwrap().x);
    }
}
