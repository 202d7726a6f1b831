//! Axis interpolators: continuous intensity functions built from one
//! prepared cross-section.
//!
//! An interpolator is built over an *extended* domain (the data plus a
//! zero-valued anchor just beyond each end) and is identically 0 outside it.
//! `create_scaled` then stretches or compresses the input axis so the
//! interpolant's own FWHM matches the FWHM measured on the physical profile,
//! whatever width distortion the chosen spline introduced.

use crate::domain::{FwhmConfig, InterpConfig, InterpMethod, PreparedProfile};
use crate::error::BeamError;
use crate::math::{CubicSpline, Pchip, QuinticSpline, linspace, r_squared};
use crate::profile::measure_fwhm;

#[derive(Debug, Clone)]
enum Kernel {
    Cubic(CubicSpline),
    Pchip(Pchip),
    Quintic(QuinticSpline),
}

impl Kernel {
    fn build(method: InterpMethod, xs: &[f64], ys: &[f64]) -> Result<Self, BeamError> {
        Ok(match method {
            InterpMethod::Cubic => Kernel::Cubic(CubicSpline::new(xs, ys)?),
            InterpMethod::Pchip => Kernel::Pchip(Pchip::new(xs, ys)?),
            InterpMethod::Quintic => Kernel::Quintic(QuinticSpline::new(xs, ys)?),
        })
    }

    fn evaluate(&self, x: f64) -> f64 {
        match self {
            Kernel::Cubic(s) => s.evaluate(x),
            Kernel::Pchip(p) => p.evaluate(x),
            Kernel::Quintic(q) => q.evaluate(x).max(0.0),
        }
    }
}

/// A continuous coordinate → intensity mapping for one axis.
#[derive(Debug, Clone)]
pub struct AxisInterpolator {
    method: InterpMethod,
    kernel: Kernel,
    lo: f64,
    hi: f64,
    /// Query coordinates are multiplied by this before evaluation.
    scale: f64,
}

impl AxisInterpolator {
    /// Build an unscaled interpolator over the extended domain of `(coords, values)`.
    pub fn build(coords: &[f64], values: &[f64], config: &InterpConfig) -> Result<Self, BeamError> {
        let (xs, ys) = extend_domain(coords, values, config.anchor_offset)?;
        if xs.len() < config.method.min_knots() {
            return Err(BeamError::InsufficientData(format!(
                "{} needs at least {} points after domain extension, got {}",
                config.method.display_name(),
                config.method.min_knots(),
                xs.len()
            )));
        }
        let kernel = Kernel::build(config.method, &xs, &ys)?;
        Ok(Self {
            method: config.method,
            kernel,
            lo: xs[0],
            hi: xs[xs.len() - 1],
            scale: 1.0,
        })
    }

    /// Evaluate at `x`; 0 whenever the scaled query leaves the extended domain.
    pub fn evaluate(&self, x: f64) -> f64 {
        let s = x * self.scale;
        if s >= self.lo && s <= self.hi {
            self.kernel.evaluate(s)
        } else {
            0.0
        }
    }

    pub fn sample(&self, xs: &[f64]) -> Vec<f64> {
        xs.iter().map(|&x| self.evaluate(x)).collect()
    }

    pub fn method(&self) -> InterpMethod {
        self.method
    }

    /// Extended domain of the underlying kernel.
    pub fn domain(&self) -> (f64, f64) {
        (self.lo, self.hi)
    }

    /// Range of query coordinates that can produce non-zero output.
    pub fn support(&self) -> (f64, f64) {
        (self.lo / self.scale, self.hi / self.scale)
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale
    }

    /// Rescale the input axis so the interpolant's FWHM equals `target_fwhm`.
    ///
    /// If the interpolant's own FWHM cannot be measured the interpolator is
    /// returned unscaled.
    pub fn create_scaled(self, target_fwhm: f64, config: &FwhmConfig) -> Result<Self, BeamError> {
        if !(target_fwhm.is_finite() && target_fwhm > 0.0) {
            return Err(BeamError::invalid(format!(
                "target FWHM must be positive, got {target_fwhm}"
            )));
        }

        let test_x = linspace(self.lo, self.hi, config.dense_points.max(4));
        let test_y: Vec<f64> = test_x.iter().map(|&x| self.kernel.evaluate(x)).collect();
        let current = measure_fwhm(&test_x, &test_y, config)?;

        if current <= 0.0 {
            log::warn!(
                "{} interpolant has no measurable FWHM; keeping it unscaled",
                self.method.display_name()
            );
            return Ok(self);
        }

        let scale = target_fwhm / current;
        log::debug!(
            "{} interpolant FWHM {current:.4} -> target {target_fwhm:.4} (scale {scale:.6})",
            self.method.display_name()
        );
        Ok(Self { scale, ..self })
    }

    /// Coefficient of determination of this interpolator against a prepared profile.
    pub fn r_squared_against(&self, profile: &PreparedProfile) -> f64 {
        r_squared(&profile.values, &self.sample(&profile.coords))
    }
}

/// Build and width-correct the interpolator for one prepared profile.
pub fn build_scaled(profile: &PreparedProfile, config: &InterpConfig) -> Result<AxisInterpolator, BeamError> {
    AxisInterpolator::build(&profile.coords, &profile.values, config)?.create_scaled(profile.fwhm, &config.fwhm)
}

/// Collapse duplicate coordinates (keeping the largest value) and add a
/// zero-valued anchor `anchor_offset` beyond each end.
pub fn extend_domain(
    coords: &[f64],
    values: &[f64],
    anchor_offset: f64,
) -> Result<(Vec<f64>, Vec<f64>), BeamError> {
    if coords.len() != values.len() || coords.is_empty() {
        return Err(BeamError::invalid(
            "cannot extend an empty or mismatched profile",
        ));
    }
    if !(anchor_offset.is_finite() && anchor_offset >= 0.0) {
        return Err(BeamError::invalid(format!(
            "anchor offset must be non-negative, got {anchor_offset}"
        )));
    }

    let min = coords.iter().copied().fold(f64::INFINITY, f64::min);
    let max = coords.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    let mut pairs: Vec<(f64, f64)> = coords.iter().copied().zip(values.iter().copied()).collect();
    pairs.push((min - anchor_offset, 0.0));
    pairs.push((max + anchor_offset, 0.0));
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut xs: Vec<f64> = Vec::with_capacity(pairs.len());
    let mut ys: Vec<f64> = Vec::with_capacity(pairs.len());
    for (x, y) in pairs {
        match xs.last() {
            Some(&last) if last == x => {
                let top = ys.len() - 1;
                ys[top] = ys[top].max(y);
            }
            _ => {
                xs.push(x);
                ys.push(y);
            }
        }
    }
    Ok((xs, ys))
}
