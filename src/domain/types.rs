//! Shared domain types.
//!
//! These types are kept lightweight and serializable so they can be:
//!
//! - passed explicitly into each pipeline stage (no global settings)
//! - recorded verbatim in run manifests
//! - parsed from CLI flags via `clap::ValueEnum`

use std::path::PathBuf;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::BeamError;

/// How a discretized cross-section is turned into a continuous function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum InterpMethod {
    /// Not-a-knot cubic spline.
    Cubic,
    /// Shape-preserving piecewise cubic Hermite (PCHIP).
    Pchip,
    /// Natural quintic spline, clipped at zero.
    Quintic,
}

impl InterpMethod {
    pub fn display_name(self) -> &'static str {
        match self {
            InterpMethod::Cubic => "cubic spline",
            InterpMethod::Pchip => "PCHIP (shape-preserving)",
            InterpMethod::Quintic => "quintic spline",
        }
    }

    /// Minimum number of knots (after domain extension) the method needs.
    pub fn min_knots(self) -> usize {
        match self {
            InterpMethod::Cubic => 4,
            InterpMethod::Pchip => 2,
            InterpMethod::Quintic => 6,
        }
    }
}

impl FromStr for InterpMethod {
    type Err = BeamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cubic" | "cubic-spline" => Ok(InterpMethod::Cubic),
            "pchip" | "shape-preserving" => Ok(InterpMethod::Pchip),
            "quintic" | "quintic-spline" => Ok(InterpMethod::Quintic),
            other => Err(BeamError::UnsupportedMethod(format!(
                "interpolation method '{other}' (expected cubic, pchip or quintic)"
            ))),
        }
    }
}

/// How the two axis intensities are merged at each grid point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CombineMethod {
    /// `sqrt(a * b)`; preserves multiplicative energy scaling.
    Geometric,
    /// `(a + b) / 2`.
    Arithmetic,
}

impl CombineMethod {
    pub fn display_name(self) -> &'static str {
        match self {
            CombineMethod::Geometric => "geometric mean",
            CombineMethod::Arithmetic => "arithmetic mean",
        }
    }

    /// Combine two axis intensities.
    ///
    /// A negative product (possible after spline undershoot) is treated as 0
    /// so the geometric mean never produces NaN.
    pub fn combine(self, a: f64, b: f64) -> f64 {
        match self {
            CombineMethod::Geometric => (a * b).max(0.0).sqrt(),
            CombineMethod::Arithmetic => 0.5 * (a + b),
        }
    }
}

impl FromStr for CombineMethod {
    type Err = BeamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "geometric" | "geometric-mean" => Ok(CombineMethod::Geometric),
            "arithmetic" | "arithmetic-mean" => Ok(CombineMethod::Arithmetic),
            other => Err(BeamError::UnsupportedMethod(format!(
                "combination method '{other}' (expected geometric or arithmetic)"
            ))),
        }
    }
}

/// Edge treatment applied to the combined surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeMethod {
    /// Multiply by a radial exponential falloff.
    Exponential,
    /// Exponential falloff, then lower the whole surface by its boundary-ring maximum.
    ZShift,
    /// Leave the surface untouched.
    None,
}

impl EdgeMethod {
    pub fn display_name(self) -> &'static str {
        match self {
            EdgeMethod::Exponential => "exponential falloff",
            EdgeMethod::ZShift => "z-shift",
            EdgeMethod::None => "none",
        }
    }
}

impl FromStr for EdgeMethod {
    type Err = BeamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exponential" => Ok(EdgeMethod::Exponential),
            "z-shift" | "zshift" => Ok(EdgeMethod::ZShift),
            "none" => Ok(EdgeMethod::None),
            other => Err(BeamError::UnsupportedMethod(format!(
                "edge method '{other}' (expected exponential, z-shift or none)"
            ))),
        }
    }
}

/// A measured cross-section: `(coordinate, value)` pairs sorted by coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct RawProfile {
    pub coords: Vec<f64>,
    pub values: Vec<f64>,
}

impl RawProfile {
    /// Build a profile, sorting samples by coordinate.
    ///
    /// Values may be negative here; whether that is acceptable depends on the
    /// consumer (the analytic path rejects it, the exact path tolerates it).
    pub fn new(coords: Vec<f64>, values: Vec<f64>) -> Result<Self, BeamError> {
        if coords.len() != values.len() {
            return Err(BeamError::invalid(format!(
                "profile has {} coordinates but {} values",
                coords.len(),
                values.len()
            )));
        }
        if coords.len() < 2 {
            return Err(BeamError::invalid("profile needs at least two samples"));
        }
        if coords.iter().chain(values.iter()).any(|v| !v.is_finite()) {
            return Err(BeamError::invalid("profile contains non-finite numbers"));
        }

        let mut pairs: Vec<(f64, f64)> = coords.into_iter().zip(values).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        let (coords, values) = pairs.into_iter().unzip();
        Ok(Self { coords, values })
    }

    pub fn len(&self) -> usize {
        self.coords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Index of the first maximum value.
    pub fn peak_index(&self) -> usize {
        argmax(&self.values)
    }
}

/// A centered, normalized profile ready for interpolation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedProfile {
    /// Coordinates translated so the peak sits at 0.
    pub coords: Vec<f64>,
    /// Values scaled so the maximum is exactly 100.
    pub values: Vec<f64>,
    /// FWHM measured on the corrected (pre-normalization) values.
    pub fwhm: f64,
    /// Original coordinate of the peak sample.
    pub peak_position: f64,
    /// Offset subtracted from the values before normalization.
    pub value_offset: f64,
}

/// Settings for FWHM measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FwhmConfig {
    /// Number of points in the dense cubic resampling.
    pub dense_points: usize,
    /// Peaks below this value are treated as noise (FWHM reported as 0).
    pub min_peak: f64,
}

impl Default for FwhmConfig {
    fn default() -> Self {
        Self {
            dense_points: 1000,
            min_peak: 50.0,
        }
    }
}

/// Settings for building axis interpolators.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterpConfig {
    pub method: InterpMethod,
    /// Distance of the zero-valued anchors beyond each end of the data.
    pub anchor_offset: f64,
    pub fwhm: FwhmConfig,
}

impl Default for InterpConfig {
    fn default() -> Self {
        Self {
            method: InterpMethod::Cubic,
            anchor_offset: 0.1,
            fwhm: FwhmConfig::default(),
        }
    }
}

/// Settings for surface synthesis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfaceConfig {
    /// Full edge length of the square plane (mm).
    pub plane_size: f64,
    /// Grid spacing (mm).
    pub step: f64,
    pub combine: CombineMethod,
    pub edge: EdgeMethod,
    /// Decay constant of the radial falloff.
    pub falloff_k: f64,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            plane_size: 30.0,
            step: 1.0,
            combine: CombineMethod::Geometric,
            edge: EdgeMethod::Exponential,
            falloff_k: 3.0,
        }
    }
}

/// A full `synth` run as understood by the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct SynthConfig {
    pub x_path: PathBuf,
    pub y_path: PathBuf,
    pub output: PathBuf,
    /// Also carries the FWHM settings used for measurement and scale correction.
    pub interp: InterpConfig,
    pub surface: SurfaceConfig,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub manifest: Option<PathBuf>,
}

/// A full `reconstruct` run.
#[derive(Debug, Clone, Serialize)]
pub struct ReconstructConfig {
    pub x_path: PathBuf,
    pub y_path: PathBuf,
    pub output_dir: PathBuf,
    /// Write one diagnostic CSV per iteration.
    pub snapshots: bool,
    /// Print target vs reconstructed marginals.
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub manifest: Option<PathBuf>,
}

/// A full `extract` run.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractConfig {
    pub initial: PathBuf,
    pub after: PathBuf,
    pub output_dir: PathBuf,
    /// Fixed coordinate of the perpendicular axis along which each cut is taken.
    pub cut: f64,
    /// Cross-sections span `[-half_range, half_range]`.
    pub half_range: f64,
    /// Exact number of samples each cross-section must contain.
    pub expected_points: usize,
    /// Thickness column header to prefer over the built-in names.
    pub thickness_column: Option<String>,
}

impl ExtractConfig {
    pub fn with_paths(initial: PathBuf, after: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            initial,
            after,
            output_dir,
            cut: 40.0,
            half_range: 15.0,
            expected_points: 121,
            thickness_column: None,
        }
    }
}

/// Synthetic cross-section generation.
#[derive(Debug, Clone, Serialize)]
pub struct SampleConfig {
    pub output_dir: PathBuf,
    pub fwhm_x: f64,
    pub fwhm_y: f64,
    /// Peak removal depth.
    pub amplitude: f64,
    /// Position of the beam centre along each scan.
    pub center_x: f64,
    pub center_y: f64,
    /// Scans cover `[-span/2, span/2]`.
    pub span: f64,
    pub step: f64,
    /// Standard deviation of additive Gaussian noise.
    pub noise: f64,
    pub seed: u64,
}

pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}
