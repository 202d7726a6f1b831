//! Run diagnostics and formatted terminal output.
//!
//! The diagnostics structs are computed once per run and used twice: printed
//! by `format` and serialized into the run manifest.

use serde::Serialize;

use crate::app::pipeline::{AxisFit, ReconstructOutput, SynthOutput};
use crate::domain::{CombineMethod, EdgeMethod, InterpMethod, SynthConfig};
use crate::extract::ExtractOutputs;
use crate::reconstruct::CENTER_INDEX;
use crate::surface::SurfacePeak;

pub mod format;

pub use format::*;

/// Per-axis preprocessing and fit quality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AxisDiagnostics {
    pub samples: usize,
    pub peak_position: f64,
    pub value_offset: f64,
    pub fwhm: f64,
    pub scale_factor: f64,
    pub r_squared: f64,
}

impl AxisDiagnostics {
    pub fn from_fit(fit: &AxisFit) -> Self {
        Self {
            samples: fit.raw.len(),
            peak_position: fit.profile.peak_position,
            value_offset: fit.profile.value_offset,
            fwhm: fit.profile.fwhm,
            scale_factor: fit.interp.scale_factor(),
            r_squared: fit.r_squared,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthDiagnostics {
    pub method: InterpMethod,
    pub combine: CombineMethod,
    pub edge: EdgeMethod,
    pub grid_size: usize,
    pub x: AxisDiagnostics,
    pub y: AxisDiagnostics,
    pub peak: SurfacePeak,
    pub total: f64,
    pub diagonal_fwhm: f64,
}

impl SynthDiagnostics {
    pub fn from_run(run: &SynthOutput, config: &SynthConfig) -> Self {
        Self {
            method: config.interp.method,
            combine: config.surface.combine,
            edge: config.surface.edge,
            grid_size: run.grid.size(),
            x: AxisDiagnostics::from_fit(&run.x),
            y: AxisDiagnostics::from_fit(&run.y),
            peak: run.grid.peak(),
            total: run.grid.total(),
            diagonal_fwhm: run.diagonal_fwhm,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconstructDiagnostics {
    pub iterations: usize,
    pub snapshots: usize,
    pub x_center_offset: f64,
    pub y_center_offset: f64,
    pub initial_total: f64,
    pub pre_clamp_total: f64,
    pub final_total: f64,
    pub max_abs_residual: f64,
    pub negative_cells: usize,
    /// Most negative value seen before clipping (0 when nothing was clipped).
    pub most_negative: f64,
    /// Peak position in mm, `x` to the right and `y` up.
    pub peak_x: f64,
    pub peak_y: f64,
    pub peak_value: f64,
}

impl ReconstructDiagnostics {
    pub fn from_run(run: &ReconstructOutput) -> Self {
        let r = &run.reconstruction;
        let (row, col, peak_value) = r.peak();
        Self {
            iterations: r.iterations,
            snapshots: run.snapshot_count,
            x_center_offset: run.x.center_offset,
            y_center_offset: run.y.center_offset,
            initial_total: r.initial_total,
            pre_clamp_total: r.pre_clamp_total,
            final_total: r.total(),
            max_abs_residual: r.max_abs_residual(),
            negative_cells: r.corrections.len(),
            most_negative: r.corrections.iter().map(|c| c.value).fold(0.0, f64::min),
            peak_x: col as f64 - CENTER_INDEX as f64,
            peak_y: CENTER_INDEX as f64 - row as f64,
            peak_value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtractDiagnostics {
    pub map_points: usize,
    pub thickness_column: String,
    pub x_points: usize,
    pub y_points: usize,
    pub x_max_removal: f64,
    pub y_max_removal: f64,
}

impl ExtractDiagnostics {
    pub fn from_outputs(out: &ExtractOutputs) -> Self {
        Self {
            map_points: out.map_points,
            thickness_column: out.thickness_column.clone(),
            x_points: out.x.coords.len(),
            y_points: out.y.coords.len(),
            x_max_removal: max_of(&out.x.values),
            y_max_removal: max_of(&out.y.values),
        }
    }
}

fn max_of(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}
