use nalgebra::DMatrix;
use serde::Serialize;

use crate::error::BeamError;
use crate::math::linspace;

/// A square intensity grid on a symmetric axis.
///
/// `values[(i, j)]` is the intensity at `x = coords[j]`, `y = coords[i]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceGrid {
    pub coords: Vec<f64>,
    pub values: DMatrix<f64>,
}

/// Location and height of the grid maximum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SurfacePeak {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl SurfaceGrid {
    pub fn size(&self) -> usize {
        self.coords.len()
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(0.0, f64::max)
    }

    /// Sum of all cells.
    pub fn total(&self) -> f64 {
        self.values.sum()
    }

    /// First maximum in row-major order.
    pub fn peak(&self) -> SurfacePeak {
        let mut best = (0, 0, f64::NEG_INFINITY);
        for i in 0..self.values.nrows() {
            for j in 0..self.values.ncols() {
                let v = self.values[(i, j)];
                if v > best.2 {
                    best = (i, j, v);
                }
            }
        }
        SurfacePeak {
            x: self.coords[best.1],
            y: self.coords[best.0],
            value: best.2.max(0.0),
        }
    }
}

/// `linspace(-plane_size/2, plane_size/2, floor(plane_size/step) + 1)`.
pub fn surface_axis(plane_size: f64, step: f64) -> Result<Vec<f64>, BeamError> {
    if !(plane_size.is_finite() && plane_size > 0.0) {
        return Err(BeamError::invalid(format!(
            "plane size must be positive, got {plane_size}"
        )));
    }
    if !(step.is_finite() && step > 0.0) {
        return Err(BeamError::invalid(format!("grid step must be positive, got {step}")));
    }
    let n = (plane_size / step).floor() as usize + 1;
    if n < 2 {
        return Err(BeamError::invalid(format!(
            "grid step {step} is larger than the plane size {plane_size}"
        )));
    }
    let half = plane_size / 2.0;
    Ok(linspace(-half, half, n))
}
