//! Combine two axis interpolators into a 2-D intensity surface.

use nalgebra::DMatrix;
use rayon::prelude::*;

use crate::domain::{EdgeMethod, SurfaceConfig};
use crate::error::BeamError;
use crate::interp::AxisInterpolator;
use crate::surface::edge::{apply_z_shift, radial_falloff};
use crate::surface::grid::{SurfaceGrid, surface_axis};

/// Synthesize the surface `combine(ix(x), iy(y))` with edge treatment.
///
/// Every returned value is finite and ≥ 0.
pub fn synthesize(
    ix: &AxisInterpolator,
    iy: &AxisInterpolator,
    config: &SurfaceConfig,
) -> Result<SurfaceGrid, BeamError> {
    let coords = surface_axis(config.plane_size, config.step)?;
    if config.edge != EdgeMethod::None && !(config.falloff_k.is_finite() && config.falloff_k > 0.0) {
        return Err(BeamError::invalid(format!(
            "falloff constant must be positive, got {}",
            config.falloff_k
        )));
    }

    let half = config.plane_size / 2.0;
    let n = coords.len();
    let along_x = ix.sample(&coords);
    let along_y = iy.sample(&coords);

    // Rows are independent; evaluate them in parallel and keep row order.
    let rows: Vec<Vec<f64>> = coords
        .par_iter()
        .zip(along_y.par_iter())
        .map(|(&y, &vy)| {
            coords
                .iter()
                .zip(along_x.iter())
                .map(|(&x, &vx)| {
                    let z = config.combine.combine(vx, vy);
                    match config.edge {
                        EdgeMethod::None => z,
                        EdgeMethod::Exponential | EdgeMethod::ZShift => {
                            z * radial_falloff(x, y, half, config.falloff_k)
                        }
                    }
                })
                .collect()
        })
        .collect();

    let mut values = DMatrix::from_row_iterator(n, n, rows.into_iter().flatten());

    if config.edge == EdgeMethod::ZShift {
        let shift = apply_z_shift(&mut values);
        log::debug!("z-shift lowered the surface by {shift:.6}");
    }

    values.iter_mut().for_each(|v| *v = if v.is_finite() { (*v).max(0.0) } else { 0.0 });

    log::info!(
        "synthesized {n}x{n} surface ({}, {})",
        config.combine.display_name(),
        config.edge.display_name()
    );
    Ok(SurfaceGrid { coords, values })
}

/// Combined intensity along the diagonal `x = y`, before edge treatment.
pub fn diagonal_profile(
    ix: &AxisInterpolator,
    iy: &AxisInterpolator,
    config: &SurfaceConfig,
) -> Result<Vec<(f64, f64)>, BeamError> {
    let coords = surface_axis(config.plane_size, config.step)?;
    Ok(coords
        .iter()
        .map(|&t| (t, config.combine.combine(ix.evaluate(t), iy.evaluate(t)).max(0.0)))
        .collect())
}
