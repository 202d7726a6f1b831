//! Edge treatments applied to a combined surface.

use nalgebra::DMatrix;

/// Radial exponential falloff at `(x, y)` on a plane of half-width `half`.
///
/// 1 at the centre, 0 at (and beyond) the inscribed circle's boundary.
pub fn radial_falloff(x: f64, y: f64, half: f64, k: f64) -> f64 {
    let r = (x * x + y * y).sqrt() / half;
    if r > 1.0 {
        return 0.0;
    }
    let floor = (-k).exp();
    (((-k * r).exp() - floor) / (1.0 - floor)).clamp(0.0, 1.0)
}

/// Lower the surface by the largest value on the bounding-box ring of its
/// strictly-positive region, then clamp at 0.
///
/// The ring is the top and bottom rows of the box plus its left and right
/// columns without the corners. Returns the amount subtracted (0 when nothing
/// is positive).
pub fn apply_z_shift(values: &mut DMatrix<f64>) -> f64 {
    let Some((r0, r1, c0, c1)) = positive_bounds(values) else {
        return 0.0;
    };

    let mut edge_max = f64::NEG_INFINITY;
    for c in c0..=c1 {
        edge_max = edge_max.max(values[(r0, c)]).max(values[(r1, c)]);
    }
    for r in (r0 + 1)..r1 {
        edge_max = edge_max.max(values[(r, c0)]).max(values[(r, c1)]);
    }

    values.iter_mut().for_each(|v| *v = (*v - edge_max).max(0.0));
    edge_max
}

fn positive_bounds(values: &DMatrix<f64>) -> Option<(usize, usize, usize, usize)> {
    let mut bounds: Option<(usize, usize, usize, usize)> = None;
    for i in 0..values.nrows() {
        for j in 0..values.ncols() {
            if values[(i, j)] > 0.0 {
                bounds = Some(match bounds {
                    None => (i, i, j, j),
                    Some((r0, r1, c0, c1)) => (r0.min(i), r1.max(i), c0.min(j), c1.max(j)),
                });
            }
        }
    }
    bounds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falloff_is_one_at_centre_and_zero_at_boundary() {
        assert!((radial_falloff(0.0, 0.0, 15.0, 3.0) - 1.0).abs() < 1e-12);
        assert!(radial_falloff(15.0, 0.0, 15.0, 3.0).abs() < 1e-12);
        assert_eq!(radial_falloff(15.0, 15.0, 15.0, 3.0), 0.0);
        let mid = radial_falloff(7.5, 0.0, 15.0, 3.0);
        assert!(mid > 0.0 && mid < 1.0);
        assert_eq!(mid, radial_falloff(0.0, -7.5, 15.0, 3.0));
    }

    #[test]
    fn z_shift_subtracts_ring_maximum() {
        #[rustfmt::skip]
        let mut m = DMatrix::from_row_slice(5, 5, &[
            0.0, 0.0, 0.0, 0.0, 0.0,
            0.0, 1.0, 2.0, 1.0, 0.0,
            0.0, 2.0, 9.0, 3.0, 0.0,
            0.0, 1.0, 2.0, 1.0, 0.0,
            0.0, 0.0, 0.0, 0.0, 0.0,
        ]);
        let shift = apply_z_shift(&mut m);
        assert_eq!(shift, 3.0);
        assert_eq!(m[(2, 2)], 6.0);
        assert_eq!(m.iter().filter(|v| **v > 0.0).count(), 1);
        assert!(m.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn z_shift_on_empty_surface_is_a_no_op() {
        let mut m = DMatrix::<f64>::zeros(4, 4);
        assert_eq!(apply_z_shift(&mut m), 0.0);
        assert!(m.iter().all(|v| *v == 0.0));
    }
}
