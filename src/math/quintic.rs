//! Natural quintic spline.
//!
//! Each interval carries a quintic Hermite polynomial fixed by the value,
//! first and second derivative at both of its knots. The unknown first and
//! second derivatives at every knot are solved jointly from:
//!
//! - continuity of the third and fourth derivatives at interior knots
//! - vanishing third and fourth derivatives at both ends (natural conditions)
//!
//! That is `2n` equations in `2n` unknowns, solved with a dense LU
//! factorization. Knot counts here are small (a few hundred at most).

use nalgebra::{DMatrix, DVector};

use crate::error::BeamError;
use crate::math::spline::{check_knots, locate};

#[derive(Debug, Clone)]
pub struct QuinticSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// First derivative at each knot.
    d1: Vec<f64>,
    /// Second derivative at each knot.
    d2: Vec<f64>,
}

/// Linear form over `[Δ, d0, s0, d1, s1]` for one interval, where `Δ = y1 - y0`.
type Form = [f64; 5];

impl QuinticSpline {
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self, BeamError> {
        check_knots(xs, ys, 6, "quintic spline")?;

        let n = xs.len();
        let size = 2 * n;
        let mut a = DMatrix::<f64>::zeros(size, size);
        let mut b = DVector::<f64>::zeros(size);
        let mut row = 0;

        // Natural conditions at the left end.
        {
            let h = xs[1] - xs[0];
            let (third, fourth) = start_derivatives(h);
            push_row(&mut a, &mut b, row, 0, &third, 1.0, ys[1] - ys[0]);
            push_row(&mut a, &mut b, row + 1, 0, &fourth, 1.0, ys[1] - ys[0]);
            row += 2;
        }

        // C3 and C4 continuity at interior knots.
        for k in 1..n - 1 {
            let h_left = xs[k] - xs[k - 1];
            let h_right = xs[k + 1] - xs[k];
            let (third_l, fourth_l) = end_derivatives(h_left);
            let (third_r, fourth_r) = start_derivatives(h_right);
            let delta_l = ys[k] - ys[k - 1];
            let delta_r = ys[k + 1] - ys[k];

            push_row(&mut a, &mut b, row, k - 1, &third_l, 1.0, delta_l);
            push_row(&mut a, &mut b, row, k, &third_r, -1.0, delta_r);
            push_row(&mut a, &mut b, row + 1, k - 1, &fourth_l, 1.0, delta_l);
            push_row(&mut a, &mut b, row + 1, k, &fourth_r, -1.0, delta_r);
            row += 2;
        }

        // Natural conditions at the right end.
        {
            let h = xs[n - 1] - xs[n - 2];
            let (third, fourth) = end_derivatives(h);
            let delta = ys[n - 1] - ys[n - 2];
            push_row(&mut a, &mut b, row, n - 2, &third, 1.0, delta);
            push_row(&mut a, &mut b, row + 1, n - 2, &fourth, 1.0, delta);
        }

        let solution = a
            .lu()
            .solve(&b)
            .ok_or_else(|| BeamError::invalid("quintic spline system is singular"))?;
        if solution.iter().any(|v| !v.is_finite()) {
            return Err(BeamError::invalid("quintic spline produced non-finite derivatives"));
        }

        let d1 = (0..n).map(|k| solution[2 * k]).collect();
        let d2 = (0..n).map(|k| solution[2 * k + 1]).collect();

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            d1,
            d2,
        })
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let i = locate(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let t = (x - self.xs[i]) / h;
        let c = coefficients(h, self.ys[i], self.ys[i + 1], self.d1[i], self.d2[i], self.d1[i + 1], self.d2[i + 1]);
        c.iter().rev().fold(0.0, |acc, &ck| acc * t + ck)
    }
}

/// Add `sign * form` for the interval starting at knot `k` into `row`.
///
/// The `Δ` term moves to the right-hand side.
fn push_row(a: &mut DMatrix<f64>, b: &mut DVector<f64>, row: usize, k: usize, form: &Form, sign: f64, delta: f64) {
    a[(row, 2 * k)] += sign * form[1];
    a[(row, 2 * k + 1)] += sign * form[2];
    a[(row, 2 * k + 2)] += sign * form[3];
    a[(row, 2 * k + 3)] += sign * form[4];
    b[row] -= sign * form[0] * delta;
}

/// `c3`, `c4`, `c5` of `p(t) = Σ c_j t^j` on an interval of width `h`.
fn high_order_forms(h: f64) -> (Form, Form, Form) {
    let h2 = h * h;
    let c3 = [10.0, -6.0 * h, -1.5 * h2, -4.0 * h, 0.5 * h2];
    let c4 = [-15.0, 8.0 * h, 1.5 * h2, 7.0 * h, -h2];
    let c5 = [6.0, -3.0 * h, -0.5 * h2, -3.0 * h, 0.5 * h2];
    (c3, c4, c5)
}

/// Third and fourth x-derivatives at the start of an interval.
fn start_derivatives(h: f64) -> (Form, Form) {
    let (c3, c4, _) = high_order_forms(h);
    let h3 = h * h * h;
    let h4 = h3 * h;
    (scale(&c3, 6.0 / h3), scale(&c4, 24.0 / h4))
}

/// Third and fourth x-derivatives at the end of an interval.
fn end_derivatives(h: f64) -> (Form, Form) {
    let (c3, c4, c5) = high_order_forms(h);
    let h3 = h * h * h;
    let h4 = h3 * h;
    let mut third = [0.0; 5];
    let mut fourth = [0.0; 5];
    for j in 0..5 {
        third[j] = (6.0 * c3[j] + 24.0 * c4[j] + 60.0 * c5[j]) / h3;
        fourth[j] = (24.0 * c4[j] + 120.0 * c5[j]) / h4;
    }
    (third, fourth)
}

fn scale(form: &Form, k: f64) -> Form {
    let mut out = *form;
    for v in &mut out {
        *v *= k;
    }
    out
}

fn coefficients(h: f64, y0: f64, y1: f64, d0: f64, s0: f64, d1: f64, s1: f64) -> [f64; 6] {
    let (c3, c4, c5) = high_order_forms(h);
    let u = [y1 - y0, d0, s0, d1, s1];
    let dot = |f: &Form| f.iter().zip(u.iter()).map(|(a, b)| a * b).sum::<f64>();
    [y0, h * d0, 0.5 * h * h * s0, dot(&c3), dot(&c4), dot(&c5)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interpolates_knots() {
        let xs: Vec<f64> = (0..9).map(|i| i as f64 * 0.75 - 3.0).collect();
        let ys: Vec<f64> = xs.iter().map(|x| 100.0 * (-x * x / 2.0).exp()).collect();
        let s = QuinticSpline::new(&xs, &ys).unwrap();
        for (x, y) in xs.iter().zip(ys.iter()) {
            assert!((s.evaluate(*x) - y).abs() < 1e-8, "mismatch at knot {x}");
        }
    }

    #[test]
    fn reproduces_quadratic() {
        // Quadratics have zero third and fourth derivatives, so they satisfy
        // the natural end conditions and must be reproduced exactly.
        let f = |x: f64| 3.0 * x * x - x + 2.0;
        let xs = [0.0, 0.5, 1.5, 2.0, 3.0, 4.5, 5.0];
        let ys: Vec<f64> = xs.iter().map(|&x| f(x)).collect();
        let s = QuinticSpline::new(&xs, &ys).unwrap();
        for &x in &[0.25, 1.1, 2.7, 4.9] {
            assert!((s.evaluate(x) - f(x)).abs() < 1e-8, "mismatch at {x}");
        }
    }

    #[test]
    fn needs_six_points() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0];
        let err = QuinticSpline::new(&xs, &[0.0, 1.0, 2.0, 1.0, 0.0]).unwrap_err();
        assert!(matches!(err, BeamError::InsufficientData(_)));
    }
}
