//! Not-a-knot cubic spline.
//!
//! The spline is stored as knot values plus second derivatives `M_i`. The
//! not-a-knot end conditions (third derivative continuous across the second
//! and the second-to-last knot) are eliminated into the first and last
//! interior equations, which keeps the system tridiagonal.

use crate::error::BeamError;

#[derive(Debug, Clone)]
pub struct CubicSpline {
    xs: Vec<f64>,
    ys: Vec<f64>,
    /// Second derivatives at each knot.
    m: Vec<f64>,
}

impl CubicSpline {
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self, BeamError> {
        check_knots(xs, ys, 4, "cubic spline")?;

        let n = xs.len();
        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let slope: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

        // Unknowns are M_1..M_{n-2}.
        let k = n - 2;
        let mut sub = vec![0.0; k];
        let mut diag = vec![0.0; k];
        let mut sup = vec![0.0; k];
        let mut rhs = vec![0.0; k];
        for r in 0..k {
            let i = r + 1;
            sub[r] = h[i - 1];
            diag[r] = 2.0 * (h[i - 1] + h[i]);
            sup[r] = h[i];
            rhs[r] = 6.0 * (slope[i] - slope[i - 1]);
        }

        let (h0, h1) = (h[0], h[1]);
        sub[0] = 0.0;
        diag[0] = (h0 + h1) * (h0 + 2.0 * h1) / h1;
        sup[0] = (h1 * h1 - h0 * h0) / h1;

        let (a, b) = (h[n - 3], h[n - 2]);
        sub[k - 1] = (a * a - b * b) / a;
        diag[k - 1] = (a + b) * (2.0 * a + b) / a;
        sup[k - 1] = 0.0;

        let inner = solve_tridiagonal(&sub, &diag, &sup, &rhs)?;

        let mut m = Vec::with_capacity(n);
        m.push(((h0 + h1) * inner[0] - h0 * inner[1]) / h1);
        m.extend_from_slice(&inner);
        m.push(((a + b) * inner[k - 1] - b * inner[k - 2]) / a);

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            m,
        })
    }

    /// Evaluate the spline. Beyond the knots the boundary polynomial is extended.
    pub fn evaluate(&self, x: f64) -> f64 {
        let i = locate(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let a = (self.xs[i + 1] - x) / h;
        let b = (x - self.xs[i]) / h;

        a * self.ys[i]
            + b * self.ys[i + 1]
            + ((a * a * a - a) * self.m[i] + (b * b * b - b) * self.m[i + 1]) * h * h / 6.0
    }

    pub fn knots(&self) -> &[f64] {
        &self.xs
    }
}

/// Thomas algorithm for a tridiagonal system.
///
/// `sub[0]` and `sup[k-1]` are ignored.
pub fn solve_tridiagonal(
    sub: &[f64],
    diag: &[f64],
    sup: &[f64],
    rhs: &[f64],
) -> Result<Vec<f64>, BeamError> {
    let k = diag.len();
    let mut c = vec![0.0; k];
    let mut d = vec![0.0; k];

    for i in 0..k {
        let lower = if i == 0 { 0.0 } else { sub[i] };
        let prev_c = if i == 0 { 0.0 } else { c[i - 1] };
        let prev_d = if i == 0 { 0.0 } else { d[i - 1] };
        let pivot = diag[i] - lower * prev_c;
        if pivot.abs() < 1e-300 || !pivot.is_finite() {
            return Err(BeamError::invalid("spline system is singular"));
        }
        c[i] = if i + 1 < k { sup[i] / pivot } else { 0.0 };
        d[i] = (rhs[i] - lower * prev_d) / pivot;
    }

    let mut out = vec![0.0; k];
    out[k - 1] = d[k - 1];
    for i in (0..k - 1).rev() {
        out[i] = d[i] - c[i] * out[i + 1];
    }
    Ok(out)
}

/// Index `i` of the interval `[xs[i], xs[i+1]]` used to evaluate `x`.
///
/// Queries outside the knot range map to the first or last interval.
pub(crate) fn locate(xs: &[f64], x: f64) -> usize {
    let n = xs.len();
    xs.partition_point(|&v| v <= x).saturating_sub(1).min(n - 2)
}

/// Validate knot vectors shared by every interpolant.
pub(crate) fn check_knots(xs: &[f64], ys: &[f64], min: usize, what: &str) -> Result<(), BeamError> {
    if xs.len() != ys.len() {
        return Err(BeamError::invalid(format!(
            "{what}: {} knots but {} values",
            xs.len(),
            ys.len()
        )));
    }
    if xs.len() < min {
        return Err(BeamError::InsufficientData(format!(
            "{what} needs at least {min} points, got {}",
            xs.len()
        )));
    }
    if xs.windows(2).any(|w| !(w[1] > w[0])) {
        return Err(BeamError::invalid(format!(
            "{what}: knots must be strictly increasing"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_knots() {
        let xs = [1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [2.0, 3.0, 5.0, 4.0, 1.0];
        let s = CubicSpline::new(&xs, &ys).unwrap();
        for (x, y) in xs.iter().zip(ys.iter()) {
            let v = s.evaluate(*x);
            assert!((v - y).abs() < 1e-10, "S({x}) = {v}, expected {y}");
        }
    }

    #[test]
    fn reproduces_cubic_polynomial_exactly() {
        // Not-a-knot splines are exact for any cubic.
        let f = |x: f64| 0.5 * x * x * x - 2.0 * x * x + x - 3.0;
        let xs = [-2.0, -1.0, 0.5, 1.0, 2.5, 4.0];
        let ys: Vec<f64> = xs.iter().map(|&x| f(x)).collect();
        let s = CubicSpline::new(&xs, &ys).unwrap();
        for &x in &[-1.7, -0.3, 0.75, 1.9, 3.3] {
            assert!((s.evaluate(x) - f(x)).abs() < 1e-9, "mismatch at {x}");
        }
    }

    #[test]
    fn four_knots_is_the_minimum() {
        let err = CubicSpline::new(&[0.0, 1.0, 2.0], &[0.0, 1.0, 0.0]).unwrap_err();
        assert!(matches!(err, BeamError::InsufficientData(_)));
        assert!(CubicSpline::new(&[0.0, 1.0, 2.0, 3.0], &[0.0, 1.0, 1.0, 0.0]).is_ok());
    }

    #[test]
    fn rejects_unsorted_knots() {
        let err = CubicSpline::new(&[0.0, 2.0, 1.0, 3.0], &[0.0; 4]).unwrap_err();
        assert!(matches!(err, BeamError::InvalidInput(_)));
    }

    #[test]
    fn tridiagonal_solver_matches_known_solution() {
        // [4 1 0; 1 4 1; 0 1 4] x = [5 6 5] -> x = [1 1 1]
        let x = solve_tridiagonal(&[0.0, 1.0, 1.0], &[4.0, 4.0, 4.0], &[1.0, 1.0, 0.0], &[5.0, 6.0, 5.0])
            .unwrap();
        for v in x {
            assert!((v - 1.0).abs() < 1e-12);
        }
    }
}
