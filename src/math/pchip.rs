//! Shape-preserving piecewise cubic Hermite interpolation (PCHIP).
//!
//! Knot derivatives follow Fritsch–Carlson: a weighted harmonic mean of the
//! neighbouring secant slopes, zero at local extrema, and a one-sided
//! three-point estimate at the ends limited so it never overshoots.

use crate::error::BeamError;
use crate::math::spline::{check_knots, locate};

#[derive(Debug, Clone)]
pub struct Pchip {
    xs: Vec<f64>,
    ys: Vec<f64>,
    d: Vec<f64>,
}

impl Pchip {
    pub fn new(xs: &[f64], ys: &[f64]) -> Result<Self, BeamError> {
        check_knots(xs, ys, 2, "PCHIP")?;

        let n = xs.len();
        let h: Vec<f64> = xs.windows(2).map(|w| w[1] - w[0]).collect();
        let m: Vec<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / h[i]).collect();

        let d = if n == 2 {
            vec![m[0], m[0]]
        } else {
            let mut d = vec![0.0; n];
            for k in 1..n - 1 {
                let (m0, m1) = (m[k - 1], m[k]);
                if m0 == 0.0 || m1 == 0.0 || sign(m0) != sign(m1) {
                    d[k] = 0.0;
                    continue;
                }
                let w1 = 2.0 * h[k] + h[k - 1];
                let w2 = h[k] + 2.0 * h[k - 1];
                d[k] = (w1 + w2) / (w1 / m0 + w2 / m1);
            }
            d[0] = edge_slope(h[0], h[1], m[0], m[1]);
            d[n - 1] = edge_slope(h[n - 2], h[n - 3], m[n - 2], m[n - 3]);
            d
        };

        Ok(Self {
            xs: xs.to_vec(),
            ys: ys.to_vec(),
            d,
        })
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let i = locate(&self.xs, x);
        let h = self.xs[i + 1] - self.xs[i];
        let t = (x - self.xs[i]) / h;
        let t2 = t * t;
        let t3 = t2 * t;

        let h00 = 2.0 * t3 - 3.0 * t2 + 1.0;
        let h10 = t3 - 2.0 * t2 + t;
        let h01 = -2.0 * t3 + 3.0 * t2;
        let h11 = t3 - t2;

        h00 * self.ys[i] + h10 * h * self.d[i] + h01 * self.ys[i + 1] + h11 * h * self.d[i + 1]
    }
}

fn edge_slope(h0: f64, h1: f64, m0: f64, m1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * m0 - h0 * m1) / (h0 + h1);
    if sign(d) != sign(m0) {
        0.0
    } else if sign(m0) != sign(m1) && d.abs() > 3.0 * m0.abs() {
        3.0 * m0
    } else {
        d
    }
}

fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monotone_data_stays_monotone() {
        let xs = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let ys = [0.0, 0.1, 0.2, 5.0, 5.1, 5.2];
        let p = Pchip::new(&xs, &ys).unwrap();
        let mut prev = p.evaluate(0.0);
        for i in 1..=500 {
            let v = p.evaluate(5.0 * i as f64 / 500.0);
            assert!(v >= prev - 1e-12, "PCHIP overshoot at step {i}");
            prev = v;
        }
    }

    #[test]
    fn does_not_overshoot_a_peak() {
        let xs = [-2.0, -1.0, 0.0, 1.0, 2.0];
        let ys = [0.0, 20.0, 100.0, 20.0, 0.0];
        let p = Pchip::new(&xs, &ys).unwrap();
        for i in 0..=400 {
            let x = -2.0 + 4.0 * i as f64 / 400.0;
            let v = p.evaluate(x);
            assert!((-1e-12..=100.0 + 1e-12).contains(&v), "value {v} at {x}");
        }
        assert!((p.evaluate(0.0) - 100.0).abs() < 1e-12);
    }

    #[test]
    fn two_points_is_linear() {
        let p = Pchip::new(&[0.0, 2.0], &[1.0, 5.0]).unwrap();
        assert!((p.evaluate(1.0) - 3.0).abs() < 1e-12);
    }
}
