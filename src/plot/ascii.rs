//! ASCII plotting for terminal output.
//!
//! Fixed-size character grid, deterministic output:
//! - measured samples: `o`
//! - interpolated / fitted curve: `-` line

use crate::domain::PreparedProfile;
use crate::interp::AxisInterpolator;
use crate::math::linspace;

/// Plot a prepared cross-section with its width-corrected interpolant.
pub fn render_profile_plot(profile: &PreparedProfile, interp: &AxisInterpolator, width: usize, height: usize) -> String {
    let points: Vec<(f64, f64)> = profile
        .coords
        .iter()
        .copied()
        .zip(profile.values.iter().copied())
        .collect();
    let Some((x_min, x_max)) = x_range(&points) else {
        return String::from("Plot: (not enough points)\n");
    };
    let xs = linspace(x_min, x_max, width.max(2));
    let curve: Vec<(f64, f64)> = xs.iter().map(|&x| (x, interp.evaluate(x))).collect();
    render_plot(&points, Some(&curve), x_min, x_max, width, height)
}

/// Plot a target marginal (`o`) against the reconstructed one (`-`).
pub fn render_marginal_plot(positions: &[f64], target: &[f64], fitted: &[f64], width: usize, height: usize) -> String {
    let points: Vec<(f64, f64)> = positions.iter().copied().zip(target.iter().copied()).collect();
    let curve: Vec<(f64, f64)> = positions.iter().copied().zip(fitted.iter().copied()).collect();
    let Some((x_min, x_max)) = x_range(&points) else {
        return String::from("Plot: (not enough points)\n");
    };
    render_plot(&points, Some(&curve), x_min, x_max, width, height)
}

fn render_plot(
    points: &[(f64, f64)],
    curve_points: Option<&[(f64, f64)]>,
    x_min: f64,
    x_max: f64,
    width: usize,
    height: usize,
) -> String {
    let (y_lo, y_hi) = value_bounds(points.iter().chain(curve_points.unwrap_or(&[]))).unwrap_or((0.0, 1.0));
    let pad = ((y_hi - y_lo).abs() * 0.05).max(1e-12);
    let (y_min, y_max) = (y_lo - pad, y_hi + pad);

    let mut canvas = Canvas::new(width.max(10), height.max(5), (x_min, x_max), (y_min, y_max));

    // Curve first so samples overlay it.
    if let Some(curve) = curve_points.filter(|c| c.len() >= 2) {
        let cells: Vec<(usize, usize)> = curve.iter().map(|&(x, y)| canvas.cell(x, y)).collect();
        canvas.set(cells[0], '-');
        for pair in cells.windows(2) {
            canvas.line(pair[0], pair[1], '-');
        }
    }
    for &(x, y) in points {
        let cell = canvas.cell(x, y);
        canvas.set(cell, 'o');
    }

    let mut out = format!("Plot: x=[{x_min:.3}, {x_max:.3}] mm | y=[{y_min:.2}, {y_max:.2}]\n");
    out.push_str(&canvas.render());
    out
}

fn x_range(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let (lo, hi) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(x, _)| (lo.min(x), hi.max(x)));
    (lo.is_finite() && hi.is_finite() && hi > lo).then_some((lo, hi))
}

fn value_bounds<'a>(points: impl Iterator<Item = &'a (f64, f64)>) -> Option<(f64, f64)> {
    let (lo, hi) = points.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
    (lo.is_finite() && hi.is_finite() && hi > lo).then_some((lo, hi))
}

/// Character grid with data-space to cell mapping. Row 0 is the top.
struct Canvas {
    cells: Vec<Vec<char>>,
    x_bounds: (f64, f64),
    y_bounds: (f64, f64),
}

impl Canvas {
    fn new(width: usize, height: usize, x_bounds: (f64, f64), y_bounds: (f64, f64)) -> Self {
        Self {
            cells: vec![vec![' '; width]; height],
            x_bounds,
            y_bounds,
        }
    }

    fn width(&self) -> usize {
        self.cells[0].len()
    }

    fn height(&self) -> usize {
        self.cells.len()
    }

    /// `(col, row)` of a data point, clamped to the canvas.
    fn cell(&self, x: f64, y: f64) -> (usize, usize) {
        let fraction = |v: f64, (lo, hi): (f64, f64)| ((v - lo) / (hi - lo)).clamp(0.0, 1.0);
        let last_col = (self.width() - 1) as f64;
        let last_row = (self.height() - 1) as f64;
        let col = (fraction(x, self.x_bounds) * last_col).round() as usize;
        let row = (last_row - fraction(y, self.y_bounds) * last_row).round() as usize;
        (col, row)
    }

    fn set(&mut self, (col, row): (usize, usize), ch: char) {
        self.cells[row][col] = ch;
    }

    /// Bresenham line that only fills blank cells.
    fn line(&mut self, from: (usize, usize), to: (usize, usize), ch: char) {
        let (mut c, mut r) = (from.0 as isize, from.1 as isize);
        let (c1, r1) = (to.0 as isize, to.1 as isize);
        let dc = (c1 - c).abs();
        let dr = -(r1 - r).abs();
        let step_c = (c1 - c).signum();
        let step_r = (r1 - r).signum();
        let mut err = dc + dr;

        loop {
            let cell = &mut self.cells[r as usize][c as usize];
            if *cell == ' ' {
                *cell = ch;
            }
            if c == c1 && r == r1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dr {
                err += dr;
                c += step_c;
            }
            if e2 <= dc {
                err += dc;
                r += step_r;
            }
        }
    }

    fn render(&self) -> String {
        let mut out = String::with_capacity((self.width() + 1) * self.height());
        for row in &self.cells {
            out.extend(row.iter());
            out.push('\n');
        }
        out
    }
}
