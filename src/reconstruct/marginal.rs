//! Marginal-fit reconstruction on the fixed 31×31 grid.
//!
//! The grid is seeded with the x profile on every row, so column sums start
//! out correct and every later update adds multiples of the normalized x
//! profile. Each step settles the unprocessed row whose sum overshoots its y
//! target the most and spreads the removed mass over the rows still open. The
//! last open row is settled against all thirty others.

use nalgebra::{DMatrix, RowDVector};
use serde::Serialize;

use crate::error::BeamError;
use crate::reconstruct::snapshot::{IterationSnapshot, SnapshotLabel, SnapshotSink};

/// Edge length of the reconstruction grid.
pub const GRID_SIZE: usize = 31;
/// Row (and column) holding the 0 mm position.
pub const CENTER_INDEX: usize = 15;
/// Residuals closer than this to the maximum are treated as ties.
pub const TIE_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowState {
    Unprocessed,
    Processed,
}

/// One settled row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowUpdate {
    pub iteration: usize,
    pub row: usize,
    /// Residual (row sum − target) removed from the row.
    pub diff: f64,
}

/// A cell that was negative before clipping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NegativeCorrection {
    pub row: usize,
    pub col: usize,
    /// Position of the row in mm (`15 - row`).
    pub y: f64,
    /// Position of the column in mm (`col - 15`).
    pub x: f64,
    pub value: f64,
}

/// Result of a complete reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    pub matrix: DMatrix<f64>,
    pub row_sums: Vec<f64>,
    pub col_sums: Vec<f64>,
    pub diff_y: Vec<f64>,
    pub diff_x: Vec<f64>,
    pub x_profile: Vec<f64>,
    /// y target in row order (row 0 is +15 mm).
    pub y_profile: Vec<f64>,
    pub corrections: Vec<NegativeCorrection>,
    pub iterations: usize,
    pub initial_total: f64,
    /// Grid total after the last row update, before clipping.
    pub pre_clamp_total: f64,
}

impl Reconstruction {
    pub fn total(&self) -> f64 {
        self.matrix.sum()
    }

    /// Largest absolute residual over both marginals.
    pub fn max_abs_residual(&self) -> f64 {
        self.diff_x
            .iter()
            .chain(self.diff_y.iter())
            .fold(0.0, |acc, d| acc.max(d.abs()))
    }

    /// `(row, col, value)` of the first maximum cell.
    pub fn peak(&self) -> (usize, usize, f64) {
        let mut best = (0, 0, f64::NEG_INFINITY);
        for r in 0..self.matrix.nrows() {
            for c in 0..self.matrix.ncols() {
                if self.matrix[(r, c)] > best.2 {
                    best = (r, c, self.matrix[(r, c)]);
                }
            }
        }
        best
    }
}

#[derive(Debug, Clone)]
pub struct MarginalFitReconstructor {
    matrix: DMatrix<f64>,
    x_profile: Vec<f64>,
    /// Row-ordered y target.
    y_profile: Vec<f64>,
    unit_x: RowDVector<f64>,
    states: [RowState; GRID_SIZE],
    iteration: usize,
    initial_total: f64,
}

impl MarginalFitReconstructor {
    /// Seed the grid from two 31-sample profiles on −15..+15 mm.
    ///
    /// `y_profile` is given in ascending-position order and stored reversed so
    /// that row 0 is +15 mm.
    pub fn new(x_profile: &[f64], y_profile: &[f64]) -> Result<Self, BeamError> {
        for (name, p) in [("x", x_profile), ("y", y_profile)] {
            if p.len() != GRID_SIZE {
                return Err(BeamError::invalid(format!(
                    "{name} profile must have {GRID_SIZE} samples, got {}",
                    p.len()
                )));
            }
            if p.iter().any(|v| !v.is_finite()) {
                return Err(BeamError::invalid(format!("{name} profile contains non-finite values")));
            }
        }
        let sum_x: f64 = x_profile.iter().sum();
        if sum_x == 0.0 {
            return Err(BeamError::invalid(
                "x profile sums to zero; cannot normalize the seed",
            ));
        }

        let unit_x = RowDVector::from_iterator(GRID_SIZE, x_profile.iter().map(|v| v / sum_x));
        let seed = RowDVector::from_iterator(GRID_SIZE, x_profile.iter().map(|v| v / GRID_SIZE as f64));
        let mut matrix = DMatrix::zeros(GRID_SIZE, GRID_SIZE);
        for r in 0..GRID_SIZE {
            matrix.set_row(r, &seed);
        }
        let initial_total = matrix.sum();

        Ok(Self {
            matrix,
            x_profile: x_profile.to_vec(),
            y_profile: y_profile.iter().rev().copied().collect(),
            unit_x,
            states: [RowState::Unprocessed; GRID_SIZE],
            iteration: 0,
            initial_total,
        })
    }

    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    pub fn row_state(&self, row: usize) -> RowState {
        self.states[row]
    }

    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn unprocessed_count(&self) -> usize {
        self.states.iter().filter(|s| **s == RowState::Unprocessed).count()
    }

    pub fn is_complete(&self) -> bool {
        self.unprocessed_count() == 0
    }

    pub fn row_sums(&self) -> Vec<f64> {
        (0..GRID_SIZE).map(|r| self.matrix.row(r).sum()).collect()
    }

    pub fn col_sums(&self) -> Vec<f64> {
        (0..GRID_SIZE).map(|c| self.matrix.column(c).sum()).collect()
    }

    /// Row sums minus the y target.
    pub fn diff_y(&self) -> Vec<f64> {
        self.row_sums().iter().zip(&self.y_profile).map(|(s, t)| s - t).collect()
    }

    /// Column sums minus the x target.
    pub fn diff_x(&self) -> Vec<f64> {
        self.col_sums().iter().zip(&self.x_profile).map(|(s, t)| s - t).collect()
    }

    pub fn snapshot(&self, label: SnapshotLabel) -> IterationSnapshot {
        IterationSnapshot {
            label,
            matrix: self.matrix.clone(),
            diff_x: self.diff_x(),
            diff_y: self.diff_y(),
        }
    }

    /// Settle exactly one row. Returns `None` once every row is processed.
    pub fn step(&mut self) -> Option<RowUpdate> {
        let open: Vec<usize> = (0..GRID_SIZE)
            .filter(|&r| self.states[r] == RowState::Unprocessed)
            .collect();
        let diff_y = self.diff_y();

        let update = match open.len() {
            0 => return None,
            1 => {
                let row = open[0];
                let diff = diff_y[row];
                self.settle(row, diff);
                let share = diff / (GRID_SIZE - 1) as f64;
                for r in (0..GRID_SIZE).filter(|&r| r != row) {
                    self.add_unit_x(r, share);
                }
                RowUpdate {
                    iteration: self.iteration + 1,
                    row,
                    diff,
                }
            }
            _ => {
                let row = select_row(&open, &diff_y);
                let diff = diff_y[row];
                self.settle(row, diff);
                let remaining: Vec<usize> = open.into_iter().filter(|&r| r != row).collect();
                let share = diff / remaining.len() as f64;
                for r in remaining {
                    self.add_unit_x(r, share);
                }
                RowUpdate {
                    iteration: self.iteration + 1,
                    row,
                    diff,
                }
            }
        };

        self.iteration = update.iteration;
        log::debug!(
            "iteration {}: settled row {} (y = {} mm), residual {:.6}",
            update.iteration,
            update.row,
            CENTER_INDEX as i64 - update.row as i64,
            update.diff
        );
        Some(update)
    }

    fn settle(&mut self, row: usize, diff: f64) {
        self.add_unit_x(row, -diff);
        self.states[row] = RowState::Processed;
    }

    /// `row += k * unit_x`; every update keeps the row proportional to x.
    fn add_unit_x(&mut self, row: usize, k: f64) {
        let mut view = self.matrix.row_mut(row);
        view += &self.unit_x * k;
    }

    /// Run to completion, clip negative cells, and report the result.
    ///
    /// The sink sees the current grid first, then one snapshot per settled
    /// row, then the clipped grid labelled `final`.
    pub fn run(mut self, sink: &mut dyn SnapshotSink) -> Result<Reconstruction, BeamError> {
        sink.record(&self.snapshot(SnapshotLabel::Iteration(self.iteration)))?;
        while let Some(update) = self.step() {
            sink.record(&self.snapshot(SnapshotLabel::Iteration(update.iteration)))?;
        }

        let pre_clamp_total = self.matrix.sum();
        let corrections = self.clip_negatives();
        if !corrections.is_empty() {
            log::warn!(
                "clipped {} negative cells (most negative {:.6})",
                corrections.len(),
                corrections.iter().map(|c| c.value).fold(0.0, f64::min)
            );
        }
        sink.record(&self.snapshot(SnapshotLabel::Final))?;

        let reconstruction = Reconstruction {
            row_sums: self.row_sums(),
            col_sums: self.col_sums(),
            diff_y: self.diff_y(),
            diff_x: self.diff_x(),
            iterations: self.iteration,
            initial_total: self.initial_total,
            pre_clamp_total,
            corrections,
            matrix: self.matrix,
            x_profile: self.x_profile,
            y_profile: self.y_profile,
        };
        log::info!(
            "reconstruction finished after {} iterations, max residual {:.6}",
            reconstruction.iterations,
            reconstruction.max_abs_residual()
        );
        Ok(reconstruction)
    }

    fn clip_negatives(&mut self) -> Vec<NegativeCorrection> {
        let mut corrections = Vec::new();
        for r in 0..GRID_SIZE {
            for c in 0..GRID_SIZE {
                let value = self.matrix[(r, c)];
                if value < 0.0 {
                    corrections.push(NegativeCorrection {
                        row: r,
                        col: c,
                        y: CENTER_INDEX as f64 - r as f64,
                        x: c as f64 - CENTER_INDEX as f64,
                        value,
                    });
                    self.matrix[(r, c)] = 0.0;
                }
            }
        }
        corrections
    }
}

/// Largest residual among `open` rows; near-ties go to the row farthest from
/// the centre, then to the lower index.
fn select_row(open: &[usize], diff_y: &[f64]) -> usize {
    let max = open
        .iter()
        .map(|&r| diff_y[r])
        .fold(f64::NEG_INFINITY, f64::max);

    let mut best = open[0];
    let mut best_distance = None;
    for &r in open {
        if (diff_y[r] - max).abs() >= TIE_TOLERANCE {
            continue;
        }
        let distance = r.abs_diff(CENTER_INDEX);
        if best_distance.is_none_or(|d| distance > d) {
            best = r;
            best_distance = Some(distance);
        }
    }
    best
}
