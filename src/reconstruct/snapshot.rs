//! Diagnostic snapshots emitted while the reconstruction runs.

use std::fmt;

use nalgebra::DMatrix;

use crate::error::BeamError;

/// Which point of the run a snapshot captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotLabel {
    /// State after `n` row updates (0 is the seeded grid).
    Iteration(usize),
    /// State after negative cells were clipped.
    Final,
}

impl fmt::Display for SnapshotLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotLabel::Iteration(n) => write!(f, "{n:03}"),
            SnapshotLabel::Final => f.write_str("final"),
        }
    }
}

/// A copy of the grid plus its residuals against both target profiles.
#[derive(Debug, Clone, PartialEq)]
pub struct IterationSnapshot {
    pub label: SnapshotLabel,
    pub matrix: DMatrix<f64>,
    /// Column sums minus the x profile.
    pub diff_x: Vec<f64>,
    /// Row sums minus the (row-ordered) y profile.
    pub diff_y: Vec<f64>,
}

/// Receives every snapshot the reconstructor emits.
pub trait SnapshotSink {
    fn record(&mut self, snapshot: &IterationSnapshot) -> Result<(), BeamError>;
}

/// Discards snapshots.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn record(&mut self, _snapshot: &IterationSnapshot) -> Result<(), BeamError> {
        Ok(())
    }
}

/// Keeps every snapshot in memory.
impl SnapshotSink for Vec<IterationSnapshot> {
    fn record(&mut self, snapshot: &IterationSnapshot) -> Result<(), BeamError> {
        self.push(snapshot.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_render_as_file_stems() {
        assert_eq!(SnapshotLabel::Iteration(0).to_string(), "000");
        assert_eq!(SnapshotLabel::Iteration(31).to_string(), "031");
        assert_eq!(SnapshotLabel::Final.to_string(), "final");
    }
}
