//! CSV exports.
//!
//! Every writer creates (or truncates) exactly one file and fails with the
//! path on the first I/O error.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use nalgebra::DMatrix;

use crate::error::BeamError;
use crate::io::ingest::ThicknessMap;
use crate::profile::CenteredSamples;
use crate::reconstruct::{CENTER_INDEX, IterationSnapshot, NegativeCorrection, SnapshotSink};
use crate::surface::SurfaceGrid;

/// Sub-directory for per-iteration diagnostics of a reconstruction run.
pub const ITERATION_DIR: &str = "beamprofile_iterations";

fn create(path: &Path) -> Result<BufWriter<File>, BeamError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| BeamError::io(parent, e))?;
    }
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| BeamError::io(path, e))
}

fn finish(mut w: BufWriter<File>, path: &Path) -> Result<(), BeamError> {
    w.flush().map_err(|e| BeamError::io(path, e))
}

/// Round to 4 decimals and floor at 0, never printing `-0.0000`.
fn surface_cell(v: f64) -> String {
    let r = (v * 1e4).round() / 1e4;
    let r = if r > 0.0 { r } else { 0.0 };
    format!("{r:.4}")
}

/// Write a synthesized surface.
///
/// Header `y\x` followed by the x labels; one row per y from the top of the
/// plane (+L) down to −L, each row holding the values at that y. Rows are
/// emitted in descending order so labels and data stay in step: the `+L` line
/// holds `values.row(n - 1)`, not the ascending first row.
pub fn write_surface_csv(path: &Path, grid: &SurfaceGrid) -> Result<(), BeamError> {
    let mut w = create(path)?;
    let io = |e| BeamError::io(path, e);

    let labels: Vec<String> = grid.coords.iter().map(|x| format!("{x:.4}")).collect();
    writeln!(w, "y\\x,{}", labels.join(",")).map_err(io)?;

    let n = grid.size();
    for i in (0..n).rev() {
        let cells: Vec<String> = grid.values.row(i).iter().map(|v| surface_cell(*v)).collect();
        writeln!(w, "{:.4},{}", grid.coords[i], cells.join(",")).map_err(io)?;
    }
    finish(w, path)
}

/// Write a bare matrix, one row per line, no header.
pub fn write_matrix_csv(path: &Path, matrix: &DMatrix<f64>) -> Result<(), BeamError> {
    let mut w = create(path)?;
    for row in matrix.row_iter() {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        writeln!(w, "{}", cells.join(",")).map_err(|e| BeamError::io(path, e))?;
    }
    finish(w, path)
}

/// Write one reconstruction snapshot with its residual row and column.
///
/// The extra column (`X-Conv Diff`) holds row-sum residuals; the extra row
/// (`Y-Conv Diff`) holds column-sum residuals.
pub fn write_snapshot_csv(path: &Path, snapshot: &IterationSnapshot) -> Result<(), BeamError> {
    let mut w = create(path)?;
    let io = |e| BeamError::io(path, e);
    let (rows, cols) = snapshot.matrix.shape();

    let header: Vec<String> = (0..cols)
        .map(|c| format!("x={}mm", c as i64 - CENTER_INDEX as i64))
        .collect();
    writeln!(w, "Position,{},X-Conv Diff", header.join(",")).map_err(io)?;

    for r in 0..rows {
        let cells: Vec<String> = snapshot.matrix.row(r).iter().map(|v| v.to_string()).collect();
        writeln!(
            w,
            "y={}mm,{},{}",
            CENTER_INDEX as i64 - r as i64,
            cells.join(","),
            snapshot.diff_y[r]
        )
        .map_err(io)?;
    }

    let diffs: Vec<String> = snapshot.diff_x.iter().map(|v| v.to_string()).collect();
    writeln!(w, "Y-Conv Diff,{},0", diffs.join(",")).map_err(io)?;
    finish(w, path)
}

/// Persists every snapshot as `iteration_<label>_beamprofile.csv` in `dir`.
#[derive(Debug, Clone)]
pub struct CsvSnapshotSink {
    dir: PathBuf,
    written: Vec<PathBuf>,
}

impl CsvSnapshotSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            written: Vec::new(),
        }
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }

    pub fn into_written(self) -> Vec<PathBuf> {
        self.written
    }
}

impl SnapshotSink for CsvSnapshotSink {
    fn record(&mut self, snapshot: &IterationSnapshot) -> Result<(), BeamError> {
        let path = self
            .dir
            .join(format!("iteration_{}_beamprofile.csv", snapshot.label));
        write_snapshot_csv(&path, snapshot)?;
        self.written.push(path);
        Ok(())
    }
}

/// Write a resampled profile with a `Position (mm),Etching Depth` header.
pub fn write_shifted_profile(path: &Path, samples: &CenteredSamples) -> Result<(), BeamError> {
    let mut w = create(path)?;
    let io = |e| BeamError::io(path, e);
    writeln!(w, "Position (mm),Etching Depth").map_err(io)?;
    for (p, v) in samples.positions.iter().zip(&samples.values) {
        writeln!(w, "{p},{v}").map_err(io)?;
    }
    finish(w, path)
}

/// Write both resampled profiles into one table.
///
/// The y values are listed in row order (reversed) so they line up with the
/// reconstruction grid.
pub fn write_initial_profiles(path: &Path, x: &CenteredSamples, y: &CenteredSamples) -> Result<(), BeamError> {
    let mut w = create(path)?;
    let io = |e| BeamError::io(path, e);
    writeln!(w, "Position (mm),Etching Depth,Profile Type").map_err(io)?;
    for (p, v) in x.positions.iter().zip(&x.values) {
        writeln!(w, "{p},{v},x_crosssect").map_err(io)?;
    }
    for (p, v) in y.positions.iter().zip(y.values.iter().rev()) {
        writeln!(w, "{p},{v},y_crosssect").map_err(io)?;
    }
    finish(w, path)
}

pub fn write_negative_corrections(path: &Path, corrections: &[NegativeCorrection]) -> Result<(), BeamError> {
    let mut w = create(path)?;
    let io = |e| BeamError::io(path, e);
    writeln!(w, "Position Y,Position X,Original Value").map_err(io)?;
    for c in corrections {
        writeln!(w, "{},{},{}", c.y, c.x, c.value).map_err(io)?;
    }
    finish(w, path)
}

/// Write headerless `(position, value)` pairs, the cross-section input format.
pub fn write_profile_pairs(path: &Path, coords: &[f64], values: &[f64]) -> Result<(), BeamError> {
    let mut w = create(path)?;
    let io = |e| BeamError::io(path, e);
    for (c, v) in coords.iter().zip(values) {
        writeln!(w, "{c},{v}").map_err(io)?;
    }
    finish(w, path)
}

/// Write the initial map with an appended `Trimmed_Thickness` column.
pub fn write_trimming_csv(path: &Path, map: &ThicknessMap, trimmed: &[f64]) -> Result<(), BeamError> {
    if trimmed.len() != map.len() {
        return Err(BeamError::invalid(format!(
            "{} removal values for {} map rows",
            trimmed.len(),
            map.len()
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| BeamError::io(parent, e))?;
    }
    let mut writer = csv::Writer::from_path(path).map_err(|e| BeamError::csv(path, e))?;

    let mut header = map.headers.clone();
    header.push_field("Trimmed_Thickness");
    writer.write_record(&header).map_err(|e| BeamError::csv(path, e))?;

    for (record, t) in map.records.iter().zip(trimmed) {
        let mut row = record.clone();
        row.push_field(&t.to_string());
        writer.write_record(&row).map_err(|e| BeamError::csv(path, e))?;
    }
    writer.flush().map_err(|e| BeamError::io(path, e))
}
