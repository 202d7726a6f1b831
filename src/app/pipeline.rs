//! Shared workflows behind the `synth` and `reconstruct` subcommands.
//!
//! Keeping this in one place avoids mixing file handling with presentation:
//! - synth: load -> prepare -> width-corrected interpolants -> surface -> CSV
//! - reconstruct: load -> centred 31-point resampling -> marginal fit -> CSVs
//!
//! `app` then only prints reports, plots, and writes the optional manifest.

use std::path::PathBuf;

use crate::domain::{InterpConfig, PreparedProfile, RawProfile, ReconstructConfig, SynthConfig};
use crate::error::BeamError;
use crate::interp::{AxisInterpolator, build_scaled};
use crate::io::{
    CsvSnapshotSink, ITERATION_DIR, load_raw_profile, write_initial_profiles, write_matrix_csv,
    write_negative_corrections, write_shifted_profile, write_surface_csv,
};
use crate::profile::{CenteredSamples, fwhm_of_samples, prepare, resample_to_grid};
use crate::reconstruct::{MarginalFitReconstructor, NullSink, Reconstruction};
use crate::surface::{SurfaceGrid, diagonal_profile, synthesize};

pub const RECONSTRUCTED_FILE: &str = "reconstructed_beamprofile.csv";
pub const SHIFTED_X_FILE: &str = "shifted_x_crosssection.csv";
pub const SHIFTED_Y_FILE: &str = "shifted_y_crosssection.csv";
pub const INITIAL_PROFILES_FILE: &str = "initial_shifted_profiles.csv";
pub const NEGATIVE_CORRECTIONS_FILE: &str = "negative_corrections.csv";

/// One prepared axis and its width-corrected interpolant.
#[derive(Debug, Clone)]
pub struct AxisFit {
    pub raw: RawProfile,
    pub profile: PreparedProfile,
    pub interp: AxisInterpolator,
    /// Fit of the scaled interpolant against the prepared samples.
    pub r_squared: f64,
}

/// All computed outputs of a single `synth` run.
#[derive(Debug, Clone)]
pub struct SynthOutput {
    pub x: AxisFit,
    pub y: AxisFit,
    pub grid: SurfaceGrid,
    /// Combined intensity along `x = y`, before edge treatment.
    pub diagonal: Vec<(f64, f64)>,
    pub diagonal_fwhm: f64,
    pub outputs: Vec<PathBuf>,
}

/// All computed outputs of a single `reconstruct` run.
#[derive(Debug, Clone)]
pub struct ReconstructOutput {
    pub x: CenteredSamples,
    pub y: CenteredSamples,
    pub reconstruction: Reconstruction,
    pub snapshot_count: usize,
    pub outputs: Vec<PathBuf>,
}

/// Prepare one cross-section and build its width-corrected interpolant.
pub fn fit_axis(raw: RawProfile, config: &InterpConfig) -> Result<AxisFit, BeamError> {
    let profile = prepare(&raw, &config.fwhm)?;
    let interp = build_scaled(&profile, config)?;
    let r_squared = interp.r_squared_against(&profile);
    log::debug!(
        "axis fit: fwhm={:.4} scale={:.6} r2={:.6}",
        profile.fwhm,
        interp.scale_factor(),
        r_squared
    );
    Ok(AxisFit {
        raw,
        profile,
        interp,
        r_squared,
    })
}

/// Execute the full synthesis workflow and write the surface CSV.
pub fn run_synth(config: &SynthConfig) -> Result<SynthOutput, BeamError> {
    // 1) Load and fit both axes.
    let x = fit_axis(load_raw_profile(&config.x_path)?, &config.interp)?;
    let y = fit_axis(load_raw_profile(&config.y_path)?, &config.interp)?;

    // 2) Combine into the surface.
    let grid = synthesize(&x.interp, &y.interp, &config.surface)?;

    // 3) Diagonal diagnostic.
    let diagonal = diagonal_profile(&x.interp, &y.interp, &config.surface)?;
    let (ts, vs): (Vec<f64>, Vec<f64>) = diagonal.iter().copied().unzip();
    let diagonal_fwhm = fwhm_of_samples(&ts, &vs, config.interp.fwhm.min_peak);

    write_surface_csv(&config.output, &grid)?;
    log::info!("wrote surface to {}", config.output.display());

    Ok(SynthOutput {
        x,
        y,
        grid,
        diagonal,
        diagonal_fwhm,
        outputs: vec![config.output.clone()],
    })
}

/// Execute the reconstruction workflow and write every result file.
///
/// Layout under `output_dir`:
/// - `reconstructed_beamprofile.csv`
/// - `beamprofile_iterations/` with the resampled inputs, the optional
///   per-iteration snapshots and, if any cell was clipped,
///   `negative_corrections.csv`
pub fn reconstruct_from_files(config: &ReconstructConfig) -> Result<ReconstructOutput, BeamError> {
    let iteration_dir = config.output_dir.join(ITERATION_DIR);
    let mut outputs = Vec::new();

    // 1) Load and resample onto the fixed grid.
    let x = resample_to_grid(&load_raw_profile(&config.x_path)?);
    let y = resample_to_grid(&load_raw_profile(&config.y_path)?);
    log::info!(
        "resampled inputs (centre offsets x={:.3} mm, y={:.3} mm)",
        x.center_offset,
        y.center_offset
    );

    // Validate before anything is written.
    let reconstructor = MarginalFitReconstructor::new(&x.values, &y.values)?;

    for (name, samples) in [(SHIFTED_X_FILE, &x), (SHIFTED_Y_FILE, &y)] {
        let path = iteration_dir.join(name);
        write_shifted_profile(&path, samples)?;
        outputs.push(path);
    }
    let initial = iteration_dir.join(INITIAL_PROFILES_FILE);
    write_initial_profiles(&initial, &x, &y)?;
    outputs.push(initial);

    // 2) Fit the marginals.
    let (reconstruction, snapshots) = if config.snapshots {
        let mut sink = CsvSnapshotSink::new(&iteration_dir);
        let reconstruction = reconstructor.run(&mut sink)?;
        (reconstruction, sink.into_written())
    } else {
        (reconstructor.run(&mut NullSink)?, Vec::new())
    };
    let snapshot_count = snapshots.len();
    outputs.extend(snapshots);

    // 3) Results.
    let grid_path = config.output_dir.join(RECONSTRUCTED_FILE);
    write_matrix_csv(&grid_path, &reconstruction.matrix)?;
    outputs.push(grid_path);

    if !reconstruction.corrections.is_empty() {
        let path = iteration_dir.join(NEGATIVE_CORRECTIONS_FILE);
        write_negative_corrections(&path, &reconstruction.corrections)?;
        outputs.push(path);
    }

    log::info!(
        "wrote reconstruction to {} ({} files)",
        config.output_dir.display(),
        outputs.len()
    );
    Ok(ReconstructOutput {
        x,
        y,
        reconstruction,
        snapshot_count,
        outputs,
    })
}
