//! Command-line parsing for the beam profiler.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! numerical code: every subcommand has an args struct here, and `app`
//! converts it into the plain config value the pipeline consumes.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{CombineMethod, EdgeMethod, InterpMethod};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "beamprof",
    version,
    about = "Reconstruct 2-D beam intensity maps from orthogonal cross-sections"
)]
pub struct Cli {
    /// Log at debug level (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Synthesize a smooth surface from two width-corrected axis interpolants.
    Synth(SynthArgs),
    /// Rebuild the 31x31 grid whose marginals match the two cross-sections.
    Reconstruct(ReconstructArgs),
    /// Cut the two cross-sections out of before/after thickness maps.
    Extract(ExtractArgs),
    /// Write a pair of seeded Gaussian cross-sections.
    Simulate(SimulateArgs),
}

/// Options for `synth`.
#[derive(Debug, Parser, Clone)]
pub struct SynthArgs {
    /// Cross-section measured along x (headerless `position,value` CSV).
    #[arg(long = "x", value_name = "CSV")]
    pub x_path: PathBuf,

    /// Cross-section measured along y.
    #[arg(long = "y", value_name = "CSV")]
    pub y_path: PathBuf,

    /// Surface CSV to write.
    #[arg(short, long, default_value = "beam_surface.csv")]
    pub output: PathBuf,

    /// Interpolation method for both axes.
    #[arg(long, value_enum, default_value_t = InterpMethod::Cubic)]
    pub method: InterpMethod,

    /// How the two axis intensities are merged.
    #[arg(long, value_enum, default_value_t = CombineMethod::Geometric)]
    pub combine: CombineMethod,

    /// Edge treatment of the combined surface.
    #[arg(long, value_enum, default_value_t = EdgeMethod::Exponential)]
    pub edge: EdgeMethod,

    /// Full edge length of the square plane (mm).
    #[arg(long, default_value_t = 30.0)]
    pub plane_size: f64,

    /// Grid spacing (mm).
    #[arg(long, default_value_t = 1.0)]
    pub step: f64,

    /// Decay constant of the radial edge falloff.
    #[arg(long, default_value_t = 3.0)]
    pub falloff_k: f64,

    /// Distance of the zero anchors beyond each end of the data (mm).
    #[arg(long, default_value_t = 0.1)]
    pub anchor_offset: f64,

    /// Dense resampling size used for FWHM measurement.
    #[arg(long, default_value_t = 1000)]
    pub dense_points: usize,

    /// Peaks below this height report an FWHM of 0.
    #[arg(long, default_value_t = 50.0)]
    pub min_peak: f64,

    /// Render ASCII plots of both axes (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Write a JSON run manifest.
    #[arg(long, value_name = "JSON")]
    pub manifest: Option<PathBuf>,
}

/// Options for `reconstruct`.
#[derive(Debug, Parser, Clone)]
pub struct ReconstructArgs {
    /// Cross-section measured along x.
    #[arg(long = "x", value_name = "CSV")]
    pub x_path: PathBuf,

    /// Cross-section measured along y.
    #[arg(long = "y", value_name = "CSV")]
    pub y_path: PathBuf,

    /// Directory for the reconstructed grid and its diagnostics.
    #[arg(short, long, default_value = "beam_reconstruction")]
    pub output_dir: PathBuf,

    /// Skip the per-iteration snapshot CSVs.
    #[arg(long)]
    pub no_snapshots: bool,

    /// Plot target vs reconstructed marginals.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Write a JSON run manifest.
    #[arg(long, value_name = "JSON")]
    pub manifest: Option<PathBuf>,
}

/// Options for `extract`.
#[derive(Debug, Parser, Clone)]
pub struct ExtractArgs {
    /// Thickness map measured before trimming.
    #[arg(long, value_name = "CSV")]
    pub initial: PathBuf,

    /// Thickness map measured after trimming.
    #[arg(long, value_name = "CSV")]
    pub after: PathBuf,

    /// Directory for the removal table and the two cross-sections.
    #[arg(short, long, default_value = "Data_processor")]
    pub output_dir: PathBuf,

    /// Coordinate of the perpendicular axis each cut is taken at (mm).
    #[arg(long, default_value_t = 40.0)]
    pub cut: f64,

    /// Cuts span `[-half_range, half_range]` (mm).
    #[arg(long, default_value_t = 15.0)]
    pub half_range: f64,

    /// Exact number of samples each cut must contain.
    #[arg(long, default_value_t = 121)]
    pub points: usize,

    /// Thickness column header, if not one of the built-in names.
    #[arg(long)]
    pub thickness_column: Option<String>,

    /// Write a JSON run manifest.
    #[arg(long, value_name = "JSON")]
    pub manifest: Option<PathBuf>,
}

/// Options for `simulate`.
#[derive(Debug, Parser, Clone)]
pub struct SimulateArgs {
    /// Directory for the two sample files.
    #[arg(short, long, default_value = "samples")]
    pub output_dir: PathBuf,

    /// FWHM of the x profile (mm).
    #[arg(long, default_value_t = 8.0)]
    pub fwhm_x: f64,

    /// FWHM of the y profile (mm).
    #[arg(long, default_value_t = 6.0)]
    pub fwhm_y: f64,

    /// Peak removal depth.
    #[arg(long, default_value_t = 100.0)]
    pub amplitude: f64,

    /// Beam centre along the x scan (mm).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub center_x: f64,

    /// Beam centre along the y scan (mm).
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub center_y: f64,

    /// Scan length (mm).
    #[arg(long, default_value_t = 30.0)]
    pub span: f64,

    /// Sample pitch (mm).
    #[arg(long, default_value_t = 0.25)]
    pub step: f64,

    /// Standard deviation of additive Gaussian noise.
    #[arg(long, default_value_t = 0.0)]
    pub noise: f64,

    /// Random seed for the noise.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Write a JSON run manifest.
    #[arg(long, value_name = "JSON")]
    pub manifest: Option<PathBuf>,
}
