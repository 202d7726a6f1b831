//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads an optional `.env` and initialises logging
//! - parses CLI arguments into config values
//! - runs the requested workflow
//! - prints reports/plots
//! - writes the optional run manifest

use clap::Parser;
use env_logger::Env;

use crate::cli::{Cli, Command, ExtractArgs, ReconstructArgs, SimulateArgs, SynthArgs};
use crate::domain::{
    ExtractConfig, FwhmConfig, InterpConfig, ReconstructConfig, SampleConfig, SurfaceConfig, SynthConfig,
};
use crate::error::BeamError;
use crate::io::{RunManifest, write_manifest};
use crate::report::{ExtractDiagnostics, ReconstructDiagnostics, SynthDiagnostics};

pub mod pipeline;

/// Entry point for the `beamprof` binary.
pub fn run() -> Result<(), BeamError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Synth(args) => handle_synth(&args),
        Command::Reconstruct(args) => handle_reconstruct(&args),
        Command::Extract(args) => handle_extract(&args),
        Command::Simulate(args) => handle_simulate(&args),
    }
}

fn init_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    if verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    // A second initialisation (tests, embedding) keeps the first logger.
    let _ = builder.try_init();
}

fn handle_synth(args: &SynthArgs) -> Result<(), BeamError> {
    let config = synth_config_from_args(args);
    let run = pipeline::run_synth(&config)?;
    let diagnostics = SynthDiagnostics::from_run(&run, &config);

    println!("{}", crate::report::format_synth_summary(&diagnostics, &config));

    if config.plot {
        for (axis, fit) in [("x", &run.x), ("y", &run.y)] {
            println!("{axis} cross-section (o measured, - width-corrected interpolant)");
            let plot =
                crate::plot::render_profile_plot(&fit.profile, &fit.interp, config.plot_width, config.plot_height);
            println!("{plot}");
        }
    }

    if let Some(path) = &config.manifest {
        let manifest = RunManifest::new("synth", &config, run.outputs.clone(), &diagnostics);
        write_manifest(path, &manifest)?;
    }
    Ok(())
}

fn handle_reconstruct(args: &ReconstructArgs) -> Result<(), BeamError> {
    let config = reconstruct_config_from_args(args);
    let run = pipeline::reconstruct_from_files(&config)?;
    let diagnostics = ReconstructDiagnostics::from_run(&run);

    println!("{}", crate::report::format_reconstruct_summary(&diagnostics, &config));

    if config.plot {
        let r = &run.reconstruction;
        println!("x marginal (o target, - column sums)");
        let plot = crate::plot::render_marginal_plot(
            &run.x.positions,
            &run.x.values,
            &r.col_sums,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");

        // Row sums run from +15 mm down; the target is ascending.
        let row_sums: Vec<f64> = r.row_sums.iter().rev().copied().collect();
        println!("y marginal (o target, - row sums)");
        let plot = crate::plot::render_marginal_plot(
            &run.y.positions,
            &run.y.values,
            &row_sums,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    if let Some(path) = &config.manifest {
        let manifest = RunManifest::new("reconstruct", &config, run.outputs.clone(), &diagnostics);
        write_manifest(path, &manifest)?;
    }
    Ok(())
}

fn handle_extract(args: &ExtractArgs) -> Result<(), BeamError> {
    let config = extract_config_from_args(args);
    let out = crate::extract::extract_cross_sections(&config)?;
    let diagnostics = ExtractDiagnostics::from_outputs(&out);
    let outputs = vec![out.trimming_path.clone(), out.x_path.clone(), out.y_path.clone()];

    println!("{}", crate::report::format_extract_summary(&diagnostics, &outputs));

    if let Some(path) = &args.manifest {
        let manifest = RunManifest::new("extract", &config, outputs, &diagnostics);
        write_manifest(path, &manifest)?;
    }
    Ok(())
}

fn handle_simulate(args: &SimulateArgs) -> Result<(), BeamError> {
    let config = sample_config_from_args(args);
    let (x_path, y_path) = crate::data::write_sample_profiles(&config)?;
    let outputs = vec![x_path, y_path];

    print!("{}", crate::report::format_outputs(&outputs));

    if let Some(path) = &args.manifest {
        let manifest = RunManifest::new("simulate", &config, outputs, ());
        write_manifest(path, &manifest)?;
    }
    Ok(())
}

pub fn synth_config_from_args(args: &SynthArgs) -> SynthConfig {
    SynthConfig {
        x_path: args.x_path.clone(),
        y_path: args.y_path.clone(),
        output: args.output.clone(),
        interp: InterpConfig {
            method: args.method,
            anchor_offset: args.anchor_offset,
            fwhm: FwhmConfig {
                dense_points: args.dense_points,
                min_peak: args.min_peak,
            },
        },
        surface: SurfaceConfig {
            plane_size: args.plane_size,
            step: args.step,
            combine: args.combine,
            edge: args.edge,
            falloff_k: args.falloff_k,
        },
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        manifest: args.manifest.clone(),
    }
}

pub fn reconstruct_config_from_args(args: &ReconstructArgs) -> ReconstructConfig {
    ReconstructConfig {
        x_path: args.x_path.clone(),
        y_path: args.y_path.clone(),
        output_dir: args.output_dir.clone(),
        snapshots: !args.no_snapshots,
        plot: args.plot,
        plot_width: args.width,
        plot_height: args.height,
        manifest: args.manifest.clone(),
    }
}

pub fn extract_config_from_args(args: &ExtractArgs) -> ExtractConfig {
    ExtractConfig {
        cut: args.cut,
        half_range: args.half_range,
        expected_points: args.points,
        thickness_column: args.thickness_column.clone(),
        ..ExtractConfig::with_paths(args.initial.clone(), args.after.clone(), args.output_dir.clone())
    }
}

pub fn sample_config_from_args(args: &SimulateArgs) -> SampleConfig {
    SampleConfig {
        output_dir: args.output_dir.clone(),
        fwhm_x: args.fwhm_x,
        fwhm_y: args.fwhm_y,
        amplitude: args.amplitude,
        center_x: args.center_x,
        center_y: args.center_y,
        span: args.span,
        step: args.step,
        noise: args.noise,
        seed: args.seed,
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn no_plot_wins_over_default_plot() {
        let cli = Cli::parse_from(["beamprof", "synth", "--x", "a.csv", "--y", "b.csv", "--no-plot"]);
        let Command::Synth(args) = cli.command else {
            panic!("expected synth");
        };
        let config = synth_config_from_args(&args);
        assert!(!config.plot);
        assert_eq!(config.interp, InterpConfig::default());
        assert_eq!(config.surface, SurfaceConfig::default());
    }

    #[test]
    fn extract_args_override_defaults() {
        let cli = Cli::parse_from([
            "beamprof", "extract", "--initial", "i.csv", "--after", "a.csv", "--cut", "35", "--points", "61",
            "--thickness-column", "THK",
        ]);
        let Command::Extract(args) = cli.command else {
            panic!("expected extract");
        };
        let config = extract_config_from_args(&args);
        assert_eq!(config.cut, 35.0);
        assert_eq!(config.half_range, 15.0);
        assert_eq!(config.expected_points, 61);
        assert_eq!(config.thickness_column.as_deref(), Some("THK"));
        assert_eq!(config.output_dir, PathBuf::from("Data_processor"));
    }

    #[test]
    fn reconstruct_snapshots_default_on() {
        let cli = Cli::parse_from(["beamprof", "reconstruct", "--x", "a.csv", "--y", "b.csv"]);
        let Command::Reconstruct(args) = cli.command else {
            panic!("expected reconstruct");
        };
        let config = reconstruct_config_from_args(&args);
        assert!(config.snapshots);
        assert!(!config.plot);
    }

    #[test]
    fn simulate_manifest_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("run.json");
        let out = dir.path().join("samples");
        let cli = Cli::parse_from([
            "beamprof",
            "simulate",
            "--output-dir",
            out.to_str().unwrap(),
            "--manifest",
            manifest.to_str().unwrap(),
        ]);
        let Command::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        handle_simulate(&args).unwrap();

        let stored = crate::io::read_manifest(&manifest).unwrap();
        assert_eq!(stored.command, "simulate");
        assert_eq!(stored.outputs.len(), 2);
        assert_eq!(stored.config["seed"], 42);
        assert!(stored.outputs.iter().all(|p| p.exists()));
    }
}
