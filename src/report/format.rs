//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the numerical code stays free of presentation concerns
//! - output changes are localized (the tests below pin the important lines)

use std::path::PathBuf;

use crate::domain::{ReconstructConfig, SynthConfig};
use crate::report::{AxisDiagnostics, ExtractDiagnostics, ReconstructDiagnostics, SynthDiagnostics};

/// Format the `synth` summary (methods, per-axis diagnostics, surface stats).
pub fn format_synth_summary(diag: &SynthDiagnostics, config: &SynthConfig) -> String {
    let mut out = String::new();

    out.push_str("=== beamprof - surface synthesis ===\n");
    out.push_str(&format!(
        "Method: {} | combine: {} | edge: {}\n",
        diag.method.display_name(),
        diag.combine.display_name(),
        diag.edge.display_name()
    ));
    out.push_str(&format!(
        "Plane: {:.2} mm, step {:.3} mm ({n}x{n})\n",
        config.surface.plane_size,
        config.surface.step,
        n = diag.grid_size
    ));

    out.push_str("\nAxis diagnostics:\n");
    out.push_str(&format!(
        "  {:<4} {:>7} {:>10} {:>10} {:>9} {:>9} {:>8}\n",
        "axis", "samples", "peak (mm)", "offset", "FWHM", "scale", "R2"
    ));
    out.push_str(&format_axis_row("x", &diag.x));
    out.push_str(&format_axis_row("y", &diag.y));

    out.push_str("\nSurface:\n");
    out.push_str(&format!(
        "- peak {:.4} at (x={:.3}, y={:.3}) mm\n",
        diag.peak.value, diag.peak.x, diag.peak.y
    ));
    out.push_str(&format!("- total {:.4}\n", diag.total));
    out.push_str(&format!("- diagonal FWHM {:.4} mm\n", diag.diagonal_fwhm));
    out.push_str(&format!("- written to {}\n", config.output.display()));

    out
}

fn format_axis_row(name: &str, axis: &AxisDiagnostics) -> String {
    format!(
        "  {:<4} {:>7} {:>10.3} {:>10.3} {:>9.4} {:>9.5} {:>8.5}\n",
        name, axis.samples, axis.peak_position, axis.value_offset, axis.fwhm, axis.scale_factor, axis.r_squared
    )
}

/// Format the `reconstruct` summary.
pub fn format_reconstruct_summary(diag: &ReconstructDiagnostics, config: &ReconstructConfig) -> String {
    let mut out = String::new();

    out.push_str("=== beamprof - marginal-fit reconstruction ===\n");
    out.push_str(&format!(
        "Inputs: x centred at {:.3} mm | y centred at {:.3} mm\n",
        diag.x_center_offset, diag.y_center_offset
    ));
    out.push_str(&format!(
        "Iterations: {} | snapshots written: {}\n",
        diag.iterations, diag.snapshots
    ));
    out.push_str(&format!(
        "Mass: seed {:.4} | before clipping {:.4} | final {:.4}\n",
        diag.initial_total, diag.pre_clamp_total, diag.final_total
    ));
    out.push_str(&format!("Max |residual|: {:.6}\n", diag.max_abs_residual));
    if diag.negative_cells > 0 {
        out.push_str(&format!(
            "Clipped {} negative cells (most negative {:.6})\n",
            diag.negative_cells, diag.most_negative
        ));
    } else {
        out.push_str("No negative cells\n");
    }
    out.push_str(&format!(
        "Peak: {:.4} at (x={}, y={}) mm\n",
        diag.peak_value, diag.peak_x, diag.peak_y
    ));
    out.push_str(&format!("Output: {}\n", config.output_dir.display()));

    out
}

/// Format the `extract` summary.
pub fn format_extract_summary(diag: &ExtractDiagnostics, outputs: &[PathBuf]) -> String {
    let mut out = String::new();

    out.push_str("=== beamprof - cross-section extraction ===\n");
    out.push_str(&format!(
        "Map: {} points | thickness column '{}'\n",
        diag.map_points, diag.thickness_column
    ));
    out.push_str(&format!(
        "x cut: {} points, max removal {:.4}\n",
        diag.x_points, diag.x_max_removal
    ));
    out.push_str(&format!(
        "y cut: {} points, max removal {:.4}\n",
        diag.y_points, diag.y_max_removal
    ));
    out.push_str(&format_outputs(outputs));

    out
}

/// One `wrote <path>` line per file.
pub fn format_outputs(outputs: &[PathBuf]) -> String {
    outputs
        .iter()
        .map(|p| format!("wrote {}\n", p.display()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CombineMethod, EdgeMethod, InterpConfig, InterpMethod, SurfaceConfig};
    use crate::surface::SurfacePeak;

    fn axis(fwhm: f64) -> AxisDiagnostics {
        AxisDiagnostics {
            samples: 121,
            peak_position: 0.5,
            value_offset: -15.0,
            fwhm,
            scale_factor: 1.0,
            r_squared: 0.99991,
        }
    }

    #[test]
    fn synth_summary_lists_methods_and_axes() {
        let config = SynthConfig {
            x_path: PathBuf::from("x.csv"),
            y_path: PathBuf::from("y.csv"),
            output: PathBuf::from("surface.csv"),
            interp: InterpConfig::default(),
            surface: SurfaceConfig::default(),
            plot: false,
            plot_width: 80,
            plot_height: 20,
            manifest: None,
        };
        let diag = SynthDiagnostics {
            method: InterpMethod::Pchip,
            combine: CombineMethod::Geometric,
            edge: EdgeMethod::ZShift,
            grid_size: 31,
            x: axis(8.25),
            y: axis(6.5),
            peak: SurfacePeak {
                x: 0.0,
                y: 0.0,
                value: 97.5,
            },
            total: 1234.5,
            diagonal_fwhm: 5.1,
        };
        let txt = format_synth_summary(&diag, &config);
        assert!(txt.starts_with("=== beamprof - surface synthesis ===\n"));
        assert!(txt.contains("Method: PCHIP (shape-preserving) | combine: geometric mean | edge: z-shift\n"));
        assert!(txt.contains("(31x31)"));
        assert!(txt.contains("8.2500"));
        assert!(txt.contains("- peak 97.5000 at (x=0.000, y=0.000) mm\n"));
        assert!(txt.contains("- written to surface.csv\n"));
    }

    #[test]
    fn reconstruct_summary_reports_clipping() {
        let config = ReconstructConfig {
            x_path: PathBuf::from("x.csv"),
            y_path: PathBuf::from("y.csv"),
            output_dir: PathBuf::from("out"),
            snapshots: true,
            plot: false,
            plot_width: 80,
            plot_height: 20,
            manifest: None,
        };
        let mut diag = ReconstructDiagnostics {
            iterations: 31,
            snapshots: 33,
            x_center_offset: 0.0,
            y_center_offset: 0.0,
            initial_total: 31.0,
            pre_clamp_total: 31.0,
            final_total: 31.0,
            max_abs_residual: 0.0,
            negative_cells: 0,
            most_negative: 0.0,
            peak_x: 0.0,
            peak_y: 0.0,
            peak_value: 1.0,
        };
        let txt = format_reconstruct_summary(&diag, &config);
        assert!(txt.contains("Iterations: 31 | snapshots written: 33\n"));
        assert!(txt.contains("No negative cells\n"));
        assert!(txt.contains("Peak: 1.0000 at (x=0, y=0) mm\n"));

        diag.negative_cells = 31;
        diag.most_negative = -0.16129;
        let txt = format_reconstruct_summary(&diag, &config);
        assert!(txt.contains("Clipped 31 negative cells (most negative -0.161290)\n"));
    }

    #[test]
    fn outputs_are_listed_in_order() {
        let txt = format_outputs(&[PathBuf::from("a.csv"), PathBuf::from("b.csv")]);
        assert_eq!(txt, "wrote a.csv\nwrote b.csv\n");
    }
}
