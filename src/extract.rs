//! Cross-section extraction from before/after thickness maps.
//!
//! The removal depth is `initial - after` per map point. Two orthogonal cuts
//! through the trimmed spot are pulled out of it: the x cut runs along `X` at
//! `Y == cut`, the y cut along `Y` at `X == cut`. Each cut must contain exactly
//! the expected number of samples and is baseline-flattened before it is
//! written in the headerless cross-section format.

use std::path::PathBuf;

use serde::Serialize;

use crate::domain::ExtractConfig;
use crate::error::BeamError;
use crate::io::{ThicknessMap, load_thickness_map, write_profile_pairs, write_trimming_csv};
use crate::profile::flatten_baseline;

pub const TRIMMING_FILE: &str = "trimming_thk.csv";
pub const X_SECTION_FILE: &str = "x_crosssection_trimmed_amount_profile_of_Movement_on_Y-axis.csv";
pub const Y_SECTION_FILE: &str = "y_crosssection_trimmed_amount_profile_of_Movement_on_X-axis.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionAxis {
    X,
    Y,
}

/// One baseline-flattened cut.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrossSection {
    pub axis: SectionAxis,
    pub coords: Vec<f64>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct ExtractOutputs {
    pub trimming_path: PathBuf,
    pub x_path: PathBuf,
    pub y_path: PathBuf,
    pub x: CrossSection,
    pub y: CrossSection,
    pub map_points: usize,
    /// Header of the thickness column that was read.
    pub thickness_column: String,
}

/// Removal depth per map point.
pub fn removal_depth(initial: &ThicknessMap, after: &ThicknessMap) -> Result<Vec<f64>, BeamError> {
    if initial.len() != after.len() {
        return Err(BeamError::invalid(format!(
            "initial map has {} rows but after map has {}",
            initial.len(),
            after.len()
        )));
    }
    Ok(initial
        .thickness
        .iter()
        .zip(&after.thickness)
        .map(|(a, b)| a - b)
        .collect())
}

/// Pull one cut out of the map and flatten its baseline.
pub fn extract_section(
    map: &ThicknessMap,
    trimmed: &[f64],
    axis: SectionAxis,
    config: &ExtractConfig,
) -> Result<CrossSection, BeamError> {
    let (along, across) = match axis {
        SectionAxis::X => (&map.x, &map.y),
        SectionAxis::Y => (&map.y, &map.x),
    };

    let mut points: Vec<(f64, f64)> = along
        .iter()
        .zip(across)
        .zip(trimmed)
        .filter(|((a, c), _)| **c == config.cut && a.abs() <= config.half_range)
        .map(|((a, _), t)| (*a, *t))
        .collect();

    if points.len() != config.expected_points {
        return Err(BeamError::invalid(format!(
            "{axis:?} cross-section should have {} points, found {}",
            config.expected_points,
            points.len()
        )));
    }
    points.sort_by(|p, q| p.0.total_cmp(&q.0));

    let (coords, raw): (Vec<f64>, Vec<f64>) = points.into_iter().unzip();
    let values = flatten_baseline(&coords, &raw)?;
    Ok(CrossSection { axis, coords, values })
}

/// Load both maps, write the removal table and the two flattened cuts.
pub fn extract_cross_sections(config: &ExtractConfig) -> Result<ExtractOutputs, BeamError> {
    let preferred = config.thickness_column.as_deref();
    let initial = load_thickness_map(&config.initial, preferred)?;
    let after = load_thickness_map(&config.after, preferred)?;
    let trimmed = removal_depth(&initial, &after)?;

    let x = extract_section(&initial, &trimmed, SectionAxis::X, config)?;
    let y = extract_section(&initial, &trimmed, SectionAxis::Y, config)?;

    let trimming_path = config.output_dir.join(TRIMMING_FILE);
    write_trimming_csv(&trimming_path, &initial, &trimmed)?;
    let x_path = config.output_dir.join(X_SECTION_FILE);
    write_profile_pairs(&x_path, &x.coords, &x.values)?;
    let y_path = config.output_dir.join(Y_SECTION_FILE);
    write_profile_pairs(&y_path, &y.coords, &y.values)?;

    log::info!(
        "extracted {} + {} cross-section points from {} map points",
        x.coords.len(),
        y.coords.len(),
        initial.len()
    );
    Ok(ExtractOutputs {
        trimming_path,
        x_path,
        y_path,
        x,
        y,
        map_points: initial.len(),
        thickness_column: initial.thickness_column.clone(),
    })
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;
    use std::fs;

    use csv::StringRecord;

    use super::*;

    /// Map with an x cut at Y = 40 and a y cut at X = 40, 0.25 mm pitch.
    fn cross_map(depth: impl Fn(f64) -> f64) -> (Vec<f64>, Vec<f64>, Vec<f64>) {
        let (mut xs, mut ys, mut ts) = (Vec::new(), Vec::new(), Vec::new());
        for i in 0..=120 {
            let p = -15.0 + 0.25 * i as f64;
            xs.push(p);
            ys.push(40.0);
            ts.push(depth(p));
            xs.push(40.0);
            ys.push(p);
            ts.push(depth(p) * 0.5);
        }
        // An off-cut point that must be ignored.
        xs.push(3.0);
        ys.push(3.0);
        ts.push(999.0);
        (xs, ys, ts)
    }

    fn in_memory(xs: Vec<f64>, ys: Vec<f64>, ts: Vec<f64>) -> ThicknessMap {
        let records = xs.iter().map(|_| StringRecord::new()).collect();
        ThicknessMap {
            headers: StringRecord::from(vec!["X", "Y", "Thickness"]),
            records,
            x: xs,
            y: ys,
            thickness: ts,
            thickness_column: "Thickness".to_string(),
        }
    }

    fn config(dir: &std::path::Path) -> ExtractConfig {
        ExtractConfig::with_paths(dir.join("initial.csv"), dir.join("after.csv"), dir.join("out"))
    }

    #[test]
    fn cut_is_sorted_and_flattened() {
        let (xs, ys, ts) = cross_map(|p| 2.0 + 0.1 * p + (-(p * p) / 8.0).exp() * 50.0);
        let map = in_memory(xs, ys, ts.clone());
        let cfg = config(std::path::Path::new("."));
        let x = extract_section(&map, &ts, SectionAxis::X, &cfg).unwrap();
        assert_eq!(x.coords.len(), 121);
        assert_eq!(x.coords[0], -15.0);
        assert_eq!(x.coords[120], 15.0);
        assert_eq!(x.values[0], 0.0);
        assert_eq!(x.values[120], 0.0);
        // Peak of 50 sits on the removed tilt.
        assert!((x.values[60] - 50.0).abs() < 1e-3);
    }

    #[test]
    fn wrong_point_count_is_rejected() {
        let (mut xs, mut ys, mut ts) = cross_map(|_| 1.0);
        xs.pop();
        ys.pop();
        ts.pop();
        // Drop one x-cut sample.
        xs.remove(0);
        ys.remove(0);
        ts.remove(0);
        let map = in_memory(xs, ys, ts.clone());
        let cfg = config(std::path::Path::new("."));
        let err = extract_section(&map, &ts, SectionAxis::X, &cfg).unwrap_err();
        assert!(matches!(err, BeamError::InvalidInput(_)));
        assert!(extract_section(&map, &ts, SectionAxis::Y, &cfg).is_ok());
    }

    #[test]
    fn mismatched_maps_are_rejected() {
        let a = in_memory(vec![0.0, 1.0], vec![0.0, 0.0], vec![5.0, 5.0]);
        let b = in_memory(vec![0.0], vec![0.0], vec![1.0]);
        assert!(matches!(removal_depth(&a, &b), Err(BeamError::InvalidInput(_))));
    }

    #[test]
    fn end_to_end_writes_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let (xs, ys, depth) = cross_map(|p| 10.0 * (-(p * p) / 20.0).exp());

        let mut initial = String::from("X,Y,Thickness(nm)\n");
        let mut after = String::from("X,Y,Thickness(nm)\n");
        for ((x, y), d) in xs.iter().zip(&ys).zip(&depth) {
            writeln!(initial, "{x},{y},100").unwrap();
            writeln!(after, "{x},{y},{}", 100.0 - d).unwrap();
        }
        fs::write(dir.path().join("initial.csv"), initial).unwrap();
        fs::write(dir.path().join("after.csv"), after).unwrap();

        let cfg = config(dir.path());
        let out = extract_cross_sections(&cfg).unwrap();
        assert_eq!(out.map_points, 243);
        assert_eq!(out.thickness_column, "Thickness(nm)");

        let trimming = fs::read_to_string(&out.trimming_path).unwrap();
        assert!(trimming.starts_with("X,Y,Thickness(nm),Trimmed_Thickness\n"));
        assert_eq!(trimming.lines().count(), 244);

        let x_text = fs::read_to_string(&out.x_path).unwrap();
        let lines: Vec<&str> = x_text.lines().collect();
        assert_eq!(lines.len(), 121);
        assert_eq!(lines[0], "-15,0");
        assert!(out.y.values.iter().zip(&out.x.values).all(|(y, x)| (y - 0.5 * x).abs() < 1e-9));
    }
}
