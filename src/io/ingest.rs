//! CSV ingest.
//!
//! Two input shapes are supported:
//! - **cross-section profiles**: headerless `(position, value)` pairs
//! - **thickness maps**: headered wafer maps with `X`, `Y` and a thickness column
//!
//! Parsing is strict: the first malformed cell aborts the load with the line
//! number, no rows are silently skipped.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::domain::RawProfile;
use crate::error::BeamError;

/// Thickness column names tried (in order) before falling back to the third column.
pub const THICKNESS_COLUMNS: [&str; 4] = ["Thickness(nm)", "Thickness", "厚度", "膜厚"];

/// Load a headerless two-column cross-section. Blank lines are skipped.
pub fn load_raw_profile(path: &Path) -> Result<RawProfile, BeamError> {
    let file = File::open(path).map_err(|e| BeamError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let mut coords = Vec::new();
    let mut values = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| BeamError::csv(path, e))?;
        let line = record.position().map_or(idx + 1, |p| p.line() as usize);
        if record.iter().all(str::is_empty) {
            continue;
        }
        coords.push(parse_cell(&record, 0, line, path)?);
        values.push(parse_cell(&record, 1, line, path)?);
    }

    log::debug!("loaded {} samples from '{}'", coords.len(), path.display());
    RawProfile::new(coords, values).map_err(|e| match e {
        BeamError::InvalidInput(msg) => BeamError::invalid(format!("'{}': {msg}", path.display())),
        other => other,
    })
}

fn parse_cell(record: &StringRecord, col: usize, line: usize, path: &Path) -> Result<f64, BeamError> {
    let cell = record.get(col).filter(|s| !s.is_empty()).ok_or_else(|| {
        BeamError::invalid(format!(
            "'{}' line {line}: missing column {}",
            path.display(),
            col + 1
        ))
    })?;
    let v = cell.parse::<f64>().map_err(|_| {
        BeamError::invalid(format!(
            "'{}' line {line}: '{cell}' is not a number",
            path.display()
        ))
    })?;
    if !v.is_finite() {
        return Err(BeamError::invalid(format!(
            "'{}' line {line}: non-finite value '{cell}'",
            path.display()
        )));
    }
    Ok(v)
}

/// A wafer thickness map: original table plus the parsed measurement columns.
#[derive(Debug, Clone)]
pub struct ThicknessMap {
    pub headers: StringRecord,
    pub records: Vec<StringRecord>,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub thickness: Vec<f64>,
    /// Header of the column the thickness was read from.
    pub thickness_column: String,
}

impl ThicknessMap {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Load a headered thickness map.
///
/// `X` and `Y` are matched case-insensitively. The thickness column is the
/// first of [`THICKNESS_COLUMNS`] present (or `preferred`, when given),
/// otherwise the third column.
pub fn load_thickness_map(path: &Path, preferred: Option<&str>) -> Result<ThicknessMap, BeamError> {
    let file = File::open(path).map_err(|e| BeamError::io(path, e))?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers().map_err(|e| BeamError::csv(path, e))?.clone();
    let header_map = build_header_map(&headers);

    let x_idx = column(&header_map, "x", path)?;
    let y_idx = column(&header_map, "y", path)?;
    let t_idx = resolve_thickness_column(&headers, &header_map, preferred).ok_or_else(|| {
        BeamError::invalid(format!(
            "'{}': cannot identify a thickness column",
            path.display()
        ))
    })?;

    let mut records = Vec::new();
    let (mut x, mut y, mut thickness) = (Vec::new(), Vec::new(), Vec::new());
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| BeamError::csv(path, e))?;
        // +2: header line plus 1-based numbering.
        let line = record.position().map_or(idx + 2, |p| p.line() as usize);
        if record.iter().all(str::is_empty) {
            continue;
        }
        x.push(parse_cell(&record, x_idx, line, path)?);
        y.push(parse_cell(&record, y_idx, line, path)?);
        thickness.push(parse_cell(&record, t_idx, line, path)?);
        records.push(record);
    }

    let thickness_column = headers.get(t_idx).unwrap_or_default().to_string();
    log::debug!(
        "loaded {} map points from '{}' (thickness column '{thickness_column}')",
        records.len(),
        path.display()
    );
    Ok(ThicknessMap {
        headers,
        records,
        x,
        y,
        thickness,
        thickness_column,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_lowercase()
}

fn column(header_map: &HashMap<String, usize>, name: &str, path: &Path) -> Result<usize, BeamError> {
    header_map.get(name).copied().ok_or_else(|| {
        BeamError::invalid(format!(
            "'{}': missing required column `{}`",
            path.display(),
            name.to_uppercase()
        ))
    })
}

fn resolve_thickness_column(
    headers: &StringRecord,
    header_map: &HashMap<String, usize>,
    preferred: Option<&str>,
) -> Option<usize> {
    preferred
        .into_iter()
        .chain(THICKNESS_COLUMNS)
        .find_map(|name| header_map.get(&normalize_header_name(name)).copied())
        .or_else(|| (headers.len() >= 3).then_some(2))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        f
    }

    #[test]
    fn profile_is_sorted_and_blank_lines_skipped() {
        let f = write_temp("2,5\n\n0,1\n1, 3\n");
        let p = load_raw_profile(f.path()).unwrap();
        assert_eq!(p.coords, vec![0.0, 1.0, 2.0]);
        assert_eq!(p.values, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn non_numeric_cell_names_the_line() {
        let f = write_temp("0,1\n1,abc\n2,3\n");
        let err = load_raw_profile(f.path()).unwrap_err();
        assert!(matches!(err, BeamError::InvalidInput(_)));
        assert!(err.to_string().contains("line 2"), "{err}");
    }

    #[test]
    fn missing_value_is_invalid() {
        let f = write_temp("0,1\n1\n");
        assert!(matches!(load_raw_profile(f.path()), Err(BeamError::InvalidInput(_))));
    }

    #[test]
    fn single_sample_error_is_reported_once() {
        let f = write_temp("0,1\n");
        let err = load_raw_profile(f.path()).unwrap_err();
        assert!(matches!(err, BeamError::InvalidInput(_)));
        let msg = err.to_string();
        assert_eq!(msg.matches("Invalid input").count(), 1, "{msg}");
        assert!(msg.contains("at least two samples"), "{msg}");
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_raw_profile(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn thickness_column_found_by_name() {
        let f = write_temp("Point,X,Y,Thickness(nm)\n1,-1,40,100.5\n2,0,40,99.0\n");
        let map = load_thickness_map(f.path(), None).unwrap();
        assert_eq!(map.thickness_column, "Thickness(nm)");
        assert_eq!(map.x, vec![-1.0, 0.0]);
        assert_eq!(map.thickness, vec![100.5, 99.0]);
    }

    #[test]
    fn thickness_falls_back_to_third_column() {
        let f = write_temp("\u{feff}X,Y,Depth\n0,40,12\n");
        let map = load_thickness_map(f.path(), None).unwrap();
        assert_eq!(map.thickness_column, "Depth");
        assert_eq!(map.y, vec![40.0]);
        assert_eq!(map.thickness, vec![12.0]);
    }

    #[test]
    fn thickness_map_requires_coordinates() {
        let f = write_temp("A,B,Thickness\n0,40,12\n");
        assert!(matches!(load_thickness_map(f.path(), None), Err(BeamError::InvalidInput(_))));
    }
}
