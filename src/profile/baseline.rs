//! Endpoint baseline flattening.

use crate::error::BeamError;

/// Subtract the straight line through the first and last samples.
///
/// Both endpoints come out exactly 0. Values between them may become negative;
/// no clipping is applied.
pub fn flatten_baseline(coords: &[f64], values: &[f64]) -> Result<Vec<f64>, BeamError> {
    if coords.len() != values.len() || coords.len() < 2 {
        return Err(BeamError::invalid(
            "baseline flattening needs matching coordinate/value vectors of length >= 2",
        ));
    }
    let n = coords.len();
    let (x0, x1) = (coords[0], coords[n - 1]);
    let (y0, y1) = (values[0], values[n - 1]);
    if x0 == x1 {
        return Err(BeamError::invalid(format!(
            "first and last coordinates are both {x0}; baseline is undefined"
        )));
    }

    let slope = (y1 - y0) / (x1 - x0);
    let intercept = y0 - slope * x0;
    let mut out: Vec<f64> = coords
        .iter()
        .zip(values.iter())
        .map(|(x, y)| y - (slope * x + intercept))
        .collect();
    out[0] = 0.0;
    out[n - 1] = 0.0;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tilted_baseline_is_removed() {
        let coords = [-2.0, -1.0, 0.0, 1.0, 2.0];
        // Peak of 10 on top of the line y = 3 + 0.5x.
        let values: Vec<f64> = coords
            .iter()
            .map(|&x: &f64| 3.0 + 0.5 * x + if x == 0.0 { 10.0 } else { 0.0 })
            .collect();
        let flat = flatten_baseline(&coords, &values).unwrap();
        assert_eq!(flat[0], 0.0);
        assert_eq!(flat[4], 0.0);
        assert!((flat[2] - 10.0).abs() < 1e-12);
        assert!(flat[1].abs() < 1e-12);
    }

    #[test]
    fn degenerate_coordinates_are_rejected() {
        let err = flatten_baseline(&[1.0, 2.0, 1.0], &[0.0, 1.0, 0.0]).unwrap_err();
        assert!(matches!(err, BeamError::InvalidInput(_)));
    }
}
