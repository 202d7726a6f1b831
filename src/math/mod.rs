//! Numerical primitives: grids, splines, and fit statistics.

pub mod linear;
pub mod pchip;
pub mod quintic;
pub mod spline;
pub mod stats;

pub use linear::*;
pub use pchip::*;
pub use quintic::*;
pub use spline::{CubicSpline, solve_tridiagonal};
pub use stats::*;
