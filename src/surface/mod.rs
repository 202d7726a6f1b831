//! Surface synthesis from two axis interpolators.
//!
//! - axis and grid container (`grid`)
//! - radial falloff and z-shift edge treatments (`edge`)
//! - row-parallel evaluation and the diagonal diagnostic (`synth`)

pub mod edge;
pub mod grid;
pub mod synth;

pub use edge::*;
pub use grid::*;
pub use synth::*;
