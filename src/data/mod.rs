//! Data sources that are not measured files.
//!
//! - seeded Gaussian cross-sections for demos and tests (`sample`)

pub mod sample;

pub use sample::*;
