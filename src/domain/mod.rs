//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - method selectors (`InterpMethod`, `CombineMethod`, `EdgeMethod`)
//! - measured and prepared cross-sections (`RawProfile`, `PreparedProfile`)
//! - per-stage configuration values (`FwhmConfig`, `InterpConfig`, `SurfaceConfig`, ...)

pub mod types;

pub use types::*;
