//! Input/output helpers.
//!
//! - cross-section and thickness-map ingest (`ingest`)
//! - surface, reconstruction and diagnostic CSV exports (`export`)
//! - run manifest JSON read/write (`manifest`)

pub mod export;
pub mod ingest;
pub mod manifest;

pub use export::*;
pub use ingest::*;
pub use manifest::*;
