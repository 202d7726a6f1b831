//! `beam-profiler` library crate.
//!
//! The binary (`beamprof`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the preprocessing, synthesis and reconstruction stages are reusable on
//!   their own (each takes explicit config values, no global state)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod extract;
pub mod interp;
pub mod io;
pub mod math;
pub mod plot;
pub mod profile;
pub mod reconstruct;
pub mod report;
pub mod surface;
