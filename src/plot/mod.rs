//! Terminal plotting.
//!
//! - prepared cross-section vs its interpolant (`render_profile_plot`)
//! - target vs reconstructed marginal (`render_marginal_plot`)

pub mod ascii;

pub use ascii::*;
