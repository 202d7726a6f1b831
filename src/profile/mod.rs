//! Cross-section preprocessing.
//!
//! - FWHM measurement (`fwhm`)
//! - peak-centering, offset correction and normalization (`prepare`)
//! - endpoint baseline flattening (`baseline`)
//! - peak-centered resampling onto the reconstruction grid (`resample`)

pub mod baseline;
pub mod fwhm;
pub mod prepare;
pub mod resample;

pub use baseline::*;
pub use fwhm::*;
pub use prepare::*;
pub use resample::*;
