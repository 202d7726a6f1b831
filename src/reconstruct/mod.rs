//! Exact-path reconstruction of a 31×31 beam profile from its two marginals.
//!
//! The grid owner (`MarginalFitReconstructor`) mutates the matrix in place and
//! pushes a copy of it to a `SnapshotSink` after every row update; persistence
//! of those snapshots is up to the sink.

pub mod marginal;
pub mod snapshot;

pub use marginal::*;
pub use snapshot::*;
