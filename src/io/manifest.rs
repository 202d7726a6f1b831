//! Run manifests.
//!
//! A manifest is the portable record of one run:
//! - which command ran, with which resolved configuration
//! - when it ran (local RFC 3339 timestamp)
//! - which files it produced
//! - a command-specific diagnostics block (FWHMs, R², residuals, ...)

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::error::BeamError;

pub const TOOL_NAME: &str = "beamprof";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest<C, D> {
    pub tool: String,
    pub version: String,
    pub command: String,
    pub generated: String,
    pub config: C,
    pub outputs: Vec<PathBuf>,
    pub diagnostics: D,
}

/// A manifest read back from disk.
pub type StoredManifest = RunManifest<serde_json::Value, serde_json::Value>;

impl<C, D> RunManifest<C, D> {
    pub fn new(command: &str, config: C, outputs: Vec<PathBuf>, diagnostics: D) -> Self {
        Self {
            tool: TOOL_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            command: command.to_string(),
            generated: Local::now().to_rfc3339(),
            config,
            outputs,
            diagnostics,
        }
    }
}

/// Write a manifest as pretty-printed JSON, creating missing parent directories.
pub fn write_manifest<C: Serialize, D: Serialize>(path: &Path, manifest: &RunManifest<C, D>) -> Result<(), BeamError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| BeamError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| BeamError::io(path, e))?;
    serde_json::to_writer_pretty(file, manifest).map_err(|source| BeamError::Json {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_manifest(path: &Path) -> Result<StoredManifest, BeamError> {
    let file = File::open(path).map_err(|e| BeamError::io(path, e))?;
    serde_json::from_reader(file).map_err(|source| BeamError::Json {
        path: path.to_path_buf(),
        source,
    })
}
