//! Error taxonomy shared by every stage of the pipeline.
//!
//! All core functions fail on the first violation they detect and never return
//! partial results. The binary maps each variant to a process exit code.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum BeamError {
    /// Malformed or physically impossible input (negative intensities,
    /// zero-sum profiles, wrong lengths, wrong row counts).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An interpolation, combination or edge method outside the supported set.
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(String),

    /// Too few samples for the requested method.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Failed to access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in '{}': {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error in '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl BeamError {
    pub fn invalid(message: impl Into<String>) -> Self {
        BeamError::InvalidInput(message.into())
    }

    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BeamError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn csv(path: impl Into<PathBuf>, source: csv::Error) -> Self {
        BeamError::Csv {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            BeamError::InvalidInput(_) | BeamError::UnsupportedMethod(_) => 2,
            BeamError::InsufficientData(_) => 3,
            BeamError::Io { .. } | BeamError::Csv { .. } | BeamError::Json { .. } => 4,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_follow_category() {
        assert_eq!(BeamError::invalid("x").exit_code(), 2);
        assert_eq!(BeamError::UnsupportedMethod("x".into()).exit_code(), 2);
        assert_eq!(BeamError::InsufficientData("x".into()).exit_code(), 3);
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(BeamError::io("a.csv", io).exit_code(), 4);
    }

    #[test]
    fn display_includes_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let msg = BeamError::io("profiles/x.csv", io).to_string();
        assert!(msg.contains("profiles/x.csv"), "{msg}");
    }
}
