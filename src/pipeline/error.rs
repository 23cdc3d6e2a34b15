//! Pipeline error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole run. Only discovery can fail this way.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("cannot access project root {path}: {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid glob pattern {pattern:?}: {source}")]
    Glob {
        pattern: String,
        #[source]
        source: globset::Error,
    },
    #[error("walking {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

/// Errors confined to one file. Recorded in the result; the run continues.
#[derive(Error, Debug)]
pub enum FileError {
    #[error("File not found")]
    NotFound,
    #[error("Permission denied")]
    PermissionDenied,
    #[error("File is not valid UTF-8")]
    InvalidEncoding,
    #[error("File too large: {size} bytes exceeds limit of {max} bytes")]
    TooLarge { size: u64, max: u64 },
    #[error("Analysis timeout after {millis}ms")]
    Timeout { millis: u128 },
    #[error("Read error: {0}")]
    Io(std::io::Error),
}

impl From<std::io::Error> for FileError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => FileError::NotFound,
            std::io::ErrorKind::PermissionDenied => FileError::PermissionDenied,
            std::io::ErrorKind::InvalidData => FileError::InvalidEncoding,
            _ => FileError::Io(err),
        }
    }
}
