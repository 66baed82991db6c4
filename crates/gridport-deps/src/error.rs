//! Error types for gridport-deps

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using gridport-deps Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while rewriting a dependency manifest
#[derive(Debug, Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parse error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Manifest is valid JSON but not shaped like a package manifest
    #[error("Invalid file format for {0}: {1}")]
    InvalidFormat(PathBuf, String),
}
