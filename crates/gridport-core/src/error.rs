//! Error types for gridport.
//!
//! Only resource-level failures travel as `Err`. Per-file and per-check
//! failures are recorded as values inside the returned result objects;
//! the variants here still describe them so those records carry a
//! consistent message.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for gridport operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while scanning, transforming or migrating a project.
#[derive(Debug, Error)]
pub enum Error {
    /// A single file's source could not be parsed.
    #[error("Failed to parse {path}: {message}")]
    Parse {
        /// File that failed to parse.
        path: PathBuf,
        /// Parser diagnostics.
        message: String,
    },

    /// An edit's expected text no longer matches the addressed line.
    #[error("{path}:{line}: expected `{expected}` not found on line")]
    TransformationMismatch {
        /// File the edit targets.
        path: PathBuf,
        /// 1-based line number.
        line: u32,
        /// The text that was expected on the line.
        expected: String,
    },

    /// Reading or writing a file failed during apply.
    #[error("I/O failure on {path}: {source}")]
    FileIo {
        /// File being read or written.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Rollback was requested but no usable backup exists.
    #[error("No backup found under {searched}")]
    BackupMissing {
        /// Directory (or explicit backup path) that was searched.
        searched: PathBuf,
    },

    /// A backup failed checksum verification.
    #[error("Backup {backup} is corrupt: {reason}")]
    BackupCorrupt {
        /// Backup directory.
        backup: PathBuf,
        /// What failed to verify.
        reason: String,
    },

    /// An external tool exited non-zero or could not be spawned.
    #[error("`{command}` failed: {message}")]
    ExternalProcess {
        /// Command line that was run.
        command: String,
        /// Exit status or spawn error.
        message: String,
    },

    /// The project root is missing or unsafe to operate on.
    #[error("Invalid project root {path}: {reason}")]
    InvalidProjectRoot {
        /// Path given as project root.
        path: PathBuf,
        /// Why it was rejected.
        reason: String,
    },

    /// A mapping table document is malformed.
    #[error("Invalid mapping table: {0}")]
    InvalidMapping(String),

    /// A key is present both in a mapping table and its unsupported set.
    #[error("Key `{key}` is both mapped and unsupported in {table}")]
    MappingConflict {
        /// Name of the table.
        table: String,
        /// The conflicting key.
        key: String,
    },

    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether a batch operation may continue after this error.
    ///
    /// Only resource-level failures abort a run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Parse { .. }
                | Error::TransformationMismatch { .. }
                | Error::FileIo { .. }
                | Error::ExternalProcess { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        let parse = Error::Parse {
            path: PathBuf::from("a.ts"),
            message: "unexpected token".to_string(),
        };
        assert!(parse.is_recoverable());

        let missing = Error::BackupMissing {
            searched: PathBuf::from(".migration-backups"),
        };
        assert!(!missing.is_recoverable());
        assert!(missing.to_string().contains(".migration-backups"));
    }
}
