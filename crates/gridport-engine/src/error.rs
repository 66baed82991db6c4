//! Error types for gridport-engine

use gridport_config::ConfigError;
use std::io;
use thiserror::Error;

/// Result type alias using [`EngineError`]
pub type Result<T> = std::result::Result<T, EngineError>;

/// Fatal failures of a runner operation
///
/// Per-file and per-check failures are recorded inside the returned
/// result objects and never show up here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Core(#[from] gridport_core::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Manifest update failed: {0}")]
    Manifest(#[from] gridport_deps::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl EngineError {
    /// Rollback found nothing to restore.
    pub fn is_backup_missing(&self) -> bool {
        matches!(
            self,
            EngineError::Core(gridport_core::Error::BackupMissing { .. })
        )
    }
}
