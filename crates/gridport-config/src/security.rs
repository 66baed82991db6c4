use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Security-related errors
#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("Path does not exist: {0}")]
    PathDoesNotExist(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Path is not readable: {0}")]
    NotReadable(PathBuf),

    #[error("Refusing to migrate system directory: {0}")]
    SystemDirectory(PathBuf),

    #[error("Backup directory must be a relative path inside the project: {0}")]
    InvalidBackupDir(String),
}

/// Canonicalizes a project root and refuses anything a migration should
/// never rewrite in place: missing or unreadable paths, plain files, the
/// filesystem root and well-known system directories.
pub fn validate_project_path(path: &Path) -> Result<PathBuf, SecurityError> {
    let canonical = path
        .canonicalize()
        .map_err(|_| SecurityError::PathDoesNotExist(path.to_path_buf()))?;

    if !canonical.is_dir() {
        return Err(SecurityError::NotADirectory(canonical));
    }

    if fs::read_dir(&canonical).is_err() {
        return Err(SecurityError::NotReadable(canonical));
    }

    if canonical.parent().is_none() {
        return Err(SecurityError::SystemDirectory(canonical));
    }

    #[cfg(unix)]
    {
        let dangerous_paths = ["/bin", "/sbin", "/usr", "/etc", "/var/lib", "/sys", "/proc"];
        if dangerous_paths.iter().any(|d| canonical.starts_with(d)) {
            return Err(SecurityError::SystemDirectory(canonical));
        }
    }

    #[cfg(windows)]
    {
        let lower = canonical.to_string_lossy().to_lowercase();
        if lower.contains(":\\windows") || lower.contains(":\\program files") {
            return Err(SecurityError::SystemDirectory(canonical));
        }
    }

    Ok(canonical)
}

/// Validate the configured backup directory
///
/// It must be a plain relative path so backups always land inside the
/// project (and are excluded from the scan and from the backup itself).
pub fn validate_backup_dir(dir: &str) -> Result<(), SecurityError> {
    let path = Path::new(dir);
    let escapes = path
        .components()
        .any(|c| !matches!(c, std::path::Component::Normal(_)));
    if dir.trim().is_empty() || path.is_absolute() || escapes {
        return Err(SecurityError::InvalidBackupDir(dir.to_string()));
    }
    Ok(())
}
