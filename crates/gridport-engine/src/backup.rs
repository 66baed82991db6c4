//! Timestamped project backups and rollback.
//!
//! A backup is a full copy of the project tree under
//! `<project>/<backup_dir>/backup-<UTC timestamp>`. The copy is written to a
//! `.partial` directory and renamed only once every file and the
//! `backup-manifest.json` checksum list are on disk, so an interrupted backup
//! is never offered for rollback.

use crate::Result;
use chrono::{DateTime, Utc};
use gridport_core::Error;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Checksum list written into every completed backup.
pub const BACKUP_MANIFEST: &str = "backup-manifest.json";

/// Directory names never copied into a backup.
pub const BACKUP_EXCLUDES: &[&str] = &["node_modules", "dist", ".git", ".angular"];

const BACKUP_PREFIX: &str = "backup-";
const PARTIAL_SUFFIX: &str = ".partial";
/// Sortable UTC timestamp, millisecond precision.
const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%3fZ";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupManifest {
    pub created_at: DateTime<Utc>,
    pub files: Vec<BackupEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupEntry {
    /// Project-relative path.
    pub path: PathBuf,
    pub sha256: String,
    pub size: u64,
}

/// Outcome of a rollback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreSummary {
    pub backup: PathBuf,
    pub files_restored: usize,
}

/// Backups of one project.
#[derive(Debug, Clone)]
pub struct BackupStore {
    project_root: PathBuf,
    backup_root: PathBuf,
}

impl BackupStore {
    pub fn new(project_root: impl Into<PathBuf>, backup_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            backup_root: backup_root.into(),
        }
    }

    pub fn backup_root(&self) -> &Path {
        &self.backup_root
    }

    /// Copies the project tree into a new backup and returns its path.
    pub async fn create(&self) -> Result<PathBuf> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.create_blocking()).await?
    }

    /// Completed backups, oldest first.
    pub async fn list(&self) -> Result<Vec<PathBuf>> {
        let store = self.clone();
        tokio::task::spawn_blocking(move || store.list_blocking()).await?
    }

    /// The most recent completed backup.
    pub async fn latest(&self) -> Result<PathBuf> {
        self.list().await?.pop().ok_or_else(|| {
            Error::BackupMissing {
                searched: self.backup_root.clone(),
            }
            .into()
        })
    }

    /// Resolves an explicit backup path (relative to the project root) or
    /// falls back to the latest backup.
    pub async fn resolve(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        let Some(explicit) = explicit else {
            return self.latest().await;
        };
        let path = if explicit.is_absolute() {
            explicit.to_path_buf()
        } else {
            self.project_root.join(explicit)
        };
        if !path.is_dir() {
            return Err(Error::BackupMissing { searched: path }.into());
        }
        Ok(path)
    }

    /// Reads and checks a backup against its manifest.
    pub async fn verify(&self, backup: &Path) -> Result<BackupManifest> {
        let backup = backup.to_path_buf();
        tokio::task::spawn_blocking(move || verify_blocking(&backup)).await?
    }

    /// Overwrites project files with the backup's copies.
    ///
    /// The whole backup is verified first; a corrupt backup restores nothing.
    pub async fn restore(&self, backup: &Path) -> Result<RestoreSummary> {
        let store = self.clone();
        let backup = backup.to_path_buf();
        tokio::task::spawn_blocking(move || store.restore_blocking(&backup)).await?
    }

    fn create_blocking(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.backup_root).map_err(|source| Error::FileIo {
            path: self.backup_root.clone(),
            source,
        })?;

        let created_at = Utc::now();
        let target = self.unused_name(&format!(
            "{}{}",
            BACKUP_PREFIX,
            created_at.format(TIMESTAMP_FORMAT)
        ));
        let mut partial = target.clone().into_os_string();
        partial.push(PARTIAL_SUFFIX);
        let partial = PathBuf::from(partial);

        match self.fill(&partial, created_at) {
            Ok(count) => {
                fs::rename(&partial, &target).map_err(|source| Error::FileIo {
                    path: target.clone(),
                    source,
                })?;
                info!("Backed up {} files to {}", count, target.display());
                Ok(target)
            }
            Err(err) => {
                if let Err(cleanup) = fs::remove_dir_all(&partial) {
                    warn!("Could not remove {}: {}", partial.display(), cleanup);
                }
                Err(err)
            }
        }
    }

    fn unused_name(&self, base: &str) -> PathBuf {
        let mut candidate = self.backup_root.join(base);
        let mut n = 1;
        while candidate.exists() {
            candidate = self.backup_root.join(format!("{}-{}", base, n));
            n += 1;
        }
        candidate
    }

    /// Copies every project file into `partial` and writes the manifest.
    fn fill(&self, partial: &Path, created_at: DateTime<Utc>) -> Result<usize> {
        fs::create_dir_all(partial)?;

        let mut files = Vec::new();
        let walker = WalkDir::new(&self.project_root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_excluded(entry));
        for entry in walker {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let source = entry.path();
            let relative = source
                .strip_prefix(&self.project_root)
                .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
            let bytes = fs::read(source).map_err(|e| file_io(source, e))?;

            let dest = partial.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|e| file_io(parent, e))?;
            }
            fs::write(&dest, &bytes).map_err(|e| file_io(&dest, e))?;

            files.push(BackupEntry {
                path: relative.to_path_buf(),
                sha256: checksum(&bytes),
                size: bytes.len() as u64,
            });
        }

        let count = files.len();
        let manifest = BackupManifest { created_at, files };
        let json = serde_json::to_string_pretty(&manifest).map_err(Error::from)?;
        fs::write(partial.join(BACKUP_MANIFEST), json)?;
        Ok(count)
    }

    fn is_excluded(&self, entry: &DirEntry) -> bool {
        if entry.depth() == 0 {
            return false;
        }
        if entry.path() == self.backup_root {
            return true;
        }
        entry.file_type().is_dir()
            && entry
                .file_name()
                .to_str()
                .is_some_and(|name| BACKUP_EXCLUDES.contains(&name))
    }

    fn list_blocking(&self) -> Result<Vec<PathBuf>> {
        let entries = match fs::read_dir(&self.backup_root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(file_io(&self.backup_root, e).into()),
        };

        let mut backups = Vec::new();
        for entry in entries {
            let path = entry?.path();
            let complete = path.is_dir()
                && path.file_name().and_then(|n| n.to_str()).is_some_and(|name| {
                    name.starts_with(BACKUP_PREFIX) && !name.ends_with(PARTIAL_SUFFIX)
                })
                && path.join(BACKUP_MANIFEST).is_file();
            if complete {
                backups.push(path);
            } else {
                debug!("Ignoring {} in backup directory", path.display());
            }
        }
        backups.sort();
        Ok(backups)
    }

    fn restore_blocking(&self, backup: &Path) -> Result<RestoreSummary> {
        let manifest = verify_blocking(backup)?;
        for entry in &manifest.files {
            let bytes = fs::read(backup.join(&entry.path)).map_err(|e| file_io(&entry.path, e))?;
            let dest = self.project_root.join(&entry.path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).map_err(|e| file_io(parent, e))?;
            }
            fs::write(&dest, bytes).map_err(|e| file_io(&dest, e))?;
        }
        info!(
            "Restored {} files from {}",
            manifest.files.len(),
            backup.display()
        );
        Ok(RestoreSummary {
            backup: backup.to_path_buf(),
            files_restored: manifest.files.len(),
        })
    }
}

fn verify_blocking(backup: &Path) -> Result<BackupManifest> {
    let corrupt = |reason: String| Error::BackupCorrupt {
        backup: backup.to_path_buf(),
        reason,
    };

    let raw = fs::read_to_string(backup.join(BACKUP_MANIFEST))
        .map_err(|e| corrupt(format!("cannot read {}: {}", BACKUP_MANIFEST, e)))?;
    let manifest: BackupManifest = serde_json::from_str(&raw)
        .map_err(|e| corrupt(format!("invalid {}: {}", BACKUP_MANIFEST, e)))?;

    for entry in &manifest.files {
        let safe = entry
            .path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(corrupt(format!("unsafe path {}", entry.path.display())).into());
        }
        let bytes = fs::read(backup.join(&entry.path))
            .map_err(|e| corrupt(format!("{}: {}", entry.path.display(), e)))?;
        if checksum(&bytes) != entry.sha256 {
            return Err(corrupt(format!("checksum mismatch for {}", entry.path.display())).into());
        }
    }
    Ok(manifest)
}

fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn file_io(path: &Path, source: io::Error) -> Error {
    Error::FileIo {
        path: path.to_path_buf(),
        source,
    }
}
