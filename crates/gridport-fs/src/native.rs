//! Native filesystem implementation using std::fs + tokio.

use crate::{DiscoveryOptions, FileMetadata, FileSystem};
use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use std::io;
use std::path::{Component, Path, PathBuf};
use tokio::task;

/// Native filesystem implementation using std::fs + tokio.
///
/// Blocking std::fs calls run on tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct NativeFileSystem {
    project_root: PathBuf,
}

impl NativeFileSystem {
    /// Create a new native filesystem scoped to a project root.
    ///
    /// # Errors
    ///
    /// Returns an error if the root doesn't exist or isn't a directory.
    pub fn new(project_root: impl AsRef<Path>) -> io::Result<Self> {
        let root = project_root.as_ref();
        let project_root = root.canonicalize().map_err(|e| {
            io::Error::new(
                e.kind(),
                format!("Project root does not exist: {} ({})", root.display(), e),
            )
        })?;

        if !project_root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Project root is not a directory: {}", project_root.display()),
            ));
        }

        Ok(Self { project_root })
    }

    /// Validate that a path is within the project root.
    ///
    /// Relative paths are joined to the root. Paths that don't exist yet are
    /// resolved through their parent so writes to new files are allowed.
    fn validate_path(&self, path: &Path) -> io::Result<PathBuf> {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        };

        let resolved = match absolute.canonicalize() {
            Ok(path) => path,
            Err(_) => match (absolute.parent(), absolute.file_name()) {
                (Some(parent), Some(name)) => match parent.canonicalize() {
                    Ok(parent) => parent.join(name),
                    Err(_) => normalize_lexically(&absolute),
                },
                _ => normalize_lexically(&absolute),
            },
        };

        if !resolved.starts_with(&self.project_root) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!(
                    "Path traversal detected: {} is outside project root {}",
                    resolved.display(),
                    self.project_root.display()
                ),
            ));
        }

        Ok(resolved)
    }
}

/// Syntactic normalization for paths that don't exist yet.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => {
                result = PathBuf::from(component.as_os_str());
            }
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            Component::Normal(name) => result.push(name),
        }
    }
    result
}

/// Runs blocking std::fs work on tokio's blocking pool.
async fn blocking<T, F>(work: F) -> io::Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> io::Result<T> + Send + 'static,
{
    task::spawn_blocking(work).await.map_err(io::Error::other)?
}

#[async_trait::async_trait]
impl FileSystem for NativeFileSystem {
    async fn exists(&self, path: &Path) -> io::Result<bool> {
        let path = self.validate_path(path)?;
        blocking(move || Ok(path.exists())).await
    }

    async fn read_to_string(&self, path: &Path) -> io::Result<String> {
        let path = self.validate_path(path)?;
        blocking(move || std::fs::read_to_string(path)).await
    }

    async fn metadata(&self, path: &Path) -> io::Result<FileMetadata> {
        let path = self.validate_path(path)?;
        blocking(move || match std::fs::symlink_metadata(path) {
            Ok(meta) => Ok(FileMetadata {
                exists: true,
                is_file: meta.is_file(),
                is_dir: meta.is_dir(),
                is_symlink: meta.file_type().is_symlink(),
                size: meta.len(),
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(FileMetadata::missing()),
            Err(e) => Err(e),
        })
        .await
    }

    async fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let path = self.validate_path(path)?;
        let contents = contents.to_owned();
        blocking(move || std::fs::write(path, contents)).await
    }

    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let (from, to) = (self.validate_path(from)?, self.validate_path(to)?);
        blocking(move || std::fs::rename(from, to)).await
    }

    async fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let path = self.validate_path(path)?;
        blocking(move || std::fs::create_dir_all(path)).await
    }

    async fn discover_files(
        &self,
        root: &Path,
        extensions: &[&str],
        ignore_patterns: &[&str],
        options: &DiscoveryOptions,
    ) -> io::Result<Vec<PathBuf>> {
        let walk = Walk {
            root: self.validate_path(root)?,
            project_root: self.project_root.clone(),
            extensions: extensions.iter().map(|e| e.trim_start_matches('.').to_owned()).collect(),
            excludes: ignore_patterns.iter().map(|p| format!("!{p}")).collect(),
            options: options.clone(),
        };
        blocking(move || walk.run()).await
    }

    fn project_root(&self) -> &Path {
        &self.project_root
    }
}

/// One discovery request, moved onto the blocking pool.
struct Walk {
    root: PathBuf,
    project_root: PathBuf,
    /// Extensions without the leading dot.
    extensions: Vec<String>,
    /// Override globs, each negated so it excludes.
    excludes: Vec<String>,
    options: DiscoveryOptions,
}

impl Walk {
    fn run(self) -> io::Result<Vec<PathBuf>> {
        let invalid = |e: ignore::Error| io::Error::new(io::ErrorKind::InvalidInput, e);

        let mut builder = WalkBuilder::new(&self.root);
        builder
            .follow_links(self.options.follow_symlinks)
            .hidden(!self.options.include_hidden)
            .git_ignore(self.options.respect_gitignore)
            .git_exclude(self.options.respect_gitignore)
            .require_git(false)
            .max_depth(Some(self.options.max_depth))
            .max_filesize(self.options.max_file_size);

        if !self.excludes.is_empty() {
            let mut overrides = OverrideBuilder::new(&self.root);
            for glob in &self.excludes {
                overrides.add(glob).map_err(invalid)?;
            }
            builder.overrides(overrides.build().map_err(invalid)?);
        }

        let mut found: Vec<PathBuf> = builder
            .build()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!("skipping unreadable entry: {}", e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .filter(|entry| self.wanted(entry.path()))
            .filter_map(|entry| entry.path().canonicalize().ok())
            .filter(|path| path.starts_with(&self.project_root))
            .collect();

        found.sort();
        found.dedup();
        Ok(found)
    }

    fn wanted(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|wanted| wanted == ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lexically() {
        assert_eq!(
            normalize_lexically(Path::new("/a/b/../c/./d")),
            PathBuf::from("/a/c/d")
        );
    }
}
