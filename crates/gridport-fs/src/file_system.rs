//! FileSystem trait for project-scoped filesystem operations.

use std::io;
use std::path::{Path, PathBuf};

/// File metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    /// Whether the path exists.
    pub exists: bool,
    /// Whether the path is a file (false if directory or doesn't exist).
    pub is_file: bool,
    /// Whether the path is a directory.
    pub is_dir: bool,
    /// Whether the path is a symbolic link.
    pub is_symlink: bool,
    /// File size in bytes (0 for directories or non-existent files).
    pub size: u64,
}

impl FileMetadata {
    /// Metadata of a path that does not exist.
    pub fn missing() -> Self {
        Self {
            exists: false,
            is_file: false,
            is_dir: false,
            is_symlink: false,
            size: 0,
        }
    }
}

/// Options for file discovery.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Maximum file size to include (bytes).
    pub max_file_size: Option<u64>,

    /// Follow symbolic links (default: false).
    pub follow_symlinks: bool,

    /// Maximum directory depth (default: 100).
    pub max_depth: usize,

    /// Include hidden files (default: false).
    pub include_hidden: bool,

    /// Respect .gitignore files (default: true).
    pub respect_gitignore: bool,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            max_file_size: Some(10 * 1024 * 1024), // 10MB default
            follow_symlinks: false,
            max_depth: 100,
            include_hidden: false,
            respect_gitignore: true,
        }
    }
}

/// Project-scoped filesystem abstraction.
///
/// Every path is validated against the project root, so a migration can
/// never read or write outside the directory it was pointed at. Relative
/// paths are resolved against the root.
///
/// ## Error Handling
///
/// Uses `std::io::Result<T>`; traversal attempts fail with
/// `io::ErrorKind::PermissionDenied`.
#[async_trait::async_trait]
pub trait FileSystem: Send + Sync {
    /// Check if a path exists.
    async fn exists(&self, path: &Path) -> io::Result<bool>;

    /// Read file contents as a string.
    ///
    /// # Errors
    ///
    /// Returns `io::ErrorKind::NotFound` if file doesn't exist.
    /// Returns `io::ErrorKind::InvalidData` if file is not valid UTF-8.
    async fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Get file/directory metadata.
    ///
    /// Returns metadata even if the file doesn't exist (exists=false).
    async fn metadata(&self, path: &Path) -> io::Result<FileMetadata>;

    /// Write string contents to a file, overwriting it.
    ///
    /// Parent directories are NOT created automatically.
    async fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Rename a file.
    async fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;

    /// Create a directory and all parent directories.
    async fn create_dir_all(&self, path: &Path) -> io::Result<()>;

    /// Discover files matching extensions, minus ignore patterns.
    ///
    /// # Parameters
    ///
    /// - `root`: Starting directory (must be within project root)
    /// - `extensions`: File extensions to include (e.g., [".ts", ".html"])
    /// - `ignore_patterns`: gitignore-style patterns to skip (e.g., ["node_modules/", "*.spec.ts"])
    /// - `options`: Additional discovery options
    ///
    /// # Returns
    ///
    /// Absolute paths, sorted, so callers get a stable order for identical trees.
    async fn discover_files(
        &self,
        root: &Path,
        extensions: &[&str],
        ignore_patterns: &[&str],
        options: &DiscoveryOptions,
    ) -> io::Result<Vec<PathBuf>>;

    /// Get the project root this filesystem is scoped to.
    fn project_root(&self) -> &Path;

    /// Replace a file's contents atomically.
    ///
    /// Strategy:
    /// 1. Write to a temporary file in the same directory
    /// 2. Verify contents can be read back
    /// 3. Rename over the original
    async fn write_atomic(&self, path: &Path, contents: &str) -> io::Result<()> {
        let temp_path = path.with_extension(format!(
            "{}.tmp",
            path.extension().and_then(|ext| ext.to_str()).unwrap_or("")
        ));

        self.write(&temp_path, contents).await?;
        let _ = self.read_to_string(&temp_path).await?;
        self.rename(&temp_path, path).await
    }

    /// Path relative to the project root, for reports.
    fn relative_path(&self, path: &Path) -> PathBuf {
        path.strip_prefix(self.project_root())
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.to_path_buf())
    }
}
