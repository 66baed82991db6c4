//! Safe file update operations

use crate::Result;
use gridport_fs::FileSystem;
use std::path::Path;
use std::sync::Arc;

/// File updater that performs atomic writes
pub struct FileUpdater {
    dry_run: bool,
}

impl FileUpdater {
    /// Create a new file updater
    ///
    /// With `dry_run` set nothing is written.
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Replace a file's contents through [`FileSystem::write_atomic`]
    ///
    /// Returns whether a write happened. Unchanged contents are not rewritten.
    pub async fn update_file<F: FileSystem + ?Sized>(
        &self,
        fs: &Arc<F>,
        path: &Path,
        old_contents: &str,
        new_contents: &str,
    ) -> Result<bool> {
        if self.dry_run || old_contents == new_contents {
            return Ok(false);
        }
        fs.write_atomic(path, new_contents).await?;
        Ok(true)
    }
}
