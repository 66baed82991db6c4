//! Usage scanner: finds ag-Grid constructs in a project tree.
//!
//! TypeScript and JavaScript are parsed with Oxc; HTML templates and
//! stylesheets are scanned as text. Each file with at least one finding
//! becomes a [`UsageRecord`]. A file that cannot be read or parsed is
//! skipped with a [`ScanWarning`], never failing the whole scan.
//!
//! ```no_run
//! use gridport_core::MappingRegistry;
//! use gridport_fs::NativeFileSystem;
//! use gridport_scanner::Scanner;
//! use std::sync::Arc;
//!
//! # async fn run() -> gridport_core::Result<()> {
//! let registry = MappingRegistry::builtin()?;
//! let fs = Arc::new(NativeFileSystem::new("my-app")?);
//! let report = Scanner::new(fs, &registry)?.scan().await?;
//! println!("{} files use ag-Grid", report.records.len());
//! # Ok(())
//! # }
//! ```

mod script;
mod template;
pub mod text;

pub use template::TemplatePatterns;

use gridport_core::{Error, MappingRegistry, Result, ScanReport, ScanWarning, UsageRecord};
use gridport_fs::{DiscoveryOptions, FileSystem};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Extensions the scanner reads.
pub const SOURCE_EXTENSIONS: &[&str] = &[".ts", ".js", ".html", ".css", ".scss", ".sass"];

/// Paths never scanned: dependencies, build output, VCS data, tests and
/// type declarations.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "node_modules/",
    "dist/",
    ".git/",
    ".angular/",
    "*.spec.ts",
    "*.test.ts",
    "*.spec.js",
    "*.test.js",
    "*.d.ts",
];

/// How a file is scanned. Also the report ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileGroup {
    Script,
    Template,
    Stylesheet,
}

impl FileGroup {
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "ts" | "js" | "mjs" | "cjs" | "tsx" | "jsx" => Some(FileGroup::Script),
            "html" | "htm" => Some(FileGroup::Template),
            "css" | "scss" | "sass" => Some(FileGroup::Stylesheet),
            _ => None,
        }
    }
}

/// Scan settings on top of the defaults.
#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    /// Extra gitignore-style exclusions.
    pub exclude: Vec<String>,
    /// Restrict the scan to these project-relative paths.
    pub only: Option<BTreeSet<PathBuf>>,
    pub discovery: DiscoveryOptions,
}

/// Walks a project and builds usage records.
pub struct Scanner<'r, F: FileSystem> {
    fs: Arc<F>,
    registry: &'r MappingRegistry,
    patterns: TemplatePatterns,
    options: ScanOptions,
}

impl<'r, F: FileSystem> Scanner<'r, F> {
    pub fn new(fs: Arc<F>, registry: &'r MappingRegistry) -> Result<Self> {
        Ok(Self {
            fs,
            registry,
            patterns: TemplatePatterns::new(registry)?,
            options: ScanOptions::default(),
        })
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    /// Project-relative paths to scan, grouped scripts, templates,
    /// stylesheets and sorted within each group.
    pub async fn discover(&self) -> Result<Vec<PathBuf>> {
        let root = self.fs.project_root().to_path_buf();
        let mut ignore: Vec<&str> = DEFAULT_EXCLUDES.to_vec();
        ignore.extend(self.options.exclude.iter().map(String::as_str));

        let discovered = self
            .fs
            .discover_files(&root, SOURCE_EXTENSIONS, &ignore, &self.options.discovery)
            .await
            .map_err(|e| Error::InvalidProjectRoot {
                path: root.clone(),
                reason: e.to_string(),
            })?;

        let mut files: Vec<PathBuf> = discovered
            .iter()
            .map(|path| self.fs.relative_path(path))
            .filter(|rel| {
                self.options
                    .only
                    .as_ref()
                    .map_or(true, |only| only.contains(rel))
            })
            .collect();
        files.sort_by_key(|rel| FileGroup::from_path(rel));
        Ok(files)
    }

    /// Scans the project.
    ///
    /// Only a failure to walk the project root is returned as an error.
    pub async fn scan(&self) -> Result<ScanReport> {
        let files = self.discover().await?;
        tracing::info!("scanning {} files", files.len());

        let mut report = ScanReport {
            files_scanned: files.len(),
            ..Default::default()
        };

        for rel in files {
            let source = match self.fs.read_to_string(&rel).await {
                Ok(source) => source,
                Err(e) => {
                    let err = Error::FileIo {
                        path: rel.clone(),
                        source: e,
                    };
                    tracing::warn!("skipping {}", err);
                    report.warnings.push(ScanWarning {
                        file_path: rel,
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            match self.scan_source(&rel, &source) {
                Ok(record) if !record.is_empty() => {
                    tracing::debug!(
                        "{}: {} usages",
                        rel.display(),
                        record.usage_count()
                    );
                    report.records.push(record);
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::warn!("skipping {}", err);
                    report.warnings.push(ScanWarning {
                        file_path: rel,
                        message: err.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "found usages in {} of {} files",
            report.records.len(),
            report.files_scanned
        );
        Ok(report)
    }

    /// Scans one file's text. The record may be empty.
    pub fn scan_source(&self, relative_path: &Path, source: &str) -> Result<UsageRecord> {
        scan_text(&self.patterns, self.registry, relative_path, source)
    }
}

/// Scans one file's text without a filesystem.
pub fn scan_text(
    patterns: &TemplatePatterns,
    registry: &MappingRegistry,
    relative_path: &Path,
    source: &str,
) -> Result<UsageRecord> {
    let mut record = UsageRecord::new(relative_path);
    match FileGroup::from_path(relative_path) {
        Some(FileGroup::Script) => {
            script::scan_script(relative_path, source, patterns, registry, &mut record)?
        }
        Some(FileGroup::Template) => template::scan_template(
            source,
            &text::LineIndex::new(source),
            patterns,
            registry,
            &mut record,
        ),
        Some(FileGroup::Stylesheet) => {
            template::scan_stylesheet(source, patterns, registry, &mut record)
        }
        None => {}
    }
    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_groups() {
        assert_eq!(
            FileGroup::from_path(Path::new("a/b.component.ts")),
            Some(FileGroup::Script)
        );
        assert_eq!(
            FileGroup::from_path(Path::new("a/b.component.html")),
            Some(FileGroup::Template)
        );
        assert_eq!(
            FileGroup::from_path(Path::new("styles.scss")),
            Some(FileGroup::Stylesheet)
        );
        assert_eq!(FileGroup::from_path(Path::new("README.md")), None);
        assert!(FileGroup::Script < FileGroup::Template);
        assert!(FileGroup::Template < FileGroup::Stylesheet);
    }

    #[test]
    fn test_scan_text_dispatch() {
        let registry = MappingRegistry::builtin().unwrap();
        let patterns = TemplatePatterns::new(&registry).unwrap();

        let css = scan_text(&patterns, &registry, Path::new("a.css"), ".ag-row {}").unwrap();
        assert_eq!(css.css_classes.len(), 1);

        let html = scan_text(
            &patterns,
            &registry,
            Path::new("a.html"),
            "<ag-grid-angular></ag-grid-angular>",
        )
        .unwrap();
        assert_eq!(html.components.len(), 1);

        let other = scan_text(&patterns, &registry, Path::new("a.md"), ".ag-row").unwrap();
        assert!(other.is_empty());
    }
}
