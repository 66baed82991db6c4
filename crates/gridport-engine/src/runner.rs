//! The migration runner.
//!
//! [`MigrationRunner`] ties the scanner, the generators, the compatibility
//! analyzer, the backup store and the manifest rewrite together into the
//! `analyze`, `migrate`, `validate` and `rollback` operations.

use crate::apply::{apply_transformations, group_by_file, render_diff};
use crate::backup::{BackupStore, RestoreSummary};
use crate::validate::Validator;
use crate::Result;
use gridport_compat::{analyze_compatibility, render_report, ReportFormat};
use gridport_config::{validate_project_path, ConfigManager};
use gridport_core::{
    CompatibilityReport, Error, FilePreview, MappingRegistry, MigrationError, MigrationResult,
    MigrationStage, ScanReport, ScanWarning, Transformation, ValidationReport,
};
use gridport_deps::{update_package_json, PACKAGE_JSON};
use gridport_fs::{FileSystem, NativeFileSystem};
use gridport_scanner::{ScanOptions, Scanner};
use gridport_transform::generate_all;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Settings of one `migrate` run.
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    /// Compute and preview edits without writing anything.
    pub dry_run: bool,
    /// Copy the project before writing.
    pub backup: bool,
    /// Ask the confirmation callback before changing files.
    pub interactive: bool,
    /// Skip the confirmation even when interactive.
    pub force: bool,
    /// Restrict the run to these project-relative files.
    pub only: Option<BTreeSet<PathBuf>>,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            backup: true,
            interactive: false,
            force: false,
            only: None,
        }
    }
}

/// Settings of one `analyze` run.
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Write the rendered report here.
    pub report_path: Option<PathBuf>,
    /// Report format; inferred from `report_path` when unset.
    pub format: Option<ReportFormat>,
}

/// Output of `analyze`.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub report: CompatibilityReport,
    pub scan_warnings: Vec<ScanWarning>,
    /// Where the rendered report was written, if anywhere.
    pub written_to: Option<PathBuf>,
}

/// Runs gridport operations against one project.
pub struct MigrationRunner<F: FileSystem> {
    fs: Arc<F>,
    config: ConfigManager<F>,
    registry: MappingRegistry,
}

impl MigrationRunner<NativeFileSystem> {
    /// Opens a project directory: loads `gridport.toml` and merges its
    /// custom mappings into the built-in registry.
    pub async fn open(project_root: &Path) -> Result<Self> {
        let root = validate_project_path(project_root).map_err(|e| Error::InvalidProjectRoot {
            path: project_root.to_path_buf(),
            reason: e.to_string(),
        })?;
        let fs = Arc::new(NativeFileSystem::new(&root)?);
        let config = ConfigManager::load_for_project(fs.clone()).await?;
        let mut registry = MappingRegistry::builtin()?;
        let added = config.apply_mappings(&mut registry)?;
        if added > 0 {
            info!("Loaded {} custom mappings", added);
        }
        Ok(Self::with_parts(fs, config, registry))
    }
}

impl<F: FileSystem + 'static> MigrationRunner<F> {
    pub fn with_parts(fs: Arc<F>, config: ConfigManager<F>, registry: MappingRegistry) -> Self {
        Self {
            fs,
            config,
            registry,
        }
    }

    pub fn project_root(&self) -> &Path {
        self.fs.project_root()
    }

    pub fn registry(&self) -> &MappingRegistry {
        &self.registry
    }

    fn backups(&self) -> BackupStore {
        BackupStore::new(self.fs.project_root(), self.config.backup_root())
    }

    /// Configured exclusions plus the backup directory.
    fn excludes(&self) -> Vec<String> {
        let config = self.config.config();
        let mut exclude = config.exclude.clone();
        exclude.push(format!("{}/", config.backup_dir));
        exclude
    }

    async fn scan(&self, only: Option<BTreeSet<PathBuf>>) -> Result<ScanReport> {
        let options = ScanOptions {
            exclude: self.excludes(),
            only,
            ..Default::default()
        };
        Ok(Scanner::new(self.fs.clone(), &self.registry)?
            .with_options(options)
            .scan()
            .await?)
    }

    /// Scans the project and scores it. Never modifies project files.
    pub async fn analyze(&self, options: &AnalyzeOptions) -> Result<Analysis> {
        let scan = self.scan(None).await?;
        let report = analyze_compatibility(&self.registry, &scan);
        info!(
            "Compatibility score {} across {} affected files",
            report.overall_score(),
            report.affected_files
        );

        let written_to = match &options.report_path {
            Some(path) => {
                let format = options
                    .format
                    .unwrap_or_else(|| ReportFormat::from_path(path));
                let rendered = render_report(&report, format)?;
                tokio::fs::write(path, rendered)
                    .await
                    .map_err(|source| Error::FileIo {
                        path: path.clone(),
                        source,
                    })?;
                Some(path.clone())
            }
            None => None,
        };

        Ok(Analysis {
            report,
            scan_warnings: scan.warnings,
            written_to,
        })
    }

    /// Scans the project for the interactive file picker.
    pub async fn scan_project(&self) -> Result<ScanReport> {
        self.scan(None).await
    }

    pub async fn migrate(&self, options: &MigrateOptions) -> Result<MigrationResult> {
        self.migrate_with(options, |_| true).await
    }

    /// Runs a migration. `confirm` is asked once, after the scan, when the
    /// run is interactive and not forced; returning `false` cancels it.
    ///
    /// Only a failure to scan the project is returned as `Err`. Every other
    /// failure is recorded in the result.
    pub async fn migrate_with(
        &self,
        options: &MigrateOptions,
        confirm: impl FnOnce(&ScanReport) -> bool,
    ) -> Result<MigrationResult> {
        let mut result = MigrationResult {
            dry_run: options.dry_run,
            ..Default::default()
        };
        self.check_project_shape(&mut result.warnings).await;

        enter(MigrationStage::Scanning);
        let scan = self.scan(options.only.clone()).await?;
        result.warnings.extend(
            scan.warnings
                .iter()
                .map(|w| format!("{}: {}", w.file_path.display(), w.message)),
        );
        if scan.records.is_empty() {
            info!("No ag-Grid usage found, nothing to migrate");
            enter(MigrationStage::Done);
            result.success = true;
            return Ok(result);
        }

        if options.interactive && !options.force {
            enter(MigrationStage::AwaitingConfirmation);
            if !confirm(&scan) {
                abort(
                    &mut result,
                    MigrationStage::AwaitingConfirmation,
                    "migration cancelled",
                );
                return Ok(result);
            }
        }

        if options.backup && !options.dry_run {
            enter(MigrationStage::BackingUp);
            match self.backups().create().await {
                Ok(path) => result.backup_path = Some(path),
                Err(err) => {
                    abort(
                        &mut result,
                        MigrationStage::BackingUp,
                        format!("backup failed: {}", err),
                    );
                    return Ok(result);
                }
            }
        }

        enter(MigrationStage::GeneratingTransformations);
        for record in &scan.records {
            let edits = generate_all(&self.registry, record);
            result.transformations.extend(edits.transformations);
            result.warnings.extend(edits.warnings);
            result.manual_changes.extend(edits.manual_changes);
        }
        result.files_processed = scan.records.len();
        info!(
            "Generated {} transformations for {} files",
            result.transformations.len(),
            result.files_processed
        );

        if options.dry_run {
            enter(MigrationStage::PreviewingOnly);
            self.preview(&mut result).await;
        } else {
            enter(MigrationStage::Applying);
            self.apply(&mut result).await;

            if self.config.config().manifest.update
                && self.manifest_can_drop_sources(&mut result).await
            {
                enter(MigrationStage::UpdatingManifest);
                let targets = self.config.target_packages(&self.registry);
                match update_package_json(&self.fs, &self.registry, &targets, false).await {
                    Ok(change) => result.manifest = change,
                    Err(err) => result.errors.push(MigrationError {
                        stage: MigrationStage::UpdatingManifest,
                        file_path: Some(PathBuf::from(PACKAGE_JSON)),
                        message: err.to_string(),
                    }),
                }
            }
        }

        enter(MigrationStage::Done);
        result.success = result.errors.is_empty();
        Ok(result)
    }

    /// Source packages leave the manifest only once no file imports them.
    ///
    /// A subset run, or an import with no mapping, leaves imports behind;
    /// the manifest is then kept as is and a warning says why.
    async fn manifest_can_drop_sources(&self, result: &mut MigrationResult) -> bool {
        let remaining = match self.scan(None).await {
            Ok(scan) => scan
                .records
                .iter()
                .filter(|r| !r.imports.is_empty())
                .count(),
            Err(err) => {
                warn!("rescan before manifest update failed: {}", err);
                result.warnings.push(format!(
                    "{} left unchanged: could not rescan the project ({})",
                    PACKAGE_JSON, err
                ));
                return false;
            }
        };
        if remaining > 0 {
            info!("{} files still import the source packages", remaining);
            result.warnings.push(format!(
                "{} left unchanged: {} files still import the source packages",
                PACKAGE_JSON, remaining
            ));
            return false;
        }
        true
    }

    /// Missing project files are warnings, never fatal.
    async fn check_project_shape(&self, warnings: &mut Vec<String>) {
        for (file, consequence) in [
            (PACKAGE_JSON, "dependencies will not be updated"),
            ("angular.json", "this may not be an Angular project"),
        ] {
            if !self.fs.exists(Path::new(file)).await.unwrap_or(false) {
                warn!("{} not found", file);
                warnings.push(format!("{} not found; {}", file, consequence));
            }
        }
    }

    async fn apply(&self, result: &mut MigrationResult) {
        for (path, edits) in group_by_file(&result.transformations) {
            match self.apply_file(&path, &edits).await {
                Ok((modified, mismatches)) => {
                    if modified {
                        result.files_modified += 1;
                    }
                    result.warnings.extend(mismatches);
                }
                Err(err) => {
                    warn!("Failed to migrate {}: {}", path.display(), err);
                    result.errors.push(MigrationError {
                        stage: MigrationStage::Applying,
                        file_path: Some(path),
                        message: err.to_string(),
                    });
                }
            }
        }
        info!("Modified {} files", result.files_modified);
    }

    /// Returns whether the file changed, plus one warning per skipped edit.
    async fn apply_file(
        &self,
        path: &Path,
        edits: &[Transformation],
    ) -> std::result::Result<(bool, Vec<String>), Error> {
        let source = self
            .fs
            .read_to_string(path)
            .await
            .map_err(|source| file_io(path, source))?;
        let applied = apply_transformations(path, &source, edits);
        let mismatches = applied.mismatches.iter().map(ToString::to_string).collect();
        if !applied.changed(&source) {
            return Ok((false, mismatches));
        }
        self.fs
            .write_atomic(path, &applied.contents)
            .await
            .map_err(|source| file_io(path, source))?;
        debug!("{}: {} edits applied", path.display(), applied.applied);
        Ok((true, mismatches))
    }

    async fn preview(&self, result: &mut MigrationResult) {
        for (path, edits) in group_by_file(&result.transformations) {
            let source = match self.fs.read_to_string(&path).await {
                Ok(source) => source,
                Err(e) => {
                    result.errors.push(MigrationError {
                        stage: MigrationStage::PreviewingOnly,
                        file_path: Some(path.clone()),
                        message: file_io(&path, e).to_string(),
                    });
                    continue;
                }
            };
            let applied = apply_transformations(&path, &source, &edits);
            result
                .warnings
                .extend(applied.mismatches.iter().map(ToString::to_string));
            if applied.changed(&source) {
                result.files_modified += 1;
                result.previews.push(FilePreview {
                    diff: render_diff(&path, &source, &applied.contents),
                    file_path: path,
                });
            }
        }
    }

    /// Restores the project from a backup, the latest one by default.
    pub async fn rollback(&self, backup: Option<&Path>) -> Result<RestoreSummary> {
        let store = self.backups();
        let backup = store.resolve(backup).await?;
        info!("Rolling back from {}", backup.display());
        store.restore(&backup).await
    }

    /// Completed backups, oldest first.
    pub async fn list_backups(&self) -> Result<Vec<PathBuf>> {
        self.backups().list().await
    }

    pub async fn validate(&self) -> Result<ValidationReport> {
        Validator::new(
            self.fs.clone(),
            &self.registry,
            &self.config.config().validation,
        )?
        .with_exclude(self.excludes())
        .validate()
        .await
    }
}

fn enter(stage: MigrationStage) {
    debug!("Stage: {}", stage);
}

fn abort(result: &mut MigrationResult, stage: MigrationStage, message: impl Into<String>) {
    let message = message.into();
    warn!("Migration stopped while {}: {}", stage, message);
    result.errors.push(MigrationError {
        stage,
        file_path: None,
        message,
    });
    result.failed_stage = Some(stage);
    result.success = false;
}

fn file_io(path: &Path, source: std::io::Error) -> Error {
    Error::FileIo {
        path: path.to_path_buf(),
        source,
    }
}
