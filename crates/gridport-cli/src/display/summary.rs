//! Human-readable summaries of scan, migration and validation results.
//!
//! Every function returns the text instead of printing it.

use colored::*;
use gridport_core::{
    FilePreview, MigrationResult, ScanReport, ScanWarning, Severity, ValidationFinding,
    ValidationReport,
};
use std::fmt::Write;

/// What the scanner found, shown before the confirmation prompt.
pub fn format_scan_summary(scan: &ScanReport) -> String {
    let mut out = String::new();
    let usages: usize = scan.records.iter().map(|r| r.usage_count()).sum();
    let _ = writeln!(
        out,
        "{} {} usages in {} of {} scanned files",
        "Found".bold(),
        usages,
        scan.records.len(),
        scan.files_scanned
    );
    for record in &scan.records {
        let _ = writeln!(
            out,
            "  {} ({})",
            record.file_path.display(),
            record.usage_count()
        );
    }
    out.push_str(&format_scan_warnings(&scan.warnings));
    out
}

/// Files the scanner had to skip.
pub fn format_scan_warnings(warnings: &[ScanWarning]) -> String {
    let mut out = String::new();
    if warnings.is_empty() {
        return out;
    }
    let _ = writeln!(out, "\n{}", format!("Skipped {} files:", warnings.len()).yellow());
    for warning in warnings {
        let _ = writeln!(out, "  {}: {}", warning.file_path.display(), warning.message);
    }
    out
}

/// Dry-run diffs, with added and removed lines colored.
pub fn format_previews(previews: &[FilePreview]) -> String {
    let mut out = String::new();
    for preview in previews {
        for line in preview.diff.lines() {
            let painted = if line.starts_with("---") || line.starts_with("+++") {
                line.bold()
            } else if line.starts_with("@@") {
                line.cyan()
            } else if line.starts_with('-') {
                line.red()
            } else if line.starts_with('+') {
                line.green()
            } else {
                line.normal()
            };
            let _ = writeln!(out, "{}", painted);
        }
        out.push('\n');
    }
    out
}

pub fn format_migration(result: &MigrationResult) -> String {
    let mut out = String::new();

    let headline = match (result.success, result.dry_run) {
        (true, true) => format!("{} Dry run complete, nothing was written", "✓".green()),
        (true, false) => format!("{} Migration complete", "✓".green()),
        (false, _) => match result.failed_stage {
            Some(stage) => format!("{} Migration stopped while {}", "✗".red(), stage),
            None => format!("{} Migration finished with errors", "✗".red()),
        },
    };
    let _ = writeln!(out, "{}", headline.bold());

    let verb = if result.dry_run { "would change" } else { "changed" };
    let _ = writeln!(
        out,
        "  {} files processed, {} {}, {} edits",
        result.files_processed,
        result.files_modified,
        verb,
        result.transformations.len()
    );
    if let Some(backup) = &result.backup_path {
        let _ = writeln!(out, "  Backup: {}", backup.display());
    }
    if let Some(manifest) = &result.manifest {
        if !manifest.removed.is_empty() {
            let _ = writeln!(out, "  Removed packages: {}", manifest.removed.join(", "));
        }
        if !manifest.added.is_empty() {
            let _ = writeln!(out, "  Added packages: {}", manifest.added.join(", "));
        }
    }

    if !result.errors.is_empty() {
        let _ = writeln!(out, "\n{}", "Errors:".red().bold());
        for error in &result.errors {
            match &error.file_path {
                Some(path) => {
                    let _ = writeln!(out, "  [{}] {}: {}", error.stage, path.display(), error.message);
                }
                None => {
                    let _ = writeln!(out, "  [{}] {}", error.stage, error.message);
                }
            }
        }
    }

    if !result.warnings.is_empty() {
        let _ = writeln!(out, "\n{}", "Warnings:".yellow().bold());
        for warning in &result.warnings {
            let _ = writeln!(out, "  {}", warning);
        }
    }

    if !result.manual_changes.is_empty() {
        let _ = writeln!(
            out,
            "\n{}",
            format!("Manual changes required ({}):", result.manual_changes.len()).bold()
        );
        let mut changes: Vec<_> = result.manual_changes.iter().collect();
        changes.sort_by_key(|c| (c.priority, c.file_path.clone(), c.location));
        for change in changes {
            let _ = writeln!(
                out,
                "  [{}] {}:{} {}",
                change.priority.as_str(),
                change.file_path.display(),
                change.location,
                change.description
            );
        }
    }

    out
}

pub fn format_validation(report: &ValidationReport) -> String {
    let mut out = String::new();

    for check in &report.checks {
        let marker = if check.passed { "✓".green() } else { "✗".red() };
        let _ = writeln!(out, "{} {}", marker, check.name.bold());
        for finding in &check.findings {
            let _ = writeln!(out, "    {}", format_finding(finding));
        }
    }

    let errors = report.count(Severity::Error);
    let warnings = report.count(Severity::Warning);
    let verdict = if report.passed {
        "Validation passed".green().bold()
    } else {
        "Validation failed".red().bold()
    };
    let _ = writeln!(out, "\n{} ({} errors, {} warnings)", verdict, errors, warnings);
    out
}

fn format_finding(finding: &ValidationFinding) -> String {
    let label = match finding.severity {
        Severity::Error => "error".red(),
        Severity::Warning => "warning".yellow(),
        Severity::Info => "info".blue(),
    };
    let place = match (&finding.file_path, finding.line) {
        (Some(path), Some(line)) => format!("{}:{}: ", path.display(), line),
        (Some(path), None) => format!("{}: ", path.display()),
        _ => String::new(),
    };
    format!("{}: {}{}", label, place, finding.message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridport_core::{
        CheckResult, Location, ManifestChange, ManualChange, MigrationError, MigrationStage,
        Priority,
    };
    use std::path::PathBuf;

    fn plain() {
        colored::control::set_override(false);
    }

    #[test]
    fn test_successful_migration_summary() {
        plain();
        let result = MigrationResult {
            success: true,
            files_processed: 3,
            files_modified: 2,
            backup_path: Some(PathBuf::from(".migration-backups/backup-1")),
            manifest: Some(ManifestChange {
                removed: vec!["ag-grid-angular".into()],
                added: vec!["@tessera/grid".into()],
            }),
            manual_changes: vec![
                ManualChange {
                    file_path: PathBuf::from("b.ts"),
                    location: Location::new(4, 1),
                    feature: "api".into(),
                    description: "Replace gridApi.exportDataAsExcel".into(),
                    priority: Priority::Low,
                },
                ManualChange {
                    file_path: PathBuf::from("a.ts"),
                    location: Location::new(9, 3),
                    feature: "config".into(),
                    description: "Port enterprise pivoting".into(),
                    priority: Priority::High,
                },
            ],
            ..Default::default()
        };

        let text = format_migration(&result);

        assert!(text.starts_with("✓ Migration complete\n"));
        assert!(text.contains("3 files processed, 2 changed, 0 edits"));
        assert!(text.contains("Backup: .migration-backups/backup-1"));
        assert!(text.contains("Removed packages: ag-grid-angular"));
        assert!(text.contains("Added packages: @tessera/grid"));
        let high = text.find("[high] a.ts:").unwrap();
        let low = text.find("[low] b.ts:").unwrap();
        assert!(high < low);
    }

    #[test]
    fn test_stopped_migration_names_the_stage() {
        plain();
        let result = MigrationResult {
            success: false,
            failed_stage: Some(MigrationStage::AwaitingConfirmation),
            errors: vec![MigrationError {
                stage: MigrationStage::AwaitingConfirmation,
                file_path: None,
                message: "migration cancelled".into(),
            }],
            ..Default::default()
        };

        let text = format_migration(&result);

        assert!(text.starts_with("✗ Migration stopped while awaiting confirmation\n"));
        assert!(text.contains("[awaiting confirmation] migration cancelled"));
    }

    #[test]
    fn test_validation_summary() {
        plain();
        let report = ValidationReport::new(vec![
            CheckResult::from_findings("typecheck", vec![]),
            CheckResult::from_findings(
                "residual-imports",
                vec![ValidationFinding {
                    severity: Severity::Error,
                    file_path: Some(PathBuf::from("src/a.ts")),
                    line: Some(1),
                    message: "import from ag-grid-angular".into(),
                }],
            ),
        ]);

        let text = format_validation(&report);

        assert!(text.contains("✓ typecheck\n"));
        assert!(text.contains("✗ residual-imports\n"));
        assert!(text.contains("    error: src/a.ts:1: import from ag-grid-angular"));
        assert!(text.contains("Validation failed (1 errors, 0 warnings)"));
    }

    #[test]
    fn test_previews_keep_diff_lines() {
        plain();
        let previews = vec![FilePreview {
            file_path: PathBuf::from("a.ts"),
            diff: "--- a/a.ts\n+++ b/a.ts\n@@ -1,1 +1,1 @@\n-x\n+y\n".into(),
        }];
        assert_eq!(
            format_previews(&previews),
            "--- a/a.ts\n+++ b/a.ts\n@@ -1,1 +1,1 @@\n-x\n+y\n\n"
        );
    }
}
