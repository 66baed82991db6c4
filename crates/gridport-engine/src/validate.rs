//! Post-migration validation.
//!
//! Four checks run concurrently: the project's type-checker and production
//! build as subprocesses, and two text re-scans for leftovers of the source
//! library. Each check yields a [`CheckResult`]; the project passes when no
//! check produced an `error` finding.

use crate::Result;
use gridport_config::ValidationSettings;
use gridport_core::{
    split_binding, CheckResult, Error, MappingRegistry, Severity, ValidationFinding,
    ValidationReport,
};
use gridport_fs::FileSystem;
use gridport_scanner::text::{class_tokens, LineIndex};
use gridport_scanner::{FileGroup, Scanner};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::process::Command;
use tracing::{debug, info};

pub const TYPECHECK_CHECK: &str = "typecheck";
pub const BUILD_CHECK: &str = "build";
pub const RESIDUAL_IMPORTS_CHECK: &str = "residual-imports";
pub const RESIDUAL_TEMPLATES_CHECK: &str = "residual-templates";

/// Compiler config that gates the typecheck.
pub const TYPECHECK_CONFIG: &str = "tsconfig.json";
/// Build config that gates the production build.
pub const BUILD_CONFIG: &str = "angular.json";

/// Compiled patterns for the residual checks.
struct ResidualPatterns {
    import_source: Regex,
    source_symbol: Option<Regex>,
    source_tag: Option<Regex>,
    target_tag: Option<Regex>,
    attribute_name: Regex,
}

impl ResidualPatterns {
    fn new(registry: &MappingRegistry) -> Result<Self> {
        let alternation = |names: Vec<&str>| -> Option<String> {
            if names.is_empty() {
                None
            } else {
                Some(
                    names
                        .into_iter()
                        .map(regex::escape)
                        .collect::<Vec<_>>()
                        .join("|"),
                )
            }
        };

        let source_symbol = alternation(registry.source_symbols().collect())
            .map(|alt| compile(&format!(r"\b(?:{})\b", alt)))
            .transpose()?;
        let source_tag = alternation(registry.source_selectors().collect())
            .map(|alt| compile(&format!(r"<({})(?:[\s/>]|$)", alt)))
            .transpose()?;
        let target_tag = alternation(registry.target_selectors().into_iter().collect())
            .map(|alt| compile(&format!(r"<({})((?:\s[^>]*)?)>", alt)))
            .transpose()?;

        Ok(Self {
            import_source: compile(
                r#"(?:\bfrom|\bimport\s*\(?|\brequire\s*\()\s*['"]([^'"]+)['"]"#,
            )?,
            source_symbol,
            source_tag,
            target_tag,
            attribute_name: compile(r#"(?:^|\s)([\[(]*[A-Za-z_@#*][\w.:@#*-]*[\])]*)"#)?,
        })
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::InvalidMapping(e.to_string()).into())
}

fn finding(
    severity: Severity,
    file_path: Option<&Path>,
    line: Option<u32>,
    message: impl Into<String>,
) -> ValidationFinding {
    ValidationFinding {
        severity,
        file_path: file_path.map(Path::to_path_buf),
        line,
        message: message.into(),
    }
}

/// Runs the validation checks against one project.
pub struct Validator<'a, F: FileSystem> {
    fs: Arc<F>,
    registry: &'a MappingRegistry,
    settings: &'a ValidationSettings,
    exclude: Vec<String>,
    patterns: ResidualPatterns,
}

impl<'a, F: FileSystem> Validator<'a, F> {
    pub fn new(
        fs: Arc<F>,
        registry: &'a MappingRegistry,
        settings: &'a ValidationSettings,
    ) -> Result<Self> {
        Ok(Self {
            fs,
            registry,
            settings,
            exclude: Vec::new(),
            patterns: ResidualPatterns::new(registry)?,
        })
    }

    /// Extra exclusions for the residual re-scans.
    pub fn with_exclude(mut self, exclude: Vec<String>) -> Self {
        self.exclude = exclude;
        self
    }

    pub async fn validate(&self) -> Result<ValidationReport> {
        let files = Scanner::new(self.fs.clone(), self.registry)?
            .with_options(gridport_scanner::ScanOptions {
                exclude: self.exclude.clone(),
                ..Default::default()
            })
            .discover()
            .await?;
        let scripts: Vec<PathBuf> = files
            .iter()
            .filter(|p| FileGroup::from_path(p) == Some(FileGroup::Script))
            .cloned()
            .collect();
        let markup: Vec<PathBuf> = files
            .iter()
            .filter(|p| {
                matches!(
                    FileGroup::from_path(p),
                    Some(FileGroup::Template | FileGroup::Script)
                )
            })
            .cloned()
            .collect();

        let (typecheck, build, imports, templates) = futures::join!(
            self.external_check(
                TYPECHECK_CHECK,
                TYPECHECK_CONFIG,
                &self.settings.typecheck_command
            ),
            self.external_check(BUILD_CHECK, BUILD_CONFIG, &self.settings.build_command),
            self.residual_imports(&scripts),
            self.residual_templates(&markup),
        );

        let report = ValidationReport::new(vec![typecheck, build, imports, templates]);
        info!(
            "Validation {}: {} errors, {} warnings",
            if report.passed { "passed" } else { "failed" },
            report.count(Severity::Error),
            report.count(Severity::Warning)
        );
        Ok(report)
    }

    /// Runs an external tool. A missing config file skips the tool with a
    /// warning instead of failing.
    async fn external_check(&self, name: &str, config_file: &str, argv: &[String]) -> CheckResult {
        if !self.fs.exists(Path::new(config_file)).await.unwrap_or(false) {
            return CheckResult::from_findings(
                name,
                vec![finding(
                    Severity::Warning,
                    None,
                    None,
                    format!("{} not found, {} skipped", config_file, name),
                )],
            );
        }
        let Some((program, args)) = argv.split_first() else {
            return CheckResult::from_findings(
                name,
                vec![finding(
                    Severity::Warning,
                    None,
                    None,
                    format!("no {} command configured", name),
                )],
            );
        };

        let command = argv.join(" ");
        debug!("Running `{}`", command);
        let output = Command::new(program)
            .args(args)
            .current_dir(self.fs.project_root())
            .kill_on_drop(true)
            .output()
            .await;

        let findings = match output {
            Ok(output) if output.status.success() => Vec::new(),
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout);
                let stderr = String::from_utf8_lossy(&output.stderr);
                let mut findings: Vec<ValidationFinding> =
                    error_lines(&stdout, &stderr, &self.settings.error_marker)
                        .map(|line| finding(Severity::Error, None, None, line))
                        .collect();
                if findings.is_empty() {
                    let err = Error::ExternalProcess {
                        command,
                        message: format!("exited with {}", output.status),
                    };
                    findings.push(finding(Severity::Error, None, None, err.to_string()));
                }
                findings
            }
            Err(e) => {
                let err = Error::ExternalProcess {
                    command,
                    message: e.to_string(),
                };
                vec![finding(Severity::Error, None, None, err.to_string())]
            }
        };
        CheckResult::from_findings(name, findings)
    }

    async fn residual_imports(&self, files: &[PathBuf]) -> CheckResult {
        let mut findings = Vec::new();
        for path in files {
            let Some(source) = self.read(path, &mut findings).await else {
                continue;
            };
            findings.extend(residual_import_findings(
                &self.patterns,
                self.registry,
                path,
                &source,
            ));
        }
        CheckResult::from_findings(RESIDUAL_IMPORTS_CHECK, findings)
    }

    async fn residual_templates(&self, files: &[PathBuf]) -> CheckResult {
        let mut findings = Vec::new();
        for path in files {
            let Some(source) = self.read(path, &mut findings).await else {
                continue;
            };
            findings.extend(residual_template_findings(
                &self.patterns,
                self.registry,
                path,
                &source,
            ));
        }
        CheckResult::from_findings(RESIDUAL_TEMPLATES_CHECK, findings)
    }

    async fn read(&self, path: &Path, findings: &mut Vec<ValidationFinding>) -> Option<String> {
        match self.fs.read_to_string(path).await {
            Ok(source) => Some(source),
            Err(e) => {
                findings.push(finding(
                    Severity::Warning,
                    Some(path),
                    None,
                    format!("could not read file: {}", e),
                ));
                None
            }
        }
    }
}

/// Output lines containing the error marker, compared case-insensitively.
fn error_lines<'s>(
    stdout: &'s str,
    stderr: &'s str,
    marker: &str,
) -> impl Iterator<Item = String> + 's {
    let marker = marker.to_lowercase();
    stdout
        .lines()
        .chain(stderr.lines())
        .filter(move |line| !marker.is_empty() && line.to_lowercase().contains(&marker))
        .map(|line| line.trim().to_string())
}

fn residual_import_findings(
    patterns: &ResidualPatterns,
    registry: &MappingRegistry,
    path: &Path,
    source: &str,
) -> Vec<ValidationFinding> {
    let mut findings = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let line_no = Some(index as u32 + 1);
        for caps in patterns.import_source.captures_iter(line) {
            let module = &caps[1];
            if registry.is_source_package(module) {
                findings.push(finding(
                    Severity::Error,
                    Some(path),
                    line_no,
                    format!("import from '{}' was not migrated", module),
                ));
            }
        }
        if let Some(symbol) = &patterns.source_symbol {
            for m in symbol.find_iter(line) {
                // `TgColumnDef as ColDef` keeps the old local name on purpose
                if line[..m.start()].trim_end().ends_with(" as") {
                    continue;
                }
                findings.push(finding(
                    Severity::Warning,
                    Some(path),
                    line_no,
                    format!("leftover symbol `{}`", m.as_str()),
                ));
            }
        }
    }
    findings
}

fn residual_template_findings(
    patterns: &ResidualPatterns,
    registry: &MappingRegistry,
    path: &Path,
    source: &str,
) -> Vec<ValidationFinding> {
    let index = LineIndex::new(source);
    let mut findings = Vec::new();

    if let Some(tag) = &patterns.source_tag {
        for caps in tag.captures_iter(source) {
            let Some(m) = caps.get(1) else { continue };
            findings.push(finding(
                Severity::Error,
                Some(path),
                Some(index.location(m.start()).line),
                format!("component <{}> was not migrated", m.as_str()),
            ));
        }
    }

    for (offset, token) in class_tokens(source) {
        if is_theme_class(registry, token) {
            findings.push(finding(
                Severity::Warning,
                Some(path),
                Some(index.location(offset).line),
                format!("leftover theme class `{}`", token),
            ));
        }
    }

    if let Some(tag) = &patterns.target_tag {
        for caps in tag.captures_iter(source) {
            let (Some(name), Some(body)) = (caps.get(1), caps.get(2)) else {
                continue;
            };
            let present: Vec<&str> = patterns
                .attribute_name
                .captures_iter(body.as_str())
                .filter_map(|c| c.get(1))
                .map(|m| split_binding(m.as_str()).1)
                .collect();
            for required in registry.required_attributes(name.as_str()) {
                if !present.contains(&required.as_str()) {
                    findings.push(finding(
                        Severity::Warning,
                        Some(path),
                        Some(index.location(name.start()).line),
                        format!("<{}> is missing required binding `{}`", name.as_str(), required),
                    ));
                }
            }
        }
    }
    findings
}

/// Library class whose name continues with `theme` after its prefix.
fn is_theme_class(registry: &MappingRegistry, token: &str) -> bool {
    registry.is_library_css_class(token)
        && registry.css_prefixes().iter().any(|prefix| {
            token
                .strip_prefix(prefix.as_str())
                .is_some_and(|rest| rest.starts_with("theme"))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> (MappingRegistry, ResidualPatterns) {
        let registry = MappingRegistry::builtin().unwrap();
        let patterns = ResidualPatterns::new(&registry).unwrap();
        (registry, patterns)
    }

    #[test]
    fn test_residual_imports() {
        let (registry, patterns) = setup();
        let source = "import { TgGridComponent as AgGridAngular } from '@tessera/grid';\n\
                      import { GridApi } from 'ag-grid-community';\n\
                      const api: TgGridApi = x;\n";
        let findings = residual_import_findings(&patterns, &registry, Path::new("a.ts"), source);

        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].severity, Severity::Error);
        assert_eq!(findings[0].line, Some(2));
        assert!(findings[0].message.contains("ag-grid-community"));
        assert_eq!(findings[1].severity, Severity::Warning);
        assert!(findings[1].message.contains("`GridApi`"));
    }

    #[test]
    fn test_residual_subpath_imports_are_errors() {
        let (registry, patterns) = setup();
        let source = "import 'ag-grid-community/styles/ag-grid.css';\n\
                      import { TgColumnDef } from 'ag-grid-community/dist/types';\n";
        let findings = residual_import_findings(&patterns, &registry, Path::new("a.ts"), source);

        let errors: Vec<_> = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .map(|f| f.line)
            .collect();
        assert_eq!(errors, vec![Some(1), Some(2)]);
        assert!(findings[0].message.contains("ag-grid-community/styles/ag-grid.css"));
    }

    #[test]
    fn test_residual_templates() {
        let (registry, patterns) = setup();
        let source = "<div class=\"ag-theme-alpine\">\n\
                      <ag-grid-angular [rowData]=\"rows\"></ag-grid-angular>\n\
                      <tg-grid\n  [data]=\"rows\"></tg-grid>\n\
                      </div>\n";
        let findings =
            residual_template_findings(&patterns, &registry, Path::new("a.html"), source);

        let summary: Vec<(Severity, Option<u32>)> =
            findings.iter().map(|f| (f.severity, f.line)).collect();
        assert_eq!(
            summary,
            vec![
                (Severity::Error, Some(2)),
                (Severity::Warning, Some(1)),
                (Severity::Warning, Some(3)),
            ]
        );
        assert!(findings[2].message.contains("`columns`"));
    }

    #[test]
    fn test_complete_target_tag_passes() {
        let (registry, patterns) = setup();
        let source = "<tg-grid [data]=\"rows\" [columns]=\"cols\" (rowClick)=\"go($event)\"></tg-grid>\n";
        let findings =
            residual_template_findings(&patterns, &registry, Path::new("a.html"), source);
        assert!(findings.is_empty());
    }

    #[test]
    fn test_error_lines_match_marker() {
        let lines: Vec<String> = error_lines(
            "Building...\nERROR in src/app.ts: cannot find module\n",
            "  error TS2304: Cannot find name 'x'.\n",
            "ERROR",
        )
        .collect();
        assert_eq!(
            lines,
            vec![
                "ERROR in src/app.ts: cannot find module".to_string(),
                "error TS2304: Cannot find name 'x'.".to_string(),
            ]
        );
    }
}
