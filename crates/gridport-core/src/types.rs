//! Core data types shared by the scanner, generators, analyzer and runner.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Position in a source file. Lines and columns are 1-based; columns count bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Location {
    pub line: u32,
    pub col: u32,
}

impl Location {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// Location used when only the line is known.
    pub fn start_of_line(line: u32) -> Self {
        Self { line, col: 1 }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

// ---------------------------------------------------------------------------
// Usage records
// ---------------------------------------------------------------------------

/// Shape of one imported binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    /// `import X from '...'`
    Default,
    /// `import * as X from '...'`
    Namespace,
    /// `import { A, B as C } from '...'`
    Named,
}

/// A single binding introduced by an import declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportedName {
    pub kind: ImportKind,
    /// Exported name (`default` / `*` for default and namespace imports).
    pub imported: String,
    /// Local binding name.
    pub local: String,
    /// Inline `type` modifier (`import { type ColDef }`).
    #[serde(default)]
    pub type_only: bool,
    pub location: Location,
}

impl ImportedName {
    pub fn is_aliased(&self) -> bool {
        self.kind == ImportKind::Named && self.imported != self.local
    }
}

/// An import declaration whose source belongs to the source library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportUsage {
    #[serde(flatten)]
    pub location: Location,
    pub module_source: String,
    /// The module string literal as written, quotes included.
    pub source_raw: String,
    pub source_location: Location,
    pub imported_names: Vec<ImportedName>,
    pub type_only: bool,
    pub raw_text: String,
}

/// One attribute on a component element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentAttribute {
    /// Attribute name as written, binding syntax included (`[rowData]`).
    pub name: String,
    pub value: Option<String>,
    pub raw_text: String,
    pub location: Location,
}

/// A component element whose tag belongs to the source library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentUsage {
    #[serde(flatten)]
    pub location: Location,
    pub selector: String,
    pub attributes: Vec<ComponentAttribute>,
    /// Opening tag text.
    pub raw_text: String,
    pub self_closing: bool,
    /// Location of the matching `</selector` when it was found.
    pub closing: Option<Location>,
}

/// Where a configuration property was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfigKind {
    /// Key of an object literal (grid options). The key itself is renamed.
    GridOption,
    /// Class property or variable holding column definitions. Only the value is rewritten.
    ColumnBinding,
}

/// Structured value of a configuration property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ConfigValue {
    String(String),
    Bool(bool),
    /// Numeric literal, kept as written.
    Number(String),
    Object(Vec<ConfigProperty>),
    Array(Vec<ConfigValue>),
    /// Anything else, as source text.
    Expression(String),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// A `key: value` pair inside an object literal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigProperty {
    /// Static key name.
    pub name: String,
    /// Key as written (may be quoted).
    pub key_text: String,
    pub value: ConfigValue,
    /// Property source text, `key: value`.
    pub raw_text: String,
    pub location: Location,
    /// Whether the property spans more than one line.
    pub multiline: bool,
}

/// A recognised grid configuration property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigUsage {
    #[serde(flatten)]
    pub property: ConfigProperty,
    pub config_kind: ConfigKind,
}

impl ConfigUsage {
    pub fn property_name(&self) -> &str {
        &self.property.name
    }

    pub fn location(&self) -> Location {
        self.property.location
    }
}

/// A method call on a grid API handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiCallUsage {
    #[serde(flatten)]
    pub location: Location,
    /// Right-most identifier of the receiver (`gridApi` in `this.gridApi.x()`).
    pub receiver: String,
    pub method_name: String,
    /// Argument source text.
    pub args: Vec<String>,
}

/// Kind of text a class name was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CssContext {
    /// CSS / SCSS / Sass selector.
    Stylesheet,
    /// HTML class attribute.
    Markup,
    /// String literal in TS/JS.
    Script,
}

/// A library CSS class reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CssClassUsage {
    #[serde(flatten)]
    pub location: Location,
    pub class_name: String,
    pub context: CssContext,
}

/// Per-file inventory of source-library constructs.
///
/// Only records with at least one non-empty list are kept by the scanner.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UsageRecord {
    /// Path relative to the project root.
    pub file_path: PathBuf,
    pub imports: Vec<ImportUsage>,
    pub components: Vec<ComponentUsage>,
    pub configs: Vec<ConfigUsage>,
    pub api_calls: Vec<ApiCallUsage>,
    pub css_classes: Vec<CssClassUsage>,
}

impl UsageRecord {
    pub fn new(file_path: impl Into<PathBuf>) -> Self {
        Self {
            file_path: file_path.into(),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.imports.is_empty()
            && self.components.is_empty()
            && self.configs.is_empty()
            && self.api_calls.is_empty()
            && self.css_classes.is_empty()
    }

    /// Total number of constructs in this record.
    pub fn usage_count(&self) -> usize {
        self.imports.len()
            + self.components.len()
            + self.configs.len()
            + self.api_calls.len()
            + self.css_classes.len()
    }

    /// Every construct, in a fixed kind order.
    pub fn constructs(&self) -> impl Iterator<Item = Construct<'_>> {
        self.imports
            .iter()
            .map(Construct::Import)
            .chain(self.components.iter().map(Construct::Component))
            .chain(self.configs.iter().map(Construct::Config))
            .chain(self.api_calls.iter().map(Construct::ApiCall))
            .chain(self.css_classes.iter().map(Construct::CssClass))
    }
}

/// One detected construct, borrowed from a [`UsageRecord`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Construct<'a> {
    Import(&'a ImportUsage),
    Component(&'a ComponentUsage),
    Config(&'a ConfigUsage),
    ApiCall(&'a ApiCallUsage),
    CssClass(&'a CssClassUsage),
}

impl Construct<'_> {
    pub fn location(&self) -> Location {
        match self {
            Construct::Import(u) => u.location,
            Construct::Component(u) => u.location,
            Construct::Config(u) => u.location(),
            Construct::ApiCall(u) => u.location,
            Construct::CssClass(u) => u.location,
        }
    }
}

/// A per-file problem met while scanning. The file was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    pub file_path: PathBuf,
    pub message: String,
}

/// Output of a project scan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ScanReport {
    pub records: Vec<UsageRecord>,
    pub files_scanned: usize,
    pub warnings: Vec<ScanWarning>,
}

// ---------------------------------------------------------------------------
// Transformations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransformationKind {
    Import,
    Component,
    ClosingTag,
    Attribute,
    Config,
    Column,
    CssClass,
}

/// A literal, line-local text edit.
///
/// `old_text` must occur on `location.line` when the edit is applied; the
/// runner tries `location.col` first and falls back to the first occurrence
/// on the line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transformation {
    pub file_path: PathBuf,
    pub kind: TransformationKind,
    #[serde(flatten)]
    pub location: Location,
    pub old_text: String,
    pub new_text: String,
    pub description: String,
}

/// Priority of a manual follow-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

/// Something the developer has to migrate by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualChange {
    pub file_path: PathBuf,
    pub location: Location,
    pub feature: String,
    pub description: String,
    pub priority: Priority,
}

// ---------------------------------------------------------------------------
// Migration results
// ---------------------------------------------------------------------------

/// Runner stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MigrationStage {
    Idle,
    Scanning,
    AwaitingConfirmation,
    BackingUp,
    GeneratingTransformations,
    Applying,
    PreviewingOnly,
    UpdatingManifest,
    Done,
}

impl MigrationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MigrationStage::Idle => "idle",
            MigrationStage::Scanning => "scanning",
            MigrationStage::AwaitingConfirmation => "awaiting confirmation",
            MigrationStage::BackingUp => "backing up",
            MigrationStage::GeneratingTransformations => "generating transformations",
            MigrationStage::Applying => "applying",
            MigrationStage::PreviewingOnly => "previewing",
            MigrationStage::UpdatingManifest => "updating manifest",
            MigrationStage::Done => "done",
        }
    }
}

impl fmt::Display for MigrationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded failure inside a migrate run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationError {
    pub stage: MigrationStage,
    pub file_path: Option<PathBuf>,
    pub message: String,
}

/// Package changes written to the dependency manifest.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ManifestChange {
    pub removed: Vec<String>,
    pub added: Vec<String>,
}

/// Outcome of one `migrate` invocation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MigrationResult {
    pub success: bool,
    pub dry_run: bool,
    pub files_processed: usize,
    pub files_modified: usize,
    pub errors: Vec<MigrationError>,
    pub warnings: Vec<String>,
    pub transformations: Vec<Transformation>,
    pub manual_changes: Vec<ManualChange>,
    pub backup_path: Option<PathBuf>,
    pub manifest: Option<ManifestChange>,
    /// Per-file diffs of a dry run.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub previews: Vec<FilePreview>,
    /// Stage that aborted the run, if any.
    pub failed_stage: Option<MigrationStage>,
}

/// Unified-diff style preview of one file's pending edits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilePreview {
    pub file_path: PathBuf,
    pub diff: String,
}

// ---------------------------------------------------------------------------
// Compatibility report
// ---------------------------------------------------------------------------

/// How well a feature translates to the target library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SupportStatus {
    Supported,
    Partial,
    Unsupported,
}

impl SupportStatus {
    /// Weight used by the overall score.
    pub fn weight(&self) -> f64 {
        match self {
            SupportStatus::Supported => 1.0,
            SupportStatus::Partial => 0.7,
            SupportStatus::Unsupported => 0.0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SupportStatus::Supported => "supported",
            SupportStatus::Partial => "partial",
            SupportStatus::Unsupported => "unsupported",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCompatibility {
    pub feature: String,
    pub status: SupportStatus,
    /// Number of observed occurrences across all files.
    pub usage_count: usize,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migration_notes: Option<String>,
}

/// Number of distinct features per status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompatibilityBreakdown {
    pub full: usize,
    pub partial: usize,
    pub unsupported: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Low,
    Medium,
    High,
}

impl Complexity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Complexity::Low => "low",
            Complexity::Medium => "medium",
            Complexity::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffortEstimate {
    pub complexity: Complexity,
    pub estimated_time: String,
    pub automatic_points: u32,
    pub manual_points: u32,
    pub total_points: u32,
    pub automatic_percentage: u32,
    pub manual_percentage: u32,
}

/// Scored summary of a project's usage of the source library.
///
/// `overall_score` and `compatibility` are derived from `features` by
/// [`CompatibilityReport::new`] and cannot be set independently. A
/// deserialized report recomputes both and ignores the stored values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ReportFields")]
pub struct CompatibilityReport {
    overall_score: u32,
    pub total_files: usize,
    pub affected_files: usize,
    compatibility: CompatibilityBreakdown,
    pub features: Vec<FeatureCompatibility>,
    pub manual_changes: Vec<ManualChange>,
    pub estimated_effort: EffortEstimate,
}

impl CompatibilityReport {
    pub fn new(
        total_files: usize,
        affected_files: usize,
        features: Vec<FeatureCompatibility>,
        manual_changes: Vec<ManualChange>,
        estimated_effort: EffortEstimate,
    ) -> Self {
        let overall_score = weighted_score(&features);
        let mut compatibility = CompatibilityBreakdown::default();
        for feature in &features {
            match feature.status {
                SupportStatus::Supported => compatibility.full += 1,
                SupportStatus::Partial => compatibility.partial += 1,
                SupportStatus::Unsupported => compatibility.unsupported += 1,
            }
        }

        Self {
            overall_score,
            total_files,
            affected_files,
            compatibility,
            features,
            manual_changes,
            estimated_effort,
        }
    }

    pub fn overall_score(&self) -> u32 {
        self.overall_score
    }

    pub fn compatibility(&self) -> CompatibilityBreakdown {
        self.compatibility
    }
}

/// The independent fields of a serialized [`CompatibilityReport`].
#[derive(Deserialize)]
struct ReportFields {
    total_files: usize,
    affected_files: usize,
    features: Vec<FeatureCompatibility>,
    manual_changes: Vec<ManualChange>,
    estimated_effort: EffortEstimate,
}

impl From<ReportFields> for CompatibilityReport {
    fn from(fields: ReportFields) -> Self {
        Self::new(
            fields.total_files,
            fields.affected_files,
            fields.features,
            fields.manual_changes,
            fields.estimated_effort,
        )
    }
}

/// `round(Σ weight × count / Σ count × 100)`; 100 when nothing was observed.
pub fn weighted_score(features: &[FeatureCompatibility]) -> u32 {
    let total: usize = features.iter().map(|f| f.usage_count).sum();
    if total == 0 {
        return 100;
    }
    let weighted: f64 = features
        .iter()
        .map(|f| f.status.weight() * f.usage_count as f64)
        .sum();
    (weighted / total as f64 * 100.0).round() as u32
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub severity: Severity,
    pub file_path: Option<PathBuf>,
    pub line: Option<u32>,
    pub message: String,
}

/// Result of one validation check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub findings: Vec<ValidationFinding>,
}

impl CheckResult {
    /// Builds a result whose `passed` flag follows from the findings.
    pub fn from_findings(name: impl Into<String>, findings: Vec<ValidationFinding>) -> Self {
        let passed = !findings.iter().any(|f| f.severity == Severity::Error);
        Self {
            name: name.into(),
            passed,
            findings,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub passed: bool,
    pub checks: Vec<CheckResult>,
}

impl ValidationReport {
    pub fn new(checks: Vec<CheckResult>) -> Self {
        let passed = checks
            .iter()
            .flat_map(|c| &c.findings)
            .all(|f| f.severity != Severity::Error);
        Self { passed, checks }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.checks
            .iter()
            .flat_map(|c| &c.findings)
            .filter(|f| f.severity == severity)
            .count()
    }
}
