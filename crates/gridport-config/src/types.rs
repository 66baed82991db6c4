use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Name of the per-project configuration file.
pub const CONFIG_FILE_NAME: &str = "gridport.toml";

/// Default directory for backups, relative to the project root.
pub const DEFAULT_BACKUP_DIR: &str = ".migration-backups";

/// Contents of `gridport.toml`
///
/// Every field is optional in the file; a missing file is the same as an
/// empty one.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MigrationConfig {
    /// Directory holding backups, relative to the project root
    #[serde(default = "default_backup_dir")]
    pub backup_dir: String,

    /// Extra gitignore-style globs excluded from scanning
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Custom entries per mapping table (`[mappings.css_classes]`)
    #[serde(default)]
    pub mappings: BTreeMap<String, BTreeMap<String, String>>,

    /// Validator commands
    #[serde(default)]
    pub validation: ValidationSettings,

    /// Dependency manifest handling
    #[serde(default)]
    pub manifest: ManifestSettings,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            backup_dir: default_backup_dir(),
            exclude: Vec::new(),
            mappings: BTreeMap::new(),
            validation: ValidationSettings::default(),
            manifest: ManifestSettings::default(),
        }
    }
}

/// External commands run by `validate`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ValidationSettings {
    /// Type-checker invocation (argv)
    #[serde(default = "default_typecheck_command")]
    pub typecheck_command: Vec<String>,

    /// Production build invocation (argv)
    #[serde(default = "default_build_command")]
    pub build_command: Vec<String>,

    /// Build output lines containing this marker are reported
    #[serde(default = "default_error_marker")]
    pub error_marker: String,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            typecheck_command: default_typecheck_command(),
            build_command: default_build_command(),
            error_marker: default_error_marker(),
        }
    }
}

/// `package.json` rewrite settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ManifestSettings {
    /// Rewrite the manifest after a successful apply
    #[serde(default = "default_true")]
    pub update: bool,

    /// Packages to add, overriding the built-in target packages
    #[serde(default)]
    pub add: BTreeMap<String, String>,
}

impl Default for ManifestSettings {
    fn default() -> Self {
        Self {
            update: true,
            add: BTreeMap::new(),
        }
    }
}

// Default value functions
fn default_backup_dir() -> String {
    DEFAULT_BACKUP_DIR.to_string()
}

fn default_typecheck_command() -> Vec<String> {
    ["npx", "tsc", "--noEmit", "-p", "tsconfig.json"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_build_command() -> Vec<String> {
    ["npx", "ng", "build", "--configuration", "production"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_error_marker() -> String {
    "ERROR".to_string()
}

fn default_true() -> bool {
    true
}
