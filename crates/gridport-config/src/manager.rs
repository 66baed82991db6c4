use crate::security::{validate_backup_dir, SecurityError};
use crate::types::{MigrationConfig, CONFIG_FILE_NAME};
use gridport_core::{MappingRegistry, MappingTable};
use gridport_fs::FileSystem;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Errors that can occur during config management
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Malformed {path}: {source}")]
    TomlDe {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Security error: {0}")]
    Security(#[from] SecurityError),

    #[error("Unknown mapping table `{0}` (expected one of: imports, symbols, selectors, attributes, css_classes, config, columns)")]
    UnknownTable(String),

    #[error("Invalid custom mapping: {0}")]
    Mapping(#[from] gridport_core::Error),
}

/// Loader for a project's `gridport.toml`
///
/// The file is optional: when it is absent the defaults apply.
pub struct ConfigManager<F: FileSystem> {
    fs: Arc<F>,
    config_path: PathBuf,
    config: MigrationConfig,
    from_file: bool,
}

impl<F: FileSystem> ConfigManager<F> {
    /// Load `gridport.toml` from the filesystem's project root
    pub async fn load_for_project(fs: Arc<F>) -> Result<Self, ConfigError> {
        let config_path = fs.project_root().join(CONFIG_FILE_NAME);

        if !fs.exists(&config_path).await? {
            tracing::debug!("no {} found, using defaults", CONFIG_FILE_NAME);
            return Ok(Self {
                fs,
                config_path,
                config: MigrationConfig::default(),
                from_file: false,
            });
        }

        let contents = fs.read_to_string(&config_path).await?;
        let config: MigrationConfig =
            toml::from_str(&contents).map_err(|source| ConfigError::TomlDe {
                path: config_path.clone(),
                source,
            })?;
        validate_backup_dir(&config.backup_dir)?;
        for table in config.mappings.keys() {
            if MappingTable::from_name(table).is_none() {
                return Err(ConfigError::UnknownTable(table.clone()));
            }
        }

        tracing::info!("loaded {}", config_path.display());
        Ok(Self {
            fs,
            config_path,
            config,
            from_file: true,
        })
    }

    /// Get config reference
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Get the config file path
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Whether the config came from a file rather than defaults
    pub fn is_from_file(&self) -> bool {
        self.from_file
    }

    /// Absolute path of the backup directory
    pub fn backup_root(&self) -> PathBuf {
        self.fs.project_root().join(&self.config.backup_dir)
    }

    /// Packages the manifest rewrite should add
    ///
    /// `[manifest.add]` replaces the registry's target packages when set.
    pub fn target_packages(&self, registry: &MappingRegistry) -> BTreeMap<String, String> {
        if self.config.manifest.add.is_empty() {
            registry.target_packages().clone()
        } else {
            self.config.manifest.add.clone()
        }
    }

    /// Merge `[mappings.*]` into a registry through its custom mapping API
    ///
    /// Returns the number of entries added.
    pub fn apply_mappings(&self, registry: &mut MappingRegistry) -> Result<usize, ConfigError> {
        apply_custom_mappings(&self.config, registry)
    }

    /// Save the current config atomically
    pub async fn save(&self) -> Result<(), ConfigError> {
        let toml_str = toml::to_string_pretty(&self.config)?;
        self.fs.write_atomic(&self.config_path, &toml_str).await?;
        Ok(())
    }

    /// Add a custom mapping to the config (persisted by [`save`](Self::save))
    pub fn add_mapping(
        &mut self,
        table: MappingTable,
        from: impl Into<String>,
        to: impl Into<String>,
    ) {
        self.config
            .mappings
            .entry(table.name().to_string())
            .or_default()
            .insert(from.into(), to.into());
    }
}

/// Merge a config's `[mappings.*]` tables into a registry
pub fn apply_custom_mappings(
    config: &MigrationConfig,
    registry: &mut MappingRegistry,
) -> Result<usize, ConfigError> {
    let mut added = 0;
    for (table_name, entries) in &config.mappings {
        let table = MappingTable::from_name(table_name)
            .ok_or_else(|| ConfigError::UnknownTable(table_name.clone()))?;
        for (from, to) in entries {
            registry.add_custom_mapping(table, from.as_str(), to.as_str())?;
            added += 1;
        }
    }
    if added > 0 {
        tracing::info!("merged {} custom mappings", added);
    }
    Ok(added)
}
