pub mod manager;
pub mod security;
pub mod types;

pub use manager::{apply_custom_mappings, ConfigError, ConfigManager};
pub use security::{validate_backup_dir, validate_project_path, SecurityError};
pub use types::{
    ManifestSettings, MigrationConfig, ValidationSettings, CONFIG_FILE_NAME, DEFAULT_BACKUP_DIR,
};
