use super::runtime;
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use colored::*;
use gridport_config::{validate_project_path, ConfigManager};
use gridport_core::{MappingRegistry, MappingTable};
use gridport_fs::NativeFileSystem;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show {
        /// Project root
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Show the config file path
    Path {
        /// Project root
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Add a custom mapping and save gridport.toml
    AddMapping {
        /// Mapping table (imports, symbols, selectors, attributes, css_classes, config, columns)
        table: String,

        /// Source name
        from: String,

        /// Target name
        to: String,

        /// Project root
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },
}

pub fn handle_config_command(cmd: ConfigCommand) -> Result<ExitCode> {
    runtime()?.block_on(async {
        match cmd {
            ConfigCommand::Show { path } => {
                let manager = load(&path).await?;
                if !manager.is_from_file() {
                    println!("# {} not found, showing defaults", manager.config_path().display());
                }
                print!(
                    "{}",
                    toml::to_string_pretty(manager.config()).context("Failed to render config")?
                );
            }

            ConfigCommand::Path { path } => {
                let manager = load(&path).await?;
                println!("{}", manager.config_path().display());
            }

            ConfigCommand::AddMapping {
                table,
                from,
                to,
                path,
            } => {
                let Some(table) = MappingTable::from_name(&table) else {
                    let names: Vec<_> = MappingTable::all().iter().map(|t| t.name()).collect();
                    bail!("Unknown mapping table `{}` (expected one of: {})", table, names.join(", "));
                };

                let mut manager = load(&path).await?;
                manager.add_mapping(table, from.as_str(), to.as_str());

                // Reject mappings the registry would refuse before writing them.
                let mut registry =
                    MappingRegistry::builtin().context("Failed to load built-in mappings")?;
                manager
                    .apply_mappings(&mut registry)
                    .context("Mapping rejected")?;

                manager.save().await.context("Failed to save config")?;
                println!(
                    "{} Added {} mapping {} → {} in {}",
                    "✓".green(),
                    table,
                    from,
                    to,
                    manager.config_path().display()
                );
            }
        }

        Ok(ExitCode::SUCCESS)
    })
}

async fn load(path: &Path) -> Result<ConfigManager<NativeFileSystem>> {
    let root = validate_project_path(path)
        .with_context(|| format!("Invalid project path {}", path.display()))?;
    let fs = Arc::new(NativeFileSystem::new(&root).context("Failed to open project root")?);
    ConfigManager::load_for_project(fs)
        .await
        .context("Failed to load gridport.toml")
}
