mod analyze;
mod config;
mod migrate;
mod rollback;
mod validate;
mod wizard;

pub use analyze::{handle_analyze, AnalyzeArgs};
pub use config::{handle_config_command, ConfigCommand};
pub use migrate::{handle_migrate, MigrateArgs};
pub use rollback::{handle_rollback, RollbackArgs};
pub use validate::{handle_validate, ValidateArgs};
pub use wizard::{handle_wizard, WizardArgs};

use anyhow::{Context, Result};
use gridport_engine::MigrationRunner;
use gridport_fs::NativeFileSystem;
use std::path::Path;
use std::process::ExitCode;
use tokio::runtime::Runtime;

fn runtime() -> Result<Runtime> {
    Runtime::new().context("Failed to create async runtime")
}

async fn open_project(path: &Path) -> Result<MigrationRunner<NativeFileSystem>> {
    MigrationRunner::open(path)
        .await
        .with_context(|| format!("Failed to open project {}", path.display()))
}

fn exit_code(ok: bool) -> ExitCode {
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize result")?
    );
    Ok(())
}
