use super::{open_project, runtime};
use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args, Debug)]
pub struct RollbackArgs {
    /// Project root
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Backup to restore (defaults to the most recent)
    #[arg(short, long, value_name = "DIR")]
    pub backup: Option<PathBuf>,

    /// List completed backups and exit
    #[arg(long, conflicts_with = "backup")]
    pub list: bool,
}

pub fn handle_rollback(args: RollbackArgs) -> Result<ExitCode> {
    runtime()?.block_on(async {
        let runner = open_project(&args.path).await?;

        if args.list {
            let backups = runner.list_backups().await.context("Failed to list backups")?;
            if backups.is_empty() {
                println!("No backups found.");
            } else {
                println!("{}", "Backups (oldest first):".bold());
                for backup in backups {
                    println!("  {}", backup.display());
                }
            }
            return Ok(ExitCode::SUCCESS);
        }

        let summary = runner
            .rollback(args.backup.as_deref())
            .await
            .context("Rollback failed")?;
        println!(
            "{} Restored {} files from {}",
            "✓".green(),
            summary.files_restored,
            summary.backup.display()
        );
        Ok(ExitCode::SUCCESS)
    })
}
