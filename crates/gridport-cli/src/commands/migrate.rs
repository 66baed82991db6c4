use super::{exit_code, open_project, print_json, runtime};
use crate::display::{self, Prompter};
use anyhow::{Context, Result};
use clap::Args;
use gridport_engine::MigrateOptions;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Project root
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Show the changes as diffs without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Skip the pre-migration backup
    #[arg(long)]
    pub no_backup: bool,

    /// Ask for confirmation after scanning
    #[arg(short, long)]
    pub interactive: bool,

    /// Never ask for confirmation
    #[arg(short = 'y', long, visible_alias = "yes")]
    pub force: bool,

    /// Print the migration result as JSON
    #[arg(long)]
    pub json: bool,
}

impl MigrateArgs {
    fn options(&self) -> MigrateOptions {
        MigrateOptions {
            dry_run: self.dry_run,
            backup: !self.no_backup,
            interactive: self.interactive,
            force: self.force,
            only: None,
        }
    }
}

pub fn handle_migrate(args: MigrateArgs) -> Result<ExitCode> {
    runtime()?.block_on(async {
        let runner = open_project(&args.path).await?;
        let options = args.options();

        let result = runner
            .migrate_with(&options, |scan| {
                print!("{}", display::format_scan_summary(scan));
                // An unreadable stdin counts as a decline.
                Prompter::stdio()
                    .confirm("Apply the migration?", true)
                    .unwrap_or(false)
            })
            .await
            .context("Migration failed")?;

        if args.json {
            print_json(&result)?;
        } else {
            if result.dry_run {
                print!("{}", display::format_previews(&result.previews));
            }
            print!("{}", display::format_migration(&result));
        }

        Ok(exit_code(result.success))
    })
}
