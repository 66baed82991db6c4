use super::{exit_code, open_project, runtime};
use crate::display::{self, Prompter};
use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use gridport_compat::{render_report, ReportFormat};
use gridport_engine::{AnalyzeOptions, MigrateOptions};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args, Debug)]
pub struct WizardArgs {
    /// Project root
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

/// Analyze, ask how to migrate, optionally preview, then migrate.
pub fn handle_wizard(args: WizardArgs) -> Result<ExitCode> {
    runtime()?.block_on(async {
        let runner = open_project(&args.path).await?;
        let mut prompter = Prompter::stdio();

        println!("{}\n", "gridport migration wizard".bright_blue().bold());

        let analysis = runner
            .analyze(&AnalyzeOptions::default())
            .await
            .context("Analysis failed")?;
        print!("{}", render_report(&analysis.report, ReportFormat::Console)?);
        print!("{}", display::format_scan_warnings(&analysis.scan_warnings));

        let scan = runner.scan_project().await.context("Scan failed")?;
        if scan.records.is_empty() {
            println!("\n{} Nothing to migrate.", "✓".green());
            return Ok(ExitCode::SUCCESS);
        }
        println!();

        let files: Vec<PathBuf> = scan.records.iter().map(|r| r.file_path.clone()).collect();
        let only = if prompter.confirm(&format!("Migrate all {} affected files?", files.len()), true)? {
            None
        } else {
            let labels: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
            let picked = prompter.select("Affected files:", &labels)?;
            Some(pick(&files, &picked))
        };

        let backup = prompter.confirm("Create a backup first?", true)?;
        let options = MigrateOptions {
            dry_run: false,
            backup,
            interactive: false,
            force: true,
            only,
        };

        if prompter.confirm("Preview the changes before applying?", true)? {
            let preview = runner
                .migrate(&MigrateOptions {
                    dry_run: true,
                    ..options.clone()
                })
                .await
                .context("Preview failed")?;
            print!("{}", display::format_previews(&preview.previews));
            print!("{}", display::format_migration(&preview));
            if !preview.success {
                return Ok(ExitCode::FAILURE);
            }
            if !prompter.confirm("Apply these changes?", true)? {
                println!("Nothing was changed.");
                return Ok(ExitCode::SUCCESS);
            }
        }

        let result = runner.migrate(&options).await.context("Migration failed")?;
        print!("{}", display::format_migration(&result));
        if !result.success {
            return Ok(ExitCode::FAILURE);
        }

        if prompter.confirm("Run validation now?", false)? {
            let report = runner.validate().await.context("Validation failed to run")?;
            print!("{}", display::format_validation(&report));
            return Ok(exit_code(report.passed));
        }

        println!(
            "\nRun {} to type-check and build the migrated project.",
            "gridport validate".bold()
        );
        Ok(ExitCode::SUCCESS)
    })
}

fn pick(files: &[PathBuf], indices: &BTreeSet<usize>) -> BTreeSet<PathBuf> {
    indices
        .iter()
        .filter_map(|&i| files.get(i).cloned())
        .collect()
}
