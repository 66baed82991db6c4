use super::{exit_code, open_project, print_json, runtime};
use crate::display;
use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Project root
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Print the validation report as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn handle_validate(args: ValidateArgs) -> Result<ExitCode> {
    runtime()?.block_on(async {
        let runner = open_project(&args.path).await?;
        if !args.json {
            println!("Validating {}...", runner.project_root().display());
        }
        let report = runner.validate().await.context("Validation failed to run")?;

        if args.json {
            print_json(&report)?;
        } else {
            print!("{}", display::format_validation(&report));
        }

        Ok(exit_code(report.passed))
    })
}
