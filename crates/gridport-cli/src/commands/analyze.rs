use super::{open_project, print_json, runtime};
use crate::display;
use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored::*;
use gridport_compat::{render_report, ReportFormat};
use gridport_engine::AnalyzeOptions;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Project root
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Also write the report to this file (format follows the extension)
    #[arg(short, long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Report file format, overriding the extension
    #[arg(long, value_enum, requires = "report")]
    pub format: Option<ReportFileFormat>,

    /// Print the report as JSON instead of the console summary
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ReportFileFormat {
    Text,
    Html,
    Json,
}

impl From<ReportFileFormat> for ReportFormat {
    fn from(format: ReportFileFormat) -> Self {
        match format {
            ReportFileFormat::Text => ReportFormat::Console,
            ReportFileFormat::Html => ReportFormat::Html,
            ReportFileFormat::Json => ReportFormat::Json,
        }
    }
}

pub fn handle_analyze(args: AnalyzeArgs) -> Result<ExitCode> {
    runtime()?.block_on(async {
        let runner = open_project(&args.path).await?;
        let analysis = runner
            .analyze(&AnalyzeOptions {
                report_path: args.report.clone(),
                format: args.format.map(ReportFormat::from),
            })
            .await
            .context("Analysis failed")?;

        if args.json {
            print_json(&analysis.report)?;
        } else {
            print!("{}", render_report(&analysis.report, ReportFormat::Console)?);
            print!("{}", display::format_scan_warnings(&analysis.scan_warnings));
            if let Some(path) = &analysis.written_to {
                println!("{} Report written to {}", "✓".green(), path.display());
            }
        }

        Ok(ExitCode::SUCCESS)
    })
}
