//! gridport - migrate Angular projects from ag-Grid to the Tessera grid.

mod commands;
mod display;
mod logging;

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "gridport")]
#[command(version, about = "Migrate Angular projects from ag-Grid to the Tessera grid", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Verbose diagnostics on stderr (-v info, -vv debug)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Scan a project and report how well it maps onto Tessera
    Analyze(commands::AnalyzeArgs),

    /// Rewrite ag-Grid usages in place
    Migrate(commands::MigrateArgs),

    /// Type-check, build and look for leftover ag-Grid usages
    Validate(commands::ValidateArgs),

    /// Restore project files from a backup
    Rollback(commands::RollbackArgs),

    /// Guided analyze, preview and migrate
    Wizard(commands::WizardArgs),

    /// Inspect or extend the project's gridport.toml
    Config {
        #[command(subcommand)]
        command: commands::ConfigCommand,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match cli.command {
        Command::Analyze(args) => commands::handle_analyze(args),
        Command::Migrate(args) => commands::handle_migrate(args),
        Command::Validate(args) => commands::handle_validate(args),
        Command::Rollback(args) => commands::handle_rollback(args),
        Command::Wizard(args) => commands::handle_wizard(args),
        Command::Config { command } => commands::handle_config_command(command),
    }
}
