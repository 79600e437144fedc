mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use phasekit_core::observability::{init_tracing, TracingMode};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mode = match &cli.command {
        Commands::Plugins { json: true, .. } | Commands::Sources { .. } => TracingMode::Machine,
        _ => TracingMode::Default,
    };
    init_tracing(mode);

    match cli.command {
        Commands::Phases { action, only } => commands::phases::cmd_phases(&action, only)?,
        Commands::Plugins {
            action,
            only,
            project,
            json,
        } => commands::plugins::cmd_plugins(&action, only, &project, json).await?,
        Commands::Run {
            action,
            only,
            project,
        } => commands::run::cmd_run(&action, only, &project).await?,
        Commands::Check { script, project } => {
            commands::check::cmd_check(&script, project.as_deref())?
        }
        Commands::Sources { dir } => commands::sources::cmd_sources(&dir)?,
    }
    Ok(())
}
