use clap::{Args, Parser, Subcommand};

/// phasekit - resolve and run build lifecycle plugins
#[derive(Parser, Debug)]
#[command(name = "phasekit")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Where the project lives and which file carries its `plugins` overrides.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project root (default: PHASEKIT_PROJECT_ROOT or the current directory)
    #[arg(long, value_name = "DIR")]
    pub project: Option<String>,

    /// Project config JSON (default: <project>/package.json)
    #[arg(long, value_name = "FILE")]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the lifecycle phases an action covers
    Phases {
        #[arg(value_name = "ACTION")]
        action: String,

        /// Only the terminal phase
        #[arg(long, default_value = "false")]
        only: bool,
    },

    /// Resolve the ordered plugin list for an action
    Plugins {
        #[arg(value_name = "ACTION")]
        action: String,

        /// Only the terminal phase
        #[arg(long, default_value = "false")]
        only: bool,

        #[command(flatten)]
        project: ProjectArgs,

        /// Print JSON instead of one plugin per line
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Resolve an action and run its plugins in order, stopping at the first failure
    Run {
        #[arg(value_name = "ACTION")]
        action: String,

        /// Only the terminal phase
        #[arg(long, default_value = "false")]
        only: bool,

        #[command(flatten)]
        project: ProjectArgs,
    },

    /// Compile a plugin script and validate its exports
    Check {
        /// Path to the .rhai script
        #[arg(value_name = "SCRIPT")]
        script: String,

        #[arg(long, value_name = "DIR")]
        project: Option<String>,
    },

    /// Scan a module sources tree, pack each version and print its records
    Sources {
        /// Sources root containing config.json (default: current directory)
        #[arg(value_name = "DIR", default_value = ".")]
        dir: String,
    },
}
