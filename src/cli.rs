// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

/// Command-line arguments for `cam-baker`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cam-baker",
    version,
    about = "Build embedded task forms and deploy process definitions to a local engine.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Baker.toml` in the current working directory. A missing
    /// default file means zero-config; a missing explicit file is an error.
    #[arg(long, short = 'c', value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `BAKER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

impl CliArgs {
    /// `dev` is the default command, like running the tool bare.
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Dev)
    }
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Watch sources, rebuild changed forms and (optionally) auto-deploy.
    #[command(alias = "serve")]
    Dev,

    /// Clean build of every task form into the output directory.
    Build {
        /// Only build the task folder with this name.
        #[arg(long, value_name = "NAME")]
        task: Option<String>,

        /// Resolve and print the build plan without compiling anything.
        #[arg(long)]
        dry_run: bool,
    },

    /// Deploy process definitions (and their linked forms) to the engine.
    Deploy {
        /// A single process-definition file; all matching files when omitted.
        #[arg(value_name = "FILE")]
        file: Option<String>,
    },
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
