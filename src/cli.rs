// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

/// Command-line arguments for `pronaflow-graph`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "pronaflow-graph",
    version,
    about = "Validate a project's task dependency graph and compute its critical path.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the project file (TOML).
    #[arg(long, value_name = "PATH", default_value = "Project.toml")]
    pub config: String,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `PRONAFLOW_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Parse + validate, print the graph, but don't compute a schedule.
    #[arg(long)]
    pub dry_run: bool,

    /// Report whether adding PREDECESSOR -> SUCCESSOR would create a cycle.
    #[arg(long, num_args = 2, value_names = ["PREDECESSOR", "SUCCESSOR"])]
    pub check_edge: Option<Vec<String>>,
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
