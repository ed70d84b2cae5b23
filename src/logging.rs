// src/logging.rs

//! Logging setup for `pronaflow-graph` using `tracing` + `tracing-subscriber`.
//!
//! Filter resolution:
//! 1. `--log-level` CLI flag (if provided) applies to everything.
//! 2. Otherwise `PRONAFLOW_LOG` is read as an `EnvFilter` directive string,
//!    so both `debug` and `pronaflow_graph::schedule=trace,info` work.
//! 3. Default to `info`.
//!
//! Logs go to stderr; stdout is reserved for the schedule report.

use anyhow::{anyhow, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Environment variable consulted when no CLI level is given.
pub const LOG_ENV_VAR: &str = "PRONAFLOW_LOG";

/// Initialise the global logging subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(lvl) => EnvFilter::new(directive_for(lvl)),
        None => EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("info")),
    };

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}

fn directive_for(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
