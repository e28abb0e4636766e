// src/logging.rs

//! Logging setup for `traceview` using `tracing` + `tracing-subscriber`.
//!
//! The filter is chosen in this order:
//! 1. `--log-level` on the command line, applied to the `traceview` target
//! 2. `TRACEVIEW_LOG`, read as an `EnvFilter` directive list
//!    (e.g. `info,traceview::dag=debug`)
//! 3. `traceview=info`
//!
//! Logs go to STDERR; stdout carries the rendered view commands.

use anyhow::{Context, Result};
use tracing_subscriber::{EnvFilter, fmt};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "TRACEVIEW_LOG";

const DEFAULT_DIRECTIVES: &str = "traceview=info";

/// Install the global subscriber. Call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = build_filter(cli_level, std::env::var(LOG_ENV_VAR).ok().as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;

    Ok(())
}

/// Filter for the given CLI level and raw `TRACEVIEW_LOG` value.
///
/// A malformed environment value is an error rather than being silently
/// replaced, so a typo in a directive is visible.
pub fn build_filter(cli_level: Option<LogLevel>, env: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return Ok(EnvFilter::new(format!("traceview={}", directive(level))));
    }
    match env.map(str::trim).filter(|s| !s.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("parsing {LOG_ENV_VAR}={directives:?}")),
        None => Ok(EnvFilter::new(DEFAULT_DIRECTIVES)),
    }
}

fn directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
