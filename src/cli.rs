// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, ValueEnum};

use crate::trace::{GraphId, TaskId, WorkerId};
use crate::types::DiskUnit;

/// Command-line arguments for `traceview`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "traceview",
    version,
    about = "Lay out task-dispatch traces as timelines and reconstruct DAG critical paths.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Traceview.toml` in the current working directory. A missing
    /// file means built-in defaults.
    #[arg(long, value_name = "PATH", default_value = "Traceview.toml")]
    pub config: String,

    /// Trace to load (a directory under `[trace].root`).
    ///
    /// If omitted, the first trace found is used.
    #[arg(long, value_name = "ID")]
    pub trace: Option<String>,

    /// Select this DAG once the trace is loaded.
    #[arg(long, value_name = "GRAPH_ID")]
    pub dag: Option<GraphId>,

    /// Highlight the critical path of the selected DAG.
    #[arg(long, requires = "dag")]
    pub critical_path: bool,

    /// Mark one task of the selected DAG and print its input-file analysis.
    #[arg(long, value_name = "TASK_ID")]
    pub analyze_task: Option<TaskId>,

    /// Redraw the disk usage chart in this unit (`mb` or `percent`).
    #[arg(long, value_name = "UNIT")]
    pub disk_unit: Option<DiskUnit>,

    /// Emphasize one worker's line in the disk usage chart.
    #[arg(long, value_name = "WORKER_ID")]
    pub disk_worker: Option<WorkerId>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TRACEVIEW_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Validate the config and list the available traces, without loading.
    #[arg(long)]
    pub dry_run: bool,
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
