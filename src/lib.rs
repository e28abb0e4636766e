// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod render;
pub mod timeline;
pub mod trace;
pub mod types;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_or_default;
use crate::config::model::ConfigFile;
use crate::engine::{Runtime, ViewerCore, ViewerEvent};
use crate::render::JsonRenderBackend;
use crate::trace::{CsvTraceLoader, TraceLoader};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the CSV trace loader
/// - viewer core / runtime
/// - the JSON render backend, which replays the interactions asked for on
///   the command line once the trace is ready
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let config_path = PathBuf::from(&args.config);
    let cfg = load_or_default(&config_path)?;

    let loader: Arc<dyn TraceLoader> = Arc::new(CsvTraceLoader::from_config(cfg.trace()));
    let traces = loader.list_traces()?;

    if args.dry_run {
        print_dry_run(&cfg, &traces);
        return Ok(());
    }

    let trace_id = match args.trace.clone().or_else(|| traces.first().cloned()) {
        Some(id) => id,
        None => bail!("no traces found under '{}'", cfg.trace().root),
    };
    info!(trace = %trace_id, "selected trace");

    let (rt_tx, rt_rx) = mpsc::channel::<ViewerEvent>(64);

    let renderer = JsonRenderBackend::new(
        Box::new(std::io::stdout()),
        rt_tx.clone(),
        script_from_args(&args),
    );

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(ViewerEvent::ShutdownRequested).await;
        });
    }

    rt_tx.send(ViewerEvent::TraceRequested { trace_id }).await?;

    let core = ViewerCore::new(cfg);
    let runtime = Runtime::new(core, rt_rx, rt_tx, loader, renderer);
    runtime.run().await?;
    Ok(())
}

/// Interactions requested on the command line, in the order a user would
/// perform them.
pub fn script_from_args(args: &CliArgs) -> Vec<ViewerEvent> {
    let mut script = Vec::new();
    if let Some(graph_id) = args.dag {
        script.push(ViewerEvent::DagSelected { graph_id });
        if args.critical_path {
            script.push(ViewerEvent::CriticalPathToggled);
        }
    }
    if let Some(task_id) = args.analyze_task {
        script.push(ViewerEvent::TaskAnalyzed {
            task_id: Some(task_id),
        });
    }
    if args.disk_unit.is_some() || args.disk_worker.is_some() {
        script.push(ViewerEvent::DiskUsageChanged {
            unit: args.disk_unit.unwrap_or_default(),
            highlight: args.disk_worker,
        });
    }
    script
}

/// Simple dry-run output: print the effective config and available traces.
fn print_dry_run(cfg: &ConfigFile, traces: &[String]) {
    println!("traceview dry-run");
    println!("  trace.root = {}", cfg.trace().root);
    println!("  trace.log_subdir = {}", cfg.trace().log_subdir);
    let t = cfg.timeline();
    println!("  timeline.size = {}x{}", t.width, t.height);
    println!("  timeline.row_padding = {}", t.row_padding);
    println!("  timeline.show_queued = {}", t.show_queued);
    println!(
        "  timeline.show_waiting_retrieval = {}",
        t.show_waiting_retrieval
    );
    println!("  timeline.worker_order = {:?}", t.worker_order);
    println!("  timeline.max_worker_ticks = {}", t.max_worker_ticks);
    println!("  timeline.strip_height = {}", t.strip_height);
    println!("  timeline.disk_height = {}", t.disk_height);
    let d = cfg.dag();
    println!("  dag.form = {:?}", d.form);
    println!(
        "  dag.fills = default {}, critical {}, analyze {}",
        d.default_fill, d.critical_fill, d.analyze_fill
    );
    println!();

    println!("traces ({}):", traces.len());
    for trace in traces {
        println!("  - {trace}");
    }

    debug!("dry-run complete (nothing loaded)");
}
