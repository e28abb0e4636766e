// src/trace/model.rs

//! Typed trace records.
//!
//! Everything here is already numeric; no engine code re-parses text.

use serde::Serialize;

use crate::errors::{Result, TraceviewError};

pub type TaskId = u64;
pub type WorkerId = u32;
pub type GraphId = u32;

/// Lifecycle timestamps of a successful task, in the order they must occur.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TaskLifecycle {
    pub when_ready: f64,
    pub when_running: f64,
    pub time_worker_start: f64,
    pub time_worker_end: f64,
    pub when_waiting_retrieval: f64,
    pub when_retrieved: f64,
    pub when_done: f64,
}

impl TaskLifecycle {
    /// Named timestamps in lifecycle order.
    pub fn ordered(&self) -> [(&'static str, f64); 7] {
        [
            ("when_ready", self.when_ready),
            ("when_running", self.when_running),
            ("time_worker_start", self.time_worker_start),
            ("time_worker_end", self.time_worker_end),
            ("when_waiting_retrieval", self.when_waiting_retrieval),
            ("when_retrieved", self.when_retrieved),
            ("when_done", self.when_done),
        ]
    }
}

/// One execution of a task (`task_id`, `try_id`) that completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskExecutionRecord {
    pub task_id: TaskId,
    pub try_id: u32,
    pub worker_id: WorkerId,
    pub core_id: u32,
    pub category: String,
    pub graph_id: Option<GraphId>,
    pub lifecycle: TaskLifecycle,
    pub input_files: Vec<String>,
    pub output_files: Vec<String>,
    pub size_input_mb: f64,
    pub size_output_mb: f64,
    pub critical_input_file: Option<String>,
    pub is_recovery_task: bool,
}

impl TaskExecutionRecord {
    /// Check that the lifecycle timestamps never go backwards.
    pub fn check_lifecycle(&self) -> Result<()> {
        let ordered = self.lifecycle.ordered();
        for pair in ordered.windows(2) {
            let (prev_name, prev) = pair[0];
            let (next_name, next) = pair[1];
            if next < prev || next.is_nan() || prev.is_nan() {
                return Err(TraceviewError::TraceIntegrity(format!(
                    "task {} (try {}): {next_name} ({next}) precedes {prev_name} ({prev})",
                    self.task_id, self.try_id
                )));
            }
        }
        Ok(())
    }

    /// Time spent on the worker, from the manager's point of view.
    pub fn execution_time(&self) -> f64 {
        self.lifecycle.time_worker_end - self.lifecycle.time_worker_start
    }

    /// Category without the angle brackets the manager wraps it in.
    pub fn display_category(&self) -> &str {
        self.category
            .strip_prefix('<')
            .unwrap_or(&self.category)
            .trim_end_matches('>')
    }
}

/// A try that failed on a worker; the slot is busy until `when_next_ready`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedAttemptRecord {
    pub task_id: TaskId,
    pub try_id: u32,
    pub worker_id: WorkerId,
    pub core_id: u32,
    pub when_ready: f64,
    pub when_running: f64,
    pub when_next_ready: f64,
}

impl FailedAttemptRecord {
    pub fn check_interval(&self) -> Result<()> {
        if self.when_next_ready < self.when_running || self.when_next_ready.is_nan() {
            return Err(TraceviewError::TraceIntegrity(format!(
                "failed task {} (try {}): when_next_ready ({}) precedes when_running ({})",
                self.task_id, self.try_id, self.when_next_ready, self.when_running
            )));
        }
        Ok(())
    }
}

/// One connection span of a worker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkerSummary {
    pub worker_id: WorkerId,
    pub hash: String,
    pub machine_name: String,
    pub cores: u32,
    pub time_connected: f64,
    pub time_disconnected: f64,
}

impl WorkerSummary {
    pub fn check_lifetime(&self) -> Result<()> {
        if self.time_disconnected < self.time_connected {
            return Err(TraceviewError::TraceIntegrity(format!(
                "worker {}: disconnected ({}) before connected ({})",
                self.worker_id, self.time_disconnected, self.time_connected
            )));
        }
        Ok(())
    }

    pub fn lifetime(&self) -> f64 {
        self.time_disconnected - self.time_connected
    }
}

/// A period during which a worker held a copy of a file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FileHolding {
    pub worker_id: WorkerId,
    pub stage_in: f64,
    pub stage_out: f64,
    pub lifetime: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileRecord {
    pub filename: String,
    pub size_mb: f64,
    /// Producer task ids, earliest producer first.
    pub producers: Vec<TaskId>,
    pub consumers: Vec<TaskId>,
    /// Holding history sorted by stage-in time.
    pub worker_holding: Vec<FileHolding>,
}

/// Per-DAG summary, including the critical path found by the log writer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphRecord {
    pub graph_id: GraphId,
    pub num_tasks: usize,
    /// Critical tasks in execution (topological) order.
    pub critical_tasks: Vec<TaskId>,
    pub time_critical_nodes: Vec<f64>,
    pub time_critical_edges: Vec<f64>,
    pub time_critical_path: f64,
}

/// One step of a worker's disk usage: `filename` was staged in (positive
/// `size_mb`) or out (negative) at `time`, leaving the running totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskUsageSample {
    pub worker_id: WorkerId,
    pub filename: String,
    /// Absolute timestamp, like task lifecycle times.
    pub time: f64,
    pub size_mb: f64,
    pub disk_usage_mb: f64,
    /// Fraction of the worker's disk, as written by the log writer.
    pub disk_usage_pct: f64,
}
