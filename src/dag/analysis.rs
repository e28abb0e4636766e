// src/dag/analysis.rs

//! Per-task breakdown shown when a task is picked for analysis.

use serde::Serialize;

use crate::errors::{Result, TraceviewError};
use crate::trace::{FileRecord, GraphId, TaskExecutionRecord, TaskId, TraceDataset, WorkerId};

/// One lifecycle timestamp relative to the trace start, with the gap from
/// the previous one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseTiming {
    pub name: &'static str,
    pub at: f64,
    pub since_previous: Option<f64>,
}

/// How one input file arrived at the task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputFileRow {
    pub filename: String,
    pub size_mb: f64,
    /// From the first stage-in of the file to the task starting.
    pub waiting_time: Option<f64>,
    /// Gap between the latest producer that finished before the task
    /// started and the task start; 0 with at most one producer.
    pub dependency_time: f64,
    pub producers: Vec<TaskId>,
    pub consumers: Vec<TaskId>,
    /// `worker<id>: <in>s-<out>s (<lifetime>s)` entries, comma separated.
    pub worker_holding: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskAnalysis {
    pub task_id: TaskId,
    pub try_id: u32,
    pub worker_id: WorkerId,
    pub graph_id: Option<GraphId>,
    pub category: String,
    pub size_input_mb: f64,
    pub size_output_mb: f64,
    pub critical_input_file: Option<String>,
    pub phases: Vec<PhaseTiming>,
    pub input_files: Vec<InputFileRow>,
}

pub fn analyze_task(dataset: &TraceDataset, task_id: TaskId) -> Result<TaskAnalysis> {
    let task = dataset
        .task(task_id)
        .ok_or(TraceviewError::TaskNotFound(task_id))?;
    let origin = dataset.trace_start();

    let mut phases = Vec::with_capacity(7);
    let mut previous: Option<f64> = None;
    for (name, t) in task.lifecycle.ordered() {
        phases.push(PhaseTiming {
            name,
            at: t - origin,
            since_previous: previous.map(|p| t - p),
        });
        previous = Some(t);
    }

    let input_files = task
        .input_files
        .iter()
        .filter_map(|name| dataset.file(name))
        .map(|file| input_file_row(dataset, task, file, origin))
        .collect();

    Ok(TaskAnalysis {
        task_id: task.task_id,
        try_id: task.try_id,
        worker_id: task.worker_id,
        graph_id: task.graph_id,
        category: task.display_category().to_string(),
        size_input_mb: task.size_input_mb,
        size_output_mb: task.size_output_mb,
        critical_input_file: task.critical_input_file.clone(),
        phases,
        input_files,
    })
}

fn input_file_row(
    dataset: &TraceDataset,
    task: &TaskExecutionRecord,
    file: &FileRecord,
    origin: f64,
) -> InputFileRow {
    let start = task.lifecycle.time_worker_start;

    let waiting_time = file.worker_holding.first().map(|h| start - h.stage_in);

    let dependency_time = if file.producers.len() <= 1 {
        0.0
    } else {
        file.producers
            .iter()
            .rev()
            .filter_map(|id| dataset.task(*id))
            .find(|producer| producer.lifecycle.time_worker_end < start)
            .map(|producer| start - producer.lifecycle.time_worker_end)
            .unwrap_or(0.0)
    };

    let worker_holding = file
        .worker_holding
        .iter()
        .map(|h| {
            format!(
                "worker{}: {:.2}s-{:.2}s ({:.2}s)",
                h.worker_id,
                h.stage_in - origin,
                h.stage_out - origin,
                h.lifetime
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    InputFileRow {
        filename: file.filename.clone(),
        size_mb: file.size_mb,
        waiting_time,
        dependency_time,
        producers: file.producers.clone(),
        consumers: file.consumers.clone(),
        worker_holding,
    }
}
