// src/trace/dataset.rs

use std::collections::HashMap;

use crate::trace::model::{
    DiskUsageSample, FailedAttemptRecord, FileRecord, GraphId, GraphRecord, TaskExecutionRecord, TaskId,
    WorkerSummary,
};

/// Everything loaded for one trace.
///
/// A dataset is immutable once built; switching traces replaces it as a
/// whole (see [`crate::trace::TraceStore`]).
#[derive(Debug, Clone)]
pub struct TraceDataset {
    trace_id: String,
    tasks: Vec<TaskExecutionRecord>,
    failed_attempts: Vec<FailedAttemptRecord>,
    workers: Vec<WorkerSummary>,
    files: Vec<FileRecord>,
    graphs: Vec<GraphRecord>,
    /// Sorted by worker, then time.
    disk_usage: Vec<DiskUsageSample>,
    trace_start: f64,
    trace_end: f64,

    /// task_id -> index of its latest try in `tasks`.
    task_index: HashMap<TaskId, usize>,
    file_index: HashMap<String, usize>,
}

/// Raw parts handed to [`TraceDataset::new`].
#[derive(Debug, Clone, Default)]
pub struct TraceParts {
    pub tasks: Vec<TaskExecutionRecord>,
    pub failed_attempts: Vec<FailedAttemptRecord>,
    pub workers: Vec<WorkerSummary>,
    pub files: Vec<FileRecord>,
    pub graphs: Vec<GraphRecord>,
    pub disk_usage: Vec<DiskUsageSample>,
    pub trace_start: Option<f64>,
    pub trace_end: Option<f64>,
}

impl TraceDataset {
    /// Assemble a dataset and build its lookup indexes.
    ///
    /// When the trace bounds are not given they are derived from the worker
    /// connection spans, then from task timestamps.
    pub fn new(trace_id: impl Into<String>, parts: TraceParts) -> Self {
        let TraceParts {
            tasks,
            failed_attempts,
            workers,
            files,
            graphs,
            mut disk_usage,
            trace_start,
            trace_end,
        } = parts;

        disk_usage.sort_by(|a, b| {
            a.worker_id
                .cmp(&b.worker_id)
                .then(a.time.total_cmp(&b.time))
        });

        let mut task_index: HashMap<TaskId, usize> = HashMap::new();
        for (idx, task) in tasks.iter().enumerate() {
            match task_index.get(&task.task_id) {
                Some(&prev) if tasks[prev].try_id >= task.try_id => {}
                _ => {
                    task_index.insert(task.task_id, idx);
                }
            }
        }

        let file_index = files
            .iter()
            .enumerate()
            .map(|(idx, f)| (f.filename.clone(), idx))
            .collect();

        let derived_start = workers
            .iter()
            .map(|w| w.time_connected)
            .chain(tasks.iter().map(|t| t.lifecycle.when_ready))
            .fold(f64::INFINITY, f64::min);
        let derived_end = workers
            .iter()
            .map(|w| w.time_disconnected)
            .chain(tasks.iter().map(|t| t.lifecycle.when_done))
            .fold(f64::NEG_INFINITY, f64::max);

        let trace_start = trace_start
            .or_else(|| derived_start.is_finite().then_some(derived_start))
            .unwrap_or(0.0);
        let trace_end = trace_end
            .or_else(|| derived_end.is_finite().then_some(derived_end))
            .unwrap_or(trace_start);

        Self {
            trace_id: trace_id.into(),
            tasks,
            failed_attempts,
            workers,
            files,
            graphs,
            disk_usage,
            trace_start,
            trace_end,
            task_index,
            file_index,
        }
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn tasks(&self) -> &[TaskExecutionRecord] {
        &self.tasks
    }

    pub fn failed_attempts(&self) -> &[FailedAttemptRecord] {
        &self.failed_attempts
    }

    pub fn workers(&self) -> &[WorkerSummary] {
        &self.workers
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn graphs(&self) -> &[GraphRecord] {
        &self.graphs
    }

    pub fn disk_usage(&self) -> &[DiskUsageSample] {
        &self.disk_usage
    }

    pub fn trace_start(&self) -> f64 {
        self.trace_start
    }

    pub fn trace_end(&self) -> f64 {
        self.trace_end
    }

    /// Length of the trace in seconds; the timeline's x domain is `[0, duration]`.
    pub fn duration(&self) -> f64 {
        (self.trace_end - self.trace_start).max(0.0)
    }

    /// Latest successful try of a task.
    pub fn task(&self, task_id: TaskId) -> Option<&TaskExecutionRecord> {
        self.task_index.get(&task_id).map(|&idx| &self.tasks[idx])
    }

    pub fn file(&self, filename: &str) -> Option<&FileRecord> {
        self.file_index.get(filename).map(|&idx| &self.files[idx])
    }

    pub fn graph(&self, graph_id: GraphId) -> Option<&GraphRecord> {
        self.graphs.iter().find(|g| g.graph_id == graph_id)
    }

    pub fn graph_ids(&self) -> Vec<GraphId> {
        self.graphs.iter().map(|g| g.graph_id).collect()
    }

    /// Tasks that belong to a graph, in table order.
    pub fn tasks_in_graph(&self, graph_id: GraphId) -> impl Iterator<Item = &TaskExecutionRecord> {
        self.tasks
            .iter()
            .filter(move |t| t.graph_id == Some(graph_id))
    }

    /// Time span of a graph: earliest `when_ready` to latest `when_done` of
    /// its tasks. Falls back to the critical tasks when no task carries the
    /// graph id.
    pub fn graph_span(&self, graph_id: GraphId) -> Option<(f64, f64)> {
        let mut start = f64::INFINITY;
        let mut end = f64::NEG_INFINITY;

        for t in self.tasks_in_graph(graph_id) {
            start = start.min(t.lifecycle.when_ready);
            end = end.max(t.lifecycle.when_done);
        }

        if !start.is_finite() {
            let graph = self.graph(graph_id)?;
            for t in graph.critical_tasks.iter().filter_map(|id| self.task(*id)) {
                start = start.min(t.lifecycle.when_ready);
                end = end.max(t.lifecycle.when_done);
            }
        }

        (start.is_finite() && end.is_finite()).then_some((start, end))
    }
}
