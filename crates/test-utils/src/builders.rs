#![allow(dead_code)]

use traceview::config::{ConfigFile, RawConfigFile};
use traceview::trace::{
    DiskUsageSample, FailedAttemptRecord, FileHolding, FileRecord, GraphRecord, TaskExecutionRecord, TaskLifecycle,
    TraceDataset, TraceParts, WorkerSummary,
};
use traceview::types::{GraphForm, WorkerOrder};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.config.timeline.width = width;
        self.config.timeline.height = height;
        self
    }

    pub fn with_disk_height(mut self, height: f64) -> Self {
        self.config.timeline.disk_height = height;
        self
    }

    pub fn with_row_padding(mut self, padding: f64) -> Self {
        self.config.timeline.row_padding = padding;
        self
    }

    pub fn show_queued(mut self, val: bool) -> Self {
        self.config.timeline.show_queued = val;
        self
    }

    pub fn show_waiting_retrieval(mut self, val: bool) -> Self {
        self.config.timeline.show_waiting_retrieval = val;
        self
    }

    pub fn with_worker_order(mut self, order: WorkerOrder) -> Self {
        self.config.timeline.worker_order = order;
        self
    }

    pub fn with_graph_form(mut self, form: GraphForm) -> Self {
        self.config.dag.form = form;
        self
    }

    pub fn with_root(mut self, root: &str) -> Self {
        self.config.trace.root = root.to_string();
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `TaskExecutionRecord`.
///
/// Timestamps are laid out from `start` with one second between each
/// lifecycle step by default; execution spans `[start + 2, start + 2 + exec]`.
pub struct TaskBuilder {
    task: TaskExecutionRecord,
}

impl TaskBuilder {
    pub fn new(task_id: u64) -> Self {
        Self {
            task: TaskExecutionRecord {
                task_id,
                try_id: 1,
                worker_id: 1,
                core_id: 1,
                category: "<default>".to_string(),
                graph_id: None,
                lifecycle: lifecycle_from(0.0, 1.0),
                input_files: Vec::new(),
                output_files: Vec::new(),
                size_input_mb: 0.0,
                size_output_mb: 0.0,
                critical_input_file: None,
                is_recovery_task: false,
            },
        }
    }

    pub fn on(mut self, worker_id: u32, core_id: u32) -> Self {
        self.task.worker_id = worker_id;
        self.task.core_id = core_id;
        self
    }

    pub fn try_id(mut self, try_id: u32) -> Self {
        self.task.try_id = try_id;
        self
    }

    pub fn graph(mut self, graph_id: u32) -> Self {
        self.task.graph_id = Some(graph_id);
        self
    }

    /// Lifecycle starting at `start`, executing for `exec` seconds.
    pub fn timed(mut self, start: f64, exec: f64) -> Self {
        self.task.lifecycle = lifecycle_from(start, exec);
        self
    }

    pub fn lifecycle(mut self, lifecycle: TaskLifecycle) -> Self {
        self.task.lifecycle = lifecycle;
        self
    }

    pub fn inputs(mut self, files: &[&str]) -> Self {
        self.task.input_files = files.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn outputs(mut self, files: &[&str]) -> Self {
        self.task.output_files = files.iter().map(|f| f.to_string()).collect();
        self
    }

    pub fn recovery(mut self) -> Self {
        self.task.is_recovery_task = true;
        self
    }

    pub fn category(mut self, category: &str) -> Self {
        self.task.category = category.to_string();
        self
    }

    pub fn build(self) -> TaskExecutionRecord {
        self.task
    }
}

/// ready, running, worker start, worker end, waiting retrieval, retrieved, done.
pub fn lifecycle_from(start: f64, exec: f64) -> TaskLifecycle {
    TaskLifecycle {
        when_ready: start,
        when_running: start + 1.0,
        time_worker_start: start + 2.0,
        time_worker_end: start + 2.0 + exec,
        when_waiting_retrieval: start + 3.0 + exec,
        when_retrieved: start + 4.0 + exec,
        when_done: start + 5.0 + exec,
    }
}

pub fn worker(worker_id: u32, cores: u32, connected: f64, disconnected: f64) -> WorkerSummary {
    WorkerSummary {
        worker_id,
        hash: format!("hash-{worker_id}"),
        machine_name: format!("machine-{worker_id}"),
        cores,
        time_connected: connected,
        time_disconnected: disconnected,
    }
}

pub fn failed_attempt(
    task_id: u64,
    worker_id: u32,
    core_id: u32,
    when_running: f64,
    when_next_ready: f64,
) -> FailedAttemptRecord {
    FailedAttemptRecord {
        task_id,
        try_id: 1,
        worker_id,
        core_id,
        when_ready: when_running,
        when_running,
        when_next_ready,
    }
}

pub fn graph(graph_id: u32, critical_tasks: &[u64]) -> GraphRecord {
    GraphRecord {
        graph_id,
        num_tasks: critical_tasks.len(),
        critical_tasks: critical_tasks.to_vec(),
        time_critical_nodes: Vec::new(),
        time_critical_edges: Vec::new(),
        time_critical_path: 0.0,
    }
}

/// File with holdings given as `(worker_id, stage_in, stage_out)`.
pub fn file(name: &str, producers: &[u64], consumers: &[u64], holdings: &[(u32, f64, f64)]) -> FileRecord {
    FileRecord {
        filename: name.to_string(),
        size_mb: 1.0,
        producers: producers.to_vec(),
        consumers: consumers.to_vec(),
        worker_holding: holdings
            .iter()
            .map(|&(worker_id, stage_in, stage_out)| FileHolding {
                worker_id,
                stage_in,
                stage_out,
                lifetime: stage_out - stage_in,
            })
            .collect(),
    }
}

/// Disk usage step; the percentage assumes a 100 MB disk.
pub fn disk_sample(worker_id: u32, filename: &str, time: f64, size_mb: f64, usage_mb: f64) -> DiskUsageSample {
    DiskUsageSample {
        worker_id,
        filename: filename.to_string(),
        time,
        size_mb,
        disk_usage_mb: usage_mb,
        disk_usage_pct: usage_mb / 100.0,
    }
}

/// Builder for `TraceDataset`.
pub struct DatasetBuilder {
    trace_id: String,
    parts: TraceParts,
}

impl DatasetBuilder {
    pub fn new(trace_id: &str) -> Self {
        Self {
            trace_id: trace_id.to_string(),
            parts: TraceParts::default(),
        }
    }

    pub fn bounds(mut self, start: f64, end: f64) -> Self {
        self.parts.trace_start = Some(start);
        self.parts.trace_end = Some(end);
        self
    }

    pub fn worker(mut self, worker: WorkerSummary) -> Self {
        self.parts.workers.push(worker);
        self
    }

    pub fn task(mut self, task: TaskExecutionRecord) -> Self {
        self.parts.tasks.push(task);
        self
    }

    pub fn failed(mut self, attempt: FailedAttemptRecord) -> Self {
        self.parts.failed_attempts.push(attempt);
        self
    }

    pub fn file(mut self, file: FileRecord) -> Self {
        self.parts.files.push(file);
        self
    }

    pub fn graph(mut self, graph: GraphRecord) -> Self {
        self.parts.graphs.push(graph);
        self
    }

    pub fn disk(mut self, sample: DiskUsageSample) -> Self {
        self.parts.disk_usage.push(sample);
        self
    }

    pub fn build(self) -> TraceDataset {
        TraceDataset::new(self.trace_id, self.parts)
    }
}

/// A small trace: two workers (2 cores and 1 core), a three-task chain
/// `1 -> fileA -> 2 -> fileB -> 3` in graph 1, and one failed try.
pub fn chain_dataset(trace_id: &str) -> TraceDataset {
    DatasetBuilder::new(trace_id)
        .bounds(0.0, 100.0)
        .worker(worker(1, 2, 0.0, 100.0))
        .worker(worker(2, 1, 10.0, 90.0))
        .task(TaskBuilder::new(1).on(1, 1).graph(1).timed(0.0, 5.0).outputs(&["fileA"]).build())
        .task(
            TaskBuilder::new(2)
                .on(1, 2)
                .graph(1)
                .timed(10.0, 5.0)
                .inputs(&["fileA"])
                .outputs(&["fileB"])
                .build(),
        )
        .task(TaskBuilder::new(3).on(2, 1).graph(1).timed(20.0, 5.0).inputs(&["fileB"]).build())
        .failed(failed_attempt(4, 2, 1, 40.0, 45.0))
        .file(file("fileA", &[1], &[2], &[(1, 7.0, 30.0)]))
        .file(file("fileB", &[2], &[3], &[(1, 17.0, 40.0), (2, 19.0, 40.0)]))
        .graph(graph(1, &[1, 2, 3]))
        .build()
}
