// src/trace/loader.rs

//! Loading trace tables from a log directory.
//!
//! Layout on disk, relative to the configured root:
//!
//! ```text
//! <root>/<trace_id>/<log_subdir>/task_done.csv
//!                               /task_failed_on_worker.csv   (optional)
//!                               /worker_summary.csv
//!                               /file_info.csv               (optional)
//!                               /general_statistics_dag.csv  (optional)
//!                               /general_statistics_manager.csv (optional)
//!                               /worker_disk_usage.csv       (optional)
//!                               /subgraph_<graph_id>.svg     (optional)
//! ```

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::model::TraceSection;
use crate::dag::DependencyGraph;
use crate::errors::{Result, TraceviewError};
use crate::fs::{FileSystem, RealFileSystem};
use crate::trace::dataset::{TraceDataset, TraceParts};
use crate::trace::model::{
    DiskUsageSample, FailedAttemptRecord, FileHolding, FileRecord, GraphId, GraphRecord,
    TaskExecutionRecord, TaskId, TaskLifecycle, WorkerSummary,
};

const TASK_DONE: &str = "task_done.csv";
const TASK_FAILED_ON_WORKER: &str = "task_failed_on_worker.csv";
const WORKER_SUMMARY: &str = "worker_summary.csv";
const FILE_INFO: &str = "file_info.csv";
const GRAPH_INFO: &str = "general_statistics_dag.csv";
const MANAGER_INFO: &str = "general_statistics_manager.csv";
const WORKER_DISK_USAGE: &str = "worker_disk_usage.csv";

/// Source of trace datasets.
///
/// Loading is all-or-nothing: an `Ok` dataset is complete.
pub trait TraceLoader: Send + Sync + Debug {
    /// Identifiers of the traces that can be loaded.
    fn list_traces(&self) -> Result<Vec<String>>;

    fn load(&self, trace_id: &str) -> Result<TraceDataset>;

    /// Externally rendered graph image of one DAG, if the log writer made one.
    fn load_graph_svg(&self, trace_id: &str, graph_id: GraphId) -> Result<Option<String>>;
}

/// Loader for the CSV tables written by the log post-processing step.
#[derive(Debug, Clone)]
pub struct CsvTraceLoader {
    fs: Arc<dyn FileSystem>,
    root: PathBuf,
    log_subdir: String,
}

impl CsvTraceLoader {
    pub fn new(fs: Arc<dyn FileSystem>, root: impl Into<PathBuf>, log_subdir: impl Into<String>) -> Self {
        Self {
            fs,
            root: root.into(),
            log_subdir: log_subdir.into(),
        }
    }

    /// Loader over the real filesystem, configured from `[trace]`.
    pub fn from_config(section: &TraceSection) -> Self {
        Self::new(
            Arc::new(RealFileSystem),
            PathBuf::from(&section.root),
            section.log_subdir.clone(),
        )
    }

    fn log_dir(&self, trace_id: &str) -> PathBuf {
        self.root.join(trace_id).join(&self.log_subdir)
    }

    fn read_table<R: DeserializeOwned>(&self, path: &Path) -> Result<Vec<R>> {
        let reader = self.fs.open_read(path)?;
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut rows = Vec::new();
        for row in csv_reader.deserialize() {
            rows.push(row?);
        }
        debug!(path = %path.display(), rows = rows.len(), "read trace table");
        Ok(rows)
    }

    fn read_optional_table<R: DeserializeOwned>(&self, path: &Path) -> Result<Vec<R>> {
        if !self.fs.is_file(path) {
            debug!(path = %path.display(), "optional trace table missing");
            return Ok(Vec::new());
        }
        self.read_table(path)
    }
}

impl TraceLoader for CsvTraceLoader {
    fn list_traces(&self) -> Result<Vec<String>> {
        let mut traces = Vec::new();
        for name in self.fs.subdirectories(&self.root)? {
            if self.fs.is_dir(&self.root.join(&name).join(&self.log_subdir)) {
                traces.push(name);
            }
        }
        Ok(traces)
    }

    fn load(&self, trace_id: &str) -> Result<TraceDataset> {
        let dir = self.log_dir(trace_id);
        if !self.fs.is_dir(&dir) {
            return Err(TraceviewError::TraceNotFound(trace_id.to_string()));
        }

        let tasks = self
            .read_table::<TaskRow>(&dir.join(TASK_DONE))?
            .into_iter()
            .map(TaskRow::into_record)
            .collect::<Result<Vec<_>>>()?;

        let workers = self
            .read_table::<WorkerRow>(&dir.join(WORKER_SUMMARY))?
            .into_iter()
            .map(WorkerRow::into_record)
            .collect::<Result<Vec<_>>>()?;

        let failed_attempts = self
            .read_optional_table::<FailedRow>(&dir.join(TASK_FAILED_ON_WORKER))?
            .into_iter()
            .filter_map(FailedRow::into_record)
            .collect::<Result<Vec<_>>>()?;

        let files = self
            .read_optional_table::<FileRow>(&dir.join(FILE_INFO))?
            .into_iter()
            .map(FileRow::into_record)
            .collect::<Result<Vec<_>>>()?;

        let graphs = self
            .read_optional_table::<GraphRow>(&dir.join(GRAPH_INFO))?
            .into_iter()
            .map(GraphRow::into_record)
            .collect::<Result<Vec<_>>>()?;

        let (tasks, graphs) = if tasks.is_empty() {
            (tasks, graphs)
        } else if graphs.is_empty() {
            derive_graphs(tasks)?
        } else if tasks.iter().all(|t| t.graph_id.is_none()) {
            (assign_graph_ids(tasks, &graphs), graphs)
        } else {
            (tasks, graphs)
        };

        let disk_usage = self
            .read_optional_table::<DiskUsageRow>(&dir.join(WORKER_DISK_USAGE))?
            .into_iter()
            .map(DiskUsageRow::into_record)
            .collect::<Result<Vec<_>>>()?;

        let manager = self
            .read_optional_table::<ManagerRow>(&dir.join(MANAGER_INFO))?
            .into_iter()
            .next();

        info!(
            trace = %trace_id,
            tasks = tasks.len(),
            failed = failed_attempts.len(),
            workers = workers.len(),
            files = files.len(),
            graphs = graphs.len(),
            disk_samples = disk_usage.len(),
            "trace loaded"
        );

        Ok(TraceDataset::new(
            trace_id,
            TraceParts {
                tasks,
                failed_attempts,
                workers,
                files,
                graphs,
                disk_usage,
                trace_start: manager.as_ref().and_then(|m| m.time_start),
                trace_end: manager.as_ref().and_then(|m| m.time_end),
            },
        ))
    }

    fn load_graph_svg(&self, trace_id: &str, graph_id: GraphId) -> Result<Option<String>> {
        let path = self.log_dir(trace_id).join(format!("subgraph_{graph_id}.svg"));
        if !self.fs.is_file(&path) {
            return Ok(None);
        }
        Ok(Some(self.fs.read_to_string(&path)?))
    }
}

/// Rebuild graphs and critical paths from the task file lists when the log
/// writer did not provide them. Tasks without a graph id get their
/// component's id.
fn derive_graphs(
    mut tasks: Vec<TaskExecutionRecord>,
) -> Result<(Vec<TaskExecutionRecord>, Vec<GraphRecord>)> {
    let graph = DependencyGraph::from_tasks(&tasks);
    let graphs = graph.graph_records()?;
    for task in tasks.iter_mut().filter(|t| t.graph_id.is_none()) {
        task.graph_id = graph.graph_of(task.task_id);
    }
    info!(graphs = graphs.len(), "graph table missing; derived from task files");
    Ok((tasks, graphs))
}

/// Give every task the id of its component's graph when the graph table
/// exists but the task table has no `graph_id` column. A component takes
/// the id of the table graph listing one of its tasks as critical, else its
/// own 1-based index.
fn assign_graph_ids(
    mut tasks: Vec<TaskExecutionRecord>,
    graphs: &[GraphRecord],
) -> Vec<TaskExecutionRecord> {
    let listed: HashMap<TaskId, GraphId> = graphs
        .iter()
        .flat_map(|g| g.critical_tasks.iter().map(move |&t| (t, g.graph_id)))
        .collect();

    let graph = DependencyGraph::from_tasks(&tasks);
    let component_ids: Vec<GraphId> = graph
        .components()
        .iter()
        .enumerate()
        .map(|(idx, component)| {
            component
                .iter()
                .find_map(|t| listed.get(t).copied())
                .unwrap_or(idx as GraphId + 1)
        })
        .collect();

    for task in &mut tasks {
        task.graph_id = graph
            .graph_of(task.task_id)
            .map(|g| component_ids[g as usize - 1]);
    }
    info!(
        components = component_ids.len(),
        "tasks carry no graph id; assigned from dependency components"
    );
    tasks
}

// ---------------------------------------------------------------------------
// Row structs. Numeric ids are read as floats because the writer emits
// pandas columns that may have been promoted to float ("3.0").

#[derive(Debug, Deserialize)]
struct TaskRow {
    task_id: f64,
    try_id: f64,
    worker_id: f64,
    core_id: f64,
    #[serde(default)]
    category: String,
    #[serde(default)]
    graph_id: Option<f64>,
    when_ready: f64,
    when_running: f64,
    time_worker_start: f64,
    time_worker_end: f64,
    when_waiting_retrieval: f64,
    when_retrieved: f64,
    when_done: f64,
    #[serde(default)]
    input_files: String,
    #[serde(default)]
    output_files: String,
    #[serde(rename = "size_input_files(MB)", default)]
    size_input_mb: Option<f64>,
    #[serde(rename = "size_output_files(MB)", default)]
    size_output_mb: Option<f64>,
    #[serde(default)]
    critical_input_file: Option<String>,
    #[serde(default)]
    is_recovery_task: String,
}

impl TaskRow {
    fn into_record(self) -> Result<TaskExecutionRecord> {
        let task_id = to_id(self.task_id, "task_id")?;
        let graph_id = match self.graph_id {
            Some(g) if g >= 1.0 => Some(to_id(g, "graph_id")?),
            _ => None,
        };
        Ok(TaskExecutionRecord {
            task_id,
            try_id: to_id(self.try_id, "try_id")?,
            worker_id: to_id(self.worker_id, "worker_id")?,
            core_id: to_id(self.core_id, "core_id")?,
            category: self.category,
            graph_id,
            lifecycle: TaskLifecycle {
                when_ready: self.when_ready,
                when_running: self.when_running,
                time_worker_start: self.time_worker_start,
                time_worker_end: self.time_worker_end,
                when_waiting_retrieval: self.when_waiting_retrieval,
                when_retrieved: self.when_retrieved,
                when_done: self.when_done,
            },
            input_files: parse_py_list(&self.input_files),
            output_files: parse_py_list(&self.output_files),
            size_input_mb: self.size_input_mb.unwrap_or(0.0),
            size_output_mb: self.size_output_mb.unwrap_or(0.0),
            critical_input_file: self
                .critical_input_file
                .filter(|s| !s.is_empty() && s != "None" && s != "nan"),
            is_recovery_task: parse_py_bool(&self.is_recovery_task),
        })
    }
}

#[derive(Debug, Deserialize)]
struct FailedRow {
    task_id: f64,
    try_id: f64,
    worker_id: Option<f64>,
    core_id: Option<f64>,
    when_ready: f64,
    when_running: Option<f64>,
    when_next_ready: Option<f64>,
}

impl FailedRow {
    /// Attempts that never reached a worker have no slot; they are skipped.
    fn into_record(self) -> Option<Result<FailedAttemptRecord>> {
        let (Some(worker_id), Some(core_id), Some(when_running), Some(when_next_ready)) =
            (self.worker_id, self.core_id, self.when_running, self.when_next_ready)
        else {
            debug!(task_id = self.task_id, "failed attempt without worker slot skipped");
            return None;
        };

        let build = || -> Result<FailedAttemptRecord> {
            Ok(FailedAttemptRecord {
                task_id: to_id(self.task_id, "task_id")?,
                try_id: to_id(self.try_id, "try_id")?,
                worker_id: to_id(worker_id, "worker_id")?,
                core_id: to_id(core_id, "core_id")?,
                when_ready: self.when_ready,
                when_running,
                when_next_ready,
            })
        };
        Some(build())
    }
}

#[derive(Debug, Deserialize)]
struct WorkerRow {
    worker_id: f64,
    #[serde(default)]
    worker_hash: String,
    #[serde(default)]
    worker_machine_name: String,
    cores: f64,
    time_connected: f64,
    time_disconnected: f64,
}

impl WorkerRow {
    fn into_record(self) -> Result<WorkerSummary> {
        Ok(WorkerSummary {
            worker_id: to_id(self.worker_id, "worker_id")?,
            hash: self.worker_hash,
            machine_name: self.worker_machine_name,
            cores: to_id(self.cores, "cores")?,
            time_connected: self.time_connected,
            time_disconnected: self.time_disconnected,
        })
    }
}

#[derive(Debug, Deserialize)]
struct FileRow {
    filename: String,
    #[serde(rename = "size(MB)", default)]
    size_mb: Option<f64>,
    #[serde(default)]
    producers: String,
    #[serde(default)]
    consumers: String,
    #[serde(default)]
    worker_holding: String,
}

impl FileRow {
    fn into_record(self) -> Result<FileRecord> {
        let producers = parse_id_list(&self.producers, "producers")?;
        let consumers = parse_id_list(&self.consumers, "consumers")?;

        let mut worker_holding = Vec::new();
        for entry in parse_nested_py_list(&self.worker_holding) {
            let [worker_id, stage_in, stage_out, lifetime] = entry.as_slice() else {
                warn!(file = %self.filename, ?entry, "malformed worker_holding entry skipped");
                continue;
            };
            worker_holding.push(FileHolding {
                worker_id: to_id(parse_number(worker_id, "worker_holding")?, "worker_id")?,
                stage_in: parse_number(stage_in, "worker_holding")?,
                stage_out: parse_number(stage_out, "worker_holding")?,
                lifetime: parse_number(lifetime, "worker_holding")?,
            });
        }
        worker_holding.sort_by(|a, b| a.stage_in.total_cmp(&b.stage_in));

        Ok(FileRecord {
            filename: self.filename,
            size_mb: self.size_mb.unwrap_or(0.0),
            producers,
            consumers,
            worker_holding,
        })
    }
}

#[derive(Debug, Deserialize)]
struct GraphRow {
    graph_id: f64,
    #[serde(default)]
    num_tasks: Option<f64>,
    #[serde(default)]
    critical_tasks: String,
    #[serde(default)]
    time_critical_nodes: String,
    #[serde(default)]
    time_critical_edges: String,
    #[serde(default)]
    time_critical_path: Option<f64>,
}

impl GraphRow {
    fn into_record(self) -> Result<GraphRecord> {
        let critical_tasks = parse_id_list(&self.critical_tasks, "critical_tasks")?;
        Ok(GraphRecord {
            graph_id: to_id(self.graph_id, "graph_id")?,
            num_tasks: self
                .num_tasks
                .map(|n| to_id::<u32>(n, "num_tasks"))
                .transpose()?
                .map(|n| n as usize)
                .unwrap_or(critical_tasks.len()),
            critical_tasks,
            time_critical_nodes: parse_number_list(&self.time_critical_nodes, "time_critical_nodes")?,
            time_critical_edges: parse_number_list(&self.time_critical_edges, "time_critical_edges")?,
            time_critical_path: self.time_critical_path.unwrap_or(0.0),
        })
    }
}

#[derive(Debug, Deserialize)]
struct DiskUsageRow {
    worker_id: f64,
    #[serde(default)]
    filename: String,
    time: f64,
    #[serde(rename = "size(MB)", default)]
    size_mb: Option<f64>,
    #[serde(rename = "disk_usage(MB)")]
    disk_usage_mb: f64,
    #[serde(rename = "disk_usage(%)", default)]
    disk_usage_pct: Option<f64>,
}

impl DiskUsageRow {
    fn into_record(self) -> Result<DiskUsageSample> {
        Ok(DiskUsageSample {
            worker_id: to_id(self.worker_id, "worker_id")?,
            filename: self.filename,
            time: self.time,
            size_mb: self.size_mb.unwrap_or(0.0),
            disk_usage_mb: self.disk_usage_mb,
            disk_usage_pct: self.disk_usage_pct.unwrap_or(0.0),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ManagerRow {
    #[serde(default)]
    time_start: Option<f64>,
    #[serde(default)]
    time_end: Option<f64>,
}

// ---------------------------------------------------------------------------
// Python-literal helpers.

static INNER_LIST: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\[\]]*)\]").expect("static regex"));

/// Parse `['a', "b", 3]` into its items with quotes removed.
///
/// Commas inside quotes belong to the item. A backslash inside quotes
/// escapes the next character. Unquoted items are trimmed; quoted ones are
/// kept as written.
pub fn parse_py_list(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    let inner = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    let mut items = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut open: Option<char> = None;
    let mut chars = inner.chars();

    while let Some(c) = chars.next() {
        match (open, c) {
            (Some(_), '\\') => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            (Some(q), c) if c == q => open = None,
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                if current.trim().is_empty() {
                    current.clear();
                }
                open = Some(c);
                quoted = true;
            }
            (None, ',') => {
                push_item(&mut items, std::mem::take(&mut current), quoted);
                quoted = false;
            }
            (None, c) if quoted && c.is_whitespace() => {}
            (None, c) => current.push(c),
        }
    }
    push_item(&mut items, current, quoted);
    items
}

fn push_item(items: &mut Vec<String>, item: String, quoted: bool) {
    let item = if quoted { item } else { item.trim().to_string() };
    if !item.is_empty() {
        items.push(item);
    }
}

/// Parse `[[1, 2.0], [3, 4.0]]` into a list of item lists.
pub fn parse_nested_py_list(raw: &str) -> Vec<Vec<String>> {
    let trimmed = raw.trim();
    let outer = trimmed
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .unwrap_or(trimmed);

    INNER_LIST
        .captures_iter(outer)
        .map(|caps| parse_py_list(&caps[1]))
        .collect()
}

fn parse_py_bool(raw: &str) -> bool {
    matches!(raw.trim(), "True" | "true" | "1" | "1.0")
}

fn parse_number(raw: &str, column: &str) -> Result<f64> {
    raw.trim().parse::<f64>().map_err(|_| {
        TraceviewError::TraceIntegrity(format!("column {column}: '{raw}' is not a number"))
    })
}

fn parse_number_list(raw: &str, column: &str) -> Result<Vec<f64>> {
    parse_py_list(raw)
        .iter()
        .map(|item| parse_number(item, column))
        .collect()
}

fn parse_id_list<T: TryFrom<u64>>(raw: &str, column: &str) -> Result<Vec<T>> {
    parse_number_list(raw, column)?
        .into_iter()
        .map(|n| to_id(n, column))
        .collect()
}

/// Convert a float column value into an integral id.
fn to_id<T: TryFrom<u64>>(value: f64, column: &str) -> Result<T> {
    if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
        return Err(TraceviewError::TraceIntegrity(format!(
            "column {column}: {value} is not a valid id"
        )));
    }
    T::try_from(value as u64).map_err(|_| {
        TraceviewError::TraceIntegrity(format!("column {column}: {value} is out of range"))
    })
}
