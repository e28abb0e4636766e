// src/timeline/layout.rs

//! Mapping of task, attempt and worker lifetimes onto `(time, row)` space.
//!
//! Per-record functions return `Result`; [`layout_trace`] runs them over a
//! whole dataset, turning per-record failures into diagnostics so that one
//! bad record never hides its siblings.

use serde::Serialize;
use tracing::{debug, warn};

use crate::config::model::TimelineSection;
use crate::errors::{Diagnostic, Result, TraceviewError};
use crate::timeline::axis::{self, AxisTick};
use crate::timeline::rows::{build_row_index, RowIndex, RowKey};
use crate::timeline::scale::{BandScale, LinearScale};
use crate::trace::{
    FailedAttemptRecord, GraphId, TaskExecutionRecord, TaskId, TraceDataset, WorkerId,
    WorkerSummary,
};
use crate::types::WorkerOrder;

/// Which lifecycle phase a rectangle stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalKind {
    /// Worker connection span.
    Worker,
    /// Dispatched but not started on the worker.
    Queued,
    Executing,
    /// Execution of a task re-run to regenerate lost files.
    RecoveryExecuting,
    WaitingRetrieval,
    Failed,
}

/// Back-reference from a rectangle to the record it was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecordRef {
    Worker { worker_id: WorkerId },
    Task { task_id: TaskId, try_id: u32 },
    FailedAttempt { task_id: TaskId, try_id: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TimelineRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Row the rectangle sits on; for worker bands, the worker's first core.
    pub row: RowKey,
    pub kind: IntervalKind,
    pub record: RecordRef,
}

/// Which optional phases of a successful task to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseOptions {
    pub show_queued: bool,
    pub show_waiting_retrieval: bool,
}

impl Default for PhaseOptions {
    fn default() -> Self {
        Self {
            show_queued: true,
            show_waiting_retrieval: false,
        }
    }
}

impl From<&TimelineSection> for PhaseOptions {
    fn from(section: &TimelineSection) -> Self {
        Self {
            show_queued: section.show_queued,
            show_waiting_retrieval: section.show_waiting_retrieval,
        }
    }
}

/// Row index plus the two scales, anchored at the trace start.
#[derive(Debug, Clone)]
pub struct TimelineGeometry {
    rows: RowIndex,
    x: LinearScale,
    y: BandScale,
    origin: f64,
}

impl TimelineGeometry {
    /// x maps `[0, duration]` seconds onto `[0, width]`; y stacks slots from
    /// the bottom (`height`) up to 0.
    pub fn new(rows: RowIndex, origin: f64, duration: f64, width: f64, height: f64, padding: f64) -> Self {
        let x = LinearScale::new((0.0, duration), (0.0, width));
        let y = BandScale::new(rows.len(), (height, 0.0), padding);
        Self { rows, x, y, origin }
    }

    pub fn rows(&self) -> &RowIndex {
        &self.rows
    }

    pub fn x_scale(&self) -> &LinearScale {
        &self.x
    }

    pub fn y_scale(&self) -> &BandScale {
        &self.y
    }

    /// x of an absolute timestamp.
    pub fn time_to_x(&self, t: f64) -> f64 {
        self.x.map(t - self.origin)
    }

    pub fn row_to_y(&self, row: RowKey) -> Option<f64> {
        self.rows.slot(row).and_then(|slot| self.y.position(slot))
    }

    fn row_y(&self, row: RowKey, record: &str) -> Result<f64> {
        self.row_to_y(row).ok_or_else(|| TraceviewError::MissingRow {
            worker_id: row.worker_id,
            core_id: row.core,
            record: record.to_string(),
        })
    }

    fn span(&self, from: f64, to: f64, row: RowKey, y: f64, kind: IntervalKind, record: RecordRef) -> TimelineRect {
        let x0 = self.time_to_x(from);
        TimelineRect {
            x: x0,
            y,
            width: self.time_to_x(to) - x0,
            height: self.y.bandwidth(),
            row,
            kind,
            record,
        }
    }
}

/// One band spanning all of a worker's rows for one connection span.
pub fn layout_worker_band(worker: &WorkerSummary, geometry: &TimelineGeometry) -> Result<TimelineRect> {
    worker.check_lifetime()?;

    let rows = geometry
        .rows()
        .worker_rows(worker.worker_id)
        .ok_or_else(|| TraceviewError::MissingRow {
            worker_id: worker.worker_id,
            core_id: 1,
            record: format!("worker {}", worker.worker_id),
        })?;

    let y = geometry
        .y_scale()
        .position(rows.first)
        .zip(geometry.y_scale().position(rows.last()))
        .map(|(a, b)| a.min(b))
        .ok_or_else(|| {
            TraceviewError::ConfigError(format!("worker {} rows outside band scale", worker.worker_id))
        })?;

    let x0 = geometry.time_to_x(worker.time_connected);
    Ok(TimelineRect {
        x: x0,
        y,
        width: geometry.time_to_x(worker.time_disconnected) - x0,
        height: geometry.y_scale().span_height(rows.cores),
        row: RowKey::new(worker.worker_id, 1),
        kind: IntervalKind::Worker,
        record: RecordRef::Worker {
            worker_id: worker.worker_id,
        },
    })
}

/// Rectangles for one successful task: execution always, plus the optional
/// queued and waiting-retrieval phases.
pub fn layout_task_interval(
    task: &TaskExecutionRecord,
    geometry: &TimelineGeometry,
    options: PhaseOptions,
) -> Result<Vec<TimelineRect>> {
    task.check_lifecycle()?;

    let row = RowKey::new(task.worker_id, task.core_id);
    let y = geometry.row_y(row, &format!("task {} try {}", task.task_id, task.try_id))?;
    let record = RecordRef::Task {
        task_id: task.task_id,
        try_id: task.try_id,
    };
    let lc = &task.lifecycle;

    let mut rects = Vec::with_capacity(3);
    if options.show_queued {
        rects.push(geometry.span(lc.when_running, lc.time_worker_start, row, y, IntervalKind::Queued, record));
    }

    let exec_kind = if task.is_recovery_task {
        IntervalKind::RecoveryExecuting
    } else {
        IntervalKind::Executing
    };
    rects.push(geometry.span(lc.time_worker_start, lc.time_worker_end, row, y, exec_kind, record));

    if options.show_waiting_retrieval {
        rects.push(geometry.span(
            lc.time_worker_end,
            lc.when_waiting_retrieval,
            row,
            y,
            IntervalKind::WaitingRetrieval,
            record,
        ));
    }

    Ok(rects)
}

/// The slot occupied by a failed try, from dispatch until it is free again.
pub fn layout_failed_interval(attempt: &FailedAttemptRecord, geometry: &TimelineGeometry) -> Result<TimelineRect> {
    attempt.check_interval()?;

    let row = RowKey::new(attempt.worker_id, attempt.core_id);
    let y = geometry.row_y(
        row,
        &format!("failed task {} try {}", attempt.task_id, attempt.try_id),
    )?;

    Ok(geometry.span(
        attempt.when_running,
        attempt.when_next_ready,
        row,
        y,
        IntervalKind::Failed,
        RecordRef::FailedAttempt {
            task_id: attempt.task_id,
            try_id: attempt.try_id,
        },
    ))
}

/// Everything the timeline view draws for one trace.
#[derive(Debug, Clone, Serialize)]
pub struct TimelineLayout {
    pub width: f64,
    pub height: f64,
    /// x domain in seconds since trace start.
    pub domain: (f64, f64),
    pub bandwidth: f64,
    pub rows: Vec<RowKey>,
    pub worker_bands: Vec<TimelineRect>,
    pub task_rects: Vec<TimelineRect>,
    pub failed_rects: Vec<TimelineRect>,
    pub x_ticks: Vec<f64>,
    pub y_ticks: Vec<AxisTick>,
    pub diagnostics: Vec<Diagnostic>,
}

impl TimelineLayout {
    /// All rectangles drawn for one record.
    pub fn rects_of(&self, record: RecordRef) -> impl Iterator<Item = &TimelineRect> {
        self.worker_bands
            .iter()
            .chain(self.task_rects.iter())
            .chain(self.failed_rects.iter())
            .filter(move |r| r.record == record)
    }
}

/// Order workers for row allocation.
pub fn order_workers(workers: &[WorkerSummary], order: WorkerOrder) -> Vec<WorkerSummary> {
    let mut ordered = workers.to_vec();
    if order == WorkerOrder::WorkerId {
        ordered.sort_by_key(|w| w.worker_id);
    }
    ordered
}

/// Lay out a whole dataset.
///
/// Fails only on setup errors (no workers, zero cores). Records that cannot
/// be placed are skipped and reported in `diagnostics`.
pub fn layout_trace(dataset: &TraceDataset, section: &TimelineSection) -> Result<TimelineLayout> {
    let workers = order_workers(dataset.workers(), section.worker_order);
    let rows = build_row_index(&workers)?;
    let geometry = TimelineGeometry::new(
        rows,
        dataset.trace_start(),
        dataset.duration(),
        section.width,
        section.height,
        section.row_padding,
    );
    let options = PhaseOptions::from(section);

    let mut diagnostics = Vec::new();
    let mut record_failure = |err: TraceviewError| {
        match &err {
            TraceviewError::MissingRow { .. } => warn!(error = %err, "record dropped: no row"),
            _ => warn!(error = %err, "record skipped"),
        }
        diagnostics.push(err.to_diagnostic());
    };

    let mut worker_bands = Vec::with_capacity(workers.len());
    for worker in &workers {
        match layout_worker_band(worker, &geometry) {
            Ok(rect) => worker_bands.push(rect),
            Err(err) => record_failure(err),
        }
    }

    let mut task_rects = Vec::with_capacity(dataset.tasks().len() * 2);
    for task in dataset.tasks() {
        match layout_task_interval(task, &geometry, options) {
            Ok(rects) => task_rects.extend(rects),
            Err(err) => record_failure(err),
        }
    }

    let mut failed_rects = Vec::with_capacity(dataset.failed_attempts().len());
    for attempt in dataset.failed_attempts() {
        match layout_failed_interval(attempt, &geometry) {
            Ok(rect) => failed_rects.push(rect),
            Err(err) => record_failure(err),
        }
    }

    let domain = geometry.x_scale().domain();
    let y_ticks = axis::worker_ticks(&geometry, section.max_worker_ticks);

    debug!(
        bands = worker_bands.len(),
        tasks = task_rects.len(),
        failed = failed_rects.len(),
        diagnostics = diagnostics.len(),
        "timeline laid out"
    );

    Ok(TimelineLayout {
        width: section.width,
        height: section.height,
        domain,
        bandwidth: geometry.y_scale().bandwidth(),
        rows: geometry.rows().keys().to_vec(),
        worker_bands,
        task_rects,
        failed_rects,
        x_ticks: axis::quarter_ticks(domain),
        y_ticks,
        diagnostics,
    })
}

/// Execution intervals of a graph's critical tasks on a single band.
#[derive(Debug, Clone, Serialize)]
pub struct CriticalStrip {
    pub graph_id: GraphId,
    pub domain: (f64, f64),
    pub x_ticks: Vec<f64>,
    pub rects: Vec<StripRect>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StripRect {
    pub x: f64,
    pub width: f64,
    pub height: f64,
    pub task_id: TaskId,
}

/// Lay the critical tasks of `graph_id` on one band whose x domain is the
/// graph's own span.
pub fn layout_critical_strip(
    dataset: &TraceDataset,
    graph_id: GraphId,
    width: f64,
    height: f64,
) -> Result<CriticalStrip> {
    let graph = dataset
        .graph(graph_id)
        .ok_or(TraceviewError::GraphNotFound(graph_id))?;
    let (start, end) = dataset
        .graph_span(graph_id)
        .ok_or(TraceviewError::GraphNotFound(graph_id))?;

    let x = LinearScale::new((0.0, end - start), (0.0, width));
    let band = BandScale::new(1, (height, 0.0), 0.0);

    let mut rects = Vec::with_capacity(graph.critical_tasks.len());
    let mut diagnostics = Vec::new();
    for &task_id in &graph.critical_tasks {
        let Some(task) = dataset.task(task_id) else {
            let err = TraceviewError::TraceIntegrity(format!(
                "critical task {task_id} of graph {graph_id} has no execution record"
            ));
            warn!(error = %err, "critical strip entry skipped");
            diagnostics.push(err.to_diagnostic());
            continue;
        };
        let x0 = x.map(task.lifecycle.time_worker_start - start);
        rects.push(StripRect {
            x: x0,
            width: x.map(task.lifecycle.time_worker_end - start) - x0,
            height: band.bandwidth(),
            task_id,
        });
    }

    Ok(CriticalStrip {
        graph_id,
        domain: x.domain(),
        x_ticks: axis::quarter_ticks(x.domain()),
        rects,
        diagnostics,
    })
}
