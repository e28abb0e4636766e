// src/engine/mod.rs

//! Event adapter between the viewer surface and the pure engines.
//!
//! The pure core state machine lives in [`core`]; it consumes
//! [`ViewerEvent`]s and returns commands. The async/IO shell in [`runtime`]
//! feeds it events, runs trace loads off the event loop and forwards view
//! commands to a render backend.

use std::collections::HashMap;

use serde::Serialize;

use crate::dag::{CriticalPath, DagPhase, NodeFill, TaskAnalysis};
use crate::errors::{Diagnostic, Result};
use crate::timeline::{CriticalStrip, DiskUsageLayout, RecordRef, RectFill, TimelineLayout};
use crate::trace::{GraphId, TaskId, TraceDataset, TraceLoader, WorkerId};
use crate::types::DiskUnit;

/// A dataset plus the rendered graph images that came with it.
#[derive(Debug, Clone)]
pub struct LoadedTrace {
    pub dataset: TraceDataset,
    pub svgs: HashMap<GraphId, String>,
}

/// Load a dataset and every graph image the loader can find for it.
pub fn load_trace(loader: &dyn TraceLoader, trace_id: &str) -> Result<LoadedTrace> {
    let dataset = loader.load(trace_id)?;
    let mut svgs = HashMap::new();
    for graph_id in dataset.graph_ids() {
        if let Some(svg) = loader.load_graph_svg(trace_id, graph_id)? {
            svgs.insert(graph_id, svg);
        }
    }
    Ok(LoadedTrace { dataset, svgs })
}

/// Events flowing into the viewer.
#[derive(Debug)]
pub enum ViewerEvent {
    /// The user picked a trace.
    TraceRequested { trace_id: String },
    /// A load started for ticket `seq` finished.
    TraceLoaded {
        seq: u64,
        trace_id: String,
        result: Result<LoadedTrace>,
    },
    DagSelected { graph_id: GraphId },
    CriticalPathToggled,
    /// `None` clears the analysis mark.
    TaskAnalyzed { task_id: Option<TaskId> },
    TimelineHovered { record: RecordRef },
    TimelineLeft,
    /// Redraw the disk usage chart in `unit`, emphasizing `highlight`.
    DiskUsageChanged {
        unit: DiskUnit,
        highlight: Option<WorkerId>,
    },
    ShutdownRequested,
}

impl ViewerEvent {
    /// Short name for logging; avoids dumping whole datasets.
    pub fn name(&self) -> &'static str {
        match self {
            ViewerEvent::TraceRequested { .. } => "trace_requested",
            ViewerEvent::TraceLoaded { .. } => "trace_loaded",
            ViewerEvent::DagSelected { .. } => "dag_selected",
            ViewerEvent::CriticalPathToggled => "critical_path_toggled",
            ViewerEvent::TaskAnalyzed { .. } => "task_analyzed",
            ViewerEvent::TimelineHovered { .. } => "timeline_hovered",
            ViewerEvent::TimelineLeft => "timeline_left",
            ViewerEvent::DiskUsageChanged { .. } => "disk_usage_changed",
            ViewerEvent::ShutdownRequested => "shutdown_requested",
        }
    }
}

/// Draw instructions for the rendering collaborator.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum ViewCommand {
    TraceReady {
        trace_id: String,
        graph_ids: Vec<GraphId>,
        tasks: usize,
        workers: usize,
        duration: f64,
    },
    LoadFailed {
        trace_id: String,
        diagnostic: Diagnostic,
    },
    DrawTimeline(Box<TimelineLayout>),
    SetRectFills { fills: Vec<RectFill> },
    DagPhaseChanged { phase: DagPhase },
    DrawDag {
        graph_id: GraphId,
        nodes: Vec<NodeFill>,
    },
    ApplyFills { fills: Vec<NodeFill> },
    ShowPath {
        graph_id: GraphId,
        path: CriticalPath,
    },
    HidePath { graph_id: GraphId },
    DrawCriticalStrip(CriticalStrip),
    ShowTaskAnalysis(Box<TaskAnalysis>),
    HideTaskAnalysis,
    DrawDiskUsage(Box<DiskUsageLayout>),
    ReportDiagnostics { diagnostics: Vec<Diagnostic> },
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use core::ViewerCore;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
