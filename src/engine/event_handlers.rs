// src/engine/event_handlers.rs

//! Event handling logic for the viewer core.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use crate::config::model::{DagSection, TimelineSection};
use crate::dag::{analyze_task, DagPhase, DagSession, GraphView};
use crate::engine::{LoadedTrace, ViewCommand};
use crate::errors::{Result, TraceviewError};
use crate::timeline::{
    layout_critical_strip, layout_disk_usage, layout_trace, DiskOptions, HoverState, RecordRef,
    TimelineLayout,
};
use crate::trace::{GraphId, LoadTicket, TaskId, TraceDataset, TraceStore};

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Load a trace off the event loop and report back with `TraceLoaded`.
    StartLoad(LoadTicket),
    /// Forward to the render backend.
    Render(ViewCommand),
    RequestExit,
}

/// Decision returned by the core after handling a single `ViewerEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub fn with(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }

    pub fn none() -> Self {
        Self::with(Vec::new())
    }

    /// View commands in order, ignoring load and exit commands.
    pub fn view_commands(&self) -> impl Iterator<Item = &ViewCommand> {
        self.commands.iter().filter_map(|c| match c {
            CoreCommand::Render(view) => Some(view),
            _ => None,
        })
    }
}

/// What the core shows for the current trace.
#[derive(Debug)]
pub struct ViewState {
    pub svgs: HashMap<GraphId, String>,
    pub layout: Option<TimelineLayout>,
    pub dag: DagSession,
    pub hover: HoverState,
    pub disk: DiskOptions,
}

impl ViewState {
    pub fn new(dag: &DagSection) -> Self {
        Self {
            svgs: HashMap::new(),
            layout: None,
            dag: DagSession::new(dag),
            hover: HoverState::default(),
            disk: DiskOptions::default(),
        }
    }
}

fn render(view: ViewCommand) -> CoreCommand {
    CoreCommand::Render(view)
}

fn report(err: &TraceviewError) -> CoreCommand {
    render(ViewCommand::ReportDiagnostics {
        diagnostics: vec![err.to_diagnostic()],
    })
}

/// Start a load. The current dataset stays on display until it completes.
pub fn handle_trace_requested(store: &mut TraceStore, trace_id: String) -> CoreStep {
    let ticket = store.begin_load(&trace_id);
    info!(trace = %trace_id, seq = ticket.seq, "trace load requested");
    CoreStep::with(vec![CoreCommand::StartLoad(ticket)])
}

/// Install a finished load if it is still the latest request, then lay out
/// the new trace.
pub fn handle_trace_loaded(
    store: &mut TraceStore,
    view: &mut ViewState,
    timeline: &TimelineSection,
    seq: u64,
    trace_id: String,
    result: Result<LoadedTrace>,
) -> CoreStep {
    let loaded = match result {
        Ok(loaded) => loaded,
        Err(err) => {
            if !store.fail_load(seq) {
                debug!(seq, trace = %trace_id, "stale load failure ignored");
                return CoreStep::none();
            }
            warn!(trace = %trace_id, error = %err, "trace load failed");
            return CoreStep::with(vec![render(ViewCommand::LoadFailed {
                trace_id,
                diagnostic: err.to_diagnostic(),
            })]);
        }
    };

    let LoadedTrace { dataset, svgs } = loaded;
    let Some(dataset) = store.complete_load(seq, dataset) else {
        return CoreStep::none();
    };

    let mut commands = Vec::new();
    let previous = view.dag.phase();
    let had_mark = view.dag.marked_node().is_some();
    let restored = view.dag.clear();
    if let DagPhase::CriticalPathShown { graph_id: old } = previous {
        commands.push(render(ViewCommand::HidePath { graph_id: old }));
    }
    if had_mark {
        commands.push(render(ViewCommand::HideTaskAnalysis));
    }
    if !restored.is_empty() {
        commands.push(render(ViewCommand::ApplyFills { fills: restored }));
    }
    if previous != DagPhase::Idle {
        commands.push(render(ViewCommand::DagPhaseChanged {
            phase: DagPhase::Idle,
        }));
    }
    view.hover.reset();
    view.disk = DiskOptions::default();
    view.svgs = svgs;

    match layout_trace(&dataset, timeline) {
        Ok(layout) => {
            commands.push(render(ViewCommand::DrawTimeline(Box::new(layout.clone()))));
            view.layout = Some(layout);
        }
        Err(err) => {
            warn!(trace = %trace_id, error = %err, "timeline layout aborted");
            view.layout = None;
            commands.push(report(&err));
        }
    }

    if !dataset.disk_usage().is_empty() {
        let disk = layout_disk_usage(&dataset, timeline, view.disk);
        commands.push(render(ViewCommand::DrawDiskUsage(Box::new(disk))));
    }

    commands.push(render(ViewCommand::TraceReady {
        trace_id: dataset.trace_id().to_string(),
        graph_ids: dataset.graph_ids(),
        tasks: dataset.tasks().len(),
        workers: dataset.workers().len(),
        duration: dataset.duration(),
    }));

    CoreStep::with(commands)
}

pub fn handle_dag_selected(
    dataset: &TraceDataset,
    view: &mut ViewState,
    section: &DagSection,
    graph_id: GraphId,
) -> CoreStep {
    let graph_view = match GraphView::from_dataset(
        dataset,
        graph_id,
        view.svgs.get(&graph_id).map(String::as_str),
        section,
    ) {
        Ok(v) => v,
        Err(err) => {
            warn!(graph_id, error = %err, "dag selection failed");
            return CoreStep::with(vec![report(&err)]);
        }
    };

    let mut commands = Vec::new();
    if !graph_view.rejected.is_empty() {
        commands.push(render(ViewCommand::ReportDiagnostics {
            diagnostics: graph_view.rejected.clone(),
        }));
    }

    let previous = view.dag.phase();
    let had_mark = view.dag.marked_node().is_some();
    let selection = view.dag.select_dag(graph_view);

    if let DagPhase::CriticalPathShown { graph_id: old } = previous {
        commands.push(render(ViewCommand::HidePath { graph_id: old }));
    }
    if had_mark {
        commands.push(render(ViewCommand::HideTaskAnalysis));
    }
    if !selection.restored.is_empty() {
        commands.push(render(ViewCommand::ApplyFills {
            fills: selection.restored,
        }));
    }
    for phase in selection.transitions {
        commands.push(render(ViewCommand::DagPhaseChanged { phase }));
    }
    commands.push(render(ViewCommand::DrawDag {
        graph_id,
        nodes: selection.fills,
    }));

    CoreStep::with(commands)
}

pub fn handle_critical_path_toggled(
    dataset: &TraceDataset,
    view: &mut ViewState,
    timeline: &TimelineSection,
) -> CoreStep {
    let had_mark = view.dag.marked_node().is_some();
    let toggle = view.dag.toggle_critical_path();
    if toggle.transitions.is_empty() {
        return CoreStep::none();
    }

    let mut commands = Vec::new();
    if had_mark {
        commands.push(render(ViewCommand::HideTaskAnalysis));
    }
    if !toggle.fills.is_empty() {
        commands.push(render(ViewCommand::ApplyFills { fills: toggle.fills }));
    }
    for phase in &toggle.transitions {
        commands.push(render(ViewCommand::DagPhaseChanged { phase: *phase }));
    }

    match view.dag.phase() {
        DagPhase::CriticalPathShown { graph_id } => {
            if let Some(path) = toggle.path {
                commands.push(render(ViewCommand::ShowPath { graph_id, path }));
            }
            if !toggle.diagnostics.is_empty() {
                commands.push(render(ViewCommand::ReportDiagnostics {
                    diagnostics: toggle.diagnostics,
                }));
            }
            match layout_critical_strip(dataset, graph_id, timeline.width, timeline.strip_height) {
                Ok(strip) => commands.push(render(ViewCommand::DrawCriticalStrip(strip))),
                Err(err) => commands.push(report(&err)),
            }
        }
        DagPhase::Selected { graph_id } => {
            commands.push(render(ViewCommand::HidePath { graph_id }));
        }
        DagPhase::Idle => {}
    }

    CoreStep::with(commands)
}

/// Mark a task and show its breakdown; an unknown or missing id clears the
/// mark instead.
pub fn handle_task_analyzed(
    dataset: &TraceDataset,
    view: &mut ViewState,
    task_id: Option<TaskId>,
) -> CoreStep {
    let known = task_id.filter(|id| dataset.task(*id).is_some());
    if task_id.is_some() && known.is_none() {
        debug!(?task_id, "task to analyze not in trace; clearing mark");
    }

    let same = match (known, view.dag.marked_node()) {
        (Some(id), Some(node)) => node == id.to_string(),
        _ => false,
    };
    if same {
        return CoreStep::none();
    }

    let mut commands = Vec::new();
    let fills = view.dag.analyze_task(known);
    if !fills.is_empty() {
        commands.push(render(ViewCommand::ApplyFills { fills }));
    }

    match known {
        Some(id) => match analyze_task(dataset, id) {
            Ok(analysis) => commands.push(render(ViewCommand::ShowTaskAnalysis(Box::new(analysis)))),
            Err(err) => commands.push(report(&err)),
        },
        None => commands.push(render(ViewCommand::HideTaskAnalysis)),
    }

    CoreStep::with(commands)
}

pub fn handle_hover(view: &mut ViewState, record: Option<RecordRef>) -> CoreStep {
    let Some(layout) = view.layout.as_ref() else {
        return CoreStep::none();
    };
    let fills = match record {
        Some(record) => view.hover.enter(record, layout),
        None => view.hover.leave(layout),
    };
    if fills.is_empty() {
        return CoreStep::none();
    }
    CoreStep::with(vec![render(ViewCommand::SetRectFills { fills })])
}

/// Redraw the disk usage chart with new options. Unchanged options and
/// traces without disk samples draw nothing.
pub fn handle_disk_usage_changed(
    dataset: &TraceDataset,
    view: &mut ViewState,
    timeline: &TimelineSection,
    options: DiskOptions,
) -> CoreStep {
    if dataset.disk_usage().is_empty() {
        debug!("trace has no disk usage samples");
        return CoreStep::none();
    }
    if view.disk == options {
        return CoreStep::none();
    }
    view.disk = options;
    let disk = layout_disk_usage(dataset, timeline, options);
    CoreStep::with(vec![render(ViewCommand::DrawDiskUsage(Box::new(disk)))])
}
