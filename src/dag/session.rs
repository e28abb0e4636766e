// src/dag/session.rs

//! Per-selection state of the DAG view.
//!
//! ```text
//! Idle -> Selected -> CriticalPathShown -> Idle -> Selected
//! ```
//!
//! Reselecting a DAG, or toggling the path off, passes through `Idle` and
//! restores every fill touched by the previous selection first.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::model::DagSection;
use crate::dag::edge::{parse_adjacency, Edge};
use crate::dag::graph::DependencyGraph;
use crate::dag::highlight::{
    highlight_toggle, svg_edge_labels, HighlightState, NodeFill, NodeShapeIndex, TaskMark,
};
use crate::dag::path::{build_critical_path, CriticalPath};
use crate::errors::{Diagnostic, Result, TraceviewError};
use crate::trace::{GraphId, TaskId, TraceDataset};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DagPhase {
    Idle,
    Selected { graph_id: GraphId },
    CriticalPathShown { graph_id: GraphId },
}

/// Everything the DAG view needs about one graph.
#[derive(Debug, Clone)]
pub struct GraphView {
    pub graph_id: GraphId,
    /// Critical tasks in execution order.
    pub critical_ids: Vec<TaskId>,
    pub edges: Vec<Edge>,
    pub index: NodeShapeIndex,
    /// Labels that did not parse into edges.
    pub rejected: Vec<Diagnostic>,
}

impl GraphView {
    /// Build from a rendered SVG when there is one, otherwise from the
    /// file lists of the graph's tasks in the configured form.
    pub fn from_dataset(
        dataset: &TraceDataset,
        graph_id: GraphId,
        svg: Option<&str>,
        section: &DagSection,
    ) -> Result<Self> {
        let graph = dataset
            .graph(graph_id)
            .ok_or(TraceviewError::GraphNotFound(graph_id))?;

        let (labels, index) = match svg {
            Some(svg) => (svg_edge_labels(svg), NodeShapeIndex::from_svg(svg, &section.default_fill)),
            None => {
                let labels =
                    DependencyGraph::adjacency_labels(dataset.tasks_in_graph(graph_id), section.form);
                let index = NodeShapeIndex::from_labels(&labels, &section.default_fill);
                (labels, index)
            }
        };

        let parsed = parse_adjacency(&labels);
        debug!(
            graph_id,
            labels = labels.len(),
            edges = parsed.edges.len(),
            rejected = parsed.rejected.len(),
            nodes = index.len(),
            "graph view built"
        );

        Ok(Self {
            graph_id,
            critical_ids: graph.critical_tasks.clone(),
            edges: parsed.edges,
            index,
            rejected: parsed.rejected,
        })
    }
}

/// Result of selecting a graph.
#[derive(Debug, Clone)]
pub struct Selection {
    /// Phases entered, in order.
    pub transitions: Vec<DagPhase>,
    /// Fills restored on the previously selected graph.
    pub restored: Vec<NodeFill>,
    /// Initial fills of the new graph.
    pub fills: Vec<NodeFill>,
}

/// Result of toggling the critical path.
#[derive(Debug, Clone)]
pub struct PathToggle {
    pub transitions: Vec<DagPhase>,
    pub fills: Vec<NodeFill>,
    /// Rendered path, when toggled on and the format was recognised.
    pub path: Option<CriticalPath>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Clone)]
pub struct DagSession {
    phase: DagPhase,
    view: Option<GraphView>,
    highlight: HighlightState,
    mark: TaskMark,
    critical_fill: String,
    analyze_fill: String,
}

impl DagSession {
    pub fn new(section: &DagSection) -> Self {
        Self {
            phase: DagPhase::Idle,
            view: None,
            highlight: HighlightState::default(),
            mark: TaskMark::default(),
            critical_fill: section.critical_fill.clone(),
            analyze_fill: section.analyze_fill.clone(),
        }
    }

    pub fn phase(&self) -> DagPhase {
        self.phase
    }

    pub fn view(&self) -> Option<&GraphView> {
        self.view.as_ref()
    }

    pub fn highlight(&self) -> &HighlightState {
        &self.highlight
    }

    /// Node marked for analysis, if any.
    pub fn marked_node(&self) -> Option<&str> {
        self.mark.node()
    }

    /// Select `view`, passing through `Idle`.
    pub fn select_dag(&mut self, view: GraphView) -> Selection {
        let restored = self.reset();
        let graph_id = view.graph_id;
        let fills = view.index.fills();
        self.view = Some(view);
        self.phase = DagPhase::Selected { graph_id };
        info!(graph_id, "dag selected");

        Selection {
            transitions: vec![DagPhase::Idle, self.phase],
            restored,
            fills,
        }
    }

    /// Drop the current graph and restore its fills.
    pub fn clear(&mut self) -> Vec<NodeFill> {
        let restored = self.reset();
        self.view = None;
        restored
    }

    /// Show the critical path when a graph is selected, hide it when shown.
    /// Without a graph nothing happens.
    pub fn toggle_critical_path(&mut self) -> PathToggle {
        let Some(view) = self.view.as_mut() else {
            debug!("critical path toggled without a selected dag; ignored");
            return PathToggle {
                transitions: Vec::new(),
                fills: Vec::new(),
                path: None,
                diagnostics: Vec::new(),
            };
        };
        let graph_id = view.graph_id;

        let mut fills = self.mark.clear(&mut view.index);

        match self.phase {
            DagPhase::CriticalPathShown { .. } => {
                let state = std::mem::take(&mut self.highlight);
                let (state, restored) =
                    highlight_toggle(state, false, &[], &[], &mut view.index, &self.critical_fill);
                self.highlight = state;
                fills.extend(restored);
                self.phase = DagPhase::Selected { graph_id };
                PathToggle {
                    transitions: vec![DagPhase::Idle, self.phase],
                    fills,
                    path: None,
                    diagnostics: Vec::new(),
                }
            }
            _ => {
                let mut diagnostics = Vec::new();
                let path = match build_critical_path(&view.critical_ids, &view.edges) {
                    Ok(path) => Some(path),
                    Err(err) => {
                        warn!(graph_id, error = %err, "critical path left unrendered");
                        diagnostics.push(err.to_diagnostic());
                        None
                    }
                };
                let path_edges = path.as_ref().map(|p| p.edges.as_slice()).unwrap_or(&[]);

                let state = std::mem::take(&mut self.highlight);
                let (state, applied) = highlight_toggle(
                    state,
                    true,
                    path_edges,
                    &view.critical_ids,
                    &mut view.index,
                    &self.critical_fill,
                );
                self.highlight = state;
                fills.extend(applied);
                self.phase = DagPhase::CriticalPathShown { graph_id };
                PathToggle {
                    transitions: vec![self.phase],
                    fills,
                    path,
                    diagnostics,
                }
            }
        }
    }

    /// Mark one task for analysis, or clear the mark with `None`. Marking
    /// the already marked task changes nothing.
    pub fn analyze_task(&mut self, task_id: Option<TaskId>) -> Vec<NodeFill> {
        let Some(view) = self.view.as_mut() else {
            return Vec::new();
        };
        match task_id {
            None => self.mark.clear(&mut view.index),
            Some(id) => {
                let node = id.to_string();
                if self.mark.node() == Some(node.as_str()) {
                    return Vec::new();
                }
                self.mark.mark(&node, &mut view.index, &self.analyze_fill)
            }
        }
    }

    fn reset(&mut self) -> Vec<NodeFill> {
        let mut restored = Vec::new();
        if let Some(view) = self.view.as_mut() {
            restored.extend(self.mark.clear(&mut view.index));
            let state = std::mem::take(&mut self.highlight);
            let (state, fills) =
                highlight_toggle(state, false, &[], &[], &mut view.index, &self.critical_fill);
            self.highlight = state;
            restored.extend(fills);
        }
        self.mark = TaskMark::default();
        self.highlight = HighlightState::default();
        self.phase = DagPhase::Idle;
        restored
    }
}
