// src/dag/mod.rs

//! Critical-path reconstruction over task-dependency graphs.
//!
//! - [`edge`] parses adjacency labels into typed edges.
//! - [`path`] filters, orders, classifies and renders the critical path.
//! - [`highlight`] indexes node shapes and applies/restores fills.
//! - [`session`] is the per-selection state machine.
//! - [`graph`] rebuilds graphs and critical paths from task file lists.
//! - [`analysis`] computes the input-file breakdown of one task.

pub mod analysis;
pub mod edge;
pub mod graph;
pub mod highlight;
pub mod path;
pub mod session;

pub use analysis::{analyze_task, InputFileRow, TaskAnalysis};
pub use edge::{parse_adjacency, parse_edge, AdjacencyParse, Edge, EdgeKind};
pub use graph::DependencyGraph;
pub use highlight::{
    highlight_toggle, svg_edge_labels, HighlightState, NodeFill, NodeShape, NodeShapeIndex,
    ShapeKind, TaskMark,
};
pub use path::{
    build_critical_path, classify_path_format, filter_critical_edges, reconstruct_order,
    render_path, CriticalPath, PathFormat,
};
pub use session::{DagPhase, DagSession, GraphView, PathToggle, Selection};
