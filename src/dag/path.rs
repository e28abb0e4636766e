// src/dag/path.rs

//! Ordering and rendering of a DAG's critical path.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::dag::edge::{Edge, EdgeKind};
use crate::errors::{Result, TraceviewError};
use crate::trace::TaskId;

/// Separator between path nodes in the rendered text.
pub const PATH_SEPARATOR: &str = "--->";

static TASK_TASK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*->\s*\d+$").expect("valid regex"));
static TASK_FILE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+\s*->\s*\S*[^\d\s]\S*$").expect("valid regex"));

/// Rendering family of a critical path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PathFormat {
    /// Compact graph: `3--->7--->9`.
    TaskTaskOnly,
    /// Expanded graph: `3--->fileA--->7--->fileB`.
    TaskFileTask,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CriticalPath {
    pub format: PathFormat,
    /// Edges in traversal order.
    pub edges: Vec<Edge>,
    pub text: String,
}

/// Keep task->file edges with a critical source and task->task edges whose
/// two endpoints are critical.
pub fn filter_critical_edges(edges: &[Edge], critical: &HashSet<TaskId>) -> Vec<Edge> {
    edges
        .iter()
        .filter(|edge| {
            let source_critical = edge.source_task().is_some_and(|id| critical.contains(&id));
            match edge.kind {
                EdgeKind::TaskToFile => source_critical,
                EdgeKind::TaskToTask => {
                    source_critical && edge.target_task().is_some_and(|id| critical.contains(&id))
                }
            }
        })
        .cloned()
        .collect()
}

/// For each critical id in order, the filtered edges leaving that task.
///
/// The order of `critical_ids` is trusted to be topological; it is kept,
/// not checked.
pub fn reconstruct_order(critical_ids: &[TaskId], filtered: &[Edge]) -> Vec<Edge> {
    let mut ordered = Vec::with_capacity(filtered.len());
    for &id in critical_ids {
        ordered.extend(
            filtered
                .iter()
                .filter(|edge| edge.source_task() == Some(id))
                .cloned(),
        );
    }
    ordered
}

/// Decide the rendering family from the first reconstructed edge.
pub fn classify_path_format(first_edge: Option<&Edge>) -> Result<PathFormat> {
    let Some(edge) = first_edge else {
        return Err(TraceviewError::UnrecognizedPathFormat(
            "critical path has no edges".to_string(),
        ));
    };

    if TASK_TASK_RE.is_match(&edge.label) {
        Ok(PathFormat::TaskTaskOnly)
    } else if TASK_FILE_RE.is_match(&edge.label) {
        Ok(PathFormat::TaskFileTask)
    } else {
        Err(TraceviewError::UnrecognizedPathFormat(format!(
            "first edge '{}' matches no known path form",
            edge.label
        )))
    }
}

/// Join the nodes along `edges` with [`PATH_SEPARATOR`], collapsing a node
/// that repeats back to back.
pub fn render_path(edges: &[Edge]) -> String {
    let mut nodes: Vec<&str> = Vec::with_capacity(edges.len() * 2);
    for edge in edges {
        for node in [edge.source.as_str(), edge.target.as_str()] {
            if nodes.last() != Some(&node) {
                nodes.push(node);
            }
        }
    }
    nodes.join(PATH_SEPARATOR)
}

/// Filter, order, classify and render in one go.
///
/// An unrecognised format is an error: no partial path is produced.
pub fn build_critical_path(critical_ids: &[TaskId], edges: &[Edge]) -> Result<CriticalPath> {
    let critical: HashSet<TaskId> = critical_ids.iter().copied().collect();
    let filtered = filter_critical_edges(edges, &critical);
    let ordered = reconstruct_order(critical_ids, &filtered);

    let format = match classify_path_format(ordered.first()) {
        Ok(format) => format,
        Err(err) => {
            warn!(error = %err, "critical path not rendered");
            return Err(err);
        }
    };

    let text = render_path(&ordered);
    debug!(?format, edges = ordered.len(), %text, "critical path reconstructed");

    Ok(CriticalPath {
        format,
        edges: ordered,
        text,
    })
}
