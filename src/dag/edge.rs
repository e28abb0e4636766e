// src/dag/edge.rs

//! Adjacency label parsing.
//!
//! A label looks like `3 -> 7` or `3->fileA`, optionally with graphviz
//! quoting and a trailing `;`. Task nodes are integers, anything else is a
//! file node.

use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::{Diagnostic, TraceviewError};
use crate::trace::TaskId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    TaskToTask,
    TaskToFile,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    /// Normalised label, `"<source> -> <target>"`.
    pub label: String,
}

impl Edge {
    pub fn new(source: impl Into<String>, target: impl Into<String>, kind: EdgeKind) -> Self {
        let source = source.into();
        let target = target.into();
        let label = format!("{source} -> {target}");
        Self {
            source,
            target,
            kind,
            label,
        }
    }

    /// Source node as a task id. Every accepted edge has a task source.
    pub fn source_task(&self) -> Option<TaskId> {
        parse_task_id(&self.source)
    }

    pub fn target_task(&self) -> Option<TaskId> {
        match self.kind {
            EdgeKind::TaskToTask => parse_task_id(&self.target),
            EdgeKind::TaskToFile => None,
        }
    }
}

/// Accepted edges plus one diagnostic per rejected label.
#[derive(Debug, Clone, Default)]
pub struct AdjacencyParse {
    pub edges: Vec<Edge>,
    pub rejected: Vec<Diagnostic>,
}

/// `Some(id)` when `node` is a task id (decimal digits only).
pub fn parse_task_id(node: &str) -> Option<TaskId> {
    if node.is_empty() || !node.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    node.parse().ok()
}

fn clean_node(raw: &str) -> &str {
    raw.trim()
        .trim_end_matches(';')
        .trim()
        .trim_matches('"')
        .trim()
}

/// Parse one label into an edge.
pub fn parse_edge(label: &str) -> Result<Edge, TraceviewError> {
    let parts: Vec<&str> = label.split("->").collect();
    if parts.len() != 2 {
        return Err(TraceviewError::UnrecognizedEdgeFormat(format!(
            "'{label}': expected exactly one '->'"
        )));
    }

    let source = clean_node(parts[0]);
    let target = clean_node(parts[1]);
    if source.is_empty() || target.is_empty() {
        return Err(TraceviewError::UnrecognizedEdgeFormat(format!(
            "'{label}': empty endpoint"
        )));
    }

    match (parse_task_id(source), parse_task_id(target)) {
        (Some(_), Some(_)) => Ok(Edge::new(source, target, EdgeKind::TaskToTask)),
        (Some(_), None) => Ok(Edge::new(source, target, EdgeKind::TaskToFile)),
        (None, _) => Err(TraceviewError::UnrecognizedEdgeFormat(format!(
            "'{label}': source '{source}' is not a task"
        ))),
    }
}

/// Parse every label, keeping the accepted edges in input order.
///
/// File-sourced edges (`fileA -> 7`) are expected in the expanded graph form
/// and only logged at debug level; other rejects are warnings.
pub fn parse_adjacency<I, S>(labels: I) -> AdjacencyParse
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out = AdjacencyParse::default();

    for label in labels {
        let label = label.as_ref();
        match parse_edge(label) {
            Ok(edge) => out.edges.push(edge),
            Err(err) => {
                if is_file_sourced(label) {
                    debug!(label, "skipping file-sourced edge");
                } else {
                    warn!(label, error = %err, "skipping malformed edge label");
                }
                out.rejected.push(err.to_diagnostic());
            }
        }
    }

    out
}

fn is_file_sourced(label: &str) -> bool {
    let parts: Vec<&str> = label.split("->").collect();
    parts.len() == 2
        && !clean_node(parts[0]).is_empty()
        && !clean_node(parts[1]).is_empty()
        && parse_task_id(clean_node(parts[0])).is_none()
}
