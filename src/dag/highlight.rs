// src/dag/highlight.rs

//! Node fills of a rendered DAG and the highlight state over them.
//!
//! Fills are captured before the first change and replayed on restore; a
//! restore never recomputes a colour.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::dag::edge::{parse_task_id, Edge};
use crate::trace::TaskId;

static SVG_NODE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<g\b[^>]*class="node"[^>]*>\s*<title>(.*?)</title>\s*<(ellipse|polygon)\b([^>]*)>"#)
        .expect("static regex")
});
static SVG_EDGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<g\b[^>]*class="edge"[^>]*>\s*<title>(.*?)</title>"#).expect("static regex")
});
static SVG_FILL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bfill="([^"]*)""#).expect("static regex"));

/// Task nodes are drawn as ellipses, file nodes as boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeKind {
    Ellipse,
    Box,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeShape {
    pub kind: ShapeKind,
    pub fill: String,
}

/// One `(node, fill)` assignment for the renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeFill {
    pub node: String,
    pub fill: String,
}

/// Node title -> drawable shape.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeShapeIndex {
    nodes: BTreeMap<String, NodeShape>,
}

impl NodeShapeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, title: impl Into<String>, kind: ShapeKind, fill: impl Into<String>) {
        self.nodes.insert(
            title.into(),
            NodeShape {
                kind,
                fill: fill.into(),
            },
        );
    }

    /// Index the nodes of a graphviz SVG. A node without a `fill`
    /// attribute gets `default_fill`.
    pub fn from_svg(svg: &str, default_fill: &str) -> Self {
        let mut index = Self::new();
        for caps in SVG_NODE.captures_iter(svg) {
            let title = unescape_svg(&caps[1]);
            let kind = match &caps[2] {
                "ellipse" => ShapeKind::Ellipse,
                _ => ShapeKind::Box,
            };
            let fill = SVG_FILL
                .captures(&caps[3])
                .map(|f| f[1].to_string())
                .unwrap_or_else(|| default_fill.to_string());
            index.insert(title, kind, fill);
        }
        debug!(nodes = index.len(), "indexed svg nodes");
        index
    }

    /// Synthesize an index from adjacency labels: task ids become
    /// ellipses, everything else a box. File-sourced labels still
    /// contribute their nodes.
    pub fn from_labels<S: AsRef<str>>(labels: &[S], default_fill: &str) -> Self {
        let mut index = Self::new();
        for label in labels {
            let Some((source, target)) = label.as_ref().split_once("->") else {
                continue;
            };
            for node in [source, target] {
                let node = node.trim().trim_end_matches(';').trim().trim_matches('"').trim();
                if node.is_empty() || node.contains("->") {
                    continue;
                }
                let kind = if parse_task_id(node).is_some() {
                    ShapeKind::Ellipse
                } else {
                    ShapeKind::Box
                };
                index.nodes.entry(node.to_string()).or_insert_with(|| NodeShape {
                    kind,
                    fill: default_fill.to_string(),
                });
            }
        }
        index
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, title: &str) -> Option<&NodeShape> {
        self.nodes.get(title)
    }

    pub fn fill(&self, title: &str) -> Option<&str> {
        self.nodes.get(title).map(|n| n.fill.as_str())
    }

    /// Set a node's fill. Returns `false` if the node is not indexed.
    pub fn set_fill(&mut self, title: &str, fill: &str) -> bool {
        match self.nodes.get_mut(title) {
            Some(node) => {
                node.fill = fill.to_string();
                true
            }
            None => false,
        }
    }

    /// Every node's current fill, in title order.
    pub fn fills(&self) -> Vec<NodeFill> {
        self.nodes
            .iter()
            .map(|(node, shape)| NodeFill {
                node: node.clone(),
                fill: shape.fill.clone(),
            })
            .collect()
    }
}

/// Edge labels of a graphviz SVG (`3&#45;&gt;fileA` becomes `3->fileA`).
pub fn svg_edge_labels(svg: &str) -> Vec<String> {
    SVG_EDGE
        .captures_iter(svg)
        .map(|caps| unescape_svg(&caps[1]))
        .collect()
}

fn unescape_svg(text: &str) -> String {
    text.replace("&#45;", "-")
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
        .trim()
        .to_string()
}

/// Whether the critical path is highlighted, and the fills it replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HighlightState {
    active: bool,
    saved: BTreeMap<String, String>,
}

impl HighlightState {
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Fill of each highlighted node before highlighting.
    pub fn saved(&self) -> &BTreeMap<String, String> {
        &self.saved
    }
}

/// Nodes touched by a critical-path highlight: every endpoint of the path
/// edges plus the critical tasks themselves, first occurrence first.
pub fn highlight_nodes(edges: &[Edge], critical_ids: &[TaskId]) -> Vec<String> {
    let mut nodes: Vec<String> = Vec::new();
    let candidates = edges
        .iter()
        .flat_map(|e| [e.source.clone(), e.target.clone()])
        .chain(critical_ids.iter().map(|id| id.to_string()));
    for node in candidates {
        if !nodes.contains(&node) {
            nodes.push(node);
        }
    }
    nodes
}

/// Apply (`is_active = true`) or restore (`false`) the critical-path fill.
///
/// Applying twice or restoring twice changes nothing the second time.
/// Returns the new state and the fills that changed.
pub fn highlight_toggle(
    state: HighlightState,
    is_active: bool,
    edges: &[Edge],
    critical_ids: &[TaskId],
    index: &mut NodeShapeIndex,
    fill: &str,
) -> (HighlightState, Vec<NodeFill>) {
    match (state.active, is_active) {
        (false, true) => {
            let mut saved = BTreeMap::new();
            let mut fills = Vec::new();
            for node in highlight_nodes(edges, critical_ids) {
                let Some(previous) = index.fill(&node).map(str::to_string) else {
                    trace!(node, "critical node has no shape; skipped");
                    continue;
                };
                index.set_fill(&node, fill);
                saved.insert(node.clone(), previous);
                fills.push(NodeFill {
                    node,
                    fill: fill.to_string(),
                });
            }
            debug!(nodes = fills.len(), "critical path highlighted");
            (HighlightState { active: true, saved }, fills)
        }
        (true, false) => {
            let mut fills = Vec::with_capacity(state.saved.len());
            for (node, previous) in state.saved {
                index.set_fill(&node, &previous);
                fills.push(NodeFill {
                    node,
                    fill: previous,
                });
            }
            debug!(nodes = fills.len(), "critical path highlight restored");
            (HighlightState::default(), fills)
        }
        _ => (state, Vec::new()),
    }
}

/// A single node marked for analysis, with the fill it replaced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskMark {
    marked: Option<(String, String)>,
}

impl TaskMark {
    pub fn node(&self) -> Option<&str> {
        self.marked.as_ref().map(|(node, _)| node.as_str())
    }

    /// Mark `node`, restoring any previously marked node first.
    pub fn mark(&mut self, node: &str, index: &mut NodeShapeIndex, fill: &str) -> Vec<NodeFill> {
        let mut fills = self.clear(index);
        let Some(previous) = index.fill(node).map(str::to_string) else {
            debug!(node, "task to analyze has no node in this graph");
            return fills;
        };
        index.set_fill(node, fill);
        self.marked = Some((node.to_string(), previous));
        fills.push(NodeFill {
            node: node.to_string(),
            fill: fill.to_string(),
        });
        fills
    }

    /// Restore the marked node, if any.
    pub fn clear(&mut self, index: &mut NodeShapeIndex) -> Vec<NodeFill> {
        match self.marked.take() {
            Some((node, previous)) => {
                index.set_fill(&node, &previous);
                vec![NodeFill {
                    node,
                    fill: previous,
                }]
            }
            None => Vec::new(),
        }
    }
}
