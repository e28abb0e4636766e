// src/dag/graph.rs

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use petgraph::Direction;
use tracing::debug;

use crate::errors::{Result, TraceviewError};
use crate::trace::{GraphId, GraphRecord, TaskExecutionRecord, TaskId};
use crate::types::GraphForm;

/// Task dependency graph rebuilt from the file lists of finished tasks.
///
/// Vertex weight: `when_waiting_retrieval - when_running` of the task.
/// Edge `producer -> consumer` weight: `consumer.when_running -
/// producer.when_waiting_retrieval`.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    graph: DiGraphMap<TaskId, f64>,
    node_weight: HashMap<TaskId, f64>,
    /// Weakly connected components, each in task table order.
    components: Vec<Vec<TaskId>>,
    graph_index: HashMap<TaskId, GraphId>,
}

impl DependencyGraph {
    /// Build the graph over the latest try of every task.
    pub fn from_tasks(tasks: &[TaskExecutionRecord]) -> Self {
        let mut latest: Vec<&TaskExecutionRecord> = Vec::new();
        let mut position: HashMap<TaskId, usize> = HashMap::new();
        for task in tasks {
            match position.get(&task.task_id) {
                Some(&idx) if latest[idx].try_id >= task.try_id => {}
                Some(&idx) => latest[idx] = task,
                None => {
                    position.insert(task.task_id, latest.len());
                    latest.push(task);
                }
            }
        }

        let mut graph: DiGraphMap<TaskId, f64> = DiGraphMap::new();
        let mut node_weight = HashMap::with_capacity(latest.len());
        let mut consumers_of: HashMap<&str, Vec<&TaskExecutionRecord>> = HashMap::new();

        for &task in &latest {
            graph.add_node(task.task_id);
            node_weight.insert(
                task.task_id,
                task.lifecycle.when_waiting_retrieval - task.lifecycle.when_running,
            );
            for file in &task.input_files {
                consumers_of.entry(file.as_str()).or_default().push(task);
            }
        }

        for producer in &latest {
            for file in &producer.output_files {
                let Some(consumers) = consumers_of.get(file.as_str()) else {
                    continue;
                };
                for consumer in consumers {
                    if consumer.task_id == producer.task_id {
                        debug!(task = producer.task_id, file = %file, "task consumes its own output; edge skipped");
                        continue;
                    }
                    if graph.contains_edge(producer.task_id, consumer.task_id) {
                        continue;
                    }
                    let weight =
                        consumer.lifecycle.when_running - producer.lifecycle.when_waiting_retrieval;
                    graph.add_edge(producer.task_id, consumer.task_id, weight);
                }
            }
        }

        let components = weak_components(&graph, &latest);
        let graph_index = components
            .iter()
            .enumerate()
            .flat_map(|(idx, c)| c.iter().map(move |&t| (t, idx as GraphId + 1)))
            .collect();
        debug!(
            tasks = graph.node_count(),
            edges = graph.edge_count(),
            components = components.len(),
            "dependency graph built"
        );

        Self {
            graph,
            node_weight,
            components,
            graph_index,
        }
    }

    pub fn task_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Components in discovery order; graph ids are their 1-based index.
    pub fn components(&self) -> &[Vec<TaskId>] {
        &self.components
    }

    pub fn graph_of(&self, task_id: TaskId) -> Option<GraphId> {
        self.graph_index.get(&task_id).copied()
    }

    pub fn node_weight(&self, task_id: TaskId) -> Option<f64> {
        self.node_weight.get(&task_id).copied()
    }

    pub fn edge_weight(&self, from: TaskId, to: TaskId) -> Option<f64> {
        self.graph.edge_weight(from, to).copied()
    }

    /// Longest path through one component, given its tasks in topological
    /// order.
    ///
    /// Every task starts at zero and a step onto `task` adds the edge and
    /// `task`'s own weight, so a source's weight never decides which path
    /// wins. Only a strictly longer candidate replaces a predecessor; the
    /// end is the first task in component order with the maximum length.
    fn longest_path(&self, component: &[TaskId], order: &[TaskId]) -> Vec<TaskId> {
        let mut best: HashMap<TaskId, f64> = HashMap::with_capacity(order.len());
        let mut predecessor: HashMap<TaskId, TaskId> = HashMap::new();

        for &task in order {
            let own = self.node_weight(task).unwrap_or(0.0);
            let mut length = 0.0;
            for pred in self.graph.neighbors_directed(task, Direction::Incoming) {
                let (Some(&pred_len), Some(edge)) = (best.get(&pred), self.edge_weight(pred, task))
                else {
                    continue;
                };
                let candidate = pred_len + own + edge;
                if candidate > length {
                    length = candidate;
                    predecessor.insert(task, pred);
                }
            }
            best.insert(task, length);
        }

        let mut end: Option<(TaskId, f64)> = None;
        for &task in component {
            if let Some(&len) = best.get(&task) {
                if end.is_none_or(|(_, max)| len > max) {
                    end = Some((task, len));
                }
            }
        }

        let mut path = Vec::new();
        let mut cursor = end.map(|(task, _)| task);
        while let Some(task) = cursor {
            path.push(task);
            cursor = predecessor.get(&task).copied();
        }
        path.reverse();
        path
    }

    /// One record per component, with the critical path and its node and
    /// edge durations.
    pub fn graph_records(&self) -> Result<Vec<GraphRecord>> {
        let order = toposort(&self.graph, None).map_err(|cycle| {
            TraceviewError::DagCycle(format!(
                "cycle in task dependencies involving task {}",
                cycle.node_id()
            ))
        })?;
        let mut orders: Vec<Vec<TaskId>> = self
            .components
            .iter()
            .map(|c| Vec::with_capacity(c.len()))
            .collect();
        for task in order {
            if let Some(&graph_id) = self.graph_index.get(&task) {
                orders[graph_id as usize - 1].push(task);
            }
        }

        let mut records = Vec::with_capacity(self.components.len());
        for (idx, (component, order)) in self.components.iter().zip(&orders).enumerate() {
            let critical_tasks = self.longest_path(component, order);
            let time_critical_nodes: Vec<f64> = critical_tasks
                .iter()
                .map(|t| self.node_weight(*t).unwrap_or(0.0))
                .collect();
            let time_critical_edges: Vec<f64> = critical_tasks
                .windows(2)
                .map(|pair| self.edge_weight(pair[0], pair[1]).unwrap_or(0.0))
                .collect();
            let time_critical_path =
                time_critical_nodes.iter().sum::<f64>() + time_critical_edges.iter().sum::<f64>();

            records.push(GraphRecord {
                graph_id: idx as GraphId + 1,
                num_tasks: component.len(),
                critical_tasks,
                time_critical_nodes,
                time_critical_edges,
                time_critical_path,
            });
        }
        debug!(graphs = records.len(), "critical paths derived");
        Ok(records)
    }

    /// Adjacency labels for a set of tasks, in compact (`task -> task`) or
    /// expanded (`task -> file`, `file -> task`) form. Labels are unique and
    /// follow task order.
    pub fn adjacency_labels<'a, I>(tasks: I, form: GraphForm) -> Vec<String>
    where
        I: IntoIterator<Item = &'a TaskExecutionRecord>,
    {
        let tasks: Vec<&TaskExecutionRecord> = tasks.into_iter().collect();
        let mut labels: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut push = |label: String| {
            if seen.insert(label.clone()) {
                labels.push(label);
            }
        };

        match form {
            GraphForm::Expanded => {
                for task in &tasks {
                    for file in &task.input_files {
                        push(format!("{file} -> {}", task.task_id));
                    }
                    for file in &task.output_files {
                        push(format!("{} -> {file}", task.task_id));
                    }
                }
            }
            GraphForm::Compact => {
                let mut producers_of: HashMap<&str, Vec<TaskId>> = HashMap::new();
                for task in &tasks {
                    for file in &task.output_files {
                        producers_of.entry(file.as_str()).or_default().push(task.task_id);
                    }
                }
                for task in &tasks {
                    for file in &task.input_files {
                        for producer in producers_of.get(file.as_str()).into_iter().flatten() {
                            if *producer != task.task_id {
                                push(format!("{producer} -> {}", task.task_id));
                            }
                        }
                    }
                }
            }
        }

        labels
    }
}

fn weak_components(graph: &DiGraphMap<TaskId, f64>, order: &[&TaskExecutionRecord]) -> Vec<Vec<TaskId>> {
    let rank: HashMap<TaskId, usize> = order
        .iter()
        .enumerate()
        .map(|(idx, t)| (t.task_id, idx))
        .collect();

    let mut visited: HashSet<TaskId> = HashSet::new();
    let mut components = Vec::new();

    for task in order {
        if !visited.insert(task.task_id) {
            continue;
        }
        let mut component = vec![task.task_id];
        let mut queue = VecDeque::from([task.task_id]);
        while let Some(current) = queue.pop_front() {
            for next in graph
                .neighbors_directed(current, Direction::Outgoing)
                .chain(graph.neighbors_directed(current, Direction::Incoming))
            {
                if visited.insert(next) {
                    component.push(next);
                    queue.push_back(next);
                }
            }
        }
        component.sort_by_key(|t| rank.get(t).copied().unwrap_or(usize::MAX));
        components.push(component);
    }

    components
}
