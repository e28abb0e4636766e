use std::str::FromStr;
use serde::{Deserialize, Serialize};

/// How a dependency graph was rendered.
///
/// - `Compact`: task nodes only, edges go task -> task.
/// - `Expanded`: files appear as their own nodes, edges go task -> file and
///   file -> task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphForm {
    Compact,
    Expanded,
}

impl Default for GraphForm {
    fn default() -> Self {
        GraphForm::Expanded
    }
}

impl FromStr for GraphForm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(GraphForm::Compact),
            "expanded" => Ok(GraphForm::Expanded),
            other => Err(format!(
                "invalid graph form: {other} (expected \"compact\" or \"expanded\")"
            )),
        }
    }
}

/// Order in which workers contribute row slots to the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerOrder {
    /// Keep the order of the worker summary table.
    Insertion,
    /// Sort by ascending `worker_id` (stable for equal ids).
    WorkerId,
}

impl Default for WorkerOrder {
    fn default() -> Self {
        WorkerOrder::Insertion
    }
}

impl FromStr for WorkerOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "insertion" => Ok(WorkerOrder::Insertion),
            "worker_id" | "worker-id" => Ok(WorkerOrder::WorkerId),
            other => Err(format!(
                "invalid worker_order: {other} (expected \"insertion\" or \"worker_id\")"
            )),
        }
    }
}

/// Unit of the disk usage chart's y axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiskUnit {
    #[default]
    Megabytes,
    /// Share of the worker's disk.
    Percent,
}

impl FromStr for DiskUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "mb" | "megabytes" => Ok(DiskUnit::Megabytes),
            "%" | "pct" | "percent" => Ok(DiskUnit::Percent),
            other => Err(format!(
                "invalid disk unit: {other} (expected \"mb\" or \"percent\")"
            )),
        }
    }
}
