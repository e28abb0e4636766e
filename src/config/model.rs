// src/config/model.rs

use serde::Deserialize;

use crate::types::{GraphForm, WorkerOrder};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [trace]
/// root = "logs"
/// log_subdir = "vine-logs"
///
/// [timeline]
/// width = 1200.0
/// height = 600.0
/// show_queued = true
///
/// [dag]
/// form = "expanded"
/// critical_fill = "orange"
/// ```
///
/// All sections are optional and have defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub trace: TraceSection,

    #[serde(default)]
    pub timeline: TimelineSection,

    #[serde(default)]
    pub dag: DagSection,
}

/// Validated configuration. Only constructed through
/// `TryFrom<RawConfigFile>` (see `config::validate`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    trace: TraceSection,
    timeline: TimelineSection,
    dag: DagSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        trace: TraceSection,
        timeline: TimelineSection,
        dag: DagSection,
    ) -> Self {
        Self {
            trace,
            timeline,
            dag,
        }
    }

    pub fn trace(&self) -> &TraceSection {
        &self.trace
    }

    pub fn timeline(&self) -> &TimelineSection {
        &self.timeline
    }

    pub fn dag(&self) -> &DagSection {
        &self.dag
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        let raw = RawConfigFile::default();
        Self::new_unchecked(raw.trace, raw.timeline, raw.dag)
    }
}

/// `[trace]` section: where trace directories live.
#[derive(Debug, Clone, Deserialize)]
pub struct TraceSection {
    /// Directory holding one subdirectory per trace.
    #[serde(default = "default_root")]
    pub root: String,

    /// Subdirectory of a trace that holds the CSV tables.
    #[serde(default = "default_log_subdir")]
    pub log_subdir: String,
}

fn default_root() -> String {
    "logs".to_string()
}

fn default_log_subdir() -> String {
    "vine-logs".to_string()
}

impl Default for TraceSection {
    fn default() -> Self {
        Self {
            root: default_root(),
            log_subdir: default_log_subdir(),
        }
    }
}

/// `[timeline]` section: geometry and phase policy of the execution timeline.
#[derive(Debug, Clone, Deserialize)]
pub struct TimelineSection {
    /// Drawing width in pixels (x range is `[0, width]`).
    #[serde(default = "default_width")]
    pub width: f64,

    /// Drawing height in pixels (y range is `[height, 0]`, first row at the bottom).
    #[serde(default = "default_height")]
    pub height: f64,

    /// Height of the critical-path strip drawn under the DAG.
    #[serde(default = "default_strip_height")]
    pub strip_height: f64,

    /// Height of the per-worker disk usage chart.
    #[serde(default = "default_disk_height")]
    pub disk_height: f64,

    /// Padding between row slots, as a fraction of the slot step.
    #[serde(default = "default_row_padding")]
    pub row_padding: f64,

    /// Render the dispatch-to-start gap (`when_running` -> `time_worker_start`).
    #[serde(default = "default_true")]
    pub show_queued: bool,

    /// Render the `time_worker_end` -> `when_waiting_retrieval` gap.
    #[serde(default)]
    pub show_waiting_retrieval: bool,

    #[serde(default)]
    pub worker_order: WorkerOrder,

    /// Upper bound on labelled workers on the y axis.
    #[serde(default = "default_max_worker_ticks")]
    pub max_worker_ticks: usize,
}

fn default_width() -> f64 {
    1200.0
}

fn default_height() -> f64 {
    600.0
}

fn default_strip_height() -> f64 {
    60.0
}

fn default_disk_height() -> f64 {
    300.0
}

fn default_row_padding() -> f64 {
    0.1
}

fn default_true() -> bool {
    true
}

fn default_max_worker_ticks() -> usize {
    5
}

impl Default for TimelineSection {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            strip_height: default_strip_height(),
            disk_height: default_disk_height(),
            row_padding: default_row_padding(),
            show_queued: true,
            show_waiting_retrieval: false,
            worker_order: WorkerOrder::default(),
            max_worker_ticks: default_max_worker_ticks(),
        }
    }
}

/// `[dag]` section: graph form and highlight colours.
#[derive(Debug, Clone, Deserialize)]
pub struct DagSection {
    /// Form used when adjacency labels are derived from the trace rather
    /// than read from a rendered SVG.
    #[serde(default)]
    pub form: GraphForm,

    /// Fill of a node that never had one in the rendered graph.
    #[serde(default = "default_fill")]
    pub default_fill: String,

    #[serde(default = "default_critical_fill")]
    pub critical_fill: String,

    /// Fill of a single task picked for analysis.
    #[serde(default = "default_analyze_fill")]
    pub analyze_fill: String,
}

fn default_fill() -> String {
    "white".to_string()
}

fn default_critical_fill() -> String {
    "orange".to_string()
}

fn default_analyze_fill() -> String {
    "#f69697".to_string()
}

impl Default for DagSection {
    fn default() -> Self {
        Self {
            form: GraphForm::default(),
            default_fill: default_fill(),
            critical_fill: default_critical_fill(),
            analyze_fill: default_analyze_fill(),
        }
    }
}
