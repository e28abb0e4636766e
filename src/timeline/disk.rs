// src/timeline/disk.rs

//! Per-worker disk usage lines.
//!
//! x maps `[0, duration]` onto `[0, width]` like the timeline; y maps
//! `[0, peak]` of the chosen unit onto `[height, 0]`.

use serde::Serialize;
use tracing::debug;

use crate::config::model::TimelineSection;
use crate::timeline::axis::quarter_ticks;
use crate::timeline::scale::LinearScale;
use crate::trace::{DiskUsageSample, TraceDataset, WorkerId};
use crate::types::DiskUnit;

const SERIES_COLORS: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];
const HIGHLIGHT_STROKE: &str = "orange";
const MUTED_STROKE: &str = "lightgray";
const STROKE_WIDTH: f64 = 0.8;
const HIGHLIGHT_STROKE_WIDTH: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DiskPoint {
    pub x: f64,
    pub y: f64,
    /// Seconds since the trace start.
    pub time: f64,
    pub usage: f64,
}

/// One worker's line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskSeries {
    pub worker_id: WorkerId,
    pub stroke: String,
    pub stroke_width: f64,
    pub points: Vec<DiskPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskUsageLayout {
    pub unit: DiskUnit,
    /// Worker drawn emphasized; `None` when no worker was asked for or the
    /// one asked for has no samples.
    pub highlight: Option<WorkerId>,
    pub width: f64,
    pub height: f64,
    pub x_scale: LinearScale,
    pub y_scale: LinearScale,
    pub x_ticks: Vec<f64>,
    pub y_ticks: Vec<f64>,
    /// Ascending worker id, except that the highlighted series comes last.
    pub series: Vec<DiskSeries>,
}

/// Display options kept between redraws of the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DiskOptions {
    pub unit: DiskUnit,
    pub highlight: Option<WorkerId>,
}

fn usage(sample: &DiskUsageSample, unit: DiskUnit) -> f64 {
    match unit {
        DiskUnit::Megabytes => sample.disk_usage_mb,
        DiskUnit::Percent => sample.disk_usage_pct,
    }
}

fn stroke(worker_id: WorkerId, highlight: Option<WorkerId>) -> (String, f64) {
    match highlight {
        Some(h) if h == worker_id => (HIGHLIGHT_STROKE.to_string(), HIGHLIGHT_STROKE_WIDTH),
        Some(_) => (MUTED_STROKE.to_string(), STROKE_WIDTH),
        None => (
            SERIES_COLORS[worker_id as usize % SERIES_COLORS.len()].to_string(),
            STROKE_WIDTH,
        ),
    }
}

/// Lay out one line per worker with disk samples.
///
/// Samples whose usage is not finite are skipped.
pub fn layout_disk_usage(
    dataset: &TraceDataset,
    section: &TimelineSection,
    options: DiskOptions,
) -> DiskUsageLayout {
    let DiskOptions { unit, highlight } = options;
    let samples: Vec<&DiskUsageSample> = dataset
        .disk_usage()
        .iter()
        .filter(|s| usage(s, unit).is_finite() && s.time.is_finite())
        .collect();

    let highlight = highlight.filter(|w| samples.iter().any(|s| s.worker_id == *w));
    let peak = samples
        .iter()
        .map(|s| usage(s, unit))
        .fold(0.0_f64, f64::max);

    let x_scale = LinearScale::new((0.0, dataset.duration()), (0.0, section.width));
    let y_scale = LinearScale::new((0.0, peak), (section.disk_height, 0.0));
    let origin = dataset.trace_start();

    let mut series: Vec<DiskSeries> = Vec::new();
    for sample in samples {
        if series.last().is_none_or(|s| s.worker_id != sample.worker_id) {
            let (stroke, stroke_width) = stroke(sample.worker_id, highlight);
            series.push(DiskSeries {
                worker_id: sample.worker_id,
                stroke,
                stroke_width,
                points: Vec::new(),
            });
        }
        let time = sample.time - origin;
        let value = usage(sample, unit);
        if let Some(line) = series.last_mut() {
            line.points.push(DiskPoint {
                x: x_scale.map(time),
                y: y_scale.map(value),
                time,
                usage: value,
            });
        }
    }

    if let Some(pos) = series.iter().position(|s| Some(s.worker_id) == highlight) {
        let line = series.remove(pos);
        series.push(line);
    }

    debug!(workers = series.len(), ?unit, peak, "disk usage laid out");

    DiskUsageLayout {
        unit,
        highlight,
        width: section.width,
        height: section.disk_height,
        x_ticks: quarter_ticks(x_scale.domain()),
        y_ticks: quarter_ticks(y_scale.domain()),
        x_scale,
        y_scale,
        series,
    }
}
