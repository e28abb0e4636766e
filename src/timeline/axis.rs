// src/timeline/axis.rs

use serde::Serialize;

use crate::timeline::layout::TimelineGeometry;
use crate::timeline::rows::RowKey;

/// A labelled y-axis tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisTick {
    pub label: String,
    /// Centre of the tick's row, in pixels.
    pub position: f64,
    pub row: RowKey,
}

/// Ticks at 0, 1/4, 1/2, 3/4 and 1 of the domain.
pub fn quarter_ticks(domain: (f64, f64)) -> Vec<f64> {
    let (d0, d1) = domain;
    (0..=4)
        .map(|i| d0 + (d1 - d0) * f64::from(i) / 4.0)
        .collect()
}

/// At most `max_ticks` worker ticks, walking back from the last worker.
///
/// Each tick sits on the worker's top core row and is labelled with the
/// worker id. Ticks are returned bottom-up.
pub fn worker_ticks(geometry: &TimelineGeometry, max_ticks: usize) -> Vec<AxisTick> {
    let workers = geometry.rows().workers();
    if workers.is_empty() || max_ticks == 0 {
        return Vec::new();
    }

    let step = workers.len().div_ceil(max_ticks);
    let half_band = geometry.y_scale().bandwidth() / 2.0;

    let mut ticks: Vec<AxisTick> = workers
        .iter()
        .rev()
        .step_by(step)
        .filter_map(|w| {
            let row = RowKey::new(w.worker_id, w.cores);
            geometry.row_to_y(row).map(|y| AxisTick {
                label: w.worker_id.to_string(),
                position: y + half_band,
                row,
            })
        })
        .collect();

    ticks.reverse();
    ticks
}
