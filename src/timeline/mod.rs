// src/timeline/mod.rs

//! Timeline layout engine.
//!
//! - `scale.rs`: linear and band scales.
//! - `rows.rs`: the `(worker, core)` row index.
//! - `layout.rs`: rectangles for worker bands, tasks and failed tries, plus
//!   the critical-path strip.
//! - `axis.rs`: tick selection.
//! - `disk.rs`: per-worker disk usage lines.
//! - `hover.rs`: palette and hover highlight state.

pub mod axis;
pub mod disk;
pub mod hover;
pub mod layout;
pub mod rows;
pub mod scale;

pub use axis::{quarter_ticks, worker_ticks, AxisTick};
pub use disk::{layout_disk_usage, DiskOptions, DiskPoint, DiskSeries, DiskUsageLayout};
pub use hover::{HoverState, Palette, RectFill};
pub use layout::{
    layout_critical_strip, layout_failed_interval, layout_task_interval, layout_trace,
    layout_worker_band, order_workers, CriticalStrip, IntervalKind, PhaseOptions, RecordRef,
    StripRect, TimelineGeometry, TimelineLayout, TimelineRect,
};
pub use rows::{build_row_index, row_to_y, RowIndex, RowKey, WorkerRows};
pub use scale::{time_to_x, BandScale, LinearScale, DEFAULT_ROW_PADDING};
