// src/trace/mod.rs

//! The trace dataset shared by the layout and critical-path engines.
//!
//! - [`model`] holds the typed, immutable records.
//! - [`dataset`] groups one trace's records with lookup indexes.
//! - [`loader`] reads datasets from the CSV tables of a log directory.
//! - [`store`] keeps the displayed dataset and gates concurrent loads.

pub mod dataset;
pub mod loader;
pub mod model;
pub mod store;

pub use dataset::{TraceDataset, TraceParts};
pub use loader::{CsvTraceLoader, TraceLoader};
pub use model::{
    DiskUsageSample, FailedAttemptRecord, FileHolding, FileRecord, GraphId, GraphRecord, TaskExecutionRecord,
    TaskId, TaskLifecycle, WorkerId, WorkerSummary,
};
pub use store::{LoadTicket, TraceStore};
