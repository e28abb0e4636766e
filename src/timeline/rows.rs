// src/timeline/rows.rs

//! Row slots of the execution timeline.

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::errors::{Result, TraceviewError};
use crate::timeline::scale::{BandScale, DEFAULT_ROW_PADDING};
use crate::trace::{WorkerId, WorkerSummary};

/// One placement unit: a core of a worker. Cores are numbered from 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RowKey {
    pub worker_id: WorkerId,
    pub core: u32,
}

impl RowKey {
    pub fn new(worker_id: WorkerId, core: u32) -> Self {
        Self { worker_id, core }
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.worker_id, self.core)
    }
}

/// The contiguous block of slots owned by one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkerRows {
    pub worker_id: WorkerId,
    /// Slot index of core 1.
    pub first: usize,
    pub cores: u32,
}

impl WorkerRows {
    pub fn last(&self) -> usize {
        self.first + self.cores as usize - 1
    }
}

/// Ordered `(worker, core)` slots.
#[derive(Debug, Clone, Default)]
pub struct RowIndex {
    keys: Vec<RowKey>,
    slots: HashMap<RowKey, usize>,
    workers: Vec<WorkerRows>,
    by_worker: HashMap<WorkerId, usize>,
}

impl RowIndex {
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn keys(&self) -> &[RowKey] {
        &self.keys
    }

    /// Workers in slot order, one entry per distinct worker id.
    pub fn workers(&self) -> &[WorkerRows] {
        &self.workers
    }

    pub fn slot(&self, key: RowKey) -> Option<usize> {
        self.slots.get(&key).copied()
    }

    pub fn worker_rows(&self, worker_id: WorkerId) -> Option<&WorkerRows> {
        self.by_worker.get(&worker_id).map(|&idx| &self.workers[idx])
    }
}

/// Allocate `cores` contiguous slots per worker, in list order.
///
/// A worker listed several times (one summary row per connection span)
/// keeps the slots of its first entry; a later entry claiming more cores is
/// inconsistent and rejected.
pub fn build_row_index(workers: &[WorkerSummary]) -> Result<RowIndex> {
    if workers.is_empty() {
        return Err(TraceviewError::ConfigError(
            "trace has no workers; nothing to lay out".to_string(),
        ));
    }

    let mut index = RowIndex::default();

    for worker in workers {
        if worker.cores == 0 {
            return Err(TraceviewError::ConfigError(format!(
                "worker {} reports {} cores (must be > 0)",
                worker.worker_id, worker.cores
            )));
        }

        if let Some(existing) = index.worker_rows(worker.worker_id) {
            if worker.cores > existing.cores {
                return Err(TraceviewError::ConfigError(format!(
                    "worker {} reports {} cores after previously reporting {}",
                    worker.worker_id, worker.cores, existing.cores
                )));
            }
            debug!(worker = worker.worker_id, "repeated worker entry shares its rows");
            continue;
        }

        let first = index.keys.len();
        for core in 1..=worker.cores {
            let key = RowKey::new(worker.worker_id, core);
            index.slots.insert(key, index.keys.len());
            index.keys.push(key);
        }
        index.by_worker.insert(worker.worker_id, index.workers.len());
        index.workers.push(WorkerRows {
            worker_id: worker.worker_id,
            first,
            cores: worker.cores,
        });
    }

    debug!(rows = index.len(), workers = index.workers.len(), "row index built");
    Ok(index)
}

/// Top edge of `row` with the default row padding.
pub fn row_to_y(row: RowKey, row_index: &RowIndex, range: (f64, f64)) -> Result<f64> {
    let slot = row_index
        .slot(row)
        .ok_or_else(|| TraceviewError::MissingRow {
            worker_id: row.worker_id,
            core_id: row.core,
            record: "row lookup".to_string(),
        })?;
    let scale = BandScale::new(row_index.len(), range, DEFAULT_ROW_PADDING);
    scale.position(slot).ok_or_else(|| {
        TraceviewError::ConfigError(format!("slot {slot} outside band scale"))
    })
}
