// src/trace/store.rs

//! Holder of the currently displayed dataset.
//!
//! Loads are tagged with a sequence number. Only the completion of the most
//! recently requested load is installed; anything older is stale and gets
//! dropped, so a slow load can never overwrite a newer selection.

use std::sync::Arc;

use tracing::debug;

use crate::trace::dataset::TraceDataset;

/// Handle for one requested load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTicket {
    pub seq: u64,
    pub trace_id: String,
}

#[derive(Debug, Default)]
pub struct TraceStore {
    current: Option<Arc<TraceDataset>>,
    next_seq: u64,
    /// Most recently issued ticket that has not completed yet.
    pending: Option<LoadTicket>,
}

impl TraceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Dataset currently on display (kept visible while a load is pending).
    pub fn current(&self) -> Option<&Arc<TraceDataset>> {
        self.current.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    pub fn pending(&self) -> Option<&LoadTicket> {
        self.pending.as_ref()
    }

    /// Issue a ticket for a new load, superseding any pending one.
    pub fn begin_load(&mut self, trace_id: &str) -> LoadTicket {
        self.next_seq += 1;
        let ticket = LoadTicket {
            seq: self.next_seq,
            trace_id: trace_id.to_string(),
        };
        if let Some(prev) = self.pending.replace(ticket.clone()) {
            debug!(superseded = prev.seq, by = ticket.seq, "load superseded");
        }
        ticket
    }

    /// Whether a completion with this sequence number would be installed.
    pub fn is_current_ticket(&self, seq: u64) -> bool {
        self.pending.as_ref().is_some_and(|t| t.seq == seq)
    }

    /// Install a loaded dataset if `seq` belongs to the latest request.
    ///
    /// Returns the installed dataset, or `None` when the completion is stale.
    pub fn complete_load(&mut self, seq: u64, dataset: TraceDataset) -> Option<Arc<TraceDataset>> {
        if !self.is_current_ticket(seq) {
            debug!(seq, trace = dataset.trace_id(), "stale load discarded");
            return None;
        }
        self.pending = None;
        let dataset = Arc::new(dataset);
        self.current = Some(Arc::clone(&dataset));
        Some(dataset)
    }

    /// Settle a failed load. The previous dataset stays on display.
    ///
    /// Returns `false` when the failure belongs to a stale request.
    pub fn fail_load(&mut self, seq: u64) -> bool {
        if !self.is_current_ticket(seq) {
            return false;
        }
        self.pending = None;
        true
    }
}
