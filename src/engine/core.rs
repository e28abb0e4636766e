// src/engine/core.rs

//! Pure core state machine of the viewer.
//!
//! [`ViewerCore`] consumes [`ViewerEvent`]s and produces the commands the IO
//! shell (`engine::runtime::Runtime`) should carry out. It owns no channels,
//! no Tokio types and performs no IO, so it can be driven directly in tests.
//!
//! While a trace load is pending, interaction events are no-ops; the
//! previous trace stays on display and interactive only once the load
//! settles.

use std::sync::Arc;

use tracing::debug;

use crate::config::model::ConfigFile;
use crate::dag::DagPhase;
use crate::engine::event_handlers::{
    handle_critical_path_toggled, handle_dag_selected, handle_disk_usage_changed, handle_hover,
    handle_task_analyzed, handle_trace_loaded, handle_trace_requested, CoreCommand, CoreStep,
    ViewState,
};
use crate::engine::ViewerEvent;
use crate::timeline::{DiskOptions, TimelineLayout};
use crate::trace::{TraceDataset, TraceStore};

#[derive(Debug)]
pub struct ViewerCore {
    config: ConfigFile,
    store: TraceStore,
    view: ViewState,
}

impl ViewerCore {
    pub fn new(config: ConfigFile) -> Self {
        let view = ViewState::new(config.dag());
        Self {
            config,
            store: TraceStore::new(),
            view,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    pub fn dataset(&self) -> Option<&Arc<TraceDataset>> {
        self.store.current()
    }

    pub fn layout(&self) -> Option<&TimelineLayout> {
        self.view.layout.as_ref()
    }

    pub fn dag_phase(&self) -> DagPhase {
        self.view.dag.phase()
    }

    pub fn disk_options(&self) -> DiskOptions {
        self.view.disk
    }

    /// Handle a single event, updating state and returning the commands for
    /// the IO shell.
    pub fn step(&mut self, event: ViewerEvent) -> CoreStep {
        match event {
            ViewerEvent::TraceRequested { trace_id } => {
                handle_trace_requested(&mut self.store, trace_id)
            }
            ViewerEvent::TraceLoaded {
                seq,
                trace_id,
                result,
            } => handle_trace_loaded(
                &mut self.store,
                &mut self.view,
                self.config.timeline(),
                seq,
                trace_id,
                result,
            ),
            ViewerEvent::ShutdownRequested => CoreStep {
                commands: vec![CoreCommand::RequestExit],
                keep_running: false,
            },
            interaction => self.step_interaction(interaction),
        }
    }

    fn step_interaction(&mut self, event: ViewerEvent) -> CoreStep {
        if self.store.is_loading() {
            debug!(?event, "interaction ignored while a trace is loading");
            return CoreStep::none();
        }
        let Some(dataset) = self.store.current().cloned() else {
            debug!(?event, "interaction ignored: no trace loaded");
            return CoreStep::none();
        };

        match event {
            ViewerEvent::DagSelected { graph_id } => {
                handle_dag_selected(&dataset, &mut self.view, self.config.dag(), graph_id)
            }
            ViewerEvent::CriticalPathToggled => {
                handle_critical_path_toggled(&dataset, &mut self.view, self.config.timeline())
            }
            ViewerEvent::TaskAnalyzed { task_id } => {
                handle_task_analyzed(&dataset, &mut self.view, task_id)
            }
            ViewerEvent::TimelineHovered { record } => handle_hover(&mut self.view, Some(record)),
            ViewerEvent::TimelineLeft => handle_hover(&mut self.view, None),
            ViewerEvent::DiskUsageChanged { unit, highlight } => handle_disk_usage_changed(
                &dataset,
                &mut self.view,
                self.config.timeline(),
                DiskOptions { unit, highlight },
            ),
            ViewerEvent::TraceRequested { .. }
            | ViewerEvent::TraceLoaded { .. }
            | ViewerEvent::ShutdownRequested => CoreStep::none(),
        }
    }
}
