// src/engine/runtime.rs

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::errors::{Error, Result, TraceviewError};
use crate::render::RenderBackend;
use crate::trace::{LoadTicket, TraceLoader};

use super::core::ViewerCore;
use super::{load_trace, CoreCommand, ViewerEvent};

/// Drives the viewer core in response to `ViewerEvent`s, runs trace loads
/// on the blocking pool and hands view commands to a `RenderBackend`.
///
/// All viewer semantics live in `ViewerCore`; this struct only does IO.
pub struct Runtime<R: RenderBackend> {
    core: ViewerCore,
    event_rx: mpsc::Receiver<ViewerEvent>,
    /// Used by load tasks to report completion.
    event_tx: mpsc::Sender<ViewerEvent>,
    loader: Arc<dyn TraceLoader>,
    renderer: R,
}

impl<R: RenderBackend> fmt::Debug for Runtime<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("loader", &self.loader)
            .finish_non_exhaustive()
    }
}

impl<R: RenderBackend> Runtime<R> {
    pub fn new(
        core: ViewerCore,
        event_rx: mpsc::Receiver<ViewerEvent>,
        event_tx: mpsc::Sender<ViewerEvent>,
        loader: Arc<dyn TraceLoader>,
        renderer: R,
    ) -> Self {
        Self {
            core,
            event_rx,
            event_tx,
            loader,
            renderer,
        }
    }

    /// Main event loop. Returns once the core asks to stop.
    pub async fn run(mut self) -> Result<()> {
        info!("traceview runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(event = event.name(), "runtime received event");

            let step = self.core.step(event);

            let mut views = Vec::new();
            for command in step.commands {
                match command {
                    CoreCommand::StartLoad(ticket) => self.start_load(ticket),
                    CoreCommand::Render(view) => views.push(view),
                    CoreCommand::RequestExit => info!("core issued RequestExit command"),
                }
            }
            if !views.is_empty() {
                self.renderer.render(views).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    /// Load on the blocking pool; the outcome comes back as `TraceLoaded`.
    fn start_load(&self, ticket: LoadTicket) {
        let loader = Arc::clone(&self.loader);
        let tx = self.event_tx.clone();

        tokio::spawn(async move {
            let LoadTicket { seq, trace_id } = ticket;
            let id = trace_id.clone();
            let result = tokio::task::spawn_blocking(move || load_trace(loader.as_ref(), &id))
                .await
                .unwrap_or_else(|join_err| Err(TraceviewError::from(Error::from(join_err))));

            if let Err(err) = tx
                .send(ViewerEvent::TraceLoaded {
                    seq,
                    trace_id,
                    result,
                })
                .await
            {
                error!(seq, error = %err, "runtime gone before load completed");
            }
        });
    }
}
