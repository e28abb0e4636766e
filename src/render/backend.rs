// src/render/backend.rs

//! Pluggable render backend abstraction.
//!
//! The runtime hands view commands to a `RenderBackend` instead of writing
//! them itself, so tests can swap in a backend that records commands and
//! drives follow-up interactions.
//!
//! - [`JsonRenderBackend`] writes one JSON object per command and, once a
//!   trace is ready, replays a scripted list of interactions.

use std::future::Future;
use std::io::Write;
use std::pin::Pin;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::{ViewCommand, ViewerEvent};
use crate::errors::{Error, Result};

/// Trait abstracting where view commands go.
pub trait RenderBackend: Send {
    /// Render one batch of commands, produced by a single core step.
    fn render(
        &mut self,
        commands: Vec<ViewCommand>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Writes view commands as JSON lines.
///
/// When the first `TraceReady` (or `LoadFailed`) goes out, the scripted
/// interactions are sent to the runtime, followed by a shutdown request.
pub struct JsonRenderBackend {
    out: Box<dyn Write + Send>,
    runtime_tx: mpsc::Sender<ViewerEvent>,
    script: Option<Vec<ViewerEvent>>,
}

impl JsonRenderBackend {
    pub fn new(
        out: Box<dyn Write + Send>,
        runtime_tx: mpsc::Sender<ViewerEvent>,
        script: Vec<ViewerEvent>,
    ) -> Self {
        Self {
            out,
            runtime_tx,
            script: Some(script),
        }
    }
}

impl RenderBackend for JsonRenderBackend {
    fn render(
        &mut self,
        commands: Vec<ViewCommand>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            let mut settled = false;
            for command in &commands {
                serde_json::to_writer(&mut self.out, command).map_err(Error::from)?;
                self.out.write_all(b"\n")?;
                settled |= matches!(
                    command,
                    ViewCommand::TraceReady { .. } | ViewCommand::LoadFailed { .. }
                );
            }
            self.out.flush()?;

            if settled {
                if let Some(script) = self.script.take() {
                    debug!(events = script.len(), "replaying scripted interactions");
                    for event in script {
                        self.runtime_tx.send(event).await.map_err(Error::from)?;
                    }
                    info!("script finished; requesting shutdown");
                    self.runtime_tx
                        .send(ViewerEvent::ShutdownRequested)
                        .await
                        .map_err(Error::from)?;
                }
            }
            Ok(())
        })
    }
}
