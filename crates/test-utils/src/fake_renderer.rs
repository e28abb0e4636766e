use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use traceview::engine::{ViewCommand, ViewerEvent};
use traceview::errors::Result;
use traceview::render::RenderBackend;

/// A fake renderer that:
/// - records every view command it receives
/// - after the first `TraceReady`/`LoadFailed`, sends the scripted events
///   followed by `ShutdownRequested`.
pub struct FakeRenderer {
    runtime_tx: mpsc::Sender<ViewerEvent>,
    rendered: Arc<Mutex<Vec<ViewCommand>>>,
    script: Option<Vec<ViewerEvent>>,
}

impl FakeRenderer {
    pub fn new(
        runtime_tx: mpsc::Sender<ViewerEvent>,
        rendered: Arc<Mutex<Vec<ViewCommand>>>,
        script: Vec<ViewerEvent>,
    ) -> Self {
        Self {
            runtime_tx,
            rendered,
            script: Some(script),
        }
    }
}

impl RenderBackend for FakeRenderer {
    fn render(
        &mut self,
        commands: Vec<ViewCommand>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let rendered = Arc::clone(&self.rendered);

        Box::pin(async move {
            let settled = commands.iter().any(|c| {
                matches!(c, ViewCommand::TraceReady { .. } | ViewCommand::LoadFailed { .. })
            });
            {
                let mut guard = rendered.lock().unwrap();
                guard.extend(commands);
            }

            if settled {
                if let Some(script) = self.script.take() {
                    for event in script {
                        tx.send(event).await.map_err(anyhow::Error::from)?;
                    }
                    tx.send(ViewerEvent::ShutdownRequested)
                        .await
                        .map_err(anyhow::Error::from)?;
                }
            }
            Ok(())
        })
    }
}
