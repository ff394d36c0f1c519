// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::errors::Result;
use crate::exec::PipelineBackend;

use super::RuntimeEvent;
use super::core::CoreRuntime;

/// Async shell around [`CoreRuntime`]: reads events from a channel, feeds
/// them to the core and hands the resulting commands to a
/// [`PipelineBackend`].
pub struct Runtime<B: PipelineBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    backend: B,
}

impl<B: PipelineBackend> fmt::Debug for Runtime<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<B: PipelineBackend> Runtime<B> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, backend: B) -> Self {
        Self {
            core,
            event_rx,
            backend,
        }
    }

    /// Main event loop; returns when the core asks to stop or every sender
    /// is gone.
    pub async fn run(mut self) -> Result<()> {
        info!("cam-baker runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);
            if !step.commands.is_empty() {
                self.backend.dispatch(step.commands).await?;
            }

            if !step.keep_running {
                info!("core requested exit; stopping runtime");
                break;
            }
        }

        self.backend.shutdown().await;
        info!("runtime exiting");
        Ok(())
    }
}
