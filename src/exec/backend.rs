// src/exec/backend.rs

//! Pluggable pipeline backend.
//!
//! The runtime talks to a `PipelineBackend` instead of compiling and
//! deploying itself, so tests can record the dispatched commands instead.

use std::future::Future;
use std::pin::Pin;

use tokio::task::JoinSet;
use tracing::{debug, error};

use crate::engine::CoreCommand;
use crate::errors::Result;
use crate::exec::step::StepExecutor;

/// Trait abstracting how the commands of one core step are carried out.
pub trait PipelineBackend: Send {
    /// Start executing `commands`. Implementations may return before the
    /// work finishes.
    fn dispatch(
        &mut self,
        commands: Vec<CoreCommand>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Called once when the runtime stops.
    fn shutdown(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async {})
    }
}

/// Production backend: every step runs as its own Tokio task, so a slow
/// build never delays the handling of the next file change.
#[derive(Debug)]
pub struct RealPipelineBackend {
    executor: StepExecutor,
    running: JoinSet<()>,
}

impl RealPipelineBackend {
    pub fn new(executor: StepExecutor) -> Self {
        Self {
            executor,
            running: JoinSet::new(),
        }
    }

    /// Forget steps that already finished.
    fn reap(&mut self) {
        while let Some(done) = self.running.try_join_next() {
            if let Err(err) = done {
                error!(error = %err, "pipeline step aborted");
            }
        }
    }
}

impl PipelineBackend for RealPipelineBackend {
    fn dispatch(
        &mut self,
        commands: Vec<CoreCommand>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        self.reap();
        let executor = self.executor.clone();
        self.running.spawn(async move { executor.execute(commands).await });

        Box::pin(async { Ok(()) })
    }

    fn shutdown(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        Box::pin(async move {
            debug!(in_flight = self.running.len(), "stopping pipeline steps");
            self.running.shutdown().await;
        })
    }
}
