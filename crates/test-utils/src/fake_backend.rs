use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use cam_baker::engine::CoreCommand;
use cam_baker::errors::Result;
use cam_baker::exec::PipelineBackend;

/// A fake backend that records the commands of every dispatched step
/// instead of compiling or deploying anything.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    steps: Arc<Mutex<Vec<Vec<CoreCommand>>>>,
    shut_down: Arc<Mutex<bool>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands of each dispatched step, in dispatch order.
    pub fn steps(&self) -> Vec<Vec<CoreCommand>> {
        self.steps.lock().unwrap().clone()
    }

    pub fn commands(&self) -> Vec<CoreCommand> {
        self.steps().into_iter().flatten().collect()
    }

    pub fn was_shut_down(&self) -> bool {
        *self.shut_down.lock().unwrap()
    }
}

impl PipelineBackend for FakeBackend {
    fn dispatch(
        &mut self,
        commands: Vec<CoreCommand>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let steps = Arc::clone(&self.steps);
        Box::pin(async move {
            steps.lock().unwrap().push(commands);
            Ok(())
        })
    }

    fn shutdown(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send + '_>> {
        let flag = Arc::clone(&self.shut_down);
        Box::pin(async move {
            *flag.lock().unwrap() = true;
        })
    }
}
