// src/engine/core.rs

//! Pure core runtime.
//!
//! Consumes [`RuntimeEvent`]s and returns the commands the IO shell should
//! run. It reads the source tree only through the [`FileSystem`] trait and
//! never compiles, writes or talks to the network, so it can be tested
//! against an in-memory tree without Tokio.

use std::sync::Arc;

use crate::config::ConfigFile;
use crate::engine::event_handlers::{handle_file_change, handle_startup};
use crate::engine::{CoreCommand, CoreStep, RuntimeEvent};
use crate::fs::FileSystem;

#[derive(Debug)]
pub struct CoreRuntime {
    fs: Arc<dyn FileSystem>,
    config: Arc<ConfigFile>,
}

impl CoreRuntime {
    pub fn new(fs: Arc<dyn FileSystem>, config: Arc<ConfigFile>) -> Self {
        Self { fs, config }
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Handle a single runtime event.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::Startup => handle_startup(self.fs.as_ref(), &self.config),
            RuntimeEvent::FileChanged { path } => {
                handle_file_change(self.fs.as_ref(), &self.config, &path)
            }
            RuntimeEvent::ShutdownRequested => CoreStep {
                commands: vec![CoreCommand::RequestExit],
                keep_running: false,
            },
        }
    }
}
