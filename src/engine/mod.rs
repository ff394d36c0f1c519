// src/engine/mod.rs

//! Orchestration engine for cam-baker.
//!
//! The runtime reacts to:
//! - startup (initial compile, optional clean build and deploy)
//! - file changes reported by the watcher
//! - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`]. Commands produced by the core are carried out
//! by a [`crate::exec::PipelineBackend`].

use crate::resolve::BuildTarget;

/// Events flowing into the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// The dev session started.
    Startup,
    /// A watched file was created, modified or removed. `path` is relative
    /// to the project root.
    FileChanged { path: String },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// Which part of the build plan a clean build covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildScope {
    /// Every task folder; the output directory is emptied first.
    All,
    /// A single task folder, built in place.
    TaskFolder(String),
}

/// Command produced by the pure core, to be executed by the IO shell.
///
/// Commands of one [`CoreStep`] run in order; separate steps may overlap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Watch-mode compile into the live-served directory.
    Compile(Vec<BuildTarget>),
    /// Clean build into the build directory. `reuse_cached` reuses the
    /// folder's cached script/style instead of recompiling them.
    Build { scope: BuildScope, reuse_cached: bool },
    /// Deploy one process definition, or all of them when `file` is `None`.
    /// `incoming` restricts a full deploy to definitions referencing one of
    /// the named artifacts.
    Deploy {
        file: Option<String>,
        incoming: Option<Vec<String>>,
    },
    /// Stop the runtime.
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

pub mod core;
pub mod event_handlers;
pub mod runtime;

pub use core::CoreRuntime;
pub use runtime::Runtime;
