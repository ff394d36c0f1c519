// src/exec/mod.rs

//! Carrying out core commands.
//!
//! - `backend`: the [`PipelineBackend`] seam the runtime dispatches to.
//! - `step`: sequential execution of one step's commands.

pub mod backend;
pub mod step;

pub use backend::{PipelineBackend, RealPipelineBackend};
pub use step::StepExecutor;
