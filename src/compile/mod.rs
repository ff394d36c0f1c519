// src/compile/mod.rs

//! Turning build targets into files.
//!
//! - `tools`: script/style compilation through external CLIs.
//! - `markup`: form markup assembly and injection.
//! - `cache`: last compiled script/style per task folder.
//! - `pipeline`: watch-mode compiles and clean builds on top of the above.

use std::fmt::Debug;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::errors::Result;
use crate::types::{ArtifactKind, BuildMode};

pub mod cache;
pub mod markup;
pub mod pipeline;
pub mod tools;

pub use cache::{ArtifactCache, CachedArtifacts};
pub use markup::{Injection, MarkupAssembler};
pub use pipeline::{BuildPipeline, BuildSummary, CompiledOutput};
pub use tools::{ToolchainCompiler, env_defines};

/// A single script or style compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub entry: PathBuf,
    pub output: PathBuf,
    pub mode: BuildMode,
}

/// Compiles script and style entries to a file.
///
/// Production uses [`ToolchainCompiler`]; tests substitute a recorder that
/// writes canned output through the in-memory filesystem.
pub trait AssetCompiler: Send + Sync + Debug {
    /// Compile `request.entry` into `request.output`.
    fn compile(
        &self,
        artifact: ArtifactKind,
        request: CompileRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
