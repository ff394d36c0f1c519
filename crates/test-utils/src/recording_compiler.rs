use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use cam_baker::compile::{AssetCompiler, CompileRequest};
use cam_baker::errors::{BakerError, Result};
use cam_baker::fs::FileSystem;
use cam_baker::types::ArtifactKind;

/// A compiler that writes `/*<artifact>:<entry file name>*/` to the output
/// through the given filesystem and records every request.
///
/// Entries whose path contains `broken` fail with a compile error.
#[derive(Debug, Clone)]
pub struct RecordingCompiler {
    fs: Arc<dyn FileSystem>,
    calls: Arc<Mutex<Vec<(ArtifactKind, CompileRequest)>>>,
}

impl RecordingCompiler {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Vec<(ArtifactKind, CompileRequest)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Content written for an entry file named `file_name`.
    pub fn output_for(artifact: ArtifactKind, file_name: &str) -> String {
        format!("/*{artifact}:{file_name}*/")
    }
}

impl AssetCompiler for RecordingCompiler {
    fn compile(
        &self,
        artifact: ArtifactKind,
        request: CompileRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            self.calls.lock().unwrap().push((artifact, request.clone()));

            let entry = request.entry.display().to_string();
            if entry.contains("broken") {
                return Err(BakerError::compile(entry, "syntax error"));
            }

            let file_name = request
                .entry
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let content = Self::output_for(artifact, &file_name);
            self.fs.write(&request.output, content.as_bytes())?;
            Ok(())
        })
    }
}
