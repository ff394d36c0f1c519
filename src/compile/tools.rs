// src/compile/tools.rs

//! Script and style compilation through the `esbuild` and `sass` CLIs.

use std::collections::BTreeMap;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::process::Stdio;

use tokio::process::Command;
use tracing::debug;

use crate::compile::{AssetCompiler, CompileRequest};
use crate::config::ConfigFile;
use crate::errors::{BakerError, Result};
use crate::types::{ArtifactKind, BuildMode};

/// Global name the clean-build script bundle is exposed under.
pub const SCRIPT_GLOBAL_NAME: &str = "init";

/// `process.env.<NAME>` defines for every variable whose name starts with
/// `prefix`. Values are JSON string literals, as the bundler expects.
pub fn env_defines<I>(prefix: &str, vars: I) -> BTreeMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .filter(|(name, _)| !prefix.is_empty() && name.starts_with(prefix))
        .map(|(name, value)| {
            let literal = serde_json::Value::String(value).to_string();
            (format!("process.env.{name}"), literal)
        })
        .collect()
}

/// Compiler backed by the external toolchain.
#[derive(Debug, Clone)]
pub struct ToolchainCompiler {
    esbuild: String,
    sass: String,
    defines: BTreeMap<String, String>,
}

impl ToolchainCompiler {
    pub fn new(
        esbuild: impl Into<String>,
        sass: impl Into<String>,
        defines: BTreeMap<String, String>,
    ) -> Self {
        Self {
            esbuild: esbuild.into(),
            sass: sass.into(),
            defines,
        }
    }

    /// Tools from `[tools]`, defines from the current process environment.
    pub fn from_config(config: &ConfigFile) -> Self {
        let defines = env_defines(&config.env().prefix, std::env::vars());
        Self::new(&config.tools().esbuild, &config.tools().sass, defines)
    }

    pub fn script_args(&self, request: &CompileRequest) -> Vec<String> {
        let mut args = vec![
            request.entry.display().to_string(),
            "--bundle".to_string(),
            format!("--outfile={}", request.output.display()),
        ];

        match request.mode {
            BuildMode::Watch => {
                args.push("--format=esm".to_string());
                args.push("--sourcemap".to_string());
            }
            BuildMode::Build => {
                args.push("--format=iife".to_string());
                args.push(format!("--global-name={SCRIPT_GLOBAL_NAME}"));
                args.push("--minify".to_string());
            }
        }

        for (key, value) in &self.defines {
            args.push(format!("--define:{key}={value}"));
        }
        args
    }

    pub fn style_args(&self, request: &CompileRequest) -> Vec<String> {
        vec![
            request.entry.display().to_string(),
            request.output.display().to_string(),
            "--style=compressed".to_string(),
        ]
    }

    async fn run(&self, program: &str, args: Vec<String>, entry: &Path) -> Result<()> {
        let label = entry.display().to_string();
        debug!(program, ?args, "running compiler");

        let output = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| BakerError::compile(&label, format!("failed to run `{program}`: {e}")))?;

        if output.status.success() {
            return Ok(());
        }

        // Both tools put the useful part of the diagnostic first.
        let stderr = String::from_utf8_lossy(&output.stderr);
        let message = stderr
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("`{program}` exited with {}", output.status));
        Err(BakerError::compile(label, message))
    }
}

impl AssetCompiler for ToolchainCompiler {
    fn compile(
        &self,
        artifact: ArtifactKind,
        request: CompileRequest,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            if let Some(parent) = request.output.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            match artifact {
                ArtifactKind::Script => {
                    let args = self.script_args(&request);
                    self.run(&self.esbuild, args, &request.entry).await
                }
                ArtifactKind::Style => {
                    let args = self.style_args(&request);
                    self.run(&self.sass, args, &request.entry).await
                }
                ArtifactKind::Markup => Err(BakerError::compile(
                    request.entry.display().to_string(),
                    "markup is assembled, not compiled",
                )),
            }
        })
    }
}
