// src/compile/pipeline.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::compile::cache::ArtifactCache;
use crate::compile::markup::{Injection, MarkupAssembler};
use crate::compile::{AssetCompiler, CompileRequest};
use crate::config::ConfigFile;
use crate::errors::{BakerError, Result};
use crate::fs::FileSystem;
use crate::resolve::{BuildPlanEntry, BuildTarget, resolve_full};
use crate::types::{ArtifactKind, BuildMode};

/// A file produced for a build target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledOutput {
    pub target: BuildTarget,
    pub output: PathBuf,
    /// False when the output already had identical content on disk.
    pub written: bool,
}

/// Outcome of a multi-folder clean build. Failures are per task folder.
#[derive(Debug, Clone, Default)]
pub struct BuildSummary {
    pub built: Vec<CompiledOutput>,
    pub failed: Vec<String>,
}

impl BuildSummary {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Compiles targets into the live-served directory (watch mode) and task
/// folders into the build directory (clean builds).
///
/// Cheap to clone; clones share the compiler, filesystem and cache.
#[derive(Debug, Clone)]
pub struct BuildPipeline {
    fs: Arc<dyn FileSystem>,
    config: Arc<ConfigFile>,
    compiler: Arc<dyn AssetCompiler>,
    cache: ArtifactCache,
    assembler: MarkupAssembler,
}

impl BuildPipeline {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        config: Arc<ConfigFile>,
        compiler: Arc<dyn AssetCompiler>,
        cache: ArtifactCache,
    ) -> Result<Self> {
        let assembler = MarkupAssembler::new(Arc::clone(&fs), config.src_root())?;
        Ok(Self {
            fs,
            config,
            compiler,
            cache,
            assembler,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    pub fn cache(&self) -> &ArtifactCache {
        &self.cache
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    /// Watch-mode compile of one target into `public_dir`.
    ///
    /// Markup links to the live-served script/style instead of inlining them.
    pub async fn compile_target(&self, target: &BuildTarget) -> Result<CompiledOutput> {
        let entry = self.config.root().join(&target.entry_path);
        let output = self.config.public_dir().join(&target.output_name);

        let written = match target.artifact() {
            ArtifactKind::Markup => {
                let server = self.config.server();
                let injection = Injection::Live {
                    port: server.port,
                    base_name: &target.task_folder,
                    livereload: server.livereload,
                };
                let html = self.assembler.assemble(&entry, &injection)?;
                write_if_changed(self.fs.as_ref(), &output, html.as_bytes())?
            }
            artifact => {
                let request = CompileRequest {
                    entry,
                    output: output.clone(),
                    mode: BuildMode::Watch,
                };
                self.compiler.compile(artifact, request).await?;
                true
            }
        };

        Ok(CompiledOutput {
            target: target.clone(),
            output,
            written,
        })
    }

    /// Compile all `targets` concurrently. Failures are logged per target
    /// and leave the others untouched; the successful outputs are returned.
    pub async fn compile_targets(&self, targets: Vec<BuildTarget>) -> Vec<CompiledOutput> {
        let mut set = JoinSet::new();
        for target in targets {
            let pipeline = self.clone();
            set.spawn(async move {
                let result = pipeline.compile_target(&target).await;
                (target, result)
            });
        }

        let mut outputs = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((_, Ok(compiled))) => {
                    log_output(&compiled);
                    outputs.push(compiled);
                }
                Ok((target, Err(err))) => report_failure(&target, &err),
                Err(err) => error!(error = %err, "compile task aborted"),
            }
        }

        outputs.sort_by(|a, b| a.output.cmp(&b.output));
        outputs
    }

    /// Clean build of one task folder into `out_dir`.
    ///
    /// Script and style compile concurrently and are inlined into the markup.
    /// With `reuse_cached`, cached script/style content of the folder is used
    /// instead of recompiling.
    pub async fn build_folder(
        &self,
        entry: &BuildPlanEntry,
        reuse_cached: bool,
    ) -> Result<CompiledOutput> {
        let (script, style) = tokio::join!(
            self.build_asset(entry.script.as_ref(), reuse_cached),
            self.build_asset(entry.style.as_ref(), reuse_cached),
        );
        let (script, style) = (script?, style?);

        let injection = Injection::Inline {
            script: script.as_deref(),
            style: style.as_deref(),
        };
        let markup_entry = self.config.root().join(&entry.markup.entry_path);
        let html = self.assembler.assemble(&markup_entry, &injection)?;

        let output = self.config.out_dir().join(&entry.markup.output_name);
        let written = write_if_changed(self.fs.as_ref(), &output, html.as_bytes())?;

        Ok(CompiledOutput {
            target: entry.markup.clone(),
            output,
            written,
        })
    }

    /// Clean build of `task_folder` only; `None` when the folder has no
    /// markup entry.
    pub async fn build_scoped(
        &self,
        task_folder: &str,
        reuse_cached: bool,
    ) -> Result<Option<CompiledOutput>> {
        let plan = resolve_full(self.fs.as_ref(), &self.config, Some(task_folder))?;
        let Some(entry) = plan.first() else {
            debug!(task = task_folder, "no build plan entry; skipping clean build");
            return Ok(None);
        };
        self.build_folder(entry, reuse_cached).await.map(Some)
    }

    /// Build every entry of `plan` concurrently, after emptying `out_dir`
    /// when `clean` is set.
    pub async fn build_plan(&self, plan: Vec<BuildPlanEntry>, clean: bool) -> BuildSummary {
        if clean {
            self.cache.clear();
            let out_dir = self.config.out_dir();
            if let Err(err) = self.fs.remove_dir_all(&out_dir) {
                warn!(dir = %out_dir.display(), error = %err, "failed to clean output directory");
            }
        }

        let mut set = JoinSet::new();
        for entry in plan {
            let pipeline = self.clone();
            set.spawn(async move {
                let result = pipeline.build_folder(&entry, false).await;
                (entry.task_folder, result)
            });
        }

        let mut summary = BuildSummary::default();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((_, Ok(compiled))) => {
                    log_output(&compiled);
                    summary.built.push(compiled);
                }
                Ok((task, Err(err))) => {
                    error!(task = %task, error = %err, "task folder build failed");
                    summary.failed.push(task);
                }
                Err(err) => error!(error = %err, "build task aborted"),
            }
        }

        summary.built.sort_by(|a, b| a.output.cmp(&b.output));
        summary.failed.sort();
        summary
    }

    async fn build_asset(
        &self,
        target: Option<&BuildTarget>,
        reuse_cached: bool,
    ) -> Result<Option<String>> {
        let Some(target) = target else {
            return Ok(None);
        };
        let artifact = target.artifact();

        if reuse_cached {
            if let Some(content) = self.cache.get_artifact(&target.task_folder, artifact) {
                debug!(task = %target.task_folder, %artifact, "reusing cached artifact");
                return Ok(Some(content));
            }
        }

        let output = self.config.out_dir().join(&target.output_name);
        let request = CompileRequest {
            entry: self.config.root().join(&target.entry_path),
            output: output.clone(),
            mode: BuildMode::Build,
        };
        self.compiler.compile(artifact, request).await?;

        let content = self.fs.read_to_string(&output).map_err(|e| {
            BakerError::compile(target.entry_path.display().to_string(), format!("{e:#}"))
        })?;
        self.cache
            .store(&target.task_folder, artifact, content.clone());
        info!(%artifact, output = %output.display(), "bundled");

        Ok(Some(content))
    }
}

/// Write `contents` unless `path` already holds the same bytes. Returns
/// whether a write happened.
pub fn write_if_changed(fs: &dyn FileSystem, path: &Path, contents: &[u8]) -> Result<bool> {
    if fs.is_file(path) {
        let current = fs.read(path)?;
        if blake3::hash(&current) == blake3::hash(contents) {
            return Ok(false);
        }
    }
    fs.write(path, contents)?;
    Ok(true)
}

fn log_output(compiled: &CompiledOutput) {
    let artifact = compiled.target.artifact();
    if compiled.written {
        info!(%artifact, output = %compiled.output.display(), "bundled");
    } else {
        debug!(%artifact, output = %compiled.output.display(), "output unchanged; write skipped");
    }
}

fn report_failure(target: &BuildTarget, err: &BakerError) {
    error!(
        script = %target.artifact(),
        entry = %target.entry_path.display(),
        error = %err,
        "compilation failed"
    );
}
