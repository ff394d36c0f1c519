// src/lib.rs

pub mod cli;
pub mod compile;
pub mod config;
pub mod deploy;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod resolve;
pub mod types;
pub mod watch;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, bail};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::{CliArgs, Command};
use crate::compile::{ArtifactCache, BuildPipeline, ToolchainCompiler};
use crate::config::{ConfigFile, resolve_config};
use crate::deploy::{client_for, deploy_plan};
use crate::engine::{CoreRuntime, Runtime, RuntimeEvent};
use crate::exec::{RealPipelineBackend, StepExecutor};
use crate::fs::{FileSystem, RealFileSystem};
use crate::resolve::{BuildPlanEntry, resolve_deploy_targets, resolve_full};
use crate::watch::{WatchProfile, spawn_watcher};

/// High-level entry point used by `main.rs`.
pub async fn run(args: CliArgs) -> Result<()> {
    let config = Arc::new(resolve_config(args.config.as_deref())?);
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    debug!(root = %config.root().display(), "configuration loaded");

    match args.command() {
        Command::Dev => run_dev(fs, config).await,
        Command::Build { task, dry_run } => run_build(fs, config, task.as_deref(), dry_run).await,
        Command::Deploy { file } => run_deploy(fs, config, file.as_deref()).await,
    }
}

/// Build a pipeline backed by the external toolchain.
pub fn toolchain_pipeline(fs: Arc<dyn FileSystem>, config: Arc<ConfigFile>) -> Result<BuildPipeline> {
    let compiler = Arc::new(ToolchainCompiler::from_config(&config));
    Ok(BuildPipeline::new(fs, config, compiler, ArtifactCache::new())?)
}

/// Watch, compile on change, optionally build and deploy, until Ctrl-C.
async fn run_dev(fs: Arc<dyn FileSystem>, config: Arc<ConfigFile>) -> Result<()> {
    let pipeline = toolchain_pipeline(Arc::clone(&fs), Arc::clone(&config))?;
    let backend = RealPipelineBackend::new(StepExecutor::new(pipeline));

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let profile = WatchProfile::from_config(&config)?;
    let _watcher = spawn_watcher(
        config.root(),
        profile,
        rt_tx.clone(),
        Duration::from_millis(config.watch().debounce_ms),
    )?;

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    info!(
        public_dir = %config.public_dir().display(),
        port = config.server().port,
        build_on_watch = config.build_on_watch(),
        auto_deploy = config.engine().auto_deploy,
        "starting dev session"
    );
    rt_tx.send(RuntimeEvent::Startup).await?;

    let core = CoreRuntime::new(fs, Arc::clone(&config));
    Runtime::new(core, rt_rx, backend).run().await?;
    Ok(())
}

async fn run_build(
    fs: Arc<dyn FileSystem>,
    config: Arc<ConfigFile>,
    task: Option<&str>,
    dry_run: bool,
) -> Result<()> {
    let plan = resolve_full(fs.as_ref(), &config, task)?;

    if dry_run {
        print_plan(&config, &plan);
        return Ok(());
    }

    if plan.is_empty() {
        match task {
            Some(task) => warn!(task, "no buildable task folder with this name"),
            None => warn!(forms = %config.forms_root().display(), "nothing to build"),
        }
        return Ok(());
    }

    let pipeline = toolchain_pipeline(fs, Arc::clone(&config))?;
    // A scoped build leaves the other folders' outputs alone.
    let summary = pipeline.build_plan(plan, task.is_none()).await;

    info!(
        built = summary.built.len(),
        failed = summary.failed.len(),
        out_dir = %config.out_dir().display(),
        "build finished"
    );
    if !summary.is_success() {
        bail!("failed to build: {}", summary.failed.join(", "));
    }
    Ok(())
}

async fn run_deploy(
    fs: Arc<dyn FileSystem>,
    config: Arc<ConfigFile>,
    file: Option<&str>,
) -> Result<()> {
    let plan = resolve_deploy_targets(fs.as_ref(), &config, file)?;
    if plan.targets.is_empty() {
        warn!(glob = %config.engine().process_glob, "no process definitions to deploy");
        return Ok(());
    }

    let client = client_for(&config, &plan)?;
    let summary = deploy_plan(fs, client, config.root(), plan, None).await;

    if !summary.failed.is_empty() {
        bail!("failed to deploy: {}", summary.failed.join(", "));
    }
    Ok(())
}

/// `build --dry-run` output: one block per task folder.
fn print_plan(config: &ConfigFile, plan: &[BuildPlanEntry]) {
    println!("cam-baker build plan");
    println!("  forms: {}", config.forms_root().display());
    println!("  out_dir: {}", config.out_dir().display());
    println!();

    println!("task folders ({}):", plan.len());
    for entry in plan {
        println!("  - {}", entry.task_folder);
        for target in entry.targets() {
            println!(
                "      {}: {} -> {}",
                target.artifact(),
                target.entry_path.display(),
                target.output_name
            );
        }
    }

    debug!("dry-run complete (no compilation)");
}
