// src/exec/step.rs

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::compile::BuildPipeline;
use crate::deploy::{DeploySummary, client_for, deploy_plan};
use crate::engine::{BuildScope, CoreCommand};
use crate::errors::Result;
use crate::resolve::{resolve_deploy_targets, resolve_full};

/// Executes the commands of one core step, in order.
///
/// Every failure is logged and local to its command; later commands of the
/// step still run.
#[derive(Debug, Clone)]
pub struct StepExecutor {
    pipeline: BuildPipeline,
}

impl StepExecutor {
    pub fn new(pipeline: BuildPipeline) -> Self {
        Self { pipeline }
    }

    pub async fn execute(&self, commands: Vec<CoreCommand>) {
        for command in commands {
            self.execute_one(command).await;
        }
    }

    async fn execute_one(&self, command: CoreCommand) {
        match command {
            CoreCommand::Compile(targets) => {
                self.pipeline.compile_targets(targets).await;
            }
            CoreCommand::Build {
                scope: BuildScope::TaskFolder(task),
                reuse_cached,
            } => match self.pipeline.build_scoped(&task, reuse_cached).await {
                Ok(Some(compiled)) => {
                    info!(task = %task, output = %compiled.output.display(), "task form built");
                }
                Ok(None) => {}
                Err(err) => error!(task = %task, error = %err, "task folder build failed"),
            },
            CoreCommand::Build {
                scope: BuildScope::All,
                ..
            } => {
                if let Err(err) = self.build_all().await {
                    error!(error = %err, "clean build failed");
                }
            }
            CoreCommand::Deploy { file, incoming } => {
                if let Err(err) = self.deploy(file.as_deref(), incoming).await {
                    error!(script = "deploy", error = %err, "deploy failed");
                }
            }
            CoreCommand::RequestExit => {}
        }
    }

    async fn build_all(&self) -> Result<()> {
        let config = self.pipeline.config();
        let plan = resolve_full(self.pipeline.fs().as_ref(), config, None)?;
        let summary = self.pipeline.build_plan(plan, true).await;
        if !summary.is_success() {
            warn!(failed = ?summary.failed, "some task folders failed to build");
        }
        Ok(())
    }

    async fn deploy(&self, file: Option<&str>, incoming: Option<Vec<String>>) -> Result<DeploySummary> {
        let config = self.pipeline.config();
        let fs = Arc::clone(self.pipeline.fs());
        let plan = resolve_deploy_targets(fs.as_ref(), config, file)?;
        let client = client_for(config, &plan)?;
        Ok(deploy_plan(fs, client, config.root(), plan, incoming).await)
    }
}
