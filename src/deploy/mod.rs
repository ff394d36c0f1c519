// src/deploy/mod.rs

//! Deploying process definitions and their form resources to the engine.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, error, info};

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::resolve::{DeployPlan, DeployTarget};

pub mod bpmn;
pub mod client;

pub use bpmn::{DeployResource, ProcessDefinition, load_process_definition, referenced_resources};
pub use client::{ActivityInstance, Deployment, EngineClient, ProcessInstance};

/// Per-target results of one deploy run. No rollback happens on failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploySummary {
    pub deployed: Vec<String>,
    /// Unaffected by the incoming changes.
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum DeployOutcome {
    Deployed,
    Skipped,
}

pub fn client_for(config: &ConfigFile, plan: &DeployPlan) -> Result<EngineClient> {
    EngineClient::new(
        &plan.server,
        Duration::from_secs(config.engine().timeout_secs),
    )
}

/// Deploy every target of `plan` concurrently.
///
/// `incoming` holds the names of changed form artifacts; targets that
/// reference none of them are skipped. Relative target paths resolve against
/// `root`.
pub async fn deploy_plan(
    fs: Arc<dyn FileSystem>,
    client: EngineClient,
    root: &Path,
    plan: DeployPlan,
    incoming: Option<Vec<String>>,
) -> DeploySummary {
    let incoming: Option<Arc<[String]>> = incoming.map(Into::into);
    let resources_dir = Arc::new(plan.resources_dir);
    let server = Arc::new(plan.server);

    let mut set = JoinSet::new();
    for DeployTarget { entry_path } in plan.targets {
        let fs = Arc::clone(&fs);
        let client = client.clone();
        let resources_dir = Arc::clone(&resources_dir);
        let incoming = incoming.clone();
        let path = root.join(&entry_path);

        set.spawn(async move {
            let result =
                deploy_one(fs.as_ref(), &client, &path, &resources_dir, incoming.as_deref()).await;
            (entry_path, result)
        });
    }

    let mut summary = DeploySummary::default();
    while let Some(joined) = set.join_next().await {
        match joined {
            Ok((entry, Ok(DeployOutcome::Deployed))) => {
                info!(artifact = %entry.display(), link = %server, "deployed to the engine");
                summary.deployed.push(entry.display().to_string());
            }
            Ok((entry, Ok(DeployOutcome::Skipped))) => {
                debug!(entry = %entry.display(), "no referenced resource changed; not deployed");
                summary.skipped.push(entry.display().to_string());
            }
            Ok((entry, Err(err))) => {
                error!(script = "deploy", entry = %entry.display(), error = %err, "deploy failed");
                summary.failed.push(entry.display().to_string());
            }
            Err(err) => error!(error = %err, "deploy task aborted"),
        }
    }

    summary.deployed.sort();
    summary.skipped.sort();
    summary.failed.sort();
    summary
}

async fn deploy_one(
    fs: &dyn FileSystem,
    client: &EngineClient,
    path: &Path,
    resources_dir: &Path,
    incoming: Option<&[String]>,
) -> Result<DeployOutcome> {
    let definition = load_process_definition(fs, path, resources_dir, incoming)?;
    if !definition.has_changed {
        return Ok(DeployOutcome::Skipped);
    }

    let deployment = client.deploy(&definition).await?;
    debug!(id = %deployment.id, diagram = %definition.filename, "deployment created");
    Ok(DeployOutcome::Deployed)
}
