// src/resolve/deploy.rs

//! Which process-definition files to deploy, and where their form resources
//! are read from.

use std::path::PathBuf;

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::resolve::scan::scan_process_definitions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTarget {
    /// Process-definition file, relative to the project root.
    pub entry_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployPlan {
    /// Base address of the running engine.
    pub server: String,
    /// Directory holding the compiled form artifacts referenced by the
    /// process definitions.
    pub resources_dir: PathBuf,
    pub targets: Vec<DeployTarget>,
}

/// Resolve the deploy plan for `file`, or for every process-definition file
/// matched by the configured glob when `file` is `None`.
///
/// Resources come from `out_dir` when clean builds run alongside watching
/// and from `public_dir` otherwise.
pub fn resolve_deploy_targets(
    fs: &dyn FileSystem,
    config: &ConfigFile,
    file: Option<&str>,
) -> Result<DeployPlan> {
    let resources_dir = if config.build_on_watch() {
        config.out_dir()
    } else {
        config.public_dir()
    };

    let targets = match file {
        Some(path) => vec![DeployTarget {
            entry_path: PathBuf::from(path),
        }],
        None => scan_process_definitions(fs, config)?
            .into_iter()
            .map(|rel| DeployTarget {
                entry_path: PathBuf::from(rel),
            })
            .collect(),
    };

    Ok(DeployPlan {
        server: config.engine().server.trim_end_matches('/').to_string(),
        resources_dir,
        targets,
    })
}
