// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::config::ConfigFile;
use crate::engine::{BuildScope, CoreCommand, CoreStep};
use crate::fs::FileSystem;
use crate::resolve::{BuildTarget, resolve_all_targets, resolve_incremental};
use crate::types::ArtifactKind;

/// Initial work of a dev session:
/// - compile every entry into the live-served directory
/// - with `build_on_watch`, a clean build of the whole plan
/// - with `auto_deploy`, deploy every process definition
pub fn handle_startup(fs: &dyn FileSystem, config: &ConfigFile) -> CoreStep {
    let mut commands = Vec::new();

    match resolve_all_targets(fs, config) {
        Ok(targets) if !targets.is_empty() => commands.push(CoreCommand::Compile(targets)),
        Ok(_) => debug!("no entry files found under the forms tree"),
        Err(err) => warn!(error = %err, "failed to scan the forms tree"),
    }

    if config.build_on_watch() {
        commands.push(CoreCommand::Build {
            scope: BuildScope::All,
            reuse_cached: false,
        });
    }

    if config.engine().auto_deploy {
        commands.push(CoreCommand::Deploy {
            file: None,
            incoming: None,
        });
    }

    CoreStep::running(commands)
}

/// React to one changed path.
///
/// - A process definition is redeployed on its own when auto-deploy is on.
/// - Any other file is resolved to build targets and compiled; clean builds
///   follow for the affected folders with `build_on_watch`, and process
///   definitions referencing the rebuilt artifacts are redeployed with
///   auto-deploy.
pub fn handle_file_change(fs: &dyn FileSystem, config: &ConfigFile, path: &str) -> CoreStep {
    if config.is_process_definition(path) {
        if !config.engine().auto_deploy {
            debug!(path, "process definition changed; auto-deploy is off");
            return CoreStep::running(Vec::new());
        }
        return CoreStep::running(vec![CoreCommand::Deploy {
            file: Some(path.to_string()),
            incoming: None,
        }]);
    }

    let targets = match resolve_incremental(fs, config, path) {
        Ok(targets) => targets,
        Err(err) => {
            warn!(path, error = %err, "failed to resolve build targets");
            return CoreStep::running(Vec::new());
        }
    };

    if targets.is_empty() {
        debug!(path, "change maps to no build target");
        return CoreStep::running(Vec::new());
    }

    let mut incoming: Vec<String> = targets.iter().map(|t| t.output_name.clone()).collect();
    let folders = changed_folders(&targets);
    let mut commands = vec![CoreCommand::Compile(targets)];

    if config.build_on_watch() {
        for (task_folder, markup_only) in folders {
            // The clean build rewrites the folder's markup, which inlines
            // the script/style that changed.
            incoming.push(format!("{task_folder}.{}", ArtifactKind::Markup.extension()));
            commands.push(CoreCommand::Build {
                scope: BuildScope::TaskFolder(task_folder),
                reuse_cached: markup_only,
            });
        }
    }

    if config.engine().auto_deploy {
        incoming.sort();
        incoming.dedup();
        commands.push(CoreCommand::Deploy {
            file: None,
            incoming: Some(incoming),
        });
    }

    CoreStep::running(commands)
}

/// Task folders touched by `targets`, each flagged when only its markup
/// changed.
fn changed_folders(targets: &[BuildTarget]) -> BTreeMap<String, bool> {
    let mut folders: BTreeMap<String, bool> = BTreeMap::new();
    for target in targets {
        let markup = target.artifact() == ArtifactKind::Markup;
        folders
            .entry(target.task_folder.clone())
            .and_modify(|only| *only &= markup)
            .or_insert(markup);
    }
    folders
}
