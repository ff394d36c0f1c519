// src/resolve/bundle.rs

//! Incremental resolution: which outputs a single changed file invalidates.

use std::fmt::Debug;
use std::path::PathBuf;

use tracing::debug;

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::resolve::path::{FileContext, classify};
use crate::resolve::plan::group_entries;
use crate::resolve::scan::scan_entries;
use crate::types::{ArtifactKind, EntryKind};

/// One file to compile and the name of the artifact it produces.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BuildTarget {
    /// Entry file, relative to the project root.
    pub entry_path: PathBuf,
    /// `<task folder>.<artifact extension>`.
    pub output_name: String,
    pub kind: EntryKind,
    pub task_folder: String,
}

impl BuildTarget {
    pub fn new(
        entry_path: impl Into<PathBuf>,
        task_folder: impl Into<String>,
        kind: EntryKind,
    ) -> Self {
        let task_folder = task_folder.into();
        Self {
            entry_path: entry_path.into(),
            output_name: format!("{}.{}", task_folder, kind.artifact().extension()),
            kind,
            task_folder,
        }
    }

    pub fn artifact(&self) -> ArtifactKind {
        self.kind.artifact()
    }
}

/// Decides which targets a change to a partial/shared file invalidates.
pub trait InvalidationPolicy: Send + Sync + Debug {
    fn invalidate(
        &self,
        fs: &dyn FileSystem,
        config: &ConfigFile,
        ctx: &FileContext,
    ) -> Result<Vec<BuildTarget>>;
}

/// Rebuild every task folder that has an entry of the changed file's
/// artifact family.
///
/// There is no include graph: a shared fragment invalidates all of its
/// potential consumers. The rescan is limited to one task folder only when
/// the changed file is itself entry-named and a task folder is known.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoarseInvalidation;

impl InvalidationPolicy for CoarseInvalidation {
    fn invalidate(
        &self,
        fs: &dyn FileSystem,
        config: &ConfigFile,
        ctx: &FileContext,
    ) -> Result<Vec<BuildTarget>> {
        let Some(artifact) = ctx
            .entry_kind
            .or_else(|| ctx.extension_kind(config))
            .map(EntryKind::artifact)
        else {
            return Ok(Vec::new());
        };

        let scope = ctx.entry_kind.and(ctx.task_folder.as_deref());

        let entries = scan_entries(fs, config, artifact.entry_kinds(), scope)?;
        Ok(group_entries(entries)
            .into_values()
            .filter_map(|mut group| group.take(artifact))
            .collect())
    }
}

/// Targets to rebuild after `path` (project-relative) changed, using
/// [`CoarseInvalidation`] for partial files.
///
/// An entry file always yields its own target, even when its folder also
/// holds the other script dialect. Saving `main.js` next to `main.jsx`
/// therefore rewrites `<task>.js` from `main.js`; dialect precedence only
/// applies to partial rescans and full builds.
pub fn resolve_incremental(
    fs: &dyn FileSystem,
    config: &ConfigFile,
    path: &str,
) -> Result<Vec<BuildTarget>> {
    resolve_incremental_with(fs, config, path, &CoarseInvalidation)
}

pub fn resolve_incremental_with(
    fs: &dyn FileSystem,
    config: &ConfigFile,
    path: &str,
    policy: &dyn InvalidationPolicy,
) -> Result<Vec<BuildTarget>> {
    let ctx = classify(path, config);

    if !ctx.partial {
        if let (Some(kind), Some(task_folder)) = (ctx.entry_kind, ctx.task_folder) {
            return Ok(vec![BuildTarget::new(path, task_folder, kind)]);
        }
        // Neutral context of an empty path.
        return Ok(Vec::new());
    }

    let targets = policy.invalidate(fs, config, &ctx)?;
    debug!(path, count = targets.len(), "partial file invalidated targets");
    Ok(targets)
}
