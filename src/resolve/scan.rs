// src/resolve/scan.rs

//! Directory scans: entry files below the forms tree and process-definition
//! files selected by the configured glob.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use tracing::debug;

use crate::config::ConfigFile;
use crate::fs::FileSystem;
use crate::resolve::path::classify;
use crate::types::EntryKind;
use crate::watch::path_utils::relative_str;

/// An entry file found by a scan, already classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFile {
    /// Project-relative path with forward slashes.
    pub rel_path: String,
    pub kind: EntryKind,
    pub task_folder: String,
}

impl EntryFile {
    /// Project-relative directory of the owning task folder.
    pub fn task_dir(&self) -> &str {
        self.rel_path
            .rsplit_once('/')
            .map(|(dir, _)| dir)
            .unwrap_or_default()
    }
}

/// Collect every file below `start`, sorted. A missing `start` yields an
/// empty list. Symlinked directories are not descended into, so a link
/// pointing back up the tree cannot loop.
pub fn walk_files(fs: &dyn FileSystem, start: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    if !fs.is_dir(start) {
        return Ok(files);
    }

    let mut stack = vec![start.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for path in fs.read_dir(&dir)? {
            if fs.is_dir(&path) {
                if fs.is_symlink(&path) {
                    debug!(path = %path.display(), "skipping symlinked directory");
                    continue;
                }
                stack.push(path);
            } else if fs.is_file(&path) {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Scan the forms tree for entry files of the given kinds.
///
/// Only files that classify as proper entries (inside the forms tree, within
/// the supported depth, owned by a task folder) are returned. `scope` limits
/// the result to one task folder.
pub fn scan_entries(
    fs: &dyn FileSystem,
    config: &ConfigFile,
    kinds: &[EntryKind],
    scope: Option<&str>,
) -> Result<Vec<EntryFile>> {
    let matcher = entry_globset(config, kinds)?;
    let mut entries = Vec::new();

    for path in walk_files(fs, &config.forms_root())? {
        let Some(rel) = relative_str(config.root(), &path) else {
            continue;
        };
        if !matcher.is_match(&rel) {
            continue;
        }

        let ctx = classify(&rel, config);
        let (false, Some(kind), Some(task_folder)) = (ctx.partial, ctx.entry_kind, ctx.task_folder)
        else {
            debug!(path = %rel, depth = ctx.depth, "entry outside the supported layout; skipped");
            continue;
        };

        if scope.is_some_and(|s| s != task_folder) {
            continue;
        }

        entries.push(EntryFile {
            rel_path: rel,
            kind,
            task_folder,
        });
    }

    Ok(entries)
}

/// Project-relative paths of every process-definition file.
pub fn scan_process_definitions(fs: &dyn FileSystem, config: &ConfigFile) -> Result<Vec<String>> {
    let pattern = &config.engine().process_glob;
    let start = config.root().join(literal_prefix(pattern));

    let found = walk_files(fs, &start)?
        .into_iter()
        .filter_map(|path| relative_str(config.root(), &path))
        .filter(|rel| config.is_process_definition(rel))
        .collect();

    Ok(found)
}

/// `<src>/<forms>/**/<entry name>` for each kind.
fn entry_globset(config: &ConfigFile, kinds: &[EntryKind]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for kind in kinds {
        let pattern = format!(
            "{}/{}/**/{}",
            config.src_dir(),
            config.forms_folder(),
            config.entry_points().name_of(*kind)
        );
        let glob =
            Glob::new(&pattern).with_context(|| format!("invalid entry pattern: {pattern}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

/// Leading directory components of a glob that contain no metacharacters.
fn literal_prefix(pattern: &str) -> PathBuf {
    let segments: Vec<&str> = pattern.split('/').collect();
    let literal = segments
        .iter()
        .take_while(|s| !s.contains(['*', '?', '[', '{']))
        .count();
    // The last segment names files, never a directory to walk.
    let dirs = literal.min(segments.len().saturating_sub(1));
    segments[..dirs].iter().copied().collect()
}
