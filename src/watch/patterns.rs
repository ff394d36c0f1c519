// src/watch/patterns.rs

use std::collections::BTreeSet;
use std::fmt;

use anyhow::{Context, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::config::ConfigFile;
use crate::config::model::extension_of;

/// Compiled watch/exclude globs of a dev session.
///
/// Paths handed to [`WatchProfile::matches`] are relative to the project
/// root, e.g. `"src/forms/task/index.html"`.
#[derive(Clone)]
pub struct WatchProfile {
    watch_patterns: Vec<String>,
    watch_set: GlobSet,
    exclude_set: GlobSet,
}

impl fmt::Debug for WatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchProfile")
            .field("watch", &self.watch_patterns)
            .finish_non_exhaustive()
    }
}

impl WatchProfile {
    /// Source files of every entry extension below the source root, plus
    /// the process-definition glob. Output directories are excluded.
    pub fn from_config(config: &ConfigFile) -> Result<Self> {
        let extensions: BTreeSet<&str> = config
            .entry_points()
            .iter()
            .filter_map(|(_, name)| extension_of(name))
            .collect();

        let mut watch_patterns: Vec<String> = extensions
            .into_iter()
            .map(|ext| format!("{}/**/*.{ext}", config.src_dir()))
            .collect();
        watch_patterns.push(config.engine().process_glob.clone());

        let exclude_patterns: Vec<String> = config
            .output_dir_names()
            .iter()
            .map(|dir| format!("{}/**", dir.trim_start_matches("./").trim_end_matches('/')))
            .collect();

        let watch_set = build_globset(&watch_patterns).context("building watch globset")?;
        let exclude_set =
            build_globset(&exclude_patterns).context("building exclude globset")?;

        Ok(Self {
            watch_patterns,
            watch_set,
            exclude_set,
        })
    }

    pub fn patterns(&self) -> &[String] {
        &self.watch_patterns
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.watch_set.is_match(rel_path) && !self.exclude_set.is_match(rel_path)
    }
}

/// Build a GlobSet from simple string patterns.
fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = Glob::new(pat).with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}
