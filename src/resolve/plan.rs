// src/resolve/plan.rs

//! Full build plans: every task folder under the forms tree grouped into
//! one [`BuildPlanEntry`].

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use tracing::{debug, warn};

use crate::config::ConfigFile;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::resolve::bundle::BuildTarget;
use crate::resolve::scan::{EntryFile, scan_entries};
use crate::types::{ArtifactKind, EntryKind};

/// All targets of one task folder in a clean build. The markup target is
/// the anchor and therefore always present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildPlanEntry {
    pub task_folder: String,
    pub script: Option<BuildTarget>,
    pub style: Option<BuildTarget>,
    pub markup: BuildTarget,
}

impl BuildPlanEntry {
    pub fn target(&self, artifact: ArtifactKind) -> Option<&BuildTarget> {
        match artifact {
            ArtifactKind::Script => self.script.as_ref(),
            ArtifactKind::Style => self.style.as_ref(),
            ArtifactKind::Markup => Some(&self.markup),
        }
    }

    /// Script, style, then markup.
    pub fn targets(&self) -> impl Iterator<Item = &BuildTarget> {
        self.script
            .iter()
            .chain(self.style.iter())
            .chain(std::iter::once(&self.markup))
    }
}

/// Entries of one task folder while a scan is being grouped.
#[derive(Debug, Clone)]
pub(crate) struct FolderGroup {
    task_dir: String,
    targets: BTreeMap<ArtifactKind, BuildTarget>,
}

impl FolderGroup {
    fn new(task_dir: &str) -> Self {
        Self {
            task_dir: task_dir.to_string(),
            targets: BTreeMap::new(),
        }
    }

    /// Keep `target` unless a higher-precedence entry of the same artifact is
    /// already chosen. The outcome does not depend on offer order.
    fn offer(&mut self, target: BuildTarget) {
        match self.targets.entry(target.artifact()) {
            Entry::Vacant(slot) => {
                slot.insert(target);
            }
            Entry::Occupied(mut slot) => {
                if target.kind.overrides(slot.get().kind) {
                    slot.insert(target);
                }
            }
        }
    }

    pub(crate) fn take(&mut self, artifact: ArtifactKind) -> Option<BuildTarget> {
        self.targets.remove(&artifact)
    }

    pub(crate) fn into_targets(self) -> impl Iterator<Item = BuildTarget> {
        self.targets.into_values()
    }
}

/// Group scanned entries by task folder, applying entry precedence.
///
/// Task folder names are the output key, so a second directory carrying an
/// already seen name cannot be built alongside the first; its entries are
/// skipped with a warning.
pub(crate) fn group_entries(entries: Vec<EntryFile>) -> BTreeMap<String, FolderGroup> {
    let mut groups: BTreeMap<String, FolderGroup> = BTreeMap::new();

    for entry in entries {
        let group = match groups.entry(entry.task_folder.clone()) {
            Entry::Vacant(slot) => slot.insert(FolderGroup::new(entry.task_dir())),
            Entry::Occupied(slot) => {
                let group = slot.into_mut();
                if group.task_dir != entry.task_dir() {
                    warn!(
                        task = %entry.task_folder,
                        kept = %group.task_dir,
                        skipped = %entry.rel_path,
                        "task folder name is used twice; ignoring the later entry"
                    );
                    continue;
                }
                group
            }
        };

        group.offer(BuildTarget::new(
            entry.rel_path,
            entry.task_folder,
            entry.kind,
        ));
    }

    groups
}

/// Compile the clean-build plan, optionally scoped to one task folder.
///
/// Folders without a markup entry are left out. Entries come back sorted by
/// task folder name, and the same tree always yields the same plan.
pub fn resolve_full(
    fs: &dyn FileSystem,
    config: &ConfigFile,
    scope: Option<&str>,
) -> Result<Vec<BuildPlanEntry>> {
    let entries = scan_entries(fs, config, &EntryKind::ALL, scope)?;

    let plan = group_entries(entries)
        .into_iter()
        .filter_map(|(task_folder, mut group)| {
            let Some(markup) = group.take(ArtifactKind::Markup) else {
                debug!(task = %task_folder, "no markup entry; not part of the build plan");
                return None;
            };
            Some(BuildPlanEntry {
                script: group.take(ArtifactKind::Script),
                style: group.take(ArtifactKind::Style),
                markup,
                task_folder,
            })
        })
        .collect();

    Ok(plan)
}

/// Every entry target in the forms tree, one per task folder and artifact,
/// markup anchor or not. Used for the initial watch-mode compile.
pub fn resolve_all_targets(fs: &dyn FileSystem, config: &ConfigFile) -> Result<Vec<BuildTarget>> {
    let entries = scan_entries(fs, config, &EntryKind::ALL, None)?;

    Ok(group_entries(entries)
        .into_values()
        .flat_map(FolderGroup::into_targets)
        .collect())
}
