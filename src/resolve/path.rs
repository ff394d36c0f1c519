// src/resolve/path.rs

//! Path classification.
//!
//! Turns a project-relative path into a [`FileContext`]: where the file sits
//! relative to the source root, which task folder owns it, and whether it is
//! an entry point or a shared/partial resource.
//!
//! Supported layouts (depth counts the source root as one segment):
//!
//! ```text
//! src/forms/<task>/<entry>            depth 4
//! src/forms/<flow>/<task>/<entry>     depth 5  (grouping folder)
//! ```

use std::path::Path;

use crate::config::ConfigFile;
use crate::types::EntryKind;

/// Deepest supported entry location (see module docs).
pub const MAX_PATH_DEPTH: usize = 5;

/// Depth from which the folder below `forms` is a grouping folder rather
/// than the task folder itself.
const GROUPING_DEPTH: usize = 5;

/// A path split into its segments, with `/` and `\` both accepted as
/// separators and `.` segments dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTokens<'a> {
    segments: Vec<&'a str>,
    in_source_root: bool,
}

impl<'a> PathTokens<'a> {
    pub fn new(path: &'a str, src_dir: &str) -> Self {
        let segments: Vec<&str> = path
            .split(['/', '\\'])
            .filter(|s| !s.is_empty() && *s != ".")
            .collect();
        let in_source_root = segments.len() > 1 && segments[0] == src_dir;

        Self {
            segments,
            in_source_root,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments, source root included.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    pub fn file_name(&self) -> Option<&'a str> {
        self.segments.last().copied()
    }

    /// Segments below the source root, or `None` when the path does not
    /// live under it.
    pub fn source_relative(&self) -> Option<&[&'a str]> {
        self.in_source_root.then(|| &self.segments[1..])
    }

    /// Directory segments below the source root (the file name excluded).
    fn source_dirs(&self) -> &[&'a str] {
        match self.source_relative() {
            Some(rel) if !rel.is_empty() => &rel[..rel.len() - 1],
            _ => &[],
        }
    }
}

/// Derived, per-event facts about a single path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileContext {
    /// Extension without the dot.
    pub extension: Option<String>,
    pub inside_forms_tree: bool,
    pub depth: usize,
    pub entry_kind: Option<EntryKind>,
    pub task_folder: Option<String>,
    /// Not an entry, outside the forms tree, nested too deep, or without an
    /// owning task folder.
    pub partial: bool,
}

impl FileContext {
    /// The entry kind this file's extension maps to, whether or not the
    /// file itself is an entry.
    pub fn extension_kind(&self, config: &ConfigFile) -> Option<EntryKind> {
        self.extension
            .as_deref()
            .and_then(|ext| config.entry_points().kind_for_extension(ext))
    }
}

/// Classify a project-relative path.
///
/// Pure: no IO. An empty path yields the neutral context used by whole-tree
/// requests that are not tied to a single file.
pub fn classify(path: &str, config: &ConfigFile) -> FileContext {
    let tokens = PathTokens::new(path, config.src_dir());
    if tokens.is_empty() {
        return FileContext::default();
    }

    let file_name = tokens.file_name().unwrap_or_default();
    let extension = Path::new(file_name)
        .extension()
        .map(|e| e.to_string_lossy().into_owned());
    let depth = tokens.depth();

    let dirs = tokens.source_dirs();
    let inside_forms_tree = dirs.first() == Some(&config.forms_folder());

    let task_folder = if inside_forms_tree {
        let index = if depth >= GROUPING_DEPTH { 2 } else { 1 };
        dirs.get(index).map(|s| s.to_string())
    } else {
        None
    };

    let entry_kind = config.entry_points().kind_of(file_name);
    // An entry directly inside the forms folder belongs to no task folder.
    let partial = entry_kind.is_none()
        || !inside_forms_tree
        || depth > MAX_PATH_DEPTH
        || task_folder.is_none();

    FileContext {
        extension,
        inside_forms_tree,
        depth,
        entry_kind,
        task_folder,
        partial,
    }
}
