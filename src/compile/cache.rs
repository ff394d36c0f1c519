// src/compile/cache.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::types::ArtifactKind;

/// Last compiled script and style of one task folder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedArtifacts {
    pub script: Option<String>,
    pub style: Option<String>,
}

impl CachedArtifacts {
    pub fn get(&self, artifact: ArtifactKind) -> Option<&str> {
        match artifact {
            ArtifactKind::Script => self.script.as_deref(),
            ArtifactKind::Style => self.style.as_deref(),
            ArtifactKind::Markup => None,
        }
    }
}

/// Compiled script/style content keyed by task folder.
///
/// Lets a markup-only rebuild reuse what the folder's last build produced.
/// Clones share the same storage.
#[derive(Debug, Clone, Default)]
pub struct ArtifactCache {
    inner: Arc<Mutex<HashMap<String, CachedArtifacts>>>,
}

impl ArtifactCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, task_folder: &str) -> CachedArtifacts {
        self.lock().get(task_folder).cloned().unwrap_or_default()
    }

    pub fn get_artifact(&self, task_folder: &str, artifact: ArtifactKind) -> Option<String> {
        self.lock()
            .get(task_folder)
            .and_then(|cached| cached.get(artifact))
            .map(str::to_string)
    }

    /// Replace the cached `artifact` content of `task_folder`. Markup is not
    /// cached and is ignored.
    pub fn store(&self, task_folder: &str, artifact: ArtifactKind, content: String) {
        let mut inner = self.lock();
        let slot = inner.entry(task_folder.to_string()).or_default();
        match artifact {
            ArtifactKind::Script => slot.script = Some(content),
            ArtifactKind::Style => slot.style = Some(content),
            ArtifactKind::Markup => {}
        }
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CachedArtifacts>> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }
}
