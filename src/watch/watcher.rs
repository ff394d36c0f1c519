// src/watch/watcher.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::RuntimeEvent;
use crate::watch::path_utils::relative_str;
use crate::watch::patterns::WatchProfile;

/// Keeps the underlying `RecommendedWatcher` alive; dropping it stops
/// watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch `root` recursively and send a `RuntimeEvent::FileChanged` for every
/// path matching `profile`.
///
/// Events are batched: after the first event of a burst, further events are
/// collected for `debounce` and each distinct path is reported once.
pub fn spawn_watcher(
    root: impl Into<PathBuf>,
    profile: WatchProfile,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    debounce: Duration,
) -> Result<WatcherHandle> {
    let root = root.into();
    // Canonicalize once so we have a stable base path.
    let root = root.canonicalize().unwrap_or_else(|_| root.clone());

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if let Err(err) = event_tx.send(event) {
                    eprintln!("cam-baker: failed to forward notify event: {err}");
                }
            }
            Err(err) => eprintln!("cam-baker: file watch error: {err}"),
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!(root = %root.display(), patterns = ?profile.patterns(), "file watcher started");

    tokio::spawn(async move {
        while let Some(first) = event_rx.recv().await {
            let mut pending = BTreeSet::new();
            collect_paths(&root, &profile, first, &mut pending);

            let quiet = tokio::time::sleep(debounce);
            tokio::pin!(quiet);
            loop {
                tokio::select! {
                    _ = &mut quiet => break,
                    next = event_rx.recv() => match next {
                        Some(event) => collect_paths(&root, &profile, event, &mut pending),
                        None => break,
                    },
                }
            }

            for path in pending {
                debug!(path = %path, "file changed");
                if runtime_tx
                    .send(RuntimeEvent::FileChanged { path })
                    .await
                    .is_err()
                {
                    debug!("runtime is gone; watcher loop finished");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}

/// Add the interesting paths of `event` to `pending`.
fn collect_paths(root: &Path, profile: &WatchProfile, event: Event, pending: &mut BTreeSet<String>) {
    // Reads never change content.
    if matches!(event.kind, EventKind::Access(_)) {
        return;
    }

    for path in event.paths {
        match relative_str(root, &path) {
            Some(rel) if profile.matches(&rel) => {
                pending.insert(rel);
            }
            Some(_) => {}
            None => warn!(path = %path.display(), root = %root.display(), "could not relativize event path"),
        }
    }
}
